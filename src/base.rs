//!
//! Base types, traits and utils.
//!

use std::collections::hash_map::DefaultHasher;
use std::hash::BuildHasher;
use thiserror::Error;

/// Rig error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RigError {
    /// An element with the same key already exists in the hierarchy.
    #[error("Duplicate element: {0}")]
    DuplicateElement(String),
    /// Element key has an empty name.
    #[error("Invalid key")]
    InvalidKey,
    /// Parent index doesn't point to an element added before the child.
    #[error("Invalid parent: {0}")]
    InvalidParent(i32),
    /// Invalid element index.
    #[error("Invalid index")]
    InvalidIndex,
    /// Hierarchy already holds `RIG_MAX_ELEMENTS` elements.
    #[error("Too many elements")]
    TooManyElements,
    /// Only leaf elements can be removed.
    #[error("Element has children")]
    HasChildren,
}

impl RigError {
    pub fn is_duplicate_element(&self) -> bool {
        matches!(self, RigError::DuplicateElement(_))
    }

    pub fn is_invalid_key(&self) -> bool {
        matches!(self, RigError::InvalidKey)
    }

    pub fn is_invalid_parent(&self) -> bool {
        matches!(self, RigError::InvalidParent(_))
    }

    pub fn is_invalid_index(&self) -> bool {
        matches!(self, RigError::InvalidIndex)
    }

    pub fn is_too_many_elements(&self) -> bool {
        matches!(self, RigError::TooManyElements)
    }

    pub fn is_has_children(&self) -> bool {
        matches!(self, RigError::HasChildren)
    }
}

/// Tolerance shared by every threshold of the aim solver: weights, blend factors,
/// near-zero vectors and the antiparallel test of `quat_between_normals`.
pub const SMALL_NUMBER: f32 = 1e-4;

/// Defines the maximum number of elements in a `RigHierarchy`.
/// Element indices are stored as `i16`.
pub const RIG_MAX_ELEMENTS: i32 = 1024;

/// Defines the index of the parent of a root element (which has no parent in fact).
pub const RIG_NO_PARENT: i32 = -1;

/// A hasher builder that creates `DefaultHasher` with default keys.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeterministicState;

impl DeterministicState {
    /// Creates a new `DeterministicState` that builds `DefaultHasher` with default keys.
    pub const fn new() -> DeterministicState {
        DeterministicState
    }
}

impl BuildHasher for DeterministicState {
    type Hasher = DefaultHasher;

    fn build_hasher(&self) -> DefaultHasher {
        DefaultHasher::default()
    }
}

/// Allow usize/i32/i16 use as rig index.
pub trait RigIndex {
    fn usize(&self) -> usize;
    fn i32(&self) -> i32;
}

macro_rules! rig_index {
    ($type:ty) => {
        impl RigIndex for $type {
            #[inline(always)]
            fn usize(&self) -> usize {
                *self as usize
            }

            #[inline(always)]
            fn i32(&self) -> i32 {
                *self as i32
            }
        }
    };
}

rig_index!(usize);
rig_index!(i32);
rig_index!(i16);
