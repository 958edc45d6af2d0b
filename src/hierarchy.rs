use std::collections::HashMap;
use std::fmt;

use crate::base::{DeterministicState, RigError, RigIndex, RIG_MAX_ELEMENTS, RIG_NO_PARENT};
use crate::math::Transform;

/// Type of a rig element.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementKind {
    #[default]
    Bone,
    Null,
    Control,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Bone => "Bone",
            ElementKind::Null => "Null",
            ElementKind::Control => "Control",
        };
        return f.write_str(name);
    }
}

/// Identifies an element of a `RigHierarchy` by name and kind.
/// Two elements of different kinds may share the same name.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementKey {
    pub name: String,
    pub kind: ElementKind,
}

impl ElementKey {
    #[inline]
    pub fn new(name: impl Into<String>, kind: ElementKind) -> ElementKey {
        return ElementKey {
            name: name.into(),
            kind,
        };
    }

    #[inline]
    pub fn bone(name: impl Into<String>) -> ElementKey {
        return ElementKey::new(name, ElementKind::Bone);
    }

    /// A key with an empty name never refers to an element.
    #[inline]
    pub fn is_valid(&self) -> bool {
        return !self.name.is_empty();
    }
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{}:{}", self.kind, self.name);
    }
}

///
/// Read/write access to the global transforms of a rig, as needed by the aim jobs.
///
/// `RigHierarchy` is the reference implementation. Implement this trait to run
/// the jobs against your own scene or rig storage.
///
pub trait RigHierarchyAccess {
    /// Gets the number of elements.
    fn num_elements(&self) -> usize;

    /// Gets a stamp that changes whenever elements are added or removed.
    /// Cached element indices are only trusted while the stamp is unchanged.
    fn topology_version(&self) -> u32;

    /// Resolves a key to an element index.
    fn index_of(&self, key: &ElementKey) -> Option<usize>;

    /// Tests whether the element at `index` exists and has `key`.
    fn contains_at(&self, index: usize, key: &ElementKey) -> bool;

    /// Gets world-space transform of an element. `index` must be valid.
    fn global_transform(&self, index: usize) -> Transform;

    /// Sets world-space transform of an element. `index` must be valid.
    fn set_global_transform(&mut self, index: usize, transform: Transform);
}

///
/// Runtime rig hierarchy: element keys, parents, local and global transforms.
///
/// Elements are stored in insertion order and a parent is always stored before
/// its children. Global transforms are kept up to date: writing the local or
/// global transform of an element updates all of its descendants.
///
#[derive(Debug, Clone)]
pub struct RigHierarchy {
    keys: Vec<ElementKey>,
    parents: Vec<i16>,
    locals: Vec<Transform>,
    globals: Vec<Transform>,
    indices: HashMap<ElementKey, i16, DeterministicState>,
    topology_version: u32,
    dirty: Vec<bool>,
}

impl Default for RigHierarchy {
    fn default() -> RigHierarchy {
        return RigHierarchy::new();
    }
}

impl RigHierarchy {
    /// Creates an empty hierarchy.
    pub fn new() -> RigHierarchy {
        return RigHierarchy {
            keys: Vec::new(),
            parents: Vec::new(),
            locals: Vec::new(),
            globals: Vec::new(),
            indices: HashMap::with_hasher(DeterministicState::new()),
            topology_version: 0,
            dirty: Vec::new(),
        };
    }

    /// Adds an element below `parent` (or `RIG_NO_PARENT`), with its transform relative to the parent.
    ///
    /// Returns the index of the new element.
    pub fn add_element(&mut self, key: ElementKey, parent: impl RigIndex, local: Transform) -> Result<usize, RigError> {
        if self.keys.len() as i32 >= RIG_MAX_ELEMENTS {
            return Err(RigError::TooManyElements);
        }
        if !key.is_valid() {
            return Err(RigError::InvalidKey);
        }
        if self.indices.contains_key(&key) {
            return Err(RigError::DuplicateElement(key.to_string()));
        }
        let parent = parent.i32();
        if parent != RIG_NO_PARENT && (parent < 0 || parent as usize >= self.keys.len()) {
            return Err(RigError::InvalidParent(parent));
        }

        let global = if parent == RIG_NO_PARENT {
            local
        } else {
            local.mul(&self.globals[parent as usize])
        };

        let index = self.keys.len();
        self.indices.insert(key.clone(), index as i16);
        self.keys.push(key);
        self.parents.push(parent as i16);
        self.locals.push(local);
        self.globals.push(global);
        self.topology_version = self.topology_version.wrapping_add(1);
        return Ok(index);
    }

    /// Removes a leaf element. Elements stored after it are shifted down by one.
    pub fn remove_element(&mut self, index: impl RigIndex) -> Result<ElementKey, RigError> {
        let index = index.usize();
        if index >= self.keys.len() {
            return Err(RigError::InvalidIndex);
        }
        if !self.is_leaf(index) {
            return Err(RigError::HasChildren);
        }

        let key = self.keys.remove(index);
        self.parents.remove(index);
        self.locals.remove(index);
        self.globals.remove(index);
        for parent in self.parents.iter_mut() {
            if *parent as i32 > index as i32 {
                *parent -= 1;
            }
        }

        self.indices.clear();
        for (idx, key) in self.keys.iter().enumerate() {
            self.indices.insert(key.clone(), idx as i16);
        }
        self.topology_version = self.topology_version.wrapping_add(1);
        return Ok(key);
    }

    /// Gets the number of elements.
    #[inline]
    pub fn num_elements(&self) -> usize {
        return self.keys.len();
    }

    /// Gets the topology version, see `RigHierarchyAccess::topology_version`.
    #[inline]
    pub fn topology_version(&self) -> u32 {
        return self.topology_version;
    }

    /// Gets element keys.
    #[inline]
    pub fn element_keys(&self) -> &[ElementKey] {
        return &self.keys;
    }

    /// Gets element's key by index.
    #[inline]
    pub fn element_key(&self, idx: impl RigIndex) -> Option<&ElementKey> {
        return self.keys.get(idx.usize());
    }

    /// Gets element's parent indices.
    #[inline]
    pub fn parents(&self) -> &[i16] {
        return &self.parents;
    }

    /// Gets element's parent by index.
    #[inline]
    pub fn parent(&self, idx: impl RigIndex) -> i16 {
        return self.parents[idx.usize()];
    }

    /// Gets element's index by key.
    #[inline]
    pub fn index_of(&self, key: &ElementKey) -> Option<usize> {
        return self.indices.get(key).map(|idx| *idx as usize);
    }

    /// Gets bone's index by name.
    #[inline]
    pub fn bone_by_name(&self, name: &str) -> Option<usize> {
        return self.index_of(&ElementKey::bone(name));
    }

    /// Test if an element is a leaf, i.e. no element has it as parent.
    pub fn is_leaf(&self, idx: impl RigIndex) -> bool {
        let idx = idx.i32();
        return !self.parents.iter().any(|parent| *parent as i32 == idx);
    }

    /// Iterates through the direct children of an element.
    ///
    /// * `f` - The function to call for each child. The function takes arguments `(child: i16)`.
    pub fn iter_children<F>(&self, idx: impl RigIndex, mut f: F)
    where
        F: FnMut(i16),
    {
        let idx = idx.i32();
        for child in (idx + 1).max(0) as usize..self.parents.len() {
            if self.parents[child] as i32 == idx {
                f(child as i16);
            }
        }
    }

    /// Gets element's transform relative to its parent.
    #[inline]
    pub fn local_transform(&self, idx: impl RigIndex) -> Transform {
        return self.locals[idx.usize()];
    }

    /// Sets element's transform relative to its parent. Descendants follow.
    pub fn set_local_transform(&mut self, idx: impl RigIndex, local: Transform) {
        let idx = idx.usize();
        self.locals[idx] = local;
        self.globals[idx] = match self.parents[idx] as i32 {
            RIG_NO_PARENT => local,
            parent => local.mul(&self.globals[parent as usize]),
        };
        self.update_descendants(idx);
    }

    /// Gets element's world-space transform.
    #[inline]
    pub fn global_transform(&self, idx: impl RigIndex) -> Transform {
        return self.globals[idx.usize()];
    }

    /// Sets element's world-space transform. Descendants follow, keeping their local transforms.
    pub fn set_global_transform(&mut self, idx: impl RigIndex, global: Transform) {
        let idx = idx.usize();
        self.locals[idx] = match self.parents[idx] as i32 {
            RIG_NO_PARENT => global,
            parent => global.relative_to(&self.globals[parent as usize]),
        };
        self.globals[idx] = global;
        self.update_descendants(idx);
    }

    fn update_descendants(&mut self, from: usize) {
        // scratch buffer kept across calls, no allocation once grown
        let mut dirty = std::mem::take(&mut self.dirty);
        dirty.clear();
        dirty.resize(self.keys.len(), false);
        dirty[from] = true;
        for idx in (from + 1)..self.keys.len() {
            let parent = self.parents[idx] as i32;
            if parent != RIG_NO_PARENT && dirty[parent as usize] {
                self.globals[idx] = self.locals[idx].mul(&self.globals[parent as usize]);
                dirty[idx] = true;
            }
        }
        self.dirty = dirty;
    }
}

impl RigHierarchyAccess for RigHierarchy {
    #[inline]
    fn num_elements(&self) -> usize {
        return self.keys.len();
    }

    #[inline]
    fn topology_version(&self) -> u32 {
        return self.topology_version;
    }

    #[inline]
    fn index_of(&self, key: &ElementKey) -> Option<usize> {
        return RigHierarchy::index_of(self, key);
    }

    #[inline]
    fn contains_at(&self, index: usize, key: &ElementKey) -> bool {
        return self.keys.get(index) == Some(key);
    }

    #[inline]
    fn global_transform(&self, index: usize) -> Transform {
        return self.globals[index];
    }

    #[inline]
    fn set_global_transform(&mut self, index: usize, transform: Transform) {
        RigHierarchy::set_global_transform(self, index, transform);
    }
}

#[cfg(test)]
mod tests {
    use core::f32::consts;
    use glam::{Quat, Vec3, Vec3A};
    use wasm_bindgen_test::*;

    use super::*;

    fn chain() -> RigHierarchy {
        let mut hierarchy = RigHierarchy::new();
        let root = hierarchy
            .add_element(ElementKey::bone("Root"), RIG_NO_PARENT, Transform::IDENTITY)
            .unwrap();
        let arm = hierarchy
            .add_element(ElementKey::bone("Arm"), root, Transform::from_translation(Vec3A::X))
            .unwrap();
        hierarchy
            .add_element(ElementKey::bone("Hand"), arm, Transform::from_translation(Vec3A::X))
            .unwrap();
        hierarchy
            .add_element(ElementKey::new("Target", ElementKind::Null), RIG_NO_PARENT, Transform::IDENTITY)
            .unwrap();
        return hierarchy;
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_add_element() {
        let mut hierarchy = chain();
        assert_eq!(hierarchy.num_elements(), 4);
        assert_eq!(hierarchy.topology_version(), 4);
        assert_eq!(hierarchy.parents(), &[-1, 0, 1, -1]);
        assert_eq!(hierarchy.bone_by_name("Hand"), Some(2));
        assert_eq!(hierarchy.bone_by_name("Target"), None);
        assert_eq!(
            hierarchy.index_of(&ElementKey::new("Target", ElementKind::Null)),
            Some(3)
        );
        assert!(hierarchy
            .global_transform(2)
            .translation
            .abs_diff_eq(Vec3A::new(2.0, 0.0, 0.0), 1e-6));

        let err = hierarchy
            .add_element(ElementKey::bone("Arm"), 0, Transform::IDENTITY)
            .unwrap_err();
        assert!(err.is_duplicate_element());
        assert_eq!(err.to_string(), "Duplicate element: Bone:Arm");

        let err = hierarchy
            .add_element(ElementKey::bone(""), 0, Transform::IDENTITY)
            .unwrap_err();
        assert!(err.is_invalid_key());

        let err = hierarchy
            .add_element(ElementKey::bone("Finger"), 9, Transform::IDENTITY)
            .unwrap_err();
        assert!(err.is_invalid_parent());
        assert_eq!(hierarchy.topology_version(), 4);
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_too_many_elements() {
        let mut hierarchy = RigHierarchy::new();
        for idx in 0..RIG_MAX_ELEMENTS {
            hierarchy
                .add_element(ElementKey::bone(format!("Bone{}", idx)), RIG_NO_PARENT, Transform::IDENTITY)
                .unwrap();
        }
        let err = hierarchy
            .add_element(ElementKey::bone("Extra"), RIG_NO_PARENT, Transform::IDENTITY)
            .unwrap_err();
        assert!(err.is_too_many_elements());
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_set_global_transform() {
        let mut hierarchy = chain();
        let rotated = Transform::from_rotation_translation(
            Quat::from_axis_angle(Vec3::Z, consts::FRAC_PI_2),
            Vec3A::X,
        );
        hierarchy.set_global_transform(1, rotated);

        assert!(hierarchy.global_transform(1).abs_diff_eq(&rotated, 1e-6));
        assert!(hierarchy
            .local_transform(1)
            .abs_diff_eq(&rotated.relative_to(&Transform::IDENTITY), 1e-6));

        // hand keeps its local offset, so it swings to +Y
        let hand = hierarchy.global_transform(2);
        assert!(hand.translation.abs_diff_eq(Vec3A::new(1.0, 1.0, 0.0), 1e-5));
        assert!(hierarchy
            .local_transform(2)
            .abs_diff_eq(&Transform::from_translation(Vec3A::X), 1e-6));

        // unrelated root untouched
        assert!(hierarchy.global_transform(3).abs_diff_eq(&Transform::IDENTITY, 1e-6));
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_update_interleaved_descendants() {
        let mut hierarchy = chain();
        // a child of "Arm" stored after the unrelated "Target" root
        let elbow = hierarchy
            .add_element(ElementKey::bone("Elbow"), 1, Transform::from_translation(Vec3A::Y))
            .unwrap();
        assert_eq!(elbow, 4);

        hierarchy.set_global_transform(0, Transform::from_translation(Vec3A::Z));
        assert!(hierarchy
            .global_transform(elbow)
            .translation
            .abs_diff_eq(Vec3A::new(1.0, 1.0, 1.0), 1e-6));
        assert!(hierarchy
            .global_transform(2)
            .translation
            .abs_diff_eq(Vec3A::new(2.0, 0.0, 1.0), 1e-6));
        assert!(hierarchy.global_transform(3).abs_diff_eq(&Transform::IDENTITY, 1e-6));

        // the scratch buffer is reused by later updates
        let buffer = hierarchy.dirty.as_ptr();
        assert_eq!(hierarchy.dirty.len(), 5);
        hierarchy.set_local_transform(1, Transform::from_translation(Vec3A::X * 2.0));
        assert_eq!(hierarchy.dirty.as_ptr(), buffer);
        assert!(hierarchy
            .global_transform(elbow)
            .translation
            .abs_diff_eq(Vec3A::new(2.0, 1.0, 1.0), 1e-6));
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_set_local_transform() {
        let mut hierarchy = chain();
        hierarchy.set_local_transform(0, Transform::from_translation(Vec3A::Y));
        assert!(hierarchy
            .global_transform(2)
            .translation
            .abs_diff_eq(Vec3A::new(2.0, 1.0, 0.0), 1e-6));
        assert!(hierarchy
            .global_transform(1)
            .translation
            .abs_diff_eq(Vec3A::new(1.0, 1.0, 0.0), 1e-6));
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_remove_element() {
        let mut hierarchy = chain();
        assert!(hierarchy.remove_element(1).unwrap_err().is_has_children());
        assert!(hierarchy.remove_element(10).unwrap_err().is_invalid_index());

        let key = hierarchy.remove_element(2).unwrap();
        assert_eq!(key, ElementKey::bone("Hand"));
        assert_eq!(hierarchy.topology_version(), 5);
        assert_eq!(hierarchy.parents(), &[-1, 0, -1]);
        assert_eq!(
            hierarchy.index_of(&ElementKey::new("Target", ElementKind::Null)),
            Some(2)
        );
        assert!(hierarchy.is_leaf(1));
        assert!(!hierarchy.is_leaf(0));
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_iter_children() {
        let mut hierarchy = chain();
        hierarchy
            .add_element(ElementKey::bone("Elbow"), 1, Transform::IDENTITY)
            .unwrap();
        let mut children = Vec::new();
        hierarchy.iter_children(1, |child| children.push(child));
        assert_eq!(children, vec![2, 4]);

        let mut children = Vec::new();
        hierarchy.iter_children(2, |child| children.push(child));
        assert!(children.is_empty());
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_access_trait() {
        let mut hierarchy = chain();
        let access: &mut dyn RigHierarchyAccess = &mut hierarchy;
        assert_eq!(access.num_elements(), 4);
        assert!(access.contains_at(2, &ElementKey::bone("Hand")));
        assert!(!access.contains_at(2, &ElementKey::bone("Arm")));
        assert!(!access.contains_at(9, &ElementKey::bone("Hand")));
        access.set_global_transform(0, Transform::from_translation(Vec3A::Z));
        assert!(access
            .global_transform(2)
            .translation
            .abs_diff_eq(Vec3A::new(2.0, 0.0, 1.0), 1e-6));
    }
}
