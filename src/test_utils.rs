//!
//! Helpers shared by unit and integration tests.
//!

use glam::{Quat, Vec3A};

use crate::base::{RigError, RIG_NO_PARENT};
use crate::hierarchy::{ElementKey, RigHierarchy};
use crate::math::Transform;

/// Builds a single chain of bones, each one `offset` away from its parent.
pub fn build_chain(names: &[&str], offset: Vec3A) -> Result<RigHierarchy, RigError> {
    let mut hierarchy = RigHierarchy::new();
    let mut parent = RIG_NO_PARENT;
    for (idx, name) in names.iter().enumerate() {
        let local = match idx {
            0 => Transform::IDENTITY,
            _ => Transform::from_translation(offset),
        };
        parent = hierarchy.add_element(ElementKey::bone(*name), parent, local)? as i32;
    }
    return Ok(hierarchy);
}

/// Angle between the world direction of a local `axis` and `direction`.
pub fn aim_error(rotation: Quat, axis: Vec3A, direction: Vec3A) -> f32 {
    return (rotation * axis).angle_between(direction);
}
