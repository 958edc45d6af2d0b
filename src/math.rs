//!
//! Math library for rig transforms and aim rotations.
//!

use glam::{Mat4, Quat, Vec3A};
use std::f32::consts::PI;

use crate::base::SMALL_NUMBER;

/// Translation, rotation and scale of a rig element.
///
/// Points are scaled first, then rotated, then translated. Composition of two
/// transforms with non-uniform scale and rotation is approximated (no shearing),
/// which is enough for rig elements.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub translation: Vec3A,
    pub rotation: Quat,
    pub scale: Vec3A,
}

impl Default for Transform {
    #[inline]
    fn default() -> Transform {
        return Transform::IDENTITY;
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3A::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3A::ONE,
    };

    #[inline]
    pub const fn new(translation: Vec3A, rotation: Quat, scale: Vec3A) -> Transform {
        return Transform {
            translation,
            rotation,
            scale,
        };
    }

    #[inline]
    pub const fn from_translation(translation: Vec3A) -> Transform {
        return Transform::new(translation, Quat::IDENTITY, Vec3A::ONE);
    }

    #[inline]
    pub const fn from_rotation(rotation: Quat) -> Transform {
        return Transform::new(Vec3A::ZERO, rotation, Vec3A::ONE);
    }

    #[inline]
    pub const fn from_rotation_translation(rotation: Quat, translation: Vec3A) -> Transform {
        return Transform::new(translation, rotation, Vec3A::ONE);
    }

    #[inline]
    pub fn location(&self) -> Vec3A {
        return self.translation;
    }

    #[inline]
    pub fn set_location(&mut self, location: Vec3A) {
        self.translation = location;
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        return self.rotation;
    }

    #[inline]
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    /// Composes `self` (expressed in `parent` space) with `parent`.
    /// The result maps a point through `self` first, then through `parent`.
    pub fn mul(&self, parent: &Transform) -> Transform {
        return Transform {
            translation: parent.rotation * (parent.scale * self.translation) + parent.translation,
            rotation: parent.rotation * self.rotation,
            scale: parent.scale * self.scale,
        };
    }

    /// Expresses `self` in `parent` space, so that `self.relative_to(parent).mul(parent) == self`.
    pub fn relative_to(&self, parent: &Transform) -> Transform {
        let inv_rotation = parent.rotation.inverse();
        let inv_scale = safe_reciprocal(parent.scale);
        return Transform {
            translation: (inv_rotation * (self.translation - parent.translation)) * inv_scale,
            rotation: inv_rotation * self.rotation,
            scale: self.scale * inv_scale,
        };
    }

    /// Inverse transform, exact for uniform scale.
    pub fn inverse(&self) -> Transform {
        let inv_rotation = self.rotation.inverse();
        let inv_scale = safe_reciprocal(self.scale);
        return Transform {
            translation: (inv_rotation * -self.translation) * inv_scale,
            rotation: inv_rotation,
            scale: inv_scale,
        };
    }

    #[inline]
    pub fn transform_point(&self, point: Vec3A) -> Vec3A {
        return self.rotation * (self.scale * point) + self.translation;
    }

    #[inline]
    pub fn transform_vector(&self, vector: Vec3A) -> Vec3A {
        return self.rotation * (self.scale * vector);
    }

    #[inline]
    pub fn transform_position_no_scale(&self, point: Vec3A) -> Vec3A {
        return self.rotation * point + self.translation;
    }

    #[inline]
    pub fn transform_vector_no_scale(&self, vector: Vec3A) -> Vec3A {
        return self.rotation * vector;
    }

    #[inline]
    pub fn to_mat4(&self) -> Mat4 {
        return Mat4::from_scale_rotation_translation(self.scale.into(), self.rotation, self.translation.into());
    }

    /// Compares translation and scale component-wise, and rotation up to the sign of the quaternion.
    pub fn abs_diff_eq(&self, other: &Transform, max_abs_diff: f32) -> bool {
        return self.translation.abs_diff_eq(other.translation, max_abs_diff)
            && self.scale.abs_diff_eq(other.scale, max_abs_diff)
            && quat_abs_diff_eq(self.rotation, other.rotation, max_abs_diff);
    }
}

/// Compares two rotations, `q` and `-q` are the same rotation.
#[inline]
pub fn quat_abs_diff_eq(a: Quat, b: Quat, max_abs_diff: f32) -> bool {
    return a.abs_diff_eq(b, max_abs_diff) || a.abs_diff_eq(-b, max_abs_diff);
}

/// Vector is treated as zero if its length is below `SMALL_NUMBER`.
#[inline]
pub fn is_nearly_zero(v: Vec3A) -> bool {
    return v.length_squared() < SMALL_NUMBER * SMALL_NUMBER;
}

/// Normalizes `v`, or returns zero if `v` is nearly zero.
#[inline]
pub fn safe_normal(v: Vec3A) -> Vec3A {
    let len2 = v.length_squared();
    if len2 < SMALL_NUMBER * SMALL_NUMBER {
        return Vec3A::ZERO;
    }
    return v * len2.sqrt().recip();
}

#[inline]
fn safe_reciprocal(v: Vec3A) -> Vec3A {
    let recip = |f: f32| if f.abs() <= SMALL_NUMBER { 0.0 } else { 1.0 / f };
    return Vec3A::new(recip(v.x), recip(v.y), recip(v.z));
}

///
/// Computes the shortest arc rotation from unit vector `a` to unit vector `b`.
///
/// When `a` and `b` are (nearly) opposite, the rotation is built in two steps:
/// a half turn around an axis orthogonal to `a`, followed by the small rotation
/// from `-a` to `b`. The half turn axis is derived from `+Y` if `|a.x| > |a.y|`,
/// from `+X` otherwise, so the result only depends on `a`.
///
pub fn quat_between_normals(a: Vec3A, b: Vec3A) -> Quat {
    let dot = a.dot(b);
    let w = 1.0 + dot;

    let result;
    if w < SMALL_NUMBER {
        let cross = a.cross(b);
        let half = Quat::from_xyzw(-cross.x, -cross.y, -cross.z, 2.0 - w).normalize();

        let normal = if a.x.abs() > a.y.abs() { Vec3A::Y } else { Vec3A::X };
        let binormal = a.cross(normal);
        let tau_normal = a.cross(binormal).normalize();
        result = half * Quat::from_axis_angle(tau_normal.into(), PI);
    } else {
        let cross = a.cross(b);
        result = Quat::from_xyzw(cross.x, cross.y, cross.z, w);
    }

    return result.normalize();
}
