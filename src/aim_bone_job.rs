use glam::Vec3A;

use crate::aim_item_job::AimItemJob;
use crate::aim_math_job::{AimDebugSettings, AimTarget, VectorKind};
use crate::context::RigContext;
use crate::hierarchy::{ElementKey, RigHierarchyAccess};
use crate::math::Transform;

/// Aim target whose space is a bone name. An empty name means world space.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AimBoneTarget {
    pub weight: f32,
    pub axis: Vec3A,
    pub target: Vec3A,
    pub kind: VectorKind,
    pub space: String,
}

impl Default for AimBoneTarget {
    fn default() -> AimBoneTarget {
        return AimBoneTarget::from_aim_target(&AimTarget::primary(), "");
    }
}

impl AimBoneTarget {
    #[inline]
    pub fn new(weight: f32, axis: Vec3A, target: Vec3A, kind: VectorKind, space: impl Into<String>) -> AimBoneTarget {
        return AimBoneTarget {
            weight,
            axis,
            target,
            kind,
            space: space.into(),
        };
    }

    fn from_aim_target(target: &AimTarget, space: &str) -> AimBoneTarget {
        return AimBoneTarget::new(target.weight, target.axis, target.target, target.kind, space);
    }

    /// Converts to an `AimTarget`, the space becomes a bone key.
    pub fn to_aim_target(&self) -> AimTarget {
        let target = AimTarget::new(self.weight, self.axis, self.target, self.kind);
        if self.space.is_empty() {
            return target;
        }
        return target.with_space(ElementKey::bone(self.space.as_str()));
    }
}

///
/// Aims a bone of a rig hierarchy, with target spaces given by bone names.
///
/// Convenience wrapper of `AimItemJob` where every name refers to a bone.
///
#[derive(Debug, Clone)]
pub struct AimBoneJob {
    bone: String,
    primary: AimBoneTarget,
    secondary: AimBoneTarget,
    inner: AimItemJob,
}

impl Default for AimBoneJob {
    fn default() -> AimBoneJob {
        let inner = AimItemJob::default();
        return AimBoneJob {
            bone: String::new(),
            primary: AimBoneTarget::from_aim_target(inner.primary(), ""),
            secondary: AimBoneTarget::from_aim_target(inner.secondary(), ""),
            inner,
        };
    }
}

impl AimBoneJob {
    #[inline]
    pub fn bone(&self) -> &str {
        return &self.bone;
    }

    #[inline]
    pub fn set_bone(&mut self, bone: impl Into<String>) {
        self.bone = bone.into();
        self.inner.set_item(ElementKey::bone(self.bone.as_str()));
    }

    #[inline]
    pub fn primary(&self) -> &AimBoneTarget {
        return &self.primary;
    }

    pub fn set_primary(&mut self, primary: AimBoneTarget) {
        self.inner.set_primary(primary.to_aim_target());
        self.primary = primary;
    }

    #[inline]
    pub fn secondary(&self) -> &AimBoneTarget {
        return &self.secondary;
    }

    pub fn set_secondary(&mut self, secondary: AimBoneTarget) {
        self.inner.set_secondary(secondary.to_aim_target());
        self.secondary = secondary;
    }

    #[inline]
    pub fn weight(&self) -> f32 {
        return self.inner.weight();
    }

    #[inline]
    pub fn set_weight(&mut self, weight: f32) {
        self.inner.set_weight(weight);
    }

    #[inline]
    pub fn debug_settings(&self) -> &AimDebugSettings {
        return self.inner.debug_settings();
    }

    #[inline]
    pub fn set_debug_settings(&mut self, debug_settings: AimDebugSettings) {
        self.inner.set_debug_settings(debug_settings);
    }

    /// Gets the item job doing the work, with its cached handles.
    #[inline]
    pub fn item_job(&self) -> &AimItemJob {
        return &self.inner;
    }

    #[inline]
    pub fn result(&self) -> Transform {
        return self.inner.result();
    }

    /// Runs the job, see `AimItemJob::run`.
    #[inline]
    pub fn run<H>(&mut self, ctx: &mut RigContext<'_>, hierarchy: &mut H)
    where
        H: RigHierarchyAccess + ?Sized,
    {
        self.inner.run(ctx, hierarchy);
    }
}
