use glam::{Quat, Vec3A, Vec4};
use std::f32::consts::PI;

use crate::base::SMALL_NUMBER;
use crate::cache::CachedElement;
use crate::context::RigContext;
use crate::hierarchy::{ElementKey, RigHierarchyAccess};
use crate::math::{is_nearly_zero, quat_between_normals, safe_normal, Transform};

const PRIMARY_COLOR: Vec4 = Vec4::new(0.0, 1.0, 1.0, 1.0);
const SECONDARY_COLOR: Vec4 = Vec4::new(0.0, 0.2, 1.0, 1.0);

/// How an `AimTarget::target` vector is interpreted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VectorKind {
    /// A direction, only rotated by its space.
    Direction,
    /// A position, the aim direction goes from the aimed transform to it.
    #[default]
    Location,
}

///
/// A weighted goal for one local axis of the aimed transform.
///
/// `target` is expressed in the global space of the `space` element, or in world
/// space if `space` is `None` or can't be found in the hierarchy.
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AimTarget {
    pub weight: f32,
    pub axis: Vec3A,
    pub target: Vec3A,
    pub kind: VectorKind,
    pub space: Option<ElementKey>,
}

impl Default for AimTarget {
    fn default() -> AimTarget {
        return AimTarget::primary();
    }
}

impl AimTarget {
    #[inline]
    pub fn new(weight: f32, axis: Vec3A, target: Vec3A, kind: VectorKind) -> AimTarget {
        return AimTarget {
            weight,
            axis,
            target,
            kind,
            space: None,
        };
    }

    /// Default primary target: aims local +X at world +X location.
    #[inline]
    pub fn primary() -> AimTarget {
        return AimTarget::new(1.0, Vec3A::X, Vec3A::X, VectorKind::Location);
    }

    /// Default secondary target: local +Z, disabled.
    #[inline]
    pub fn secondary() -> AimTarget {
        return AimTarget::new(0.0, Vec3A::Z, Vec3A::ZERO, VectorKind::Direction);
    }

    #[inline]
    pub fn with_space(mut self, space: ElementKey) -> AimTarget {
        self.space = Some(space);
        return self;
    }
}

/// Debug draw settings of the aim jobs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AimDebugSettings {
    pub enabled: bool,
    pub scale: f32,
    pub world_offset: Transform,
}

impl Default for AimDebugSettings {
    fn default() -> AimDebugSettings {
        return AimDebugSettings {
            enabled: false,
            scale: 10.0,
            world_offset: Transform::IDENTITY,
        };
    }
}

///
/// Orients a transform so that local axes aim at world-space targets.
///
/// The primary target is applied first: its local axis is rotated toward the
/// primary target. The secondary target then resolves the remaining twist: the
/// secondary target is projected onto the plane orthogonal to the (world) primary
/// axis before its local axis is rotated toward it.
///
/// A target weight multiplied by the job weight below 1 under-rotates the axis:
/// the aim direction becomes the normalized linear blend between the current axis
/// and the target direction.
///
/// Job input is a transform, job output is the aimed transform. The hierarchy is
/// only read, to resolve target spaces.
///
#[derive(Debug, Clone)]
pub struct AimMathJob {
    input: Transform,
    primary: AimTarget,
    secondary: AimTarget,
    weight: f32,
    debug_settings: AimDebugSettings,

    primary_cached_space: CachedElement,
    secondary_cached_space: CachedElement,
    result: Transform,
}

impl Default for AimMathJob {
    fn default() -> Self {
        Self {
            input: Transform::IDENTITY,
            primary: AimTarget::primary(),
            secondary: AimTarget::secondary(),
            weight: 1.0,
            debug_settings: AimDebugSettings::default(),

            primary_cached_space: CachedElement::new(),
            secondary_cached_space: CachedElement::new(),
            result: Transform::IDENTITY,
        }
    }
}

impl AimMathJob {
    pub fn input(&self) -> Transform {
        return self.input;
    }

    pub fn set_input(&mut self, input: Transform) {
        self.input = input;
    }

    pub fn primary(&self) -> &AimTarget {
        return &self.primary;
    }

    pub fn primary_mut(&mut self) -> &mut AimTarget {
        return &mut self.primary;
    }

    pub fn set_primary(&mut self, primary: AimTarget) {
        self.primary = primary;
    }

    pub fn secondary(&self) -> &AimTarget {
        return &self.secondary;
    }

    pub fn secondary_mut(&mut self) -> &mut AimTarget {
        return &mut self.secondary;
    }

    pub fn set_secondary(&mut self, secondary: AimTarget) {
        self.secondary = secondary;
    }

    pub fn weight(&self) -> f32 {
        return self.weight;
    }

    /// Overall weight, multiplied with each target weight.
    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    pub fn debug_settings(&self) -> &AimDebugSettings {
        return &self.debug_settings;
    }

    pub fn set_debug_settings(&mut self, debug_settings: AimDebugSettings) {
        self.debug_settings = debug_settings;
    }

    pub fn primary_cached_space(&self) -> &CachedElement {
        return &self.primary_cached_space;
    }

    pub fn secondary_cached_space(&self) -> &CachedElement {
        return &self.secondary_cached_space;
    }

    pub fn result(&self) -> Transform {
        return self.result;
    }

    pub fn clear_result(&mut self) {
        self.result = Transform::IDENTITY;
    }

    /// Drops the cached target spaces.
    pub fn reset_caches(&mut self) {
        self.primary_cached_space.reset();
        self.secondary_cached_space.reset();
    }

    /// Whether the current weights let the job change the input at all.
    pub fn has_effect(&self) -> bool {
        return self.weight > SMALL_NUMBER
            && (self.primary.weight > SMALL_NUMBER || self.secondary.weight > SMALL_NUMBER);
    }

    /// Runs the job. On `RigState::Init` the cached spaces are reset and the input is copied to the result.
    ///
    /// Invalid targets are reported to `ctx` and skipped, a primary rotation that was
    /// already applied is kept if the secondary target is invalid.
    pub fn run<H>(&mut self, ctx: &mut RigContext<'_>, hierarchy: &H)
    where
        H: RigHierarchyAccess + ?Sized,
    {
        self.result = self.input;

        if ctx.is_init() {
            self.reset_caches();
            return;
        }

        if !self.has_effect() {
            return;
        }

        if self.primary.weight > SMALL_NUMBER {
            let target = Self::resolve_target(
                &self.primary,
                &mut self.primary_cached_space,
                hierarchy,
                &self.result,
                &self.debug_settings,
                PRIMARY_COLOR,
                ctx,
            );

            if !is_nearly_zero(target) && !is_nearly_zero(self.primary.axis) {
                let target = safe_normal(target);
                let axis = safe_normal(self.result.transform_vector_no_scale(self.primary.axis));
                let target = Self::blend_target(axis, target, self.primary.weight * self.weight);
                let rotation = quat_between_normals(axis, target);
                self.result.rotation = (rotation * self.result.rotation).normalize();
            } else {
                ctx.report_warning("Invalid primary target.");
            }
        }

        if self.secondary.weight > SMALL_NUMBER {
            let mut target = Self::resolve_target(
                &self.secondary,
                &mut self.secondary_cached_space,
                hierarchy,
                &self.result,
                &self.debug_settings,
                SECONDARY_COLOR,
                ctx,
            );

            let mut primary_axis = self.primary.axis;
            if !is_nearly_zero(primary_axis) {
                primary_axis = safe_normal(self.result.transform_vector_no_scale(self.primary.axis));
                target -= target.dot(primary_axis) * primary_axis;
            }

            if !is_nearly_zero(target) && !is_nearly_zero(self.secondary.axis) {
                let target = safe_normal(target);
                let axis = safe_normal(self.result.transform_vector_no_scale(self.secondary.axis));
                let target = Self::blend_target(axis, target, self.secondary.weight * self.weight);

                let rotation;
                if axis.dot(target) + 1.0 < SMALL_NUMBER && !is_nearly_zero(primary_axis) {
                    // half turn around the primary axis keeps the primary aim
                    rotation = Quat::from_axis_angle(primary_axis.into(), PI);
                } else {
                    rotation = quat_between_normals(axis, target);
                }
                self.result.rotation = (rotation * self.result.rotation).normalize();
            } else {
                ctx.report_warning("Invalid secondary target.");
            }
        }
    }

    /// Resolves a target into a world-space direction from `result`.
    fn resolve_target<H>(
        target: &AimTarget,
        cached_space: &mut CachedElement,
        hierarchy: &H,
        result: &Transform,
        debug_settings: &AimDebugSettings,
        color: Vec4,
        ctx: &mut RigContext<'_>,
    ) -> Vec3A
    where
        H: RigHierarchyAccess + ?Sized,
    {
        let mut world_target = target.target;
        if cached_space.update_space(target.space.as_ref(), hierarchy) {
            if let Some(index) = cached_space.index() {
                let space = hierarchy.global_transform(index);
                world_target = match target.kind {
                    VectorKind::Direction => space.transform_vector_no_scale(world_target),
                    VectorKind::Location => space.transform_position_no_scale(world_target),
                };
            }
        }

        if debug_settings.enabled {
            if let Some(draw) = ctx.draw.as_mut() {
                let offset = &debug_settings.world_offset;
                let location = result.location();
                match target.kind {
                    VectorKind::Direction => {
                        draw.draw_line(offset, location, location + world_target * debug_settings.scale, color);
                    }
                    VectorKind::Location => {
                        draw.draw_line(offset, location, world_target, color);
                        let marker = Transform::new(
                            world_target,
                            Quat::IDENTITY,
                            Vec3A::splat(debug_settings.scale * 0.1),
                        );
                        draw.draw_box(offset, &marker, color);
                    }
                }
            }
        }

        if target.kind == VectorKind::Location {
            world_target -= result.location();
        }
        return world_target;
    }

    #[inline]
    fn blend_target(axis: Vec3A, target: Vec3A, t: f32) -> Vec3A {
        if t < 1.0 - SMALL_NUMBER {
            return safe_normal(axis.lerp(target, t));
        }
        return target;
    }
}
