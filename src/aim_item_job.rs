use crate::aim_math_job::{AimDebugSettings, AimMathJob, AimTarget};
use crate::cache::CachedElement;
use crate::context::RigContext;
use crate::hierarchy::{ElementKey, RigHierarchyAccess};
use crate::math::Transform;

///
/// Aims an element of a rig hierarchy.
///
/// The job reads the global transform of `item`, solves it like `AimMathJob`,
/// and writes the aimed transform back. The item is resolved through a cached
/// handle, so repeated runs on an unchanged hierarchy don't search it again.
///
#[derive(Debug, Clone, Default)]
pub struct AimItemJob {
    item: ElementKey,
    cached_item: CachedElement,
    math: AimMathJob,
}

impl AimItemJob {
    /// Gets aimed item of `AimItemJob`.
    #[inline]
    pub fn item(&self) -> &ElementKey {
        return &self.item;
    }

    /// Sets aimed item of `AimItemJob`.
    #[inline]
    pub fn set_item(&mut self, item: ElementKey) {
        self.item = item;
    }

    #[inline]
    pub fn primary(&self) -> &AimTarget {
        return self.math.primary();
    }

    #[inline]
    pub fn primary_mut(&mut self) -> &mut AimTarget {
        return self.math.primary_mut();
    }

    #[inline]
    pub fn set_primary(&mut self, primary: AimTarget) {
        self.math.set_primary(primary);
    }

    #[inline]
    pub fn secondary(&self) -> &AimTarget {
        return self.math.secondary();
    }

    #[inline]
    pub fn secondary_mut(&mut self) -> &mut AimTarget {
        return self.math.secondary_mut();
    }

    #[inline]
    pub fn set_secondary(&mut self, secondary: AimTarget) {
        self.math.set_secondary(secondary);
    }

    #[inline]
    pub fn weight(&self) -> f32 {
        return self.math.weight();
    }

    #[inline]
    pub fn set_weight(&mut self, weight: f32) {
        self.math.set_weight(weight);
    }

    #[inline]
    pub fn debug_settings(&self) -> &AimDebugSettings {
        return self.math.debug_settings();
    }

    #[inline]
    pub fn set_debug_settings(&mut self, debug_settings: AimDebugSettings) {
        self.math.set_debug_settings(debug_settings);
    }

    /// Gets the cached handle of the aimed item.
    #[inline]
    pub fn cached_item(&self) -> &CachedElement {
        return &self.cached_item;
    }

    /// Gets the inner math job, with the cached spaces and the last result.
    #[inline]
    pub fn math(&self) -> &AimMathJob {
        return &self.math;
    }

    /// Gets the aimed transform of the last run.
    ///
    /// It's the untouched item transform if the job had no effect,
    /// identity after `Init` or if the item wasn't found.
    #[inline]
    pub fn result(&self) -> Transform {
        return self.math.result();
    }

    /// Runs the job.
    ///
    /// On `RigState::Init` all cached handles are reset. If the item can't be found,
    /// a warning is reported and the hierarchy is left untouched.
    pub fn run<H>(&mut self, ctx: &mut RigContext<'_>, hierarchy: &mut H)
    where
        H: RigHierarchyAccess + ?Sized,
    {
        if ctx.is_init() {
            self.cached_item.reset();
            self.math.reset_caches();
            self.math.clear_result();
            return;
        }

        let index = match self.cached_item.update_cache(&self.item, &*hierarchy) {
            true => self.cached_item.index(),
            false => None,
        };
        let Some(index) = index else {
            ctx.report_warning(&format!("Item not found '{}'.", self.item));
            self.math.clear_result();
            return;
        };

        self.math.set_input(hierarchy.global_transform(index));
        self.math.run(ctx, &*hierarchy);
        if self.math.has_effect() {
            hierarchy.set_global_transform(index, self.math.result());
        }
    }
}

#[cfg(test)]
mod aim_item_job_tests {
    use glam::{Quat, Vec3, Vec3A};
    use wasm_bindgen_test::*;

    use super::*;
    use crate::aim_math_job::VectorKind;
    use crate::base::RIG_NO_PARENT;
    use crate::context::VecReporter;
    use crate::hierarchy::{ElementKind, RigHierarchy};

    fn arm() -> RigHierarchy {
        let mut hierarchy = RigHierarchy::new();
        hierarchy
            .add_element(ElementKey::bone("Shoulder"), RIG_NO_PARENT, Transform::IDENTITY)
            .unwrap();
        hierarchy
            .add_element(ElementKey::bone("Hand"), 0, Transform::from_translation(Vec3A::X))
            .unwrap();
        hierarchy
            .add_element(
                ElementKey::new("Goal", ElementKind::Control),
                RIG_NO_PARENT,
                Transform::from_translation(Vec3A::new(0.0, 3.0, 0.0)),
            )
            .unwrap();
        return hierarchy;
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_aim_item() {
        let mut hierarchy = arm();
        let mut job = AimItemJob::default();
        job.set_item(ElementKey::bone("Shoulder"));
        job.set_primary(
            AimTarget::new(1.0, Vec3A::X, Vec3A::ZERO, VectorKind::Location)
                .with_space(ElementKey::new("Goal", ElementKind::Control)),
        );

        let mut reporter = VecReporter::default();
        job.run(&mut RigContext::new(&mut reporter), &mut hierarchy);
        assert!(reporter.warnings.is_empty());
        assert_eq!(job.cached_item().index(), Some(0));

        let shoulder = hierarchy.global_transform(0);
        assert!((shoulder.rotation * Vec3A::X).abs_diff_eq(Vec3A::Y, 1e-5));
        assert_eq!(shoulder, job.result());

        // hand follows the shoulder
        let hand = hierarchy.global_transform(1);
        assert!(hand.translation.abs_diff_eq(Vec3A::Y, 1e-5));
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_item_not_found() {
        let mut hierarchy = arm();
        let before = hierarchy.clone();
        let mut job = AimItemJob::default();
        job.set_item(ElementKey::bone("Goal"));
        job.set_primary(AimTarget::new(1.0, Vec3A::X, Vec3A::Z, VectorKind::Direction));

        let mut reporter = VecReporter::default();
        job.run(&mut RigContext::new(&mut reporter), &mut hierarchy);
        assert_eq!(reporter.warnings, vec!["Item not found 'Bone:Goal'."]);
        for idx in 0..hierarchy.num_elements() {
            assert_eq!(hierarchy.global_transform(idx), before.global_transform(idx));
        }
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_zero_weight_untouched() {
        let mut hierarchy = arm();
        let input = Transform::from_rotation(Quat::from_axis_angle(Vec3::Z, 0.1));
        hierarchy.set_global_transform(0, input);

        let mut job = AimItemJob::default();
        job.set_item(ElementKey::bone("Shoulder"));
        job.set_primary(AimTarget::new(1.0, Vec3A::X, Vec3A::Z, VectorKind::Direction));
        job.set_weight(0.0);

        let mut reporter = VecReporter::default();
        job.run(&mut RigContext::new(&mut reporter), &mut hierarchy);
        assert!(reporter.warnings.is_empty());
        assert_eq!(hierarchy.global_transform(0), input);
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_result_not_stale() {
        let mut hierarchy = arm();
        let mut job = AimItemJob::default();
        job.set_item(ElementKey::bone("Shoulder"));
        job.set_primary(AimTarget::new(1.0, Vec3A::X, Vec3A::Z, VectorKind::Direction));

        let mut reporter = VecReporter::default();
        job.run(&mut RigContext::new(&mut reporter), &mut hierarchy);
        assert!((job.result().rotation * Vec3A::X).abs_diff_eq(Vec3A::Z, 1e-5));

        job.set_item(ElementKey::bone("Tail"));
        job.run(&mut RigContext::new(&mut reporter), &mut hierarchy);
        assert_eq!(reporter.warnings, vec!["Item not found 'Bone:Tail'."]);
        assert_eq!(job.result(), Transform::IDENTITY);

        // no effect: the hand as it is
        job.set_item(ElementKey::bone("Hand"));
        job.set_weight(0.0);
        job.run(&mut RigContext::new(&mut reporter), &mut hierarchy);
        assert_eq!(job.result(), hierarchy.global_transform(1));
        assert_ne!(job.result(), Transform::IDENTITY);

        job.set_weight(1.0);
        job.run(&mut RigContext::new(&mut reporter), &mut hierarchy);
        job.run(&mut RigContext::init(&mut reporter), &mut hierarchy);
        assert_eq!(job.result(), Transform::IDENTITY);
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_init() {
        let mut hierarchy = arm();
        let mut job = AimItemJob::default();
        job.set_item(ElementKey::bone("Hand"));
        job.set_primary(
            AimTarget::new(1.0, Vec3A::X, Vec3A::ZERO, VectorKind::Location)
                .with_space(ElementKey::new("Goal", ElementKind::Control)),
        );

        let mut reporter = VecReporter::default();
        job.run(&mut RigContext::new(&mut reporter), &mut hierarchy);
        assert!(job.cached_item().is_valid());
        assert!(job.math().primary_cached_space().is_valid());

        // hand at (1, 0, 0) aims at (0, 3, 0)
        let hand = hierarchy.global_transform(1);
        let expected = Vec3A::new(-1.0, 3.0, 0.0).normalize();
        assert!((hand.rotation * Vec3A::X).abs_diff_eq(expected, 1e-5));

        let aimed = hierarchy.clone();
        job.run(&mut RigContext::init(&mut reporter), &mut hierarchy);
        assert!(reporter.warnings.is_empty());
        assert!(!job.cached_item().is_valid());
        assert!(!job.math().primary_cached_space().is_valid());
        assert_eq!(hierarchy.global_transform(1), aimed.global_transform(1));
    }

    #[test]
    #[wasm_bindgen_test]
    fn test_run_every_tick() {
        let mut hierarchy = arm();
        let mut job = AimItemJob::default();
        job.set_item(ElementKey::bone("Shoulder"));
        job.set_primary(AimTarget::new(1.0, Vec3A::X, Vec3A::Z, VectorKind::Direction));
        job.set_secondary(AimTarget::new(1.0, Vec3A::Y, Vec3A::X, VectorKind::Direction));

        let mut reporter = VecReporter::default();
        for _ in 0..3 {
            job.run(&mut RigContext::new(&mut reporter), &mut hierarchy);
        }
        assert!(reporter.warnings.is_empty());

        // converged: X along Z, Y along X, so Z along Y
        let shoulder = hierarchy.global_transform(0);
        assert!((shoulder.rotation * Vec3A::X).abs_diff_eq(Vec3A::Z, 1e-5));
        assert!((shoulder.rotation * Vec3A::Y).abs_diff_eq(Vec3A::X, 1e-5));
        assert!((shoulder.rotation * Vec3A::Z).abs_diff_eq(Vec3A::Y, 1e-5));
        assert!(hierarchy
            .global_transform(1)
            .translation
            .abs_diff_eq(Vec3A::Z, 1e-5));
    }
}
