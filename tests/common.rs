#![allow(unused_imports)]
#![allow(dead_code)]

use aim_rig_rs::{RigContext, RigHierarchy, VecReporter};
use glam::Vec3A;

pub const CHAIN: &[&str] = &["Spine1", "Spine2", "Spine3", "Head"];

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn spine() -> RigHierarchy {
    return aim_rig_rs::test_utils::build_chain(CHAIN, Vec3A::Y).unwrap();
}

/// Global transforms of all elements, to compare whole poses.
pub fn pose(hierarchy: &RigHierarchy) -> Vec<aim_rig_rs::Transform> {
    return (0..hierarchy.num_elements())
        .map(|idx| hierarchy.global_transform(idx))
        .collect();
}

pub fn update<'t>(reporter: &'t mut VecReporter) -> RigContext<'t> {
    return RigContext::new(reporter);
}
