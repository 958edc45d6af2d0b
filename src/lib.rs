mod aim_bone_job;
mod aim_item_job;
mod aim_math_job;
mod base;
mod cache;
mod context;
mod hierarchy;

pub mod math;
pub mod test_utils;

pub use aim_bone_job::{AimBoneJob, AimBoneTarget};
pub use aim_item_job::AimItemJob;
pub use aim_math_job::{AimDebugSettings, AimMathJob, AimTarget, VectorKind};
pub use base::*;
pub use cache::CachedElement;
pub use context::{
    DrawInterface, DrawRequest, LogReporter, Reporter, RigContext, RigState, VecDrawInterface, VecReporter,
};
pub use hierarchy::{ElementKey, ElementKind, RigHierarchy, RigHierarchyAccess};
pub use math::{quat_between_normals, Transform};
