//!
//! Execution context of rig jobs: evaluation state, warning and debug draw sinks.
//!

use glam::{Vec3A, Vec4};

use crate::math::Transform;

/// Evaluation state of a rig job.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RigState {
    /// Re-initialization event, jobs drop their cached handles and do nothing else.
    Init,
    /// Regular evaluation tick.
    #[default]
    Update,
}

/// Receives diagnostics of rig jobs. Reporting never interrupts a job.
pub trait Reporter {
    fn report_warning(&mut self, message: &str);
}

/// Forwards warnings to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    #[inline]
    fn report_warning(&mut self, message: &str) {
        log::warn!("{}", message);
    }
}

/// Records warnings in memory.
#[derive(Debug, Default, Clone)]
pub struct VecReporter {
    pub warnings: Vec<String>,
}

impl Reporter for VecReporter {
    #[inline]
    fn report_warning(&mut self, message: &str) {
        log::debug!("recorded warning: {}", message);
        self.warnings.push(message.to_string());
    }
}

/// Receives debug draw requests. Points are in world space, `offset` is applied on top of them.
pub trait DrawInterface {
    fn draw_line(&mut self, offset: &Transform, from: Vec3A, to: Vec3A, color: Vec4);
    fn draw_box(&mut self, offset: &Transform, transform: &Transform, color: Vec4);
}

/// A recorded debug draw request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawRequest {
    Line {
        offset: Transform,
        from: Vec3A,
        to: Vec3A,
        color: Vec4,
    },
    Box {
        offset: Transform,
        transform: Transform,
        color: Vec4,
    },
}

/// Records debug draw requests in memory.
#[derive(Debug, Default, Clone)]
pub struct VecDrawInterface {
    pub requests: Vec<DrawRequest>,
}

impl DrawInterface for VecDrawInterface {
    fn draw_line(&mut self, offset: &Transform, from: Vec3A, to: Vec3A, color: Vec4) {
        self.requests.push(DrawRequest::Line {
            offset: *offset,
            from,
            to,
            color,
        });
    }

    fn draw_box(&mut self, offset: &Transform, transform: &Transform, color: Vec4) {
        self.requests.push(DrawRequest::Box {
            offset: *offset,
            transform: *transform,
            color,
        });
    }
}

///
/// Per-run context handed to rig jobs.
///
/// The context borrows its sinks, so a fresh one can be built for every tick.
/// Without a draw interface, debug drawing is skipped.
///
pub struct RigContext<'t> {
    pub state: RigState,
    pub reporter: &'t mut dyn Reporter,
    pub draw: Option<&'t mut dyn DrawInterface>,
}

impl<'t> RigContext<'t> {
    /// Creates an `Update` context without debug drawing.
    #[inline]
    pub fn new(reporter: &'t mut dyn Reporter) -> RigContext<'t> {
        return RigContext {
            state: RigState::Update,
            reporter,
            draw: None,
        };
    }

    /// Creates an `Init` context.
    #[inline]
    pub fn init(reporter: &'t mut dyn Reporter) -> RigContext<'t> {
        return RigContext {
            state: RigState::Init,
            reporter,
            draw: None,
        };
    }

    #[inline]
    pub fn with_draw(mut self, draw: &'t mut dyn DrawInterface) -> RigContext<'t> {
        self.draw = Some(draw);
        return self;
    }

    #[inline]
    pub fn is_init(&self) -> bool {
        return self.state == RigState::Init;
    }

    #[inline]
    pub fn report_warning(&mut self, message: &str) {
        self.reporter.report_warning(message);
    }
}

impl std::fmt::Debug for RigContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return f
            .debug_struct("RigContext")
            .field("state", &self.state)
            .field("draw", &self.draw.is_some())
            .finish();
    }
}
