//! Game runtime: sessions that pace automated turns, and a scheduler for batches.

pub mod scheduler;
pub mod session;

pub use scheduler::{Scheduler, SchedulerStats};
pub use session::{
    AiAction, CancelToken, ExecutedAction, Pending, Session, SessionError, StepResult, StepStatus,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
