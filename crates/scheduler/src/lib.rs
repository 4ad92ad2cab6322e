//! Mutation scheduler: debounces change notices, drives polling episodes of
//! the convergence detector, and serves the control channel.

pub mod api;
pub mod control;
pub mod error;
pub mod events;
pub mod metrics;
pub mod model;
pub mod runtime;

pub use api::{Observer, ObserverHandle};
pub use control::{ControlRequest, ControlResponse};
pub use error::SchedulerError;
pub use events::ObserverEvent;
pub use model::{ObserverOptions, ObserverTimings, SchedulerPhase, SchedulerState};
pub use runtime::ObserverStatus;
