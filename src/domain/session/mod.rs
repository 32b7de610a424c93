//! Session lifecycle and control state

pub mod controls;
pub mod lifecycle;

pub use controls::ControlState;
pub use lifecycle::{InvalidStateTransition, SessionLifecycle, SessionState};
