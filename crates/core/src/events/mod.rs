//! Environment events module.
//!
//! The switch coordinator emits these after terminal transitions. Consumers
//! subscribe through a sink instead of being handed to the coordinator as
//! callbacks.

mod environment_event;
mod sink;

pub use environment_event::*;
pub use sink::*;
