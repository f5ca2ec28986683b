//! A small actor runtime: a state owned by one task, mutated only by
//! messages handled in the order they were sent.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod error;
mod handle;
mod mailbox;
mod scheduler;
mod timer;

pub use error::ActorDeadError;
pub use handle::Actor;
pub use mailbox::Message;
pub use timer::Timer;
