use std::error::Error;
use std::fmt;

/// Returned when a message is sent to an actor whose loop has already
/// stopped.
pub struct ActorDeadError;

impl fmt::Debug for ActorDeadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorDeadError").finish()
    }
}

impl fmt::Display for ActorDeadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        "the actor is no longer running".fmt(f)
    }
}

impl Error for ActorDeadError {}
