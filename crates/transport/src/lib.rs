//! The boundary between the chat client and the answering service.
//!
//! This crate describes what goes over the wire and how failures are
//! classified, without prescribing how the bytes travel. Implementors
//! (an HTTP client, a scripted fake for tests) live in their own crates
//! and only have to honor the [`Transport`] contract.

#![deny(missing_docs)]

mod error;
mod request;
mod response;
mod transport;

pub use error::*;
pub use request::*;
pub use response::*;
pub use transport::*;
