//! Behave Testing
//!
//! Runtime support linked into generated behavior tests.
//! Provides the request handle a generated client hands out, a send hook
//! that substitutes a synthetic response for real transport, an isolated
//! environment overlay for session construction, and the assertion
//! predicates that inspect the result.

pub mod env;
pub mod error;
pub mod predicates;
pub mod report;
pub mod request;
pub mod xml;

pub use env::{Credentials, EnvOverlay, Session};
pub use error::SendError;
pub use predicates::*;
pub use report::Report;
pub use request::{respond_with, Body, Headers, HttpResponse, OutputSlot, Request, SendHook};
