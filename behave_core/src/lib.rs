//! Behave Core
//!
//! Data model and loaders for behavior test suites.
//! A suite describes operations to invoke against an API client, the
//! simulated responses they receive, and the wire-level properties the
//! resulting request and response must have. This crate also carries the
//! API model (operations and shapes) suites are resolved against.

pub mod assertion;
pub mod error;
pub mod loader;
pub mod model;
pub mod types;

pub use assertion::{ArgumentForm, Artifact, AssertionKind, UnknownAssertionKind};
pub use error::{CoreError, Result};
pub use loader::SuiteLoader;
pub use model::{ApiModel, Operation, Shape, ShapeRef};
pub use types::{BehaviorSuite, Case, Expectation, SimulatedResponse};
