//! # Gantry Core
//!
//! Core types for the Gantry request-pipeline framework:
//!
//! - [`RequestContext`] - the per-request aggregate threaded through every
//!   pipeline step
//! - [`RequestId`] - UUID v7 request identifier
//! - [`Principal`] - the caller's identity state (flags + claims)
//! - [`GantryError`] - standard error taxonomy with status mapping
//! - [`Problem`] - RFC 7807 problem-details response bodies
//! - [`di::Container`] - the explicit service registry consumed by the
//!   pipeline builder

#![doc(html_root_url = "https://docs.rs/gantry-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
pub mod di;
mod error;
mod identity;
mod problem;

pub use context::{RequestContext, RequestId};
pub use error::{ErrorCategory, GantryError, GantryResult};
pub use identity::Principal;
pub use problem::Problem;
