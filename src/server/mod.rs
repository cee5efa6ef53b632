//! HTTP server
//!
//! [`ServerBuilder`] registers every resource kind in a [`ResourceRegistry`]
//! and assembles the router:
//! - `/api` index and per-kind routes
//! - JSON errors for unknown API paths and unsupported methods
//! - the static client at `/`

pub mod builder;
pub mod fallback;
pub mod login;
pub mod registry;
pub mod rest;
pub mod time;
pub mod user;

pub use builder::ServerBuilder;
pub use registry::{ResourceDescriptor, ResourceRegistry};
pub use rest::RestDescriptor;
