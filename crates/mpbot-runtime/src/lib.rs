//! Runtime glue for the mpbot dispatch engine.
//!
//! Owns the handler invocation boundary (the only place collaborator I/O
//! happens) and the built-in feature handlers registered into the default
//! dispatch tree at startup.

pub mod runtime_features;
pub mod runtime_invoke;

pub use runtime_features::*;
pub use runtime_invoke::*;
