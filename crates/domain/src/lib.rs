//! Refract Domain - value model and resolution types
//!
//! This crate defines the data types for the Refract reference
//! resolver. All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod path;
pub mod report;
pub mod value;

pub use error::{ResolveError, ResolveResult};
pub use path::{ValuePath, split_path};
pub use report::{ResolutionReport, UnresolvedNode, UnresolvedRef};
pub use value::Value;
