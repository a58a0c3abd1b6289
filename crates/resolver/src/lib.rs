//! Refract Resolver - reference resolution for nested documents
//!
//! Resolves `${path}` placeholders (and the whole-string `${path}$`
//! variant) embedded anywhere inside a nested document, substituting
//! each placeholder with the value found by following `path` through
//! the same document. Supports `${path:default}` fallbacks, detects
//! circular reference chains, and can run multiple passes so values
//! produced by one pass can be referenced by a later one.
//!
//! # Example
//!
//! ```
//! use refract_resolver::{Value, resolve};
//! use serde_json::json;
//!
//! let doc = Value::from(json!({
//!     "host": "localhost",
//!     "port": 8080,
//!     "url": "http://${host}:${port}",
//!     "primary_port": "${port}$",
//! }));
//!
//! let resolved = resolve(doc).unwrap();
//! assert_eq!(
//!     resolved.get_path("url").and_then(|v| v.as_str()),
//!     Some("http://localhost:8080"),
//! );
//! // Full references preserve the native type.
//! assert_eq!(resolved.get_path("primary_port").and_then(|v| v.as_i64()), Some(8080));
//! ```

pub mod cache;
pub mod coerce;
mod engine;
pub mod parser;

use indexmap::IndexMap;
use tracing::debug;

pub use refract_domain::{
    ResolutionReport, ResolveError, ResolveResult, UnresolvedNode, UnresolvedRef, Value, ValuePath,
};

use crate::cache::ResolutionCache;
use crate::engine::Engine;

/// Depth at which resolution gives up with [`ResolveError::TooDeep`]
/// instead of exhausting the call stack.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Multi-pass resolution driver.
///
/// Owns the document for the duration of the run, so a failed run
/// never leaves caller-visible state half-resolved. Each run owns its
/// own cache; independent runs are safe to execute concurrently.
///
/// # Example
///
/// ```
/// use refract_resolver::{Resolver, Value};
/// use serde_json::json;
///
/// let doc = Value::from(json!({"greeting": "hello ${name:world}"}));
/// let resolved = Resolver::new(doc).run().unwrap();
/// assert_eq!(
///     resolved.get_path("greeting").and_then(|v| v.as_str()),
///     Some("hello world"),
/// );
/// ```
#[derive(Debug)]
pub struct Resolver {
    root: Value,
    partial: bool,
    iterations: usize,
    max_depth: usize,
    overrides: IndexMap<String, Value>,
}

impl Resolver {
    /// Creates a strict single-pass resolver for the given document.
    #[must_use]
    pub fn new(root: Value) -> Self {
        Self {
            root,
            partial: false,
            iterations: 1,
            max_depth: DEFAULT_MAX_DEPTH,
            overrides: IndexMap::new(),
        }
    }

    /// Sets partial mode. When partial, unresolved placeholders are
    /// left as literal text instead of failing the run.
    #[must_use]
    pub const fn partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }

    /// Sets the number of passes (minimum 1). Every pass before the
    /// last behaves permissively; strictness only applies after the
    /// final pass.
    #[must_use]
    pub const fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = if iterations == 0 { 1 } else { iterations };
        self
    }

    /// Sets the maximum recursion depth guard.
    #[must_use]
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Applies a dot-path override onto the document before the first
    /// pass.
    #[must_use]
    pub fn override_path(mut self, path: impl Into<String>, value: Value) -> Self {
        self.overrides.insert(path.into(), value);
        self
    }

    /// Applies a batch of dot-path overrides before the first pass.
    #[must_use]
    pub fn with_overrides(mut self, overrides: IndexMap<String, Value>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    /// Runs the configured passes and returns the resolved document.
    ///
    /// # Errors
    ///
    /// Fails on malformed references, genuine cycles without defaults,
    /// key collisions, the depth guard, or — unless in partial mode —
    /// any reference left unresolved after the final pass.
    pub fn run(self) -> ResolveResult<Value> {
        self.run_with_report().map(|(value, _)| value)
    }

    /// Runs the configured passes and returns the resolved document
    /// together with the final pass's unresolved-reference report.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Resolver::run`].
    pub fn run_with_report(mut self) -> ResolveResult<(Value, ResolutionReport)> {
        for (path, value) in std::mem::take(&mut self.overrides) {
            self.root.set_path(&path, value)?;
        }

        let mut cache = ResolutionCache::new();
        let mut current = self.root;
        let mut report = ResolutionReport::new(String::new());

        for pass in 0..self.iterations {
            debug!(pass, "resolution pass");
            cache.clear();
            let (next, pass_report) =
                Engine::new(&current, &mut cache, self.max_depth).resolve_root()?;
            current = next;
            report = pass_report;
        }

        if !self.partial && !report.is_clean() {
            return Err(ResolveError::UnresolvedReferences {
                paths: report.unresolved_paths(),
            });
        }
        Ok((current, report))
    }
}

/// Strict single-pass resolution; fails on any unresolved reference.
///
/// # Errors
///
/// See [`Resolver::run`].
pub fn resolve(value: Value) -> ResolveResult<Value> {
    Resolver::new(value).run()
}

/// Single permissive pass; unresolved placeholders stay as literal
/// text and never fail the run.
///
/// # Errors
///
/// Still fails on malformed references, cycles without defaults, key
/// collisions, and the depth guard.
pub fn resolve_partial(value: Value) -> ResolveResult<Value> {
    Resolver::new(value).partial(true).run()
}

/// Runs permissive passes `iterations` times, feeding each pass's
/// output into the next, so values produced by one pass can be
/// referenced by a later one.
///
/// # Errors
///
/// See [`resolve_partial`].
pub fn resolve_iterative(value: Value, iterations: usize) -> ResolveResult<Value> {
    Resolver::new(value).partial(true).iterations(iterations).run()
}
