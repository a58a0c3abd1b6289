//! Deep resolution engine
//!
//! Rebuilds a document tree, substituting `${...}` references through
//! the per-pass cache, and records every reference that could not be
//! resolved.

use indexmap::IndexMap;
use tracing::trace;

use refract_domain::{
    ResolutionReport, ResolveError, ResolveResult, Value, ValuePath, split_path,
};

use crate::cache::{RefState, ResolutionCache};
use crate::coerce::coerce_literal;
use crate::parser::{Token, split_expr, tokenize};

/// Outcome of resolving one reference expression.
enum RefOutcome {
    /// The reference resolved to a concrete value.
    Value(Value),
    /// The reference could not be resolved; the caller keeps the
    /// literal text and records it.
    Unset,
}

/// One pass of resolution over a single document.
///
/// Borrows the pass input immutably for lookups and the cache mutably;
/// the output tree is built fresh, so a failed pass never leaves the
/// input half-modified.
pub(crate) struct Engine<'a> {
    root: &'a Value,
    cache: &'a mut ResolutionCache,
    max_depth: usize,
    /// Count of cycle breaks taken so far. A reference whose value was
    /// computed across a cycle break is call-site-specific and must
    /// not be memoized.
    cycle_breaks: usize,
}

impl<'a> Engine<'a> {
    pub(crate) fn new(root: &'a Value, cache: &'a mut ResolutionCache, max_depth: usize) -> Self {
        Self {
            root,
            cache,
            max_depth,
            cycle_breaks: 0,
        }
    }

    /// Resolves the whole pass input.
    pub(crate) fn resolve_root(&mut self) -> ResolveResult<(Value, ResolutionReport)> {
        let root = self.root;
        self.deep_resolve(root, &ValuePath::root(), 0)
    }

    /// Recursively rebuilds `node`, resolving strings, map keys, and
    /// sequence elements.
    fn deep_resolve(
        &mut self,
        node: &Value,
        path: &ValuePath,
        depth: usize,
    ) -> ResolveResult<(Value, ResolutionReport)> {
        if depth > self.max_depth {
            return Err(ResolveError::TooDeep {
                path: path.to_string(),
            });
        }

        match node {
            Value::String(text) => self.resolve_string(text, path, depth),
            Value::Array(items) => {
                let mut report = ResolutionReport::new(path.to_string());
                let mut resolved = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let child_path = path.child(index.to_string());
                    let (value, child_report) = self.deep_resolve(item, &child_path, depth + 1)?;
                    resolved.push(value);
                    report.push_child(index.to_string(), child_report);
                }
                Ok((Value::Array(resolved), report))
            }
            Value::Map(entries) => {
                let mut report = ResolutionReport::new(path.to_string());
                let mut resolved = IndexMap::with_capacity(entries.len());
                for (key, value) in entries {
                    // Keys are strings and may carry references themselves.
                    let key_path = path.child("<k>").child(key.clone());
                    let (key_value, key_report) = self.resolve_string(key, &key_path, depth + 1)?;
                    report.push_child(format!("<k>/{key}"), key_report);

                    if !key_value.is_scalar() {
                        return Err(ResolveError::NonScalarKey {
                            path: key_path.to_string(),
                            kind: key_value.kind(),
                        });
                    }
                    let new_key = key_value.to_text();
                    if resolved.contains_key(&new_key) {
                        return Err(ResolveError::DuplicateKey(new_key));
                    }

                    let value_path = path.child(new_key.clone());
                    let (new_value, value_report) =
                        self.deep_resolve(value, &value_path, depth + 1)?;
                    report.push_child(new_key.clone(), value_report);
                    resolved.insert(new_key, new_value);
                }
                Ok((Value::Map(resolved), report))
            }
            scalar => Ok((scalar.clone(), ResolutionReport::new(path.to_string()))),
        }
    }

    /// Resolves the references inside one string.
    ///
    /// A full reference returns the looked-up value verbatim, type
    /// preserved; partial references are stringified and concatenated
    /// with the surrounding literal text.
    fn resolve_string(
        &mut self,
        input: &str,
        path: &ValuePath,
        depth: usize,
    ) -> ResolveResult<(Value, ResolutionReport)> {
        if depth > self.max_depth {
            return Err(ResolveError::TooDeep {
                path: path.to_string(),
            });
        }

        let mut report = ResolutionReport::new(path.to_string());
        let tokens = tokenize(input)?;

        if let [Token::Reference { expr, full: true }] = tokens.as_slice() {
            return match self.resolve_reference(expr, &path.child("$"), depth + 1)? {
                RefOutcome::Value(value) => Ok((value, report)),
                RefOutcome::Unset => {
                    report.push_leaf(expr.clone());
                    Ok((Value::String(input.to_string()), report))
                }
            };
        }

        let mut assembled = String::with_capacity(input.len());
        for token in &tokens {
            match token {
                Token::Literal(text) => assembled.push_str(text),
                Token::Reference { expr, .. } => {
                    match self.resolve_reference(expr, &path.child("$"), depth + 1)? {
                        RefOutcome::Value(value) => assembled.push_str(&value.to_text()),
                        RefOutcome::Unset => {
                            // Left as written so a later pass can retry.
                            report.push_leaf(expr.clone());
                            assembled.push_str("${");
                            assembled.push_str(expr);
                            assembled.push('}');
                        }
                    }
                }
            }
        }
        Ok((Value::String(assembled), report))
    }

    /// Resolves one reference expression through the cache.
    fn resolve_reference(
        &mut self,
        expr: &str,
        path: &ValuePath,
        depth: usize,
    ) -> ResolveResult<RefOutcome> {
        if depth > self.max_depth {
            return Err(ResolveError::TooDeep {
                path: path.to_string(),
            });
        }

        let (path_text, default_text) = split_expr(expr);

        // The path itself may contain references (`${${indirect}}$`);
        // its fully resolved text form is the cache key.
        let key = if path_text.contains("${") {
            let (resolved, _) = self.resolve_string(path_text, path, depth + 1)?;
            resolved.to_text()
        } else {
            path_text.to_string()
        };

        match self.cache.get(&key) {
            Some(RefState::Resolved(value)) => {
                trace!(reference = %key, "cache hit");
                return Ok(RefOutcome::Value(value.clone()));
            }
            Some(RefState::Resolving) => {
                trace!(reference = %key, "cycle detected");
                return match default_text {
                    Some(default) => {
                        // The default breaks the cycle at this call site
                        // only; it is never cached under the key.
                        self.cycle_breaks += 1;
                        self.resolve_default(default, path, depth)
                    }
                    None => Err(ResolveError::CircularReference(key)),
                };
            }
            Some(RefState::Unresolved) => {
                return match default_text {
                    Some(default) => self.resolve_default(default, path, depth),
                    None => Ok(RefOutcome::Unset),
                };
            }
            None => {}
        }

        self.cache.mark_resolving(&key);
        let breaks_before = self.cycle_breaks;

        let looked_up = match self.walk_path(&key, path, depth) {
            Ok(Some(found)) => self
                .deep_resolve(&found, path, depth + 1)
                .map(|(value, _)| Some(value)),
            other => other,
        };

        match looked_up {
            Ok(Some(value)) => {
                if self.cycle_breaks == breaks_before {
                    self.cache.store_resolved(&key, value.clone());
                } else {
                    // Computed across a cycle break: valid here, but
                    // another call site may break the same cycle with a
                    // different default.
                    self.cache.remove(&key);
                }
                Ok(RefOutcome::Value(value))
            }
            Ok(None) => {
                trace!(reference = %key, "path not found");
                self.cache.mark_unresolved(&key);
                match default_text {
                    Some(default) => self.resolve_default(default, path, depth),
                    None => Ok(RefOutcome::Unset),
                }
            }
            Err(ResolveError::CircularReference(inner)) => match default_text {
                Some(default) => {
                    self.cache.remove(&key);
                    self.cycle_breaks += 1;
                    self.resolve_default(default, path, depth)
                }
                None => Err(ResolveError::CircularReference(inner)),
            },
            Err(err) => Err(err),
        }
    }

    /// Walks the pass input along a dot-separated reference path.
    ///
    /// Returns `Ok(None)` when a segment cannot be located.
    fn walk_path(
        &mut self,
        reference: &str,
        path: &ValuePath,
        depth: usize,
    ) -> ResolveResult<Option<Value>> {
        let mut current = self.root.clone();
        let mut walked = path.clone();
        for segment in split_path(reference) {
            walked = walked.child(segment);
            let next = match &current {
                Value::Map(entries) => entries.get(segment).cloned(),
                Value::Array(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index).cloned()),
                _ => None,
            };
            let Some(next) = next else {
                return Ok(None);
            };
            current = self.chase_full_refs(next, &walked, depth)?;
        }
        Ok(Some(current))
    }

    /// While the reached node is a string that is itself a full
    /// reference, resolve it through the cache so the walk passes
    /// through indirection layers with cycle protection intact.
    fn chase_full_refs(
        &mut self,
        mut current: Value,
        path: &ValuePath,
        depth: usize,
    ) -> ResolveResult<Value> {
        for _ in 0..=self.max_depth {
            let Value::String(text) = &current else {
                return Ok(current);
            };
            let tokens = tokenize(text)?;
            let [Token::Reference { expr, full: true }] = tokens.as_slice() else {
                return Ok(current);
            };
            match self.resolve_reference(expr, &path.child("$"), depth + 1)? {
                RefOutcome::Value(value) => current = value,
                RefOutcome::Unset => return Ok(current),
            }
        }
        Err(ResolveError::TooDeep {
            path: path.to_string(),
        })
    }

    /// Resolves a default clause. The clause may itself contain
    /// references; only a textual outcome is coerced.
    fn resolve_default(
        &mut self,
        default: &str,
        path: &ValuePath,
        depth: usize,
    ) -> ResolveResult<RefOutcome> {
        let (value, _) = self.resolve_string(default, path, depth + 1)?;
        let coerced = match value {
            Value::String(text) => coerce_literal(&text),
            typed => typed,
        };
        Ok(RefOutcome::Value(coerced))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn run(doc: serde_json::Value) -> ResolveResult<(Value, ResolutionReport)> {
        let root = Value::from(doc);
        let mut cache = ResolutionCache::new();
        Engine::new(&root, &mut cache, 128).resolve_root()
    }

    #[test]
    fn test_scalars_pass_through() {
        let (value, report) = run(json!({"a": 1, "b": true, "c": null})).unwrap();
        assert_eq!(value, Value::from(json!({"a": 1, "b": true, "c": null})));
        assert!(report.is_clean());
    }

    #[test]
    fn test_full_reference_preserves_type() {
        let (value, _) = run(json!({"a": 5, "b": "${a}$"})).unwrap();
        assert_eq!(value.get_path("b"), Some(&Value::Int(5)));
    }

    #[test]
    fn test_reference_is_memoized() {
        let root = Value::from(json!({"a": 7, "b": "${a}$", "c": "${a}$"}));
        let mut cache = ResolutionCache::new();
        let mut engine = Engine::new(&root, &mut cache, 128);
        engine.resolve_root().unwrap();
        assert_eq!(cache.get("a"), Some(&RefState::Resolved(Value::Int(7))));
    }

    #[test]
    fn test_unresolved_reference_recorded() {
        let (value, report) = run(json!({"a": "${nope}$"})).unwrap();
        assert_eq!(value.get_path("a"), Some(&Value::from("${nope}$")));
        assert_eq!(report.unresolved_paths(), vec!["nope"]);
    }

    #[test]
    fn test_direct_cycle_fails() {
        let err = run(json!({"a": "${a}$"})).unwrap_err();
        assert_eq!(err, ResolveError::CircularReference("a".to_string()));
    }

    #[test]
    fn test_non_scalar_key_rejected() {
        let err = run(json!({"${m}": 1, "m": {"z": 1}})).unwrap_err();
        assert!(matches!(err, ResolveError::NonScalarKey { kind: "map", .. }));
    }

    #[test]
    fn test_duplicate_resolved_key_rejected() {
        let err = run(json!({"a${x}": 1, "a1": 2, "x": 1})).unwrap_err();
        assert_eq!(err, ResolveError::DuplicateKey("a1".to_string()));
    }

    #[test]
    fn test_depth_guard() {
        let root = Value::from(json!([[[[["x"]]]]]));
        let mut cache = ResolutionCache::new();
        let err = Engine::new(&root, &mut cache, 3)
            .resolve_root()
            .unwrap_err();
        assert!(matches!(err, ResolveError::TooDeep { .. }));
    }
}
