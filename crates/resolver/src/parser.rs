//! Placeholder tokenizer for `${...}` reference syntax
//!
//! Splits raw strings into literal and reference tokens with
//! brace-depth matching, so references may nest.

use refract_domain::{ResolveError, ResolveResult};

/// One token of a scanned string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text between references.
    Literal(String),
    /// A `${...}` reference.
    Reference {
        /// Inner expression text, between the braces.
        expr: String,
        /// True when the reference spans the entire string.
        full: bool,
    },
}

/// Splits a string into literal and reference tokens.
///
/// A reference that starts at offset 0 and whose matching `}` is the
/// last character (optionally followed by a single trailing `$`) is a
/// *full* reference; it supersedes any partial reading of the same
/// string and is returned as the only token. The inner expression may
/// itself contain further `${...}` spans; the engine, not the
/// tokenizer, recurses into them.
///
/// # Errors
///
/// Returns [`ResolveError::MalformedReference`] when a `${` is never
/// closed.
pub fn tokenize(input: &str) -> ResolveResult<Vec<Token>> {
    let bytes = input.as_bytes();
    let n = bytes.len();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < n {
        if bytes[i] == b'$' && bytes.get(i + 1) == Some(&b'{') {
            let mut depth = 1_usize;
            let mut j = i + 2;
            while j < n && depth > 0 {
                if bytes[j] == b'$' && bytes.get(j + 1) == Some(&b'{') {
                    depth += 1;
                    j += 2;
                } else if bytes[j] == b'}' {
                    depth -= 1;
                    j += 1;
                } else {
                    j += 1;
                }
            }
            if depth != 0 {
                return Err(ResolveError::MalformedReference(input.to_string()));
            }

            let expr = input[i + 2..j - 1].to_string();
            let spans_whole = i == 0 && (j == n || (j == n - 1 && bytes[n - 1] == b'$'));
            if spans_whole {
                return Ok(vec![Token::Reference { expr, full: true }]);
            }

            tokens.push(Token::Reference { expr, full: false });
            i = j;
        } else {
            let start = i;
            while i < n && !(bytes[i] == b'$' && bytes.get(i + 1) == Some(&b'{')) {
                i += 1;
            }
            tokens.push(Token::Literal(input[start..i].to_string()));
        }
    }

    Ok(tokens)
}

/// Splits a reference expression into its path and optional default
/// clause at the first `:` outside any nested `${...}` span.
#[must_use]
pub fn split_expr(expr: &str) -> (&str, Option<&str>) {
    let bytes = expr.as_bytes();
    let mut depth = 0_usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                depth += 1;
                i += 2;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                i += 1;
            }
            b':' if depth == 0 => return (&expr[..i], Some(&expr[i + 1..])),
            _ => i += 1,
        }
    }

    (expr, None)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_references() {
        let tokens = tokenize("hello world").unwrap();
        assert_eq!(tokens, vec![Token::Literal("hello world".to_string())]);
    }

    #[test]
    fn test_empty_string() {
        assert!(tokenize("").unwrap().is_empty());
    }

    #[test]
    fn test_full_reference_with_trailing_dollar() {
        let tokens = tokenize("${a.b}$").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Reference {
                expr: "a.b".to_string(),
                full: true,
            }]
        );
    }

    #[test]
    fn test_full_reference_without_trailing_dollar() {
        let tokens = tokenize("${a.b}").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Reference {
                expr: "a.b".to_string(),
                full: true,
            }]
        );
    }

    #[test]
    fn test_partial_reference_in_text() {
        let tokens = tokenize("x=${a}").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Literal("x=".to_string()),
                Token::Reference {
                    expr: "a".to_string(),
                    full: false,
                },
            ]
        );
    }

    #[test]
    fn test_trailing_literal_demotes_to_partial() {
        let tokens = tokenize("${a}bad").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Reference {
                    expr: "a".to_string(),
                    full: false,
                },
                Token::Literal("bad".to_string()),
            ]
        );
    }

    #[test]
    fn test_adjacent_references() {
        let tokens = tokenize("${a}${b}").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Reference {
                    expr: "a".to_string(),
                    full: false,
                },
                Token::Reference {
                    expr: "b".to_string(),
                    full: false,
                },
            ]
        );
    }

    #[test]
    fn test_nested_reference_is_one_token() {
        let tokens = tokenize("${${indirect}}$").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Reference {
                expr: "${indirect}".to_string(),
                full: true,
            }]
        );
    }

    #[test]
    fn test_nested_reference_in_default() {
        let tokens = tokenize("${b:${c}}").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Reference {
                expr: "b:${c}".to_string(),
                full: true,
            }]
        );
    }

    #[test]
    fn test_unmatched_braces() {
        let err = tokenize("${never closed").unwrap_err();
        assert_eq!(
            err,
            ResolveError::MalformedReference("${never closed".to_string())
        );
    }

    #[test]
    fn test_unmatched_nested_braces() {
        assert!(tokenize("x ${a ${b}").is_err());
    }

    #[test]
    fn test_lone_dollar_is_literal() {
        let tokens = tokenize("cost: 5$").unwrap();
        assert_eq!(tokens, vec![Token::Literal("cost: 5$".to_string())]);
    }

    #[test]
    fn test_multibyte_text_around_reference() {
        let tokens = tokenize("héllo ${a} wörld").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Literal("héllo ".to_string()),
                Token::Reference {
                    expr: "a".to_string(),
                    full: false,
                },
                Token::Literal(" wörld".to_string()),
            ]
        );
    }

    #[test]
    fn test_split_expr_no_default() {
        assert_eq!(split_expr("a.b"), ("a.b", None));
    }

    #[test]
    fn test_split_expr_with_default() {
        assert_eq!(split_expr("a.b:fallback"), ("a.b", Some("fallback")));
    }

    #[test]
    fn test_split_expr_default_keeps_later_colons() {
        assert_eq!(split_expr("url:http://x"), ("url", Some("http://x")));
    }

    #[test]
    fn test_split_expr_colon_inside_placeholder() {
        assert_eq!(split_expr("${a:b}.c"), ("${a:b}.c", None));
    }

    #[test]
    fn test_split_expr_nested_default() {
        assert_eq!(split_expr("b:${c:d}"), ("b", Some("${c:d}")));
    }

    #[test]
    fn test_split_expr_empty_default() {
        assert_eq!(split_expr("a:"), ("a", Some("")));
    }
}
