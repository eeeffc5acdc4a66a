//! Pattern compilation.
//!
//! A pattern is a template with embedded parameters:
//!
//! ```text
//! '<' name (':' regular-expression)? '>'
//! ```
//!
//! A parameter without a regular expression matches one or more characters
//! other than the separator (`[^/]+` for paths, `[^.]+` for hosts). An empty
//! name (`<>` or `<:regex>`) takes part in matching but is not extracted.
//! A name used more than once is extracted from its last occurrence only;
//! earlier occurrences still match but are not captured.
//! Templates without parameters stay literal strings and are never turned
//! into regular expressions.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::routing::error::RouteError;

static PARAMETER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<([A-Za-z0-9_]*)(:[^>]*)?>").expect("parameter grammar is a valid regex")
});

/// A compiled path or host pattern.
#[derive(Debug, Clone)]
pub enum CompiledPattern {
    /// Exact string match.
    Literal(String),
    /// Anchored regular expression with named captures.
    Regex(Regex),
}

impl CompiledPattern {
    pub fn is_literal(&self) -> bool {
        matches!(self, CompiledPattern::Literal(_))
    }

    /// Literal text or generated expression, for logs.
    pub fn as_str(&self) -> &str {
        match self {
            CompiledPattern::Literal(s) => s,
            CompiledPattern::Regex(re) => re.as_str(),
        }
    }
}

/// Compile `pattern` using `separator` for default parameter expressions.
///
/// With `optional_slash` the final character of the generated expression
/// (the pattern's trailing separator) becomes optional.
pub fn compile(
    pattern: &str,
    separator: char,
    optional_slash: bool,
) -> Result<CompiledPattern, RouteError> {
    let mut expr = String::with_capacity(pattern.len() + 32);
    expr.push('^');

    let placeholders: Vec<_> = PARAMETER.captures_iter(pattern).collect();
    if placeholders.is_empty() {
        return Ok(CompiledPattern::Literal(pattern.to_string()));
    }

    let mut last = 0;
    for (i, caps) in placeholders.iter().enumerate() {
        let Some(whole) = caps.get(0) else { continue };

        expr.push_str(&regex::escape(&pattern[last..whole.start()]));

        let name = caps.get(1).map_or("", |m| m.as_str());
        let repeated = placeholders[i + 1..]
            .iter()
            .any(|later| later.get(1).map_or("", |m| m.as_str()) == name);
        if name.is_empty() || repeated {
            expr.push_str("(?:");
        } else {
            expr.push_str("(?P<");
            expr.push_str(name);
            expr.push('>');
        }

        match caps.get(2) {
            // Skip the leading ':'.
            Some(re) => expr.push_str(&re.as_str()[1..]),
            None => {
                expr.push_str("[^");
                expr.push_str(&regex::escape(separator.encode_utf8(&mut [0; 4])));
                expr.push_str("]+");
            }
        }
        expr.push(')');
        last = whole.end();
    }

    expr.push_str(&regex::escape(&pattern[last..]));
    if optional_slash {
        expr.push('?');
    }
    expr.push('$');

    Regex::new(&expr)
        .map(CompiledPattern::Regex)
        .map_err(|source| RouteError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regex_of(pattern: &str, sep: char, slash: bool) -> Regex {
        match compile(pattern, sep, slash).unwrap() {
            CompiledPattern::Regex(re) => re,
            CompiledPattern::Literal(s) => panic!("{} compiled to literal {}", pattern, s),
        }
    }

    #[test]
    fn test_literal_patterns_are_not_compiled() {
        let compiled = compile("/a/b.c", '/', false).unwrap();
        assert!(compiled.is_literal());
        assert_eq!(compiled.as_str(), "/a/b.c");
    }

    #[test]
    fn test_default_parameter_excludes_separator() {
        let re = regex_of("/f/<x>", '/', false);
        assert_eq!(re.as_str(), "^/f/(?P<x>[^/]+)$");
        assert!(re.is_match("/f/foo"));
        assert!(!re.is_match("/f/foo/bar"));
        assert!(!re.is_match("/f/"));

        let re = regex_of("<x>.example.com", '.', false);
        assert!(re.is_match("foo.example.com"));
        assert!(!re.is_match("a.b.example.com"));
    }

    #[test]
    fn test_explicit_regex_and_unnamed_group() {
        let re = regex_of("/h/<x:[0-9]+>", '/', false);
        assert!(re.is_match("/h/99"));
        assert!(!re.is_match("/h/foo"));

        let re = regex_of("/<:.*>", '/', false);
        assert_eq!(re.as_str(), "^/(?:.*)$");
        assert_eq!(re.captures_len(), 1);
    }

    #[test]
    fn test_literal_text_is_escaped() {
        let re = regex_of("/a.b/<x>", '/', false);
        assert!(re.is_match("/a.b/1"));
        assert!(!re.is_match("/aXb/1"));
    }

    #[test]
    fn test_optional_trailing_slash() {
        let re = regex_of("/g/<x>/<y>/", '/', true);
        assert!(re.is_match("/g/foo/bar/"));
        assert!(re.is_match("/g/foo/bar"));
        assert!(!re.is_match("/g/foo/bar/baz"));
    }

    #[test]
    fn test_matches_are_anchored() {
        let re = regex_of("/kk/<x>", '/', false);
        assert!(!re.is_match("/prefix/kk/foo"));
        assert!(!re.is_match("/kk/foo/suffix"));
    }

    #[test]
    fn test_malformed_regex_is_rejected() {
        let err = compile("/h/<x:[0-9>", '/', false).unwrap_err();
        assert!(matches!(err, RouteError::InvalidRegex { .. }));
    }

    #[test]
    fn test_repeated_name_captures_last_occurrence() {
        let re = regex_of("/a/<x>/b/<x:[0-9]+>", '/', false);
        assert_eq!(re.as_str(), "^/a/(?:[^/]+)/b/(?P<x>[0-9]+)$");
        let caps = re.captures("/a/one/b/2").unwrap();
        assert_eq!(&caps["x"], "2");
        assert!(!re.is_match("/a/one/b/two"));
    }
}
