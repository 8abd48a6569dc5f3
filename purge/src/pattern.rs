//! Single-token glob matching used for bulk key invalidation.
//!
//! `*` matches any substring, including the empty string and `/` separators.
//! A pattern without `*` only matches itself.

/// Returns true when `candidate` matches `pattern`
pub fn glob_match(pattern: &str, candidate: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == candidate;
    }

    let mut parts = pattern.split('*');
    // split always yields at least one element
    let prefix = parts.next().unwrap_or_default();
    let Some(mut rest) = candidate.strip_prefix(prefix) else {
        return false;
    };

    let middle: Vec<&str> = parts.collect();
    let Some((suffix, inner)) = middle.split_last() else {
        return true;
    };

    for part in inner {
        if part.is_empty() {
            continue;
        }
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }

    rest.len() >= suffix.len() && rest.ends_with(suffix)
}

/// Returns true when `candidate` matches any of `patterns`
pub fn matches_any(patterns: &[String], candidate: &str) -> bool {
    patterns.iter().any(|p| glob_match(p, candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_without_wildcard() {
        assert!(glob_match("user:1", "user:1"));
        assert!(!glob_match("user:1", "user:10"));
    }

    #[test]
    fn test_prefix_wildcard() {
        assert!(glob_match("user:*", "user:1"));
        assert!(glob_match("user:*", "user:"));
        assert!(!glob_match("user:*", "order:1"));
    }

    #[test]
    fn test_wildcard_spans_path_separators() {
        assert!(glob_match("/api/v1/*", "/api/v1/posts/42/comments"));
        assert!(glob_match("/api/*/posts", "/api/v1/beta/posts"));
        assert!(!glob_match("/api/*/posts", "/api/v1/posts/1"));
    }

    #[test]
    fn test_leading_and_multiple_wildcards() {
        assert!(glob_match("*:1", "order:1"));
        assert!(glob_match("*", ""));
        assert!(glob_match("a*b*c", "a-b-c"));
        assert!(!glob_match("a*b*c", "a-c-b"));
        // prefix and suffix must not overlap
        assert!(!glob_match("ab*ba", "aba"));
    }

    #[test]
    fn test_matches_any() {
        let patterns = vec!["user:*".to_string(), "session:*".to_string()];
        assert!(matches_any(&patterns, "session:abc"));
        assert!(!matches_any(&patterns, "order:1"));
        assert!(!matches_any(&[], "order:1"));
    }
}
