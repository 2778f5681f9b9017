//! Pattern-based path filtering consulted by Scan (spec §4.5).

pub mod cache;
pub mod pattern;

pub use cache::IgnoreCache;
pub use pattern::Pattern;
use synctree_core::error::SyncError;

/// Directory markers ignored by default when the host asks for VCS ignores
/// (spec §4.5, `ignore-vcs-mode`).
pub const DEFAULT_VCS_PATTERNS: &[&str] = &[".git/", ".svn/", ".hg/", ".bzr/", "_darcs/"];

/// Parse a user pattern list, failing on the first invalid entry.
pub fn parse_all(patterns: &[String]) -> Result<Vec<Pattern>, SyncError> {
    patterns.iter().map(|p| Pattern::parse(p)).collect()
}

/// Parse [`DEFAULT_VCS_PATTERNS`]; infallible since the literals are fixed
/// and exercised by tests, kept as a `Result`-returning fn so callers can
/// fold it into their own pattern-loading error handling uniformly.
pub fn default_vcs_patterns() -> Result<Vec<Pattern>, SyncError> {
    DEFAULT_VCS_PATTERNS
        .iter()
        .map(|p| Pattern::parse(p))
        .collect()
}

/// Evaluate `path` (with its directory flag) against an ordered pattern
/// list, memoizing the result in `cache` (spec §4.5 evaluation algorithm).
pub fn is_ignored(
    patterns: &[Pattern],
    path: &str,
    is_directory: bool,
    cache: &mut IgnoreCache,
) -> bool {
    if let Some(decision) = cache.get(path, is_directory) {
        return decision;
    }

    let leaf = synctree_core::path::base(path).unwrap_or(path);

    let mut ignored = false;
    for pattern in patterns {
        if pattern.directory_only && !is_directory {
            continue;
        }
        let hit = pattern.matches(path) || (pattern.match_leaf && pattern.matches(leaf));
        if hit {
            ignored = !pattern.negated;
        }
    }

    cache.insert(path, is_directory, ignored);
    ignored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vcs_patterns_parse_and_ignore_directories() {
        let patterns = default_vcs_patterns().unwrap();
        let mut cache = IgnoreCache::new();
        assert!(is_ignored(&patterns, ".git", true, &mut cache));
        assert!(!is_ignored(&patterns, ".gitignore", false, &mut cache));
    }

    #[test]
    fn negation_overrides_earlier_match_in_order() {
        let patterns = parse_all(&["*.log".to_string(), "!keep.log".to_string()]).unwrap();
        let mut cache = IgnoreCache::new();
        assert!(is_ignored(&patterns, "build/debug.log", false, &mut cache));
        assert!(!is_ignored(&patterns, "keep.log", false, &mut cache));
    }

    #[test]
    fn later_pattern_overrides_earlier_negation() {
        let patterns = parse_all(&[
            "!important.log".to_string(),
            "*.log".to_string(),
        ])
        .unwrap();
        let mut cache = IgnoreCache::new();
        // order matters: the final matching pattern wins.
        assert!(is_ignored(&patterns, "important.log", false, &mut cache));
    }

    #[test]
    fn directory_only_pattern_does_not_match_files() {
        let patterns = parse_all(&["build/".to_string()]).unwrap();
        let mut cache = IgnoreCache::new();
        assert!(is_ignored(&patterns, "build", true, &mut cache));
        assert!(!is_ignored(&patterns, "build", false, &mut cache));
    }

    #[test]
    fn match_leaf_fallback_matches_nested_basename() {
        let patterns = parse_all(&["*.tmp".to_string()]).unwrap();
        let mut cache = IgnoreCache::new();
        assert!(is_ignored(&patterns, "a/b/file.tmp", false, &mut cache));
    }

    #[test]
    fn decisions_are_memoized() {
        let patterns = parse_all(&["*.tmp".to_string()]).unwrap();
        let mut cache = IgnoreCache::new();
        assert!(is_ignored(&patterns, "a.tmp", false, &mut cache));
        assert_eq!(cache.len(), 1);
        // Calling again for the same key must not grow the cache.
        assert!(is_ignored(&patterns, "a.tmp", false, &mut cache));
        assert_eq!(cache.len(), 1);
    }
}
