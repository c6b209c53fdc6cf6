//! Node pattern matching
//!
//! Rule nodes are regular expressions over absolute paths, always matched
//! against the whole path. `/dataset[1-9][0-9]*/what/product` matches
//! `/dataset1/what/product` and `/dataset12/what/product` but not
//! `/dataset1/what/product2`.
//!
//! Everything that interprets rule nodes goes through [`PathMatcher`] and the
//! split helpers below, so a different pattern syntax only needs changes here.

use crate::error::{OdimError, Result};
use lru::LruCache;
use regex::Regex;
use std::num::NonZeroUsize;

/// Default number of compiled patterns kept around
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

const META: &[char] = &[
    '.', '*', '+', '?', '(', ')', '[', ']', '{', '}', '|', '^', '$', '\\',
];

/// Full-path matcher with an LRU cache of compiled patterns
pub struct PathMatcher {
    cache: LruCache<String, Regex>,
}

impl Default for PathMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl PathMatcher {
    pub fn new(capacity: usize) -> Self {
        PathMatcher {
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    /// Check whether `path` matches `pattern` in full
    pub fn matches(&mut self, pattern: &str, path: &str) -> Result<bool> {
        Ok(self.compiled(pattern)?.is_match(path))
    }

    /// Check a pattern compiles without matching anything
    pub fn validate(&mut self, pattern: &str) -> Result<()> {
        self.compiled(pattern).map(|_| ())
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn compiled(&mut self, pattern: &str) -> Result<&Regex> {
        if !self.cache.contains(pattern) {
            let regex = anchored(pattern)?;
            self.cache.put(pattern.to_string(), regex);
        }
        self.cache
            .get(pattern)
            .ok_or_else(|| OdimError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "evicted while in use".to_string(),
            })
    }
}

/// Compile `pattern` so it only matches whole strings
pub fn anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| OdimError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// A path segment containing regular expression syntax
pub fn is_wildcard(segment: &str) -> bool {
    segment.contains(META)
}

/// Node pattern with at least one wildcard segment
pub fn has_wildcard(pattern: &str) -> bool {
    pattern.split('/').any(is_wildcard)
}

/// Pattern cut into a wildcard prefix and the literal rest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardSplit {
    /// Pattern up to and including the cut segment
    pub prefix: String,
    /// Literal remainder starting with `/`, or empty
    pub suffix: String,
    /// Number of path segments covered by `prefix`
    pub depth: usize,
}

impl WildcardSplit {
    fn at(parts: &[&str], index: usize) -> Self {
        let prefix = parts[..=index].join("/");
        let rest = &parts[index + 1..];
        let suffix = if rest.is_empty() {
            String::new()
        } else {
            format!("/{}", rest.join("/"))
        };
        WildcardSplit {
            prefix,
            suffix,
            depth: index,
        }
    }
}

/// Cut after the last wildcard segment.
///
/// `/dataset[1-9][0-9]*/testGroup` becomes prefix `/dataset[1-9][0-9]*` and
/// suffix `/testGroup`. `None` if the pattern has no wildcard.
pub fn split_at_last_wildcard(pattern: &str) -> Option<WildcardSplit> {
    let parts: Vec<&str> = pattern.split('/').collect();
    let index = parts.iter().rposition(|p| is_wildcard(p))?;
    Some(WildcardSplit::at(&parts, index))
}

/// Cut after the last wildcard segment that is not the final segment.
///
/// `/dataset[0-9]+/what/product` becomes prefix `/dataset[0-9]+` and suffix
/// `/what/product`. `None` if only the final segment (or nothing) is a
/// wildcard.
pub fn split_before_leaf(pattern: &str) -> Option<WildcardSplit> {
    let parts: Vec<&str> = pattern.split('/').collect();
    let (_, parents) = parts.split_last()?;
    let index = parents.iter().rposition(|p| is_wildcard(p))?;
    Some(WildcardSplit::at(&parts, index))
}

/// First `depth` segments of an absolute path, `None` if it is shorter
pub fn ancestor(path: &str, depth: usize) -> Option<String> {
    let parts: Vec<&str> = path.split('/').collect();
    if depth == 0 || parts.len() <= depth {
        return None;
    }
    Some(parts[..=depth].join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_match_only() {
        let mut m = PathMatcher::default();
        let pattern = "/dataset[1-9][0-9]*/what/product";
        assert!(m.matches(pattern, "/dataset1/what/product").unwrap());
        assert!(m.matches(pattern, "/dataset12/what/product").unwrap());
        assert!(!m.matches(pattern, "/dataset1/what/product2").unwrap());
        assert!(!m.matches(pattern, "/x/dataset1/what/product").unwrap());
        assert!(!m.matches(pattern, "/dataset0/what/product").unwrap());
    }

    #[test]
    fn test_literal_pattern() {
        let mut m = PathMatcher::default();
        assert!(m.matches("/what/object", "/what/object").unwrap());
        assert!(!m.matches("/what/object", "/what/objects").unwrap());
    }

    #[test]
    fn test_alternation_is_anchored() {
        let mut m = PathMatcher::default();
        assert!(m.matches("/how/a|/how/b", "/how/b").unwrap());
        assert!(!m.matches("/how/a|/how/b", "/how/bc").unwrap());
    }

    #[test]
    fn test_invalid_pattern() {
        let mut m = PathMatcher::default();
        let result = m.matches("/dataset[0-9", "/dataset1");
        assert!(matches!(result, Err(OdimError::InvalidPattern { .. })));
    }

    #[test]
    fn test_cache_eviction() {
        let mut m = PathMatcher::new(2);
        m.validate("/a").unwrap();
        m.validate("/b").unwrap();
        m.validate("/c").unwrap();
        assert_eq!(m.len(), 2);
        assert!(m.matches("/a", "/a").unwrap());
    }

    #[test]
    fn test_wildcard_detection() {
        assert!(is_wildcard("dataset[1-9][0-9]*"));
        assert!(is_wildcard(".*"));
        assert!(!is_wildcard("testGroup"));
        assert!(!is_wildcard("startazA"));
        assert!(has_wildcard("/dataset[0-9]+/how"));
        assert!(!has_wildcard("/how/startepochs"));
    }

    #[test]
    fn test_split_at_last_wildcard() {
        let split = split_at_last_wildcard("/dataset[1-9][0-9]*/testGroup").unwrap();
        assert_eq!(split.prefix, "/dataset[1-9][0-9]*");
        assert_eq!(split.suffix, "/testGroup");

        let split = split_at_last_wildcard("/dataset[0-9]+/data[0-9]+/what/gain").unwrap();
        assert_eq!(split.prefix, "/dataset[0-9]+/data[0-9]+");
        assert_eq!(split.suffix, "/what/gain");

        let split = split_at_last_wildcard("/dataset[0-9]+").unwrap();
        assert_eq!(split.suffix, "");

        assert!(split_at_last_wildcard("/how/system").is_none());
    }

    #[test]
    fn test_split_before_leaf() {
        let split = split_before_leaf("/dataset[0-9]+/what/product").unwrap();
        assert_eq!(split.prefix, "/dataset[0-9]+");
        assert_eq!(split.suffix, "/what/product");
        assert_eq!(split.depth, 1);

        assert!(split_before_leaf("/how/.*").is_none());
        assert!(split_before_leaf("/dataset[0-9]+").is_none());
    }

    #[test]
    fn test_ancestor() {
        assert_eq!(
            ancestor("/dataset12/data3/what/quantity", 2),
            Some("/dataset12/data3".to_string())
        );
        assert_eq!(ancestor("/dataset1", 1), Some("/dataset1".to_string()));
        assert_eq!(ancestor("/dataset1", 2), None);
        assert_eq!(ancestor("/dataset1/what", 1), Some("/dataset1".to_string()));
    }
}
