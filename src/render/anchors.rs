//! Anchor registry: logical targets to canvas link handles.

use std::collections::HashMap;

/// Maps a destination (`#heading-id` or an in-document path) to the link
/// handle the canvas allocated for it. Handles are allocated once per key.
#[derive(Debug, Clone)]
pub struct AnchorRegistry<L> {
    links: HashMap<String, L>,
}

impl<L> Default for AnchorRegistry<L> {
    fn default() -> Self {
        Self {
            links: HashMap::new(),
        }
    }
}

impl<L: Copy> AnchorRegistry<L> {
    /// Return the handle for `key`, allocating it with `allocate` on first use.
    pub fn resolve(&mut self, key: &str, allocate: impl FnOnce() -> L) -> L {
        if let Some(id) = self.links.get(key) {
            return *id;
        }
        let id = allocate();
        self.links.insert(key.to_string(), id);
        id
    }

    /// Number of handles allocated so far.
    pub fn allocated(&self) -> usize {
        self.links.len()
    }
}

/// Heading anchors are keyed like the internal links that point at them.
pub fn heading_key(id: &str) -> String {
    format!("#{id}")
}

/// True if `destination` starts with a URL scheme (`https:`, `mailto:`, ...).
pub fn has_url_scheme(destination: &str) -> bool {
    let Some((scheme, _)) = destination.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_allocates_once_per_key() {
        let mut registry = AnchorRegistry::default();
        let mut next = 0usize;
        let mut allocate = || {
            next += 1;
            next
        };
        let a = registry.resolve("#intro", &mut allocate);
        let b = registry.resolve("#intro", &mut allocate);
        let c = registry.resolve("#usage", &mut allocate);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(registry.allocated(), 2);
        assert_eq!(next, 2);
    }

    #[test]
    fn test_heading_key_matches_internal_link() {
        assert_eq!(heading_key("getting-started"), "#getting-started");
    }

    #[test]
    fn test_url_scheme_detection() {
        assert!(has_url_scheme("https://example.com"));
        assert!(has_url_scheme("mailto:someone@example.com"));
        assert!(has_url_scheme("git+ssh://host/repo"));
        assert!(!has_url_scheme("#section"));
        assert!(!has_url_scheme("docs/guide.md"));
        assert!(!has_url_scheme("1http://nope"));
        assert!(!has_url_scheme(":empty"));
    }
}
