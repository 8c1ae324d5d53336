//! Renderer registries
//!
//! Two lookup structures drive dispatch in both conversion directions.
//!
//! [`StyleRegistry`] maps a paragraph style name to a renderer in three
//! ordered phases: exact name, then regex patterns in registration order, then
//! the wildcard. An exact entry always beats a pattern that also matches, and a
//! pattern always beats the wildcard.
//!
//! [`NodeRegistry`] is an ordered list of renderers that each answer whether
//! they handle a node. The first one that says yes wins. A node nobody claims
//! is reported as `None` so the caller can log it and move on.
//!
//! Both are built per conversion and hold no global state.

use regex::Regex;
use std::collections::HashMap;

/// Which phase of a [`StyleRegistry`] lookup produced the renderer.
#[derive(Debug)]
pub enum StyleMatch<'a, R: ?Sized> {
    Exact(&'a R),
    Pattern(&'a R),
    Wildcard(&'a R),
}

impl<'a, R: ?Sized> StyleMatch<'a, R> {
    pub fn renderer(&self) -> &'a R {
        match self {
            StyleMatch::Exact(r) | StyleMatch::Pattern(r) | StyleMatch::Wildcard(r) => r,
        }
    }
}

pub struct StyleRegistry<R> {
    exact: HashMap<String, R>,
    patterns: Vec<(Regex, R)>,
    wildcard: R,
}

impl<R> StyleRegistry<R> {
    /// Create a registry whose fallback is `wildcard`.
    pub fn new(wildcard: R) -> Self {
        StyleRegistry {
            exact: HashMap::new(),
            patterns: Vec::new(),
            wildcard,
        }
    }

    /// Register a renderer for one exact style name, replacing any previous one.
    pub fn register_exact(&mut self, style: &str, renderer: R) {
        self.exact.insert(style.to_string(), renderer);
    }

    /// Append a pattern entry. Patterns are tried in registration order.
    pub fn register_pattern(&mut self, pattern: &str, renderer: R) -> Result<(), regex::Error> {
        let regex = Regex::new(pattern)?;
        self.patterns.push((regex, renderer));
        Ok(())
    }

    pub fn find(&self, style: &str) -> StyleMatch<'_, R> {
        if let Some(renderer) = self.exact.get(style) {
            return StyleMatch::Exact(renderer);
        }
        for (regex, renderer) in &self.patterns {
            if regex.is_match(style) {
                return StyleMatch::Pattern(renderer);
            }
        }
        StyleMatch::Wildcard(&self.wildcard)
    }

    /// Exact names (sorted) followed by patterns in lookup order.
    pub fn describe(&self) -> Vec<String> {
        let mut names: Vec<String> = self.exact.keys().cloned().collect();
        names.sort();
        names.extend(self.patterns.iter().map(|(r, _)| format!("/{}/", r.as_str())));
        names.push("*".to_string());
        names
    }
}

/// A renderer that can say whether it handles a node.
pub trait Claims<N: ?Sized> {
    fn can_render(&self, node: &N) -> bool;
    fn name(&self) -> &'static str;
}

impl<N: ?Sized, T: Claims<N> + ?Sized> Claims<N> for Box<T> {
    fn can_render(&self, node: &N) -> bool {
        (**self).can_render(node)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

pub struct NodeRegistry<R> {
    renderers: Vec<R>,
}

impl<R> Default for NodeRegistry<R> {
    fn default() -> Self {
        NodeRegistry {
            renderers: Vec::new(),
        }
    }
}

impl<R> NodeRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a renderer. Earlier registrations take precedence.
    pub fn register(&mut self, renderer: R) {
        self.renderers.push(renderer);
    }

    pub fn find<N: ?Sized>(&self, node: &N) -> Option<&R>
    where
        R: Claims<N>,
    {
        self.renderers.iter().find(|r| r.can_render(node))
    }

    pub fn names<N: ?Sized>(&self) -> Vec<&'static str>
    where
        R: Claims<N>,
    {
        self.renderers.iter().map(|r| r.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_beats_pattern() {
        let mut registry = StyleRegistry::new("default");
        registry.register_pattern(".*Code$", "code").unwrap();
        registry.register_exact("CodeFooter", "footer");
        registry.register_exact("InlineCode", "inline");
        assert!(matches!(registry.find("InlineCode"), StyleMatch::Exact(&"inline")));
        assert!(matches!(registry.find("SourceCode"), StyleMatch::Pattern(&"code")));
        assert!(matches!(registry.find("Body"), StyleMatch::Wildcard(&"default")));
    }

    #[test]
    fn patterns_keep_registration_order() {
        let mut registry = StyleRegistry::new(0);
        registry.register_pattern("Quote", 1).unwrap();
        registry.register_pattern("IntenseQuote", 2).unwrap();
        assert_eq!(*registry.find("IntenseQuote").renderer(), 1);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let mut registry = StyleRegistry::new(());
        assert!(registry.register_pattern("(", ()).is_err());
    }

    #[test]
    fn describe_lists_wildcard_last() {
        let mut registry = StyleRegistry::new(());
        registry.register_exact("Heading1", ());
        registry.register_pattern("Code$", ()).unwrap();
        assert_eq!(registry.describe(), vec!["Heading1", "/Code$/", "*"]);
    }

    struct Even;
    struct Any;

    impl Claims<u32> for Even {
        fn can_render(&self, node: &u32) -> bool {
            node % 2 == 0
        }
        fn name(&self) -> &'static str {
            "even"
        }
    }

    impl Claims<u32> for Any {
        fn can_render(&self, _: &u32) -> bool {
            true
        }
        fn name(&self) -> &'static str {
            "any"
        }
    }

    #[test]
    fn first_claiming_renderer_wins() {
        let mut registry: NodeRegistry<Box<dyn Claims<u32>>> = NodeRegistry::new();
        registry.register(Box::new(Even));
        registry.register(Box::new(Any));
        assert_eq!(registry.find(&4u32).map(|r| Claims::<u32>::name(r)), Some("even"));
        assert_eq!(registry.find(&3u32).map(|r| Claims::<u32>::name(r)), Some("any"));
    }

    #[test]
    fn unclaimed_node_yields_none() {
        let mut registry: NodeRegistry<Box<dyn Claims<u32>>> = NodeRegistry::new();
        registry.register(Box::new(Even));
        assert!(registry.find(&3u32).is_none());
    }
}
