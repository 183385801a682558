//! The routing tree: method bucket -> entity path -> ordered handlers.

use std::collections::HashMap;

use itertools::Itertools;

use crate::types::{EntityPath, Method, PrioritizedHandler};

#[derive(Debug, Clone, Default)]
pub struct RoutingTree {
    buckets: HashMap<Method, HashMap<EntityPath, Vec<PrioritizedHandler>>>,
}

impl RoutingTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty bucket for `(method, path)` if none exists.
    pub fn open(&mut self, method: Method, path: &EntityPath) {
        self.buckets
            .entry(method)
            .or_default()
            .entry(path.clone())
            .or_default();
    }

    /// Append a handler, creating the bucket on demand.
    pub fn push(&mut self, method: Method, path: &EntityPath, handler: PrioritizedHandler) {
        self.buckets
            .entry(method)
            .or_default()
            .entry(path.clone())
            .or_default()
            .push(handler);
    }

    pub fn has_bucket(&self, method: Method, path: &str) -> bool {
        self.buckets
            .get(&method)
            .is_some_and(|paths| paths.contains_key(path))
    }

    /// Handlers of one bucket in attachment order; empty when missing.
    pub fn bucket(&self, method: Method, path: &str) -> &[PrioritizedHandler] {
        self.buckets
            .get(&method)
            .and_then(|paths| paths.get(path))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The dispatch chain for a request: method-specific handlers followed
    /// by the `all` bucket, stably sorted by ascending priority.
    pub fn chain(&self, method: Option<Method>, path: &str) -> Vec<PrioritizedHandler> {
        let specific = method.map_or(&[][..], |m| self.bucket(m, path));
        specific
            .iter()
            .chain(self.bucket(Method::All, path))
            .cloned()
            .sorted_by_key(PrioritizedHandler::priority)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::handler_fn;
    use crate::types::RequestContext;

    fn named(name: &str, priority: i32) -> PrioritizedHandler {
        PrioritizedHandler::new(handler_fn(name, |_: &mut RequestContext| Ok(())), priority)
    }

    fn names(chain: &[PrioritizedHandler]) -> Vec<&str> {
        chain.iter().map(PrioritizedHandler::name).collect()
    }

    #[test]
    fn test_chain_is_stable_by_priority() {
        let path = EntityPath::from_segment("user");
        let mut tree = RoutingTree::new();
        tree.push(Method::Get, &path, named("p50", 50));
        tree.push(Method::Get, &path, named("p10a", 10));
        tree.push(Method::Get, &path, named("p10b", 10));
        tree.push(Method::Get, &path, named("p90", 90));

        let chain = tree.chain(Some(Method::Get), "user");
        assert_eq!(names(&chain), ["p10a", "p10b", "p50", "p90"]);
    }

    #[test]
    fn test_chain_merges_all_bucket_after_specific_on_ties() {
        let path = EntityPath::from_segment("user");
        let mut tree = RoutingTree::new();
        tree.push(Method::All, &path, named("all10", 10));
        tree.push(Method::Post, &path, named("post10", 10));
        tree.push(Method::All, &path, named("all5", 5));

        let chain = tree.chain(Some(Method::Post), "user");
        assert_eq!(names(&chain), ["all5", "post10", "all10"]);

        let chain = tree.chain(Some(Method::Get), "user");
        assert_eq!(names(&chain), ["all5", "all10"]);

        let chain = tree.chain(None, "user");
        assert_eq!(names(&chain), ["all5", "all10"]);
    }

    #[test]
    fn test_missing_bucket_is_empty() {
        let tree = RoutingTree::new();
        assert!(tree.bucket(Method::Get, "nobody").is_empty());
        assert!(tree.chain(Some(Method::Get), "nobody").is_empty());
        assert!(!tree.has_bucket(Method::All, "nobody"));
    }

    #[test]
    fn test_open_creates_empty_bucket() {
        let path = EntityPath::from_segment("user");
        let mut tree = RoutingTree::new();
        tree.open(Method::All, &path);
        assert!(tree.has_bucket(Method::All, "user"));
        assert!(tree.bucket(Method::All, "user").is_empty());
    }
}
