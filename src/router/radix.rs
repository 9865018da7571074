//! Radix tree over path segments.
//!
//! Each node is one `/`-separated segment. Static segments match exactly; a `{name}`
//! segment matches any single non-empty segment and records it as a path parameter.
//! Static children are tried before parameter children, and a failed parameter branch
//! backtracks so sibling parameter names stay independent
//! (`/users/{user_id}/posts` and `/users/{id}/comments` extract different names).
//!
//! Lookup is O(k) in the number of request segments, independent of route count.

use std::sync::Arc;

use super::core::ParamVec;
use crate::endpoint::MethodTable;

/// Route stored at a terminal node.
#[derive(Clone)]
pub(crate) struct RouteEntry {
    pub template: Arc<str>,
    pub methods: Arc<MethodTable>,
}

#[derive(Clone, Default)]
struct RadixNode {
    /// Static segment text (empty for the root and for parameter nodes)
    segment: Arc<str>,
    /// Parameter name if this node is a `{name}` segment
    param_name: Option<Arc<str>>,
    route: Option<RouteEntry>,
    children: Vec<RadixNode>,
    param_children: Vec<RadixNode>,
}

impl RadixNode {
    fn new(segment: &str) -> Self {
        Self {
            segment: Arc::from(segment),
            ..Self::default()
        }
    }

    fn new_param(name: &str) -> Self {
        Self {
            segment: Arc::from(""),
            param_name: Some(Arc::from(name)),
            ..Self::default()
        }
    }

    /// Insert `entry` at the node for `segments`, returning the entry it replaced.
    fn insert(&mut self, segments: &[&str], entry: RouteEntry) -> Option<RouteEntry> {
        let Some((&segment, remaining)) = segments.split_first() else {
            return self.route.replace(entry);
        };

        if let Some(name) = param_name(segment) {
            if let Some(child) = self
                .param_children
                .iter_mut()
                .find(|c| c.param_name.as_deref() == Some(name))
            {
                return child.insert(remaining, entry);
            }
            let mut child = RadixNode::new_param(name);
            let replaced = child.insert(remaining, entry);
            self.param_children.push(child);
            return replaced;
        }

        if let Some(child) = self
            .children
            .iter_mut()
            .find(|c| c.segment.as_ref() == segment)
        {
            return child.insert(remaining, entry);
        }
        let mut child = RadixNode::new(segment);
        let replaced = child.insert(remaining, entry);
        self.children.push(child);
        replaced
    }

    fn search(&self, segments: &[&str], params: &mut ParamVec) -> Option<&RouteEntry> {
        let Some((&segment, remaining)) = segments.split_first() else {
            return self.route.as_ref();
        };

        for child in &self.children {
            if child.segment.as_ref() == segment {
                if let Some(found) = child.search(remaining, params) {
                    return Some(found);
                }
            }
        }

        for child in &self.param_children {
            if let Some(name) = &child.param_name {
                params.push((Arc::clone(name), segment.to_string()));
                if let Some(found) = child.search(remaining, params) {
                    return Some(found);
                }
                params.pop();
            }
        }

        None
    }

    fn collect(&self, out: &mut Vec<RouteEntry>) {
        if let Some(entry) = &self.route {
            out.push(entry.clone());
        }
        for child in self.children.iter().chain(&self.param_children) {
            child.collect(out);
        }
    }
}

fn param_name(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Segment tree mapping path templates to their compiled method tables.
#[derive(Clone, Default)]
pub(crate) struct RadixTree {
    root: RadixNode,
}

impl RadixTree {
    pub fn insert(&mut self, entry: RouteEntry) -> Option<RouteEntry> {
        let template = Arc::clone(&entry.template);
        let segments = split_segments(&template);
        self.root.insert(&segments, entry)
    }

    /// Match a request path (no query string) and extract its parameters.
    pub fn search(&self, path: &str) -> Option<(&RouteEntry, ParamVec)> {
        let segments = split_segments(path);
        let mut params = ParamVec::new();
        let entry = self.root.search(&segments, &mut params)?;
        Some((entry, params))
    }

    pub fn entries(&self) -> Vec<RouteEntry> {
        let mut out = Vec::new();
        self.root.collect(&mut out);
        out
    }
}
