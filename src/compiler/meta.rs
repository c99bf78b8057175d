//! Per-route render results and the build-wide metadata they merge into.
//!
//! ```text
//! RenderOutput ──dedup──► RenderResult ──► RouteMetadata
//!                                               │
//!                        AggregatedMetadata ◄───┘ insert() in route order
//! ```
//!
//! Metadata is keyed strictly by route. Inserting a route that is already
//! present replaces that route's entry in place; nothing is ever merged
//! across routes.

use super::renderer::RenderOutput;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Serialize, Serializer};

/// One route's render, with head tags and links deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderResult {
    pub markup: String,
    pub head_tags: Vec<String>,
    pub links: Vec<String>,
}

impl From<RenderOutput> for RenderResult {
    fn from(output: RenderOutput) -> Self {
        Self {
            markup: output.markup,
            head_tags: dedup(output.head_tags),
            links: dedup(output.links),
        }
    }
}

impl RenderResult {
    /// Split off the metadata, keyed by `route`.
    pub fn metadata(&self, route: &str) -> RouteMetadata {
        RouteMetadata {
            route: route.to_owned(),
            head_tags: self.head_tags.clone(),
            links: self.links.clone(),
        }
    }
}

/// Remove repeats, keeping first occurrences in order.
fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = FxHashSet::default();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Head tags and discovered links of one route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteMetadata {
    pub route: String,
    pub head_tags: Vec<String>,
    pub links: Vec<String>,
}

/// Route-keyed metadata of a whole build, in route order.
#[derive(Debug, Clone, Default)]
pub struct AggregatedMetadata {
    entries: Vec<RouteMetadata>,
    index: FxHashMap<String, usize>,
}

impl AggregatedMetadata {
    /// Insert a route's metadata; an existing entry for the same route is replaced.
    pub fn insert(&mut self, metadata: RouteMetadata) {
        match self.index.get(&metadata.route) {
            Some(&slot) => self.entries[slot] = metadata,
            None => {
                self.index.insert(metadata.route.clone(), self.entries.len());
                self.entries.push(metadata);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteMetadata> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of links across all routes.
    pub fn link_count(&self) -> usize {
        self.entries.iter().map(|m| m.links.len()).sum()
    }
}

impl Serialize for AggregatedMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
impl AggregatedMetadata {
    pub fn get(&self, route: &str) -> Option<&RouteMetadata> {
        self.index.get(route).map(|&slot| &self.entries[slot])
    }

    pub fn head_tags(&self, route: &str) -> &[String] {
        self.get(route).map_or(&[], |m| m.head_tags.as_slice())
    }

    pub fn links(&self, route: &str) -> &[String] {
        self.get(route).map_or(&[], |m| m.links.as_slice())
    }
}
