//! Arena-backed region tree.
//!
//! Regions live in a flat arena and are addressed by [`RegionHandle`]. The
//! tree structure and any flat candidate lists both refer to regions by
//! handle, so a region is never aliased mutably from two places.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use super::types::{Region, RegionHandle, RegionKind};
use crate::geometry::Size;

/// Page-level information handed to the markup writer with the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Tool that produced the markup
    pub creator: String,
    /// Size of the source image
    pub image_size: Option<Size>,
    /// File name of the source image
    pub image_file_name: Option<String>,
}

impl Default for PageMetadata {
    fn default() -> Self {
        Self {
            creator: env!("CARGO_PKG_NAME").to_string(),
            image_size: None,
            image_file_name: None,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    region: Region,
    parent: Option<RegionHandle>,
    children: Vec<RegionHandle>,
}

/// Rooted tree of layout regions.
///
/// Detached regions (created with [`insert`](Self::insert) or removed with
/// [`remove_children`](Self::remove_children)) stay in the arena and keep
/// their handles, but are not reachable from the root.
#[derive(Debug, Clone)]
pub struct RegionTree {
    nodes: Vec<Node>,
    metadata: PageMetadata,
}

impl RegionTree {
    /// A tree holding only a root region.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                region: Region::new(RegionKind::Root),
                parent: None,
                children: Vec::new(),
            }],
            metadata: PageMetadata::default(),
        }
    }

    /// Handle of the root region.
    pub fn root(&self) -> RegionHandle {
        RegionHandle(0)
    }

    /// Page metadata.
    pub fn metadata(&self) -> &PageMetadata {
        &self.metadata
    }

    /// Mutable page metadata.
    pub fn metadata_mut(&mut self) -> &mut PageMetadata {
        &mut self.metadata
    }

    /// Region behind `handle`, if it exists.
    pub fn get(&self, handle: RegionHandle) -> Option<&Region> {
        self.nodes.get(handle.0).map(|n| &n.region)
    }

    /// Mutable region behind `handle`, if it exists.
    pub fn get_mut(&mut self, handle: RegionHandle) -> Option<&mut Region> {
        self.nodes.get_mut(handle.0).map(|n| &mut n.region)
    }

    /// Store a region without attaching it anywhere.
    pub fn insert(&mut self, region: Region) -> RegionHandle {
        self.nodes.push(Node {
            region,
            parent: None,
            children: Vec::new(),
        });
        RegionHandle(self.nodes.len() - 1)
    }

    /// Store a region and append it to `parent`'s children.
    pub fn add_child(&mut self, parent: RegionHandle, region: Region) -> RegionHandle {
        let child = self.insert(region);
        self.attach(parent, child);
        child
    }

    /// Append `child` to `parent`'s children unless it is already there.
    ///
    /// Identity is the handle, not the region's content. A child attached
    /// elsewhere is moved. Returns whether the child was added.
    pub fn add_unique_child(&mut self, parent: RegionHandle, child: RegionHandle) -> bool {
        if self.nodes.get(child.0).is_none() {
            return false;
        }
        let Some(node) = self.nodes.get(parent.0) else {
            return false;
        };
        if node.children.contains(&child) || parent == child || self.is_ancestor(child, parent) {
            return false;
        }
        self.detach(child);
        self.attach(parent, child);
        true
    }

    fn attach(&mut self, parent: RegionHandle, child: RegionHandle) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn detach(&mut self, child: RegionHandle) {
        if let Some(old) = self.nodes[child.0].parent.take() {
            self.nodes[old.0].children.retain(|c| *c != child);
        }
    }

    fn is_ancestor(&self, candidate: RegionHandle, of: RegionHandle) -> bool {
        let mut current = self.nodes[of.0].parent;
        while let Some(p) = current {
            if p == candidate {
                return true;
            }
            current = self.nodes[p.0].parent;
        }
        false
    }

    /// Detach all children of `parent` and return them in order.
    pub fn remove_children(&mut self, parent: RegionHandle) -> Vec<RegionHandle> {
        let children = std::mem::take(&mut self.nodes[parent.0].children);
        for child in &children {
            self.nodes[child.0].parent = None;
        }
        children
    }

    /// Direct children of `handle`.
    pub fn children(&self, handle: RegionHandle) -> &[RegionHandle] {
        self.nodes
            .get(handle.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Parent of `handle`; `None` for the root and detached regions.
    pub fn parent(&self, handle: RegionHandle) -> Option<RegionHandle> {
        self.nodes.get(handle.0).and_then(|n| n.parent)
    }

    /// Descendants of `handle` in pre-order, excluding `handle` itself.
    pub fn descendants(&self, handle: RegionHandle) -> Vec<RegionHandle> {
        let mut out = Vec::new();
        let mut stack: Vec<RegionHandle> = self.children(handle).iter().rev().copied().collect();
        while let Some(h) = stack.pop() {
            out.push(h);
            stack.extend(self.children(h).iter().rev().copied());
        }
        out
    }

    /// All regions of `kind` reachable from the root, in pre-order.
    pub fn filter(&self, kind: RegionKind) -> Vec<RegionHandle> {
        self.descendants(self.root())
            .into_iter()
            .filter(|h| self.nodes[h.0].region.kind() == kind)
            .collect()
    }

    /// Number of edges between `handle` and the top of its tree.
    pub fn depth(&self, handle: RegionHandle) -> usize {
        let mut depth = 0;
        let mut current = self.parent(handle);
        while let Some(p) = current {
            depth += 1;
            current = self.parent(p);
        }
        depth
    }

    /// Depth of the deepest region reachable from the root.
    pub fn max_depth(&self) -> usize {
        self.descendants(self.root())
            .into_iter()
            .map(|h| self.depth(h))
            .max()
            .unwrap_or(0)
    }

    /// Number of regions reachable from the root, root included.
    pub fn len(&self) -> usize {
        self.descendants(self.root()).len() + 1
    }

    /// Whether the root has no children.
    pub fn is_empty(&self) -> bool {
        self.children(self.root()).is_empty()
    }

    /// Reachable region with the given identifier.
    pub fn find_by_id(&self, id: &str) -> Option<RegionHandle> {
        std::iter::once(self.root())
            .chain(self.descendants(self.root()))
            .find(|h| self.nodes[h.0].region.id() == id)
    }
}

impl Default for RegionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<RegionHandle> for RegionTree {
    type Output = Region;

    fn index(&self, handle: RegionHandle) -> &Region {
        &self.nodes[handle.0].region
    }
}

impl IndexMut<RegionHandle> for RegionTree {
    fn index_mut(&mut self, handle: RegionHandle) -> &mut Region {
        &mut self.nodes[handle.0].region
    }
}
