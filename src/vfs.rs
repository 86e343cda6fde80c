//! In-memory catalog tree: containers and resources in an id-indexed arena.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::error::{ClassifyError, VfsError};
use crate::media::demux::Demuxer;
use crate::media::item::MediaItem;
use crate::profiles::protocol::Conversion;
use crate::profiles::Registry;

pub const ROOT_ID: u32 = 0;

/// Classification outcome cached on a resource.
pub type MediaResult = Result<Arc<MediaItem>, Arc<ClassifyError>>;

#[derive(Debug)]
pub struct VfsNode {
    pub id: u32,
    pub title: String,
    /// `None` only for the root.
    pub parent: Option<u32>,
    pub restricted: bool,
    pub kind: NodeKind,
}

#[derive(Debug)]
pub enum NodeKind {
    Container(ContainerNode),
    Resource(ResourceNode),
}

impl VfsNode {
    pub fn as_container(&self) -> Option<&ContainerNode> {
        match &self.kind {
            NodeKind::Container(c) => Some(c),
            NodeKind::Resource(_) => None,
        }
    }

    pub fn as_resource(&self) -> Option<&ResourceNode> {
        match &self.kind {
            NodeKind::Resource(r) => Some(r),
            NodeKind::Container(_) => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container(_))
    }
}

#[derive(Debug, Default)]
pub struct ContainerNode {
    children: Vec<u32>,
    update_id: u32,
}

impl ContainerNode {
    /// Child ids in insertion order.
    pub fn children(&self) -> &[u32] {
        &self.children
    }

    pub fn children_count(&self) -> usize {
        self.children.len()
    }

    pub fn update_id(&self) -> u32 {
        self.update_id
    }

    fn bump(&mut self) {
        self.update_id = self.update_id.wrapping_add(1);
    }
}

/// One advertised way of fetching a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportBinding {
    pub url: String,
    pub flags: u32,
}

/// A resource's file together with its lazily filled classification.
///
/// Readers clone the slot out of the tree, so classification runs without
/// holding the tree.
#[derive(Debug)]
pub struct MediaSlot {
    path: PathBuf,
    media: OnceLock<MediaResult>,
}

impl MediaSlot {
    fn new(path: PathBuf) -> Self {
        MediaSlot {
            path,
            media: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached classification, if the file has been probed.
    pub fn get(&self) -> Option<&MediaResult> {
        self.media.get()
    }

    /// Classify on first use. Concurrent callers block until the single
    /// classification finishes and then share its result.
    pub fn classify(&self, registry: &Registry, demuxer: &dyn Demuxer) -> &MediaResult {
        self.media.get_or_init(|| {
            registry
                .classify(demuxer, &self.path)
                .map(Arc::new)
                .map_err(Arc::new)
        })
    }

    /// The classified item, or `None` when classification failed.
    pub fn media_item(&self, registry: &Registry, demuxer: &dyn Demuxer) -> Option<Arc<MediaItem>> {
        self.classify(registry, demuxer).as_ref().ok().cloned()
    }
}

#[derive(Debug)]
pub struct ResourceNode {
    slot: Arc<MediaSlot>,
    pub conversion: Conversion,
    pub bindings: Vec<TransportBinding>,
}

impl ResourceNode {
    fn new(path: PathBuf) -> Self {
        ResourceNode {
            slot: Arc::new(MediaSlot::new(path)),
            conversion: Conversion::None,
            bindings: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        self.slot.path()
    }

    pub fn media(&self) -> Option<&MediaResult> {
        self.slot.get()
    }

    pub fn classify(&self, registry: &Registry, demuxer: &dyn Demuxer) -> &MediaResult {
        self.slot.classify(registry, demuxer)
    }

    pub fn media_item(&self, registry: &Registry, demuxer: &dyn Demuxer) -> Option<Arc<MediaItem>> {
        self.slot.media_item(registry, demuxer)
    }

    /// Shared handle on the file and its classification cache.
    pub fn slot(&self) -> Arc<MediaSlot> {
        Arc::clone(&self.slot)
    }
}

/// The catalog. Node ids come from a counter and are never reused.
#[derive(Debug)]
pub struct VfsTree {
    nodes: HashMap<u32, VfsNode>,
    next_id: u32,
    system_update_id: u32,
}

impl Default for VfsTree {
    fn default() -> Self {
        VfsTree::new("root")
    }
}

impl VfsTree {
    pub fn new(root_title: &str) -> Self {
        let root = VfsNode {
            id: ROOT_ID,
            title: root_title.to_string(),
            parent: None,
            restricted: true,
            kind: NodeKind::Container(ContainerNode::default()),
        };
        VfsTree {
            nodes: HashMap::from([(ROOT_ID, root)]),
            next_id: ROOT_ID + 1,
            system_update_id: 0,
        }
    }

    pub fn root(&self) -> &VfsNode {
        &self.nodes[&ROOT_ID]
    }

    pub fn get(&self, id: u32) -> Option<&VfsNode> {
        self.nodes.get(&id)
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True while the root holds no children.
    pub fn is_empty(&self) -> bool {
        self.root().as_container().map_or(true, |c| c.children.is_empty())
    }

    /// Bumped on every mutation of the tree.
    pub fn system_update_id(&self) -> u32 {
        self.system_update_id
    }

    /// Live children of a container, in insertion order.
    pub fn children_of(&self, id: u32) -> Result<Vec<&VfsNode>, VfsError> {
        let node = self.nodes.get(&id).ok_or(VfsError::NoSuchNode(id))?;
        let container = node.as_container().ok_or(VfsError::NotAContainer(id))?;
        Ok(container
            .children
            .iter()
            .filter_map(|c| self.nodes.get(c))
            .collect())
    }

    pub fn add_container(&mut self, parent: u32, title: &str) -> Result<u32, VfsError> {
        self.insert(
            parent,
            title,
            NodeKind::Container(ContainerNode::default()),
        )
    }

    pub fn add_resource(&mut self, parent: u32, title: &str, path: impl Into<PathBuf>) -> Result<u32, VfsError> {
        self.insert(
            parent,
            title,
            NodeKind::Resource(ResourceNode::new(path.into())),
        )
    }

    fn insert(&mut self, parent: u32, title: &str, kind: NodeKind) -> Result<u32, VfsError> {
        let id = self.next_id;
        let container = self.container_mut(parent)?;
        container.children.push(id);
        container.bump();

        self.nodes.insert(
            id,
            VfsNode {
                id,
                title: title.to_string(),
                parent: Some(parent),
                restricted: true,
                kind,
            },
        );
        self.next_id += 1;
        self.system_update_id = self.system_update_id.wrapping_add(1);
        Ok(id)
    }

    /// Remove `id` and its whole subtree.
    pub fn remove(&mut self, id: u32) -> Result<(), VfsError> {
        if id == ROOT_ID {
            return Err(VfsError::RootRemoval);
        }
        let parent = self
            .nodes
            .get(&id)
            .ok_or(VfsError::NoSuchNode(id))?
            .parent
            .ok_or(VfsError::RootRemoval)?;

        let container = self.container_mut(parent)?;
        container.children.retain(|&c| c != id);
        container.bump();

        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                if let NodeKind::Container(c) = node.kind {
                    stack.extend(c.children);
                }
            }
        }
        self.system_update_id = self.system_update_id.wrapping_add(1);
        Ok(())
    }

    /// Point a resource at a new file. The cached classification is dropped.
    pub fn relocate_resource(&mut self, id: u32, path: impl Into<PathBuf>) -> Result<(), VfsError> {
        let node = self.nodes.get_mut(&id).ok_or(VfsError::NoSuchNode(id))?;
        let NodeKind::Resource(resource) = &mut node.kind else {
            return Err(VfsError::NotAResource(id));
        };
        resource.slot = Arc::new(MediaSlot::new(path.into()));
        self.system_update_id = self.system_update_id.wrapping_add(1);
        Ok(())
    }

    /// Advertise one more transport for a resource.
    pub fn add_binding(&mut self, id: u32, binding: TransportBinding) -> Result<(), VfsError> {
        let node = self.nodes.get_mut(&id).ok_or(VfsError::NoSuchNode(id))?;
        let NodeKind::Resource(resource) = &mut node.kind else {
            return Err(VfsError::NotAResource(id));
        };
        resource.bindings.push(binding);
        Ok(())
    }

    /// Every resource id, depth-first in display order.
    pub fn resource_ids(&self) -> Vec<u32> {
        let mut ids = Vec::new();
        let mut stack = vec![ROOT_ID];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            match &node.kind {
                NodeKind::Container(c) => stack.extend(c.children.iter().rev()),
                NodeKind::Resource(_) => ids.push(id),
            }
        }
        ids
    }

    /// Find a direct child container by title.
    pub fn find_container(&self, parent: u32, title: &str) -> Option<u32> {
        self.children_of(parent)
            .ok()?
            .into_iter()
            .find(|n| n.is_container() && n.title == title)
            .map(|n| n.id)
    }

    fn container_mut(&mut self, id: u32) -> Result<&mut ContainerNode, VfsError> {
        match self.nodes.get_mut(&id) {
            Some(VfsNode {
                kind: NodeKind::Container(c),
                ..
            }) => Ok(c),
            Some(_) => Err(VfsError::NotAContainer(id)),
            None => Err(VfsError::NoSuchNode(id)),
        }
    }
}
