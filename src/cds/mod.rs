//! ContentDirectory browse and search over a [`VfsTree`].

pub mod search;

use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::error::CdsError;
use crate::media::demux::Demuxer;
use crate::media::item::MediaItem;
use crate::profiles::protocol::{self, operation, PlaySpeed};
use crate::profiles::Registry;
use crate::vfs::{MediaResult, MediaSlot, NodeKind, ResourceNode, VfsNode, VfsTree, ROOT_ID};

use self::search::SearchTarget;

/// UPnP class advertised for every container.
pub const CONTAINER_CLASS: &str = "object.container.storageFolder";

// ── Browse flag ──────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BrowseFlag {
    Metadata,
    DirectChildren,
}

impl FromStr for BrowseFlag {
    type Err = CdsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BrowseMetadata" => Ok(BrowseFlag::Metadata),
            "BrowseDirectChildren" => Ok(BrowseFlag::DirectChildren),
            other => Err(CdsError::InvalidArgs(format!("unknown browse flag {other:?}"))),
        }
    }
}

// ── Result objects ───────────────────────────────────────────────────────────

/// One entry of a browse or search result.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DidlObject {
    Container(ContainerEntry),
    Item(ItemEntry),
}

impl DidlObject {
    pub fn id(&self) -> u32 {
        match self {
            DidlObject::Container(c) => c.id,
            DidlObject::Item(i) => i.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            DidlObject::Container(c) => &c.title,
            DidlObject::Item(i) => &i.title,
        }
    }

    pub fn as_item(&self) -> Option<&ItemEntry> {
        match self {
            DidlObject::Item(i) => Some(i),
            DidlObject::Container(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContainerEntry {
    pub id: u32,
    /// `None` for the root, advertised as `-1`.
    pub parent_id: Option<u32>,
    pub title: String,
    pub restricted: bool,
    pub child_count: usize,
    pub class: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemEntry {
    pub id: u32,
    pub parent_id: Option<u32>,
    pub title: String,
    pub restricted: bool,
    /// Derived from the media class; `None` when unclassified.
    pub class: Option<&'static str>,
    pub protocol_info: Option<String>,
    /// Classification result; `None` when classification failed.
    pub media: Option<Arc<MediaItem>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrowseResult {
    pub objects: Vec<DidlObject>,
    pub number_returned: u32,
    pub total_matches: u32,
    pub update_id: u32,
}

/// Search reports `total_matches == number_returned`.
pub type SearchResult = BrowseResult;

// ── Pagination ───────────────────────────────────────────────────────────────

/// The window of a child list covered by one BrowseDirectChildren request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a> {
    pub ids: &'a [u32],
    /// Size of the whole list, whatever the window.
    pub total_matches: u32,
}

impl<'a> Page<'a> {
    /// Drop the first `starting_index` ids and keep at most `requested_count`
    /// of the rest. A zero count keeps the whole tail, so `0, 0` asks for
    /// every child.
    pub fn of(children: &'a [u32], starting_index: u32, requested_count: u32) -> Self {
        let tail = children.get(starting_index as usize..).unwrap_or_default();
        let ids = match requested_count as usize {
            0 => tail,
            n => &tail[..n.min(tail.len())],
        };
        Page {
            ids,
            total_matches: children.len() as u32,
        }
    }
}

// ── Snapshots ────────────────────────────────────────────────────────────────

/// An item copied out of the tree. The media slot is shared with the tree,
/// so a classification made from the snapshot lands in the tree's cache.
struct PendingItem {
    id: u32,
    parent_id: Option<u32>,
    title: String,
    restricted: bool,
    conversion: protocol::Conversion,
    slot: Arc<MediaSlot>,
}

enum Pending {
    Container(ContainerEntry),
    Item(PendingItem),
}

/// Everything a browse answer needs from the tree, minus classification.
struct BrowseSnapshot {
    objects: Vec<Pending>,
    total_matches: u32,
    update_id: u32,
}

/// Search candidates in pre-order.
struct SearchSnapshot {
    items: Vec<PendingItem>,
    update_id: u32,
}

fn capture(node: &VfsNode) -> Pending {
    match &node.kind {
        NodeKind::Container(c) => Pending::Container(ContainerEntry {
            id: node.id,
            parent_id: node.parent,
            title: node.title.clone(),
            restricted: node.restricted,
            child_count: c.children_count(),
            class: CONTAINER_CLASS,
        }),
        NodeKind::Resource(r) => Pending::Item(capture_item(node, r)),
    }
}

fn capture_item(node: &VfsNode, resource: &ResourceNode) -> PendingItem {
    PendingItem {
        id: node.id,
        parent_id: node.parent,
        title: node.title.clone(),
        restricted: node.restricted,
        conversion: resource.conversion,
        slot: resource.slot(),
    }
}

/// Browse and search against a borrowed tree. Nothing here classifies.
struct TreeReader<'a> {
    tree: &'a VfsTree,
}

impl TreeReader<'_> {
    fn browse(
        &self,
        id: u32,
        flag: BrowseFlag,
        starting_index: u32,
        requested_count: u32,
    ) -> Result<BrowseSnapshot, CdsError> {
        match flag {
            BrowseFlag::Metadata if starting_index != 0 => {
                Err(CdsError::ModeError("BrowseMetadata requires StartingIndex 0"))
            }
            BrowseFlag::Metadata => self.metadata(id),
            BrowseFlag::DirectChildren => self.children(id, starting_index, requested_count),
        }
    }

    fn metadata(&self, id: u32) -> Result<BrowseSnapshot, CdsError> {
        let node = self.tree.get(id).ok_or(CdsError::NoSuchObject(id))?;
        // A resource reports its parent's update id.
        let update_id = match &node.kind {
            NodeKind::Container(c) => c.update_id(),
            NodeKind::Resource(_) => node
                .parent
                .and_then(|p| self.tree.get(p))
                .and_then(VfsNode::as_container)
                .map_or(0, |c| c.update_id()),
        };
        tracing::debug!(id, update_id, "BrowseMetadata");
        Ok(BrowseSnapshot {
            objects: vec![capture(node)],
            total_matches: 1,
            update_id,
        })
    }

    fn children(&self, id: u32, starting_index: u32, requested_count: u32) -> Result<BrowseSnapshot, CdsError> {
        let node = self.tree.get(id).ok_or(CdsError::NoSuchObject(id))?;
        let container = node
            .as_container()
            .ok_or(CdsError::ModeError("BrowseDirectChildren on a non-container object"))?;

        let page = Page::of(container.children(), starting_index, requested_count);
        let objects: Vec<Pending> = page
            .ids
            .iter()
            .filter_map(|c| self.tree.get(*c))
            .map(capture)
            .collect();
        tracing::debug!(
            id,
            starting_index,
            requested_count,
            returned = objects.len(),
            "BrowseDirectChildren"
        );
        Ok(BrowseSnapshot {
            objects,
            total_matches: page.total_matches,
            update_id: container.update_id(),
        })
    }

    /// Every resource under `id` in pre-order. Unknown ids search from the
    /// root.
    fn search(&self, id: u32) -> Result<SearchSnapshot, CdsError> {
        let root = self
            .tree
            .get(id)
            .or_else(|| self.tree.get(ROOT_ID))
            .ok_or(CdsError::InvalidContainer(id))?;
        let container = root.as_container().ok_or(CdsError::InvalidContainer(id))?;

        let mut items = Vec::new();
        let mut stack = vec![root.id];
        while let Some(next) = stack.pop() {
            let Some(node) = self.tree.get(next) else {
                continue;
            };
            match &node.kind {
                NodeKind::Container(c) => stack.extend(c.children().iter().rev()),
                NodeKind::Resource(r) => items.push(capture_item(node, r)),
            }
        }
        Ok(SearchSnapshot {
            items,
            update_id: container.update_id(),
        })
    }
}

/// Turns snapshots into result objects, classifying items on the way.
#[derive(Clone, Copy)]
struct Describer<'a> {
    registry: &'a Registry,
    demuxer: &'a dyn Demuxer,
    flags: u32,
}

impl Describer<'_> {
    fn browse(&self, snapshot: BrowseSnapshot) -> BrowseResult {
        let objects: Vec<DidlObject> = snapshot
            .objects
            .into_iter()
            .map(|pending| match pending {
                Pending::Container(c) => DidlObject::Container(c),
                Pending::Item(item) => DidlObject::Item(self.item(item)),
            })
            .collect();
        BrowseResult {
            number_returned: objects.len() as u32,
            total_matches: snapshot.total_matches,
            update_id: snapshot.update_id,
            objects,
        }
    }

    /// `starting_index` is accepted but not applied.
    fn search(&self, snapshot: SearchSnapshot, criteria: &str, requested_count: u32) -> SearchResult {
        let limit = match requested_count {
            0 => usize::MAX,
            n => n as usize,
        };
        let mut objects = Vec::new();
        for pending in snapshot.items {
            if objects.len() >= limit {
                break;
            }
            let item = self.item(pending);
            let target = SearchTarget {
                class: item.class,
                protocol_info: item.protocol_info.as_deref(),
            };
            if search::matches(criteria, &target) {
                objects.push(DidlObject::Item(item));
            }
        }

        let count = objects.len() as u32;
        SearchResult {
            objects,
            number_returned: count,
            total_matches: count,
            update_id: snapshot.update_id,
        }
    }

    fn item(&self, pending: PendingItem) -> ItemEntry {
        let media = pending.slot.media_item(self.registry, self.demuxer);
        let class = media.as_ref().and_then(|m| m.media_class().upnp_class());
        let protocol_info = media.as_ref().and_then(|m| {
            m.profile.as_ref().map(|p| {
                protocol::protocol_info_string(
                    p,
                    PlaySpeed::Normal,
                    pending.conversion,
                    operation::RANGE,
                    self.flags,
                )
            })
        });
        ItemEntry {
            id: pending.id,
            parent_id: pending.parent_id,
            title: pending.title,
            restricted: pending.restricted,
            class,
            protocol_info,
            media,
        }
    }
}

// ── Engine ───────────────────────────────────────────────────────────────────

/// Read-only view over a tree, with the collaborators needed to describe
/// resources. Classification runs lazily on first description.
#[derive(Clone, Copy)]
pub struct CdsView<'a> {
    pub tree: &'a VfsTree,
    pub registry: &'a Registry,
    pub demuxer: &'a dyn Demuxer,
    /// `DLNA.ORG_FLAGS` primary word for generated protocol info.
    pub flags: u32,
}

impl<'a> CdsView<'a> {
    pub fn new(tree: &'a VfsTree, registry: &'a Registry, demuxer: &'a dyn Demuxer) -> Self {
        CdsView {
            tree,
            registry,
            demuxer,
            flags: protocol::flags::DEFAULT,
        }
    }

    pub fn browse(
        &self,
        id: u32,
        flag: BrowseFlag,
        starting_index: u32,
        requested_count: u32,
    ) -> Result<BrowseResult, CdsError> {
        let snapshot = self.reader().browse(id, flag, starting_index, requested_count)?;
        Ok(self.describer().browse(snapshot))
    }

    /// Describe a single object.
    pub fn browse_metadata(&self, id: u32) -> Result<BrowseResult, CdsError> {
        self.browse(id, BrowseFlag::Metadata, 0, 0)
    }

    pub fn browse_children(
        &self,
        id: u32,
        starting_index: u32,
        requested_count: u32,
    ) -> Result<BrowseResult, CdsError> {
        self.browse(id, BrowseFlag::DirectChildren, starting_index, requested_count)
    }

    /// Pre-order walk under `id`, returning matching resources. Unknown ids
    /// search from the root. `starting_index` is accepted but not applied.
    pub fn search(
        &self,
        id: u32,
        criteria: &str,
        starting_index: u32,
        requested_count: u32,
    ) -> Result<SearchResult, CdsError> {
        let snapshot = self.reader().search(id)?;
        let result = self.describer().search(snapshot, criteria, requested_count);
        tracing::debug!(id, criteria, starting_index, matches = result.number_returned, "Search");
        Ok(result)
    }

    fn reader(&self) -> TreeReader<'a> {
        TreeReader { tree: self.tree }
    }

    fn describer(&self) -> Describer<'a> {
        Describer {
            registry: self.registry,
            demuxer: self.demuxer,
            flags: self.flags,
        }
    }
}

/// The ContentDirectory capability strings; this engine advertises none.
pub fn search_capabilities() -> &'static str {
    ""
}

pub fn sort_capabilities() -> &'static str {
    ""
}

// ── Shared directory ─────────────────────────────────────────────────────────

/// A catalog shared between one writer and many readers.
///
/// Browse and search copy what they need out of the tree under the read
/// lock and classify after releasing it, so a slow probe never holds up
/// the writer or the readers queued behind it.
pub struct ContentDirectory {
    tree: RwLock<VfsTree>,
    registry: Arc<Registry>,
    demuxer: Arc<dyn Demuxer>,
    flags: u32,
}

impl ContentDirectory {
    pub fn new(tree: VfsTree, registry: Arc<Registry>, demuxer: Arc<dyn Demuxer>) -> Self {
        ContentDirectory {
            tree: RwLock::new(tree),
            registry,
            demuxer,
            flags: protocol::flags::DEFAULT,
        }
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Shared access for traversals. A poisoned lock still yields the tree:
    /// mutators never leave it half-linked.
    pub fn read(&self) -> RwLockReadGuard<'_, VfsTree> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, VfsTree> {
        self.tree.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn system_update_id(&self) -> u32 {
        self.read().system_update_id()
    }

    pub fn browse(
        &self,
        id: u32,
        flag: BrowseFlag,
        starting_index: u32,
        requested_count: u32,
    ) -> Result<BrowseResult, CdsError> {
        let snapshot = {
            let tree = self.read();
            TreeReader { tree: &tree }.browse(id, flag, starting_index, requested_count)?
        };
        Ok(self.describer().browse(snapshot))
    }

    pub fn search(
        &self,
        id: u32,
        criteria: &str,
        starting_index: u32,
        requested_count: u32,
    ) -> Result<SearchResult, CdsError> {
        let snapshot = {
            let tree = self.read();
            TreeReader { tree: &tree }.search(id)?
        };
        let result = self.describer().search(snapshot, criteria, requested_count);
        tracing::debug!(id, criteria, starting_index, matches = result.number_returned, "Search");
        Ok(result)
    }

    /// Classify one resource ahead of browsing. Returns `None` for ids that
    /// are missing or not resources.
    pub fn classify_resource(&self, id: u32) -> Option<MediaResult> {
        let slot = self.read().get(id)?.as_resource()?.slot();
        Some(slot.classify(&self.registry, self.demuxer.as_ref()).clone())
    }

    fn describer(&self) -> Describer<'_> {
        Describer {
            registry: &self.registry,
            demuxer: self.demuxer.as_ref(),
            flags: self.flags,
        }
    }
}
