//! Arena-backed document used by the CLI and the test suites.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use sweeper_core_types::NodeId;

use crate::error::{AdapterError, AdapterErrorKind};
use crate::fixture::DocumentFixture;
use crate::ports::{DocumentTree, MutationNotice, MutationSource, MutationSubscription};

const SUBSCRIPTION_BUFFER: usize = 16;

#[derive(Clone, Debug)]
struct NodeRecord {
    tag: String,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeRecord {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

struct Watcher {
    root: NodeId,
    sender: mpsc::Sender<MutationNotice>,
    token: CancellationToken,
}

/// Mutable element tree with identity-stable node ids.
///
/// Removed subtrees stay in the arena (detached) so handles held elsewhere keep
/// resolving; ids are never reused.
pub struct InMemoryDocument {
    nodes: RwLock<HashMap<NodeId, NodeRecord>>,
    body: NodeId,
    next_id: AtomicU64,
    sequence: AtomicU64,
    watchers: Mutex<Vec<Watcher>>,
    observable: bool,
}

impl InMemoryDocument {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(true))
    }

    /// A document whose mutation subscription capability is missing.
    pub fn without_observer() -> Arc<Self> {
        Arc::new(Self::build(false))
    }

    /// Builds a document from a fixture. A `body` fixture seeds the body
    /// element itself; any other tag is appended as the body's only child.
    pub fn from_fixture(fixture: &DocumentFixture) -> Arc<Self> {
        let doc = Self::build(true);
        {
            let mut nodes = doc.nodes.write();
            if fixture.tag.eq_ignore_ascii_case("body") {
                if let Some(body) = nodes.get_mut(&doc.body) {
                    body.attributes = fixture.attributes.clone();
                    if let Some(id) = &fixture.id {
                        body.attributes.insert("id".into(), id.clone());
                    }
                }
                for child in &fixture.children {
                    doc.insert_fixture(&mut nodes, doc.body, child);
                }
            } else {
                doc.insert_fixture(&mut nodes, doc.body, fixture);
            }
        }
        Arc::new(doc)
    }

    fn build(observable: bool) -> Self {
        let body = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(body, NodeRecord::new("body"));
        Self {
            nodes: RwLock::new(nodes),
            body,
            next_id: AtomicU64::new(1),
            sequence: AtomicU64::new(0),
            watchers: Mutex::new(Vec::new()),
            observable,
        }
    }

    fn allocate(&self) -> NodeId {
        NodeId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn insert_fixture(
        &self,
        nodes: &mut HashMap<NodeId, NodeRecord>,
        parent: NodeId,
        fixture: &DocumentFixture,
    ) -> NodeId {
        let id = self.allocate();
        let mut record = NodeRecord::new(&fixture.tag);
        record.attributes = fixture.attributes.clone();
        if let Some(element_id) = &fixture.id {
            record.attributes.insert("id".into(), element_id.clone());
        }
        record.parent = Some(parent);
        nodes.insert(id, record);
        if let Some(parent_record) = nodes.get_mut(&parent) {
            parent_record.children.push(id);
        }
        for child in &fixture.children {
            self.insert_fixture(nodes, id, child);
        }
        id
    }

    /// Appends an empty element under `parent`.
    pub fn append_child(&self, parent: NodeId, tag: &str) -> Result<NodeId, AdapterError> {
        self.append_fixture(parent, &DocumentFixture::element(tag))
    }

    /// Appends a whole fixture subtree under `parent` as one child-list change.
    pub fn append_fixture(
        &self,
        parent: NodeId,
        fixture: &DocumentFixture,
    ) -> Result<NodeId, AdapterError> {
        let id = {
            let mut nodes = self.nodes.write();
            if !nodes.contains_key(&parent) {
                return Err(AdapterError::node_not_found(parent));
            }
            self.insert_fixture(&mut nodes, parent, fixture)
        };
        self.notify(parent);
        Ok(id)
    }

    /// Swaps every child of `parent` for the given fixtures as one change.
    ///
    /// The previous children are detached, not freed: the detector snapshot and
    /// published events may still hold their ids, and those must keep resolving
    /// to the same element. Growth is bounded by the fixtures applied.
    pub fn replace_children(
        &self,
        parent: NodeId,
        fixtures: &[DocumentFixture],
    ) -> Result<Vec<NodeId>, AdapterError> {
        let ids = {
            let mut nodes = self.nodes.write();
            let previous = match nodes.get_mut(&parent) {
                Some(record) => std::mem::take(&mut record.children),
                None => return Err(AdapterError::node_not_found(parent)),
            };
            for child in previous {
                if let Some(record) = nodes.get_mut(&child) {
                    record.parent = None;
                }
            }
            fixtures
                .iter()
                .map(|fixture| self.insert_fixture(&mut nodes, parent, fixture))
                .collect::<Vec<_>>()
        };
        self.notify(parent);
        Ok(ids)
    }

    /// Detaches `node` from its parent. The body cannot be removed.
    pub fn remove(&self, node: NodeId) -> Result<(), AdapterError> {
        if node == self.body {
            return Err(AdapterError::new(AdapterErrorKind::InvalidMutation)
                .with_hint("the body element cannot be removed"));
        }
        let parent = {
            let mut nodes = self.nodes.write();
            let parent = nodes
                .get_mut(&node)
                .ok_or_else(|| AdapterError::node_not_found(node))?
                .parent
                .take();
            if let Some(parent) = parent {
                if let Some(record) = nodes.get_mut(&parent) {
                    record.children.retain(|child| *child != node);
                }
            }
            parent
        };
        if let Some(parent) = parent {
            self.notify(parent);
        }
        Ok(())
    }

    /// Attribute writes are not child-list changes and notify nobody.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), AdapterError> {
        let mut nodes = self.nodes.write();
        let record = nodes
            .get_mut(&node)
            .ok_or_else(|| AdapterError::node_not_found(node))?;
        record.attributes.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.nodes
            .read()
            .get(&node)
            .and_then(|record| record.style.get(property).cloned())
    }

    pub fn is_hidden(&self, node: NodeId) -> bool {
        self.style(node, "display").as_deref() == Some("none")
    }

    /// Nodes carrying any inline style, in id order.
    pub fn styled_nodes(&self) -> Vec<NodeId> {
        let nodes = self.nodes.read();
        let mut styled: Vec<NodeId> = nodes
            .iter()
            .filter(|(_, record)| !record.style.is_empty())
            .map(|(id, _)| *id)
            .collect();
        styled.sort();
        styled
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        let nodes = self.nodes.read();
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.body {
                return true;
            }
            current = nodes.get(&id).and_then(|record| record.parent);
        }
        false
    }

    /// Finds the first attached element (document order) with the attribute
    /// value.
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        let nodes = self.nodes.read();
        let mut stack = vec![self.body];
        while let Some(id) = stack.pop() {
            let record = nodes.get(&id)?;
            if record.attributes.get(name).map(String::as_str) == Some(value) {
                return Some(id);
            }
            stack.extend(record.children.iter().rev().copied());
        }
        None
    }

    pub fn subscriber_count(&self) -> usize {
        let mut watchers = self.watchers.lock();
        watchers.retain(|watcher| !watcher.token.is_cancelled());
        watchers.len()
    }

    fn inclusive_ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.read();
        let mut chain = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            chain.push(id);
            current = nodes.get(&id).and_then(|record| record.parent);
        }
        chain
    }

    fn notify(&self, changed_parent: NodeId) {
        let chain = self.inclusive_ancestors(changed_parent);
        let notice = MutationNotice {
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed) + 1,
        };
        let mut watchers = self.watchers.lock();
        watchers.retain(|watcher| {
            if watcher.token.is_cancelled() {
                return false;
            }
            if !chain.contains(&watcher.root) {
                return true;
            }
            match watcher.sender.try_send(notice) {
                Ok(()) => true,
                // A queued notice already carries the signal.
                Err(mpsc::error::TrySendError::Full(_)) => true,
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
        trace!(target: "document", %changed_parent, sequence = notice.sequence, "child list changed");
    }
}

impl DocumentTree for InMemoryDocument {
    type Node = NodeId;

    fn body(&self) -> NodeId {
        self.body
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_by_attribute("id", id)
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes
            .read()
            .get(node)
            .map(|record| record.children.clone())
            .unwrap_or_default()
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.read().get(node).and_then(|record| record.parent)
    }

    fn tag_name(&self, node: &NodeId) -> Option<String> {
        self.nodes.read().get(node).map(|record| record.tag.clone())
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.nodes
            .read()
            .get(node)
            .and_then(|record| record.attributes.get(name).cloned())
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) -> Result<(), AdapterError> {
        let mut nodes = self.nodes.write();
        let record = nodes
            .get_mut(node)
            .ok_or_else(|| AdapterError::node_not_found(node))?;
        record.style.insert(property.to_string(), value.to_string());
        Ok(())
    }
}

impl MutationSource for InMemoryDocument {
    fn observe_subtree(&self, root: &NodeId) -> Result<MutationSubscription, AdapterError> {
        if !self.observable {
            return Err(AdapterError::new(AdapterErrorKind::SubscriptionUnavailable));
        }
        if !self.nodes.read().contains_key(root) {
            return Err(AdapterError::node_not_found(root));
        }
        let (sender, receiver) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let token = CancellationToken::new();
        self.watchers.lock().push(Watcher {
            root: *root,
            sender,
            token: token.clone(),
        });
        debug!(target: "document", %root, "subtree observer registered");
        Ok(MutationSubscription::new(receiver, token))
    }
}
