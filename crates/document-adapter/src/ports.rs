use std::fmt::Debug;
use std::hash::Hash;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::AdapterError;

/// Read access to an externally owned, externally mutated element tree plus
/// the one write the observer is allowed to make (inline style).
///
/// Implementations hand out cheap node handles whose equality is identity of
/// the underlying element.
pub trait DocumentTree: Send + Sync {
    type Node: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    fn body(&self) -> Self::Node;

    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Element children in document order.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    fn tag_name(&self, node: &Self::Node) -> Option<String>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_style(&self, node: &Self::Node, property: &str, value: &str)
        -> Result<(), AdapterError>;
}

/// Register-once capability for child-list change notifications.
pub trait MutationSource: DocumentTree {
    fn observe_subtree(&self, root: &Self::Node) -> Result<MutationSubscription, AdapterError>;
}

/// Batched "something changed under the observed root" signal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MutationNotice {
    pub sequence: u64,
}

/// Live registration returned by [`MutationSource::observe_subtree`].
///
/// Dropping the subscription detaches it; the source prunes cancelled
/// registrations on its next mutation.
pub struct MutationSubscription {
    receiver: mpsc::Receiver<MutationNotice>,
    token: CancellationToken,
}

impl MutationSubscription {
    pub fn new(receiver: mpsc::Receiver<MutationNotice>, token: CancellationToken) -> Self {
        Self { receiver, token }
    }

    /// Waits for the next notice. Returns `None` once the source is gone.
    pub async fn recv(&mut self) -> Option<MutationNotice> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<MutationNotice> {
        self.receiver.try_recv().ok()
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for MutationSubscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl Debug for MutationSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationSubscription")
            .field("active", &self.is_active())
            .finish()
    }
}
