use std::time::Instant;

use document_adapter::NodeId;
use sweeper_scheduler::ObserverHandle;

#[derive(Clone)]
pub struct ServeState {
    pub(crate) observer: ObserverHandle<NodeId>,
    pub(crate) started: Instant,
}

impl ServeState {
    pub fn new(observer: ObserverHandle<NodeId>) -> Self {
        Self {
            observer,
            started: Instant::now(),
        }
    }

    pub(crate) fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
