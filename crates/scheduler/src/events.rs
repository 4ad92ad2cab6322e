use perceiver_pattern::Convergence;
use sweeper_core_types::{EpisodeId, ObserverConfig};

/// Lifecycle notifications published on the observer's event bus.
#[derive(Clone, Debug, PartialEq)]
pub enum ObserverEvent<N> {
    EpisodeStarted {
        episode: EpisodeId,
    },
    /// `episode` is `None` when the action came from a control-triggered
    /// cycle outside any polling episode.
    RegionSuppressed {
        episode: Option<EpisodeId>,
        region: N,
    },
    EpisodeFinished {
        episode: EpisodeId,
        outcome: Convergence,
        cycles: u32,
    },
    ConfigChanged {
        config: ObserverConfig,
    },
}

impl<N> ObserverEvent<N> {
    pub fn label(&self) -> &'static str {
        match self {
            ObserverEvent::EpisodeStarted { .. } => "episode_started",
            ObserverEvent::RegionSuppressed { .. } => "region_suppressed",
            ObserverEvent::EpisodeFinished { .. } => "episode_finished",
            ObserverEvent::ConfigChanged { .. } => "config_changed",
        }
    }
}
