use std::time::Duration;

use perceiver_pattern::PatternProfile;
use serde::Serialize;
use sweeper_core_types::EpisodeId;
use tokio::time::Instant;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerPhase {
    Idle,
    Debouncing,
    Polling,
}

impl SchedulerPhase {
    pub fn label(self) -> &'static str {
        match self {
            SchedulerPhase::Idle => "idle",
            SchedulerPhase::Debouncing => "debouncing",
            SchedulerPhase::Polling => "polling",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObserverTimings {
    /// Quiet period after the last mutation notice before polling starts.
    pub debounce: Duration,
    pub poll_interval: Duration,
    /// How long an unchanged tree must persist before the episode is stable.
    pub stability_window: Duration,
}

impl Default for ObserverTimings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(100),
            poll_interval: Duration::from_millis(50),
            stability_window: Duration::from_millis(500),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ObserverOptions {
    pub timings: ObserverTimings,
    pub profile: PatternProfile,
}

/// Debounce and poll bookkeeping. Transitions are plain methods so the
/// runtime task only has to arm timers from what they return.
#[derive(Debug, Default)]
pub struct SchedulerState {
    debounce_deadline: Option<Instant>,
    episode: Option<EpisodeId>,
    cycles: u32,
}

impl SchedulerState {
    pub fn phase(&self) -> SchedulerPhase {
        if self.episode.is_some() {
            SchedulerPhase::Polling
        } else if self.debounce_deadline.is_some() {
            SchedulerPhase::Debouncing
        } else {
            SchedulerPhase::Idle
        }
    }

    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debounce_deadline
    }

    pub fn episode(&self) -> Option<&EpisodeId> {
        self.episode.as_ref()
    }

    pub fn is_polling(&self) -> bool {
        self.episode.is_some()
    }

    /// (Re)arms the debounce timer. Returns `true` when it replaced a pending
    /// one.
    pub fn on_mutation(&mut self, now: Instant, debounce: Duration) -> bool {
        self.debounce_deadline.replace(now + debounce).is_some()
    }

    /// Debounce fired. Returns the new episode when polling has to start, or
    /// `None` when a poll loop is already running.
    pub fn on_debounce_elapsed(&mut self) -> Option<EpisodeId> {
        self.debounce_deadline = None;
        self.start_polling()
    }

    pub fn start_polling(&mut self) -> Option<EpisodeId> {
        if self.episode.is_some() {
            return None;
        }
        let episode = EpisodeId::new();
        self.episode = Some(episode.clone());
        self.cycles = 0;
        Some(episode)
    }

    /// Counts one poll tick of the running episode.
    pub fn on_poll(&mut self) -> u32 {
        self.cycles = self.cycles.saturating_add(1);
        self.cycles
    }

    /// Ends the episode and drops any pending debounce with it.
    pub fn on_terminal(&mut self) -> Option<(EpisodeId, u32)> {
        self.debounce_deadline = None;
        let cycles = std::mem::take(&mut self.cycles);
        self.episode.take().map(|episode| (episode, cycles))
    }
}
