use std::future::pending;
use std::sync::Arc;

use document_adapter::{MutationNotice, MutationSource, MutationSubscription};
use perceiver_pattern::{run_cycle, Convergence, ConvergenceDetector, CycleOutcome};
use serde::Serialize;
use sweeper_core_types::ObserverConfig;
use sweeper_event_bus::EventBus;
use sweeper_state_center::{SettingsPatch, SettingsStore};
use tokio::select;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::control::{ControlRequest, ControlResponse};
use crate::events::ObserverEvent;
use crate::metrics;
use crate::model::{ObserverOptions, SchedulerPhase, SchedulerState};

/// Point-in-time view of the observer for status endpoints.
#[derive(Clone, Debug, Serialize)]
pub struct ObserverStatus {
    pub phase: SchedulerPhase,
    pub diagnostics_enabled: bool,
    pub globally_disabled: bool,
    pub episodes: u64,
    pub last_outcome: Option<Convergence>,
}

pub(crate) enum Command {
    Control {
        request: ControlRequest,
        reply: oneshot::Sender<ControlResponse>,
    },
    Status {
        reply: oneshot::Sender<ObserverStatus>,
    },
}

/// State owned by the observer task. Nothing here is shared; every input is
/// serialised through the select loop in [`ObserverTask::run`].
pub(crate) struct ObserverTask<D: MutationSource> {
    pub(crate) document: Arc<D>,
    pub(crate) settings: Arc<dyn SettingsStore>,
    pub(crate) bus: Arc<dyn EventBus<ObserverEvent<D::Node>>>,
    pub(crate) options: ObserverOptions,
    pub(crate) commands: mpsc::Receiver<Command>,
    pub(crate) phase_tx: watch::Sender<SchedulerPhase>,
    pub(crate) shutdown: CancellationToken,
}

struct Episodes<N> {
    state: SchedulerState,
    detector: ConvergenceDetector<N>,
    ticker: Option<Interval>,
    started: u64,
    last_outcome: Option<Convergence>,
}

impl<D: MutationSource + 'static> ObserverTask<D> {
    pub(crate) async fn run(mut self) {
        let mut config = match self.settings.load().await {
            Ok(stored) => stored.into_config(),
            Err(err) => {
                warn!(target: "scheduler", error = %err, "settings unavailable, using defaults");
                ObserverConfig::default()
            }
        };
        debug!(target: "scheduler", %config, "observer starting");

        let timings = self.options.timings;
        let mut episodes = Episodes {
            state: SchedulerState::default(),
            detector: ConvergenceDetector::new(timings.stability_window),
            ticker: None,
            started: 0,
            last_outcome: None,
        };

        let mut subscription = self.subscribe();
        if subscription.is_none() {
            self.begin_episode(&mut episodes).await;
        }

        loop {
            select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    debug!(target: "scheduler", "observer shutting down");
                    break;
                }
                Some(command) = self.commands.recv() => {
                    self.handle_command(command, &mut config, &episodes).await;
                }
                notice = next_notice(&mut subscription) => match notice {
                    Some(notice) => {
                        let restarted = episodes.state.on_mutation(Instant::now(), timings.debounce);
                        metrics::record_notice(restarted);
                        debug!(target: "scheduler", sequence = notice.sequence, restarted, "mutation notice");
                    }
                    None => {
                        warn!(target: "scheduler", "mutation subscription closed");
                        subscription = None;
                    }
                },
                _ = debounce_expiry(episodes.state.debounce_deadline()) => {
                    if episodes.state.is_polling() {
                        episodes.state.on_debounce_elapsed();
                        debug!(target: "scheduler", "debounce elapsed during poll, absorbed");
                    } else {
                        self.begin_episode(&mut episodes).await;
                    }
                }
                now = next_tick(&mut episodes.ticker) => {
                    self.poll(&mut episodes, &config, now).await;
                }
            }
            self.publish_phase(episodes.state.phase());
        }

        episodes.ticker = None;
        episodes.state.on_terminal();
        self.publish_phase(SchedulerPhase::Idle);
    }

    fn subscribe(&self) -> Option<MutationSubscription> {
        let container = &self.options.profile.container_id;
        let Some(root) = self.document.element_by_id(container) else {
            info!(target: "scheduler", container = %container, "container missing, polling without notifications");
            return None;
        };
        match self.document.observe_subtree(&root) {
            Ok(subscription) => Some(subscription),
            Err(err) => {
                warn!(target: "scheduler", error = %err, "mutation subscription unavailable, polling immediately");
                None
            }
        }
    }

    async fn begin_episode(&self, episodes: &mut Episodes<D::Node>) {
        let Some(episode) = episodes.state.on_debounce_elapsed() else {
            return;
        };
        episodes.detector.reset();
        episodes.started += 1;
        let period = self.options.timings.poll_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        episodes.ticker = Some(ticker);
        metrics::record_episode_started();
        info!(target: "scheduler", %episode, "polling episode started");
        self.publish(ObserverEvent::EpisodeStarted { episode }).await;
        self.publish_phase(episodes.state.phase());
    }

    async fn poll(&self, episodes: &mut Episodes<D::Node>, config: &ObserverConfig, now: Instant) {
        let cycle = episodes.state.on_poll();
        metrics::record_poll();
        let (status, outcome) =
            episodes
                .detector
                .check(&*self.document, &self.options.profile, config, now);
        debug!(target: "scheduler", cycle, status = status.label(), "poll tick");

        if let Some(region) = outcome.as_ref().and_then(CycleOutcome::suppressed) {
            self.publish(ObserverEvent::RegionSuppressed {
                episode: episodes.state.episode().cloned(),
                region: region.clone(),
            })
            .await;
        }

        if !status.is_terminal() {
            return;
        }
        episodes.ticker = None;
        episodes.last_outcome = Some(status);
        metrics::record_finished(status);
        if let Some((episode, cycles)) = episodes.state.on_terminal() {
            info!(target: "scheduler", %episode, cycles, outcome = status.label(), "polling episode finished");
            self.publish(ObserverEvent::EpisodeFinished {
                episode,
                outcome: status,
                cycles,
            })
            .await;
        }
    }

    async fn handle_command(
        &self,
        command: Command,
        config: &mut ObserverConfig,
        episodes: &Episodes<D::Node>,
    ) {
        match command {
            Command::Status { reply } => {
                let _ = reply.send(ObserverStatus {
                    phase: episodes.state.phase(),
                    diagnostics_enabled: config.diagnostics_enabled,
                    globally_disabled: config.globally_disabled,
                    episodes: episodes.started,
                    last_outcome: episodes.last_outcome,
                });
            }
            Command::Control { request, reply } => {
                metrics::record_control();
                let response = self.apply_control(request, config).await;
                if reply.send(response).is_err() {
                    debug!(target: "scheduler", "control caller went away before reply");
                }
            }
        }
    }

    async fn apply_control(
        &self,
        request: ControlRequest,
        config: &mut ObserverConfig,
    ) -> ControlResponse {
        let (patch, response) = match request {
            ControlRequest::GetStatus => return ControlResponse::status(config),
            ControlRequest::SetHighlight { value } => {
                *config = config.with_diagnostics(value);
                (
                    SettingsPatch::diagnostics(value),
                    ControlResponse::Diagnostics {
                        diagnostics_enabled: value,
                    },
                )
            }
            ControlRequest::SetDisable { value } => {
                *config = config.with_disabled(value);
                (
                    SettingsPatch::disabled(value),
                    ControlResponse::Disabled {
                        globally_disabled: value,
                    },
                )
            }
        };
        info!(target: "scheduler", %config, "observer config changed");

        if let Err(err) = self.settings.store(patch).await {
            warn!(target: "scheduler", error = %err, "failed to persist settings");
        }
        self.publish(ObserverEvent::ConfigChanged { config: *config })
            .await;

        // Out-of-band cycle; scheduler state and detector snapshot stay as
        // they are.
        let outcome = run_cycle(&*self.document, &self.options.profile, config);
        if let Some(region) = outcome.suppressed() {
            self.publish(ObserverEvent::RegionSuppressed {
                episode: None,
                region: region.clone(),
            })
            .await;
        }
        response
    }

    async fn publish(&self, event: ObserverEvent<D::Node>) {
        let label = event.label();
        if let Err(err) = self.bus.publish(event).await {
            debug!(target: "scheduler", event = label, error = %err, "event not delivered");
        }
    }

    fn publish_phase(&self, phase: SchedulerPhase) {
        self.phase_tx.send_if_modified(|current| {
            if *current == phase {
                false
            } else {
                *current = phase;
                true
            }
        });
    }
}

async fn next_notice(subscription: &mut Option<MutationSubscription>) -> Option<MutationNotice> {
    match subscription {
        Some(subscription) => subscription.recv().await,
        None => pending().await,
    }
}

async fn debounce_expiry(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

async fn next_tick(ticker: &mut Option<Interval>) -> Instant {
    match ticker {
        Some(ticker) => ticker.tick().await,
        None => pending().await,
    }
}
