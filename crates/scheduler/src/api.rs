use std::sync::Arc;

use document_adapter::MutationSource;
use parking_lot::Mutex;
use sweeper_event_bus::EventBus;
use sweeper_state_center::SettingsStore;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::control::{ControlRequest, ControlResponse};
use crate::error::SchedulerError;
use crate::events::ObserverEvent;
use crate::model::{ObserverOptions, SchedulerPhase};
use crate::runtime::{Command, ObserverStatus, ObserverTask};

const COMMAND_CAPACITY: usize = 32;

pub struct Observer;

impl Observer {
    /// Starts the observer task for `document`. Must be called inside a tokio
    /// runtime. Settings are loaded by the task before it handles any input.
    pub fn spawn<D>(
        document: Arc<D>,
        settings: Arc<dyn SettingsStore>,
        bus: Arc<dyn EventBus<ObserverEvent<D::Node>>>,
        options: ObserverOptions,
    ) -> ObserverHandle<D::Node>
    where
        D: MutationSource + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (phase_tx, phase_rx) = watch::channel(SchedulerPhase::Idle);
        let shutdown = CancellationToken::new();

        let task = ObserverTask {
            document,
            settings,
            bus: Arc::clone(&bus),
            options,
            commands: command_rx,
            phase_tx,
            shutdown: shutdown.clone(),
        };
        let join = tokio::spawn(task.run());

        ObserverHandle {
            commands: command_tx,
            phase: phase_rx,
            shutdown,
            bus,
            join: Arc::new(Mutex::new(Some(join))),
        }
    }
}

/// Cloneable handle to a running observer.
pub struct ObserverHandle<N> {
    commands: mpsc::Sender<Command>,
    phase: watch::Receiver<SchedulerPhase>,
    shutdown: CancellationToken,
    bus: Arc<dyn EventBus<ObserverEvent<N>>>,
    join: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl<N> Clone for ObserverHandle<N> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            phase: self.phase.clone(),
            shutdown: self.shutdown.clone(),
            bus: Arc::clone(&self.bus),
            join: Arc::clone(&self.join),
        }
    }
}

impl<N> ObserverHandle<N>
where
    N: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    pub async fn control(&self, request: ControlRequest) -> Result<ControlResponse, SchedulerError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Control { request, reply })
            .await
            .map_err(|_| SchedulerError::Stopped)?;
        rx.await.map_err(|_| SchedulerError::ReplyDropped)
    }

    pub async fn status(&self) -> Result<ObserverStatus, SchedulerError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Status { reply })
            .await
            .map_err(|_| SchedulerError::Stopped)?;
        rx.await.map_err(|_| SchedulerError::ReplyDropped)
    }

    /// Resolves once the task has loaded settings and attached its mutation
    /// subscription. Changes made before this may go unnoticed.
    pub async fn ready(&self) -> Result<(), SchedulerError> {
        self.status().await.map(|_| ())
    }

    pub fn phase(&self) -> SchedulerPhase {
        *self.phase.borrow()
    }

    pub fn phase_watch(&self) -> watch::Receiver<SchedulerPhase> {
        self.phase.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ObserverEvent<N>> {
        self.bus.subscribe()
    }

    pub fn is_running(&self) -> bool {
        !self.shutdown.is_cancelled() && !self.commands.is_closed()
    }

    /// Stops the task, dropping its timers and subscription, and waits for it
    /// to exit.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let join = self.join.lock().take();
        if let Some(join) = join {
            let _ = join.await;
        }
    }
}
