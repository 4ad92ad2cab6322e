use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("observer stopped")]
    Stopped,
    #[error("observer dropped the reply")]
    ReplyDropped,
}

impl From<SchedulerError> for sweeper_core_types::SweepError {
    fn from(value: SchedulerError) -> Self {
        sweeper_core_types::SweepError::new(value.to_string())
    }
}
