use crate::values::FormValues;
use async_trait::async_trait;

/// What the submit handler receives.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitPayload {
    pub values: FormValues,
}

/// Performs the actual submission (persistence, API call, ...).
/// Errors are handed back to the caller of `FormEngine::submit`.
#[async_trait]
pub trait SubmitHandler: Send + Sync {
    async fn on_submit(&self, payload: SubmitPayload) -> anyhow::Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NotOnLastPage,
    AlreadySubmitting,
    Invalid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    Skipped(SkipReason),
}
