use crate::binding::{ReviewBinder, SubmissionBinder};
use crate::error::SubmissionError;
use crate::identity::IdentityProvider;
use crate::model::{Submission, SubmissionDraft, SubmissionPatch};
use crate::store::{DocumentStore, Page, SubmissionFilter};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ox_forms::{Binder, FormValues, SubmitHandler, SubmitPayload};
use std::sync::Arc;
use uuid::Uuid;

/// Saves `draft` as the caller's submission. Each participant owns at most
/// one record: an existing one is patched, otherwise a new one is created.
pub async fn create_or_update<S, I>(
    store: &S,
    identity: &I,
    draft: SubmissionDraft,
    now: DateTime<Utc>,
) -> Result<Submission, SubmissionError>
where
    S: DocumentStore + ?Sized,
    I: IdentityProvider + ?Sized,
{
    let user = identity.require_identity()?;
    match store.find_by_user(&user.subject_id).await? {
        Some(existing) => {
            log::info!("Updating submission {} for {}", existing.id, user.subject_id);
            store
                .patch(existing.id, SubmissionPatch::from_draft(draft, now))
                .await
        }
        None => {
            let record = Submission::new(user.subject_id.clone(), draft, now);
            log::info!("Creating submission {} for {}", record.id, user.subject_id);
            store.create(record.clone()).await?;
            Ok(record)
        }
    }
}

/// Engine defaults for the caller's own submission, if they have one.
pub async fn load_for_edit<S, I>(store: &S, identity: &I) -> Result<Option<FormValues>, SubmissionError>
where
    S: DocumentStore + ?Sized,
    I: IdentityProvider + ?Sized,
{
    let user = identity.require_identity()?;
    let Some(existing) = store.find_by_user(&user.subject_id).await? else {
        return Ok(None);
    };
    SubmissionBinder
        .hydrate_submission(&existing)
        .map(Some)
        .map_err(|e| SubmissionError::Store(format!("{:#}", e)))
}

/// Judge listing; admin only.
pub async fn list_for_judging<S, I>(
    store: &S,
    identity: &I,
    filter: &SubmissionFilter,
    cursor: Option<&str>,
    page_size: usize,
) -> Result<Page<Submission>, SubmissionError>
where
    S: DocumentStore + ?Sized,
    I: IdentityProvider + ?Sized,
{
    identity.require_admin()?;
    store.paginate(filter, cursor, page_size).await
}

/// Submit handler for the participant project form.
pub struct ProjectSubmitHandler<S: ?Sized, I: ?Sized> {
    store: Arc<S>,
    identity: Arc<I>,
}

impl<S: ?Sized, I: ?Sized> ProjectSubmitHandler<S, I> {
    pub fn new(store: Arc<S>, identity: Arc<I>) -> Self {
        Self { store, identity }
    }
}

#[async_trait]
impl<S, I> SubmitHandler for ProjectSubmitHandler<S, I>
where
    S: DocumentStore + ?Sized,
    I: IdentityProvider + ?Sized,
{
    async fn on_submit(&self, payload: SubmitPayload) -> anyhow::Result<()> {
        let draft = SubmissionBinder.extract(&payload.values)?;
        create_or_update(self.store.as_ref(), self.identity.as_ref(), draft, Utc::now()).await?;
        Ok(())
    }
}

/// Submit handler for the judge review form of one submission.
pub struct JudgeReviewHandler<S: ?Sized, I: ?Sized> {
    store: Arc<S>,
    identity: Arc<I>,
    submission_id: Uuid,
}

impl<S: ?Sized, I: ?Sized> JudgeReviewHandler<S, I> {
    pub fn new(store: Arc<S>, identity: Arc<I>, submission_id: Uuid) -> Self {
        Self {
            store,
            identity,
            submission_id,
        }
    }
}

impl<S, I> JudgeReviewHandler<S, I>
where
    S: DocumentStore + ?Sized,
    I: IdentityProvider + ?Sized,
{
    /// Engine defaults from the stored review fields.
    pub async fn load_defaults(&self) -> Result<FormValues, SubmissionError> {
        self.identity.require_admin()?;
        let record = self
            .store
            .get(self.submission_id)
            .await?
            .ok_or(SubmissionError::NotFound(self.submission_id))?;
        ReviewBinder
            .hydrate_submission(&record)
            .map_err(|e| SubmissionError::Store(format!("{:#}", e)))
    }
}

#[async_trait]
impl<S, I> SubmitHandler for JudgeReviewHandler<S, I>
where
    S: DocumentStore + ?Sized,
    I: IdentityProvider + ?Sized,
{
    async fn on_submit(&self, payload: SubmitPayload) -> anyhow::Result<()> {
        let judge = self.identity.require_admin()?;
        let review = ReviewBinder.extract(&payload.values)?;
        self.store
            .patch(self.submission_id, SubmissionPatch::from_review(review))
            .await?;
        log::info!("Submission {} reviewed by {}", self.submission_id, judge.subject_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Identity, StaticIdentity};
    use crate::store::InMemoryStore;

    fn draft(name: &str) -> SubmissionDraft {
        SubmissionDraft {
            project_name: name.to_string(),
            github_url: "https://github.com/team/project".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_second_save_updates_the_same_record() {
        let store = InMemoryStore::new();
        let me = StaticIdentity(Some(Identity::participant("user_1")));
        let first = create_or_update(&store, &me, draft("One"), Utc::now()).await.unwrap();
        let second = create_or_update(&store, &me, draft("Two"), Utc::now()).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.draft.project_name, "Two");
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_anonymous_save_is_refused() {
        let store = InMemoryStore::new();
        let err = create_or_update(&store, &StaticIdentity(None), draft("One"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::NotAuthenticated));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_listing_requires_admin() {
        let store = InMemoryStore::new();
        let participant = StaticIdentity(Some(Identity::participant("user_1")));
        let err = list_for_judging(&store, &participant, &SubmissionFilter::default(), None, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Forbidden));
    }

    #[tokio::test]
    async fn test_load_for_edit_without_record() {
        let store = InMemoryStore::new();
        let me = StaticIdentity(Some(Identity::participant("user_1")));
        assert!(load_for_edit(&store, &me).await.unwrap().is_none());

        create_or_update(&store, &me, draft("One"), Utc::now()).await.unwrap();
        let values = load_for_edit(&store, &me).await.unwrap().unwrap();
        assert_eq!(values.text("project_name"), "One");
    }
}
