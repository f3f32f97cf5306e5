use crate::error::SubmissionError;
use crate::model::{Score, Submission, SubmissionPatch, SubmissionStatus};
use async_trait::async_trait;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubmissionFilter {
    pub status: Option<SubmissionStatus>,
    pub reviewed: Option<bool>,
    pub min_score: Option<Score>,
}

impl SubmissionFilter {
    pub fn matches(&self, record: &Submission) -> bool {
        self.status.map_or(true, |s| record.draft.status == s)
            && self.reviewed.map_or(true, |r| record.is_reviewed() == r)
            && self
                .min_score
                .map_or(true, |min| record.score.map_or(false, |s| s >= min))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Pass back to `paginate` to continue; `None` once exhausted.
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn is_done(&self) -> bool {
        self.next_cursor.is_none()
    }
}

/// The `submissions` collection of the managed document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create(&self, record: Submission) -> Result<Uuid, SubmissionError>;
    async fn get(&self, id: Uuid) -> Result<Option<Submission>, SubmissionError>;
    async fn find_by_user(&self, subject_id: &str) -> Result<Option<Submission>, SubmissionError>;
    async fn patch(&self, id: Uuid, patch: SubmissionPatch) -> Result<Submission, SubmissionError>;
    async fn paginate(
        &self,
        filter: &SubmissionFilter,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<Page<Submission>, SubmissionError>;
}

/// Insertion-ordered store kept in memory. Cursors are record offsets.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<Submission>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> SubmissionError {
    SubmissionError::Store("lock poisoned".to_string())
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn create(&self, record: Submission) -> Result<Uuid, SubmissionError> {
        let id = record.id;
        self.records.write().map_err(poisoned)?.push(record);
        log::debug!("Created submission {}", id);
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Submission>, SubmissionError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_user(&self, subject_id: &str) -> Result<Option<Submission>, SubmissionError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records.iter().find(|r| r.user_id == subject_id).cloned())
    }

    async fn patch(&self, id: Uuid, patch: SubmissionPatch) -> Result<Submission, SubmissionError> {
        let mut records = self.records.write().map_err(poisoned)?;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(SubmissionError::NotFound(id))?;
        patch.apply(record);
        log::debug!("Patched submission {}", id);
        Ok(record.clone())
    }

    async fn paginate(
        &self,
        filter: &SubmissionFilter,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<Page<Submission>, SubmissionError> {
        let start = match cursor {
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| SubmissionError::InvalidCursor(c.to_string()))?,
            None => 0,
        };
        let page_size = page_size.max(1);
        let records = self.records.read().map_err(poisoned)?;

        let mut items = Vec::new();
        let mut position = start;
        while position < records.len() && items.len() < page_size {
            if filter.matches(&records[position]) {
                items.push(records[position].clone());
            }
            position += 1;
        }
        let more = records[position.min(records.len())..]
            .iter()
            .any(|r| filter.matches(r));
        Ok(Page {
            items,
            next_cursor: more.then(|| position.to_string()),
        })
    }
}
