use crate::error::SubmissionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionStatus {
    #[default]
    InProgress,
    Submitted,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::InProgress => "in-progress",
            SubmissionStatus::Submitted => "submitted",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "in-progress" => Some(SubmissionStatus::InProgress),
            "submitted" => Some(SubmissionStatus::Submitted),
            _ => None,
        }
    }
}

/// Judge score, always within 1..=10.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "i64", into = "i64")]
pub struct Score(u8);

impl Score {
    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Score {
    type Error = SubmissionError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        if (1..=10).contains(&raw) {
            Ok(Score(raw as u8))
        } else {
            Err(SubmissionError::InvalidScore(raw))
        }
    }
}

impl From<Score> for i64 {
    fn from(score: Score) -> Self {
        score.0 as i64
    }
}

/// The participant-editable part of a submission.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SubmissionDraft {
    pub project_name: String,
    pub members: Vec<String>,
    pub github_url: String,
    pub hosted_site_url: Option<String>,
    pub video_overview_url: Option<String>,
    pub description: Option<String>,
    pub favorite_parts: Option<String>,
    pub biggest_challenges: Option<String>,
    pub testing_instructions: Option<String>,
    pub status: SubmissionStatus,
}

/// A stored submission record.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Submission {
    pub id: Uuid,
    /// Subject id of the owning participant.
    pub user_id: String,
    #[serde(flatten)]
    pub draft: SubmissionDraft,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub reviewed: Option<bool>,
    #[serde(default)]
    pub score: Option<Score>,
    #[serde(default)]
    pub judge_notes: Option<String>,
}

impl Submission {
    pub fn new(user_id: impl Into<String>, draft: SubmissionDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            draft,
            created_at: now,
            updated_at: now,
            reviewed: None,
            score: None,
            judge_notes: None,
        }
    }

    pub fn is_reviewed(&self) -> bool {
        self.reviewed.unwrap_or(false)
    }
}

/// Judge fields set from the review form.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct JudgeReview {
    pub reviewed: bool,
    /// `None` clears a previously given score.
    pub score: Option<Score>,
    pub judge_notes: Option<String>,
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubmissionPatch {
    pub draft: Option<SubmissionDraft>,
    pub reviewed: Option<bool>,
    pub score: Option<Option<Score>>,
    pub judge_notes: Option<Option<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SubmissionPatch {
    pub fn from_draft(draft: SubmissionDraft, now: DateTime<Utc>) -> Self {
        Self {
            draft: Some(draft),
            updated_at: Some(now),
            ..Default::default()
        }
    }

    pub fn from_review(review: JudgeReview) -> Self {
        Self {
            reviewed: Some(review.reviewed),
            score: Some(review.score),
            judge_notes: Some(review.judge_notes),
            ..Default::default()
        }
    }

    pub fn apply(self, record: &mut Submission) {
        if let Some(draft) = self.draft {
            record.draft = draft;
        }
        if let Some(reviewed) = self.reviewed {
            record.reviewed = Some(reviewed);
        }
        if let Some(score) = self.score {
            record.score = score;
        }
        if let Some(notes) = self.judge_notes {
            record.judge_notes = notes;
        }
        if let Some(updated_at) = self.updated_at {
            record.updated_at = updated_at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds() {
        assert!(Score::try_from(0).is_err());
        assert!(Score::try_from(11).is_err());
        assert_eq!(Score::try_from(10).unwrap().get(), 10);
        let parsed: Result<Score, _> = serde_json::from_str("12");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&SubmissionStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(SubmissionStatus::parse("submitted"), Some(SubmissionStatus::Submitted));
        assert_eq!(SubmissionStatus::parse("draft"), None);
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let now = Utc::now();
        let mut record = Submission::new("user_1", SubmissionDraft::default(), now);
        record.score = Some(Score::try_from(4).unwrap());

        SubmissionPatch {
            reviewed: Some(true),
            ..Default::default()
        }
        .apply(&mut record);
        assert!(record.is_reviewed());
        assert_eq!(record.score.map(|s| s.get()), Some(4));

        SubmissionPatch::from_review(JudgeReview {
            reviewed: true,
            score: None,
            judge_notes: Some("Solid".to_string()),
        })
        .apply(&mut record);
        assert_eq!(record.score, None);
        assert_eq!(record.judge_notes.as_deref(), Some("Solid"));
        assert_eq!(record.updated_at, now);
    }
}
