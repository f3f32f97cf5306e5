use crate::error::SubmissionError;
use crate::model::{JudgeReview, Score, Submission, SubmissionDraft, SubmissionStatus};
use anyhow::Result;
use ox_forms::{Binder, FormValues};
use serde_json::Value;

/// Maps between the project submission form and `SubmissionDraft`.
pub struct SubmissionBinder;

fn optional_text(values: &FormValues, name: &str) -> Option<String> {
    let text = values.text(name).trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Members come either as a list or as one comma/newline separated string.
fn members_from(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(raw)) => raw
            .split(|c| c == ',' || c == '\n')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

impl Binder<SubmissionDraft> for SubmissionBinder {
    fn hydrate(&self, draft: &SubmissionDraft) -> Result<FormValues> {
        let mut values = FormValues::new()
            .with("project_name", draft.project_name.clone())
            .with("members", draft.members.join(", "))
            .with("github_url", draft.github_url.clone())
            .with("status", draft.status.as_str());
        let optional = [
            ("hosted_site_url", &draft.hosted_site_url),
            ("video_overview_url", &draft.video_overview_url),
            ("description", &draft.description),
            ("favorite_parts", &draft.favorite_parts),
            ("biggest_challenges", &draft.biggest_challenges),
            ("testing_instructions", &draft.testing_instructions),
        ];
        for (name, value) in optional {
            if let Some(v) = value {
                values.set(name, v.clone());
            }
        }
        Ok(values)
    }

    fn extract(&self, values: &FormValues) -> Result<SubmissionDraft> {
        let project_name =
            optional_text(values, "project_name").ok_or(SubmissionError::MissingField("project_name"))?;
        let github_url =
            optional_text(values, "github_url").ok_or(SubmissionError::MissingField("github_url"))?;
        let status = SubmissionStatus::parse(values.text("status")).unwrap_or_default();

        Ok(SubmissionDraft {
            project_name,
            members: members_from(values.get("members")),
            github_url,
            hosted_site_url: optional_text(values, "hosted_site_url"),
            video_overview_url: optional_text(values, "video_overview_url"),
            description: optional_text(values, "description"),
            favorite_parts: optional_text(values, "favorite_parts"),
            biggest_challenges: optional_text(values, "biggest_challenges"),
            testing_instructions: optional_text(values, "testing_instructions"),
            status,
        })
    }
}

impl SubmissionBinder {
    /// Form defaults for editing an existing record.
    pub fn hydrate_submission(&self, submission: &Submission) -> Result<FormValues> {
        self.hydrate(&submission.draft)
    }
}

/// Maps between the judge review form and `JudgeReview`.
pub struct ReviewBinder;

impl Binder<JudgeReview> for ReviewBinder {
    fn hydrate(&self, review: &JudgeReview) -> Result<FormValues> {
        let mut values = FormValues::new().with("reviewed", review.reviewed);
        if let Some(score) = review.score {
            values.set("score", score.get());
        }
        if let Some(notes) = &review.judge_notes {
            values.set("judge_notes", notes.clone());
        }
        Ok(values)
    }

    fn extract(&self, values: &FormValues) -> Result<JudgeReview> {
        let score = match values.number("score") {
            Some(raw) => Some(Score::try_from(raw.round() as i64)?),
            None => None,
        };
        Ok(JudgeReview {
            reviewed: values.flag("reviewed"),
            score,
            judge_notes: optional_text(values, "judge_notes"),
        })
    }
}

impl ReviewBinder {
    pub fn hydrate_submission(&self, submission: &Submission) -> Result<FormValues> {
        self.hydrate(&JudgeReview {
            reviewed: submission.is_reviewed(),
            score: submission.score,
            judge_notes: submission.judge_notes.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_splits_members() {
        let values = FormValues::new()
            .with("project_name", "Orbit")
            .with("members", "Ada, Grace\nLinus,, ")
            .with("github_url", "https://github.com/orbit/orbit")
            .with("hosted_site_url", "  ")
            .with("status", "submitted");
        let draft = SubmissionBinder.extract(&values).unwrap();
        assert_eq!(draft.members, vec!["Ada", "Grace", "Linus"]);
        assert_eq!(draft.hosted_site_url, None);
        assert_eq!(draft.status, SubmissionStatus::Submitted);

        let listed = values.with("members", json!(["Ada", " ", "Grace"]));
        assert_eq!(SubmissionBinder.extract(&listed).unwrap().members, vec!["Ada", "Grace"]);
    }

    #[test]
    fn test_extract_requires_project_name() {
        let err = SubmissionBinder
            .extract(&FormValues::new().with("github_url", "https://x.dev"))
            .unwrap_err();
        assert!(err.to_string().contains("project_name"));
    }

    #[test]
    fn test_hydrate_then_extract_preserves_draft() {
        let draft = SubmissionDraft {
            project_name: "Orbit".to_string(),
            members: vec!["Ada".to_string(), "Grace".to_string()],
            github_url: "https://github.com/orbit/orbit".to_string(),
            favorite_parts: Some("The scheduler".to_string()),
            ..Default::default()
        };
        let values = SubmissionBinder.hydrate(&draft).unwrap();
        assert_eq!(values.text("members"), "Ada, Grace");
        assert_eq!(SubmissionBinder.extract(&values).unwrap(), draft);
    }

    #[test]
    fn test_review_extract_validates_score() {
        let values = FormValues::new().with("reviewed", true).with("score", 11);
        assert!(ReviewBinder.extract(&values).is_err());

        let values = FormValues::new().with("reviewed", true).with("score", 7);
        let review = ReviewBinder.extract(&values).unwrap();
        assert_eq!(review.score.map(|s| s.get()), Some(7));
        assert!(review.judge_notes.is_none());
    }
}
