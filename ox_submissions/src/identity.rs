use crate::error::SubmissionError;
use serde::{Deserialize, Serialize};

pub const ADMIN_ROLE: &str = "admin";

/// Authenticated user as reported by the identity provider.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub subject_id: String,
    #[serde(default)]
    pub role_claim: Option<String>,
}

impl Identity {
    pub fn participant(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            role_claim: None,
        }
    }

    pub fn admin(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            role_claim: Some(ADMIN_ROLE.to_string()),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role_claim.as_deref() == Some(ADMIN_ROLE)
    }
}

/// Supplies the current identity on demand; credentials never pass through here.
pub trait IdentityProvider: Send + Sync {
    fn current_identity(&self) -> Option<Identity>;

    fn require_identity(&self) -> Result<Identity, SubmissionError> {
        self.current_identity().ok_or(SubmissionError::NotAuthenticated)
    }

    fn require_admin(&self) -> Result<Identity, SubmissionError> {
        let identity = self.require_identity()?;
        if !identity.is_admin() {
            log::warn!("Judge operation refused for subject {}", identity.subject_id);
            return Err(SubmissionError::Forbidden);
        }
        Ok(identity)
    }
}

/// Fixed identity, e.g. one resolved from a verified session upstream.
#[derive(Clone, Debug, Default)]
pub struct StaticIdentity(pub Option<Identity>);

impl IdentityProvider for StaticIdentity {
    fn current_identity(&self) -> Option<Identity> {
        self.0.clone()
    }
}
