use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use eventdesk_core::{AggregateId, DomainError, Entity, UserId};
use eventdesk_signals::{DispatchReport, SignalError, SignalRegistry};

use crate::contribution::Contributable;

eventdesk_core::typed_id!(
    /// Resume identifier.
    ResumeId
);

const MAX_TITLE_LEN: usize = 250;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resume {
    pub id: ResumeId,
    pub title: String,
    pub description: String,
    pub creator: Option<UserId>,
    pub create_dt: DateTime<Utc>,
}

impl Resume {
    pub fn new(id: ResumeId, title: impl Into<String>, creator: Option<UserId>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            creator,
            create_dt: now,
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        let len = self.title.trim().chars().count();
        if len == 0 {
            return Err(DomainError::validation("resume title cannot be empty"));
        }
        if len > MAX_TITLE_LEN {
            return Err(DomainError::validation(format!(
                "resume title cannot exceed {MAX_TITLE_LEN} characters"
            )));
        }
        Ok(())
    }
}

impl Entity for Resume {
    type Id = ResumeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Contributable for Resume {
    fn content_type(&self) -> &'static str {
        "resume"
    }

    fn object_id(&self) -> AggregateId {
        self.id.0
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn creator(&self) -> Option<UserId> {
        self.creator
    }
}

#[derive(Debug, Error)]
pub enum ResumeBoardError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error("resume board lock poisoned")]
    Poisoned,
}

/// In-memory resume storage that fires `post_save` after each write.
#[derive(Debug)]
pub struct ResumeBoard {
    resumes: RwLock<HashMap<ResumeId, Resume>>,
    signals: Arc<SignalRegistry>,
}

impl ResumeBoard {
    pub fn new(signals: Arc<SignalRegistry>) -> Self {
        Self {
            resumes: RwLock::new(HashMap::new()),
            signals,
        }
    }

    /// Insert or replace `resume`, then notify `post_save` receivers.
    pub fn save(&self, resume: Resume, now: DateTime<Utc>) -> Result<DispatchReport, ResumeBoardError> {
        resume.validate()?;

        let created = {
            let mut resumes = self.resumes.write().map_err(|_| ResumeBoardError::Poisoned)?;
            resumes.insert(resume.id, resume.clone()).is_none()
        };

        Ok(self.signals.send_post_save(&resume, created, now)?)
    }

    pub fn get(&self, id: ResumeId) -> Option<Resume> {
        self.resumes.read().ok()?.get(&id).cloned()
    }
}
