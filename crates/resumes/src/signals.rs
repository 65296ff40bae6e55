use std::sync::Arc;

use tracing::debug;

use eventdesk_signals::{PostSave, SignalError, SignalRegistry};

use crate::contribution::{Contributable, ContributionLog};
use crate::resume::Resume;

/// Connection id of the resume → contribution receiver.
pub const SAVE_CONTRIBUTION_UID: &str = "resumes.save_contribution";

/// Wire the add-on's save hooks. Calling it again is harmless.
pub fn init_signals(registry: &SignalRegistry, log: Arc<ContributionLog>) -> Result<bool, SignalError> {
    registry.connect_post_save::<Resume, _>(
        SAVE_CONTRIBUTION_UID,
        move |signal: &PostSave<'_, Resume>| -> anyhow::Result<()> { save_contribution(&log, signal) },
    )
}

/// `post_save` receiver: log the saved item as a contribution.
pub fn save_contribution<C: Contributable>(
    log: &ContributionLog,
    signal: &PostSave<'_, C>,
) -> anyhow::Result<()> {
    let inserted = log.record(signal.instance, signal.saved_at)?;
    debug!(
        content_type = signal.instance.content_type(),
        object_id = %signal.instance.object_id(),
        created = signal.created,
        inserted,
        "contribution recorded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use eventdesk_core::UserId;

    use crate::resume::{ResumeBoard, ResumeId};

    fn wired() -> (ResumeBoard, Arc<ContributionLog>, Arc<SignalRegistry>) {
        let registry = Arc::new(SignalRegistry::new());
        let log = Arc::new(ContributionLog::new());
        assert!(init_signals(&registry, Arc::clone(&log)).unwrap());
        (ResumeBoard::new(Arc::clone(&registry)), log, registry)
    }

    #[test]
    fn saving_a_resume_records_a_contribution() {
        let (board, log, _) = wired();
        let author = UserId::new();
        let now = Utc::now();
        let resume = Resume::new(ResumeId::generate(), "Senior Rust Engineer", Some(author), now);

        let report = board.save(resume.clone(), now).unwrap();
        assert_eq!(report.delivered, 1);
        assert!(report.is_clean());

        let entry = log.get("resume", resume.id.0).unwrap();
        assert_eq!(entry.title, "Senior Rust Engineer");
        assert_eq!(entry.creator, Some(author));
        assert_eq!(log.by_creator(author).len(), 1);
        assert_eq!(board.get(resume.id), Some(resume));
    }

    #[test]
    fn resaving_updates_instead_of_duplicating() {
        let (board, log, _) = wired();
        let now = Utc::now();
        let mut resume = Resume::new(ResumeId::generate(), "Draft", None, now);
        board.save(resume.clone(), now).unwrap();

        resume.title = "Final".to_string();
        let later = now + Duration::minutes(5);
        board.save(resume.clone(), later).unwrap();

        assert_eq!(log.len(), 1);
        let entry = log.get("resume", resume.id.0).unwrap();
        assert_eq!(entry.title, "Final");
        assert_eq!(entry.create_dt, now);
        assert_eq!(entry.update_dt, later);
    }

    #[test]
    fn init_signals_is_idempotent() {
        let (_, log, registry) = wired();
        assert!(!init_signals(&registry, log).unwrap());
        assert_eq!(registry.receiver_count::<Resume>(), 1);
    }

    #[test]
    fn invalid_resume_is_not_saved_or_signalled() {
        let (board, log, _) = wired();
        let resume = Resume::new(ResumeId::generate(), "  ", None, Utc::now());
        assert!(board.save(resume.clone(), Utc::now()).is_err());
        assert!(board.get(resume.id).is_none());
        assert!(log.is_empty());
    }
}
