//! Contribution log: who added which content, and when.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventdesk_core::{AggregateId, UserId};
use eventdesk_signals::SignalError;

/// Content that counts as a contribution once saved.
pub trait Contributable {
    /// Tag of the content kind (e.g. "resume").
    fn content_type(&self) -> &'static str;
    fn object_id(&self) -> AggregateId;
    fn title(&self) -> &str;
    fn creator(&self) -> Option<UserId>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub content_type: String,
    pub object_id: AggregateId,
    pub title: String,
    pub creator: Option<UserId>,
    pub create_dt: DateTime<Utc>,
    pub update_dt: DateTime<Utc>,
}

/// In-memory contribution log, one entry per contributed object.
#[derive(Debug, Default)]
pub struct ContributionLog {
    entries: RwLock<HashMap<(String, AggregateId), Contribution>>,
}

impl ContributionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entry, or refresh the title of an existing one.
    ///
    /// Returns `true` when a new entry was created.
    pub fn record<C: Contributable + ?Sized>(
        &self,
        item: &C,
        at: DateTime<Utc>,
    ) -> Result<bool, SignalError> {
        let mut entries = self.entries.write().map_err(|_| SignalError::Poisoned)?;
        let key = (item.content_type().to_string(), item.object_id());

        if let Some(existing) = entries.get_mut(&key) {
            existing.title = item.title().to_string();
            existing.update_dt = at;
            return Ok(false);
        }

        entries.insert(
            key,
            Contribution {
                content_type: item.content_type().to_string(),
                object_id: item.object_id(),
                title: item.title().to_string(),
                creator: item.creator(),
                create_dt: at,
                update_dt: at,
            },
        );
        Ok(true)
    }

    pub fn get(&self, content_type: &str, object_id: AggregateId) -> Option<Contribution> {
        let entries = self.entries.read().ok()?;
        entries.get(&(content_type.to_string(), object_id)).cloned()
    }

    pub fn by_creator(&self, creator: UserId) -> Vec<Contribution> {
        let Ok(entries) = self.entries.read() else {
            return vec![];
        };
        let mut out: Vec<Contribution> = entries
            .values()
            .filter(|c| c.creator == Some(creator))
            .cloned()
            .collect();
        out.sort_by_key(|c| c.create_dt);
        out
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
