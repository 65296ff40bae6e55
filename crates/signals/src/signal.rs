//! Model save hooks.
//!
//! A [`SignalRegistry`] holds `post_save` receivers keyed by the type of record
//! being saved. Stores (or whatever persists a record) call
//! [`SignalRegistry::send_post_save`] after a successful write; add-ons connect
//! receivers at start-up.
//!
//! Receivers are held by strong reference for the lifetime of the registry and
//! run synchronously, in connection order. A failing receiver does not stop the
//! remaining ones; failures are reported back to the sender.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

/// Payload handed to `post_save` receivers.
#[derive(Debug)]
pub struct PostSave<'a, T> {
    pub instance: &'a T,
    /// `true` when the save inserted a new record.
    pub created: bool,
    pub saved_at: DateTime<Utc>,
}

/// A `post_save` receiver for records of type `T`.
pub trait Receiver<T>: Send + Sync {
    fn receive(&self, signal: &PostSave<'_, T>) -> anyhow::Result<()>;
}

impl<T, F> Receiver<T> for F
where
    F: Fn(&PostSave<'_, T>) -> anyhow::Result<()> + Send + Sync,
{
    fn receive(&self, signal: &PostSave<'_, T>) -> anyhow::Result<()> {
        self(signal)
    }
}

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("signal registry lock poisoned")]
    Poisoned,
}

/// One receiver that returned an error during dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverFailure {
    pub dispatch_uid: String,
    pub error: String,
}

/// Outcome of a dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Receivers that ran to completion.
    pub delivered: usize,
    pub failures: Vec<ReceiverFailure>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Connection {
    dispatch_uid: String,
    // Always an `Arc<dyn Receiver<T>>` for the `TypeId` it is filed under.
    receiver: Box<dyn Any + Send + Sync>,
}

/// Registry of `post_save` receivers.
#[derive(Default)]
pub struct SignalRegistry {
    post_save: RwLock<HashMap<TypeId, Vec<Connection>>>,
}

impl core::fmt::Debug for SignalRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let senders = self.post_save.read().map(|m| m.len()).unwrap_or_default();
        f.debug_struct("SignalRegistry")
            .field("post_save_senders", &senders)
            .finish()
    }
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect `receiver` to saves of `T`.
    ///
    /// `dispatch_uid` identifies the connection; connecting the same uid twice for
    /// the same sender is a no-op and returns `Ok(false)`.
    pub fn connect_post_save<T, R>(
        &self,
        dispatch_uid: impl Into<String>,
        receiver: R,
    ) -> Result<bool, SignalError>
    where
        T: 'static,
        R: Receiver<T> + 'static,
    {
        let dispatch_uid = dispatch_uid.into();
        let mut map = self.post_save.write().map_err(|_| SignalError::Poisoned)?;
        let slot = map.entry(TypeId::of::<T>()).or_default();

        if slot.iter().any(|c| c.dispatch_uid == dispatch_uid) {
            debug!(sender = type_name::<T>(), %dispatch_uid, "post_save receiver already connected");
            return Ok(false);
        }

        let receiver: Arc<dyn Receiver<T>> = Arc::new(receiver);
        slot.push(Connection {
            dispatch_uid: dispatch_uid.clone(),
            receiver: Box::new(receiver),
        });
        debug!(sender = type_name::<T>(), %dispatch_uid, "post_save receiver connected");
        Ok(true)
    }

    /// Remove a connection. Returns whether anything was removed.
    pub fn disconnect_post_save<T: 'static>(&self, dispatch_uid: &str) -> Result<bool, SignalError> {
        let mut map = self.post_save.write().map_err(|_| SignalError::Poisoned)?;
        let Some(slot) = map.get_mut(&TypeId::of::<T>()) else {
            return Ok(false);
        };
        let before = slot.len();
        slot.retain(|c| c.dispatch_uid != dispatch_uid);
        Ok(slot.len() != before)
    }

    /// Number of receivers connected for `T`.
    pub fn receiver_count<T: 'static>(&self) -> usize {
        self.post_save
            .read()
            .map(|m| m.get(&TypeId::of::<T>()).map_or(0, Vec::len))
            .unwrap_or_default()
    }

    /// Notify every receiver connected for `T` that `instance` was saved.
    pub fn send_post_save<T: 'static>(
        &self,
        instance: &T,
        created: bool,
        saved_at: DateTime<Utc>,
    ) -> Result<DispatchReport, SignalError> {
        // Snapshot the receivers so they may touch the registry themselves.
        let receivers: Vec<(String, Arc<dyn Receiver<T>>)> = {
            let map = self.post_save.read().map_err(|_| SignalError::Poisoned)?;
            map.get(&TypeId::of::<T>())
                .into_iter()
                .flatten()
                .filter_map(|c| {
                    c.receiver
                        .downcast_ref::<Arc<dyn Receiver<T>>>()
                        .map(|r| (c.dispatch_uid.clone(), Arc::clone(r)))
                })
                .collect()
        };

        let signal = PostSave {
            instance,
            created,
            saved_at,
        };

        let mut report = DispatchReport::default();
        for (dispatch_uid, receiver) in receivers {
            match receiver.receive(&signal) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    warn!(sender = type_name::<T>(), %dispatch_uid, error = %err, "post_save receiver failed");
                    report.failures.push(ReceiverFailure {
                        dispatch_uid,
                        error: err.to_string(),
                    });
                }
            }
        }

        debug!(
            sender = type_name::<T>(),
            created,
            delivered = report.delivered,
            failed = report.failures.len(),
            "post_save dispatched"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Note {
        title: String,
    }

    #[derive(Debug)]
    struct Other;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn receivers_run_in_connection_order() {
        let registry = SignalRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for uid in ["first", "second"] {
            let seen = Arc::clone(&seen);
            registry
                .connect_post_save::<Note, _>(uid, move |s: &PostSave<'_, Note>| -> anyhow::Result<()> {
                    seen.lock().unwrap().push(format!("{uid}:{}", s.instance.title));
                    Ok(())
                })
                .unwrap();
        }

        let report = registry
            .send_post_save(&Note { title: "hello".into() }, true, now())
            .unwrap();

        assert_eq!(report.delivered, 2);
        assert!(report.is_clean());
        assert_eq!(*seen.lock().unwrap(), vec!["first:hello", "second:hello"]);
    }

    #[test]
    fn duplicate_uid_is_ignored() {
        let registry = SignalRegistry::new();
        let ok = |_: &PostSave<'_, Note>| -> anyhow::Result<()> { Ok(()) };
        assert!(registry.connect_post_save::<Note, _>("uid", ok).unwrap());
        assert!(!registry.connect_post_save::<Note, _>("uid", ok).unwrap());
        assert_eq!(registry.receiver_count::<Note>(), 1);
    }

    #[test]
    fn receivers_are_scoped_to_sender_type() {
        let registry = SignalRegistry::new();
        registry
            .connect_post_save::<Note, _>("notes", |_: &PostSave<'_, Note>| -> anyhow::Result<()> { Ok(()) })
            .unwrap();

        let report = registry.send_post_save(&Other, false, now()).unwrap();
        assert_eq!(report, DispatchReport::default());
    }

    #[test]
    fn failing_receiver_does_not_block_others() {
        let registry = SignalRegistry::new();
        registry
            .connect_post_save::<Note, _>("broken", |_: &PostSave<'_, Note>| -> anyhow::Result<()> {
                Err(anyhow::anyhow!("boom"))
            })
            .unwrap();
        registry
            .connect_post_save::<Note, _>("fine", |_: &PostSave<'_, Note>| -> anyhow::Result<()> { Ok(()) })
            .unwrap();

        let report = registry
            .send_post_save(&Note { title: "x".into() }, false, now())
            .unwrap();

        assert_eq!(report.delivered, 1);
        assert_eq!(
            report.failures,
            vec![ReceiverFailure {
                dispatch_uid: "broken".into(),
                error: "boom".into(),
            }]
        );
    }

    #[test]
    fn disconnect_removes_receiver() {
        let registry = SignalRegistry::new();
        registry
            .connect_post_save::<Note, _>("uid", |_: &PostSave<'_, Note>| -> anyhow::Result<()> { Ok(()) })
            .unwrap();
        assert!(registry.disconnect_post_save::<Note>("uid").unwrap());
        assert!(!registry.disconnect_post_save::<Note>("uid").unwrap());
        assert_eq!(registry.receiver_count::<Note>(), 0);
    }
}
