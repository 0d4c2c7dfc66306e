//! Per-session reward parameters.
//!
//! Each session owns one [`SessionParameters`] aggregate. Updates replace the
//! whole aggregate behind an `Arc`, so a reader either sees the previous
//! configuration or the new one, never a mix. Draws already holding a snapshot
//! keep it even if the session is destroyed underneath them.

use giftdraw_types::{SessionId, SessionParameters};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("session {0} already exists")]
    AlreadyExists(SessionId),
    #[error("no session {0}")]
    UnknownSession(SessionId),
}

#[derive(Default)]
pub struct ParameterStore {
    sessions: Mutex<HashMap<SessionId, Arc<SessionParameters>>>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, Arc<SessionParameters>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert default parameters for a new session.
    pub fn create(&self, id: &SessionId) -> Result<(), StoreError> {
        let mut sessions = self.sessions();
        if sessions.contains_key(id) {
            return Err(StoreError::AlreadyExists(id.clone()));
        }
        sessions.insert(id.clone(), Arc::new(SessionParameters::default()));
        Ok(())
    }

    /// Replace a session's parameters. Never creates an entry.
    pub fn update(&self, id: &SessionId, parameters: SessionParameters) -> Result<(), StoreError> {
        match self.sessions().get_mut(id) {
            Some(current) => {
                *current = Arc::new(parameters);
                Ok(())
            }
            None => Err(StoreError::UnknownSession(id.clone())),
        }
    }

    /// Snapshot of a session's current parameters.
    pub fn get(&self, id: &SessionId) -> Result<Arc<SessionParameters>, StoreError> {
        self.sessions()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::UnknownSession(id.clone()))
    }

    pub fn destroy(&self, id: &SessionId) -> Result<(), StoreError> {
        self.sessions()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::UnknownSession(id.clone()))
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use giftdraw_types::ShapingFunctionKind;
    use std::thread;

    fn session(id: &str) -> SessionId {
        SessionId::new(id)
    }

    /// Parameters whose fields all encode `k`, so a torn read is detectable.
    fn coherent(k: u32) -> SessionParameters {
        let mut parameters = SessionParameters::default();
        parameters.raffle.probability = f64::from(k) / 1_000.0;
        parameters.weighted_raffle.limit = f64::from(k);
        parameters.weighted_raffle.func_type = ShapingFunctionKind::Quadratic;
        parameters.pick.choices = vec![k.to_string(); 3];
        parameters
    }

    fn decode(parameters: &SessionParameters) -> u32 {
        let k = parameters.weighted_raffle.limit as u32;
        assert_eq!(parameters.raffle.probability, f64::from(k) / 1_000.0);
        assert!(parameters.pick.choices.iter().all(|choice| *choice == k.to_string()));
        k
    }

    #[test]
    fn test_create_inserts_defaults() {
        let store = ParameterStore::new();
        store.create(&session("a")).unwrap();
        assert_eq!(*store.get(&session("a")).unwrap(), SessionParameters::default());
        assert!(store.contains(&session("a")));
        assert_eq!(store.len(), 1);

        assert_eq!(
            store.create(&session("a")),
            Err(StoreError::AlreadyExists(session("a")))
        );
    }

    #[test]
    fn test_unknown_session() {
        let store = ParameterStore::new();
        assert_eq!(
            store.update(&session("ghost"), coherent(1)),
            Err(StoreError::UnknownSession(session("ghost")))
        );
        assert!(!store.contains(&session("ghost")));
        assert!(store.get(&session("ghost")).is_err());
        assert!(store.destroy(&session("ghost")).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_replaces_whole_aggregate() {
        let store = ParameterStore::new();
        store.create(&session("a")).unwrap();
        store.create(&session("b")).unwrap();

        store.update(&session("a"), coherent(7)).unwrap();
        assert_eq!(decode(&store.get(&session("a")).unwrap()), 7);
        assert_eq!(*store.get(&session("b")).unwrap(), SessionParameters::default());
    }

    #[test]
    fn test_snapshot_outlives_destroy() {
        let store = ParameterStore::new();
        store.create(&session("a")).unwrap();
        store.update(&session("a"), coherent(3)).unwrap();

        let snapshot = store.get(&session("a")).unwrap();
        store.destroy(&session("a")).unwrap();
        assert!(!store.contains(&session("a")));
        assert_eq!(decode(&snapshot), 3);
    }

    #[test]
    fn test_concurrent_updates_are_atomic() {
        let store = Arc::new(ParameterStore::new());
        let id = session("shared");
        store.create(&id).unwrap();
        store.update(&id, coherent(1)).unwrap();

        let writers: Vec<_> = (0..4u32)
            .map(|writer| {
                let store = store.clone();
                let id = id.clone();
                thread::spawn(move || {
                    for step in 0..500u32 {
                        store.update(&id, coherent(writer * 1_000 + step + 1)).unwrap();
                    }
                })
            })
            .collect();
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                let id = id.clone();
                thread::spawn(move || {
                    for _ in 0..2_000 {
                        decode(&store.get(&id).unwrap());
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }
        let last = decode(&store.get(&id).unwrap());
        assert_eq!(last % 1_000, 500);
    }
}
