// src/submission.rs

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

/// Tracks forms whose write is in flight. Every rendered form carries a
/// token; a second submission with the same token is refused until the first
/// one settles.
#[derive(Clone, Default)]
pub struct SubmissionGuard {
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

/// Marks one in-flight submission; releases the token when dropped.
#[must_use]
pub struct SubmissionTicket {
    token: Uuid,
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self, token: Uuid) -> Option<SubmissionTicket> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !in_flight.insert(token) {
            tracing::warn!("Duplicate submission refused for form token {}", token);
            return None;
        }
        Some(SubmissionTicket {
            token,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    #[cfg(test)]
    pub fn is_in_flight(&self, token: Uuid) -> bool {
        self.in_flight
            .lock()
            .map(|set| set.contains(&token))
            .unwrap_or(false)
    }
}

impl Drop for SubmissionTicket {
    fn drop(&mut self) {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        in_flight.remove(&self.token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_submission_is_refused_until_first_settles() {
        let guard = SubmissionGuard::new();
        let token = Uuid::new_v4();

        let ticket = guard.try_begin(token).expect("first submission");
        assert!(guard.try_begin(token).is_none());
        assert!(guard.is_in_flight(token));

        drop(ticket);
        assert!(!guard.is_in_flight(token));
        assert!(guard.try_begin(token).is_some());
    }

    #[test]
    fn distinct_forms_do_not_block_each_other() {
        let guard = SubmissionGuard::new();
        let _a = guard.try_begin(Uuid::new_v4()).unwrap();
        assert!(guard.try_begin(Uuid::new_v4()).is_some());
    }
}
