use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::errors::{AppError, AppResult};

/// What happens when a second regeneration starts for a course that is
/// already being regenerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegenerationPolicy {
    /// Later requests wait their turn; the last one to finish wins.
    #[default]
    LastWriterWins,
    /// Later requests are refused while one is running.
    Reject,
}

impl RegenerationPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "last_writer_wins" | "last-writer-wins" | "serialize" => {
                Some(RegenerationPolicy::LastWriterWins)
            }
            "reject" => Some(RegenerationPolicy::Reject),
            _ => None,
        }
    }
}

/// Per-course mutual exclusion for assessment regeneration.
pub struct CourseLocks {
    policy: RegenerationPolicy,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CourseLocks {
    pub fn new(policy: RegenerationPolicy) -> Self {
        Self {
            policy,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> RegenerationPolicy {
        self.policy
    }

    /// Holds the course until the returned guard is dropped.
    pub async fn acquire(&self, course_id: &str) -> AppResult<OwnedMutexGuard<()>> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Drop entries nobody holds or waits on.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(
                locks
                    .entry(course_id.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };

        match self.policy {
            RegenerationPolicy::LastWriterWins => Ok(lock.lock_owned().await),
            RegenerationPolicy::Reject => lock
                .try_lock_owned()
                .map_err(|_| AppError::RegenerationInProgress(course_id.to_string())),
        }
    }

    #[cfg(test)]
    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
