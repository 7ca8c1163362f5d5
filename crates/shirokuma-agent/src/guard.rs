// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process implementations of the concurrency guard traits.
//!
//! Both stores live behind the [`JobStore`] and [`UserLocks`] traits so a
//! shared backend can replace them without touching the dispatcher.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use shirokuma_core::traits::{JobPermit, JobStore, JobTicket, UserLocks};
use shirokuma_core::types::JobKey;
use tokio::sync::oneshot;

/// Removes entries claimed `ttl` or longer before `now`. Returns how many
/// were removed.
pub fn sweep_expired(map: &mut HashMap<JobKey, Instant>, now: Instant, ttl: Duration) -> usize {
    let before = map.len();
    map.retain(|_, seen| now.saturating_duration_since(*seen) < ttl);
    before - map.len()
}

/// Dedup window kept in a process-local map.
#[derive(Debug)]
pub struct InMemoryJobStore {
    seen: Mutex<HashMap<JobKey, Instant>>,
    ttl: Duration,
}

impl InMemoryJobStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            seen: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl JobStore for InMemoryJobStore {
    fn try_claim(&self, key: &JobKey, now: Instant) -> bool {
        let Ok(mut seen) = self.seen.lock() else {
            // A poisoned map only loses dedup; never block the job.
            return true;
        };
        let swept = sweep_expired(&mut seen, now, self.ttl);
        if swept > 0 {
            tracing::trace!(swept, "expired job keys removed");
        }
        if seen.contains_key(key) {
            return false;
        }
        seen.insert(key.clone(), now);
        true
    }

    fn len(&self) -> usize {
        self.seen.lock().map(|s| s.len()).unwrap_or(0)
    }
}

/// The most recent reservation for a user. Its receiver fires when that
/// job's permit is dropped.
#[derive(Debug)]
struct Tail {
    seq: u64,
    done: oneshot::Receiver<()>,
}

type QueueTable = Arc<DashMap<String, Tail>>;

/// Per-user job queues kept as a chain of completion signals.
///
/// Each reservation takes the previous tail's receiver and installs its
/// own, so jobs for one user run in the order they were reserved no matter
/// which worker thread polls them first. A user's entry is removed when
/// the last reserved job releases.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserLocks {
    table: QueueTable,
    next_seq: Arc<AtomicU64>,
}

impl InMemoryUserLocks {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The permit payload: signals the next job, then drops the entry if no
/// job was queued behind this one.
struct Release {
    done: Option<oneshot::Sender<()>>,
    seq: u64,
    user_id: String,
    table: QueueTable,
}

impl Drop for Release {
    fn drop(&mut self) {
        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
        self.table.remove_if(&self.user_id, |_, tail| tail.seq == self.seq);
    }
}

impl UserLocks for InMemoryUserLocks {
    fn reserve(&self, user_id: &str) -> JobTicket {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        let tail = Tail { seq, done: rx };
        let previous = match self.table.entry(user_id.to_string()) {
            Entry::Occupied(mut entry) => Some(std::mem::replace(entry.get_mut(), tail).done),
            Entry::Vacant(entry) => {
                entry.insert(tail);
                None
            }
        };

        let release = Release {
            done: Some(tx),
            seq,
            user_id: user_id.to_string(),
            table: Arc::clone(&self.table),
        };
        JobTicket::new(async move {
            if let Some(previous) = previous {
                // A dropped sender also means the earlier job is gone.
                let _ = previous.await;
            }
            JobPermit::new(release)
        })
    }

    fn active_users(&self) -> usize {
        self.table.len()
    }
}
