// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concurrency guard traits: request deduplication and per-user serialization.

use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use crate::types::JobKey;

/// Short-window memory of recently accepted jobs.
pub trait JobStore: Send + Sync + 'static {
    /// Records `key` as seen at `now`.
    ///
    /// Returns `false` when the same key was already claimed inside the
    /// dedup window, in which case the caller drops the request.
    fn try_claim(&self, key: &JobKey, now: Instant) -> bool;

    /// Number of keys currently remembered.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Held for the duration of one user's job; dropping it releases the user.
pub struct JobPermit {
    _inner: Box<dyn Send + Sync>,
}

impl JobPermit {
    /// Wraps any guard value whose drop releases the lock.
    pub fn new<T: Send + Sync + 'static>(inner: T) -> Self {
        Self {
            _inner: Box::new(inner),
        }
    }
}

impl std::fmt::Debug for JobPermit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobPermit").finish_non_exhaustive()
    }
}

/// A place in one user's queue, taken when the event is received.
///
/// Awaiting [`ready`](Self::ready) resolves once every job reserved
/// earlier for the same user has released its permit.
pub struct JobTicket {
    wait: Pin<Box<dyn Future<Output = JobPermit> + Send>>,
}

impl JobTicket {
    pub fn new<F>(wait: F) -> Self
    where
        F: Future<Output = JobPermit> + Send + 'static,
    {
        Self {
            wait: Box::pin(wait),
        }
    }

    pub async fn ready(self) -> JobPermit {
        self.wait.await
    }
}

impl std::fmt::Debug for JobTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobTicket").finish_non_exhaustive()
    }
}

/// Per-user serialization in reservation order.
pub trait UserLocks: Send + Sync + 'static {
    /// Queues a job for `user_id` behind every job reserved before it.
    ///
    /// Synchronous so the caller fixes the order before spawning work.
    fn reserve(&self, user_id: &str) -> JobTicket;

    /// Number of users with a running or waiting job.
    fn active_users(&self) -> usize;
}
