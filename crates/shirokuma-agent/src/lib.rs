// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook dispatch and the diagnosis pipeline.
//!
//! [`Dispatcher`] owns the per-event flow (dedup, acknowledgment, spawned
//! work, push delivery). [`DiagnosisPipeline`] owns the work itself. The
//! in-memory guards in [`guard`] back the dedup window and the per-user
//! serialization.

pub mod dispatcher;
pub mod guard;
pub mod messages;
pub mod pipeline;
pub mod shutdown;

pub use dispatcher::{Dispatcher, EventOutcome, EventTap, FormError, FormSubmission};
pub use guard::{InMemoryJobStore, InMemoryUserLocks, sweep_expired};
pub use pipeline::{Delivery, DiagnosisPipeline, ReportSink};
pub use shutdown::{drain_jobs, install_signal_handler};
