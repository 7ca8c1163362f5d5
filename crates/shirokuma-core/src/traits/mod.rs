// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the diagnosis pipeline.
//!
//! Network-facing adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility. The concurrency
//! guards ([`JobStore`], [`UserLocks`]) are injectable so an in-memory store
//! can later be swapped for a shared one without touching call sites.

pub mod adapter;
pub mod guard;
pub mod messenger;
pub mod provider;
pub mod report;

pub use adapter::PluginAdapter;
pub use guard::{JobPermit, JobStore, JobTicket, UserLocks};
pub use messenger::Messenger;
pub use provider::CompletionProvider;
pub use report::{ReportRenderer, ReportUploader};
