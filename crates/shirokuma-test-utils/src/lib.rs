// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Shirokuma integration tests.
//!
//! - [`MockProvider`] - completion provider with queued answers
//! - [`MockMessenger`] - records replies and pushes
//! - [`MockReport`] - renderer and uploader without PDF or network
//! - [`TestHarness`] - a dispatcher over the shipped assets

pub mod harness;
pub mod mock_messenger;
pub mod mock_provider;
pub mod mock_report;

pub use harness::{TestHarness, assets_dir, text_event};
pub use mock_messenger::{MockMessenger, Sent};
pub use mock_provider::MockProvider;
pub use mock_report::{MOCK_REPORT_BASE, MockReport};
