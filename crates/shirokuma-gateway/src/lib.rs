// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface of the Shirokuma service.
//!
//! Verifies LINE webhook signatures, forwards raw events to an optional
//! secondary webhook, and hands every event to the
//! [`Dispatcher`](shirokuma_agent::Dispatcher).

pub mod auth;
pub mod forward;
pub mod handlers;
pub mod server;

pub use auth::{ChannelSecret, SIGNATURE_HEADER};
pub use forward::SecondaryForwarder;
pub use server::{GatewayState, ServerConfig, router, start_server};
