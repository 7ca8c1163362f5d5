// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic date classification.
//!
//! A birth date maps to a position in the 60-day cycle (an "animal"
//! character) and in the 10-day stem cycle (element and guardian). Both
//! positions are day counts modulo the cycle length, measured from
//! configurable reference dates, and the attributes come from the lookup
//! tables loaded at startup.

pub mod calendar;
pub mod tables;

pub use calendar::{Classifier, Epochs, STEM_SYMBOLS, cycle_index, stem_index};
pub use tables::{AnimalEntry, LookupTables, StemEntry};
