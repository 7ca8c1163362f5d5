// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report delivery for the PDF diagnosis types.
//!
//! [`PdfRenderer`] lays out the diagnosis text on A4 pages and
//! [`CloudinaryUploader`] stores the result as a raw asset, returning the
//! public link that is pushed to the user.

pub mod cloudinary;
pub mod pdf;

pub use cloudinary::{CloudinaryUploader, sign_params};
pub use pdf::{PdfRenderer, wrap_line};

/// File name for a report: `<slug>_<user suffix>_<unix seconds>.pdf`.
///
/// Only the last eight characters of the user id are kept.
pub fn report_file_name(slug: &str, user_id: &str, unix_secs: i64) -> String {
    let alnum: Vec<char> = user_id.chars().filter(char::is_ascii_alphanumeric).collect();
    let suffix: String = alnum[alnum.len().saturating_sub(8)..].iter().collect();
    let suffix = if suffix.is_empty() { "anon".to_string() } else { suffix };
    format!("{slug}_{suffix}_{unix_secs}.pdf")
}
