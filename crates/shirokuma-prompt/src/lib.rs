// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt construction.
//!
//! Templates are JSON files, one per diagnosis type. Their text fields may
//! contain `${a.b.c}` placeholders, which are resolved against a nested
//! environment built from the request and its classifications. Unresolved
//! placeholders stay in the output verbatim.

pub mod assemble;
pub mod environment;
pub mod render;
pub mod template;

pub use assemble::{AssembledPrompt, BASE_SYSTEM_PROMPT, SAFER_SYSTEM_PROMPT, assemble};
pub use environment::{DEFAULT_USER_NAME, build_environment};
pub use render::render;
pub use template::{PromptTemplate, TemplateSet};
