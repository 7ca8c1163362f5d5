// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Width folding for user-typed text.

/// Folds full-width digits, Latin letters, date separators and the
/// ideographic space to ASCII. Everything else passes through unchanged.
pub fn normalize(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    match c {
        '０'..='９' | 'Ａ'..='Ｚ' | 'ａ'..='ｚ' | '／' | '－' | '．' => {
            char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
        }
        '\u{3000}' => ' ',
        // Dash look-alikes that phone keyboards insert into dates.
        '‐' | '−' => '-',
        _ => c,
    }
}
