// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Day-count arithmetic for the 60-day cycle and the 10-day stem cycle.

use chrono::NaiveDate;
use shirokuma_config::model::CalendarConfig;
use shirokuma_core::types::UNKNOWN;
use shirokuma_core::{BirthDate, ClassificationResult, ShirokumaError};

use crate::tables::LookupTables;

/// The ten stems in cycle order; index 0 is the stem epoch's stem.
pub const STEM_SYMBOLS: [&str; 10] = ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"];

/// Reference dates for both cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epochs {
    /// A day whose cycle index is 1.
    pub cycle: NaiveDate,
    /// A day whose stem index is 0.
    pub stem: NaiveDate,
}

impl Default for Epochs {
    fn default() -> Self {
        // 1899-12-22 is a 甲子 day and 1900-01-01 a 甲 day; both are valid dates.
        Self {
            cycle: NaiveDate::from_ymd_opt(1899, 12, 22).unwrap_or_default(),
            stem: NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or_default(),
        }
    }
}

impl Epochs {
    pub fn from_config(config: &CalendarConfig) -> Result<Self, ShirokumaError> {
        let cycle = config.cycle_epoch_date().ok_or_else(|| {
            ShirokumaError::Config(format!(
                "calendar.cycle_epoch `{}` is not a date",
                config.cycle_epoch
            ))
        })?;
        let stem = config.stem_epoch_date().ok_or_else(|| {
            ShirokumaError::Config(format!(
                "calendar.stem_epoch `{}` is not a date",
                config.stem_epoch
            ))
        })?;
        Ok(Self { cycle, stem })
    }
}

/// Position of `date` in the 60-day cycle, 1..=60.
///
/// Dates before the epoch wrap around, so the result is defined for every
/// representable date.
pub fn cycle_index(date: NaiveDate, epoch: NaiveDate) -> u8 {
    let days = (date - epoch).num_days();
    (days.rem_euclid(60) + 1) as u8
}

/// Position of `date` in the 10-day stem cycle, 0..=9.
pub fn stem_index(date: NaiveDate, epoch: NaiveDate) -> u8 {
    (date - epoch).num_days().rem_euclid(10) as u8
}

/// Maps birth dates onto table attributes.
#[derive(Debug, Clone)]
pub struct Classifier {
    epochs: Epochs,
    tables: LookupTables,
}

impl Classifier {
    pub fn new(epochs: Epochs, tables: LookupTables) -> Self {
        Self { epochs, tables }
    }

    pub fn tables(&self) -> &LookupTables {
        &self.tables
    }

    pub fn epochs(&self) -> Epochs {
        self.epochs
    }

    /// Classifies `birth`. Table gaps become [`UNKNOWN`].
    pub fn classify(&self, birth: &BirthDate) -> ClassificationResult {
        let date = birth.date();
        let cycle = cycle_index(date, self.epochs.cycle);
        let stem = stem_index(date, self.epochs.stem);
        let symbol = STEM_SYMBOLS[stem as usize];

        let (element, guardian) = match self.tables.stem(symbol) {
            Some(entry) => (entry.element.clone(), entry.guardian.clone()),
            None => (UNKNOWN.to_string(), UNKNOWN.to_string()),
        };

        ClassificationResult {
            cycle_index: cycle,
            animal: self.tables.character_or_unknown(cycle),
            stem_index: stem,
            stem_symbol: symbol.to_string(),
            element,
            guardian,
        }
    }

    /// Like [`classify`](Self::classify), but an all-unknown result is an error.
    pub fn classify_resolved(
        &self,
        birth: &BirthDate,
    ) -> Result<ClassificationResult, ShirokumaError> {
        let result = self.classify(birth);
        if result.is_unresolved() {
            tracing::warn!(date = %birth.iso(), "classification unresolved");
            return Err(ShirokumaError::Classification(birth.iso()));
        }
        Ok(result)
    }
}
