// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lookup tables for the 60-cycle animals and the 10 stems.
//!
//! Both tables are JSON arrays shipped as assets and loaded once at startup.
//! A missing or malformed file is fatal; a well-formed table with gaps is
//! accepted and the gaps resolve to [`UNKNOWN`].

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use shirokuma_core::ShirokumaError;
use shirokuma_core::types::UNKNOWN;

/// File name of the 60-entry animal table inside the tables directory.
pub const ANIMALS_FILE: &str = "animals.json";
/// File name of the 10-entry stem table inside the tables directory.
pub const STEMS_FILE: &str = "stems.json";

/// One row of the animal table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnimalEntry {
    /// Cycle number, 1..=60.
    pub number: u8,
    /// Sexagenary name of the day (`甲子` ..).
    #[serde(default)]
    pub sexagenary: Option<String>,
    /// Animal group (`チータ`).
    pub animal: String,
    /// Full character name (`長距離ランナーのチータ`).
    pub character: String,
}

/// One row of the stem table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StemEntry {
    pub symbol: String,
    pub element: String,
    pub guardian: String,
}

/// In-memory lookup tables, immutable after load.
#[derive(Debug, Clone, Default)]
pub struct LookupTables {
    animals: HashMap<u8, AnimalEntry>,
    stems: HashMap<String, StemEntry>,
}

impl LookupTables {
    /// Loads `animals.json` and `stems.json` from `dir`.
    pub fn load(dir: &Path) -> Result<Self, ShirokumaError> {
        let animals_path = dir.join(ANIMALS_FILE);
        let stems_path = dir.join(STEMS_FILE);
        let animals = read_asset(&animals_path)?;
        let stems = read_asset(&stems_path)?;
        let tables = Self::from_json(&animals, &stems).map_err(|message| ShirokumaError::Asset {
            path: dir.display().to_string(),
            message,
        })?;
        tracing::debug!(
            dir = %dir.display(),
            animals = tables.animals.len(),
            stems = tables.stems.len(),
            "lookup tables loaded"
        );
        Ok(tables)
    }

    /// Parses both tables from JSON text.
    ///
    /// Rejects entries with a cycle number outside 1..=60 and duplicate keys.
    pub fn from_json(animals_json: &str, stems_json: &str) -> Result<Self, String> {
        let animal_rows: Vec<AnimalEntry> = serde_json::from_str(animals_json)
            .map_err(|e| format!("{ANIMALS_FILE}: {e}"))?;
        let stem_rows: Vec<StemEntry> =
            serde_json::from_str(stems_json).map_err(|e| format!("{STEMS_FILE}: {e}"))?;

        let mut animals = HashMap::with_capacity(animal_rows.len());
        for row in animal_rows {
            if !(1..=60).contains(&row.number) {
                return Err(format!(
                    "{ANIMALS_FILE}: cycle number {} is outside 1..=60",
                    row.number
                ));
            }
            if let Some(prev) = animals.insert(row.number, row) {
                return Err(format!("{ANIMALS_FILE}: duplicate cycle number {}", prev.number));
            }
        }

        let mut stems = HashMap::with_capacity(stem_rows.len());
        for row in stem_rows {
            if let Some(prev) = stems.insert(row.symbol.clone(), row) {
                return Err(format!("{STEMS_FILE}: duplicate stem {}", prev.symbol));
            }
        }

        Ok(Self { animals, stems })
    }

    pub fn animal(&self, cycle_index: u8) -> Option<&AnimalEntry> {
        self.animals.get(&cycle_index)
    }

    pub fn stem(&self, symbol: &str) -> Option<&StemEntry> {
        self.stems.get(symbol)
    }

    /// Character name for a cycle index, or [`UNKNOWN`].
    pub fn character_or_unknown(&self, cycle_index: u8) -> String {
        self.animal(cycle_index)
            .map(|a| a.character.clone())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    /// Number of animal rows, used by the `check` command.
    pub fn animal_count(&self) -> usize {
        self.animals.len()
    }

    pub fn stem_count(&self) -> usize {
        self.stems.len()
    }
}

fn read_asset(path: &Path) -> Result<String, ShirokumaError> {
    std::fs::read_to_string(path).map_err(|e| ShirokumaError::Asset {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
