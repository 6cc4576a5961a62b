use crate::core::models::table::AtomTable;
use phf::{Map, phf_map};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Fallback van der Waals radius (Å) for elements missing from [`VDW_RADII`].
pub const DEFAULT_VDW_RADIUS: f64 = 1.80;

/// Van der Waals radii (Å) used when hydrogens are modeled explicitly.
static VDW_RADII: Map<&'static str, f64> = phf_map! {
    "H" => 1.10,
    "D" => 1.10,
    "C" => 1.75,
    "N" => 1.55,
    "O" => 1.52,
    "F" => 1.47,
    "P" => 1.80,
    "S" => 1.80,
    "Cl" => 1.75,
    "Br" => 1.85,
    "I" => 1.98,
    "Se" => 1.90,
    "Na" => 2.27,
    "Mg" => 1.73,
    "K" => 2.75,
    "Ca" => 2.31,
    "Mn" => 2.00,
    "Fe" => 2.00,
    "Co" => 2.00,
    "Ni" => 1.63,
    "Cu" => 1.40,
    "Zn" => 1.39,
};

/// Radii (Å) for heavy atoms that carry their hydrogens implicitly.
static IMPLICIT_H_VDW_RADII: Map<&'static str, f64> = phf_map! {
    "C" => 1.95,
    "N" => 1.65,
    "O" => 1.60,
    "S" => 1.90,
    "P" => 1.90,
};

/// Normalizes an element symbol to its canonical capitalization ("CL" -> "Cl").
pub fn normalize_element(symbol: &str) -> String {
    let trimmed = symbol.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Returns `true` for protium and deuterium symbols.
pub fn is_hydrogen_element(symbol: &str) -> bool {
    matches!(normalize_element(symbol).as_str(), "H" | "D")
}

pub fn vdw_radius(element: &str) -> Option<f64> {
    VDW_RADII.get(normalize_element(element).as_str()).copied()
}

pub fn implicit_h_vdw_radius(element: &str) -> Option<f64> {
    IMPLICIT_H_VDW_RADII
        .get(normalize_element(element).as_str())
        .copied()
}

#[derive(Debug, Error)]
pub enum RadiusTableError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Invalid radius {value} for element '{element}'")]
    InvalidRadius { element: String, value: f64 },
}

#[derive(Debug, Deserialize)]
struct RadiusRecord {
    element: String,
    vdw_radius: f64,
    implicit_h_vdw_radius: Option<f64>,
}

/// Per-element radius overrides, typically loaded from a CSV file with the columns
/// `element,vdw_radius,implicit_h_vdw_radius`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadiusTable {
    entries: HashMap<String, (f64, Option<f64>)>,
}

impl RadiusTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, RadiusTableError> {
        let path_str = path.to_string_lossy().to_string();
        let file = std::fs::File::open(path).map_err(|e| RadiusTableError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(file);

        let mut table = Self::new();
        for result in reader.deserialize::<RadiusRecord>() {
            let record = result.map_err(|e| RadiusTableError::Csv {
                path: path_str.clone(),
                source: e,
            })?;
            table.insert(
                &record.element,
                record.vdw_radius,
                record.implicit_h_vdw_radius,
            )?;
        }
        Ok(table)
    }

    pub fn insert(
        &mut self,
        element: &str,
        vdw_radius: f64,
        implicit_h_vdw_radius: Option<f64>,
    ) -> Result<(), RadiusTableError> {
        for value in std::iter::once(vdw_radius).chain(implicit_h_vdw_radius) {
            if !value.is_finite() || value <= 0.0 {
                return Err(RadiusTableError::InvalidRadius {
                    element: element.to_string(),
                    value,
                });
            }
        }
        self.entries.insert(
            normalize_element(element),
            (vdw_radius, implicit_h_vdw_radius),
        );
        Ok(())
    }

    pub fn get(&self, element: &str) -> Option<(f64, Option<f64>)> {
        self.entries.get(&normalize_element(element)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overwrites the radii of every atom whose element has an entry; returns the
    /// number of atoms touched.
    pub fn apply(&self, atoms: &mut AtomTable) -> usize {
        let mut updated = 0;
        for atom in atoms.atoms_mut() {
            if let Some((vdw, implicit)) = self.get(&atom.element) {
                atom.vdw_radius = vdw;
                atom.implicit_h_vdw_radius = implicit;
                updated += 1;
            }
        }
        updated
    }
}
