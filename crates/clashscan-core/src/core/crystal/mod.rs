//! Crystallographic context: unit cells, symmetry operators and the expansion of an
//! asymmetric unit into the symmetry copies surrounding it.

use thiserror::Error;

pub mod cell;
pub mod expander;
pub mod symmetry;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CrystalError {
    #[error("Invalid unit cell: {0}")]
    InvalidCell(String),
    #[error("Cannot parse symmetry operator '{input}': {reason}")]
    OperatorParse { input: String, reason: String },
}
