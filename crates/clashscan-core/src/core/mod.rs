//! # Core Module
//!
//! Stateless building blocks of the clash scanner.
//!
//! - **Atomic model** ([`models`]) - the atom table and the bonded connectivity graph
//! - **Crystal context** ([`crystal`]) - unit cells, symmetry operators and symmetry expansion
//! - **Utilities** ([`utils`]) - angle geometry and element radius tables
//!
//! Nothing in this layer knows about clash criteria; it only describes the model
//! being scanned.

pub mod crystal;
pub mod models;
pub mod utils;
