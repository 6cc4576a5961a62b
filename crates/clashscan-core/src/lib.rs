//! # clashscan Core Library
//!
//! Nonbonded clash detection for atomic models: every pair of atoms that are not
//! bonded to each other, including pairs formed with crystallographic symmetry mates,
//! is checked for steric overlap, and the result is summarized as clash counts and a
//! clashscore (clashes per 1000 atoms).
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same three layers throughout:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`AtomTable`,
//!   `ConnectivityGraph`), crystallographic context (`UnitCell`, `SymmetryInfo`) and
//!   small geometric and element utilities.
//!
//! - **[`engine`]: The Logic Core.** The clash criteria: configuration, topological
//!   exclusion, KD-tree overlap detection and aggregation into scores.
//!
//! - **[`workflows`]: The Public API.** [`workflows::clashes::get_clashes`] ties the
//!   layers together into one pure call over borrowed, read-only inputs.
//!
//! Building the atom table and its bond graph from a structure file is the caller's
//! job; this crate never parses files other than its own configuration and radius
//! tables.

pub mod core;
pub mod engine;
pub mod workflows;
