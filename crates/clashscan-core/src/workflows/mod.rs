//! # Workflows Module
//!
//! The top-level entry points of clashscan.
//!
//! - **Clash Scan** ([`clashes`]) - [`get_clashes`](clashes::get_clashes) runs the whole
//!   scan (validation, overlap search, symmetry expansion, aggregation) and returns a
//!   [`Clashes`](clashes::Clashes) object; the optional distance guard is applied to
//!   that object afterwards.

pub mod clashes;
