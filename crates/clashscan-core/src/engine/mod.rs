//! # Engine Module
//!
//! The clash criteria and the machinery that applies them to an atomic model.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - tolerances and mode switches of a scan, with TOML loading
//! - **Error Handling** ([`error`]) - the [`ClashError`](error::ClashError) type of the scan
//! - **Pair Records** ([`pair`]) - overlapping pairs and their classification
//! - **Topological Exclusion** ([`exclusion`]) - 1-2 through 1-5 exemptions from the bond graph
//! - **Overlap Detection** ([`detector`]) - KD-tree search over the asymmetric unit and its
//!   symmetry copies
//! - **Aggregation** ([`aggregator`]) - deduplication, counts and clash scores
//!
//! ## Key Capabilities
//!
//! - **Donor/acceptor aware radii** so hydrogen bonds are not reported as clashes
//! - **Implicit-hydrogen compensation** for models built without hydrogens
//! - **Alternate-location exclusivity** between conformers of the same site
//! - **Parallel search** over atoms and symmetry copies behind the `parallel` feature

pub mod aggregator;
pub mod config;
pub mod detector;
pub mod error;
pub mod exclusion;
pub mod pair;
