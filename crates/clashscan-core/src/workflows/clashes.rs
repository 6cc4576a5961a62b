use crate::core::crystal::expander::{SymmetryExpander, SymmetryExpansion};
use crate::core::crystal::symmetry::SymmetryInfo;
use crate::core::models::table::AtomTable;
use crate::core::models::topology::{ConnectivityGraph, DEFAULT_SEARCH_DEPTH};
use crate::engine::aggregator::{ClashAggregator, ClashResults};
use crate::engine::config::ClashConfig;
use crate::engine::detector::OverlapDetector;
use crate::engine::error::ClashError;
use crate::engine::exclusion::ExclusionClassifier;
use crate::engine::pair::{OverlapPair, PairClassification};
use tracing::{info, instrument, warn};

/// The outcome of a clash scan: every overlapping pair found plus the summary counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Clashes {
    pairs: Vec<OverlapPair>,
    results: ClashResults,
}

impl Clashes {
    pub fn get_results(&self) -> ClashResults {
        self.results
    }

    /// All overlapping pairs, excluded ones included, ordered by key.
    pub fn pairs(&self) -> &[OverlapPair] {
        &self.pairs
    }

    pub fn clash_pairs(&self) -> impl Iterator<Item = &OverlapPair> {
        self.pairs.iter().filter(|p| p.is_clash())
    }

    pub fn macro_mol_clashes(&self) -> impl Iterator<Item = &OverlapPair> {
        self.clash_pairs().filter(|p| !p.is_symmetry())
    }

    pub fn symmetry_clashes(&self) -> impl Iterator<Item = &OverlapPair> {
        self.clash_pairs().filter(|p| p.is_symmetry())
    }

    /// Clashes ordered from the largest overlap to the smallest.
    pub fn sorted_by_overlap(&self) -> Vec<&OverlapPair> {
        let mut clashes: Vec<&OverlapPair> = self.clash_pairs().collect();
        clashes.sort_by(|a, b| a.cmp_by_severity(b));
        clashes
    }
}

/// Scans a model for nonbonded clashes.
///
/// The scan is pure: the inputs are only read and the same inputs always produce the
/// same pairs and results.
///
/// # Arguments
///
/// * `atoms` - The asymmetric unit.
/// * `connectivity` - Bonded connectivity over `atoms`, searchable to depth 4 at least.
/// * `symmetry` - Unit cell and operators; `None` disables symmetry contacts.
/// * `config` - Tolerances and mode switches.
///
/// # Errors
///
/// * [`ClashError::Connectivity`] if the graph is missing, sized for a different
///   table or too shallow.
/// * [`ClashError::Config`] if `config` fails validation.
/// * [`ClashError::SpecialPosition`] if a bonded atom sits on a special position and
///   `allow_polymer_cross_special_position` is off.
/// * [`ClashError::Geometry`] if a 1-5 angle test meets coincident atoms.
#[instrument(skip_all, name = "clash_scan")]
pub fn get_clashes(
    atoms: &AtomTable,
    connectivity: Option<&ConnectivityGraph>,
    symmetry: Option<&SymmetryInfo>,
    config: &ClashConfig,
) -> Result<Clashes, ClashError> {
    config.validate()?;
    let graph = require_connectivity(atoms, connectivity)?;

    info!(
        n_atoms = atoms.len(),
        n_hydrogens = atoms.n_hydrogens(),
        n_bonds = graph.n_bonds(),
        symmetry = symmetry.is_some(),
        "Starting clash scan."
    );

    let detector = OverlapDetector::new(atoms, config);
    let classifier = ExclusionClassifier::new(atoms, graph);
    let mut pairs = detector.macro_mol_overlaps(&classifier)?;

    if let Some(symmetry) = symmetry {
        let expansion = SymmetryExpander::new(symmetry, detector.cutoff())
            .with_special_position_tolerance(config.special_position_tolerance)
            .expand(atoms);
        check_special_positions(&expansion, graph, config)?;
        pairs.extend(detector.symmetry_overlaps(&expansion.copies));
    }

    let (pairs, results) = ClashAggregator::new(atoms.len()).aggregate(pairs);
    Ok(Clashes { pairs, results })
}

fn require_connectivity<'a>(
    atoms: &AtomTable,
    connectivity: Option<&'a ConnectivityGraph>,
) -> Result<&'a ConnectivityGraph, ClashError> {
    let graph = connectivity.ok_or_else(|| {
        ClashError::Connectivity("a bonded connectivity graph is required".to_string())
    })?;
    if graph.n_atoms() != atoms.len() {
        return Err(ClashError::Connectivity(format!(
            "graph covers {} atoms but the table has {}",
            graph.n_atoms(),
            atoms.len()
        )));
    }
    if graph.search_depth() < DEFAULT_SEARCH_DEPTH {
        return Err(ClashError::Connectivity(format!(
            "graph search depth {} is below the required {}",
            graph.search_depth(),
            DEFAULT_SEARCH_DEPTH
        )));
    }
    Ok(graph)
}

fn check_special_positions(
    expansion: &SymmetryExpansion,
    graph: &ConnectivityGraph,
    config: &ClashConfig,
) -> Result<(), ClashError> {
    for image in &expansion.self_images {
        if graph.has_bonds(image.atom) && !config.allow_polymer_cross_special_position {
            return Err(ClashError::SpecialPosition {
                atom: image.atom,
                operator: image.operator.to_string(),
            });
        }
        warn!(
            atom = image.atom,
            operator = %image.operator,
            distance = image.distance,
            "Atom on special position; its self image is ignored."
        );
    }
    Ok(())
}

/// Rejects a model whose closest nonbonded pair is below
/// `nonbonded_distance_threshold`. Does nothing when the threshold is unset.
///
/// Only pairs that are not explained by bonding or alternate conformers are
/// considered, so bonded atoms never trip the guard.
pub fn check_nonbonded_distance_guard(
    clashes: &Clashes,
    config: &ClashConfig,
) -> Result<(), ClashError> {
    let Some(threshold) = config.nonbonded_distance_threshold else {
        return Ok(());
    };
    let closest = clashes
        .pairs()
        .iter()
        .filter(|p| {
            matches!(
                p.classification,
                PairClassification::Clash | PairClassification::BelowHardMinimum
            )
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance));

    match closest {
        Some(pair) if pair.distance < threshold => Err(ClashError::TooClose {
            i: pair.i,
            j: pair.j,
            distance: pair.distance,
            threshold,
        }),
        _ => Ok(()),
    }
}
