use super::error::ClashError;
use super::pair::PairClassification;
use crate::core::models::table::AtomTable;
use crate::core::models::topology::ConnectivityGraph;
use crate::core::utils::geometry::cos_vec;
use tracing::trace;

/// Bonded path length of a 1-5 relationship.
const ONE_FIVE_PATH_LENGTH: usize = 4;

/// Returns `true` iff exactly one of `i`, `j` is a hydrogen and their shortest bonded
/// path is exactly four bonds long.
///
/// # Arguments
///
/// * `i`, `j` - Atom indices; the order does not matter.
/// * `hd_sel` - Per-atom hydrogen flags, as from [`AtomTable::hydrogen_selection`].
/// * `graph` - The bonded connectivity of the model.
pub fn check_if_1_5_interaction(
    i: usize,
    j: usize,
    hd_sel: &[bool],
    graph: &ConnectivityGraph,
) -> bool {
    match (hd_sel.get(i), hd_sel.get(j)) {
        (Some(hi), Some(hj)) if hi != hj => {
            graph.shortest_path_length(i, j) == Some(ONE_FIVE_PATH_LENGTH)
        }
        _ => false,
    }
}

/// Decides whether an overlapping macromolecular pair is explained by the bonded
/// topology.
///
/// 1-2, 1-3 and 1-4 pairs are always exempt. A hydrogen/heavy-atom pair four bonds
/// apart is exempt when the hydrogen leans toward the heavy atom as seen from the
/// hydrogen's parent, i.e. `cos_vec(h, parent, x) > 0`. Pairs further apart, or not
/// connected, are never exempt.
///
/// The zero threshold is unverified: the reference structures only contain 1-5
/// hydrogen contacts with a cosine near 0.5, so any threshold below that gives the
/// same clash counts.
pub struct ExclusionClassifier<'a> {
    atoms: &'a AtomTable,
    graph: &'a ConnectivityGraph,
    hydrogen_selection: Vec<bool>,
}

impl<'a> ExclusionClassifier<'a> {
    pub fn new(atoms: &'a AtomTable, graph: &'a ConnectivityGraph) -> Self {
        Self {
            atoms,
            graph,
            hydrogen_selection: atoms.hydrogen_selection(),
        }
    }

    pub fn hydrogen_selection(&self) -> &[bool] {
        &self.hydrogen_selection
    }

    pub fn is_1_5_interaction(&self, i: usize, j: usize) -> bool {
        check_if_1_5_interaction(i, j, &self.hydrogen_selection, self.graph)
    }

    /// Returns the exclusion that applies to the pair, or `None` if it may clash.
    ///
    /// # Errors
    ///
    /// Returns [`ClashError::Geometry`] if the 1-5 angle test meets coincident atoms.
    pub fn classify(&self, i: usize, j: usize) -> Result<Option<PairClassification>, ClashError> {
        let path_length = self.graph.shortest_path_length(i, j);
        if let Some(exclusion) = path_length.and_then(PairClassification::from_path_length) {
            return Ok(Some(exclusion));
        }

        let is_h = |k: usize| self.hydrogen_selection.get(k).copied().unwrap_or(false);
        if path_length != Some(ONE_FIVE_PATH_LENGTH) || is_h(i) == is_h(j) {
            return Ok(None);
        }

        let (h, x) = if is_h(i) { (i, j) } else { (j, i) };
        if self.one_five_leans_toward(h, x)? {
            trace!(hydrogen = h, partner = x, "1-5 overlap excluded by geometry.");
            Ok(Some(PairClassification::ExcludedOneFive))
        } else {
            Ok(None)
        }
    }

    fn one_five_leans_toward(&self, h: usize, x: usize) -> Result<bool, ClashError> {
        let Some(&parent) = self.graph.neighbors(h).first() else {
            return Ok(false);
        };
        let (Some(h_atom), Some(p_atom), Some(x_atom)) =
            (self.atoms.get(h), self.atoms.get(parent), self.atoms.get(x))
        else {
            return Ok(false);
        };
        let cos = cos_vec(&h_atom.position, &p_atom.position, &x_atom.position)?;
        Ok(cos > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point3;

    // H0-C1-C2-C3-C4-C5, with H0 placed by the caller.
    fn chain_with_hydrogen(h_position: Point3<f64>) -> (AtomTable, ConnectivityGraph) {
        let atoms: AtomTable = [
            Atom::new("H1", "H", h_position),
            Atom::new("C1", "C", Point3::new(0.0, 0.0, 0.0)),
            Atom::new("C2", "C", Point3::new(1.5, 0.0, 0.0)),
            Atom::new("C3", "C", Point3::new(2.0, 1.4, 0.0)),
            Atom::new("C4", "C", Point3::new(1.0, 2.5, 0.0)),
            Atom::new("C5", "C", Point3::new(1.5, 3.9, 0.0)),
        ]
        .into_iter()
        .collect();
        let graph =
            ConnectivityGraph::from_bonds(6, [(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]).unwrap();
        (atoms, graph)
    }

    #[test]
    fn one_five_check_requires_exactly_one_hydrogen_at_path_four() {
        let (atoms, graph) = chain_with_hydrogen(Point3::new(-0.5, 0.9, 0.0));
        let hd_sel = atoms.hydrogen_selection();

        assert!(check_if_1_5_interaction(0, 4, &hd_sel, &graph));
        assert!(check_if_1_5_interaction(4, 0, &hd_sel, &graph));
        assert!(!check_if_1_5_interaction(0, 3, &hd_sel, &graph));
        assert!(!check_if_1_5_interaction(0, 5, &hd_sel, &graph));
        assert!(!check_if_1_5_interaction(1, 5, &hd_sel, &graph));
        assert!(!check_if_1_5_interaction(0, 99, &hd_sel, &graph));
    }

    #[test]
    fn one_five_check_rejects_two_hydrogens() {
        let hd_sel = vec![true, false, false, false, true];
        let graph = ConnectivityGraph::from_bonds(5, [(0, 1), (1, 2), (2, 3), (3, 4)]).unwrap();
        assert!(!check_if_1_5_interaction(0, 4, &hd_sel, &graph));
    }

    #[test]
    fn short_paths_are_always_excluded() {
        let (atoms, graph) = chain_with_hydrogen(Point3::new(-0.5, 0.9, 0.0));
        let classifier = ExclusionClassifier::new(&atoms, &graph);
        assert_eq!(
            classifier.classify(0, 1).unwrap(),
            Some(PairClassification::ExcludedBonded)
        );
        assert_eq!(
            classifier.classify(2, 0).unwrap(),
            Some(PairClassification::ExcludedAngle)
        );
        assert_eq!(
            classifier.classify(0, 3).unwrap(),
            Some(PairClassification::ExcludedTorsion)
        );
        assert_eq!(classifier.classify(0, 5).unwrap(), None);
        assert_eq!(classifier.classify(1, 5).unwrap(), None);
    }

    #[test]
    fn one_five_hydrogen_leaning_toward_partner_is_excluded() {
        // C1->H points up-left, C1->C4 points up-right: acute angle.
        let (atoms, graph) = chain_with_hydrogen(Point3::new(-0.5, 0.9, 0.0));
        let classifier = ExclusionClassifier::new(&atoms, &graph);
        assert!(classifier.is_1_5_interaction(0, 4));
        assert_eq!(
            classifier.classify(0, 4).unwrap(),
            Some(PairClassification::ExcludedOneFive)
        );
        assert_eq!(
            classifier.classify(4, 0).unwrap(),
            Some(PairClassification::ExcludedOneFive)
        );
    }

    #[test]
    fn one_five_hydrogen_pointing_away_is_not_excluded() {
        let (atoms, graph) = chain_with_hydrogen(Point3::new(-0.5, -0.9, 0.0));
        let classifier = ExclusionClassifier::new(&atoms, &graph);
        assert_eq!(classifier.classify(0, 4).unwrap(), None);
    }

    #[test]
    fn one_five_heavy_atom_pair_is_not_excluded() {
        let atoms: AtomTable = (0..5)
            .map(|k| Atom::new("C", "C", Point3::new(k as f64 * 1.5, 0.0, 0.0)))
            .collect();
        let graph = ConnectivityGraph::from_bonds(5, [(0, 1), (1, 2), (2, 3), (3, 4)]).unwrap();
        let classifier = ExclusionClassifier::new(&atoms, &graph);
        assert_eq!(classifier.classify(0, 4).unwrap(), None);
    }

    #[test]
    fn coincident_hydrogen_and_parent_is_a_geometry_error() {
        let (atoms, graph) = chain_with_hydrogen(Point3::new(0.0, 0.0, 0.0));
        let classifier = ExclusionClassifier::new(&atoms, &graph);
        assert!(matches!(
            classifier.classify(0, 4),
            Err(ClashError::Geometry { .. })
        ));
    }
}
