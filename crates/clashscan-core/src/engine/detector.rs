use super::config::ClashConfig;
use super::error::ClashError;
use super::exclusion::ExclusionClassifier;
use super::pair::{OverlapPair, PairClassification};
use crate::core::crystal::expander::SymmetryCopy;
use crate::core::models::table::AtomTable;
use kiddo::SquaredEuclidean;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use nalgebra::Point3;
use std::collections::HashMap;
use tracing::{debug, instrument, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Finds overlapping atom pairs among the asymmetric unit and against symmetry copies.
///
/// Candidates come from a KD-tree over the asymmetric-unit positions, queried with the
/// largest combined radius any two atoms can have, so no overlapping pair is missed.
/// Atoms sharing exact coordinates are stored as one site of the tree, so any number of
/// coincident atoms is accepted.
pub struct OverlapDetector<'a> {
    atoms: &'a AtomTable,
    config: &'a ClashConfig,
    kdtree: Option<ImmutableKdTree<f64, u64, 3, 32>>,
    sites: Vec<Vec<usize>>,
    radii: Vec<f64>,
    cutoff: f64,
}

impl<'a> OverlapDetector<'a> {
    pub fn new(atoms: &'a AtomTable, config: &'a ClashConfig) -> Self {
        let mut site_of: HashMap<[u64; 3], usize> = HashMap::new();
        let mut positions: Vec<[f64; 3]> = Vec::new();
        let mut sites: Vec<Vec<usize>> = Vec::new();
        for (index, atom) in atoms.iter().enumerate() {
            let p = [atom.position.x, atom.position.y, atom.position.z];
            let site = *site_of.entry(p.map(f64::to_bits)).or_insert_with(|| {
                positions.push(p);
                sites.push(Vec::new());
                sites.len() - 1
            });
            sites[site].push(index);
        }
        let kdtree = if positions.is_empty() {
            None
        } else {
            Some(ImmutableKdTree::new_from_slice(&positions))
        };
        let radii = atoms
            .iter()
            .map(|atom| atom.effective_vdw_radius(config.assume_hydrogens_all_missing))
            .collect();
        let cutoff = 2.0 * atoms.max_effective_radius(config.assume_hydrogens_all_missing);

        debug!(
            n_atoms = atoms.len(),
            n_sites = sites.len(),
            cutoff,
            "KD-tree built."
        );

        Self {
            atoms,
            config,
            kdtree,
            sites,
            radii,
            cutoff,
        }
    }

    /// Search radius (Å): the largest possible combined effective radius.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Combined effective radius of atoms `i` and `j`, shrunk for donor/acceptor pairs.
    pub fn combined_radius(&self, i: usize, j: usize) -> f64 {
        let atoms = self.atoms.atoms();
        let mut sum = self.radii[i] + self.radii[j];
        if atoms[i].hbond_role.pairs_with(atoms[j].hbond_role) {
            sum -= self.config.donor_acceptor_shrink;
        }
        sum
    }

    fn overlaps(&self, distance: f64, vdw_sum: f64) -> bool {
        distance < vdw_sum - self.config.overlap_tolerance
    }

    fn candidates(&self, query: &Point3<f64>) -> Vec<usize> {
        let Some(kdtree) = &self.kdtree else {
            return Vec::new();
        };
        kdtree
            .within::<SquaredEuclidean>(&[query.x, query.y, query.z], self.cutoff * self.cutoff)
            .into_iter()
            .flat_map(|neighbour| self.sites[neighbour.item as usize].iter().copied())
            .collect()
    }

    /// Overlapping pairs within the asymmetric unit, each reported once with `i < j`.
    ///
    /// # Errors
    ///
    /// Propagates [`ClashError::Geometry`] from the 1-5 angle test.
    #[instrument(skip_all, name = "macro_mol_overlaps")]
    pub fn macro_mol_overlaps(
        &self,
        classifier: &ExclusionClassifier,
    ) -> Result<Vec<OverlapPair>, ClashError> {
        #[cfg(not(feature = "parallel"))]
        let iterator = 0..self.atoms.len();

        #[cfg(feature = "parallel")]
        let iterator = (0..self.atoms.len()).into_par_iter();

        let per_atom: Vec<Vec<OverlapPair>> = iterator
            .map(|i| self.macro_mol_overlaps_of(i, classifier))
            .collect::<Result<_, _>>()?;

        let mut pairs: Vec<OverlapPair> = per_atom.into_iter().flatten().collect();
        pairs.sort_by_key(OverlapPair::key);

        debug!(
            overlapping = pairs.len(),
            clashes = pairs.iter().filter(|p| p.is_clash()).count(),
            "Macromolecular overlaps evaluated."
        );
        Ok(pairs)
    }

    fn macro_mol_overlaps_of(
        &self,
        i: usize,
        classifier: &ExclusionClassifier,
    ) -> Result<Vec<OverlapPair>, ClashError> {
        let atoms = self.atoms.atoms();
        let atom_i = &atoms[i];
        let mut pairs = Vec::new();

        for j in self
            .candidates(&atom_i.position)
            .into_iter()
            .filter(|&j| j > i)
        {
            let atom_j = &atoms[j];
            let distance = (atom_i.position - atom_j.position).norm();
            let vdw_sum = self.combined_radius(i, j);
            if !self.overlaps(distance, vdw_sum) {
                continue;
            }

            let classification = if !atom_i.is_altloc_compatible(atom_j) {
                PairClassification::AltlocExcluded
            } else if let Some(exclusion) = classifier.classify(i, j)? {
                exclusion
            } else if distance < self.config.hard_minimum_nonbonded_distance {
                PairClassification::BelowHardMinimum
            } else {
                PairClassification::Clash
            };

            trace!(i, j, distance, vdw_sum, %classification, "Overlap.");
            pairs.push(OverlapPair::macro_mol(
                i,
                j,
                distance,
                vdw_sum,
                classification,
            ));
        }
        Ok(pairs)
    }

    /// Overlaps between asymmetric-unit atoms and symmetry copies.
    ///
    /// Symmetry copies carry no bonded topology, so these pairs are only filtered by
    /// alternate location and the hard minimum distance.
    #[instrument(skip_all, name = "symmetry_overlaps")]
    pub fn symmetry_overlaps(&self, copies: &[SymmetryCopy]) -> Vec<OverlapPair> {
        #[cfg(not(feature = "parallel"))]
        let mut pairs: Vec<OverlapPair> = copies
            .iter()
            .flat_map(|copy| self.symmetry_overlaps_of(copy))
            .collect();

        #[cfg(feature = "parallel")]
        let mut pairs: Vec<OverlapPair> = copies
            .par_iter()
            .flat_map_iter(|copy| self.symmetry_overlaps_of(copy))
            .collect();

        pairs.sort_by_key(OverlapPair::key);

        debug!(
            copies = copies.len(),
            overlapping = pairs.len(),
            clashes = pairs.iter().filter(|p| p.is_clash()).count(),
            "Symmetry overlaps evaluated."
        );
        pairs
    }

    fn symmetry_overlaps_of(&self, copy: &SymmetryCopy) -> Vec<OverlapPair> {
        let atoms = self.atoms.atoms();
        let source = &atoms[copy.source];

        self.candidates(&copy.position)
            .into_iter()
            .filter_map(|i| {
                let atom_i = &atoms[i];
                let distance = (atom_i.position - copy.position).norm();
                let vdw_sum = self.combined_radius(i, copy.source);
                if !self.overlaps(distance, vdw_sum) {
                    return None;
                }

                let classification = if !atom_i.is_altloc_compatible(source) {
                    PairClassification::AltlocExcluded
                } else if distance < self.config.hard_minimum_nonbonded_distance {
                    PairClassification::BelowHardMinimum
                } else {
                    PairClassification::Clash
                };

                trace!(
                    i,
                    j = copy.source,
                    operator = %copy.operator,
                    distance,
                    %classification,
                    "Symmetry overlap."
                );
                Some(OverlapPair::symmetry(
                    i,
                    copy.source,
                    copy.operator,
                    distance,
                    vdw_sum,
                    classification,
                ))
            })
            .collect()
    }
}
