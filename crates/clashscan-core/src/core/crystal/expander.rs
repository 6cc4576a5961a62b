use super::symmetry::{SymmetryInfo, SymmetryOperator};
use crate::core::models::table::AtomTable;
use itertools::iproduct;
use nalgebra::Point3;
use tracing::{debug, instrument};

/// Default distance (Å) under which a copy of an atom onto itself marks a special position.
pub const DEFAULT_SPECIAL_POSITION_TOLERANCE: f64 = 0.5;

/// A symmetry-generated image of an asymmetric-unit atom.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryCopy {
    /// Index of the asymmetric-unit atom this copy was generated from.
    pub source: usize,
    /// The operator that produced the copy, lattice shift included.
    pub operator: SymmetryOperator,
    pub position: Point3<f64>,
}

/// A copy that landed on (or next to) its own source atom.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfImage {
    pub atom: usize,
    pub operator: SymmetryOperator,
    pub distance: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymmetryExpansion {
    pub copies: Vec<SymmetryCopy>,
    pub self_images: Vec<SelfImage>,
}

/// Generates the symmetry copies that can come within `cutoff` of the asymmetric unit.
///
/// Every operator is combined with every integer lattice shift that brings an image
/// into the asymmetric unit's fractional bounding box widened by the cutoff. The
/// identity with zero shift is the asymmetric unit itself and is never emitted.
#[derive(Debug, Clone)]
pub struct SymmetryExpander<'a> {
    symmetry: &'a SymmetryInfo,
    cutoff: f64,
    special_position_tolerance: f64,
}

impl<'a> SymmetryExpander<'a> {
    pub fn new(symmetry: &'a SymmetryInfo, cutoff: f64) -> Self {
        Self {
            symmetry,
            cutoff,
            special_position_tolerance: DEFAULT_SPECIAL_POSITION_TOLERANCE,
        }
    }

    pub fn with_special_position_tolerance(mut self, tolerance: f64) -> Self {
        self.special_position_tolerance = tolerance;
        self
    }

    #[instrument(skip_all, name = "symmetry_expansion")]
    pub fn expand(&self, atoms: &AtomTable) -> SymmetryExpansion {
        let mut expansion = SymmetryExpansion::default();
        if atoms.is_empty() {
            return expansion;
        }

        let cell = self.symmetry.cell();
        let fractional: Vec<Point3<f64>> = atoms
            .iter()
            .map(|atom| cell.fractionalize(&atom.position))
            .collect();
        let (lower, upper) = self.bounding_box(&fractional);

        for (op_index, operator) in self.symmetry.operators().iter().enumerate() {
            let identity = operator.is_identity();
            for (source, frac) in fractional.iter().enumerate() {
                let image = operator.apply(frac);
                let ranges: [(i32, i32); 3] = [0, 1, 2].map(|k| {
                    (
                        (lower[k] - image[k]).ceil() as i32,
                        (upper[k] - image[k]).floor() as i32,
                    )
                });

                for (na, nb, nc) in iproduct!(
                    ranges[0].0..=ranges[0].1,
                    ranges[1].0..=ranges[1].1,
                    ranges[2].0..=ranges[2].1
                ) {
                    if identity && (na, nb, nc) == (0, 0, 0) {
                        continue;
                    }
                    let shifted = operator.with_lattice_shift([na, nb, nc]);
                    let position = cell.orthogonalize(&shifted.apply(frac));

                    let distance = (position - atoms.atoms()[source].position).norm();
                    if distance < self.special_position_tolerance {
                        debug!(
                            atom = source,
                            operator = %shifted,
                            distance,
                            "Atom sits on a special position."
                        );
                        expansion.self_images.push(SelfImage {
                            atom: source,
                            operator: shifted,
                            distance,
                        });
                        continue;
                    }

                    expansion.copies.push(SymmetryCopy {
                        source,
                        operator: shifted,
                        position,
                    });
                }
            }
            debug!(
                operator_index = op_index,
                total_copies = expansion.copies.len(),
                "Operator expanded."
            );
        }

        debug!(
            copies = expansion.copies.len(),
            self_images = expansion.self_images.len(),
            "Symmetry expansion complete."
        );
        expansion
    }

    fn bounding_box(&self, fractional: &[Point3<f64>]) -> ([f64; 3], [f64; 3]) {
        let margin = self.symmetry.cell().fractional_margin(self.cutoff);
        let mut lower = [f64::INFINITY; 3];
        let mut upper = [f64::NEG_INFINITY; 3];
        for p in fractional {
            for k in 0..3 {
                lower[k] = lower[k].min(p[k]);
                upper[k] = upper[k].max(p[k]);
            }
        }
        for k in 0..3 {
            lower[k] -= margin[k];
            upper[k] += margin[k];
        }
        (lower, upper)
    }
}
