use crate::core::crystal::symmetry::{OperatorKey, SymmetryOperator};
use std::cmp::Ordering;
use std::fmt;

/// Outcome of evaluating an overlapping atom pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PairClassification {
    /// A counted steric clash.
    Clash,
    /// The atoms are directly bonded (1-2).
    ExcludedBonded,
    /// The atoms share a bonded neighbor (1-3).
    ExcludedAngle,
    /// The atoms are separated by three bonds (1-4).
    ExcludedTorsion,
    /// A hydrogen/heavy-atom pair four bonds apart whose overlap is dictated by the
    /// bonded geometry.
    ExcludedOneFive,
    /// The atoms belong to different alternate conformers.
    AltlocExcluded,
    /// The atoms are closer than the configured hard minimum and are not counted.
    BelowHardMinimum,
}

impl PairClassification {
    pub fn is_clash(self) -> bool {
        self == PairClassification::Clash
    }

    pub fn is_topological_exclusion(self) -> bool {
        matches!(
            self,
            PairClassification::ExcludedBonded
                | PairClassification::ExcludedAngle
                | PairClassification::ExcludedTorsion
                | PairClassification::ExcludedOneFive
        )
    }

    /// Exclusion implied by the bonded path length alone, for lengths 1 to 3.
    pub fn from_path_length(length: usize) -> Option<Self> {
        match length {
            1 => Some(PairClassification::ExcludedBonded),
            2 => Some(PairClassification::ExcludedAngle),
            3 => Some(PairClassification::ExcludedTorsion),
            _ => None,
        }
    }
}

impl fmt::Display for PairClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PairClassification::Clash => "clash",
            PairClassification::ExcludedBonded => "excluded-bonded",
            PairClassification::ExcludedAngle => "excluded-angle",
            PairClassification::ExcludedTorsion => "excluded-torsion",
            PairClassification::ExcludedOneFive => "excluded-1-5",
            PairClassification::AltlocExcluded => "altloc-excluded",
            PairClassification::BelowHardMinimum => "below-hard-minimum",
        };
        f.write_str(label)
    }
}

/// Deduplication key of a pair: both atom indices and the quantized operator.
pub type PairKey = (usize, usize, Option<OperatorKey>);

/// Two atoms closer than their combined van der Waals radius allows.
///
/// Macromolecular pairs (no operator) are stored with `i < j`. For symmetry pairs `i`
/// is the asymmetric-unit atom and `j` the source atom of the copy that `operator`
/// generated, so the pair is directed.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapPair {
    pub i: usize,
    pub j: usize,
    pub operator: Option<SymmetryOperator>,
    pub distance: f64,
    /// Combined effective radius the distance was compared against.
    pub vdw_sum: f64,
    pub classification: PairClassification,
}

impl OverlapPair {
    /// Builds a macromolecular pair with canonical index order.
    pub fn macro_mol(
        i: usize,
        j: usize,
        distance: f64,
        vdw_sum: f64,
        classification: PairClassification,
    ) -> Self {
        Self {
            i: i.min(j),
            j: i.max(j),
            operator: None,
            distance,
            vdw_sum,
            classification,
        }
    }

    pub fn symmetry(
        i: usize,
        j: usize,
        operator: SymmetryOperator,
        distance: f64,
        vdw_sum: f64,
        classification: PairClassification,
    ) -> Self {
        Self {
            i,
            j,
            operator: Some(operator),
            distance,
            vdw_sum,
            classification,
        }
    }

    pub fn overlap(&self) -> f64 {
        self.vdw_sum - self.distance
    }

    pub fn is_symmetry(&self) -> bool {
        self.operator.is_some()
    }

    pub fn is_clash(&self) -> bool {
        self.classification.is_clash()
    }

    pub fn key(&self) -> PairKey {
        (self.i, self.j, self.operator.as_ref().map(SymmetryOperator::key))
    }

    /// Orders pairs by decreasing overlap, ties broken by key.
    pub fn cmp_by_severity(&self, other: &Self) -> Ordering {
        other
            .overlap()
            .total_cmp(&self.overlap())
            .then_with(|| self.key().cmp(&other.key()))
    }
}
