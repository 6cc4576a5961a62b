use super::pair::OverlapPair;
use itertools::Itertools;
use serde::Serialize;
use tracing::{info, instrument};

/// Clash counts and scores of one scan. Scores are clashes per 1000 atoms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClashResults {
    n_atoms: usize,
    n_clashes: usize,
    clashscore: f64,
    n_clashes_sym: usize,
    clashscore_sym: f64,
    n_clashes_macro_mol: usize,
    clashscore_macro_mol: f64,
}

impl ClashResults {
    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }
    pub fn n_clashes(&self) -> usize {
        self.n_clashes
    }
    pub fn clashscore(&self) -> f64 {
        self.clashscore
    }
    pub fn n_clashes_sym(&self) -> usize {
        self.n_clashes_sym
    }
    pub fn clashscore_sym(&self) -> f64 {
        self.clashscore_sym
    }
    pub fn n_clashes_macro_mol(&self) -> usize {
        self.n_clashes_macro_mol
    }
    pub fn clashscore_macro_mol(&self) -> f64 {
        self.clashscore_macro_mol
    }
}

/// Merges overlap records into [`ClashResults`].
#[derive(Debug, Clone, Copy)]
pub struct ClashAggregator {
    n_atoms: usize,
}

impl ClashAggregator {
    /// `n_atoms` is the normalization basis: every atom of the model, hydrogens included.
    pub fn new(n_atoms: usize) -> Self {
        Self { n_atoms }
    }

    fn score(&self, n: usize) -> f64 {
        if self.n_atoms == 0 {
            0.0
        } else {
            n as f64 * 1000.0 / self.n_atoms as f64
        }
    }

    /// Drops duplicate records (same atoms, same operator) keeping the first, and
    /// returns the surviving pairs with their counts.
    #[instrument(skip_all, name = "clash_aggregation")]
    pub fn aggregate(&self, pairs: Vec<OverlapPair>) -> (Vec<OverlapPair>, ClashResults) {
        let pairs: Vec<OverlapPair> = pairs.into_iter().unique_by(OverlapPair::key).collect();

        let (n_clashes_sym, n_clashes_macro_mol) =
            pairs
                .iter()
                .filter(|p| p.is_clash())
                .fold((0, 0), |(sym, macro_mol), p| {
                    if p.is_symmetry() {
                        (sym + 1, macro_mol)
                    } else {
                        (sym, macro_mol + 1)
                    }
                });
        let n_clashes = n_clashes_sym + n_clashes_macro_mol;

        let results = ClashResults {
            n_atoms: self.n_atoms,
            n_clashes,
            clashscore: self.score(n_clashes),
            n_clashes_sym,
            clashscore_sym: self.score(n_clashes_sym),
            n_clashes_macro_mol,
            clashscore_macro_mol: self.score(n_clashes_macro_mol),
        };

        info!(
            n_atoms = self.n_atoms,
            n_clashes,
            n_clashes_sym,
            n_clashes_macro_mol,
            clashscore = results.clashscore,
            "Clash aggregation complete."
        );
        (pairs, results)
    }
}
