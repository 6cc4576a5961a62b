use std::collections::{HashMap, VecDeque};
use thiserror::Error;

/// Default search depth; enough to tell 1-2, 1-3, 1-4 and 1-5 relationships apart.
pub const DEFAULT_SEARCH_DEPTH: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Atom {i} cannot be bonded to itself")]
    SelfBond { i: usize },
    #[error("Bond {i}-{j} references an atom outside 0..{n_atoms}")]
    OutOfRange { i: usize, j: usize, n_atoms: usize },
}

/// Undirected bonded adjacency over atom indices.
///
/// Only direct bonds are stored. Longer bonded relationships are recovered on demand
/// by a breadth-first search bounded by the graph's search depth, so pairs further
/// apart than that depth report no path at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityGraph {
    neighbors: Vec<Vec<usize>>,
    search_depth: usize,
    n_bonds: usize,
}

impl ConnectivityGraph {
    /// Creates a graph over `n_atoms` atoms with no bonds.
    pub fn new(n_atoms: usize) -> Self {
        Self {
            neighbors: vec![Vec::new(); n_atoms],
            search_depth: DEFAULT_SEARCH_DEPTH,
            n_bonds: 0,
        }
    }

    pub fn from_bonds<I>(n_atoms: usize, bonds: I) -> Result<Self, TopologyError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut graph = Self::new(n_atoms);
        for (i, j) in bonds {
            graph.add_bond(i, j)?;
        }
        Ok(graph)
    }

    pub fn with_search_depth(mut self, depth: usize) -> Self {
        self.search_depth = depth;
        self
    }

    /// Adds an undirected bond. Adding an existing bond again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError`] for self-bonds and indices outside the graph.
    pub fn add_bond(&mut self, i: usize, j: usize) -> Result<(), TopologyError> {
        let n_atoms = self.neighbors.len();
        if i >= n_atoms || j >= n_atoms {
            return Err(TopologyError::OutOfRange { i, j, n_atoms });
        }
        if i == j {
            return Err(TopologyError::SelfBond { i });
        }
        if self.neighbors[i].contains(&j) {
            return Ok(());
        }
        self.neighbors[i].push(j);
        self.neighbors[j].push(i);
        self.n_bonds += 1;
        Ok(())
    }

    pub fn n_atoms(&self) -> usize {
        self.neighbors.len()
    }

    pub fn n_bonds(&self) -> usize {
        self.n_bonds
    }

    pub fn search_depth(&self) -> usize {
        self.search_depth
    }

    /// Directly bonded neighbors of `i`, in bond insertion order.
    pub fn neighbors(&self, i: usize) -> &[usize] {
        self.neighbors.get(i).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn are_bonded(&self, i: usize, j: usize) -> bool {
        self.neighbors(i).contains(&j)
    }

    pub fn has_bonds(&self, i: usize) -> bool {
        !self.neighbors(i).is_empty()
    }

    /// Number of bonds on the shortest path between `i` and `j`.
    ///
    /// Returns `Some(0)` for `i == j` and `None` when the atoms are disconnected or
    /// further apart than the search depth.
    pub fn shortest_path_length(&self, i: usize, j: usize) -> Option<usize> {
        if i >= self.n_atoms() || j >= self.n_atoms() {
            return None;
        }
        if i == j {
            return Some(0);
        }

        let mut depth_of: HashMap<usize, usize> = HashMap::new();
        depth_of.insert(i, 0);
        let mut queue = VecDeque::new();
        queue.push_back(i);

        while let Some(current) = queue.pop_front() {
            let depth = depth_of[&current];
            if depth >= self.search_depth {
                continue;
            }
            for &neighbor in &self.neighbors[current] {
                if depth_of.contains_key(&neighbor) {
                    continue;
                }
                if neighbor == j {
                    return Some(depth + 1);
                }
                depth_of.insert(neighbor, depth + 1);
                queue.push_back(neighbor);
            }
        }
        None
    }
}
