use super::atom::Atom;
use nalgebra::Point3;

/// An ordered, index-addressed collection of atoms.
///
/// The index of an atom is its insertion position; it is the identifier used by the
/// connectivity graph, the symmetry expander and every reported pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomTable {
    atoms: Vec<Atom>,
}

impl AtomTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            atoms: Vec::with_capacity(capacity),
        }
    }

    /// Appends an atom and returns its index.
    pub fn push(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.atoms.len() - 1
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Atom> {
        self.atoms.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.atoms.iter()
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub(crate) fn atoms_mut(&mut self) -> impl Iterator<Item = &mut Atom> {
        self.atoms.iter_mut()
    }

    /// Returns a per-atom flag that is `true` for hydrogens.
    pub fn hydrogen_selection(&self) -> Vec<bool> {
        self.atoms.iter().map(|atom| atom.is_hydrogen).collect()
    }

    pub fn n_hydrogens(&self) -> usize {
        self.atoms.iter().filter(|atom| atom.is_hydrogen).count()
    }

    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.atoms.iter().map(|atom| atom.position).collect()
    }

    /// Largest effective radius in the table, or `0.0` when empty.
    pub fn max_effective_radius(&self, assume_hydrogens_all_missing: bool) -> f64 {
        self.atoms
            .iter()
            .map(|atom| atom.effective_vdw_radius(assume_hydrogens_all_missing))
            .fold(0.0, f64::max)
    }
}

impl FromIterator<Atom> for AtomTable {
    fn from_iter<T: IntoIterator<Item = Atom>>(iter: T) -> Self {
        Self {
            atoms: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a AtomTable {
    type Item = &'a Atom;
    type IntoIter = std::slice::Iter<'a, Atom>;

    fn into_iter(self) -> Self::IntoIter {
        self.atoms.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> AtomTable {
        [
            Atom::new("N", "N", Point3::new(0.0, 0.0, 0.0)),
            Atom::new("H", "H", Point3::new(1.0, 0.0, 0.0)),
            Atom::new("CA", "C", Point3::new(0.0, 1.5, 0.0)),
            Atom::new("HA", "H", Point3::new(0.0, 2.5, 0.0)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn push_returns_sequential_indices() {
        let mut table = AtomTable::new();
        assert!(table.is_empty());
        assert_eq!(table.push(Atom::new("N", "N", Point3::origin())), 0);
        assert_eq!(table.push(Atom::new("CA", "C", Point3::origin())), 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1).unwrap().name, "CA");
        assert!(table.get(2).is_none());
    }

    #[test]
    fn hydrogen_selection_flags_hydrogens_in_order() {
        let table = sample_table();
        assert_eq!(table.hydrogen_selection(), vec![false, true, false, true]);
        assert_eq!(table.n_hydrogens(), 2);
    }

    #[test]
    fn max_effective_radius_follows_hydrogen_treatment() {
        let table = sample_table();
        assert_eq!(table.max_effective_radius(false), 1.75);
        assert_eq!(table.max_effective_radius(true), 1.95);
        assert_eq!(AtomTable::new().max_effective_radius(false), 0.0);
    }

    #[test]
    fn get_mut_allows_radius_override() {
        let mut table = sample_table();
        table.get_mut(0).unwrap().vdw_radius = 1.40;
        assert_eq!(table.get(0).unwrap().vdw_radius, 1.40);
        assert_eq!(table.positions()[2], Point3::new(0.0, 1.5, 0.0));
    }

    #[test]
    fn iteration_visits_every_atom() {
        let table = sample_table();
        let names: Vec<_> = (&table).into_iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["N", "H", "CA", "HA"]);
        assert_eq!(table.iter().count(), table.atoms().len());
    }
}
