use crate::core::utils::radii;
use nalgebra::Point3;
use std::fmt;
use std::str::FromStr;

/// Describes the hydrogen-bonding capability of a heavy atom.
///
/// Pairs made of one donor and one acceptor are allowed to approach closer than the
/// sum of their van der Waals radii, so the overlap detector shrinks their combined
/// radius accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum HBondRole {
    /// The atom does not take part in hydrogen bonds.
    #[default]
    None,
    /// The atom can donate a hydrogen (e.g., backbone N).
    Donor,
    /// The atom can accept a hydrogen (e.g., carbonyl O).
    Acceptor,
    /// The atom can both donate and accept (e.g., hydroxyl O).
    Both,
}

impl HBondRole {
    pub fn is_donor(self) -> bool {
        matches!(self, HBondRole::Donor | HBondRole::Both)
    }

    pub fn is_acceptor(self) -> bool {
        matches!(self, HBondRole::Acceptor | HBondRole::Both)
    }

    /// Returns `true` when one side can donate and the other can accept.
    pub fn pairs_with(self, other: HBondRole) -> bool {
        (self.is_donor() && other.is_acceptor()) || (self.is_acceptor() && other.is_donor())
    }
}

impl FromStr for HBondRole {
    type Err = ();

    /// Parses a string into an `HBondRole`.
    ///
    /// The match is case-insensitive and accepts the single-letter codes
    /// `D`, `A` and `B` alongside the full names.
    ///
    /// # Errors
    ///
    /// Returns `()` if the input string does not match any known role.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" | "-" => Ok(HBondRole::None),
            "donor" | "d" => Ok(HBondRole::Donor),
            "acceptor" | "a" => Ok(HBondRole::Acceptor),
            "both" | "b" | "donor-acceptor" | "donor_acceptor" => Ok(HBondRole::Both),
            _ => Err(()),
        }
    }
}

/// Identifies the residue an atom belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ResidueLabel {
    pub chain_id: String,
    pub residue_name: String,
    pub residue_number: isize,
    pub insertion_code: Option<char>,
}

impl ResidueLabel {
    pub fn new(chain_id: &str, residue_name: &str, residue_number: isize) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            residue_name: residue_name.to_string(),
            residue_number,
            insertion_code: None,
        }
    }

    pub fn with_insertion_code(mut self, code: char) -> Self {
        self.insertion_code = Some(code);
        self
    }
}

impl fmt::Display for ResidueLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}{}",
            self.chain_id, self.residue_name, self.residue_number
        )?;
        if let Some(code) = self.insertion_code {
            write!(f, "{}", code)?;
        }
        Ok(())
    }
}

/// Represents one atom of the model being scanned for clashes.
///
/// Radii are filled from the built-in element tables by [`Atom::new`] and may be
/// overwritten afterwards by the caller (or by a
/// [`RadiusTable`](crate::core::utils::radii::RadiusTable)).
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom (e.g., "CA", "HG22").
    pub name: String,
    /// The residue the atom belongs to.
    pub residue: ResidueLabel,
    /// The canonical element symbol (e.g., "C", "Cl").
    pub element: String,
    /// Whether the atom is a hydrogen (or deuterium).
    pub is_hydrogen: bool,
    /// The Cartesian coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    pub occupancy: f64,
    /// The alternate-location tag; `None` means the atom is shared by all conformers.
    pub altloc: Option<char>,
    /// The van der Waals radius in Angstroms.
    pub vdw_radius: f64,
    /// The radius used when hydrogens are absent from the model and folded into
    /// their parent heavy atom.
    pub implicit_h_vdw_radius: Option<f64>,
    pub hbond_role: HBondRole,
}

impl Atom {
    /// Creates a new `Atom` with radii looked up from the element tables.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the atom.
    /// * `element` - The element symbol, in any capitalization.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(name: &str, element: &str, position: Point3<f64>) -> Self {
        let element = radii::normalize_element(element);
        let is_hydrogen = radii::is_hydrogen_element(&element);
        let vdw_radius = radii::vdw_radius(&element).unwrap_or(radii::DEFAULT_VDW_RADIUS);
        let implicit_h_vdw_radius = if is_hydrogen {
            None
        } else {
            radii::implicit_h_vdw_radius(&element)
        };
        Self {
            name: name.to_string(),
            residue: ResidueLabel::default(),
            element,
            is_hydrogen,
            position,
            occupancy: 1.0,
            altloc: None,
            vdw_radius,
            implicit_h_vdw_radius,
            hbond_role: HBondRole::None,
        }
    }

    pub fn with_residue(mut self, residue: ResidueLabel) -> Self {
        self.residue = residue;
        self
    }

    pub fn with_altloc(mut self, altloc: char) -> Self {
        self.altloc = Some(altloc);
        self
    }

    pub fn with_hbond_role(mut self, role: HBondRole) -> Self {
        self.hbond_role = role;
        self
    }

    /// Returns the radius to use for this atom under the given hydrogen treatment.
    ///
    /// Heavy atoms switch to their implicit-hydrogen radius when hydrogens are
    /// assumed missing; hydrogens and elements without such a radius keep
    /// `vdw_radius`.
    pub fn effective_vdw_radius(&self, assume_hydrogens_all_missing: bool) -> f64 {
        if assume_hydrogens_all_missing && !self.is_hydrogen {
            self.implicit_h_vdw_radius.unwrap_or(self.vdw_radius)
        } else {
            self.vdw_radius
        }
    }

    /// Two atoms can coexist unless both carry an alternate-location tag and the tags
    /// differ.
    pub fn is_altloc_compatible(&self, other: &Atom) -> bool {
        match (self.altloc, other.altloc) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.residue, self.name)?;
        if let Some(altloc) = self.altloc {
            write!(f, ":{}", altloc)?;
        }
        Ok(())
    }
}
