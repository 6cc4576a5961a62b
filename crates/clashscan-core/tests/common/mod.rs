#![allow(dead_code)]

use clashscan::core::crystal::cell::UnitCell;
use clashscan::core::crystal::symmetry::SymmetryInfo;
use clashscan::core::models::atom::{Atom, HBondRole, ResidueLabel};
use clashscan::core::models::table::AtomTable;
use clashscan::core::models::topology::ConnectivityGraph;
use itertools::Itertools;
use nalgebra::Point3;

pub const FOUR_NITROGENS_P1: &str = include_str!("../data/four_nitrogens_p1.pdb");
pub const NPH_SER: &str = include_str!("../data/nph_ser.pdb");
pub const ILE_ILE_THR: &str = include_str!("../data/ile_ile_thr.pdb");
pub const NPH_SEVEN_RESIDUES: &str = include_str!("../data/nph_seven_residues.pdb");

static C2221_OPERATORS: [&str; 8] = [
    "x,y,z",
    "-x,-y,z+1/2",
    "-x,y,-z+1/2",
    "x,-y,-z",
    "x+1/2,y+1/2,z",
    "-x+1/2,-y+1/2,z+1/2",
    "-x+1/2,y+1/2,-z+1/2",
    "x+1/2,-y+1/2,-z",
];

const BOND_TOLERANCE: f64 = 0.45;
const MIN_BOND_LENGTH: f64 = 0.4;

pub struct Model {
    pub atoms: AtomTable,
    pub graph: ConnectivityGraph,
    pub symmetry: Option<SymmetryInfo>,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn operators_for(space_group: &str) -> &'static [&'static str] {
    match space_group.split_whitespace().join(" ").as_str() {
        "P 1" => &C2221_OPERATORS[..1],
        "C 2 2 21" => &C2221_OPERATORS,
        other => panic!("no operators for space group '{other}'"),
    }
}

fn parse_cryst1(line: &str) -> SymmetryInfo {
    let field = |start, end| -> f64 { slice_and_trim(line, start, end).parse().unwrap() };
    let cell = UnitCell::new(
        field(6, 15),
        field(15, 24),
        field(24, 33),
        field(33, 40),
        field(40, 47),
        field(47, 54),
    )
    .unwrap();
    SymmetryInfo::from_xyz(cell, operators_for(slice_and_trim(line, 55, 66))).unwrap()
}

fn parse_atom(line: &str) -> Atom {
    let coord = |start, end| -> f64 { slice_and_trim(line, start, end).parse().unwrap() };
    let residue = ResidueLabel {
        chain_id: slice_and_trim(line, 21, 22).to_string(),
        residue_name: slice_and_trim(line, 17, 20).to_string(),
        residue_number: slice_and_trim(line, 22, 26).parse().unwrap(),
        insertion_code: slice_and_trim(line, 26, 27).chars().next(),
    };
    let mut atom = Atom::new(
        slice_and_trim(line, 12, 16),
        slice_and_trim(line, 76, 78),
        Point3::new(coord(30, 38), coord(38, 46), coord(46, 54)),
    )
    .with_residue(residue);
    atom.altloc = slice_and_trim(line, 16, 17).chars().next();
    atom.occupancy = slice_and_trim(line, 54, 60).parse().unwrap_or(1.0);
    atom
}

/// Reads CRYST1 and ATOM/HETATM records; everything else is ignored.
pub fn parse_pdb(text: &str) -> (AtomTable, Option<SymmetryInfo>) {
    let mut atoms = AtomTable::new();
    let mut symmetry = None;
    for line in text.lines() {
        if line.starts_with("CRYST1") {
            symmetry = Some(parse_cryst1(line));
        } else if line.starts_with("ATOM") || line.starts_with("HETATM") {
            atoms.push(parse_atom(line));
        }
    }
    (atoms, symmetry)
}

fn covalent_radius(element: &str) -> f64 {
    match element {
        "H" | "D" => 0.31,
        "C" => 0.76,
        "N" => 0.71,
        "O" => 0.66,
        "S" => 1.05,
        "P" => 1.07,
        other => panic!("no covalent radius for '{other}'"),
    }
}

fn same_residue(a: &Atom, b: &Atom) -> bool {
    a.residue.chain_id == b.residue.chain_id
        && a.residue.residue_number == b.residue.residue_number
        && a.residue.insertion_code == b.residue.insertion_code
}

/// Distance-based bonding: hydrogens bond only inside their residue and never to
/// each other; heavy atoms may bond across residues and chains.
pub fn connect(atoms: &AtomTable) -> ConnectivityGraph {
    let mut graph = ConnectivityGraph::new(atoms.len());
    for (i, j) in (0..atoms.len()).tuple_combinations() {
        let a = atoms.get(i).unwrap();
        let b = atoms.get(j).unwrap();
        if a.is_hydrogen && b.is_hydrogen {
            continue;
        }
        if (a.is_hydrogen || b.is_hydrogen) && !same_residue(a, b) {
            continue;
        }
        let distance = (a.position - b.position).norm();
        let limit = covalent_radius(&a.element) + covalent_radius(&b.element) + BOND_TOLERANCE;
        if distance > MIN_BOND_LENGTH && distance < limit {
            graph.add_bond(i, j).unwrap();
        }
    }
    graph
}

/// N donates; O accepts, and also donates when it carries a hydrogen.
pub fn assign_hbond_roles(atoms: &mut AtomTable, graph: &ConnectivityGraph) {
    let hydrogens = atoms.hydrogen_selection();
    for i in 0..atoms.len() {
        let has_hydrogen = graph.neighbors(i).iter().any(|&n| hydrogens[n]);
        let atom = atoms.get_mut(i).unwrap();
        atom.hbond_role = match atom.element.as_str() {
            "N" => HBondRole::Donor,
            "O" if has_hydrogen => HBondRole::Both,
            "O" => HBondRole::Acceptor,
            _ => HBondRole::None,
        };
    }
}

pub fn load_model(text: &str) -> Model {
    let (mut atoms, symmetry) = parse_pdb(text);
    let graph = connect(&atoms);
    assign_hbond_roles(&mut atoms, &graph);
    Model {
        atoms,
        graph,
        symmetry,
    }
}

/// Same as [`load_model`] but without any bonds.
pub fn load_unbonded_model(text: &str) -> Model {
    let (mut atoms, symmetry) = parse_pdb(text);
    let graph = ConnectivityGraph::new(atoms.len());
    assign_hbond_roles(&mut atoms, &graph);
    Model {
        atoms,
        graph,
        symmetry,
    }
}

pub fn atom_label(atoms: &AtomTable, index: usize) -> String {
    let atom = atoms.get(index).unwrap();
    format!("{}{}", atom.name, atom.residue.residue_number)
}
