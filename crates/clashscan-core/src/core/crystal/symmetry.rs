use super::CrystalError;
use super::cell::UnitCell;
use nalgebra::{Matrix3, Point3, Vector3};
use std::fmt;
use std::str::FromStr;

const KEY_QUANTUM: f64 = 1e-6;

/// Hashable identity of an operator: rotation and translation quantized to 1e-6.
pub type OperatorKey = [i64; 12];

/// A crystallographic symmetry operator acting on fractional coordinates,
/// `x' = R x + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetryOperator {
    rotation: Matrix3<f64>,
    translation: Vector3<f64>,
}

impl SymmetryOperator {
    pub fn new(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros())
    }

    pub fn rotation(&self) -> &Matrix3<f64> {
        &self.rotation
    }

    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    pub fn apply(&self, fractional: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * fractional.coords + self.translation)
    }

    /// Returns the operator followed by an integer lattice translation.
    pub fn with_lattice_shift(&self, shift: [i32; 3]) -> Self {
        let shift = Vector3::new(shift[0] as f64, shift[1] as f64, shift[2] as f64);
        Self::new(self.rotation, self.translation + shift)
    }

    pub fn is_identity(&self) -> bool {
        self.key() == Self::identity().key()
    }

    /// True when the rotation part is the identity, regardless of translation.
    pub fn is_pure_translation(&self) -> bool {
        (self.rotation - Matrix3::identity()).amax() < KEY_QUANTUM
    }

    pub fn key(&self) -> OperatorKey {
        let mut key = [0i64; 12];
        for (slot, value) in key
            .iter_mut()
            .zip(self.rotation.iter().chain(self.translation.iter()))
        {
            *slot = (value / KEY_QUANTUM).round() as i64;
        }
        key
    }
}

impl Default for SymmetryOperator {
    fn default() -> Self {
        Self::identity()
    }
}

impl FromStr for SymmetryOperator {
    type Err = CrystalError;

    /// Parses crystallographic `x,y,z` notation such as `-x+1/2,y,-z+0.25`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let components: Vec<&str> = s.split(',').collect();
        if components.len() != 3 {
            return Err(CrystalError::OperatorParse {
                input: s.to_string(),
                reason: format!("expected 3 components, found {}", components.len()),
            });
        }

        let mut rotation = Matrix3::zeros();
        let mut translation = Vector3::zeros();
        for (row, component) in components.iter().enumerate() {
            let (coefficients, constant) =
                parse_component(component).map_err(|reason| CrystalError::OperatorParse {
                    input: s.to_string(),
                    reason,
                })?;
            for (col, coefficient) in coefficients.iter().enumerate() {
                rotation[(row, col)] = *coefficient;
            }
            translation[row] = constant;
        }

        if rotation.determinant().abs() < KEY_QUANTUM {
            return Err(CrystalError::OperatorParse {
                input: s.to_string(),
                reason: "rotation part is singular".to_string(),
            });
        }
        Ok(Self::new(rotation, translation))
    }
}

/// Parses one component (e.g. `-x+1/2`) into axis coefficients and a constant.
fn parse_component(component: &str) -> Result<([f64; 3], f64), String> {
    let text: String = component
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if text.is_empty() {
        return Err("empty component".to_string());
    }

    let mut coefficients = [0.0; 3];
    let mut constant = 0.0;

    // Split into signed terms, keeping each sign with its term.
    let mut terms: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if (c == '+' || c == '-') && !current.is_empty() && !current.ends_with(['+', '-', '*']) {
            terms.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    terms.push(current);

    for term in terms {
        let (sign, body) = match term.strip_prefix('-') {
            Some(rest) => (-1.0, rest),
            None => (1.0, term.strip_prefix('+').unwrap_or(&term)),
        };
        if body.is_empty() {
            return Err(format!("dangling sign in '{}'", component.trim()));
        }

        match body.char_indices().find(|(_, c)| matches!(c, 'x' | 'y' | 'z')) {
            Some((pos, axis_char)) => {
                if pos + 1 != body.len() {
                    return Err(format!("unexpected text after axis in '{}'", body));
                }
                let prefix = body[..pos].trim_end_matches('*');
                let factor = if prefix.is_empty() {
                    1.0
                } else {
                    parse_number(prefix)?
                };
                let axis = match axis_char {
                    'x' => 0,
                    'y' => 1,
                    _ => 2,
                };
                coefficients[axis] += sign * factor;
            }
            None => constant += sign * parse_number(body)?,
        }
    }
    Ok((coefficients, constant))
}

fn parse_number(text: &str) -> Result<f64, String> {
    match text.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num
                .parse()
                .map_err(|_| format!("invalid numerator '{}'", num))?;
            let den: f64 = den
                .parse()
                .map_err(|_| format!("invalid denominator '{}'", den))?;
            if den == 0.0 {
                return Err("zero denominator".to_string());
            }
            Ok(num / den)
        }
        None => text
            .parse()
            .map_err(|_| format!("invalid number '{}'", text)),
    }
}

fn format_fraction(value: f64) -> String {
    for den in 1..=12 {
        let num = value * den as f64;
        if (num - num.round()).abs() < KEY_QUANTUM {
            let num = num.round() as i64;
            return if den == 1 {
                format!("{}", num)
            } else {
                format!("{}/{}", num, den)
            };
        }
    }
    format!("{}", value)
}

impl fmt::Display for SymmetryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axes = ['x', 'y', 'z'];
        let rows: Vec<String> = (0..3)
            .map(|row| {
                let mut out = String::new();
                for (col, axis) in axes.iter().enumerate() {
                    let coefficient = self.rotation[(row, col)];
                    if coefficient.abs() < KEY_QUANTUM {
                        continue;
                    }
                    if coefficient < 0.0 {
                        out.push('-');
                    } else if !out.is_empty() {
                        out.push('+');
                    }
                    if (coefficient.abs() - 1.0).abs() > KEY_QUANTUM {
                        out.push_str(&format_fraction(coefficient.abs()));
                        out.push('*');
                    }
                    out.push(*axis);
                }
                let t = self.translation[row];
                if t.abs() >= KEY_QUANTUM {
                    if t > 0.0 && !out.is_empty() {
                        out.push('+');
                    }
                    out.push_str(&format_fraction(t));
                }
                if out.is_empty() {
                    out.push('0');
                }
                out
            })
            .collect();
        write!(f, "{}", rows.join(","))
    }
}

/// A unit cell with the operators of its space group.
///
/// The identity operator is always present, so pure lattice translations of the
/// asymmetric unit are searched even if the caller's list omits it.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryInfo {
    cell: UnitCell,
    operators: Vec<SymmetryOperator>,
}

impl SymmetryInfo {
    pub fn new(cell: UnitCell, operators: Vec<SymmetryOperator>) -> Self {
        let mut unique: Vec<SymmetryOperator> = Vec::with_capacity(operators.len() + 1);
        unique.push(SymmetryOperator::identity());
        for op in operators {
            if !unique.iter().any(|kept| kept.key() == op.key()) {
                unique.push(op);
            }
        }
        Self {
            cell,
            operators: unique,
        }
    }

    /// Cell with the identity operator only (space group P 1).
    pub fn p1(cell: UnitCell) -> Self {
        Self::new(cell, Vec::new())
    }

    pub fn from_xyz<S: AsRef<str>>(cell: UnitCell, operators: &[S]) -> Result<Self, CrystalError> {
        let operators = operators
            .iter()
            .map(|s| s.as_ref().parse())
            .collect::<Result<Vec<SymmetryOperator>, _>>()?;
        Ok(Self::new(cell, operators))
    }

    pub fn cell(&self) -> &UnitCell {
        &self.cell
    }

    /// Operators with the identity first.
    pub fn operators(&self) -> &[SymmetryOperator] {
        &self.operators
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn op(s: &str) -> SymmetryOperator {
        s.parse().unwrap()
    }

    #[test]
    fn parses_identity() {
        let identity = op("x,y,z");
        assert!(identity.is_identity());
        assert_eq!(identity, SymmetryOperator::identity());
    }

    #[test]
    fn parses_signs_and_fractional_translations() {
        let parsed = op("-x+1/2, -Y+1/2, z+1/2");
        let expected = SymmetryOperator::new(
            Matrix3::new(-1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, 1.0),
            Vector3::new(0.5, 0.5, 0.5),
        );
        assert_eq!(parsed.key(), expected.key());
    }

    #[test]
    fn parses_leading_constants_decimals_and_mixed_axes() {
        let parsed = op("1/2+x, x-y, -z+0.25");
        assert_eq!(parsed.rotation()[(0, 0)], 1.0);
        assert_eq!(parsed.rotation()[(1, 0)], 1.0);
        assert_eq!(parsed.rotation()[(1, 1)], -1.0);
        assert_eq!(parsed.rotation()[(2, 2)], -1.0);
        assert!((parsed.translation() - Vector3::new(0.5, 0.0, 0.25)).norm() < TOLERANCE);
    }

    #[test]
    fn rejects_malformed_operators() {
        for bad in ["x,y", "x,y,z,x", "x,y,", "x,y,w", "x,y,z+1/0", "x,x,z", "x,y,-"] {
            assert!(
                matches!(
                    bad.parse::<SymmetryOperator>(),
                    Err(CrystalError::OperatorParse { .. })
                ),
                "accepted '{bad}'"
            );
        }
    }

    #[test]
    fn apply_maps_fractional_coordinates() {
        let screw = op("-x,-y,z+1/2");
        let image = screw.apply(&Point3::new(0.1, 0.2, 0.3));
        assert!((image - Point3::new(-0.1, -0.2, 0.8)).norm() < TOLERANCE);
    }

    #[test]
    fn lattice_shift_is_folded_into_translation() {
        let shifted = op("x,-y,-z").with_lattice_shift([0, 0, -2]);
        assert_eq!(*shifted.translation(), Vector3::new(0.0, 0.0, -2.0));
        assert!(!shifted.is_identity());
        assert!(SymmetryOperator::identity().with_lattice_shift([1, 0, 0]).is_pure_translation());
        assert!(!shifted.is_pure_translation());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for text in ["x,y,z", "-x+1/2,-y+1/2,z+1/2", "x,-y,-z-2", "x-y,x,z+1/6"] {
            let parsed = op(text);
            assert_eq!(parsed.to_string(), text);
            assert_eq!(op(&parsed.to_string()).key(), parsed.key());
        }
    }

    #[test]
    fn symmetry_info_always_contains_identity_first() {
        let cell = UnitCell::orthorhombic(20.0, 20.0, 20.0).unwrap();
        let info = SymmetryInfo::from_xyz(cell, &["-x,-y,z", "x,y,z", "-x,-y,z"]).unwrap();
        assert_eq!(info.operators().len(), 2);
        assert!(info.operators()[0].is_identity());

        let p1 = SymmetryInfo::p1(cell);
        assert_eq!(p1.operators().len(), 1);
        assert_eq!(p1.cell(), &cell);
    }
}
