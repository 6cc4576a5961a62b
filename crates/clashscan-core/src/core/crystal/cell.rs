use super::CrystalError;
use nalgebra::{Matrix3, Point3};
use serde::{Deserialize, Serialize};

/// Unit cell parameters (lengths in Å, angles in degrees) with the derived
/// orthogonalization and fractionalization matrices.
///
/// The Cartesian frame follows the PDB convention: `a` along x, `b` in the xy-plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CellParameters", into = "CellParameters")]
pub struct UnitCell {
    parameters: CellParameters,
    orthogonalization: Matrix3<f64>,
    fractionalization: Matrix3<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellParameters {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl UnitCell {
    pub fn new(
        a: f64,
        b: f64,
        c: f64,
        alpha: f64,
        beta: f64,
        gamma: f64,
    ) -> Result<Self, CrystalError> {
        Self::from_parameters(CellParameters {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
        })
    }

    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Result<Self, CrystalError> {
        Self::new(a, b, c, 90.0, 90.0, 90.0)
    }

    pub fn from_parameters(p: CellParameters) -> Result<Self, CrystalError> {
        let values = [p.a, p.b, p.c, p.alpha, p.beta, p.gamma];
        if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(CrystalError::InvalidCell(format!(
                "cell parameters must be positive and finite, got {:?}",
                values
            )));
        }
        if [p.alpha, p.beta, p.gamma].iter().any(|angle| *angle >= 180.0) {
            return Err(CrystalError::InvalidCell(
                "cell angles must be below 180 degrees".to_string(),
            ));
        }

        let (ca, cb, cg) = (
            p.alpha.to_radians().cos(),
            p.beta.to_radians().cos(),
            p.gamma.to_radians().cos(),
        );
        let sg = p.gamma.to_radians().sin();
        let volume_factor = 1.0 - ca * ca - cb * cb - cg * cg + 2.0 * ca * cb * cg;
        if volume_factor <= 0.0 {
            return Err(CrystalError::InvalidCell(
                "cell angles do not describe a real cell".to_string(),
            ));
        }
        let volume = p.a * p.b * p.c * volume_factor.sqrt();

        #[rustfmt::skip]
        let orthogonalization = Matrix3::new(
            p.a, p.b * cg, p.c * cb,
            0.0, p.b * sg, p.c * (ca - cb * cg) / sg,
            0.0, 0.0,      volume / (p.a * p.b * sg),
        );
        let fractionalization = orthogonalization.try_inverse().ok_or_else(|| {
            CrystalError::InvalidCell("orthogonalization matrix is singular".to_string())
        })?;

        Ok(Self {
            parameters: p,
            orthogonalization,
            fractionalization,
        })
    }

    pub fn parameters(&self) -> &CellParameters {
        &self.parameters
    }

    pub fn volume(&self) -> f64 {
        self.orthogonalization.determinant()
    }

    pub fn orthogonalization_matrix(&self) -> &Matrix3<f64> {
        &self.orthogonalization
    }

    pub fn fractionalization_matrix(&self) -> &Matrix3<f64> {
        &self.fractionalization
    }

    pub fn fractionalize(&self, cartesian: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.fractionalization * cartesian.coords)
    }

    pub fn orthogonalize(&self, fractional: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.orthogonalization * fractional.coords)
    }

    /// Fractional extent of a Cartesian distance along each axis.
    ///
    /// A sphere of radius `distance` spans at most `distance * |row_k(F)|` in
    /// fractional coordinate `k`, where `F` is the fractionalization matrix.
    pub fn fractional_margin(&self, distance: f64) -> [f64; 3] {
        let f = &self.fractionalization;
        [0, 1, 2].map(|k| distance * f.row(k).norm())
    }
}

impl TryFrom<CellParameters> for UnitCell {
    type Error = CrystalError;

    fn try_from(value: CellParameters) -> Result<Self, Self::Error> {
        Self::from_parameters(value)
    }
}

impl From<UnitCell> for CellParameters {
    fn from(value: UnitCell) -> Self {
        value.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn orthorhombic_cell_scales_axes_independently() {
        let cell = UnitCell::orthorhombic(80.02, 97.15, 49.85).unwrap();
        let frac = cell.fractionalize(&Point3::new(40.01, 97.15, -24.925));
        assert!((frac - Point3::new(0.5, 1.0, -0.5)).norm() < TOLERANCE);
        assert!((cell.volume() - 80.02 * 97.15 * 49.85).abs() < 1e-6);
    }

    #[test]
    fn fractionalize_and_orthogonalize_are_inverse() {
        let cell = UnitCell::new(52.3, 61.0, 70.4, 81.0, 97.5, 105.2).unwrap();
        let p = Point3::new(12.5, -3.25, 40.0);
        let back = cell.orthogonalize(&cell.fractionalize(&p));
        assert!((back - p).norm() < 1e-9);
    }

    #[test]
    fn a_axis_lies_along_x() {
        let cell = UnitCell::new(10.0, 12.0, 14.0, 70.0, 80.0, 110.0).unwrap();
        let a = cell.orthogonalize(&Point3::new(1.0, 0.0, 0.0));
        assert!((a - Point3::new(10.0, 0.0, 0.0)).norm() < TOLERANCE);
        let b = cell.orthogonalize(&Point3::new(0.0, 1.0, 0.0));
        assert!(b.z.abs() < TOLERANCE);
        assert!((b.coords.norm() - 12.0).abs() < TOLERANCE);
    }

    #[test]
    fn fractional_margin_of_cubic_cell() {
        let cell = UnitCell::orthorhombic(20.0, 20.0, 20.0).unwrap();
        let margin = cell.fractional_margin(5.0);
        for m in margin {
            assert!((m - 0.25).abs() < TOLERANCE);
        }
    }

    #[test]
    fn invalid_cells_are_rejected() {
        assert!(matches!(
            UnitCell::orthorhombic(0.0, 10.0, 10.0),
            Err(CrystalError::InvalidCell(_))
        ));
        assert!(UnitCell::new(10.0, 10.0, 10.0, 90.0, 90.0, 180.0).is_err());
        assert!(UnitCell::new(10.0, 10.0, 10.0, 120.0, 120.0, 120.0).is_err());
        assert!(UnitCell::new(10.0, f64::NAN, 10.0, 90.0, 90.0, 90.0).is_err());
    }

    #[test]
    fn cell_deserializes_from_parameters() {
        let cell: UnitCell =
            toml::from_str("a = 20.0\nb = 20.0\nc = 20.0\nalpha = 90.0\nbeta = 90.0\ngamma = 90.0")
                .unwrap();
        assert_eq!(cell.parameters().a, 20.0);
        assert!(toml::from_str::<UnitCell>(
            "a = -1.0\nb = 20.0\nc = 20.0\nalpha = 90.0\nbeta = 90.0\ngamma = 90.0"
        )
        .is_err());
    }
}
