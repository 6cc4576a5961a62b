use thiserror::Error;

use super::config::ConfigError;
use crate::core::models::topology::TopologyError;
use crate::core::utils::geometry::GeometryError;
use crate::core::utils::radii::RadiusTableError;

#[derive(Debug, Error)]
pub enum ClashError {
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Geometry error: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },

    #[error("Invalid bond between atoms {i} and {j}: {reason}")]
    InvalidBond { i: usize, j: usize, reason: String },

    #[error("Bonded atom {atom} sits on a special position (operator {operator})")]
    SpecialPosition { atom: usize, operator: String },

    #[error("Atoms {i} and {j} are {distance:.3} Å apart, below the threshold of {threshold:.3} Å")]
    TooClose {
        i: usize,
        j: usize,
        distance: f64,
        threshold: f64,
    },

    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Radius table error: {source}")]
    RadiusTable {
        #[from]
        source: RadiusTableError,
    },
}

impl From<TopologyError> for ClashError {
    fn from(error: TopologyError) -> Self {
        let reason = error.to_string();
        match error {
            TopologyError::SelfBond { i } => ClashError::InvalidBond { i, j: i, reason },
            TopologyError::OutOfRange { i, j, .. } => ClashError::InvalidBond { i, j, reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::topology::ConnectivityGraph;

    #[test]
    fn topology_errors_become_invalid_bond() {
        let mut graph = ConnectivityGraph::new(2);
        let error: ClashError = graph.add_bond(0, 4).unwrap_err().into();
        assert!(matches!(error, ClashError::InvalidBond { i: 0, j: 4, .. }));

        let error: ClashError = graph.add_bond(1, 1).unwrap_err().into();
        match error {
            ClashError::InvalidBond { i, j, reason } => {
                assert_eq!((i, j), (1, 1));
                assert!(reason.contains("itself"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn radius_table_errors_convert_with_question_mark() {
        use crate::core::utils::radii::RadiusTable;
        use std::path::Path;

        fn load(path: &Path) -> Result<RadiusTable, ClashError> {
            Ok(RadiusTable::load(path)?)
        }

        let error = load(Path::new("/no/such/radii.csv")).unwrap_err();
        assert!(matches!(
            error,
            ClashError::RadiusTable {
                source: RadiusTableError::Io { .. }
            }
        ));
        assert!(error.to_string().starts_with("Radius table error: "));

        let mut table = RadiusTable::new();
        let error: ClashError = table.insert("C", -1.0, None).unwrap_err().into();
        assert!(matches!(
            error,
            ClashError::RadiusTable {
                source: RadiusTableError::InvalidRadius { .. }
            }
        ));
    }

    #[test]
    fn too_close_message_reports_distances() {
        let error = ClashError::TooClose {
            i: 3,
            j: 8,
            distance: 0.25,
            threshold: 0.5,
        };
        assert_eq!(
            error.to_string(),
            "Atoms 3 and 8 are 0.250 Å apart, below the threshold of 0.500 Å"
        );
    }
}
