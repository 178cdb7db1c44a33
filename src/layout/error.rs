use thiserror::Error;

/// Reasons a [`Simulation`](super::Simulation) refuses a dataset or its settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("link {link} references unknown node '{id}'")]
    UnknownNode { link: usize, id: String },

    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),

    #[error("link {link} has invalid value {value}; values must be positive and finite")]
    InvalidLinkValue { link: usize, value: f64 },

    #[error("node '{0}' has a non-finite position")]
    NonFinitePosition(String),

    #[error("canvas size {width}x{height} must be positive and finite")]
    InvalidCanvas { width: f64, height: f64 },

    #[error("setting '{field}' has invalid value {value}")]
    InvalidSetting { field: &'static str, value: f64 },
}
