//! The module contains the errors the engine can throw.
//!
//! Classification ambiguities and scale clashes stop a computation:
//!
//! - [`MultipleSubSystemDefinitions`] a usage matches more than one definition.
//! - [`DuplicateSubSystem`] two usages produce the same sub-system.
//! - [`MultipleSubSystemEquipment`] a usage is equipment of several sub-systems.
//! - [`ScaleMismatch`] a contributing value uses another scale.
//! - [`MultipleScales`] the sub-systems of one budget use different scales.
//! - [`MultipleExtraContributions`] a usage matches several contributor groups.
//!
//! Missing parameter values or incomplete configurations are never errors.
//!
//!  [`MultipleSubSystemDefinitions`]: EngineError::MultipleSubSystemDefinitions
//!  [`DuplicateSubSystem`]: EngineError::DuplicateSubSystem
//!  [`MultipleSubSystemEquipment`]: EngineError::MultipleSubSystemEquipment
//!  [`ScaleMismatch`]: EngineError::ScaleMismatch
//!  [`MultipleScales`]: EngineError::MultipleScales
//!  [`MultipleExtraContributions`]: EngineError::MultipleExtraContributions
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("multiple sub-system definitions match element usage {0}")]
    MultipleSubSystemDefinitions(String),
    #[error("multiple same subsystems found: {0}")]
    DuplicateSubSystem(String),
    #[error("multiple sub-systems claim element usage {0} as equipment")]
    MultipleSubSystemEquipment(String),
    #[error("the scale of element usage {0} differs from the scale already in use")]
    ScaleMismatch(String),
    #[error("Multiple scales in the different sub-system identified")]
    MultipleScales,
    #[error("element usage {0} matches multiple extra mass contributions")]
    MultipleExtraContributions(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid model: {0}")]
    InvalidModel(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MultipleSubSystemDefinitions(a), Self::MultipleSubSystemDefinitions(b)) => {
                a == b
            }
            (Self::DuplicateSubSystem(a), Self::DuplicateSubSystem(b)) => a == b,
            (Self::MultipleSubSystemEquipment(a), Self::MultipleSubSystemEquipment(b)) => a == b,
            (Self::ScaleMismatch(a), Self::ScaleMismatch(b)) => a == b,
            (Self::MultipleScales, Self::MultipleScales) => true,
            (Self::MultipleExtraContributions(a), Self::MultipleExtraContributions(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidModel(a), Self::InvalidModel(b)) => a == b,
            (Self::InvalidConfig(a), Self::InvalidConfig(b)) => a == b,
            (Self::Json(a), Self::Json(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
