//! Reference data shared by every element of a product tree.
//!
//! Everything here is identified by a [`Uuid`]. Short names are only used to
//! look things up from user input and to match enumeration values.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A category an element definition or usage can be a member of.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub short_name: String,
    #[serde(default)]
    pub name: String,
}

/// A measurement scale (unit). Two values are on the same scale only when the
/// scale ids are equal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementScale {
    pub id: Uuid,
    pub short_name: String,
    #[serde(default)]
    pub name: String,
}

/// The discipline that owns or subscribes to parameter values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainOfExpertise {
    pub id: Uuid,
    pub short_name: String,
    #[serde(default)]
    pub name: String,
}

/// One design alternative of the model.
///
/// Element usages can be excluded from an option, removing them and their
/// whole subtree from that alternative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignOption {
    pub id: Uuid,
    pub short_name: String,
    #[serde(default)]
    pub name: String,
}

/// A single literal of an enumeration parameter type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerationValue {
    pub short_name: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterTypeKind {
    Quantity {
        #[serde(default)]
        default_scale: Option<Uuid>,
    },
    Enumeration {
        values: Vec<EnumerationValue>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterType {
    pub id: Uuid,
    pub short_name: String,
    #[serde(default)]
    pub name: String,
    pub kind: ParameterTypeKind,
}

impl ParameterType {
    /// Returns `true` for enumeration parameter types.
    #[must_use]
    pub fn is_enumeration(&self) -> bool {
        matches!(self.kind, ParameterTypeKind::Enumeration { .. })
    }

    /// Returns the enumeration literal with the given short name, if this is
    /// an enumeration type that defines it.
    pub fn enumeration_value(&self, short_name: &str) -> Option<&EnumerationValue> {
        match &self.kind {
            ParameterTypeKind::Enumeration { values } => {
                values.iter().find(|value| value.short_name == short_name)
            }
            ParameterTypeKind::Quantity { .. } => None,
        }
    }
}
