//! Parameters, overrides and subscriptions, and how an actual value is read
//! from them.
//!
//! A parameter lives on an element definition and may be overridden on an
//! element usage. Another domain can subscribe to a parameter (or to an
//! override) and hold its own manual value.
//!
//! The actual value of a parameter for an option and a domain is found as
//! follows:
//!
//! 1. the usage override for the parameter type wins over the definition
//!    parameter;
//! 2. an option dependent parameter reads the value set of the active option,
//!    any other parameter reads its option-less value set;
//! 3. when the domain is not the owner and holds a subscription, the
//!    subscription value set is read instead;
//! 4. the component index selects one entry of the value array, where `-`
//!    means "no value".
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Marker used in value arrays for "no value".
pub const NO_VALUE: &str = "-";

/// Which value array of a value set is the actual one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParameterSwitchKind {
    #[default]
    Manual,
    Computed,
    Reference,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueSet {
    /// Option the values apply to, `None` for option independent parameters.
    #[serde(default)]
    pub option: Option<Uuid>,
    #[serde(default)]
    pub manual: Vec<String>,
    #[serde(default)]
    pub computed: Vec<String>,
    #[serde(default)]
    pub reference: Vec<String>,
    #[serde(default)]
    pub switch: ParameterSwitchKind,
}

impl ValueSet {
    /// Creates a manual value set holding a single component.
    pub fn manual(option: Option<Uuid>, value: impl Into<String>) -> Self {
        Self {
            option,
            manual: vec![value.into()],
            ..Default::default()
        }
    }

    /// The value array selected by the switch.
    pub fn actual_value(&self) -> &[String] {
        match self.switch {
            ParameterSwitchKind::Manual => &self.manual,
            ParameterSwitchKind::Computed => &self.computed,
            ParameterSwitchKind::Reference => &self.reference,
        }
    }
}

/// Value set of a subscription. Only the manual value belongs to the
/// subscriber; with any other switch the subscribed value is used.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionValueSet {
    #[serde(default)]
    pub option: Option<Uuid>,
    #[serde(default)]
    pub manual: Vec<String>,
    #[serde(default)]
    pub switch: ParameterSwitchKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSubscription {
    pub owner: Uuid,
    #[serde(default)]
    pub value_sets: Vec<SubscriptionValueSet>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub parameter_type: Uuid,
    pub owner: Uuid,
    #[serde(default)]
    pub scale: Option<Uuid>,
    #[serde(default)]
    pub is_option_dependent: bool,
    #[serde(default)]
    pub value_sets: Vec<ValueSet>,
    #[serde(default)]
    pub subscriptions: Vec<ParameterSubscription>,
}

/// Usage-level replacement of the values of a definition parameter.
///
/// Scale and option dependence come from the overridden parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterOverride {
    pub parameter_type: Uuid,
    pub owner: Uuid,
    #[serde(default)]
    pub value_sets: Vec<ValueSet>,
    #[serde(default)]
    pub subscriptions: Vec<ParameterSubscription>,
}

/// A parameter as seen from one element usage: either the definition
/// parameter or the override that replaces it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ResolvedParameter<'a> {
    owner: Uuid,
    scale: Option<Uuid>,
    is_option_dependent: bool,
    value_sets: &'a [ValueSet],
    subscriptions: &'a [ParameterSubscription],
}

impl<'a> ResolvedParameter<'a> {
    pub(crate) fn resolve(
        parameter: Option<&'a Parameter>,
        parameter_override: Option<&'a ParameterOverride>,
    ) -> Option<Self> {
        match (parameter, parameter_override) {
            (parameter, Some(over)) => Some(Self {
                owner: over.owner,
                scale: parameter.and_then(|p| p.scale),
                is_option_dependent: parameter.is_some_and(|p| p.is_option_dependent),
                value_sets: &over.value_sets,
                subscriptions: &over.subscriptions,
            }),
            (Some(parameter), None) => Some(Self {
                owner: parameter.owner,
                scale: parameter.scale,
                is_option_dependent: parameter.is_option_dependent,
                value_sets: &parameter.value_sets,
                subscriptions: &parameter.subscriptions,
            }),
            (None, None) => None,
        }
    }

    pub(crate) fn scale(&self) -> Option<Uuid> {
        self.scale
    }

    /// Returns the actual value of one component, `None` when there is none.
    pub(crate) fn actual_value(
        &self,
        component: usize,
        option: Uuid,
        domain: Uuid,
    ) -> Option<&'a str> {
        let owned = select_for_option(self.value_sets, self.is_option_dependent, option, |set| {
            set.option
        })
        .and_then(|set| set.actual_value().get(component));

        let subscription = (domain != self.owner)
            .then(|| self.subscriptions.iter().find(|s| s.owner == domain))
            .flatten();

        let raw = match subscription {
            Some(subscription) => {
                let set = select_for_option(
                    &subscription.value_sets,
                    self.is_option_dependent,
                    option,
                    |set| set.option,
                );
                match set {
                    Some(set) if set.switch == ParameterSwitchKind::Manual => {
                        set.manual.get(component)
                    }
                    _ => owned,
                }
            }
            None => owned,
        }?;

        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == NO_VALUE {
            return None;
        }
        Some(trimmed)
    }
}

fn select_for_option<T>(
    sets: &[T],
    is_option_dependent: bool,
    option: Uuid,
    option_of: impl Fn(&T) -> Option<Uuid>,
) -> Option<&T> {
    if is_option_dependent {
        sets.iter().find(|set| option_of(set) == Some(option))
    } else {
        sets.iter()
            .find(|set| option_of(set).is_none())
            .or_else(|| sets.first())
    }
}

/// Parses an actual value as a float. Unparsable values count as missing.
pub(crate) fn parse_float(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}
