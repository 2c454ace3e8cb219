use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod budget {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BudgetKind {
        Mass,
        Cost,
        Generic,
    }

    impl BudgetKind {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Mass => "mass",
                Self::Cost => "cost",
                Self::Generic => "generic",
            }
        }
    }

    /// Which level of a sub-system the budget value is taken from.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SystemLevel {
        #[default]
        Equipment,
        SubSystem,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct SubSystemRow {
        pub sub_system_id: Uuid,
        pub name: String,
        pub equipment: Vec<String>,
        pub system_level: SystemLevel,
        pub value_from_sub_system: Option<f64>,
        /// Margin in percent declared on the sub-system itself.
        pub margin_from_sub_system: Option<f64>,
        pub value_from_equipment: f64,
        pub value_with_margin_from_equipment: f64,
        pub margin_from_equipment: f64,
        /// The value shown for the sub-system, margin included.
        pub total_with_margin: Option<f64>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ExtraContributionRow {
        /// Category short names of the contributor group.
        pub categories: Vec<String>,
        pub parameter_type: String,
        pub total: f64,
        pub total_with_margin: f64,
        pub margin: f64,
    }

    /// Extra contributions of one root element for one option.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ExtraContributionReport {
        pub element: String,
        pub option: String,
        pub domain: String,
        pub extra_contributions: Vec<ExtraContributionRow>,
        pub generated_at: DateTime<FixedOffset>,
    }

    /// Budget of one root element for one option.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct BudgetReport {
        pub kind: BudgetKind,
        pub element: String,
        pub option: String,
        pub domain: String,
        /// Short name of the scale all values are expressed in.
        pub scale: Option<String>,
        pub sub_systems: Vec<SubSystemRow>,
        pub extra_contributions: Vec<ExtraContributionRow>,
        pub total: f64,
        pub total_without_margin: f64,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub generated_at: DateTime<FixedOffset>,
    }

    /// One cell of the option overview.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct OverviewRecord {
        pub element: String,
        pub total: f64,
        pub total_without_margin: f64,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct OptionOverview {
        pub kind: BudgetKind,
        pub domain: String,
        /// Records per option short name, in option order.
        pub options: Vec<(String, Vec<OverviewRecord>)>,
        pub generated_at: DateTime<FixedOffset>,
    }
}
