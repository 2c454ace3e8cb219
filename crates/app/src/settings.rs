//! Settings of the viewer, read from `budget.toml` and `BUDGET_*`
//! environment variables. Command line flags override both.
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_SETTINGS_PATH: &str = "budget.toml";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: String,
    /// Short name of the domain of expertise used when none is given.
    pub default_domain: Option<String>,
    pub output: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            default_domain: None,
            output: OutputFormat::Text,
        }
    }
}

impl Settings {
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = path.unwrap_or(DEFAULT_SETTINGS_PATH);
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("BUDGET"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("no/such/budget.toml").required(false))
            .build()
            .unwrap()
            .try_deserialize::<Settings>()
            .unwrap();
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.default_domain, None);
        assert_eq!(settings.output, OutputFormat::Text);
    }

    #[test]
    fn file_values_are_read() {
        let toml = r#"
            log_level = "debug"
            default_domain = "SYS"
            output = "json"
        "#;
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize::<Settings>()
            .unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.default_domain.as_deref(), Some("SYS"));
        assert_eq!(settings.output, OutputFormat::Json);
    }
}
