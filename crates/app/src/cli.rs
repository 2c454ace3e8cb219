use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::settings::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "budget_viewer")]
#[command(about = "Mass, cost and generic budgets of a product tree")]
pub struct Cli {
    /// Optional settings file path (TOML).
    #[arg(long)]
    pub settings: Option<String>,
    /// Override the output format.
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sub-system budgets of the configured elements.
    Compute(BudgetArgs),
    /// Extra mass contributions of the configured elements.
    Extras(BudgetArgs),
    /// Budget totals of every configured element in every option.
    Overview(OverviewArgs),
    /// Checks a budget configuration against the model.
    Check(ModelArgs),
}

#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Product tree (JSON).
    #[arg(long)]
    pub model: PathBuf,
    /// Budget configuration (JSON).
    #[arg(long)]
    pub budget: PathBuf,
}

#[derive(Args, Debug)]
pub struct BudgetArgs {
    #[command(flatten)]
    pub files: ModelArgs,
    /// Element definition short name; all configured elements by default.
    #[arg(long)]
    pub element: Option<String>,
    /// Option short name; the first option of the model by default.
    #[arg(long)]
    pub option: Option<String>,
    /// Domain of expertise short name.
    #[arg(long)]
    pub domain: Option<String>,
}

#[derive(Args, Debug)]
pub struct OverviewArgs {
    #[command(flatten)]
    pub files: ModelArgs,
    /// Domain of expertise short name.
    #[arg(long)]
    pub domain: Option<String>,
}
