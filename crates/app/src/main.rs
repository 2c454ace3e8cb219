use clap::Parser;

use cli::{Cli, Command};
use error::Result;
use report::Loaded;
use settings::Settings;

mod cli;
mod error;
mod report;
mod settings;

fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.settings.as_deref())?;
    if let Some(format) = cli.format {
        settings.output = format;
    }

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "budget_viewer={level},budget_engine={level}",
            level = settings.log_level
        ))
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command, &settings) {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(err) => {
            tracing::error!("{err}");
            Err(err.into())
        }
    }
}

fn domain_name<'a>(arg: Option<&'a str>, settings: &'a Settings) -> Option<&'a str> {
    arg.or(settings.default_domain.as_deref())
}

fn run(command: Command, settings: &Settings) -> Result<String> {
    let generated_at = chrono::Local::now().fixed_offset();

    match command {
        Command::Compute(args) => {
            let loaded = Loaded::open(&args.files)?;
            let option = loaded.option(args.option.as_deref())?;
            let domain = loaded.domain(domain_name(args.domain.as_deref(), settings))?;
            let reports = loaded
                .elements(args.element.as_deref())?
                .into_iter()
                .map(|element| -> Result<_> {
                    let summary = loaded.engine.summary(&loaded.tree, element, option, domain)?;
                    Ok(report::budget_report(
                        &loaded.tree,
                        loaded.engine.kind(),
                        &summary,
                        generated_at,
                    ))
                })
                .collect::<Result<Vec<_>>>()?;
            report::render(&reports, settings.output, |r| report::render_budget(r))
        }
        Command::Extras(args) => {
            let loaded = Loaded::open(&args.files)?;
            let option = loaded.option(args.option.as_deref())?;
            let domain = loaded.domain(domain_name(args.domain.as_deref(), settings))?;
            let reports = loaded
                .elements(args.element.as_deref())?
                .into_iter()
                .map(|element| -> Result<_> {
                    let extras = loaded
                        .engine
                        .extra_mass_contributions(&loaded.tree, element, option, domain)?;
                    Ok(report::extra_report(
                        &loaded.tree,
                        element,
                        option,
                        domain,
                        &extras,
                        generated_at,
                    ))
                })
                .collect::<Result<Vec<_>>>()?;
            report::render(&reports, settings.output, |r| report::render_extras(r))
        }
        Command::Overview(args) => {
            let loaded = Loaded::open(&args.files)?;
            let domain = loaded.domain(domain_name(args.domain.as_deref(), settings))?;
            let summaries = loaded.engine.option_overview(&loaded.tree, domain)?;
            let overview = report::option_overview(
                &loaded.tree,
                loaded.engine.kind(),
                domain,
                &summaries,
                generated_at,
            );
            report::render(&overview, settings.output, report::render_overview)
        }
        Command::Check(files) => {
            let loaded = Loaded::open(&files)?;
            loaded.engine.config().validate(&loaded.tree)?;
            tracing::info!("budget configuration is valid");
            Ok(format!(
                "{} budget configuration is valid",
                loaded.engine.kind().as_str()
            ))
        }
    }
}
