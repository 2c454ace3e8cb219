//! Turns engine results into the report DTOs and renders them.
use std::{fs::File, io::BufReader, path::Path};

use api_types::budget::{
    BudgetKind, BudgetReport, ExtraContributionReport, ExtraContributionRow, OptionOverview,
    OverviewRecord, SubSystemRow, SystemLevel,
};
use budget_engine::{
    BudgetConfig, BudgetEngine, BudgetSummary, ExtraContribution, ProductTree,
    SubSystemBudgetResult, SystemLevelKind,
};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    cli::ModelArgs,
    error::{AppError, Result},
    settings::OutputFormat,
};

/// A product tree and an engine configured for it.
pub struct Loaded {
    pub tree: ProductTree,
    pub engine: BudgetEngine,
}

impl Loaded {
    pub fn open(files: &ModelArgs) -> Result<Self> {
        let tree = ProductTree::from_json_reader(reader(&files.model)?)?;
        let config = BudgetConfig::from_json_reader(reader(&files.budget)?)?;
        tracing::info!(
            elements = tree.element_definitions().len(),
            kind = config.kind().as_str(),
            "model loaded"
        );
        let engine = BudgetEngine::builder().config(config).build()?;
        Ok(Self { tree, engine })
    }

    /// Root elements to report on: the named one or every configured one.
    pub fn elements(&self, short_name: Option<&str>) -> Result<Vec<Uuid>> {
        match short_name {
            Some(short_name) => self
                .tree
                .element_definition_by_short_name(short_name)
                .map(|definition| vec![definition.id])
                .ok_or_else(|| AppError::NotFound(format!("element definition {short_name}"))),
            None => Ok(self.engine.config().elements.clone()),
        }
    }

    pub fn option(&self, short_name: Option<&str>) -> Result<Uuid> {
        let option = match short_name {
            Some(short_name) => self.tree.option_by_short_name(short_name),
            None => self.tree.options().first(),
        };
        option
            .map(|option| option.id)
            .ok_or_else(|| AppError::NotFound(format!("option {}", short_name.unwrap_or(""))))
    }

    pub fn domain(&self, short_name: Option<&str>) -> Result<Uuid> {
        let domain = match short_name {
            Some(short_name) => self.tree.domain_by_short_name(short_name),
            None => self.tree.domains().first(),
        };
        domain
            .map(|domain| domain.id)
            .ok_or_else(|| AppError::NotFound(format!("domain {}", short_name.unwrap_or(""))))
    }
}

fn reader(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

pub fn budget_kind(kind: budget_engine::BudgetKind) -> BudgetKind {
    match kind {
        budget_engine::BudgetKind::Mass => BudgetKind::Mass,
        budget_engine::BudgetKind::Cost => BudgetKind::Cost,
        budget_engine::BudgetKind::Generic => BudgetKind::Generic,
    }
}

fn element_name(tree: &ProductTree, id: Uuid) -> String {
    tree.element_definition(id)
        .map(|definition| definition.short_name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn option_name(tree: &ProductTree, id: Uuid) -> String {
    tree.option(id)
        .map(|option| option.short_name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn domain_name(tree: &ProductTree, id: Uuid) -> String {
    tree.domain(id)
        .map(|domain| domain.short_name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn sub_system_row(result: &SubSystemBudgetResult) -> SubSystemRow {
    SubSystemRow {
        sub_system_id: result.sub_system_id,
        name: result.sub_system_name.clone(),
        equipment: result.equipment.iter().map(|e| e.name.clone()).collect(),
        system_level: match result.system_level_used {
            SystemLevelKind::Equipment => SystemLevel::Equipment,
            SystemLevelKind::SubSystem => SystemLevel::SubSystem,
        },
        value_from_sub_system: result.value_from_sub_system,
        margin_from_sub_system: result.value_margin_ratio_from_sub_system,
        value_from_equipment: result.value_from_equipment,
        value_with_margin_from_equipment: result.value_with_margin_from_equipment,
        margin_from_equipment: result.value_margin_ratio_from_equipment,
        total_with_margin: result.total_with_margin(),
    }
}

fn extra_row(tree: &ProductTree, extra: &ExtraContribution) -> ExtraContributionRow {
    ExtraContributionRow {
        categories: extra
            .categories
            .iter()
            .map(|id| {
                tree.category(*id)
                    .map(|category| category.short_name.clone())
                    .unwrap_or_else(|| id.to_string())
            })
            .collect(),
        parameter_type: tree
            .parameter_type(extra.parameter_type)
            .map(|parameter_type| parameter_type.short_name.clone())
            .unwrap_or_else(|| extra.parameter_type.to_string()),
        total: extra.total_contribution,
        total_with_margin: extra.total_with_margin,
        margin: extra.margin(),
    }
}

pub fn budget_report(
    tree: &ProductTree,
    kind: budget_engine::BudgetKind,
    summary: &BudgetSummary,
    generated_at: DateTime<FixedOffset>,
) -> BudgetReport {
    let scale = summary
        .results
        .iter()
        .filter_map(|r| r.scale)
        .chain(summary.extra_contributions.iter().filter_map(|e| e.scale))
        .next()
        .and_then(|scale| tree.scale(scale))
        .map(|scale| scale.short_name.clone());

    BudgetReport {
        kind: budget_kind(kind),
        element: element_name(tree, summary.root_element),
        option: option_name(tree, summary.option),
        domain: domain_name(tree, summary.domain),
        scale,
        sub_systems: summary.results.iter().map(sub_system_row).collect(),
        extra_contributions: summary
            .extra_contributions
            .iter()
            .map(|extra| extra_row(tree, extra))
            .collect(),
        total: summary.total(),
        total_without_margin: summary.total_without_margin(),
        generated_at,
    }
}

pub fn extra_report(
    tree: &ProductTree,
    element: Uuid,
    option: Uuid,
    domain: Uuid,
    extras: &[ExtraContribution],
    generated_at: DateTime<FixedOffset>,
) -> ExtraContributionReport {
    ExtraContributionReport {
        element: element_name(tree, element),
        option: option_name(tree, option),
        domain: domain_name(tree, domain),
        extra_contributions: extras.iter().map(|extra| extra_row(tree, extra)).collect(),
        generated_at,
    }
}

/// Groups the summaries of an option overview by option, keeping their
/// order.
pub fn option_overview(
    tree: &ProductTree,
    kind: budget_engine::BudgetKind,
    domain: Uuid,
    summaries: &[BudgetSummary],
    generated_at: DateTime<FixedOffset>,
) -> OptionOverview {
    let mut options: Vec<(String, Vec<OverviewRecord>)> = Vec::new();
    let mut current = None;
    for summary in summaries {
        if current != Some(summary.option) {
            current = Some(summary.option);
            options.push((option_name(tree, summary.option), Vec::new()));
        }
        if let Some((_, records)) = options.last_mut() {
            records.push(OverviewRecord {
                element: element_name(tree, summary.root_element),
                total: summary.total(),
                total_without_margin: summary.total_without_margin(),
            });
        }
    }

    OptionOverview {
        kind: budget_kind(kind),
        domain: domain_name(tree, domain),
        options,
        generated_at,
    }
}

fn number(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| format!("{value:.3}"))
}

pub fn render_budget(reports: &[BudgetReport]) -> String {
    let mut lines = Vec::new();
    for report in reports {
        lines.push(format!(
            "{} budget of {} (option {}, domain {}){}",
            report.kind.as_str(),
            report.element,
            report.option,
            report.domain,
            report
                .scale
                .as_ref()
                .map(|scale| format!(" [{scale}]"))
                .unwrap_or_default()
        ));
        lines.push(format!(
            "{:<24} {:>10} {:>14} {:>12} {:>14} {:>10} {:>14}",
            "sub-system", "level", "sub-system", "margin %", "equipment", "margin %", "total"
        ));
        for row in &report.sub_systems {
            lines.push(format!(
                "{:<24} {:>10} {:>14} {:>12} {:>14.3} {:>10.3} {:>14}",
                row.name,
                match row.system_level {
                    SystemLevel::Equipment => "equipment",
                    SystemLevel::SubSystem => "sub-system",
                },
                number(row.value_from_sub_system),
                number(row.margin_from_sub_system),
                row.value_from_equipment,
                row.margin_from_equipment,
                number(row.total_with_margin),
            ));
        }
        lines.extend(render_extra_rows(&report.extra_contributions));
        lines.push(format!(
            "total {:.3} ({:.3} without margin)",
            report.total, report.total_without_margin
        ));
        lines.push(String::new());
    }
    lines.join("\n")
}

fn render_extra_rows(rows: &[ExtraContributionRow]) -> Vec<String> {
    rows.iter()
        .map(|row| {
            format!(
                "extra {:<18} {:>14.3} {:>14.3} (margin {:.3}, {})",
                row.categories.join("+"),
                row.total,
                row.total_with_margin,
                row.margin,
                row.parameter_type
            )
        })
        .collect()
}

pub fn render_extras(reports: &[ExtraContributionReport]) -> String {
    let mut lines = Vec::new();
    for report in reports {
        lines.push(format!(
            "extra contributions of {} (option {}, domain {})",
            report.element, report.option, report.domain
        ));
        if report.extra_contributions.is_empty() {
            lines.push("none".to_string());
        }
        lines.extend(render_extra_rows(&report.extra_contributions));
        lines.push(String::new());
    }
    lines.join("\n")
}

pub fn render_overview(overview: &OptionOverview) -> String {
    let mut lines = vec![format!(
        "{} budget overview (domain {})",
        overview.kind.as_str(),
        overview.domain
    )];
    for (option, records) in &overview.options {
        lines.push(format!("option {option}"));
        for record in records {
            lines.push(format!(
                "  {:<24} {:>14.3} {:>14.3}",
                record.element, record.total_without_margin, record.total
            ));
        }
    }
    lines.join("\n")
}

/// Renders `value` as pretty JSON or with the given text renderer.
pub fn render<T: Serialize + ?Sized>(
    value: &T,
    format: OutputFormat,
    text: impl Fn(&T) -> String,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text(value)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-05-01T10:00:00+02:00").unwrap()
    }

    fn report() -> BudgetReport {
        BudgetReport {
            kind: BudgetKind::Mass,
            element: "Sat".to_string(),
            option: "OPT_A".to_string(),
            domain: "SYS".to_string(),
            scale: Some("kg".to_string()),
            sub_systems: vec![SubSystemRow {
                sub_system_id: Uuid::new_v4(),
                name: "ss".to_string(),
                equipment: vec!["eqt1".to_string(), "eqt2".to_string()],
                system_level: SystemLevel::Equipment,
                value_from_sub_system: Some(2000.0),
                margin_from_sub_system: Some(20.0),
                value_from_equipment: 3000.0,
                value_with_margin_from_equipment: 3750.0,
                margin_from_equipment: 25.0,
                total_with_margin: Some(3750.0),
            }],
            extra_contributions: vec![ExtraContributionRow {
                categories: vec!["cons".to_string()],
                parameter_type: "m".to_string(),
                total: 200.0,
                total_with_margin: 400.0,
                margin: 200.0,
            }],
            total: 4150.0,
            total_without_margin: 3200.0,
            generated_at: now(),
        }
    }

    #[test]
    fn text_report_lists_rows_and_total() {
        let text = render_budget(&[report()]);
        assert!(text.starts_with("mass budget of Sat (option OPT_A, domain SYS) [kg]"));
        assert!(text.contains("ss"));
        assert!(text.contains("3750.000"));
        assert!(text.contains("extra cons"));
        assert!(text.contains("total 4150.000 (3200.000 without margin)"));
    }

    #[test]
    fn json_report_uses_snake_case() {
        let json = render(&[report()], OutputFormat::Json, |r| render_budget(r)).unwrap();
        assert!(json.contains(r#""kind": "mass""#));
        assert!(json.contains(r#""system_level": "equipment""#));
        assert!(json.contains("2024-05-01T10:00:00+02:00"));
    }

    #[test]
    fn missing_values_render_as_dash() {
        assert_eq!(number(None), "-");
        assert_eq!(number(Some(1.5)), "1.500");
    }

    #[test]
    fn empty_extras_say_none() {
        let extras = ExtraContributionReport {
            element: "Sat".to_string(),
            option: "OPT_A".to_string(),
            domain: "SYS".to_string(),
            extra_contributions: Vec::new(),
            generated_at: now(),
        };
        assert!(render_extras(&[extras]).contains("none"));
    }

    #[test]
    fn overview_groups_by_option() {
        let tree = ProductTree::new(Default::default()).unwrap();
        let (root, a, b, domain) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let summary = |option| BudgetSummary {
            root_element: root,
            option,
            domain,
            results: Vec::new(),
            extra_contributions: Vec::new(),
        };
        let summaries = [summary(a), summary(b)];

        let overview = option_overview(
            &tree,
            budget_engine::BudgetKind::Cost,
            domain,
            &summaries,
            now(),
        );
        assert_eq!(overview.kind, BudgetKind::Cost);
        assert_eq!(overview.options.len(), 2);
        assert_eq!(overview.options[0].0, a.to_string());
        assert_eq!(overview.options[1].1[0].total, 0.0);
        assert!(render_overview(&overview).contains(&format!("option {b}")));
    }
}
