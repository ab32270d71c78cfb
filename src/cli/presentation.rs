//! CLI presentation: text and json formatters per command.

use crate::element::{CompositionResult, Element, Position};
use crate::error::ApiError;
use chrono::{SecondsFormat, Utc};
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;

/// One loaded tree, as shown by `check`.
#[derive(Debug, Clone, Serialize)]
pub struct TreeSummary {
    pub tree_id: String,
    pub nodes: usize,
    pub entity_types: Vec<String>,
    pub attachments: usize,
}

/// One shared-root group, as shown by `check`.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub group_id: String,
    pub label: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub provider_name: String,
    pub definitions: String,
    pub trees: Vec<TreeSummary>,
    pub shared_roots: Vec<GroupSummary>,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::ConfigError(format!("Failed to serialize output: {}", e)))
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn format_check_report(report: &CheckReport, format: &str) -> Result<String, ApiError> {
    if format == "json" {
        return to_json(report);
    }

    let mut trees = Table::new();
    trees.load_preset(comfy_table::presets::UTF8_FULL);
    trees.set_header(vec!["Tree", "Nodes", "Entity types", "Attachments"]);
    for tree in &report.trees {
        trees.add_row(vec![
            tree.tree_id.clone(),
            tree.nodes.to_string(),
            tree.entity_types.join(", "),
            tree.attachments.to_string(),
        ]);
    }

    let mut out = format!(
        "{}\n  Provider: {}\n  Definitions: {}\n\n{}",
        "Definitions OK".bold(),
        report.provider_name,
        report.definitions,
        trees
    );

    if !report.shared_roots.is_empty() {
        let mut groups = Table::new();
        groups.load_preset(comfy_table::presets::UTF8_FULL);
        groups.set_header(vec!["Shared root", "Label", "Member trees"]);
        for group in &report.shared_roots {
            groups.add_row(vec![
                group.group_id.clone(),
                group.label.clone(),
                group.members.join(", "),
            ]);
        }
        out.push_str(&format!("\n\n{}", groups));
    }
    Ok(out)
}

pub fn format_has_children(identifier: &str, has_children: bool) -> String {
    format!("{}: {}", identifier, has_children)
}

fn element_line(element: &Element) -> String {
    let icon = element
        .icon
        .as_deref()
        .map(|icon| format!("[{}] ", icon))
        .unwrap_or_default();
    let line = format!("{}{}  ({})", icon, element.label, element.id);
    if element.is_error {
        let detail = element.tooltip.as_deref().unwrap_or_default();
        format!("{}\n    {}", line.red().bold(), detail.red())
    } else {
        line
    }
}

#[derive(Serialize)]
struct ElementsOutput<'a> {
    identifier: &'a str,
    generated_at: String,
    elements: &'a [Element],
}

pub fn format_elements(
    identifier: &str,
    elements: &[Element],
    format: &str,
) -> Result<String, ApiError> {
    if format == "json" {
        return to_json(&ElementsOutput {
            identifier,
            generated_at: now_rfc3339(),
            elements,
        });
    }
    if elements.is_empty() {
        return Ok(format!("{}: no children", identifier));
    }
    let lines: Vec<String> = elements.iter().map(element_line).collect();
    Ok(lines.join("\n"))
}

#[derive(Serialize)]
struct ResultsOutput<'a> {
    identifier: &'a str,
    generated_at: String,
    results: &'a [CompositionResult],
}

pub fn format_results(
    identifier: &str,
    results: &[CompositionResult],
    format: &str,
) -> Result<String, ApiError> {
    if format == "json" {
        return to_json(&ResultsOutput {
            identifier,
            generated_at: now_rfc3339(),
            results,
        });
    }
    if results.is_empty() {
        return Ok(format!("{}: nothing attached", identifier));
    }

    let mut out = Vec::new();
    for result in results {
        let position = match result.position {
            Position::Top => "top",
            Position::Bottom => "bottom",
        };
        out.push(format!(
            "{} (priority {})",
            position.bold(),
            result.position_priority
        ));
        out.extend(
            result
                .elements
                .iter()
                .map(|element| format!("  {}", element_line(element))),
        );
    }
    Ok(out.join("\n"))
}
