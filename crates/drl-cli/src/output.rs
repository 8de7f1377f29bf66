//! Output formatting and reporting
//!
//! Text output renders diagnostics with source snippets and migrations as
//! unified diffs. JSON output prints one document per command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use drl_core::{Diagnostic, DiagnosticRenderer, Severity};
use drl_recipes::RecipeDescriptor;
use serde_json::json;
use similar::TextDiff;

use crate::OutputFormat;

/// Everything a command learned about one file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub source: String,
    /// Migrated text, when a migration ran
    pub migrated: Option<String>,
    /// Recipes that changed the file
    pub applied: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl FileReport {
    /// A file that could not be processed at all
    pub fn failed(path: &Path, diagnostic: Diagnostic) -> Self {
        Self {
            path: path.to_path_buf(),
            source: String::new(),
            migrated: None,
            applied: Vec::new(),
            diagnostics: vec![diagnostic],
        }
    }

    /// Migrated text, if it differs from the source
    pub fn changed_text(&self) -> Option<&str> {
        self.migrated
            .as_deref()
            .filter(|migrated| *migrated != self.source)
    }
}

/// Summary statistics over all files of a run
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub files_checked: usize,
    pub files_changed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl Summary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut summary = Self {
            files_checked: reports.len(),
            ..Self::default()
        };
        for report in reports {
            if report.changed_text().is_some() {
                summary.files_changed += 1;
            }
            for diagnostic in &report.diagnostics {
                match diagnostic.severity {
                    Severity::Error => summary.errors += 1,
                    Severity::Warning => summary.warnings += 1,
                    Severity::Info => summary.info += 1,
                }
            }
        }
        summary
    }

    pub fn total_issues(&self) -> usize {
        self.errors + self.warnings + self.info
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Output formatter for different formats
pub struct OutputFormatter {
    format: OutputFormat,
    use_colors: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, use_colors: bool) -> Self {
        Self { format, use_colors }
    }

    pub fn print_check(&self, reports: &[FileReport], summary: &Summary) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                for report in reports {
                    print!("{}", self.render_diagnostics(report));
                }
                self.print_summary_text(summary, false);
                Ok(())
            }
            OutputFormat::Json => {
                let files = reports
                    .iter()
                    .map(|report| {
                        Ok(json!({
                            "path": report.path.display().to_string(),
                            "diagnostics": serde_json::to_value(&report.diagnostics)?,
                        }))
                    })
                    .collect::<serde_json::Result<Vec<_>>>()?;
                print_json(&json!({
                    "files_checked": summary.files_checked,
                    "files": files,
                    "summary": summary_json(summary),
                }))
            }
        }
    }

    pub fn print_migration(&self, reports: &[FileReport], summary: &Summary, write: bool) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                for report in reports {
                    eprint!("{}", self.render_diagnostics(report));
                    if let Some(migrated) = report.changed_text() {
                        if write {
                            println!("Migrated {}", report.path.display());
                        } else {
                            print!("{}", unified_diff(&report.path, &report.source, migrated));
                        }
                    }
                }
                self.print_summary_text(summary, true);
                Ok(())
            }
            OutputFormat::Json => {
                let files = reports
                    .iter()
                    .map(|report| {
                        Ok(json!({
                            "path": report.path.display().to_string(),
                            "changed": report.changed_text().is_some(),
                            "written": write && report.changed_text().is_some(),
                            "applied": report.applied,
                            "diagnostics": serde_json::to_value(&report.diagnostics)?,
                        }))
                    })
                    .collect::<serde_json::Result<Vec<_>>>()?;
                print_json(&json!({
                    "files_checked": summary.files_checked,
                    "files_changed": summary.files_changed,
                    "files": files,
                    "summary": summary_json(summary),
                }))
            }
        }
    }

    pub fn print_recipes(&self, recipes: &[RecipeDescriptor]) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                for recipe in recipes {
                    println!("{}", recipe.id);
                    println!("  {}", recipe.display_name);
                    println!("  {}", recipe.description);
                    for step in &recipe.steps {
                        println!("  - {}", step.id);
                    }
                }
                Ok(())
            }
            OutputFormat::Json => print_json(&serde_json::to_value(recipes)?),
        }
    }

    /// Diagnostics of one file as ariadne reports
    pub fn render_diagnostics(&self, report: &FileReport) -> String {
        if report.diagnostics.is_empty() {
            return String::new();
        }
        let renderer = if self.use_colors {
            DiagnosticRenderer::new()
        } else {
            DiagnosticRenderer::no_colors()
        };
        renderer.render(&report.diagnostics, &report.source)
    }

    fn print_summary_text(&self, summary: &Summary, migration: bool) {
        println!();
        println!("Summary:");
        println!("  Files checked: {}", summary.files_checked);
        if migration {
            println!("  Files changed: {}", summary.files_changed);
        }
        if summary.total_issues() == 0 {
            println!("  No issues found");
            return;
        }
        println!("  Issues found:");
        if summary.errors > 0 {
            println!("    Errors: {}", summary.errors);
        }
        if summary.warnings > 0 {
            println!("    Warnings: {}", summary.warnings);
        }
        if summary.info > 0 {
            println!("    Info: {}", summary.info);
        }
    }
}

/// Unified diff of a migrated file
pub fn unified_diff(path: &Path, old: &str, new: &str) -> String {
    let name = path.display().to_string();
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{name}"), &format!("b/{name}"))
        .to_string()
}

fn summary_json(summary: &Summary) -> serde_json::Value {
    json!({
        "errors": summary.errors,
        "warnings": summary.warnings,
        "info": summary.info,
        "total": summary.total_issues(),
    })
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use drl_core::{DiagnosticKind, Location};

    fn report(source: &str, migrated: Option<&str>) -> FileReport {
        FileReport {
            path: PathBuf::from("rules.drl"),
            source: source.to_string(),
            migrated: migrated.map(str::to_string),
            applied: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn test_changed_text_ignores_identical_output() {
        assert_eq!(report("a", Some("a")).changed_text(), None);
        assert_eq!(report("a", None).changed_text(), None);
        assert_eq!(report("a", Some("b")).changed_text(), Some("b"));
    }

    #[test]
    fn test_summary_counts() {
        let mut broken = report("rule", None);
        broken.diagnostics.push(Diagnostic::error(
            DiagnosticKind::SyntaxError,
            "expected rule name",
            Location::new("rules.drl", 4..4, 1, 5),
        ));
        let summary = Summary::from_reports(&[broken, report("x", Some("y"))]);
        assert_eq!(summary.files_checked, 2);
        assert_eq!(summary.files_changed, 1);
        assert_eq!(summary.errors, 1);
        assert!(summary.has_errors());
    }

    #[test]
    fn test_unified_diff() {
        let diff = unified_diff(
            Path::new("r.drl"),
            "rule R\nagenda-group \"g\"\nwhen then end\n",
            "rule R\nruleflow-group \"g\"\nwhen then end\n",
        );
        assert!(diff.starts_with("--- a/r.drl\n+++ b/r.drl\n"));
        assert!(diff.contains("-agenda-group \"g\"\n"));
        assert!(diff.contains("+ruleflow-group \"g\"\n"));
    }
}
