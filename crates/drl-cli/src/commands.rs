//! CLI command implementations
//!
//! Commands read files, call into `drl-core` and `drl-recipes`, and hand the
//! per-file results to [`crate::output`]. Files are processed in parallel
//! and reported in discovery order.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use drl_core::cst::printer::{TreePrinterOptions, debug_tree};
use drl_core::{
    Diagnostic, DiagnosticKind, DrlConfig, Location, MigrationOptions, ParserConfig, ResultExt,
    parse_bytes,
};
use drl_recipes::{
    AGENDA_GROUP_TO_RULEFLOW_GROUP, HALF_CONSTRAINT, LHS_LOGICAL_OPERATORS, MIGRATE_DRL10,
    PREFIX_CUSTOM_OPERATOR, RECIPE_IDS, Recipe, RecipeError, RecipeRunner, recipe_by_id,
};
use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::OutputFormat;
use crate::output::{FileReport, OutputFormatter, Summary};

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "drl-rewrite.toml";

/// File extension of DRL sources
const DRL_EXTENSION: &str = "drl";

/// Load `path`, or `drl-rewrite.toml` if it exists, or the defaults
pub fn load_config(path: Option<&Path>) -> Result<DrlConfig> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    if !path.exists() {
        if required {
            bail!("Configuration file not found: {}", path.display());
        }
        debug!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
        return Ok(DrlConfig::default());
    }

    let source = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
    let config = DrlConfig::from_toml_str(&source)
        .with_context(|| format!("Invalid configuration file {}", path.display()))?;
    debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Expand directories into the `.drl` files below them, sorted by name
///
/// Paths naming a file are taken as they are, whatever their extension.
pub fn discover_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();

    for path in paths {
        if !path.exists() {
            bail!("Path does not exist: {}", path.display());
        }
        if path.is_file() {
            if seen.insert(path.clone()) {
                files.push(path.clone());
            }
            continue;
        }

        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == DRL_EXTENSION)
                && seen.insert(entry.path().to_path_buf())
            {
                files.push(entry.into_path());
            }
        }
    }

    debug!("Discovered {} DRL files", files.len());
    Ok(files)
}

/// Check command implementation
pub fn check_command(
    paths: &[PathBuf],
    format: OutputFormat,
    config: &DrlConfig,
    use_colors: bool,
) -> Result<bool> {
    let start_time = Instant::now();
    let files = discover_files(paths)?;

    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|path| check_file(path, &config.parser))
        .collect();

    let summary = Summary::from_reports(&reports);
    info!(
        "Checked {} files in {:?}",
        summary.files_checked,
        start_time.elapsed()
    );

    OutputFormatter::new(format, use_colors).print_check(&reports, &summary)?;
    Ok(summary.has_errors())
}

fn check_file(path: &Path, config: &ParserConfig) -> FileReport {
    let source_id = path.display().to_string();
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => return FileReport::failed(path, read_failure(&source_id, &e)),
    };

    let diagnostics = match parse_bytes(&bytes, &source_id, config).or_diagnostic(&source_id) {
        Ok(output) => output.diagnostics,
        Err(diagnostic) => vec![diagnostic],
    };
    FileReport {
        path: path.to_path_buf(),
        source: String::from_utf8_lossy(&bytes).into_owned(),
        migrated: None,
        applied: Vec::new(),
        diagnostics,
    }
}

/// Migrate command implementation
#[allow(clippy::too_many_arguments)]
pub fn migrate_command(
    paths: &[PathBuf],
    write: bool,
    recipe_ids: &[String],
    disabled: &[String],
    format: OutputFormat,
    config: &DrlConfig,
    use_colors: bool,
) -> Result<bool> {
    let start_time = Instant::now();
    let recipes = select_recipes(recipe_ids, disabled, &config.migration)?;
    debug!(
        "Running recipes: {:?}",
        recipes.iter().map(|r| r.id()).collect::<Vec<_>>()
    );

    let files = discover_files(paths)?;
    let runner = RecipeRunner::from_config(config);
    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|path| migrate_file(path, &runner, &recipes))
        .collect();

    if write {
        for report in &reports {
            if let Some(migrated) = report.changed_text() {
                fs::write(&report.path, migrated)
                    .with_context(|| format!("Failed to write {}", report.path.display()))?;
                info!("Migrated {}", report.path.display());
            }
        }
    }

    let summary = Summary::from_reports(&reports);
    info!(
        "Migrated {} of {} files in {:?}",
        summary.files_changed,
        summary.files_checked,
        start_time.elapsed()
    );

    OutputFormatter::new(format, use_colors).print_migration(&reports, &summary, write)?;
    Ok(summary.has_errors())
}

fn migrate_file(path: &Path, runner: &RecipeRunner, recipes: &[Box<dyn Recipe>]) -> FileReport {
    let source_id = path.display().to_string();
    let source = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => return FileReport::failed(path, read_failure(&source_id, &e)),
    };
    let source = match String::from_utf8(source) {
        Ok(source) => source,
        Err(e) => {
            let error = drl_core::DrlError::InvalidUtf8 {
                source_id: source_id.clone(),
                offset: e.utf8_error().valid_up_to(),
            };
            return FileReport::failed(path, error.to_diagnostic(&source_id));
        }
    };

    match runner.run(&source, &source_id, recipes) {
        Ok(output) => FileReport {
            path: path.to_path_buf(),
            source,
            migrated: Some(output.text),
            applied: output.applied,
            diagnostics: output.diagnostics,
        },
        Err(RecipeError::Core(e)) => {
            let diagnostic = e.to_diagnostic(&source_id);
            FileReport {
                path: path.to_path_buf(),
                source,
                migrated: None,
                applied: Vec::new(),
                diagnostics: vec![diagnostic],
            }
        }
        Err(e) => FileReport {
            path: path.to_path_buf(),
            source,
            migrated: None,
            applied: Vec::new(),
            diagnostics: vec![Diagnostic::error(
                DiagnosticKind::Internal,
                e.to_string(),
                Location::new(source_id, 0..0, 1, 1),
            )],
        },
    }
}

/// Resolve `--recipe` and `--disable` against the configured migration
pub fn select_recipes(
    recipe_ids: &[String],
    disabled: &[String],
    options: &MigrationOptions,
) -> Result<Vec<Box<dyn Recipe>>> {
    let mut options = options.clone();
    for id in disabled {
        match id.as_str() {
            AGENDA_GROUP_TO_RULEFLOW_GROUP => options.rewrite_agenda_group = false,
            HALF_CONSTRAINT => options.rewrite_half_constraints = false,
            LHS_LOGICAL_OPERATORS => options.replace_lhs_logical_infix = false,
            PREFIX_CUSTOM_OPERATOR => options.prefix_custom_operators = false,
            _ => bail!(
                "Cannot disable unknown recipe '{}'. Known recipes: {}",
                id,
                RECIPE_IDS.join(", ")
            ),
        }
    }

    let ids: Vec<&str> = if recipe_ids.is_empty() {
        vec![MIGRATE_DRL10]
    } else {
        recipe_ids.iter().map(String::as_str).collect()
    };

    let mut recipes = Vec::with_capacity(ids.len());
    for id in ids {
        if disabled.iter().any(|d| d == id) {
            continue;
        }
        let recipe = recipe_by_id(id, &options)
            .with_context(|| format!("Known recipes: {}", RECIPE_IDS.join(", ")))?;
        recipes.push(recipe);
    }
    Ok(recipes)
}

/// Tree command implementation
pub fn tree_command(
    file: &Path,
    no_trivia: bool,
    config: &DrlConfig,
    use_colors: bool,
) -> Result<bool> {
    let bytes = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let source_id = file.display().to_string();
    let output = parse_bytes(&bytes, &source_id, &config.parser)?;

    let options = TreePrinterOptions {
        include_trivia: !no_trivia,
        ..TreePrinterOptions::default()
    };
    print!("{}", debug_tree(&output.tree.root(), options));

    if !output.diagnostics.is_empty() {
        let report = FileReport {
            path: file.to_path_buf(),
            source: output.tree.text(),
            migrated: None,
            applied: Vec::new(),
            diagnostics: output.diagnostics,
        };
        eprint!(
            "{}",
            OutputFormatter::new(OutputFormat::Text, use_colors).render_diagnostics(&report)
        );
    }
    Ok(false)
}

/// Recipes command implementation
pub fn recipes_command(format: OutputFormat, config: &DrlConfig) -> Result<bool> {
    let descriptors = RECIPE_IDS
        .iter()
        .map(|id| recipe_by_id(id, &config.migration).map(|r| r.descriptor()))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    OutputFormatter::new(format, false).print_recipes(&descriptors)?;
    Ok(false)
}

fn read_failure(source_id: &str, error: &std::io::Error) -> Diagnostic {
    Diagnostic::error(
        DiagnosticKind::Internal,
        format!("Failed to read file: {error}"),
        Location::new(source_id, 0..0, 1, 1),
    )
}
