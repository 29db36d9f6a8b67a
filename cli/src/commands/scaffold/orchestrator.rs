//! # Scaffolding Orchestrator (`commands::scaffold::orchestrator`)
//!
//! File: cli/src/commands/scaffold/orchestrator.rs
//!
//! ## Overview
//!
//! Drives every declared project through the materialisation pipeline, in
//! declaration order:
//!
//! ```text
//! Resolved → Downloaded → SettingsLoaded → FrameworkChecked → InitPhase → SetupPhase
//!          → VariablesWritten → PatternsReplaced → VcsInitialized → Done
//! ```
//!
//! A failing stage ends that project as `Failed { stage }` and the batch moves on
//! to the next project. All projects share one batch temp root
//! (`<temp>/stacks-<timestamp>-<pid>`), each downloading into its own subdirectory.
//! The root is removed once at the end; failing to remove it is the only error
//! that fails the whole batch.
//!
//! Everything here blocks (HTTP, unpacking, child processes). The command handler
//! runs `run_batch` on a blocking task.
//!
use super::framework::check_tools;
use super::operation::{run_phase, Action, Operation};
use super::pipeline::{replace_patterns, write_variable_file};
use super::project::{Project, Stage};
use super::report::{BatchReport, Outcome, ProjectOutcome};
use crate::common::download;
use crate::common::fs::copy::copy_tree;
use crate::common::fs::io::{ensure_dir_exists, remove_dir_if_exists};
use crate::core::config::Config;
use crate::core::error::{Result, StacksError};
use anyhow::{anyhow, Context};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, info_span, warn};

/// A project stopped at `stage`.
#[derive(Debug)]
struct StageFailure {
    stage: Stage,
    error: anyhow::Error,
}

fn at<E: Into<anyhow::Error>>(stage: Stage) -> impl FnOnce(E) -> StageFailure {
    move |e| StageFailure {
        stage,
        error: e.into(),
    }
}

/// Creates the batch temp root under `temp_dir`.
pub fn create_batch_root(temp_dir: &Path) -> Result<PathBuf> {
    let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
    let root = temp_dir.join(format!("stacks-{}-{}", stamp, std::process::id()));
    ensure_dir_exists(&root)
        .with_context(|| format!("Failed to create batch temp directory {}", root.display()))?;
    info!("Batch temp directory: {}", root.display());
    Ok(root)
}

/// Scaffolds every project in `config`.
///
/// Returns `Err` only when the batch could not start. Per-project failures and a
/// failed temp cleanup are recorded in the report.
pub fn run_batch(config: &Config) -> Result<BatchReport> {
    let batch_root = create_batch_root(Path::new(&config.directory.temp))?;
    let working_root = PathBuf::from(&config.directory.working);
    let mut report = BatchReport {
        dry_run: config.options.dryrun,
        ..Default::default()
    };
    if config.options.dryrun {
        info!("Dry run: operations, variable files, replacements and version control are skipped");
    }

    for declared in &config.projects {
        let mut project = Project::new(declared, &batch_root, &working_root);
        let mut outcome = ProjectOutcome::new(&project.name, project.directory.working.clone());
        let span = info_span!("project", project = %project.name);
        let _entered = span.enter();

        info!("Scaffolding project '{}'", project.name);
        if let Err(failure) = materialize(config, &mut project, &mut outcome, &span) {
            error!(
                "Project '{}' failed at {}: {:#}",
                project.name, failure.stage, failure.error
            );
            outcome.outcome = Outcome::Failed {
                stage: failure.stage,
                error: format!("{:#}", failure.error),
            };
        } else {
            info!("Project '{}' completed", project.name);
        }
        debug!("Project '{}' last completed stage: {}", project.name, outcome.reached);
        report.projects.push(outcome);
    }

    if config.options.cmdlog {
        let cmdlog = config.cmdlog_path();
        info!("Commands were logged to {}", cmdlog.display());
        report.cmdlog = Some(cmdlog);
    }

    if let Err(e) = remove_dir_if_exists(&batch_root) {
        error!("Failed to clean up {}: {:#}", batch_root.display(), e);
        report.cleanup_error = Some(StacksError::TempCleanup {
            path: batch_root.display().to_string(),
            message: format!("{:#}", e),
        });
    }
    Ok(report)
}

fn materialize(
    config: &Config,
    project: &mut Project,
    outcome: &mut ProjectOutcome,
    span: &tracing::Span,
) -> std::result::Result<(), StageFailure> {
    let dry_run = config.options.dryrun;

    // Resolved
    let key = project.framework.map_key();
    let component = config.components.get(&key).ok_or_else(|| StageFailure {
        stage: Stage::Resolved,
        error: anyhow!(StacksError::Config(format!(
            "no component configured for framework '{}'",
            key
        ))),
    })?;
    ensure_dir_exists(&project.directory.temp).map_err(at(Stage::Resolved))?;

    // Downloaded
    let mut downloader =
        download::for_component(component, &project.framework.version, &project.directory.temp);
    downloader.attach_logger(span.clone());
    let source = downloader.source_identifier();
    info!("Fetching template from {}", source);
    outcome.source = Some(source);
    let tree = downloader.fetch().map_err(at(Stage::Downloaded))?;
    if !tree.is_dir() {
        return Err(StageFailure {
            stage: Stage::Downloaded,
            error: anyhow!(StacksError::FileSystem(format!(
                "downloaded template directory {} does not exist",
                tree.display()
            ))),
        });
    }
    project.directory.download = tree.clone();
    outcome.reached = Stage::Downloaded;

    // SettingsLoaded
    let project: &Project = project;
    let settings = project.settings().map_err(at(Stage::SettingsLoaded))?;
    outcome.reached = Stage::SettingsLoaded;

    // FrameworkChecked
    check_tools(&settings.framework.commands, &tree).map_err(at(Stage::FrameworkChecked))?;
    outcome.reached = Stage::FrameworkChecked;

    // InitPhase
    run_phase("init", &settings.init.operations, config, project, &tree)
        .map_err(at(Stage::InitPhase))?;
    outcome.reached = Stage::InitPhase;

    // SetupPhase
    let working = &project.directory.working;
    if dry_run {
        if settings.setup.copy {
            info!("[dry-run] Skipping copy of template into {}", working.display());
        }
    } else {
        ensure_dir_exists(working).map_err(at(Stage::SetupPhase))?;
        if settings.setup.copy {
            copy_tree(&tree, working, &[".git"]).map_err(at(Stage::SetupPhase))?;
        }
    }
    run_phase("setup", &settings.setup.operations, config, project, working)
        .map_err(at(Stage::SetupPhase))?;
    outcome.reached = Stage::SetupPhase;

    // VariablesWritten
    let pipeline = settings.pipeline_for(&config.pipeline);
    match pipeline {
        None => {
            let message = format!("no '{}' pipeline declared in template settings", config.pipeline);
            warn!("{}", message);
            outcome.warnings.push(message);
        }
        Some(_) if dry_run => info!("[dry-run] Skipping variable file"),
        Some(pipeline) => {
            let written =
                write_variable_file(pipeline, config, project).map_err(at(Stage::VariablesWritten))?;
            outcome.variable_file = Some(written);
        }
    }
    outcome.reached = Stage::VariablesWritten;

    // PatternsReplaced
    match pipeline {
        Some(_) if dry_run => info!("[dry-run] Skipping pattern replacement"),
        Some(pipeline) => {
            let summary =
                replace_patterns(pipeline, config, project).map_err(at(Stage::PatternsReplaced))?;
            for warning in &summary.warnings {
                warn!("{}", warning);
            }
            outcome.warnings.extend(summary.warnings);
        }
        None => {}
    }
    outcome.reached = Stage::PatternsReplaced;

    // VcsInitialized
    run_phase("version control", &vcs_operations(project), config, project, working)
        .map_err(at(Stage::VcsInitialized))?;
    outcome.reached = Stage::Done;
    Ok(())
}

/// `git init`, plus the origin remote when a repository URL is configured.
fn vcs_operations(project: &Project) -> Vec<Operation> {
    let mut operations = vec![Operation {
        action: Action::Cmd,
        cmd: "git".to_string(),
        args: "init".to_string(),
        desc: "Initialise git repository".to_string(),
    }];
    if !project.source_control.url.trim().is_empty() {
        operations.push(Operation {
            action: Action::Cmd,
            cmd: "git".to_string(),
            args: "remote add origin {{ project.source_control.url }}".to_string(),
            desc: "Add origin remote".to_string(),
        });
    }
    operations
}
