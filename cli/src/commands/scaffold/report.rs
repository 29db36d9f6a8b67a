//! # Batch Report (`commands::scaffold::report`)
//!
//! File: cli/src/commands/scaffold/report.rs
//!
//! Collects the outcome of every project in a batch and renders the summary
//! printed at the end of `stacks scaffold`.
//!
use super::project::Stage;
use crate::core::error::StacksError;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The project stopped while attempting `stage`.
    Failed { stage: Stage, error: String },
}

#[derive(Debug, Clone)]
pub struct ProjectOutcome {
    pub name: String,
    /// Where the template came from, once known.
    pub source: Option<String>,
    /// Last stage the project completed.
    pub reached: Stage,
    pub outcome: Outcome,
    pub warnings: Vec<String>,
    pub variable_file: Option<PathBuf>,
    pub working_dir: PathBuf,
}

impl ProjectOutcome {
    pub fn new(name: &str, working_dir: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            source: None,
            reached: Stage::Resolved,
            outcome: Outcome::Completed,
            warnings: Vec::new(),
            variable_file: None,
            working_dir,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Completed
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub projects: Vec<ProjectOutcome>,
    pub dry_run: bool,
    /// Command log written during the batch, when logging was enabled.
    pub cmdlog: Option<PathBuf>,
    /// Set when the batch temp root could not be removed.
    pub cleanup_error: Option<StacksError>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.projects.iter().filter(|p| p.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.projects.len() - self.succeeded()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.dry_run { " (dry run)" } else { "" };
        writeln!(f, "\nScaffolding summary{}:", mode)?;
        for project in &self.projects {
            match &project.outcome {
                Outcome::Completed => {
                    writeln!(f, "  ✅ {} -> {}", project.name, project.working_dir.display())?
                }
                Outcome::Failed { stage, error } => {
                    writeln!(f, "  ❌ {} failed at {}: {}", project.name, stage, error)?
                }
            }
            if let Some(source) = &project.source {
                writeln!(f, "      source: {}", source)?;
            }
            if let Some(variable_file) = &project.variable_file {
                writeln!(f, "      variables: {}", variable_file.display())?;
            }
            for warning in &project.warnings {
                writeln!(f, "      warning: {}", warning)?;
            }
        }
        if let Some(cmdlog) = &self.cmdlog {
            writeln!(f, "Command log: {}", cmdlog.display())?;
        }
        write!(
            f,
            "{} project(s): {} succeeded, {} failed",
            self.projects.len(),
            self.succeeded(),
            self.failed()
        )
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lists_every_project() {
        let mut ok = ProjectOutcome::new("web", PathBuf::from("/work/web"));
        ok.reached = Stage::Done;
        ok.warnings.push("no pipeline 'gha' in settings".into());
        let mut bad = ProjectOutcome::new("api", PathBuf::from("/work/api"));
        bad.outcome = Outcome::Failed {
            stage: Stage::Downloaded,
            error: "connection refused".into(),
        };
        let report = BatchReport {
            projects: vec![ok, bad],
            cmdlog: Some(PathBuf::from("/work/cmdlog.txt")),
            ..Default::default()
        };

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        let text = report.to_string();
        assert!(text.contains("✅ web -> /work/web"));
        assert!(text.contains("❌ api failed at download: connection refused"));
        assert!(text.contains("warning: no pipeline 'gha'"));
        assert!(text.contains("Command log: /work/cmdlog.txt"));
        assert!(text.ends_with("2 project(s): 1 succeeded, 1 failed"));
    }
}
