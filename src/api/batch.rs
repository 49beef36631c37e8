//! Batch execution of report jobs.
//!
//! A [`BatchPlan`] is the ordered list of report jobs for the paper. The
//! sequential runner stops at the first failing job; the parallel runner
//! runs every job and reports outcomes in plan order.

use std::io::Write;
use std::path::PathBuf;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::core::config::{Mode, Model};
use crate::core::errors::{ReportError, Result};
use crate::io::reports::{ReportGenerator, ReportOutcome};
use crate::reports::{ReportConfig, ReportKind};

/// One report job as written in a plan file.
///
/// Values stay raw strings so that an unrecognized mode or model fails the
/// job that names it, in order, rather than the whole plan up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchJob {
    /// Report kind slug
    pub kind: String,
    /// Explanation mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Embedding model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Persist the report
    #[serde(default)]
    pub save: bool,
}

impl BatchJob {
    /// Create a job from typed values.
    pub fn new(kind: ReportKind, mode: Option<Mode>, model: Option<Model>, save: bool) -> Self {
        Self {
            kind: kind.slug().to_string(),
            mode: mode.map(|m| m.to_string()),
            model: model.map(|m| m.to_string()),
            save,
        }
    }

    /// Validate the job into a report configuration.
    pub fn to_config(&self, force_save: bool) -> Result<ReportConfig> {
        let kind = self.kind.parse::<ReportKind>()?;
        let mode = self.mode.as_deref().map(str::parse::<Mode>).transpose()?;
        let model = self.model.as_deref().map(str::parse::<Model>).transpose()?;
        ReportConfig::new(kind, mode, model, self.save || force_save)
    }

    /// Label built from the raw values, usable even when they are invalid.
    pub fn label(&self) -> String {
        match (&self.mode, &self.model) {
            (Some(mode), Some(model)) => format!("{} [{mode} / {model}]", self.kind),
            (Some(mode), None) => format!("{} [{mode}]", self.kind),
            (None, Some(model)) => format!("{} [{model}]", self.kind),
            (None, None) => self.kind.clone(),
        }
    }
}

/// Ordered list of report jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPlan {
    /// Jobs in execution order
    pub jobs: Vec<BatchJob>,
}

impl Default for BatchPlan {
    fn default() -> Self {
        Self::paper()
    }
}

impl BatchPlan {
    /// The paper sequence: tables, then per-model plots, then comparison plots.
    pub fn paper() -> Self {
        let mut jobs = Vec::new();

        for mode in Mode::ALL {
            jobs.push(BatchJob::new(ReportKind::EndToEnd, Some(mode), None, false));
        }
        for mode in Mode::ALL {
            for model in Model::ALL {
                jobs.push(BatchJob::new(
                    ReportKind::ExplanationLengths,
                    Some(mode),
                    Some(model),
                    true,
                ));
            }
        }
        for mode in Mode::ALL {
            jobs.push(BatchJob::new(ReportKind::ExtractionTimes, Some(mode), None, true));
        }
        for mode in Mode::ALL {
            jobs.push(BatchJob::new(
                ReportKind::PrefilterComparison,
                Some(mode),
                None,
                true,
            ));
        }
        jobs.push(BatchJob::new(ReportKind::XsiThreshold, None, None, true));

        Self { jobs }
    }

    /// Load a plan from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ReportError::io(format!("Failed to read batch plan: {}", path.display()), e)
        })?;
        let plan: Self = serde_yaml::from_str(&content)?;
        if plan.jobs.is_empty() {
            return Err(ReportError::invalid_config_field(
                format!("batch plan {} has no jobs", path.display()),
                "jobs",
            ));
        }
        Ok(plan)
    }

    /// Number of jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the plan has no jobs.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// A job that finished successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedJob {
    /// Position in the plan
    pub index: usize,
    /// Job label
    pub label: String,
    /// What happened to the report
    pub outcome: ReportOutcome,
}

/// A job that failed.
#[derive(Debug)]
pub struct FailedJob {
    /// Position in the plan
    pub index: usize,
    /// Job label
    pub label: String,
    /// Why it failed
    pub error: ReportError,
}

/// Result of running a plan.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Jobs that succeeded, in plan order
    pub completed: Vec<CompletedJob>,
    /// Jobs that failed, in plan order
    pub failed: Vec<FailedJob>,
    /// Jobs never started because an earlier job failed
    pub skipped: usize,
}

impl BatchSummary {
    /// Whether every job ran and succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped == 0
    }

    /// First failure in plan order.
    pub fn first_failure(&self) -> Option<&FailedJob> {
        self.failed.first()
    }
}

/// Runs a plan against one generator.
pub struct BatchRunner<'a> {
    generator: &'a ReportGenerator,
    force_save: bool,
}

impl<'a> BatchRunner<'a> {
    /// Create a runner.
    pub fn new(generator: &'a ReportGenerator) -> Self {
        Self {
            generator,
            force_save: false,
        }
    }

    /// Save every report regardless of the job's own flag.
    pub fn with_force_save(mut self, force_save: bool) -> Self {
        self.force_save = force_save;
        self
    }

    fn run_job(&self, job: &BatchJob, display: &mut dyn Write) -> Result<ReportOutcome> {
        let config = job.to_config(self.force_save)?;
        self.generator.generate(&config, display)
    }

    /// Run jobs one after another, stopping at the first failure.
    pub fn run_sequential(&self, plan: &BatchPlan, display: &mut dyn Write) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for (index, job) in plan.jobs.iter().enumerate() {
            let label = job.label();
            info!("[{}/{}] {}", index + 1, plan.len(), label);

            match self.run_job(job, display) {
                Ok(outcome) => summary.completed.push(CompletedJob {
                    index,
                    label,
                    outcome,
                }),
                Err(err) => {
                    error!("{} failed: {}", label, err);
                    summary.failed.push(FailedJob {
                        index,
                        label,
                        error: err,
                    });
                    summary.skipped = plan.len() - index - 1;
                    break;
                }
            }
        }

        summary
    }

    /// Run every job on the rayon pool.
    ///
    /// Display output is buffered per job and flushed in plan order once
    /// all jobs have finished.
    pub fn run_parallel(&self, plan: &BatchPlan, display: &mut dyn Write) -> Result<BatchSummary> {
        let results: Vec<(String, Result<ReportOutcome>, Vec<u8>)> = plan
            .jobs
            .par_iter()
            .map(|job| {
                let mut buffer = Vec::new();
                let outcome = self.run_job(job, &mut buffer);
                (job.label(), outcome, buffer)
            })
            .collect();

        let mut summary = BatchSummary::default();
        for (index, (label, outcome, buffer)) in results.into_iter().enumerate() {
            display.write_all(&buffer)?;
            match outcome {
                Ok(outcome) => summary.completed.push(CompletedJob {
                    index,
                    label,
                    outcome,
                }),
                Err(err) => {
                    error!("{} failed: {}", label, err);
                    summary.failed.push(FailedJob {
                        index,
                        label,
                        error: err,
                    });
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ReportsConfig;
    use std::fs;
    use tempfile::TempDir;

    fn generator(temp: &TempDir) -> ReportGenerator {
        let mut settings = ReportsConfig::default();
        settings.paths.results_dir = temp.path().join("results");
        settings.paths.output_dir = temp.path().join("reports");
        settings.paths.templates_dir = Some(temp.path().to_path_buf());
        ReportGenerator::new(settings).unwrap()
    }

    fn write_times(temp: &TempDir, mode: &str) {
        let dir = temp.path().join("results").join("extraction-times");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(format!("{mode}.csv")),
            "model,dataset,seconds\nComplEx,FB15k,12\nTransE,FB15k,8\n",
        )
        .unwrap();
    }

    fn times_job(mode: &str) -> BatchJob {
        BatchJob {
            kind: "extraction-times".to_string(),
            mode: Some(mode.to_string()),
            model: None,
            save: true,
        }
    }

    #[test]
    fn paper_plan_orders_tables_before_plots() {
        let plan = BatchPlan::paper();
        assert_eq!(plan.len(), 13);
        assert_eq!(plan.jobs[0].kind, "end-to-end");
        assert!(!plan.jobs[0].save);
        assert_eq!(plan.jobs.last().unwrap().kind, "xsi-threshold");
        for job in &plan.jobs {
            assert!(job.to_config(false).is_ok(), "{} should be valid", job.label());
        }
    }

    #[test]
    fn sequential_run_stops_at_first_failure() {
        let temp = TempDir::new().unwrap();
        write_times(&temp, "necessary");
        write_times(&temp, "sufficient");
        let generator = generator(&temp);

        let plan = BatchPlan {
            jobs: vec![times_job("necessary"), times_job("both"), times_job("sufficient")],
        };
        let mut sink = Vec::new();
        let summary = BatchRunner::new(&generator).run_sequential(&plan, &mut sink);

        assert!(!summary.is_success());
        assert_eq!(summary.completed.len(), 1);
        assert_eq!(summary.skipped, 1);
        let failure = summary.first_failure().unwrap();
        assert_eq!(failure.index, 1);
        assert!(matches!(failure.error, ReportError::InvalidConfig { .. }));
        assert!(!temp
            .path()
            .join("reports/extraction-times/sufficient.svg")
            .exists());
    }

    #[test]
    fn parallel_run_reports_every_job_in_order() {
        let temp = TempDir::new().unwrap();
        write_times(&temp, "necessary");
        let generator = generator(&temp);

        let plan = BatchPlan {
            jobs: vec![times_job("necessary"), times_job("sufficient")],
        };
        let mut sink = Vec::new();
        let summary = BatchRunner::new(&generator)
            .run_parallel(&plan, &mut sink)
            .unwrap();

        assert_eq!(summary.completed.len(), 1);
        assert_eq!(summary.completed[0].index, 0);
        assert_eq!(summary.failed.len(), 1);
        assert!(matches!(
            summary.failed[0].error,
            ReportError::DataNotFound { .. }
        ));
    }

    #[test]
    fn force_save_overrides_job_flag() {
        let mut job = times_job("necessary");
        job.save = false;
        assert!(!job.to_config(false).unwrap().save);
        assert!(job.to_config(true).unwrap().save);
    }

    #[test]
    fn plan_loads_from_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plan.yml");
        fs::write(
            &path,
            "jobs:\n  - kind: explanation-lengths\n    mode: necessary\n    model: ConvE\n    save: true\n  - kind: xsi-threshold\n",
        )
        .unwrap();

        let plan = BatchPlan::from_yaml_file(&path).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.jobs[0].label(), "explanation-lengths [necessary / ConvE]");
        assert!(!plan.jobs[1].save);
    }

    #[test]
    fn empty_plan_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plan.yml");
        fs::write(&path, "jobs: []\n").unwrap();
        assert!(matches!(
            BatchPlan::from_yaml_file(&path),
            Err(ReportError::InvalidConfig { .. })
        ));
    }
}
