//! Round-trip scenarios
//!
//! A scenario is an ordered list of steps run against one fresh
//! [`SceneSession`]: imports and exports drive the pipeline, compare steps
//! feed two scene roots to the skinning comparator.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;
use skinrt_compare::{CompareOptions, DiscrepancyReport, SkinningComparator};
use skinrt_core::{
    Error, ExportConfig, ExportPipeline, FormatVersion, ImportConfig, Result, SceneFile,
};

use crate::session::SceneSession;

/// Where the scene of a compare step comes from
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// A file read fresh from disk, which must carry `version`
    File { path: PathBuf, version: FormatVersion },
    /// The file returned by the n-th import step
    Import(usize),
    /// The file returned by the most recent export step
    LastExport,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File { path, .. } => write!(f, "{}", path.display()),
            Source::Import(index) => write!(f, "import #{}", index),
            Source::LastExport => write!(f, "last export"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Step {
    Import {
        path: PathBuf,
        config: ImportConfig,
    },
    Export {
        path: PathBuf,
        config: ExportConfig,
        selection: Vec<String>,
    },
    Compare {
        reference: Source,
        against: Source,
    },
}

/// Settings shared by every scenario of a run
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Directory relative step paths are resolved against
    pub fixtures: PathBuf,
    pub options: CompareOptions,
    /// Fail scenarios whose comparisons report any discrepancy
    pub strict: bool,
}

impl RunContext {
    pub fn new<P: Into<PathBuf>>(fixtures: P) -> Self {
        Self {
            fixtures: fixtures.into(),
            options: CompareOptions::default(),
            strict: true,
        }
    }

    pub fn with_options(mut self, options: CompareOptions) -> Self {
        self.options = options;
        self
    }

    /// Report discrepancies without failing
    pub fn lenient(mut self) -> Self {
        self.strict = false;
        self
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.fixtures.join(path)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Passed,
    Failed,
    Errored(String),
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Passed => write!(f, "PASS"),
            Verdict::Failed => write!(f, "FAIL"),
            Verdict::Errored(_) => write!(f, "ERROR"),
        }
    }
}

/// Report of one compare step
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub reference: String,
    pub against: String,
    pub report: DiscrepancyReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub verdict: Verdict,
    pub reports: Vec<Comparison>,
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Passed
    }

    pub fn discrepancy_count(&self) -> usize {
        self.reports.iter().map(|c| c.report.len()).sum()
    }
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn import<P: Into<PathBuf>>(mut self, path: P, config: ImportConfig) -> Self {
        self.steps.push(Step::Import {
            path: path.into(),
            config,
        });
        self
    }

    pub fn export<P: Into<PathBuf>>(
        mut self,
        path: P,
        config: ExportConfig,
        selection: &[&str],
    ) -> Self {
        self.steps.push(Step::Export {
            path: path.into(),
            config,
            selection: selection.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn compare(mut self, reference: Source, against: Source) -> Self {
        self.steps.push(Step::Compare { reference, against });
        self
    }

    /// Compare a file read with `version` against the last export
    pub fn compare_file<P: Into<PathBuf>>(self, path: P, version: FormatVersion) -> Self {
        self.compare(
            Source::File {
                path: path.into(),
                version,
            },
            Source::LastExport,
        )
    }

    /// Run every step in a fresh session. Never panics on pipeline errors;
    /// they become an errored verdict.
    pub fn run(&self, context: &RunContext) -> ScenarioOutcome {
        info!("running scenario {}", self.name);
        let mut reports = Vec::new();
        let verdict = match self.execute(context, &mut reports) {
            Ok(()) if context.strict && reports.iter().any(|c| !c.report.is_empty()) => {
                Verdict::Failed
            }
            Ok(()) => Verdict::Passed,
            Err(e) => {
                warn!("scenario {} stopped: {}", self.name, e);
                Verdict::Errored(e.to_string())
            }
        };
        info!("scenario {}: {}", self.name, verdict);
        ScenarioOutcome {
            name: self.name.clone(),
            verdict,
            reports,
        }
    }

    fn execute(&self, context: &RunContext, reports: &mut Vec<Comparison>) -> Result<()> {
        let mut session = SceneSession::new().with_tolerance(context.options.tolerance);
        let comparator = SkinningComparator::new(context.options.clone());
        let mut imports: Vec<SceneFile> = Vec::new();
        let mut last_export: Option<SceneFile> = None;

        for step in &self.steps {
            match step {
                Step::Import { path, config } => {
                    imports.push(session.import(&context.resolve(path), config)?);
                }
                Step::Export {
                    path,
                    config,
                    selection,
                } => {
                    last_export = Some(session.export(&context.resolve(path), config, selection)?);
                }
                Step::Compare { reference, against } => {
                    let old = load(context, reference, &imports, last_export.as_ref())?;
                    let new = load(context, against, &imports, last_export.as_ref())?;
                    let (old_root, new_root) = match (old.root(), new.root()) {
                        (Some(o), Some(n)) => (o, n),
                        _ => {
                            return Err(Error::Pipeline(format!(
                                "Cannot compare {} with {}: no root block",
                                reference, against
                            )))
                        }
                    };
                    reports.push(Comparison {
                        reference: reference.to_string(),
                        against: against.to_string(),
                        report: comparator.compare(old_root, new_root),
                    });
                }
            }
        }
        Ok(())
    }
}

fn load<'a>(
    context: &RunContext,
    source: &Source,
    imports: &'a [SceneFile],
    last_export: Option<&'a SceneFile>,
) -> Result<Cow<'a, SceneFile>> {
    match source {
        Source::File { path, version } => {
            skinrt_io::read_scene(context.resolve(path), Some(*version)).map(Cow::Owned)
        }
        Source::Import(index) => imports
            .get(*index)
            .map(Cow::Borrowed)
            .ok_or_else(|| Error::Pipeline(format!("No import #{} to compare", index))),
        Source::LastExport => last_export
            .map(Cow::Borrowed)
            .ok_or_else(|| Error::Pipeline("No export to compare".to_string())),
    }
}
