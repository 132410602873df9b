//! Test suites
//!
//! A suite runs its scenarios in order, each in isolation, and collects one
//! verdict per scenario.

use std::fmt;

use log::info;
use serde::Serialize;
use skinrt_core::{ExportConfig, FormatVersion, GameTarget, ImportConfig, SkeletonImportMode};
use skinrt_io::exported_path;

use crate::fixtures::{
    BABELFISH, BODY_MESH, CUIRASS, FOOT, FULL_BODY, HAND, LOWER_BODY, SKELETON, UPPER_BODY,
};
use crate::scenario::{RunContext, Scenario, ScenarioOutcome, Source, Verdict};

#[derive(Debug, Clone)]
pub struct Suite {
    pub name: String,
    pub scenarios: Vec<Scenario>,
    /// Whether a run without an explicit suite selection includes this suite
    pub enabled_by_default: bool,
}

impl Suite {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            scenarios: Vec::new(),
            enabled_by_default: true,
        }
    }

    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenarios.push(scenario);
        self
    }

    /// Only run when selected by name
    pub fn disabled(mut self) -> Self {
        self.enabled_by_default = false;
        self
    }

    pub fn run(&self, context: &RunContext) -> SuiteOutcome {
        info!("running suite {} ({} scenarios)", self.name, self.scenarios.len());
        SuiteOutcome {
            suite: self.name.clone(),
            outcomes: self.scenarios.iter().map(|s| s.run(context)).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteOutcome {
    pub suite: String,
    pub outcomes: Vec<ScenarioOutcome>,
}

impl SuiteOutcome {
    /// Whether every scenario passed
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(ScenarioOutcome::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }
}

impl fmt::Display for SuiteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let passed = self.outcomes.iter().filter(|o| o.passed()).count();
        writeln!(f, "suite {}: {}/{} scenarios passed", self.suite, passed, self.outcomes.len())?;
        for outcome in &self.outcomes {
            writeln!(
                f,
                "  [{}] {} ({} comparisons, {} discrepancies)",
                outcome.verdict,
                outcome.name,
                outcome.reports.len(),
                outcome.discrepancy_count()
            )?;
        }
        for outcome in &self.outcomes {
            if let Verdict::Errored(message) = &outcome.verdict {
                writeln!(f, "{}: {}", outcome.name, message)?;
            }
            for comparison in outcome.reports.iter().filter(|c| !c.report.is_empty()) {
                writeln!(
                    f,
                    "{}: {} vs {}",
                    outcome.name, comparison.reference, comparison.against
                )?;
                write!(f, "{}", comparison.report)?;
            }
        }
        Ok(())
    }
}

fn merge() -> ImportConfig {
    ImportConfig::default().with_skeleton(SkeletonImportMode::FullSkeletonMerge)
}

/// Oblivion body parts merged onto one skeleton and exported as one file
pub fn full_body_merge() -> Scenario {
    Scenario::new("full_body_merge")
        .import(
            SKELETON,
            ImportConfig::default().with_skeleton(SkeletonImportMode::RootSkeletonOnly),
        )
        .import(UPPER_BODY, merge())
        .import(LOWER_BODY, merge())
        .import(HAND, merge())
        .import(FOOT, merge())
        .export(
            exported_path(FULL_BODY),
            ExportConfig::for_target(GameTarget::Oblivion)
                .with_smooth_seams(true)
                .with_flatten_skin(true),
            &["Scene Root"],
        )
        .compare_file(UPPER_BODY, FormatVersion::OBLIVION)
        .compare_file(LOWER_BODY, FormatVersion::OBLIVION)
        .compare_file(HAND, FormatVersion::OBLIVION)
        .compare_file(FOOT, FormatVersion::OBLIVION)
}

/// Morrowind creature exported without strips or partitions
pub fn creature_export() -> Scenario {
    Scenario::new("creature_export")
        .import(BABELFISH, ImportConfig::default())
        .export(
            exported_path(BABELFISH),
            ExportConfig::for_target(GameTarget::Morrowind)
                .with_stripify(false)
                .with_skin_partition(false),
            &["Root Bone"],
        )
}

/// Morrowind body mesh compared against its own import
pub fn body_mesh_round_trip() -> Scenario {
    Scenario::new("body_mesh_round_trip")
        .import(BODY_MESH, ImportConfig::default())
        .export(
            exported_path(BODY_MESH),
            ExportConfig::for_target(GameTarget::Morrowind)
                .with_smooth_seams(true)
                .with_stripify(false)
                .with_skin_partition(false),
            &["Bip01"],
        )
        .compare(Source::Import(0), Source::LastExport)
}

pub fn champion_armor() -> Scenario {
    Scenario::new("champion_armor")
        .import(CUIRASS, ImportConfig::default())
        .export(
            exported_path(CUIRASS),
            ExportConfig::for_target(GameTarget::Oblivion)
                .with_smooth_seams(true)
                .with_flatten_skin(true),
            &["Scene Root"],
        )
        .compare_file(CUIRASS, FormatVersion::OBLIVION)
}

/// The suites shipped with the harness
pub fn builtin_suites() -> Vec<Suite> {
    vec![
        Suite::new("skinning")
            .with_scenario(full_body_merge())
            .with_scenario(creature_export())
            .with_scenario(body_mesh_round_trip()),
        // its "Scene Root" collided with the full body one when both shared a session
        Suite::new("champion_armor").with_scenario(champion_armor()).disabled(),
    ]
}

pub fn find_suite(name: &str) -> Option<Suite> {
    builtin_suites().into_iter().find(|s| s.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_suites() {
        let names: Vec<_> = builtin_suites()
            .into_iter()
            .map(|s| (s.name, s.enabled_by_default))
            .collect();
        assert_eq!(
            names,
            vec![("skinning".to_string(), true), ("champion_armor".to_string(), false)]
        );
        assert_eq!(find_suite("skinning").unwrap().scenarios.len(), 3);
        assert!(find_suite("unknown").is_none());
    }

    #[test]
    fn test_outcome_display() {
        let outcome = SuiteOutcome {
            suite: "demo".to_string(),
            outcomes: vec![
                ScenarioOutcome {
                    name: "good".to_string(),
                    verdict: Verdict::Passed,
                    reports: Vec::new(),
                },
                ScenarioOutcome {
                    name: "bad".to_string(),
                    verdict: Verdict::Errored("Pipeline error: boom".to_string()),
                    reports: Vec::new(),
                },
            ],
        };
        assert!(!outcome.passed());
        assert_eq!(outcome.failures().count(), 1);
        let text = outcome.to_string();
        assert!(text.starts_with("suite demo: 1/2 scenarios passed"));
        assert!(text.contains("  [PASS] good"));
        assert!(text.contains("  [ERROR] bad"));
        assert!(text.contains("bad: Pipeline error: boom"));
    }
}
