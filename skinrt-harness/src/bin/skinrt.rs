//! skinrt command line
//!
//! Runs the round-trip suites, compares two scene files, or writes the
//! generated fixtures. Exits with status 1 when a scenario or comparison
//! fails.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use skinrt_compare::{CompareOptions, GeometryPairing, SkinningComparator};
use skinrt_core::GameTarget;
use skinrt_harness::{builtin_suites, find_suite, fixtures, RunContext};

#[derive(Parser)]
#[command(name = "skinrt", version, about = "Skinning round-trip verification")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run test suites against the fixture directory
    Run {
        /// Suite to run; repeat for several. Defaults to every enabled suite
        #[arg(long = "suite")]
        suites: Vec<String>,
        #[arg(long, default_value = "fixtures")]
        fixtures: PathBuf,
        /// Report discrepancies without failing
        #[arg(long)]
        lenient: bool,
        #[command(flatten)]
        compare: CompareArgs,
    },
    /// Compare the skinning of two scene files
    Compare {
        old: PathBuf,
        new: PathBuf,
        /// Game whose version tokens both files must carry
        #[arg(long)]
        version: Option<GameTarget>,
        #[command(flatten)]
        compare: CompareArgs,
    },
    /// List the built-in suites and their scenarios
    List,
    /// Write the generated fixtures, replacing existing files
    Generate {
        #[arg(long, default_value = "fixtures")]
        fixtures: PathBuf,
    },
}

#[derive(clap::Args)]
struct CompareArgs {
    /// Absolute tolerance for bind data components
    #[arg(long, default_value_t = skinrt_core::DEFAULT_TOLERANCE)]
    tolerance: f32,
    #[arg(long, value_enum, default_value_t = Pairing::ByName)]
    pairing: Pairing,
}

#[derive(Clone, Copy, ValueEnum)]
enum Pairing {
    ByName,
    ByOrder,
    CrossProduct,
}

impl CompareArgs {
    fn options(&self) -> anyhow::Result<CompareOptions> {
        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            bail!("tolerance must be positive, got {}", self.tolerance);
        }
        Ok(match self.pairing {
            Pairing::ByName => CompareOptions::default(),
            Pairing::ByOrder => CompareOptions::default().with_pairing(GeometryPairing::ByOrder),
            Pairing::CrossProduct => CompareOptions::legacy(),
        }
        .with_tolerance(self.tolerance))
    }
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            suites,
            fixtures: dir,
            lenient,
            compare,
        } => {
            let selected = if suites.is_empty() {
                builtin_suites().into_iter().filter(|s| s.enabled_by_default).collect()
            } else {
                suites
                    .iter()
                    .map(|name| {
                        find_suite(name).with_context(|| format!("unknown suite '{}'", name))
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?
            };

            let generated = fixtures::ensure_fixtures(&dir)
                .with_context(|| format!("preparing fixtures in {}", dir.display()))?;
            if !generated.is_empty() {
                info!("generated {} fixtures in {}", generated.len(), dir.display());
            }

            let mut context = RunContext::new(&dir).with_options(compare.options()?);
            if lenient {
                context = context.lenient();
            }

            let mut all_passed = true;
            for suite in &selected {
                let outcome = suite.run(&context);
                print!("{}", outcome);
                all_passed &= outcome.passed();
            }
            Ok(if all_passed { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Command::Compare {
            old,
            new,
            version,
            compare,
        } => {
            let expected = version.map(GameTarget::version);
            let old_file = skinrt_io::read_scene(&old, expected)
                .with_context(|| format!("reading {}", old.display()))?;
            let new_file = skinrt_io::read_scene(&new, expected)
                .with_context(|| format!("reading {}", new.display()))?;
            let (Some(old_root), Some(new_root)) = (old_file.root(), new_file.root()) else {
                bail!("both files need at least one root block");
            };

            let report = SkinningComparator::new(compare.options()?).compare(old_root, new_root);
            print!("{}", report);
            Ok(if report.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Command::List => {
            for suite in builtin_suites() {
                let state = if suite.enabled_by_default { "" } else { " (disabled by default)" };
                println!("{}{}", suite.name, state);
                for scenario in &suite.scenarios {
                    println!("  {} ({} steps)", scenario.name, scenario.steps.len());
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Generate { fixtures: dir } => {
            let written = fixtures::write_fixtures(&dir)
                .with_context(|| format!("writing fixtures to {}", dir.display()))?;
            for path in written {
                println!("{}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
