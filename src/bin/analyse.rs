use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::bail;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info, warn};

use scoreline::analysis::{run, AnalysisRequest};
use scoreline::catalogue::Catalogue;
use scoreline::config::AnalysisConfig;
use scoreline::factorial::MAX_FACTORIAL;
use scoreline::file::ReadJsonFile;
use scoreline::print;
use scoreline::scoregrid::DistributionMode;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// analysis request file (JSON)
    request: PathBuf,

    /// analysis config file (JSON)
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// market catalogue file (JSON); the built-in catalogue is used if omitted
    #[clap(long)]
    catalogue: Option<PathBuf>,

    /// simulate the scoregrid rather than computing it exactly
    #[clap(short = 's', long)]
    simulate: bool,

    /// number of simulation trials
    #[clap(short = 't', long)]
    trials: Option<u64>,

    /// simulation seed
    #[clap(long)]
    seed: Option<u64>,

    /// largest goal count per side
    #[clap(short = 'g', long)]
    max_goals: Option<u8>,

    /// print the report as JSON
    #[clap(long)]
    json: bool,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if let Some(max_goals) = self.max_goals {
            if max_goals > MAX_FACTORIAL {
                bail!("max goals cannot exceed {MAX_FACTORIAL}");
            }
        }
        if self.trials == Some(0) {
            bail!("at least one trial is required");
        }
        Ok(())
    }

    /// Overrides the loaded config. Trials and seed apply whenever the effective distribution
    /// is a simulation, whether selected by `--simulate` or by the config itself.
    fn apply(&self, config: &mut AnalysisConfig) -> anyhow::Result<()> {
        if let Some(max_goals) = self.max_goals {
            config.max_goals = max_goals;
        }
        let (default_trials, default_seed) = match config.distribution {
            DistributionMode::Simulation { trials, seed } => (trials, seed),
            DistributionMode::Exact if self.simulate => (DistributionMode::DEFAULT_TRIALS, 0),
            DistributionMode::Exact => {
                if self.trials.is_some() || self.seed.is_some() {
                    bail!("trials and seed only apply to a simulated distribution");
                }
                return Ok(());
            }
        };
        config.distribution = DistributionMode::Simulation {
            trials: self.trials.unwrap_or(default_trials),
            seed: self.seed.unwrap_or(default_seed),
        };
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let mut config = match &args.config {
        Some(path) => AnalysisConfig::read_json_file(path)?,
        None => AnalysisConfig::default(),
    };
    args.apply(&mut config)?;
    debug!("config: {config:?}");

    let catalogue = match &args.catalogue {
        Some(path) => Catalogue::read_json_file(path)?,
        None => Catalogue::builtin(),
    };
    let request = AnalysisRequest::read_json_file(&args.request)?;

    let start_time = Instant::now();
    let report = run(&request, &catalogue, &config)?;
    let elapsed = start_time.elapsed();
    info!(
        "analysed {} markets in {:.3}s",
        catalogue.len(),
        elapsed.as_millis() as f64 / 1_000.
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match &report.model {
        Ok(model) => {
            info!(
                "intensities:\n{}",
                Console::default().render(&print::tabulate_intensities(&model.intensities))
            );
            info!(
                "most likely scorelines:\n{}",
                Console::default().render(&print::tabulate_scorelines(&model.most_likely))
            );
            info!(
                "markets:\n{}",
                Console::default().render(&print::tabulate_markets(&model.markets))
            );
        }
        Err(err) => warn!("no model: {err}"),
    }
    info!(
        "candidates:\n{}",
        Console::default().render(&print::tabulate_candidates(&report.candidates))
    );
    if report.recommendations.is_empty() {
        info!("no qualifying recommendations");
    } else {
        info!(
            "recommendations by coverage:\n{}",
            Console::default().render(&print::tabulate_recommendations(
                &report.recommendations.by_coverage
            ))
        );
        info!(
            "top recommendations by value:\n{}",
            Console::default().render(&print::tabulate_recommendations(
                &report.recommendations.by_value
            ))
        );
    }
    if !report.movements.is_empty() {
        info!(
            "price movement:\n{}",
            Console::default().render(&print::tabulate_movements(&report.movements))
        );
    }
    Ok(())
}
