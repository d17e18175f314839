use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use planetgrid::{
    engine::EngineBuilder,
    logging, report,
    scenario::{Scenario, ScenarioLoader},
    sink::FileSink,
    systems::standard_rules,
    web::{self, ServeConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Planet grid climate automaton")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the simulation and append per-tick averages to disk
    Run(RunArgs),
    /// Summarize averages written by earlier runs
    Report {
        #[arg(long, default_value = "averages")]
        averages_dir: PathBuf,
    },
    /// Run the simulation behind a JSON/SSE frame feed
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
struct ScenarioArgs {
    /// Path to the scenario YAML file (built-in default planet when omitted)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Override tick count
    #[arg(long)]
    ticks: Option<u64>,

    /// Override grid side length
    #[arg(long)]
    size: Option<usize>,

    /// Override RNG seed
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    scenario: ScenarioArgs,

    /// Directory for the averages logs
    #[arg(long, default_value = "averages")]
    averages_dir: PathBuf,

    /// Truncate existing averages logs before running
    #[arg(long)]
    fresh: bool,
}

#[derive(Debug, Args)]
struct ServeArgs {
    #[command(flatten)]
    scenario: ScenarioArgs,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,
}

impl ScenarioArgs {
    fn resolve(&self) -> Result<(Scenario, u64)> {
        let mut scenario = match &self.scenario {
            Some(path) => ScenarioLoader::new(".").load(path)?,
            None => Scenario::default(),
        };
        if let Some(size) = self.size {
            scenario.grid_size = size;
        }
        if let Some(seed) = self.seed {
            scenario.seed = seed;
        }
        scenario.validate()?;
        let ticks = scenario.ticks(self.ticks);
        Ok((scenario, ticks))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args),
        Command::Report { averages_dir } => {
            logging::init("info");
            let report = report::from_dir(&averages_dir)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Serve(args) => {
            let (scenario, ticks) = args.scenario.resolve()?;
            logging::init(&scenario.logging.level);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(web::serve(ServeConfig {
                scenario,
                ticks,
                host: args.host,
                port: args.port,
            }))
        }
    }
}

fn run(args: RunArgs) -> Result<()> {
    let (scenario, ticks) = args.scenario.resolve()?;
    logging::init(&scenario.logging.level);

    let mut sink = FileSink::open(&args.averages_dir)?;
    if args.fresh {
        sink.reset()?;
    }
    let mut world = scenario.build_world()?;
    let mut engine = EngineBuilder::new(scenario.engine_settings()?)
        .with_rules(standard_rules())
        .build();

    engine.run(&mut world, ticks, &mut sink)?;
    let aggregates = world.aggregates()?;
    println!(
        "Scenario '{}' completed for {} ticks. Average temperature: {:.2}, average pollution: {:.3}",
        scenario.name, ticks, aggregates.avg_temperature, aggregates.avg_pollution
    );
    Ok(())
}
