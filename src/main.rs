use std::sync::Arc;

use clap::Parser;
use slipcraft::application::pool_runner::RunOptions;
use slipcraft::cli::commands::{BranchCommand, Cli, Commands, StepCommand, StrategyCommand};
use slipcraft::config::AppConfig;
use slipcraft::domain::entities::sample::MatchMetricSample;
use slipcraft::domain::entities::strategy::StrategyDefinition;
use slipcraft::domain::values::branch::Branch;
use slipcraft::domain::values::edge::{BranchConfig, EdgeType};
use slipcraft::domain::values::metric::{MetricCategory, MetricRegistry};
use slipcraft::domain::values::range::Range;
use slipcraft::domain::values::step_id::StepId;
use slipcraft::infrastructure::samples::json_file::JsonPoolProvider;
use slipcraft::SlipCraft;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = slipcraft::telemetry::init(&config) {
        eprintln!("Error initializing logging: {e}");
        std::process::exit(1);
    }

    let options = RunOptions {
        parallel: config.parallel && !cli.sequential,
    };

    if let Err(e) = run_command(&config, options, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn open(config: &AppConfig, options: RunOptions) -> Result<SlipCraft, Box<dyn std::error::Error>> {
    Ok(SlipCraft::new(&config.db_path, options)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_command(
    config: &AppConfig,
    options: RunOptions,
    cmd: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Strategy { command } => {
            let sc = open(config, options)?;
            match command {
                StrategyCommand::Create { name, max_margin } => {
                    print_json(&sc.create_strategy(name, max_margin)?)?;
                }
                StrategyCommand::Import { name, file } => {
                    let raw = tokio::fs::read_to_string(&file).await?;
                    let definition: StrategyDefinition = serde_json::from_str(&raw)?;
                    print_json(&sc.import_strategy(name, definition)?)?;
                }
                StrategyCommand::List => print_json(&sc.strategies()?)?,
                StrategyCommand::Show { id } => print_json(&sc.strategy(&id)?)?,
                StrategyCommand::Validate { id } => match sc.validate_strategy(&id)? {
                    Ok(()) => println!("Strategy {id} is valid"),
                    Err(violation) => return Err(format!("Strategy {id} is invalid: {violation}").into()),
                },
                StrategyCommand::Delete { id } => {
                    sc.delete_strategy(&id)?;
                    println!("Strategy {id} deleted");
                }
            }
        }
        Commands::Step { command } => {
            let sc = open(config, options)?;
            match command {
                StepCommand::Add { strategy, metric } => {
                    let (_, step) = sc.add_step(&strategy, metric)?;
                    println!("Added step {step}");
                }
                StepCommand::Remove { strategy, step } => {
                    let step: StepId = step.parse()?;
                    print_json(&sc.remove_step(&strategy, step)?)?;
                }
                StepCommand::Move {
                    strategy,
                    step,
                    index,
                } => {
                    let step: StepId = step.parse()?;
                    print_json(&sc.move_step(&strategy, step, index)?)?;
                }
                StepCommand::Metric {
                    strategy,
                    step,
                    metric,
                } => {
                    let step: StepId = step.parse()?;
                    print_json(&sc.set_step_metric(&strategy, step, metric)?)?;
                }
                StepCommand::Range {
                    strategy,
                    step,
                    branch,
                    min,
                    max,
                    min_open,
                    max_open,
                } => {
                    let step: StepId = step.parse()?;
                    let branch: Branch = branch.parse()?;
                    let range = Range {
                        min,
                        max,
                        min_is_open: min_open,
                        max_is_open: max_open,
                    };
                    print_json(&sc.set_range(&strategy, step, branch, range)?)?;
                }
            }
        }
        Commands::Branch {
            command:
                BranchCommand::Set {
                    strategy,
                    branch,
                    step,
                    edge,
                    weight,
                },
        } => {
            let sc = open(config, options)?;
            let branch: Branch = branch.parse()?;
            let step: StepId = step.parse()?;
            let edge_type: EdgeType = edge.parse()?;
            let edge_config = BranchConfig { edge_type, weight };
            print_json(&sc.set_branch_config(&strategy, branch, step, edge_config)?)?;
        }
        Commands::Scale {
            strategy,
            max_margin,
        } => {
            let sc = open(config, options)?;
            print_json(&sc.set_max_margin(&strategy, max_margin)?)?;
        }
        Commands::Metrics { category } => {
            let metrics = match category {
                Some(c) => {
                    let category: MetricCategory = c.parse()?;
                    MetricRegistry::by_category(category)
                }
                None => MetricRegistry::all().iter().collect(),
            };
            print_json(&metrics)?;
        }
        Commands::Run { strategy, pool } => {
            let provider = JsonPoolProvider::open(&pool).await?;
            let order = provider.fixture_order();
            info!(
                pool = %provider.path().display(),
                fixtures = order.len(),
                "pool file loaded"
            );
            let sc = SlipCraft::with_provider(&config.db_path, Arc::new(provider), options)?;

            let cancel = CancellationToken::new();
            let on_ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received, stopping pool run");
                    on_ctrl_c.cancel();
                }
            });

            let slip = sc.run_pool(&strategy, order, cancel).await?;
            print_json(&slip)?;
        }
        Commands::Evaluate { strategy, json } => {
            let sc = open(config, options)?;
            let sample: MatchMetricSample = serde_json::from_str(&json)?;
            print_json(&sc.evaluate_fixture(&strategy, &sample)?)?;
        }
    }
    Ok(())
}
