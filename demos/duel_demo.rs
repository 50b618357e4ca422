// Demonstration: run a controller against the sandbox duel and evaluate a policy.
//
// Build/run from this repo root:
//   cargo run --example duel_demo -- --policy heuristic --episodes 20
//   RUST_LOG=skirmish=debug cargo run --example duel_demo -- --policy random --episodes 1

use std::env;

use skirmish::host::{DuelArena, DuelSettings};
use skirmish::{
    AgentController, ControllerConfig, EvaluationMetrics, HeuristicPolicy, Policy, RandomPolicy,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let policy_name = arg_value(&args, "--policy").unwrap_or("heuristic");
    let episodes: usize = arg_value(&args, "--episodes")
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);
    let seed: u64 = arg_value(&args, "--seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let tick_limit: u32 = arg_value(&args, "--tick-limit")
        .and_then(|s| s.parse().ok())
        .unwrap_or(3000);

    let config = ControllerConfig::default();
    let arena = DuelArena::new(DuelSettings::default());
    let (perception, vitals, weapon, executor) = arena.bindings();
    let mut controller = match AgentController::new(config, perception, vitals, weapon, executor) {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("Invalid controller configuration: {}", e);
            std::process::exit(2);
        }
    };

    let mut policy: Box<dyn Policy> = match policy_name {
        "random" => Box::new(RandomPolicy::new(seed)),
        "heuristic" => Box::new(HeuristicPolicy::melee()),
        other => {
            eprintln!(
                "Unknown --policy '{}'; expected 'heuristic' or 'random'.",
                other
            );
            std::process::exit(2);
        }
    };

    println!("Actions:");
    for descriptor in controller.action_table().iter() {
        println!("  {}", descriptor);
    }

    let metrics = EvaluationMetrics::evaluate(
        &mut controller,
        policy.as_mut(),
        episodes,
        tick_limit,
        |dt| arena.advance(dt),
    );
    println!("Policy: {}", policy.name());
    println!("{}", metrics);
}

fn arg_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}
