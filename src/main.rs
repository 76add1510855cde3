//! wsrun: run provisioning plans and explain elevation decisions.
//!
//! Usage:
//!   wsrun run <plan.toml> [--phase before|after]
//!   wsrun explain [--windows|--unix] <command…>
//!   wsrun --dump-config

use std::path::Path;
use std::process::exit;

use wsrun::config::Config;
use wsrun::elevate::ElevationEngine;
use wsrun::parse::{self, CommandInput};
use wsrun::plan::{ExecutionOrder, Plan, Runner};
use wsrun::platform::Platform;

const USAGE: &str = "usage:
  wsrun run <plan.toml> [--phase before|after]
  wsrun explain [--windows|--unix] <command...>
  wsrun --dump-config";

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("wsrun: {e}");
            exit(1);
        }
    };

    match args.first().map(String::as_str) {
        Some("--dump-config") => dump_config(&config),
        Some("run") => {
            wsrun::logging::init(&config.settings);
            run(&config, &args[1..]);
        }
        Some("explain") => explain(&config, &args[1..]),
        _ => {
            eprintln!("{USAGE}");
            exit(2);
        }
    }
}

fn dump_config(config: &Config) {
    match config.to_toml() {
        Ok(s) => print!("{s}"),
        Err(e) => {
            eprintln!("wsrun: failed to serialize config: {e}");
            exit(1);
        }
    }
}

fn run(config: &Config, args: &[String]) {
    let mut plan_path = None;
    let mut phases = vec![ExecutionOrder::Before, ExecutionOrder::After];
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--phase" {
            let Some(value) = iter.next() else {
                eprintln!("wsrun: --phase needs a value\n{USAGE}");
                exit(2);
            };
            match value.parse() {
                Ok(phase) => phases = vec![phase],
                Err(e) => {
                    eprintln!("wsrun: {e}");
                    exit(2);
                }
            }
        } else if plan_path.is_none() {
            plan_path = Some(arg.as_str());
        } else {
            eprintln!("wsrun: unexpected argument `{arg}`\n{USAGE}");
            exit(2);
        }
    }
    let Some(plan_path) = plan_path else {
        eprintln!("{USAGE}");
        exit(2);
    };

    let plan = match Plan::load(Path::new(plan_path)) {
        Ok(p) => p,
        Err(e) => {
            log::error!("{e}");
            exit(1);
        }
    };

    let mut runner = Runner::from_config(config);
    for phase in phases {
        log::info!("Running {phase} phase");
        match runner.run_plan(&plan, phase) {
            Ok(summary) => log::info!(
                "{phase}: {} executed, {} succeeded, {} failed, {} skipped",
                summary.executed,
                summary.succeeded,
                summary.failed,
                summary.skipped
            ),
            Err(e) => {
                log::error!("{e}");
                exit(1);
            }
        }
    }
}

fn explain(config: &Config, args: &[String]) {
    let mut platform = Platform::host();
    let mut words = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--windows" if words.is_empty() => platform = Platform::Windows,
            "--unix" if words.is_empty() => platform = Platform::Unix,
            _ => words.push(arg.as_str()),
        }
    }
    if words.is_empty() {
        eprintln!("{USAGE}");
        exit(2);
    }

    let input = CommandInput::from_text(words.join(" "));
    let parsed = match parse::tokenize(&input) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("wsrun: malformed command: {e}");
            exit(1);
        }
    };
    let engine = ElevationEngine::from_config(config);
    let explanation = engine.explain(&parsed, platform);
    match serde_json::to_string_pretty(&explanation) {
        Ok(s) => println!("{s}"),
        Err(e) => {
            eprintln!("wsrun: {e}");
            exit(1);
        }
    }
}
