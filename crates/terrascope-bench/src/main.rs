use std::path::PathBuf;
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use terrascope_bench::report;
use terrascope_bench::runner::BenchmarkRunner;
use terrascope_bench::scenes;
use terrascope_core::SceneConfig;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut baseline_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut regression_threshold = 10.0f64;
    let mut frame_count = 600u32;
    let mut seed = 42u64;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => {
                eprintln!("Usage: bench-runner [OPTIONS]");
                eprintln!("  --baseline <path>              Load baseline JSON for comparison");
                eprintln!("  --output <path>                Save current results as JSON baseline");
                eprintln!("  --config <path>                Scene configuration RON (default: built-in)");
                eprintln!(
                    "  --regression-threshold <pct>   Regression threshold percentage (default: 10)"
                );
                eprintln!("  --frames <n>                   Frames per scene (default: 600)");
                eprintln!("  --seed <n>                     RNG seed (default: 42)");
                process::exit(0);
            }
            "--baseline" | "--output" | "--config" | "--regression-threshold" | "--frames"
            | "--seed" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    eprintln!("Missing value for {flag}");
                    process::exit(1);
                };
                match flag {
                    "--baseline" => baseline_path = Some(PathBuf::from(value)),
                    "--output" => output_path = Some(PathBuf::from(value)),
                    "--config" => config_path = Some(PathBuf::from(value)),
                    "--regression-threshold" => regression_threshold = parse_or_exit(flag, value),
                    "--frames" => frame_count = parse_or_exit(flag, value),
                    _ => seed = parse_or_exit(flag, value),
                }
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = match load_config(config_path.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {e}");
            process::exit(1);
        }
    };

    let runner = BenchmarkRunner::new(frame_count, seed, config);
    let results: Vec<_> = scenes::standard_scenes()
        .iter()
        .map(|scene| runner.run_scene(scene))
        .collect();

    // Print markdown summary
    println!("\n## Benchmark Results\n");
    println!("{}", report::format_markdown(&results));

    if let Some(ref path) = output_path {
        let baseline = report::Baseline {
            timestamp: timestamp(),
            results: results.clone(),
        };
        match report::save_baseline(path, &baseline) {
            Ok(()) => log::info!("Saved baseline to {}", path.display()),
            Err(e) => {
                eprintln!("ERROR: failed to save baseline {}: {e}", path.display());
                process::exit(1);
            }
        }
    }

    if let Some(ref path) = baseline_path {
        if let Some(baseline) = report::load_baseline(path) {
            let regressions = report::compare(&results, &baseline, regression_threshold);
            println!(
                "{}",
                report::format_comparison(&regressions, regression_threshold)
            );
            if !regressions.is_empty() {
                eprintln!(
                    "ERROR: {} regressions detected, exiting with code 1",
                    regressions.len()
                );
                process::exit(1);
            }
        } else {
            log::warn!("Baseline file not found: {}", path.display());
        }
    }

    log::info!("Benchmark complete.");
}

fn load_config(path: Option<&PathBuf>) -> Result<SceneConfig, String> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            SceneConfig::from_ron(&text).map_err(|e| e.to_string())
        }
        None => SceneConfig::builtin().map_err(|e| e.to_string()),
    }
}

fn parse_or_exit<T: std::str::FromStr>(flag: &str, value: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        eprintln!("Invalid {flag} value: {value}");
        process::exit(1);
    })
}

/// Seconds since the epoch; no date crate needed for a label.
fn timestamp() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("bench-{secs}")
}
