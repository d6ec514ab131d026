use ppsim::{Scenario, ScenarioConfig};

use anyhow::Result;
use clap::Parser;
use tracing::info;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, default_value = "demo.yaml")]
    file_name: String,

    #[arg(short, long, default_value_t = 300)]
    ticks: usize,

    #[arg(short, long, default_value_t = 30)]
    report_every: usize,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(file_name);
    let file = File::open(&config_path)?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let mut scenario = Scenario::build_scenario(scenario_cfg)?;

    for (i, group) in scenario.groups.iter().enumerate() {
        info!(
            group = i,
            particles = group.count(),
            total_mass = group.total_mass(),
            "group ready"
        );
    }

    for tick in 1..=args.ticks {
        scenario.advance();

        if args.report_every > 0 && tick % args.report_every == 0 {
            for (i, group) in scenario.groups.iter().enumerate() {
                let bbox = group.bounding_box();
                let report = group.last_report();
                info!(
                    tick,
                    group = i,
                    passes = report.passes,
                    resolutions = report.resolutions,
                    deferred = report.deferred,
                    bbox = %format!("{:.1}x{:.1}+{:.1}+{:.1}", bbox.w, bbox.h, bbox.x, bbox.y),
                    "tick"
                );
            }
        }
    }

    for (i, group) in scenario.groups.iter().enumerate() {
        info!(
            group = i,
            particles = group.count(),
            average_mass = group.average_mass(),
            "done"
        );
    }

    Ok(())
}
