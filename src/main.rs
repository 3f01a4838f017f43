use spheresim::{ScenarioConfig, Scenario};
use spheresim::run_3d;
use spheresim::{bench_collide, bench_collide_curve};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Colliding spheres in a force-directed layout")]
struct Args {
    /// Scenario file, looked up as given and then under `scenarios/`
    #[arg(short, default_value = "sphere_collision.yaml")]
    file_name: String,

    /// Run this many steps without a window and log a summary
    #[arg(long)]
    headless: Option<u64>,

    /// Time octree vs. direct collision passes (CSV curve with --curve)
    #[arg(long)]
    bench: bool,

    /// With --bench: print the fine-grained CSV curve
    #[arg(long, requires = "bench")]
    curve: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let given = PathBuf::from(file_name);
    let config_path = if given.exists() {
        given
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };

    ScenarioConfig::load(&config_path)
        .with_context(|| format!("failed to load scenario {}", config_path.display()))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.bench {
        init_tracing();
        if args.curve {
            bench_collide_curve();
        } else {
            bench_collide();
        }
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;

    if let Some(steps) = args.headless {
        init_tracing();
        let mut scenario = Scenario::build_scenario(scenario_cfg)?;
        scenario.run(steps);

        let sys = &scenario.system;
        info!(
            frames = sys.frame,
            alpha = scenario.layout.alpha(),
            overlapping = sys.overlapping_pairs(),
            min_separation = sys.min_separation_ratio(),
            finite = sys.is_finite(),
            "headless run finished"
        );
        return Ok(());
    }

    // The viewer installs its own subscriber through Bevy's LogPlugin
    let scenario = Scenario::build_scenario(scenario_cfg)?;
    run_3d(scenario);

    Ok(())
}
