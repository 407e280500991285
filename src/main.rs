use quadsim::{build_scenario, ScenarioConfig};
use quadsim::{bench_mutual_forces, bench_step_curve};

use clap::Parser;
use anyhow::Result;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, default_value = "rotating_ring.yaml")]
    file_name: String,

    /// Override the scenario's step count.
    #[arg(short = 'n')]
    steps: Option<u64>,

    /// Run the timing sweeps instead of a scenario.
    #[arg(long)]
    bench: bool,
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
    let args = Args::parse();

    if args.bench {
        bench_mutual_forces();
        bench_step_curve();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let steps = args.steps.or(scenario_cfg.steps).unwrap_or(1000);

    let mut sim = build_scenario(&scenario_cfg)?;

    println!(
        "N={}   field dimensions={:.2}x{:.2}   avgMass={:.2}",
        sim.body_count(),
        sim.bounds.x_max - sim.bounds.x_min,
        sim.bounds.y_max - sim.bounds.y_min,
        sim.system.total_mass() / sim.body_count() as f64,
    );
    println!(
        "G={}   epsilon={}   theta={}   dt={}",
        sim.params.G, sim.params.epsilon, sim.params.theta, sim.params.dt
    );

    for step in 1..=steps {
        sim.step(1);
        if step % 1000 == 0 {
            println!(
                "step {step}: theta={}   direct calc={}   tree calc={}   total calc={}   bodies removed={}   max depth={}",
                sim.params.theta,
                sim.step_stats.direct_evals,
                sim.step_stats.tree_evals,
                sim.step_stats.total(),
                sim.bodies_removed,
                sim.max_depth_seen(),
            );
        }
    }

    println!(
        "done: t={:.4}   bodies={}   total mass={:.4}   bodies removed={}",
        sim.system.t,
        sim.body_count(),
        sim.system.total_mass(),
        sim.bodies_removed,
    );

    Ok(())
}
