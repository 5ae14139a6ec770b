use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, trace, warn};
use std::path::PathBuf;
use std::time::Instant;

use vicsek_common::SimulationConfig;
use vicsek_engine::metrics::order_parameter;
use vicsek_engine::output::{save_final_state, save_snapshots, SnapshotFormat};
use vicsek_engine::VicsekSimulation;

/// Command-line arguments for the simulation driver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the number of frames (steps) to simulate
    #[arg(long)]
    frames: Option<u32>,

    /// Override the seed used for placement and noise
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();
    let args = Args::parse();

    info!("Starting Vicsek Engine...");

    // --- Load Configuration ---
    let mut config = SimulationConfig::load(&args.config)?;
    if let Some(frames) = args.frames {
        config.timing.frames = frames;
    }
    if let Some(seed) = args.seed {
        config.initial_conditions.seed = seed;
    }

    if config.execution.parallel {
        info!("Using {} Rayon threads.", rayon::current_num_threads());
    }

    // --- Initialize Simulation ---
    info!("Placing initial swarm...");
    let mut sim = VicsekSimulation::new(config).context("Failed to initialize simulation")?;
    debug!("Domain: {:#?}", sim.domain());

    let total_steps = sim.config().timing.frames;
    let record_interval_steps = sim.config().timing.record_interval_steps.max(1);
    let timestep = sim.domain().timestep();
    info!(
        "Recording snapshot every {} steps ({:.2} time units).",
        record_interval_steps,
        record_interval_steps as f64 * timestep
    );

    // --- Initial Snapshot (tick = 0) ---
    info!("Recording initial snapshot (t=0)...");
    sim.record_snapshot();

    info!("Starting simulation loop for {} steps...", total_steps);
    let start_time = Instant::now();
    let mut previous_print_time = start_time;
    let print_interval_secs = 5.0;

    for step in 0..total_steps {
        let step_start_time = Instant::now();
        sim.step();
        let step_duration = step_start_time.elapsed();

        let current_time = Instant::now();
        let should_print_status =
            current_time.duration_since(previous_print_time).as_secs_f64() >= print_interval_secs;
        let is_record_step = (step + 1) % record_interval_steps == 0;
        let is_last_step = step + 1 == total_steps;

        if should_print_status || is_record_step || is_last_step {
            info!(
                "Step [{}/{}] (t = {:.2}) | Order: {:.3} | Step Time: {:6.2} ms | Elapsed: {:.2} s",
                step + 1,
                total_steps,
                sim.tick() as f64 * timestep,
                order_parameter(sim.state()),
                step_duration.as_secs_f64() * 1000.0,
                start_time.elapsed().as_secs_f64()
            );
            previous_print_time = current_time;

            if is_record_step || is_last_step {
                sim.record_snapshot();
            }
        } else {
            trace!(
                "Step [{}/{}] completed in {:.2} ms",
                step + 1,
                total_steps,
                step_duration.as_secs_f64() * 1000.0
            );
        }
    }

    let total_duration = start_time.elapsed();
    info!("Simulation finished in {:.3} seconds.", total_duration.as_secs_f64());

    if let Some(last) = sim.recorded_snapshots().last() {
        if last.particles_in_obstacle > 0 {
            warn!(
                "{} particles ended inside the obstacle (wrapped in across the box edge).",
                last.particles_in_obstacle
            );
        }
    }

    // --- Save Recorded Data ---
    let output = sim.config().output.clone();
    if output.save_snapshots {
        let format = SnapshotFormat::from_config(output.format.as_deref());
        save_snapshots(&output.base_filename, sim.recorded_snapshots(), format)?;
    } else {
        info!("Skipping saving snapshots as per config (save_snapshots is false).");
    }

    if output.save_final_state {
        let filename = format!("{}_final_state.csv", output.base_filename);
        save_final_state(&filename, sim.state())?;
    } else {
        info!("Skipping saving final state as per config.");
    }

    info!("Simulation Complete.");
    Ok(())
}
