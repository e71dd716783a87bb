use colony_engine::{Layout, Simulation, SimulationConfig, SimulationError};
use std::fs;
use std::path::Path;

const TICKS: u64 = 2000;

fn main() -> Result<(), SimulationError> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let layout_file =
        Path::new(env!("CARGO_MANIFEST_DIR")).join("examples/layouts/tutorial.layout");
    let layout = Layout::parse(&fs::read_to_string(layout_file)?)?;

    let config = SimulationConfig {
        seed: 7,
        ..SimulationConfig::default()
    };
    let replay_filename = "/tmp/colony_tutorial_replay.json".to_string();

    let mut simulation = Simulation::from_layout(layout, config, Some(replay_filename))?;
    simulation.create_environment()?;
    simulation.set_running(true);

    while simulation.tick() < TICKS && simulation.advance_one_tick() {
        if simulation.ants().next().is_none() {
            break;
        }
    }

    println!("Finished after {} ticks", simulation.tick());
    for population in simulation.populations() {
        println!(
            "{}: {} ants, {} nests",
            population.species, population.ants, population.nests
        );
    }

    simulation.save_replay()
}
