use colony_engine::{Simulation, SimulationConfig, SimulationError};
use std::thread;
use std::time::Duration;

fn main() -> Result<(), SimulationError> {
    let config = SimulationConfig {
        width: 80,
        height: 40,
        seed: 3,
        ..SimulationConfig::default()
    };

    let mut simulation = Simulation::new(config, None)?;
    simulation.create_environment()?;
    simulation.set_running(true);

    while simulation.tick() < 500 && simulation.advance_one_tick() {
        simulation.snapshot().draw()?;
        thread::sleep(Duration::from_millis(50));
    }

    Ok(())
}
