use crate::error::SimulationError;
use crate::food::FoodConfig;
use crate::species::Traits;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Everything needed to build a simulation. Missing fields in JSON take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of columns of the grid.
    pub width: usize,
    /// Number of rows of the grid.
    pub height: usize,
    /// Seed for every random decision made by the simulation.
    pub seed: u64,
    /// Queens placed at random when an environment is created without a layout.
    pub starting_queens: usize,
    pub queen_health: f64,
    pub worker_health: f64,
    pub soldier_health: f64,
    /// Hunger of a newly spawned ant.
    pub hunger_start: f64,
    pub hunger_max: f64,
    /// Below this hunger an ant stops what it is doing to eat.
    pub hunger_threshold: f64,
    /// Hunger restored by one unit of food.
    pub food_hunger_ratio: f64,
    /// Ticks an ant sleeps after taking a unit of food.
    pub food_take_delay: u32,
    /// Half-width of the square of pieces laid down when a nest is founded.
    pub nest_radius: usize,
    /// Food a nest spends to raise a worker or a soldier.
    pub brood_cost: u32,
    /// Food a nest spends to raise a queen.
    pub queen_cost: u32,
    /// How far a soldier strays from its nest before heading back.
    pub patrol_radius: f64,
    /// How close a soldier must be to strike.
    pub strike_range: f64,
    /// Concentration every pheromone marker loses per tick.
    pub pheromone_decay: f64,
    /// Largest random turn an ant without a target makes per tick.
    pub wander_angle: f64,
    pub food: FoodConfig,
    /// Number of most recent ticks a replay keeps in memory. `None` keeps the whole run.
    pub replay_window: Option<usize>,
    /// Traits of the species created with the environment.
    pub default_traits: Traits,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            seed: 0,
            starting_queens: 3,
            queen_health: 3000.0,
            worker_health: 100.0,
            soldier_health: 200.0,
            hunger_start: 10.0,
            hunger_max: 20.0,
            hunger_threshold: 3.0,
            food_hunger_ratio: 2.0,
            food_take_delay: 0,
            nest_radius: 1,
            brood_cost: 5,
            queen_cost: 30,
            patrol_radius: 8.0,
            strike_range: 1.5,
            pheromone_decay: 0.005,
            wander_angle: 0.5,
            food: FoodConfig::default(),
            replay_window: None,
            default_traits: Traits::default(),
        }
    }
}

impl SimulationConfig {
    /// Parses a JSON document and validates the result.
    pub fn from_json(json: &str) -> Result<SimulationConfig, SimulationError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.width == 0 || self.height == 0 {
            return Err(SimulationError::InvalidConfig(
                "width and height must be non-zero",
            ));
        }
        if !(self.hunger_max > 0.0) {
            return Err(SimulationError::InvalidConfig("hunger_max must be positive"));
        }
        if !(0.0..=self.hunger_max).contains(&self.hunger_start) {
            return Err(SimulationError::InvalidConfig(
                "hunger_start must be between 0 and hunger_max",
            ));
        }
        if !(0.0..=self.hunger_max).contains(&self.hunger_threshold) {
            return Err(SimulationError::InvalidConfig(
                "hunger_threshold must be between 0 and hunger_max",
            ));
        }
        if !(self.food_hunger_ratio >= 0.0) {
            return Err(SimulationError::InvalidConfig(
                "food_hunger_ratio must not be negative",
            ));
        }
        if [self.queen_health, self.worker_health, self.soldier_health]
            .iter()
            .any(|health| !(*health > 0.0))
        {
            return Err(SimulationError::InvalidConfig("health must be positive"));
        }
        if self.brood_cost == 0 || self.queen_cost == 0 {
            return Err(SimulationError::InvalidConfig(
                "brood_cost and queen_cost must be non-zero",
            ));
        }
        if !(self.pheromone_decay >= 0.0) {
            return Err(SimulationError::InvalidConfig(
                "pheromone_decay must not be negative",
            ));
        }
        if !(0.0..=TAU).contains(&self.wander_angle) {
            return Err(SimulationError::InvalidConfig(
                "wander_angle must be between 0 and 2PI",
            ));
        }
        let span = self.width.max(self.height);
        if self.nest_radius > span
            || self.food.sources.iter().any(|source| source.radius > span)
        {
            return Err(SimulationError::InvalidConfig(
                "nest and food source radii must not exceed the grid",
            ));
        }
        if self.replay_window == Some(0) {
            return Err(SimulationError::InvalidConfig(
                "replay_window must be non-zero",
            ));
        }
        if !(self.patrol_radius >= 0.0) || !(self.strike_range >= 0.0) {
            return Err(SimulationError::InvalidConfig(
                "patrol_radius and strike_range must not be negative",
            ));
        }
        self.default_traits.validate()?;
        self.food.validate()
    }
}
