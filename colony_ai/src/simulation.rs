use colony_engine::{
    AgentType, CellView, Characteristic, Layout, Simulation as Engine, SimulationConfig,
    SimulationError, SpeciesId,
};
use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

/// The ant colony simulation.
/// Main entry point for driving the simulation from Python.
#[pyclass(module = "colony_ai")]
pub struct Simulation {
    engine: Engine,
}

/// What a single cell shows at the end of a tick.
#[derive(Clone, Debug, PartialEq)]
#[pyclass(name = "Cell", module = "colony_ai", get_all)]
pub struct CellState {
    /// The column of the cell.
    pub x: usize,
    /// The row of the cell.
    pub y: usize,
    /// One of `empty`, `queen`, `worker`, `soldier`, `nest_piece`, `pheromone` or `food`.
    pub kind: String,
    /// The exact position of the agent shown, if any.
    pub position: Option<(f64, f64)>,
    /// The facing of the agent shown in radians clockwise from up, if any.
    pub facing: Option<f64>,
    /// The colour to draw the cell with. `None` for empty cells and food.
    pub color: Option<(u8, u8, u8)>,
    /// The concentration of the pheromone shown, if any.
    pub concentration: Option<f64>,
    /// The amount of food shown, if any.
    pub amount: Option<u32>,
}

impl CellState {
    fn new(x: usize, y: usize, view: &CellView) -> CellState {
        let mut cell = CellState {
            x,
            y,
            kind: "empty".to_string(),
            position: None,
            facing: None,
            color: None,
            concentration: None,
            amount: None,
        };

        match view {
            CellView::Empty => {}
            CellView::Agent {
                kind,
                position,
                facing,
                color,
            } => {
                cell.kind = kind_name(*kind).to_string();
                cell.position = Some((position.x, position.y));
                cell.facing = Some(*facing);
                cell.color = Some((color.r, color.g, color.b));
            }
            CellView::Pheromone {
                concentration,
                color,
            } => {
                cell.kind = "pheromone".to_string();
                cell.concentration = Some(*concentration);
                cell.color = Some((color.r, color.g, color.b));
            }
            CellView::Food { amount } => {
                cell.kind = "food".to_string();
                cell.amount = Some(*amount);
            }
        }

        cell
    }
}

#[pymethods]
impl Simulation {
    /// Creates a new simulation with a random environment.
    ///
    /// # Arguments
    /// * `width` - The number of columns of the grid.
    /// * `height` - The number of rows of the grid.
    /// * `seed` - The seed for the random number generator.
    /// * `starting_queens` - The number of queens placed when the environment is created.
    /// * `replay_filename` - The file to save the replay to. If `None`, none is saved.
    #[new]
    #[pyo3(signature = (width, height, seed, starting_queens, replay_filename=None))]
    pub fn new(
        width: usize,
        height: usize,
        seed: u64,
        starting_queens: usize,
        replay_filename: Option<String>,
    ) -> PyResult<Simulation> {
        let config = SimulationConfig {
            width,
            height,
            seed,
            starting_queens,
            ..SimulationConfig::default()
        };

        Ok(Simulation {
            engine: Engine::new(config, replay_filename).map_err(to_py_err)?,
        })
    }

    /// Creates a new simulation whose environment comes from a text layout.
    ///
    /// # Arguments
    /// * `layout` - The layout as a string.
    /// * `seed` - The seed for the random number generator.
    /// * `replay_filename` - The file to save the replay to. If `None`, none is saved.
    #[staticmethod]
    #[pyo3(signature = (layout, seed, replay_filename=None))]
    pub fn from_layout(
        layout: &str,
        seed: u64,
        replay_filename: Option<String>,
    ) -> PyResult<Simulation> {
        let layout = Layout::parse(layout).map_err(to_py_err)?;
        let config = SimulationConfig {
            seed,
            ..SimulationConfig::default()
        };

        Ok(Simulation {
            engine: Engine::from_layout(layout, config, replay_filename).map_err(to_py_err)?,
        })
    }

    /// Resets and reseeds the whole world. The simulation is left paused.
    ///
    /// # Arguments
    /// * `seed` - A new seed for the world. If `None`, the current seed is reused and the
    ///   same world is rebuilt.
    #[pyo3(signature = (seed=None))]
    pub fn create_environment(&mut self, seed: Option<u64>) -> PyResult<()> {
        match seed {
            Some(seed) => self.engine.reseed(seed),
            None => self.engine.create_environment(),
        }
        .map_err(to_py_err)
    }

    /// Advances exactly one tick.
    pub fn step(&mut self) {
        self.engine.step();
    }

    pub fn set_running(&mut self, running: bool) {
        self.engine.set_running(running);
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    /// Advances one tick if the simulation is running. Returns whether it did.
    pub fn advance_one_tick(&mut self) -> bool {
        self.engine.advance_one_tick()
    }

    #[getter]
    pub fn tick(&self) -> u64 {
        self.engine.tick()
    }

    /// The species created with the environment.
    pub fn founding_species(&self) -> Option<u64> {
        self.engine.founding_species().map(|species| species.0)
    }

    /// `(species, ants, nests)` for every species still alive.
    pub fn populations(&self) -> Vec<(u64, usize, usize)> {
        self.engine
            .populations()
            .into_iter()
            .map(|population| (population.species.0, population.ants, population.nests))
            .collect()
    }

    /// What every cell shows, row by row from the top-left.
    pub fn snapshot(&self) -> Vec<CellState> {
        let snapshot = self.engine.snapshot();
        snapshot
            .cells
            .iter()
            .enumerate()
            .map(|(index, view)| {
                CellState::new(index % snapshot.width, index / snapshot.width, view)
            })
            .collect()
    }

    /// Edits a trait of a species. Out-of-range values are clamped.
    ///
    /// # Arguments
    /// * `species` - The id of the species.
    /// * `name` - The name of the trait, e.g. `speed` or `queen_steps_max`.
    /// * `value` - The new value.
    ///
    /// Returns the value actually applied.
    pub fn set_trait(&mut self, species: u64, name: &str, value: f64) -> PyResult<f64> {
        let characteristic = Characteristic::from_name(name)
            .ok_or_else(|| PyValueError::new_err(format!("unknown trait `{name}`")))?;
        self.engine
            .set_species_trait(SpeciesId(species), characteristic, value)
            .map_err(to_py_err)
    }

    /// Reads a trait of a species.
    pub fn get_trait(&self, species: u64, name: &str) -> PyResult<f64> {
        let characteristic = Characteristic::from_name(name)
            .ok_or_else(|| PyValueError::new_err(format!("unknown trait `{name}`")))?;
        let traits = self
            .engine
            .species_traits(SpeciesId(species))
            .map_err(to_py_err)?;
        Ok(traits.get(characteristic))
    }

    pub fn save_replay(&self) -> PyResult<()> {
        self.engine.save_replay().map_err(to_py_err)
    }

    /// Draws the world to the console.
    pub fn draw(&self) -> PyResult<()> {
        self.engine
            .snapshot()
            .draw()
            .map_err(|error| PyIOError::new_err(error.to_string()))
    }
}

fn kind_name(kind: AgentType) -> &'static str {
    match kind {
        AgentType::Queen => "queen",
        AgentType::Worker => "worker",
        AgentType::Soldier => "soldier",
        AgentType::NestPiece => "nest_piece",
    }
}

fn to_py_err(error: SimulationError) -> PyErr {
    match error {
        SimulationError::Io(error) => PyIOError::new_err(error.to_string()),
        error => PyValueError::new_err(error.to_string()),
    }
}
