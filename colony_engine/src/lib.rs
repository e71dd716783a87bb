//! # colony_engine
//!
//! The core engine for an ant colony simulation on a wrap-around grid.
//! Queens wander off to found nests, each founding giving rise to a mutated species.
//! Workers bring food home along pheromone trails and soldiers fight other species.

pub mod ant;
pub mod config;
pub mod entities;
pub mod error;
pub mod food;
pub mod geometry;
pub mod map;
pub mod nest;
pub mod pheromone;
pub mod replay;
pub mod simulation;
pub mod snapshot;
pub mod species;

mod behaviour;

pub use ant::{Ant, Caste, QueenGoal, SoldierGoal, WorkerGoal};
pub use config::SimulationConfig;
pub use entities::{AgentType, AntId, NestId, PieceId, Rgb, SpeciesId};
pub use error::SimulationError;
pub use food::{FoodConfig, FoodSource};
pub use geometry::{Coord, Torus};
pub use map::{Layout, Occupant};
pub use nest::{Nest, PieceOutcome};
pub use simulation::Simulation;
pub use snapshot::{CellView, Snapshot};
pub use species::{Characteristic, ColorScheme, Species, Traits};
