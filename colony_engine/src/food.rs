use crate::error::SimulationError;
use crate::geometry::Coord;
use crate::map::Grid;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A pile of food sitting in a cell. A pile is never left in a cell once it is empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Food {
    amount: u32,
}

impl Food {
    pub fn new(amount: u32) -> Food {
        Food { amount }
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }

    /// Removes a single unit, returning how many units were actually removed.
    pub(crate) fn take(&mut self) -> u32 {
        if self.amount == 0 {
            return 0;
        }
        self.amount -= 1;
        1
    }

    pub(crate) fn grow(&mut self, amount: u32, max: u32) -> u32 {
        let grown = amount.min(max.saturating_sub(self.amount));
        self.amount += grown;
        grown
    }
}

/// A spot the food system keeps replenishing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoodSource {
    pub x: f64,
    pub y: f64,
    /// Half-width of the square food is scattered over.
    pub radius: usize,
    /// Largest pile placed in a single cell.
    pub amount: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodConfig {
    pub sources: Vec<FoodSource>,
    /// Chance per tick that an existing pile grows.
    pub grow_chance: f64,
    pub grow_amount: u32,
    pub max_per_cell: u32,
    /// Food on the whole grid never grows past this.
    pub total_cap: u64,
    /// Sources are re-seeded every this many ticks. Zero disables re-seeding.
    pub regrow_interval: u64,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                FoodSource {
                    x: 40.0,
                    y: 40.0,
                    radius: 3,
                    amount: 10,
                },
                FoodSource {
                    x: 75.0,
                    y: 20.0,
                    radius: 2,
                    amount: 10,
                },
            ],
            grow_chance: 0.01,
            grow_amount: 1,
            max_per_cell: 10,
            total_cap: 5000,
            regrow_interval: 500,
        }
    }
}

impl FoodConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(0.0..=1.0).contains(&self.grow_chance) {
            return Err(SimulationError::InvalidConfig(
                "food grow_chance must be between 0 and 1",
            ));
        }
        if self.max_per_cell == 0 {
            return Err(SimulationError::InvalidConfig(
                "food max_per_cell must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Places and replenishes the food on a grid.
pub struct FoodSystem {
    config: FoodConfig,
}

impl FoodSystem {
    pub fn new(config: FoodConfig) -> FoodSystem {
        FoodSystem { config }
    }

    pub fn config(&self) -> &FoodConfig {
        &self.config
    }

    /// Places a new pile. Fails if the cell already has food or `amount` is zero.
    pub fn add_food(&self, grid: &mut Grid, coord: Coord, amount: u32) -> bool {
        grid.place_food(coord, amount)
    }

    /// Scatters piles over roughly half the cells around a source.
    /// Returns the number of units placed.
    pub fn add_cluster<R: Rng>(&self, grid: &mut Grid, rng: &mut R, source: &FoodSource) -> u64 {
        if source.amount == 0 {
            return 0;
        }

        let mut total = grid.total_food();
        let mut placed = 0;

        for index in grid.block(Coord::new(source.x, source.y), source.radius) {
            if total >= self.config.total_cap {
                break;
            }
            if !rng.gen_bool(0.5) {
                continue;
            }

            let room = (self.config.total_cap - total).min(u32::MAX as u64) as u32;
            let amount = rng.gen_range(1..=source.amount).min(room);
            if grid.place_food(grid.cell_coord(index), amount) {
                total += amount as u64;
                placed += amount as u64;
            }
        }

        placed
    }

    /// Seeds every configured source.
    pub fn seed<R: Rng>(&self, grid: &mut Grid, rng: &mut R) -> u64 {
        self.config
            .sources
            .iter()
            .map(|source| self.add_cluster(grid, rng, source))
            .sum()
    }

    /// Called once per tick: re-seeds the sources on schedule and lets existing piles
    /// grow, all without passing the configured caps. Returns the number of units added.
    pub fn grow_food<R: Rng>(&self, grid: &mut Grid, rng: &mut R, tick: u64) -> u64 {
        let mut added = 0;

        if self.config.regrow_interval > 0 && tick % self.config.regrow_interval == 0 {
            added += self.seed(grid, rng);
        }

        if self.config.grow_chance <= 0.0 || self.config.grow_amount == 0 {
            return added;
        }

        let mut total = grid.total_food();
        for index in grid.food_cells() {
            if total >= self.config.total_cap {
                break;
            }
            if !rng.gen_bool(self.config.grow_chance) {
                continue;
            }

            let room = (self.config.total_cap - total).min(u32::MAX as u64) as u32;
            let grown = grid.grow_food(
                index,
                self.config.grow_amount.min(room),
                self.config.max_per_cell,
            );
            total += grown as u64;
            added += grown as u64;
        }

        added
    }
}
