use crate::entities::{AntId, NestId, PieceId, SpeciesId};
use crate::error::SimulationError;
use crate::food::Food;
use crate::geometry::{within_arc, Coord, Torus};
use crate::pheromone::Pheromone;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Something that stands in a cell: a live ant or a piece of a nest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Occupant {
    Ant(AntId),
    NestPiece { nest: NestId, piece: PieceId },
}

/// A single location on the grid.
#[derive(Clone, Debug, Default)]
pub struct Cell {
    occupants: Vec<Occupant>,
    food: Option<Food>,
    pheromones: Vec<Pheromone>,
}

impl Cell {
    /// Occupants in order of arrival.
    pub fn occupants(&self) -> &[Occupant] {
        &self.occupants
    }

    pub fn food(&self) -> Option<&Food> {
        self.food.as_ref()
    }

    pub fn pheromones(&self) -> &[Pheromone] {
        &self.pheromones
    }

    pub fn pheromone(&self, species: SpeciesId) -> Option<&Pheromone> {
        self.pheromones
            .iter()
            .find(|pheromone| pheromone.species() == species)
    }
}

/// The wrap-around grid of cells.
///
/// All occupancy changes go through [`Grid::insert`] and [`Grid::remove`], which keep
/// every occupant in exactly one cell.
pub struct Grid {
    torus: Torus,
    cells: Vec<Cell>,
    locations: HashMap<Occupant, usize>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Grid {
        let mut cells = Vec::with_capacity(width * height);
        cells.resize_with(width * height, Cell::default);

        Grid {
            torus: Torus::new(width, height),
            cells,
            locations: HashMap::new(),
        }
    }

    pub fn torus(&self) -> Torus {
        self.torus
    }

    pub fn width(&self) -> usize {
        self.torus.width()
    }

    pub fn height(&self) -> usize {
        self.torus.height()
    }

    /// The linear index of the cell a coordinate lies in. Any coordinate is accepted.
    pub fn cell_index(&self, coord: Coord) -> usize {
        let (x, y) = self.torus.cell_of(coord);
        y * self.width() + x
    }

    /// The centre of the cell at `index`.
    pub fn cell_coord(&self, index: usize) -> Coord {
        debug_assert!(index < self.cells.len(), "cell index {} out of range", index);
        Coord::new((index % self.width()) as f64, (index / self.width()) as f64)
    }

    pub fn cell(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub fn cell_at(&self, coord: Coord) -> &Cell {
        &self.cells[self.cell_index(coord)]
    }

    pub fn cells(&self) -> impl Iterator<Item = (usize, &Cell)> {
        self.cells.iter().enumerate()
    }

    /// Places an occupant in the cell containing `coord`, moving it out of any cell it
    /// was in before. Returns the index of the cell.
    pub fn insert(&mut self, occupant: Occupant, coord: Coord) -> usize {
        let index = self.cell_index(coord);
        if let Some(previous) = self.locations.insert(occupant, index) {
            self.cells[previous]
                .occupants
                .retain(|other| *other != occupant);
        }
        self.cells[index].occupants.push(occupant);
        index
    }

    /// Takes an occupant off the grid. Returns the cell it was in, if any.
    pub fn remove(&mut self, occupant: Occupant) -> Option<usize> {
        let index = self.locations.remove(&occupant)?;
        self.cells[index]
            .occupants
            .retain(|other| *other != occupant);
        Some(index)
    }

    pub fn location(&self, occupant: Occupant) -> Option<usize> {
        self.locations.get(&occupant).copied()
    }

    pub fn contains(&self, occupant: Occupant) -> bool {
        self.locations.contains_key(&occupant)
    }

    /// Puts food in the cell containing `coord`. Nothing happens if the cell already has
    /// food or `amount` is zero.
    pub fn place_food(&mut self, coord: Coord, amount: u32) -> bool {
        let index = self.cell_index(coord);
        let cell = &mut self.cells[index];
        if cell.food.is_some() || amount == 0 {
            return false;
        }
        cell.food = Some(Food::new(amount));
        true
    }

    /// Takes a single unit of food from a cell, evicting the food once it runs out.
    /// Returns the number of units taken.
    pub fn take_food(&mut self, index: usize) -> u32 {
        let cell = &mut self.cells[index];
        let Some(food) = cell.food.as_mut() else {
            return 0;
        };

        let taken = food.take();
        if food.is_empty() {
            cell.food = None;
        }
        taken
    }

    /// Adds up to `amount` units to existing food without passing `max`.
    /// Returns the number of units added.
    pub fn grow_food(&mut self, index: usize, amount: u32, max: u32) -> u32 {
        match self.cells[index].food.as_mut() {
            Some(food) => food.grow(amount, max),
            None => 0,
        }
    }

    /// Indices of every cell holding food.
    pub fn food_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| cell.food.as_ref().map(|_| index))
            .collect()
    }

    pub fn total_food(&self) -> u64 {
        self.cells
            .iter()
            .filter_map(|cell| cell.food.as_ref())
            .map(|food| food.amount() as u64)
            .sum()
    }

    /// Adds pheromone of `species` to the cell containing `coord`, creating the marker if
    /// the species has none there. Returns the resulting concentration.
    pub fn deposit(
        &mut self,
        coord: Coord,
        species: SpeciesId,
        amount: f64,
        contributor: AntId,
    ) -> f64 {
        let index = self.cell_index(coord);
        let pheromones = &mut self.cells[index].pheromones;

        if let Some(pheromone) = pheromones
            .iter_mut()
            .find(|pheromone| pheromone.species() == species)
        {
            pheromone.strengthen(amount, contributor);
            return pheromone.concentration();
        }

        let pheromone = Pheromone::new(species, amount, contributor);
        let concentration = pheromone.concentration();
        if !pheromone.is_spent() {
            pheromones.push(pheromone);
        }
        concentration
    }

    /// Ages every marker by `rate` and removes the ones that evaporated.
    /// Returns the number of markers removed.
    pub fn decay_pheromones(&mut self, rate: f64) -> usize {
        let mut removed = 0;
        for cell in self.cells.iter_mut() {
            let before = cell.pheromones.len();
            cell.pheromones.retain_mut(|pheromone| !pheromone.decay(rate));
            removed += before - cell.pheromones.len();
        }
        removed
    }

    /// Cells whose centre is within `radius` of the cell containing `origin` and whose
    /// bearing lies within `angle / 2` of `facing`. The origin cell is always included.
    ///
    /// Cells are returned in scan order (row by row from the top-left of the bounding
    /// square), each at most once even when the square wraps onto itself.
    pub fn cone_of_view(&self, origin: Coord, radius: f64, facing: f64, angle: f64) -> Vec<usize> {
        self.sector(origin, radius, |bearing| within_arc(bearing, facing, angle))
    }

    /// Cells whose centre is within `radius` of the cell containing `origin`.
    pub fn within_radius(&self, origin: Coord, radius: f64) -> Vec<usize> {
        self.sector(origin, radius, |_| true)
    }

    /// The square of cells `half` cells either side of the cell containing `centre`.
    /// A square wider than the grid covers each cell once.
    pub fn block(&self, centre: Coord, half: usize) -> Vec<usize> {
        let (cx, cy) = self.torus.cell_of(centre);
        let half_x = half.min(self.width() / 2) as i64;
        let half_y = half.min(self.height() / 2) as i64;
        let mut seen = HashSet::new();
        let mut block = Vec::new();

        for dy in -half_y..=half_y {
            for dx in -half_x..=half_x {
                let (x, y) = self.torus.wrap_cell(cx as i64 + dx, cy as i64 + dy);
                let index = y * self.width() + x;
                if seen.insert(index) {
                    block.push(index);
                }
            }
        }

        block
    }

    fn sector(&self, origin: Coord, radius: f64, in_arc: impl Fn(f64) -> bool) -> Vec<usize> {
        if !(radius >= 0.0) {
            return Vec::new();
        }

        let (cx, cy) = self.torus.cell_of(origin);
        let centre = Coord::new(cx as f64, cy as f64);
        let reach = radius.ceil() as i64;
        let mut seen = HashSet::new();
        let mut sector = Vec::new();

        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let (x, y) = self.torus.wrap_cell(cx as i64 + dx, cy as i64 + dy);
                let index = y * self.width() + x;
                // Distance and bearing depend on the cell only, so the first visit decides
                if !seen.insert(index) {
                    continue;
                }

                let cell = Coord::new(x as f64, y as f64);
                let distance = self.torus.distance(centre, cell);
                if distance > radius {
                    continue;
                }
                if distance > 0.0 && !in_arc(self.torus.direction_to(centre, cell)) {
                    continue;
                }

                sector.push(index);
            }
        }

        sector
    }
}

/// A hand-written starting position.
///
/// ```text
/// rows 3
/// cols 4
/// m .Q..
/// m ..*.
/// m ...5
/// ```
///
/// `.` is an empty cell, `Q` a founding queen, `*` food with the default amount and `1`-`9`
/// food with that many units.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub width: usize,
    pub height: usize,
    /// Queen positions as `(x, y)`.
    pub queens: Vec<(usize, usize)>,
    /// Food as `(x, y, amount)`, where `None` means the default amount.
    pub food: Vec<(usize, usize, Option<u32>)>,
}

impl Layout {
    pub fn parse(contents: &str) -> Result<Layout, SimulationError> {
        let header = Regex::new(r"rows (\d+)\s+cols (\d+)")
            .map_err(|e| SimulationError::Layout(e.to_string()))?;
        let metadata = header
            .captures(contents)
            .ok_or_else(|| SimulationError::Layout("missing `rows`/`cols` header".to_string()))?;

        let height = parse_dimension(metadata.get(1).map(|m| m.as_str()))?;
        let width = parse_dimension(metadata.get(2).map(|m| m.as_str()))?;

        let row_pattern =
            Regex::new(r"m (.*)").map_err(|e| SimulationError::Layout(e.to_string()))?;
        let rows: Vec<&str> = row_pattern
            .captures_iter(contents)
            .filter_map(|captures| captures.get(1))
            .map(|row| row.as_str().trim())
            .collect();

        if rows.len() != height {
            return Err(SimulationError::Layout(format!(
                "expected {} rows but found {}",
                height,
                rows.len()
            )));
        }

        let mut layout = Layout {
            width,
            height,
            queens: Vec::new(),
            food: Vec::new(),
        };

        for (y, line) in rows.iter().enumerate() {
            if line.chars().count() != width {
                return Err(SimulationError::Layout(format!(
                    "row {} has {} cells instead of {}",
                    y,
                    line.chars().count(),
                    width
                )));
            }

            for (x, value) in line.chars().enumerate() {
                match value {
                    '.' => {}
                    'Q' => layout.queens.push((x, y)),
                    '*' => layout.food.push((x, y, None)),
                    '1'..='9' => layout.food.push((x, y, value.to_digit(10))),
                    _ => {
                        return Err(SimulationError::Layout(format!(
                            "invalid character `{}` at ({}, {})",
                            value, x, y
                        )))
                    }
                }
            }
        }

        Ok(layout)
    }
}

fn parse_dimension(value: Option<&str>) -> Result<usize, SimulationError> {
    let dimension: usize = value
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| SimulationError::Layout("invalid dimension".to_string()))?;
    if dimension == 0 {
        return Err(SimulationError::Layout(
            "dimensions must be non-zero".to_string(),
        ));
    }
    Ok(dimension)
}
