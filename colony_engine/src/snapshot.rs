use crate::entities::{AgentType, Rgb};
use crate::error::SimulationError;
use crate::geometry::Coord;
use crate::map::Occupant;
use crate::replay::Population;
use crate::simulation::Simulation;
use crossterm::cursor::Hide;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use serde::Serialize;
use std::io::{self, stdout, Write};

const FOOD_COLOR: Rgb = Rgb::from_hex(0xC8102E);

/// What a renderer should show for one cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellView {
    Empty,
    /// The first occupant of the cell.
    Agent {
        kind: AgentType,
        position: Coord,
        facing: f64,
        color: Rgb,
    },
    /// The strongest marker in a cell nobody stands in.
    Pheromone { concentration: f64, color: Rgb },
    Food { amount: u32 },
}

impl CellView {
    fn char(&self) -> char {
        match self {
            CellView::Empty => '.',
            CellView::Agent { kind, .. } => kind.char(),
            CellView::Pheromone { .. } => '~',
            CellView::Food { .. } => '*',
        }
    }

    fn color(&self) -> Color {
        match self {
            CellView::Empty => Color::Reset,
            CellView::Agent { color, .. } | CellView::Pheromone { color, .. } => (*color).into(),
            CellView::Food { .. } => FOOD_COLOR.into(),
        }
    }
}

/// A read-only picture of the world at the end of a tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub width: usize,
    pub height: usize,
    pub tick: u64,
    pub populations: Vec<Population>,
    /// Cells row by row from the top-left.
    pub cells: Vec<CellView>,
}

impl Snapshot {
    pub fn get(&self, x: usize, y: usize) -> Option<&CellView> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x)
    }

    pub fn to_json(&self) -> Result<String, SimulationError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Draws the snapshot to the console.
    pub fn draw(&self) -> io::Result<()> {
        let mut stdout = stdout();
        queue!(stdout, Clear(ClearType::All), Hide)?;
        self.draw_to(&mut stdout)
    }

    pub fn draw_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        queue!(out, Print("Tick: "), Print(self.tick.to_string()))?;

        for population in &self.populations {
            queue!(
                out,
                Print("\n"),
                Print(population.species.to_string()),
                Print(": Ants = "),
                Print(population.ants.to_string()),
                Print(", Nests = "),
                Print(population.nests.to_string())
            )?;
        }
        queue!(out, Print("\n\n"))?;

        for row in self.cells.chunks(self.width.max(1)) {
            for cell in row {
                queue!(
                    out,
                    SetForegroundColor(cell.color()),
                    Print(cell.char()),
                    ResetColor
                )?;
            }
            queue!(out, Print("\n"))?;
        }

        out.flush()
    }
}

impl Simulation {
    /// Captures what every cell currently shows.
    pub fn snapshot(&self) -> Snapshot {
        let cells = self
            .grid
            .cells()
            .map(|(_, cell)| {
                if let Some(view) = cell
                    .occupants()
                    .first()
                    .and_then(|occupant| self.view_of(*occupant))
                {
                    return view;
                }

                let strongest = cell.pheromones().iter().max_by(|a, b| {
                    a.concentration().total_cmp(&b.concentration())
                });
                if let Some(pheromone) = strongest {
                    return CellView::Pheromone {
                        concentration: pheromone.concentration(),
                        color: self
                            .species(pheromone.species())
                            .map(|species| species.colors().pheromone)
                            .unwrap_or_default(),
                    };
                }

                match cell.food() {
                    Some(food) => CellView::Food {
                        amount: food.amount(),
                    },
                    None => CellView::Empty,
                }
            })
            .collect();

        Snapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            tick: self.tick,
            populations: self.populations(),
            cells,
        }
    }

    fn view_of(&self, occupant: Occupant) -> Option<CellView> {
        match occupant {
            Occupant::Ant(id) => {
                let ant = self.ant(id)?;
                let color = self.species(ant.species())?.colors().for_kind(ant.kind());
                Some(CellView::Agent {
                    kind: ant.kind(),
                    position: ant.position(),
                    facing: ant.facing(),
                    color,
                })
            }
            Occupant::NestPiece { nest, piece } => {
                let nest = self.nest(nest)?;
                let piece = nest.piece(piece)?;
                let color = self.species(nest.species())?.colors().nest;
                Some(CellView::Agent {
                    kind: AgentType::NestPiece,
                    position: piece.position(),
                    facing: 0.0,
                    color,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::entities::{AntId, SpeciesId};
    use crate::food::FoodConfig;
    use crate::species::{ColorScheme, Traits};

    fn empty() -> Simulation {
        let config = SimulationConfig {
            width: 6,
            height: 4,
            nest_radius: 0,
            food: FoodConfig {
                sources: vec![],
                grow_chance: 0.0,
                ..FoodConfig::default()
            },
            ..SimulationConfig::default()
        };
        Simulation::new(config, None).unwrap()
    }

    fn species(simulation: &mut Simulation) -> SpeciesId {
        simulation.create_species(Traits::default(), ColorScheme::default())
    }

    #[test]
    fn when_a_cell_has_an_ant_pheromone_and_food_the_ant_is_shown() {
        let mut simulation = empty();
        let species = species(&mut simulation);
        let position = Coord::new(2.0, 1.0);
        simulation.add_food(position, 3);
        let ant = simulation
            .spawn_ant(species, AgentType::Worker, position, None, 100.0)
            .unwrap();
        simulation.grid.deposit(position, species, 0.5, ant);

        let snapshot = simulation.snapshot();

        match snapshot.get(2, 1) {
            Some(CellView::Agent { kind, position, color, .. }) => {
                assert_eq!(*kind, AgentType::Worker);
                assert_eq!(*position, Coord::new(2.0, 1.0));
                assert_eq!(*color, ColorScheme::default().worker);
            }
            other => panic!("expected an agent, got {other:?}"),
        }
    }

    #[test]
    fn when_a_cell_has_no_occupant_the_strongest_pheromone_is_shown() {
        let mut simulation = empty();
        let weak = species(&mut simulation);
        let strong = simulation.create_species(
            Traits::default(),
            ColorScheme {
                pheromone: Rgb::new(1, 2, 3),
                ..ColorScheme::default()
            },
        );
        let position = Coord::new(4.0, 3.0);
        simulation.add_food(position, 3);
        simulation.grid.deposit(position, weak, 0.2, AntId(90));
        simulation.grid.deposit(position, strong, 0.7, AntId(91));

        let snapshot = simulation.snapshot();

        assert_eq!(
            snapshot.get(4, 3),
            Some(&CellView::Pheromone {
                concentration: 0.7,
                color: Rgb::new(1, 2, 3)
            })
        );
    }

    #[test]
    fn when_a_cell_only_has_food_its_amount_is_shown() {
        let mut simulation = empty();
        simulation.add_food(Coord::new(0.0, 0.0), 7);

        let snapshot = simulation.snapshot();

        assert_eq!(snapshot.get(0, 0), Some(&CellView::Food { amount: 7 }));
        assert_eq!(snapshot.get(1, 0), Some(&CellView::Empty));
        assert_eq!(snapshot.get(6, 0), None);
        assert_eq!(snapshot.cells.len(), 24);
    }

    #[test]
    fn when_a_nest_stands_in_a_cell_it_is_shown_in_the_nest_colour() {
        let mut simulation = empty();
        let species = species(&mut simulation);
        simulation
            .found_nest(species, Coord::new(3.0, 2.0), 100.0)
            .unwrap();

        let snapshot = simulation.snapshot();

        match snapshot.get(3, 2) {
            Some(CellView::Agent { kind, color, .. }) => {
                assert_eq!(*kind, AgentType::NestPiece);
                assert_eq!(*color, ColorScheme::default().nest);
            }
            other => panic!("expected a nest piece, got {other:?}"),
        }
    }

    #[test]
    fn when_serialising_a_snapshot_each_cell_is_tagged_with_its_type() {
        let mut simulation = empty();
        simulation.add_food(Coord::new(1.0, 0.0), 2);

        let json: serde_json::Value =
            serde_json::from_str(&simulation.snapshot().to_json().unwrap()).unwrap();

        assert_eq!(json["width"], 6);
        assert_eq!(json["cells"][0]["type"], "empty");
        assert_eq!(json["cells"][1]["type"], "food");
        assert_eq!(json["cells"][1]["amount"], 2);
    }

    #[test]
    fn when_drawing_a_snapshot_every_row_is_printed() {
        let mut simulation = empty();
        let species = species(&mut simulation);
        simulation
            .spawn_ant(species, AgentType::Queen, Coord::new(0.0, 3.0), None, 100.0)
            .unwrap();
        let mut out = Vec::new();

        simulation.snapshot().draw_to(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Tick: 0"));
        assert!(text.contains(": Ants = 1, Nests = 0"));
        assert!(text.contains('Q'));
        assert_eq!(text.matches('.').count(), 23);
    }
}
