use crate::ant::{Ant, Caste, FoodSighting, Perception, PheromoneSighting, Sighting};
use crate::behaviour::Turn;
use crate::config::SimulationConfig;
use crate::entities::{AgentType, AntId, IdGenerator, NestId, PieceId, SpeciesId};
use crate::error::SimulationError;
use crate::food::FoodSystem;
use crate::geometry::Coord;
use crate::map::{Grid, Layout, Occupant};
use crate::nest::{Nest, PieceOutcome};
use crate::replay::{create_replay_logger, Population, ReplayLogger};
use crate::species::{Characteristic, ColorScheme, Species, Traits};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::f64::consts::TAU;
use tracing::{debug, info, warn};

/// An ant colony simulation.
/// Main entry point for running the simulation.
///
/// Every random decision is drawn from a single generator seeded from the config, so a
/// seed and a sequence of calls fully determine a run.
pub struct Simulation {
    pub(crate) config: SimulationConfig,
    pub(crate) grid: Grid,
    pub(crate) species: BTreeMap<SpeciesId, Species>,
    pub(crate) ants: BTreeMap<AntId, Ant>,
    pub(crate) nests: BTreeMap<NestId, Nest>,
    food: FoodSystem,
    pub(crate) ids: IdGenerator,
    pub(crate) tick: u64,
    running: bool,
    founding_species: Option<SpeciesId>,
    layout: Option<Layout>,
    pub(crate) replay_logger: Box<dyn ReplayLogger>,
    pub(crate) rng: StdRng,
}

impl Simulation {
    /// Creates an empty simulation. Call [`Simulation::create_environment`] to populate it.
    ///
    /// # Arguments
    /// * `config` - The configuration of the simulation. It is validated first.
    /// * `replay_filename` - The file to save the replay to. If `None`, no replay is kept.
    pub fn new(
        config: SimulationConfig,
        replay_filename: Option<String>,
    ) -> Result<Simulation, SimulationError> {
        config.validate()?;

        Ok(Simulation {
            grid: Grid::new(config.width, config.height),
            species: BTreeMap::new(),
            ants: BTreeMap::new(),
            nests: BTreeMap::new(),
            food: FoodSystem::new(config.food.clone()),
            ids: IdGenerator::default(),
            tick: 0,
            running: false,
            founding_species: None,
            layout: None,
            replay_logger: create_replay_logger(
                replay_filename,
                config.width,
                config.height,
                config.seed,
                config.replay_window,
            ),
            rng: StdRng::seed_from_u64(config.seed),
            config,
        })
    }

    /// Creates a simulation whose environment is built from a text layout. The grid takes
    /// the layout's size.
    pub fn from_layout(
        layout: Layout,
        config: SimulationConfig,
        replay_filename: Option<String>,
    ) -> Result<Simulation, SimulationError> {
        let config = SimulationConfig {
            width: layout.width,
            height: layout.height,
            ..config
        };
        let mut simulation = Simulation::new(config, replay_filename)?;
        simulation.layout = Some(layout);
        Ok(simulation)
    }

    /// Resets everything and reseeds the world: a fresh founding species, its queens and
    /// the starting food. The simulation is left paused.
    ///
    /// The generator restarts from the configured seed, so calling this again rebuilds
    /// the same world. Use [`Simulation::reseed`] for a different one.
    pub fn create_environment(&mut self) -> Result<(), SimulationError> {
        self.rng = StdRng::seed_from_u64(self.config.seed);
        self.ids = IdGenerator::default();
        self.tick = 0;
        self.running = false;
        self.grid = Grid::new(self.config.width, self.config.height);
        self.species.clear();
        self.ants.clear();
        self.nests.clear();
        self.replay_logger.clear();

        let founding =
            self.create_species(self.config.default_traits.clone(), ColorScheme::default());
        self.founding_species = Some(founding);

        match self.layout.clone() {
            Some(layout) => {
                for (x, y, amount) in layout.food {
                    let amount = amount.unwrap_or(self.food.config().max_per_cell);
                    self.add_food(Coord::new(x as f64, y as f64), amount);
                }
                for (x, y) in layout.queens {
                    let position = Coord::new(x as f64, y as f64);
                    self.spawn_ant(
                        founding,
                        AgentType::Queen,
                        position,
                        None,
                        self.config.queen_health,
                    )?;
                }
            }
            None => {
                self.food.seed(&mut self.grid, &mut self.rng);
                for index in self.grid.food_cells() {
                    let location = self.location_of_cell(index);
                    self.replay_logger.log_spawn_food(self.tick, location);
                }

                for _ in 0..self.config.starting_queens {
                    let position = Coord::new(
                        self.rng.gen_range(0..self.config.width) as f64,
                        self.rng.gen_range(0..self.config.height) as f64,
                    );
                    self.spawn_ant(
                        founding,
                        AgentType::Queen,
                        position,
                        None,
                        self.config.queen_health,
                    )?;
                }
            }
        }

        info!(
            width = self.grid.width(),
            height = self.grid.height(),
            seed = self.config.seed,
            queens = self.ants.len(),
            food = self.grid.total_food(),
            "Environment created"
        );

        self.replay_logger.log_tick(self.tick, self.populations());

        Ok(())
    }

    /// Advances exactly one tick, whether or not the simulation is running.
    pub fn step(&mut self) {
        self.tick += 1;

        // Ants born during the tick first act on the next one
        let ants: Vec<AntId> = self.ants.keys().copied().collect();
        for id in ants {
            self.update_ant(id);
        }

        let nests: Vec<NestId> = self.nests.keys().copied().collect();
        for id in nests {
            self.update_nest(id);
        }

        let grown = self.food.grow_food(&mut self.grid, &mut self.rng, self.tick);
        if grown > 0 {
            debug!(tick = self.tick, grown, "Food grew");
        }

        self.grid.decay_pheromones(self.config.pheromone_decay);

        self.replay_logger.log_tick(self.tick, self.populations());
    }

    /// Pauses or resumes the tick driver.
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advances one tick if the simulation is running. Returns whether it did.
    pub fn advance_one_tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.step();
        true
    }

    /// Stores `seed` in the config and rebuilds the world from it.
    pub fn reseed(&mut self, seed: u64) -> Result<(), SimulationError> {
        self.config.seed = seed;
        info!(seed, "reseeding the environment");
        self.create_environment()
    }

    /// Adds a new, empty species.
    pub fn create_species(&mut self, traits: Traits, colors: ColorScheme) -> SpeciesId {
        let id = self.ids.next_species();
        self.species.insert(id, Species::new(id, traits, colors));
        id
    }

    /// Puts a new ant on the grid.
    ///
    /// # Arguments
    /// * `species` - The species of the ant.
    /// * `kind` - Queen, worker or soldier.
    /// * `position` - Where the ant starts. It is wrapped onto the grid.
    /// * `nest` - The ant's home nest, if it has one.
    /// * `health` - The ant's starting health.
    pub fn spawn_ant(
        &mut self,
        species: SpeciesId,
        kind: AgentType,
        position: Coord,
        nest: Option<NestId>,
        health: f64,
    ) -> Result<AntId, SimulationError> {
        let caste = Caste::hatch(kind).ok_or(SimulationError::InvalidConfig(
            "nest pieces are created with their nest",
        ))?;
        let Some(owner) = self.species.get_mut(&species) else {
            return Err(SimulationError::UnknownSpecies(species));
        };

        let id = self.ids.next_ant();
        owner.add_ant(id);

        let position = self.grid.torus().wrap(position);
        let facing = self.rng.gen_range(0.0..TAU);
        let ant = Ant::new(
            id,
            species,
            nest,
            caste,
            position,
            facing,
            self.config.hunger_start,
            health,
        );

        self.grid.insert(Occupant::Ant(id), position);
        self.ants.insert(id, ant);

        let location = self.grid.torus().cell_of(position);
        self.replay_logger
            .log_spawn_ant(self.tick, id.0, kind, species, location);

        Ok(id)
    }

    /// Founds a nest for `species` centred on `position`.
    pub fn found_nest(
        &mut self,
        species: SpeciesId,
        position: Coord,
        health: f64,
    ) -> Result<NestId, SimulationError> {
        if !self.species.contains_key(&species) {
            return Err(SimulationError::UnknownSpecies(species));
        }

        let id = self.ids.next_nest();
        let nest = Nest::create_nest(
            id,
            species,
            position,
            health,
            self.config.nest_radius,
            &mut self.grid,
            &mut self.ids,
        );

        if let Some(owner) = self.species.get_mut(&species) {
            owner.add_nest(id);
        }
        self.nests.insert(id, nest);

        Ok(id)
    }

    /// Places food on the cell containing `position`. Fails if the cell already has food.
    pub fn add_food(&mut self, position: Coord, amount: u32) -> bool {
        let added = self.food.add_food(&mut self.grid, position, amount);
        if added {
            let location = self.grid.torus().cell_of(position);
            self.replay_logger.log_spawn_food(self.tick, location);
        }
        added
    }

    /// Edits a trait of a species. The value is clamped to the trait's valid range.
    /// Live ants of the species carrying more than the new maximum drop the excess.
    /// Returns the value actually applied.
    pub fn set_species_trait(
        &mut self,
        species: SpeciesId,
        characteristic: Characteristic,
        value: f64,
    ) -> Result<f64, SimulationError> {
        let owner = self
            .species
            .get_mut(&species)
            .ok_or(SimulationError::UnknownSpecies(species))?;
        let applied = owner.set_characteristic(characteristic, value);
        let carrying_max = owner.traits().carrying_max;

        for ant in owner.ants() {
            if let Some(ant) = self.ants.get_mut(ant) {
                ant.carrying = ant.carrying.min(carrying_max);
            }
        }

        Ok(applied)
    }

    pub fn species_traits(&self, species: SpeciesId) -> Result<&Traits, SimulationError> {
        self.species
            .get(&species)
            .map(Species::traits)
            .ok_or(SimulationError::UnknownSpecies(species))
    }

    /// Removes an ant from the simulation. Returns `false` if there was no such ant.
    pub fn kill_ant(&mut self, id: AntId) -> bool {
        let Some(ant) = self.ants.remove(&id) else {
            return false;
        };
        self.grid.remove(Occupant::Ant(id));
        self.bury(&ant, "killed");
        true
    }

    /// Damages one piece of a nest. If that was the nest's last piece the nest is removed
    /// at once. Returns `None` if there is no such piece.
    pub fn damage_nest_piece(
        &mut self,
        nest: NestId,
        piece: PieceId,
        amount: f64,
    ) -> Option<PieceOutcome> {
        let outcome = self
            .nests
            .get_mut(&nest)?
            .damage_piece(piece, amount, &mut self.grid)?;

        if outcome == PieceOutcome::NestDestroyed {
            self.remove_nest(nest);
        }

        Some(outcome)
    }

    /// Writes the replay, if one is being kept.
    pub fn save_replay(&self) -> Result<(), SimulationError> {
        self.replay_logger.save()?;
        Ok(())
    }

    /// Head counts of every species that still has members, in order of creation.
    pub fn populations(&self) -> Vec<Population> {
        self.species
            .values()
            .filter(|species| !species.is_extinct())
            .map(|species| Population {
                species: species.id(),
                ants: species.ants().len(),
                nests: species.nests().len(),
            })
            .collect()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// The species created with the environment.
    pub fn founding_species(&self) -> Option<SpeciesId> {
        self.founding_species
    }

    pub fn species(&self, id: SpeciesId) -> Option<&Species> {
        self.species.get(&id)
    }

    /// Every species ever created, extinct or not, in order of creation.
    pub fn all_species(&self) -> impl Iterator<Item = &Species> {
        self.species.values()
    }

    pub fn ant(&self, id: AntId) -> Option<&Ant> {
        self.ants.get(&id)
    }

    /// Live ants in order of birth.
    pub fn ants(&self) -> impl Iterator<Item = &Ant> {
        self.ants.values()
    }

    pub fn nest(&self, id: NestId) -> Option<&Nest> {
        self.nests.get(&id)
    }

    /// Live nests in order of founding.
    pub fn nests(&self) -> impl Iterator<Item = &Nest> {
        self.nests.values()
    }
}

impl Simulation {
    fn update_ant(&mut self, id: AntId) {
        // The ant is off the map and the grid for its whole turn
        let Some(mut ant) = self.ants.remove(&id) else {
            return;
        };
        self.grid.remove(Occupant::Ant(id));

        let Some(traits) = self
            .species
            .get(&ant.species)
            .map(|species| species.traits().clone())
        else {
            self.settle(ant);
            return;
        };

        if ant.kind() != AgentType::Queen {
            ant.starve(traits.hunger_rate);
            if ant.is_starved() {
                self.bury(&ant, "starved");
                return;
            }
        }

        if ant.sleep > 0 {
            ant.sleep -= 1;
            self.settle(ant);
            return;
        }

        ant.in_view = self.scan(&ant, &traits);
        ant.in_range = self.smell(&ant, &traits);

        let turn = match ant.caste {
            Caste::Queen { .. } => self.queen_turn(&mut ant, &traits),
            Caste::Worker { .. } => self.worker_turn(&mut ant, &traits),
            Caste::Soldier { .. } => self.soldier_turn(&mut ant, &traits),
        };

        match turn {
            Turn::Founded => {}
            Turn::Move => {
                self.move_ant(&mut ant, &traits);
                self.settle(ant);
            }
            Turn::Stay => self.settle(ant),
        }
    }

    fn update_nest(&mut self, id: NestId) {
        let Some(nest) = self.nests.get_mut(&id) else {
            return;
        };
        let species = nest.species();
        let position = nest.position();

        let kind = if nest.spend_food(self.config.queen_cost) {
            AgentType::Queen
        } else if nest.spend_food(self.config.brood_cost) {
            let soldier_ratio = self
                .species
                .get(&species)
                .map_or(0.0, |species| species.traits().soldier_ratio);
            if self.rng.gen_bool(soldier_ratio) {
                AgentType::Soldier
            } else {
                AgentType::Worker
            }
        } else {
            return;
        };

        let health = match kind {
            AgentType::Queen => self.config.queen_health,
            AgentType::Soldier => self.config.soldier_health,
            _ => self.config.worker_health,
        };

        match self.spawn_ant(species, kind, position, Some(id), health) {
            Ok(ant) => debug!(nest = id.0, ant = ant.0, kind = ?kind, "Nest raised brood"),
            Err(error) => warn!(nest = id.0, %error, "Nest failed to raise brood"),
        }
    }

    /// Sees through the cone of sight.
    fn scan(&self, ant: &Ant, traits: &Traits) -> Perception {
        let mut perception = Perception::default();

        for index in self
            .grid
            .cone_of_view(ant.position, traits.eyesight, ant.facing, traits.eye_angle)
        {
            let cell = self.grid.cell(index);
            let position = self.grid.cell_coord(index);

            for occupant in cell.occupants() {
                if let Some(species) = self.species_of(*occupant) {
                    perception.ants.push(Sighting {
                        occupant: *occupant,
                        species,
                        position,
                    });
                }
            }

            if let Some(food) = cell.food() {
                perception.food.push(FoodSighting {
                    cell: index,
                    position,
                    amount: food.amount(),
                });
            }

            perception
                .pheromones
                .extend(pheromones_in(&self.grid, index, position));
        }

        perception
    }

    /// Smells through the cone of the antennae.
    fn smell(&self, ant: &Ant, traits: &Traits) -> Vec<PheromoneSighting> {
        self.grid
            .cone_of_view(
                ant.position,
                traits.antenna_size,
                ant.facing,
                traits.antenna_angle,
            )
            .into_iter()
            .flat_map(|index| pheromones_in(&self.grid, index, self.grid.cell_coord(index)))
            .collect()
    }

    fn move_ant(&mut self, ant: &mut Ant, traits: &Traits) {
        let torus = self.grid.torus();
        let distance = match ant.target {
            Some(target) => traits.speed.min(torus.distance(ant.position, target)),
            None => traits.speed,
        };

        if distance > 0.0 {
            ant.position = torus.wrap(ant.position.advanced(ant.facing, distance));
        }
    }

    /// Puts an ant back on the grid at its current position.
    fn settle(&mut self, ant: Ant) {
        self.grid.insert(Occupant::Ant(ant.id), ant.position);
        self.ants.insert(ant.id, ant);
    }

    /// Removes a dead ant from its species. The ant must already be off the grid.
    fn bury(&mut self, ant: &Ant, cause: &str) {
        if let Some(species) = self.species.get_mut(&ant.species) {
            species.remove_ant(ant.id);
        }

        let location = self.grid.torus().cell_of(ant.position);
        self.replay_logger
            .log_remove_ant(self.tick, ant.id.0, ant.kind(), location);
        debug!(ant = ant.id.0, kind = ?ant.kind(), cause, "Ant died");
    }

    fn remove_nest(&mut self, id: NestId) {
        let Some(nest) = self.nests.remove(&id) else {
            return;
        };
        if let Some(species) = self.species.get_mut(&nest.species()) {
            species.remove_nest(id);
        }

        let location = self.grid.torus().cell_of(nest.position());
        self.replay_logger.log_remove_nest(self.tick, id.0, location);
        debug!(nest = id.0, "Nest destroyed");
    }

    pub(crate) fn species_of(&self, occupant: Occupant) -> Option<SpeciesId> {
        match occupant {
            Occupant::Ant(id) => self.ants.get(&id).map(Ant::species),
            Occupant::NestPiece { nest, .. } => self.nests.get(&nest).map(Nest::species),
        }
    }

    pub(crate) fn location_of_cell(&self, index: usize) -> (usize, usize) {
        (index % self.grid.width(), index / self.grid.width())
    }
}

fn pheromones_in(
    grid: &Grid,
    index: usize,
    position: Coord,
) -> impl Iterator<Item = PheromoneSighting> + '_ {
    grid.cell(index)
        .pheromones()
        .iter()
        .map(move |pheromone| PheromoneSighting {
            cell: index,
            position,
            species: pheromone.species(),
            concentration: pheromone.concentration(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ant::QueenGoal;

    fn simulation(layout: &str) -> Simulation {
        let config = SimulationConfig {
            pheromone_decay: 0.1,
            ..SimulationConfig::default()
        };
        let mut simulation =
            Simulation::from_layout(Layout::parse(layout).unwrap(), config, None).unwrap();
        simulation.create_environment().unwrap();
        simulation
    }

    fn empty(width: usize, height: usize) -> Simulation {
        let config = SimulationConfig {
            width,
            height,
            food: crate::food::FoodConfig {
                sources: vec![],
                grow_chance: 0.0,
                ..Default::default()
            },
            ..SimulationConfig::default()
        };
        Simulation::new(config, None).unwrap()
    }

    #[test]
    fn when_creating_the_environment_from_a_layout_the_queens_and_food_are_placed() {
        let simulation = simulation(
            "\
            rows 4
            cols 5
            m .....
            m .Q...
            m ...*.
            m 3...Q",
        );

        assert_eq!(simulation.ants().count(), 2);
        assert!(simulation.ants().all(|ant| ant.kind() == AgentType::Queen));
        assert_eq!(simulation.grid().total_food(), 13);
        assert_eq!(simulation.tick(), 0);
        assert!(!simulation.is_running());

        let founding = simulation.species(simulation.founding_species().unwrap()).unwrap();
        assert_eq!(founding.ants().len(), 2);
    }

    #[test]
    fn when_creating_the_environment_twice_the_world_is_the_same() {
        let config = SimulationConfig {
            width: 30,
            height: 30,
            seed: 9,
            ..SimulationConfig::default()
        };
        let mut simulation = Simulation::new(config, None).unwrap();
        simulation.create_environment().unwrap();
        let positions: Vec<Coord> = simulation.ants().map(Ant::position).collect();
        simulation.step();

        simulation.create_environment().unwrap();

        assert_eq!(
            simulation.ants().map(Ant::position).collect::<Vec<_>>(),
            positions
        );
        assert_eq!(simulation.tick(), 0);
        assert_eq!(simulation.ants().count(), 3);
    }

    #[test]
    fn when_spawning_an_ant_for_an_unknown_species_an_error_is_returned() {
        let mut simulation = empty(5, 5);

        let result = simulation.spawn_ant(
            SpeciesId(99),
            AgentType::Worker,
            Coord::new(1.0, 1.0),
            None,
            100.0,
        );

        assert!(matches!(result, Err(SimulationError::UnknownSpecies(SpeciesId(99)))));
    }

    #[test]
    fn when_spawning_a_nest_piece_as_an_ant_an_error_is_returned() {
        let mut simulation = empty(5, 5);
        let species = simulation.create_species(Traits::default(), ColorScheme::default());

        let result = simulation.spawn_ant(
            species,
            AgentType::NestPiece,
            Coord::new(1.0, 1.0),
            None,
            100.0,
        );

        assert!(matches!(result, Err(SimulationError::InvalidConfig(_))));
    }

    #[test]
    fn when_spawning_an_ant_outside_the_grid_it_is_wrapped() {
        let mut simulation = empty(5, 5);
        let species = simulation.create_species(Traits::default(), ColorScheme::default());

        let id = simulation
            .spawn_ant(species, AgentType::Worker, Coord::new(-1.0, 7.0), None, 100.0)
            .unwrap();

        assert_eq!(simulation.ant(id).unwrap().position(), Coord::new(4.0, 2.0));
        assert_eq!(
            simulation.grid().location(Occupant::Ant(id)),
            Some(simulation.grid().cell_index(Coord::new(4.0, 2.0)))
        );
    }

    #[test]
    fn when_a_queen_has_no_steps_left_she_founds_exactly_one_nest_with_her_health() {
        let mut simulation = empty(10, 10);
        let species = simulation.create_species(Traits::default(), ColorScheme::default());
        let queen = simulation
            .spawn_ant(species, AgentType::Queen, Coord::new(5.0, 5.0), None, 1234.0)
            .unwrap();
        simulation.ants.get_mut(&queen).unwrap().caste = Caste::Queen {
            goal: QueenGoal::GotoNestSite,
            steps: 0,
        };

        simulation.step();

        assert!(simulation.ant(queen).is_none());
        assert!(!simulation.grid().contains(Occupant::Ant(queen)));
        assert_eq!(simulation.nests().count(), 1);

        let nest = simulation.nests().next().unwrap();
        assert!((nest.health() - 1234.0).abs() < 1e-9);
        assert_eq!(nest.position(), Coord::new(5.0, 5.0));

        let child = simulation.species(nest.species()).unwrap();
        assert_eq!(child.parent(), Some(species));
        assert_eq!(child.nests(), &[nest.id()]);
        assert!(simulation.species(species).unwrap().ants().is_empty());
    }

    #[test]
    fn when_the_last_piece_of_a_nest_is_killed_the_nest_is_removed_from_its_species() {
        let mut simulation = empty(10, 10);
        let species = simulation.create_species(Traits::default(), ColorScheme::default());
        let nest = simulation
            .found_nest(species, Coord::new(5.0, 5.0), 90.0)
            .unwrap();
        let pieces: Vec<PieceId> = simulation
            .nest(nest)
            .unwrap()
            .pieces()
            .iter()
            .map(|piece| piece.id())
            .collect();

        for piece in &pieces[..pieces.len() - 1] {
            assert_eq!(
                simulation.damage_nest_piece(nest, *piece, 10.0),
                Some(PieceOutcome::Destroyed)
            );
        }
        assert_eq!(simulation.species(species).unwrap().nests(), &[nest]);

        let last = pieces[pieces.len() - 1];
        assert_eq!(
            simulation.damage_nest_piece(nest, last, 10.0),
            Some(PieceOutcome::NestDestroyed)
        );

        assert!(simulation.nest(nest).is_none());
        assert!(simulation.species(species).unwrap().nests().is_empty());
        assert!(simulation
            .grid()
            .cells()
            .all(|(_, cell)| cell.occupants().is_empty()));
    }

    #[test]
    fn when_two_species_mark_the_same_cell_the_markers_decay_independently() {
        let mut simulation = empty(5, 5);
        let first = simulation.create_species(Traits::default(), ColorScheme::default());
        let second = simulation.create_species(Traits::default(), ColorScheme::default());
        let cell = Coord::new(2.0, 2.0);
        simulation.config.pheromone_decay = 0.1;
        simulation.grid.deposit(cell, first, 0.35, AntId(100));
        simulation.grid.deposit(cell, second, 0.15, AntId(101));

        simulation.step();

        let markers = simulation.grid().cell_at(cell).pheromones();
        assert_eq!(markers.len(), 2);
        assert!((markers[0].concentration() - 0.25).abs() < 1e-9);
        assert!((markers[1].concentration() - 0.05).abs() < 1e-9);

        simulation.step();

        let markers = simulation.grid().cell_at(cell).pheromones();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].species(), first);
        assert!((markers[0].concentration() - 0.15).abs() < 1e-9);
    }

    #[test]
    fn when_a_worker_starves_it_is_removed_everywhere() {
        let mut simulation = empty(5, 5);
        let traits = Traits {
            hunger_rate: 5.0,
            ..Traits::default()
        };
        let species = simulation.create_species(traits, ColorScheme::default());
        let worker = simulation
            .spawn_ant(species, AgentType::Worker, Coord::new(2.0, 2.0), None, 100.0)
            .unwrap();

        simulation.step();
        assert!(simulation.ant(worker).is_some());
        simulation.step();

        assert!(simulation.ant(worker).is_none());
        assert!(!simulation.grid().contains(Occupant::Ant(worker)));
        assert!(simulation.species(species).unwrap().ants().is_empty());
    }

    #[test]
    fn when_a_queen_goes_hungry_she_does_not_starve() {
        let mut simulation = empty(5, 5);
        let traits = Traits {
            hunger_rate: 5.0,
            queen_steps_min: 20,
            queen_steps_max: 20,
            ..Traits::default()
        };
        let species = simulation.create_species(traits, ColorScheme::default());
        let queen = simulation
            .spawn_ant(species, AgentType::Queen, Coord::new(2.0, 2.0), None, 100.0)
            .unwrap();

        for _ in 0..5 {
            simulation.step();
        }

        assert!(simulation.ant(queen).is_some());
    }

    #[test]
    fn when_the_environment_is_reseeded_the_seed_decides_the_world() {
        let config = SimulationConfig {
            width: 30,
            height: 30,
            starting_queens: 4,
            ..SimulationConfig::default()
        };
        let mut simulation = Simulation::new(config, None).unwrap();
        let queens = |simulation: &Simulation| {
            simulation
                .ants()
                .map(|ant| (ant.position().x, ant.position().y))
                .collect::<Vec<_>>()
        };

        simulation.create_environment().unwrap();
        let first = queens(&simulation);
        simulation.create_environment().unwrap();
        assert_eq!(queens(&simulation), first);

        simulation.reseed(7).unwrap();
        assert_eq!(simulation.config().seed, 7);
        let reseeded = queens(&simulation);
        assert_ne!(reseeded, first);

        simulation.reseed(7).unwrap();
        assert_eq!(queens(&simulation), reseeded);
    }

    #[test]
    fn when_the_carrying_maximum_is_lowered_loaded_workers_drop_the_excess() {
        let mut simulation = empty(10, 10);
        let species = simulation.create_species(Traits::default(), ColorScheme::default());
        let worker = simulation
            .spawn_ant(species, AgentType::Worker, Coord::new(4.0, 4.0), None, 100.0)
            .unwrap();
        simulation.ants.get_mut(&worker).unwrap().carrying = 5;

        simulation
            .set_species_trait(species, Characteristic::CarryingThreshold, 1.0)
            .unwrap();
        simulation
            .set_species_trait(species, Characteristic::CarryingMax, 1.0)
            .unwrap();
        assert_eq!(simulation.ant(worker).unwrap().carrying(), 1);

        simulation.step();
        let max = simulation.species_traits(species).unwrap().carrying_max;
        assert!(simulation.ant(worker).unwrap().carrying() <= max);
    }

    #[test]
    fn when_a_nest_has_enough_food_it_raises_one_ant_per_tick() {
        let mut simulation = empty(10, 10);
        let traits = Traits {
            soldier_ratio: 0.0,
            ..Traits::default()
        };
        let species = simulation.create_species(traits, ColorScheme::default());
        let nest = simulation
            .found_nest(species, Coord::new(5.0, 5.0), 100.0)
            .unwrap();
        simulation.nests.get_mut(&nest).unwrap().store_food(12);

        simulation.step();

        assert_eq!(simulation.ants().count(), 1);
        let worker = simulation.ants().next().unwrap();
        assert_eq!(worker.kind(), AgentType::Worker);
        assert_eq!(worker.nest(), Some(nest));
        assert_eq!(worker.health(), simulation.config().worker_health);
        assert_eq!(simulation.nest(nest).unwrap().food(), 7);

        simulation.step();
        simulation.step();

        assert_eq!(simulation.ants().count(), 2);
        assert_eq!(simulation.nest(nest).unwrap().food(), 2);
    }

    #[test]
    fn when_a_nest_can_afford_a_queen_it_raises_one_of_the_same_species() {
        let mut simulation = empty(10, 10);
        let species = simulation.create_species(Traits::default(), ColorScheme::default());
        let nest = simulation
            .found_nest(species, Coord::new(5.0, 5.0), 100.0)
            .unwrap();
        simulation.nests.get_mut(&nest).unwrap().store_food(30);

        simulation.step();

        let queen = simulation.ants().next().unwrap();
        assert_eq!(queen.kind(), AgentType::Queen);
        assert_eq!(queen.species(), species);
        assert_eq!(simulation.nest(nest).unwrap().food(), 0);
    }

    #[test]
    fn when_stepping_with_the_same_seed_two_runs_are_identical() {
        let run = || {
            let config = SimulationConfig {
                width: 40,
                height: 40,
                seed: 1234,
                ..SimulationConfig::default()
            };
            let mut simulation = Simulation::new(config, None).unwrap();
            simulation.create_environment().unwrap();
            for _ in 0..60 {
                simulation.step();
            }
            (
                simulation
                    .ants()
                    .map(|ant| (ant.id(), ant.position(), ant.facing()))
                    .collect::<Vec<_>>(),
                simulation.nests().map(Nest::id).collect::<Vec<_>>(),
                simulation.grid().total_food(),
            )
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn when_every_tick_is_done_each_ant_is_in_the_cell_of_its_position() {
        let config = SimulationConfig {
            width: 25,
            height: 25,
            seed: 3,
            starting_queens: 6,
            default_traits: Traits {
                queen_steps_min: 2,
                queen_steps_max: 6,
                ..Traits::default()
            },
            ..SimulationConfig::default()
        };
        let mut simulation = Simulation::new(config, None).unwrap();
        simulation.create_environment().unwrap();

        for _ in 0..80 {
            simulation.step();
            for ant in simulation.ants() {
                let cell = simulation.grid().cell_index(ant.position());
                assert_eq!(simulation.grid().location(Occupant::Ant(ant.id())), Some(cell));
                assert!(ant.hunger() >= 0.0 && ant.hunger() <= simulation.config().hunger_max);
                let carrying_max = simulation.species_traits(ant.species()).unwrap().carrying_max;
                assert!(ant.carrying() <= carrying_max);
            }
        }
    }
}
