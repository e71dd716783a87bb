//! What each caste does with its turn.
//!
//! A turn runs after the ant has been taken off the grid and has looked and smelled
//! around. It settles the ant's goal, acts on it and says whether the ant should then
//! move along its facing.

use crate::ant::{
    decide_queen, decide_soldier, decide_worker, least_effort, strongest_scent, Ant, Caste,
    QueenGoal, SoldierGoal, WorkerGoal,
};
use crate::entities::NestId;
use crate::error::SimulationError;
use crate::geometry::{normalize_angle, Coord};
use crate::map::Occupant;
use crate::simulation::Simulation;
use crate::species::Traits;
use rand::Rng;
use std::f64::consts::TAU;
use tracing::{info, warn};

/// How a turn ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Turn {
    /// Walk along the current facing.
    Move,
    /// Stay put.
    Stay,
    /// The queen founded a nest and is gone.
    Founded,
}

impl Simulation {
    pub(crate) fn queen_turn(&mut self, ant: &mut Ant, traits: &Traits) -> Turn {
        let Caste::Queen { goal, steps } = ant.caste else {
            return Turn::Stay;
        };

        match decide_queen(goal, steps) {
            QueenGoal::PickDirection => {
                ant.facing = self.rng.gen_range(0.0..TAU);
                ant.target = None;
                let (low, high) = (
                    traits.queen_steps_min,
                    traits.queen_steps_max.max(traits.queen_steps_min),
                );
                let steps: u32 = self.rng.gen_range(low..=high);
                ant.caste = Caste::Queen {
                    goal: QueenGoal::GotoNestSite,
                    steps: steps.saturating_sub(1),
                };
                Turn::Move
            }
            QueenGoal::GotoNestSite => {
                ant.caste = Caste::Queen {
                    goal: QueenGoal::GotoNestSite,
                    steps: steps.saturating_sub(1),
                };
                Turn::Move
            }
            QueenGoal::CreateNest => {
                ant.caste = Caste::Queen {
                    goal: QueenGoal::CreateNest,
                    steps,
                };
                match self.found_colony(ant) {
                    Ok(_) => Turn::Founded,
                    Err(error) => {
                        warn!(queen = ant.id.0, %error, "Queen failed to found a nest");
                        Turn::Stay
                    }
                }
            }
            QueenGoal::None => Turn::Stay,
        }
    }

    pub(crate) fn worker_turn(&mut self, ant: &mut Ant, traits: &Traits) -> Turn {
        let home = self.home_of(ant);
        let goal = decide_worker(ant, traits, self.config.hunger_threshold, home.is_some());
        ant.caste = Caste::Worker { goal };

        match (goal, home) {
            (WorkerGoal::Eat, _) => self.eat(ant),
            (WorkerGoal::FindFood, _) => self.find_food(ant, traits),
            (WorkerGoal::ReturnToNest, Some(home)) => self.return_to_nest(ant, traits, home),
            (WorkerGoal::ReturnToNest, None) | (WorkerGoal::Idle, _) => {
                self.wander(ant);
                Turn::Move
            }
        }
    }

    pub(crate) fn soldier_turn(&mut self, ant: &mut Ant, traits: &Traits) -> Turn {
        let goal = decide_soldier(ant, &self.grid.torus(), self.config.hunger_threshold);
        ant.caste = Caste::Soldier { goal };

        match goal {
            SoldierGoal::Eat => self.eat(ant),
            SoldierGoal::Attack(quarry) => self.attack(ant, traits, quarry),
            SoldierGoal::Patrol => self.patrol(ant),
        }
    }

    /// Ends a queen's life by founding a nest for a new species descended from hers.
    fn found_colony(&mut self, queen: &Ant) -> Result<NestId, SimulationError> {
        let parent = self
            .species
            .get(&queen.species)
            .ok_or(SimulationError::UnknownSpecies(queen.species))?;
        let id = self.ids.next_species();
        let child = parent.mutate(id, &mut self.rng);
        self.species.insert(id, child);

        let nest = self.found_nest(id, queen.position, queen.health)?;
        if let Some(parent) = self.species.get_mut(&queen.species) {
            parent.remove_ant(queen.id);
        }

        let location = self.grid.torus().cell_of(queen.position);
        self.replay_logger
            .log_remove_ant(self.tick, queen.id.0, queen.kind(), location);
        self.replay_logger
            .log_found(self.tick, nest.0, id, queen.species, location);
        info!(
            queen = queen.id.0,
            nest = nest.0,
            species = id.0,
            parent = queen.species.0,
            "Queen founded a nest"
        );

        Ok(nest)
    }

    /// The ant's nest, if it is still standing.
    fn home_of(&self, ant: &Ant) -> Option<NestId> {
        ant.nest.filter(|nest| self.nests.contains_key(nest))
    }

    /// Eats from the food underfoot, then from the load, and otherwise goes looking.
    fn eat(&mut self, ant: &mut Ant) -> Turn {
        let cell = self.grid.cell_index(ant.position);
        let ratio = self.config.food_hunger_ratio;
        let max = self.config.hunger_max;

        if self.grid.cell(cell).food().is_some() {
            let taken = self.take_food(ant, cell);
            ant.feed(taken as f64 * ratio, max);
            ant.target = None;
            return Turn::Stay;
        }

        if ant.carrying > 0 {
            ant.carrying -= 1;
            ant.feed(ratio, max);
            return Turn::Stay;
        }

        if !self.seek_food(ant) {
            self.wander(ant);
        }
        Turn::Move
    }

    fn find_food(&mut self, ant: &mut Ant, traits: &Traits) -> Turn {
        let cell = self.grid.cell_index(ant.position);

        if self.grid.cell(cell).food().is_some() && ant.carrying < traits.carrying_max {
            ant.carrying += self.take_food(ant, cell);
            ant.target = None;
            return Turn::Stay;
        }

        if !self.seek_food(ant) && !self.follow_scent(ant) {
            self.wander(ant);
        }
        Turn::Move
    }

    fn return_to_nest(&mut self, ant: &mut Ant, traits: &Traits, home: NestId) -> Turn {
        self.secrete(ant, traits);

        let cell = self.grid.cell_index(ant.position);
        let Some(nest) = self.nests.get_mut(&home) else {
            self.wander(ant);
            return Turn::Move;
        };

        if nest.contains_cell(cell) {
            nest.store_food(ant.carrying);
            ant.carrying = 0;
            ant.target = None;
            return Turn::Stay;
        }

        let position = nest.position();
        ant.head_for(&self.grid.torus(), position);
        Turn::Move
    }

    fn attack(&mut self, ant: &mut Ant, traits: &Traits, quarry: Occupant) -> Turn {
        let seen = ant
            .in_view
            .ants
            .iter()
            .find(|sighting| sighting.occupant == quarry)
            .map(|sighting| sighting.position);
        let Some(position) = seen else {
            self.wander(ant);
            return Turn::Move;
        };

        let torus = self.grid.torus();
        if torus.distance(ant.position, position) > self.config.strike_range {
            ant.head_for(&torus, position);
            return Turn::Move;
        }

        ant.facing = torus.direction_to(ant.position, position);
        ant.target = None;
        self.strike(ant, traits.damage_rate, quarry, position);
        Turn::Stay
    }

    fn strike(&mut self, ant: &Ant, damage: f64, quarry: Occupant, position: Coord) {
        let torus = self.grid.torus();
        self.replay_logger.log_attack(
            self.tick,
            torus.cell_of(ant.position),
            torus.cell_of(position),
        );

        match quarry {
            Occupant::Ant(id) => {
                let Some(victim) = self.ants.get_mut(&id) else {
                    return;
                };
                victim.health -= damage;
                if victim.health <= 0.0 {
                    self.kill_ant(id);
                }
            }
            Occupant::NestPiece { nest, piece } => {
                self.damage_nest_piece(nest, piece, damage);
            }
        }
    }

    /// Soldiers stay within reach of their nest, wandering about otherwise.
    fn patrol(&mut self, ant: &mut Ant) -> Turn {
        let torus = self.grid.torus();
        let home = self
            .home_of(ant)
            .and_then(|nest| self.nests.get(&nest))
            .map(|nest| nest.position());

        match home {
            Some(home) if torus.distance(ant.position, home) > self.config.patrol_radius => {
                ant.head_for(&torus, home);
            }
            _ => self.wander(ant),
        }
        Turn::Move
    }

    /// Heads for the visible food needing the least effort. Returns `false` if none is seen.
    fn seek_food(&mut self, ant: &mut Ant) -> bool {
        let torus = self.grid.torus();
        let Some(target) = least_effort(&ant.in_view.food, ant.position, &torus)
            .map(|food| food.position)
        else {
            return false;
        };

        ant.head_for(&torus, target);
        true
    }

    /// Heads for the strongest trail of the ant's own species. Returns `false` if there is
    /// nothing to follow.
    fn follow_scent(&mut self, ant: &mut Ant) -> bool {
        let torus = self.grid.torus();
        let cell = self.grid.cell_index(ant.position);
        let Some(target) = strongest_scent(&ant.in_range, ant.species, cell)
            .map(|scent| scent.position)
        else {
            return false;
        };

        ant.head_for(&torus, target);
        true
    }

    fn wander(&mut self, ant: &mut Ant) {
        let angle = self.config.wander_angle;
        let turn = if angle > 0.0 {
            self.rng.gen_range(-angle..=angle)
        } else {
            0.0
        };
        ant.facing = normalize_angle(ant.facing + turn);
        ant.target = None;
    }

    fn secrete(&mut self, ant: &Ant, traits: &Traits) {
        self.grid.deposit(
            ant.position,
            ant.species,
            traits.pheromone_concentration,
            ant.id,
        );
    }

    /// Takes a unit of food from a cell. Taking food makes the ant sleep it off.
    fn take_food(&mut self, ant: &mut Ant, cell: usize) -> u32 {
        let taken = self.grid.take_food(cell);
        if taken == 0 {
            return 0;
        }

        ant.sleep += self.config.food_take_delay;
        if self.grid.cell(cell).food().is_none() {
            let location = self.location_of_cell(cell);
            self.replay_logger.log_remove_food(self.tick, location);
        }
        taken
    }
}
