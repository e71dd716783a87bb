use crate::entities::{AntId, SpeciesId};
use serde::Serialize;
use std::collections::BTreeSet;

/// The strongest a single pheromone marker can get.
pub const MAX_CONCENTRATION: f64 = 1.0;

/// A scent marker left in a cell by ants of one species.
///
/// A cell holds at most one marker per species; deposits from the same species strengthen
/// the existing marker instead of stacking.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Pheromone {
    species: SpeciesId,
    concentration: f64,
    contributors: BTreeSet<AntId>,
}

impl Pheromone {
    pub fn new(species: SpeciesId, concentration: f64, contributor: AntId) -> Pheromone {
        Pheromone {
            species,
            concentration: clamp_concentration(concentration),
            contributors: BTreeSet::from([contributor]),
        }
    }

    pub fn species(&self) -> SpeciesId {
        self.species
    }

    pub fn concentration(&self) -> f64 {
        self.concentration
    }

    /// Ants that have deposited on this marker, each recorded once.
    pub fn contributors(&self) -> &BTreeSet<AntId> {
        &self.contributors
    }

    pub fn strengthen(&mut self, amount: f64, contributor: AntId) {
        self.concentration = clamp_concentration(self.concentration + amount);
        self.contributors.insert(contributor);
    }

    /// Takes `rate` off the concentration, never going below zero.
    /// Returns `true` once the marker has evaporated.
    pub fn decay(&mut self, rate: f64) -> bool {
        self.concentration = clamp_concentration(self.concentration - rate);
        self.is_spent()
    }

    pub fn is_spent(&self) -> bool {
        self.concentration <= 0.0
    }
}

fn clamp_concentration(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, MAX_CONCENTRATION)
}
