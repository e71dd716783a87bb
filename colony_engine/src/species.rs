use crate::entities::{AgentType, AntId, NestId, Rgb, SpeciesId};
use crate::error::SimulationError;
use crate::pheromone::MAX_CONCENTRATION;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};
use tracing::warn;

/// The traits a species can be edited on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Characteristic {
    Speed,
    Eyesight,
    EyeAngle,
    AntennaSize,
    AntennaAngle,
    PheromoneConcentration,
    QueenStepsMin,
    QueenStepsMax,
    HungerRate,
    CarryingThreshold,
    CarryingMax,
    DamageRate,
    SoldierRatio,
}

impl Characteristic {
    /// Every characteristic. Paired bounds come minimum first.
    pub const ALL: [Characteristic; 13] = [
        Characteristic::Speed,
        Characteristic::Eyesight,
        Characteristic::EyeAngle,
        Characteristic::AntennaSize,
        Characteristic::AntennaAngle,
        Characteristic::PheromoneConcentration,
        Characteristic::QueenStepsMin,
        Characteristic::QueenStepsMax,
        Characteristic::HungerRate,
        Characteristic::CarryingThreshold,
        Characteristic::CarryingMax,
        Characteristic::DamageRate,
        Characteristic::SoldierRatio,
    ];

    pub fn name(&self) -> &'static str {
        self.profile().name
    }

    pub fn from_name(name: &str) -> Option<Characteristic> {
        Characteristic::ALL
            .into_iter()
            .find(|characteristic| characteristic.name() == name)
    }

    fn profile(&self) -> Profile {
        use Characteristic::*;

        let (name, min, max, step, integer) = match self {
            Speed => ("speed", 0.0, 5.0, 0.1, false),
            Eyesight => ("eyesight", 0.0, 20.0, 0.5, false),
            EyeAngle => ("eye_angle", 0.1, TAU, 0.1, false),
            AntennaSize => ("antenna_size", 0.0, 20.0, 0.5, false),
            AntennaAngle => ("antenna_angle", 0.1, TAU, 0.1, false),
            PheromoneConcentration => {
                ("pheromone_concentration", 0.0, MAX_CONCENTRATION, 0.05, false)
            }
            QueenStepsMin => ("queen_steps_min", 1.0, 1000.0, 2.0, true),
            QueenStepsMax => ("queen_steps_max", 1.0, 1000.0, 2.0, true),
            HungerRate => ("hunger_rate", 0.0, 5.0, 0.005, false),
            CarryingThreshold => ("carrying_threshold", 1.0, 100.0, 1.0, true),
            CarryingMax => ("carrying_max", 1.0, 100.0, 1.0, true),
            DamageRate => ("damage_rate", 0.0, 1000.0, 1.0, false),
            SoldierRatio => ("soldier_ratio", 0.0, 1.0, 0.05, false),
        };

        Profile {
            name,
            min,
            max,
            step,
            integer,
        }
    }
}

/// Name, outer limits and mutation step of a characteristic.
struct Profile {
    name: &'static str,
    min: f64,
    max: f64,
    /// Largest change a single mutation applies.
    step: f64,
    integer: bool,
}

/// The numeric make-up shared by every ant of a species.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Traits {
    /// Distance covered per tick.
    pub speed: f64,
    /// Radius of the cone of sight.
    pub eyesight: f64,
    /// Full width of the cone of sight, in radians.
    pub eye_angle: f64,
    /// Radius of the cone of smell.
    pub antenna_size: f64,
    /// Full width of the cone of smell, in radians.
    pub antenna_angle: f64,
    /// Pheromone added to a cell on each secretion.
    pub pheromone_concentration: f64,
    /// Fewest steps a queen walks before founding.
    pub queen_steps_min: u32,
    /// Most steps a queen walks before founding.
    pub queen_steps_max: u32,
    /// Hunger lost per tick.
    pub hunger_rate: f64,
    /// Load at which a worker heads home.
    pub carrying_threshold: u32,
    pub carrying_max: u32,
    /// Health a soldier takes off per strike.
    pub damage_rate: f64,
    /// Chance that a nest raises a soldier instead of a worker.
    pub soldier_ratio: f64,
}

impl Default for Traits {
    fn default() -> Self {
        Self {
            speed: 1.0,
            eyesight: 5.0,
            eye_angle: FRAC_PI_2,
            antenna_size: 5.0,
            antenna_angle: FRAC_PI_2,
            pheromone_concentration: 0.4,
            queen_steps_min: 10,
            queen_steps_max: 40,
            hunger_rate: 0.02,
            carrying_threshold: 3,
            carrying_max: 5,
            damage_rate: 10.0,
            soldier_ratio: 0.2,
        }
    }
}

impl Traits {
    pub fn get(&self, characteristic: Characteristic) -> f64 {
        match characteristic {
            Characteristic::Speed => self.speed,
            Characteristic::Eyesight => self.eyesight,
            Characteristic::EyeAngle => self.eye_angle,
            Characteristic::AntennaSize => self.antenna_size,
            Characteristic::AntennaAngle => self.antenna_angle,
            Characteristic::PheromoneConcentration => self.pheromone_concentration,
            Characteristic::QueenStepsMin => self.queen_steps_min as f64,
            Characteristic::QueenStepsMax => self.queen_steps_max as f64,
            Characteristic::HungerRate => self.hunger_rate,
            Characteristic::CarryingThreshold => self.carrying_threshold as f64,
            Characteristic::CarryingMax => self.carrying_max as f64,
            Characteristic::DamageRate => self.damage_rate,
            Characteristic::SoldierRatio => self.soldier_ratio,
        }
    }

    /// The range a characteristic must lie in. Paired bounds depend on each other, so a
    /// minimum never passes its maximum.
    pub fn bounds(&self, characteristic: Characteristic) -> (f64, f64) {
        let Profile { min, max, .. } = characteristic.profile();
        match characteristic {
            Characteristic::QueenStepsMin => (min, self.queen_steps_max as f64),
            Characteristic::QueenStepsMax => (self.queen_steps_min as f64, max),
            Characteristic::CarryingThreshold => (min, self.carrying_max as f64),
            Characteristic::CarryingMax => (self.carrying_threshold as f64, max),
            _ => (min, max),
        }
    }

    /// Checks that every characteristic already lies in its range.
    pub fn validate(&self) -> Result<(), SimulationError> {
        for characteristic in Characteristic::ALL {
            let (min, max) = self.bounds(characteristic);
            let value = self.get(characteristic);
            if !(value >= min && value <= max) {
                return Err(SimulationError::InvalidConfig(
                    "a species trait is outside its valid range",
                ));
            }
        }
        Ok(())
    }

    /// Sets a characteristic, clamping it into its valid range first.
    /// Returns the value actually applied.
    pub fn set(&mut self, characteristic: Characteristic, value: f64) -> f64 {
        let (min, max) = self.bounds(characteristic);
        let mut value = if value.is_nan() {
            min
        } else {
            value.max(min).min(max)
        };
        if characteristic.profile().integer {
            value = value.round();
        }

        match characteristic {
            Characteristic::Speed => self.speed = value,
            Characteristic::Eyesight => self.eyesight = value,
            Characteristic::EyeAngle => self.eye_angle = value,
            Characteristic::AntennaSize => self.antenna_size = value,
            Characteristic::AntennaAngle => self.antenna_angle = value,
            Characteristic::PheromoneConcentration => self.pheromone_concentration = value,
            Characteristic::QueenStepsMin => self.queen_steps_min = value as u32,
            Characteristic::QueenStepsMax => self.queen_steps_max = value as u32,
            Characteristic::HungerRate => self.hunger_rate = value,
            Characteristic::CarryingThreshold => self.carrying_threshold = value as u32,
            Characteristic::CarryingMax => self.carrying_max = value as u32,
            Characteristic::DamageRate => self.damage_rate = value,
            Characteristic::SoldierRatio => self.soldier_ratio = value,
        }

        value
    }

    /// A copy with every characteristic nudged independently by a small random amount.
    pub fn mutate<R: Rng>(&self, rng: &mut R) -> Traits {
        let mut traits = self.clone();

        for characteristic in Characteristic::ALL {
            let Profile { step, integer, .. } = characteristic.profile();
            let offset = if integer {
                rng.gen_range(-(step as i64)..=step as i64) as f64
            } else {
                rng.gen_range(-step..=step)
            };
            traits.set(characteristic, traits.get(characteristic) + offset);
        }

        traits
    }
}

/// The colours used to draw a species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub worker: Rgb,
    pub soldier: Rgb,
    pub queen: Rgb,
    pub nest: Rgb,
    pub pheromone: Rgb,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            worker: Rgb::from_hex(0x1C1C1C),
            soldier: Rgb::from_hex(0x1C1C1C),
            queen: Rgb::from_hex(0x00FF00),
            nest: Rgb::from_hex(0x555555),
            pheromone: Rgb::from_hex(0xE8E5A3),
        }
    }
}

impl ColorScheme {
    pub fn for_kind(&self, kind: AgentType) -> Rgb {
        match kind {
            AgentType::Queen => self.queen,
            AgentType::Worker => self.worker,
            AgentType::Soldier => self.soldier,
            AgentType::NestPiece => self.nest,
        }
    }

    /// A copy with every channel drifted a little, so related species look alike.
    pub fn mutate<R: Rng>(&self, rng: &mut R) -> ColorScheme {
        ColorScheme {
            worker: drift(self.worker, rng),
            soldier: drift(self.soldier, rng),
            queen: drift(self.queen, rng),
            nest: drift(self.nest, rng),
            pheromone: drift(self.pheromone, rng),
        }
    }
}

fn drift<R: Rng>(colour: Rgb, rng: &mut R) -> Rgb {
    let mut channel = |value: u8| (value as i16 + rng.gen_range(-24..=24)).clamp(0, 255) as u8;
    Rgb::new(channel(colour.r), channel(colour.g), channel(colour.b))
}

/// A lineage of ants sharing traits and colours.
///
/// A species only refers to its ants and nests by id; the simulation owns them. It is never
/// destroyed and is simply left empty once its last member dies.
#[derive(Clone, Debug)]
pub struct Species {
    id: SpeciesId,
    traits: Traits,
    colors: ColorScheme,
    parent: Option<SpeciesId>,
    ants: Vec<AntId>,
    nests: Vec<NestId>,
}

impl Species {
    pub fn new(id: SpeciesId, traits: Traits, colors: ColorScheme) -> Species {
        Species {
            id,
            traits,
            colors,
            parent: None,
            ants: Vec::new(),
            nests: Vec::new(),
        }
    }

    /// A new, empty species descended from this one.
    pub fn mutate<R: Rng>(&self, id: SpeciesId, rng: &mut R) -> Species {
        Species {
            id,
            traits: self.traits.mutate(rng),
            colors: self.colors.mutate(rng),
            parent: Some(self.id),
            ants: Vec::new(),
            nests: Vec::new(),
        }
    }

    pub fn id(&self) -> SpeciesId {
        self.id
    }

    pub fn traits(&self) -> &Traits {
        &self.traits
    }

    pub fn colors(&self) -> &ColorScheme {
        &self.colors
    }

    pub fn parent(&self) -> Option<SpeciesId> {
        self.parent
    }

    /// Live ants in order of birth.
    pub fn ants(&self) -> &[AntId] {
        &self.ants
    }

    /// Live nests in order of founding.
    pub fn nests(&self) -> &[NestId] {
        &self.nests
    }

    pub fn is_extinct(&self) -> bool {
        self.ants.is_empty() && self.nests.is_empty()
    }

    /// Edits one trait. Out-of-range values are clamped and reported.
    pub fn set_characteristic(&mut self, characteristic: Characteristic, value: f64) -> f64 {
        let applied = self.traits.set(characteristic, value);
        if applied != value {
            warn!(
                species = self.id.0,
                characteristic = characteristic.name(),
                requested = value,
                applied,
                "Trait value out of range, clamped"
            );
        }
        applied
    }

    pub(crate) fn add_ant(&mut self, ant: AntId) {
        self.ants.push(ant);
    }

    pub(crate) fn remove_ant(&mut self, ant: AntId) {
        self.ants.retain(|other| *other != ant);
    }

    pub(crate) fn add_nest(&mut self, nest: NestId) {
        self.nests.push(nest);
    }

    pub(crate) fn remove_nest(&mut self, nest: NestId) {
        self.nests.retain(|other| *other != nest);
    }
}
