use crate::entities::{AgentType, AntId, NestId, SpeciesId};
use crate::geometry::{Coord, Torus};
use crate::map::Occupant;
use crate::species::Traits;
use serde::Serialize;

/// What a queen is working towards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueenGoal {
    None,
    PickDirection,
    GotoNestSite,
    /// Terminal: founding consumes the queen.
    CreateNest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerGoal {
    FindFood,
    ReturnToNest,
    Eat,
    /// Carrying a full load with no nest to take it to.
    Idle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoldierGoal {
    Patrol,
    Attack(Occupant),
    Eat,
}

/// The kind of an ant together with the state only that kind has.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Caste {
    Queen { goal: QueenGoal, steps: u32 },
    Worker { goal: WorkerGoal },
    Soldier { goal: SoldierGoal },
}

impl Caste {
    /// The starting state for an ant of the given kind, if it is a kind of ant at all.
    pub fn hatch(kind: AgentType) -> Option<Caste> {
        match kind {
            AgentType::Queen => Some(Caste::Queen {
                goal: QueenGoal::None,
                steps: 0,
            }),
            AgentType::Worker => Some(Caste::Worker {
                goal: WorkerGoal::FindFood,
            }),
            AgentType::Soldier => Some(Caste::Soldier {
                goal: SoldierGoal::Patrol,
            }),
            AgentType::NestPiece => None,
        }
    }

    pub fn kind(&self) -> AgentType {
        match self {
            Caste::Queen { .. } => AgentType::Queen,
            Caste::Worker { .. } => AgentType::Worker,
            Caste::Soldier { .. } => AgentType::Soldier,
        }
    }
}

/// An occupant seen in the cone of sight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sighting {
    pub occupant: Occupant,
    pub species: SpeciesId,
    pub position: Coord,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoodSighting {
    pub cell: usize,
    pub position: Coord,
    pub amount: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PheromoneSighting {
    pub cell: usize,
    pub position: Coord,
    pub species: SpeciesId,
    pub concentration: f64,
}

/// Everything an ant noticed this tick, in scan order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Perception {
    pub ants: Vec<Sighting>,
    pub food: Vec<FoodSighting>,
    pub pheromones: Vec<PheromoneSighting>,
}

/// A live ant.
#[derive(Clone, Debug)]
pub struct Ant {
    pub(crate) id: AntId,
    pub(crate) species: SpeciesId,
    pub(crate) nest: Option<NestId>,
    pub(crate) caste: Caste,
    pub(crate) position: Coord,
    pub(crate) facing: f64,
    pub(crate) hunger: f64,
    pub(crate) carrying: u32,
    pub(crate) health: f64,
    pub(crate) target: Option<Coord>,
    pub(crate) sleep: u32,
    pub(crate) in_view: Perception,
    pub(crate) in_range: Vec<PheromoneSighting>,
}

impl Ant {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: AntId,
        species: SpeciesId,
        nest: Option<NestId>,
        caste: Caste,
        position: Coord,
        facing: f64,
        hunger: f64,
        health: f64,
    ) -> Ant {
        Ant {
            id,
            species,
            nest,
            caste,
            position,
            facing,
            hunger,
            carrying: 0,
            health,
            target: None,
            sleep: 0,
            in_view: Perception::default(),
            in_range: Vec::new(),
        }
    }

    pub fn id(&self) -> AntId {
        self.id
    }

    pub fn species(&self) -> SpeciesId {
        self.species
    }

    /// The ant's home nest. It may since have been destroyed.
    pub fn nest(&self) -> Option<NestId> {
        self.nest
    }

    pub fn caste(&self) -> Caste {
        self.caste
    }

    pub fn kind(&self) -> AgentType {
        self.caste.kind()
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    /// Radians clockwise from up.
    pub fn facing(&self) -> f64 {
        self.facing
    }

    pub fn hunger(&self) -> f64 {
        self.hunger
    }

    pub fn carrying(&self) -> u32 {
        self.carrying
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn target(&self) -> Option<Coord> {
        self.target
    }

    pub fn sleep(&self) -> u32 {
        self.sleep
    }

    pub fn in_view(&self) -> &Perception {
        &self.in_view
    }

    pub fn in_range(&self) -> &[PheromoneSighting] {
        &self.in_range
    }

    pub fn is_hungry(&self, threshold: f64) -> bool {
        self.hunger < threshold
    }

    pub(crate) fn starve(&mut self, rate: f64) {
        self.hunger = (self.hunger - rate).max(0.0);
    }

    pub(crate) fn is_starved(&self) -> bool {
        self.hunger <= 0.0
    }

    pub(crate) fn feed(&mut self, amount: f64, max: f64) {
        self.hunger = (self.hunger + amount).clamp(0.0, max);
    }

    /// Turns the ant towards `target` and remembers it.
    pub(crate) fn head_for(&mut self, torus: &Torus, target: Coord) {
        self.facing = torus.direction_to(self.position, target);
        self.target = Some(target);
    }
}

/// The next goal of a queen. Direction and step count are picked when acting.
pub fn decide_queen(goal: QueenGoal, steps: u32) -> QueenGoal {
    match goal {
        QueenGoal::None => QueenGoal::PickDirection,
        QueenGoal::GotoNestSite if steps == 0 => QueenGoal::CreateNest,
        goal => goal,
    }
}

/// The next goal of a worker: eating comes first, then taking a full load home.
pub fn decide_worker(
    ant: &Ant,
    traits: &Traits,
    hunger_threshold: f64,
    has_nest: bool,
) -> WorkerGoal {
    if ant.is_hungry(hunger_threshold) {
        WorkerGoal::Eat
    } else if ant.carrying >= traits.carrying_threshold {
        if has_nest {
            WorkerGoal::ReturnToNest
        } else {
            WorkerGoal::Idle
        }
    } else {
        WorkerGoal::FindFood
    }
}

/// The next goal of a soldier. A soldier keeps its quarry while it can still see it,
/// otherwise it goes after the nearest occupant of another species.
pub fn decide_soldier(ant: &Ant, torus: &Torus, hunger_threshold: f64) -> SoldierGoal {
    if ant.is_hungry(hunger_threshold) {
        return SoldierGoal::Eat;
    }

    let enemies = || {
        ant.in_view
            .ants
            .iter()
            .filter(|sighting| sighting.species != ant.species)
    };

    if let Caste::Soldier {
        goal: SoldierGoal::Attack(quarry),
    } = ant.caste
    {
        if enemies().any(|sighting| sighting.occupant == quarry) {
            return SoldierGoal::Attack(quarry);
        }
    }

    let mut nearest: Option<(&Sighting, f64)> = None;
    for sighting in enemies() {
        let distance = torus.distance(ant.position, sighting.position);
        if nearest.map_or(true, |(_, closest)| distance < closest) {
            nearest = Some((sighting, distance));
        }
    }

    match nearest {
        Some((sighting, _)) => SoldierGoal::Attack(sighting.occupant),
        None => SoldierGoal::Patrol,
    }
}

/// How hard a pile of food is to go for: further is harder, bigger is easier.
pub fn effort(distance: f64, amount: u32) -> f64 {
    distance / amount.max(1) as f64
}

/// The visible food needing the least effort. Ties go to the first one seen.
pub fn least_effort<'a>(
    food: &'a [FoodSighting],
    from: Coord,
    torus: &Torus,
) -> Option<&'a FoodSighting> {
    let mut best: Option<(&FoodSighting, f64)> = None;
    for sighting in food {
        let cost = effort(torus.distance(from, sighting.position), sighting.amount);
        if best.map_or(true, |(_, lowest)| cost < lowest) {
            best = Some((sighting, cost));
        }
    }
    best.map(|(sighting, _)| sighting)
}

/// The strongest marker of `species` outside the cell the ant stands in.
pub fn strongest_scent(
    smelled: &[PheromoneSighting],
    species: SpeciesId,
    own_cell: usize,
) -> Option<&PheromoneSighting> {
    let mut strongest: Option<&PheromoneSighting> = None;
    for sighting in smelled
        .iter()
        .filter(|sighting| sighting.species == species && sighting.cell != own_cell)
    {
        if strongest.map_or(true, |best| sighting.concentration > best.concentration) {
            strongest = Some(sighting);
        }
    }
    strongest
}
