use crate::entities::{AgentType, SpeciesId};
use serde::Serialize;
use serde_json::json;
use std::io::{self, Write};
use std::collections::{HashMap, VecDeque};
use std::{fs::File, io::BufWriter};

/// Creates the logger for a run. Without a filename nothing is recorded.
///
/// A JSON replay is held in memory until it is saved. With a `window` only the most
/// recent `window` ticks and their events are kept, otherwise the whole run is.
pub fn create_replay_logger(
    filename: Option<String>,
    width: usize,
    height: usize,
    seed: u64,
    window: Option<usize>,
) -> Box<dyn ReplayLogger> {
    match filename {
        None => Box::new(NoOpReplayLogger {}),
        Some(filename) => Box::new(JsonReplayLogger::new(filename, width, height, seed, window)),
    }
}

/// Records what happens during a run so it can be played back later.
pub trait ReplayLogger: Send + Sync {
    #[allow(unused_variables)]
    fn log_tick(&mut self, tick: u64, populations: Vec<Population>) {}

    #[allow(unused_variables)]
    fn log_event(&mut self, tick: u64, event: Event) {}

    fn clear(&mut self) {}

    fn save(&self) -> io::Result<()> {
        Ok(())
    }

    fn log_spawn_ant(
        &mut self,
        tick: u64,
        id: u64,
        kind: AgentType,
        species: SpeciesId,
        location: (usize, usize),
    ) {
        self.log_event(
            tick,
            Event {
                event_type: EventType::Spawn,
                entity: Entity::Ant(kind),
                entity_id: Some(id),
                species: Some(species),
                parent: None,
                location: Some(location),
                destination: None,
            },
        );
    }

    fn log_spawn_food(&mut self, tick: u64, location: (usize, usize)) {
        self.log_event(
            tick,
            Event {
                event_type: EventType::Spawn,
                entity: Entity::Food,
                entity_id: None,
                species: None,
                parent: None,
                location: Some(location),
                destination: None,
            },
        );
    }

    fn log_remove_ant(&mut self, tick: u64, id: u64, kind: AgentType, location: (usize, usize)) {
        self.log_remove(tick, Entity::Ant(kind), Some(id), Some(location));
    }

    fn log_remove_food(&mut self, tick: u64, location: (usize, usize)) {
        self.log_remove(tick, Entity::Food, None, Some(location));
    }

    fn log_remove_nest(&mut self, tick: u64, id: u64, location: (usize, usize)) {
        self.log_remove(tick, Entity::Nest, Some(id), Some(location));
    }

    fn log_found(
        &mut self,
        tick: u64,
        nest: u64,
        species: SpeciesId,
        parent: SpeciesId,
        location: (usize, usize),
    ) {
        self.log_event(
            tick,
            Event {
                event_type: EventType::Found,
                entity: Entity::Nest,
                entity_id: Some(nest),
                species: Some(species),
                parent: Some(parent),
                location: Some(location),
                destination: None,
            },
        );
    }

    fn log_attack(&mut self, tick: u64, location: (usize, usize), destination: (usize, usize)) {
        self.log_event(
            tick,
            Event {
                event_type: EventType::Attack,
                entity: Entity::Ant(AgentType::Soldier),
                entity_id: None,
                species: None,
                parent: None,
                location: Some(location),
                destination: Some(destination),
            },
        );
    }

    fn log_remove(
        &mut self,
        tick: u64,
        entity: Entity,
        id: Option<u64>,
        location: Option<(usize, usize)>,
    ) {
        self.log_event(
            tick,
            Event {
                event_type: EventType::Remove,
                entity,
                entity_id: id,
                species: None,
                parent: None,
                location,
                destination: None,
            },
        );
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EventType {
    Spawn,
    Remove,
    Found,
    Attack,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Entity {
    Ant(AgentType),
    Nest,
    Food,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Event {
    pub event_type: EventType,
    pub entity: Entity,
    pub entity_id: Option<u64>,
    pub species: Option<SpeciesId>,
    /// Species a newly founded colony descends from.
    pub parent: Option<SpeciesId>,
    pub location: Option<(usize, usize)>,
    pub destination: Option<(usize, usize)>,
}

/// Head count of one species at the end of a tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Population {
    pub species: SpeciesId,
    pub ants: usize,
    pub nests: usize,
}

struct Tick {
    tick: u64,
    populations: Vec<Population>,
}

struct NoOpReplayLogger;
impl ReplayLogger for NoOpReplayLogger {}

struct JsonReplayLogger {
    filename: String,
    width: usize,
    height: usize,
    seed: u64,
    window: Option<usize>,
    ticks: VecDeque<Tick>,
    events: HashMap<u64, Vec<Event>>,
}

impl JsonReplayLogger {
    pub fn new(
        filename: String,
        width: usize,
        height: usize,
        seed: u64,
        window: Option<usize>,
    ) -> JsonReplayLogger {
        JsonReplayLogger {
            filename,
            width,
            height,
            seed,
            window,
            ticks: VecDeque::new(),
            events: HashMap::new(),
        }
    }
}

impl ReplayLogger for JsonReplayLogger {
    fn log_tick(&mut self, tick: u64, populations: Vec<Population>) {
        self.ticks.push_back(Tick { tick, populations });

        let Some(window) = self.window else {
            return;
        };
        while self.ticks.len() > window {
            if let Some(dropped) = self.ticks.pop_front() {
                self.events.retain(|&tick, _| tick > dropped.tick);
            }
        }
    }

    fn log_event(&mut self, tick: u64, event: Event) {
        self.events.entry(tick).or_default().push(event);
    }

    fn clear(&mut self) {
        self.ticks.clear();
        self.events.clear();
    }

    fn save(&self) -> io::Result<()> {
        let file = File::create(&self.filename)?;
        let ticks: Vec<_> = self
            .ticks
            .iter()
            .map(|tick| {
                json!({
                    "tick": tick.tick,
                    "populations": tick.populations,
                    "events": self.events.get(&tick.tick).unwrap_or(&Vec::new()),
                })
            })
            .collect();

        let data = json!({
            "seed": self.seed,
            "grid": {
                "width": self.width,
                "height": self.height,
            },
            "ticks": ticks,
        });

        let mut writer = BufWriter::new(&file);
        serde_json::to_writer_pretty(&mut writer, &data)?;
        writer.flush()
    }
}
