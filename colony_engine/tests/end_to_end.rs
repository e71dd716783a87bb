use colony_engine::pheromone::MAX_CONCENTRATION;
use colony_engine::{
    AgentType, Caste, Characteristic, ColorScheme, Coord, FoodConfig, Layout, Occupant,
    Simulation, SimulationConfig, SimulationError, Traits, WorkerGoal,
};
use std::f64::consts::TAU;

fn quiet_food() -> FoodConfig {
    FoodConfig {
        sources: vec![],
        grow_chance: 0.0,
        ..FoodConfig::default()
    }
}

fn empty(width: usize, height: usize) -> Simulation {
    let config = SimulationConfig {
        width,
        height,
        starting_queens: 0,
        nest_radius: 0,
        food: quiet_food(),
        ..SimulationConfig::default()
    };
    let mut simulation = Simulation::new(config, None).unwrap();
    simulation.create_environment().unwrap();
    simulation
}

fn queens(simulation: &Simulation) -> usize {
    simulation
        .ants()
        .filter(|ant| ant.kind() == AgentType::Queen)
        .count()
}

#[test]
fn when_a_queen_walks_three_steps_she_founds_one_nest_on_the_fourth_tick() {
    let layout = Layout::parse(
        "\
        rows 10
        cols 10
        m ..........
        m ..........
        m ..........
        m ..........
        m ..........
        m .....Q....
        m ..........
        m ..........
        m ..........
        m ..........",
    )
    .unwrap();
    let config = SimulationConfig {
        food: quiet_food(),
        default_traits: Traits {
            queen_steps_min: 3,
            queen_steps_max: 3,
            ..Traits::default()
        },
        ..SimulationConfig::default()
    };
    let mut simulation = Simulation::from_layout(layout, config, None).unwrap();
    simulation.create_environment().unwrap();
    let founding = simulation.founding_species().unwrap();

    for _ in 0..3 {
        simulation.step();
        assert_eq!(simulation.nests().count(), 0);
        assert_eq!(queens(&simulation), 1);
    }
    simulation.step();

    assert_eq!(simulation.nests().count(), 1);
    assert_eq!(queens(&simulation), 0);

    let nest = simulation.nests().next().unwrap();
    assert!((nest.health() - simulation.config().queen_health).abs() < 1e-6);
    let child = simulation.species(nest.species()).unwrap();
    assert_ne!(child.id(), founding);
    assert_eq!(child.parent(), Some(founding));
    assert!(simulation.species(founding).unwrap().ants().is_empty());
}

#[test]
fn when_a_worker_fills_up_next_to_its_nest_it_delivers_the_load() {
    let mut simulation = empty(10, 10);
    let species = simulation.founding_species().unwrap();
    let nest = simulation
        .found_nest(species, Coord::new(5.0, 5.0), 100.0)
        .unwrap();
    assert!(simulation.add_food(Coord::new(6.0, 5.0), 5));
    let worker = simulation
        .spawn_ant(
            species,
            AgentType::Worker,
            Coord::new(6.0, 5.0),
            Some(nest),
            100.0,
        )
        .unwrap();

    for expected in 1..=3 {
        simulation.step();
        assert_eq!(simulation.ant(worker).unwrap().carrying(), expected);
    }

    simulation.step();
    let ant = simulation.ant(worker).unwrap();
    assert_eq!(
        ant.caste(),
        Caste::Worker {
            goal: WorkerGoal::ReturnToNest
        }
    );
    assert_eq!(ant.carrying(), 3);

    simulation.step();
    assert_eq!(simulation.ant(worker).unwrap().carrying(), 0);
    assert_eq!(simulation.nest(nest).unwrap().food(), 3);
    assert_eq!(simulation.grid().total_food(), 2);
}

#[test]
fn when_a_soldier_meets_a_still_enemy_it_kills_it() {
    let mut simulation = empty(12, 12);
    let ours = simulation.create_species(
        Traits {
            eye_angle: TAU,
            damage_rate: 50.0,
            ..Traits::default()
        },
        ColorScheme::default(),
    );
    let theirs = simulation.create_species(
        Traits {
            speed: 0.0,
            ..Traits::default()
        },
        ColorScheme::default(),
    );
    let soldier = simulation
        .spawn_ant(ours, AgentType::Soldier, Coord::new(5.0, 5.0), None, 100.0)
        .unwrap();
    let victim = simulation
        .spawn_ant(theirs, AgentType::Worker, Coord::new(5.0, 8.0), None, 100.0)
        .unwrap();

    for _ in 0..10 {
        simulation.step();
        if simulation.ant(victim).is_none() {
            break;
        }
    }

    assert!(simulation.ant(victim).is_none());
    assert!(!simulation.grid().contains(Occupant::Ant(victim)));
    assert!(simulation.ant(soldier).is_some());
    assert!(simulation.species(theirs).unwrap().is_extinct());
}

#[test]
fn when_the_simulation_is_paused_advancing_does_nothing() {
    let mut simulation = empty(10, 10);

    assert!(!simulation.is_running());
    assert!(!simulation.advance_one_tick());
    assert_eq!(simulation.tick(), 0);

    simulation.set_running(true);
    assert!(simulation.advance_one_tick());
    assert_eq!(simulation.tick(), 1);

    simulation.set_running(false);
    simulation.step();
    assert_eq!(simulation.tick(), 2);
}

#[test]
fn when_setting_a_trait_out_of_range_it_is_clamped() {
    let mut simulation = empty(10, 10);
    let species = simulation.founding_species().unwrap();

    let applied = simulation
        .set_species_trait(species, Characteristic::Speed, -3.0)
        .unwrap();

    assert_eq!(applied, 0.0);
    assert_eq!(simulation.species_traits(species).unwrap().speed, 0.0);

    let applied = simulation
        .set_species_trait(species, Characteristic::QueenStepsMin, 100.0)
        .unwrap();
    let traits = simulation.species_traits(species).unwrap();
    assert_eq!(applied, traits.queen_steps_max as f64);
    assert_eq!(traits.queen_steps_min, traits.queen_steps_max);
}

#[test]
fn when_setting_a_trait_of_an_unknown_species_an_error_is_returned() {
    let mut simulation = empty(10, 10);
    let unknown = colony_engine::SpeciesId(999);

    let result = simulation.set_species_trait(unknown, Characteristic::Speed, 1.0);

    assert!(matches!(result, Err(SimulationError::UnknownSpecies(id)) if id == unknown));
}

#[test]
fn when_running_a_random_world_the_invariants_hold_every_tick() {
    let config = SimulationConfig::from_json(
        r#"{
            "width": 30,
            "height": 20,
            "seed": 11,
            "starting_queens": 4,
            "default_traits": { "queen_steps_min": 2, "queen_steps_max": 6 }
        }"#,
    )
    .unwrap();
    let mut simulation = Simulation::new(config, None).unwrap();
    simulation.create_environment().unwrap();
    simulation.set_running(true);

    for _ in 0..300 {
        assert!(simulation.advance_one_tick());
        let grid = simulation.grid();

        for ant in simulation.ants() {
            assert_eq!(
                grid.location(Occupant::Ant(ant.id())),
                Some(grid.cell_index(ant.position()))
            );
            assert!(ant.position().x >= 0.0 && ant.position().x < 30.0);
            assert!(ant.position().y >= 0.0 && ant.position().y < 20.0);
        }

        for nest in simulation.nests() {
            assert!(nest.is_alive());
            let species = simulation.species(nest.species()).unwrap();
            assert!(species.nests().contains(&nest.id()));
        }

        for (_, cell) in grid.cells() {
            for pheromone in cell.pheromones() {
                assert!(pheromone.concentration() > 0.0);
                assert!(pheromone.concentration() <= MAX_CONCENTRATION);
            }
            if let Some(food) = cell.food() {
                assert!(food.amount() > 0);
            }
        }
    }
}

#[test]
fn when_two_worlds_share_a_seed_they_look_the_same() {
    let config = SimulationConfig {
        width: 40,
        height: 30,
        seed: 5,
        ..SimulationConfig::default()
    };
    let mut first = Simulation::new(config.clone(), None).unwrap();
    let mut second = Simulation::new(config, None).unwrap();
    first.create_environment().unwrap();
    second.create_environment().unwrap();

    for _ in 0..150 {
        first.step();
        second.step();
    }

    assert_eq!(first.snapshot(), second.snapshot());
}

#[test]
fn when_recreating_the_environment_the_world_starts_over() {
    let mut simulation = empty(10, 10);
    let species = simulation.founding_species().unwrap();
    simulation
        .spawn_ant(species, AgentType::Worker, Coord::new(1.0, 1.0), None, 100.0)
        .unwrap();
    simulation.step();

    simulation.create_environment().unwrap();

    assert_eq!(simulation.tick(), 0);
    assert_eq!(simulation.ants().count(), 0);
    assert_eq!(simulation.nests().count(), 0);
    assert_eq!(simulation.all_species().count(), 1);
}

#[test]
fn when_saving_a_replay_every_tick_is_recorded() {
    let path = std::env::temp_dir().join("colony_engine_end_to_end_replay.json");
    let config = SimulationConfig {
        width: 20,
        height: 20,
        seed: 2,
        ..SimulationConfig::default()
    };
    let mut simulation =
        Simulation::new(config, Some(path.to_string_lossy().into_owned())).unwrap();
    simulation.create_environment().unwrap();
    for _ in 0..25 {
        simulation.step();
    }

    simulation.save_replay().unwrap();

    let replay: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(replay["seed"], 2);
    assert_eq!(replay["ticks"].as_array().unwrap().len(), 26);
    assert_eq!(replay["ticks"][0]["events"][0]["event_type"], "Spawn");
}
