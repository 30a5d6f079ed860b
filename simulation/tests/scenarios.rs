use std::{collections::HashMap, time::Duration};

use glam::Vec2;
use tower_defense_core::{
    CellCoord, Command, EnemyId, Event, GameStatus, Health, Path, PlacementError, Rules, RulesError,
};
use tower_defense_simulation::Simulation;
use tower_defense_system_spawning::{Config, Spawning};

const FRAME: Duration = Duration::from_millis(16);

fn simulation_with(rules: Rules, waypoints: Vec<Vec2>) -> Simulation {
    let path = Path::new(waypoints).expect("valid path");
    Simulation::with_rules(rules, path).expect("valid rules")
}

#[test]
fn five_towers_exhaust_starting_money() {
    let mut simulation = Simulation::new();

    for column in 0..5 {
        let placed = simulation.request_placement(CellCoord::new(column, 0));
        assert!(placed.is_ok());
    }

    assert_eq!(
        simulation.request_placement(CellCoord::new(5, 0)),
        Err(PlacementError::InsufficientFunds {
            required: 20,
            available: 0,
        })
    );
    assert_eq!(simulation.economy().money, 0);
    assert_eq!(simulation.towers().len(), 5);

    let rejections = simulation
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, Event::TowerPlacementRejected { .. }))
        .count();
    assert_eq!(rejections, 1);
}

#[test]
fn ten_hits_kill_an_enemy_and_pay_the_reward() {
    let rules = Rules {
        enemy_speed: 0.01,
        ..Rules::default()
    };
    let waypoints = vec![Vec2::new(10.0, 10.0), Vec2::new(10.0, 600.0)];
    let mut simulation = simulation_with(rules, waypoints);
    assert!(simulation.request_placement(CellCoord::new(0, 0)).is_ok());
    let enemy = simulation.spawn_timer_fired().expect("run is active");
    let _ = simulation.drain_events();

    let mut remaining = Vec::new();
    let mut killed = false;
    for second in 1..=10 {
        simulation.tick(Duration::from_secs(second));
        for event in simulation.drain_events() {
            match event {
                Event::ProjectileHit {
                    enemy: hit,
                    remaining: health,
                    ..
                } => {
                    assert_eq!(hit, enemy);
                    remaining.push(health.get());
                }
                Event::EnemyKilled {
                    enemy: dead,
                    reward,
                } => {
                    assert_eq!(dead, enemy);
                    assert_eq!(reward, 10);
                    killed = true;
                }
                _ => {}
            }
        }
    }

    assert_eq!(remaining, vec![90, 80, 70, 60, 50, 40, 30, 20, 10, 0]);
    assert!(killed);
    assert!(simulation.enemies().is_empty());

    let economy = simulation.economy();
    assert_eq!(economy.kill_count, 1);
    assert_eq!(economy.money, 90);
}

#[test]
fn ten_leaks_end_the_run_and_freeze_enemies() {
    let waypoints = vec![Vec2::ZERO, Vec2::new(2.0, 0.0)];
    let mut simulation = simulation_with(Rules::default(), waypoints);
    for _ in 0..12 {
        assert!(simulation.spawn_timer_fired().is_some());
    }

    let mut now = Duration::ZERO;
    while !simulation.is_over() && now < Duration::from_secs(1) {
        now += FRAME;
        simulation.tick(now);
    }

    assert_eq!(simulation.status(), GameStatus::Over);
    let economy = simulation.economy();
    assert_eq!(economy.leaked_count, 10);
    assert_eq!(economy.leak_limit, 10);

    let events = simulation.drain_events();
    let game_overs = events
        .iter()
        .filter(|event| matches!(event, Event::GameOver { .. }))
        .count();
    assert_eq!(game_overs, 1);

    let frozen = simulation.enemies().into_vec();
    assert_eq!(frozen.len(), 2);
    for _ in 0..30 {
        now += FRAME;
        simulation.tick(now);
    }
    assert_eq!(simulation.enemies().into_vec(), frozen);
    assert_eq!(simulation.spawn_timer_fired(), None);
    assert_eq!(simulation.economy().leaked_count, 10);
}

#[test]
fn projectiles_land_on_a_parked_target() {
    let overshooting = Rules {
        projectile_speed: 30.0,
        enemy_speed: 0.0001,
        ..Rules::default()
    };
    let waypoints = vec![Vec2::new(10.0, 25.0), Vec2::new(10.0, 600.0)];
    let path = Path::new(waypoints.clone()).expect("valid path");
    assert!(matches!(
        Simulation::with_rules(overshooting, path),
        Err(RulesError::ProjectileOvershoots { .. })
    ));

    let rules = Rules {
        projectile_speed: 19.0,
        enemy_speed: 0.0001,
        ..Rules::default()
    };
    let mut simulation = simulation_with(rules, waypoints);
    assert!(simulation.request_placement(CellCoord::new(0, 0)).is_ok());
    assert!(simulation.spawn_timer_fired().is_some());

    let mut fired = 0;
    let mut hits = 0;
    for frame in 1..=600 {
        simulation.tick(FRAME * frame);
        for event in simulation.drain_events() {
            match event {
                Event::ProjectileFired { .. } => fired += 1,
                Event::ProjectileHit { .. } => hits += 1,
                _ => {}
            }
        }
        assert!(simulation.projectiles().len() <= 1);
    }

    assert!(hits > 0);
    assert_eq!(fired - hits, simulation.projectiles().len());
}

#[test]
fn placement_is_still_accepted_after_the_run_ends() {
    let rules = Rules {
        leak_limit: 0,
        ..Rules::default()
    };
    let mut simulation = simulation_with(rules, vec![Vec2::ZERO, Vec2::new(2.0, 0.0)]);
    simulation.tick(FRAME);
    assert!(simulation.is_over());

    assert!(simulation.request_placement(CellCoord::new(4, 4)).is_ok());
}

#[test]
fn tower_fires_at_most_twice_in_two_seconds() {
    let mut simulation = Simulation::new();
    assert!(simulation.request_placement(CellCoord::new(0, 5)).is_ok());
    let _ = simulation.spawn_timer_fired();

    let mut shots = 0;
    let mut now = Duration::ZERO;
    while now < Duration::from_secs(2) {
        now += FRAME;
        simulation.tick(now);
        shots += simulation
            .drain_events()
            .iter()
            .filter(|event| matches!(event, Event::ProjectileFired { .. }))
            .count();
    }

    assert!(shots <= 2, "fired {shots} shots");
    assert!(shots >= 1);
}

#[derive(Default)]
struct Tally {
    spawned: usize,
    removed_enemies: usize,
    fired: usize,
    removed_projectiles: usize,
}

impl Tally {
    fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemySpawned { .. } => self.spawned += 1,
                Event::EnemyLeaked { .. } | Event::EnemyKilled { .. } => {
                    self.removed_enemies += 1;
                }
                Event::ProjectileFired { .. } => self.fired += 1,
                Event::ProjectileHit { .. } | Event::ProjectileDiscarded { .. } => {
                    self.removed_projectiles += 1;
                }
                _ => {}
            }
        }
    }
}

#[test]
fn long_run_preserves_health_and_population_invariants() {
    let mut simulation = Simulation::new();
    for (column, row) in [(1, 4), (3, 6), (7, 4), (9, 1), (11, 4)] {
        let placed = simulation.request_placement(CellCoord::new(column, row));
        assert!(placed.is_ok());
    }
    let _ = simulation.drain_events();

    let mut spawning = Spawning::new(Config::new(simulation.rules().spawn_interval));
    let mut commands = Vec::new();
    let mut health: HashMap<EnemyId, i32> = HashMap::new();
    let mut tally = Tally::default();
    let mut now = Duration::ZERO;

    for _ in 0..15_000 {
        now += FRAME;
        let enemies_before = simulation.enemies().len();
        let projectiles_before = simulation.projectiles().len();
        let tally_before = (
            tally.spawned,
            tally.removed_enemies,
            tally.fired,
            tally.removed_projectiles,
        );

        simulation.tick(now);
        spawning.handle(simulation.pending_events(), &mut commands);
        for command in commands.drain(..) {
            assert_eq!(command, Command::SpawnEnemy);
            let _ = simulation.spawn_timer_fired();
        }

        let events = simulation.drain_events();
        tally.observe(&events);
        for event in &events {
            match event {
                Event::EnemySpawned { enemy, position } => {
                    assert_eq!(*position, simulation.path().start());
                    assert!(health.insert(*enemy, 100).is_none());
                }
                Event::ProjectileHit {
                    enemy, remaining, ..
                } => {
                    let previous = health.get_mut(enemy).expect("hit enemy was spawned");
                    assert_eq!(*previous - 10, remaining.get());
                    *previous = remaining.get();
                }
                _ => {}
            }
        }

        let spawned = tally.spawned - tally_before.0;
        let removed = tally.removed_enemies - tally_before.1;
        assert_eq!(
            simulation.enemies().len() + removed,
            enemies_before + spawned
        );
        let fired = tally.fired - tally_before.2;
        let spent = tally.removed_projectiles - tally_before.3;
        assert_eq!(
            simulation.projectiles().len() + spent,
            projectiles_before + fired
        );

        for enemy in simulation.enemies().iter() {
            assert!(enemy.path_index <= simulation.path().len());
            assert!(enemy.health <= Health::new(100));
        }
    }

    assert!(tally.spawned > 0);
    assert!(tally.fired > 0);
    assert!(simulation.economy().leaked_count <= simulation.economy().leak_limit);
}
