//! End-to-end scenarios.
//!
//! These drive complete worlds (or bare kernel simulations) tick by tick
//! and check where bodies end up.

#![cfg(test)]

use std::collections::BTreeMap;

use glam::Vec2;
use ledge_gameplay::{
    CharacterConfig, CharacterState, GameEvent, KeyInput, LevelDesc, PlatformConfig, SpawnDesc, SpawnKind, World,
};
use ledge_kernel::{BorderPolicy, MovingObject, Simulation, SimulationConfig, TileCollisionType, TileMap};

const DT: f32 = 1.0 / 60.0;

fn level(rows: &[&str], legend: &[(char, &str)], spawns: Vec<SpawnDesc>) -> LevelDesc {
    LevelDesc {
        name: "scenario".into(),
        origin: Vec2::ZERO,
        legend: legend.iter().map(|&(symbol, name)| (symbol, name.to_string())).collect::<BTreeMap<_, _>>(),
        rows: rows.iter().map(|row| (*row).to_string()).collect(),
        spawns,
    }
}

fn world(level: &LevelDesc) -> World {
    World::from_level(
        level,
        &SimulationConfig::default(),
        &CharacterConfig::default(),
        &PlatformConfig::default(),
    )
    .expect("world")
}

fn spawn(kind: SpawnKind, x: f32, y: f32) -> SpawnDesc {
    SpawnDesc {
        kind,
        position: Vec2::new(x, y),
    }
}

/// Kernel-only scenarios.
mod kernel_tests {
    use super::*;

    fn simulation() -> Simulation<MovingObject> {
        let mut map = TileMap::new(20, 12, Vec2::ZERO).expect("map");
        for x in 0..20 {
            map.set_tile(x, 0, TileCollisionType::FULL);
        }
        let config = SimulationConfig {
            border: BorderPolicy::Open,
            ..SimulationConfig::default()
        };
        Simulation::new(map, &config).expect("simulation")
    }

    #[test]
    fn e2e_falling_box_rests_on_full_tile() {
        let mut sim = simulation();
        let id = sim.spawn(MovingObject::new(Vec2::new(80.0, 100.0), Vec2::splat(8.0)).with_speed(Vec2::new(0.0, -240.0)));

        for _ in 0..60 {
            sim.tick_bodies(DT);
        }
        let body = sim.get(id).expect("body");
        assert_eq!(body.aabb.min().y, 8.0);
        assert_eq!(body.speed.y, 0.0);
        assert!(body.state.pushes_bottom_tile);
    }

    #[test]
    fn e2e_falling_box_stacks_on_resting_box() {
        let mut sim = simulation();
        let bottom = sim.spawn(MovingObject::new(Vec2::new(80.0, 16.0), Vec2::splat(8.0)));
        let top = sim.spawn(MovingObject::new(Vec2::new(80.0, 100.0), Vec2::splat(8.0)).with_speed(Vec2::new(0.0, -240.0)));

        for _ in 0..60 {
            sim.tick_bodies(DT);
        }
        let bottom = sim.get(bottom).expect("bottom");
        let top_body = sim.get(top).expect("top");
        assert_eq!(bottom.aabb.min().y, 8.0);
        assert_eq!(top_body.aabb.min().y, bottom.aabb.max().y);
        assert!(top_body.state.pushes_bottom_object);
        assert!(bottom.state.pushes_top_object);
    }

    #[test]
    fn e2e_box_climbs_slope_ramp() {
        let mut map = TileMap::new(12, 8, Vec2::ZERO).expect("map").with_border(BorderPolicy::Open);
        for x in 0..12 {
            map.set_tile(x, 0, TileCollisionType::FULL);
        }
        map.set_tile(5, 1, "slope45".parse().expect("slope"));
        map.set_tile(6, 1, TileCollisionType::FULL);
        let mut sim = Simulation::new(map, &SimulationConfig::default()).expect("simulation");

        let id = sim.spawn(
            MovingObject::new(Vec2::new(40.0, 12.0), Vec2::splat(4.0))
                .with_slope_wall_height(4)
                .with_speed(Vec2::new(60.0, 0.0)),
        );

        // One pixel right per tick; the ramp spans x 72..88 and the block
        // behind it ends at x 104.
        let mut last_bottom = 8.0;
        for tick in 0..60 {
            sim.tick_bodies(DT);
            let body = sim.get(id).expect("body");
            let bottom = body.aabb.min().y;
            assert!(body.state.pushes_bottom_tile, "lost the ground on tick {tick}");
            assert!(!body.state.pushes_right_tile, "stopped by the ramp on tick {tick}");
            assert!(bottom >= last_bottom && bottom - last_bottom <= 1.0, "jumped from {last_bottom} to {bottom}");
            last_bottom = bottom;
        }

        let body = sim.get(id).expect("body");
        assert_eq!(body.aabb.max().x, 104.0);
        assert_eq!(body.aabb.min().y, 24.0);
    }
}

/// World scenarios with characters and platforms.
mod world_tests {
    use super::*;

    #[test]
    fn e2e_character_walks_up_ramp_onto_block() {
        let level = level(
            &[
                "##########",
                "#........#",
                "#........#",
                "#........#",
                "#.../#####",
                "##########",
            ],
            &[('/', "slope45")],
            vec![spawn(SpawnKind::Player, 24.0, 8.0)],
        );
        let mut world = world(&level);

        for _ in 0..120 {
            world.tick(DT, KeyInput::GO_RIGHT);
        }
        let player = world.player().expect("player");
        assert_eq!(player.body.position.y, 24.0);
        assert_eq!(player.body.aabb.max().x, 136.0);
        assert!(player.body.state.pushes_right);
    }

    #[test]
    fn e2e_character_jumps_and_lands() {
        let level = level(
            &[
                "##########",
                "#........#",
                "#........#",
                "#........#",
                "#........#",
                "#........#",
                "#........#",
                "##########",
            ],
            &[],
            vec![spawn(SpawnKind::Player, 80.0, 8.0)],
        );
        let mut world = world(&level);
        for _ in 0..5 {
            world.tick(DT, KeyInput::empty());
        }
        world.drain_events();

        let mut peak: f32 = 8.0;
        world.tick(DT, KeyInput::JUMP);
        for _ in 0..90 {
            world.tick(DT, KeyInput::empty());
            peak = peak.max(world.player().expect("player").body.position.y);
        }

        let player = world.player().expect("player");
        assert!(peak > 30.0, "peak was {peak}");
        assert_eq!(player.body.position.y, 8.0);
        assert_eq!(player.character().map(|c| c.state()), Some(CharacterState::Stand));
        let events = world.drain_events();
        assert!(events
            .iter()
            .any(|event| matches!(event, GameEvent::Sound { cue: ledge_gameplay::SoundCue::HitWall, .. })));
    }

    #[test]
    fn e2e_character_drops_through_one_way_floor() {
        let level = level(
            &[
                "##########",
                "#........#",
                "#........#",
                "#........#",
                "#........#",
                "#.======.#",
                "#........#",
                "#........#",
                "##########",
            ],
            &[],
            vec![spawn(SpawnKind::Player, 80.0, 56.0)],
        );
        let mut world = world(&level);
        for _ in 0..5 {
            world.tick(DT, KeyInput::empty());
        }
        assert_eq!(world.player().expect("player").body.position.y, 56.0);

        for _ in 0..60 {
            world.tick(DT, KeyInput::GO_DOWN);
        }
        assert_eq!(world.player().expect("player").body.position.y, 8.0);
    }

    #[test]
    fn e2e_rider_moves_with_platform() {
        let level = level(
            &[
                "##############################",
                "#............................#",
                "#............................#",
                "#............................#",
                "#............................#",
                "#............................#",
                "#............................#",
                "#............................#",
                "#............................#",
                "#............................#",
                "##############################",
            ],
            &[],
            vec![
                spawn(SpawnKind::MovingPlatform, 200.0, 100.0),
                spawn(SpawnKind::Player, 200.0, 108.0),
            ],
        );
        let mut world = world(&level);
        let platform_id = world
            .simulation()
            .iter()
            .find(|(_, object)| object.body.is_kinematic)
            .map(|(id, _)| id)
            .expect("platform");

        for _ in 0..3 {
            world.tick(DT, KeyInput::empty());
        }
        let rider_start = world.player().expect("player").body.position;
        let platform_start = world.object(platform_id).expect("platform").body.position;

        for _ in 0..30 {
            world.tick(DT, KeyInput::empty());
        }
        let rider = world.player().expect("player").body.position;
        let platform = world.object(platform_id).expect("platform").body.position;

        let platform_moved = platform.x - platform_start.x;
        assert!(platform_moved > 40.0);
        assert!((rider.x - rider_start.x - platform_moved).abs() <= 1.0);
        assert_eq!(rider.y, 108.0);
        assert_eq!(world.player().expect("player").body.mount, Some(platform_id));
    }

    #[test]
    fn e2e_character_grabs_ledge_and_climbs_off() {
        let level = level(
            &[
                "################",
                "#..............#",
                "#..............#",
                "#..............#",
                "#..............#",
                "#..............#",
                "#..............#",
                "#.....##########",
                "#.....#........#",
                "#.....#........#",
                "#.....#........#",
                "#.....#........#",
                "#.....#........#",
                "################",
            ],
            &[],
            vec![spawn(SpawnKind::Player, 40.0, 8.0)],
        );
        let mut world = world(&level);
        for _ in 0..3 {
            world.tick(DT, KeyInput::empty());
        }

        // Jump against the wall and keep pressing into it.
        let mut grabbed = false;
        for tick in 0..120 {
            let keys = if tick < 30 { KeyInput::GO_RIGHT | KeyInput::JUMP } else { KeyInput::GO_RIGHT };
            world.tick(DT, keys);
            if world.player().and_then(|p| p.character()).map(|c| c.state()) == Some(CharacterState::GrabLedge) {
                grabbed = true;
                break;
            }
        }
        assert!(grabbed, "character never grabbed the ledge");
        // Hanging with the head just below the ledge top.
        assert_eq!(world.player().expect("player").body.aabb.max().y, 100.0);
        assert!(world
            .drain_events()
            .iter()
            .any(|event| matches!(event, GameEvent::LedgeGrabbed { .. })));

        // Jump up from the ledge and walk onto it.
        for tick in 0..60 {
            let keys = if tick < 10 { KeyInput::GO_RIGHT | KeyInput::JUMP } else { KeyInput::GO_RIGHT };
            world.tick(DT, keys);
        }
        let player = world.player().expect("player");
        assert_eq!(player.body.position.y, 104.0);
        assert!(player.body.position.x > 96.0);
    }

    #[test]
    fn e2e_generated_level_runs_without_escaping() {
        let level = LevelDesc::generate(42, 40, 20);
        let mut world = world(&level);
        let (min, max) = world.simulation().map().bounds();

        for tick in 0..600u64 {
            world.tick(DT, crate::app::scripted_keys(tick));
        }
        for (_, object) in world.simulation().iter() {
            let p = object.body.aabb.center;
            assert!(p.x > min.x && p.x < max.x && p.y > min.y && p.y < max.y, "body escaped to {p}");
        }
    }
}
