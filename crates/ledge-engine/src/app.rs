//! Headless application loop.
//!
//! Loads or generates a level, then plays a scripted input track through
//! the world while feeding jittered frame times to the fixed timestep, the
//! way a windowed frontend would.

use anyhow::{Context, Result};
use glam::Vec2;
use ledge_gameplay::{CharacterState, GameEvent, KeyInput, LevelDesc, SoundCue, World};
use tracing::{debug, info, trace};

use crate::config::EngineConfig;
use crate::timing::FixedTimestep;

const RIGHT_JUMP: KeyInput = KeyInput::GO_RIGHT.union(KeyInput::JUMP);
const LEFT_JUMP: KeyInput = KeyInput::GO_LEFT.union(KeyInput::JUMP);

/// Looping input track as (ticks, keys held).
const SCRIPT: &[(u64, KeyInput)] = &[
    (90, KeyInput::GO_RIGHT),
    (20, RIGHT_JUMP),
    (60, KeyInput::GO_RIGHT),
    (30, KeyInput::empty()),
    (90, KeyInput::GO_LEFT),
    (20, LEFT_JUMP),
    (40, KeyInput::GO_LEFT),
    (20, KeyInput::GO_DOWN),
    (30, KeyInput::empty()),
];

/// Keys the scripted player holds on `tick`.
pub fn scripted_keys(tick: u64) -> KeyInput {
    let length: u64 = SCRIPT.iter().map(|(ticks, _)| ticks).sum();
    let mut t = tick % length;
    for &(ticks, keys) in SCRIPT {
        if t < ticks {
            return keys;
        }
        t -= ticks;
    }
    KeyInput::empty()
}

/// What happened during a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Ticks simulated
    pub ticks: u64,
    /// Frames fed to the timestep
    pub frames: u64,
    /// Jump cues
    pub jumps: u32,
    /// Landing and wall hit cues
    pub wall_hits: u32,
    /// Footstep cues
    pub footsteps: u32,
    /// Bodies crushed
    pub crushes: u32,
    /// Ledges grabbed
    pub ledge_grabs: u32,
    /// Player position at the end
    pub final_position: Option<Vec2>,
    /// Player state at the end
    pub final_state: Option<CharacterState>,
}

impl RunSummary {
    fn record(&mut self, events: Vec<GameEvent>) {
        for event in events {
            match event {
                GameEvent::Sound { source, cue } => {
                    trace!(%source, ?cue, volume = cue.volume(), "sound");
                    match cue {
                        SoundCue::Jump => self.jumps += 1,
                        SoundCue::HitWall => self.wall_hits += 1,
                        SoundCue::Footstep => self.footsteps += 1,
                    }
                },
                GameEvent::Crushed { .. } => self.crushes += 1,
                GameEvent::LedgeGrabbed { id } => {
                    debug!(%id, "ledge grabbed");
                    self.ledge_grabs += 1;
                },
            }
        }
    }
}

/// Load the level named by the config, or generate one.
pub fn load_level(config: &EngineConfig) -> Result<LevelDesc> {
    match &config.level {
        Some(path) => LevelDesc::load(path).with_context(|| format!("loading level {}", path.display())),
        None => {
            let level = LevelDesc::generate(config.seed, config.level_width, config.level_height);
            info!(
                "Generated level '{}' ({}x{})",
                level.name, config.level_width, config.level_height
            );
            Ok(level)
        },
    }
}

/// Run the simulation for `config.ticks` ticks.
pub fn run(config: &EngineConfig) -> Result<RunSummary> {
    let level = load_level(config)?;
    let mut world = World::from_level(&level, &config.simulation, &config.character, &config.platform)
        .with_context(|| format!("building world for level '{}'", level.name))?;

    let mut timestep = FixedTimestep::new(config.tick_rate).with_max_frame_time(config.max_frame_time);
    let dt = timestep.fixed_dt();
    let mut rng = fastrand::Rng::with_seed(config.seed);
    let mut summary = RunSummary::default();

    info!("Running {} ticks at {} Hz", config.ticks, config.tick_rate);
    while world.tick_count() < config.ticks {
        let frame_time = dt * (1.0 + config.frame_jitter * (rng.f32() * 2.0 - 1.0));
        summary.frames += 1;

        for _ in 0..timestep.accumulate(frame_time) {
            if world.tick_count() >= config.ticks {
                break;
            }
            world.tick(dt, scripted_keys(world.tick_count()));
            summary.record(world.drain_events());

            if config.log_interval > 0 && world.tick_count() % config.log_interval == 0 {
                log_player(&world);
            }
        }

        if timestep.backlog() > 0 {
            debug!(backlog = timestep.backlog(), "behind schedule");
        }
        if let Some(position) = world.player_id().and_then(|id| world.render_position(id, timestep.alpha())) {
            trace!(x = position.x, y = position.y, alpha = timestep.alpha(), "draw player");
        }
    }

    summary.ticks = world.tick_count();
    if let Some(player) = world.player() {
        summary.final_position = Some(player.body.position);
        summary.final_state = player.character().map(|character| character.state());
    }
    info!(
        ticks = summary.ticks,
        frames = summary.frames,
        jumps = summary.jumps,
        wall_hits = summary.wall_hits,
        footsteps = summary.footsteps,
        crushes = summary.crushes,
        ledge_grabs = summary.ledge_grabs,
        "Run complete"
    );
    Ok(summary)
}

fn log_player(world: &World) {
    let Some(player) = world.player() else {
        return;
    };
    let body = &player.body;
    info!(
        tick = world.tick_count(),
        x = body.position.x,
        y = body.position.y,
        vx = body.speed.x,
        vy = body.speed.y,
        state = ?player.character().map(|character| character.state()),
        grounded = body.state.pushes_bottom,
        "player"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_script_loops() {
        assert_eq!(scripted_keys(0), KeyInput::GO_RIGHT);
        assert_eq!(scripted_keys(95), RIGHT_JUMP);
        assert_eq!(scripted_keys(175), KeyInput::empty());
        assert_eq!(scripted_keys(399), KeyInput::empty());
        assert_eq!(scripted_keys(400), KeyInput::GO_RIGHT);
    }

    #[test]
    fn test_run_generated_level() {
        let config = EngineConfig {
            ticks: 240,
            ..EngineConfig::default()
        };
        let summary = run(&config).expect("run");
        assert_eq!(summary.ticks, 240);
        assert!(summary.frames > 0);
        assert!(summary.footsteps >= 1);
        assert!(summary.final_position.is_some());
    }

    #[test]
    fn test_run_level_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("cave.ron");
        LevelDesc::generate(9, 30, 14).save(&path).expect("save level");

        let config = EngineConfig {
            ticks: 20,
            level: Some(path),
            ..EngineConfig::default()
        };
        assert_eq!(run(&config).expect("run").ticks, 20);
    }

    #[test]
    fn test_missing_level_file_fails() {
        let config = EngineConfig {
            level: Some("/nonexistent/level.ron".into()),
            ..EngineConfig::default()
        };
        assert!(run(&config).is_err());
    }
}
