//! The world: every subsystem of a running game, owned in one place

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ally::FriendlyBall;
use super::buff::{BuffEngine, BuffVisuals};
use super::camera::Camera;
use super::density::FrenzyMode;
use super::effects::Effects;
use super::enemy::{CreationOptions, Enemy, EnemyFactory, EnemyKind};
use super::events::EventBus;
use super::hazard::SpikedBall;
use super::noise::NoiseField;
use super::player::Player;
use super::projectile::Projectile;
use super::rng::SimRng;
use super::safe_zone::SafeZoneManager;
use super::spawn_point::{SpawnPointManager, choose_kind};
use super::stats::MonsterStats;
use super::terrain::{Terrain, TerrainConfig};
use crate::polar_to_cartesian;
use crate::settings::{PerformanceMode, Settings};

/// Ring around the player used by the near-player spawner
pub const NEAR_SPAWN_MIN: f32 = 400.0;
pub const NEAR_SPAWN_MAX: f32 = 1600.0;

#[derive(Debug, Serialize, Deserialize)]
pub struct World {
    pub seed: u64,
    pub mode: PerformanceMode,
    /// Simulation clock, advanced by one frame per tick
    pub time_ms: f64,
    pub frame: u64,
    pub score: u32,
    pub paused: bool,
    pub game_over: bool,

    pub rng: SimRng,
    pub noise: NoiseField,
    pub player: Player,
    pub camera: Camera,
    pub terrain: Terrain,

    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub friendly_balls: Vec<FriendlyBall>,
    pub spiked_balls: Vec<SpikedBall>,
    pub effects: Effects,

    pub buffs: BuffEngine,
    pub zones: SafeZoneManager,
    pub spawn_points: SpawnPointManager,
    pub factory: EnemyFactory,
    pub frenzy: FrenzyMode,
    pub stats: MonsterStats,

    /// Time banked toward the next dynamic spawn attempt
    pub spawn_timer_ms: f64,
    next_id: u32,

    #[serde(skip)]
    pub events: EventBus,
}

impl World {
    pub fn new(settings: &Settings) -> Self {
        let seed = settings.world_seed();
        let mut rng = SimRng::new(seed);
        let noise = NoiseField::new(&mut rng);
        let viewport = Vec2::new(settings.viewport_width, settings.viewport_height);
        log::info!(
            "New world: seed {}, {} performance",
            seed,
            settings.performance.as_str()
        );

        Self {
            seed,
            mode: settings.performance,
            time_ms: 0.0,
            frame: 0,
            score: 0,
            paused: false,
            game_over: false,
            rng,
            noise,
            player: Player::default(),
            camera: Camera::new(viewport),
            terrain: Terrain::with_start_platform(TerrainConfig::default()),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            friendly_balls: Vec::new(),
            spiked_balls: Vec::new(),
            effects: Effects::new(settings.max_particles()),
            buffs: BuffEngine::new(0.0),
            zones: SafeZoneManager::default(),
            spawn_points: SpawnPointManager::default(),
            factory: EnemyFactory::default(),
            frenzy: FrenzyMode::default(),
            stats: MonsterStats::default(),
            spawn_timer_ms: 0.0,
            next_id: 1,
            events: EventBus::default(),
        }
    }

    /// World with a fixed seed and default settings
    pub fn with_seed(seed: u64) -> Self {
        Self::new(&Settings {
            seed: Some(seed),
            ..Settings::default()
        })
    }

    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Build and add an enemy; returns its id.
    ///
    /// Positions inside a safe zone and factory failures are skipped.
    pub fn spawn_enemy(&mut self, pos: Vec2, kind: EnemyKind) -> Option<u32> {
        self.spawn_enemy_with(pos, kind, &CreationOptions::default())
    }

    pub fn spawn_enemy_with(
        &mut self,
        pos: Vec2,
        kind: EnemyKind,
        opts: &CreationOptions,
    ) -> Option<u32> {
        if self.zones.is_in_safe_zone(pos) {
            log::debug!("Spawn at ({:.0}, {:.0}) is inside a safe zone", pos.x, pos.y);
            return None;
        }
        let id = self.next_entity_id();
        match self
            .factory
            .create_with(id, pos, kind, &self.buffs, &mut self.rng, opts)
        {
            Ok(enemy) => {
                self.stats.record_spawn(&enemy);
                log::debug!(
                    "Spawned {} #{} level {} at ({:.0}, {:.0})",
                    kind.as_str(),
                    id,
                    enemy.level,
                    pos.x,
                    pos.y
                );
                self.enemies.push(enemy);
                Some(id)
            }
            Err(e) => {
                log::warn!("Skipping {} spawn: {}", kind.as_str(), e);
                None
            }
        }
    }

    /// Spawn at `pos` with a kind rolled from its distance to the player
    pub fn spawn_rolled(&mut self, pos: Vec2) -> Option<u32> {
        let distance = pos.distance(self.player.pos);
        let (kind, _) = choose_kind(distance, &mut self.rng);
        self.spawn_enemy(pos, kind)
    }

    /// Spawn somewhere on the ring around the player, tallying the elite roll
    pub fn spawn_near_player(&mut self) -> Option<u32> {
        let angle = self.rng.angle();
        let distance = self.rng.range(NEAR_SPAWN_MIN, NEAR_SPAWN_MAX);
        let pos = self.player.pos + polar_to_cartesian(distance, angle);
        if self.zones.is_in_safe_zone(pos) {
            return None;
        }
        let (kind, roll) = choose_kind(distance, &mut self.rng);
        self.stats.record_elite_roll(roll);
        self.spawn_enemy(pos, kind)
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Level shown for the current location
    pub fn area_level(&self) -> u32 {
        self.noise.level_at(self.player.pos.x, self.player.pos.y)
    }

    /// Buff draw state, with shot lines toward `aim` (or straight ahead)
    pub fn buff_visuals(&self, aim: Option<Vec2>) -> BuffVisuals {
        let origin = self.player.pos;
        let angle = aim
            .map(|a| a - origin)
            .filter(|d| *d != Vec2::ZERO)
            .map_or(0.0, |d| d.to_angle());
        self.buffs.visuals(origin, angle, self.time_ms)
    }

    /// Whole world as JSON, for renderers and debugging
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
