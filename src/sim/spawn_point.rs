//! Persistent spawn points scattered around the player.
//!
//! Points are generated in density-weighted bands, throttle themselves when
//! farmed, and hand back spawn positions; enemy construction happens in the
//! caller so this module stays free of factory and buff state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyKind};
use super::noise::{DensityClass, NoiseField};
use super::rng::SimRng;
use super::safe_zone::SafeZoneManager;
use super::stats::EliteRoll;
use crate::consts::*;
use crate::polar_to_cartesian;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnPointConfig {
    pub cleanup_distance: f32,
    /// Points farther than this never spawn
    pub active_distance: f32,
    pub kill_window_ms: f64,
    pub kill_threshold: u32,
    /// Frames a farmed point stays dormant
    pub area_cooldown: f32,
    pub penalty_rate: f32,
    pub rate_recovery: f32,
    pub max_rate: f32,
    pub local_radius: f32,
    pub high_density_cap: usize,
    pub default_cap: usize,
    pub base_chance: f32,
    pub speed_bonus: f32,
    pub max_speed_bonus: f32,
    pub jitter: f32,
    pub short_cooldown: f32,
    pub long_cooldown: f32,
    /// Local count below which the short cooldown applies
    pub busy_threshold: usize,
    pub persistent_spawns: u32,
    pub persistent_cooldown: f32,
    pub min_points: usize,
    pub max_points: usize,
    pub max_new_per_tick: usize,
    pub kill_radius: f32,
    pub pre_spawn_chance: f32,
    pub pre_spawn_jitter: f32,
}

impl Default for SpawnPointConfig {
    fn default() -> Self {
        Self {
            cleanup_distance: 6000.0,
            active_distance: 1200.0,
            kill_window_ms: 5000.0,
            kill_threshold: 15,
            area_cooldown: 1800.0,
            penalty_rate: 0.1,
            rate_recovery: 0.01,
            max_rate: 2.0,
            local_radius: 300.0,
            high_density_cap: 6,
            default_cap: 3,
            base_chance: 0.4,
            speed_bonus: 0.05,
            max_speed_bonus: 0.3,
            jitter: 50.0,
            short_cooldown: 30.0,
            long_cooldown: 120.0,
            busy_threshold: 4,
            persistent_spawns: 10,
            persistent_cooldown: 60.0,
            min_points: 40,
            max_points: 100,
            max_new_per_tick: 8,
            kill_radius: 300.0,
            pre_spawn_chance: 0.3,
            pre_spawn_jitter: 150.0,
        }
    }
}

/// Distance band, spacing and pre-spawn count for each density class
fn band(class: DensityClass) -> (f32, f32, f32, (u32, u32)) {
    match class {
        DensityClass::High => (600.0, 1200.0, 200.0, (3, 6)),
        DensityClass::Medium => (1200.0, 2000.0, 350.0, (2, 4)),
        _ => (2000.0, 4000.0, 500.0, (1, 3)),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub id: u32,
    pub pos: Vec2,
    pub density: DensityClass,
    /// Frames until the next spawn
    pub cooldown: f32,
    /// Frames of dormancy after being farmed
    pub area_cooldown: f32,
    pub kill_count: u32,
    pub last_kill_ms: Option<f64>,
    pub spawn_rate: f32,
    pub spawn_count: u32,
    pub pre_spawned: bool,
}

impl SpawnPoint {
    pub fn new(id: u32, pos: Vec2, density: DensityClass) -> Self {
        Self {
            id,
            pos,
            density,
            cooldown: 0.0,
            area_cooldown: 0.0,
            kill_count: 0,
            last_kill_ms: None,
            spawn_rate: 1.0,
            spawn_count: 0,
            pre_spawned: false,
        }
    }

    pub fn is_penalized(&self) -> bool {
        self.area_cooldown > 0.0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnPointManager {
    pub config: SpawnPointConfig,
    points: Vec<SpawnPoint>,
    next_id: u32,
}

impl SpawnPointManager {
    pub fn new(config: SpawnPointConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn points(&self) -> &[SpawnPoint] {
        &self.points
    }

    /// Add a point directly, bypassing generation rules
    pub fn insert(&mut self, pos: Vec2, density: DensityClass) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.points.push(SpawnPoint::new(id, pos, density));
        id
    }

    /// Advance timers and return the positions that should spawn an enemy this frame
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        now_ms: f64,
        player_pos: Vec2,
        player_speed: f32,
        enemies: &[Enemy],
        zones: &SafeZoneManager,
        rng: &mut SimRng,
    ) -> Vec<Vec2> {
        let c = &self.config;
        let mut spawns = Vec::new();

        for i in (0..self.points.len()).rev() {
            let distance = self.points[i].pos.distance(player_pos);
            if distance > c.cleanup_distance {
                self.points.swap_remove(i);
                continue;
            }
            let point = &mut self.points[i];

            point.cooldown = (point.cooldown - 1.0).max(0.0);
            point.area_cooldown = (point.area_cooldown - 1.0).max(0.0);

            let farmed = point
                .last_kill_ms
                .is_some_and(|t| now_ms - t < c.kill_window_ms)
                && point.kill_count > c.kill_threshold;
            if farmed && !point.is_penalized() {
                point.area_cooldown = c.area_cooldown;
                point.kill_count = 0;
                point.spawn_rate = c.penalty_rate;
                log::debug!("Spawn point {} farmed, going dormant", point.id);
            } else if !point.is_penalized() {
                point.spawn_rate = if point.spawn_rate < 1.0 {
                    (point.spawn_rate + c.rate_recovery).min(1.0)
                } else {
                    (point.spawn_rate - c.rate_recovery).max(1.0)
                };
            }

            if distance > c.active_distance.min(SPAWN_ACTIVATION_RANGE)
                || point.cooldown > 0.0
                || point.is_penalized()
            {
                continue;
            }

            let local = enemies
                .iter()
                .filter(|e| e.pos.distance(point.pos) < c.local_radius)
                .count();
            let cap = if point.density == DensityClass::High {
                c.high_density_cap
            } else {
                c.default_cap
            };
            if local >= cap {
                continue;
            }

            let chance =
                c.base_chance * point.spawn_rate + (player_speed * c.speed_bonus).min(c.max_speed_bonus);
            if !rng.chance(chance) {
                continue;
            }

            let pos = point.pos
                + Vec2::new(rng.range(-c.jitter, c.jitter), rng.range(-c.jitter, c.jitter));
            point.cooldown = if local < c.busy_threshold {
                c.short_cooldown
            } else {
                c.long_cooldown
            };
            if zones.is_in_safe_zone(pos) {
                continue;
            }
            spawns.push(pos);
            point.spawn_count += 1;

            if PERSISTENT_SPAWN_ACTIVATION && point.spawn_count >= c.persistent_spawns {
                point.cooldown = c.persistent_cooldown;
                point.spawn_count = 0;
            }
        }
        spawns
    }

    /// Points wanted around a player moving at `player_speed`
    pub fn target_count(&self, player_speed: f32) -> usize {
        let wanted = (self.config.min_points as f32 + player_speed * 2.0) as usize;
        wanted.max(self.config.min_points).min(self.config.max_points)
    }

    /// Top up points around the player; returns positions to pre-populate
    pub fn generate(
        &mut self,
        player_pos: Vec2,
        player_speed: f32,
        noise: &NoiseField,
        zones: &SafeZoneManager,
        rng: &mut SimRng,
    ) -> Vec<Vec2> {
        let target = self.target_count(player_speed);
        let mut pre_spawns = Vec::new();
        let mut created = 0;
        let mut attempts = 0;

        while self.points.len() < target
            && created < self.config.max_new_per_tick
            && attempts < self.config.max_new_per_tick * 4
        {
            attempts += 1;
            let roll = rng.unit();
            let class = if roll < 0.3 {
                DensityClass::High
            } else if roll < 0.7 {
                DensityClass::Medium
            } else {
                DensityClass::Low
            };
            let (near, far, spacing, (min_pre, max_pre)) = band(class);
            let pos = player_pos + polar_to_cartesian(rng.range(near, far), rng.angle());

            // Barren terrain gets no points
            if noise.density_class(pos.x, pos.y) == DensityClass::None {
                continue;
            }
            if self.points.iter().any(|p| p.pos.distance(pos) < spacing) {
                continue;
            }

            let id = self.insert(pos, class);
            created += 1;

            if rng.chance(self.config.pre_spawn_chance) && !zones.is_in_safe_zone(pos) {
                let count = rng.range_inclusive(min_pre, max_pre);
                let jitter = self.config.pre_spawn_jitter;
                for _ in 0..count {
                    pre_spawns.push(
                        pos + Vec2::new(rng.range(-jitter, jitter), rng.range(-jitter, jitter)),
                    );
                }
                if let Some(point) = self.points.iter_mut().find(|p| p.id == id) {
                    point.pre_spawned = true;
                }
            }
        }

        if created > 0 {
            log::debug!("Generated {} spawn point(s), total {}", created, self.points.len());
        }
        pre_spawns.retain(|p| !zones.is_in_safe_zone(*p));
        pre_spawns
    }

    /// Credit a kill to every point near `pos`
    pub fn record_kill_near(&mut self, pos: Vec2, now_ms: f64) {
        let radius = self.config.kill_radius;
        for point in self.points.iter_mut().filter(|p| p.pos.distance(pos) < radius) {
            point.kill_count += 1;
            point.last_kill_ms = Some(now_ms);
        }
    }

    /// Raise spawn rates on points that are not dormant and halve their cooldowns
    pub fn boost(&mut self, urgency: f32) {
        let max_rate = self.config.max_rate;
        for point in self.points.iter_mut().filter(|p| !p.is_penalized()) {
            point.spawn_rate = (point.spawn_rate * urgency).min(max_rate);
            if point.cooldown > 1.0 {
                point.cooldown = (point.cooldown / 2.0).floor().max(1.0);
            }
        }
    }

    /// Lower spawn rates when the world is crowded
    pub fn throttle(&mut self) {
        for point in &mut self.points {
            point.spawn_rate = (point.spawn_rate * 0.9).max(0.3);
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// Pick the kind to spawn at a location `distance` away from the player
pub fn choose_kind(distance: f32, rng: &mut SimRng) -> (EnemyKind, EliteRoll) {
    let roll = if (ELITE_MIN_DISTANCE..=ELITE_MAX_DISTANCE).contains(&distance) {
        if rng.chance(ELITE_SPAWN_CHANCE) {
            EliteRoll::Success
        } else {
            EliteRoll::Failed
        }
    } else {
        EliteRoll::OutOfBand
    };
    let kind = if roll == EliteRoll::Success {
        EnemyKind::Elite
    } else {
        rng.pick(&EnemyKind::BASE).copied().unwrap_or(EnemyKind::Red)
    };
    (kind, roll)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with_point(pos: Vec2, density: DensityClass) -> SpawnPointManager {
        let mut manager = SpawnPointManager::default();
        manager.insert(pos, density);
        manager
    }

    #[test]
    fn test_far_points_removed() {
        let mut manager = manager_with_point(Vec2::new(7000.0, 0.0), DensityClass::Low);
        let zones = SafeZoneManager::default();
        let mut rng = SimRng::new(1);
        manager.tick(0.0, Vec2::ZERO, 0.0, &[], &zones, &mut rng);
        assert!(manager.points().is_empty());
    }

    #[test]
    fn test_nearby_point_spawns_and_cools_down() {
        let mut manager = manager_with_point(Vec2::new(500.0, 0.0), DensityClass::High);
        let zones = SafeZoneManager::default();
        let mut rng = SimRng::new(1);
        let mut spawned = Vec::new();
        for frame in 0..200 {
            spawned.extend(manager.tick(frame as f64 * FRAME_MS, Vec2::ZERO, 0.0, &[], &zones, &mut rng));
            if !spawned.is_empty() {
                break;
            }
        }
        assert_eq!(spawned.len(), 1);
        assert!(spawned[0].distance(Vec2::new(500.0, 0.0)) <= 50.0 * 2f32.sqrt() + 1e-3);
        assert_eq!(manager.points()[0].cooldown, 30.0);
    }

    #[test]
    fn test_tenth_spawn_rests_the_point() {
        let mut manager = manager_with_point(Vec2::new(500.0, 0.0), DensityClass::High);
        manager.config.base_chance = 2.0;
        let zones = SafeZoneManager::default();
        let mut rng = SimRng::new(5);
        let mut spawns = 0;
        let mut last_spawn = 0;
        let mut gaps = Vec::new();
        for frame in 0..2000 {
            if manager.tick(0.0, Vec2::ZERO, 0.0, &[], &zones, &mut rng).is_empty() {
                continue;
            }
            spawns += 1;
            gaps.push(frame - last_spawn);
            last_spawn = frame;
            let point = &manager.points()[0];
            if spawns < 10 {
                assert_eq!(point.cooldown, 30.0);
                assert_eq!(point.spawn_count, spawns);
            } else if spawns == 10 {
                assert_eq!(point.cooldown, 60.0);
                assert_eq!(point.spawn_count, 0);
            } else {
                break;
            }
        }
        assert_eq!(spawns, 11);
        // 30 frames of cooldown between regular spawns, 60 after the tenth
        assert!(gaps[1..10].iter().all(|&g| g == 30));
        assert_eq!(gaps[10], 60);
    }

    #[test]
    fn test_point_out_of_range_never_spawns() {
        let mut manager = manager_with_point(Vec2::new(1100.0, 0.0), DensityClass::High);
        let zones = SafeZoneManager::default();
        let mut rng = SimRng::new(1);
        for _ in 0..300 {
            assert!(manager.tick(0.0, Vec2::ZERO, 0.0, &[], &zones, &mut rng).is_empty());
        }
    }

    #[test]
    fn test_farmed_point_goes_dormant() {
        let mut manager = manager_with_point(Vec2::new(500.0, 0.0), DensityClass::High);
        let zones = SafeZoneManager::default();
        let mut rng = SimRng::new(1);
        for _ in 0..16 {
            manager.record_kill_near(Vec2::new(510.0, 0.0), 1000.0);
        }
        manager.tick(2000.0, Vec2::ZERO, 0.0, &[], &zones, &mut rng);
        let point = &manager.points()[0];
        assert_eq!(point.area_cooldown, 1800.0);
        assert_eq!(point.kill_count, 0);
        assert_eq!(point.spawn_rate, 0.1);

        for _ in 0..100 {
            assert!(manager.tick(2000.0, Vec2::ZERO, 0.0, &[], &zones, &mut rng).is_empty());
        }
        assert_eq!(manager.points()[0].spawn_rate, 0.1);
    }

    #[test]
    fn test_rate_heals_toward_one() {
        let mut manager = manager_with_point(Vec2::new(3000.0, 0.0), DensityClass::Low);
        let zones = SafeZoneManager::default();
        let mut rng = SimRng::new(1);
        manager.boost(1.5);
        assert_eq!(manager.points()[0].spawn_rate, 1.5);
        for _ in 0..100 {
            manager.tick(0.0, Vec2::ZERO, 0.0, &[], &zones, &mut rng);
        }
        assert!((manager.points()[0].spawn_rate - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_local_cap() {
        let mut manager = manager_with_point(Vec2::new(500.0, 0.0), DensityClass::Low);
        let zones = SafeZoneManager::default();
        let mut rng = SimRng::new(1);
        let enemy = crate::sim::enemy::EnemyFactory::default()
            .create(1, Vec2::new(500.0, 0.0), EnemyKind::Red, &Default::default(), &mut rng)
            .unwrap();
        let crowd = vec![enemy; 3];
        for _ in 0..300 {
            assert!(manager.tick(0.0, Vec2::ZERO, 0.0, &crowd, &zones, &mut rng).is_empty());
        }
    }

    #[test]
    fn test_no_spawns_inside_safe_zone() {
        let mut zones = SafeZoneManager::default();
        let mut rng = SimRng::new(1);
        for _ in 0..100 {
            zones.record_kill(Vec2::new(400.0, 400.0), 0.0, &mut rng);
        }
        let mut manager = manager_with_point(Vec2::new(400.0, 400.0), DensityClass::High);
        for _ in 0..500 {
            let spawns = manager.tick(0.0, Vec2::new(400.0, 400.0), 0.0, &[], &zones, &mut rng);
            assert!(spawns.iter().all(|p| !zones.is_in_safe_zone(*p)));
        }
    }

    #[test]
    fn test_generation_respects_bounds() {
        let mut manager = SpawnPointManager::default();
        let zones = SafeZoneManager::default();
        let mut rng = SimRng::new(8);
        let noise = NoiseField::new(&mut rng);
        for _ in 0..50 {
            manager.generate(Vec2::ZERO, 0.0, &noise, &zones, &mut rng);
        }
        assert!(manager.points().len() <= 40);
        assert!(!manager.points().is_empty());
        for point in manager.points() {
            let d = point.pos.length();
            assert!((600.0..=4000.0).contains(&d));
            assert_ne!(noise.density_class(point.pos.x, point.pos.y), DensityClass::None);
        }
    }

    #[test]
    fn test_target_count_bounds() {
        let manager = SpawnPointManager::default();
        assert_eq!(manager.target_count(0.0), 40);
        assert_eq!(manager.target_count(10.0), 60);
        assert_eq!(manager.target_count(1000.0), 100);
    }

    #[test]
    fn test_choose_kind_band() {
        let mut rng = SimRng::new(2);
        for _ in 0..200 {
            let (kind, roll) = choose_kind(300.0, &mut rng);
            assert_ne!(kind, EnemyKind::Elite);
            assert_eq!(roll, EliteRoll::OutOfBand);
        }
        let elites = (0..4000)
            .filter(|_| choose_kind(1000.0, &mut rng).0 == EnemyKind::Elite)
            .count();
        assert!((100..=320).contains(&elites), "elites: {elites}");
    }
}
