//! Safe zones
//!
//! Killing enough monsters inside one region turns it into a protected zone with a
//! friendly guardian at its center. Zones and guardians are created, evicted and
//! cleaned up together.

use std::collections::HashMap;
use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::EliteVariant;
use super::rng::SimRng;
use crate::polar_to_cartesian;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeZoneConfig {
    /// Side length of a kill-counting region
    pub region_size: f32,
    pub kills_required: u32,
    pub zone_radius: f32,
    pub max_zones: usize,
    /// Minimum distance between zones, in regions
    pub min_region_distance: f32,
    /// Zones farther than this from the player are dropped
    pub cleanup_distance: f32,
    /// Margin past the zone edge where enemies start steering away
    pub avoidance_margin: f32,
    pub guardian_level: u32,
    pub guardian_radius: f32,
    pub guardian_health: f32,
    pub guardian_rotation_speed: f32,
    pub guardian_orb_count: u32,
    pub guardian_orb_radius: f32,
}

impl Default for SafeZoneConfig {
    fn default() -> Self {
        Self {
            region_size: 800.0,
            kills_required: 100,
            zone_radius: 400.0,
            max_zones: 3,
            min_region_distance: 2.0,
            cleanup_distance: 3000.0,
            avoidance_margin: 100.0,
            guardian_level: 50,
            guardian_radius: 30.0,
            guardian_health: 1000.0,
            guardian_rotation_speed: 0.05,
            guardian_orb_count: 4,
            guardian_orb_radius: 60.0,
        }
    }
}

/// Integer region coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionKey {
    pub x: i32,
    pub y: i32,
}

impl RegionKey {
    pub fn distance(&self, other: &RegionKey) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeZone {
    pub id: u32,
    pub region: RegionKey,
    pub center: Vec2,
    pub radius: f32,
    pub created_ms: f64,
    pub active: bool,
}

impl SafeZone {
    pub fn contains(&self, pos: Vec2) -> bool {
        self.active && self.center.distance(pos) <= self.radius
    }
}

/// Friendly stationary elite bound to a zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guardian {
    pub zone_id: u32,
    pub pos: Vec2,
    pub variant: EliteVariant,
    pub level: u32,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub orb_angle: f32,
    pub orb_radius: f32,
    pub orbs: Vec<Vec2>,
    pub glow: f32,
    glow_rising: bool,
}

impl Guardian {
    fn update(&mut self) {
        self.rotation += self.rotation_speed;

        self.orb_angle += 0.02;
        let count = self.orbs.len();
        for (i, orb) in self.orbs.iter_mut().enumerate() {
            let angle = self.orb_angle + i as f32 / count as f32 * TAU;
            *orb = self.pos + polar_to_cartesian(self.orb_radius, angle);
        }

        if self.glow_rising {
            self.glow += 0.02;
        } else {
            self.glow -= 0.02;
        }
        if self.glow >= 1.0 {
            self.glow = 1.0;
            self.glow_rising = false;
        } else if self.glow <= 0.0 {
            self.glow = 0.0;
            self.glow_rising = true;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SafeZoneManager {
    pub config: SafeZoneConfig,
    // Tuple-like keys cannot be JSON map keys; counters are rebuilt from play
    #[serde(skip)]
    region_kills: HashMap<RegionKey, u32>,
    zones: Vec<SafeZone>,
    guardians: Vec<Guardian>,
    next_id: u32,
}

impl SafeZoneManager {
    pub fn new(config: SafeZoneConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn region_of(&self, pos: Vec2) -> RegionKey {
        RegionKey {
            x: (pos.x / self.config.region_size).floor() as i32,
            y: (pos.y / self.config.region_size).floor() as i32,
        }
    }

    pub fn region_center(&self, region: RegionKey) -> Vec2 {
        let size = self.config.region_size;
        Vec2::new(
            region.x as f32 * size + size / 2.0,
            region.y as f32 * size + size / 2.0,
        )
    }

    pub fn region_kills(&self, pos: Vec2) -> u32 {
        self.region_kills
            .get(&self.region_of(pos))
            .copied()
            .unwrap_or(0)
    }

    /// Count a kill; returns the id of a zone created by it
    pub fn record_kill(&mut self, pos: Vec2, now_ms: f64, rng: &mut SimRng) -> Option<u32> {
        let region = self.region_of(pos);
        let kills = self.region_kills.entry(region).or_insert(0);
        *kills += 1;
        let kills = *kills;
        log::debug!("Region ({}, {}) kills: {}", region.x, region.y, kills);

        if kills >= self.config.kills_required
            && !self.has_zone(region)
            && self.can_create(region)
        {
            Some(self.create_zone(region, now_ms, rng))
        } else {
            None
        }
    }

    pub fn has_zone(&self, region: RegionKey) -> bool {
        self.zones.iter().any(|z| z.region == region)
    }

    /// Cap and spacing policy for a new zone
    pub fn can_create(&self, region: RegionKey) -> bool {
        if self.zones.len() >= self.config.max_zones {
            log::debug!("Safe zone cap reached ({})", self.config.max_zones);
            return false;
        }
        self.zones
            .iter()
            .all(|z| z.region.distance(&region) >= self.config.min_region_distance)
    }

    fn create_zone(&mut self, region: RegionKey, now_ms: f64, rng: &mut SimRng) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        let center = self.region_center(region);

        self.zones.push(SafeZone {
            id,
            region,
            center,
            radius: self.config.zone_radius,
            created_ms: now_ms,
            active: true,
        });
        let guardian = self.make_guardian(id, center, rng);
        self.guardians.push(guardian);
        self.evict_excess();

        log::info!(
            "Safe zone {} created at region ({}, {})",
            id,
            region.x,
            region.y
        );
        id
    }

    fn make_guardian(&self, zone_id: u32, pos: Vec2, rng: &mut SimRng) -> Guardian {
        let c = &self.config;
        let variant = rng
            .pick(&EliteVariant::ALL)
            .copied()
            .unwrap_or(EliteVariant::Guardian);
        let orbs = (0..c.guardian_orb_count)
            .map(|i| {
                let angle = i as f32 / c.guardian_orb_count as f32 * TAU;
                pos + polar_to_cartesian(c.guardian_orb_radius, angle)
            })
            .collect();
        Guardian {
            zone_id,
            pos,
            variant,
            level: c.guardian_level,
            radius: c.guardian_radius,
            health: c.guardian_health,
            max_health: c.guardian_health,
            rotation: 0.0,
            rotation_speed: c.guardian_rotation_speed,
            orb_angle: 0.0,
            orb_radius: c.guardian_orb_radius,
            orbs,
            glow: 0.0,
            glow_rising: true,
        }
    }

    /// Keep only the newest zones up to the cap
    fn evict_excess(&mut self) {
        if self.zones.len() <= self.config.max_zones {
            return;
        }
        self.zones
            .sort_by(|a, b| b.created_ms.total_cmp(&a.created_ms).then(b.id.cmp(&a.id)));
        let evicted: Vec<u32> = self
            .zones
            .drain(self.config.max_zones..)
            .map(|z| z.id)
            .collect();
        self.guardians.retain(|g| !evicted.contains(&g.zone_id));
        log::info!("Evicted {} excess safe zone(s)", evicted.len());
    }

    /// First active zone containing `pos`
    pub fn zone_at(&self, pos: Vec2) -> Option<&SafeZone> {
        self.zones.iter().find(|z| z.contains(pos))
    }

    pub fn is_in_safe_zone(&self, pos: Vec2) -> bool {
        self.zone_at(pos).is_some()
    }

    /// Unit vector pushing `pos` away from the first zone it is approaching
    pub fn avoidance_vector(&self, pos: Vec2) -> Option<Vec2> {
        self.zones.iter().filter(|z| z.active).find_map(|z| {
            let offset = pos - z.center;
            let distance = offset.length();
            (distance > 0.0 && distance < z.radius + self.config.avoidance_margin)
                .then(|| offset / distance)
        })
    }

    /// Animate guardians, then drop zones and guardians far from the player
    pub fn update(&mut self, player_pos: Vec2) {
        for guardian in &mut self.guardians {
            guardian.update();
        }

        let max = self.config.cleanup_distance;
        let before = self.zones.len();
        self.zones.retain(|z| z.center.distance(player_pos) <= max);
        let live: Vec<u32> = self.zones.iter().map(|z| z.id).collect();
        self.guardians
            .retain(|g| live.contains(&g.zone_id) && g.pos.distance(player_pos) <= max);
        if self.zones.len() != before {
            log::debug!("Cleaned up {} distant safe zone(s)", before - self.zones.len());
        }
    }

    pub fn zones(&self) -> &[SafeZone] {
        &self.zones
    }

    pub fn guardians(&self) -> &[Guardian] {
        &self.guardians
    }

    pub fn reset(&mut self) {
        self.region_kills.clear();
        self.zones.clear();
        self.guardians.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kill_n(manager: &mut SafeZoneManager, pos: Vec2, n: u32, rng: &mut SimRng) -> Vec<u32> {
        (0..n)
            .filter_map(|i| manager.record_kill(pos, i as f64, rng))
            .collect()
    }

    #[test]
    fn test_hundred_kills_create_one_zone() {
        let mut manager = SafeZoneManager::default();
        let mut rng = SimRng::new(1);
        let pos = Vec2::new(1000.0, 1000.0);

        assert!(kill_n(&mut manager, pos, 99, &mut rng).is_empty());
        assert!(manager.zones().is_empty());

        let created = kill_n(&mut manager, pos, 1, &mut rng);
        assert_eq!(created.len(), 1);
        assert_eq!(manager.zones().len(), 1);
        assert_eq!(manager.guardians().len(), 1);
        assert_eq!(manager.zones()[0].center, Vec2::new(1200.0, 1200.0));
        assert_eq!(manager.region_kills(pos), 100);

        // The same region never spawns a second zone
        assert!(kill_n(&mut manager, pos, 200, &mut rng).is_empty());
        assert_eq!(manager.zones().len(), 1);
    }

    #[test]
    fn test_negative_coordinates_floor_into_regions() {
        let manager = SafeZoneManager::default();
        assert_eq!(manager.region_of(Vec2::new(-1.0, -801.0)), RegionKey { x: -1, y: -2 });
        assert_eq!(
            manager.region_center(RegionKey { x: -1, y: 0 }),
            Vec2::new(-400.0, 400.0)
        );
    }

    #[test]
    fn test_adjacent_region_blocked_by_spacing() {
        let mut manager = SafeZoneManager::default();
        let mut rng = SimRng::new(1);
        kill_n(&mut manager, Vec2::new(100.0, 100.0), 100, &mut rng);
        // Region (1, 0) is one region away
        assert!(kill_n(&mut manager, Vec2::new(900.0, 100.0), 100, &mut rng).is_empty());
        // Region (2, 0) is exactly two regions away
        assert_eq!(kill_n(&mut manager, Vec2::new(1700.0, 100.0), 100, &mut rng).len(), 1);
    }

    #[test]
    fn test_cap_holds() {
        let mut manager = SafeZoneManager::default();
        let mut rng = SimRng::new(1);
        for rx in 0..6 {
            let pos = Vec2::new(rx as f32 * 2400.0 + 10.0, 10.0);
            kill_n(&mut manager, pos, 100, &mut rng);
        }
        assert_eq!(manager.zones().len(), 3);
        assert_eq!(manager.guardians().len(), 3);
    }

    #[test]
    fn test_guardian_orbs_and_glow() {
        let mut manager = SafeZoneManager::default();
        let mut rng = SimRng::new(4);
        kill_n(&mut manager, Vec2::new(10.0, 10.0), 100, &mut rng);
        for _ in 0..100 {
            manager.update(Vec2::ZERO);
        }
        let g = &manager.guardians()[0];
        assert_eq!(g.orbs.len(), 4);
        assert!((0.0..=1.0).contains(&g.glow));
        for orb in &g.orbs {
            assert!((orb.distance(g.pos) - 60.0).abs() < 1e-3);
        }
        assert_eq!(g.level, 50);
        assert_eq!(g.max_health, 1000.0);
    }

    #[test]
    fn test_membership_and_avoidance() {
        let mut manager = SafeZoneManager::default();
        let mut rng = SimRng::new(1);
        kill_n(&mut manager, Vec2::new(10.0, 10.0), 100, &mut rng);
        let center = Vec2::new(400.0, 400.0);

        assert!(manager.is_in_safe_zone(center));
        assert!(manager.is_in_safe_zone(center + Vec2::new(400.0, 0.0)));
        assert!(!manager.is_in_safe_zone(center + Vec2::new(401.0, 0.0)));

        let v = manager.avoidance_vector(center + Vec2::new(450.0, 0.0)).unwrap();
        assert!((v - Vec2::X).length() < 1e-6);
        assert!(manager.avoidance_vector(center + Vec2::new(501.0, 0.0)).is_none());
        assert!(manager.avoidance_vector(center).is_none());
    }

    #[test]
    fn test_cleanup_removes_zone_and_guardian_together() {
        let mut manager = SafeZoneManager::default();
        let mut rng = SimRng::new(1);
        kill_n(&mut manager, Vec2::new(10.0, 10.0), 100, &mut rng);
        manager.update(Vec2::new(3000.0, 400.0));
        assert_eq!(manager.zones().len(), 1);
        manager.update(Vec2::new(4000.0, 400.0));
        assert!(manager.zones().is_empty());
        assert!(manager.guardians().is_empty());
    }

    #[test]
    fn test_reset() {
        let mut manager = SafeZoneManager::default();
        let mut rng = SimRng::new(1);
        kill_n(&mut manager, Vec2::new(10.0, 10.0), 100, &mut rng);
        manager.reset();
        assert!(manager.zones().is_empty());
        assert_eq!(manager.region_kills(Vec2::new(10.0, 10.0)), 0);
    }

    proptest! {
        #[test]
        fn prop_cap_and_spacing_hold(kills in prop::collection::vec((-8i32..8, -8i32..8), 0..400)) {
            let mut manager = SafeZoneManager::new(SafeZoneConfig {
                kills_required: 5,
                ..Default::default()
            });
            let mut rng = SimRng::new(77);
            for (i, (rx, ry)) in kills.into_iter().enumerate() {
                let pos = Vec2::new(rx as f32 * 800.0 + 5.0, ry as f32 * 800.0 + 5.0);
                manager.record_kill(pos, i as f64, &mut rng);
            }
            let zones = manager.zones();
            prop_assert!(zones.len() <= 3);
            prop_assert_eq!(zones.len(), manager.guardians().len());
            for (i, a) in zones.iter().enumerate() {
                for b in &zones[i + 1..] {
                    prop_assert!(a.region.distance(&b.region) >= 2.0);
                }
            }
        }
    }
}
