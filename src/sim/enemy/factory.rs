//! Enemy construction: base shell, level scaling, then per-kind adjustments

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::behavior::behavior_for;
use super::{AiState, EliteVariant, Enemy, EnemyKind, KindState};
use crate::sim::buff::BuffEngine;
use crate::sim::rng::SimRng;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CreationError {
    #[error("invalid spawn position ({x}, {y})")]
    InvalidPosition { x: f32, y: f32 },
    #[error("{kind} built with invalid stats: radius {radius}, health {health}")]
    InvalidStats {
        kind: &'static str,
        radius: f32,
        health: f32,
    },
}

/// Overrides for the random rolls made during creation
#[derive(Debug, Clone, Copy, Default)]
pub struct CreationOptions {
    pub force_large: Option<bool>,
    pub force_fast: Option<bool>,
    pub elite_variant: Option<EliteVariant>,
}

/// Base stats shared by every kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyFactory {
    pub large_chance: f32,
    pub fast_chance: f32,
    pub fast_multiplier: f32,
    pub large_radius: f32,
    pub large_health: f32,
    pub normal_radius: f32,
    pub normal_health: f32,
    pub damage: f32,
    pub detection_range: f32,
    pub chase_range: f32,
    pub return_speed: f32,
    pub return_threshold: f32,
    /// Distance from the origin per enemy level
    pub level_distance: f32,
}

impl Default for EnemyFactory {
    fn default() -> Self {
        Self {
            large_chance: 0.15,
            fast_chance: 0.1,
            fast_multiplier: 1.8,
            large_radius: 35.0,
            large_health: 40.0,
            normal_radius: 20.0,
            normal_health: 20.0,
            damage: 10.0,
            detection_range: 350.0,
            chase_range: 1000.0,
            return_speed: 0.8,
            return_threshold: 300.0,
            level_distance: 1000.0,
        }
    }
}

impl EnemyFactory {
    /// Level of an enemy spawned at `pos`
    pub fn level_at(&self, pos: Vec2) -> u32 {
        ((pos.length() / self.level_distance).floor() as u32).max(1)
    }

    pub fn create(
        &self,
        id: u32,
        pos: Vec2,
        kind: EnemyKind,
        buffs: &BuffEngine,
        rng: &mut SimRng,
    ) -> Result<Enemy, CreationError> {
        self.create_with(id, pos, kind, buffs, rng, &CreationOptions::default())
    }

    pub fn create_with(
        &self,
        id: u32,
        pos: Vec2,
        kind: EnemyKind,
        buffs: &BuffEngine,
        rng: &mut SimRng,
        opts: &CreationOptions,
    ) -> Result<Enemy, CreationError> {
        if !pos.is_finite() {
            return Err(CreationError::InvalidPosition { x: pos.x, y: pos.y });
        }

        // Both rolls are always drawn so overrides don't shift the sequence
        let large_roll = rng.chance(self.large_chance);
        let fast_roll = rng.chance(self.fast_chance);
        let is_large = opts.force_large.unwrap_or(large_roll);
        let is_fast = opts.force_fast.unwrap_or(fast_roll);

        let (radius, health) = if is_large {
            (self.large_radius, self.large_health)
        } else {
            (self.normal_radius, self.normal_health)
        };
        let mut speed = kind.base_speed();
        if is_fast {
            speed *= self.fast_multiplier;
        }

        let distance = pos.length();
        let mut enemy = Enemy {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            radius,
            health,
            max_health: health,
            damage: self.damage,
            speed,
            level: self.level_at(pos),
            distance_from_spawn: distance,
            ai: AiState::Idle,
            detection_range: self.detection_range,
            chase_range: self.chase_range,
            return_speed: self.return_speed,
            return_threshold: self.return_threshold,
            anchor: pos,
            attack_cooldown: 0.0,
            ranged_cooldown: 0.0,
            stunned: 0,
            is_large,
            is_fast,
            scaled: false,
            despawn: false,
            state: KindState::Plain,
        };

        buffs.apply_level_scaling(&mut enemy, rng);
        behavior_for(kind).on_create(&mut enemy, rng, opts);

        if !(enemy.radius.is_finite() && enemy.radius > 0.0)
            || !(enemy.health.is_finite() && enemy.health > 0.0)
        {
            return Err(CreationError::InvalidStats {
                kind: kind.as_str(),
                radius: enemy.radius,
                health: enemy.health,
            });
        }
        Ok(enemy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn plain() -> CreationOptions {
        CreationOptions {
            force_large: Some(false),
            force_fast: Some(false),
            elite_variant: None,
        }
    }

    #[test]
    fn test_largered_level_one() {
        let factory = EnemyFactory::default();
        let buffs = BuffEngine::default();
        let mut rng = SimRng::new(11);
        let enemy = factory
            .create_with(1, Vec2::ZERO, EnemyKind::LargeRed, &buffs, &mut rng, &plain())
            .unwrap();
        assert_eq!(enemy.level, 1);
        assert_eq!(enemy.radius, 40.0);
        assert_eq!(enemy.health, 80.0);
        assert_eq!(enemy.max_health, 80.0);
        assert!((enemy.speed - 4.5 * 0.7).abs() < 1e-5);
    }

    #[test]
    fn test_level_from_distance() {
        let factory = EnemyFactory::default();
        assert_eq!(factory.level_at(Vec2::ZERO), 1);
        assert_eq!(factory.level_at(Vec2::new(999.0, 0.0)), 1);
        assert_eq!(factory.level_at(Vec2::new(0.0, -3500.0)), 3);
    }

    #[test]
    fn test_scaling_happens_before_type_adjustments() {
        let factory = EnemyFactory::default();
        let buffs = BuffEngine::default();
        let mut rng = SimRng::new(5);
        // level 3: health 20 * 3 = 60, then black doubles it
        let enemy = factory
            .create_with(1, Vec2::new(3000.0, 0.0), EnemyKind::Black, &buffs, &mut rng, &plain())
            .unwrap();
        assert_eq!(enemy.level, 3);
        assert_eq!(enemy.health, 120.0);
        assert_eq!(enemy.max_health, 120.0);
        assert!(enemy.scaled);
    }

    #[test]
    fn test_no_scaling_without_level_enhancement() {
        let factory = EnemyFactory::default();
        let mut buffs = BuffEngine::default();
        buffs.clear();
        let mut rng = SimRng::new(5);
        let enemy = factory
            .create_with(1, Vec2::new(3000.0, 0.0), EnemyKind::Red, &buffs, &mut rng, &plain())
            .unwrap();
        assert!(!enemy.scaled);
        assert_eq!(enemy.health, 20.0);
    }

    #[test]
    fn test_large_and_fast_overrides() {
        let factory = EnemyFactory::default();
        let buffs = BuffEngine::default();
        let mut rng = SimRng::new(5);
        let opts = CreationOptions {
            force_large: Some(true),
            force_fast: Some(true),
            elite_variant: None,
        };
        let enemy = factory
            .create_with(1, Vec2::ZERO, EnemyKind::White, &buffs, &mut rng, &opts)
            .unwrap();
        assert!(enemy.is_large && enemy.is_fast);
        assert_eq!(enemy.health, 40.0);
        assert!((enemy.speed - 5.5 * 1.8).abs() < 1e-4);
    }

    #[test]
    fn test_elite_variants() {
        let factory = EnemyFactory::default();
        let buffs = BuffEngine::default();
        let mut rng = SimRng::new(9);
        let expected = [
            (EliteVariant::Graviton, 4),
            (EliteVariant::Destroyer, 6),
            (EliteVariant::Guardian, 3),
            (EliteVariant::Vortex, 5),
        ];
        for (variant, orb_count) in expected {
            let opts = CreationOptions {
                elite_variant: Some(variant),
                ..plain()
            };
            let enemy = factory
                .create_with(1, Vec2::ZERO, EnemyKind::Elite, &buffs, &mut rng, &opts)
                .unwrap();
            assert_eq!(enemy.elite_variant(), Some(variant));
            match &enemy.state {
                KindState::Elite { orbs, orb_orbit, .. } => {
                    assert_eq!(orbs.len(), orb_count);
                    assert!((orb_orbit - (enemy.radius + 40.0)).abs() < 1e-4);
                }
                other => panic!("unexpected state {other:?}"),
            }
            assert_eq!(enemy.health, enemy.max_health);
        }
    }

    #[test]
    fn test_guardian_variant_health() {
        let factory = EnemyFactory::default();
        let buffs = BuffEngine::default();
        let mut rng = SimRng::new(9);
        let opts = CreationOptions {
            elite_variant: Some(EliteVariant::Guardian),
            ..plain()
        };
        let enemy = factory
            .create_with(1, Vec2::ZERO, EnemyKind::Elite, &buffs, &mut rng, &opts)
            .unwrap();
        // 20 * 8 * 1.5
        assert_eq!(enemy.max_health, 240.0);
        assert_eq!(enemy.damage, 25.0);
    }

    #[test]
    fn test_invalid_position_rejected() {
        let factory = EnemyFactory::default();
        let buffs = BuffEngine::default();
        let mut rng = SimRng::new(1);
        let err = factory
            .create(1, Vec2::new(f32::NAN, 0.0), EnemyKind::Red, &buffs, &mut rng)
            .unwrap_err();
        assert!(matches!(err, CreationError::InvalidPosition { .. }));
    }

    #[test]
    fn test_kind_states() {
        let factory = EnemyFactory::default();
        let buffs = BuffEngine::default();
        let mut rng = SimRng::new(2);
        for kind in EnemyKind::BASE {
            let enemy = factory
                .create_with(1, Vec2::new(100.0, 0.0), kind, &buffs, &mut rng, &plain())
                .unwrap();
            let matches = match kind {
                EnemyKind::LargeRed => matches!(enemy.state, KindState::LargeRed { .. }),
                EnemyKind::Rotating => matches!(enemy.state, KindState::Rotating { .. }),
                EnemyKind::Teleport => matches!(enemy.state, KindState::Teleport { .. }),
                EnemyKind::Snake => {
                    matches!(&enemy.state, KindState::Snake { segments, .. } if segments.len() == 3)
                }
                EnemyKind::Yellow => {
                    enemy.radius == 15.0 && matches!(enemy.state, KindState::Yellow { .. })
                }
                EnemyKind::Control => matches!(enemy.state, KindState::Control { .. }),
                _ => enemy.state == KindState::Plain,
            };
            assert!(matches, "{} has the wrong state", kind.as_str());
        }
    }

    proptest! {
        #[test]
        fn prop_scaled_stats_monotonic_in_level(seed in any::<u64>(), kind_idx in 0usize..10, lvl in 1u32..40) {
            let factory = EnemyFactory::default();
            let buffs = BuffEngine::default();
            let kind = EnemyKind::BASE[kind_idx];
            let near = Vec2::new(lvl as f32 * 1000.0 + 10.0, 0.0);
            let far = Vec2::new((lvl + 1) as f32 * 1000.0 + 10.0, 0.0);
            let a = factory.create_with(1, near, kind, &buffs, &mut SimRng::new(seed), &plain()).unwrap();
            let b = factory.create_with(1, far, kind, &buffs, &mut SimRng::new(seed), &plain()).unwrap();
            prop_assert!(b.level > a.level);
            prop_assert!(b.max_health >= a.max_health);
            prop_assert!(b.damage >= a.damage);
            prop_assert!(b.speed >= a.speed);
            prop_assert!(b.detection_range >= a.detection_range);
            prop_assert!(b.chase_range >= a.chase_range);
        }
    }
}
