//! Monster spawn/kill counters for debug overlays

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::enemy::{EliteVariant, Enemy, EnemyKind};

/// Result of an elite roll at a spawn location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EliteRoll {
    /// Location outside the elite distance band
    OutOfBand,
    /// In band, roll failed
    Failed,
    Success,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonsterStats {
    pub total_spawned: u32,
    pub total_killed: u32,
    pub spawned_by_kind: BTreeMap<EnemyKind, u32>,
    pub killed_by_kind: BTreeMap<EnemyKind, u32>,
    pub elites_by_variant: BTreeMap<EliteVariant, u32>,
    pub elite_attempts: u32,
    pub elite_successes: u32,
    pub elite_failed_distance: u32,
    pub elite_failed_random: u32,
}

impl MonsterStats {
    pub fn record_spawn(&mut self, enemy: &Enemy) {
        self.total_spawned += 1;
        *self.spawned_by_kind.entry(enemy.kind).or_insert(0) += 1;
        if let Some(variant) = enemy.elite_variant() {
            *self.elites_by_variant.entry(variant).or_insert(0) += 1;
        }
    }

    pub fn record_kill(&mut self, kind: EnemyKind) {
        self.total_killed += 1;
        *self.killed_by_kind.entry(kind).or_insert(0) += 1;
    }

    pub fn record_elite_roll(&mut self, roll: EliteRoll) {
        self.elite_attempts += 1;
        match roll {
            EliteRoll::OutOfBand => self.elite_failed_distance += 1,
            EliteRoll::Failed => self.elite_failed_random += 1,
            EliteRoll::Success => self.elite_successes += 1,
        }
    }

    /// Share of elite attempts that produced an elite
    pub fn elite_success_rate(&self) -> f32 {
        if self.elite_attempts == 0 {
            0.0
        } else {
            self.elite_successes as f32 / self.elite_attempts as f32
        }
    }

    pub fn spawned(&self, kind: EnemyKind) -> u32 {
        self.spawned_by_kind.get(&kind).copied().unwrap_or(0)
    }

    pub fn killed(&self, kind: EnemyKind) -> u32 {
        self.killed_by_kind.get(&kind).copied().unwrap_or(0)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elite_roll_tally() {
        let mut stats = MonsterStats::default();
        stats.record_elite_roll(EliteRoll::OutOfBand);
        stats.record_elite_roll(EliteRoll::Failed);
        stats.record_elite_roll(EliteRoll::Failed);
        stats.record_elite_roll(EliteRoll::Success);
        assert_eq!(stats.elite_attempts, 4);
        assert_eq!(stats.elite_failed_distance, 1);
        assert_eq!(stats.elite_failed_random, 2);
        assert_eq!(stats.elite_success_rate(), 0.25);
    }

    #[test]
    fn test_kill_counts() {
        let mut stats = MonsterStats::default();
        stats.record_kill(EnemyKind::Snake);
        stats.record_kill(EnemyKind::Snake);
        assert_eq!(stats.killed(EnemyKind::Snake), 2);
        assert_eq!(stats.killed(EnemyKind::Red), 0);
        assert_eq!(stats.total_killed, 2);
        stats.reset();
        assert_eq!(stats.total_killed, 0);
    }
}
