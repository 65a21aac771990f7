//! Game events raised during a frame.
//!
//! Listeners registered on the [`EventBus`] run synchronously as events are
//! emitted; the same events are also queued for the host to drain once per frame.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::buff::BuffId;
use super::enemy::{EliteVariant, EnemyKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    MonsterKilled {
        kind: EnemyKind,
        elite_variant: Option<EliteVariant>,
        level: u32,
        max_health: f32,
        pos: Vec2,
        exp: u32,
        score: u32,
    },
    SafeZoneCreated {
        zone_id: u32,
        center: Vec2,
    },
    BuffActivated {
        id: BuffId,
    },
    LevelUp {
        level: u32,
    },
    FrenzyStarted,
    FrenzyEnded,
    PlayerDamaged {
        damage: f32,
    },
}

impl GameEvent {
    /// Event name used by the browser bridge
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::MonsterKilled { .. } => "monsterKilled",
            GameEvent::SafeZoneCreated { .. } => "safeZoneCreated",
            GameEvent::BuffActivated { .. } => "buffActivated",
            GameEvent::LevelUp { .. } => "levelUp",
            GameEvent::FrenzyStarted => "frenzyStarted",
            GameEvent::FrenzyEnded => "frenzyEnded",
            GameEvent::PlayerDamaged { .. } => "playerDamaged",
        }
    }
}

pub type Listener = Box<dyn FnMut(&GameEvent)>;

#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
    queue: Vec<GameEvent>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("queue", &self.queue)
            .finish()
    }
}

impl EventBus {
    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn emit(&mut self, event: GameEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
        self.queue.push(event);
    }

    pub fn pending(&self) -> &[GameEvent] {
        &self.queue
    }

    /// Take every event queued since the last drain
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.queue)
    }
}
