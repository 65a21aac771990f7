//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one call to [`tick`] is one frame)
//! - Seeded RNG only
//! - Stable iteration order
//! - No rendering or platform dependencies

pub mod ally;
pub mod buff;
pub mod camera;
pub mod combat;
pub mod density;
pub mod effects;
pub mod enemy;
pub mod events;
pub mod hazard;
pub mod noise;
pub mod player;
pub mod projectile;
pub mod rng;
pub mod safe_zone;
pub mod spawn_point;
pub mod stats;
pub mod terrain;
pub mod tick;
pub mod world;

pub use buff::{Buff, BuffEffect, BuffEngine, BuffError, BuffId, BuffVisuals, DropClass};
pub use camera::Camera;
pub use density::{FrenzyChange, FrenzyMode};
pub use effects::{Effects, Tint};
pub use enemy::{
    AiState, CreationError, CreationOptions, EliteVariant, Enemy, EnemyFactory, EnemyKind,
    KindState,
};
pub use events::{EventBus, GameEvent};
pub use noise::{DensityClass, NoiseField};
pub use player::Player;
pub use projectile::{Owner, Projectile, ProjectileKind};
pub use rng::SimRng;
pub use safe_zone::{Guardian, SafeZone, SafeZoneManager};
pub use spawn_point::{SpawnPoint, SpawnPointManager};
pub use stats::{EliteRoll, MonsterStats};
pub use tick::{TickInput, tick};
pub use world::World;
