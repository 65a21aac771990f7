//! Ball Adventure - endless side-scrolling ball brawler
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, enemy AI, combat, buffs, safe zones)
//! - `settings`: Player-facing configuration (performance mode, viewport)
//! - `web`: wasm-bindgen surface consumed by the canvas front-end

pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use settings::{PerformanceMode, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// One simulation frame in milliseconds (the game is tuned for 60 fps)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Default viewport, used for camera offsets and density regions
    pub const VIEWPORT_WIDTH: f32 = 1280.0;
    pub const VIEWPORT_HEIGHT: f32 = 720.0;

    /// Player movement
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const FRICTION: f32 = 0.85;
    pub const GRAVITY: f32 = 0.5;
    pub const JUMP_FORCE: f32 = 12.0;
    pub const DOUBLE_JUMP_FORCE: f32 = 10.0;
    /// Jump force multiplier at a full charge
    pub const CHARGE_JUMP_MULTIPLIER: f32 = 1.8;
    pub const CHARGE_JUMP_MAX_FRAMES: f32 = 60.0;
    pub const MAX_JUMPS: u32 = 2;
    pub const DASH_SPEED: f32 = 15.0;
    pub const DASH_DURATION: f32 = 10.0;
    pub const DASH_COOLDOWN: f32 = 60.0;
    /// Two taps closer than this start a dash
    pub const DOUBLE_TAP_MS: f64 = 300.0;

    /// Player resources
    pub const STAMINA_RECOVERY: f32 = 0.5;
    pub const MANA_RECOVERY: f32 = 0.3;
    pub const RAGE_RECOVERY: f32 = 0.1;

    /// Player combat
    pub const AUTO_AIM_RADIUS: f32 = 400.0;
    pub const PLAYER_ATTACK_COOLDOWN: f32 = 15.0;
    pub const PROJECTILE_SPEED: f32 = 10.0;
    pub const RECOIL_FORCE: f32 = 3.0;
    pub const CONTACT_KNOCKBACK: f32 = 15.0;

    /// Enemy tuning shared by every kind
    pub const ENEMY_ATTACK_COOLDOWN: f32 = 60.0;
    pub const ELITE_SPAWN_CHANCE: f32 = 0.05;
    pub const ELITE_MIN_DISTANCE: f32 = 800.0;
    pub const ELITE_MAX_DISTANCE: f32 = 1600.0;

    /// Spawn points only tick when the player is this close
    pub const SPAWN_ACTIVATION_RANGE: f32 = 1000.0;
    /// Spawn points take a breather after a burst of spawns
    pub const PERSISTENT_SPAWN_ACTIVATION: bool = true;

    /// Frenzy mode timers (frames)
    pub const FRENZY_MAX_DURATION: u32 = 600;
    pub const FRENZY_MAX_COOLDOWN: u32 = 1800;

    pub const CAMERA_SMOOTHNESS: f32 = 0.1;
}

/// Offset of length `r` at angle `theta`
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Unit vector pointing from `from` to `to`, zero when they coincide
#[inline]
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}
