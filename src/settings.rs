//! Game settings and preferences
//!
//! Persisted in LocalStorage on the web; natively the defaults are used.

use serde::{Deserialize, Serialize};

/// Performance mode: trades population and update frequency for frame time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PerformanceMode {
    Low,
    #[default]
    Medium,
    High,
}

impl PerformanceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceMode::Low => "Low",
            PerformanceMode::Medium => "Medium",
            PerformanceMode::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(PerformanceMode::Low),
            "medium" | "med" => Some(PerformanceMode::Medium),
            "high" => Some(PerformanceMode::High),
            _ => None,
        }
    }

    /// Seconds between dynamic spawn attempts
    pub fn spawn_interval(&self) -> f32 {
        match self {
            PerformanceMode::Low => 0.8,
            PerformanceMode::Medium => 0.5,
            PerformanceMode::High => 0.3,
        }
    }

    /// Chance a dynamic spawn attempt succeeds
    pub fn spawn_probability(&self) -> f32 {
        match self {
            PerformanceMode::Low => 0.3,
            PerformanceMode::Medium => 0.5,
            PerformanceMode::High => 0.7,
        }
    }

    /// Enemy count above which the dynamic spawner idles
    pub fn max_enemies(&self) -> usize {
        match self {
            PerformanceMode::Low => 15,
            PerformanceMode::Medium => 25,
            PerformanceMode::High => 40,
        }
    }

    /// Far enemies only run AI every this many frames
    pub fn ai_stride(&self) -> u64 {
        match self {
            PerformanceMode::Low => 9,
            PerformanceMode::Medium => 6,
            PerformanceMode::High => 3,
        }
    }

    /// Per-frame spiked ball spawn chance
    pub fn spiked_ball_chance(&self) -> f32 {
        match self {
            PerformanceMode::Low => 0.005,
            PerformanceMode::Medium => 0.01,
            PerformanceMode::High => 0.015,
        }
    }

    pub fn max_spiked_balls(&self) -> usize {
        match self {
            PerformanceMode::Low => 5,
            PerformanceMode::Medium => 10,
            PerformanceMode::High => 15,
        }
    }

    /// Frames between terrain cleanup sweeps
    pub fn cleanup_interval(&self) -> u64 {
        match self {
            PerformanceMode::Low => 30,
            PerformanceMode::Medium => 60,
            PerformanceMode::High => 120,
        }
    }

    /// Maximum particles for this mode
    pub fn max_particles(&self) -> usize {
        match self {
            PerformanceMode::Low => 100,
            PerformanceMode::Medium => 500,
            PerformanceMode::High => 2000,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub performance: PerformanceMode,
    /// Viewport size in world units
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Fixed world seed; random when absent
    pub seed: Option<u64>,
    /// Particle effects (bursts, sparks)
    pub particles: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            performance: PerformanceMode::Medium,
            viewport_width: crate::consts::VIEWPORT_WIDTH,
            viewport_height: crate::consts::VIEWPORT_HEIGHT,
            seed: None,
            particles: true,
        }
    }
}

impl Settings {
    pub fn from_mode(mode: PerformanceMode) -> Self {
        Self {
            performance: mode,
            ..Self::default()
        }
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.performance.max_particles()
        }
    }

    /// Seed to build a world with
    pub fn world_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "ball_adventure_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
