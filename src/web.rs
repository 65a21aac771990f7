//! Browser bindings: a `Game` handle driven by the page's animation loop
//!
//! The page owns rendering and raw DOM input; it forwards decoded keys and
//! pointer state here, calls `tick` once per frame and reads the world back as
//! JSON. Game events are re-dispatched on `window` as `CustomEvent`s.

use glam::Vec2;
use serde_json::json;
use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, CustomEventInit};

use crate::settings::{PerformanceMode, Settings};
use crate::sim::{GameEvent, TickInput, World, tick};

#[wasm_bindgen]
pub struct Game {
    world: World,
    input: TickInput,
    /// Pointer in screen space, mapped to the world each frame
    pointer: Option<Vec2>,
}

#[wasm_bindgen]
impl Game {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Game {
        let settings = Settings::load();
        Self::with_settings(&settings)
    }

    /// Start over with the current settings
    pub fn restart(&mut self) {
        *self = Self::with_settings(&Settings::load());
        log::info!("Game restarted");
    }

    /// Switch performance mode ("low", "medium", "high") and persist it
    #[wasm_bindgen(js_name = setPerformanceMode)]
    pub fn set_performance_mode(&mut self, mode: &str) -> bool {
        let Some(mode) = PerformanceMode::from_str(mode) else {
            log::warn!("Unknown performance mode: {}", mode);
            return false;
        };
        self.world.mode = mode;
        let mut settings = Settings::load();
        settings.performance = mode;
        settings.save();
        true
    }

    /// Keyboard state, keyed by `KeyboardEvent.key` lowercased
    #[wasm_bindgen(js_name = setKey)]
    pub fn set_key(&mut self, key: &str, down: bool) {
        let input = &mut self.input;
        match key {
            "a" | "arrowleft" => input.left = down,
            "d" | "arrowright" => input.right = down,
            "w" | "arrowup" => input.double_jump = down,
            "s" | "arrowdown" => input.fast_fall = down,
            " " => input.jump = down,
            "r" => input.laser = down,
            "x" if down => input.wheels = true,
            "f" if down => input.blink = true,
            "escape" | "p" if down => input.pause = true,
            _ => {}
        }
    }

    /// Mouse buttons: 0 fires, 2 casts the shockwave
    #[wasm_bindgen(js_name = setButton)]
    pub fn set_button(&mut self, button: u8, down: bool) {
        match button {
            0 => self.input.fire = down,
            2 if down => self.input.aoe = true,
            _ => {}
        }
    }

    #[wasm_bindgen(js_name = setPointer)]
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.pointer = Some(Vec2::new(x, y));
    }

    /// Advance one frame, then clear one-shot actions
    pub fn tick(&mut self) {
        self.input.aim = self.pointer.map(|p| self.world.camera.screen_to_world(p));
        tick(&mut self.world, &self.input);
        self.world.events.drain();

        let input = &mut self.input;
        input.wheels = false;
        input.blink = false;
        input.aoe = false;
        input.pause = false;
    }

    /// Whole world as JSON for the renderer
    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.world
            .snapshot_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(getter)]
    pub fn score(&self) -> u32 {
        self.world.score
    }

    #[wasm_bindgen(getter, js_name = gameOver)]
    pub fn game_over(&self) -> bool {
        self.world.game_over
    }

    #[wasm_bindgen(getter)]
    pub fn paused(&self) -> bool {
        self.world.paused
    }

    /// Trinity wheels and shot lines, solar aura and buff timers as JSON
    #[wasm_bindgen(js_name = buffVisuals)]
    pub fn buff_visuals(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.world.buff_visuals(self.input.aim))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Monster statistics for the debug overlay
    #[wasm_bindgen(js_name = monsterStats)]
    pub fn monster_stats(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.world.stats).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Game {
    fn with_settings(settings: &Settings) -> Game {
        let mut world = World::new(settings);
        world.events.subscribe(dispatch_dom_event);
        Game {
            world,
            input: TickInput::default(),
            pointer: None,
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

fn event_detail(event: &GameEvent) -> serde_json::Value {
    match event {
        GameEvent::MonsterKilled {
            kind,
            elite_variant,
            level,
            max_health,
            pos,
            exp,
            score,
        } => json!({
            "monster": {
                "type": kind.as_str(),
                "eliteType": elite_variant.map(|v| v.as_str()),
                "level": level,
                "maxHealth": max_health,
                "x": pos.x,
                "y": pos.y,
            },
            "exp": exp,
            "score": score,
        }),
        GameEvent::SafeZoneCreated { zone_id, center } => json!({
            "zoneId": zone_id,
            "x": center.x,
            "y": center.y,
        }),
        GameEvent::BuffActivated { id } => json!({ "buff": id.as_str() }),
        GameEvent::LevelUp { level } => json!({ "level": level }),
        GameEvent::PlayerDamaged { damage } => json!({ "damage": damage }),
        GameEvent::FrenzyStarted | GameEvent::FrenzyEnded => json!({}),
    }
}

fn dispatch_dom_event(event: &GameEvent) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let detail = match js_sys::JSON::parse(&event_detail(event).to_string()) {
        Ok(detail) => detail,
        Err(e) => {
            log::warn!("Failed to encode {} detail: {:?}", event.name(), e);
            return;
        }
    };
    let init = CustomEventInit::new();
    init.set_detail(&detail);
    match CustomEvent::new_with_event_init_dict(event.name(), &init) {
        Ok(dom_event) => {
            let _ = window.dispatch_event(&dom_event);
        }
        Err(e) => log::warn!("Failed to create {} event: {:?}", event.name(), e),
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Ball Adventure core loaded");
}
