//! Browser bindings
//!
//! The page owns the timer and the keyboard; it calls `tick` with the packed
//! button bits and reads snapshots back as JSON. Everything else is the same
//! `World` the native driver runs.

use std::sync::Arc;

use wasm_bindgen::prelude::*;

use crate::settings::SimConfig;
use crate::sim::{Level, TickInput, World};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Already initialised by an earlier module instance
        return;
    }
    log::info!("platform-duel engine loaded");
}

/// One battle side
#[wasm_bindgen]
pub struct WebWorld {
    world: World,
}

#[wasm_bindgen]
impl WebWorld {
    /// `config_json` may be empty for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(level_text: &str, config_json: &str) -> Result<WebWorld, JsError> {
        let config = if config_json.trim().is_empty() {
            SimConfig::default()
        } else {
            SimConfig::from_json(config_json)?
        };
        let level = Level::parse_with(level_text, &config)?;
        Ok(Self {
            world: World::new(Arc::new(level), config),
        })
    }

    /// Advance one tick. Bits above the five button bits are ignored.
    pub fn tick(&mut self, input_bits: u8) {
        self.world.tick(&TickInput::from_bits(input_bits));
    }

    /// `RUNNING`, `WIN`, `LOSE` or `TIME_OUT`
    pub fn status(&self) -> String {
        serde_json::to_value(self.world.status())
            .ok()
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default()
    }

    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.world.snapshot())?)
    }

    #[wasm_bindgen(js_name = resultJson)]
    pub fn result_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.world.result())?)
    }

    /// Events raised by the last tick call, as a JSON array
    #[wasm_bindgen(js_name = eventsJson)]
    pub fn events_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(self.world.last_events())?)
    }

    /// Current tile codes, row-major
    pub fn tiles(&self) -> Vec<u8> {
        self.world.terrain().codes()
    }

    pub fn width(&self) -> usize {
        self.world.level().width()
    }

    pub fn height(&self) -> usize {
        self.world.level().height()
    }
}
