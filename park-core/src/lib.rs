use wasm_bindgen::prelude::*;

mod area;
mod command;
mod config;
mod coordinates;
mod error;
mod events;
mod group;
mod item;
mod look;
mod movement;
mod npc;
mod placement;
mod player;
mod registry;
mod ride;
mod scenario;
mod shop;
mod snapshot;
mod theft;
mod trade;
mod turn;
mod types;
mod world;

pub use area::*;
pub use command::*;
pub use config::*;
pub use coordinates::*;
pub use error::*;
pub use events::*;
pub use group::*;
pub use item::*;
pub use look::*;
pub use movement::*;
pub use npc::*;
pub use placement::*;
pub use player::*;
pub use registry::*;
pub use ride::*;
pub use scenario::*;
pub use shop::*;
pub use snapshot::*;
pub use theft::*;
pub use trade::*;
pub use turn::*;
pub use types::*;
pub use world::*;

#[cfg(feature = "instrument")]
pub use instrument;

// ============================================================================
// WASM API - Game
// ============================================================================

#[wasm_bindgen]
pub struct Game {
    world: World,
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
impl Game {
    /// The demo park with default rules.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Game, JsValue> {
        Self::start(RulesConfig::default())
    }

    /// The demo park with a fixed seed, for reproducible sessions.
    #[wasm_bindgen]
    pub fn seeded(seed: u64) -> Result<Game, JsValue> {
        Self::start(RulesConfig::default().with_seed(seed))
    }

    /// The demo park with rule overrides given as JSON.
    #[wasm_bindgen]
    pub fn with_rules(rules_json: &str) -> Result<Game, JsValue> {
        let rules = RulesConfig::from_json(rules_json).map_err(js_error)?;
        Self::start(rules)
    }

    fn start(rules: RulesConfig) -> Result<Game, JsValue> {
        // Better panic messages in browser console
        console_error_panic_hook::set_once();

        let world = demo_park(rules).map_err(js_error)?;
        Ok(Self { world })
    }

    /// Run one line of player input and advance the turn
    #[wasm_bindgen]
    pub fn execute(&mut self, input: &str) -> Exchange {
        self.world.execute(input)
    }

    /// Same as `execute`, rendered as plain text lines
    #[wasm_bindgen]
    pub fn execute_lines(&mut self, input: &str) -> Result<JsValue, JsValue> {
        let lines = self.world.execute(input).lines();
        serde_wasm_bindgen::to_value(&lines).map_err(Into::into)
    }

    #[wasm_bindgen]
    pub fn look(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.world.look()).map_err(Into::into)
    }

    #[wasm_bindgen]
    pub fn inventory(&self) -> InventoryReport {
        self.world.inventory()
    }

    /// Let time pass without a player action
    #[wasm_bindgen]
    pub fn advance_turn(&mut self) -> TurnReport {
        self.world.advance_turn()
    }

    #[wasm_bindgen]
    pub fn get_turn(&self) -> u64 {
        self.world.turn
    }

    /// Jump to an area by its snapshot id
    #[wasm_bindgen]
    pub fn teleport_to(&mut self, area_id: u64, x: Option<i32>, y: Option<i32>) -> Result<JsValue, JsValue> {
        let key = AreaKey::from(slotmap::KeyData::from_ffi(area_id));
        let cell = x.zip(y).map(|(x, y)| Cell::new(x, y));
        let events = self.world.set_player_area(Some(key), cell);
        serde_wasm_bindgen::to_value(&events).map_err(Into::into)
    }

    /// Get a snapshot of the current state for rendering
    #[wasm_bindgen]
    pub fn get_state_snapshot(&self) -> WorldSnapshot {
        self.world.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_session_runs() {
        let mut game = Game {
            world: demo_park(RulesConfig::default().with_seed(42)).expect("demo builds"),
        };
        let exchange = game.execute("enter emporium");
        assert!(matches!(
            exchange.response,
            Response::Events(ref events) if matches!(events.last(), Some(GameEvent::EnteredArea { area, .. }) if area == "Emporium")
        ));
        assert_eq!(game.get_turn(), 1);
        assert_eq!(game.inventory().money, 50.0);
        let snapshot = game.get_state_snapshot();
        assert_eq!(snapshot.areas.len(), 7);
        assert_eq!(snapshot.turn, 1);
    }
}
