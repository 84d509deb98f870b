use serde::Serialize;
use tsify_next::Tsify;

use crate::events::GameEvent;
use crate::world::World;

/// Everything that happened while the world advanced one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct TurnReport {
    pub turn: u64,
    pub events: Vec<GameEvent>,
}

impl World {
    /// Advance the world by one turn.
    ///
    /// Every NPC acts once, then the player's suspicion decays. Player
    /// actions are resolved before this is called.
    pub fn advance_turn(&mut self) -> TurnReport {
        // 1. Clock
        self.turn += 1;
        let player = self.player.view();

        // 2. NPC autonomy
        let (npcs, areas, rules, rng) = self.npc_pass();
        let mut events = npcs.update_all(areas, player, rules, rng);

        // 3. Passive suspicion decay
        #[cfg(feature = "instrument")]
        let before = self.player.suspicion_rating;
        events.extend(self.relieve_suspicion(self.rules.suspicion_decay));

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "turn",
            turn = self.turn,
            npc_events = events.iter().filter(|e| e.is_npc_event()).count(),
            suspicion_before = before,
            suspicion_after = self.player.suspicion_rating,
        );

        TurnReport {
            turn: self.turn,
            events,
        }
    }
}
