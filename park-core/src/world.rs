// World state for the park simulation

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::area::Area;
use crate::config::RulesConfig;
use crate::coordinates::Cell;
use crate::error::{ResolutionError, WorldError};
use crate::events::GameEvent;
use crate::item::{ItemCatalog, ItemFactory};
use crate::npc::{Npc, NpcRoster};
use crate::placement::Occupant;
use crate::player::Player;
use crate::registry::AreaRegistry;
use crate::types::{AreaKey, ItemId, NpcId};

/// Complete state of one game session
#[derive(Debug, Clone)]
pub struct World {
    pub turn: u64,

    pub areas: AreaRegistry,
    pub items: ItemCatalog,
    pub npcs: NpcRoster,
    pub player: Player,

    pub rules: RulesConfig,
    rng: StdRng,
}

impl Default for World {
    fn default() -> Self {
        Self::new(RulesConfig::default())
    }
}

impl World {
    pub fn new(rules: RulesConfig) -> Self {
        let rng = match rules.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            turn: 0,
            areas: AreaRegistry::new(),
            items: ItemCatalog::new(),
            npcs: NpcRoster::new(),
            player: Player::new("Player", rules.starting_money),
            rules,
            rng,
        }
    }

    /// Deterministic world with default rules.
    pub fn seeded(seed: u64) -> Self {
        Self::new(RulesConfig::default().with_seed(seed))
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Disjoint borrows for the NPC pass of a turn.
    pub(crate) fn npc_pass(&mut self) -> (&mut NpcRoster, &mut AreaRegistry, &RulesConfig, &mut StdRng) {
        (&mut self.npcs, &mut self.areas, &self.rules, &mut self.rng)
    }

    // === Area Management ===

    pub fn add_area(&mut self, area: Area) -> AreaKey {
        self.areas.add(area)
    }

    /// Register `area` nested under `parent`.
    pub fn add_sub_area(&mut self, parent: AreaKey, area: Area) -> Result<AreaKey, WorldError> {
        if self.areas.get(parent).is_none() {
            return Err(ResolutionError::UnknownArea(format!("{parent:?}")).into());
        }
        let key = self.areas.add(area);
        self.areas.add_sub_area(parent, key)?;
        Ok(key)
    }

    pub fn area(&self, key: AreaKey) -> Option<&Area> {
        self.areas.get(key)
    }

    pub fn area_mut(&mut self, key: AreaKey) -> Option<&mut Area> {
        self.areas.get_mut(key)
    }

    pub fn player_area(&self) -> Option<&Area> {
        self.player.current_area.and_then(|k| self.areas.get(k))
    }

    pub fn player_cell(&self) -> Option<Cell> {
        self.player_area()
            .map(|area| area.to_local(self.player.coordinates))
    }

    // === NPC Management ===

    /// Register `npc` and place it in `area` (center if `cell` is `None`).
    pub fn add_npc(
        &mut self,
        npc: Npc,
        area: AreaKey,
        cell: Option<Cell>,
    ) -> Result<NpcId, WorldError> {
        if self.areas.get(area).is_none() {
            return Err(ResolutionError::UnknownArea(format!("{area:?}")).into());
        }
        let id = self.npcs.add(npc);
        if let Some(npc) = self.npcs.get_mut(id) {
            npc.set_location(&mut self.areas, area, cell)?;
        }
        Ok(id)
    }

    /// Staff member with randomly drawn alertness.
    pub fn add_staff(
        &mut self,
        name: &str,
        description: &str,
        role: &str,
        area: AreaKey,
        cell: Option<Cell>,
    ) -> Result<NpcId, WorldError> {
        let npc = Npc::staff(name, description, role, &mut self.rng);
        self.add_npc(npc, area, cell)
    }

    pub fn npc(&self, id: NpcId) -> Option<&Npc> {
        self.npcs.get(id)
    }

    /// Relocate an NPC, possibly into another area.
    pub fn move_npc(&mut self, id: NpcId, area: AreaKey, cell: Option<Cell>) -> Result<(), WorldError> {
        let npc = self
            .npcs
            .get_mut(id)
            .ok_or_else(|| ResolutionError::UnknownNpc(format!("{id:?}")))?;
        npc.set_location(&mut self.areas, area, cell)
    }

    // === Item Management ===

    /// Create an item from its prototype and lay it on the ground.
    pub fn spawn_item(&mut self, name: &str, area: AreaKey, cell: Cell) -> Result<ItemId, WorldError> {
        let target = self
            .areas
            .get_mut(area)
            .ok_or_else(|| ResolutionError::UnknownArea(format!("{area:?}")))?;
        let id = self
            .items
            .create_instance(name)
            .ok_or_else(|| ResolutionError::UnknownItem(name.to_string()))?;
        let placed = match self.items.get_mut(id) {
            Some(item) => target.place(item, cell),
            None => return Err(ResolutionError::UnknownItem(name.to_string()).into()),
        };
        if let Err(err) = placed {
            self.items.despawn(id);
            return Err(err.into());
        }
        Ok(id)
    }

    /// Lift an item off the ground in its area; the item keeps no position.
    pub(crate) fn lift_item(&mut self, area: AreaKey, id: ItemId) {
        let Some(item) = self.items.get_mut(id) else {
            return;
        };
        if let (Some(area), Some(at)) = (self.areas.get_mut(area), item.coordinates) {
            let cell = area.to_local(at);
            area.remove(Occupant::Item(id), cell);
        }
        item.coordinates = None;
    }

    // === Suspicion ===

    /// Apply passive or activity relief, reporting only a real change.
    pub fn relieve_suspicion(&mut self, amount: f64) -> Option<GameEvent> {
        let reduced = self.player.reduce_suspicion(amount);
        (reduced > 0.0).then_some(GameEvent::SuspicionDecreased { amount: reduced })
    }
}
