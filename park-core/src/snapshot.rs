// ============================================================================
// Serializable world snapshot for JS
// ============================================================================

use serde::Serialize;
use tsify_next::Tsify;

use crate::area::AreaKind;
use crate::coordinates::{Cell, Coordinate};
use crate::types::{KeyToU64, Money};
use crate::world::World;

#[derive(Debug, Clone, Serialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct WorldSnapshot {
    pub turn: u64,
    pub areas: Vec<AreaSnapshot>,
    pub npcs: Vec<NpcSnapshot>,
    pub player: PlayerSnapshot,
}

#[derive(Debug, Clone, Serialize, Tsify)]
pub struct AreaSnapshot {
    pub id: u64,
    pub slug: String,
    pub name: String,
    pub kind: AreaKind,
    pub origin: Coordinate,
    pub width: i32,
    pub length: i32,
    pub parent: Option<u64>,
    pub items: Vec<ItemSnapshot>,
}

#[derive(Debug, Clone, Serialize, Tsify)]
pub struct ItemSnapshot {
    pub id: u64,
    pub name: String,
    pub cell: Cell,
}

#[derive(Debug, Clone, Serialize, Tsify)]
pub struct NpcSnapshot {
    pub id: u64,
    pub name: String,
    pub area: Option<u64>,
    pub cell: Option<Cell>,
}

#[derive(Debug, Clone, Serialize, Tsify)]
pub struct PlayerSnapshot {
    pub area: Option<u64>,
    pub cell: Option<Cell>,
    pub money: Money,
    pub suspicion: f64,
    pub inventory: Vec<String>,
}

impl World {
    pub fn snapshot(&self) -> WorldSnapshot {
        let areas = self
            .areas
            .iter()
            .map(|area| AreaSnapshot {
                id: area.key.to_u64(),
                slug: area.id.clone(),
                name: area.name.clone(),
                kind: area.kind,
                origin: area.origin,
                width: area.width,
                length: area.length,
                parent: area.parent.map(KeyToU64::to_u64),
                items: area
                    .items
                    .iter()
                    .filter_map(|id| self.items.get(*id))
                    .filter_map(|item| {
                        Some(ItemSnapshot {
                            id: item.id.to_u64(),
                            name: item.name.clone(),
                            cell: area.to_local(item.coordinates?),
                        })
                    })
                    .collect(),
            })
            .collect();

        let npcs = self
            .npcs
            .iter()
            .map(|(id, npc)| NpcSnapshot {
                id: id.to_u64(),
                name: npc.name.clone(),
                area: npc.location.map(KeyToU64::to_u64),
                cell: npc.cell(&self.areas),
            })
            .collect();

        let player = PlayerSnapshot {
            area: self.player.current_area.map(KeyToU64::to_u64),
            cell: self.player_cell(),
            money: self.player.money,
            suspicion: self.player.suspicion_rating,
            inventory: self
                .player
                .inventory
                .iter()
                .filter_map(|id| self.items.name_of(*id))
                .map(str::to_string)
                .collect(),
        };

        WorldSnapshot {
            turn: self.turn,
            areas,
            npcs,
            player,
        }
    }
}
