//! Shared contract for anything that can sit on an area's grid.

use crate::coordinates::Coordinate;
use crate::types::{AreaKey, ItemId, NpcId};

/// A grid entry. The kind travels with the key so no lookup is needed to
/// tell items from people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occupant {
    Item(ItemId),
    Npc(NpcId),
}

impl Occupant {
    pub fn item(self) -> Option<ItemId> {
        match self {
            Occupant::Item(id) => Some(id),
            Occupant::Npc(_) => None,
        }
    }

    pub fn npc(self) -> Option<NpcId> {
        match self {
            Occupant::Npc(id) => Some(id),
            Occupant::Item(_) => None,
        }
    }
}

pub trait Placeable {
    fn occupant(&self) -> Occupant;

    fn name(&self) -> &str;

    /// Record the global position the area assigned.
    fn set_coordinates(&mut self, coordinates: Coordinate);

    /// Only occupants that track their own area override this.
    fn set_location(&mut self, _area: AreaKey) {}
}
