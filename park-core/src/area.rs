//! Grid-addressed locations.
//!
//! An `Area` owns the bookkeeping for whatever is placed on its grid: the
//! per-cell occupant lists, the `items`/`npcs` membership lists, and the
//! global coordinate written back to each occupant. Links to other areas
//! (connections, portals, parent, children) are registry keys.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tsify_next::Tsify;

use crate::coordinates::{Cell, Coordinate};
use crate::error::PlacementError;
use crate::placement::{Occupant, Placeable};
use crate::ride::Ride;
use crate::shop::{Fence, Shop, ShopLedger};
use crate::types::{AreaKey, ItemId, NpcId, slug};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Tsify)]
#[serde(rename_all = "snake_case")]
pub enum AreaKind {
    Area,
    Land,
    Ride,
    Shop,
    Fence,
}

impl AreaKind {
    pub fn prefix(self) -> &'static str {
        match self {
            AreaKind::Area => "area_",
            AreaKind::Land => "land_",
            AreaKind::Ride => "ride_",
            AreaKind::Shop => "shop_",
            AreaKind::Fence => "fenceshop_",
        }
    }

    /// Grid size (width, length) used when none is given.
    pub fn default_size(self) -> (i32, i32) {
        match self {
            AreaKind::Area => (10, 10),
            AreaKind::Land => (20, 20),
            AreaKind::Ride => (5, 10),
            AreaKind::Shop => (5, 5),
            AreaKind::Fence => (3, 3),
        }
    }
}

/// A cell that moves whoever steps on it into another area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Portal {
    pub target: AreaKey,
    /// Defaults to the target's center.
    pub target_cell: Option<Cell>,
}

#[derive(Debug, Clone)]
pub struct Area {
    /// Assigned by the registry.
    pub key: AreaKey,
    pub id: String,
    pub kind: AreaKind,
    pub name: String,
    pub description: String,
    pub origin: Coordinate,
    pub width: i32,
    pub length: i32,
    pub connections: BTreeMap<String, AreaKey>,
    pub portals: HashMap<Cell, Portal>,
    grid: HashMap<Cell, Vec<Occupant>>,
    pub items: Vec<ItemId>,
    pub npcs: Vec<NpcId>,
    pub parent: Option<AreaKey>,
    pub children: Vec<AreaKey>,
    pub shop: Option<Shop>,
    pub ride: Option<Ride>,
    pub is_shelter: bool,
}

impl Area {
    fn with_kind(kind: AreaKind, name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        let (width, length) = kind.default_size();
        Self {
            key: AreaKey::default(),
            id: format!("{}{}", kind.prefix(), slug(&name)),
            kind,
            name,
            description: description.into(),
            origin: Coordinate::default(),
            width,
            length,
            connections: BTreeMap::new(),
            portals: HashMap::new(),
            grid: HashMap::new(),
            items: Vec::new(),
            npcs: Vec::new(),
            parent: None,
            children: Vec::new(),
            shop: None,
            ride: None,
            is_shelter: false,
        }
    }

    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_kind(AreaKind::Area, name, description)
    }

    pub fn land(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_kind(AreaKind::Land, name, description)
    }

    pub fn ride(name: impl Into<String>, description: impl Into<String>, ride: Ride) -> Self {
        let mut area = Self::with_kind(AreaKind::Ride, name, description);
        area.ride = Some(ride);
        area
    }

    pub fn shop(name: impl Into<String>, description: impl Into<String>) -> Self {
        let mut area = Self::with_kind(AreaKind::Shop, name, description);
        area.shop = Some(Shop::Regular(ShopLedger::new()));
        area
    }

    pub fn fence(name: impl Into<String>, description: impl Into<String>, cut: f64) -> Self {
        let mut area = Self::with_kind(AreaKind::Fence, name, description);
        area.shop = Some(Shop::Fence(Fence::new(cut)));
        area
    }

    // === Builders ===

    pub fn with_size(mut self, width: i32, length: i32) -> Self {
        self.width = width.max(1);
        self.length = length.max(1);
        self
    }

    pub fn with_origin(mut self, origin: Coordinate) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_shelter(mut self) -> Self {
        self.is_shelter = true;
        self
    }

    pub fn with_ledger(mut self, ledger: ShopLedger) -> Self {
        self.shop = Some(Shop::Regular(ledger));
        self
    }

    // === Grid geometry ===

    pub fn is_valid_cell(&self, cell: Cell) -> bool {
        (0..self.width).contains(&cell.x) && (0..self.length).contains(&cell.y)
    }

    pub fn to_global(&self, cell: Cell) -> Coordinate {
        self.origin + cell
    }

    /// May be out of bounds.
    pub fn to_local(&self, coordinates: Coordinate) -> Cell {
        coordinates - self.origin
    }

    /// A degenerate (zero-sized) area clamps everything to the origin cell.
    pub fn clamp_cell(&self, cell: Cell) -> Cell {
        Cell::new(
            cell.x.clamp(0, (self.width - 1).max(0)),
            cell.y.clamp(0, (self.length - 1).max(0)),
        )
    }

    pub fn default_cell(&self) -> Cell {
        self.clamp_cell(Cell::new(self.width / 2, self.length / 2))
    }

    // === Occupants ===

    /// Put `entity` at `cell`, writing back its global coordinate.
    ///
    /// An occupant already elsewhere on this grid is moved, never duplicated.
    pub fn place<P: Placeable + ?Sized>(
        &mut self,
        entity: &mut P,
        cell: Cell,
    ) -> Result<(), PlacementError> {
        if !self.is_valid_cell(cell) {
            #[cfg(feature = "instrument")]
            tracing::warn!(
                target: "placement",
                area = self.id.as_str(),
                occupant = entity.name(),
                x = cell.x,
                y = cell.y,
            );
            return Err(PlacementError::OutOfBounds {
                area: self.name.clone(),
                cell,
            });
        }

        let occupant = entity.occupant();
        if let Some(previous) = self.locate(occupant).filter(|c| *c != cell) {
            self.remove_from_cell(occupant, previous);
        }

        entity.set_coordinates(self.to_global(cell));
        let slot = self.grid.entry(cell).or_default();
        if !slot.contains(&occupant) {
            slot.push(occupant);
        }
        match occupant {
            Occupant::Item(id) => {
                if !self.items.contains(&id) {
                    self.items.push(id);
                }
            }
            Occupant::Npc(id) => {
                if !self.npcs.contains(&id) {
                    self.npcs.push(id);
                }
                entity.set_location(self.key);
            }
        }
        Ok(())
    }

    /// Take `occupant` off `cell` and out of this area. The occupant keeps
    /// its stale coordinate until the caller places it again.
    pub fn remove(&mut self, occupant: Occupant, cell: Cell) {
        self.remove_from_cell(occupant, cell);
        match occupant {
            Occupant::Item(id) => self.items.retain(|i| *i != id),
            Occupant::Npc(id) => self.npcs.retain(|n| *n != id),
        }
    }

    fn remove_from_cell(&mut self, occupant: Occupant, cell: Cell) {
        if let Some(slot) = self.grid.get_mut(&cell) {
            slot.retain(|o| *o != occupant);
            if slot.is_empty() {
                self.grid.remove(&cell);
            }
        }
    }

    pub fn objects_at(&self, cell: Cell) -> &[Occupant] {
        self.grid.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The cell holding `occupant`, if it is on this grid.
    pub fn locate(&self, occupant: Occupant) -> Option<Cell> {
        self.grid
            .iter()
            .find(|(_, slot)| slot.contains(&occupant))
            .map(|(cell, _)| *cell)
    }

    /// Number of non-empty cells.
    pub fn occupied_cells(&self) -> usize {
        self.grid.len()
    }

    // === Links ===

    /// Directed link only. Reciprocal links are wired by the registry.
    pub fn add_connection(&mut self, label: &str, target: AreaKey) {
        self.connections.insert(label.trim().to_lowercase(), target);
    }

    pub fn connection(&self, label: &str) -> Option<AreaKey> {
        self.connections.get(&label.trim().to_lowercase()).copied()
    }

    pub fn add_portal(
        &mut self,
        cell: Cell,
        target: AreaKey,
        target_cell: Option<Cell>,
    ) -> Result<(), PlacementError> {
        if !self.is_valid_cell(cell) {
            #[cfg(feature = "instrument")]
            tracing::warn!(target: "placement", area = self.id.as_str(), portal_x = cell.x, portal_y = cell.y);
            return Err(PlacementError::OutOfBounds {
                area: self.name.clone(),
                cell,
            });
        }
        self.portals.insert(
            cell,
            Portal {
                target,
                target_cell,
            },
        );
        Ok(())
    }

    pub fn portal_at(&self, cell: Cell) -> Option<Portal> {
        self.portals.get(&cell).copied()
    }

    // === Shop ===

    pub fn is_shop(&self) -> bool {
        self.shop.is_some()
    }

    pub fn ledger(&self) -> Option<&ShopLedger> {
        self.shop.as_ref().and_then(Shop::ledger)
    }

    pub fn ledger_mut(&mut self) -> Option<&mut ShopLedger> {
        self.shop.as_mut().and_then(Shop::ledger_mut)
    }

    pub fn fence_terms(&self) -> Option<&Fence> {
        self.shop.as_ref().and_then(Shop::fence)
    }
}
