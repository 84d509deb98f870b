use crate::coordinates::Coordinate;
use crate::item::ItemCatalog;
use crate::npc::PlayerView;
use crate::types::{AreaKey, ItemId, Money};

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub name: String,
    /// Held items, in pick-up order.
    pub inventory: Vec<ItemId>,
    pub current_area: Option<AreaKey>,
    pub coordinates: Coordinate,
    pub money: Money,
    pub suspicion_rating: f64,
}

impl Player {
    pub fn new(name: impl Into<String>, money: Money) -> Self {
        Self {
            name: name.into(),
            inventory: Vec::new(),
            current_area: None,
            coordinates: Coordinate::default(),
            money,
            suspicion_rating: 0.0,
        }
    }

    pub fn view(&self) -> Option<PlayerView> {
        self.current_area.map(|area| PlayerView {
            area,
            coordinates: self.coordinates,
        })
    }

    pub fn raise_suspicion(&mut self, amount: f64) {
        self.suspicion_rating += amount.max(0.0);
    }

    /// Lower suspicion, never below zero. Returns how much actually came off.
    pub fn reduce_suspicion(&mut self, amount: f64) -> f64 {
        let before = self.suspicion_rating;
        self.suspicion_rating = (before - amount).max(0.0);
        before - self.suspicion_rating
    }

    pub fn holds(&self, id: ItemId) -> bool {
        self.inventory.contains(&id)
    }

    /// First held item whose name matches `query`, case-insensitively.
    pub fn find_held(&self, items: &ItemCatalog, query: &str) -> Option<ItemId> {
        self.inventory
            .iter()
            .copied()
            .find(|id| items.get(*id).is_some_and(|item| item.matches(query)))
    }

    /// Held items still unpaid for at `shop_id`.
    pub fn unpaid_from(&self, items: &ItemCatalog, shop_id: &str) -> Vec<ItemId> {
        self.inventory
            .iter()
            .copied()
            .filter(|id| items.get(*id).is_some_and(|item| item.is_unpaid_from(shop_id)))
            .collect()
    }

    pub fn take(&mut self, id: ItemId) {
        if !self.holds(id) {
            self.inventory.push(id);
        }
    }

    pub fn release(&mut self, id: ItemId) -> bool {
        let before = self.inventory.len();
        self.inventory.retain(|held| *held != id);
        self.inventory.len() != before
    }
}
