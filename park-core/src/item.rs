//! Items, their prototypes, and the catalog that owns every live instance.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::coordinates::Coordinate;
use crate::placement::{Occupant, Placeable};
use crate::types::{ItemId, Money, round_price};

pub const DEFAULT_SELL_MODIFIER: f64 = 0.5;

/// Canonical attributes an instance is cloned from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPrototype {
    pub name: String,
    pub description: String,
    pub value: Money,
    pub pickupable: bool,
    pub sell_modifier: f64,
}

impl ItemPrototype {
    pub fn new(name: impl Into<String>, description: impl Into<String>, value: Money) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            value,
            pickupable: true,
            sell_modifier: DEFAULT_SELL_MODIFIER,
        }
    }

    pub fn fixed(mut self) -> Self {
        self.pickupable = false;
        self
    }

    pub fn with_sell_modifier(mut self, modifier: f64) -> Self {
        self.sell_modifier = modifier;
        self
    }

    /// Lookup key: names are matched case-insensitively.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub value: Money,
    pub buy_back_price: Money,
    pub pickupable: bool,
    /// Set while the item lies in an area, cleared while held.
    pub coordinates: Option<Coordinate>,
    pub is_unpaid: bool,
    /// Id of the shop area the item was taken from.
    pub unpaid_from_shop: Option<String>,
}

impl Item {
    fn from_prototype(id: ItemId, proto: &ItemPrototype) -> Self {
        Self {
            id,
            name: proto.name.clone(),
            description: proto.description.clone(),
            value: proto.value,
            buy_back_price: round_price(proto.value * proto.sell_modifier),
            pickupable: proto.pickupable,
            coordinates: None,
            is_unpaid: false,
            unpaid_from_shop: None,
        }
    }

    pub fn mark_unpaid(&mut self, shop_id: &str) {
        self.is_unpaid = true;
        self.unpaid_from_shop = Some(shop_id.to_string());
    }

    /// Clears the theft flag, by payment or by laundering through a fence.
    pub fn mark_paid(&mut self) {
        self.is_unpaid = false;
        self.unpaid_from_shop = None;
    }

    pub fn is_unpaid_from(&self, shop_id: &str) -> bool {
        self.is_unpaid && self.unpaid_from_shop.as_deref() == Some(shop_id)
    }

    pub fn matches(&self, query: &str) -> bool {
        self.name.eq_ignore_ascii_case(query.trim())
    }
}

impl Placeable for Item {
    fn occupant(&self) -> Occupant {
        Occupant::Item(self.id)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_coordinates(&mut self, coordinates: Coordinate) {
        self.coordinates = Some(coordinates);
    }
}

/// Instantiates items by prototype name.
pub trait ItemFactory {
    fn prototype(&self, name: &str) -> Option<&ItemPrototype>;

    /// A fresh instance with its own identity, or `None` for unknown names.
    fn create_instance(&mut self, name: &str) -> Option<ItemId>;
}

/// Owns prototypes and every item instance alive in the world.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    prototypes: BTreeMap<String, ItemPrototype>,
    items: SlotMap<ItemId, Item>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_prototype(&mut self, proto: ItemPrototype) {
        self.prototypes.insert(proto.key(), proto);
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(id)
    }

    pub fn name_of(&self, id: ItemId) -> Option<&str> {
        self.items.get(id).map(|i| i.name.as_str())
    }

    /// Remove an instance from the world for good (sold, confiscated).
    pub fn despawn(&mut self, id: ItemId) -> Option<Item> {
        self.items.remove(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &Item)> {
        self.items.iter()
    }
}

impl ItemFactory for ItemCatalog {
    fn prototype(&self, name: &str) -> Option<&ItemPrototype> {
        self.prototypes.get(&name.trim().to_lowercase())
    }

    fn create_instance(&mut self, name: &str) -> Option<ItemId> {
        let proto = self.prototypes.get(&name.trim().to_lowercase())?;
        Some(
            self.items
                .insert_with_key(|id| Item::from_prototype(id, proto)),
        )
    }
}
