//! Player inventory and shop trading.
//!
//! Taking an item off a shop shelf never touches the ledger: the instance is
//! minted from the prototype and flagged unpaid, and sell stock stays as it
//! was. Paying for it later does not decrement stock either.

use std::fmt;

use serde::Serialize;
use tsify_next::Tsify;

use crate::error::TransactionError;
use crate::events::GameEvent;
use crate::item::ItemFactory;
use crate::types::{AreaKey, ItemId, Money};
use crate::world::World;

/// What the player is carrying, for the `inventory` command.
#[derive(Debug, Clone, PartialEq, Serialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct InventoryReport {
    pub items: Vec<HeldItem>,
    pub money: Money,
    pub suspicion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tsify)]
pub struct HeldItem {
    pub name: String,
    pub value: Money,
    pub unpaid: bool,
}

impl fmt::Display for InventoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            writeln!(f, "Your bag is empty.")?;
        } else {
            writeln!(f, "Your Bag:")?;
            for item in &self.items {
                writeln!(f, "  - {}", item.name)?;
            }
        }
        writeln!(f, "Park Tickets (Money): ${:.2}", self.money)?;
        write!(f, "Suspicion Rating: {}", self.suspicion)
    }
}

impl World {
    pub fn inventory(&self) -> InventoryReport {
        let items = self
            .player
            .inventory
            .iter()
            .filter_map(|id| self.items.get(*id))
            .map(|item| HeldItem {
                name: item.name.clone(),
                value: item.value,
                unpaid: item.is_unpaid,
            })
            .collect();
        InventoryReport {
            items,
            money: self.player.money,
            suspicion: self.player.suspicion_rating,
        }
    }

    /// Pick up a loose item at the player's cell, or take one off a shop shelf.
    pub fn pick_up(&mut self, query: &str) -> Vec<GameEvent> {
        let (Some(key), Some(cell)) = (self.player.current_area, self.player_cell()) else {
            return vec![GameEvent::NotInArea];
        };
        let Some(area) = self.areas.get(key) else {
            return vec![GameEvent::NotInArea];
        };

        let loose = area
            .objects_at(cell)
            .iter()
            .filter_map(|o| o.item())
            .find(|id| self.items.get(*id).is_some_and(|item| item.matches(query)));
        if let Some(id) = loose {
            return self.pick_up_loose(key, id);
        }

        let shelf = area
            .ledger()
            .and_then(|ledger| ledger.sell_entry(query))
            .filter(|entry| entry.stock.is_available())
            .map(|entry| entry.prototype.name.clone());
        match shelf {
            Some(name) => {
                let shop_id = area.id.clone();
                self.take_from_shelf(&shop_id, &name)
            }
            None => vec![GameEvent::NothingToPickUp {
                query: query.trim().to_string(),
            }],
        }
    }

    fn pick_up_loose(&mut self, area: AreaKey, id: ItemId) -> Vec<GameEvent> {
        let Some(item) = self.items.get(id) else {
            return Vec::new();
        };
        let name = item.name.clone();
        if !item.pickupable {
            return vec![GameEvent::CannotPickUp { item: name }];
        }
        let unpaid = item.is_unpaid;
        self.lift_item(area, id);
        self.player.take(id);
        if unpaid {
            vec![GameEvent::TookUnpaid { item: name }]
        } else {
            vec![GameEvent::PickedUp { item: name }]
        }
    }

    fn take_from_shelf(&mut self, shop_id: &str, name: &str) -> Vec<GameEvent> {
        let Some(id) = self.items.create_instance(name) else {
            return vec![GameEvent::CreationFailed {
                item: name.to_string(),
            }];
        };
        if let Some(item) = self.items.get_mut(id) {
            item.mark_unpaid(shop_id);
        }
        self.player.take(id);
        self.player.raise_suspicion(self.rules.take_suspicion);

        #[cfg(feature = "instrument")]
        tracing::info!(target: "theft", shop = shop_id, item = name, taken = true);

        vec![GameEvent::TookUnpaid {
            item: name.to_string(),
        }]
    }

    /// Put a held item down on the player's cell.
    pub fn drop_item(&mut self, query: &str) -> Vec<GameEvent> {
        let Some(id) = self.player.find_held(&self.items, query) else {
            return vec![GameEvent::NotCarrying {
                query: query.trim().to_string(),
            }];
        };
        let (Some(key), Some(cell)) = (self.player.current_area, self.player_cell()) else {
            return vec![GameEvent::NotInArea];
        };
        let (Some(area), Some(item)) = (self.areas.get_mut(key), self.items.get_mut(id)) else {
            return vec![GameEvent::NotInArea];
        };
        if area.place(item, cell).is_err() {
            return vec![GameEvent::Rejected {
                reason: "There is no room to put that down here.".to_string(),
            }];
        }
        let name = item.name.clone();
        self.player.release(id);
        vec![GameEvent::Dropped { item: name }]
    }

    /// Buy from the shop the player is standing in.
    ///
    /// Goods already taken from this shop are settled first; otherwise a fresh
    /// unit is bought off the ledger.
    pub fn buy(&mut self, query: &str) -> Vec<GameEvent> {
        let Some(area) = self.player_area().filter(|a| a.ledger().is_some()) else {
            return vec![GameEvent::NotAShop];
        };
        let key = area.key;
        let shop_id = area.id.clone();

        let taken = self
            .player
            .unpaid_from(&self.items, &shop_id)
            .into_iter()
            .find(|id| self.items.get(*id).is_some_and(|item| item.matches(query)));
        if let Some(id) = taken {
            return self.settle_taken(key, id);
        }

        let funds = self.player.money;
        let sale = match self.areas.get_mut(key).and_then(|a| a.ledger_mut()) {
            Some(ledger) => ledger.sell(query, funds, &mut self.items),
            None => return vec![GameEvent::NotAShop],
        };
        let query = query.trim().to_string();
        let sale = match sale {
            Ok(sale) => sale,
            Err(TransactionError::NotFound) => return vec![GameEvent::NotSold { query }],
            Err(TransactionError::OutOfStock) => return vec![GameEvent::OutOfStock { query }],
            Err(TransactionError::CannotAfford { price }) => {
                return vec![GameEvent::CannotAfford { price }];
            }
            Err(TransactionError::CreationFailed { name }) => {
                return vec![GameEvent::CreationFailed { item: name }];
            }
        };

        self.player.money -= sale.price;
        self.player.take(sale.item);
        let mut events = vec![GameEvent::Bought {
            item: self.items.name_of(sale.item).unwrap_or_default().to_string(),
            price: sale.price,
            money: self.player.money,
        }];
        events.extend(self.relieve_suspicion(self.rules.purchase_relief));
        events
    }

    /// Pay for an item taken earlier from shop `key`.
    fn settle_taken(&mut self, key: AreaKey, id: ItemId) -> Vec<GameEvent> {
        let Some(item) = self.items.get(id) else {
            return Vec::new();
        };
        let name = item.name.clone();
        let price = self
            .areas
            .get(key)
            .and_then(|a| a.ledger())
            .and_then(|ledger| ledger.price_of(&name))
            .unwrap_or(item.value);

        if self.player.money < price {
            return vec![GameEvent::CannotAffordTaken { item: name, price }];
        }
        self.player.money -= price;
        if let Some(item) = self.items.get_mut(id) {
            item.mark_paid();
        }

        #[cfg(feature = "instrument")]
        tracing::info!(target: "sale", item = name.as_str(), price = price, settled = true);

        let mut events = vec![GameEvent::PaidForTaken {
            item: name,
            price,
            money: self.player.money,
        }];
        events.extend(self.relieve_suspicion(self.rules.settle_relief));
        events
    }

    /// Sell a held item to the shop or fence the player is standing in.
    pub fn sell(&mut self, query: &str) -> Vec<GameEvent> {
        let Some(id) = self.player.find_held(&self.items, query) else {
            return vec![GameEvent::NotCarrying {
                query: query.trim().to_string(),
            }];
        };
        let Some(area) = self.player_area() else {
            return vec![GameEvent::NotAShop];
        };
        let key = area.key;
        let fence = area.fence_terms().copied();
        let Some(item) = self.items.get(id) else {
            return Vec::new();
        };
        let name = item.name.clone();
        let (value, unpaid) = (item.value, item.is_unpaid);

        if let Some(fence) = fence {
            if !unpaid {
                return vec![GameEvent::FenceRefused { item: name }];
            }
            return self.fence_item(id, name, fence.fence_price(value));
        }

        let query = query.trim().to_string();
        let offer = match self.areas.get(key).and_then(|a| a.ledger()) {
            None => return vec![GameEvent::NotAShop],
            Some(_) if unpaid => None,
            Some(ledger) if !ledger.solicits(&name) => {
                return vec![GameEvent::NotBuying { query }];
            }
            Some(ledger) => match ledger.buy(&name) {
                Some(entry) => Some(entry.buy_price),
                None => return vec![GameEvent::EnoughStock { query }],
            },
        };
        let Some(price) = offer else {
            self.player.raise_suspicion(self.rules.stolen_sale_suspicion);
            return vec![GameEvent::StolenGoodsRefused { item: name }];
        };

        self.player.release(id);
        self.player.money += price;
        self.items.despawn(id);
        if let Some(ledger) = self.areas.get_mut(key).and_then(|a| a.ledger_mut()) {
            ledger.record_purchase(&name);
        }

        #[cfg(feature = "instrument")]
        tracing::info!(target: "purchase", item = name.as_str(), price = price, fence = false);

        vec![GameEvent::Sold {
            item: name,
            price,
            money: self.player.money,
        }]
    }

    /// The fence pays its cut and the goods leave the world.
    fn fence_item(&mut self, id: ItemId, name: String, price: Money) -> Vec<GameEvent> {
        self.player.release(id);
        self.player.money += price;
        self.items.despawn(id);

        #[cfg(feature = "instrument")]
        tracing::info!(target: "purchase", item = name.as_str(), price = price, fence = true);

        let mut events = vec![GameEvent::Fenced {
            item: name,
            price,
            money: self.player.money,
        }];
        events.extend(self.relieve_suspicion(self.rules.fence_relief));
        events
    }
}
