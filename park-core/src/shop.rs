//! Shop stock and transaction resolution.
//!
//! A regular shop keeps a ledger of what it sells and what it is willing to
//! buy back. A fence keeps nothing: it prices whatever stolen goods the
//! seller is carrying at a fixed cut of their value.

use std::collections::BTreeMap;

use serde::Serialize;
use tsify_next::Tsify;

use crate::error::TransactionError;
use crate::item::{Item, ItemFactory, ItemPrototype};
use crate::types::{ItemId, Money, round_price};

pub const DEFAULT_FENCE_CUT: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Tsify)]
#[serde(tag = "kind", content = "count", rename_all = "snake_case")]
pub enum Stock {
    Unlimited,
    Finite(u32),
}

impl Stock {
    pub fn is_available(&self) -> bool {
        match self {
            Stock::Unlimited => true,
            Stock::Finite(n) => *n > 0,
        }
    }

    /// Never drops below zero; unlimited stock is untouched.
    fn take_one(&mut self) {
        if let Stock::Finite(n) = self {
            *n = n.saturating_sub(1);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SellEntry {
    pub prototype: ItemPrototype,
    pub price: Money,
    pub stock: Stock,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuyEntry {
    pub name: String,
    pub buy_price: Money,
    pub desired_stock: u32,
    pub current_stock: u32,
}

impl BuyEntry {
    pub fn wanted(&self) -> u32 {
        self.desired_stock.saturating_sub(self.current_stock)
    }
}

/// A completed ledger sale. The caller debits the buyer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sale {
    pub item: ItemId,
    pub price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tsify)]
pub struct SellListing {
    pub name: String,
    pub price: Money,
    pub stock: Stock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tsify)]
pub struct BuyListing {
    pub name: String,
    pub price: Money,
    pub wanted: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShopLedger {
    sell_stock: BTreeMap<String, SellEntry>,
    buy_stock: BTreeMap<String, BuyEntry>,
}

impl ShopLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sell_stock(&mut self, prototype: ItemPrototype, price: Money, stock: Stock) {
        self.sell_stock.insert(
            prototype.key(),
            SellEntry {
                prototype,
                price,
                stock,
            },
        );
    }

    pub fn add_buy_stock(&mut self, name: impl Into<String>, buy_price: Money, desired_stock: u32) {
        let name = name.into();
        self.buy_stock.insert(
            name.to_lowercase(),
            BuyEntry {
                name,
                buy_price,
                desired_stock,
                current_stock: 0,
            },
        );
    }

    pub fn sell_entry(&self, key: &str) -> Option<&SellEntry> {
        self.sell_stock.get(&normalize(key))
    }

    pub fn price_of(&self, key: &str) -> Option<Money> {
        self.sell_entry(key).map(|e| e.price)
    }

    /// Sell one unit to a buyer holding `buyer_funds`.
    ///
    /// The instance is created before stock is touched, so a failed creation
    /// leaves the ledger as it was.
    pub fn sell(
        &mut self,
        key: &str,
        buyer_funds: Money,
        factory: &mut impl ItemFactory,
    ) -> Result<Sale, TransactionError> {
        let entry = self
            .sell_stock
            .get_mut(&normalize(key))
            .ok_or(TransactionError::NotFound)?;
        if !entry.stock.is_available() {
            return Err(TransactionError::OutOfStock);
        }
        if buyer_funds < entry.price {
            return Err(TransactionError::CannotAfford { price: entry.price });
        }
        let item = factory
            .create_instance(&entry.prototype.name)
            .ok_or_else(|| TransactionError::CreationFailed {
                name: entry.prototype.name.clone(),
            })?;
        entry.stock.take_one();

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "sale",
            item = entry.prototype.name.as_str(),
            price = entry.price,
            remaining = match entry.stock {
                Stock::Unlimited => -1_i64,
                Stock::Finite(n) => i64::from(n),
            },
        );

        Ok(Sale {
            item,
            price: entry.price,
        })
    }

    /// The buy-back entry for `key`, if the shop still wants more of it.
    pub fn buy(&self, key: &str) -> Option<&BuyEntry> {
        self.buy_stock
            .get(&normalize(key))
            .filter(|entry| entry.current_stock < entry.desired_stock)
    }

    /// Whether the shop solicits `key` at all, full or not.
    pub fn solicits(&self, key: &str) -> bool {
        self.buy_stock.contains_key(&normalize(key))
    }

    /// Count a unit the shop has paid for.
    pub fn record_purchase(&mut self, key: &str) {
        if let Some(entry) = self.buy_stock.get_mut(&normalize(key)) {
            entry.current_stock += 1;
        }
    }

    pub fn sell_listing(&self) -> Vec<SellListing> {
        self.sell_stock
            .values()
            .map(|e| SellListing {
                name: e.prototype.name.clone(),
                price: e.price,
                stock: e.stock,
            })
            .collect()
    }

    pub fn buy_listing(&self) -> Vec<BuyListing> {
        self.buy_stock
            .values()
            .filter(|e| e.wanted() > 0)
            .map(|e| BuyListing {
                name: e.name.clone(),
                price: e.buy_price,
                wanted: e.wanted(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fence {
    pub cut: f64,
}

impl Default for Fence {
    fn default() -> Self {
        Self {
            cut: DEFAULT_FENCE_CUT,
        }
    }
}

impl Fence {
    pub fn new(cut: f64) -> Self {
        Self { cut }
    }

    pub fn fence_price(&self, value: Money) -> Money {
        round_price(value * self.cut)
    }

    /// What the fence would pay for each stolen item the seller holds.
    pub fn buy_listing<'a>(&self, held: impl IntoIterator<Item = &'a Item>) -> Vec<BuyListing> {
        held.into_iter()
            .filter(|item| item.is_unpaid)
            .map(|item| BuyListing {
                name: item.name.clone(),
                price: self.fence_price(item.value),
                wanted: 1,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shop {
    Regular(ShopLedger),
    Fence(Fence),
}

impl Shop {
    pub fn ledger(&self) -> Option<&ShopLedger> {
        match self {
            Shop::Regular(ledger) => Some(ledger),
            Shop::Fence(_) => None,
        }
    }

    pub fn ledger_mut(&mut self) -> Option<&mut ShopLedger> {
        match self {
            Shop::Regular(ledger) => Some(ledger),
            Shop::Fence(_) => None,
        }
    }

    pub fn fence(&self) -> Option<&Fence> {
        match self {
            Shop::Fence(fence) => Some(fence),
            Shop::Regular(_) => None,
        }
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemCatalog;

    fn churro() -> ItemPrototype {
        ItemPrototype::new("Churro", "Cinnamon sugar stick", 5.0)
    }

    fn catalog() -> ItemCatalog {
        let mut catalog = ItemCatalog::new();
        catalog.add_prototype(churro());
        catalog
    }

    #[test]
    fn cannot_afford_reports_price_and_creates_nothing() {
        let mut catalog = catalog();
        let mut ledger = ShopLedger::new();
        ledger.add_sell_stock(churro(), 5.0, Stock::Unlimited);

        let result = ledger.sell("Churro", 4.0, &mut catalog);
        assert_eq!(result, Err(TransactionError::CannotAfford { price: 5.0 }));
        assert!(catalog.is_empty(), "no instance should exist after a refused sale");
    }

    #[test]
    fn finite_stock_never_goes_negative() {
        let mut catalog = catalog();
        let mut ledger = ShopLedger::new();
        ledger.add_sell_stock(churro(), 5.0, Stock::Finite(1));

        assert!(ledger.sell("churro", 100.0, &mut catalog).is_ok());
        assert_eq!(
            ledger.sell("churro", 100.0, &mut catalog),
            Err(TransactionError::OutOfStock)
        );
        assert_eq!(
            ledger.sell_entry("churro").map(|e| e.stock),
            Some(Stock::Finite(0))
        );
    }

    #[test]
    fn unlimited_stock_is_never_decremented() {
        let mut catalog = catalog();
        let mut ledger = ShopLedger::new();
        ledger.add_sell_stock(churro(), 5.0, Stock::Unlimited);
        for _ in 0..3 {
            let sale = ledger.sell("Churro", 5.0, &mut catalog).expect("in stock");
            assert_eq!(sale.price, 5.0);
        }
        assert_eq!(ledger.sell_entry("churro").map(|e| e.stock), Some(Stock::Unlimited));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn unknown_key_is_not_found() {
        let mut catalog = catalog();
        let mut ledger = ShopLedger::new();
        assert_eq!(
            ledger.sell("Popcorn", 50.0, &mut catalog),
            Err(TransactionError::NotFound)
        );
    }

    #[test]
    fn failed_creation_keeps_stock() {
        // The ledger knows the prototype, the catalog does not.
        let mut empty = ItemCatalog::new();
        let mut ledger = ShopLedger::new();
        ledger.add_sell_stock(churro(), 5.0, Stock::Finite(2));

        let result = ledger.sell("churro", 10.0, &mut empty);
        assert!(matches!(result, Err(TransactionError::CreationFailed { .. })));
        assert_eq!(
            ledger.sell_entry("churro").map(|e| e.stock),
            Some(Stock::Finite(2))
        );
    }

    #[test]
    fn buy_closes_when_desired_stock_reached() {
        let mut ledger = ShopLedger::new();
        ledger.add_buy_stock("Mouse Ears", 4.0, 2);

        assert_eq!(ledger.buy("mouse ears").map(|e| e.buy_price), Some(4.0));
        ledger.record_purchase("mouse ears");
        assert_eq!(ledger.buy_listing()[0].wanted, 1);
        ledger.record_purchase("mouse ears");
        assert!(ledger.buy("mouse ears").is_none());
        assert!(ledger.solicits("mouse ears"));
        assert!(ledger.buy_listing().is_empty());
        assert!(ledger.buy("churro").is_none());
    }

    #[test]
    fn fence_price_uses_cut() {
        let fence = Fence::new(0.25);
        assert_eq!(fence.fence_price(20.0), 5.0);
        // 0.25 * 10 = 2.5 rounds half to even
        assert_eq!(fence.fence_price(10.0), 2.0);
    }

    #[test]
    fn fence_listing_covers_only_unpaid_held_items() {
        let mut catalog = catalog();
        let stolen = catalog.create_instance("Churro").expect("prototype");
        let bought = catalog.create_instance("Churro").expect("prototype");
        if let Some(item) = catalog.get_mut(stolen) {
            item.mark_unpaid("shop_emporium");
        }
        let held = [stolen, bought]
            .into_iter()
            .filter_map(|id| catalog.get(id));

        let listing = Fence::default().buy_listing(held);
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].price, 1.0);
    }
}
