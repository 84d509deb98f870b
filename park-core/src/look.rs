//! Structured views of the player's surroundings.

use std::fmt;

use serde::Serialize;
use tsify_next::Tsify;

use crate::coordinates::{Cell, Coordinate};
use crate::shop::{BuyListing, SellListing, Stock};
use crate::types::Money;
use crate::world::World;

#[derive(Debug, Clone, PartialEq, Serialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct Surroundings {
    pub area: String,
    /// Top-level land, when it is not the area itself.
    pub land: Option<String>,
    pub description: String,
    pub cell: Cell,
    pub items_here: Vec<ItemSighting>,
    pub people_here: Vec<String>,
    pub other_items: Vec<ItemSighting>,
    /// Closest first.
    pub visible_people: Vec<NpcSighting>,
    pub sub_areas: Vec<String>,
    pub exits: Vec<Exit>,
    pub shop: Option<ShopView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tsify)]
pub struct ItemSighting {
    pub name: String,
    pub description: String,
    pub cell: Cell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tsify)]
pub struct NpcSighting {
    pub name: String,
    pub cell: Cell,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tsify)]
pub struct Exit {
    pub label: String,
    pub area: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tsify)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShopView {
    Regular {
        for_sale: Vec<SellListing>,
        buying: Vec<BuyListing>,
    },
    /// What the fence would pay for the player's stolen goods.
    Fence { offers: Vec<BuyListing> },
}

/// Answer to `whereami`.
#[derive(Debug, Clone, PartialEq, Serialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct Position {
    pub area: String,
    pub cell: Cell,
    pub global: Coordinate,
}

/// One hit of a `where` search.
#[derive(Debug, Clone, PartialEq, Serialize, Tsify)]
pub struct PlaceMatch {
    pub name: String,
    pub origin: Coordinate,
}

impl World {
    /// Everything the player can see from where they stand.
    pub fn look(&self) -> Option<Surroundings> {
        let area = self.player_area()?;
        let cell = area.to_local(self.player.coordinates);
        let land = self
            .areas
            .root_of(area.key)
            .filter(|root| root.key != area.key)
            .map(|root| root.name.clone());

        let here = area.objects_at(cell);
        let (items_here, other_items): (Vec<_>, Vec<_>) = area
            .items
            .iter()
            .filter_map(|id| self.items.get(*id))
            .map(|item| {
                let at = item.coordinates.map(|c| area.to_local(c)).unwrap_or(cell);
                ItemSighting {
                    name: item.name.clone(),
                    description: item.description.clone(),
                    cell: at,
                }
            })
            .partition(|sighting| sighting.cell == cell);

        let people_here = here
            .iter()
            .filter_map(|o| o.npc())
            .filter_map(|id| self.npcs.get(id))
            .map(|npc| npc.name.clone())
            .collect();

        let mut visible_people: Vec<NpcSighting> = area
            .npcs
            .iter()
            .filter_map(|id| self.npcs.get(*id))
            .filter(|npc| !here.iter().any(|o| o.npc() == Some(npc.id)))
            .map(|npc| NpcSighting {
                name: npc.name.clone(),
                cell: area.to_local(npc.coordinates),
                distance: npc.coordinates.distance_to(self.player.coordinates),
            })
            .filter(|s| s.distance <= self.rules.visibility_radius)
            .collect();
        visible_people.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let sub_areas = area
            .children
            .iter()
            .filter_map(|k| self.areas.get(*k))
            .map(|child| child.name.clone())
            .collect();

        let exits = area
            .connections
            .iter()
            .map(|(label, target)| Exit {
                label: label.clone(),
                area: self.area_name(*target),
            })
            .collect();

        let shop = if let Some(fence) = area.fence_terms() {
            let held = self.player.inventory.iter().filter_map(|id| self.items.get(*id));
            Some(ShopView::Fence {
                offers: fence.buy_listing(held),
            })
        } else {
            area.ledger().map(|ledger| ShopView::Regular {
                for_sale: ledger.sell_listing(),
                buying: ledger.buy_listing(),
            })
        };

        Some(Surroundings {
            area: area.name.clone(),
            land,
            description: area.description.clone(),
            cell,
            items_here,
            people_here,
            other_items,
            visible_people,
            sub_areas,
            exits,
            shop,
        })
    }

    pub fn where_am_i(&self) -> Option<Position> {
        let area = self.player_area()?;
        Some(Position {
            area: area.name.clone(),
            cell: area.to_local(self.player.coordinates),
            global: self.player.coordinates,
        })
    }

    /// Areas whose name contains `term`, in registration order.
    pub fn where_is(&self, term: &str) -> Vec<PlaceMatch> {
        self.areas
            .find_by_partial_name(term)
            .into_iter()
            .filter_map(|k| self.areas.get(k))
            .map(|area| PlaceMatch {
                name: area.name.clone(),
                origin: area.origin,
            })
            .collect()
    }
}

fn money(amount: Money) -> String {
    format!("${amount:.2}")
}

impl fmt::Display for Surroundings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.land {
            Some(land) => writeln!(f, "--- {} (in {land}) ---", self.area)?,
            None => writeln!(f, "--- {} ---", self.area)?,
        }
        writeln!(f, "{}", self.description)?;
        writeln!(f, "You are at grid position {}.", self.cell)?;

        if !self.items_here.is_empty() {
            writeln!(f, "Items at your feet:")?;
            for item in &self.items_here {
                writeln!(f, "  - {}: {}", item.name, item.description)?;
            }
        }
        if !self.people_here.is_empty() {
            writeln!(f, "People here:")?;
            for name in &self.people_here {
                writeln!(f, "  - {name}")?;
            }
        }
        if !self.other_items.is_empty() {
            writeln!(f, "Other items in this spot:")?;
            for item in &self.other_items {
                writeln!(f, "  - {} at {}", item.name, item.cell)?;
            }
        }
        if !self.visible_people.is_empty() {
            writeln!(f, "Other people you can see:")?;
            for npc in &self.visible_people {
                writeln!(f, "  - {} at {} - {:.1} units away", npc.name, npc.cell, npc.distance)?;
            }
        }
        if !self.sub_areas.is_empty() {
            writeln!(f, "Places inside here:")?;
            for name in &self.sub_areas {
                writeln!(f, "  - Entrance to {name}")?;
            }
        }
        if !self.exits.is_empty() {
            writeln!(f, "Exits:")?;
            for exit in &self.exits {
                writeln!(f, "  - {}: to {}", capitalize(&exit.label), exit.area)?;
            }
        }

        match &self.shop {
            Some(ShopView::Regular { for_sale, buying }) => {
                if !for_sale.is_empty() {
                    writeln!(f, "Items for sale:")?;
                    for entry in for_sale {
                        let stock = match entry.stock {
                            Stock::Unlimited => "Unlimited".to_string(),
                            Stock::Finite(n) => n.to_string(),
                        };
                        writeln!(f, "  - {}: {} (Stock: {stock})", entry.name, money(entry.price))?;
                    }
                }
                if !buying.is_empty() {
                    writeln!(f, "Items we are buying:")?;
                    for entry in buying {
                        writeln!(
                            f,
                            "  - {}: We'll pay {} (Want: {})",
                            entry.name,
                            money(entry.price),
                            entry.wanted
                        )?;
                    }
                }
            }
            Some(ShopView::Fence { offers }) if offers.is_empty() => {
                writeln!(f, "'Got nothin' I want from you right now,' the fence grunts.")?;
            }
            Some(ShopView::Fence { offers }) => {
                writeln!(f, "The fence looks over your goods... 'I might be interested in these...'")?;
                for offer in offers {
                    writeln!(f, "  - {} (stolen): We'll give ya {}", offer.name, money(offer.price))?;
                }
            }
            None => {}
        }
        write!(f, "---")
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::Area;
    use crate::item::ItemPrototype;
    use crate::npc::Npc;

    fn plaza() -> World {
        let mut world = World::seeded(5);
        world.items.add_prototype(ItemPrototype::new("Churro", "Cinnamon", 5.0));
        let land = world.add_area(Area::land("Frontierland", "Dusty").with_size(20, 20));
        let store = world
            .add_sub_area(land, Area::shop("Trading Post", "Sells hats"))
            .expect("land exists");
        world.areas.connect_areas(land, "enter trading post", store).expect("both exist");
        world.set_player_area(Some(land), Some(Cell::new(5, 5)));
        world
    }

    #[test]
    fn splits_items_by_cell() {
        let mut world = plaza();
        let land = world.player.current_area.expect("placed");
        world.spawn_item("Churro", land, Cell::new(5, 5)).expect("spawn");
        world.spawn_item("Churro", land, Cell::new(9, 1)).expect("spawn");

        let view = world.look().expect("in an area");
        assert_eq!(view.land, None);
        assert_eq!(view.items_here.len(), 1);
        assert_eq!(view.other_items[0].cell, Cell::new(9, 1));
        assert_eq!(view.sub_areas, vec!["Trading Post".to_string()]);
        assert_eq!(view.exits[0].label, "enter trading post");
        assert!(view.shop.is_none());
    }

    #[test]
    fn only_nearby_people_are_visible() {
        let mut world = plaza();
        let land = world.player.current_area.expect("placed");
        world.add_npc(Npc::wanderer("Far", ""), land, Some(Cell::new(19, 19))).expect("valid");
        world.add_npc(Npc::wanderer("Mid", ""), land, Some(Cell::new(5, 9))).expect("valid");
        world.add_npc(Npc::wanderer("Near", ""), land, Some(Cell::new(6, 5))).expect("valid");
        world.add_npc(Npc::wanderer("Here", ""), land, Some(Cell::new(5, 5))).expect("valid");

        let view = world.look().expect("in an area");
        let seen: Vec<_> = view.visible_people.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(seen, vec!["Near", "Mid"]);
        assert_eq!(view.people_here, vec!["Here".to_string()]);
    }

    #[test]
    fn shops_show_their_land_and_listings() {
        let mut world = plaza();
        world.enter("trading post");
        let view = world.look().expect("in an area");
        assert_eq!(view.land.as_deref(), Some("Frontierland"));
        assert!(matches!(view.shop, Some(ShopView::Regular { .. })));
        assert!(view.to_string().starts_with("--- Trading Post (in Frontierland) ---"));
    }

    #[test]
    fn where_is_matches_partial_names() {
        let world = plaza();
        let hits = world.where_is("TRADING");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Trading Post");
        assert!(world.where_is("").is_empty());
        let here = world.where_am_i().expect("placed");
        assert_eq!((here.area.as_str(), here.cell), ("Frontierland", Cell::new(5, 5)));
    }
}
