//! A small demo park: three lands, a gift shop with staff, a ride queue,
//! a bazaar and a fence.

use crate::area::Area;
use crate::config::RulesConfig;
use crate::coordinates::{Cell, Coordinate};
use crate::error::{ResolutionError, WorldError};
use crate::group::{AreaGroup, Layout};
use crate::item::ItemPrototype;
use crate::movement::Direction;
use crate::npc::Npc;
use crate::ride::Ride;
use crate::shop::{ShopLedger, Stock};
use crate::types::AreaKey;
use crate::world::World;

pub const MAIN_STREET: &str = "land_main_street_usa";
pub const ADVENTURELAND: &str = "land_adventureland";
pub const FANTASYLAND: &str = "land_fantasyland";

/// Build the demo park and put the player on Main Street.
pub fn demo_park(rules: RulesConfig) -> Result<World, WorldError> {
    let mut world = World::new(rules);

    let ears = ItemPrototype::new("Mickey Ears", "Classic Mickey Mouse ears.", 15.0);
    let churro = ItemPrototype::new("Churro", "A delicious cinnamon sugar treat.", 5.0);
    let map = ItemPrototype::new("Lost Map", "A slightly crumpled park map.", 1.0);
    for proto in [&ears, &churro, &map] {
        world.items.add_prototype(proto.clone());
    }

    // === Lands ===
    let mut lands = AreaGroup::new("Disneyland", Coordinate::default());
    lands
        .add(
            Area::land("Main Street U.S.A.", "A charming turn-of-the-century American town square.")
                .with_size(15, 5),
            Layout::Origin,
        )
        .add(
            Area::land("Adventureland", "An exotic land of jungles, rivers, and mystery.").with_size(20, 15),
            Layout::beside(MAIN_STREET, Direction::West),
        )
        .add(
            Area::land("Fantasyland", "A whimsical land of fairy tales and dreams.").with_size(18, 18),
            Layout::beside(MAIN_STREET, Direction::North).at_distance(5),
        );
    lands.connect(MAIN_STREET, "north", FANTASYLAND);
    lands.connect(MAIN_STREET, "west", ADVENTURELAND);
    let keys = world.add_group(lands)?;
    let [main, adventure, fantasy] = keys[..] else {
        return Err(WorldError::InvariantViolation("demo lands did not register".into()));
    };

    // === Main Street ===
    let mut emporium_ledger = ShopLedger::new();
    emporium_ledger.add_sell_stock(ears, 15.0, Stock::Finite(20));
    emporium_ledger.add_sell_stock(churro, 6.0, Stock::Finite(30));
    emporium_ledger.add_buy_stock("Lost Map", 0.5, 3);
    let emporium = world.add_sub_area(
        main,
        Area::shop("Emporium", "The largest gift shop on Main Street, full of souvenirs.")
            .with_size(6, 4)
            .with_origin(origin(&world, main)? + Cell::new(2, 0))
            .with_ledger(emporium_ledger),
    )?;
    link(&mut world, main, "enter emporium", emporium, "exit to main street")?;

    // === Adventureland ===
    let queue = world.add_sub_area(
        adventure,
        Area::ride(
            "Jungle Cruise Queue",
            "The winding queue for the world-famous Jungle Cruise.",
            Ride::new("Boat Ride").with_relief(7.0),
        )
        .with_size(3, 8)
        .with_origin(origin(&world, adventure)? + Cell::new(5, 2)),
    )?;
    link(&mut world, adventure, "enter jungle cruise", queue, "exit to adventureland")?;

    let mut bazaar_ledger = ShopLedger::new();
    bazaar_ledger.add_sell_stock(map, 2.0, Stock::Finite(10));
    let bazaar = world.add_sub_area(
        adventure,
        Area::shop("Adventureland Bazaar", "A marketplace full of exotic treasures.")
            .with_size(4, 4)
            .with_origin(origin(&world, adventure)? + Cell::new(1, 10))
            .with_ledger(bazaar_ledger),
    )?;
    link(&mut world, adventure, "enter bazaar", bazaar, "exit to adventureland")?;

    let alley = world.add_sub_area(
        adventure,
        Area::fence(
            "Hidden Alley",
            "A dark, out-of-the-way alley. Smells faintly of desperation.",
            0.3,
        )
        .with_origin(origin(&world, adventure)? + Cell::new(18, 1)),
    )?;
    link(&mut world, adventure, "enter alley", alley, "exit to adventureland")?;

    world.spawn_item("Lost Map", adventure, Cell::new(10, 10))?;

    // === People ===
    world.add_npc(
        Npc::informant(
            "Shady Sam",
            "A nervous-looking individual who keeps glancing over his shoulder.",
        ),
        alley,
        Some(Cell::new(1, 1)),
    )?;
    world.add_npc(
        Npc::character(
            "Mickey Mouse",
            "The one and only, cheerful and friendly!",
            "gives a friendly wave and a chuckle",
        ),
        main,
        Some(Cell::new(7, 2)),
    )?;
    world.add_npc(
        Npc::character(
            "Goofy",
            "A lovable and clumsy friend.",
            "stumbles a bit but recovers with a 'Gawrsh!'",
        ),
        fantasy,
        Some(Cell::new(5, 5)),
    )?;
    world.add_staff(
        "Alice",
        "A helpful Cast Member at the till.",
        "Cashier",
        emporium,
        Some(Cell::new(1, 1)),
    )?;
    world.add_staff(
        "Bob",
        "A vigilant Cast Member keeping an eye on the displays.",
        "Floor Staff",
        emporium,
        Some(Cell::new(4, 2)),
    )?;

    world.set_player_area(Some(main), Some(Cell::new(1, 1)));
    Ok(world)
}

fn origin(world: &World, key: AreaKey) -> Result<Coordinate, WorldError> {
    world
        .area(key)
        .map(|a| a.origin)
        .ok_or_else(|| ResolutionError::UnknownArea(format!("{key:?}")).into())
}

/// One-way labelled doors in both directions, e.g. `enter emporium` and
/// `exit to main street`.
fn link(world: &mut World, outer: AreaKey, enter: &str, inner: AreaKey, exit: &str) -> Result<(), WorldError> {
    world.areas.connect_areas(outer, enter, inner)?;
    world.areas.connect_areas(inner, exit, outer)
}
