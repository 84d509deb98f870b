use park_core::{
    demo_park, Area, Cell, Direction, GameEvent, Npc, Occupant, RulesConfig, World,
};

fn park(seed: u64) -> World {
    demo_park(RulesConfig::default().with_seed(seed)).unwrap()
}

/// Every placed NPC sits in exactly one area, on the cell its coordinate
/// says, and is listed by that area.
fn assert_placement_consistent(world: &World) {
    for (id, npc) in world.npcs.iter() {
        let holders: Vec<_> = world
            .areas
            .iter()
            .filter(|a| a.npcs.contains(&id))
            .collect();
        assert_eq!(holders.len(), 1, "{} is listed by {} areas", npc.name, holders.len());
        let area = holders[0];
        assert_eq!(npc.location, Some(area.key));
        let cell = area.to_local(npc.coordinates);
        assert!(area.is_valid_cell(cell));
        assert!(area.objects_at(cell).contains(&Occupant::Npc(id)));
        assert_eq!(area.locate(Occupant::Npc(id)), Some(cell));
    }
}

#[test]
fn walking_off_the_edge_follows_the_connection() {
    let mut world = park(1);
    let adventureland = world.areas.find("Adventureland").unwrap();

    let step = world.move_player("w");
    assert_eq!(
        step,
        vec![GameEvent::Moved {
            direction: "west".into(),
            cell: Cell::new(0, 1)
        }]
    );

    let events = world.move_player("west");
    assert!(matches!(&events[0], GameEvent::Arrived { area, .. } if area == "Adventureland"));
    assert!(matches!(events.last(), Some(GameEvent::EnteredArea { .. })));
    assert_eq!(world.player.current_area, Some(adventureland));
    assert_eq!(world.player_cell(), Some(Cell::new(10, 7)));

    let area = world.area(adventureland).unwrap();
    assert_eq!(world.player.coordinates, area.to_global(Cell::new(10, 7)));
}

#[test]
fn blocked_steps_leave_the_player_in_place() {
    let mut world = park(1);
    world.move_player("s");
    let before = world.player.coordinates;

    let events = world.move_player("south");
    assert_eq!(
        events,
        vec![GameEvent::CannotMove {
            direction: "south".into()
        }]
    );
    assert_eq!(world.player.coordinates, before);

    assert_eq!(
        world.move_player("sideways"),
        vec![GameEvent::UnknownDirection {
            label: "sideways".into()
        }]
    );
    assert_eq!(
        world.enter("space mountain"),
        vec![GameEvent::CannotEnter {
            label: "space mountain".into()
        }]
    );
}

#[test]
fn compass_connections_are_reciprocal() {
    let mut world = park(2);
    let main = world.areas.find("main street u.s.a.").unwrap();
    for _ in 0..3 {
        world.move_player("n");
    }
    let events = world.move_player("n");
    assert!(matches!(&events[0], GameEvent::Arrived { area, .. } if area == "Fantasyland"));

    let fantasyland = world.player.current_area.unwrap();
    assert_eq!(world.area(fantasyland).unwrap().connection("south"), Some(main));
}

#[test]
fn portals_carry_the_player_to_their_target_cell() {
    let mut world = World::seeded(5);
    let lobby = world.add_area(Area::new("Lobby", "").with_size(4, 3));
    let vault = world.add_area(Area::new("Vault", "").with_size(6, 6));
    world
        .area_mut(lobby)
        .unwrap()
        .add_portal(Cell::new(2, 1), vault, Some(Cell::new(3, 3)))
        .unwrap();
    assert!(world
        .area_mut(lobby)
        .unwrap()
        .add_portal(Cell::new(9, 9), vault, None)
        .is_err());
    world.set_player_area(Some(lobby), Some(Cell::new(1, 1)));

    let events = world.move_player("e");
    assert!(matches!(events[0], GameEvent::Moved { .. }));
    assert_eq!(events[1], GameEvent::PortalUsed { area: "Vault".into() });
    assert_eq!(world.player.current_area, Some(vault));
    assert_eq!(world.player_cell(), Some(Cell::new(3, 3)));
}

#[test]
fn missing_targets_are_rejected_without_moving() {
    let mut world = park(3);
    let (area, coordinates) = (world.player.current_area, world.player.coordinates);

    assert!(matches!(
        world.set_player_area(None, None).as_slice(),
        [GameEvent::Rejected { .. }]
    ));
    assert_eq!(
        world.teleport("atlantis", None),
        vec![GameEvent::AreaNotFound {
            query: "atlantis".into()
        }]
    );
    assert_eq!((world.player.current_area, world.player.coordinates), (area, coordinates));
}

#[test]
fn teleport_clamps_the_target_cell() {
    let mut world = park(3);
    world.teleport("emporium", Some(Cell::new(40, -2)));
    assert_eq!(world.player_cell(), Some(Cell::new(5, 0)));
    let found = world.where_am_i().unwrap();
    assert_eq!(found.area, "Emporium");
}

#[test]
fn stepping_back_out_of_a_shop_into_its_land_is_not_theft() {
    let mut world = park(4);
    world.enter("emporium");
    world.pick_up("mickey ears");
    let suspicion = world.player.suspicion_rating;

    let events = world.move_player("exit to main street");
    assert!(matches!(events.as_slice(), [GameEvent::EnteredArea { area, .. }] if area == "Main Street U.S.A."));
    assert_eq!(world.player.suspicion_rating, suspicion);
    assert_eq!(world.player.inventory.len(), 1);
}

#[test]
fn npc_bookkeeping_survives_many_turns() {
    let mut world = park(6);
    let main = world.areas.find("main street u.s.a.").unwrap();
    for i in 0..8 {
        world
            .add_npc(Npc::guest(&format!("Visitor {i}"), ""), main, Some(Cell::new(i, i % 5)))
            .unwrap();
    }
    for _ in 0..300 {
        world.advance_turn();
        assert_placement_consistent(&world);
    }
}

#[test]
fn npcs_can_be_relocated_between_areas() {
    let mut world = park(7);
    let main = world.areas.find("main street u.s.a.").unwrap();
    let bazaar = world.areas.find("adventureland bazaar").unwrap();
    let pluto = world
        .add_npc(Npc::wanderer("Pluto", "A good dog."), main, Some(Cell::new(3, 3)))
        .unwrap();

    world.move_npc(pluto, bazaar, Some(Cell::new(9, 9))).unwrap();
    assert!(!world.area(main).unwrap().npcs.contains(&pluto));
    assert_eq!(world.npc(pluto).unwrap().cell(&world.areas), Some(Cell::new(3, 3)));
    assert_placement_consistent(&world);
}

#[test]
fn direction_labels_round_trip() {
    for direction in Direction::ALL {
        assert_eq!(Direction::parse(direction.label()), Some(direction));
    }
}
