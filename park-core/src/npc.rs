//! Non-player characters and their per-turn autonomy.
//!
//! Every NPC shares one struct; what it does on its turn is picked by
//! matching on [`Behavior`]. The random draws are kept apart from the state
//! change ([`WanderRoll`]) so a test can force a decision.

use rand::Rng;
use slotmap::SlotMap;

use crate::config::{CooldownRange, RulesConfig};
use crate::coordinates::{Cell, Coordinate};
use crate::error::{ResolutionError, WorldError};
use crate::events::GameEvent;
use crate::placement::{Occupant, Placeable};
use crate::registry::AreaRegistry;
use crate::types::{AreaKey, NpcId, slug};

pub const DEFAULT_GREETING: &str = "Psst... got something for me?";

/// Moves a wandering NPC can pick from, standing still included.
pub const WANDER_STEPS: [(i32, i32); 5] = [(0, 1), (0, -1), (1, 0), (-1, 0), (0, 0)];

#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    Wanderer,
    Character { signature_move: String },
    Guest { suspicion_level: f64, has_been_checked: bool },
    /// Cast member. Only staff can catch a shoplifter.
    Staff { role: String, alertness: f64 },
    /// Stays put and talks to the player when close.
    Informant { greeting: String },
}

/// What the player looks like to an NPC deciding whether it is seen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub area: AreaKey,
    pub coordinates: Coordinate,
}

/// Outcome of the wander draw for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WanderRoll {
    /// The wander chance failed; nothing happens and the cooldown stays at 0.
    Idle,
    Step { dx: i32, dy: i32 },
}

impl WanderRoll {
    pub fn draw<R: Rng>(rng: &mut R, chance: f64) -> Self {
        if rng.random::<f64>() < chance {
            let (dx, dy) = WANDER_STEPS[rng.random_range(0..WANDER_STEPS.len())];
            WanderRoll::Step { dx, dy }
        } else {
            WanderRoll::Idle
        }
    }
}

fn draw_cooldown<R: Rng>(rng: &mut R, range: CooldownRange) -> u32 {
    rng.random_range(range.min..=range.max)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Npc {
    pub id: NpcId,
    /// Stable, human-readable handle such as `cast_alice`.
    pub tag: String,
    pub name: String,
    pub description: String,
    pub coordinates: Coordinate,
    pub location: Option<AreaKey>,
    pub action_cooldown: u32,
    pub behavior: Behavior,
}

impl Npc {
    fn build(prefix: &str, handle: &str, name: String, description: String, behavior: Behavior) -> Self {
        Self {
            id: NpcId::default(),
            tag: format!("{prefix}{}", slug(handle)),
            name,
            description,
            coordinates: Coordinate::default(),
            location: None,
            action_cooldown: 0,
            behavior,
        }
    }

    pub fn wanderer(name: &str, description: impl Into<String>) -> Self {
        Self::build("npc_", name, name.to_string(), description.into(), Behavior::Wanderer)
    }

    pub fn character(name: &str, description: impl Into<String>, signature_move: impl Into<String>) -> Self {
        Self::build(
            "char_",
            name,
            name.to_string(),
            description.into(),
            Behavior::Character {
                signature_move: signature_move.into(),
            },
        )
    }

    pub fn guest(name: &str, description: impl Into<String>) -> Self {
        Self::build(
            "guest_",
            name,
            format!("Guest {name}"),
            description.into(),
            Behavior::Guest {
                suspicion_level: 0.0,
                has_been_checked: false,
            },
        )
    }

    /// Staff member with alertness drawn from `[0.5, 1.0)`.
    pub fn staff<R: Rng>(name: &str, description: impl Into<String>, role: impl Into<String>, rng: &mut R) -> Self {
        let alertness = rng.random_range(0.5..1.0);
        Self::staff_with_alertness(name, description, role, alertness)
    }

    pub fn staff_with_alertness(
        name: &str,
        description: impl Into<String>,
        role: impl Into<String>,
        alertness: f64,
    ) -> Self {
        Self::build(
            "cast_",
            name,
            format!("CM {name}"),
            description.into(),
            Behavior::Staff {
                role: role.into(),
                alertness: alertness.clamp(0.0, 1.0),
            },
        )
    }

    pub fn informant(name: &str, description: impl Into<String>) -> Self {
        Self::build(
            "shady_",
            name,
            name.to_string(),
            description.into(),
            Behavior::Informant {
                greeting: DEFAULT_GREETING.to_string(),
            },
        )
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        if let Behavior::Informant { greeting: g } = &mut self.behavior {
            *g = greeting.into();
        }
        self
    }

    pub fn alertness(&self) -> Option<f64> {
        match self.behavior {
            Behavior::Staff { alertness, .. } => Some(alertness),
            _ => None,
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self.behavior, Behavior::Staff { .. })
    }

    pub fn matches(&self, query: &str) -> bool {
        self.tag == query || self.name.eq_ignore_ascii_case(query.trim())
    }

    /// Local cell in the current area, if any.
    pub fn cell(&self, areas: &AreaRegistry) -> Option<Cell> {
        let area = areas.get(self.location?)?;
        Some(area.to_local(self.coordinates))
    }

    fn sees(&self, player: Option<PlayerView>, radius: f64) -> bool {
        player.is_some_and(|p| {
            self.location == Some(p.area) && self.coordinates.distance_to(p.coordinates) <= radius
        })
    }

    // === Placement ===

    /// Move into `target` at `cell` (its center if omitted), leaving the old
    /// area first. Out-of-range cells are clamped.
    pub fn set_location(
        &mut self,
        areas: &mut AreaRegistry,
        target: AreaKey,
        cell: Option<Cell>,
    ) -> Result<(), WorldError> {
        let cell = {
            let area = areas
                .get(target)
                .ok_or_else(|| ResolutionError::UnknownArea(format!("{target:?}")))?;
            area.clamp_cell(cell.unwrap_or_else(|| area.default_cell()))
        };

        if let Some(old) = self.location.and_then(|k| areas.get_mut(k)) {
            let old_cell = old.to_local(self.coordinates);
            old.remove(self.occupant(), old_cell);
        }

        let area = areas
            .get_mut(target)
            .ok_or_else(|| ResolutionError::UnknownArea(format!("{target:?}")))?;
        area.place(self, cell)?;
        Ok(())
    }

    /// Step within the current area. `false` if there is no area or the
    /// destination is off the grid.
    pub fn move_on_grid(&mut self, areas: &mut AreaRegistry, dx: i32, dy: i32) -> bool {
        let Some(area) = self.location.and_then(|k| areas.get_mut(k)) else {
            return false;
        };
        let from = area.to_local(self.coordinates);
        let to = from.offset(dx, dy);
        if !area.is_valid_cell(to) {
            return false;
        }
        area.remove(self.occupant(), from);
        area.place(self, to).is_ok()
    }

    // === Autonomy ===

    /// Advance one turn. Returns a message only when the player would see it.
    pub fn update<R: Rng>(
        &mut self,
        areas: &mut AreaRegistry,
        player: Option<PlayerView>,
        rules: &RulesConfig,
        rng: &mut R,
    ) -> Option<GameEvent> {
        if let Behavior::Informant { greeting } = &self.behavior {
            if self.sees(player, rules.informant_radius) && rng.random::<f64>() < rules.greeting_chance {
                #[cfg(feature = "instrument")]
                tracing::info!(target: "npc_action", npc = self.tag.as_str(), action = "whisper", visible = true);
                return Some(GameEvent::NpcWhisper {
                    npc: self.name.clone(),
                    greeting: greeting.clone(),
                });
            }
            return None;
        }

        let moved = if self.action_cooldown > 0 {
            self.action_cooldown -= 1;
            None
        } else {
            let roll = if self.location.is_some() {
                WanderRoll::draw(rng, rules.wander_chance)
            } else {
                WanderRoll::Idle
            };
            self.apply_wander(areas, roll, player, rules, rng)
        };
        if moved.is_some() {
            return moved;
        }

        // a character whose cooldown just ran out may act in the same turn
        if let Behavior::Character { signature_move } = &self.behavior {
            if self.action_cooldown == 0 && rng.random::<f64>() < rules.signature_chance {
                let seen = self.sees(player, rules.visibility_radius);
                let phrase = signature_move.clone();
                self.action_cooldown = draw_cooldown(rng, rules.signature_cooldown);

                #[cfg(feature = "instrument")]
                tracing::info!(target: "npc_action", npc = self.tag.as_str(), action = "signature", visible = seen);

                if seen {
                    return Some(GameEvent::NpcSignature {
                        npc: self.name.clone(),
                        phrase,
                    });
                }
            }
        }
        None
    }

    /// Apply a wander decision. A non-idle roll always resets the cooldown,
    /// whether or not the step succeeded or was seen.
    pub fn apply_wander<R: Rng>(
        &mut self,
        areas: &mut AreaRegistry,
        roll: WanderRoll,
        player: Option<PlayerView>,
        rules: &RulesConfig,
        rng: &mut R,
    ) -> Option<GameEvent> {
        let WanderRoll::Step { dx, dy } = roll else {
            return None;
        };

        let mut event = None;
        if (dx, dy) != (0, 0) && self.move_on_grid(areas, dx, dy) {
            let visible = self.sees(player, rules.visibility_radius);

            #[cfg(feature = "instrument")]
            tracing::info!(
                target: "npc_action",
                npc = self.tag.as_str(),
                action = "move",
                x = self.coordinates.x,
                y = self.coordinates.y,
                visible = visible,
            );

            if visible {
                event = Some(GameEvent::NpcMoved {
                    npc: self.name.clone(),
                });
            }
        }
        self.action_cooldown = draw_cooldown(rng, rules.wander_cooldown);
        event
    }
}

impl Placeable for Npc {
    fn occupant(&self) -> Occupant {
        Occupant::Npc(self.id)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_coordinates(&mut self, coordinates: Coordinate) {
        self.coordinates = coordinates;
    }

    fn set_location(&mut self, area: AreaKey) {
        self.location = Some(area);
    }
}

/// Owns every NPC.
#[derive(Debug, Clone, Default)]
pub struct NpcRoster {
    npcs: SlotMap<NpcId, Npc>,
}

impl NpcRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `npc`, assigning its id. It is not placed anywhere yet.
    pub fn add(&mut self, mut npc: Npc) -> NpcId {
        self.npcs.insert_with_key(|id| {
            npc.id = id;
            npc
        })
    }

    pub fn get(&self, id: NpcId) -> Option<&Npc> {
        self.npcs.get(id)
    }

    pub fn get_mut(&mut self, id: NpcId) -> Option<&mut Npc> {
        self.npcs.get_mut(id)
    }

    /// By tag, then case-insensitive name.
    pub fn find(&self, query: &str) -> Option<NpcId> {
        self.npcs
            .iter()
            .find(|(_, n)| n.tag == query)
            .or_else(|| self.npcs.iter().find(|(_, n)| n.matches(query)))
            .map(|(id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NpcId, &Npc)> {
        self.npcs.iter()
    }

    pub fn len(&self) -> usize {
        self.npcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.npcs.is_empty()
    }

    /// One update per NPC, collecting whatever the player gets to see.
    /// Iteration order across NPCs is not guaranteed.
    pub fn update_all<R: Rng>(
        &mut self,
        areas: &mut AreaRegistry,
        player: Option<PlayerView>,
        rules: &RulesConfig,
        rng: &mut R,
    ) -> Vec<GameEvent> {
        self.npcs
            .values_mut()
            .filter_map(|npc| npc.update(areas, player, rules, rng))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::Area;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn plaza() -> (AreaRegistry, AreaKey) {
        let mut areas = AreaRegistry::new();
        let key = areas.add(Area::new("Plaza", ""));
        (areas, key)
    }

    fn placed(areas: &mut AreaRegistry, key: AreaKey, npc: Npc, cell: Cell) -> Npc {
        let mut roster = NpcRoster::new();
        let id = roster.add(npc);
        let mut npc = roster.get(id).cloned().expect("just added");
        npc.set_location(areas, key, Some(cell)).expect("valid area");
        npc
    }

    #[test]
    fn names_and_tags_follow_behavior() {
        let guest = Npc::guest("Tom", "");
        assert_eq!((guest.name.as_str(), guest.tag.as_str()), ("Guest Tom", "guest_tom"));
        let cm = Npc::staff_with_alertness("Alice", "", "Cashier", 0.8);
        assert_eq!((cm.name.as_str(), cm.tag.as_str()), ("CM Alice", "cast_alice"));
        assert_eq!(Npc::informant("Shady Sam", "").tag, "shady_shady_sam");
        assert_eq!(Npc::character("Mr. Toad", "", "honks").tag, "char_mr_toad");
    }

    #[test]
    fn drawn_alertness_is_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let a = Npc::staff("Bob", "", "Floor", &mut rng).alertness().expect("staff");
            assert!((0.5..1.0).contains(&a), "alertness {a} out of range");
        }
    }

    #[test]
    fn cooldown_only_ticks_down() {
        let (mut areas, key) = plaza();
        let mut npc = placed(&mut areas, key, Npc::wanderer("Pluto", ""), Cell::new(5, 5));
        npc.action_cooldown = 2;
        let mut rng = StdRng::seed_from_u64(1);
        let rules = RulesConfig::default();

        assert!(npc.update(&mut areas, None, &rules, &mut rng).is_none());
        assert_eq!(npc.action_cooldown, 1);
        assert_eq!(npc.cell(&areas), Some(Cell::new(5, 5)));
    }

    #[test]
    fn forced_step_relocates_and_resets_cooldown() {
        let (mut areas, key) = plaza();
        let mut npc = placed(&mut areas, key, Npc::wanderer("Pluto", ""), Cell::new(5, 5));
        let mut rng = StdRng::seed_from_u64(9);
        let rules = RulesConfig::default();

        npc.apply_wander(&mut areas, WanderRoll::Step { dx: 1, dy: 0 }, None, &rules, &mut rng);

        assert_eq!(npc.cell(&areas), Some(Cell::new(6, 5)));
        let area = areas.get(key).expect("registered");
        assert_eq!(area.objects_at(Cell::new(6, 5)), &[Occupant::Npc(npc.id)]);
        assert!(area.objects_at(Cell::new(5, 5)).is_empty());
        assert!(
            rules.wander_cooldown.contains(npc.action_cooldown),
            "cooldown {} outside [2,5]",
            npc.action_cooldown
        );
    }

    #[test]
    fn blocked_step_still_resets_cooldown() {
        let (mut areas, key) = plaza();
        let mut npc = placed(&mut areas, key, Npc::wanderer("Pluto", ""), Cell::new(0, 0));
        let mut rng = StdRng::seed_from_u64(2);
        let rules = RulesConfig::default();

        let event = npc.apply_wander(&mut areas, WanderRoll::Step { dx: -1, dy: 0 }, None, &rules, &mut rng);
        assert!(event.is_none());
        assert_eq!(npc.cell(&areas), Some(Cell::new(0, 0)));
        assert!(npc.action_cooldown >= 2);
    }

    #[test]
    fn movement_is_reported_only_near_the_player() {
        let (mut areas, key) = plaza();
        let mut npc = placed(&mut areas, key, Npc::wanderer("Pluto", ""), Cell::new(5, 5));
        let rules = RulesConfig::default();
        let mut rng = StdRng::seed_from_u64(4);
        let origin = areas.get(key).map(|a| a.origin).unwrap_or_default();

        let near = PlayerView { area: key, coordinates: origin + Cell::new(5, 6) };
        let event = npc.apply_wander(&mut areas, WanderRoll::Step { dx: 0, dy: 1 }, Some(near), &rules, &mut rng);
        assert_eq!(event, Some(GameEvent::NpcMoved { npc: "Pluto".into() }));

        let far = PlayerView { area: key, coordinates: origin + Cell::new(50, 50) };
        let event = npc.apply_wander(&mut areas, WanderRoll::Step { dx: 0, dy: 1 }, Some(far), &rules, &mut rng);
        assert!(event.is_none());
        assert_eq!(npc.cell(&areas), Some(Cell::new(5, 7)));
    }

    fn scripted_rules() -> RulesConfig {
        RulesConfig {
            wander_chance: 0.0,
            signature_chance: 1.0,
            ..RulesConfig::default()
        }
    }

    #[test]
    fn unseen_signature_still_resets_cooldown() {
        let (mut areas, key) = plaza();
        let mut mickey = placed(&mut areas, key, Npc::character("Mickey", "", "waves"), Cell::new(2, 2));
        let rules = scripted_rules();
        let mut rng = StdRng::seed_from_u64(5);
        let origin = areas.get(key).map(|a| a.origin).unwrap_or_default();
        let far = PlayerView { area: key, coordinates: origin + Cell::new(40, 40) };

        assert!(mickey.update(&mut areas, Some(far), &rules, &mut rng).is_none());
        assert!(
            rules.signature_cooldown.contains(mickey.action_cooldown),
            "cooldown {} outside [3,6]",
            mickey.action_cooldown
        );
        assert_eq!(mickey.cell(&areas), Some(Cell::new(2, 2)));
    }

    #[test]
    fn signature_is_seen_up_close() {
        let (mut areas, key) = plaza();
        let mut mickey = placed(&mut areas, key, Npc::character("Mickey", "", "waves"), Cell::new(2, 2));
        let rules = scripted_rules();
        let mut rng = StdRng::seed_from_u64(6);
        let origin = areas.get(key).map(|a| a.origin).unwrap_or_default();
        let near = PlayerView { area: key, coordinates: origin + Cell::new(3, 2) };

        let event = mickey.update(&mut areas, Some(near), &rules, &mut rng);
        assert_eq!(
            event,
            Some(GameEvent::NpcSignature {
                npc: "Mickey".into(),
                phrase: "waves".into()
            })
        );
        assert!(rules.signature_cooldown.contains(mickey.action_cooldown));

        // resting characters do nothing until the cooldown runs out
        mickey.action_cooldown = 2;
        assert!(mickey.update(&mut areas, Some(near), &rules, &mut rng).is_none());
        assert_eq!(mickey.action_cooldown, 1);
    }

    #[test]
    fn informant_never_moves() {
        let (mut areas, key) = plaza();
        let mut npc = placed(&mut areas, key, Npc::informant("Shady Sam", ""), Cell::new(1, 1));
        let rules = RulesConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let origin = areas.get(key).map(|a| a.origin).unwrap_or_default();
        let player = PlayerView { area: key, coordinates: origin + Cell::new(1, 2) };

        let mut whispers = 0;
        for _ in 0..200 {
            if let Some(event) = npc.update(&mut areas, Some(player), &rules, &mut rng) {
                assert!(matches!(event, GameEvent::NpcWhisper { .. }));
                whispers += 1;
            }
            assert_eq!(npc.cell(&areas), Some(Cell::new(1, 1)));
        }
        assert!(whispers > 0, "a nearby player should hear something in 200 turns");
    }

    #[test]
    fn informant_is_silent_out_of_range() {
        let (mut areas, key) = plaza();
        let mut npc = placed(&mut areas, key, Npc::informant("Shady Sam", ""), Cell::new(0, 0));
        let rules = RulesConfig::default();
        let mut rng = StdRng::seed_from_u64(5);
        let origin = areas.get(key).map(|a| a.origin).unwrap_or_default();
        let player = PlayerView { area: key, coordinates: origin + Cell::new(9, 9) };

        for _ in 0..100 {
            assert!(npc.update(&mut areas, Some(player), &rules, &mut rng).is_none());
        }
    }

    #[test]
    fn set_location_moves_between_areas() {
        let (mut areas, plaza) = plaza();
        let shop = areas.add(Area::shop("Emporium", ""));
        let mut npc = placed(&mut areas, plaza, Npc::wanderer("Pluto", ""), Cell::new(2, 2));

        npc.set_location(&mut areas, shop, Some(Cell::new(40, -3))).expect("valid");
        assert_eq!(npc.location, Some(shop));
        assert_eq!(npc.cell(&areas), Some(Cell::new(4, 0)), "cell is clamped");
        assert!(areas.get(plaza).map(|a| a.npcs.is_empty()).unwrap_or(false));
        assert_eq!(areas.get(shop).map(|a| a.npcs.clone()), Some(vec![npc.id]));
    }
}
