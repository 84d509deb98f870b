//! Shop-exit theft detection.
//!
//! Leaving a shop while holding goods taken from it raises suspicion at once.
//! Each staff member present then gets one roll to notice; the first to
//! succeed confiscates everything taken from that shop.

use rand::Rng;

use crate::config::TheftRules;
use crate::coordinates::Cell;
use crate::events::GameEvent;
use crate::types::{AreaKey, ItemId, NpcId};
use crate::world::World;

/// A staff member able to see the player leave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Watcher {
    pub npc: NpcId,
    pub alertness: f64,
    /// Grid distance between the exit cell and the staff member.
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TheftOutcome {
    /// Nothing unpaid from this shop was carried out.
    Clean,
    /// No staff in the shop; the goods stay with the player, still unpaid.
    Unwatched { count: usize },
    /// Staff were present but nobody noticed.
    Escaped { count: usize },
    Caught { by: NpcId, confiscated: Vec<ItemId> },
}

/// Chance that one staff member notices, shared among `staff_count` of them.
pub fn detection_chance(
    rules: &TheftRules,
    alertness: f64,
    distance: f64,
    suspicion: f64,
    staff_count: usize,
) -> f64 {
    if staff_count == 0 {
        return 0.0;
    }
    let raw = rules.base_chance + alertness * rules.alertness_weight
        - distance * rules.distance_penalty
        + suspicion * rules.suspicion_weight;
    // must not panic on inverted or NaN bounds
    (raw / staff_count as f64).max(rules.min_chance).min(rules.max_chance)
}

/// One independent draw per watcher, in order. Returns the first who noticed.
pub fn roll_detection<R: Rng>(
    rng: &mut R,
    watchers: &[Watcher],
    rules: &TheftRules,
    suspicion: f64,
) -> Option<NpcId> {
    watchers.iter().find_map(|w| {
        let chance = detection_chance(rules, w.alertness, w.distance, suspicion, watchers.len());
        let roll: f64 = rng.random();
        (roll < chance).then_some(w.npc)
    })
}

impl World {
    /// Staff currently in `shop`, in the shop's NPC order.
    pub fn watchers(&self, shop: AreaKey, exit_cell: Cell) -> Vec<Watcher> {
        let Some(area) = self.areas.get(shop) else {
            return Vec::new();
        };
        area.npcs
            .iter()
            .filter_map(|id| self.npcs.get(*id))
            .filter_map(|npc| {
                let alertness = npc.alertness()?;
                Some(Watcher {
                    npc: npc.id,
                    alertness,
                    distance: exit_cell.distance_to(area.to_local(npc.coordinates)),
                })
            })
            .collect()
    }

    /// Resolve the player walking out of `shop` from `exit_cell`.
    pub fn check_for_theft(&mut self, shop: AreaKey, exit_cell: Cell) -> (TheftOutcome, Vec<GameEvent>) {
        let Some(area) = self.areas.get(shop).filter(|a| a.is_shop()) else {
            return (TheftOutcome::Clean, Vec::new());
        };
        let shop_id = area.id.clone();
        let shop_name = area.name.clone();

        let unpaid = self.player.unpaid_from(&self.items, &shop_id);
        if unpaid.is_empty() {
            return (TheftOutcome::Clean, Vec::new());
        }
        let count = unpaid.len();
        let rules = self.rules.theft;
        self.player.raise_suspicion(rules.suspicion_per_item * count as f64);
        let mut events = vec![GameEvent::LeavingWithGoods {
            shop: shop_name,
            count,
        }];

        let watchers = self.watchers(shop, exit_cell);
        if watchers.is_empty() {
            #[cfg(feature = "instrument")]
            tracing::info!(target: "theft", shop = shop_id.as_str(), items = count, staff = 0_u64, caught = false);
            events.push(GameEvent::Unwatched);
            return (TheftOutcome::Unwatched { count }, events);
        }

        let suspicion = self.player.suspicion_rating;
        let Some(by) = roll_detection(self.rng(), &watchers, &rules, suspicion) else {
            #[cfg(feature = "instrument")]
            tracing::info!(
                target: "theft",
                shop = shop_id.as_str(),
                items = count,
                staff = watchers.len(),
                caught = false,
            );
            events.push(GameEvent::Escaped);
            return (TheftOutcome::Escaped { count }, events);
        };

        let mut names = Vec::with_capacity(count);
        for id in &unpaid {
            self.player.release(*id);
            if let Some(item) = self.items.despawn(*id) {
                names.push(item.name);
            }
        }
        self.player.raise_suspicion(rules.caught_penalty);

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "theft",
            shop = shop_id.as_str(),
            items = count,
            staff = watchers.len(),
            caught = true,
        );

        let staff = self
            .npcs
            .get(by)
            .map(|n| n.name.clone())
            .unwrap_or_default();
        events.push(GameEvent::Caught {
            staff,
            confiscated: names,
        });
        (
            TheftOutcome::Caught {
                by,
                confiscated: unpaid,
            },
            events,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;
    use slotmap::SlotMap;

    /// Returns the same word forever: 0 makes every roll succeed, MAX none.
    struct FixedRng(u64);

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.0 as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(self.0 as u8);
        }
    }

    fn staff(n: usize) -> Vec<Watcher> {
        let mut keys: SlotMap<NpcId, ()> = SlotMap::with_key();
        (0..n)
            .map(|_| Watcher {
                npc: keys.insert(()),
                alertness: 0.8,
                distance: 1.0,
            })
            .collect()
    }

    #[test]
    fn chance_is_split_and_clamped() {
        let rules = TheftRules::default();
        // 0.1 + 0.16 - 0.05 + 0.1 = 0.31
        let one = detection_chance(&rules, 0.8, 1.0, 10.0, 1);
        assert!((one - 0.31).abs() < 1e-9);
        let two = detection_chance(&rules, 0.8, 1.0, 10.0, 2);
        assert!((two - 0.155).abs() < 1e-9);

        assert_eq!(detection_chance(&rules, 0.5, 40.0, 0.0, 1), 0.05);
        assert_eq!(detection_chance(&rules, 1.0, 0.0, 500.0, 1), 0.95);
        assert_eq!(detection_chance(&rules, 1.0, 0.0, 10.0, 0), 0.0);
    }

    #[test]
    fn inverted_bounds_do_not_panic() {
        let rules = TheftRules {
            min_chance: 0.9,
            max_chance: 0.1,
            ..TheftRules::default()
        };
        assert_eq!(detection_chance(&rules, 0.8, 1.0, 10.0, 1), 0.1);
        let nan = TheftRules {
            min_chance: f64::NAN,
            ..TheftRules::default()
        };
        assert!((detection_chance(&nan, 0.8, 1.0, 10.0, 1) - 0.31).abs() < 1e-9);
    }

    #[test]
    fn first_successful_watcher_catches() {
        let watchers = staff(3);
        let rules = TheftRules::default();
        assert_eq!(
            roll_detection(&mut FixedRng(0), &watchers, &rules, 0.0),
            Some(watchers[0].npc)
        );
        assert_eq!(roll_detection(&mut FixedRng(u64::MAX), &watchers, &rules, 0.0), None);
        assert_eq!(roll_detection(&mut FixedRng(0), &[], &rules, 0.0), None);
    }
}
