//! Player movement and area transitions.
//!
//! A compass step first tries to move one cell inside the current area;
//! stepping onto a portal jumps to its target. Stepping off the edge follows
//! a connection with the same label when there is one. Any other label is
//! looked up in the connections only.

use crate::coordinates::Cell;
use crate::events::GameEvent;
use crate::types::AreaKey;
use crate::world::World;

/// Grid directions. `up`/`down` exist only as connection labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Accepts full names and single-letter abbreviations.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "n" | "north" => Some(Direction::North),
            "s" | "south" => Some(Direction::South),
            "e" | "east" => Some(Direction::East),
            "w" | "west" => Some(Direction::West),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }

    /// Grid offset; north is +y.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }
}

impl World {
    /// Walk one step or follow a labelled connection.
    pub fn move_player(&mut self, label: &str) -> Vec<GameEvent> {
        let Some(area) = self.player_area() else {
            return vec![GameEvent::NotInArea];
        };
        let label = label.trim().to_lowercase();

        let Some(direction) = Direction::parse(&label) else {
            return match area.connection(&label) {
                Some(target) => self.set_player_area(Some(target), None),
                None => vec![GameEvent::UnknownDirection { label }],
            };
        };

        let (dx, dy) = direction.delta();
        let next = area.to_local(self.player.coordinates).offset(dx, dy);

        if area.is_valid_cell(next) {
            let portal = area.portal_at(next);
            let parent = area.parent;
            let here = area.name.clone();
            let global = area.to_global(next);
            self.player.coordinates = global;
            let mut events = vec![GameEvent::Moved {
                direction: direction.label().to_string(),
                cell: next,
            }];

            if let Some(portal) = portal {
                let target_name = self.area_name(portal.target);
                events.push(if Some(portal.target) == parent {
                    GameEvent::SteppedBack {
                        from: here,
                        area: target_name,
                    }
                } else {
                    GameEvent::PortalUsed { area: target_name }
                });

                #[cfg(feature = "instrument")]
                tracing::info!(target: "transition", via = "portal", x = next.x, y = next.y);

                events.extend(self.set_player_area(Some(portal.target), portal.target_cell));
            }
            return events;
        }

        match area.connection(direction.label()) {
            Some(target) => {
                let mut events = vec![GameEvent::Arrived {
                    direction: direction.label().to_string(),
                    area: self.area_name(target),
                }];
                events.extend(self.set_player_area(Some(target), None));
                events
            }
            None => vec![GameEvent::CannotMove {
                direction: direction.label().to_string(),
            }],
        }
    }

    /// Step through a named connection such as `enter emporium`.
    pub fn enter(&mut self, label: &str) -> Vec<GameEvent> {
        let Some(area) = self.player_area() else {
            return vec![GameEvent::NotInArea];
        };
        let label = label.trim().to_lowercase();
        let candidates = [label.clone(), format!("enter {label}")];
        match candidates.iter().find_map(|l| area.connection(l)) {
            Some(target) => self.set_player_area(Some(target), None),
            None => vec![GameEvent::CannotEnter { label }],
        }
    }

    /// Jump straight to an area by id or name.
    pub fn teleport(&mut self, query: &str, cell: Option<Cell>) -> Vec<GameEvent> {
        match self.areas.find(query) {
            Some(target) => self.set_player_area(Some(target), cell),
            None => vec![GameEvent::AreaNotFound {
                query: query.trim().to_string(),
            }],
        }
    }

    /// Put the player in `target` at `cell` (center when `None`, clamped).
    ///
    /// Leaving a shop for anywhere but itself or its parent runs the theft
    /// check from the cell the player left by. A missing or stale target is
    /// rejected and nothing changes.
    pub fn set_player_area(&mut self, target: Option<AreaKey>, cell: Option<Cell>) -> Vec<GameEvent> {
        let Some(area) = target.and_then(|k| self.areas.get(k)) else {
            #[cfg(feature = "instrument")]
            tracing::warn!(target: "transition", "rejected move to a missing area");
            return vec![GameEvent::Rejected {
                reason: "There is nowhere to go that way.".to_string(),
            }];
        };
        let target = area.key;
        let cell = area.clamp_cell(cell.unwrap_or_else(|| area.default_cell()));
        let arrival = area.to_global(cell);
        let entered = GameEvent::EnteredArea {
            area: area.name.clone(),
            description: area.description.clone(),
        };
        #[cfg(feature = "instrument")]
        let target_id = area.id.clone();

        let leaving = self.player.current_area;
        let exit_cell = self.player_cell();

        self.player.current_area = Some(target);
        self.player.coordinates = arrival;

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "transition",
            via = "area",
            to = target_id.as_str(),
            x = cell.x,
            y = cell.y,
        );

        let mut events = Vec::new();
        if let (Some(left), Some(exit_cell)) = (leaving, exit_cell) {
            if self.is_shop_exit(left, target) {
                let (_, theft_events) = self.check_for_theft(left, exit_cell);
                events.extend(theft_events);
            }
        }
        events.push(entered);
        events
    }

    /// Leaving shop `from` for `to` counts as walking out with the goods.
    fn is_shop_exit(&self, from: AreaKey, to: AreaKey) -> bool {
        let Some(shop) = self.areas.get(from).filter(|a| a.is_shop()) else {
            return false;
        };
        to != from && Some(to) != shop.parent
    }

    pub(crate) fn area_name(&self, key: AreaKey) -> String {
        self.areas
            .get(key)
            .map(|a| a.name.clone())
            .unwrap_or_default()
    }
}
