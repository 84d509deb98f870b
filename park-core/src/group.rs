//! Relative layout of a cluster of areas.
//!
//! A group places its areas around a shared origin, optionally wires every
//! pair that sits edge to edge, and hands them to the registry in one call.

use crate::area::Area;
use crate::coordinates::Coordinate;
use crate::error::WorldError;
use crate::movement::Direction;
use crate::registry::AreaRegistry;
use crate::types::AreaKey;
use crate::world::World;

pub const DEFAULT_SPACING: i32 = 20;

/// How far apart two edges may be and still count as touching.
pub const ADJACENCY_TOLERANCE: i32 = 5;

/// Where an area sits relative to its group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// At the group origin.
    Origin,
    Offset { dx: i32, dy: i32 },
    /// `distance` away from an area already in the group.
    From {
        area: String,
        direction: Direction,
        distance: i32,
    },
}

impl Layout {
    pub fn offset(dx: i32, dy: i32) -> Self {
        Layout::Offset { dx, dy }
    }

    pub fn beside(area: impl Into<String>, direction: Direction) -> Self {
        Layout::From {
            area: area.into(),
            direction,
            distance: DEFAULT_SPACING,
        }
    }

    pub fn at_distance(self, distance: i32) -> Self {
        match self {
            Layout::From { area, direction, .. } => Layout::From {
                area,
                direction,
                distance,
            },
            other => other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AreaGroup {
    pub name: String,
    pub origin: Coordinate,
    areas: Vec<(Area, Layout)>,
    links: Vec<(String, String, String)>,
    auto_connect: bool,
}

impl AreaGroup {
    pub fn new(name: impl Into<String>, origin: Coordinate) -> Self {
        Self {
            name: name.into(),
            origin,
            areas: Vec::new(),
            links: Vec::new(),
            auto_connect: false,
        }
    }

    /// Add `area`, setting its origin from `layout`. An area with the same
    /// id replaces the earlier one.
    pub fn add(&mut self, mut area: Area, layout: Layout) -> &mut Self {
        area.origin = self.resolve(&layout);
        match self.areas.iter_mut().find(|(a, _)| a.id == area.id) {
            Some(slot) => {
                #[cfg(feature = "instrument")]
                tracing::warn!(target: "registry", group = self.name.as_str(), id = area.id.as_str(), "overwriting area in group");
                *slot = (area, layout);
            }
            None => self.areas.push((area, layout)),
        }
        self
    }

    fn resolve(&self, layout: &Layout) -> Coordinate {
        match layout {
            Layout::Origin => self.origin,
            Layout::Offset { dx, dy } => Coordinate::new(self.origin.x + dx, self.origin.y + dy),
            Layout::From {
                area,
                direction,
                distance,
            } => match self.get(area) {
                Some(anchor) => {
                    let (ux, uy) = direction.delta();
                    Coordinate::new(anchor.origin.x + ux * distance, anchor.origin.y + uy * distance)
                }
                None => {
                    #[cfg(feature = "instrument")]
                    tracing::warn!(target: "registry", group = self.name.as_str(), anchor = area.as_str(), "anchor not in group");
                    self.origin
                }
            },
        }
    }

    /// Area in this group by id.
    pub fn get(&self, id: &str) -> Option<&Area> {
        self.areas.iter().map(|(a, _)| a).find(|a| a.id == id)
    }

    pub fn layout_of(&self, id: &str) -> Option<&Layout> {
        self.areas.iter().find(|(a, _)| a.id == id).map(|(_, l)| l)
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Link two group members by id once they are registered.
    pub fn connect(&mut self, from: &str, label: &str, to: &str) -> bool {
        if self.get(from).is_none() || self.get(to).is_none() {
            return false;
        }
        self.links
            .push((from.to_string(), label.to_string(), to.to_string()));
        true
    }

    /// Connect every pair of members whose edges touch.
    pub fn connect_adjacent(&mut self) -> &mut Self {
        self.auto_connect = true;
        self
    }

    /// Compass links between members sitting edge to edge, as
    /// `(from index, label, to index)`.
    fn adjacent_pairs(&self) -> Vec<(usize, &'static str, usize)> {
        let near = |a: i32, b: i32| (a - b).abs() < ADJACENCY_TOLERANCE;
        let mut pairs = Vec::new();
        for (i, (a, _)) in self.areas.iter().enumerate() {
            for (j, (b, _)) in self.areas.iter().enumerate() {
                if i == j {
                    continue;
                }
                let (ax, ay, bx, by) = (a.origin.x, a.origin.y, b.origin.x, b.origin.y);
                if near(ax + a.width, bx) && near(ay, by) {
                    pairs.push((i, "east", j));
                }
                if near(ax, bx + b.width) && near(ay, by) {
                    pairs.push((i, "west", j));
                }
                if near(ay + a.length, by) && near(ax, bx) {
                    pairs.push((i, "north", j));
                }
                if near(ay, by + b.length) && near(ax, bx) {
                    pairs.push((i, "south", j));
                }
            }
        }
        pairs
    }

    /// Register every member and wire the recorded links.
    /// Keys come back in insertion order.
    pub fn register(self, registry: &mut AreaRegistry) -> Result<Vec<AreaKey>, WorldError> {
        let adjacent: Vec<(usize, &'static str, usize)> = if self.auto_connect {
            self.adjacent_pairs()
        } else {
            Vec::new()
        };
        let ids: Vec<String> = self.areas.iter().map(|(a, _)| a.id.clone()).collect();
        let keys: Vec<AreaKey> = self
            .areas
            .into_iter()
            .map(|(area, _)| registry.add(area))
            .collect();

        for (i, label, j) in adjacent {
            if let Some(area) = registry.get_mut(keys[i]) {
                area.add_connection(label, keys[j]);
            }
        }
        for (from, label, to) in &self.links {
            let index = |id: &str| ids.iter().position(|known| known == id);
            if let (Some(i), Some(j)) = (index(from.as_str()), index(to.as_str())) {
                registry.connect_areas(keys[i], label, keys[j])?;
            }
        }
        Ok(keys)
    }
}

impl World {
    pub fn add_group(&mut self, group: AreaGroup) -> Result<Vec<AreaKey>, WorldError> {
        group.register(&mut self.areas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn land(name: &str, width: i32, length: i32) -> Area {
        Area::land(name, "").with_size(width, length)
    }

    #[test]
    fn layouts_resolve_against_the_group() {
        let mut group = AreaGroup::new("West Side", Coordinate::new(100, 0));
        group
            .add(land("Hub", 10, 10), Layout::Origin)
            .add(land("Dock", 10, 10), Layout::offset(0, -15))
            .add(land("Fort", 10, 10), Layout::beside("land_hub", Direction::East))
            .add(land("Camp", 10, 10), Layout::beside("land_hub", Direction::North).at_distance(12))
            .add(land("Lost", 10, 10), Layout::beside("land_nowhere", Direction::West));

        let origin = |id: &str| group.get(id).map(|a| a.origin);
        assert_eq!(origin("land_hub"), Some(Coordinate::new(100, 0)));
        assert_eq!(origin("land_dock"), Some(Coordinate::new(100, -15)));
        assert_eq!(origin("land_fort"), Some(Coordinate::new(120, 0)));
        assert_eq!(origin("land_camp"), Some(Coordinate::new(100, 12)));
        assert_eq!(origin("land_lost"), Some(Coordinate::new(100, 0)));
    }

    #[test]
    fn touching_members_are_connected_both_ways() {
        let mut group = AreaGroup::new("Strip", Coordinate::default());
        group
            .add(land("A", 10, 10), Layout::Origin)
            .add(land("B", 10, 10), Layout::offset(12, 2))
            .add(land("C", 10, 10), Layout::offset(0, 11))
            .add(land("Far", 10, 10), Layout::offset(60, 60))
            .connect_adjacent();

        let mut registry = AreaRegistry::new();
        let keys = group.register(&mut registry).expect("fresh registry");
        let (a, b, c, far) = (keys[0], keys[1], keys[2], keys[3]);
        let get = |k| registry.get(k).expect("registered");

        assert_eq!(get(a).connection("east"), Some(b));
        assert_eq!(get(b).connection("west"), Some(a));
        assert_eq!(get(a).connection("north"), Some(c));
        assert_eq!(get(c).connection("south"), Some(a));
        assert!(get(far).connections.is_empty());
    }

    #[test]
    fn explicit_links_are_wired_on_register() {
        let mut group = AreaGroup::new("Pair", Coordinate::default());
        group
            .add(land("Left", 5, 5), Layout::Origin)
            .add(land("Right", 5, 5), Layout::offset(40, 0));
        assert!(group.connect("land_left", "east", "land_right"));
        assert!(!group.connect("land_left", "east", "land_missing"));

        let mut world = World::seeded(2);
        let keys = world.add_group(group).expect("fresh world");
        assert_eq!(world.area(keys[1]).and_then(|a| a.connection("west")), Some(keys[0]));
    }

    #[test]
    fn same_id_replaces_the_member() {
        let mut group = AreaGroup::new("Dupes", Coordinate::default());
        group
            .add(land("Twin", 5, 5), Layout::Origin)
            .add(land("Twin", 8, 8), Layout::offset(1, 1));
        assert_eq!(group.len(), 1);
        assert_eq!(group.get("land_twin").map(|a| a.width), Some(8));
        assert_eq!(group.layout_of("land_twin"), Some(&Layout::offset(1, 1)));
    }
}
