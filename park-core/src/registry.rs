//! Owner of every area. Lookups go by string id, display name, or key.

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::area::Area;
use crate::error::{ResolutionError, WorldError};
use crate::types::AreaKey;

/// Opposite of a canonical label. Only these get an automatic way back.
pub fn reverse_label(label: &str) -> Option<&'static str> {
    match label {
        "north" => Some("south"),
        "south" => Some("north"),
        "east" => Some("west"),
        "west" => Some("east"),
        "up" => Some("down"),
        "down" => Some("up"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    New(AreaKey),
    /// An area with the same id was already registered and has been overwritten.
    Replaced(AreaKey),
}

impl Registration {
    pub fn key(self) -> AreaKey {
        match self {
            Registration::New(key) | Registration::Replaced(key) => key,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AreaRegistry {
    areas: SlotMap<AreaKey, Area>,
    ids: HashMap<String, AreaKey>,
    order: Vec<AreaKey>,
}

impl AreaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, area: Area) -> AreaKey {
        self.register(area).key()
    }

    pub fn register(&mut self, mut area: Area) -> Registration {
        if let Some(&key) = self.ids.get(&area.id) {
            #[cfg(feature = "instrument")]
            tracing::warn!(target: "registry", id = area.id.as_str(), "area overwritten");
            area.key = key;
            if let Some(slot) = self.areas.get_mut(key) {
                *slot = area;
            }
            return Registration::Replaced(key);
        }

        let id = area.id.clone();
        let key = self.areas.insert_with_key(|key| {
            area.key = key;
            area
        });
        self.ids.insert(id, key);
        self.order.push(key);
        Registration::New(key)
    }

    pub fn get(&self, key: AreaKey) -> Option<&Area> {
        self.areas.get(key)
    }

    pub fn get_mut(&mut self, key: AreaKey) -> Option<&mut Area> {
        self.areas.get_mut(key)
    }

    pub fn by_id(&self, id: &str) -> Option<&Area> {
        self.ids.get(id).and_then(|k| self.areas.get(*k))
    }

    /// Exact id first, then a case-insensitive name in registration order.
    pub fn find(&self, id_or_name: &str) -> Option<AreaKey> {
        if let Some(&key) = self.ids.get(id_or_name) {
            return Some(key);
        }
        let needle = id_or_name.trim().to_lowercase();
        self.iter()
            .find(|area| area.name.to_lowercase() == needle)
            .map(|area| area.key)
    }

    pub fn find_by_partial_name(&self, term: &str) -> Vec<AreaKey> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.iter()
            .filter(|area| area.name.to_lowercase().contains(&needle))
            .map(|area| area.key)
            .collect()
    }

    /// Resolve both ends and link them; `false` if either is unknown.
    pub fn connect(&mut self, from: &str, label: &str, to: &str) -> bool {
        match (self.find(from), self.find(to)) {
            (Some(a), Some(b)) => self.connect_areas(a, label, b).is_ok(),
            _ => {
                #[cfg(feature = "instrument")]
                tracing::warn!(target: "registry", from, to, "cannot connect unknown areas");
                false
            }
        }
    }

    /// Link `from --label--> to`; canonical labels also get the reverse link
    /// on `to` unless it already has one.
    pub fn connect_areas(
        &mut self,
        from: AreaKey,
        label: &str,
        to: AreaKey,
    ) -> Result<(), WorldError> {
        if !self.areas.contains_key(from) || !self.areas.contains_key(to) {
            return Err(WorldError::InvariantViolation(format!(
                "cannot connect '{label}': endpoint is not a registered area"
            )));
        }
        let label = label.trim().to_lowercase();

        if let Some(area) = self.areas.get_mut(from) {
            area.add_connection(&label, to);
        }
        if let Some(reverse) = reverse_label(&label) {
            if let Some(target) = self.areas.get_mut(to) {
                if target.connection(reverse).is_none() {
                    target.add_connection(reverse, from);
                }
            }
        }
        Ok(())
    }

    pub fn add_sub_area(&mut self, parent: AreaKey, child: AreaKey) -> Result<(), WorldError> {
        if parent == child {
            return Err(WorldError::InvariantViolation(
                "an area cannot contain itself".to_string(),
            ));
        }
        if !self.areas.contains_key(child) {
            return Err(ResolutionError::UnknownArea(format!("{child:?}")).into());
        }
        let Some(p) = self.areas.get_mut(parent) else {
            return Err(ResolutionError::UnknownArea(format!("{parent:?}")).into());
        };
        if !p.children.contains(&child) {
            p.children.push(child);
        }
        if let Some(c) = self.areas.get_mut(child) {
            c.parent = Some(parent);
        }
        Ok(())
    }

    /// The top-level area containing `key` (itself if it has no parent).
    pub fn root_of(&self, key: AreaKey) -> Option<&Area> {
        let mut current = self.areas.get(key)?;
        // bounded walk guards against accidental parent cycles
        for _ in 0..self.areas.len() {
            match current.parent.and_then(|p| self.areas.get(p)) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        Some(current)
    }

    /// Areas in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Area> {
        self.order.iter().filter_map(|k| self.areas.get(*k))
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> (AreaRegistry, AreaKey, AreaKey) {
        let mut reg = AreaRegistry::new();
        let a = reg.add(Area::land("Main Street", "town square"));
        let b = reg.add(Area::land("Fantasyland", "castle"));
        (reg, a, b)
    }

    #[test]
    fn compass_links_are_reciprocal() {
        let (mut reg, a, b) = registry();
        reg.connect_areas(a, "north", b).expect("both registered");
        assert_eq!(reg.get(a).and_then(|x| x.connection("north")), Some(b));
        assert_eq!(reg.get(b).and_then(|x| x.connection("south")), Some(a));
    }

    #[test]
    fn existing_reverse_link_is_kept() {
        let (mut reg, a, b) = registry();
        let c = reg.add(Area::new("Side Path", ""));
        reg.connect_areas(b, "south", c).expect("registered");
        reg.connect_areas(a, "north", b).expect("registered");
        assert_eq!(reg.get(b).and_then(|x| x.connection("south")), Some(c));
    }

    #[test]
    fn free_form_labels_are_one_way() {
        let (mut reg, a, b) = registry();
        reg.connect_areas(a, "enter shop", b).expect("registered");
        assert_eq!(reg.get(a).and_then(|x| x.connection("enter shop")), Some(b));
        assert!(reg.get(b).map(|x| x.connections.is_empty()).unwrap_or(false));
    }

    #[test]
    fn connect_by_name_reports_unknown_endpoints() {
        let (mut reg, _, _) = registry();
        assert!(reg.connect("land_main_street", "west", "fantasyland"));
        assert!(!reg.connect("land_main_street", "east", "Tomorrowland"));
    }

    #[test]
    fn stale_key_is_an_invariant_violation() {
        let (mut reg, a, _) = registry();
        let mut other = AreaRegistry::new();
        other.add(Area::new("x", ""));
        other.add(Area::new("y", ""));
        let stranger = other.add(Area::new("z", ""));
        let result = reg.connect_areas(a, "north", stranger);
        assert!(matches!(result, Err(WorldError::InvariantViolation(_))));
        assert!(reg.get(a).map(|x| x.connections.is_empty()).unwrap_or(false));
    }

    #[test]
    fn reregistering_replaces_in_place() {
        let (mut reg, a, _) = registry();
        let again = reg.register(Area::land("Main Street", "rebuilt"));
        assert_eq!(again, Registration::Replaced(a));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(a).map(|x| x.description.as_str()), Some("rebuilt"));
        assert_eq!(reg.iter().count(), 2);
    }

    #[test]
    fn find_prefers_id_then_case_insensitive_name() {
        let (reg, a, b) = registry();
        assert_eq!(reg.find("land_main_street"), Some(a));
        assert_eq!(reg.find("FANTASYLAND"), Some(b));
        assert_eq!(reg.find("Adventureland"), None);
        assert_eq!(reg.find_by_partial_name("land"), vec![b]);
        assert!(reg.find_by_partial_name("  ").is_empty());
    }

    #[test]
    fn sub_areas_link_both_ways() {
        let (mut reg, a, _) = registry();
        let shop = reg.add(Area::shop("Emporium", ""));
        reg.add_sub_area(a, shop).expect("registered");
        reg.add_sub_area(a, shop).expect("idempotent");
        assert_eq!(reg.get(a).map(|x| x.children.clone()), Some(vec![shop]));
        assert_eq!(reg.get(shop).and_then(|x| x.parent), Some(a));
        assert_eq!(reg.root_of(shop).map(|x| x.key), Some(a));
        assert!(matches!(
            reg.add_sub_area(a, a),
            Err(WorldError::InvariantViolation(_))
        ));
    }
}
