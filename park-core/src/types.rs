use slotmap::new_key_type;
use wasm_bindgen::prelude::*;

// ============================================================================
// IDs - generational keys into the owning registries
// ============================================================================

new_key_type! {
    pub struct AreaKey;
    pub struct ItemId;
    pub struct NpcId;
}

/// Trait for converting SlotMap keys to u64 for the WASM boundary
pub trait KeyToU64 {
    fn to_u64(self) -> u64;
}

impl KeyToU64 for AreaKey {
    fn to_u64(self) -> u64 {
        self.0.as_ffi()
    }
}

impl KeyToU64 for ItemId {
    fn to_u64(self) -> u64 {
        self.0.as_ffi()
    }
}

impl KeyToU64 for NpcId {
    fn to_u64(self) -> u64 {
        self.0.as_ffi()
    }
}

pub type Money = f64;

#[wasm_bindgen(typescript_custom_section)]
const TS_MONEY: &str = "export type Money = number;";

/// Lower-cased, underscore-joined form of a display name, used to derive ids.
///
/// `"Main Street U.S.A."` becomes `main_street_usa`.
pub fn slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| *c != '.' && *c != '\'')
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// Banker's rounding: halves go to the even neighbour.
pub fn round_price(value: f64) -> Money {
    value.round_ties_even()
}
