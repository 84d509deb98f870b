//! Tunable rules. Defaults reproduce the stock game; JSON overrides are
//! partial, anything missing keeps its default.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Money;

/// Inclusive range of turns an NPC waits after acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownRange {
    pub min: u32,
    pub max: u32,
}

impl CooldownRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Constants of the shop-exit detection roll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TheftRules {
    pub suspicion_per_item: f64,
    pub caught_penalty: f64,
    pub base_chance: f64,
    pub alertness_weight: f64,
    pub distance_penalty: f64,
    pub suspicion_weight: f64,
    pub min_chance: f64,
    pub max_chance: f64,
}

impl Default for TheftRules {
    fn default() -> Self {
        Self {
            suspicion_per_item: 10.0,
            caught_penalty: 20.0,
            base_chance: 0.1,
            alertness_weight: 0.2,
            distance_penalty: 0.05,
            suspicion_weight: 0.01,
            min_chance: 0.05,
            max_chance: 0.95,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub wander_chance: f64,
    pub wander_cooldown: CooldownRange,
    pub signature_chance: f64,
    pub signature_cooldown: CooldownRange,
    pub greeting_chance: f64,
    pub visibility_radius: f64,
    pub informant_radius: f64,

    pub suspicion_decay: f64,
    pub theft: TheftRules,
    /// Added when an item is taken off a shop shelf without paying.
    pub take_suspicion: f64,
    /// Relief for paying for something already taken.
    pub settle_relief: f64,
    pub purchase_relief: f64,
    pub fence_relief: f64,
    /// Added when trying to sell stolen goods to a legitimate shop.
    pub stolen_sale_suspicion: f64,

    pub starting_money: Money,
    pub seed: Option<u64>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            wander_chance: 0.3,
            wander_cooldown: CooldownRange::new(2, 5),
            signature_chance: 0.2,
            signature_cooldown: CooldownRange::new(3, 6),
            greeting_chance: 0.2,
            visibility_radius: 10.0,
            informant_radius: 5.0,
            suspicion_decay: 0.5,
            theft: TheftRules::default(),
            take_suspicion: 5.0,
            settle_relief: 5.0,
            purchase_relief: 1.0,
            fence_relief: 2.0,
            stolen_sale_suspicion: 15.0,
            starting_money: 50.0,
            seed: None,
        }
    }
}

impl RulesConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let rules: RulesConfig = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, range) in [
            ("wander_cooldown", self.wander_cooldown),
            ("signature_cooldown", self.signature_cooldown),
        ] {
            if range.min > range.max {
                return Err(ConfigError::Range {
                    name,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        let (min, max) = (self.theft.min_chance, self.theft.max_chance);
        if !(min.is_finite() && max.is_finite() && min <= max) {
            return Err(ConfigError::ChanceBounds { min, max });
        }
        Ok(())
    }
}
