//! Structured results of player actions and turns.
//!
//! The simulation never prints. Each operation hands back `GameEvent`s and
//! the front end decides how to show them; `Display` is the plain-text
//! rendering used by the browser facade.

use std::fmt;

use serde::Serialize;
use tsify_next::Tsify;

use crate::coordinates::Cell;
use crate::types::Money;

#[derive(Debug, Clone, PartialEq, Serialize, Tsify)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameEvent {
    // === Movement ===
    Moved { direction: String, cell: Cell },
    Arrived { direction: String, area: String },
    SteppedBack { from: String, area: String },
    PortalUsed { area: String },
    EnteredArea { area: String, description: String },
    CannotMove { direction: String },
    UnknownDirection { label: String },
    CannotEnter { label: String },
    NotInArea,
    AreaNotFound { query: String },
    Rejected { reason: String },

    // === Items ===
    PickedUp { item: String },
    TookUnpaid { item: String },
    CannotPickUp { item: String },
    NothingToPickUp { query: String },
    Dropped { item: String },
    NotCarrying { query: String },

    // === Shops ===
    NotAShop,
    Bought { item: String, price: Money, money: Money },
    PaidForTaken { item: String, price: Money, money: Money },
    CannotAffordTaken { item: String, price: Money },
    NotSold { query: String },
    OutOfStock { query: String },
    CannotAfford { price: Money },
    CreationFailed { item: String },
    Sold { item: String, price: Money, money: Money },
    Fenced { item: String, price: Money, money: Money },
    FenceRefused { item: String },
    StolenGoodsRefused { item: String },
    NotBuying { query: String },
    EnoughStock { query: String },

    // === Theft ===
    LeavingWithGoods { shop: String, count: usize },
    Unwatched,
    Caught { staff: String, confiscated: Vec<String> },
    Escaped,

    // === Suspicion ===
    SuspicionDecreased { amount: f64 },

    // === Rides ===
    NotARide,
    TryEntering { area: String },
    WrongRide { current: String, requested: String },
    RideClosed { ride: String },
    Rode { ride: String },

    // === NPCs ===
    NpcMoved { npc: String },
    NpcSignature { npc: String, phrase: String },
    NpcWhisper { npc: String, greeting: String },
}

impl GameEvent {
    /// True for events produced by NPC autonomy rather than the player.
    pub fn is_npc_event(&self) -> bool {
        matches!(
            self,
            GameEvent::NpcMoved { .. }
                | GameEvent::NpcSignature { .. }
                | GameEvent::NpcWhisper { .. }
        )
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use GameEvent::*;
        match self {
            Moved { direction, .. } => write!(f, "You move {direction}."),
            Arrived { direction, area } => write!(f, "You head {direction} and arrive in {area}."),
            SteppedBack { from, area } => {
                write!(f, "You find an exit from {from} and step back into {area}.")
            }
            PortalUsed { area } => write!(f, "You step through an opening into {area}..."),
            EnteredArea { area, description } => write!(f, "You are now in {area}. {description}"),
            CannotMove { .. } => write!(f, "You can't go that way."),
            UnknownDirection { label } => write!(f, "Unknown direction: {label}."),
            CannotEnter { label } => write!(f, "You can't enter '{label}' from here."),
            NotInArea => write!(f, "You are not in any area."),
            AreaNotFound { query } => write!(f, "No place called '{query}'."),
            Rejected { reason } => write!(f, "{reason}"),

            PickedUp { item } => write!(f, "You got {item}."),
            TookUnpaid { item } => write!(f, "You discreetly take {item}."),
            CannotPickUp { item } => write!(f, "You can't pick up {item}."),
            NothingToPickUp { query } => write!(f, "You don't see '{query}' here."),
            Dropped { item } => write!(f, "You dropped {item}."),
            NotCarrying { query } => write!(f, "You don't have '{query}'."),

            NotAShop => write!(f, "Nothing is for sale here."),
            Bought { item, price, money } => {
                write!(f, "You bought {item} for ${price:.2}. Money: ${money:.2}")
            }
            PaidForTaken { item, price, money } => {
                write!(f, "You pay for the {item} you were holding. Cost: ${price:.2}. Money: ${money:.2}")
            }
            CannotAffordTaken { item, price } => {
                write!(f, "You can't afford the ${price:.2} for {item}.")
            }
            NotSold { query } => write!(f, "The shop doesn't have '{query}'."),
            OutOfStock { query } => write!(f, "'{query}' is out of stock."),
            CannotAfford { price } => write!(f, "You can't afford that. It costs ${price:.2}."),
            CreationFailed { item } => write!(f, "Something went wrong creating {item}."),
            Sold { item, price, money } => {
                write!(f, "You sold {item} for ${price:.2}. Money: ${money:.2}")
            }
            Fenced { item, price, money } => {
                write!(f, "You offload the {item} to the fence for ${price:.2}. Money: ${money:.2}")
            }
            FenceRefused { item } => write!(f, "The fence only deals in acquired goods, not your {item}."),
            StolenGoodsRefused { item } => {
                write!(f, "The cashier eyes your {item}. 'Is this... paid for?'")
            }
            NotBuying { query } => write!(f, "This shop isn't buying '{query}'."),
            EnoughStock { query } => write!(f, "The shop has enough '{query}' for now."),

            LeavingWithGoods { shop, count } => {
                write!(f, "You attempt to leave {shop} with {count} unpaid item(s)...")
            }
            Unwatched => write!(f, "Nobody from the staff is around. You slip out with the goods!"),
            Caught { staff, confiscated } => write!(
                f,
                "{staff} stops you: 'You haven't paid for those!' Confiscated: {}.",
                confiscated.join(", ")
            ),
            Escaped => write!(f, "You leave without being noticed."),

            SuspicionDecreased { amount } => {
                write!(f, "(Your suspicion rating decreased by {amount}.)")
            }

            NotARide => write!(f, "You need to be in a ride area to ride."),
            TryEntering { area } => write!(f, "Try 'enter {area}' first."),
            WrongRide { current, .. } => {
                write!(f, "You are in {current}. To ride it, just type 'ride'.")
            }
            RideClosed { ride } => write!(f, "{ride} is not operating right now."),
            Rode { ride } => write!(f, "You ride {ride} and feel more like a regular tourist."),

            NpcMoved { npc } => write!(f, "{npc} moves."),
            NpcSignature { npc, phrase } => write!(f, "{npc} {phrase}."),
            NpcWhisper { npc, greeting } => write!(f, "{npc} whispers: '{greeting}'"),
        }
    }
}

/// Render a batch of events as lines of text.
pub fn render(events: &[GameEvent]) -> Vec<String> {
    events.iter().map(ToString::to_string).collect()
}
