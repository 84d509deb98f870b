use crate::events::GameEvent;
use crate::world::World;

pub const DEFAULT_RIDE_RELIEF: f64 = 5.0;

/// Attraction state carried by ride areas (usually a queue).
#[derive(Debug, Clone, PartialEq)]
pub struct Ride {
    pub ride_type: String,
    pub operational: bool,
    /// Suspicion shed by riding, looking like a regular tourist.
    pub suspicion_reduction: f64,
}

impl Ride {
    pub fn new(ride_type: impl Into<String>) -> Self {
        Self {
            ride_type: ride_type.into(),
            operational: true,
            suspicion_reduction: DEFAULT_RIDE_RELIEF,
        }
    }

    pub fn with_relief(mut self, amount: f64) -> Self {
        self.suspicion_reduction = amount;
        self
    }

    pub fn closed(mut self) -> Self {
        self.operational = false;
        self
    }
}

impl World {
    /// Ride the attraction the player is standing in.
    ///
    /// `name`, when given, must match the current ride; from a land it is
    /// used to point the player at the right entrance.
    pub fn ride(&mut self, name: Option<&str>) -> Vec<GameEvent> {
        let Some(area) = self.player.current_area.and_then(|k| self.areas.get(k)) else {
            return vec![GameEvent::NotInArea];
        };

        let Some(ride) = &area.ride else {
            let mut events = vec![GameEvent::NotARide];
            if let Some(query) = name {
                let suggestion = area
                    .children
                    .iter()
                    .filter_map(|k| self.areas.get(*k))
                    .find(|child| child.ride.is_some() && child.name.eq_ignore_ascii_case(query));
                if let Some(child) = suggestion {
                    events.push(GameEvent::TryEntering {
                        area: child.name.clone(),
                    });
                }
            }
            return events;
        };

        if let Some(query) = name.filter(|q| !q.eq_ignore_ascii_case(&area.name)) {
            return vec![GameEvent::WrongRide {
                current: area.name.clone(),
                requested: query.to_string(),
            }];
        }
        if !ride.operational {
            return vec![GameEvent::RideClosed {
                ride: area.name.clone(),
            }];
        }

        let ride_name = area.name.clone();
        let relief = ride.suspicion_reduction;
        let mut events = vec![GameEvent::Rode { ride: ride_name }];
        events.extend(self.relieve_suspicion(relief));
        events
    }
}
