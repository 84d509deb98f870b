//! The text command vocabulary and the one-command-per-turn game loop.

use rand::seq::IndexedRandom;
use serde::Serialize;
use tsify_next::Tsify;

use crate::coordinates::Cell;
use crate::error::CommandError;
use crate::events::{GameEvent, render};
use crate::look::{PlaceMatch, Position, Surroundings};
use crate::movement::Direction;
use crate::trade::InventoryReport;
use crate::turn::TurnReport;
use crate::world::World;

/// Shown when a turn passes with nothing else to report.
pub const AMBIENT_LINES: [&str; 4] = [
    "The magical air of Disneyland hums around you.",
    "You hear the distant laughter of children.",
    "A gentle breeze rustles the leaves on a nearby tree.",
    "Time passes peacefully.",
];

pub const HELP: &[&str] = &[
    "Available commands:",
    "  n, s, e, w (or north, south, east, west) - Move",
    "  enter <place_name> - Enter a shop or ride queue from a Land",
    "  look (l)          - Look around the area",
    "  inventory (i, bag)- Check your bag and money",
    "  get <item_name>   - Pick up an item",
    "  drop <item_name>  - Drop an item",
    "  buy <item_name>   - Buy an item from a shop",
    "  sell <item_name>  - Sell an item to a shop",
    "  ride              - Experience the ride you are currently in (e.g., a ride queue)",
    "  teleport (tp) <area_name> [x] [y] - Fast travel",
    "  where <place_name> - Find the global coordinates of a place",
    "  whereami          - Show your current location details",
    "  quit (exit)       - Exit the game",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Empty input; the turn still passes.
    Wait,
    Move(String),
    Enter(String),
    Look,
    Inventory,
    Get(String),
    Drop(String),
    Buy(String),
    Sell(String),
    Ride(Option<String>),
    Teleport { area: String, cell: Option<Cell> },
    WhereAmI,
    Where(String),
    Help,
    Quit,
}

impl Command {
    pub fn parse(input: &str) -> Result<Self, CommandError> {
        let lowered = input.trim().to_lowercase();
        let mut words = lowered.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(Command::Wait);
        };
        let args: Vec<&str> = words.collect();
        let rest = args.join(" ");

        let required = |usage: &'static str| {
            if rest.is_empty() {
                Err(CommandError::MissingArgument {
                    verb: verb.to_string(),
                    usage,
                })
            } else {
                Ok(rest.clone())
            }
        };

        let command = match verb {
            "n" | "north" | "s" | "south" | "e" | "east" | "w" | "west" => {
                let direction = Direction::parse(verb).map_or(verb, |d| d.label());
                Command::Move(direction.to_string())
            }
            "enter" if !rest.is_empty() => Command::Enter(rest.clone()),
            "look" | "l" => Command::Look,
            "inventory" | "i" | "bag" => Command::Inventory,
            "get" | "take" | "pickup" => Command::Get(required("Pickup what? (e.g., get mickey ears)")?),
            "drop" => Command::Drop(required("Drop what?")?),
            "buy" => Command::Buy(required("Buy what? (e.g., buy churro)")?),
            "sell" => Command::Sell(required("Sell what? (e.g., sell lost map)")?),
            "ride" => Command::Ride((!rest.is_empty()).then(|| rest.clone())),
            "teleport" | "tp" => {
                required("Teleport where? Usage: tp <area_name> [x] [y]")?;
                teleport(&args)
            }
            "whereami" => Command::WhereAmI,
            "where" => Command::Where(required(
                "Where what? Please specify what you are looking for (e.g., where Jungle Cruise).",
            )?),
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => {
                return Err(CommandError::Unknown {
                    input: input.trim().to_string(),
                });
            }
        };
        Ok(command)
    }

    /// Commands outside the fiction do not cost a turn.
    pub fn passes_turn(&self) -> bool {
        !matches!(self, Command::Help | Command::Quit)
    }
}

/// `tp <area name> [x y]`: a trailing pair of numbers is the target cell.
fn teleport(args: &[&str]) -> Command {
    if let [name @ .., x, y] = args {
        if let (Ok(x), Ok(y), false) = (x.parse::<u32>(), y.parse::<u32>(), name.is_empty()) {
            return Command::Teleport {
                area: name.join(" "),
                cell: Some(Cell::new(x as i32, y as i32)),
            };
        }
    }
    Command::Teleport {
        area: args.join(" "),
        cell: None,
    }
}

/// What a command produced, before the turn advanced.
#[derive(Debug, Clone, PartialEq, Serialize, Tsify)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Response {
    Events(Vec<GameEvent>),
    Look(Option<Surroundings>),
    Inventory(InventoryReport),
    Position(Option<Position>),
    Places { query: String, matches: Vec<PlaceMatch> },
    Help,
    Quit,
    Invalid(CommandError),
}

impl Response {
    pub fn lines(&self) -> Vec<String> {
        match self {
            Response::Events(events) => render(events),
            Response::Look(Some(view)) => view.to_string().lines().map(str::to_string).collect(),
            Response::Look(None) => vec!["You are floating in a magical void...".to_string()],
            Response::Inventory(report) => report.to_string().lines().map(str::to_string).collect(),
            Response::Position(Some(at)) => vec![format!(
                "You are in {} at grid {}. Global: {}",
                at.area, at.cell, at.global
            )],
            Response::Position(None) => vec!["You are nowhere specific.".to_string()],
            Response::Places { query, matches } if matches.is_empty() => {
                vec![format!("No place matching '{query}' was found.")]
            }
            Response::Places { query, matches } => std::iter::once(format!("Locations matching '{query}':"))
                .chain(matches.iter().map(|m| {
                    format!("  - {}: Starts around global coordinates {}.", m.name, m.origin)
                }))
                .collect(),
            Response::Help => HELP.iter().map(|l| l.to_string()).collect(),
            Response::Quit => vec!["Thanks for visiting Disneyland! Come back soon!".to_string()],
            Response::Invalid(err) => vec![err.to_string()],
        }
    }
}

/// One round of the game loop.
#[derive(Debug, Clone, PartialEq, Serialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct Exchange {
    pub response: Response,
    pub turn: Option<TurnReport>,
    /// Flavor text for a turn in which nothing else happened.
    pub ambient: Option<String>,
}

impl Exchange {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = self.response.lines();
        if let Some(turn) = &self.turn {
            lines.extend(render(&turn.events));
        }
        lines.extend(self.ambient.clone());
        lines
    }
}

impl World {
    /// Resolve one player command without advancing time.
    pub fn apply(&mut self, command: Command) -> Response {
        match command {
            Command::Wait => Response::Events(Vec::new()),
            Command::Move(label) => Response::Events(self.move_player(&label)),
            Command::Enter(label) => Response::Events(self.enter(&label)),
            Command::Look => Response::Look(self.look()),
            Command::Inventory => Response::Inventory(self.inventory()),
            Command::Get(query) => Response::Events(self.pick_up(&query)),
            Command::Drop(query) => Response::Events(self.drop_item(&query)),
            Command::Buy(query) => Response::Events(self.buy(&query)),
            Command::Sell(query) => Response::Events(self.sell(&query)),
            Command::Ride(name) => Response::Events(self.ride(name.as_deref())),
            Command::Teleport { area, cell } => Response::Events(self.teleport(&area, cell)),
            Command::WhereAmI => Response::Position(self.where_am_i()),
            Command::Where(query) => Response::Places {
                matches: self.where_is(&query),
                query,
            },
            Command::Help => Response::Help,
            Command::Quit => Response::Quit,
        }
    }

    /// Parse and apply one line of input, then let the world move on.
    ///
    /// Misunderstood input still costs a turn; `help` and `quit` do not.
    pub fn execute(&mut self, input: &str) -> Exchange {
        let (response, passes) = match Command::parse(input) {
            Ok(command) => {
                let passes = command.passes_turn();
                (self.apply(command), passes)
            }
            Err(err) => (Response::Invalid(err), true),
        };
        if !passes {
            return Exchange {
                response,
                turn: None,
                ambient: None,
            };
        }

        let turn = self.advance_turn();
        let quiet = response.lines().is_empty() && turn.events.is_empty();
        let ambient = if quiet {
            AMBIENT_LINES.choose(self.rng()).map(|l| l.to_string())
        } else {
            None
        };
        Exchange {
            response,
            turn: Some(turn),
            ambient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::Area;

    #[test]
    fn parses_the_vocabulary() {
        assert_eq!(Command::parse("N"), Ok(Command::Move("north".into())));
        assert_eq!(Command::parse("  "), Ok(Command::Wait));
        assert_eq!(Command::parse("enter Jungle Cruise"), Ok(Command::Enter("jungle cruise".into())));
        assert_eq!(Command::parse("bag"), Ok(Command::Inventory));
        assert_eq!(Command::parse("take lost map"), Ok(Command::Get("lost map".into())));
        assert_eq!(Command::parse("ride"), Ok(Command::Ride(None)));
        assert_eq!(
            Command::parse("tp main street 3 1"),
            Ok(Command::Teleport {
                area: "main street".into(),
                cell: Some(Cell::new(3, 1)),
            })
        );
        assert_eq!(
            Command::parse("tp 3 1"),
            Ok(Command::Teleport {
                area: "3 1".into(),
                cell: None,
            })
        );
    }

    #[test]
    fn rejects_incomplete_commands() {
        assert!(matches!(
            Command::parse("buy"),
            Err(CommandError::MissingArgument { usage, .. }) if usage.starts_with("Buy what?")
        ));
        assert!(matches!(Command::parse("enter"), Err(CommandError::Unknown { .. })));
        assert!(matches!(Command::parse("dance"), Err(CommandError::Unknown { .. })));
    }

    #[test]
    fn help_costs_no_turn() {
        let mut world = World::seeded(8);
        let plaza = world.add_area(Area::new("Plaza", "Open"));
        world.set_player_area(Some(plaza), None);

        let help = world.execute("help");
        assert!(help.turn.is_none());
        assert_eq!(world.turn, 0);

        let nonsense = world.execute("dance");
        assert_eq!(world.turn, 1);
        assert!(matches!(nonsense.response, Response::Invalid(_)));

        let idle = world.execute("");
        assert_eq!(idle.turn.map(|t| t.turn), Some(2));
        assert!(idle.ambient.is_some_and(|l| AMBIENT_LINES.contains(&l.as_str())));
    }

    #[test]
    fn where_lists_matches() {
        let mut world = World::seeded(8);
        world.add_area(Area::land("Tomorrowland", ""));
        let exchange = world.execute("where tomorrow");
        assert_eq!(exchange.lines()[0], "Locations matching 'tomorrow':");
        let none = world.execute("where atlantis");
        assert_eq!(none.lines()[0], "No place matching 'atlantis' was found.");
    }
}
