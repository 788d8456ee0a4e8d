//! Player commands and their text form

use crate::core::types::{Direction, SlotId};

/// Inventory orderings the player can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Priority,
    /// Earliest deadline first
    Deadline,
    Payout,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "priority" | "prio" => Some(SortKey::Priority),
            "deadline" | "due" => Some(SortKey::Deadline),
            "payout" | "pay" => Some(SortKey::Payout),
            _ => None,
        }
    }
}

/// Something the player does to the run
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Move(Direction),
    Accept,
    Next,
    Previous,
    Sort(SortKey),
    Deliver,
    Cancel,
    Save(SlotId),
    Load(SlotId),
    Undo(usize),
    Wait(f64),
}

/// A line of player input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Act(Action),
    Status,
    Orders,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Returns None for anything unrecognized.
    pub fn parse(input: &str) -> Option<Self> {
        let mut words = input.split_whitespace();
        let head = words.next()?.to_ascii_lowercase();
        let arg = words.next();

        let action = match head.as_str() {
            "move" | "m" => Action::Move(Direction::parse(arg?)?),
            "up" | "down" | "left" | "right" => Action::Move(Direction::parse(&head)?),
            "accept" | "a" => Action::Accept,
            "next" | "n" => Action::Next,
            "prev" | "p" => Action::Previous,
            "sort" => Action::Sort(SortKey::parse(&arg?.to_ascii_lowercase())?),
            "deliver" | "d" => Action::Deliver,
            "cancel" | "c" => Action::Cancel,
            "save" => Action::Save(SlotId(arg.map_or(Ok(1), str::parse).ok()?)),
            "load" => Action::Load(SlotId(arg.map_or(Ok(1), str::parse).ok()?)),
            "undo" | "u" => Action::Undo(arg.map_or(Ok(1), str::parse).ok()?),
            "wait" | "w" => {
                let secs: f64 = arg.map_or(Ok(1.0), str::parse).ok()?;
                if !secs.is_finite() || secs <= 0.0 {
                    return None;
                }
                Action::Wait(secs)
            }
            "status" | "s" => return Some(Command::Status),
            "orders" | "o" => return Some(Command::Orders),
            "help" | "h" | "?" => return Some(Command::Help),
            "quit" | "q" | "exit" => return Some(Command::Quit),
            _ => return None,
        };
        Some(Command::Act(action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_movement() {
        assert_eq!(Command::parse("move up"), Some(Command::Act(Action::Move(Direction::Up))));
        assert_eq!(Command::parse("LEFT"), Some(Command::Act(Action::Move(Direction::Left))));
        assert_eq!(Command::parse("move sideways"), None);
        assert_eq!(Command::parse("move"), None);
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(Command::parse("sort deadline"), Some(Command::Act(Action::Sort(SortKey::Deadline))));
        assert_eq!(Command::parse("save 3"), Some(Command::Act(Action::Save(SlotId(3)))));
        assert_eq!(Command::parse("load"), Some(Command::Act(Action::Load(SlotId(1)))));
        assert_eq!(Command::parse("undo 4"), Some(Command::Act(Action::Undo(4))));
        assert_eq!(Command::parse("wait 2.5"), Some(Command::Act(Action::Wait(2.5))));
        assert_eq!(Command::parse("wait -1"), None);
        assert_eq!(Command::parse("save x"), None);
    }

    #[test]
    fn test_parse_meta_commands() {
        assert_eq!(Command::parse("  status "), Some(Command::Status));
        assert_eq!(Command::parse("q"), Some(Command::Quit));
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("dance"), None);
    }
}
