use serde::{Deserialize, Serialize};

/// Whether a category moves money into or out of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Income,
    Outcome,
}

/// A transaction category. The emoji is a single scalar on the wire; a
/// longer string is a decode error, not something to truncate silently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub emoji: char,
    pub is_income: bool,
}

impl Category {
    pub fn direction(&self) -> Direction {
        if self.is_income {
            Direction::Income
        } else {
            Direction::Outcome
        }
    }

    pub fn matches(&self, direction: Direction) -> bool {
        self.direction() == direction
    }
}
