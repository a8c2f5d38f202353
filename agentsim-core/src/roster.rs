// File: agentsim-core/src/roster.rs
//
// Flavor text for simulated conversations and ambient log lines.

use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterpart {
    pub name: String,
    pub handle: String,
    pub avatar_color: String,
}

impl Counterpart {
    pub fn new(name: &str, handle: &str, avatar_color: &str) -> Self {
        Self {
            name: name.to_string(),
            handle: handle.to_string(),
            avatar_color: avatar_color.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub counterparts: Vec<Counterpart>,
    pub openers: Vec<String>,
    pub replies: Vec<String>,
    pub ambient_users: Vec<String>,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            counterparts: vec![
                Counterpart::new("Sarah Jenkins", "@sarah_j", "pink"),
                Counterpart::new("Mike Design", "@mike_ux", "blue"),
                Counterpart::new("Alex Creator", "@alex_c", "green"),
                Counterpart::new("Travel Bug", "@wanderlust", "yellow"),
                Counterpart::new("Foodie Daily", "@tasty_eats", "orange"),
            ],
            openers: to_strings(&[
                "Love the new post! 🔥",
                "Where did you get that?",
                "This is exactly what I needed today.",
                "Collaboration?",
                "Can you send me the link?",
            ]),
            replies: to_strings(&[
                "Thanks so much! glad you liked it 🙌",
                "DM sent!",
                "Appreciate the support! ❤️",
                "Let's connect soon.",
                "Check the link in bio!",
            ]),
            ambient_users: to_strings(&["@gym_rat", "@travel_guru", "@foodie_life"]),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Roster {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        let roster: Roster = serde_json::from_str(&raw)?;
        roster.validate()?;
        Ok(roster)
    }

    /// Every table must have at least one entry to draw from.
    pub fn validate(&self) -> Result<(), Error> {
        let tables = [
            ("counterparts", self.counterparts.len()),
            ("openers", self.openers.len()),
            ("replies", self.replies.len()),
            ("ambient_users", self.ambient_users.len()),
        ];
        for (name, len) in tables {
            if len == 0 {
                return Err(Error::Config(format!("roster table '{}' is empty", name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roster_is_complete() {
        let roster = Roster::default();
        assert!(roster.validate().is_ok());
        assert_eq!(roster.counterparts.len(), 5);
        assert_eq!(roster.ambient_users.len(), 3);
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let mut roster = Roster::default();
        roster.replies.clear();
        assert!(matches!(roster.validate(), Err(Error::Config(_))));
    }
}
