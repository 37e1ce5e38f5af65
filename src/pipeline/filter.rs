use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{comfort::Comfort, readings::RoomReading};

/// Which comfort band the room list is narrowed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    #[default]
    All,
    Comfortable,
    Warm,
    Hot,
}

impl Filter {
    /// Selecting the active category clears the filter; any other category
    /// replaces it.
    pub fn toggle(self, selected: Filter) -> Filter {
        if selected == self {
            Filter::All
        } else {
            selected
        }
    }

    pub fn comfort(self) -> Option<Comfort> {
        match self {
            Filter::All => None,
            Filter::Comfortable => Some(Comfort::Comfortable),
            Filter::Warm => Some(Comfort::Warm),
            Filter::Hot => Some(Comfort::Hot),
        }
    }

    pub fn matches(self, room: &RoomReading) -> bool {
        self.comfort().is_none_or(|c| room.comfort == c)
    }

    /// Matching rooms in their original order.
    pub fn apply(self, rooms: &[RoomReading]) -> Vec<RoomReading> {
        rooms.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

impl From<Comfort> for Filter {
    fn from(comfort: Comfort) -> Self {
        match comfort {
            Comfort::Comfortable => Filter::Comfortable,
            Comfort::Warm => Filter::Warm,
            Comfort::Hot => Filter::Hot,
        }
    }
}

impl FromStr for Filter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "comfortable" => Ok(Self::Comfortable),
            "warm" => Ok(Self::Warm),
            "hot" => Ok(Self::Hot),
            other => Err(anyhow::anyhow!("unknown filter category: {other:?}")),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.comfort() {
            Some(c) => fmt::Display::fmt(&c, f),
            None => f.write_str("all"),
        }
    }
}
