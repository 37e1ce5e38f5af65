use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::filter::Filter;
use crate::{comfort::ComfortCounts, readings::RoomReading};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AutoRefresh {
    Running,
    #[default]
    Paused,
}

/// Current snapshot and the user's view settings for it.
///
/// `counts` is recomputed whenever `rooms` changes and always describes the
/// unfiltered list.
#[derive(Debug, Clone)]
pub struct PipelineState {
    rooms: Vec<RoomReading>,
    counts: ComfortCounts,
    last_updated: DateTime<Utc>,
    /// Number of snapshots applied after the initial one.
    generation: u64,
    pub filter: Filter,
    pub auto_refresh: AutoRefresh,
}

impl PipelineState {
    pub fn new(rooms: Vec<RoomReading>) -> Self {
        Self {
            counts: ComfortCounts::from_rooms(&rooms),
            rooms,
            last_updated: Utc::now(),
            generation: 0,
            filter: Filter::All,
            auto_refresh: AutoRefresh::Paused,
        }
    }

    /// Swap in a new snapshot; returns the new generation number.
    pub fn replace(&mut self, rooms: Vec<RoomReading>) -> u64 {
        self.counts = ComfortCounts::from_rooms(&rooms);
        self.rooms = rooms;
        self.last_updated = Utc::now();
        self.generation += 1;
        self.generation
    }

    pub fn rooms(&self) -> &[RoomReading] {
        &self.rooms
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            rooms: self.filter.apply(&self.rooms),
            counts: self.counts,
            total: self.rooms.len(),
            last_updated: self.last_updated,
            generation: self.generation,
            filter: self.filter,
            auto_refresh: self.auto_refresh,
        }
    }
}

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardView {
    /// Rooms passing the active filter, in snapshot order.
    pub rooms: Vec<RoomReading>,
    /// Per-band counts over the unfiltered snapshot.
    pub counts: ComfortCounts,
    pub total: usize,
    pub last_updated: DateTime<Utc>,
    pub generation: u64,
    pub filter: Filter,
    pub auto_refresh: AutoRefresh,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rooms(temps: &[f64]) -> Vec<RoomReading> {
        temps
            .iter()
            .enumerate()
            .map(|(i, &t)| RoomReading::new(i as u32 + 1, format!("Room {}", 101 + i), t, 50))
            .collect()
    }

    #[test]
    fn new_state_counts_initial_snapshot() {
        let state = PipelineState::new(rooms(&[23.5, 27.2, 31.8]));
        let view = state.view();

        assert_eq!(view.generation, 0);
        assert_eq!(view.total, 3);
        assert_eq!(view.counts.total(), 3);
        assert_eq!(view.auto_refresh, AutoRefresh::Paused);
        assert_eq!(view.filter, Filter::All);
    }

    #[test]
    fn replace_recomputes_counts_and_bumps_generation() {
        let mut state = PipelineState::new(rooms(&[23.5, 27.2]));
        let before = state.last_updated();

        assert_eq!(state.replace(rooms(&[30.0, 30.5, 31.0, 20.0])), 1);

        let view = state.view();
        assert_eq!(view.counts.hot, 3);
        assert_eq!(view.counts.comfortable, 1);
        assert_eq!(view.counts.total(), view.total);
        assert!(state.last_updated() >= before);
    }

    #[test]
    fn filtered_view_keeps_unfiltered_counts() {
        let mut state = PipelineState::new(rooms(&[23.5, 27.2, 31.8, 22.1]));
        state.filter = Filter::Hot;

        let view = state.view();
        assert_eq!(view.rooms.len(), 1);
        assert_eq!(view.rooms[0].temperature, 31.8);
        assert_eq!(view.total, 4);
        assert_eq!(view.counts.total(), 4);
    }
}
