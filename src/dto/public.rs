//! Read-side projections: the raw snapshot and the player/admin views.
//!
//! Views are pure functions of `(state, now)`; they carry pre-rendered clock
//! strings so display clients never re-derive countdown math themselves.

use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::state::{
    countdown::{display_remaining, format_clock},
    game::{FLOOR_COUNT, GameState},
};

/// Full copy of the singleton record as confirmed by the store.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameStateSnapshot {
    pub is_running: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub end_time: Option<OffsetDateTime>,
    pub floor_is_running: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub floor_end_time: Option<OffsetDateTime>,
    /// Lit floors in ascending order.
    pub active_floors: Vec<u8>,
    pub broadcast_message: String,
}

impl From<GameState> for GameStateSnapshot {
    fn from(state: GameState) -> Self {
        Self {
            is_running: state.is_running,
            end_time: state.end_time,
            floor_is_running: state.floor_is_running,
            floor_end_time: state.floor_end_time,
            active_floors: state.active_floors.into_iter().collect(),
            broadcast_message: state.broadcast_message,
        }
    }
}

/// One cell of the floor board.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FloorCell {
    /// Floor index, 0 being the ground floor.
    pub floor: u8,
    /// Display label: `G / F` for the ground floor, `{n} / F` above.
    pub label: String,
    /// Whether the cell renders lit; always false while the game is stopped.
    pub active: bool,
}

impl FloorCell {
    fn for_floor(state: &GameState, floor: u8) -> Self {
        let label = if floor == 0 {
            "G / F".to_string()
        } else {
            format!("{floor} / F")
        };
        Self {
            floor,
            label,
            active: state.is_running && state.active_floors.contains(&floor),
        }
    }
}

/// Everything the player display renders.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerView {
    pub is_running: bool,
    /// Banner line above the clock.
    pub headline: String,
    /// Main countdown rendered as `minutes:seconds`.
    pub clock: String,
    pub floor_is_running: bool,
    /// Floor-closing countdown rendered as `minutes:seconds`.
    pub floor_clock: String,
    /// Board cells ordered top to bottom, floor 9 first.
    pub floors: Vec<FloorCell>,
    pub broadcast_message: String,
}

impl PlayerView {
    /// Project the authoritative state into the player display at `now`.
    pub fn project(state: &GameState, now: OffsetDateTime) -> Self {
        let remaining = display_remaining(state.is_running, state.end_time, now);
        let floor_remaining =
            display_remaining(state.floor_is_running, state.floor_end_time, now);

        Self {
            is_running: state.is_running,
            headline: if state.is_running {
                "GAME ON".to_string()
            } else {
                "GAME OVER".to_string()
            },
            clock: format_clock(remaining),
            floor_is_running: state.floor_is_running,
            floor_clock: format_clock(floor_remaining),
            floors: (0..FLOOR_COUNT)
                .rev()
                .map(|floor| FloorCell::for_floor(state, floor))
                .collect(),
            broadcast_message: state.broadcast_message.clone(),
        }
    }
}

/// Control-panel projection served to the admin page.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminView {
    /// Status line: `running` or `standby`.
    pub status: String,
    /// Main countdown rendered as `minutes:seconds`.
    pub clock: String,
    /// Floor-closing countdown rendered as `minutes:seconds`.
    pub floor_clock: String,
    pub is_running: bool,
    pub floor_is_running: bool,
    /// Lit floors in ascending order, for the toggle matrix.
    pub active_floors: Vec<u8>,
    pub broadcast_message: String,
    /// True while the backend has no store connection.
    pub degraded: bool,
}

impl AdminView {
    /// Project the authoritative state into the admin panel at `now`.
    pub fn project(state: &GameState, now: OffsetDateTime, degraded: bool) -> Self {
        let remaining = display_remaining(state.is_running, state.end_time, now);
        let floor_remaining =
            display_remaining(state.floor_is_running, state.floor_end_time, now);

        Self {
            status: if state.is_running {
                "running".to_string()
            } else {
                "standby".to_string()
            },
            clock: format_clock(remaining),
            floor_clock: format_clock(floor_remaining),
            is_running: state.is_running,
            floor_is_running: state.floor_is_running,
            active_floors: state.active_floors.iter().copied().collect(),
            broadcast_message: state.broadcast_message.clone(),
            degraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use time::macros::datetime;

    use crate::state::game::GameStatePatch;

    use super::*;

    const T0: OffsetDateTime = datetime!(2025-06-01 20:00 UTC);

    #[test]
    fn board_lists_ten_cells_top_floor_first() {
        let view = PlayerView::project(&GameState::idle(), T0);
        assert_eq!(view.floors.len(), 10);
        assert_eq!(view.floors.first().map(|c| c.floor), Some(9));
        assert_eq!(view.floors.last().map(|c| c.floor), Some(0));
    }

    #[test]
    fn ground_floor_gets_its_own_label() {
        let view = PlayerView::project(&GameState::idle(), T0);
        assert_eq!(view.floors[9].label, "G / F");
        assert_eq!(view.floors[6].label, "3 / F");
    }

    #[test]
    fn cells_light_only_while_the_game_runs() {
        let mut state = GameState::idle();
        state.active_floors = BTreeSet::from([3]);

        let stopped = PlayerView::project(&state, T0);
        assert!(stopped.floors.iter().all(|cell| !cell.active));

        state.is_running = true;
        let running = PlayerView::project(&state, T0);
        let cell3 = running.floors.iter().find(|c| c.floor == 3).unwrap();
        assert!(cell3.active);
        let cell4 = running.floors.iter().find(|c| c.floor == 4).unwrap();
        assert!(!cell4.active);
    }

    #[test]
    fn toggling_a_floor_on_then_off_renders_it_inactive() {
        let mut state = GameState::idle();
        state.is_running = true;
        state.apply(GameStatePatch::set_floors(state.toggled_floors(3)));
        state.apply(GameStatePatch::set_floors(state.toggled_floors(3)));

        let view = PlayerView::project(&state, T0);
        let cell3 = view.floors.iter().find(|c| c.floor == 3).unwrap();
        assert!(!cell3.active);
    }

    #[test]
    fn player_clock_counts_down_from_the_deadline() {
        let mut state = GameState::idle();
        state.apply(GameStatePatch::start_game(T0, 10.0));

        let view = PlayerView::project(&state, T0 + time::Duration::seconds(1));
        assert_eq!(view.clock, "9:59");
        assert_eq!(view.headline, "GAME ON");

        let exhausted = PlayerView::project(&state, T0 + time::Duration::seconds(600));
        assert_eq!(exhausted.clock, "0:00");
    }

    #[test]
    fn stopped_game_pins_both_clocks() {
        let mut state = GameState::idle();
        state.end_time = Some(T0 + time::Duration::minutes(5));
        state.floor_end_time = Some(T0 + time::Duration::minutes(5));

        let admin = AdminView::project(&state, T0, false);
        assert_eq!(admin.status, "standby");
        assert_eq!(admin.clock, "0:00");
        assert_eq!(admin.floor_clock, "0:00");
    }

    #[test]
    fn snapshot_lists_floors_in_ascending_order() {
        let mut state = GameState::idle();
        state.active_floors = BTreeSet::from([7, 0, 4]);
        let snapshot = GameStateSnapshot::from(state);
        assert_eq!(snapshot.active_floors, vec![0, 4, 7]);
    }
}
