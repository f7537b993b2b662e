//! Domain model for the singleton game state and its partial updates.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Number of floors on the board; valid floor indices are `0..FLOOR_COUNT`.
pub const FLOOR_COUNT: u8 = 10;

/// The one shared record describing the whole game.
///
/// Exactly one instance exists per deployment, identified by a fixed document
/// id at the store. All timestamps are absolute wall-clock values serialized
/// as RFC 3339; they are meaningful only while the matching running flag is
/// set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Whether the main countdown is active.
    pub is_running: bool,
    /// Absolute expiry of the main countdown.
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
    /// Whether the secondary floor-closing countdown is active.
    pub floor_is_running: bool,
    /// Absolute expiry of the floor-closing countdown.
    #[serde(with = "time::serde::rfc3339::option")]
    pub floor_end_time: Option<OffsetDateTime>,
    /// Floors currently lit on the board, each in `0..FLOOR_COUNT`.
    pub active_floors: BTreeSet<u8>,
    /// Latest operator message, possibly empty.
    pub broadcast_message: String,
}

impl Default for GameState {
    fn default() -> Self {
        Self::idle()
    }
}

impl GameState {
    /// State of a freshly created deployment: nothing running, board dark.
    pub fn idle() -> Self {
        Self {
            is_running: false,
            end_time: None,
            floor_is_running: false,
            floor_end_time: None,
            active_floors: BTreeSet::new(),
            broadcast_message: String::new(),
        }
    }

    /// Overwrite exactly the fields present in `patch`.
    ///
    /// Patches are idempotent whole-field writes, never deltas, so applying
    /// the same patch twice leaves the state unchanged.
    pub fn apply(&mut self, patch: GameStatePatch) {
        if let Some(is_running) = patch.is_running {
            self.is_running = is_running;
        }
        if let Some(end_time) = patch.end_time {
            self.end_time = end_time;
        }
        if let Some(floor_is_running) = patch.floor_is_running {
            self.floor_is_running = floor_is_running;
        }
        if let Some(floor_end_time) = patch.floor_end_time {
            self.floor_end_time = floor_end_time;
        }
        if let Some(active_floors) = patch.active_floors {
            self.active_floors = active_floors;
        }
        if let Some(broadcast_message) = patch.broadcast_message {
            self.broadcast_message = broadcast_message;
        }
    }

    /// Symmetric difference of the lit floors with `{floor}`: lit floors are
    /// darkened, dark floors are lit.
    pub fn toggled_floors(&self, floor: u8) -> BTreeSet<u8> {
        let mut floors = self.active_floors.clone();
        if !floors.remove(&floor) {
            floors.insert(floor);
        }
        floors
    }
}

/// Partial update of [`GameState`].
///
/// Double-option timestamps distinguish "leave as is" (outer `None`) from
/// "clear the deadline" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_running: Option<bool>,
    #[serde(
        default,
        with = "double_option_rfc3339",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<Option<OffsetDateTime>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_is_running: Option<bool>,
    #[serde(
        default,
        with = "double_option_rfc3339",
        skip_serializing_if = "Option::is_none"
    )]
    pub floor_end_time: Option<Option<OffsetDateTime>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_floors: Option<BTreeSet<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast_message: Option<String>,
}

impl GameStatePatch {
    /// Patch written by the "start game" command: arm the main countdown and
    /// stop any floor-closing countdown left over from the previous round.
    pub fn start_game(now: OffsetDateTime, duration_minutes: f64) -> Self {
        Self {
            is_running: Some(true),
            end_time: Some(Some(now + minutes(duration_minutes))),
            floor_is_running: Some(false),
            ..Self::default()
        }
    }

    /// Patch written by the "start floor countdown" command.
    pub fn start_floor(now: OffsetDateTime, duration_minutes: f64) -> Self {
        Self {
            floor_is_running: Some(true),
            floor_end_time: Some(Some(now + minutes(duration_minutes))),
            ..Self::default()
        }
    }

    /// Patch replacing the lit-floor set wholesale.
    pub fn set_floors(floors: BTreeSet<u8>) -> Self {
        Self {
            active_floors: Some(floors),
            ..Self::default()
        }
    }

    /// Patch written by the "reset" command. Stale deadlines are left in
    /// place; they carry no meaning while the running flags are down.
    pub fn reset() -> Self {
        Self {
            is_running: Some(false),
            floor_is_running: Some(false),
            active_floors: Some(BTreeSet::new()),
            broadcast_message: Some(String::new()),
            ..Self::default()
        }
    }

    /// Patch replacing the operator broadcast message verbatim.
    pub fn broadcast(message: String) -> Self {
        Self {
            broadcast_message: Some(message),
            ..Self::default()
        }
    }
}

fn minutes(duration_minutes: f64) -> time::Duration {
    time::Duration::seconds_f64(duration_minutes * 60.0)
}

mod double_option_rfc3339 {
    //! RFC 3339 (de)serialization for `Option<Option<OffsetDateTime>>` patch
    //! fields, delegating the inner option to `time`'s well-known format.

    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use time::OffsetDateTime;

    #[derive(Serialize, Deserialize)]
    #[serde(transparent)]
    struct Inner(#[serde(with = "time::serde::rfc3339::option")] Option<OffsetDateTime>);

    pub fn serialize<S>(
        value: &Option<Option<OffsetDateTime>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(inner) => Inner(*inner).serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<OffsetDateTime>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Some(Inner::deserialize(deserializer)?.0))
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn toggle_is_an_involution() {
        let mut state = GameState::idle();
        state.active_floors = BTreeSet::from([1, 4]);
        let original = state.active_floors.clone();

        state.apply(GameStatePatch::set_floors(state.toggled_floors(7)));
        assert!(state.active_floors.contains(&7));

        state.apply(GameStatePatch::set_floors(state.toggled_floors(7)));
        assert_eq!(state.active_floors, original);
    }

    #[test]
    fn toggle_on_then_off_leaves_floor_dark() {
        let mut state = GameState::idle();
        state.apply(GameStatePatch::set_floors(state.toggled_floors(3)));
        assert!(state.active_floors.contains(&3));
        state.apply(GameStatePatch::set_floors(state.toggled_floors(3)));
        assert!(!state.active_floors.contains(&3));
    }

    #[test]
    fn reset_returns_to_idle_shape_regardless_of_prior_state() {
        let now = datetime!(2025-06-01 20:00 UTC);
        let mut state = GameState {
            is_running: true,
            end_time: Some(now),
            floor_is_running: true,
            floor_end_time: Some(now),
            active_floors: BTreeSet::from([0, 5, 9]),
            broadcast_message: "last call".into(),
        };

        state.apply(GameStatePatch::reset());

        assert!(!state.is_running);
        assert!(!state.floor_is_running);
        assert!(state.active_floors.is_empty());
        assert_eq!(state.broadcast_message, "");
    }

    #[test]
    fn start_game_arms_main_countdown_and_stops_floor_countdown() {
        let now = datetime!(2025-06-01 20:00 UTC);
        let mut state = GameState::idle();
        state.floor_is_running = true;

        state.apply(GameStatePatch::start_game(now, 10.0));

        assert!(state.is_running);
        assert_eq!(state.end_time, Some(now + time::Duration::minutes(10)));
        assert!(!state.floor_is_running);
    }

    #[test]
    fn patch_leaves_absent_fields_untouched() {
        let mut state = GameState::idle();
        state.broadcast_message = "keep me".into();
        state.active_floors = BTreeSet::from([2]);

        state.apply(GameStatePatch::broadcast("moved to floor 2".into()));
        assert_eq!(state.broadcast_message, "moved to floor 2");
        assert_eq!(state.active_floors, BTreeSet::from([2]));

        state.apply(GameStatePatch::start_floor(
            datetime!(2025-06-01 20:00 UTC),
            1.5,
        ));
        assert_eq!(state.broadcast_message, "moved to floor 2");
        assert_eq!(
            state.floor_end_time,
            Some(datetime!(2025-06-01 20:01:30 UTC))
        );
    }

    #[test]
    fn patch_serialization_skips_absent_fields() {
        let patch = GameStatePatch::broadcast("hello".into());
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "broadcast_message": "hello" }));
    }

    #[test]
    fn patch_round_trips_cleared_deadline() {
        let patch = GameStatePatch {
            end_time: Some(None),
            ..GameStatePatch::default()
        };
        let json = serde_json::to_string(&patch).unwrap();
        let back: GameStatePatch = serde_json::from_str(&json).unwrap();
        assert_eq!(back.end_time, Some(None));
    }

    #[test]
    fn state_timestamps_serialize_as_rfc3339() {
        let mut state = GameState::idle();
        state.end_time = Some(datetime!(2025-06-01 20:00 UTC));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["end_time"], "2025-06-01T20:00:00Z");
    }
}
