use serde::{Deserialize, Serialize};

use crate::state::game::GameState;

/// Fixed document id of the singleton record; the whole deployment shares it.
pub const STATE_DOC_ID: &str = "game_state::singleton";

/// Wire representation of the singleton record as the store holds it.
///
/// The revision token is whatever the store handed back last; it is echoed
/// on writes so the store can detect concurrent updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub state: GameState,
}

impl StateDocument {
    /// Wrap a game state into the singleton document shape.
    pub fn new(state: GameState, rev: Option<String>) -> Self {
        Self {
            id: STATE_DOC_ID.to_string(),
            rev,
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_flattens_state_fields() {
        let doc = StateDocument::new(GameState::idle(), Some("1-abc".into()));
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["_id"], STATE_DOC_ID);
        assert_eq!(json["_rev"], "1-abc");
        assert_eq!(json["is_running"], false);
        assert_eq!(json["broadcast_message"], "");
    }
}
