//! Messages exchanged with the lobby before a match starts.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use waveguard_core::{Difficulty, MapId, MatchSetup};

/// Failure raised while decoding a lobby message.
#[derive(Debug, Error)]
#[error("malformed lobby message: {0}")]
pub struct LobbyError(#[from] serde_json::Error);

/// JSON message delivered by the lobby channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LobbyMessage {
    /// Starts a match on the named map.
    StartGame {
        /// Map of the match.
        map: MapId,
        /// Difficulty of the match.
        #[serde(default)]
        difficulty: Difficulty,
    },
    /// Chat line from another player.
    Chat {
        /// Sender's display name.
        from: String,
        /// Message body.
        text: String,
    },
    /// A party was created or changed membership.
    Party {
        /// Party identifier.
        party: String,
        /// Current members of the party.
        members: Vec<String>,
    },
}

impl LobbyMessage {
    /// Decodes a message from its JSON text.
    pub fn parse(json: &str) -> Result<Self, LobbyError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Match the message asks to start, if it is a start request.
    #[must_use]
    pub fn match_setup(&self) -> Option<MatchSetup> {
        match self {
            Self::StartGame { map, difficulty } => Some(MatchSetup::new(*map, *difficulty)),
            Self::Chat { .. } | Self::Party { .. } => None,
        }
    }
}
