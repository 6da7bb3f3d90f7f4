use serde::{Deserialize, Serialize};

/// One trigger occurrence relayed from the control surface to the game.
/// A value type: immutable once constructed, no identity beyond its fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TriggerEvent {
    /// Show the animal variant at `idx`. Range checking is the game's job.
    #[serde(rename = "animal")]
    Animal { idx: u32 },

    #[serde(rename = "music")]
    MusicToggle,

    #[serde(rename = "skip")]
    NextSong,

    #[serde(rename = "rain")]
    RainToggle,
}
