//! Shared item types for the hub-remote client.
//!
//! These are the records the server reports in paged list responses. The list
//! model itself is generic and never looks inside them; they live here so
//! tests and downstream consumers agree on one vocabulary.

use serde::{Deserialize, Serialize};

/// A playback device attached to the hub.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    /// Stable server-assigned player id (typically the MAC address).
    pub id: String,
    /// User-visible player name.
    pub name: String,
    /// IP address the hub last saw the player at.
    pub ip: Option<String>,
    /// Hardware model string.
    pub model: Option<String>,
    /// Whether the player supports being powered off remotely.
    pub can_power_off: bool,
    /// `true` while the player is connected to the hub.
    pub connected: bool,
}

/// A scheduled alarm on one player.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alarm {
    /// Server-assigned alarm id.
    pub id: String,
    /// Time of day in seconds from midnight.
    pub tod: u32,
    /// Whether the alarm will fire.
    pub enabled: bool,
    /// Whether the alarm repeats on its scheduled days.
    pub repeat: bool,
    /// Days of week the alarm fires on (0 = Sunday .. 6 = Saturday).
    pub dow: Vec<u8>,
    /// Playlist or stream to start, if not the default sound.
    pub url: Option<String>,
}

/// One entry of a playlist as reported by the hub.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaylistEntry {
    /// Server-assigned track id.
    pub id: String,
    /// Track title.
    pub title: String,
    /// Track artist, if known.
    pub artist: Option<String>,
    /// Album title, if known.
    pub album: Option<String>,
    /// Track duration in milliseconds, if known.
    pub duration_ms: Option<u64>,
    /// Location of the underlying media.
    pub url: Option<String>,
}
