//! Actor display snapshot.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use encore_core::types::id::UserId;

/// Fallback display name when an actor has neither a username nor a Spotify name.
const ANONYMOUS_ACTOR: &str = "someone";

/// The display attributes of the user who triggered a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActorSummary {
    /// User ID.
    pub id: UserId,
    /// Local username.
    pub username: Option<String>,
    /// Display name from the linked Spotify profile.
    pub spotify_display_name: Option<String>,
    /// Uploaded avatar.
    #[serde(rename = "avatarURL")]
    pub avatar_url: Option<String>,
    /// Profile image set during onboarding.
    pub profile_image: Option<String>,
    /// Image from the linked Spotify profile.
    pub spotify_profile_image: Option<String>,
}

impl ActorSummary {
    /// Placeholder used when the actor row has vanished.
    pub fn unknown(id: UserId) -> Self {
        Self {
            id,
            username: None,
            spotify_display_name: None,
            avatar_url: None,
            profile_image: None,
            spotify_profile_image: None,
        }
    }

    /// Username, else Spotify display name, else a neutral placeholder.
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.spotify_display_name.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(ANONYMOUS_ACTOR)
    }

    /// First available image: uploaded avatar, profile image, Spotify image.
    pub fn avatar(&self) -> Option<&str> {
        self.avatar_url
            .as_deref()
            .or(self.profile_image.as_deref())
            .or(self.spotify_profile_image.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallbacks() {
        let mut actor = ActorSummary::unknown(UserId(1));
        assert_eq!(actor.display_name(), "someone");

        actor.spotify_display_name = Some("DJ Bob".to_string());
        assert_eq!(actor.display_name(), "DJ Bob");

        actor.username = Some("bob".to_string());
        assert_eq!(actor.display_name(), "bob");
    }

    #[test]
    fn test_avatar_precedence() {
        let mut actor = ActorSummary::unknown(UserId(1));
        assert_eq!(actor.avatar(), None);

        actor.spotify_profile_image = Some("spotify.png".to_string());
        assert_eq!(actor.avatar(), Some("spotify.png"));

        actor.avatar_url = Some("avatar.png".to_string());
        assert_eq!(actor.avatar(), Some("avatar.png"));
    }
}
