//! Notification repository implementation.

use sqlx::{FromRow, PgPool};

use encore_core::error::{AppError, ErrorKind};
use encore_core::result::AppResult;
use encore_core::types::id::{NotificationId, UserId};
use encore_entity::notification::{NewNotification, Notification, NotificationWithActor};
use encore_entity::user::ActorSummary;

/// Notification columns joined with the actor's display columns.
const SELECT_WITH_ACTOR: &str = "SELECT n.*, \
     u.username AS actor_username, \
     u.spotify_display_name AS actor_spotify_display_name, \
     u.avatar_url AS actor_avatar_url, \
     u.profile_image AS actor_profile_image, \
     u.spotify_profile_image AS actor_spotify_profile_image \
     FROM notifications n LEFT JOIN users u ON u.id = n.from_user_id";

/// Row shape of [`SELECT_WITH_ACTOR`].
#[derive(Debug, FromRow)]
struct NotificationActorRow {
    #[sqlx(flatten)]
    notification: Notification,
    actor_username: Option<String>,
    actor_spotify_display_name: Option<String>,
    actor_avatar_url: Option<String>,
    actor_profile_image: Option<String>,
    actor_spotify_profile_image: Option<String>,
}

impl From<NotificationActorRow> for NotificationWithActor {
    fn from(row: NotificationActorRow) -> Self {
        let actor = ActorSummary {
            id: row.notification.from_user_id,
            username: row.actor_username,
            spotify_display_name: row.actor_spotify_display_name,
            avatar_url: row.actor_avatar_url,
            profile_image: row.actor_profile_image,
            spotify_profile_image: row.actor_spotify_profile_image,
        };
        NotificationWithActor::new(row.notification, actor)
    }
}

/// Repository for notification persistence.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a notification (unseen, undismissed).
    pub async fn create(&self, new: &NewNotification) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (user_id, from_user_id, kind, post_id, comment_id, content) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(new.user_id)
        .bind(new.from_user_id)
        .bind(new.kind)
        .bind(new.post_id)
        .bind(new.comment_id)
        .bind(new.content.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create notification", e)
        })
    }

    /// Load one notification joined with its actor.
    pub async fn find_with_actor(
        &self,
        id: NotificationId,
    ) -> AppResult<Option<NotificationWithActor>> {
        let row = sqlx::query_as::<_, NotificationActorRow>(&format!(
            "{SELECT_WITH_ACTOR} WHERE n.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load notification", e))?;
        Ok(row.map(Into::into))
    }

    /// Newest non-dismissed notifications for a user.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> AppResult<Vec<NotificationWithActor>> {
        let rows = sqlx::query_as::<_, NotificationActorRow>(&format!(
            "{SELECT_WITH_ACTOR} WHERE n.user_id = $1 AND n.dismissed = FALSE \
             ORDER BY n.created_at DESC, n.id DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list notifications", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Mark one notification seen. Returns whether a row changed.
    pub async fn mark_seen(&self, id: NotificationId, user_id: UserId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET seen = TRUE WHERE id = $1 AND user_id = $2 AND seen = FALSE",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark seen", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Dismiss one notification. Dismissing also marks it seen.
    pub async fn dismiss(&self, id: NotificationId, user_id: UserId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET dismissed = TRUE, seen = TRUE \
             WHERE id = $1 AND user_id = $2 AND dismissed = FALSE",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to dismiss notification", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    /// Dismiss every open notification of a user.
    pub async fn dismiss_all(&self, user_id: UserId) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET dismissed = TRUE, seen = TRUE \
             WHERE user_id = $1 AND dismissed = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to dismiss notifications", e)
        })?;
        Ok(result.rows_affected())
    }
}
