//! Message repository implementation.

use sqlx::PgPool;

use encore_core::error::{AppError, ErrorKind};
use encore_core::result::AppResult;
use encore_core::types::id::UserId;
use encore_entity::message::{Message, NewMessage};

/// Repository for direct message persistence.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a message (always unread) and return the stored row.
    pub async fn create(&self, new: &NewMessage) -> AppResult<Message> {
        sqlx::query_as::<_, Message>(
            "INSERT INTO messages (sender_id, receiver_id, content, file_url, kind, is_read) \
             VALUES ($1, $2, $3, $4, $5, FALSE) RETURNING *",
        )
        .bind(new.sender_id)
        .bind(new.receiver_id)
        .bind(new.content.as_deref())
        .bind(new.file_url.as_deref())
        .bind(new.kind)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create message", e))
    }

    /// Both directions of the conversation between two users, oldest first.
    pub async fn find_conversation(&self, a: UserId, b: UserId) -> AppResult<Vec<Message>> {
        sqlx::query_as::<_, Message>(
            "SELECT * FROM messages \
             WHERE (sender_id = $1 AND receiver_id = $2) OR (sender_id = $2 AND receiver_id = $1) \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(a)
        .bind(b)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load conversation", e))
    }

    /// Flip every unread `sender → receiver` message to read.
    pub async fn mark_read(&self, sender: UserId, receiver: UserId) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = TRUE \
             WHERE sender_id = $1 AND receiver_id = $2 AND is_read = FALSE",
        )
        .bind(sender)
        .bind(receiver)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark messages read", e))?;
        Ok(result.rows_affected())
    }
}
