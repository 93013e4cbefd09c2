use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::profile::SubmitterProfile;
use crate::models::suggestion::{Suggestion, SuggestionStatus};
use crate::store::SuggestionStore;

const SUGGESTION_COLUMNS: &str = "id, kind, target_record_id, payload, submitted_by, \
     status, decided_by, notification_ref, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl SuggestionStore for PgStore {
    async fn list_pending_since(
        &self,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Suggestion>> {
        let rows = sqlx::query_as::<_, Suggestion>(&format!(
            "SELECT {SUGGESTION_COLUMNS} FROM suggestions \
             WHERE status = 'pending' AND created_at > $1 \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_pending_notified(&self) -> anyhow::Result<Vec<Suggestion>> {
        let rows = sqlx::query_as::<_, Suggestion>(&format!(
            "SELECT {SUGGESTION_COLUMNS} FROM suggestions \
             WHERE status = 'pending' AND notification_ref IS NOT NULL \
             ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_suggestion(&self, id: i64) -> anyhow::Result<Option<Suggestion>> {
        let row = sqlx::query_as::<_, Suggestion>(&format!(
            "SELECT {SUGGESTION_COLUMNS} FROM suggestions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn compare_and_set_status(
        &self,
        id: i64,
        from: SuggestionStatus,
        to: SuggestionStatus,
        decided_by: &str,
    ) -> anyhow::Result<bool> {
        // The WHERE clause on the current status is what serializes
        // concurrent decisions; only one caller ever sees rows_affected = 1.
        let result = sqlx::query(
            "UPDATE suggestions \
             SET status = $1, decided_by = $2, updated_at = NOW() \
             WHERE id = $3 AND status = $4",
        )
        .bind(to)
        .bind(decided_by)
        .bind(id)
        .bind(from)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_notification_ref(
        &self,
        id: i64,
        notification_ref: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE suggestions SET notification_ref = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(notification_ref)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_record(
        &self,
        fields: &serde_json::Value,
        submitted_by: &str,
    ) -> anyhow::Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO records (fields, submitted_by) VALUES ($1, $2) RETURNING id",
        )
        .bind(fields)
        .bind(submitted_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_record(
        &self,
        id: i64,
        fields: &serde_json::Value,
    ) -> anyhow::Result<bool> {
        let result =
            sqlx::query("UPDATE records SET fields = $1, updated_at = NOW() WHERE id = $2")
                .bind(fields)
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn lookup_submitter_profile(
        &self,
        user_ref: &str,
    ) -> anyhow::Result<Option<SubmitterProfile>> {
        let row = sqlx::query_as::<_, SubmitterProfile>(
            "SELECT user_ref, display_name, avatar_url FROM submitter_profiles WHERE user_ref = $1",
        )
        .bind(user_ref)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
