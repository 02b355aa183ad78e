//! Export audit log.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reading_core::{ExportRecord, HistoryQuery, UserId};

use crate::error::StoreResult;
use crate::models::{
    fill_trend, CleanupSummary, DailyCount, ExportStats, KeyCount, NewExportRecord,
    RECENT_EXPORT_DAYS, RECENT_EXPORT_LIST, TOP_TYPE_COUNT, TREND_DAYS,
};
use crate::repository::HistoryRepository;
use crate::store::Store;

const RECORD_COLUMNS: &str = r#"
    export_id, user_id, operation_type, entity_type, entity_ids, format, status,
    item_count, file_size, filename, details, created_at
"#;

#[async_trait]
impl HistoryRepository for Store {
    async fn record_export(&self, record: NewExportRecord) -> StoreResult<ExportRecord> {
        let sql = format!(
            r#"
            INSERT INTO export_history
                (export_id, user_id, operation_type, entity_type, entity_ids, format,
                 status, item_count, file_size, filename, details)
            VALUES ($1, $2, 'EXPORT', $3, $4, $5, 'COMPLETED', $6, $7, $8, $9)
            RETURNING {RECORD_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ExportRecord>(&sql)
            .bind(&record.export_id)
            .bind(record.user_id.get())
            .bind(record.kind.entity_type())
            .bind(record.entity_ids.as_deref())
            .bind(&record.format)
            .bind(record.item_count)
            .bind(record.file_size)
            .bind(&record.filename)
            .bind(&record.details)
            .fetch_one(self.pool())
            .await?;

        tracing::info!(
            user_id = %record.user_id,
            export_id = %row.export_id,
            entity_type = %row.entity_type,
            item_count = row.item_count,
            "Recorded export"
        );
        Ok(row)
    }

    async fn list_exports(
        &self,
        user: UserId,
        query: &HistoryQuery,
    ) -> StoreResult<(Vec<ExportRecord>, i64)> {
        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM export_history WHERE user_id = $1")
                .bind(user.get())
                .fetch_one(self.pool())
                .await?;

        // Sort column and direction come from closed enums, never from input.
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM export_history WHERE user_id = $1 \
             ORDER BY {} {}, export_id {} LIMIT $2 OFFSET $3",
            query.sort.column(),
            query.order.as_sql(),
            query.order.as_sql(),
        );
        let items = sqlx::query_as::<_, ExportRecord>(&sql)
            .bind(user.get())
            .bind(i64::from(query.page_size))
            .bind(query.offset())
            .fetch_all(self.pool())
            .await?;

        Ok((items, total))
    }

    async fn delete_export(
        &self,
        user: UserId,
        export_id: &str,
    ) -> StoreResult<Option<ExportRecord>> {
        let sql = format!(
            "DELETE FROM export_history WHERE user_id = $1 AND export_id = $2 \
             RETURNING {RECORD_COLUMNS}"
        );
        let deleted = sqlx::query_as::<_, ExportRecord>(&sql)
            .bind(user.get())
            .bind(export_id)
            .fetch_optional(self.pool())
            .await?;

        if deleted.is_some() {
            tracing::info!(user_id = %user, export_id = %export_id, "Deleted export record");
        }
        Ok(deleted)
    }

    async fn cleanup_exports(
        &self,
        user: UserId,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<CleanupSummary> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            DELETE FROM export_history
            WHERE user_id = $1 AND created_at < $2
            RETURNING entity_type, file_size
            "#,
        )
        .bind(user.get())
        .bind(cutoff)
        .fetch_all(self.pool())
        .await?;

        let mut summary = CleanupSummary::default();
        for (entity_type, file_size) in rows {
            summary.deleted_count += 1;
            summary.freed_space += file_size;
            *summary.deleted_by_type.entry(entity_type).or_insert(0) += 1;
        }

        tracing::info!(
            user_id = %user,
            deleted = summary.deleted_count,
            freed = summary.freed_space,
            "Cleaned up export history"
        );
        Ok(summary)
    }

    async fn export_stats(&self, user: UserId, now: DateTime<Utc>) -> StoreResult<ExportStats> {
        let recent_since = now - Duration::days(RECENT_EXPORT_DAYS);
        let (total_exports, recent_exports, total_file_size, average_file_size): (
            i64,
            i64,
            i64,
            Option<f64>,
        ) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE created_at >= $2),
                   COALESCE(SUM(file_size), 0)::BIGINT,
                   AVG(file_size)::FLOAT8
            FROM export_history
            WHERE user_id = $1
            "#,
        )
        .bind(user.get())
        .bind(recent_since)
        .fetch_one(self.pool())
        .await?;

        let by_type = sqlx::query_as::<_, KeyCount>(
            r#"
            SELECT entity_type AS key, COUNT(*) AS count
            FROM export_history
            WHERE user_id = $1
            GROUP BY entity_type
            ORDER BY count DESC, key
            "#,
        )
        .bind(user.get())
        .fetch_all(self.pool())
        .await?;

        let by_format = sqlx::query_as::<_, KeyCount>(
            r#"
            SELECT format AS key, COUNT(*) AS count
            FROM export_history
            WHERE user_id = $1
            GROUP BY format
            ORDER BY count DESC, key
            "#,
        )
        .bind(user.get())
        .fetch_all(self.pool())
        .await?;

        let today = now.date_naive();
        let sparse = sqlx::query_as::<_, DailyCount>(
            r#"
            SELECT (created_at AT TIME ZONE 'UTC')::date AS date, COUNT(*) AS count
            FROM export_history
            WHERE user_id = $1 AND (created_at AT TIME ZONE 'UTC')::date > $2
            GROUP BY 1
            "#,
        )
        .bind(user.get())
        .bind(today - Duration::days(TREND_DAYS))
        .fetch_all(self.pool())
        .await?;

        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM export_history WHERE user_id = $1 \
             ORDER BY created_at DESC, export_id DESC LIMIT $2"
        );
        let recent_exports_list = sqlx::query_as::<_, ExportRecord>(&sql)
            .bind(user.get())
            .bind(RECENT_EXPORT_LIST)
            .fetch_all(self.pool())
            .await?;

        let top_types = by_type.iter().take(TOP_TYPE_COUNT).cloned().collect();

        Ok(ExportStats {
            total_exports,
            recent_exports,
            total_file_size,
            average_file_size: average_file_size.unwrap_or(0.0),
            by_type,
            by_format,
            weekly_trend: fill_trend(today, &sparse),
            top_types,
            recent_exports_list,
        })
    }
}
