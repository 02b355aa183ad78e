//! Saved export templates.

use async_trait::async_trait;
use reading_core::{ExportTemplate, UserId};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::NewTemplate;
use crate::repository::TemplateRepository;
use crate::store::Store;

const TEMPLATE_COLUMNS: &str = r#"
    template_id, user_id, name, export_type, format, description, config,
    is_default, is_public, created_at, updated_at
"#;

/// Mint a template id of the form `tpl_<uuid>`.
pub fn mint_template_id() -> String {
    format!("tpl_{}", Uuid::new_v4().simple())
}

#[async_trait]
impl TemplateRepository for Store {
    async fn create_template(&self, template: NewTemplate) -> StoreResult<ExportTemplate> {
        let mut tx = self.pool().begin().await?;

        if template.is_default {
            sqlx::query(
                r#"
                UPDATE export_templates
                SET is_default = FALSE, updated_at = NOW()
                WHERE user_id = $1 AND export_type = $2 AND is_default
                "#,
            )
            .bind(template.user_id.get())
            .bind(template.export_type.as_str())
            .execute(&mut *tx)
            .await?;
        }

        let sql = format!(
            r#"
            INSERT INTO export_templates
                (template_id, user_id, name, export_type, format, description, config,
                 is_default, is_public)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TEMPLATE_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, ExportTemplate>(&sql)
            .bind(mint_template_id())
            .bind(template.user_id.get())
            .bind(&template.name)
            .bind(template.export_type.as_str())
            .bind(&template.format)
            .bind(&template.description)
            .bind(&template.config)
            .bind(template.is_default)
            .bind(template.is_public)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    StoreError::TemplateNameTaken(template.name.clone())
                }
                other => StoreError::Connection(other),
            })?;

        tx.commit().await?;

        tracing::info!(
            user_id = %template.user_id,
            template_id = %created.template_id,
            export_type = %created.export_type,
            "Created export template"
        );
        Ok(created)
    }

    async fn visible_templates(
        &self,
        user: UserId,
        export_type: Option<&str>,
    ) -> StoreResult<Vec<ExportTemplate>> {
        let sql = format!(
            r#"
            SELECT {TEMPLATE_COLUMNS}
            FROM export_templates
            WHERE (user_id = $1 OR is_public)
              AND ($2::TEXT IS NULL OR export_type = $2)
            ORDER BY is_default DESC, created_at DESC
            "#
        );
        Ok(sqlx::query_as::<_, ExportTemplate>(&sql)
            .bind(user.get())
            .bind(export_type)
            .fetch_all(self.pool())
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_ids_are_prefixed_and_unique() {
        let first = mint_template_id();
        let second = mint_template_id();
        assert!(first.starts_with("tpl_"));
        assert_eq!(first.len(), 4 + 32);
        assert_ne!(first, second);
    }
}
