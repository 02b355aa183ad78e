//! Request checks shared by the export handlers.
//!
//! Format and id-list checks never touch storage, so an export with a bad
//! format or id list is rejected before any query runs.

use chrono::NaiveDate;
use reading_core::{ExportFormat, ExportKind, UserId};
use reading_store::{missing_ids, Backend, OwnedEntity};
use serde_json::json;

use crate::error::{ApiError, ApiResult};

/// Resolve the requested format against the kind's allow-list. `None`
/// selects the recommended format.
pub fn export_format(kind: ExportKind, requested: Option<&str>) -> ApiResult<ExportFormat> {
    let Some(raw) = requested else {
        return Ok(kind.recommended_format());
    };

    match raw.parse::<ExportFormat>() {
        Ok(format) if kind.supports(format) => Ok(format),
        _ => Err(ApiError::validation_with(
            format!("unsupported format {raw:?} for {kind} exports"),
            json!({ "format": raw, "supported_formats": kind.formats() }),
        )),
    }
}

/// Details key naming the ids of an owned entity.
pub fn ids_field(entity: OwnedEntity) -> &'static str {
    match entity {
        OwnedEntity::Document => "document_ids",
        OwnedEntity::Note => "note_ids",
        OwnedEntity::Vocabulary => "vocabulary_ids",
        OwnedEntity::ReviewSession => "review_ids",
    }
}

/// Reject an empty id list or one above the kind's limit.
pub fn id_list(kind: ExportKind, entity: OwnedEntity, ids: &[i64]) -> ApiResult<()> {
    let field = ids_field(entity);
    if ids.is_empty() {
        return Err(ApiError::validation_with(
            format!("{field} must contain at least one id"),
            json!({ "field": field }),
        ));
    }
    if let Some(max) = kind.max_ids() {
        if ids.len() > max {
            return Err(ApiError::validation_with(
                format!("{field} may contain at most {max} ids"),
                json!({ "field": field, "max": max, "requested": ids.len() }),
            ));
        }
    }
    Ok(())
}

/// Fail unless every id exists and belongs to `user`. The error lists the
/// offending ids in request order.
pub async fn ensure_owned(
    backend: &dyn Backend,
    user: UserId,
    kind: ExportKind,
    entity: OwnedEntity,
    ids: &[i64],
) -> ApiResult<()> {
    let found = backend.owned_ids(user, entity, ids).await?;
    let missing = missing_ids(ids, &found);
    if missing.is_empty() {
        return Ok(());
    }

    tracing::debug!(user_id = %user, ?entity, ?missing, "Export names ids the user does not own");
    let field = ids_field(entity);
    Err(ApiError::not_found(
        kind.not_found_code(),
        format!("{} requested ids do not exist or are not yours", missing.len()),
        json!({ field: missing }),
    ))
}

/// Parse `yyyy-MM-dd,yyyy-MM-dd` into an inclusive range.
pub fn date_range(raw: &str) -> ApiResult<(NaiveDate, NaiveDate)> {
    let invalid = || {
        ApiError::validation_with(
            "date_range must be \"yyyy-MM-dd,yyyy-MM-dd\"",
            json!({ "date_range": raw }),
        )
    };

    let (start, end) = raw.split_once(',').ok_or_else(invalid)?;
    let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
    let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
    if end < start {
        return Err(ApiError::validation_with(
            "date_range ends before it starts",
            json!({ "date_range": raw }),
        ));
    }
    Ok((start, end))
}

/// Length of `value` in characters after trimming, checked against bounds.
pub fn text_length(field: &str, value: &str, min: usize, max: usize) -> ApiResult<()> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        let message = if min == 0 {
            format!("{field} must be at most {max} characters")
        } else {
            format!("{field} must be {min}-{max} characters")
        };
        return Err(ApiError::validation_with(
            message,
            json!({ "field": field, "length": len }),
        ));
    }
    Ok(())
}
