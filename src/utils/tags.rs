use sqlx::PgPool;
use tracing::warn;

use crate::structs::tag::Tag;

use super::app_error::AppError;

/// Fixed palette assigned to new tags, picked deterministically from the
/// normalized name so the same tag always gets the same color.
const TAG_COLORS: &[&str] = &[
    "#ef4444", "#f97316", "#eab308", "#22c55e", "#06b6d4", "#3b82f6", "#8b5cf6", "#ec4899",
];

pub fn color_for_tag(name: &str) -> &'static str {
    let sum: usize = name.to_lowercase().bytes().map(usize::from).sum();
    TAG_COLORS[sum % TAG_COLORS.len()]
}

/// Create-or-reuse semantics: tag names are unique case-insensitively, so a
/// second `Rust` after a `rust` resolves to the existing row. Blank and
/// duplicate names in the input are dropped.
pub async fn upsert_tags(pool: &PgPool, names: &[String]) -> Result<Vec<Tag>, AppError> {
    let mut tags = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for name in names {
        let name = name.trim();
        if name.is_empty() || seen.iter().any(|s| s.eq_ignore_ascii_case(name)) {
            continue;
        }
        seen.push(name.to_string());

        let tag = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (name, color) VALUES ($1, $2)
             ON CONFLICT ((lower(name))) DO UPDATE SET name = tags.name
             RETURNING id, name, color",
        )
        .bind(name)
        .bind(color_for_tag(name))
        .fetch_one(pool)
        .await
        .map_err(|e| {
            warn!("Error upserting tag `{name}` : {e}");
            AppError::internal_server_error()
        })?;

        tags.push(tag);
    }

    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_is_deterministic_and_case_insensitive() {
        assert_eq!(color_for_tag("rust"), color_for_tag("rust"));
        assert_eq!(color_for_tag("Rust"), color_for_tag("rust"));
        assert!(TAG_COLORS.contains(&color_for_tag("changelog")));
    }
}
