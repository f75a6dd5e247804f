//! Shared list and lookup helpers for the resource services.

use crate::error::AppResult;
use crate::models::{PaginatedResponse, PaginationParams};
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Select,
};
use std::collections::HashMap;

/// Runs `select` as a page when a limit applies, otherwise returns every row.
pub async fn fetch_list<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    params: &PaginationParams,
    default_limit: Option<u64>,
) -> AppResult<PaginatedResponse<E::Model>>
where
    E: EntityTrait,
    E::Model: Sync,
{
    let Some(limit) = params.effective_limit(default_limit) else {
        let items = select.all(db).await?;
        return Ok(PaginatedResponse::unpaged(items));
    };

    let total = select.clone().count(db).await?;
    let items = select
        .limit(limit)
        .offset(params.get_offset(limit))
        .all(db)
        .await?;

    Ok(PaginatedResponse::new(items, params.get_page(), limit, total))
}

/// 批量加载引用记录，按 id 建索引
pub async fn load_by_ids<E, C>(
    db: &DatabaseConnection,
    id_column: C,
    ids: impl IntoIterator<Item = i64>,
    key: impl Fn(&E::Model) -> i64,
) -> AppResult<HashMap<i64, E::Model>>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = E::find().filter(id_column.is_in(ids)).all(db).await?;
    Ok(rows.into_iter().map(|m| (key(&m), m)).collect())
}

pub fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `%` `_` `\` 转义为字面字符
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// 子串匹配的 LIKE 模式
pub fn contains_pattern(term: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(term))).escape('\\')
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::{Alias, Expr, PostgresQueryBuilder, Query};

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_uni"), r"100\%\_uni");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("Oxford"), "Oxford");
    }

    #[test]
    fn test_contains_pattern_sets_escape_char() {
        let sql = Query::select()
            .column(Alias::new("name"))
            .from(Alias::new("colleges"))
            .and_where(Expr::col(Alias::new("name")).like(contains_pattern("uni")))
            .to_string(PostgresQueryBuilder);
        assert!(sql.contains("LIKE"), "{sql}");
        assert!(sql.contains("ESCAPE"), "{sql}");
    }

    #[test]
    fn test_trimmed() {
        assert_eq!(trimmed(Some("  Delhi ".into())), Some("Delhi".to_string()));
        assert_eq!(trimmed(Some("   ".into())), None);
        assert_eq!(trimmed(None), None);
    }
}
