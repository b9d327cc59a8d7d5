#![forbid(unsafe_code)]

const DEFAULT_OFFSET: &str = "0";

/// Append ` LIMIT <limit> OFFSET <offset>` when a non-empty `limit` is given.
///
/// `offset` alone has no effect. Neither value is checked for being numeric.
pub fn paginate(sql: &str, limit: Option<&str>, offset: Option<&str>) -> String {
    let Some(limit) = limit.filter(|v| !v.is_empty()) else {
        return sql.to_string();
    };
    let offset = offset.filter(|v| !v.is_empty()).unwrap_or(DEFAULT_OFFSET);
    format!("{sql} LIMIT {limit} OFFSET {offset}")
}
