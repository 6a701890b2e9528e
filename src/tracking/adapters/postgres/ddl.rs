//! SQL text for metric shard tables.
//!
//! Diesel's `table!` macro binds a schema to one fixed table name, so shard
//! statements are rendered from the validated [`ShardTable`] name instead.
//! Every value is still passed as a bind parameter.

use crate::tracking::domain::ShardTable;

/// Indexed columns paired with the suffix of their index name.
const INDEXED_COLUMNS: [(&str, &str); 5] = [
    ("f_role", "role_idx"),
    ("f_party_id", "party_id_idx"),
    ("f_metric_namespace", "namespace_idx"),
    ("f_metric_name", "name_idx"),
    ("f_type", "type_idx"),
];

/// Column list shared by inserts and selects, in bind order.
pub(super) const INSERT_COLUMNS: &str = concat!(
    "f_job_id, f_component_name, f_task_id, f_role, f_party_id, ",
    "f_metric_namespace, f_metric_name, f_key, f_value, f_type, ",
    "f_create_time, f_update_time",
);

/// Quotes a table or index name as a `PostgreSQL` identifier.
pub(super) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Renders the idempotent DDL that materializes one shard table.
pub(super) fn create_shard_sql(table: &ShardTable) -> String {
    let quoted = quote_identifier(table.as_str());
    let mut sql = format!(
        concat!(
            "CREATE TABLE IF NOT EXISTS {table} (\n",
            "    f_id BIGSERIAL PRIMARY KEY,\n",
            "    f_job_id VARCHAR(100) NOT NULL,\n",
            "    f_component_name TEXT NOT NULL,\n",
            "    f_task_id VARCHAR(100) NOT NULL,\n",
            "    f_role VARCHAR(50) NOT NULL,\n",
            "    f_party_id VARCHAR(50) NOT NULL,\n",
            "    f_metric_namespace VARCHAR(200) NOT NULL,\n",
            "    f_metric_name VARCHAR(500) NOT NULL,\n",
            "    f_key VARCHAR(200) NOT NULL,\n",
            "    f_value TEXT NOT NULL,\n",
            "    f_type INTEGER NOT NULL,\n",
            "    f_create_time TIMESTAMPTZ NOT NULL,\n",
            "    f_update_time TIMESTAMPTZ\n",
            ");\n",
        ),
        table = quoted,
    );
    for (column, suffix) in INDEXED_COLUMNS {
        let index = quote_identifier(&format!("{}_{suffix}", table.as_str()));
        sql.push_str(&format!(
            "CREATE INDEX IF NOT EXISTS {index} ON {quoted} ({column});\n"
        ));
    }
    sql
}

/// Renders the insert statement for a shard, returning the assigned id.
pub(super) fn insert_sql(table: &ShardTable) -> String {
    format!(
        concat!(
            "INSERT INTO {table} ({columns}) ",
            "VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) ",
            "RETURNING f_id",
        ),
        table = quote_identifier(table.as_str()),
        columns = INSERT_COLUMNS,
    )
}

/// Renders the full-row update statement for a shard.
pub(super) fn update_sql(table: &ShardTable) -> String {
    format!(
        concat!(
            "UPDATE {table} SET f_job_id = $1, f_component_name = $2, f_task_id = $3, ",
            "f_role = $4, f_party_id = $5, f_metric_namespace = $6, f_metric_name = $7, ",
            "f_key = $8, f_value = $9, f_type = $10, f_create_time = $11, ",
            "f_update_time = $12 WHERE f_id = $13",
        ),
        table = quote_identifier(table.as_str()),
    )
}

/// Renders the filtered select for a shard.
///
/// Each predicate is disabled by binding `NULL` to its parameter.
pub(super) fn select_sql(table: &ShardTable) -> String {
    format!(
        concat!(
            "SELECT f_id, {columns} FROM {table} WHERE ",
            "($1::text IS NULL OR f_job_id = $1) AND ",
            "($2::text IS NULL OR f_component_name = $2) AND ",
            "($3::text IS NULL OR f_task_id = $3) AND ",
            "($4::text IS NULL OR f_role = $4) AND ",
            "($5::text IS NULL OR f_party_id = $5) AND ",
            "($6::text IS NULL OR f_metric_namespace = $6) AND ",
            "($7::text IS NULL OR f_metric_name = $7) AND ",
            "($8::text IS NULL OR f_key = $8) AND ",
            "($9::integer IS NULL OR f_type = $9) ",
            "ORDER BY f_id",
        ),
        columns = INSERT_COLUMNS,
        table = quote_identifier(table.as_str()),
    )
}
