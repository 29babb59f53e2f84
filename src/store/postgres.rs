//! PostgreSQL backend: one JSONB row per (namespace, key). The table lives in a schema named from `BREAKFAST_SCHEMA` env (default `breakfast`).

use crate::error::AppError;
use crate::store::backend::{KvBackend, KvOp};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::collections::HashMap;
use std::str::FromStr;

const KV_TABLE: &str = "_kv_data";

/// Returns schema-qualified table name (e.g. "breakfast._kv_data").
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", schema, table)
}

#[derive(Clone)]
pub struct PostgresBackend {
    pool: PgPool,
    table: String,
}

impl PostgresBackend {
    /// Wrap a pool. Call [`ensure_kv_tables`] first.
    pub fn new(pool: PgPool, schema: &str) -> Self {
        Self {
            pool,
            table: qualified_table(schema, KV_TABLE),
        }
    }
}

/// Create the schema if not exists, then the KV table.
pub async fn ensure_kv_tables(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", schema))
        .execute(pool)
        .await?;
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            namespace TEXT NOT NULL,
            key TEXT NOT NULL,
            value JSONB NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (namespace, key)
        )
        "#,
        qualified_table(schema, KV_TABLE)
    );
    sqlx::query(&ddl).execute(pool).await?;
    Ok(())
}

#[async_trait]
impl KvBackend for PostgresBackend {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, AppError> {
        let sql = format!("SELECT value FROM {} WHERE namespace = $1 AND key = $2", self.table);
        tracing::debug!(sql = %sql, namespace, key, "query");
        let row: Option<(Value,)> = sqlx::query_as(&sql)
            .bind(namespace)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.0))
    }

    async fn get_many(&self, namespace: &str, keys: &[String]) -> Result<Vec<Option<Value>>, AppError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT key, value FROM {} WHERE namespace = $1 AND key = ANY($2)",
            self.table
        );
        tracing::debug!(sql = %sql, namespace, count = keys.len(), "query");
        let rows: Vec<(String, Value)> = sqlx::query_as(&sql)
            .bind(namespace)
            .bind(keys)
            .fetch_all(&self.pool)
            .await?;
        let mut by_key: HashMap<String, Value> = rows.into_iter().collect();
        Ok(keys.iter().map(|k| by_key.remove(k)).collect())
    }

    async fn write_batch(&self, ops: Vec<KvOp>) -> Result<(), AppError> {
        if ops.is_empty() {
            return Ok(());
        }
        let upsert = format!(
            r#"
            INSERT INTO {} (namespace, key, value, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (namespace, key)
            DO UPDATE SET value = $3, updated_at = NOW()
            "#,
            self.table
        );
        let delete = format!("DELETE FROM {} WHERE namespace = $1 AND key = $2", self.table);
        // Row locks taken by the upsert/update serialize concurrent index writers.
        let index_append = format!(
            r#"
            INSERT INTO {} AS kv (namespace, key, value, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (namespace, key)
            DO UPDATE SET value = kv.value || COALESCE((
                SELECT jsonb_agg(e ORDER BY ord)
                FROM jsonb_array_elements(EXCLUDED.value) WITH ORDINALITY AS x(e, ord)
                WHERE NOT kv.value @> jsonb_build_array(e)
            ), '[]'::jsonb), updated_at = NOW()
            "#,
            self.table
        );
        let index_remove = format!(
            r#"
            UPDATE {} SET value = COALESCE((
                SELECT jsonb_agg(e ORDER BY ord)
                FROM jsonb_array_elements(value) WITH ORDINALITY AS x(e, ord)
                WHERE NOT $3::jsonb @> jsonb_build_array(e)
            ), '[]'::jsonb), updated_at = NOW()
            WHERE namespace = $1 AND key = $2
            "#,
            self.table
        );
        tracing::debug!(ops = ops.len(), "write batch (tx)");
        let mut tx = self.pool.begin().await?;
        for op in &ops {
            match op {
                KvOp::Put { namespace, key, value } => {
                    sqlx::query(&upsert)
                        .bind(namespace)
                        .bind(key)
                        .bind(value)
                        .execute(&mut *tx)
                        .await?;
                }
                KvOp::Delete { namespace, key } => {
                    sqlx::query(&delete)
                        .bind(namespace)
                        .bind(key)
                        .execute(&mut *tx)
                        .await?;
                }
                KvOp::IndexAppend { namespace, key, ids } => {
                    sqlx::query(&index_append)
                        .bind(namespace)
                        .bind(key)
                        .bind(Value::from(ids.clone()))
                        .execute(&mut *tx)
                        .await?;
                }
                KvOp::IndexRemove { namespace, key, ids } => {
                    sqlx::query(&index_remove)
                        .bind(namespace)
                        .bind(key)
                        .bind(Value::from(ids.clone()))
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }
        tx.commit().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_name_is_split_from_url() {
        let (admin, name) = parse_db_name_from_url("postgres://u:p@localhost:5432/breakfast?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(name, "breakfast");
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(qualified_table("breakfast", KV_TABLE), "breakfast._kv_data");
    }
}
