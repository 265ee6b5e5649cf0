//! SQLite catalog backed by `rusqlite`.
//!
//! Metadata comes from the `pragma_*` table-valued functions. SQLite has no
//! named primary/foreign key constraints and no stored procedures, so
//! constraints are synthesized as `{table}_{column}_pk` / `{table}_{column}_fk`
//! and the procedure list is always empty.
//!
//! Every call runs on tokio's blocking pool. Dropping a pending [`query`]
//! future (e.g. when a timeout fires) interrupts the running statement.
//!
//! [`query`]: CatalogConnector::query

use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, InterruptHandle};
use serde_json::Value;

use super::{CatalogConnector, CatalogError, CatalogResult, ForeignKeyInfo, Row};
use crate::config::Engine;
use crate::model::{Column, ConstraintInfo, ConstraintType, IndexInfo, ViewInfo};

pub struct SqliteCatalog {
    conn: Arc<Mutex<Connection>>,
    interrupt: Arc<InterruptHandle>,
}

impl SqliteCatalog {
    /// Open an existing database file.
    pub fn open<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CatalogError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("SQLite database not found: {}", path.display()),
            )));
        }
        Ok(Self::from_connection(Connection::open(path)?))
    }

    /// Open an empty in-memory database (for testing).
    pub fn open_in_memory() -> CatalogResult<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        let interrupt = Arc::new(conn.get_interrupt_handle());
        Self {
            conn: Arc::new(Mutex::new(conn)),
            interrupt,
        }
    }

    /// Run DDL/DML statements, e.g. to seed a test database.
    pub fn execute_batch(&self, sql: &str) -> CatalogResult<()> {
        let conn = lock(&self.conn)?;
        Ok(conn.execute_batch(sql)?)
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> CatalogResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> CatalogResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn)?;
            f(&conn)
        })
            .await
            .map_err(|e| CatalogError::Query(format!("SQLite task failed: {}", e)))?
    }

    fn table_exists(conn: &Connection, table: &str) -> CatalogResult<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn columns(conn: &Connection, table: &str) -> CatalogResult<Vec<Column>> {
        let mut stmt = conn.prepare(
            "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1) ORDER BY cid",
        )?;
        let columns = stmt
            .query_map(params![table], |row| {
                let notnull: i64 = row.get(2)?;
                let pk: i64 = row.get(3)?;
                Ok(Column {
                    name: row.get(0)?,
                    data_type: row.get(1)?,
                    is_nullable: notnull == 0,
                    is_primary_key: pk > 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    fn foreign_keys(conn: &Connection, table: &str) -> CatalogResult<Vec<ForeignKeyInfo>> {
        let mut stmt = conn.prepare(
            "SELECT \"from\", \"table\", \"to\" FROM pragma_foreign_key_list(?1) ORDER BY id, seq",
        )?;
        let fks = stmt
            .query_map(params![table], |row| {
                Ok(ForeignKeyInfo {
                    column_name: row.get(0)?,
                    referenced_table: row.get(1)?,
                    // NULL `to` means "the referenced table's primary key"
                    referenced_column: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(fks)
    }

    /// Resolve implicit `REFERENCES parent` targets to the parent's primary key.
    fn resolve_implicit_targets(
        conn: &Connection,
        fks: Vec<ForeignKeyInfo>,
    ) -> CatalogResult<Vec<ForeignKeyInfo>> {
        fks.into_iter()
            .map(|mut fk| {
                if fk.referenced_column.is_empty() {
                    if let Some(pk) = Self::columns(conn, &fk.referenced_table)?
                        .into_iter()
                        .find(|c| c.is_primary_key)
                    {
                        fk.referenced_column = pk.name;
                    }
                }
                Ok(fk)
            })
            .collect()
    }
}

fn lock(conn: &Mutex<Connection>) -> CatalogResult<std::sync::MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| CatalogError::Query("SQLite connection lock poisoned".to_string()))
}

const PENDING: u8 = 0;
const RUNNING: u8 = 1;
const DONE: u8 = 2;
const CANCELLED: u8 = 3;

/// Interrupts the statement of a query whose future was dropped mid-run.
///
/// A query still waiting for the connection is skipped instead.
struct InterruptOnDrop {
    interrupt: Arc<InterruptHandle>,
    state: Arc<AtomicU8>,
}

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        if self.state.swap(CANCELLED, Ordering::SeqCst) == RUNNING {
            self.interrupt.interrupt();
        }
    }
}

fn run_query(conn: &Connection, sql: &str) -> CatalogResult<Vec<Row>> {
    let mut stmt = conn.prepare(sql)?;
    let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut map = Row::new();
        for (i, name) in names.iter().enumerate() {
            map.insert(name.clone(), json_value(row.get_ref(i)?));
        }
        out.push(map);
    }
    Ok(out)
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

#[async_trait]
impl CatalogConnector for SqliteCatalog {
    fn engine(&self) -> Engine {
        Engine::Sqlite
    }

    async fn get_tables(&self) -> CatalogResult<Vec<String>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY rowid",
            )?;
            let names = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(names)
        })
        .await
    }

    async fn get_columns(&self, table: &str) -> CatalogResult<Vec<Column>> {
        let table = table.to_string();
        self.with_conn(move |conn| {
            let table = table.as_str();
            if !Self::table_exists(conn, table)? {
                return Err(CatalogError::TableNotFound(table.to_string()));
            }
            Self::columns(conn, table)
        })
        .await
    }

    async fn get_foreign_keys(&self, table: &str) -> CatalogResult<Vec<ForeignKeyInfo>> {
        let table = table.to_string();
        self.with_conn(move |conn| {
            let table = table.as_str();
            let fks = Self::foreign_keys(conn, table)?;
            Self::resolve_implicit_targets(conn, fks)
        })
        .await
    }

    async fn get_indexes(&self, table: &str) -> CatalogResult<Vec<IndexInfo>> {
        let table = table.to_string();
        self.with_conn(move |conn| {
            let table = table.as_str();
            let mut list =
                conn.prepare("SELECT name, \"unique\" FROM pragma_index_list(?1) ORDER BY seq")?;
            let index_list = list
                .query_map(params![table], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? == 1))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            let mut info =
                conn.prepare("SELECT name FROM pragma_index_info(?1) ORDER BY seqno")?;
            let mut indexes = Vec::new();
            for (name, is_unique) in index_list {
                // Expression index columns have no name
                let columns = info
                    .query_map(params![name], |row| row.get::<_, Option<String>>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                for column_name in columns.into_iter().flatten() {
                    indexes.push(IndexInfo {
                        name: name.clone(),
                        column_name,
                        is_unique,
                    });
                }
            }
            Ok(indexes)
        })
        .await
    }

    async fn get_constraints(&self, table: &str) -> CatalogResult<Vec<ConstraintInfo>> {
        let table = table.to_string();
        self.with_conn(move |conn| {
            let table = table.as_str();
            let primary = Self::columns(conn, table)?
                .into_iter()
                .filter(|c| c.is_primary_key)
                .map(|c| ConstraintInfo {
                    name: format!("{}_{}_pk", table, c.name),
                    constraint_type: ConstraintType::PrimaryKey,
                    definition: None,
                });
            let foreign = Self::foreign_keys(conn, table)?
                .into_iter()
                .map(|fk| ConstraintInfo {
                    name: format!("{}_{}_fk", table, fk.column_name),
                    constraint_type: ConstraintType::ForeignKey,
                    definition: Some(format!(
                        "FOREIGN KEY ({}) REFERENCES {}({})",
                        fk.column_name, fk.referenced_table, fk.referenced_column
                    )),
                });
            Ok(primary.chain(foreign).collect())
        })
        .await
    }

    async fn get_views(&self) -> CatalogResult<Vec<ViewInfo>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT name, sql FROM sqlite_master WHERE type = 'view' ORDER BY rowid",
            )?;
            let views = stmt
                .query_map([], |row| {
                    Ok(ViewInfo {
                        name: row.get(0)?,
                        definition: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                        is_materialized: false,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(views)
        })
        .await
    }

    async fn query(&self, sql: &str) -> CatalogResult<Vec<Row>> {
        let state = Arc::new(AtomicU8::new(PENDING));
        let _guard = InterruptOnDrop {
            interrupt: Arc::clone(&self.interrupt),
            state: Arc::clone(&state),
        };
        let sql = sql.to_string();
        self.with_conn(move |conn| {
            if state
                .compare_exchange(PENDING, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return Err(CatalogError::Query("query cancelled".to_string()));
            }
            let rows = run_query(conn, &sql);
            let _ = state.compare_exchange(RUNNING, DONE, Ordering::SeqCst, Ordering::SeqCst);
            rows
        })
        .await
    }
}
