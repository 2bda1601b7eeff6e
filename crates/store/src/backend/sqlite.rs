//! SQLite-backed record store.
//!
//! Records live in a `records` table and their metadata in `record_meta`, one
//! row per `(record, key)`. A [`QuerySpec`] is translated into a single
//! `WHERE` clause shared by the count and the page query, with each metadata
//! clause becoming an `EXISTS` sub-select.

use crate::RecordStore;
use crate::error::{ErrorKind, Result};
use crate::models::{Record, RecordId, Status};
use crate::query::{Compare, MetaClause, Order, Permission, QueryPage, QuerySpec, Relation, StatusFilter};
use async_trait::async_trait;
use exn::ResultExt;
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use std::path::Path;
use tracing::instrument;

/// Embedded migrations that are run automatically on connect.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
// Requests are served one query at a time; a couple of spares for importers.
const MAX_CONNECTIONS: u32 = 3;

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: i64,
    post_type: String,
    status: String,
}

/// Record store backed by an SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    name: String,
    pool: SqlitePool,
    read_private: bool,
}

impl SqliteStore {
    async fn new(options: SqliteConnectOptions, max: Option<u32>) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            // Applies the query-based PRAGMAs to every pooled connection, not
            // only the first one handed out.
            .after_connect(|conn, meta| Box::pin(async move { Self::apply_pragmas(conn, meta).await }))
            .max_connections(max.unwrap_or(MAX_CONNECTIONS))
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let store = Self {
            name: "sqlite".to_string(),
            pool,
            read_private: false,
        };
        store.migrate().await?;
        Ok(store)
    }

    /// Connect to the record database at the given path.
    ///
    /// Creates the database file if it doesn't exist and runs migrations.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = Self::base_options().filename(path.as_ref()).create_if_missing(true);
        Self::new(options, None).await
    }

    /// Connect to an in-memory database (useful for testing).
    ///
    /// Note:
    /// - In-memory databases are destroyed when the connection closes.
    /// - Do NOT apply `#[cfg(test)]` so that other crates can also use this in their tests.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = Self::base_options().filename(":memory:");
        // Every connection to ":memory:" is its own database, so the pool
        // must never open a second one.
        Self::new(options, Some(1)).await
    }

    fn base_options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .foreign_keys(true)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_millis(1500))
    }

    /// Apply additional PRAGMA settings that aren't exposed via SqliteConnectOptions.
    async fn apply_pragmas(conn: &mut SqliteConnection, _meta: PoolConnectionMetadata) -> sqlx::Result<()> {
        sqlx::query(
            r#"
                PRAGMA cache_size = -8192;
                PRAGMA temp_store = MEMORY;
                PRAGMA case_sensitive_like = OFF;
            "#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    #[instrument("performing database migrations", skip(self))]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    /// Change the name used for this store in logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Let readable-permission queries see private records.
    pub fn with_read_private(mut self, read_private: bool) -> Self {
        self.read_private = read_private;
        self
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the connection pool, waiting for connections to be returned.
    pub async fn close(&self) {
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }

    fn sql_id(id: RecordId) -> Result<i64> {
        i64::try_from(id.0).or_raise(|| ErrorKind::InvalidData("record id"))
    }

    /// Insert a record with its metadata, replacing any existing record (and
    /// all of its metadata) with the same identifier.
    pub async fn upsert_record(&self, record: &Record) -> Result<()> {
        let id = Self::sql_id(record.id)?;
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        sqlx::query(include_str!("../../queries/upsert_record.sql"))
            .bind(id)
            .bind(&record.post_type)
            .bind(record.status.as_str())
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        sqlx::query(include_str!("../../queries/delete_meta_for_record.sql"))
            .bind(id)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        for (key, value) in &record.meta {
            sqlx::query(include_str!("../../queries/upsert_meta.sql"))
                .bind(id)
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    /// Load a record and all of its metadata.
    pub async fn get_record(&self, id: RecordId) -> Result<Option<Record>> {
        let sql_id = Self::sql_id(id)?;
        let row: Option<RecordRow> = sqlx::query_as(include_str!("../../queries/get_record.sql"))
            .bind(sql_id)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let meta: Vec<(String, String)> = sqlx::query_as(include_str!("../../queries/get_meta_for_record.sql"))
            .bind(sql_id)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(Some(Record {
            id: RecordId(u64::try_from(row.id).or_raise(|| ErrorKind::InvalidData("record id"))?),
            post_type: row.post_type,
            status: Status::new(row.status),
            meta: meta.into_iter().collect(),
        }))
    }

    fn push_filters(&self, qb: &mut QueryBuilder<'_, Sqlite>, spec: &QuerySpec) {
        qb.push(" FROM records r WHERE r.post_type = ");
        qb.push_bind(spec.post_type.clone());
        match &spec.status {
            StatusFilter::Any => {
                qb.push(" AND r.status NOT IN (");
                qb.push_bind(Status::TRASH);
                qb.push(", ");
                qb.push_bind(Status::AUTO_DRAFT);
                qb.push(")");
            },
            StatusFilter::Only(statuses) if statuses.is_empty() => {
                qb.push(" AND 0");
            },
            StatusFilter::Only(statuses) => {
                qb.push(" AND r.status IN (");
                let mut list = qb.separated(", ");
                for status in statuses {
                    list.push_bind(status.as_str().to_string());
                }
                list.push_unseparated(")");
            },
        }
        if spec.permission == Permission::Readable && !self.read_private {
            qb.push(" AND r.status <> ");
            qb.push_bind(Status::PRIVATE);
        }
        if !spec.meta.is_empty() {
            let joiner = match spec.meta.relation {
                Relation::And => " AND ",
                Relation::Or => " OR ",
            };
            qb.push(" AND (");
            for (index, clause) in spec.meta.clauses.iter().enumerate() {
                if index > 0 {
                    qb.push(joiner);
                }
                Self::push_clause(qb, clause);
            }
            qb.push(")");
        }
    }

    fn push_clause(qb: &mut QueryBuilder<'_, Sqlite>, clause: &MetaClause) {
        qb.push("EXISTS (SELECT 1 FROM record_meta m WHERE m.record_id = r.id AND m.meta_key = ");
        qb.push_bind(clause.key.clone());
        match clause.compare {
            Compare::Equals => {
                qb.push(" AND m.meta_value = ");
                qb.push_bind(clause.value.clone());
            },
            Compare::Like => {
                qb.push(" AND m.meta_value LIKE ");
                qb.push_bind(like_pattern(&clause.value));
                qb.push(" ESCAPE '\\'");
            },
        }
        qb.push(")");
    }
}

/// Wrap a literal in `%` wildcards, escaping the wildcards it contains.
fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl RecordStore for SqliteStore {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, spec), fields(store = %self.name, post_type = %spec.post_type, page = spec.page))]
    async fn query(&self, spec: &QuerySpec) -> Result<QueryPage> {
        spec.validate()?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*)");
        self.push_filters(&mut count, spec);
        let found: i64 = count.build_query_scalar().fetch_one(&self.pool).await.or_raise(|| ErrorKind::Database)?;

        let mut select = QueryBuilder::<Sqlite>::new("SELECT r.id");
        self.push_filters(&mut select, spec);
        select.push(match spec.order {
            Order::Ascending => " ORDER BY r.id ASC",
            Order::Descending => " ORDER BY r.id DESC",
        });
        select.push(" LIMIT ");
        select.push_bind(i64::from(spec.per_page));
        select.push(" OFFSET ");
        select.push_bind(i64::try_from(spec.offset()).or_raise(|| ErrorKind::InvalidQuery("page offset"))?);
        let ids: Vec<i64> = select.build_query_scalar().fetch_all(&self.pool).await.or_raise(|| ErrorKind::Database)?;

        let records = ids
            .into_iter()
            .map(|id| u64::try_from(id).map(RecordId).or_raise(|| ErrorKind::InvalidData("record id")))
            .collect::<Result<Vec<_>>>()?;
        let found = u64::try_from(found).or_raise(|| ErrorKind::InvalidData("record count"))?;
        tracing::debug!(found, returned = records.len(), "Record query executed");
        Ok(QueryPage::new(records, found, spec.per_page))
    }

    async fn get_meta(&self, id: RecordId, key: &str) -> Result<String> {
        let value: Option<String> = sqlx::query_scalar(include_str!("../../queries/get_meta.sql"))
            .bind(Self::sql_id(id)?)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(value.unwrap_or_default())
    }
}
