//! Generic record repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over any feature table implementing [`Record`].
//! - Translate [`RecordQuery`] filters into parameterized SQL.
//!
//! # Invariants
//! - `insert` stamps `created_at` and `updated_at` from the repository clock.
//! - `update` refreshes `updated_at` and never touches `created_at`.
//! - Filter columns are checked against the record's declared columns before
//!   they are interpolated into SQL.

use crate::clock::{system_clock, SharedClock};
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::{RecordId, RecordMeta, TimeRange, ValidationError};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use uuid::Uuid;

const META_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound(RecordId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Table binding for one feature record type.
///
/// `COLUMNS` lists the feature columns (everything except `id`,
/// `created_at`, `updated_at`) in the order `column_values` returns them.
pub trait Record: Sized {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    /// Column used by [`RecordQuery::range`].
    const DATE_COLUMN: &'static str;
    /// Columns matched by [`RecordQuery::text`].
    const SEARCH_COLUMNS: &'static [&'static str];
    const ORDER_BY: &'static str;

    fn meta(&self) -> &RecordMeta;
    fn meta_mut(&mut self) -> &mut RecordMeta;
    fn validate(&self) -> Result<(), ValidationError>;
    fn column_values(&self) -> Vec<Value>;
    fn from_row(meta: RecordMeta, row: &Row<'_>) -> RepoResult<Self>;
}

/// Equality predicate over one declared column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub column: &'static str,
    pub value: Value,
}

/// Query options for listing records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    pub filters: Vec<ColumnFilter>,
    /// Half-open window over `Record::DATE_COLUMN`.
    pub range: Option<TimeRange>,
    /// Case-insensitive substring match over `Record::SEARCH_COLUMNS`.
    pub text: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl RecordQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(ColumnFilter {
            column,
            value: value.into(),
        });
        self
    }

    pub fn within(mut self, range: TimeRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn matching(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text = (!text.trim().is_empty()).then(|| text.trim().to_string());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Generic CRUD contract shared by every feature table.
pub trait Repository<R: Record> {
    /// Validates, stamps timestamps and inserts; returns the record id.
    fn insert(&self, record: &mut R) -> RepoResult<RecordId>;
    /// Validates, refreshes `updated_at` and replaces all feature columns.
    fn update(&self, record: &mut R) -> RepoResult<()>;
    fn get(&self, id: RecordId) -> RepoResult<Option<R>>;
    fn list(&self, query: &RecordQuery) -> RepoResult<Vec<R>>;
    /// Like `list`, but a row that fails to decode yields its own `Err`
    /// instead of failing the whole call.
    fn scan(&self, query: &RecordQuery) -> RepoResult<Vec<RepoResult<R>>>;
    fn count(&self, query: &RecordQuery) -> RepoResult<u64>;
    fn delete(&self, id: RecordId) -> RepoResult<()>;
}

/// SQLite-backed repository for one record type.
pub struct SqliteRepository<'conn, R: Record> {
    conn: &'conn Connection,
    clock: SharedClock,
    _record: PhantomData<fn() -> R>,
}

impl<'conn, R: Record> SqliteRepository<'conn, R> {
    /// Constructs a repository over a migrated connection using system time.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Self::try_with_clock(conn, system_clock())
    }

    /// Constructs a repository with an explicit clock.
    pub fn try_with_clock(conn: &'conn Connection, clock: SharedClock) -> RepoResult<Self> {
        ensure_connection_ready(conn, R::TABLE)?;
        Ok(Self {
            conn,
            clock,
            _record: PhantomData,
        })
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    fn select_sql() -> String {
        format!(
            "SELECT {}, {} FROM {}",
            META_COLUMNS.join(", "),
            R::COLUMNS.join(", "),
            R::TABLE
        )
    }

    fn build_where(query: &RecordQuery) -> RepoResult<(String, Vec<Value>)> {
        let mut sql = String::from(" WHERE 1 = 1");
        let mut binds = Vec::new();

        for filter in &query.filters {
            if !is_declared_column::<R>(filter.column) {
                return Err(RepoError::InvalidData(format!(
                    "unknown column `{}` for table {}",
                    filter.column,
                    R::TABLE
                )));
            }
            if filter.value == Value::Null {
                sql.push_str(&format!(" AND {} IS NULL", filter.column));
            } else {
                sql.push_str(&format!(" AND {} = ?", filter.column));
                binds.push(filter.value.clone());
            }
        }

        if let Some(range) = query.range {
            sql.push_str(&format!(
                " AND {0} >= ? AND {0} < ?",
                R::DATE_COLUMN
            ));
            binds.push(Value::Integer(range.start_ms));
            binds.push(Value::Integer(range.end_ms));
        }

        if let Some(text) = query.text.as_deref() {
            if !R::SEARCH_COLUMNS.is_empty() {
                let pattern = format!("%{}%", escape_like(text));
                let clauses = R::SEARCH_COLUMNS
                    .iter()
                    .map(|column| format!("{column} LIKE ? ESCAPE '\\'"))
                    .collect::<Vec<_>>();
                sql.push_str(&format!(" AND ({})", clauses.join(" OR ")));
                for _ in R::SEARCH_COLUMNS {
                    binds.push(Value::Text(pattern.clone()));
                }
            }
        }

        Ok((sql, binds))
    }

    fn query_rows(&self, query: &RecordQuery) -> RepoResult<Vec<RepoResult<R>>> {
        let (where_sql, mut binds) = Self::build_where(query)?;
        let mut sql = format!("{}{} ORDER BY {}", Self::select_sql(), where_sql, R::ORDER_BY);

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            binds.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                binds.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            binds.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(decode_row::<R>(row));
        }
        Ok(records)
    }
}

impl<R: Record> Repository<R> for SqliteRepository<'_, R> {
    fn insert(&self, record: &mut R) -> RepoResult<RecordId> {
        record.validate()?;

        let now = self.clock.now_ms();
        {
            let meta = record.meta_mut();
            meta.created_at = now;
            meta.updated_at = now;
        }

        let meta = *record.meta();
        let mut values = vec![
            Value::Text(meta.id.to_string()),
            Value::Integer(meta.created_at),
            Value::Integer(meta.updated_at),
        ];
        values.extend(record.column_values());

        let placeholders = (1..=values.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}, {}) VALUES ({});",
            R::TABLE,
            META_COLUMNS.join(", "),
            R::COLUMNS.join(", "),
            placeholders
        );
        self.conn.execute(&sql, params_from_iter(values))?;

        Ok(meta.id)
    }

    fn update(&self, record: &mut R) -> RepoResult<()> {
        record.validate()?;

        let previous = record.meta().updated_at;
        let now = self.clock.now_ms();
        record.meta_mut().updated_at = now;

        let assignments = R::COLUMNS
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let id_index = R::COLUMNS.len() + 2;
        let sql = format!(
            "UPDATE {} SET updated_at = ?1, {} WHERE id = ?{};",
            R::TABLE,
            assignments,
            id_index
        );

        let mut values = vec![Value::Integer(now)];
        values.extend(record.column_values());
        values.push(Value::Text(record.meta().id.to_string()));

        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            record.meta_mut().updated_at = previous;
            return Err(RepoError::NotFound(record.meta().id));
        }

        Ok(())
    }

    fn get(&self, id: RecordId) -> RepoResult<Option<R>> {
        let sql = format!("{} WHERE id = ?1;", Self::select_sql());
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return decode_row::<R>(row).map(Some);
        }
        Ok(None)
    }

    fn list(&self, query: &RecordQuery) -> RepoResult<Vec<R>> {
        self.query_rows(query)?.into_iter().collect()
    }

    fn scan(&self, query: &RecordQuery) -> RepoResult<Vec<RepoResult<R>>> {
        self.query_rows(query)
    }

    fn count(&self, query: &RecordQuery) -> RepoResult<u64> {
        let (where_sql, binds) = Self::build_where(query)?;
        let sql = format!("SELECT COUNT(*) FROM {}{};", R::TABLE, where_sql);
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(binds), |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative count {count}")))
    }

    fn delete(&self, id: RecordId) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", R::TABLE),
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn decode_row<R: Record>(row: &Row<'_>) -> RepoResult<R> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, R::TABLE)?;
    let meta = RecordMeta {
        id,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    let record = R::from_row(meta, row)?;
    record.validate().map_err(|err| {
        RepoError::InvalidData(format!("{}.{id} fails validation: {err}", R::TABLE))
    })?;
    Ok(record)
}

fn is_declared_column<R: Record>(column: &str) -> bool {
    META_COLUMNS
        .iter()
        .chain(R::COLUMNS.iter())
        .any(|declared| *declared == column)
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub(crate) fn parse_uuid(value: &str, table: &str) -> RepoResult<RecordId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {table}.id")))
}

fn ensure_connection_ready(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::MissingRequiredTable(table));
    }
    Ok(())
}
