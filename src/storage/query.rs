//! Table-agnostic insert/select/update helpers.
//!
//! Every content handler goes through these builders instead of hand-writing
//! SQL, so filtering, ordering and paging read the same way for all four
//! tables. Column names are `&'static str` supplied by this crate, never by
//! callers; all values are bound as parameters.
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, Sqlite};

use super::schema::Database;

/// Static description of one content table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Table {
    pub name: &'static str,
    /// Human-readable entity name used in error messages.
    pub entity: &'static str,
    /// Column list selected and returned by every query on this table.
    pub columns: &'static str,
}

/// A bindable column value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Integer(i64),
    Text(String),
    Bool(bool),
    Null,
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

fn push_value(builder: &mut QueryBuilder<'static, Sqlite>, value: &Value) {
    match value {
        Value::Integer(v) => builder.push_bind(*v),
        Value::Text(v) => builder.push_bind(v.clone()),
        Value::Bool(v) => builder.push_bind(*v),
        Value::Null => builder.push_bind(Option::<i64>::None),
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Filter {
    Eq(&'static str, Value),
    NotEq(&'static str, Value),
}

fn push_filters(builder: &mut QueryBuilder<'static, Sqlite>, filters: &[Filter]) {
    for (i, filter) in filters.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        match filter {
            Filter::Eq(column, Value::Null) => {
                builder.push(*column).push(" IS NULL");
            }
            Filter::NotEq(column, Value::Null) => {
                builder.push(*column).push(" IS NOT NULL");
            }
            Filter::Eq(column, value) => {
                builder.push(*column).push(" = ");
                push_value(builder, value);
            }
            Filter::NotEq(column, value) => {
                builder.push(*column).push(" != ");
                push_value(builder, value);
            }
        }
    }
}

// ============================================================================
// Select
// ============================================================================

/// `SELECT <columns> FROM <table> [WHERE ..] [ORDER BY ..] [LIMIT .. OFFSET ..]`
#[derive(Debug, Clone)]
pub(crate) struct Select {
    table: Table,
    filters: Vec<Filter>,
    order: Vec<(&'static str, Direction)>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Select {
    pub fn from_table(table: Table) -> Self {
        Self {
            table,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn filter(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column, value.into()));
        self
    }

    pub fn exclude(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::NotEq(column, value.into()));
        self
    }

    /// Append a sort key; earlier keys take precedence.
    pub fn order_by(mut self, column: &'static str, direction: Direction) -> Self {
        self.order.push((column, direction));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    fn build(&self, columns: &str) -> QueryBuilder<'static, Sqlite> {
        let mut builder = QueryBuilder::new(format!("SELECT {} FROM {}", columns, self.table.name));
        push_filters(&mut builder, &self.filters);

        for (i, (column, direction)) in self.order.iter().enumerate() {
            builder.push(if i == 0 { " ORDER BY " } else { ", " });
            builder.push(*column).push(" ").push(direction.as_sql());
        }

        // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
        match (self.limit, self.offset) {
            (None, None) => {}
            (limit, offset) => {
                builder.push(" LIMIT ");
                builder.push_bind(limit.unwrap_or(-1));
                if let Some(offset) = offset {
                    builder.push(" OFFSET ");
                    builder.push_bind(offset);
                }
            }
        }
        builder
    }

    #[cfg(test)]
    fn sql(&self) -> String {
        self.build(self.table.columns).into_sql()
    }
}

// ============================================================================
// Insert
// ============================================================================

/// `INSERT INTO <table> (..) VALUES (..) RETURNING <columns>`
#[derive(Debug, Clone)]
pub(crate) struct Insert {
    table: Table,
    values: Vec<(&'static str, Value)>,
}

impl Insert {
    pub fn into_table(table: Table) -> Self {
        Self {
            table,
            values: Vec::new(),
        }
    }

    pub fn value(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.values.push((column, value.into()));
        self
    }

    fn build(&self) -> QueryBuilder<'static, Sqlite> {
        let column_list = self
            .values
            .iter()
            .map(|(column, _)| *column)
            .collect::<Vec<_>>()
            .join(", ");
        let mut builder = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            self.table.name, column_list
        ));
        for (i, (_, value)) in self.values.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            push_value(&mut builder, value);
        }
        builder.push(") RETURNING ").push(self.table.columns);
        builder
    }
}

// ============================================================================
// Update
// ============================================================================

/// `UPDATE <table> SET .. WHERE id = ? RETURNING <columns>`
#[derive(Debug, Clone)]
pub(crate) struct Update {
    table: Table,
    id: i64,
    sets: Vec<(&'static str, Value)>,
}

impl Update {
    pub fn table(table: Table, id: i64) -> Self {
        Self {
            table,
            id,
            sets: Vec::new(),
        }
    }

    pub fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.sets.push((column, value.into()));
        self
    }

    /// Set `column` only when the caller supplied a value.
    pub fn set_if_present<T: Into<Value>>(self, column: &'static str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.set(column, value),
            None => self,
        }
    }

    fn build(&self) -> QueryBuilder<'static, Sqlite> {
        let mut builder = QueryBuilder::new(format!("UPDATE {} SET ", self.table.name));
        for (i, (column, value)) in self.sets.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(*column).push(" = ");
            push_value(&mut builder, value);
        }
        builder.push(" WHERE id = ");
        builder.push_bind(self.id);
        builder.push(" RETURNING ").push(self.table.columns);
        builder
    }
}

// ============================================================================
// Execution
// ============================================================================

impl Database {
    /// Run a select and return every matching row.
    pub(crate) async fn select_rows<R>(&self, query: &Select) -> Result<Vec<R>, sqlx::Error>
    where
        R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut builder = query.build(query.table.columns);
        builder.build_query_as::<R>().fetch_all(&self.pool).await
    }

    /// Run a select and return the first matching row, if any.
    pub(crate) async fn select_row<R>(&self, query: &Select) -> Result<Option<R>, sqlx::Error>
    where
        R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut builder = query.build(query.table.columns);
        builder.build_query_as::<R>().fetch_optional(&self.pool).await
    }

    /// True if at least one row matches the select's filters.
    pub(crate) async fn row_exists(&self, query: &Select) -> Result<bool, sqlx::Error> {
        let mut builder = query.clone().limit(1).build("1");
        let row: Option<(i64,)> = builder.build_query_as::<(i64,)>().fetch_optional(&self.pool).await?;
        Ok(row.is_some())
    }

    /// Insert one row and return it as stored.
    pub(crate) async fn insert_row<R>(&self, insert: &Insert) -> Result<R, sqlx::Error>
    where
        R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut builder = insert.build();
        builder.build_query_as::<R>().fetch_one(&self.pool).await
    }

    /// Apply an update by id; `None` when no row has that id.
    ///
    /// Callers always set at least one column (`updated_at`).
    pub(crate) async fn update_row<R>(&self, update: &Update) -> Result<Option<R>, sqlx::Error>
    where
        R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut builder = update.build();
        builder.build_query_as::<R>().fetch_optional(&self.pool).await
    }
}
