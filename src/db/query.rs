//! Small builders for filtered SELECTs and partial UPDATEs.
//!
//! User input is never interpolated: every value becomes a bound `?` parameter,
//! and clauses are only appended for filters that are actually set.

use rusqlite::{params_from_iter, Connection, Row, ToSql};

/// SELECT with optional AND'ed filters
pub struct QueryBuilder {
    base: String,
    clauses: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
    group_by: Option<String>,
    having: Option<String>,
    order_by: Option<String>,
}

impl QueryBuilder {
    /// `base` is everything up to (not including) the WHERE clause
    pub fn new(base: &str) -> Self {
        Self {
            base: base.to_string(),
            clauses: Vec::new(),
            params: Vec::new(),
            group_by: None,
            having: None,
            order_by: None,
        }
    }

    /// Case-insensitive substring match. `%` and `_` in the value match literally.
    /// Skipped when unset or blank.
    pub fn contains(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.clauses.push(format!("{} LIKE ? ESCAPE '\\'", column));
            self.params.push(Box::new(like_pattern(v)));
        }
        self
    }

    pub fn at_least<T: ToSql + 'static>(&mut self, column: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.clauses.push(format!("{} >= ?", column));
            self.params.push(Box::new(v));
        }
        self
    }

    pub fn at_most<T: ToSql + 'static>(&mut self, column: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.clauses.push(format!("{} <= ?", column));
            self.params.push(Box::new(v));
        }
        self
    }

    pub fn equals<T: ToSql + 'static>(&mut self, column: &str, value: T) -> &mut Self {
        self.clauses.push(format!("{} = ?", column));
        self.params.push(Box::new(value));
        self
    }

    /// Arbitrary clause with exactly one `?` placeholder
    pub fn clause<T: ToSql + 'static>(&mut self, clause: &str, value: T) -> &mut Self {
        self.clauses.push(clause.to_string());
        self.params.push(Box::new(value));
        self
    }

    /// Like [`clause`](Self::clause), but the value becomes an escaped `%value%` pattern
    /// and blanks are skipped. The clause must use `LIKE ? ESCAPE '\'`.
    pub fn clause_contains(&mut self, clause: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.clauses.push(clause.to_string());
            self.params.push(Box::new(like_pattern(v)));
        }
        self
    }

    pub fn group_by(&mut self, group_by: &str) -> &mut Self {
        self.group_by = Some(group_by.to_string());
        self
    }

    pub fn having(&mut self, having: &str) -> &mut Self {
        self.having = Some(having.to_string());
        self
    }

    pub fn order_by(&mut self, order_by: &str) -> &mut Self {
        self.order_by = Some(order_by.to_string());
        self
    }

    pub fn sql(&self) -> String {
        let mut sql = self.base.clone();

        if !self.clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.clauses.join(" AND "));
        }
        if let Some(group_by) = &self.group_by {
            sql.push_str(" GROUP BY ");
            sql.push_str(group_by);
        }
        if let Some(having) = &self.having {
            sql.push_str(" HAVING ");
            sql.push_str(having);
        }
        if let Some(order_by) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }

        sql
    }

    /// Run the query and map every row
    pub fn fetch<T, F>(&self, conn: &Connection, map: F) -> rusqlite::Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = conn.prepare(&self.sql())?;
        let rows = stmt.query_map(params_from_iter(self.params.iter()), map)?;
        rows.collect()
    }
}

/// `%value%` with LIKE wildcards and the `\` escape character escaped
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

/// `UPDATE table SET ... WHERE id = ?` with only the assigned columns
pub struct UpdateBuilder {
    table: &'static str,
    assignments: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
}

impl UpdateBuilder {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
            params: Vec::new(),
        }
    }

    pub fn set<T: ToSql + 'static>(&mut self, column: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.assignments.push(format!("{} = ?", column));
            self.params.push(Box::new(v));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Execute against row `id`, bumping `updated_at`. Returns affected rows.
    pub fn execute(mut self, conn: &Connection, id: i64) -> rusqlite::Result<usize> {
        let sql = format!(
            "UPDATE {} SET {}, updated_at = datetime('now') WHERE id = ?",
            self.table,
            self.assignments.join(", ")
        );
        self.params.push(Box::new(id));
        conn.execute(&sql, params_from_iter(self.params.iter()))
    }
}
