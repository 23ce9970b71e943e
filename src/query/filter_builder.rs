// src/query/filter_builder.rs
//
// Fluent movie query construction
//
// PRINCIPLES:
// - Validate eagerly, mutate only after validation passes
// - Clauses and parameters are appended in lockstep and never reordered,
//   so positional binding stays correct for any filter combination
// - User-controlled values travel as bound parameters, never as SQL text
// - Sort columns come from a finite enum, not from caller strings

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use crate::domain::movie::Movie;
use crate::domain::validation::{
    validate_bounded_f64, validate_bounded_i32, validate_max_len, DIRECTOR_NAME_MAX,
    QUERY_LIMIT_MAX, SCORE_MAX, SCORE_MIN, SEARCH_TEXT_MAX, YEAR_MAX, YEAR_MIN,
};
use crate::error::{AppError, AppResult};
use crate::repositories::movie_repository::row_to_movie;

/// Columns the catalog can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Year,
    Score,
    Runtime,
    CreatedAt,
}

impl SortField {
    const ALLOWED: &'static str = "title, year, score, runtime, created_at";

    /// Parse a caller-supplied field name (case-insensitive)
    pub fn parse(raw: &str) -> AppResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "year" => Ok(SortField::Year),
            "score" => Ok(SortField::Score),
            "runtime" => Ok(SortField::Runtime),
            "created_at" => Ok(SortField::CreatedAt),
            _ => Err(AppError::validation(format!(
                "Sort field must be one of: {}",
                Self::ALLOWED
            ))),
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Year => "year",
            SortField::Score => "score",
            SortField::Runtime => "runtime",
            SortField::CreatedAt => "created_at",
        }
    }
}

/// Sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Parse a caller-supplied direction (case-insensitive)
    pub fn parse(raw: &str) -> AppResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Ascending),
            "desc" => Ok(SortDirection::Descending),
            _ => Err(AppError::validation(
                "Sort direction must be 'asc' or 'desc'",
            )),
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// A finished query: SQL text plus its positional parameters, in binding
/// order
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Accumulates validated filter predicates, sort order and pagination,
/// then emits a parameterized query over the movie catalog.
///
/// Filter methods take `&mut self` and return the builder for chaining
/// with `?`; a failed call leaves the builder exactly as it was. Each
/// builder instance belongs to one caller; clone it to branch two
/// queries off a shared filter prefix.
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    clauses: Vec<String>,
    params: Vec<Value>,
    sort: Option<(SortField, SortDirection)>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter to movies whose category is in the given list
    ///
    /// The list must be non-empty and contain no blank entries. Emits one
    /// IN placeholder and one parameter per entry, order preserved.
    pub fn with_categories<S: AsRef<str>>(&mut self, categories: &[S]) -> AppResult<&mut Self> {
        if categories.is_empty() {
            return Err(AppError::validation("Category list must not be empty"));
        }
        for category in categories {
            if category.as_ref().trim().is_empty() {
                return Err(AppError::validation("Categories must not be blank"));
            }
        }

        let placeholders = vec!["?"; categories.len()].join(", ");
        self.clauses.push(format!("category IN ({})", placeholders));
        for category in categories {
            self.params
                .push(Value::from(category.as_ref().to_string()));
        }

        Ok(self)
    }

    /// Filter by score bounds, each in [0.0, 10.0]
    ///
    /// Either bound may be absent; supplying neither is a no-op.
    pub fn with_score_range(&mut self, min: Option<f64>, max: Option<f64>) -> AppResult<&mut Self> {
        if let Some(min) = min {
            validate_bounded_f64("score min", min, SCORE_MIN, SCORE_MAX)?;
        }
        if let Some(max) = max {
            validate_bounded_f64("score max", max, SCORE_MIN, SCORE_MAX)?;
        }
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(AppError::validation("score min must not exceed score max"));
            }
        }

        if let Some(min) = min {
            self.clauses.push("score >= ?".to_string());
            self.params.push(Value::from(min));
        }
        if let Some(max) = max {
            self.clauses.push("score <= ?".to_string());
            self.params.push(Value::from(max));
        }

        Ok(self)
    }

    /// Filter by release year bounds, each in [1888, 2100]
    pub fn with_year_range(&mut self, start: Option<i32>, end: Option<i32>) -> AppResult<&mut Self> {
        if let Some(start) = start {
            validate_bounded_i32("year start", start, YEAR_MIN, YEAR_MAX)?;
        }
        if let Some(end) = end {
            validate_bounded_i32("year end", end, YEAR_MIN, YEAR_MAX)?;
        }
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(AppError::validation("year start must not exceed year end"));
            }
        }

        if let Some(start) = start {
            self.clauses.push("year >= ?".to_string());
            self.params.push(Value::from(i64::from(start)));
        }
        if let Some(end) = end {
            self.clauses.push("year <= ?".to_string());
            self.params.push(Value::from(i64::from(end)));
        }

        Ok(self)
    }

    /// Filter by runtime bounds in minutes, strictly positive
    pub fn with_runtime_range(
        &mut self,
        min: Option<i32>,
        max: Option<i32>,
    ) -> AppResult<&mut Self> {
        if let Some(min) = min {
            if min <= 0 {
                return Err(AppError::validation(
                    "runtime min must be a positive integer",
                ));
            }
        }
        if let Some(max) = max {
            if max <= 0 {
                return Err(AppError::validation(
                    "runtime max must be a positive integer",
                ));
            }
        }
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(AppError::validation(
                    "runtime min must not exceed runtime max",
                ));
            }
        }

        if let Some(min) = min {
            self.clauses.push("runtime >= ?".to_string());
            self.params.push(Value::from(i64::from(min)));
        }
        if let Some(max) = max {
            self.clauses.push("runtime <= ?".to_string());
            self.params.push(Value::from(i64::from(max)));
        }

        Ok(self)
    }

    /// Free-text search across title, description, director and actors
    /// (case-insensitive substring, fixed field order)
    ///
    /// Blank or absent text is a no-op; text over 500 characters fails.
    pub fn with_search_text(&mut self, text: Option<&str>) -> AppResult<&mut Self> {
        let text = match text {
            Some(t) if !t.trim().is_empty() => t.trim(),
            _ => return Ok(self),
        };
        validate_max_len("Search text", text, SEARCH_TEXT_MAX)?;

        self.clauses.push(
            "(title LIKE ? OR description LIKE ? OR director LIKE ? OR actors LIKE ?)".to_string(),
        );
        let wildcard = format!("%{}%", text);
        for _ in 0..4 {
            self.params.push(Value::from(wildcard.clone()));
        }

        Ok(self)
    }

    /// Filter by director name (case-insensitive substring)
    ///
    /// Blank or absent is a no-op; names over 255 characters fail.
    pub fn with_director(&mut self, name: Option<&str>) -> AppResult<&mut Self> {
        let name = match name {
            Some(n) if !n.trim().is_empty() => n.trim(),
            _ => return Ok(self),
        };
        validate_max_len("Director name", name, DIRECTOR_NAME_MAX)?;

        self.clauses.push("director LIKE ?".to_string());
        self.params.push(Value::from(format!("%{}%", name)));

        Ok(self)
    }

    /// Sort the result set; `None` direction defaults to ascending
    ///
    /// Calling this again replaces the previous sort.
    pub fn with_sorting(&mut self, field: &str, direction: Option<&str>) -> AppResult<&mut Self> {
        let field = SortField::parse(field)?;
        let direction = match direction {
            Some(raw) => SortDirection::parse(raw)?,
            None => SortDirection::Ascending,
        };

        self.sort = Some((field, direction));
        Ok(self)
    }

    /// Cap the result set; must be positive and at most 10,000
    pub fn with_limit(&mut self, limit: u32) -> AppResult<&mut Self> {
        if limit == 0 {
            return Err(AppError::validation("Limit must be a positive integer"));
        }
        if limit > QUERY_LIMIT_MAX {
            return Err(AppError::validation(format!(
                "Limit must not exceed {}",
                QUERY_LIMIT_MAX
            )));
        }

        self.limit = Some(limit);
        Ok(self)
    }

    /// Skip the first `offset` rows
    pub fn with_offset(&mut self, offset: u32) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    /// Clear all accumulated state, returning the builder to its initial
    /// empty condition
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }

    /// Emit the full query. Idempotent: builds from a read of current
    /// state, never mutates it.
    pub fn build(&self) -> BuiltQuery {
        let mut sql = String::from("SELECT * FROM movies");

        if !self.clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.clauses.join(" AND "));
        }

        if let Some((field, direction)) = self.sort {
            sql.push_str(" ORDER BY ");
            sql.push_str(field.column());
            sql.push(' ');
            sql.push_str(direction.sql());
        }

        // Limit and offset are validated integers; SQLite needs a LIMIT
        // clause (-1 = unlimited) for OFFSET to apply
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => {
                sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
            }
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {}", limit)),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
            (None, None) => {}
        }

        BuiltQuery {
            sql,
            params: self.params.clone(),
        }
    }

    /// Emit just the predicate portion and its parameters, for composing
    /// into a larger query. An empty builder yields the tautology `1=1`.
    pub fn build_where_clause(&self) -> (String, Vec<Value>) {
        let predicate = if self.clauses.is_empty() {
            "1=1".to_string()
        } else {
            self.clauses.join(" AND ")
        };
        (predicate, self.params.clone())
    }

    /// Run the built query, mapping rows to movies
    pub fn execute(&self, conn: &Connection) -> AppResult<Vec<Movie>> {
        let query = self.build();

        let mut stmt = conn
            .prepare(&query.sql)
            .map_err(|e| AppError::storage("prepare movie query", e))?;

        let movies = stmt
            .query_map(params_from_iter(query.params.iter()), row_to_movie)
            .map_err(|e| AppError::storage("execute movie query", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::storage("map movie rows", e))?;

        Ok(movies)
    }

    /// Count matching rows; sort, limit and offset do not apply
    pub fn count(&self, conn: &Connection) -> AppResult<i64> {
        let (predicate, params) = self.build_where_clause();
        let sql = format!("SELECT COUNT(*) FROM movies WHERE {}", predicate);

        let count: i64 = conn
            .query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))
            .map_err(|e| AppError::storage("count movie query", e))?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use chrono::Utc;

    #[test]
    fn test_empty_builder_emits_base_query() {
        let builder = FilterBuilder::new();
        let query = builder.build();
        assert_eq!(query.sql, "SELECT * FROM movies");
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_score_range_both_bounds_in_order() {
        let mut builder = FilterBuilder::new();
        builder.with_score_range(Some(5.0), Some(8.0)).unwrap();

        let query = builder.build();
        assert_eq!(
            query.sql,
            "SELECT * FROM movies WHERE score >= ? AND score <= ?"
        );
        assert_eq!(query.params, vec![Value::from(5.0), Value::from(8.0)]);
    }

    #[test]
    fn test_score_range_single_bound() {
        let mut builder = FilterBuilder::new();
        builder.with_score_range(None, Some(7.5)).unwrap();

        let query = builder.build();
        assert_eq!(query.sql, "SELECT * FROM movies WHERE score <= ?");
        assert_eq!(query.params, vec![Value::from(7.5)]);
    }

    #[test]
    fn test_score_range_no_bounds_is_noop() {
        let mut builder = FilterBuilder::new();
        builder.with_score_range(None, None).unwrap();
        assert_eq!(builder.build().sql, "SELECT * FROM movies");
    }

    #[test]
    fn test_score_range_rejects_inverted_bounds() {
        let mut builder = FilterBuilder::new();
        let err = builder.with_score_range(Some(9.0), Some(2.0)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_score_range_rejects_out_of_bounds() {
        let mut builder = FilterBuilder::new();
        assert!(builder.with_score_range(Some(-0.1), None).is_err());
        assert!(builder.with_score_range(None, Some(10.5)).is_err());
    }

    #[test]
    fn test_failed_call_leaves_builder_untouched() {
        let mut builder = FilterBuilder::new();
        builder.with_categories(&["Horror"]).unwrap();
        let before = builder.build();

        assert!(builder.with_score_range(Some(9.0), Some(1.0)).is_err());

        let after = builder.build();
        assert_eq!(before.sql, after.sql);
        assert_eq!(before.params, after.params);
    }

    #[test]
    fn test_categories_emit_one_placeholder_per_entry() {
        let mut builder = FilterBuilder::new();
        builder
            .with_categories(&["Horror", "Sci-Fi", "Drama"])
            .unwrap();

        let query = builder.build();
        assert_eq!(
            query.sql,
            "SELECT * FROM movies WHERE category IN (?, ?, ?)"
        );
        assert_eq!(
            query.params,
            vec![
                Value::from("Horror".to_string()),
                Value::from("Sci-Fi".to_string()),
                Value::from("Drama".to_string()),
            ]
        );
    }

    #[test]
    fn test_categories_reject_empty_list_and_blank_entries() {
        let mut builder = FilterBuilder::new();
        let empty: &[&str] = &[];
        assert!(builder.with_categories(empty).is_err());
        assert!(builder.with_categories(&["Horror", "  "]).is_err());
    }

    #[test]
    fn test_year_range_params() {
        let mut builder = FilterBuilder::new();
        builder.with_year_range(Some(1990), Some(1999)).unwrap();

        let query = builder.build();
        assert_eq!(
            query.sql,
            "SELECT * FROM movies WHERE year >= ? AND year <= ?"
        );
        assert_eq!(query.params, vec![Value::from(1990i64), Value::from(1999i64)]);
    }

    #[test]
    fn test_year_range_rejects_implausible_years() {
        let mut builder = FilterBuilder::new();
        assert!(builder.with_year_range(Some(1800), None).is_err());
        assert!(builder.with_year_range(None, Some(3000)).is_err());
        assert!(builder.with_year_range(Some(2000), Some(1990)).is_err());
    }

    #[test]
    fn test_runtime_range_rejects_non_positive() {
        let mut builder = FilterBuilder::new();
        assert!(builder.with_runtime_range(Some(0), None).is_err());
        assert!(builder.with_runtime_range(None, Some(-10)).is_err());
        assert!(builder.with_runtime_range(Some(120), Some(90)).is_err());
    }

    #[test]
    fn test_search_text_spans_four_fields_with_same_param() {
        let mut builder = FilterBuilder::new();
        builder.with_search_text(Some("alien")).unwrap();

        let query = builder.build();
        assert_eq!(
            query.sql,
            "SELECT * FROM movies WHERE (title LIKE ? OR description LIKE ? OR director LIKE ? OR actors LIKE ?)"
        );
        assert_eq!(query.params.len(), 4);
        for param in &query.params {
            assert_eq!(*param, Value::from("%alien%".to_string()));
        }
    }

    #[test]
    fn test_search_text_blank_is_noop_and_oversized_fails() {
        let mut builder = FilterBuilder::new();
        builder.with_search_text(None).unwrap();
        builder.with_search_text(Some("   ")).unwrap();
        assert_eq!(builder.build().sql, "SELECT * FROM movies");

        let long = "x".repeat(501);
        assert!(builder.with_search_text(Some(&long)).is_err());
    }

    #[test]
    fn test_director_filter() {
        let mut builder = FilterBuilder::new();
        builder.with_director(Some("Scott")).unwrap();

        let query = builder.build();
        assert_eq!(query.sql, "SELECT * FROM movies WHERE director LIKE ?");
        assert_eq!(query.params, vec![Value::from("%Scott%".to_string())]);

        let long = "y".repeat(256);
        assert!(builder.with_director(Some(&long)).is_err());
    }

    #[test]
    fn test_sorting_normalizes_case() {
        let mut builder = FilterBuilder::new();
        builder.with_sorting("ScOrE", Some("DESC")).unwrap();
        assert_eq!(
            builder.build().sql,
            "SELECT * FROM movies ORDER BY score DESC"
        );
    }

    #[test]
    fn test_sorting_defaults_to_ascending() {
        let mut builder = FilterBuilder::new();
        builder.with_sorting("title", None).unwrap();
        assert_eq!(
            builder.build().sql,
            "SELECT * FROM movies ORDER BY title ASC"
        );
    }

    #[test]
    fn test_sorting_rejects_unknown_field_naming_allowed_set() {
        let mut builder = FilterBuilder::new();
        let err = builder.with_sorting("not_a_field", Some("asc")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("title, year, score, runtime, created_at"));
    }

    #[test]
    fn test_sorting_rejects_unknown_direction() {
        let mut builder = FilterBuilder::new();
        let err = builder.with_sorting("score", Some("sideways")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_second_sort_overwrites_first() {
        let mut builder = FilterBuilder::new();
        builder.with_sorting("title", Some("asc")).unwrap();
        builder.with_sorting("year", Some("desc")).unwrap();
        assert_eq!(
            builder.build().sql,
            "SELECT * FROM movies ORDER BY year DESC"
        );
    }

    #[test]
    fn test_limit_bounds() {
        let mut builder = FilterBuilder::new();
        assert!(builder.with_limit(0).is_err());
        assert!(builder.with_limit(10_001).is_err());
        builder.with_limit(10_000).unwrap();
        assert_eq!(builder.build().sql, "SELECT * FROM movies LIMIT 10000");
    }

    #[test]
    fn test_offset_without_limit() {
        let mut builder = FilterBuilder::new();
        builder.with_offset(40);
        assert_eq!(
            builder.build().sql,
            "SELECT * FROM movies LIMIT -1 OFFSET 40"
        );
    }

    #[test]
    fn test_limit_and_offset_combined() {
        let mut builder = FilterBuilder::new();
        builder.with_limit(20).unwrap().with_offset(40);
        assert_eq!(
            builder.build().sql,
            "SELECT * FROM movies LIMIT 20 OFFSET 40"
        );
    }

    #[test]
    fn test_build_is_idempotent() {
        let mut builder = FilterBuilder::new();
        builder
            .with_categories(&["Horror"])
            .unwrap()
            .with_score_range(Some(6.0), None)
            .unwrap();

        let first = builder.build();
        let second = builder.build();
        assert_eq!(first.sql, second.sql);
        assert_eq!(first.params, second.params);
    }

    #[test]
    fn test_reset_returns_to_empty_state() {
        let mut builder = FilterBuilder::new();
        builder
            .with_categories(&["Horror"])
            .unwrap()
            .with_sorting("score", Some("desc"))
            .unwrap()
            .with_limit(10)
            .unwrap()
            .with_offset(5);
        builder.reset();

        let query = builder.build();
        assert_eq!(query.sql, "SELECT * FROM movies");
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_clone_produces_independent_state() {
        let mut original = FilterBuilder::new();
        original.with_categories(&["Horror"]).unwrap();

        let mut branched = original.clone();
        branched.with_score_range(Some(8.0), None).unwrap();
        original.with_year_range(Some(2000), None).unwrap();

        assert_eq!(
            branched.build().sql,
            "SELECT * FROM movies WHERE category IN (?) AND score >= ?"
        );
        assert_eq!(
            original.build().sql,
            "SELECT * FROM movies WHERE category IN (?) AND year >= ?"
        );
    }

    #[test]
    fn test_where_clause_defaults_to_tautology() {
        let builder = FilterBuilder::new();
        let (predicate, params) = builder.build_where_clause();
        assert_eq!(predicate, "1=1");
        assert!(params.is_empty());
    }

    fn seed_movie(conn: &rusqlite::Connection, title: &str, category: &str, score: f64, year: i32) {
        conn.execute(
            "INSERT INTO movies (title, category, score, year, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![title, category, score, year, Utc::now().to_rfc3339()],
        )
        .unwrap();
    }

    #[test]
    fn test_execute_and_count_against_store() {
        let pool = create_test_pool().unwrap();
        let conn = pool.get().unwrap();
        seed_movie(&conn, "Alien", "Horror", 8.5, 1979);
        seed_movie(&conn, "The Thing", "Horror", 8.2, 1982);
        seed_movie(&conn, "Heat", "Crime", 8.3, 1995);

        let mut builder = FilterBuilder::new();
        builder
            .with_categories(&["Horror"])
            .unwrap()
            .with_sorting("score", Some("desc"))
            .unwrap()
            .with_limit(1)
            .unwrap();

        let movies = builder.execute(&conn).unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "Alien");

        // count ignores sort/limit/offset
        assert_eq!(builder.count(&conn).unwrap(), 2);
    }

    #[test]
    fn test_execute_search_text_matches_substring() {
        let pool = create_test_pool().unwrap();
        let conn = pool.get().unwrap();
        seed_movie(&conn, "Alien", "Horror", 8.5, 1979);
        seed_movie(&conn, "Aliens", "Horror", 8.4, 1986);
        seed_movie(&conn, "Heat", "Crime", 8.3, 1995);

        let mut builder = FilterBuilder::new();
        builder.with_search_text(Some("alien")).unwrap();

        let movies = builder.execute(&conn).unwrap();
        assert_eq!(movies.len(), 2);
    }
}
