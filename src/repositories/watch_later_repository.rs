// src/repositories/watch_later_repository.rs
//
// Watch-later queue persistence
//
// One row per (user, movie), guarded by a unique index. Entries start
// unwatched; mark_watched stamps a timestamp and will create the row
// first if it never existed, so it cannot fail with not-found.

use std::sync::Arc;

use chrono::Utc;
use rusqlite::{params, Row};

use crate::db::{get_connection, ConnectionPool};
use crate::domain::movie::MovieSnapshot;
use crate::domain::validation::{validate_positive_id, HISTORY_PAGE_MAX};
use crate::domain::watch_later::WatchLaterEntry;
use crate::error::{AppError, AppResult};

pub trait WatchLaterRepository: Send + Sync {
    /// Add or refresh a queue entry (idempotent upsert)
    fn add(&self, user_id: i64, movie_id: i64, snapshot: &MovieSnapshot) -> AppResult<()>;
    /// Remove an entry; succeeds even when none exists
    fn remove(&self, user_id: i64, movie_id: i64) -> AppResult<()>;
    /// Mark an entry watched, inserting it first if it was never added
    fn mark_watched(&self, user_id: i64, movie_id: i64) -> AppResult<()>;
    fn contains(&self, user_id: i64, movie_id: i64) -> AppResult<bool>;
    /// Newest-first listing; watched entries only appear when
    /// `include_watched` is set
    fn list(&self, user_id: i64, include_watched: bool) -> AppResult<Vec<WatchLaterEntry>>;
    /// Delete all watched entries, leaving unwatched ones untouched
    fn clear_watched(&self, user_id: i64) -> AppResult<usize>;
    fn unwatched_count(&self, user_id: i64) -> AppResult<i64>;
    /// Watched entries, newest-watched-first, capped at `limit`
    fn watched_history(&self, user_id: i64, limit: u32) -> AppResult<Vec<WatchLaterEntry>>;
}

pub struct SqliteWatchLaterRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteWatchLaterRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Map a database row to a WatchLaterEntry - returns rusqlite::Error
    /// for query_map compatibility
    fn row_to_entry(row: &Row) -> Result<WatchLaterEntry, rusqlite::Error> {
        let watched: i64 = row.get("watched")?;
        let watched_at = super::parse_optional_timestamp(row, "watched_at")?;
        let created_at = super::parse_timestamp(row, "created_at")?;

        Ok(WatchLaterEntry {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            movie_id: row.get("movie_id")?,
            title: row.get("title")?,
            poster_url: row.get("poster_url")?,
            year: row.get("year")?,
            category: row.get("category")?,
            watched: watched != 0,
            watched_at,
            created_at,
        })
    }
}

impl WatchLaterRepository for SqliteWatchLaterRepository {
    fn add(&self, user_id: i64, movie_id: i64, snapshot: &MovieSnapshot) -> AppResult<()> {
        validate_positive_id("user_id", user_id)?;
        validate_positive_id("movie_id", movie_id)?;

        let conn = get_connection(&self.pool)?;

        // Re-adding refreshes the snapshot but preserves watch state
        conn.execute(
            "INSERT INTO watch_later (user_id, movie_id, title, poster_url, year, category, watched, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)
             ON CONFLICT (user_id, movie_id) DO UPDATE SET
                 title = excluded.title,
                 poster_url = excluded.poster_url,
                 year = excluded.year,
                 category = excluded.category",
            params![
                user_id,
                movie_id,
                snapshot.title,
                snapshot.poster_url,
                snapshot.year,
                snapshot.category,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| AppError::storage("add watch-later entry", e))?;

        Ok(())
    }

    fn remove(&self, user_id: i64, movie_id: i64) -> AppResult<()> {
        validate_positive_id("user_id", user_id)?;
        validate_positive_id("movie_id", movie_id)?;

        let conn = get_connection(&self.pool)?;

        conn.execute(
            "DELETE FROM watch_later WHERE user_id = ?1 AND movie_id = ?2",
            params![user_id, movie_id],
        )
        .map_err(|e| AppError::storage("remove watch-later entry", e))?;

        Ok(())
    }

    fn mark_watched(&self, user_id: i64, movie_id: i64) -> AppResult<()> {
        validate_positive_id("user_id", user_id)?;
        validate_positive_id("movie_id", movie_id)?;

        let conn = get_connection(&self.pool)?;
        let now = Utc::now().to_rfc3339();

        // Implicit insert: a pair never added gets a row (without a
        // snapshot) and is marked watched in the same statement
        conn.execute(
            "INSERT INTO watch_later (user_id, movie_id, watched, watched_at, created_at)
             VALUES (?1, ?2, 1, ?3, ?3)
             ON CONFLICT (user_id, movie_id) DO UPDATE SET
                 watched = 1,
                 watched_at = excluded.watched_at",
            params![user_id, movie_id, now],
        )
        .map_err(|e| AppError::storage("mark watch-later entry watched", e))?;

        Ok(())
    }

    fn contains(&self, user_id: i64, movie_id: i64) -> AppResult<bool> {
        validate_positive_id("user_id", user_id)?;
        validate_positive_id("movie_id", movie_id)?;

        let conn = get_connection(&self.pool)?;

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM watch_later WHERE user_id = ?1 AND movie_id = ?2",
                params![user_id, movie_id],
                |row| row.get(0),
            )
            .map_err(|e| AppError::storage("watch-later membership check", e))?;

        Ok(count > 0)
    }

    fn list(&self, user_id: i64, include_watched: bool) -> AppResult<Vec<WatchLaterEntry>> {
        validate_positive_id("user_id", user_id)?;

        let conn = get_connection(&self.pool)?;

        let sql = if include_watched {
            "SELECT id, user_id, movie_id, title, poster_url, year, category,
                    watched, watched_at, created_at
             FROM watch_later
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC"
        } else {
            "SELECT id, user_id, movie_id, title, poster_url, year, category,
                    watched, watched_at, created_at
             FROM watch_later
             WHERE user_id = ?1 AND watched = 0
             ORDER BY created_at DESC, id DESC"
        };

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| AppError::storage("prepare watch-later listing", e))?;

        let entries = stmt
            .query_map(params![user_id], Self::row_to_entry)
            .map_err(|e| AppError::storage("list watch-later entries", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::storage("map watch-later rows", e))?;

        Ok(entries)
    }

    fn clear_watched(&self, user_id: i64) -> AppResult<usize> {
        validate_positive_id("user_id", user_id)?;

        let conn = get_connection(&self.pool)?;

        let removed = conn
            .execute(
                "DELETE FROM watch_later WHERE user_id = ?1 AND watched = 1",
                params![user_id],
            )
            .map_err(|e| AppError::storage("clear watched entries", e))?;

        Ok(removed)
    }

    fn unwatched_count(&self, user_id: i64) -> AppResult<i64> {
        validate_positive_id("user_id", user_id)?;

        let conn = get_connection(&self.pool)?;

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM watch_later WHERE user_id = ?1 AND watched = 0",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(|e| AppError::storage("count unwatched entries", e))?;

        Ok(count)
    }

    fn watched_history(&self, user_id: i64, limit: u32) -> AppResult<Vec<WatchLaterEntry>> {
        validate_positive_id("user_id", user_id)?;
        if limit == 0 {
            return Err(AppError::validation("Limit must be a positive integer"));
        }
        let limit = limit.min(HISTORY_PAGE_MAX);

        let conn = get_connection(&self.pool)?;

        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, movie_id, title, poster_url, year, category,
                        watched, watched_at, created_at
                 FROM watch_later
                 WHERE user_id = ?1 AND watched = 1
                 ORDER BY watched_at DESC, id DESC
                 LIMIT ?2",
            )
            .map_err(|e| AppError::storage("prepare watched history", e))?;

        let entries = stmt
            .query_map(params![user_id, limit], Self::row_to_entry)
            .map_err(|e| AppError::storage("list watched history", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::storage("map watched history rows", e))?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn repo() -> SqliteWatchLaterRepository {
        SqliteWatchLaterRepository::new(Arc::new(create_test_pool().unwrap()))
    }

    fn snapshot(title: &str) -> MovieSnapshot {
        MovieSnapshot::new(title)
    }

    #[test]
    fn test_add_starts_unwatched() {
        let repo = repo();
        repo.add(1, 42, &snapshot("Alien")).unwrap();

        let entries = repo.list(1, false).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].watched);
        assert!(entries[0].watched_at.is_none());
        assert_eq!(repo.unwatched_count(1).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_add_keeps_one_row_and_watch_state() {
        let repo = repo();
        repo.add(1, 42, &snapshot("Alien")).unwrap();
        repo.mark_watched(1, 42).unwrap();

        // Re-add refreshes snapshot but must not reset watched
        repo.add(1, 42, &snapshot("Alien Remastered")).unwrap();

        let entries = repo.list(1, true).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].watched);
        assert_eq!(entries[0].title.as_deref(), Some("Alien Remastered"));
    }

    #[test]
    fn test_mark_watched_implicitly_inserts() {
        let repo = repo();

        // Pair never added: mark_watched must insert and mark in one call
        repo.mark_watched(1, 99).unwrap();

        let unwatched = repo.list(1, false).unwrap();
        assert!(unwatched.iter().all(|e| e.movie_id != 99));

        let all = repo.list(1, true).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].movie_id, 99);
        assert!(all[0].watched);
        assert!(all[0].watched_at.is_some());
        assert!(all[0].title.is_none());
    }

    #[test]
    fn test_list_excludes_watched_by_default() {
        let repo = repo();
        repo.add(1, 10, &snapshot("A")).unwrap();
        repo.add(1, 11, &snapshot("B")).unwrap();
        repo.mark_watched(1, 10).unwrap();

        assert_eq!(repo.list(1, false).unwrap().len(), 1);
        assert_eq!(repo.list(1, true).unwrap().len(), 2);
        assert_eq!(repo.unwatched_count(1).unwrap(), 1);
    }

    #[test]
    fn test_clear_watched_leaves_unwatched() {
        let repo = repo();
        repo.add(1, 10, &snapshot("A")).unwrap();
        repo.add(1, 11, &snapshot("B")).unwrap();
        repo.add(1, 12, &snapshot("C")).unwrap();
        repo.mark_watched(1, 10).unwrap();
        repo.mark_watched(1, 11).unwrap();

        let removed = repo.clear_watched(1).unwrap();
        assert_eq!(removed, 2);

        let remaining = repo.list(1, true).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].movie_id, 12);
    }

    #[test]
    fn test_watched_history_newest_watched_first() {
        let repo = repo();
        repo.mark_watched(1, 10).unwrap();
        repo.mark_watched(1, 11).unwrap();
        repo.mark_watched(1, 12).unwrap();

        let history = repo.watched_history(1, 2).unwrap();
        assert_eq!(history.len(), 2);
        let ids: Vec<i64> = history.iter().map(|e| e.movie_id).collect();
        assert_eq!(ids, vec![12, 11]);
    }

    #[test]
    fn test_watched_history_limit_treatment() {
        let repo = repo();
        repo.mark_watched(1, 10).unwrap();
        repo.mark_watched(1, 11).unwrap();

        // Zero limit is invalid input, matching the rating listings
        assert!(matches!(
            repo.watched_history(1, 0),
            Err(AppError::Validation(_))
        ));

        // Oversized limit clamps instead of failing
        assert_eq!(repo.watched_history(1, 100_000).unwrap().len(), 2);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let repo = repo();
        repo.add(1, 42, &snapshot("Alien")).unwrap();
        repo.remove(1, 42).unwrap();
        repo.remove(1, 42).unwrap();
        assert!(!repo.contains(1, 42).unwrap());
    }

    #[test]
    fn test_rejects_non_positive_ids() {
        let repo = repo();
        assert!(matches!(
            repo.add(0, 1, &snapshot("A")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            repo.mark_watched(1, -1),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            repo.clear_watched(0),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            repo.watched_history(-2, 10),
            Err(AppError::Validation(_))
        ));
    }
}
