mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, ToSql};
use thiserror::Error;
use uuid::Uuid;

use crate::models::*;

/// Errors from the idea store, kept distinct so callers can report them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found")]
    NotFound,

    #[error("Forbidden")]
    Forbidden,

    #[error("Storage unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

const IDEA_COLUMNS: &str =
    "id, created_at, owner_id, idea, platform, target_audience, features, blueprint";

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "ideastruct")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("ideastruct.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // User operations
    // ============================================================

    pub fn create_user(&self, input: CreateUserInput) -> StoreResult<UserWithToken> {
        let email = input.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(StoreError::Validation("A valid email is required".into()));
        }
        let name = input
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let conn = self.conn.lock().expect("database lock poisoned");

        let taken: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)",
            [&email],
            |row| row.get(0),
        )?;
        if taken {
            return Err(StoreError::Validation("Email already registered".into()));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let api_token = format!("isk_{}", Uuid::new_v4().simple());

        conn.execute(
            "INSERT INTO users (id, email, name, api_token, created_at) VALUES (?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &email,
                &name,
                &api_token,
                format_timestamp(now),
            ),
        )?;

        Ok(UserWithToken {
            user: User {
                id,
                email,
                name,
                created_at: now,
            },
            api_token,
        })
    }

    pub fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let user = conn
            .query_row(
                "SELECT id, email, name, created_at FROM users WHERE id = ?",
                [id.to_string()],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Resolve a bearer token to its user.
    pub fn find_user_by_token(&self, token: &str) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let user = conn
            .query_row(
                "SELECT id, email, name, created_at FROM users WHERE api_token = ?",
                [token],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    // ============================================================
    // Idea operations
    // ============================================================

    pub fn create_idea(&self, owner_id: Uuid, input: CreateIdeaInput) -> StoreResult<Idea> {
        let idea_description = input.idea_description.trim().to_string();
        if idea_description.is_empty() {
            return Err(StoreError::Validation("App idea is required".into()));
        }
        if input.blueprint.trim().is_empty() {
            return Err(StoreError::Validation("Blueprint content is required".into()));
        }
        let target_audience = non_blank(input.target_audience);
        let features = non_blank(input.features);

        let conn = self.conn.lock().expect("database lock poisoned");

        let owner_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)",
            [owner_id.to_string()],
            |row| row.get(0),
        )?;
        if !owner_exists {
            return Err(StoreError::Validation("Unknown owner".into()));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO ideas (id, created_at, owner_id, idea, platform, target_audience, features, blueprint)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                format_timestamp(now),
                owner_id.to_string(),
                &idea_description,
                input.platform.as_str(),
                &target_audience,
                &features,
                &input.blueprint,
            ),
        )?;

        Ok(Idea {
            id,
            created_at: now,
            owner_id,
            idea_description,
            platform: input.platform,
            target_audience,
            features,
            blueprint: input.blueprint,
        })
    }

    /// Fetch an idea without an ownership check.
    pub fn get_idea(&self, id: Uuid) -> StoreResult<Option<Idea>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let idea = conn
            .query_row(
                &format!("SELECT {} FROM ideas WHERE id = ?", IDEA_COLUMNS),
                [id.to_string()],
                idea_from_row,
            )
            .optional()?;
        Ok(idea)
    }

    /// Fetch an idea on behalf of `requester_id`, who must own it.
    pub fn get_idea_for(&self, id: Uuid, requester_id: Uuid) -> StoreResult<Idea> {
        let idea = self.get_idea(id)?.ok_or(StoreError::NotFound)?;
        if idea.owner_id != requester_id {
            return Err(StoreError::Forbidden);
        }
        Ok(idea)
    }

    /// List an owner's ideas newest first, one page at a time.
    pub fn list_ideas_by_owner(
        &self,
        owner_id: Uuid,
        query: &ListIdeasQuery,
    ) -> StoreResult<IdeaPage> {
        let offset = query.offset();
        let limit = query.limit();

        let mut filters = vec!["owner_id = ?".to_string()];
        let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(owner_id.to_string())];

        if let Some(term) = query.q.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            filters.push(
                "(idea LIKE ? ESCAPE '\\' OR target_audience LIKE ? ESCAPE '\\' \
                 OR features LIKE ? ESCAPE '\\')"
                    .to_string(),
            );
            let pattern = format!("%{}%", escape_like(term));
            for _ in 0..3 {
                params.push(Box::new(pattern.clone()));
            }
        }

        if let Some(platform) = query.platform {
            filters.push("platform = ?".to_string());
            params.push(Box::new(platform.as_str()));
        }

        let where_clause = filters.join(" AND ");
        let conn = self.conn.lock().expect("database lock poisoned");

        let params_ref: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM ideas WHERE {}", where_clause),
            params_ref.as_slice(),
            |row| row.get(0),
        )?;

        let limit_param = i64::from(limit);
        let offset_param = i64::from(offset);
        let mut page_params = params_ref.clone();
        page_params.push(&limit_param);
        page_params.push(&offset_param);

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM ideas WHERE {} ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
            IDEA_COLUMNS, where_clause
        ))?;
        let ideas = stmt
            .query_map(page_params.as_slice(), idea_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let total = total.max(0) as u64;
        let has_more = u64::from(offset) + (ideas.len() as u64) < total;

        Ok(IdeaPage {
            ideas,
            total,
            offset,
            limit,
            has_more,
        })
    }

    /// Delete an idea on behalf of `requester_id`.
    ///
    /// The ownership check and the delete happen under one lock. Deleting an
    /// id that no longer exists succeeds.
    pub fn delete_idea(&self, id: Uuid, requester_id: Uuid) -> StoreResult<()> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let owner: Option<String> = conn
            .query_row(
                "SELECT owner_id FROM ideas WHERE id = ?",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match owner {
            None => Ok(()),
            Some(owner) if owner != requester_id.to_string() => Err(StoreError::Forbidden),
            Some(_) => {
                conn.execute("DELETE FROM ideas WHERE id = ?", [id.to_string()])?;
                Ok(())
            }
        }
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_uuid(row.get::<_, String>(0)?),
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: parse_datetime(row.get::<_, String>(3)?),
    })
}

fn idea_from_row(row: &Row<'_>) -> rusqlite::Result<Idea> {
    Ok(Idea {
        id: parse_uuid(row.get::<_, String>(0)?),
        created_at: parse_datetime(row.get::<_, String>(1)?),
        owner_id: parse_uuid(row.get::<_, String>(2)?),
        idea_description: row.get(3)?,
        platform: Platform::from_str(&row.get::<_, String>(4)?).unwrap_or(Platform::Web),
        target_audience: row.get(5)?,
        features: row.get(6)?,
        blueprint: row.get(7)?,
    })
}

/// Fixed-width RFC 3339 so lexical order matches time order.
fn format_timestamp(ts: chrono::DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like(r"50%_a\b"), r"50\%\_a\\b");
    }

    #[test]
    fn timestamps_sort_lexically() {
        let earlier = Utc::now();
        let later = earlier + chrono::Duration::milliseconds(1);
        assert!(format_timestamp(earlier) < format_timestamp(later));
    }

    #[test]
    fn open_creates_file_backed_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ideastruct.db");
        let db = Database::open(path.clone()).unwrap();
        db.migrate().unwrap();
        assert!(path.exists());
    }
}
