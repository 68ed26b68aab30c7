use anyhow::{Context, Result};
use chrono::{Local, Utc};
use rusqlite::{Connection, params};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::models::{Notification, Role};

pub const NOTIFICATION_CAP: usize = 50;

// --- Token store ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTier {
    Durable,
    Session,
}

/// Bearer tokens, one per role, in two tiers: a durable file under the
/// data dir and a session file under the runtime dir. Reads prefer the
/// durable tier. A 401 clears both tiers for the affected role.
pub struct TokenStore {
    durable_dir: PathBuf,
    session_dir: PathBuf,
}

impl TokenStore {
    pub fn open(config: &Config) -> Self {
        Self {
            durable_dir: config.data_dir.clone(),
            session_dir: config.session_dir.clone(),
        }
    }

    fn path(&self, tier: TokenTier, role: Role) -> PathBuf {
        let dir = match tier {
            TokenTier::Durable => &self.durable_dir,
            TokenTier::Session => &self.session_dir,
        };
        dir.join(format!("{}.token", role.key()))
    }

    pub fn save(&self, role: Role, token: &str, tier: TokenTier) -> Result<()> {
        let path = self.path(tier, role);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, token.trim())
            .with_context(|| format!("Failed to write token file: {}", path.display()))?;
        Ok(())
    }

    pub fn load(&self, role: Role) -> Option<(String, TokenTier)> {
        for tier in [TokenTier::Durable, TokenTier::Session] {
            if let Ok(token) = fs::read_to_string(self.path(tier, role)) {
                let token = token.trim().to_string();
                if !token.is_empty() {
                    return Some((token, tier));
                }
            }
        }
        None
    }

    /// Remove the role's token from both tiers. Used on explicit logout
    /// and unconditionally on a 401.
    pub fn clear(&self, role: Role) {
        for tier in [TokenTier::Durable, TokenTier::Session] {
            let _ = fs::remove_file(self.path(tier, role));
        }
    }
}

// --- Notification log ---

/// Client-owned notification history. Capped at the 50 most recent
/// entries, oldest evicted first, listed newest-first.
pub struct NotificationLog {
    conn: Connection,
}

impl NotificationLog {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open notification log: {}", path.display()))?;
        let log = Self { conn };
        log.init()?;
        Ok(log)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let log = Self {
            conn: Connection::open_in_memory()?,
        };
        log.init()?;
        Ok(log)
    }

    fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS notifications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                message TEXT NOT NULL,
                time TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    pub fn push(&self, kind: &str, message: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO notifications (kind, message, time, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![
                kind,
                message,
                Local::now().format("%H:%M").to_string(),
                Utc::now().timestamp()
            ],
        )?;
        // FIFO eviction beyond the cap
        self.conn.execute(
            "DELETE FROM notifications WHERE id NOT IN
             (SELECT id FROM notifications ORDER BY id DESC LIMIT ?1)",
            params![NOTIFICATION_CAP as i64],
        )?;
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<Notification>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, message, time, timestamp FROM notifications ORDER BY id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Notification {
                id: row.get(0)?,
                kind: row.get(1)?,
                message: row.get(2)?,
                time: row.get(3)?,
                timestamp: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to list notifications")
    }

    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM notifications", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_list_newest_first() {
        let log = NotificationLog::open_in_memory().unwrap();
        log.push("import", "Imported 3 candidates").unwrap();
        log.push("workflow", "Approved employer Acme").unwrap();

        let items = log.list().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].message, "Approved employer Acme");
        assert_eq!(items[1].message, "Imported 3 candidates");
    }

    #[test]
    fn test_cap_evicts_oldest_first() {
        let log = NotificationLog::open_in_memory().unwrap();
        for i in 0..60 {
            log.push("test", &format!("message {}", i)).unwrap();
        }
        let items = log.list().unwrap();
        assert_eq!(items.len(), NOTIFICATION_CAP);
        // Newest survives at the front, the first ten are gone
        assert_eq!(items[0].message, "message 59");
        assert_eq!(items.last().unwrap().message, "message 10");
    }

    #[test]
    fn test_clear_empties_log() {
        let log = NotificationLog::open_in_memory().unwrap();
        log.push("test", "one").unwrap();
        log.clear().unwrap();
        assert!(log.list().unwrap().is_empty());
    }

    #[test]
    fn test_token_tiers_and_clear() {
        let base = std::env::temp_dir().join(format!("redflag-test-{}", std::process::id()));
        let config = Config {
            api_url: "http://localhost:5000".to_string(),
            data_dir: base.join("data"),
            session_dir: base.join("session"),
        };
        let store = TokenStore::open(&config);

        assert!(store.load(Role::Admin).is_none());

        store.save(Role::Admin, "tok-session", TokenTier::Session).unwrap();
        assert_eq!(
            store.load(Role::Admin),
            Some(("tok-session".to_string(), TokenTier::Session))
        );

        // Durable tier wins over session
        store.save(Role::Admin, "tok-durable", TokenTier::Durable).unwrap();
        assert_eq!(
            store.load(Role::Admin),
            Some(("tok-durable".to_string(), TokenTier::Durable))
        );

        // Roles are independent
        assert!(store.load(Role::Employer).is_none());

        // 401 handling clears both tiers
        store.clear(Role::Admin);
        assert!(store.load(Role::Admin).is_none());

        let _ = fs::remove_dir_all(base);
    }
}
