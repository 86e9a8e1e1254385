pub mod schema;

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;

/// Local store for small client-side flags that must survive restarts.
pub struct Database {
  conn: Connection,
}

impl Database {
  /// Open or create the database at the default location
  pub fn open() -> Result<Self> {
    let path = Self::default_path()?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create database directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open database at {}: {}", path.display(), e))?;

    let db = Self { conn };
    db.run_migrations()?;

    Ok(db)
  }

  #[cfg(test)]
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory().map_err(|e| eyre!("Failed to open database: {}", e))?;
    let db = Self { conn };
    db.run_migrations()?;
    Ok(db)
  }

  /// Get the default database path
  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("selah").join("local.db"))
  }

  /// Run database migrations
  fn run_migrations(&self) -> Result<()> {
    self
      .conn
      .execute_batch(schema::SCHEMA)
      .map_err(|e| eyre!("Failed to run migrations: {}", e))?;
    Ok(())
  }

  /// Read a boolean flag. Absent keys read as false.
  pub fn get_flag(&self, key: &str) -> Result<bool> {
    let value: Option<i64> = self
      .conn
      .query_row(
        "SELECT value FROM local_flags WHERE key = ?1",
        params![key],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read flag {}: {}", key, e))?;

    Ok(value.unwrap_or(0) != 0)
  }

  /// Write a boolean flag, replacing any previous value.
  pub fn set_flag(&self, key: &str, value: bool) -> Result<()> {
    self
      .conn
      .execute(
        "INSERT INTO local_flags (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value as i64],
      )
      .map_err(|e| eyre!("Failed to write flag {}: {}", key, e))?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn absent_flag_reads_false() {
    let db = Database::open_in_memory().unwrap();
    assert!(!db.get_flag("never_set").unwrap());
  }

  #[test]
  fn set_flag_round_trips_and_overwrites() {
    let db = Database::open_in_memory().unwrap();

    db.set_flag("greeted", true).unwrap();
    assert!(db.get_flag("greeted").unwrap());

    db.set_flag("greeted", false).unwrap();
    assert!(!db.get_flag("greeted").unwrap());
  }
}
