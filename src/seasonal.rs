//! Year-scoped flag for the one-off seasonal overlay.
//!
//! The overlay should greet the user once per calendar year, so the
//! "already shown" bit lives in the local store under a key that carries the
//! year. Last year's key simply stops being consulted.

use color_eyre::Result;

use crate::db::Database;

fn flag_key(year: i32) -> String {
  format!("seasonal_overlay_{}", year)
}

/// Whether the overlay was already shown this calendar year.
pub fn already_shown(db: &Database, year: i32) -> Result<bool> {
  db.get_flag(&flag_key(year))
}

/// Record that the overlay was shown for this calendar year.
pub fn mark_shown(db: &Database, year: i32) -> Result<()> {
  db.set_flag(&flag_key(year), true)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unseen_year_reads_false() {
    let db = Database::open_in_memory().unwrap();
    assert!(!already_shown(&db, 2026).unwrap());
  }

  #[test]
  fn mark_shown_sticks_for_that_year_only() {
    let db = Database::open_in_memory().unwrap();

    mark_shown(&db, 2026).unwrap();
    assert!(already_shown(&db, 2026).unwrap());
    assert!(!already_shown(&db, 2027).unwrap());
  }
}
