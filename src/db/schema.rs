/// Schema for the local flag store
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS local_flags (
  key TEXT PRIMARY KEY,
  value INTEGER NOT NULL DEFAULT 0
);
";
