/// Migration system for tracking and applying database schema changes.
///
/// Each migration has a version number and a SQL statement.
/// Migrations are applied in ascending version order and tracked in a
/// `_migrations` table.
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

pub const USERS_SCHEMA_V1_SQL: &str = "
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    display_name TEXT,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
";

pub const USERS_SCHEMA_V1: Migration = Migration {
    version: 1,
    name: "users_schema_v1",
    sql: USERS_SCHEMA_V1_SQL,
};

pub const AUTH_SESSIONS_SCHEMA_V2_SQL: &str = "
CREATE TABLE IF NOT EXISTS auth_sessions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    expires_at TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_auth_sessions_user_expires
    ON auth_sessions(user_id, expires_at);
";

pub const AUTH_SESSIONS_SCHEMA_V2: Migration = Migration {
    version: 2,
    name: "auth_sessions_schema_v2",
    sql: AUTH_SESSIONS_SCHEMA_V2_SQL,
};

pub const CONTACT_SUBMISSIONS_SCHEMA_V3_SQL: &str = "
CREATE TABLE IF NOT EXISTS contact_submissions (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL,
    name TEXT,
    message TEXT NOT NULL,
    handled INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_contact_submissions_created_at
    ON contact_submissions(created_at);
";

pub const CONTACT_SUBMISSIONS_SCHEMA_V3: Migration = Migration {
    version: 3,
    name: "contact_submissions_schema_v3",
    sql: CONTACT_SUBMISSIONS_SCHEMA_V3_SQL,
};

/// All authored migrations, in the order they were written.
pub const REGISTRY: &[Migration] = &[
    USERS_SCHEMA_V1,
    AUTH_SESSIONS_SCHEMA_V2,
    CONTACT_SUBMISSIONS_SCHEMA_V3,
];
