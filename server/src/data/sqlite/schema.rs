//! SQLite schema definitions
//!
//! Initial schema with all tables. No migrations needed for first version.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Products (catalog)
-- =============================================================================
CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY,
    product_id TEXT NOT NULL UNIQUE CHECK(length(product_id) >= 1),
    name TEXT NOT NULL CHECK(length(name) >= 1),
    domain TEXT,
    your_price REAL NOT NULL,
    timestamp TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_products_domain ON products(domain);
CREATE INDEX IF NOT EXISTS idx_products_name ON products(name COLLATE NOCASE);

-- =============================================================================
-- 2. Price history (append-only observations)
-- =============================================================================
CREATE TABLE IF NOT EXISTS price_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id TEXT NOT NULL,
    name TEXT NOT NULL,
    your_price REAL,
    competitor TEXT,
    competitor_price REAL,
    change_pct REAL,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_price_history_product
    ON price_history(product_id, timestamp);

-- =============================================================================
-- 3. Recent events (dashboard feed)
-- =============================================================================
CREATE TABLE IF NOT EXISTS recent_events (
    id TEXT PRIMARY KEY,
    product_id TEXT NOT NULL,
    name TEXT NOT NULL,
    your_price REAL NOT NULL,
    competitor TEXT NOT NULL,
    competitor_price REAL NOT NULL,
    change_pct REAL,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_recent_events_timestamp ON recent_events(timestamp);

-- =============================================================================
-- 4. Users (directory)
-- =============================================================================
CREATE TABLE IF NOT EXISTS users (
    uid TEXT PRIMARY KEY,
    email TEXT,
    name TEXT,
    role TEXT NOT NULL CHECK(role IN ('user', 'moderator', 'admin', 'superadmin')),
    domain TEXT,
    employee_number TEXT,
    disabled INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_domain ON users(domain);
CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);

-- =============================================================================
-- 5. Organizations (one row per domain)
-- =============================================================================
CREATE TABLE IF NOT EXISTS organizations (
    domain TEXT PRIMARY KEY CHECK(length(domain) >= 1),
    admin_uid TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- =============================================================================
-- 6. Recommendations
-- =============================================================================
CREATE TABLE IF NOT EXISTS recommendations (
    id TEXT PRIMARY KEY,
    product TEXT NOT NULL,
    impact TEXT NOT NULL,
    priority TEXT NOT NULL CHECK(priority IN ('Low', 'Medium', 'High')),
    confidence REAL NOT NULL CHECK(confidence >= 0.0 AND confidence <= 1.0)
);

CREATE INDEX IF NOT EXISTS idx_recommendations_confidence
    ON recommendations(confidence DESC);
"#;
