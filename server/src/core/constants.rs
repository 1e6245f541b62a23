// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "PricePulse";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "pricepulse";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".pricepulse";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "pricepulse.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "PRICEPULSE_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "PRICEPULSE_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "PRICEPULSE_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "PRICEPULSE_LOG";

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "PRICEPULSE_DATA_DIR";

// =============================================================================
// Environment Variables - Scoring
// =============================================================================

/// Environment variable for the ML scoring service base URL
pub const ENV_SCORING_URL: &str = "PRICEPULSE_SCORING_URL";

/// Environment variable for the scoring request timeout (seconds)
pub const ENV_SCORING_TIMEOUT_SECS: &str = "PRICEPULSE_SCORING_TIMEOUT_SECS";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5480;

// =============================================================================
// Scoring Defaults
// =============================================================================

/// Default ML scoring service base URL
pub const DEFAULT_SCORING_URL: &str = "https://smart-pricing-platform.onrender.com";

/// Scoring request timeout in seconds. The remote model run is slow; a
/// timed-out run may still complete on the remote side.
pub const DEFAULT_SCORING_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "pricepulse.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

/// SQLite cache size (negative = KB, so -64000 = 64MB)
pub const SQLITE_CACHE_SIZE: &str = "-64000";

/// SQLite WAL auto-checkpoint threshold (pages)
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// WAL checkpoint interval in seconds (5 minutes)
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Request Body Limits
// =============================================================================

/// Default body limit for general API requests (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Body limit for bulk product ingestion (8 MB - spreadsheet-sized uploads)
pub const INGEST_BODY_LIMIT: usize = 8 * 1024 * 1024;

// =============================================================================
// Pagination & Query Limits
// =============================================================================

/// Default page number for product listings
pub const DEFAULT_PAGE: u32 = 1;

/// Default items per page for product listings
pub const DEFAULT_PER_PAGE: u32 = 25;

/// Maximum items per page for product listings
pub const MAX_PER_PAGE: u32 = 1000;

/// Default user listing limit
pub const DEFAULT_USER_LIMIT: u32 = 100;

/// Maximum user listing limit
pub const MAX_USER_LIMIT: u32 = 500;

/// Default dashboard page size (recent events)
pub const DEFAULT_EVENT_PAGE_SIZE: u32 = 10;

/// Maximum dashboard page size (recent events)
pub const MAX_EVENT_PAGE_SIZE: u32 = 100;

/// Default recommendation listing limit
pub const DEFAULT_RECOMMENDATION_LIMIT: u32 = 10;

/// Maximum recommendation listing limit
pub const MAX_RECOMMENDATION_LIMIT: u32 = 100;

/// Maximum rows accepted in one bulk product upsert
pub const MAX_BULK_PRODUCTS: usize = 5000;

/// Default price-series window when no `from`/`to` is supplied (days)
pub const DEFAULT_SERIES_WINDOW_DAYS: i64 = 30;

// =============================================================================
// Shutdown
// =============================================================================

/// Graceful shutdown timeout in seconds
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;
