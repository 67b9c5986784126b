use std::fmt;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8800";

/// PostgreSQL connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
    pub db_name: String,
    pub ssl_mode: String,
}

impl DbConfig {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: get_or(&lookup, "DB_HOST", "localhost"),
            port: get_or(&lookup, "DB_PORT", "5432"),
            user: get_or(&lookup, "DB_USER", "postgres"),
            password: get_or(&lookup, "DB_PASSWORD", "123456"),
            db_name: get_or(&lookup, "DB_NAME", "nyc"),
            ssl_mode: get_or(&lookup, "DB_SSLMODE", "disable"),
        }
    }

    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.user, self.password, self.host, self.port, self.db_name, self.ssl_mode
        )
    }
}

// パスワードはログに出さない
impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("db_name", &self.db_name)
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

impl fmt::Display for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "postgres://{}:***@{}:{}/{}?sslmode={}",
            self.user, self.host, self.port, self.db_name, self.ssl_mode
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub min_connections: u32,
    pub max_connections: u32,
}

impl PoolConfig {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            min_connections: get_u32_or(&lookup, "DB_MIN_CONN_SIZE", 5),
            max_connections: get_u32_or(&lookup, "DB_MAX_CONN_SIZE", 20),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub pool: PoolConfig,
    pub listen_addr: String,
}

impl Config {
    /// Load `.env.{ENV}` (when `ENV` is set) and then `.env`, and read the
    /// configuration from the process environment.
    ///
    /// dotenvy never overrides variables that are already set, so the OS
    /// environment wins over `.env.{ENV}`, which wins over `.env`.
    pub fn load() -> Self {
        if let Some(env) = non_empty(std::env::var("ENV").ok()) {
            let env_file = format!(".env.{}", env);
            match dotenvy::from_filename(&env_file) {
                Ok(_) => tracing::info!("Loaded environment variables from {}", env_file),
                Err(e) => tracing::info!("No env file {} loaded: {}", env_file, e),
            }
        }

        if let Err(e) = dotenvy::dotenv() {
            tracing::info!("No default .env file loaded: {}", e);
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            db: DbConfig::from_lookup(&lookup),
            pool: PoolConfig::from_lookup(&lookup),
            listen_addr: get_or(&lookup, "LISTEN_ADDR", DEFAULT_LISTEN_ADDR),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn get_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup(key)).unwrap_or_else(|| default.to_string())
}

fn get_u32_or<F>(lookup: &F, key: &str, default: u32) -> u32
where
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup(key)) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(
                "Failed to parse {}='{}' as integer, using default {}",
                key,
                raw,
                default
            );
            default
        }),
        None => default,
    }
}
