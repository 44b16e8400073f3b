//! Database platforms.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The database platform a connection talks to.
///
/// Supplied by the connection and fixed for its lifetime. Providers are
/// selected by asking each one whether it supports the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    /// MySQL.
    MySql,
    /// MariaDB.
    MariaDb,
    /// SQLite.
    Sqlite,
    /// PostgreSQL.
    Postgres,
    /// Any other platform, by driver name.
    Other(String),
}

impl Platform {
    /// Returns the platform name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::MySql => "mysql",
            Self::MariaDb => "mariadb",
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgresql",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "mysql" => Self::MySql,
            "mariadb" => Self::MariaDb,
            "sqlite" | "sqlite3" => Self::Sqlite,
            "postgres" | "postgresql" | "pgsql" => Self::Postgres,
            other => Self::Other(other.to_string()),
        })
    }
}
