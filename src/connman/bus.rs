use std::fmt;
use std::str::FromStr;

use tracing::info;
use zbus::Connection;

use crate::error::{ConnmanError, ConnmanResult};

/// Which message bus to find the daemon on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BusChoice {
    /// System bus when running as root, session bus otherwise
    #[default]
    Auto,
    System,
    Session,
}

impl BusChoice {
    /// Resolve `Auto` against the effective uid of this process
    pub fn resolve(self) -> BusChoice {
        match self {
            Self::Auto => Self::for_euid(unsafe { libc::geteuid() }),
            other => other,
        }
    }

    fn for_euid(euid: libc::uid_t) -> BusChoice {
        if euid == 0 {
            info!("Running as root, using the system bus");
            Self::System
        } else {
            info!("Running as user, using the session bus");
            Self::Session
        }
    }

    /// Open a connection to the resolved bus
    pub async fn connect(self) -> ConnmanResult<Connection> {
        let connection = match self.resolve() {
            Self::System | Self::Auto => Connection::system().await?,
            Self::Session => Connection::session().await?,
        };
        Ok(connection)
    }
}

impl FromStr for BusChoice {
    type Err = ConnmanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "system" => Ok(Self::System),
            "session" | "user" => Ok(Self::Session),
            other => Err(ConnmanError::Config(format!(
                "unknown bus \"{other}\" (expected auto, system or session)"
            ))),
        }
    }
}

impl fmt::Display for BusChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::System => write!(f, "system"),
            Self::Session => write!(f, "session"),
        }
    }
}
