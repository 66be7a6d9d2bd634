use thiserror::Error;

/// Unified error type for connman-lite
#[derive(Error, Debug)]
pub enum ConnmanError {
    #[error("D-Bus error: {0}")]
    Rpc(#[from] zbus::Error),

    #[error("D-Bus fdo error: {0}")]
    RpcFdo(#[from] zbus::fdo::Error),

    #[error("Service {path} is {kind}, only wifi services can be connected")]
    InvalidServiceType { path: String, kind: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Connect request for {0} ended without a reply")]
    ConnectAborted(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConnmanResult<T> = Result<T, ConnmanError>;
