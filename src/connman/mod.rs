pub mod bus;
pub mod daemon;
pub mod dbus_proxies;
pub mod manager;
pub mod reconcile;
pub mod types;

pub use bus::BusChoice;
pub use daemon::{ConnectRequest, ConnmanDaemon, DbusDaemon};
pub use manager::{ConnmanManager, ConnmanStatus, PendingConnect};
pub use reconcile::reconcile;
pub use types::*;
