//! A small client for the ConnMan connection manager.
//!
//! [`ConnmanManager`] talks to `net.connman` over D-Bus, keeps a cached
//! [`ServiceSet`] in line with the daemon through [`reconcile`], rebuilds the
//! technology list on demand, and issues wifi connect and tethering commands.
//!
//! ```no_run
//! use connman_lite::{BusChoice, ConnmanManager};
//!
//! # async fn example() -> connman_lite::ConnmanResult<()> {
//! let mut manager = ConnmanManager::connect(BusChoice::Auto).await?;
//! manager.refresh_services().await?;
//! for service in manager.services() {
//!     println!("{} ({})", service.name, service.connection_type);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connman;
pub mod error;

pub use connman::{
    reconcile, BusChoice, ConnectionType, ConnmanDaemon, ConnmanManager, ConnmanStatus,
    DbusDaemon, PendingConnect, PropertyMap, ServiceSet, ServiceSnapshot, TechnologyEntry,
};
pub use error::{ConnmanError, ConnmanResult};
