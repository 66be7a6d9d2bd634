// D-Bus proxy trait definitions for the ConnMan interfaces.
// These use zbus's #[proxy] macro to auto-generate typed async clients.
// ConnMan predates org.freedesktop.DBus.Properties and exposes its own
// GetProperties/SetProperty methods instead.

use std::collections::HashMap;
use zbus::proxy;
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

// ── Manager Interface ─────────────────────────────────────────────────

#[proxy(
    interface = "net.connman.Manager",
    default_service = "net.connman",
    default_path = "/"
)]
pub trait Manager {
    /// Global properties (OfflineMode, State, Technologies, ...)
    fn get_properties(&self) -> zbus::Result<HashMap<String, OwnedValue>>;

    /// All services with their properties, in the daemon's order
    fn get_services(&self) -> zbus::Result<Vec<(OwnedObjectPath, HashMap<String, OwnedValue>)>>;

    /// Create (if needed) and connect a service from a settings dict
    fn connect_service(&self, network: HashMap<&str, Value<'_>>) -> zbus::Result<OwnedObjectPath>;
}

// ── Technology Interface ──────────────────────────────────────────────

#[proxy(interface = "net.connman.Technology", default_service = "net.connman")]
pub trait Technology {
    /// Type, Name, Powered, Connected, Tethering, ...
    fn get_properties(&self) -> zbus::Result<HashMap<String, OwnedValue>>;

    /// Set a single writable property
    fn set_property(&self, name: &str, value: &Value<'_>) -> zbus::Result<()>;
}

// ── Service Interface ─────────────────────────────────────────────────

#[proxy(interface = "net.connman.Service", default_service = "net.connman")]
pub trait Service {
    fn get_properties(&self) -> zbus::Result<HashMap<String, OwnedValue>>;
}
