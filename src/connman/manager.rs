use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use zbus::zvariant::Value;

use crate::error::{ConnmanError, ConnmanResult};

use super::bus::BusChoice;
use super::daemon::{ConnectRequest, ConnmanDaemon, DbusDaemon};
use super::reconcile::reconcile;
use super::types::*;

/// Technology name that carries wifi tethering
const WIFI_TECHNOLOGY: &str = "wifi";

/// High-level facade over ConnMan's D-Bus API.
///
/// Keeps the cached service set and technology registry. Refreshes take
/// `&mut self`, so a single owner drives them; nothing here is locked.
pub struct ConnmanManager<D: ConnmanDaemon = DbusDaemon> {
    daemon: Arc<D>,
    services: ServiceSet,
    technologies: Vec<TechnologyEntry>,
}

/// Everything the `status` view shows, taken in one go
#[derive(Debug, Clone, Serialize)]
pub struct ConnmanStatus {
    pub online: bool,
    pub technologies: Vec<TechnologyEntry>,
    pub services: ServiceSet,
}

impl ConnmanManager<DbusDaemon> {
    /// Connect to the daemon on the given bus
    pub async fn connect(bus: BusChoice) -> ConnmanResult<Self> {
        let daemon = DbusDaemon::connect(bus).await?;
        info!("Bound to net.connman on the {} bus", bus.resolve());
        Ok(Self::new(daemon))
    }
}

impl<D: ConnmanDaemon> ConnmanManager<D> {
    pub fn new(daemon: D) -> Self {
        Self {
            daemon: Arc::new(daemon),
            services: ServiceSet::new(),
            technologies: Vec::new(),
        }
    }

    /// Services as of the last successful refresh
    pub fn services(&self) -> &ServiceSet {
        &self.services
    }

    /// Technologies as of the last successful refresh
    pub fn technologies(&self) -> &[TechnologyEntry] {
        &self.technologies
    }

    /// First technology with the given name
    pub fn technology(&self, name: &str) -> Option<&TechnologyEntry> {
        self.technologies.iter().find(|t| t.technology_name == name)
    }

    // ── Refresh ───────────────────────────────────────────────────────

    /// Fetch the daemon's service list and reconcile the cache against it.
    /// On error the cache is left as it was.
    pub async fn refresh_services(&mut self) -> ConnmanResult<&ServiceSet> {
        let upstream = self.daemon.services().await?;
        let before = self.services.len();
        self.services = reconcile(std::mem::take(&mut self.services), &upstream);
        debug!(
            "Services refreshed: {} cached before, {} now",
            before,
            self.services.len()
        );
        Ok(&self.services)
    }

    /// Rebuild the technology registry from scratch, one round-trip per
    /// technology. The first failing fetch aborts and keeps the old registry.
    pub async fn refresh_technologies(&mut self) -> ConnmanResult<&[TechnologyEntry]> {
        let props = self.daemon.manager_properties().await?;
        let paths = extract_object_paths(&props, "Technologies").unwrap_or_default();

        let mut technologies = Vec::with_capacity(paths.len());
        for path in paths {
            let tech_props = self.daemon.technology_properties(&path).await?;
            let tech = TechnologyEntry::from_properties(path, &tech_props);
            debug!(path = %tech.object_path, name = %tech.technology_name, "Technology");
            technologies.push(tech);
        }

        self.technologies = technologies;
        Ok(&self.technologies)
    }

    /// `true` unless the daemon is in offline mode. A missing or non-boolean
    /// `OfflineMode` counts as offline.
    pub async fn is_online(&self) -> ConnmanResult<bool> {
        let props = self.daemon.manager_properties().await?;
        Ok(extract_bool(&props, "OfflineMode").is_some_and(|offline| !offline))
    }

    /// Refresh everything and return it together
    pub async fn status(&mut self) -> ConnmanResult<ConnmanStatus> {
        let online = self.is_online().await?;
        self.refresh_technologies().await?;
        self.refresh_services().await?;
        Ok(ConnmanStatus {
            online,
            technologies: self.technologies.clone(),
            services: self.services.clone(),
        })
    }

    /// Fetch a fresh snapshot of one service. The cache is not touched.
    pub async fn service_properties(
        &self,
        service: &ServiceSnapshot,
    ) -> ConnmanResult<ServiceSnapshot> {
        let props = self.daemon.service_properties(&service.object_path).await?;
        Ok(ServiceSnapshot::from_properties(
            service.object_path.as_str(),
            &props,
        ))
    }

    // ── Commands ──────────────────────────────────────────────────────

    /// Ask the daemon to connect a wifi service.
    ///
    /// Returns as soon as the request is dispatched; await the returned
    /// handle for the outcome. Must be called inside a tokio runtime.
    pub fn connect_service(
        &self,
        service: &ServiceSnapshot,
        secret: Option<&str>,
    ) -> ConnmanResult<PendingConnect> {
        let request = connect_request(service, secret)?;
        let daemon = Arc::clone(&self.daemon);
        let name = service.name.clone();
        let (tx, rx) = oneshot::channel();

        info!("Connecting to '{}' ({})", name, service.object_path);
        tokio::spawn(async move {
            let result = daemon.connect_service(request).await;
            match &result {
                Ok(path) => info!("Connected to '{}': {}", name, path),
                Err(e) => warn!("Connecting to '{}' failed: {}", name, e),
            }
            // Receiver may be gone; the result is simply dropped then
            let _ = tx.send(result);
        });

        Ok(PendingConnect {
            service: service.object_path.clone(),
            rx,
        })
    }

    /// Start wifi tethering. The identifier and passphrase are set before
    /// `Tethering` is switched on; a failure part-way leaves earlier
    /// properties applied.
    pub async fn enable_tethering(&self, identifier: &str, secret: &str) -> ConnmanResult<()> {
        let path = self.wifi_technology_path()?;
        info!("Enabling tethering with ssid '{}' on {}", identifier, path);

        self.daemon
            .set_technology_property(
                &path,
                "TetheringIdentifier",
                Value::from(identifier.to_owned()),
            )
            .await?;
        self.daemon
            .set_technology_property(&path, "TetheringPassphrase", Value::from(secret.to_owned()))
            .await?;
        self.daemon
            .set_technology_property(&path, "Tethering", Value::from(true))
            .await?;
        Ok(())
    }

    /// Stop wifi tethering
    pub async fn disable_tethering(&self) -> ConnmanResult<()> {
        let path = self.wifi_technology_path()?;
        info!("Disabling tethering on {}", path);
        self.daemon
            .set_technology_property(&path, "Tethering", Value::from(false))
            .await
    }

    fn wifi_technology_path(&self) -> ConnmanResult<String> {
        self.technology(WIFI_TECHNOLOGY)
            .map(|t| t.object_path.clone())
            .ok_or_else(|| ConnmanError::NotFound("wifi technology".into()))
    }
}

/// Settings dict for `ConnectService`. Only wifi services qualify.
pub fn connect_request(
    service: &ServiceSnapshot,
    secret: Option<&str>,
) -> ConnmanResult<ConnectRequest> {
    if !service.is_wifi() {
        return Err(ConnmanError::InvalidServiceType {
            path: service.object_path.clone(),
            kind: service.connection_type.to_string(),
        });
    }

    let mut request = ConnectRequest::new();
    request.insert("Type", Value::from("wifi"));
    request.insert("Mode", Value::from("managed"));
    request.insert("SSID", Value::from(service.name.clone()));
    match secret {
        Some(secret) => {
            request.insert("Security", Value::from("psk"));
            request.insert("Passphrase", Value::from(secret.to_owned()));
        }
        None => {
            request.insert("Security", Value::from("none"));
        }
    }
    Ok(request)
}

/// Outcome of a dispatched `connect_service` call. Resolves exactly once.
pub struct PendingConnect {
    service: String,
    rx: oneshot::Receiver<ConnmanResult<String>>,
}

impl PendingConnect {
    /// Object path of the service being connected
    pub fn service(&self) -> &str {
        &self.service
    }
}

impl Future for PendingConnect {
    type Output = ConnmanResult<String>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        Pin::new(&mut this.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| Err(ConnmanError::ConnectAborted(this.service.clone())))
        })
    }
}
