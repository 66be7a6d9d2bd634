use std::collections::HashMap;
use std::future::Future;

use tracing::debug;
use zbus::zvariant::Value;
use zbus::Connection;

use crate::error::ConnmanResult;

use super::bus::BusChoice;
use super::dbus_proxies::{ManagerProxy, ServiceProxy, TechnologyProxy};
use super::types::PropertyMap;

/// Settings dict handed to `ConnectService`
pub type ConnectRequest = HashMap<&'static str, Value<'static>>;

/// The calls this client makes against the ConnMan daemon.
///
/// `DbusDaemon` is the real implementation; tests substitute an in-memory
/// one. Every call is one round-trip and reports transport or daemon failures
/// as `ConnmanError::Rpc`.
pub trait ConnmanDaemon: Send + Sync + 'static {
    /// `Manager.GetProperties`
    fn manager_properties(&self) -> impl Future<Output = ConnmanResult<PropertyMap>> + Send;

    /// `Manager.GetServices`, object paths flattened to strings
    fn services(&self) -> impl Future<Output = ConnmanResult<Vec<(String, PropertyMap)>>> + Send;

    /// `Technology.GetProperties` on one technology object
    fn technology_properties(
        &self,
        path: &str,
    ) -> impl Future<Output = ConnmanResult<PropertyMap>> + Send;

    /// `Technology.SetProperty` on one technology object
    fn set_technology_property(
        &self,
        path: &str,
        name: &str,
        value: Value<'static>,
    ) -> impl Future<Output = ConnmanResult<()>> + Send;

    /// `Service.GetProperties` on one service object
    fn service_properties(&self, path: &str)
        -> impl Future<Output = ConnmanResult<PropertyMap>> + Send;

    /// `Manager.ConnectService`; resolves to the connected service's path
    fn connect_service(
        &self,
        request: ConnectRequest,
    ) -> impl Future<Output = ConnmanResult<String>> + Send;
}

/// ConnMan reached over a zbus connection
pub struct DbusDaemon {
    connection: Connection,
    manager: ManagerProxy<'static>,
}

impl DbusDaemon {
    /// Open the bus and bind the manager proxy
    pub async fn connect(bus: BusChoice) -> ConnmanResult<Self> {
        let connection = bus.connect().await?;
        Self::with_connection(connection).await
    }

    pub async fn with_connection(connection: Connection) -> ConnmanResult<Self> {
        let manager = ManagerProxy::new(&connection).await?;
        Ok(Self {
            connection,
            manager,
        })
    }

    async fn technology(&self, path: &str) -> ConnmanResult<TechnologyProxy<'static>> {
        Ok(TechnologyProxy::builder(&self.connection)
            .path(path.to_owned())?
            .build()
            .await?)
    }
}

impl ConnmanDaemon for DbusDaemon {
    async fn manager_properties(&self) -> ConnmanResult<PropertyMap> {
        Ok(self.manager.get_properties().await?)
    }

    async fn services(&self) -> ConnmanResult<Vec<(String, PropertyMap)>> {
        let services = self.manager.get_services().await?;
        debug!("GetServices returned {} entries", services.len());
        Ok(services
            .into_iter()
            .map(|(path, props)| (path.to_string(), props))
            .collect())
    }

    async fn technology_properties(&self, path: &str) -> ConnmanResult<PropertyMap> {
        let proxy = self.technology(path).await?;
        Ok(proxy.get_properties().await?)
    }

    async fn set_technology_property(
        &self,
        path: &str,
        name: &str,
        value: Value<'static>,
    ) -> ConnmanResult<()> {
        let proxy = self.technology(path).await?;
        proxy.set_property(name, &value).await?;
        debug!("SetProperty {} on {}", name, path);
        Ok(())
    }

    async fn service_properties(&self, path: &str) -> ConnmanResult<PropertyMap> {
        let proxy = ServiceProxy::builder(&self.connection)
            .path(path.to_owned())?
            .build()
            .await?;
        Ok(proxy.get_properties().await?)
    }

    async fn connect_service(&self, request: ConnectRequest) -> ConnmanResult<String> {
        let path = self.manager.connect_service(request).await?;
        Ok(path.to_string())
    }
}
