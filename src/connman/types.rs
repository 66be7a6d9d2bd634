use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use zbus::zvariant::{OwnedValue, Value};

/// Property bundle as returned by `GetProperties` / `GetServices`
pub type PropertyMap = HashMap<String, OwnedValue>;

/// Kind of link a service runs over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    #[default]
    Unknown,
    Ethernet,
    Wifi,
}

impl ConnectionType {
    pub fn from_connman(kind: &str) -> Self {
        match kind {
            "wifi" => Self::Wifi,
            "ethernet" => Self::Ethernet,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Ethernet => write!(f, "ethernet"),
            Self::Wifi => write!(f, "wifi"),
        }
    }
}

/// One service as the daemon described it when it was first discovered.
///
/// Identity is `object_path` alone. Every other field is whatever the daemon
/// reported at decode time and is never refreshed in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceSnapshot {
    pub object_path: String,
    pub name: String,
    pub connection_type: ConnectionType,
    pub signal_strength: u8,
    pub login_required: bool,
    pub passphrase_required: bool,
    pub auto_connect: bool,
    pub immutable: bool,
    pub favorite: bool,
}

impl ServiceSnapshot {
    /// Decode a service from its property bundle. Never fails: unknown keys
    /// are ignored and missing or mistyped values become zero values.
    pub fn from_properties(object_path: impl Into<String>, props: &PropertyMap) -> Self {
        Self {
            object_path: object_path.into(),
            name: extract_string(props, "Name").unwrap_or_default(),
            connection_type: extract_string(props, "Type")
                .map(|t| ConnectionType::from_connman(&t))
                .unwrap_or_default(),
            signal_strength: extract_u8(props, "Strength").unwrap_or(0),
            login_required: extract_bool(props, "LoginRequired").unwrap_or(false),
            passphrase_required: extract_bool(props, "PassphraseRequired").unwrap_or(false),
            auto_connect: extract_bool(props, "AutoConnect").unwrap_or(false),
            immutable: extract_bool(props, "Immutable").unwrap_or(false),
            favorite: extract_bool(props, "Favorite").unwrap_or(false),
        }
    }

    pub fn is_wifi(&self) -> bool {
        self.connection_type == ConnectionType::Wifi
    }

    pub fn is_ethernet(&self) -> bool {
        self.connection_type == ConnectionType::Ethernet
    }

    pub fn has_object_path(&self, path: &str) -> bool {
        self.object_path == path
    }
}

/// A network technology (wifi, ethernet, bluetooth, ...) known to the daemon
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TechnologyEntry {
    pub object_path: String,
    pub technology_name: String,
    pub powered: bool,
    pub connected: bool,
    pub tethering: bool,
}

impl TechnologyEntry {
    pub fn from_properties(object_path: impl Into<String>, props: &PropertyMap) -> Self {
        Self {
            object_path: object_path.into(),
            technology_name: extract_string(props, "Type").unwrap_or_default(),
            powered: extract_bool(props, "Powered").unwrap_or(false),
            connected: extract_bool(props, "Connected").unwrap_or(false),
            tethering: extract_bool(props, "Tethering").unwrap_or(false),
        }
    }
}

/// Ordered set of services keyed by object path, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ServiceSet {
    entries: Vec<ServiceSnapshot>,
}

impl ServiceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ServiceSnapshot> {
        self.entries.iter()
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.entries.iter().any(|s| s.has_object_path(path))
    }

    pub fn find_by_path(&self, path: &str) -> Option<&ServiceSnapshot> {
        self.entries.iter().find(|s| s.has_object_path(path))
    }

    /// First service whose display name matches exactly
    pub fn find_by_name(&self, name: &str) -> Option<&ServiceSnapshot> {
        self.entries.iter().find(|s| s.name == name)
    }

    /// Object paths in set order
    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|s| s.object_path.as_str()).collect()
    }

    /// Appends unless the path is already present.
    pub(crate) fn push(&mut self, service: ServiceSnapshot) {
        if !self.contains_path(&service.object_path) {
            self.entries.push(service);
        }
    }

    pub(crate) fn retain<F: FnMut(&ServiceSnapshot) -> bool>(&mut self, keep: F) {
        self.entries.retain(keep);
    }
}

impl FromIterator<ServiceSnapshot> for ServiceSet {
    fn from_iter<I: IntoIterator<Item = ServiceSnapshot>>(iter: I) -> Self {
        let mut set = Self::new();
        for service in iter {
            set.push(service);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ServiceSet {
    type Item = &'a ServiceSnapshot;
    type IntoIter = std::slice::Iter<'a, ServiceSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ── Helpers for pulling typed values out of ConnMan property maps ─────

pub fn extract_string(props: &PropertyMap, key: &str) -> Option<String> {
    props.get(key).and_then(ov_to_string)
}

pub fn extract_bool(props: &PropertyMap, key: &str) -> Option<bool> {
    props.get(key).and_then(ov_to_bool)
}

pub fn extract_u8(props: &PropertyMap, key: &str) -> Option<u8> {
    props.get(key).and_then(ov_to_u8)
}

pub fn extract_object_paths(props: &PropertyMap, key: &str) -> Option<Vec<String>> {
    props.get(key).and_then(ov_to_object_paths)
}

// OwnedValue derefs to Value<'static>, so &**v gives &Value to match on.

fn ov_to_string(v: &OwnedValue) -> Option<String> {
    match &**v {
        Value::Str(s) => Some(s.to_string()),
        _ => None,
    }
}

fn ov_to_bool(v: &OwnedValue) -> Option<bool> {
    match &**v {
        Value::Bool(b) => Some(*b),
        _ => None,
    }
}

fn ov_to_u8(v: &OwnedValue) -> Option<u8> {
    match &**v {
        Value::U8(n) => Some(*n),
        _ => None,
    }
}

fn ov_to_object_paths(v: &OwnedValue) -> Option<Vec<String>> {
    match &**v {
        Value::Array(arr) => {
            let mut paths = Vec::new();
            for item in arr.iter() {
                match item {
                    Value::ObjectPath(p) => paths.push(p.to_string()),
                    Value::Str(s) => paths.push(s.to_string()),
                    _ => return None,
                }
            }
            Some(paths)
        }
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use zbus::zvariant::ObjectPath;

    pub fn ov<'a, T: Into<Value<'a>>>(v: T) -> OwnedValue {
        let value: Value<'a> = v.into();
        OwnedValue::try_from(value).unwrap()
    }

    pub fn props(pairs: &[(&str, OwnedValue)]) -> PropertyMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.try_clone().unwrap()))
            .collect()
    }

    #[test]
    fn decodes_wifi_service() {
        let p = props(&[
            ("Name", ov("home-wifi")),
            ("Type", ov("wifi")),
            ("Strength", ov(80u8)),
        ]);
        let s = ServiceSnapshot::from_properties("/net/connman/service/wifi_home", &p);

        assert_eq!(s.connection_type, ConnectionType::Wifi);
        assert_eq!(s.name, "home-wifi");
        assert_eq!(s.signal_strength, 80);
        assert!(!s.login_required);
        assert!(!s.passphrase_required);
        assert!(!s.auto_connect);
        assert!(!s.immutable);
        assert!(!s.favorite);
    }

    #[test]
    fn decodes_flags() {
        let p = props(&[
            ("Type", ov("ethernet")),
            ("LoginRequired", ov(true)),
            ("PassphraseRequired", ov(true)),
            ("AutoConnect", ov(true)),
            ("Immutable", ov(true)),
            ("Favorite", ov(true)),
        ]);
        let s = ServiceSnapshot::from_properties("/eth0", &p);

        assert!(s.is_ethernet());
        assert!(s.login_required && s.passphrase_required);
        assert!(s.auto_connect && s.immutable && s.favorite);
        assert_eq!(s.name, "");
    }

    #[test]
    fn unknown_type_and_keys_are_tolerated() {
        let p = props(&[
            ("Type", ov("bluetooth")),
            ("Nameservers", ov(vec!["8.8.8.8"])),
            ("State", ov("idle")),
        ]);
        let s = ServiceSnapshot::from_properties("/bt", &p);
        assert_eq!(s.connection_type, ConnectionType::Unknown);
        assert_eq!(s.object_path, "/bt");
    }

    #[test]
    fn mistyped_values_fall_back_to_defaults() {
        let p = props(&[
            ("Name", ov(42u32)),
            ("Strength", ov("strong")),
            ("Favorite", ov("yes")),
            ("Type", ov(true)),
        ]);
        let s = ServiceSnapshot::from_properties("/odd", &p);
        assert_eq!(
            s,
            ServiceSnapshot {
                object_path: "/odd".into(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn decodes_technology() {
        let p = props(&[
            ("Type", ov("wifi")),
            ("Name", ov("WiFi")),
            ("Powered", ov(true)),
        ]);
        let t = TechnologyEntry::from_properties("/net/connman/technology/wifi", &p);
        assert_eq!(t.technology_name, "wifi");
        assert!(t.powered);
        assert!(!t.tethering);
        assert!(!t.connected);
    }

    #[test]
    fn extracts_object_path_arrays() {
        let paths = vec![
            ObjectPath::try_from("/net/connman/technology/wifi").unwrap(),
            ObjectPath::try_from("/net/connman/technology/ethernet").unwrap(),
        ];
        let p = props(&[("Technologies", ov(paths))]);
        assert_eq!(
            extract_object_paths(&p, "Technologies").unwrap(),
            vec![
                "/net/connman/technology/wifi",
                "/net/connman/technology/ethernet"
            ]
        );
    }

    #[test]
    fn service_set_rejects_duplicate_paths() {
        let set: ServiceSet = ["/a", "/b", "/a"]
            .into_iter()
            .map(|p| ServiceSnapshot {
                object_path: p.into(),
                ..Default::default()
            })
            .collect();
        assert_eq!(set.paths(), vec!["/a", "/b"]);
    }
}
