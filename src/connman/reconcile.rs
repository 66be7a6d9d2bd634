use tracing::debug;

use super::types::{PropertyMap, ServiceSet, ServiceSnapshot};

/// Bring `current` in line with the daemon's authoritative service list.
///
/// Services already cached are kept as they are, in their existing order,
/// even when the daemon now reports different properties for them. New
/// services are decoded and appended in upstream order. Services missing
/// upstream are dropped.
pub fn reconcile(current: ServiceSet, upstream: &[(String, PropertyMap)]) -> ServiceSet {
    let mut working = current;

    // Additions
    for (path, props) in upstream {
        if !working.contains_path(path) {
            let service = ServiceSnapshot::from_properties(path.as_str(), props);
            debug!(
                path = %service.object_path,
                name = %service.name,
                kind = %service.connection_type,
                "New service"
            );
            working.push(service);
        }
    }

    // Removals are collected first and applied in their own pass
    let stale: Vec<String> = working
        .iter()
        .filter(|s| !upstream.iter().any(|(path, _)| s.has_object_path(path)))
        .map(|s| s.object_path.clone())
        .collect();

    if !stale.is_empty() {
        for path in &stale {
            debug!(path = %path, "Service gone");
        }
        working.retain(|s| !stale.contains(&s.object_path));
    }

    working
}
