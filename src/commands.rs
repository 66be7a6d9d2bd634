use std::process::ExitCode;

use color_eyre::eyre::{Result, WrapErr};
use serde::Serialize;
use tracing::warn;

use connman_lite::config::{Command, TetherCommand};
use connman_lite::{
    ConnectionType, ConnmanDaemon, ConnmanError, ConnmanManager, ServiceSnapshot, TechnologyEntry,
};

/// Execute one subcommand against a connected manager
pub async fn run<D: ConnmanDaemon>(
    manager: &mut ConnmanManager<D>,
    command: Command,
    json: bool,
) -> Result<ExitCode> {
    match command {
        Command::Status => {
            let status = manager.status().await?;
            if json {
                print_json(&status)?;
            } else {
                println!("State: {}", online_label(status.online));
                println!();
                println!("Technologies:");
                for tech in &status.technologies {
                    println!("  {}", technology_line(tech));
                }
                println!();
                println!("Services:");
                for service in &status.services {
                    println!("  {}", service_line(service));
                }
            }
        }
        Command::Services => {
            let services = manager.refresh_services().await?;
            if json {
                print_json(services)?;
            } else {
                for service in services {
                    println!("{}", service_line(service));
                }
            }
        }
        Command::Technologies => {
            let technologies = manager.refresh_technologies().await?;
            if json {
                print_json(&technologies)?;
            } else {
                for tech in technologies {
                    println!("{}", technology_line(tech));
                }
            }
        }
        Command::Online => {
            let online = manager.is_online().await?;
            println!("{}", online_label(online));
            if !online {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Connect {
            service,
            passphrase,
        } => {
            let services = manager.refresh_services().await?;
            let target = services
                .find_by_path(&service)
                .or_else(|| services.find_by_name(&service))
                .cloned()
                .ok_or_else(|| ConnmanError::NotFound(format!("service '{service}'")))?;

            if target.passphrase_required && passphrase.is_none() {
                warn!("'{}' reports a passphrase is required", target.name);
            }

            let pending = manager.connect_service(&target, passphrase.as_deref())?;
            let path = pending
                .await
                .wrap_err_with(|| format!("Failed to connect to '{}'", target.name))?;
            println!("Connected: {path}");
        }
        Command::Tether(tether) => {
            manager.refresh_technologies().await?;
            match tether {
                TetherCommand::Enable {
                    identifier,
                    passphrase,
                } => {
                    manager
                        .enable_tethering(&identifier, &passphrase)
                        .await
                        .wrap_err("Failed to enable tethering")?;
                    println!("Tethering enabled as '{identifier}'");
                }
                TetherCommand::Disable => {
                    manager
                        .disable_tethering()
                        .await
                        .wrap_err("Failed to disable tethering")?;
                    println!("Tethering disabled");
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn online_label(online: bool) -> &'static str {
    if online {
        "online"
    } else {
        "offline"
    }
}

// ── Line formatting ───────────────────────────────────────────────────

fn service_line(service: &ServiceSnapshot) -> String {
    let name = if service.name.is_empty() {
        "<hidden>"
    } else {
        service.name.as_str()
    };

    let mut flags = Vec::new();
    if service.favorite {
        flags.push("favorite");
    }
    if service.auto_connect {
        flags.push("autoconnect");
    }
    if service.passphrase_required {
        flags.push("passphrase");
    }
    if service.login_required {
        flags.push("login");
    }
    if service.immutable {
        flags.push("immutable");
    }

    let strength = match service.connection_type {
        ConnectionType::Wifi => format!(" {:>3}", service.signal_strength),
        _ => String::new(),
    };

    let mut line = format!(
        "{:<24} {:<8}{}  {}",
        name, service.connection_type, strength, service.object_path
    );
    if !flags.is_empty() {
        line.push_str(&format!("  [{}]", flags.join(", ")));
    }
    line
}

fn technology_line(tech: &TechnologyEntry) -> String {
    let mut state = vec![if tech.powered { "powered" } else { "off" }];
    if tech.connected {
        state.push("connected");
    }
    if tech.tethering {
        state.push("tethering");
    }
    format!(
        "{:<10} {:<20} {}",
        tech.technology_name,
        state.join(","),
        tech.object_path
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wifi_line_shows_strength_and_flags() {
        let service = ServiceSnapshot {
            object_path: "/net/connman/service/wifi_cafe".into(),
            name: "cafe".into(),
            connection_type: ConnectionType::Wifi,
            signal_strength: 72,
            favorite: true,
            passphrase_required: true,
            ..Default::default()
        };
        let line = service_line(&service);
        assert!(line.starts_with("cafe "));
        assert!(line.contains("wifi"));
        assert!(line.contains(" 72"));
        assert!(line.ends_with("[favorite, passphrase]"));
    }

    #[test]
    fn unnamed_ethernet_line() {
        let service = ServiceSnapshot {
            object_path: "/net/connman/service/ethernet_0".into(),
            connection_type: ConnectionType::Ethernet,
            ..Default::default()
        };
        let line = service_line(&service);
        assert!(line.starts_with("<hidden>"));
        assert!(line.ends_with("/net/connman/service/ethernet_0"));
    }

    #[test]
    fn technology_line_lists_state() {
        let tech = TechnologyEntry {
            object_path: "/net/connman/technology/wifi".into(),
            technology_name: "wifi".into(),
            powered: true,
            tethering: true,
            ..Default::default()
        };
        assert!(technology_line(&tech).contains("powered,tethering"));
        assert_eq!(online_label(false), "offline");
    }
}
