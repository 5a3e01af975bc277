//! Hilfsfunktionen für Build-Zeit-Konfiguration
//!
//! Die Firmware bekommt Werte als Strings aus `env!`/`option_env!`,
//! geparst wird hier (testbar auf dem Host).

use heapless::Vec;

/// Maximale Anzahl NTP-Server in `NTP_SERVERS`
pub const MAX_NTP_SERVERS: usize = 4;

/// Fehler in der Build-Zeit-Konfiguration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    InvalidMac,
    InvalidChannel,
}

/// Parst eine MAC-Adresse wie `24:6F:28:A1:BC:D2` (auch mit `-`)
///
/// # Beispiele
///
/// ```
/// # use esp_core::config::parse_mac;
/// assert_eq!(parse_mac("24:6F:28:A1:BC:D2"), Ok([0x24, 0x6F, 0x28, 0xA1, 0xBC, 0xD2]));
/// ```
pub fn parse_mac(text: &str) -> Result<[u8; 6], ConfigError> {
    let mut mac = [0u8; 6];
    let mut parts = text.trim().split([':', '-']);

    for byte in mac.iter_mut() {
        let part = parts.next().ok_or(ConfigError::InvalidMac)?;
        if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidMac);
        }
        *byte = u8::from_str_radix(part, 16).map_err(|_| ConfigError::InvalidMac)?;
    }

    if parts.next().is_some() {
        return Err(ConfigError::InvalidMac);
    }
    Ok(mac)
}

/// Parst den ESP-NOW Kanal (0 = aktueller Kanal der Station, sonst 1..=14)
pub fn parse_channel(text: &str) -> Result<u8, ConfigError> {
    match text.trim().parse::<u8>() {
        Ok(channel) if channel <= 14 => Ok(channel),
        _ => Err(ConfigError::InvalidChannel),
    }
}

/// Zerlegt eine komma-separierte Server-Liste
///
/// Leere Einträge werden übersprungen, mehr als `MAX_NTP_SERVERS` ignoriert.
pub fn split_servers(list: &str) -> Vec<&str, MAX_NTP_SERVERS> {
    let mut servers = Vec::new();
    for server in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if servers.push(server).is_err() {
            break;
        }
    }
    servers
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ConfigError::InvalidMac => defmt::write!(fmt, "Invalid MAC address"),
            ConfigError::InvalidChannel => defmt::write!(fmt, "Invalid channel"),
        }
    }
}
