// ESP-NOW Link zum Empfänger
//
// Sendet den Datensatz an genau einen festen Peer und wartet blockierend
// auf den Zustellstatus (ersetzt den Send-Callback).

use defmt::{Debug2Format, info, warn};
use esp_core::{LinkError, PeerLink};
use esp_radio::esp_now::{EspNow, EspNowWifiInterface, PeerInfo};

/// Fehler beim Einrichten von ESP-NOW
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EspNowSetupError {
    SetChannel,
    AddPeer,
}

impl defmt::Format for EspNowSetupError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            EspNowSetupError::SetChannel => defmt::write!(fmt, "Setting channel failed"),
            EspNowSetupError::AddPeer => defmt::write!(fmt, "Adding peer failed"),
        }
    }
}

/// Real Hardware Peer Link
///
/// Voraussetzung: WiFi-Controller ist im Station-Modus gestartet
/// (ohne Verbindung zu einem Access Point).
pub struct EspNowLink<'d> {
    esp_now: EspNow<'d>,
    peer: [u8; 6],
}

impl<'d> EspNowLink<'d> {
    /// Registriert den Peer (unverschlüsselt)
    ///
    /// # Parameter
    /// - `esp_now`: ESP-NOW Interface aus `esp_radio::wifi::new`
    /// - `peer`: MAC-Adresse des Empfängers
    /// - `channel`: 0 = aktueller Kanal, sonst fester Kanal 1..=14
    pub fn new(
        mut esp_now: EspNow<'d>,
        peer: [u8; 6],
        channel: u8,
    ) -> Result<Self, EspNowSetupError> {
        if channel != 0 {
            esp_now.set_channel(channel).map_err(|e| {
                warn!("ESP-NOW: set_channel({}) failed: {}", channel, Debug2Format(&e));
                EspNowSetupError::SetChannel
            })?;
        }

        if !esp_now.peer_exists(&peer) {
            esp_now
                .add_peer(PeerInfo {
                    interface: EspNowWifiInterface::Sta,
                    peer_address: peer,
                    lmk: None,
                    channel: None,
                    encrypt: false,
                })
                .map_err(|e| {
                    warn!("ESP-NOW: add_peer failed: {}", Debug2Format(&e));
                    EspNowSetupError::AddPeer
                })?;
        }

        info!("ESP-NOW: Initialized, peer {:02X}", peer);
        Ok(Self { esp_now, peer })
    }
}

impl<'d> PeerLink for EspNowLink<'d> {
    fn send(&mut self, payload: &[u8]) -> Result<(), LinkError> {
        let waiter = self.esp_now.send(&self.peer, payload).map_err(|e| {
            warn!("ESP-NOW: Send failed: {}", Debug2Format(&e));
            LinkError::SendFailed
        })?;

        // Zustellstatus (ACK vom Peer auf MAC-Ebene)
        match waiter.wait() {
            Ok(()) => {
                info!("ESP-NOW: Data sent: success ({} bytes)", payload.len());
                Ok(())
            }
            Err(e) => {
                warn!("ESP-NOW: Data sent: failed ({})", Debug2Format(&e));
                Err(LinkError::SendFailed)
            }
        }
    }
}
