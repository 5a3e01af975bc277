//! Hardware Abstraction Traits
//!
//! Diese Traits definieren Schnittstellen für Sensoren und Funk
//! ohne konkrete Implementierung.

/// Fehler-Typ für Sensor-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// I2C/ADC Transfer fehlgeschlagen
    Bus,
    /// CRC der Antwort stimmt nicht
    Checksum,
    /// Sensor liefert (noch) keinen Wert
    NotReady,
}

/// Fehler-Typ für den Versand an den Empfänger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// Funk-Schnittstelle nicht initialisiert
    NotReady,
    /// Senden fehlgeschlagen (kein ACK vom Peer)
    SendFailed,
}

/// Trait für Temperatursensoren (SI7021, TMP102)
///
/// # Implementierungen
/// - **Production:** `Si7021`, `Tmp102` über embedded-hal I2C
/// - **Testing:** Mock-Sensoren mit festen Werten
pub trait TemperatureSensor {
    /// Liest die Temperatur in Hundertstel Grad Celsius
    fn read_centi(&mut self) -> Result<i16, SensorError>;
}

/// Trait für den Bodenfeuchte-Sensor
pub trait MoistureSensor {
    /// Liest den rohen ADC-Wert
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}

/// Trait für den Funk-Link zum Empfänger
///
/// # Implementierungen
/// - **Production:** EspNowLink (ESP-NOW, blockierend bis Zustellstatus)
/// - **Testing:** MockLink (in-memory)
pub trait PeerLink {
    /// Sendet einen Datensatz an den festen Peer
    ///
    /// # Fehlerbehandlung
    /// Gibt `LinkError::SendFailed` zurück wenn der Peer nicht bestätigt
    fn send(&mut self, payload: &[u8]) -> Result<(), LinkError>;
}

impl<T: TemperatureSensor + ?Sized> TemperatureSensor for &mut T {
    fn read_centi(&mut self) -> Result<i16, SensorError> {
        (**self).read_centi()
    }
}

impl<T: MoistureSensor + ?Sized> MoistureSensor for &mut T {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        (**self).read_raw()
    }
}

impl<T: PeerLink + ?Sized> PeerLink for &mut T {
    fn send(&mut self, payload: &[u8]) -> Result<(), LinkError> {
        (**self).send(payload)
    }
}

/// Kein Link vorhanden (Funk nicht hochgefahren) = `LinkError::NotReady`
impl<T: PeerLink> PeerLink for Option<T> {
    fn send(&mut self, payload: &[u8]) -> Result<(), LinkError> {
        match self {
            Some(link) => link.send(payload),
            None => Err(LinkError::NotReady),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            SensorError::Bus => defmt::write!(fmt, "Bus error"),
            SensorError::Checksum => defmt::write!(fmt, "Checksum mismatch"),
            SensorError::NotReady => defmt::write!(fmt, "Not ready"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LinkError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            LinkError::NotReady => defmt::write!(fmt, "Link not ready"),
            LinkError::SendFailed => defmt::write!(fmt, "Send failed"),
        }
    }
}
