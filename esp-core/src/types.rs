//! Core Types für den Bodensensor
//!
//! Datenstrukturen ohne Hardware-Dependencies

/// Eine Messung aller Sensoren eines Wake-Zyklus
///
/// Temperaturen in Hundertstel Grad Celsius (wie im RTC-Speicher abgelegt).
/// `None` bedeutet: Sensor hat in diesem Zyklus nicht geantwortet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorReading {
    pub si7021_centi: Option<i16>,
    pub tmp102_centi: Option<i16>,
    pub soil_raw: Option<u16>,
}

impl SensorReading {
    /// Leere Messung (alle Sensoren ausgefallen)
    pub const EMPTY: Self = Self {
        si7021_centi: None,
        tmp102_centi: None,
        soil_raw: None,
    };

    /// true wenn mindestens ein Sensor einen Wert geliefert hat
    pub fn has_any(&self) -> bool {
        self.si7021_centi.is_some() || self.tmp102_centi.is_some() || self.soil_raw.is_some()
    }
}

/// Konvertiert Hundertstel Grad in Grad Celsius
pub fn centi_to_celsius(centi: i16) -> f32 {
    centi as f32 / 100.0
}

/// Bodenfeuchte in Prozent aus dem rohen ADC-Wert
///
/// `dry` ist der Messwert an der Luft, `wet` im Wasser. Kapazitive Sensoren
/// liefern trocken den höheren Wert, resistive den niedrigeren - beides geht.
/// Ergebnis wird auf 0..=100 begrenzt.
///
/// # Beispiele
///
/// ```
/// # use esp_core::moisture_percent;
/// assert_eq!(moisture_percent(2000, 3000, 1000), 50);
/// assert_eq!(moisture_percent(3500, 3000, 1000), 0);
/// ```
pub fn moisture_percent(raw: u16, dry: u16, wet: u16) -> u8 {
    if dry == wet {
        return 0;
    }

    let (raw, dry, wet) = (raw as i32, dry as i32, wet as i32);
    let percent = (raw - dry) * 100 / (wet - dry);
    percent.clamp(0, 100) as u8
}

/// Größe des ESP-NOW Datensatzes in Bytes
pub const PAYLOAD_LEN: usize = 12;

/// Moisture-Wert im Payload wenn der ADC nichts geliefert hat
pub const SOIL_MISSING: i32 = -1;

/// Datensatz für den Empfänger
///
/// Layout entspricht dem C-Struct des Empfängers:
/// `{ float temp_si7021; float temp_tmp102; int soil_moisture; }`, little-endian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingPayload {
    pub temp_si7021: f32,
    pub temp_tmp102: f32,
    pub soil_moisture: i32,
}

/// Fehler beim Dekodieren eines Payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadError {
    InvalidLength(usize),
}

impl ReadingPayload {
    /// Erstellt den Payload aus einer Messung
    ///
    /// Fehlende Temperaturen werden zu NaN, fehlende Feuchte zu `SOIL_MISSING`.
    pub fn from_reading(reading: &SensorReading) -> Self {
        Self {
            temp_si7021: reading.si7021_centi.map_or(f32::NAN, centi_to_celsius),
            temp_tmp102: reading.tmp102_centi.map_or(f32::NAN, centi_to_celsius),
            soil_moisture: reading.soil_raw.map_or(SOIL_MISSING, i32::from),
        }
    }

    pub fn encode(&self) -> [u8; PAYLOAD_LEN] {
        let mut buf = [0u8; PAYLOAD_LEN];
        buf[0..4].copy_from_slice(&self.temp_si7021.to_le_bytes());
        buf[4..8].copy_from_slice(&self.temp_tmp102.to_le_bytes());
        buf[8..12].copy_from_slice(&self.soil_moisture.to_le_bytes());
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        let bytes: &[u8; PAYLOAD_LEN] = bytes
            .try_into()
            .map_err(|_| PayloadError::InvalidLength(bytes.len()))?;

        let word = |i: usize| [bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]];
        Ok(Self {
            temp_si7021: f32::from_le_bytes(word(0)),
            temp_tmp102: f32::from_le_bytes(word(4)),
            soil_moisture: i32::from_le_bytes(word(8)),
        })
    }
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for SensorReading {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "SensorReading {{ si7021: {}, tmp102: {}, soil: {} }}",
            self.si7021_centi,
            self.tmp102_centi,
            self.soil_raw
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ReadingPayload {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "ReadingPayload {{ si7021: {} C, tmp102: {} C, soil: {} }}",
            self.temp_si7021,
            self.temp_tmp102,
            self.soil_moisture
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PayloadError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            PayloadError::InvalidLength(len) => defmt::write!(fmt, "Invalid length {}", len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_layout_matches_c_struct() {
        let payload = ReadingPayload {
            temp_si7021: 21.5,
            temp_tmp102: -3.25,
            soil_moisture: 1834,
        };
        let bytes = payload.encode();

        assert_eq!(&bytes[0..4], &21.5f32.to_le_bytes());
        assert_eq!(&bytes[4..8], &(-3.25f32).to_le_bytes());
        assert_eq!(&bytes[8..12], &1834i32.to_le_bytes());
    }

    #[test]
    fn test_payload_from_partial_reading() {
        let reading = SensorReading {
            si7021_centi: Some(2150),
            tmp102_centi: None,
            soil_raw: None,
        };
        let payload = ReadingPayload::from_reading(&reading);

        assert_eq!(payload.temp_si7021, 21.5);
        assert!(payload.temp_tmp102.is_nan());
        assert_eq!(payload.soil_moisture, SOIL_MISSING);
    }

    #[test]
    fn test_payload_decode_rejects_short_buffer() {
        assert_eq!(
            ReadingPayload::decode(&[0u8; 8]),
            Err(PayloadError::InvalidLength(8))
        );
    }

    #[test]
    fn test_moisture_percent_inverted_calibration() {
        // Resistiver Sensor: trocken = niedrig
        assert_eq!(moisture_percent(1000, 1000, 3000), 0);
        assert_eq!(moisture_percent(3000, 1000, 3000), 100);
        assert_eq!(moisture_percent(1500, 1000, 3000), 25);
    }

    #[test]
    fn test_moisture_percent_degenerate_calibration() {
        assert_eq!(moisture_percent(1234, 2000, 2000), 0);
    }

    #[test]
    fn test_reading_has_any() {
        assert!(!SensorReading::EMPTY.has_any());
        let reading = SensorReading {
            soil_raw: Some(10),
            ..SensorReading::EMPTY
        };
        assert!(reading.has_any());
    }
}
