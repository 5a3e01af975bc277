//! SI7021 Temperatur-/Feuchtesensor (nur Temperatur wird genutzt)

use embedded_hal::i2c::I2c;

use crate::traits::{SensorError, TemperatureSensor};

/// Standard I2C-Adresse des SI7021
pub const SI7021_ADDR: u8 = 0x40;

/// "Measure Temperature, Hold Master Mode"
const CMD_MEASURE_TEMP_HOLD: u8 = 0xE3;

pub struct Si7021<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Si7021<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, SI7021_ADDR)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Gibt den Bus wieder frei
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Misst und liefert den rohen 16-Bit Temperatur-Code
    ///
    /// Hold-Master: der Sensor hält SCL bis die Wandlung fertig ist (~11 ms),
    /// daher reicht ein einzelnes write_read ohne Delay.
    pub fn measure_raw(&mut self) -> Result<u16, SensorError> {
        let mut buf = [0u8; 3];
        self.i2c
            .write_read(self.address, &[CMD_MEASURE_TEMP_HOLD], &mut buf)
            .map_err(|_| SensorError::Bus)?;

        if crc8(&buf[..2]) != buf[2] {
            return Err(SensorError::Checksum);
        }

        Ok(u16::from_be_bytes([buf[0], buf[1]]))
    }
}

impl<I2C: I2c> TemperatureSensor for Si7021<I2C> {
    fn read_centi(&mut self) -> Result<i16, SensorError> {
        self.measure_raw().map(raw_to_centi)
    }
}

/// Datenblatt: T = 175.72 * code / 65536 - 46.85
///
/// Die unteren zwei Bits sind Status-Bits und werden maskiert.
pub fn raw_to_centi(code: u16) -> i16 {
    let code = (code & 0xFFFC) as i32;
    ((17572 * code) >> 16) as i16 - 4685
}

/// CRC-8 laut Datenblatt: Polynom x^8 + x^5 + x^4 + 1 (0x31), Init 0x00
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_to_centi_room_temperature() {
        // 0x6A10 -> 25.95 C
        assert_eq!(raw_to_centi(0x6A10), 2595);
    }

    #[test]
    fn test_raw_to_centi_minimum() {
        assert_eq!(raw_to_centi(0x0000), -4685);
    }

    #[test]
    fn test_raw_to_centi_ignores_status_bits() {
        assert_eq!(raw_to_centi(0x6A13), raw_to_centi(0x6A10));
    }

    #[test]
    fn test_crc8_known_values() {
        assert_eq!(crc8(&[0x00]), 0x00);
        assert_eq!(crc8(&[0xDC]), 0x79);
    }
}
