//! TMP102 Temperatursensor

use embedded_hal::i2c::I2c;

use crate::traits::{SensorError, TemperatureSensor};

/// I2C-Adresse mit ADD0 auf GND
pub const TMP102_ADDR: u8 = 0x48;

const REG_TEMPERATURE: u8 = 0x00;

pub struct Tmp102<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Tmp102<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, TMP102_ADDR)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> TemperatureSensor for Tmp102<I2C> {
    fn read_centi(&mut self) -> Result<i16, SensorError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[REG_TEMPERATURE], &mut buf)
            .map_err(|_| SensorError::Bus)?;

        Ok(register_to_centi(buf))
    }
}

/// Wandelt den Temperatur-Registerinhalt in Hundertstel Grad
///
/// Bit 0 des LSB gesetzt = Extended Mode (13 Bit), sonst 12 Bit.
/// Auflösung in beiden Fällen 0.0625 C.
pub fn register_to_centi(reg: [u8; 2]) -> i16 {
    let word = i16::from_be_bytes(reg);
    let counts = if reg[1] & 0x01 != 0 {
        word >> 3
    } else {
        word >> 4
    };
    (counts as i32 * 625 / 100) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_to_centi_positive() {
        // 0x1900 -> 25.0 C (12 Bit)
        assert_eq!(register_to_centi([0x19, 0x00]), 2500);
    }

    #[test]
    fn test_register_to_centi_negative() {
        // 0xE700 -> -25.0 C
        assert_eq!(register_to_centi([0xE7, 0x00]), -2500);
    }

    #[test]
    fn test_register_to_centi_fraction() {
        // 0x0010 -> 1 Count = 0.0625 C
        assert_eq!(register_to_centi([0x00, 0x10]), 6);
    }

    #[test]
    fn test_register_to_centi_extended_mode() {
        // 13 Bit: 0x4B01 -> 0x960 Counts = 150.0 C
        assert_eq!(register_to_centi([0x4B, 0x01]), 15000);
    }
}
