//! Integration Tests für die I2C Sensor-Treiber
//!
//! Diese Tests laufen auf dem Host (x86_64) und nutzen einen Mock-I2C-Bus

use embedded_hal::i2c::{self, ErrorKind, ErrorType, I2c, Operation};
use esp_core::sensors::{si7021, tmp102};
use esp_core::{SensorError, Si7021, TemperatureSensor, Tmp102};

// ============================================================================
// Mock I2C Bus
// ============================================================================

#[derive(Debug)]
pub struct MockBusError;

impl i2c::Error for MockBusError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::NoAcknowledge(i2c::NoAcknowledgeSource::Address)
    }
}

/// Antwortet auf jeden Read mit `response`, merkt sich die Writes
#[derive(Default)]
pub struct MockBus {
    pub response: Vec<u8>,
    pub last_address: Option<u8>,
    pub last_write: Vec<u8>,
    pub nack: bool,
}

impl MockBus {
    pub fn responding(response: &[u8]) -> Self {
        Self {
            response: response.to_vec(),
            ..Self::default()
        }
    }
}

impl ErrorType for MockBus {
    type Error = MockBusError;
}

impl I2c for MockBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.nack {
            return Err(MockBusError);
        }
        self.last_address = Some(address);

        for op in operations {
            match op {
                Operation::Write(bytes) => self.last_write = bytes.to_vec(),
                Operation::Read(buf) => {
                    let n = buf.len().min(self.response.len());
                    buf[..n].copy_from_slice(&self.response[..n]);
                }
            }
        }
        Ok(())
    }
}

fn si7021_frame(code: u16) -> Vec<u8> {
    let bytes = code.to_be_bytes();
    vec![bytes[0], bytes[1], si7021::crc8(&bytes)]
}

// ============================================================================
// Tests: Si7021
// ============================================================================

#[test]
fn test_si7021_reads_temperature() {
    let mut sensor = Si7021::new(MockBus::responding(&si7021_frame(0x6A10)));

    assert_eq!(sensor.read_centi(), Ok(2595));

    let bus = sensor.release();
    assert_eq!(bus.last_address, Some(si7021::SI7021_ADDR));
    assert_eq!(bus.last_write, vec![0xE3]);
}

#[test]
fn test_si7021_rejects_bad_crc() {
    let mut frame = si7021_frame(0x6A10);
    frame[2] ^= 0xFF;
    let mut sensor = Si7021::new(MockBus::responding(&frame));

    assert_eq!(sensor.read_centi(), Err(SensorError::Checksum));
}

#[test]
fn test_si7021_bus_error() {
    let mut bus = MockBus::responding(&si7021_frame(0x6A10));
    bus.nack = true;
    let mut sensor = Si7021::new(bus);

    assert_eq!(sensor.read_centi(), Err(SensorError::Bus));
}

// ============================================================================
// Tests: Tmp102
// ============================================================================

#[test]
fn test_tmp102_reads_temperature_register() {
    let mut sensor = Tmp102::new(MockBus::responding(&[0x19, 0x00]));

    assert_eq!(sensor.read_centi(), Ok(2500));

    let bus = sensor.release();
    assert_eq!(bus.last_address, Some(tmp102::TMP102_ADDR));
    assert_eq!(bus.last_write, vec![0x00]);
}

#[test]
fn test_tmp102_custom_address() {
    let mut sensor = Tmp102::with_address(MockBus::responding(&[0xFF, 0xF0]), 0x49);

    // 0xFFF0 -> -1 Count = -0.0625 C
    assert_eq!(sensor.read_centi(), Ok(-6));
    assert_eq!(sensor.release().last_address, Some(0x49));
}

#[test]
fn test_tmp102_bus_error() {
    let mut bus = MockBus::default();
    bus.nack = true;
    let mut sensor = Tmp102::new(bus);

    assert_eq!(sensor.read_centi(), Err(SensorError::Bus));
}
