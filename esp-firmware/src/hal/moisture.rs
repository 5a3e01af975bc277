// Bodenfeuchte über ADC1
//
// Der Sensor liefert eine analoge Spannung, gemittelt über mehrere
// Oneshot-Messungen gegen Rauschen.

use esp_core::{MoistureSensor, SensorError};
use esp_hal::Blocking;
use esp_hal::analog::adc::{Adc, AdcPin};
use esp_hal::peripherals::{ADC1, GPIO4};

use crate::config::{ADC_READ_ATTEMPTS, MOISTURE_SAMPLES};

pub type SoilAdc<'d> = Adc<'d, ADC1<'d>, Blocking>;
pub type SoilAdcPin<'d> = AdcPin<GPIO4<'d>, ADC1<'d>>;

/// Real Hardware Moisture Sensor
///
/// Nutzt ADC1 Oneshot-Messungen auf GPIO4.
pub struct AdcMoistureSensor<'d> {
    adc: SoilAdc<'d>,
    pin: SoilAdcPin<'d>,
}

impl<'d> AdcMoistureSensor<'d> {
    pub fn new(adc: SoilAdc<'d>, pin: SoilAdcPin<'d>) -> Self {
        Self { adc, pin }
    }

    /// Eine einzelne ADC-Wandlung
    ///
    /// `read_oneshot` meldet WouldBlock solange die Wandlung läuft,
    /// daher Polling mit Obergrenze statt Endlosschleife.
    fn read_once(&mut self) -> Result<u16, SensorError> {
        for _ in 0..ADC_READ_ATTEMPTS {
            if let Ok(raw) = self.adc.read_oneshot(&mut self.pin) {
                return Ok(raw);
            }
        }
        Err(SensorError::NotReady)
    }
}

impl<'d> MoistureSensor for AdcMoistureSensor<'d> {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        let mut sum: u32 = 0;
        for _ in 0..MOISTURE_SAMPLES {
            sum += self.read_once()? as u32;
        }
        Ok((sum / MOISTURE_SAMPLES as u32) as u16)
    }
}
