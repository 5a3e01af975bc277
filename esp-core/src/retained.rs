//! Zustand der den Deep Sleep überlebt
//!
//! Die Firmware legt `RetainedState` in den persistenten RTC-Fast-RAM.
//! Nach einem Kaltstart steht dort beliebiger Inhalt, deshalb bestehen alle
//! Felder aus Integern (jedes Bitmuster ist gültig) und werden mit
//! `validate_or_reset()` geprüft.

use crate::types::SensorReading;

/// Kennung für gültigen Inhalt ("SOIL")
pub const RETAINED_MAGIC: u32 = 0x534F_494C;

/// Anzahl der Messungen die über Sleep-Zyklen aufgehoben werden
pub const SAMPLE_LOG_CAPACITY: usize = 8;

const MISSING_TEMP: i16 = i16::MIN;
const MISSING_SOIL: u16 = u16::MAX;

/// Messung in RTC-tauglicher Form (Sentinel statt Option)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredSample {
    si7021_centi: i16,
    tmp102_centi: i16,
    soil_raw: u16,
}

impl StoredSample {
    const EMPTY: Self = Self {
        si7021_centi: MISSING_TEMP,
        tmp102_centi: MISSING_TEMP,
        soil_raw: MISSING_SOIL,
    };
}

impl From<SensorReading> for StoredSample {
    fn from(reading: SensorReading) -> Self {
        Self {
            si7021_centi: reading.si7021_centi.unwrap_or(MISSING_TEMP),
            tmp102_centi: reading.tmp102_centi.unwrap_or(MISSING_TEMP),
            soil_raw: reading.soil_raw.unwrap_or(MISSING_SOIL),
        }
    }
}

impl From<StoredSample> for SensorReading {
    fn from(sample: StoredSample) -> Self {
        Self {
            si7021_centi: (sample.si7021_centi != MISSING_TEMP).then_some(sample.si7021_centi),
            tmp102_centi: (sample.tmp102_centi != MISSING_TEMP).then_some(sample.tmp102_centi),
            soil_raw: (sample.soil_raw != MISSING_SOIL).then_some(sample.soil_raw),
        }
    }
}

/// Ringpuffer der letzten Messungen
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleLog {
    entries: [StoredSample; SAMPLE_LOG_CAPACITY],
    /// Index des nächsten Schreibplatzes
    head: u8,
    len: u8,
}

impl SampleLog {
    pub const fn new() -> Self {
        Self {
            entries: [StoredSample::EMPTY; SAMPLE_LOG_CAPACITY],
            head: 0,
            len: 0,
        }
    }

    /// Fügt eine Messung hinzu, überschreibt die älteste wenn voll
    pub fn push(&mut self, reading: SensorReading) {
        self.entries[self.head as usize] = reading.into();
        self.head = ((self.head as usize + 1) % SAMPLE_LOG_CAPACITY) as u8;
        if (self.len as usize) < SAMPLE_LOG_CAPACITY {
            self.len += 1;
        }
    }

    pub fn latest(&self) -> Option<SensorReading> {
        if self.len == 0 {
            return None;
        }
        let idx = (self.head as usize + SAMPLE_LOG_CAPACITY - 1) % SAMPLE_LOG_CAPACITY;
        Some(self.entries[idx].into())
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iteriert von der ältesten zur neuesten Messung
    pub fn iter(&self) -> impl Iterator<Item = SensorReading> + '_ {
        let start = (self.head as usize + SAMPLE_LOG_CAPACITY - self.len as usize)
            % SAMPLE_LOG_CAPACITY;
        (0..self.len as usize)
            .map(move |i| self.entries[(start + i) % SAMPLE_LOG_CAPACITY].into())
    }

    fn is_consistent(&self) -> bool {
        (self.head as usize) < SAMPLE_LOG_CAPACITY && (self.len as usize) <= SAMPLE_LOG_CAPACITY
    }
}

impl Default for SampleLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Alles was zwischen zwei Wake-Zyklen erhalten bleibt
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetainedState {
    magic: u32,
    /// Anzahl Wakes seit dem letzten Kaltstart
    pub boot_count: u32,
    /// Zeitpunkt der letzten erfolgreichen SNTP-Synchronisation (0 = nie)
    pub last_sync_unix: u64,
    /// Slot-ID des letzten erfolgreichen Reports (0 = nie)
    pub last_report_slot: u32,
    pub samples: SampleLog,
}

impl RetainedState {
    pub const fn new() -> Self {
        Self {
            magic: RETAINED_MAGIC,
            boot_count: 0,
            last_sync_unix: 0,
            last_report_slot: 0,
            samples: SampleLog::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == RETAINED_MAGIC && self.samples.is_consistent()
    }

    /// Setzt den Zustand zurück falls der RTC-RAM keinen gültigen Inhalt hat
    ///
    /// Gibt `true` zurück wenn der Inhalt gültig war (Wake aus Deep Sleep).
    pub fn validate_or_reset(&mut self) -> bool {
        if self.is_valid() {
            return true;
        }
        *self = Self::new();
        false
    }

    pub fn is_synced(&self) -> bool {
        self.last_sync_unix != 0
    }

    pub fn record_sync(&mut self, unix_secs: u64) {
        self.last_sync_unix = unix_secs;
    }

    /// Aktuelle Zeit aus dem RTC-Zähler, falls die Uhr je gestellt wurde
    ///
    /// Liegt der Zähler vor der letzten Synchronisation, ist die RTC
    /// zurückgesetzt worden und die Zeit ungültig.
    pub fn clock(&self, rtc_unix_secs: u64) -> Option<u64> {
        (self.is_synced() && rtc_unix_secs >= self.last_sync_unix).then_some(rtc_unix_secs)
    }
}

impl Default for RetainedState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    fn reading(soil: u16) -> SensorReading {
        SensorReading {
            si7021_centi: Some(2000),
            tmp102_centi: None,
            soil_raw: Some(soil),
        }
    }

    #[test]
    fn test_sample_log_keeps_latest() {
        let mut log = SampleLog::new();
        assert!(log.latest().is_none());

        log.push(reading(1));
        log.push(reading(2));
        assert_eq!(log.len(), 2);
        assert_eq!(log.latest(), Some(reading(2)));
    }

    #[test]
    fn test_sample_log_overwrites_oldest() {
        let mut log = SampleLog::new();
        for soil in 0..(SAMPLE_LOG_CAPACITY as u16 + 3) {
            log.push(reading(soil));
        }

        assert_eq!(log.len(), SAMPLE_LOG_CAPACITY);
        let first = log.iter().next().and_then(|r| r.soil_raw);
        assert_eq!(first, Some(3));
        assert_eq!(log.latest().and_then(|r| r.soil_raw), Some(10));
    }

    #[test]
    fn test_sample_log_full_ring_order() {
        let mut log = SampleLog::new();
        for soil in 0..(SAMPLE_LOG_CAPACITY as u16 * 2 + 3) {
            log.push(reading(soil));
        }

        let soils: Vec<u16, SAMPLE_LOG_CAPACITY> =
            log.iter().filter_map(|r| r.soil_raw).collect();
        assert_eq!(soils.as_slice(), &[11, 12, 13, 14, 15, 16, 17, 18]);
    }

    #[test]
    fn test_stored_sample_preserves_missing_values() {
        let original = SensorReading {
            si7021_centi: None,
            tmp102_centi: Some(-550),
            soil_raw: None,
        };
        let restored: SensorReading = StoredSample::from(original).into();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_validate_or_reset_garbage() {
        let mut state = RetainedState::new();
        state.boot_count = 42;
        state.magic = 0xDEAD_BEEF;

        assert!(!state.validate_or_reset());
        assert_eq!(state.boot_count, 0);
        assert!(state.is_valid());
    }

    #[test]
    fn test_validate_or_reset_bad_ring_index() {
        let mut state = RetainedState::new();
        state.samples.head = 200;
        assert!(!state.validate_or_reset());
        assert!(state.samples.is_empty());
    }

    #[test]
    fn test_validate_or_reset_bad_ring_len() {
        let mut state = RetainedState::new();
        state.samples.push(reading(1));
        state.samples.len = SAMPLE_LOG_CAPACITY as u8 + 1;
        assert!(!state.validate_or_reset());
        assert!(state.samples.is_empty());
        assert_eq!(state.samples.iter().count(), 0);
    }

    #[test]
    fn test_validate_keeps_valid_state() {
        let mut state = RetainedState::new();
        state.boot_count = 7;
        assert!(state.validate_or_reset());
        assert_eq!(state.boot_count, 7);
    }

    #[test]
    fn test_clock_requires_sync() {
        let mut state = RetainedState::new();
        assert_eq!(state.clock(1_700_000_000), None);

        state.record_sync(1_700_000_000);
        assert_eq!(state.clock(1_700_000_500), Some(1_700_000_500));
        assert_eq!(state.clock(1_000), None);
    }
}
