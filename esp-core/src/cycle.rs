//! Ein Wake-Zyklus: messen, ggf. senden, Schlafdauer bestimmen
//!
//! Testbare Business Logic ohne Hardware-Abhängigkeit. Die Firmware
//! übergibt echte Sensoren und den ESP-NOW Link, Tests übergeben Mocks.

use crate::retained::RetainedState;
use crate::schedule::{Schedule, report_slot, retry_sleep_secs, sleep_duration_secs};
use crate::traits::{LinkError, MoistureSensor, PeerLink, SensorError, TemperatureSensor};
use crate::types::{ReadingPayload, SensorReading};

/// Alle Sensoren des Knotens
pub struct Sensors<A, B, M> {
    pub si7021: A,
    pub tmp102: B,
    pub moisture: M,
}

/// Rohergebnis einer Messung inklusive Fehler pro Sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub si7021: Result<i16, SensorError>,
    pub tmp102: Result<i16, SensorError>,
    pub soil: Result<u16, SensorError>,
}

impl Sample {
    pub fn reading(&self) -> SensorReading {
        SensorReading {
            si7021_centi: self.si7021.ok(),
            tmp102_centi: self.tmp102.ok(),
            soil_raw: self.soil.ok(),
        }
    }
}

/// Was mit dem Report in diesem Zyklus passiert ist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    /// Uhr nicht gestellt, Sende-Zeitpunkt unbekannt
    NoClock,
    /// Kein Sende-Zeitpunkt
    NotDue,
    /// Slot wurde bereits in einem früheren Wake bedient
    AlreadySent(u32),
    /// Sende-Zeitpunkt erreicht, noch nicht gesendet
    Due(u32),
    Sent(u32),
    Failed(u32, LinkError),
}

/// Ergebnis eines Wake-Zyklus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutcome {
    pub sample: Sample,
    pub report: ReportStatus,
    pub sleep_secs: u64,
}

/// Liest alle Sensoren einmal aus
///
/// Ein ausgefallener Sensor verhindert die anderen Messungen nicht.
pub fn sample<A, B, M>(sensors: &mut Sensors<A, B, M>) -> Sample
where
    A: TemperatureSensor,
    B: TemperatureSensor,
    M: MoistureSensor,
{
    Sample {
        si7021: sensors.si7021.read_centi(),
        tmp102: sensors.tmp102.read_centi(),
        soil: sensors.moisture.read_raw(),
    }
}

/// Prüft ob in diesem Wake gesendet werden soll
///
/// Die Firmware nutzt das um das Funkmodul nur bei Bedarf hochzufahren.
pub fn report_due(state: &RetainedState, now: Option<u64>, schedule: &Schedule) -> ReportStatus {
    let Some(now) = now else {
        return ReportStatus::NoClock;
    };

    match report_slot(now, schedule) {
        None => ReportStatus::NotDue,
        Some(slot) if slot == state.last_report_slot => ReportStatus::AlreadySent(slot),
        Some(slot) => ReportStatus::Due(slot),
    }
}

/// Führt einen kompletten Wake-Zyklus aus
///
/// 1. Wake zählen
/// 2. Alle Sensoren messen, Ergebnis im RTC-Log ablegen
/// 3. Zum Sende-Zeitpunkt die neueste Messung an den Peer senden
/// 4. Schlafdauer bis zum nächsten Wake berechnen
///
/// Der Slot wird nur nach erfolgreichem Senden gemerkt. Nach einem
/// Fehlschlag folgt ein kurzer Wake, solange der noch in die Toleranz
/// des Slots fällt.
pub fn run_cycle<A, B, M, L>(
    state: &mut RetainedState,
    now: Option<u64>,
    sensors: &mut Sensors<A, B, M>,
    link: &mut L,
    schedule: &Schedule,
) -> CycleOutcome
where
    A: TemperatureSensor,
    B: TemperatureSensor,
    M: MoistureSensor,
    L: PeerLink,
{
    state.boot_count = state.boot_count.wrapping_add(1);

    let sample = sample(sensors);
    state.samples.push(sample.reading());

    let report = match report_due(state, now, schedule) {
        ReportStatus::Due(slot) => {
            let latest = state.samples.latest().unwrap_or(SensorReading::EMPTY);
            let payload = ReadingPayload::from_reading(&latest).encode();
            match link.send(&payload) {
                Ok(()) => {
                    state.last_report_slot = slot;
                    ReportStatus::Sent(slot)
                }
                Err(e) => ReportStatus::Failed(slot, e),
            }
        }
        other => other,
    };

    let sleep_secs = match (report, now) {
        (ReportStatus::Failed(slot, _), Some(now)) => retry_sleep_secs(now, slot, schedule),
        _ => None,
    }
    .unwrap_or_else(|| sleep_duration_secs(now, schedule));

    CycleOutcome {
        sample,
        report,
        sleep_secs,
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ReportStatus {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ReportStatus::NoClock => defmt::write!(fmt, "NoClock"),
            ReportStatus::NotDue => defmt::write!(fmt, "NotDue"),
            ReportStatus::AlreadySent(slot) => defmt::write!(fmt, "AlreadySent({})", slot),
            ReportStatus::Due(slot) => defmt::write!(fmt, "Due({})", slot),
            ReportStatus::Sent(slot) => defmt::write!(fmt, "Sent({})", slot),
            ReportStatus::Failed(slot, e) => defmt::write!(fmt, "Failed({}, {})", slot, e),
        }
    }
}
