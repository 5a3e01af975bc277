// Library-Root: Hardware-Glue für den Bodensensor
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Module
pub mod config;
pub mod hal;
pub mod tasks;

use defmt::{info, warn};
use esp_core::schedule::time_of_day;
use esp_core::{CycleOutcome, ReportStatus, centi_to_celsius, moisture_percent};

// Re-exports von esp-core
pub use esp_core::{RetainedState, Schedule, run_cycle};

use crate::config::{MOISTURE_DRY, MOISTURE_WET};

/// Loggt die aktuelle Uhrzeit oder dass sie unbekannt ist
pub fn log_clock(now: Option<u64>) {
    match now {
        Some(now) => {
            let (hour, minute, second) = time_of_day(now);
            info!("Clock: {:02}:{:02}:{:02} UTC", hour, minute, second);
        }
        None => warn!("Clock: not synchronized"),
    }
}

/// Loggt Messwerte und Report-Status eines Zyklus
pub fn log_outcome(outcome: &CycleOutcome) {
    let sample = &outcome.sample;
    if !sample.reading().has_any() {
        warn!("Sensors: all reads failed, logging empty sample");
    }

    match sample.si7021 {
        Ok(centi) => info!("SI7021 Temperature: {=f32} C", centi_to_celsius(centi)),
        Err(e) => warn!("SI7021: Read failed: {}", e),
    }
    match sample.tmp102 {
        Ok(centi) => info!("TMP102 Temperature: {=f32} C", centi_to_celsius(centi)),
        Err(e) => warn!("TMP102: Read failed: {}", e),
    }
    match sample.soil {
        Ok(raw) => info!(
            "Soil Moisture: {} ({}%)",
            raw,
            moisture_percent(raw, MOISTURE_DRY, MOISTURE_WET)
        ),
        Err(e) => warn!("Soil Moisture: Read failed: {}", e),
    }

    match outcome.report {
        ReportStatus::Sent(slot) => info!("Report: sent for slot {}", slot),
        ReportStatus::Failed(slot, e) => warn!(
            "Report: slot {} failed: {}, retry in {} s",
            slot, e, outcome.sleep_secs
        ),
        ReportStatus::AlreadySent(slot) => info!("Report: slot {} already sent", slot),
        ReportStatus::Due(slot) => warn!("Report: slot {} due but not attempted", slot),
        ReportStatus::NotDue => info!("Report: not due"),
        ReportStatus::NoClock => warn!("Report: skipped, clock unknown"),
    }
}
