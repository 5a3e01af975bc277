//! Zeitplan: wann gesendet wird und wie lange geschlafen wird
//!
//! Alle Zeiten in UTC-Sekunden seit Unix-Epoch. Reine Funktionen,
//! die Uhr selbst liefert die Firmware (RTC).

use crate::retained::RetainedState;

pub const SECS_PER_DAY: u64 = 86_400;

/// Konfiguration des Wake/Measure/Send/Sleep-Zyklus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Sende-Zeitpunkte als (Stunde, Minute) in UTC
    pub report_times: &'static [(u8, u8)],
    /// Abstand der Messungen, ausgerichtet auf Mitternacht
    pub sample_interval_secs: u32,
    /// Erlaubte Abweichung vom Sende-Zeitpunkt (RTC-Timer driftet)
    pub report_tolerance_secs: u32,
    /// Kürzeste Schlafdauer, verhindert Wake-Schleifen direkt am Slot
    pub min_sleep_secs: u32,
    /// Nach dieser Zeit wird die Uhr erneut per SNTP gestellt
    pub resync_interval_secs: u32,
}

impl Schedule {
    /// Standard: stündlich messen, um 07:00 und 17:00 senden
    pub const DEFAULT: Self = Self {
        report_times: &[(7, 0), (17, 0)],
        sample_interval_secs: 3600,
        report_tolerance_secs: 120,
        min_sleep_secs: 30,
        resync_interval_secs: 86_400,
    };

    fn interval(&self) -> u64 {
        self.sample_interval_secs.max(1) as u64
    }

    fn slot_offsets(&self) -> impl Iterator<Item = u64> + '_ {
        self.report_times
            .iter()
            .map(|&(hour, minute)| hour as u64 * 3600 + minute as u64 * 60)
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Zerlegt einen Unix-Zeitstempel in (Stunde, Minute, Sekunde) UTC
pub fn time_of_day(unix: u64) -> (u8, u8, u8) {
    let secs = unix % SECS_PER_DAY;
    (
        (secs / 3600) as u8,
        (secs % 3600 / 60) as u8,
        (secs % 60) as u8,
    )
}

/// Liefert den Sende-Slot wenn `now` nahe genug an einem Sende-Zeitpunkt liegt
///
/// Die Slot-ID ist die Minute seit Epoch des Sende-Zeitpunkts,
/// also `(tag * 24 + stunde) * 60 + minute`. Ein zu früher Wake kurz vor
/// dem Slot (auch vor Mitternacht) zählt mit.
pub fn report_slot(now: u64, schedule: &Schedule) -> Option<u32> {
    let day_start = now - now % SECS_PER_DAY;
    let tolerance = schedule.report_tolerance_secs as u64;

    schedule
        .slot_offsets()
        .flat_map(|offset| {
            [
                (day_start + offset).checked_sub(SECS_PER_DAY),
                Some(day_start + offset),
                Some(day_start + offset + SECS_PER_DAY),
            ]
        })
        .flatten()
        .find(|&slot| now.abs_diff(slot) <= tolerance)
        .map(|slot| (slot / 60) as u32)
}

/// Schlafdauer bis zum nächsten Wake
///
/// Ohne gültige Uhr: ein Mess-Intervall. Sonst bis zur nächsten
/// Mess-Grenze oder zum nächsten Sende-Zeitpunkt, je nachdem was früher
/// kommt, immer echt nach `now + min_sleep_secs`.
///
/// # Beispiele
///
/// ```
/// # use esp_core::schedule::{Schedule, sleep_duration_secs};
/// // 06:30:00 -> Wake um 07:00:00
/// assert_eq!(sleep_duration_secs(Some(6 * 3600 + 1800), &Schedule::DEFAULT), 1800);
/// ```
pub fn sleep_duration_secs(now: Option<u64>, schedule: &Schedule) -> u64 {
    let Some(now) = now else {
        return schedule.interval();
    };

    let earliest = now + schedule.min_sleep_secs as u64;
    let day_start = earliest - earliest % SECS_PER_DAY;
    let into_day = earliest % SECS_PER_DAY;

    let interval = schedule.interval();
    let next_sample = (day_start + (into_day / interval + 1) * interval)
        .min(day_start + SECS_PER_DAY);

    let next_report = schedule
        .slot_offsets()
        .map(|offset| {
            let slot = day_start + offset;
            if slot <= earliest {
                slot + SECS_PER_DAY
            } else {
                slot
            }
        })
        .min();

    let target = match next_report {
        Some(report) => next_sample.min(report),
        None => next_sample,
    };
    target - now
}

/// Kurzer Wake für einen erneuten Sendeversuch
///
/// Liefert `min_sleep_secs` solange der Folge-Wake noch in die Toleranz
/// des Slots fällt, sonst `None` (dann gilt `sleep_duration_secs`).
pub fn retry_sleep_secs(now: u64, slot: u32, schedule: &Schedule) -> Option<u64> {
    let window_end = slot as u64 * 60 + schedule.report_tolerance_secs as u64;
    let min_sleep = schedule.min_sleep_secs as u64;
    (now + min_sleep <= window_end).then_some(min_sleep)
}

/// true wenn die Uhr (neu) per SNTP gestellt werden muss
pub fn needs_time_sync(state: &RetainedState, now: Option<u64>, schedule: &Schedule) -> bool {
    match now {
        None => true,
        Some(now) => {
            now.saturating_sub(state.last_sync_unix) >= schedule.resync_interval_secs as u64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 20_000 * SECS_PER_DAY;

    fn at(hour: u64, minute: u64, second: u64) -> u64 {
        DAY + hour * 3600 + minute * 60 + second
    }

    #[test]
    fn test_time_of_day() {
        assert_eq!(time_of_day(at(17, 5, 9)), (17, 5, 9));
        assert_eq!(time_of_day(at(0, 0, 0)), (0, 0, 0));
    }

    #[test]
    fn test_report_slot_exact_and_tolerance() {
        let s = Schedule::DEFAULT;
        let slot = report_slot(at(7, 0, 0), &s);
        assert_eq!(slot, Some((at(7, 0, 0) / 60) as u32));
        assert_eq!(report_slot(at(6, 58, 30), &s), slot);
        assert_eq!(report_slot(at(7, 1, 59), &s), slot);
        assert_eq!(report_slot(at(7, 2, 1), &s), None);
        assert_eq!(report_slot(at(12, 0, 0), &s), None);
    }

    #[test]
    fn test_report_slot_early_wake_before_midnight() {
        static MIDNIGHT: [(u8, u8); 1] = [(0, 0)];
        let s = Schedule {
            report_times: &MIDNIGHT,
            ..Schedule::DEFAULT
        };
        let next_day = at(0, 0, 0) + SECS_PER_DAY;
        assert_eq!(
            report_slot(next_day - 30, &s),
            Some((next_day / 60) as u32)
        );
    }

    #[test]
    fn test_sleep_until_next_hour() {
        let s = Schedule::DEFAULT;
        assert_eq!(sleep_duration_secs(Some(at(9, 15, 0)), &s), 45 * 60);
    }

    #[test]
    fn test_sleep_after_report_skips_current_slot() {
        let s = Schedule::DEFAULT;
        // Früh geweckt um 06:59:50, Report erledigt -> nächster Wake 08:00
        assert_eq!(sleep_duration_secs(Some(at(6, 59, 50)), &s), 3610);
    }

    #[test]
    fn test_sleep_early_wake_on_report_time() {
        let s = Schedule::DEFAULT;
        // 06:59:30 + 30 s landet genau auf 07:00 -> nächster Wake 08:00
        assert_eq!(sleep_duration_secs(Some(at(6, 59, 30)), &s), 3630);
        // 08:59:30 + 30 s landet genau auf der Mess-Grenze
        assert_eq!(sleep_duration_secs(Some(at(8, 59, 30)), &s), 3630);
    }

    #[test]
    fn test_sleep_prefers_earlier_report_time() {
        static HALF_PAST: [(u8, u8); 1] = [(10, 30)];
        let s = Schedule {
            report_times: &HALF_PAST,
            ..Schedule::DEFAULT
        };
        assert_eq!(sleep_duration_secs(Some(at(10, 0, 0)), &s), 30 * 60);
    }

    #[test]
    fn test_sleep_across_midnight() {
        let s = Schedule::DEFAULT;
        assert_eq!(sleep_duration_secs(Some(at(23, 59, 50)), &s), 3610);
    }

    #[test]
    fn test_sleep_without_clock() {
        assert_eq!(sleep_duration_secs(None, &Schedule::DEFAULT), 3600);
    }

    #[test]
    fn test_retry_stays_inside_tolerance() {
        let s = Schedule::DEFAULT;
        let slot = (at(7, 0, 0) / 60) as u32;
        assert_eq!(retry_sleep_secs(at(6, 59, 30), slot, &s), Some(30));
        assert_eq!(retry_sleep_secs(at(7, 1, 30), slot, &s), Some(30));
        assert_eq!(retry_sleep_secs(at(7, 1, 31), slot, &s), None);
    }

    #[test]
    fn test_needs_time_sync() {
        let s = Schedule::DEFAULT;
        let mut state = RetainedState::new();
        assert!(needs_time_sync(&state, None, &s));

        state.record_sync(at(7, 0, 0));
        assert!(!needs_time_sync(&state, Some(at(17, 0, 0)), &s));
        assert!(needs_time_sync(&state, Some(at(7, 0, 0) + SECS_PER_DAY), &s));
    }
}
