// Persistenter RTC-Fast-RAM für den Zustand zwischen zwei Wakes
//
// Der Inhalt überlebt Deep Sleep, aber nicht Power-On oder Brownout.
// Nach einem Kaltstart steht Müll im RAM, `load_retained()` prüft das.

use esp_core::RetainedState;

/// Wrapper damit der Zustand im persistenten RTC-RAM liegen darf
#[repr(transparent)]
pub struct RtcRetained(RetainedState);

// SAFETY: RetainedState besteht nur aus Integern (repr(C)), jedes
// Bitmuster ist gültig. Der Inhalt wird vor Verwendung validiert.
unsafe impl esp_hal::Persistable for RtcRetained {}

#[esp_hal::ram(unstable(rtc_fast, persistent))]
static mut RETAINED: RtcRetained = RtcRetained(RetainedState::new());

/// Liest den Zustand aus dem RTC-RAM
///
/// Gibt zusätzlich zurück, ob der Inhalt gültig war (Wake aus Deep Sleep)
/// oder zurückgesetzt wurde (Kaltstart).
pub fn load_retained() -> (RetainedState, bool) {
    let mut state = critical_section::with(|_| {
        // SAFETY: Zugriff nur innerhalb der Critical Section, per Kopie
        unsafe { (&raw const RETAINED).read().0 }
    });
    let was_valid = state.validate_or_reset();
    (state, was_valid)
}

/// Schreibt den Zustand vor dem Deep Sleep zurück
pub fn store_retained(state: &RetainedState) {
    critical_section::with(|_| {
        // SAFETY: siehe load_retained()
        unsafe { (&raw mut RETAINED).write(RtcRetained(*state)) }
    });
}
