//! ESP Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert Traits, Sensor-Treiber über embedded-hal und Pure Functions
//! für den Wake/Measure/Send/Sleep-Zyklus des Bodensensors.

#![no_std]

pub mod config;
pub mod cycle;
pub mod ntp;
pub mod retained;
pub mod schedule;
pub mod sensors;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use cycle::{CycleOutcome, ReportStatus, Sample, Sensors, run_cycle};
pub use retained::{RetainedState, SampleLog};
pub use schedule::Schedule;
pub use sensors::{Si7021, Tmp102};
pub use traits::{LinkError, MoistureSensor, PeerLink, SensorError, TemperatureSensor};
pub use types::{ReadingPayload, SensorReading, centi_to_celsius, moisture_percent};
