//! Sensor-Treiber
//!
//! Generisch über `embedded_hal::i2c::I2c`, damit sie auf dem Host
//! mit einem Mock-Bus getestet werden können.

pub mod si7021;
pub mod tmp102;

pub use si7021::Si7021;
pub use tmp102::Tmp102;
