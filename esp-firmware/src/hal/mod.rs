// Hardware Abstraction Layer (HAL) Module
//
// Dieses Modul kapselt Hardware-Zugriffe hinter den Traits aus esp-core,
// damit die Zyklus-Logik auf dem Host testbar bleibt.

pub mod espnow_link;
pub mod moisture;
pub mod retained;

pub use espnow_link::EspNowLink;
pub use moisture::AdcMoistureSensor;
pub use retained::{load_retained, store_retained};
