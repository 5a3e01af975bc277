// Task-Modul: Netzwerk-Teil des Wake-Zyklus
//
// WiFi wird nur hochgefahren wenn die Uhr gestellt werden muss
// oder ein Report ansteht. `net_task` läuft als Embassy Task,
// der Rest sind async Funktionen die main() nacheinander aufruft.

pub mod sntp;
pub mod wifi;

// Re-export für einfachen Import
pub use sntp::sync_time;
pub use wifi::{connect, disconnect, net_task, start_station};
