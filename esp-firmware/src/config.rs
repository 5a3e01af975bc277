// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen

use esp_core::Schedule;

// ============================================================================
// Sensor Konfiguration
// ============================================================================

/// GPIO-Pins des I2C-Busses (SI7021 + TMP102)
/// Nur für Logs, die Zuordnung selbst passiert in main.rs
pub const I2C_SDA_GPIO: u8 = 6;
pub const I2C_SCL_GPIO: u8 = 7;

/// I2C Taktfrequenz in kHz
/// 100 kHz (Standard Mode) reicht für zwei Sensoren und verträgt lange Kabel
pub const I2C_FREQUENCY_KHZ: u32 = 100;

/// ADC-Pin für den Soil Moisture Sensor
pub const SOIL_MOISTURE_GPIO: u8 = 4;

/// Anzahl ADC-Einzelmessungen pro Feuchte-Wert (Mittelwert)
pub const MOISTURE_SAMPLES: u16 = 8;

/// Maximale Versuche pro ADC-Einzelmessung bevor aufgegeben wird
pub const ADC_READ_ATTEMPTS: u32 = 1000;

/// Kalibrierung: ADC-Wert an der Luft (trocken)
/// Nur für die Prozent-Anzeige im Log, gesendet wird der Rohwert
pub const MOISTURE_DRY: u16 = 3300;

/// Kalibrierung: ADC-Wert im Wasser (nass)
pub const MOISTURE_WET: u16 = 1400;

// ============================================================================
// Zeitplan
// ============================================================================

/// Sende-Zeitpunkte (UTC): 07:00 und 17:00
pub const REPORT_TIMES: [(u8, u8); 2] = [(7, 0), (17, 0)];

/// Wake/Measure/Send/Sleep-Zyklus
/// - stündlich messen (ausgerichtet auf volle Stunde)
/// - ±2 Minuten Toleranz am Sende-Zeitpunkt (RTC-Timer driftet)
/// - Uhr einmal pro Tag per SNTP nachstellen
pub const SCHEDULE: Schedule = Schedule {
    report_times: &REPORT_TIMES,
    sample_interval_secs: 3600,
    report_tolerance_secs: 120,
    min_sleep_secs: 30,
    resync_interval_secs: 86_400,
};

// ============================================================================
// WiFi Konfiguration (nur für SNTP)
// ============================================================================

/// WiFi SSID (Netzwerk-Name)
/// Wird zur Build-Zeit aus der Environment Variable WIFI_SSID geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_SSID: &str = env!(
    "WIFI_SSID",
    "WiFi SSID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// WiFi Passwort
/// Wird zur Build-Zeit aus der Environment Variable WIFI_PASSWORD geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_PASSWORD: &str = env!(
    "WIFI_PASSWORD",
    "WiFi Password nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Timeout für Verbindungsaufbau zum Access Point in Sekunden
/// Danach läuft der Zyklus ohne Zeit-Sync weiter (Batterie!)
pub const WIFI_CONNECT_TIMEOUT_SECS: u64 = 15;

/// Timeout für DHCP in Sekunden
pub const DHCP_TIMEOUT_SECS: u64 = 10;

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

// ============================================================================
// SNTP Konfiguration
// ============================================================================

/// NTP-Server (komma-separiert), Standard: pool.ntp.org
/// Kann in .env über NTP_SERVERS überschrieben werden
pub const NTP_SERVERS: &str = match option_env!("NTP_SERVERS") {
    Some(servers) => servers,
    None => "pool.ntp.org",
};

/// Versuche pro NTP-Server
pub const SNTP_RETRIES: u8 = 2;

/// Timeout für eine NTP-Antwort in Millisekunden
pub const SNTP_TIMEOUT_MS: u64 = 3000;

/// Wartezeit zwischen zwei Versuchen in Millisekunden
pub const SNTP_RETRY_DELAY_MS: u64 = 500;

/// DNS Query Timeout in Sekunden
pub const DNS_TIMEOUT_SECS: u64 = 5;

/// UDP Buffer-Größe für SNTP (TX und RX)
pub const SNTP_UDP_BUFFER_SIZE: usize = 128;

// ============================================================================
// ESP-NOW Konfiguration
// ============================================================================

/// MAC-Adresse des Empfänger-ESP32 (z.B. "24:6F:28:A1:BC:D2")
/// Wird zur Build-Zeit aus der Environment Variable PEER_MAC geladen
/// Setze diese in .env file (siehe .env.example)
pub const PEER_MAC: &str = env!(
    "PEER_MAC",
    "Peer MAC nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// ESP-NOW Kanal (0 = aktueller Kanal der Station)
/// Muss mit dem Kanal des Empfängers übereinstimmen
pub const ESPNOW_CHANNEL: &str = match option_env!("ESPNOW_CHANNEL") {
    Some(channel) => channel,
    None => "0",
};
