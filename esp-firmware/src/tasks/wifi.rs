// WiFi - Station-Modus für SNTP und als Basis für ESP-NOW
use defmt::{Debug2Format, error, info, warn};
use embassy_net::{Runner, Stack};
use embassy_time::{Duration, Timer, with_timeout};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice};

use crate::config::{DHCP_TIMEOUT_SECS, WIFI_CONNECT_TIMEOUT_SECS, WIFI_PASSWORD, WIFI_SSID};

/// WiFi Fehler-Typen
///
/// Jeder Fehler beendet nur die Zeit-Synchronisation, der Zyklus läuft weiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiError {
    ConfigFailed,
    StartFailed,
    ConnectFailed,
    ConnectTimeout,
    DhcpTimeout,
}

impl defmt::Format for WifiError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            WifiError::ConfigFailed => defmt::write!(fmt, "Configuration failed"),
            WifiError::StartFailed => defmt::write!(fmt, "Start failed"),
            WifiError::ConnectFailed => defmt::write!(fmt, "Connection failed"),
            WifiError::ConnectTimeout => defmt::write!(fmt, "Connection timeout"),
            WifiError::DhcpTimeout => defmt::write!(fmt, "DHCP timeout"),
        }
    }
}

/// Startet den Controller im Station-Modus (ohne Verbindung)
///
/// Reicht für ESP-NOW. Für SNTP folgt danach `connect()`.
pub async fn start_station(controller: &mut WifiController<'static>) -> Result<(), WifiError> {
    if matches!(controller.is_started(), Ok(true)) {
        return Ok(());
    }

    info!("WiFi: Configuring and starting...");
    let client_config = ModeConfig::Client(
        ClientConfig::default()
            .with_ssid(WIFI_SSID.into())
            .with_password(WIFI_PASSWORD.into()),
    );

    controller.set_config(&client_config).map_err(|e| {
        error!("WiFi: Failed to set configuration: {}", Debug2Format(&e));
        WifiError::ConfigFailed
    })?;

    controller.start_async().await.map_err(|e| {
        error!("WiFi: Failed to start: {}", Debug2Format(&e));
        WifiError::StartFailed
    })?;

    info!("WiFi: Started successfully");
    Ok(())
}

/// Verbindet mit dem Access Point und wartet auf eine IP-Adresse
///
/// Beide Schritte haben einen Timeout, damit ein fehlendes WLAN
/// nicht die Batterie leert.
pub async fn connect(
    controller: &mut WifiController<'static>,
    stack: Stack<'static>,
) -> Result<(), WifiError> {
    start_station(controller).await?;

    info!("WiFi: Connecting to '{}'...", WIFI_SSID);
    match with_timeout(
        Duration::from_secs(WIFI_CONNECT_TIMEOUT_SECS),
        controller.connect_async(),
    )
    .await
    {
        Ok(Ok(_)) => info!("WiFi: Connected successfully!"),
        Ok(Err(e)) => {
            error!("WiFi: Connection failed: {}", Debug2Format(&e));
            return Err(WifiError::ConnectFailed);
        }
        Err(_) => return Err(WifiError::ConnectTimeout),
    }

    with_timeout(Duration::from_secs(DHCP_TIMEOUT_SECS), wait_for_network(stack))
        .await
        .map_err(|_| WifiError::DhcpTimeout)
}

/// Trennt die Verbindung zum Access Point
///
/// ESP-NOW läuft danach im gestarteten Station-Modus weiter.
pub async fn disconnect(controller: &mut WifiController<'static>) {
    if let Err(e) = controller.disconnect_async().await {
        warn!("WiFi: Disconnect failed: {}", Debug2Format(&e));
    } else {
        info!("WiFi: Disconnected");
    }
}

/// Network Task
///
/// Überwacht den Netzwerk-Stack:
/// - Prozessiert Netzwerk-Pakete
/// - Managed TCP/IP Stack
#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}

/// Wartet bis Link steht und DHCP eine Adresse geliefert hat
async fn wait_for_network(stack: Stack<'static>) {
    loop {
        if stack.is_link_up() {
            break;
        }
        Timer::after(Duration::from_millis(100)).await;
    }

    info!("WiFi: Link is up, waiting for IP address...");

    loop {
        if let Some(config) = stack.config_v4() {
            info!("WiFi: Got IP address!");
            info!("  IP:      {}", Debug2Format(&config.address.address()));
            info!("  Gateway: {}", Debug2Format(&config.gateway));
            info!("  DNS:     {}", Debug2Format(&config.dns_servers));
            break;
        }
        Timer::after(Duration::from_millis(100)).await;
    }
}
