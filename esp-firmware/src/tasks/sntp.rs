// SNTP - Stellt die Uhr über das WLAN
use defmt::{Debug2Format, error, info, warn};
use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpAddress, IpEndpoint, Stack};
use embassy_time::{Duration, Instant, Timer, with_timeout};
use esp_core::config::split_servers;
use esp_core::ntp::{NTP_PACKET_LEN, NTP_PORT, NtpError, ntp_request, parse_ntp_response};

use crate::config::*;

/// SNTP Fehler-Typen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SntpError {
    DnsResolutionFailed,
    DnsTimeout,
    SocketError,
    Timeout,
    UnexpectedSource,
    InvalidResponse(NtpError),
    AllServersFailed,
}

impl defmt::Format for SntpError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            SntpError::DnsResolutionFailed => defmt::write!(fmt, "DNS failed"),
            SntpError::DnsTimeout => defmt::write!(fmt, "DNS timeout"),
            SntpError::SocketError => defmt::write!(fmt, "Socket error"),
            SntpError::Timeout => defmt::write!(fmt, "Response timeout"),
            SntpError::UnexpectedSource => defmt::write!(fmt, "Response from unexpected source"),
            SntpError::InvalidResponse(e) => defmt::write!(fmt, "Invalid response: {}", e),
            SntpError::AllServersFailed => defmt::write!(fmt, "All servers failed"),
        }
    }
}

/// Fragt die konfigurierten NTP-Server nacheinander ab
///
/// Gibt die aktuelle Zeit als Unix-Mikrosekunden zurück.
/// Die RTC stellt der Aufrufer.
pub async fn sync_time(stack: Stack<'static>) -> Result<u64, SntpError> {
    info!("SNTP: Starting synchronization");

    for server in split_servers(NTP_SERVERS) {
        for attempt in 0..SNTP_RETRIES {
            info!("SNTP: Querying {} (attempt {})", server, attempt + 1);
            match sntp_request(stack, server).await {
                Ok(unix_micros) => {
                    info!(
                        "SNTP: Synchronized: {}.{:06} UTC",
                        unix_micros / 1_000_000,
                        unix_micros % 1_000_000
                    );
                    return Ok(unix_micros);
                }
                Err(e) => {
                    warn!("SNTP: Request failed: {}", e);
                    Timer::after(Duration::from_millis(SNTP_RETRY_DELAY_MS)).await;
                }
            }
        }
    }

    error!("SNTP: All servers failed");
    Err(SntpError::AllServersFailed)
}

/// Ein einzelner Request/Response mit RTT-Korrektur
async fn sntp_request(stack: Stack<'static>, server: &str) -> Result<u64, SntpError> {
    let server_ip = resolve_hostname(stack, server).await?;
    let endpoint = IpEndpoint::new(server_ip, NTP_PORT);

    let mut rx_meta = [PacketMetadata::EMPTY; 2];
    let mut rx_buffer = [0u8; SNTP_UDP_BUFFER_SIZE];
    let mut tx_meta = [PacketMetadata::EMPTY; 2];
    let mut tx_buffer = [0u8; SNTP_UDP_BUFFER_SIZE];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    socket.bind(0).map_err(|_| SntpError::SocketError)?;

    let sent_at = Instant::now();
    socket
        .send_to(&ntp_request(), endpoint)
        .await
        .map_err(|_| SntpError::SocketError)?;

    let mut response = [0u8; NTP_PACKET_LEN];
    let (len, meta) = with_timeout(
        Duration::from_millis(SNTP_TIMEOUT_MS),
        socket.recv_from(&mut response),
    )
    .await
    .map_err(|_| SntpError::Timeout)?
    .map_err(|_| SntpError::SocketError)?;
    let rtt = Instant::now().duration_since(sent_at);

    if meta.endpoint.addr != server_ip {
        return Err(SntpError::UnexpectedSource);
    }

    let transmit_micros =
        parse_ntp_response(&response[..len]).map_err(SntpError::InvalidResponse)?;

    // Antwort war eine halbe Round-Trip-Time unterwegs
    Ok(transmit_micros + rtt.as_micros() / 2)
}

/// Löst Hostname zu IP-Adresse auf
///
/// Nutzt embassy-net DNS-Stack mit konfigurierbarem Timeout.
async fn resolve_hostname(stack: Stack<'static>, hostname: &str) -> Result<IpAddress, SntpError> {
    let result = with_timeout(
        Duration::from_secs(DNS_TIMEOUT_SECS),
        stack.dns_query(hostname, DnsQueryType::A),
    )
    .await;

    match result {
        Ok(Ok(addrs)) => {
            let addr = addrs.first().copied().ok_or(SntpError::DnsResolutionFailed)?;
            info!("SNTP: Resolved {} to {}", hostname, Debug2Format(&addr));
            Ok(addr)
        }
        Ok(Err(_)) => Err(SntpError::DnsResolutionFailed),
        Err(_) => Err(SntpError::DnsTimeout),
    }
}
