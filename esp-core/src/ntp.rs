//! SNTP Paket-Aufbau und -Auswertung (RFC 4330)
//!
//! Der UDP-Transport liegt in der Firmware, hier nur die Bytes.

/// Länge eines NTP-Pakets ohne Extensions
pub const NTP_PACKET_LEN: usize = 48;

/// UDP-Port des NTP-Servers
pub const NTP_PORT: u16 = 123;

/// Sekunden zwischen 1900-01-01 (NTP-Epoch) und 1970-01-01 (Unix-Epoch)
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

const MODE_SERVER: u8 = 4;

/// Fehler beim Auswerten einer NTP-Antwort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NtpError {
    TooShort(usize),
    InvalidMode(u8),
    InvalidStratum(u8),
    ZeroTimestamp,
}

/// Client-Request: LI=0, VN=3, Mode=3 (Client)
pub fn ntp_request() -> [u8; NTP_PACKET_LEN] {
    let mut packet = [0u8; NTP_PACKET_LEN];
    packet[0] = 0x1B;
    packet
}

/// Liest den Transmit-Timestamp der Server-Antwort als Unix-Mikrosekunden
///
/// Sekundenwerte unterhalb des Unix-Offsets werden als NTP-Era 1
/// (ab Februar 2036) interpretiert.
pub fn parse_ntp_response(packet: &[u8]) -> Result<u64, NtpError> {
    if packet.len() < NTP_PACKET_LEN {
        return Err(NtpError::TooShort(packet.len()));
    }

    let mode = packet[0] & 0x07;
    if mode != MODE_SERVER {
        return Err(NtpError::InvalidMode(mode));
    }

    // Stratum 0 = Kiss-o'-Death, 16 = unsynchronisiert
    let stratum = packet[1];
    if stratum == 0 || stratum > 15 {
        return Err(NtpError::InvalidStratum(stratum));
    }

    let secs = u32::from_be_bytes([packet[40], packet[41], packet[42], packet[43]]) as u64;
    let frac = u32::from_be_bytes([packet[44], packet[45], packet[46], packet[47]]) as u64;
    if secs == 0 && frac == 0 {
        return Err(NtpError::ZeroTimestamp);
    }

    let unix_secs = if secs >= NTP_UNIX_OFFSET {
        secs - NTP_UNIX_OFFSET
    } else {
        secs + (1u64 << 32) - NTP_UNIX_OFFSET
    };
    let micros = (frac * 1_000_000) >> 32;

    Ok(unix_secs * 1_000_000 + micros)
}

#[cfg(feature = "defmt")]
impl defmt::Format for NtpError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            NtpError::TooShort(len) => defmt::write!(fmt, "Packet too short ({} bytes)", len),
            NtpError::InvalidMode(mode) => defmt::write!(fmt, "Invalid mode {}", mode),
            NtpError::InvalidStratum(s) => defmt::write!(fmt, "Invalid stratum {}", s),
            NtpError::ZeroTimestamp => defmt::write!(fmt, "Zero transmit timestamp"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(stratum: u8, secs: u32, frac: u32) -> [u8; NTP_PACKET_LEN] {
        let mut packet = [0u8; NTP_PACKET_LEN];
        packet[0] = 0x24; // LI=0, VN=4, Mode=4
        packet[1] = stratum;
        packet[40..44].copy_from_slice(&secs.to_be_bytes());
        packet[44..48].copy_from_slice(&frac.to_be_bytes());
        packet
    }

    #[test]
    fn test_request_header() {
        let req = ntp_request();
        assert_eq!(req[0], 0x1B);
        assert!(req[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_parse_unix_epoch_plus_fraction() {
        // 1970-01-01 00:00:00.5
        let packet = response(2, NTP_UNIX_OFFSET as u32, 0x8000_0000);
        assert_eq!(parse_ntp_response(&packet), Ok(500_000));
    }

    #[test]
    fn test_parse_era_rollover() {
        // Sekunde 0 von Era 1 = 2036-02-07 06:28:16 UTC
        let packet = response(1, 0, 1);
        assert_eq!(
            parse_ntp_response(&packet),
            Ok(((1u64 << 32) - NTP_UNIX_OFFSET) * 1_000_000)
        );
    }

    #[test]
    fn test_parse_rejects_kiss_of_death() {
        let packet = response(0, 3_900_000_000, 0);
        assert_eq!(parse_ntp_response(&packet), Err(NtpError::InvalidStratum(0)));
    }

    #[test]
    fn test_parse_rejects_client_mode() {
        let mut packet = response(2, 3_900_000_000, 0);
        packet[0] = 0x1B;
        assert_eq!(parse_ntp_response(&packet), Err(NtpError::InvalidMode(3)));
    }

    #[test]
    fn test_parse_rejects_short_packet() {
        assert_eq!(parse_ntp_response(&[0x24; 12]), Err(NtpError::TooShort(12)));
    }

    #[test]
    fn test_parse_rejects_zero_timestamp() {
        let packet = response(2, 0, 0);
        assert_eq!(parse_ntp_response(&packet), Err(NtpError::ZeroTimestamp));
    }
}
