//! LAN address discovery for the advertised mobile URL.

use std::net::{IpAddr, UdpSocket};

/// Best guess at the address other devices on the LAN can reach us on.
///
/// Connecting a UDP socket sends no packets; it only makes the OS pick the
/// outbound interface, whose address we then read back.
pub fn local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("10.255.255.255:1").ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_unspecified()).then_some(ip)
}

/// Host part of the advertised URL, falling back to `localhost`.
pub fn advertised_host(override_host: Option<&str>) -> String {
    match override_host.map(str::trim).filter(|h| !h.is_empty()) {
        Some(host) => host.to_string(),
        None => local_ip()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "localhost".to_string()),
    }
}

/// URL of the mobile control page.
pub fn mobile_url(host: &str, port: u16) -> String {
    format!("http://{host}:{port}/mobile")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mobile_url() {
        assert_eq!(
            mobile_url("192.168.1.20", 5000),
            "http://192.168.1.20:5000/mobile"
        );
    }

    #[test]
    fn test_override_wins() {
        assert_eq!(advertised_host(Some("pc.lan")), "pc.lan");
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let host = advertised_host(Some("  "));
        assert!(!host.trim().is_empty());
    }
}
