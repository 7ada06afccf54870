//! LAN address the host shares with its guest
//!
//! The guest types the address in by hand, so the host shows its own
//! non-loopback, non-link-local IPv4 address together with the port.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use tracing::debug;

/// Destinations used to ask the OS which local interface it would route
/// through. Connecting a UDP socket sends nothing on the wire.
const ROUTE_PROBES: &[&str] = &["8.8.8.8:80", "10.255.255.255:1", "192.168.255.255:1"];

/// Pick the first IPv4 address that is neither loopback (127.0.0.0/8) nor
/// link-local (169.254.0.0/16), falling back to 127.0.0.1.
pub fn select_lan_address<I>(candidates: I) -> Ipv4Addr
where
    I: IntoIterator<Item = IpAddr>,
{
    candidates
        .into_iter()
        .filter_map(|ip| match ip {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .find(|v4| !v4.is_loopback() && !v4.is_link_local() && !v4.is_unspecified())
        .unwrap_or(Ipv4Addr::LOCALHOST)
}

fn probe_route(target: &str) -> Option<IpAddr> {
    let socket = UdpSocket::bind(("0.0.0.0", 0)).ok()?;
    socket.connect(target).ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}

/// This machine's LAN IPv4 address, or loopback when none is found
pub fn local_lan_address() -> Ipv4Addr {
    let candidates: Vec<IpAddr> = ROUTE_PROBES.iter().filter_map(|t| probe_route(t)).collect();
    let chosen = select_lan_address(candidates.iter().copied());
    debug!(candidates = ?candidates, chosen = %chosen, "LAN address selected");
    chosen
}

/// Human-copyable `ip:port` string for out-of-band sharing
pub fn join_address(port: u16) -> String {
    SocketAddr::from((local_lan_address(), port)).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    #[test]
    fn test_skips_loopback_and_link_local() {
        let chosen = select_lan_address([
            IpAddr::V4(Ipv4Addr::new(127, 0, 1, 1)),
            IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1)),
            IpAddr::V4(Ipv4Addr::new(169, 254, 10, 20)),
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 42)),
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)),
        ]);
        assert_eq!(chosen, Ipv4Addr::new(192, 168, 1, 42));
    }

    #[test]
    fn test_falls_back_to_loopback() {
        assert_eq!(select_lan_address(Vec::<IpAddr>::new()), Ipv4Addr::LOCALHOST);
        assert_eq!(
            select_lan_address([IpAddr::V4(Ipv4Addr::new(169, 254, 0, 1))]),
            Ipv4Addr::LOCALHOST
        );
    }

    #[test]
    fn test_local_lan_address_is_usable() {
        let ip = local_lan_address();
        assert!(!ip.is_link_local());
        assert!(!ip.is_unspecified());
    }

    #[test]
    fn test_join_address_format() {
        let addr = join_address(7777);
        assert!(addr.ends_with(":7777"));
        assert!(addr.parse::<SocketAddr>().is_ok());
    }
}
