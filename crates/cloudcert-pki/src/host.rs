//! Discovery of the address placed in the leaf certificate's SAN

use std::{
    io,
    net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs, UdpSocket},
};

use tracing::{debug, warn};

use crate::error::{PkiError, Result};

/// Remote used to find the interface holding the default route; nothing is sent
const DEFAULT_ROUTE_PROBE: &str = "8.8.8.8:80";

/// Source of the host's IP address in textual form
pub trait HostResolver {
    fn local_ip(&self) -> io::Result<String>;
}

impl<F> HostResolver for F
where
    F: Fn() -> io::Result<String>,
{
    fn local_ip(&self) -> io::Result<String> {
        self()
    }
}

/// Always answers with the same address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticHost(pub IpAddr);

impl HostResolver for StaticHost {
    fn local_ip(&self) -> io::Result<String> {
        Ok(self.0.to_string())
    }
}

/// Resolves the machine's hostname through the system resolver
///
/// Loopback, link-local, unspecified and multicast results are skipped and
/// IPv4 wins over IPv6. When the hostname yields nothing usable the address
/// of the interface carrying the default route is used instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHostResolver;

impl SystemHostResolver {
    pub fn hostname() -> io::Result<String> {
        gethostname::gethostname().into_string().map_err(|raw| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("hostname is not valid UTF-8: {raw:?}"),
            )
        })
    }

    fn resolve_hostname(hostname: &str) -> io::Result<Option<IpAddr>> {
        let addrs: Vec<IpAddr> = (hostname, 0)
            .to_socket_addrs()?
            .map(|addr: SocketAddr| addr.ip())
            .collect();
        Ok(pick_address(&addrs))
    }

    fn default_route_ip() -> io::Result<IpAddr> {
        let sock = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        sock.connect(DEFAULT_ROUTE_PROBE)?;
        Ok(sock.local_addr()?.ip())
    }
}

impl HostResolver for SystemHostResolver {
    fn local_ip(&self) -> io::Result<String> {
        let hostname = Self::hostname()?;
        match Self::resolve_hostname(&hostname) {
            Ok(Some(ip)) => {
                debug!(%hostname, %ip, "resolved host address");
                return Ok(ip.to_string());
            }
            Ok(None) => debug!(%hostname, "hostname has no routable address"),
            Err(e) => warn!(%hostname, error = %e, "hostname lookup failed"),
        }

        let ip = Self::default_route_ip()?;
        if !is_routable(&ip) {
            return Err(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no usable address for host {hostname}"),
            ));
        }
        debug!(%ip, "using default route address");
        Ok(ip.to_string())
    }
}

fn is_routable(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_loopback() || v4.is_link_local() || v4.is_unspecified() || v4.is_multicast())
        }
        IpAddr::V6(v6) => {
            let link_local = v6.segments()[0] & 0xffc0 == 0xfe80;
            !(v6.is_loopback() || link_local || v6.is_unspecified() || v6.is_multicast())
        }
    }
}

/// First routable IPv4 address, else first routable IPv6 address
fn pick_address(addrs: &[IpAddr]) -> Option<IpAddr> {
    let mut routable = addrs.iter().filter(|ip| is_routable(ip));
    let first = routable.clone().find(|ip| ip.is_ipv4());
    first.or_else(|| routable.next()).copied()
}

/// Parse the text a [`HostResolver`] produced
pub fn parse_host_ip(text: &str) -> Result<IpAddr> {
    text.trim()
        .parse()
        .map_err(|_| PkiError::HostResolution(format!("{text:?} is not an IP address")))
}
