use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// An address with a prefix length. A bare address parses as a host range
/// (`/32` or `/128`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IpNet {
    pub addr: IpAddr,
    pub prefix: u8,
}

fn max_prefix(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

impl IpNet {
    pub fn host(addr: IpAddr) -> Self {
        IpNet {
            addr,
            prefix: max_prefix(&addr),
        }
    }

    /// True when the range covers a single address.
    pub fn is_host(&self) -> bool {
        self.prefix == max_prefix(&self.addr)
    }

    /// The first address of the range, i.e. `addr` with the host bits cleared.
    pub fn network(&self) -> IpAddr {
        match self.addr {
            IpAddr::V4(a) => {
                let mask = if self.prefix == 0 {
                    0
                } else {
                    u32::MAX << (32 - self.prefix as u32)
                };
                IpAddr::V4(Ipv4Addr::from(u32::from(a) & mask))
            }
            IpAddr::V6(a) => {
                let mask = if self.prefix == 0 {
                    0
                } else {
                    u128::MAX << (128 - self.prefix as u32)
                };
                IpAddr::V6(Ipv6Addr::from(u128::from(a) & mask))
            }
        }
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        if ip.is_ipv4() != self.addr.is_ipv4() {
            return false;
        }
        let candidate = IpNet {
            addr: *ip,
            prefix: self.prefix,
        };
        candidate.network() == self.network()
    }
}

impl fmt::Display for IpNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

impl FromStr for IpNet {
    type Err = String;

    /// Accepts either `addr` or `addr/prefix`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some((ip_part, prefix_part)) = s.split_once('/') else {
            let addr = IpAddr::from_str(s).map_err(|e| format!("Invalid IP: {e}"))?;
            return Ok(IpNet::host(addr));
        };
        let addr = IpAddr::from_str(ip_part).map_err(|e| format!("Invalid IP: {e}"))?;
        let prefix: u8 = prefix_part
            .parse()
            .map_err(|e| format!("Invalid prefix: {e}"))?;
        if prefix > max_prefix(&addr) {
            return Err("Prefix out of range".into());
        }
        Ok(IpNet { addr, prefix })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_uses_prefix_mask() {
        let net: IpNet = "182.120.56.0/24".parse().unwrap();
        assert!(net.contains(&"182.120.56.200".parse().unwrap()));
        assert!(!net.contains(&"182.120.57.1".parse().unwrap()));

        let everything: IpNet = "0.0.0.0/0".parse().unwrap();
        assert!(everything.contains(&"203.0.113.9".parse().unwrap()));
        assert_eq!(everything.network(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn contains_never_crosses_families() {
        let v6: IpNet = "::/0".parse().unwrap();
        assert!(!v6.contains(&"10.0.0.1".parse().unwrap()));
        let host: IpNet = "2001:db8::5".parse().unwrap();
        assert!(host.is_host());
        assert!(host.contains(&IpAddr::V6("2001:db8::5".parse::<Ipv6Addr>().unwrap())));
        assert!(!host.contains(&"2001:db8::6".parse().unwrap()));
    }

    #[test]
    fn bare_address_is_host_range() {
        let net: IpNet = "10.1.2.3".parse().unwrap();
        assert_eq!(net.prefix, 32);
        assert!(net.is_host());
        assert_eq!(net.to_string(), "10.1.2.3/32");
    }

    #[test]
    fn network_clears_host_bits() {
        let net: IpNet = "10.1.2.3/16".parse().unwrap();
        assert_eq!(net.network().to_string(), "10.1.0.0");
        let net6: IpNet = "2001:db8:abcd::1/32".parse().unwrap();
        assert_eq!(net6.network().to_string(), "2001:db8::");
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!("192.168.0.0/33".parse::<IpNet>().is_err());
        assert!("2001:db8::/129".parse::<IpNet>().is_err());
        assert!("example.com".parse::<IpNet>().is_err());
        assert!("10.0.0.0/abc".parse::<IpNet>().is_err());
    }
}
