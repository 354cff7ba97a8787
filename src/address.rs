//! Syntax checks and IPv4 resolution for user supplied server addresses.
//!
//! Passing [is_valid_address_syntax] says nothing about reachability; only a
//! probe tells whether a server answers.

use crate::DiscoveryErr;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};

lazy_static! {
    static ref IPV4_LITERAL: Regex = Regex::new(r"^(\d{1,3}\.){3}\d{1,3}$").unwrap();
    static ref HOSTNAME: Regex =
        Regex::new(r"^([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,}$").unwrap();
}

/// Whether `address` looks like a dotted-quad IPv4 literal or a DNS hostname.
///
/// Purely syntactic. Octets are matched as 1 to 3 digits and not range checked,
/// single label names such as `localhost` are rejected.
pub fn is_valid_address_syntax(address: &str) -> bool {
    IPV4_LITERAL.is_match(address) || HOSTNAME.is_match(address)
}

/// Alias of [is_valid_address_syntax].
pub fn is_valid_address(address: &str) -> bool {
    is_valid_address_syntax(address)
}

/// Resolve `host` to its first IPv4 address.
///
/// IPv4 literals are returned as they are, without a lookup.
pub fn resolve_to_ipv4(host: &str) -> Result<Ipv4Addr, DiscoveryErr> {
    let host = host.trim();

    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Ok(ip);
    }

    // Port is irrelevant for the lookup.
    let addrs = (host, 0).to_socket_addrs().map_err(|err| {
        DiscoveryErr::ResolutionFailed(format!("Could not resolve {}: {}", host, err))
    })?;

    for addr in addrs {
        if let IpAddr::V4(ip) = addr.ip() {
            debug!("resolved {} to {}", host, ip);
            return Ok(ip);
        }
    }

    Err(DiscoveryErr::ResolutionFailed(format!(
        "No IPv4 address found for {}",
        host
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn accepts_ipv4_literals_and_hostnames() {
        for address in [
            "127.0.0.1",
            "192.168.1.219",
            "mc.hypixel.net",
            "play.example-server.com",
            "a.io",
            "XN--BCHER-KVA.example.org",
        ] {
            assert!(is_valid_address_syntax(address), "{}", address);
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for address in [
            "",
            "localhost",
            "-bad.example.com",
            "bad-.example.com",
            "example.c0m",
            "exa mple.com",
            "1.2.3",
            "1.2.3.4.5",
            "mc.example.com:25565",
            "http://mc.example.com",
        ] {
            assert!(!is_valid_address(address), "{}", address);
        }
    }

    #[test]
    fn syntax_only_no_range_checks() {
        assert!(is_valid_address_syntax("999.999.999.999"));
    }

    #[test]
    fn ipv4_literals_resolve_to_themselves() {
        assert_eq!(
            resolve_to_ipv4(" 10.0.0.7 ").unwrap(),
            Ipv4Addr::new(10, 0, 0, 7)
        );
    }

    #[test]
    fn localhost_resolves() {
        assert!(resolve_to_ipv4("localhost").unwrap().is_loopback());
    }

    #[test]
    fn unknown_hosts_fail_resolution() {
        let err = resolve_to_ipv4("name.invalid").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResolutionFailed);
    }
}
