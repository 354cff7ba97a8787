use crate::{server, DiscoveryErr, ServerStatus};
use std::{
    net::{IpAddr, SocketAddr, ToSocketAddrs},
    time::Duration,
};

/// Default port of a Java Edition server.
pub const DEFAULT_PORT: u16 = 25565;
/// Default budget for a whole probe, connecting included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);
/// Protocol version presented in the handshake (1.20.3/1.20.4).
pub const DEFAULT_PROTOCOL_VERSION: i32 = 765;

/// Main struct used for configuring a probe.
#[derive(Debug, Clone)]
pub struct Conf {
    /// Server IP address or a domain name.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// See [SocketConf].
    pub socket_conf: SocketConf,
}

/// Additional socket configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketConf {
    /// Total time allowed from the connection attempt to a complete response frame.
    pub timeout: Duration,
    /// Protocol version sent in the handshake. Servers answer status
    /// requests whatever the version, so no negotiation happens.
    pub protocol_version: i32,
    /// Connect to this address instead of looking up the host. The host is
    /// still what the handshake announces and what the status reports.
    pub connect_ip: Option<IpAddr>,
}

impl Default for SocketConf {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            protocol_version: DEFAULT_PROTOCOL_VERSION,
            connect_ip: None,
        }
    }
}

impl ToSocketAddrs for Conf {
    type Iter = std::vec::IntoIter<SocketAddr>;

    fn to_socket_addrs(&self) -> std::io::Result<Self::Iter> {
        match self.socket_conf.connect_ip {
            Some(ip) => Ok(vec![SocketAddr::new(ip, self.port)].into_iter()),
            None => (&*self.host, self.port).to_socket_addrs(),
        }
    }
}

impl std::fmt::Display for Conf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl Conf {
    /// Create a probe configuration using the default port (25565).
    ///
    /// # Examples
    ///
    /// ```
    /// # use mc_discovery::{Conf, SocketConf};
    /// #
    /// let conf = Conf::create(" mc.example.com ");
    /// #
    /// # assert_eq!(conf.host, "mc.example.com");
    /// # assert_eq!(conf.port, 25565);
    /// # assert_eq!(conf.socket_conf, SocketConf::default());
    /// ```
    pub fn create(host: &str) -> Self {
        Self::create_with_port(host, DEFAULT_PORT)
    }

    /// Create a probe configuration using the specified port.
    pub fn create_with_port(host: &str, port: u16) -> Self {
        Self {
            host: host.trim().into(),
            port,
            socket_conf: SocketConf::default(),
        }
    }

    /// Create a probe configuration from a `host:port` string.
    ///
    /// # Example
    ///
    /// ```
    /// # use mc_discovery::{Conf, DiscoveryErr};
    /// #
    /// # fn main() -> Result<(), DiscoveryErr> {
    ///     let conf = Conf::create_from_str("mc.example.com:25566")?;
    /// #
    /// #   assert_eq!(conf.host, "mc.example.com");
    /// #   assert_eq!(conf.port, 25566);
    /// #   assert!(Conf::create_from_str("25565").is_err());
    /// #   assert!(Conf::create_from_str("mc.example.com:0").is_err());
    /// #   Ok(())
    /// # }
    /// ```
    pub fn create_from_str(addr: &str) -> Result<Self, DiscoveryErr> {
        let (host, port) = match addr.trim().rsplit_once(':') {
            Some((host, port)) if !host.trim().is_empty() => (host, port.trim()),
            _ => {
                return Err(DiscoveryErr::ResolutionFailed(format!(
                    "Invalid server address syntax, expected host:port but got: {}",
                    addr
                )));
            }
        };

        match port.parse::<u16>() {
            Ok(port) if port != 0 => Ok(Self::create_with_port(host, port)),
            _ => Err(DiscoveryErr::ResolutionFailed(format!(
                "Invalid port: {}",
                port
            ))),
        }
    }

    /// Replace the probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.socket_conf.timeout = timeout;
        self
    }

    /// Replace the protocol version presented in the handshake.
    pub fn with_protocol_version(mut self, protocol_version: i32) -> Self {
        self.socket_conf.protocol_version = protocol_version;
        self
    }

    /// Connect to `ip` while keeping the configured host in the handshake,
    /// which virtual host proxies route on.
    pub fn with_connect_ip(mut self, ip: IpAddr) -> Self {
        self.socket_conf.connect_ip = Some(ip);
        self
    }

    /// Probe the server with the [Server List Ping](https://wiki.vg/Server_List_Ping)
    /// protocol. Suitable for Java Edition servers version 1.7 and above.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mc_discovery::{Conf, DiscoveryErr};
    ///
    /// fn main() -> Result<(), DiscoveryErr> {
    ///     let server = Conf::create("mc.example.com");
    ///     let status = server.get_server_status()?;
    ///
    ///     println!("{}", status);
    ///     Ok(())
    /// }
    /// ```
    pub fn get_server_status(&self) -> Result<ServerStatus, DiscoveryErr> {
        server::get_server_status(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn create_from_str_splits_on_last_colon() {
        let conf = Conf::create_from_str(" 127.0.0.1 : 25570 ").unwrap();
        assert_eq!(conf.host, "127.0.0.1");
        assert_eq!(conf.port, 25570);
        assert_eq!(conf.to_string(), "127.0.0.1:25570");
    }

    #[test]
    fn create_from_str_rejects_bad_input() {
        for addr in ["", "25565", ":25565", "host:", "host:70000", "host:-1", "host:0"] {
            let err = Conf::create_from_str(addr).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ResolutionFailed, "{}", addr);
        }
    }

    #[test]
    fn builders_override_socket_conf() {
        let conf = Conf::create("a.io")
            .with_timeout(Duration::from_millis(250))
            .with_protocol_version(-1);

        assert_eq!(conf.port, DEFAULT_PORT);
        assert_eq!(conf.socket_conf.timeout, Duration::from_millis(250));
        assert_eq!(conf.socket_conf.protocol_version, -1);
        assert_eq!(conf.socket_conf.connect_ip, None);
    }

    #[test]
    fn connect_ip_overrides_lookup_only() {
        let ip = "127.0.0.1".parse::<IpAddr>().unwrap();
        let conf = Conf::create_with_port("name.invalid", 25570).with_connect_ip(ip);
        let addrs = conf.to_socket_addrs().unwrap().collect::<Vec<_>>();

        assert_eq!(addrs, vec![SocketAddr::new(ip, 25570)]);
        assert_eq!(conf.host, "name.invalid");
        assert_eq!(conf.to_string(), "name.invalid:25570");
    }
}
