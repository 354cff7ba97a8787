use crate::{conf::Conf, DiscoveryErr};
use log::{debug, warn};
use std::{
    net::{SocketAddr, TcpStream, ToSocketAddrs},
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

/// Time left until `deadline`, or [DiscoveryErr::Timeout] once it has passed.
pub fn remaining_budget(deadline: Instant, budget: Duration) -> Result<Duration, DiscoveryErr> {
    let now = Instant::now();

    if now >= deadline {
        return Err(DiscoveryErr::Timeout(budget));
    }

    Ok(deadline - now)
}

/// Run a blocking address lookup, giving up once `deadline` passes.
///
/// The OS resolver cannot be interrupted, so the lookup runs on its own thread
/// and is abandoned on timeout; its result is dropped when it finishes.
pub fn lookup_before_deadline<F>(
    lookup: F,
    deadline: Instant,
    budget: Duration,
) -> Result<Vec<SocketAddr>, DiscoveryErr>
where
    F: FnOnce() -> std::io::Result<Vec<SocketAddr>> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let _ = tx.send(lookup());
    });

    match rx.recv_timeout(remaining_budget(deadline, budget)?) {
        Ok(addrs) => Ok(addrs?),
        Err(mpsc::RecvTimeoutError::Timeout) => Err(DiscoveryErr::Timeout(budget)),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(DiscoveryErr::ConnectionFailed(std::io::Error::new(
                std::io::ErrorKind::Other,
                "address lookup ended without a result",
            )))
        }
    }
}

/// Connect to the configured server before `deadline`.
///
/// Name lookup and every connection attempt share the deadline. Every
/// resolved address is tried in order, each attempt bounded by the time
/// left. Lookup failures and refused connections are reported as
/// [DiscoveryErr::ConnectionFailed], running out of time as [DiscoveryErr::Timeout].
pub fn create_tcp_socket(conf: &Conf, deadline: Instant) -> Result<TcpStream, DiscoveryErr> {
    let budget = conf.socket_conf.timeout;
    let target = conf.clone();
    let addrs = lookup_before_deadline(
        move || target.to_socket_addrs().map(|addrs| addrs.collect()),
        deadline,
        budget,
    )?;
    let mut last_err = None;

    if addrs.is_empty() {
        return Err(DiscoveryErr::ConnectionFailed(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} did not resolve to any address", conf),
        )));
    }

    for addr in addrs {
        debug!("{}: connecting to {}", conf, addr);

        match TcpStream::connect_timeout(&addr, remaining_budget(deadline, budget)?) {
            Ok(socket) => {
                socket.set_nodelay(true)?;
                return Ok(socket);
            }
            Err(err) if err.kind() == std::io::ErrorKind::TimedOut => {
                last_err = Some(DiscoveryErr::Timeout(budget));
            }
            Err(err) => {
                warn!("{}: connecting to {} failed: {}", conf, addr, err);
                last_err = Some(DiscoveryErr::ConnectionFailed(err));
            }
        }
    }

    Err(last_err.unwrap_or(DiscoveryErr::Timeout(budget)))
}
