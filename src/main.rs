use clap::Parser;
use env_logger::Env;
use log::warn;
use mc_discovery::{
    is_valid_address_syntax, resolve_to_ipv4, Conf, DiscoveryErr, ErrorKind, DEFAULT_PORT,
};
use std::{net::IpAddr, process::ExitCode, time::Duration};

/// Print the status of a Minecraft Java Edition server.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Server IP address or domain name
    host: String,
    /// Server port
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
    /// Timeout for the whole probe, in milliseconds
    #[clap(short, long, default_value = "5000")]
    timeout: u64,
    /// Resolve the host to an IPv4 address and connect to it, the handshake
    /// and output keep the host as given
    #[clap(long)]
    resolve: bool,
    /// Strip formatting codes from the printed MOTD
    #[clap(long)]
    plain: bool,
    /// Log connection details
    #[clap(short, long)]
    verbose: bool,
}

fn run(args: &Args) -> Result<(), DiscoveryErr> {
    if !is_valid_address_syntax(&args.host) {
        warn!("{} does not look like an IPv4 address or hostname", args.host);
    }

    let mut conf = Conf::create_with_port(&args.host, args.port)
        .with_timeout(Duration::from_millis(args.timeout));

    if args.resolve {
        conf = conf.with_connect_ip(IpAddr::V4(resolve_to_ipv4(&args.host)?));
    }

    let mut status = conf.get_server_status()?;

    if args.plain {
        status.motd = status.plain_motd();
    }

    println!("{}", status);

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let filter = if args.verbose { "debug" } else { "warn" };

    env_logger::init_from_env(Env::default().default_filter_or(filter));

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let reason = match err.kind() {
                ErrorKind::ConnectionFailed | ErrorKind::Timeout => "server unreachable",
                ErrorKind::ProtocolViolation => {
                    "not a Minecraft server or incompatible protocol"
                }
                ErrorKind::ResolutionFailed => "could not resolve address",
            };

            eprintln!("{}: {} ({})", args.host, reason, err);
            ExitCode::FAILURE
        }
    }
}
