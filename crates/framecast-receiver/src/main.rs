use framecast_core::config::Config;
use framecast_core::error::AppError;
use framecast_core::wire::{decode, encode_nack};
use framecast_core::{ReceivePipeline, SystemClock};
use framecast_log::FramecastLogger;
use log::{debug, error, info, warn, Level};
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug)]
struct Args {
    config: Option<PathBuf>,
    listen_port: Option<u16>,
}

fn parse_args() -> Result<Args, String> {
    let mut config = None;
    let mut positional = Vec::new();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        if arg == "--config" {
            let path = it.next().ok_or("--config requires a path argument")?;
            config = Some(PathBuf::from(path));
        } else {
            positional.push(arg);
        }
    }
    let listen_port = match positional.first() {
        Some(port) => Some(
            port.parse::<u16>()
                .map_err(|e| format!("invalid listen_port: {e}"))?,
        ),
        None => None,
    };
    Ok(Args {
        config,
        listen_port,
    })
}

fn run(args: Args) -> Result<(), AppError> {
    let config_path = args.config.unwrap_or_else(|| PathBuf::from("framecast.toml"));
    let config = Config::load_or_default(&config_path)?;

    // A CLI positional port wins over the config file's `listen_addr`;
    // absent both, fall back to the spec's default port.
    let addr = match args.listen_port {
        Some(port) => format!("0.0.0.0:{port}"),
        None => config
            .network
            .listen_addr
            .clone()
            .unwrap_or_else(|| format!("0.0.0.0:{}", framecast_core::constants::DEFAULT_PORT)),
    };
    let addr_parsed: SocketAddr = addr
        .parse()
        .map_err(|_| AppError::InvalidAddress(addr.clone()))?;
    let socket = UdpSocket::bind(&addr).map_err(|source| AppError::Bind {
        addr: addr_parsed,
        source,
    })?;
    socket
        .set_read_timeout(Some(Duration::from_millis(config.network.bind_timeout_ms)))
        .map_err(AppError::SocketConfig)?;
    info!("framecast-receiver listening on {addr}");

    let frames_dir = Path::new("frames");
    std::fs::create_dir_all(frames_dir).map_err(|source| AppError::OutputDir {
        path: frames_dir.to_path_buf(),
        source,
    })?;

    let mut pipeline = ReceivePipeline::new(SystemClock::new(), &config.tuning);
    let mut recv_buf = vec![0u8; framecast_core::constants::MAX_PACKET_SIZE];
    let mut nacks = Vec::new();
    let mut frame_count = 0u32;
    let mut last_peer: Option<SocketAddr> = None;

    loop {
        match socket.recv_from(&mut recv_buf) {
            Ok((len, peer)) => {
                last_peer = Some(peer);
                match decode(&recv_buf[..len]) {
                    Ok(packet) => {
                        if let Err(e) = pipeline.on_packet_arrival(
                            packet.header,
                            packet.payload,
                            len,
                            &mut nacks,
                        ) {
                            debug!("dropping packet from {peer}: {e}");
                        }
                        for seq in nacks.drain(..) {
                            let nack = encode_nack(seq, 1);
                            if let Err(e) = socket.send_to(&nack, peer) {
                                warn!("failed to send NACK for seq {seq}: {e}");
                            }
                        }
                    }
                    Err(e) => debug!("dropped malformed packet from {peer}: {e}"),
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {}
            Err(e) => {
                error!("socket read failed: {e}");
                return Err(AppError::SocketConfig(e));
            }
        }

        pipeline.tick_nack(&mut nacks);
        for seq in nacks.drain(..) {
            match last_peer {
                Some(peer) => {
                    let nack = encode_nack(seq, 1);
                    if let Err(e) = socket.send_to(&nack, peer) {
                        warn!("failed to resend NACK retry for seq {seq}: {e}");
                    }
                }
                None => debug!("NACK retry for seq {seq} has no known peer yet"),
            }
        }

        if let Some(frame) = pipeline.tick_pipeline() {
            let path = frames_dir.join(format!("received_frame_{frame_count:04}.jpg"));
            match std::fs::write(&path, &frame) {
                Ok(()) => {
                    info!("wrote {} ({} bytes)", path.display(), frame.len());
                    frame_count += 1;
                }
                Err(e) => error!("failed to write {}: {e}", path.display()),
            }
            pipeline.stats().print_snapshot(pipeline.clock());
        }
    }
}

fn main() {
    FramecastLogger::init(Level::Info).expect("failed to install logger");

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(args) {
        error!("fatal: {e}");
        FramecastLogger::shutdown();
        std::process::exit(1);
    }
}
