use framecast_core::config::Config;
use framecast_core::error::AppError;
use framecast_core::wire::{decode_nack, encode};
use framecast_core::{fragment, Clock, RetransmitStore, SystemClock};
use framecast_log::FramecastLogger;
use log::{debug, error, info, warn, Level};
use std::io::ErrorKind;
use std::net::UdpSocket;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug)]
struct Args {
    config: Option<PathBuf>,
    destination: Option<(String, u16)>,
    image_path: Option<PathBuf>,
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
    match positional.len() {
        0 => Ok(Args {
            config,
            destination: None,
            image_path: None,
        }),
        3 => {
            let destination_port = positional[1]
                .parse::<u16>()
                .map_err(|e| format!("invalid destination_port: {e}"))?;
            Ok(Args {
                config,
                destination: Some((positional[0].clone(), destination_port)),
                image_path: Some(PathBuf::from(&positional[2])),
            })
        }
        _ => Err(
            "usage: framecast-sender [--config PATH] [<destination_ip> <destination_port> <image_path>]"
                .to_string(),
        ),
    }
}

fn poll_and_resend(socket: &UdpSocket, store: &RetransmitStore, retransmits: &mut u32) {
    let mut buf = [0u8; 16];
    loop {
        match socket.recv_from(&mut buf) {
            Ok((len, peer)) => match decode_nack(&buf[..len]) {
                Ok(nack) => {
                    if let Some(packet) = store.lookup(nack.seq_start) {
                        if let Err(e) = socket.send_to(packet, peer) {
                            warn!("failed to resend seq {}: {e}", nack.seq_start);
                        } else {
                            *retransmits += 1;
                            debug!("resent seq {} to {peer}", nack.seq_start);
                        }
                    } else {
                        debug!("NACK for seq {} has already aged out of the store", nack.seq_start);
                    }
                }
                Err(e) => debug!("dropped malformed NACK from {peer}: {e}"),
            },
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => break,
            Err(e) => {
                warn!("NACK poll failed: {e}");
                break;
            }
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let config_path = args.config.unwrap_or_else(|| PathBuf::from("framecast.toml"));
    let config = Config::load_or_default(&config_path)?;

    // CLI positionals win over the config file's `network` section;
    // absent both, there's nothing to stream to.
    let (destination_ip, destination_port) = match args.destination {
        Some((ip, port)) => (ip, port),
        None => {
            let addr = config.network.destination_addr.clone().ok_or_else(|| {
                AppError::InvalidAddress(
                    "no destination given on the command line or in network.destination_addr"
                        .into(),
                )
            })?;
            let (ip, port) = addr
                .rsplit_once(':')
                .ok_or_else(|| AppError::InvalidAddress(addr.clone()))?;
            let port = port
                .parse::<u16>()
                .map_err(|_| AppError::InvalidAddress(addr.clone()))?;
            (ip.to_string(), port)
        }
    };
    let image_path = match args.image_path {
        Some(path) => path,
        None => PathBuf::from(config.network.image_path.clone().ok_or_else(|| {
            AppError::InvalidAddress(
                "no image path given on the command line or in network.image_path".into(),
            )
        })?),
    };

    let image = std::fs::read(&image_path).map_err(|source| AppError::ImageOpen {
        path: image_path.clone(),
        source,
    })?;

    let dest = format!("{destination_ip}:{destination_port}");
    let dest_addr = dest
        .parse()
        .map_err(|_| AppError::InvalidAddress(dest.clone()))?;

    let socket = UdpSocket::bind("0.0.0.0:0").map_err(|source| AppError::Bind {
        addr: "0.0.0.0:0".parse().unwrap(),
        source,
    })?;
    socket
        .set_read_timeout(Some(Duration::from_millis(config.network.bind_timeout_ms)))
        .map_err(AppError::SocketConfig)?;
    info!("framecast-sender streaming {} to {dest}", image_path.display());

    let clock = SystemClock::new();
    let mut store = RetransmitStore::new(config.tuning.max_stored_packets);
    let mut retransmits = 0u32;
    let mut next_seq: u16 = 0;

    // One pass per frame, looping forever the way the original C
    // server's `while (1)` re-streams the same image with a fresh
    // timestamp each time; sequence numbers never reset (spec §4.8).
    loop {
        let ts = clock.now_ms() as u32;
        let chunks = fragment(&image, config.tuning.chunk_size, next_seq);
        for chunk in &chunks {
            let packet = encode(
                chunk.seq,
                ts,
                framecast_core::constants::DEFAULT_SSRC,
                chunk.marker,
                chunk.payload,
            )
            .expect("fragment payload never exceeds MAX_PAYLOAD_SIZE");
            store.store(chunk.seq, &packet);
            socket
                .send_to(&packet, dest_addr)
                .map_err(AppError::SocketConfig)?;
            std::thread::sleep(Duration::from_millis(1));
            poll_and_resend(&socket, &store, &mut retransmits);
        }
        next_seq = chunks
            .last()
            .map(|c| c.seq.wrapping_add(1))
            .unwrap_or(next_seq);

        info!(
            "sent {} fragments ({} bytes), entering {} ms tail-drain window",
            chunks.len(),
            image.len(),
            config.tuning.wait_nack_ms
        );

        let deadline = clock.now_ms() + config.tuning.wait_nack_ms;
        while clock.now_ms() < deadline {
            poll_and_resend(&socket, &store, &mut retransmits);
            std::thread::sleep(Duration::from_millis(config.tuning.gap_wait_nack_ms));
        }

        info!("tail-drain complete, {retransmits} retransmission(s) served so far");
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
