//! Gateway process: binds a TCP listener, frames inbound wire requests
//! per connection, sequences them through to the matching engine, and
//! writes wire responses back to the originating socket.
//!
//! The socket layer here (accept loop, per-connection read loop) is
//! intentionally the simplest thing that works — a reader thread per
//! connection feeding a channel that the single gateway thread drains,
//! since socket I/O itself is an external collaborator, not part of the
//! core this crate specifies. `Gateway` is not `Sync`: exactly one
//! thread ever calls into it, matching the single-writer rule the
//! matching engine itself follows.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use lob_core::gateway::{CycleBoundary, FrameSource, SocketId};
use lob_core::wire::WireClientRequest;
use lob_core::{Engine, Gateway, GatewayConfig};

const REQUEST_FRAME_LEN: usize = std::mem::size_of::<WireClientRequest>();

enum GatewayEvent {
    Connected(SocketId),
    Frame { socket_id: SocketId, rx_time_ns: u64, frame: Vec<u8> },
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the epoch")
        .as_nanos() as u64
}

fn read_connection(socket_id: SocketId, mut stream: TcpStream, events: mpsc::Sender<GatewayEvent>) {
    let mut buf = vec![0u8; REQUEST_FRAME_LEN];
    loop {
        match stream.read_exact(&mut buf) {
            Ok(()) => {
                let sent = events.send(GatewayEvent::Frame {
                    socket_id,
                    rx_time_ns: now_ns(),
                    frame: buf.clone(),
                });
                if sent.is_err() {
                    break; // gateway thread has shut down
                }
            }
            Err(_) => break, // connection closed or malformed stream; stop servicing it
        }
    }
}

fn accept_loop(listener: TcpListener, sockets: Arc<Mutex<HashMap<SocketId, TcpStream>>>, events: mpsc::Sender<GatewayEvent>) {
    let mut next_socket_id: SocketId = 1;
    for incoming in listener.incoming() {
        let Ok(stream) = incoming else { continue };
        let socket_id = next_socket_id;
        next_socket_id += 1;

        let reader = match stream.try_clone() {
            Ok(s) => s,
            Err(err) => {
                tracing::warn!(error = %err, "gateway: failed to clone accepted stream, dropping connection");
                continue;
            }
        };
        sockets.lock().unwrap().insert(socket_id, stream);
        if events.send(GatewayEvent::Connected(socket_id)).is_err() {
            break;
        }

        let tx = events.clone();
        std::thread::Builder::new()
            .name(format!("gateway-conn-{socket_id}"))
            .spawn(move || read_connection(socket_id, reader, tx))
            .expect("gateway: failed to spawn per-connection reader thread");
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let config = GatewayConfig::parse();
    tracing::info!(bind_address = %config.bind_address, port = config.port, tickers = ?config.tickers, "gateway: starting up");

    let engine = Engine::new(&config.tickers, |t| config.book_config(t), config.engine_config());
    let inbound = engine.inbound_queue();
    let responses = engine.responses_queue();
    let run = Arc::new(AtomicBool::new(true));
    let matcher_handle = engine.run(Arc::clone(&run), config.pin_matcher_to_core);

    let listener = TcpListener::bind((config.bind_address.as_str(), config.port))
        .unwrap_or_else(|e| panic!("gateway: failed to bind {}:{}: {e}", config.bind_address, config.port));
    tracing::info!("gateway: listening on {}:{}", config.bind_address, config.port);

    let sockets: Arc<Mutex<HashMap<SocketId, TcpStream>>> = Arc::new(Mutex::new(HashMap::new()));
    let (event_tx, event_rx) = mpsc::channel::<GatewayEvent>();

    {
        let sockets = Arc::clone(&sockets);
        std::thread::Builder::new()
            .name("gateway-accept".into())
            .spawn(move || accept_loop(listener, sockets, event_tx))
            .expect("gateway: failed to spawn accept thread");
    }

    // The gateway thread is the sole owner of `Gateway`: it drains
    // framed requests from every connection, hands them to the
    // sequencer at each cycle boundary, and writes matcher responses
    // back out. No other thread touches `gateway` or `responses`.
    let mut gateway = Gateway::new(inbound);
    while run.load(Ordering::Acquire) {
        let mut drained_any = false;
        while let Ok(event) = event_rx.try_recv() {
            drained_any = true;
            match event {
                GatewayEvent::Connected(socket_id) => {
                    tracing::info!(socket_id, "gateway: accepted connection");
                }
                GatewayEvent::Frame { socket_id, rx_time_ns, frame } => {
                    gateway.on_frame(socket_id, rx_time_ns, &frame);
                }
            }
        }
        if drained_any {
            gateway.on_cycle_end();
        }

        while let Some((socket_id, bytes)) = gateway.next_outbound_frame(&responses) {
            let mut sockets = sockets.lock().unwrap();
            if let Some(stream) = sockets.get_mut(&socket_id) {
                if let Err(err) = stream.write_all(&bytes) {
                    tracing::warn!(socket_id, error = %err, "gateway: failed to write outbound frame");
                }
            }
        }

        if !drained_any {
            std::hint::spin_loop();
        }
    }

    let _ = matcher_handle.join();
}
