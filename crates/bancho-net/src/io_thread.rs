// io_thread.rs — per-connection read/write loop
//
// Grounded on the teacher's `net_io_thread.rs` (dedicated thread per
// socket decoupling read from processing via a bounded channel) and
// `sv_user.rs`'s `SV_ExecuteClientMessage` (the read loop that pulls
// length-prefixed commands off a client and routes them to a handler
// table) — generalized here from a single connectionless UDP datagram
// read to a framed TCP stream with a handshake prologue (spec §4.2, §6).

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use bancho_common::error::HandlerError;
use bancho_protocol::decode::DecodedArgs;

use bancho_server::dispatcher::{Dispatch, Dispatcher};
use bancho_server::handlers::lobby::logout;
use bancho_server::login::handle_login;
use bancho_server::session::{Session, SessionState};
use bancho_server::ServerState;

use crate::listener::configure_stream;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(20);
const LOGIN_HANDLER_TIMEOUT: Duration = Duration::from_secs(15);
const LIVE_READ_TIMEOUT: Duration = Duration::from_secs(120);

/// Handles one accepted connection end to end: HTTP probe short-circuit,
/// the plaintext login handshake, then the framed `LIVE` read loop. Runs
/// entirely on the thread `main.rs` spawned for this socket.
pub fn handle_connection(mut stream: TcpStream, state: Arc<ServerState>, dispatcher: Arc<Dispatcher>) {
    if configure_stream(&stream).is_err() {
        return;
    }
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let _ = stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT));

    let mut buf = Vec::new();
    if !read_handshake_prefix(&mut stream, &mut buf, &state) {
        return;
    }

    let Some(split) = find_third_newline(&buf) else {
        let _ = stream.write_all(b"no.");
        return;
    };
    let raw_body = String::from_utf8_lossy(&buf[..split]).into_owned();
    let mut leftover = buf[split..].to_vec();

    let (outbound_tx, outbound_rx) = crossbeam::channel::unbounded::<Vec<u8>>();
    let session = Session::new(peer, outbound_tx);

    if !run_login_with_timeout(&state, &session, raw_body) {
        let _ = stream.write_all(b"no.");
        return;
    }

    let writer_stream = match stream.try_clone() {
        Ok(s) => s,
        Err(_) => return,
    };
    let writer = std::thread::spawn(move || writer_loop(writer_stream, outbound_rx));

    let _ = stream.set_read_timeout(Some(LIVE_READ_TIMEOUT));
    live_loop(&mut stream, &mut leftover, &state, &dispatcher, &session);

    session.set_state(SessionState::Closing);
    let _ = logout(&state, &session, DecodedArgs::Logout);
    drop(stream);
    let _ = writer.join();
}

/// Reads bytes until the first newline-or-GET decision can be made.
/// Returns `false` (and already responded) if this turned out to be the
/// static HTTP probe (spec §6 "HTTP probe").
fn read_handshake_prefix(stream: &mut TcpStream, buf: &mut Vec<u8>, state: &Arc<ServerState>) -> bool {
    let mut chunk = [0u8; 512];
    loop {
        if buf.starts_with(b"GET /") {
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\n\r\n{}",
                state.config.http_probe_body
            );
            let _ = stream.write_all(response.as_bytes());
            return false;
        }
        if find_third_newline(buf).is_some() {
            return true;
        }
        match stream.read(&mut chunk) {
            Ok(0) => return false,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock || e.kind() == std::io::ErrorKind::TimedOut => {
                let _ = stream.write_all(b"no.");
                return false;
            }
            Err(_) => return false,
        }
        if buf.len() > 8192 {
            let _ = stream.write_all(b"no.");
            return false;
        }
    }
}

fn find_third_newline(buf: &[u8]) -> Option<usize> {
    let mut seen = 0;
    for (i, &b) in buf.iter().enumerate() {
        if b == b'\n' {
            seen += 1;
            if seen == 3 {
                return Some(i + 1);
            }
        }
    }
    None
}

/// Runs `handle_login` on its own thread and waits up to
/// `LOGIN_HANDLER_TIMEOUT` for it (spec §5 "Login handler: 15 s soft
/// timeout"). This is a soft timeout only: the login thread isn't forcibly
/// cancelled, since nothing here owns an interruptible handle to it, but the
/// caller stops waiting and treats the connection as failed regardless.
fn run_login_with_timeout(state: &Arc<ServerState>, session: &Arc<Session>, raw_body: String) -> bool {
    let (done_tx, done_rx) = crossbeam::channel::bounded(1);
    let state = state.clone();
    let session = session.clone();
    std::thread::spawn(move || {
        let result = handle_login(&state, &session, &raw_body);
        let _ = done_tx.send(result.is_ok());
    });
    matches!(done_rx.recv_timeout(LOGIN_HANDLER_TIMEOUT), Ok(true))
}

fn writer_loop(mut stream: TcpStream, rx: crossbeam::channel::Receiver<Vec<u8>>) {
    while let Ok(frame) = rx.recv() {
        if stream.write_all(&frame).is_err() {
            break;
        }
    }
}

/// Reads framed packets for the remainder of the connection's life,
/// dispatching each to its handler per `Dispatch::{Inline,Worker}`
/// (spec §5, §9).
fn live_loop(
    stream: &mut TcpStream,
    buf: &mut Vec<u8>,
    state: &Arc<ServerState>,
    dispatcher: &Arc<Dispatcher>,
    session: &Arc<Session>,
) {
    let mut chunk = [0u8; 4096];
    loop {
        if session.state() == SessionState::Closing {
            return;
        }
        loop {
            let capabilities = session.table().capabilities;
            match bancho_protocol::frame::try_parse_frame(buf, capabilities) {
                Ok(Some(frame)) => dispatch_frame(state, dispatcher, session, frame.id, &frame.body),
                Ok(None) => break,
                Err(_) => return,
            }
        }
        match stream.read(&mut chunk) {
            Ok(0) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock || e.kind() == std::io::ErrorKind::TimedOut => {
                continue;
            }
            Err(_) => return,
        }
    }
}

fn dispatch_frame(
    state: &Arc<ServerState>,
    dispatcher: &Arc<Dispatcher>,
    session: &Arc<Session>,
    packet_id: u16,
    body: &[u8],
) {
    session.touch(bancho_server::time::unix_now());
    let Some((kind, args)) = session.decode(&state.protocol, packet_id, body) else {
        return;
    };
    let Some(entry) = dispatcher.get(kind) else {
        return;
    };
    match entry.dispatch {
        Dispatch::Inline => {
            if let Err(err) = (entry.handler)(state, session, args) {
                log_handler_error(session, err);
            }
        }
        Dispatch::Worker => {
            let state = state.clone();
            let session = session.clone();
            rayon::spawn(move || {
                if let Err(err) = (entry.handler)(&state, &session, args) {
                    log_handler_error(&session, err);
                }
            });
        }
    }
}

fn log_handler_error(session: &Session, err: HandlerError) {
    log::warn!("handler error for {}: {err}", session.username());
}
