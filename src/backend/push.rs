use std::io::ErrorKind;
use std::net::TcpStream;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use crate::engine::{ChannelSignal, ReconnectPolicy};

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

const POLL_INTERVAL: Duration = Duration::from_millis(500);
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

enum Exit {
    Closed,
    ReceiverGone,
}

/// Connects to the push channel on a worker thread. Text frames are forwarded as-is;
/// parsing happens on the UI side.
pub fn spawn_push_worker(url: String, policy: ReconnectPolicy) -> Receiver<ChannelSignal> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || run(&url, policy, &tx));
    rx
}

fn run(url: &str, mut policy: ReconnectPolicy, tx: &Sender<ChannelSignal>) {
    loop {
        match tungstenite::connect(url) {
            Ok((mut socket, _)) => {
                info!(url, "push channel connected");
                policy.on_open();
                if tx.send(ChannelSignal::Opened).is_err() {
                    return;
                }
                set_poll_timeout(&socket);
                if let Exit::ReceiverGone = pump(&mut socket, tx) {
                    let _ = socket.close(None);
                    return;
                }
            }
            Err(error) => warn!(%error, url, "push channel connect failed"),
        }

        match policy.on_close() {
            Some(delay) => {
                let signal = ChannelSignal::Retrying {
                    attempt: policy.attempts_made(),
                    delay,
                };
                if tx.send(signal).is_err() {
                    return;
                }
                thread::sleep(delay);
            }
            None => {
                let _ = tx.send(ChannelSignal::GaveUp);
                return;
            }
        }
    }
}

fn pump(socket: &mut Socket, tx: &Sender<ChannelSignal>) -> Exit {
    let mut last_ping = Instant::now();
    loop {
        match socket.read() {
            Ok(Message::Text(text)) => {
                if tx.send(ChannelSignal::Frame(text)).is_err() {
                    return Exit::ReceiverGone;
                }
            }
            Ok(Message::Close(_)) => return Exit::Closed,
            Ok(_) => {}
            Err(tungstenite::Error::Io(error))
                if matches!(error.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(error) => {
                debug!(%error, "push channel dropped");
                return Exit::Closed;
            }
        }

        if last_ping.elapsed() >= HEARTBEAT_INTERVAL {
            if let Err(error) = socket.send(Message::Text("ping".to_owned())) {
                debug!(%error, "push heartbeat failed");
                return Exit::Closed;
            }
            last_ping = Instant::now();
        }
    }
}

fn set_poll_timeout(socket: &Socket) {
    let stream = match socket.get_ref() {
        MaybeTlsStream::Plain(stream) => stream,
        MaybeTlsStream::Rustls(tls) => tls.get_ref(),
        _ => return,
    };
    if let Err(error) = stream.set_read_timeout(Some(POLL_INTERVAL)) {
        warn!(%error, "failed to set push channel read timeout");
    }
}
