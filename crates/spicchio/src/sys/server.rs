use crate::events::AppEvent;
use crate::protocol::{self, Command};
use crate::sys::runtime::Clock;
use async_channel::Sender;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

pub async fn run_server(socket: PathBuf, tx: Sender<AppEvent>, clock: Clock) {
    // Cleanup old socket if it exists
    if fs_err::metadata(&socket).is_ok() {
        let _ = fs_err::remove_file(&socket);
    }

    let listener = match UnixListener::bind(&socket) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket {}: {}", socket.display(), e);
            return;
        }
    };
    log::info!("Listening on {}", socket.display());

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = serve(stream, tx, clock).await {
                        log::debug!("Client went away: {}", e);
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// One reply line per command: `ok`, `error: ...`, or the frame JSON.
async fn serve(stream: UnixStream, tx: Sender<AppEvent>, clock: Clock) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = match protocol::parse(&line) {
            Ok(Command::Frame) => request_frame(&tx).await,
            Ok(command) => match command.into_event(clock.now_ms()) {
                Some(event) => match tx.send(event).await {
                    Ok(()) => "ok".to_string(),
                    Err(_) => "error: launcher is shutting down".to_string(),
                },
                None => "ok".to_string(),
            },
            Err(e) => {
                log::warn!("Bad command '{}': {}", line.trim(), e);
                format!("error: {}", e)
            }
        };
        writer.write_all(reply.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    Ok(())
}

async fn request_frame(tx: &Sender<AppEvent>) -> String {
    let (reply_tx, reply_rx) = async_channel::bounded(1);
    if tx.send(AppEvent::Frame(reply_tx)).await.is_err() {
        return "error: launcher is shutting down".to_string();
    }
    reply_rx
        .recv()
        .await
        .unwrap_or_else(|_| "error: no frame".to_string())
}
