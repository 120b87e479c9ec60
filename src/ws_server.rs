//! Websocket feed of laser frames for the browser simulator.

use crate::laser_output::LaserFrame;

use anyhow::{anyhow, Result};
use futures_util::SinkExt;
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::{Receiver, Sender};
use warp::{ws::WebSocket, Filter};

/// Frames buffered per client before the slowest ones start dropping them
const CHANNEL_DEPTH: usize = 32;

pub type FrameSender = Arc<Mutex<Sender<LaserFrame>>>;

/// The packet format we send to the websocket client
#[derive(Serialize)]
struct SimPacket<'a> {
    samples: &'a LaserFrame,
}

pub fn start_server(port: u16) -> Result<FrameSender> {
    let (tx, _rx) = broadcast::channel(CHANNEL_DEPTH);

    // Wrap up a tokio Sender so it can live forever
    let wrapped_tx: FrameSender = Arc::new(Mutex::new(tx));
    let wrapped_tx2 = wrapped_tx.clone();
    // Make a new warp filter which provides our state - a tokio sender from
    // which we can spawn more receivers.
    let wrapped_tx_filter = warp::any().map(move || wrapped_tx2.clone());

    let runtime = tokio::runtime::Runtime::new()?;
    std::thread::Builder::new()
        .name("SIERPINSKI WS".into())
        .spawn(move || {
            let routes = warp::path("ws")
                // The `ws()` filter will prepare the Websocket handshake.
                .and(warp::ws())
                .and(wrapped_tx_filter)
                .map(|ws: warp::ws::Ws, tx: FrameSender| {
                    debug!("Got connection to WS route, trying to upgrade...");
                    let rx = tx.lock().ok().map(|tx| tx.subscribe());
                    ws.on_upgrade(move |socket| async move {
                        match rx {
                            Some(rx) => user_connected(socket, rx).await,
                            None => warn!("Frame sender poisoned, dropping client"),
                        }
                    })
                });

            info!("Starting websocket listener on port {}", port);
            runtime.block_on(warp::serve(routes).run(([0, 0, 0, 0], port)));
        })?;
    Ok(wrapped_tx)
}

async fn user_connected(mut ws: WebSocket, mut rx: Receiver<LaserFrame>) {
    info!("New simulator client connected.");

    loop {
        // Wait for a frame
        let frame = match rx.recv().await {
            Ok(frame) => frame,
            Err(RecvError::Lagged(missed)) => {
                debug!("Simulator client lagging, skipped {} frames", missed);
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        // Build packet
        let packet_json = match serde_json::to_string(&SimPacket { samples: &frame }) {
            Ok(json) => json,
            Err(e) => {
                warn!("Couldn't encode frame: {}", e);
                continue;
            }
        };
        let message = warp::ws::Message::text(packet_json);

        // Send the WS packet to the client
        if ws.send(message).await.is_err() {
            warn!("Simulator client disconnected.");
            break;
        }
    }
}

/// Pass a frame to every connected client.  Having no clients is fine.
pub fn laser_update(tx: &FrameSender, frame: &LaserFrame) -> Result<()> {
    let tx = tx.lock().map_err(|_| anyhow!("Frame sender poisoned"))?;
    if tx.receiver_count() > 0 {
        tx.send(frame.clone())?;
    }
    Ok(())
}
