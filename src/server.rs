// SPDX-FileCopyrightText: 2025 cowrite contributors
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The TCP transport: newline-delimited JSON frames per connection.
//!
//! Each connection gets a reader loop and a writer pump; error replies
//! and subscription fan-out both funnel through one outgoing channel so
//! frames never interleave on the wire.

use crate::actor::SubscriberId;
use crate::dispatcher::{Dispatcher, Subscription};
use crate::protocol::{
    ClientFrame, ClientMessage, DocumentId, ServerFrame, ServerMessage, UpdateReply,
};
use anyhow::{bail, Context, Result};
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::WriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::bytes::BytesMut;
use tokio_util::codec::{Encoder, FramedRead, FramedWrite, LinesCodec};
use tracing::{debug, info, warn};

pub type ClientWriter = FramedWrite<WriteHalf<TcpStream>, ServerMessageCodec>;

pub struct ServerMessageCodec;

impl Encoder<ServerMessage> for ServerMessageCodec {
    type Error = anyhow::Error;

    fn encode(&mut self, item: ServerMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = item.to_json()?;
        dst.extend_from_slice(format!("{payload}\n").as_bytes());
        Ok(())
    }
}

static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

/// Accepts connections forever.
pub async fn listen(port: u16, dispatcher: Arc<Dispatcher>) -> Result<()> {
    let listener = TcpListener::bind(format!("127.0.0.1:{port}"))
        .await
        .with_context(|| format!("Failed to bind TCP port {port}"))?;
    info!("Listening on TCP: 127.0.0.1:{port}");

    loop {
        let (stream, _addr) = listener.accept().await.context("Failed to accept")?;
        let subscriber = NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed);
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            info!("Client #{subscriber} connected");
            match handle_connection(stream, subscriber, &dispatcher).await {
                Ok(()) => info!("Client #{subscriber} disconnected"),
                Err(error) => warn!("Client #{subscriber} connection closed: {error:#}"),
            }
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    subscriber: SubscriberId,
    dispatcher: &Dispatcher,
) -> Result<()> {
    let (stream_read, stream_write) = tokio::io::split(stream);
    let mut reader = FramedRead::new(stream_read, LinesCodec::new());
    let mut writer: ClientWriter = FramedWrite::new(stream_write, ServerMessageCodec);

    let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<ServerMessage>(64);
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outgoing_rx.recv().await {
            if writer.send(message).await.is_err() {
                break;
            }
        }
    });

    // The subscriptions this connection holds; dropping one unsubscribes.
    let mut subscriptions: HashMap<DocumentId, Subscription> = HashMap::new();

    let result = async {
        while let Some(line) = reader.next().await {
            let line = line.context("Failed to read frame")?;
            let message = ClientMessage::from_json(&line)?;
            let Some(id) = DocumentId::from_topic(&message.topic) else {
                bail!("Unroutable topic: {}", message.topic);
            };

            match message.frame {
                ClientFrame::Join { user_id } => {
                    debug!(
                        "Client #{subscriber} joins {id} (user: {})",
                        user_id.as_deref().unwrap_or("anonymous")
                    );
                    let subscription =
                        dispatcher.join(&id, subscriber, outgoing_tx.clone()).await?;
                    // A re-join replaces the previous subscription.
                    subscriptions.insert(id, subscription);
                }
                ClientFrame::Update { version, change } => {
                    // Updates only make sense on a joined document; the
                    // ok ack arrives through the subscription stream.
                    let error_reply = if subscriptions.contains_key(&id) {
                        dispatcher.update(&id, subscriber, version, change).await
                    } else {
                        warn!("Client #{subscriber} sent an update for {id} without joining");
                        Some(UpdateReply::error("not_joined"))
                    };
                    if let Some(reply) = error_reply {
                        outgoing_tx
                            .send(ServerMessage::new(&id, ServerFrame::Reply(reply)))
                            .await
                            .context("Writer task went away")?;
                    }
                }
                ClientFrame::Leave => {
                    debug!("Client #{subscriber} leaves {id}");
                    subscriptions.remove(&id);
                }
            }
        }
        Ok(())
    }
    .await;

    drop(subscriptions);
    writer_task.abort();
    result
}
