use crate::client::ClientCommand;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::manager::{ClientEvent, PeerSessionManager};
use crate::media::{MediaCapture, MediaError, MediaHandle};
use crate::transport::{TransportEvent, TransportFactory};
use futures::{SinkExt, StreamExt};
use huddle_core::{ClientMessage, MediaKind, ServerMessage};
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum MediaResult {
    Camera(Result<MediaHandle, MediaError>),
    Screen(Result<MediaHandle, MediaError>),
}

enum ConnectionEnd {
    Left,
    Lost,
}

/// Application side of a running client.
pub struct MeetingHandle {
    commands: mpsc::UnboundedSender<ClientCommand>,
    events: mpsc::UnboundedReceiver<ClientEvent>,
}

impl MeetingHandle {
    /// Returns false once the client has stopped.
    pub fn send(&self, command: ClientCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn commands(&self) -> mpsc::UnboundedSender<ClientCommand> {
        self.commands.clone()
    }

    pub async fn next_event(&mut self) -> Option<ClientEvent> {
        self.events.recv().await
    }
}

/// Connects to the signaling server, joins the configured room and keeps the
/// session manager fed until the user leaves. Lost connections are retried
/// after `reconnect_delay`.
pub struct MeetingClient {
    config: ClientConfig,
    capture: Arc<dyn MediaCapture>,
    factory: Arc<dyn TransportFactory>,
    events: mpsc::UnboundedSender<ClientEvent>,
    commands: mpsc::UnboundedReceiver<ClientCommand>,
}

impl MeetingClient {
    pub fn new(
        config: ClientConfig,
        capture: Arc<dyn MediaCapture>,
        factory: Arc<dyn TransportFactory>,
    ) -> (Self, MeetingHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let client = Self {
            config,
            capture,
            factory,
            events: event_tx,
            commands: command_rx,
        };
        let handle = MeetingHandle {
            commands: command_tx,
            events: event_rx,
        };
        (client, handle)
    }

    pub async fn run(self) -> Result<()> {
        let MeetingClient {
            config,
            capture,
            factory,
            events,
            mut commands,
        } = self;

        let (signal_tx, mut signal_rx) = mpsc::unbounded_channel::<ClientMessage>();
        let (mut manager, mut transport_rx) =
            PeerSessionManager::new(config.clone(), factory, Arc::new(signal_tx), events);
        let (media_tx, mut media_rx) = mpsc::unbounded_channel();

        // Signaling proceeds while the user answers the permission prompt.
        spawn_capture(&capture, MediaKind::Camera, &media_tx);

        let mut failed_attempts = 0u32;
        loop {
            match connect_async(config.signaling_url.as_str()).await {
                Ok((ws, _)) => {
                    info!("Connected to {}", config.signaling_url);
                    failed_attempts = 0;
                    // Queued messages addressed the previous connection's peers.
                    while signal_rx.try_recv().is_ok() {}

                    let mut conn = Connection {
                        manager: &mut manager,
                        capture: &capture,
                        media_tx: &media_tx,
                    };
                    let ended = conn
                        .run(
                            ws,
                            &mut signal_rx,
                            &mut transport_rx,
                            &mut media_rx,
                            &mut commands,
                        )
                        .await;
                    match ended {
                        Ok(ConnectionEnd::Left) => return Ok(()),
                        Ok(ConnectionEnd::Lost) => warn!("Signaling connection closed"),
                        Err(e) => warn!("Signaling connection failed: {}", e),
                    }
                    manager.signaling_lost();
                }
                Err(e) => {
                    failed_attempts += 1;
                    warn!(
                        "Could not reach {} ({}), attempt {}",
                        config.signaling_url, e, failed_attempts
                    );
                    if config
                        .max_reconnect_attempts
                        .is_some_and(|max| failed_attempts > max)
                    {
                        return Err(ClientError::ReconnectExhausted(failed_attempts));
                    }
                }
            }

            // Keep serving local actions while waiting to reconnect.
            let wait = sleep(config.reconnect_delay);
            tokio::pin!(wait);
            loop {
                tokio::select! {
                    _ = &mut wait => break,
                    Some(event) = transport_rx.recv() => manager.handle_transport_event(event).await,
                    Some(result) = media_rx.recv() => apply_media(&mut manager, result).await,
                    cmd = commands.recv() => {
                        let flow = handle_command(cmd, &mut manager, &capture, &media_tx).await;
                        if flow.is_break() {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

struct Connection<'a> {
    manager: &'a mut PeerSessionManager,
    capture: &'a Arc<dyn MediaCapture>,
    media_tx: &'a mpsc::UnboundedSender<MediaResult>,
}

impl Connection<'_> {
    async fn run(
        &mut self,
        ws: WsStream,
        signal_rx: &mut mpsc::UnboundedReceiver<ClientMessage>,
        transport_rx: &mut mpsc::UnboundedReceiver<TransportEvent>,
        media_rx: &mut mpsc::UnboundedReceiver<MediaResult>,
        commands: &mut mpsc::UnboundedReceiver<ClientCommand>,
    ) -> Result<ConnectionEnd> {
        let (mut sink, mut stream) = ws.split();

        loop {
            tokio::select! {
                msg = stream.next() => {
                    let Some(msg) = msg else {
                        return Ok(ConnectionEnd::Lost);
                    };
                    match msg? {
                        Message::Text(text) => {
                            match serde_json::from_str::<ServerMessage>(text.as_str()) {
                                Ok(msg) => self.manager.handle_signal(msg).await,
                                Err(e) => warn!("Ignoring unparseable signaling message: {}", e),
                            }
                        }
                        Message::Close(_) => return Ok(ConnectionEnd::Lost),
                        _ => {}
                    }
                }
                Some(out) = signal_rx.recv() => {
                    let json = serde_json::to_string(&out)?;
                    debug!("WS OUT: {}", json);
                    sink.send(Message::Text(json.into())).await?;
                }
                Some(event) = transport_rx.recv() => {
                    self.manager.handle_transport_event(event).await;
                }
                Some(result) = media_rx.recv() => apply_media(self.manager, result).await,
                cmd = commands.recv() => {
                    let flow = handle_command(cmd, self.manager, self.capture, self.media_tx).await;
                    if flow.is_break() {
                        while let Ok(out) = signal_rx.try_recv() {
                            let json = serde_json::to_string(&out)?;
                            sink.send(Message::Text(json.into())).await?;
                        }
                        let _ = sink.close().await;
                        return Ok(ConnectionEnd::Left);
                    }
                }
            }
        }
    }
}

async fn handle_command(
    cmd: Option<ClientCommand>,
    manager: &mut PeerSessionManager,
    capture: &Arc<dyn MediaCapture>,
    media_tx: &mpsc::UnboundedSender<MediaResult>,
) -> ControlFlow<()> {
    match cmd {
        None | Some(ClientCommand::Leave) => {
            manager.leave().await;
            return ControlFlow::Break(());
        }
        Some(ClientCommand::StartScreenShare) => {
            if !manager.is_sharing_screen() {
                spawn_capture(capture, MediaKind::Screen, media_tx);
            }
        }
        Some(ClientCommand::StopScreenShare) => manager.stop_screen_share().await,
        Some(ClientCommand::ToggleAudio) => {
            manager.toggle_audio();
        }
        Some(ClientCommand::ToggleVideo) => {
            manager.toggle_video();
        }
        Some(ClientCommand::RequestSync) => manager.request_sync().await,
    }
    ControlFlow::Continue(())
}

async fn apply_media(manager: &mut PeerSessionManager, result: MediaResult) {
    match result {
        MediaResult::Camera(Ok(media)) => manager.local_media_ready(media).await,
        MediaResult::Camera(Err(e)) => manager.local_media_failed(e).await,
        MediaResult::Screen(Ok(media)) => manager.start_screen_share(media).await,
        MediaResult::Screen(Err(e)) => manager.screen_share_failed(e),
    }
}

fn spawn_capture(
    capture: &Arc<dyn MediaCapture>,
    kind: MediaKind,
    media_tx: &mpsc::UnboundedSender<MediaResult>,
) {
    let capture = capture.clone();
    let media_tx = media_tx.clone();
    tokio::spawn(async move {
        let result = match kind {
            MediaKind::Camera => MediaResult::Camera(capture.acquire_camera_and_mic().await),
            MediaKind::Screen => MediaResult::Screen(capture.acquire_screen_capture().await),
        };
        let _ = media_tx.send(result);
    });
}
