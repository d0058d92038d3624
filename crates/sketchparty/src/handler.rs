//! Per-connection handler: event decoding and routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Derive the member id from the connection id
//!   2. Spawn a writer task that drains the member's outbound channel
//!   3. Loop: receive frames → decode `ClientEvent` → route to rooms
//!   4. On close, error, or idle timeout: leave the member's room
//!
//! The writer also pings on a fixed interval. A pong resets the idle
//! timer, so only a dead connection times out.

use std::sync::Arc;

use sketchparty_protocol::{ClientEvent, Codec, Member, MemberId, RoomId};
use sketchparty_room::{MemberSender, RoomAction, RoomError, ServerEvent};
use sketchparty_transport::{Frame, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::SketchError;
use crate::server::ServerState;

/// Drop guard that runs the disconnect flow when the handler exits.
///
/// `Drop` is synchronous, so the async leave runs in a spawned task.
struct DisconnectGuard<C: Codec> {
    member_id: MemberId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for DisconnectGuard<C> {
    fn drop(&mut self) {
        let member_id = self.member_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let left = state.rooms.lock().await.handle_disconnect(member_id).await;
            if let Some(room_id) = left {
                tracing::info!(member = %member_id, %room_id, "member disconnected from room");
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), SketchError>
where
    C: Codec + Clone,
{
    let conn_id = conn.id();
    let member_id = MemberId(conn_id.into_inner());
    tracing::debug!(%conn_id, member = %member_id, "handling new connection");

    let (mut writer, mut reader) = conn.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    let codec = state.codec.clone();
    let heartbeat = state.heartbeat_interval;
    let writer_task = tokio::spawn(async move {
        let mut ping = tokio::time::interval_at(Instant::now() + heartbeat, heartbeat);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                event = rx.recv() => {
                    let Some(event) = event else { break };
                    let text = match codec.encode(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::warn!(event = event.name(), error = %e, "failed to encode event");
                            continue;
                        }
                    };
                    if let Err(e) = writer.send_text(text).await {
                        tracing::debug!(error = %e, "send failed, stopping writer");
                        break;
                    }
                }
                _ = ping.tick() => {
                    if let Err(e) = writer.ping().await {
                        tracing::debug!(error = %e, "ping failed, stopping writer");
                        break;
                    }
                }
            }
        }
        let _ = writer.close().await;
    });

    let guard = DisconnectGuard {
        member_id,
        state: Arc::clone(&state),
    };

    loop {
        let data = match tokio::time::timeout(state.idle_timeout, reader.recv_frame()).await {
            Ok(Ok(Some(Frame::Data(data)))) => data,
            Ok(Ok(Some(Frame::Pong))) => {
                tracing::trace!(member = %member_id, "pong");
                continue;
            }
            Ok(Ok(None)) => {
                tracing::info!(member = %member_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(member = %member_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(member = %member_id, "connection timed out");
                break;
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(member = %member_id, error = %e, "failed to decode event");
                let err = SketchError::from(e);
                send_error(&tx, err.code(), err.to_string());
                continue;
            }
        };

        tracing::debug!(member = %member_id, event = event.name(), "event received");
        handle_event(&state, member_id, event, &tx).await;
    }

    // Leave the room first so nothing is queued for a closed socket.
    drop(guard);
    writer_task.abort();
    Ok(())
}

/// Routes one decoded event. Failures are reported to the sender only.
async fn handle_event<C: Codec>(
    state: &ServerState<C>,
    member_id: MemberId,
    event: ClientEvent,
    tx: &MemberSender,
) {
    let result = match event {
        ClientEvent::CreateRoom {
            username,
            avatar,
            total_rounds,
            max_drawings_per_round,
        } => {
            let member = Member::new(member_id, username, avatar);
            state
                .rooms
                .lock()
                .await
                .create_room(member, total_rounds, max_drawings_per_round, tx.clone())
                .map(|_| ())
        }

        ClientEvent::JoinRoom {
            room_id,
            username,
            avatar,
        } => {
            let member = Member::new(member_id, username, avatar);
            let result = state
                .rooms
                .lock()
                .await
                .join_room(&room_id, member, tx.clone())
                .await;
            match result {
                Ok(_) => Ok(()),
                Err(RoomError::NotFound(room_id)) => {
                    let message = format!("Room {room_id} does not exist.");
                    let _ = tx.send(ServerEvent::RoomNotFound { room_id, message });
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }

        ClientEvent::LeaveRoom { room_id } => {
            state.rooms.lock().await.leave_room(member_id, &room_id).await
        }

        ClientEvent::StopGame { room_id } => {
            state.rooms.lock().await.stop_game(member_id, &room_id).await
        }

        other => match room_action(other) {
            Some((room_id, action)) => {
                // Resolve the handle under the lock, await the room without it.
                let handle = state.rooms.lock().await.handle_for(member_id, &room_id);
                match handle {
                    Ok(handle) => handle.act(member_id, action).await,
                    Err(e) => Err(e),
                }
            }
            None => Ok(()),
        },
    };

    if let Err(e) = result {
        tracing::debug!(member = %member_id, error = %e, "request failed");
        send_error(tx, e.code(), e.to_string());
    }
}

/// Maps an in-room event to the room it targets and the action to apply.
/// Returns `None` for events the manager handles itself.
fn room_action(event: ClientEvent) -> Option<(RoomId, RoomAction)> {
    let routed = match event {
        ClientEvent::StartGame { room_id } => (room_id, RoomAction::StartGame),
        ClientEvent::ChooseDrawer {
            room_id,
            drawer,
            rotate,
        } => (room_id, RoomAction::ChooseDrawer { drawer, rotate }),
        ClientEvent::SelectWord { room_id, word } => (room_id, RoomAction::SelectWord { word }),
        ClientEvent::SubmitGuess {
            room_id,
            guessed_at_seconds,
        } => (room_id, RoomAction::SubmitGuess { guessed_at_seconds }),
        ClientEvent::RequestScoring { room_id } => (room_id, RoomAction::RequestScoring),
        ClientEvent::Draw {
            room_id,
            draw_options,
        } => (room_id, RoomAction::Draw { draw_options }),
        ClientEvent::ClearCanvas { room_id } => (room_id, RoomAction::ClearCanvas),
        ClientEvent::Undo {
            room_id,
            canvas_state,
        } => (room_id, RoomAction::Undo { canvas_state }),
        ClientEvent::PushUndoPoint {
            room_id,
            undo_point,
        } => (room_id, RoomAction::PushUndoPoint { undo_point }),
        ClientEvent::GetLastUndoPoint { room_id } => (room_id, RoomAction::GetLastUndoPoint),
        ClientEvent::DeleteLastUndoPoint { room_id } => {
            (room_id, RoomAction::DeleteLastUndoPoint)
        }
        ClientEvent::ClientReady { room_id } => (room_id, RoomAction::ClientReady),
        ClientEvent::SendCanvasState {
            room_id,
            canvas_state,
            requester,
        } => (
            room_id,
            RoomAction::SendCanvasState {
                canvas_state,
                requester,
            },
        ),
        ClientEvent::BroadcastMessage { room_id, message } => {
            (room_id, RoomAction::BroadcastMessage { message })
        }
        ClientEvent::CreateRoom { .. }
        | ClientEvent::JoinRoom { .. }
        | ClientEvent::LeaveRoom { .. }
        | ClientEvent::StopGame { .. } => return None,
    };
    Some(routed)
}

/// Queues an `error` event for the member.
fn send_error(tx: &MemberSender, code: u16, message: String) {
    let _ = tx.send(ServerEvent::Error { code, message });
}
