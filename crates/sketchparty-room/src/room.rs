//! Room actor: an isolated Tokio task that owns one [`Party`].
//!
//! Each room runs in its own task and is driven through an mpsc channel,
//! so every request for a room is applied in arrival order. Events go out
//! on per-member unbounded channels that the connection layer drains.

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::time::SystemTime;

use sketchparty_protocol::{Member, MemberId, RoomId};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::{GameState, Outbox, Party, Phase, RoomAction, RoomError, ServerEvent};

/// Channel sender for delivering outbound events to a member.
pub type MemberSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    Join {
        member: Member,
        sender: MemberSender,
        reply: oneshot::Sender<Result<Vec<Member>, RoomError>>,
    },

    /// Replies with the number of members left. The actor exits once
    /// that reaches zero.
    Leave {
        member_id: MemberId,
        reply: oneshot::Sender<Result<usize, RoomError>>,
    },

    Act {
        sender: MemberId,
        action: RoomAction,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Broadcasts `game-stopped` and exits if `requester` is the admin.
    Stop {
        requester: MemberId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    Members {
        reply: oneshot::Sender<Vec<Member>>,
    },

    Snapshot {
        reply: oneshot::Sender<GameState>,
    },
}

/// Handle to a running room actor. Used to send commands to it.
///
/// Cheap to clone. The `RoomManager` holds one per room; request
/// handlers clone it so they can await the room without holding the
/// manager.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Adds a member and registers their outbound channel. Returns the
    /// member list after the join.
    pub async fn join(
        &self,
        member: Member,
        sender: MemberSender,
    ) -> Result<Vec<Member>, RoomError> {
        self.request(|reply| RoomCommand::Join {
            member,
            sender,
            reply,
        })
        .await?
    }

    /// Removes a member. Returns how many members remain.
    pub async fn leave(&self, member_id: MemberId) -> Result<usize, RoomError> {
        self.request(|reply| RoomCommand::Leave { member_id, reply })
            .await?
    }

    /// Applies a member's request and delivers the resulting events.
    pub async fn act(&self, sender: MemberId, action: RoomAction) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Act {
            sender,
            action,
            reply,
        })
        .await?
    }

    /// Stops the game and shuts the room down.
    pub async fn stop(&self, requester: MemberId) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Stop { requester, reply })
            .await?
    }

    pub async fn members(&self) -> Result<Vec<Member>, RoomError> {
        self.request(|reply| RoomCommand::Members { reply }).await
    }

    /// Returns a snapshot of the game state.
    pub async fn game_state(&self) -> Result<GameState, RoomError> {
        self.request(|reply| RoomCommand::Snapshot { reply }).await
    }

    /// Sends a command and waits for its reply.
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

/// What woke the actor loop.
enum Wake {
    Command(Option<RoomCommand>),
    Deadline,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    party: Party,
    /// Per-member outbound channels.
    senders: HashMap<MemberId, MemberSender>,
    /// When the open turn closes on its own. Only set with
    /// `auto_advance`.
    deadline: Option<Instant>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until the room empties,
    /// is stopped, or every handle is dropped.
    async fn run(mut self) {
        tracing::info!(room_id = %self.party.id(), "room actor started");

        loop {
            let deadline = self.deadline;
            let wake = tokio::select! {
                cmd = self.receiver.recv() => Wake::Command(cmd),
                () = wait_until(deadline) => Wake::Deadline,
            };

            match wake {
                Wake::Command(Some(cmd)) => {
                    if self.handle_command(cmd).is_break() {
                        break;
                    }
                }
                Wake::Command(None) => break,
                Wake::Deadline => self.on_deadline(),
            }
        }

        tracing::info!(room_id = %self.party.id(), "room actor stopped");
    }

    fn handle_command(&mut self, cmd: RoomCommand) -> ControlFlow<()> {
        match cmd {
            RoomCommand::Join {
                member,
                sender,
                reply,
            } => {
                let member_id = member.id;
                let result = self.party.join(member).map(|out| {
                    self.senders.insert(member_id, sender);
                    self.dispatch(out);
                    self.party.members().to_vec()
                });
                let _ = reply.send(result);
            }
            RoomCommand::Leave { member_id, reply } => {
                let result = self.party.leave(member_id).map(|out| {
                    self.senders.remove(&member_id);
                    self.dispatch(out);
                    self.party.members().len()
                });
                let _ = reply.send(result);
                if self.party.is_empty() {
                    tracing::info!(room_id = %self.party.id(), "room empty");
                    return ControlFlow::Break(());
                }
            }
            RoomCommand::Act {
                sender,
                action,
                reply,
            } => {
                let result = self.handle_action(sender, action);
                let _ = reply.send(result);
            }
            RoomCommand::Stop { requester, reply } => match self.party.stop(requester) {
                Ok(out) => {
                    self.dispatch(out);
                    let _ = reply.send(Ok(()));
                    return ControlFlow::Break(());
                }
                Err(e) => {
                    let _ = reply.send(Err(e));
                }
            },
            RoomCommand::Members { reply } => {
                let _ = reply.send(self.party.members().to_vec());
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.party.game().clone());
            }
        }
        self.sync_deadline();
        ControlFlow::Continue(())
    }

    fn handle_action(&mut self, sender: MemberId, action: RoomAction) -> Result<(), RoomError> {
        let name = action.name();
        let opens_guessing = matches!(action, RoomAction::SelectWord { .. });

        let out = {
            let mut rng = rand::rng();
            self.party.handle(sender, action, &mut rng, SystemTime::now())
        };
        match out {
            Ok(out) => {
                self.dispatch(out);
                if opens_guessing && self.party.config().auto_advance {
                    self.deadline = Some(Instant::now() + self.party.config().guess_window);
                }
                Ok(())
            }
            Err(e) => {
                tracing::debug!(
                    room_id = %self.party.id(),
                    %sender,
                    action = name,
                    error = %e,
                    "request rejected"
                );
                Err(e)
            }
        }
    }

    fn on_deadline(&mut self) {
        self.deadline = None;
        let out = {
            let mut rng = rand::rng();
            self.party.advance_turn(&mut rng)
        };
        self.dispatch(out);
        self.sync_deadline();
    }

    /// Drops a pending deadline once guessing is no longer open.
    fn sync_deadline(&mut self) {
        if self.party.game().phase() != Phase::GuessingWord {
            self.deadline = None;
        }
    }

    /// Dispatches outbound events to the correct recipients.
    fn dispatch(&self, out: Outbox) {
        for (recipient, event) in out {
            for member in self.party.members() {
                if recipient.includes(member.id) {
                    self.send_to(member.id, event.clone());
                }
            }
        }
    }

    /// Sends an event to a single member. Silently drops it if the
    /// receiver is gone (member disconnected).
    fn send_to(&self, member_id: MemberId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&member_id) {
            let _ = sender.send(event);
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Spawns a room actor for `party` and returns a handle to it.
///
/// The creator (the party's only member) is sent `room-created`
/// immediately. `channel_size` bounds the command queue; senders wait
/// when it is full.
pub(crate) fn spawn_room(party: Party, creator_sender: MemberSender, channel_size: usize) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let room_id = party.id().clone();

    let mut senders = HashMap::new();
    if let Some(creator) = party.members().first() {
        let _ = creator_sender.send(ServerEvent::RoomCreated {
            room_id: room_id.clone(),
            member: creator.clone(),
        });
        senders.insert(creator.id, creator_sender);
    }

    let actor = RoomActor {
        party,
        senders,
        deadline: None,
        receiver: rx,
    };
    tokio::spawn(actor.run());

    RoomHandle { room_id, sender: tx }
}
