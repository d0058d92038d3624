//! The synchronous core of a room: members, game state, and undo stack.
//!
//! A [`Party`] validates every request, applies it, and returns the events
//! to deliver as `(Recipient, ServerEvent)` pairs. It never touches
//! channels; the room actor owns one and does the delivery.

use std::time::SystemTime;

use rand::Rng;
use sketchparty_protocol::{Member, MemberId, Recipient, RoomId};

use crate::{
    DrawerChoice, GameState, Phase, RoomConfig, RoomError, ServerEvent, UndoPoints,
};

/// Events produced by one request, in delivery order.
pub type Outbox = Vec<(Recipient, ServerEvent)>;

/// A request from a member, already routed to their room.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomAction {
    /// Admin only.
    StartGame,
    /// Open a turn. `rotate` lets the scheduler pick; otherwise `drawer`
    /// is used, falling back to the current drawer.
    ChooseDrawer {
        drawer: Option<MemberId>,
        rotate: bool,
    },
    /// Drawer only.
    SelectWord { word: String },
    SubmitGuess { guessed_at_seconds: u32 },
    RequestScoring,
    Draw { draw_options: serde_json::Value },
    ClearCanvas,
    Undo { canvas_state: String },
    PushUndoPoint { undo_point: String },
    GetLastUndoPoint,
    DeleteLastUndoPoint,
    ClientReady,
    SendCanvasState {
        canvas_state: String,
        requester: Option<MemberId>,
    },
    BroadcastMessage { message: String },
}

impl RoomAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartGame => "start-game",
            Self::ChooseDrawer { .. } => "choose-drawer",
            Self::SelectWord { .. } => "select-word",
            Self::SubmitGuess { .. } => "submit-guess",
            Self::RequestScoring => "request-scoring",
            Self::Draw { .. } => "draw",
            Self::ClearCanvas => "clear-canvas",
            Self::Undo { .. } => "undo",
            Self::PushUndoPoint { .. } => "push-undo-point",
            Self::GetLastUndoPoint => "get-last-undo-point",
            Self::DeleteLastUndoPoint => "delete-last-undo-point",
            Self::ClientReady => "client-ready",
            Self::SendCanvasState { .. } => "send-canvas-state",
            Self::BroadcastMessage { .. } => "broadcast-message",
        }
    }
}

/// Members, game, and undo stack of one room.
#[derive(Debug)]
pub struct Party {
    id: RoomId,
    config: RoomConfig,
    /// In join order; the first member is the longest-present one.
    members: Vec<Member>,
    game: GameState,
    undo: UndoPoints,
}

impl Party {
    /// Creates a party whose only member, `creator`, is its admin.
    pub fn new(id: RoomId, config: RoomConfig, mut creator: Member) -> Self {
        creator.is_admin = true;
        let game = GameState::new(&config, creator.id);
        Self {
            id,
            config,
            members: vec![creator],
            game,
            undo: UndoPoints::new(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn undo_points(&self) -> &UndoPoints {
        &self.undo
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Adds a member. Joining again while present changes nothing and
    /// only repeats the `room-joined` reply.
    pub fn join(&mut self, mut member: Member) -> Result<Outbox, RoomError> {
        if let Some(existing) = self.member(member.id) {
            return Ok(vec![(
                Recipient::Member(existing.id),
                self.joined_event(existing.clone()),
            )]);
        }
        if self.members.len() >= self.config.max_members {
            return Err(RoomError::RoomFull(self.id.clone()));
        }

        member.is_admin = false;
        let id = member.id;
        let username = member.username.clone();
        self.members.push(member.clone());
        self.game.add_member(id);
        tracing::info!(
            room_id = %self.id,
            member = %id,
            members = self.members.len(),
            "member joined"
        );

        let mut out = vec![
            (Recipient::Member(id), self.joined_event(member)),
            (
                Recipient::AllExcept(id),
                ServerEvent::UpdateMembers {
                    members: self.members.clone(),
                },
            ),
            (
                Recipient::AllExcept(id),
                ServerEvent::Notification {
                    title: "New member arrived!".into(),
                    message: format!("{username} joined the party."),
                },
            ),
        ];

        if self.config.auto_start_at == Some(self.members.len())
            && self.game.phase() == Phase::NotStarted
        {
            out.extend(self.start_game()?);
        }
        Ok(out)
    }

    /// Removes a member and tells the rest of the room.
    pub fn leave(&mut self, member_id: MemberId) -> Result<Outbox, RoomError> {
        let index = self
            .members
            .iter()
            .position(|m| m.id == member_id)
            .ok_or_else(|| RoomError::NotInRoom(member_id, self.id.clone()))?;
        let member = self.members.remove(index);
        self.game.remove_member(member_id);
        tracing::info!(
            room_id = %self.id,
            member = %member_id,
            members = self.members.len(),
            "member left"
        );

        Ok(vec![
            (
                Recipient::All,
                ServerEvent::UpdateMembers {
                    members: self.members.clone(),
                },
            ),
            (
                Recipient::All,
                ServerEvent::Notification {
                    title: "Member departure!".into(),
                    message: format!("{} left the party.", member.username),
                },
            ),
        ])
    }

    /// Checks that `requester` may stop the game and returns the
    /// `game-stopped` broadcast. The caller tears the room down.
    pub fn stop(&self, requester: MemberId) -> Result<Outbox, RoomError> {
        self.require_admin(requester)?;
        tracing::info!(room_id = %self.id, member = %requester, "game stopped");
        Ok(vec![(Recipient::All, ServerEvent::GameStopped)])
    }

    /// Applies one member request.
    pub fn handle<R: Rng + ?Sized>(
        &mut self,
        sender: MemberId,
        action: RoomAction,
        rng: &mut R,
        now: SystemTime,
    ) -> Result<Outbox, RoomError> {
        let username = match self.member(sender) {
            Some(member) => member.username.clone(),
            None => return Err(RoomError::NotInRoom(sender, self.id.clone())),
        };

        match action {
            RoomAction::StartGame => {
                self.require_admin(sender)?;
                self.start_game()
            }
            RoomAction::ChooseDrawer { drawer, rotate } => {
                let choice = match (rotate, drawer.or(self.game.drawer())) {
                    (false, Some(member)) => DrawerChoice::Explicit(member),
                    _ => DrawerChoice::Rotate,
                };
                let drawer = self.game.choose_word(choice, rng)?;
                match drawer {
                    Some(drawer) => tracing::info!(
                        room_id = %self.id,
                        %drawer,
                        round = self.game.current_round(),
                        "turn opened"
                    ),
                    None => tracing::info!(room_id = %self.id, "game finished"),
                }
                Ok(vec![self.state_update()])
            }
            RoomAction::SelectWord { word } => {
                if self.game.phase() == Phase::ChoosingWord
                    && self.game.drawer() != Some(sender)
                {
                    return Err(RoomError::NotDrawer(sender));
                }
                self.game
                    .select_word(word.clone(), now, self.config.guess_window)?;
                tracing::debug!(room_id = %self.id, drawer = %sender, "word selected");
                Ok(vec![
                    self.state_update(),
                    (Recipient::All, ServerEvent::WordSelected { word }),
                ])
            }
            RoomAction::SubmitGuess { guessed_at_seconds } => {
                if self.game.phase() == Phase::GuessingWord
                    && self.game.drawer() == Some(sender)
                {
                    return Err(RoomError::DrawerCannotGuess(sender));
                }
                self.game.record_guess(sender, guessed_at_seconds)?;
                Ok(vec![self.state_update()])
            }
            RoomAction::RequestScoring => {
                if !self.game.score_turn()? {
                    tracing::debug!(room_id = %self.id, "turn already scored");
                }
                Ok(vec![self.state_update()])
            }
            RoomAction::Draw { draw_options } => Ok(vec![(
                Recipient::AllExcept(sender),
                ServerEvent::UpdateCanvasState { draw_options },
            )]),
            RoomAction::ClearCanvas => {
                Ok(vec![(Recipient::AllExcept(sender), ServerEvent::ClearCanvas)])
            }
            RoomAction::Undo { canvas_state } => Ok(vec![(
                Recipient::AllExcept(sender),
                ServerEvent::UndoCanvas { canvas_state },
            )]),
            RoomAction::PushUndoPoint { undo_point } => {
                self.undo.push(undo_point);
                Ok(Vec::new())
            }
            RoomAction::GetLastUndoPoint => Ok(vec![(
                Recipient::Member(sender),
                ServerEvent::LastUndoPoint {
                    undo_point: self.undo.peek_last().map(str::to_owned),
                },
            )]),
            RoomAction::DeleteLastUndoPoint => {
                self.undo.pop_last();
                Ok(Vec::new())
            }
            RoomAction::ClientReady => Ok(self.request_canvas(sender)),
            RoomAction::SendCanvasState {
                canvas_state,
                requester,
            } => Ok(self.deliver_canvas(sender, canvas_state, requester)),
            RoomAction::BroadcastMessage { message } => Ok(vec![(
                Recipient::All,
                ServerEvent::ChatMessage {
                    member_id: sender,
                    username,
                    message,
                },
            )]),
        }
    }

    /// Closes the current turn once guessing time is up: scores it and
    /// rotates to the next drawer. Does nothing outside `GuessingWord`.
    pub fn advance_turn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Outbox {
        if self.game.phase() != Phase::GuessingWord {
            return Vec::new();
        }
        if let Err(e) = self.game.score_turn() {
            tracing::warn!(room_id = %self.id, error = %e, "scoring on deadline failed");
        }
        match self.game.choose_word(DrawerChoice::Rotate, rng) {
            Ok(Some(drawer)) => {
                tracing::info!(room_id = %self.id, %drawer, "deadline passed, next turn")
            }
            Ok(None) => tracing::info!(room_id = %self.id, "deadline passed, game finished"),
            Err(e) => tracing::warn!(room_id = %self.id, error = %e, "rotation on deadline failed"),
        }
        vec![self.state_update()]
    }

    fn start_game(&mut self) -> Result<Outbox, RoomError> {
        let first = self
            .members
            .first()
            .map(|m| m.id)
            .ok_or_else(|| RoomError::NotFound(self.id.clone()))?;
        self.game.start(first)?;
        tracing::info!(
            room_id = %self.id,
            members = self.members.len(),
            rounds = self.game.total_rounds(),
            "game started"
        );
        Ok(vec![(
            Recipient::All,
            ServerEvent::GameStarted {
                state: self.game.clone(),
            },
        )])
    }

    /// Asks the longest-present other member for their canvas, or tells a
    /// lone requester there is nothing to load.
    fn request_canvas(&self, requester: MemberId) -> Outbox {
        match self.members.iter().find(|m| m.id != requester) {
            Some(source) => vec![(
                Recipient::Member(source.id),
                ServerEvent::GetCanvasState { requester },
            )],
            None => vec![(Recipient::Member(requester), ServerEvent::ClientLoaded)],
        }
    }

    fn deliver_canvas(
        &self,
        sender: MemberId,
        canvas_state: String,
        requester: Option<MemberId>,
    ) -> Outbox {
        let target = match requester {
            Some(id) => self.member(id),
            None => self.members.last(),
        };
        match target {
            Some(target) if target.id != sender => vec![(
                Recipient::Member(target.id),
                ServerEvent::CanvasState {
                    canvas_state,
                    state: self.game.clone(),
                },
            )],
            _ => {
                tracing::debug!(room_id = %self.id, %sender, "no canvas recipient");
                Vec::new()
            }
        }
    }

    fn require_admin(&self, member: MemberId) -> Result<(), RoomError> {
        match self.member(member) {
            Some(m) if m.is_admin => Ok(()),
            Some(_) => Err(RoomError::NotAdmin(member)),
            None => Err(RoomError::NotInRoom(member, self.id.clone())),
        }
    }

    fn joined_event(&self, member: Member) -> ServerEvent {
        ServerEvent::RoomJoined {
            room_id: self.id.clone(),
            member,
            members: self.members.clone(),
        }
    }

    fn state_update(&self) -> (Recipient, ServerEvent) {
        (
            Recipient::All,
            ServerEvent::GameStateUpdate {
                state: self.game.clone(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use sketchparty_protocol::Avatar;

    use super::*;

    fn member(id: u64, name: &str) -> Member {
        Member::new(MemberId(id), name, Avatar::new())
    }

    fn party() -> Party {
        Party::new(RoomId::from("abcd1234"), RoomConfig::default(), member(1, "ana"))
    }

    fn party_of_three() -> Party {
        let mut party = party();
        party.join(member(2, "ben")).unwrap();
        party.join(member(3, "cy")).unwrap();
        party
    }

    fn act(party: &mut Party, sender: u64, action: RoomAction) -> Result<Outbox, RoomError> {
        let mut rng = StdRng::seed_from_u64(5);
        party.handle(MemberId(sender), action, &mut rng, SystemTime::now())
    }

    /// Started game, member 1 drawing "giraffe".
    fn guessing_party() -> Party {
        let mut party = party_of_three();
        act(&mut party, 1, RoomAction::StartGame).unwrap();
        act(
            &mut party,
            1,
            RoomAction::ChooseDrawer {
                drawer: None,
                rotate: false,
            },
        )
        .unwrap();
        act(
            &mut party,
            1,
            RoomAction::SelectWord {
                word: "giraffe".into(),
            },
        )
        .unwrap();
        party
    }

    fn names(out: &Outbox) -> Vec<&'static str> {
        out.iter().map(|(_, e)| e.name()).collect()
    }

    #[test]
    fn test_new_marks_creator_admin() {
        let party = party();
        assert!(party.members()[0].is_admin);
        assert_eq!(party.game().score_of(MemberId(1)), Some(0));
    }

    #[test]
    fn test_join_notifies_others() {
        let mut party = party();
        let out = party.join(member(2, "ben")).unwrap();

        assert_eq!(names(&out), ["room-joined", "update-members", "notification"]);
        assert_eq!(out[0].0, Recipient::Member(MemberId(2)));
        assert_eq!(out[1].0, Recipient::AllExcept(MemberId(2)));
        match &out[2].1 {
            ServerEvent::Notification { title, message } => {
                assert_eq!(title, "New member arrived!");
                assert_eq!(message, "ben joined the party.");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(!party.members()[1].is_admin);
        assert_eq!(party.game().draw_count(MemberId(2)), Some(0));
    }

    #[test]
    fn test_join_twice_is_idempotent() {
        let mut party = party();
        party.join(member(2, "ben")).unwrap();
        let out = party.join(member(2, "ben")).unwrap();
        assert_eq!(names(&out), ["room-joined"]);
        assert_eq!(party.members().len(), 2);
    }

    #[test]
    fn test_join_rejects_when_full() {
        let config = RoomConfig {
            max_members: 2,
            ..RoomConfig::default()
        };
        let mut party = Party::new(RoomId::from("r"), config, member(1, "ana"));
        party.join(member(2, "ben")).unwrap();
        let err = party.join(member(3, "cy")).unwrap_err();
        assert_eq!(err, RoomError::RoomFull(RoomId::from("r")));
        assert_eq!(party.members().len(), 2);
    }

    #[test]
    fn test_join_auto_starts_at_threshold() {
        let config = RoomConfig {
            auto_start_at: Some(2),
            ..RoomConfig::default()
        };
        let mut party = Party::new(RoomId::from("r"), config, member(1, "ana"));
        let out = party.join(member(2, "ben")).unwrap();
        assert_eq!(names(&out).last(), Some(&"game-started"));
        assert_eq!(party.game().phase(), Phase::Started);
        assert_eq!(party.game().drawer(), Some(MemberId(1)));
    }

    #[test]
    fn test_leave_notifies_remaining() {
        let mut party = party_of_three();
        let out = party.leave(MemberId(2)).unwrap();
        assert_eq!(names(&out), ["update-members", "notification"]);
        match &out[1].1 {
            ServerEvent::Notification { title, message } => {
                assert_eq!(title, "Member departure!");
                assert_eq!(message, "ben left the party.");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(party.game().score_of(MemberId(2)), None);
    }

    #[test]
    fn test_leave_unknown_member() {
        let mut party = party();
        assert!(matches!(
            party.leave(MemberId(9)),
            Err(RoomError::NotInRoom(..))
        ));
    }

    #[test]
    fn test_start_game_requires_admin() {
        let mut party = party_of_three();
        let err = act(&mut party, 2, RoomAction::StartGame).unwrap_err();
        assert_eq!(err, RoomError::NotAdmin(MemberId(2)));
        assert_eq!(party.game().phase(), Phase::NotStarted);

        let out = act(&mut party, 1, RoomAction::StartGame).unwrap();
        assert_eq!(names(&out), ["game-started"]);
        assert_eq!(party.game().drawer(), Some(MemberId(1)));
    }

    #[test]
    fn test_handle_from_non_member_is_rejected() {
        let mut party = party();
        let err = act(&mut party, 7, RoomAction::ClearCanvas).unwrap_err();
        assert!(matches!(err, RoomError::NotInRoom(..)));
    }

    #[test]
    fn test_choose_drawer_without_id_uses_current_drawer() {
        let mut party = party_of_three();
        act(&mut party, 1, RoomAction::StartGame).unwrap();
        let out = act(
            &mut party,
            1,
            RoomAction::ChooseDrawer {
                drawer: None,
                rotate: false,
            },
        )
        .unwrap();
        assert_eq!(names(&out), ["game-state"]);
        assert_eq!(party.game().phase(), Phase::ChoosingWord);
        assert_eq!(party.game().drawer(), Some(MemberId(1)));
        assert_eq!(party.game().draw_count(MemberId(1)), Some(1));
    }

    #[test]
    fn test_select_word_only_by_drawer() {
        let mut party = party_of_three();
        act(&mut party, 1, RoomAction::StartGame).unwrap();
        act(
            &mut party,
            1,
            RoomAction::ChooseDrawer {
                drawer: Some(MemberId(2)),
                rotate: false,
            },
        )
        .unwrap();

        let err = act(
            &mut party,
            1,
            RoomAction::SelectWord {
                word: "cat".into(),
            },
        )
        .unwrap_err();
        assert_eq!(err, RoomError::NotDrawer(MemberId(1)));

        let out = act(
            &mut party,
            2,
            RoomAction::SelectWord {
                word: "cat".into(),
            },
        )
        .unwrap();
        assert_eq!(names(&out), ["game-state", "word-selected"]);
        assert_eq!(party.game().word(), "cat");
    }

    #[test]
    fn test_select_word_outside_turn_is_invalid_phase() {
        let mut party = party_of_three();
        let err = act(
            &mut party,
            1,
            RoomAction::SelectWord {
                word: "cat".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, RoomError::InvalidPhase { .. }));
    }

    #[test]
    fn test_drawer_cannot_guess() {
        let mut party = guessing_party();
        let err = act(
            &mut party,
            1,
            RoomAction::SubmitGuess {
                guessed_at_seconds: 3,
            },
        )
        .unwrap_err();
        assert_eq!(err, RoomError::DrawerCannotGuess(MemberId(1)));
        assert!(party.game().guess_record().is_empty());
    }

    #[test]
    fn test_guess_then_score_turn() {
        let mut party = guessing_party();
        act(
            &mut party,
            2,
            RoomAction::SubmitGuess {
                guessed_at_seconds: 12,
            },
        )
        .unwrap();
        act(
            &mut party,
            3,
            RoomAction::SubmitGuess {
                guessed_at_seconds: 45,
            },
        )
        .unwrap();

        let out = act(&mut party, 2, RoomAction::RequestScoring).unwrap();
        assert_eq!(names(&out), ["game-state"]);
        assert_eq!(party.game().score_of(MemberId(2)), Some(175));
        assert_eq!(party.game().score_of(MemberId(3)), Some(125));
        assert_eq!(party.game().score_of(MemberId(1)), Some(100));

        // A second request in the same turn adds nothing.
        act(&mut party, 3, RoomAction::RequestScoring).unwrap();
        assert_eq!(party.game().score_of(MemberId(2)), Some(175));
    }

    #[test]
    fn test_canvas_relays_exclude_sender() {
        let mut party = party_of_three();
        let out = act(
            &mut party,
            2,
            RoomAction::Draw {
                draw_options: serde_json::json!({ "x": 1 }),
            },
        )
        .unwrap();
        assert_eq!(out[0].0, Recipient::AllExcept(MemberId(2)));
        assert_eq!(names(&out), ["update-canvas-state"]);

        let out = act(&mut party, 2, RoomAction::ClearCanvas).unwrap();
        assert_eq!(names(&out), ["clear-canvas"]);
        assert_eq!(out[0].0, Recipient::AllExcept(MemberId(2)));
    }

    #[test]
    fn test_undo_points_round_trip_through_actions() {
        let mut party = party();
        for point in ["s1", "s2"] {
            act(
                &mut party,
                1,
                RoomAction::PushUndoPoint {
                    undo_point: point.into(),
                },
            )
            .unwrap();
        }

        let out = act(&mut party, 1, RoomAction::GetLastUndoPoint).unwrap();
        assert_eq!(
            out[0].1,
            ServerEvent::LastUndoPoint {
                undo_point: Some("s2".into())
            }
        );
        act(&mut party, 1, RoomAction::DeleteLastUndoPoint).unwrap();
        let out = act(&mut party, 1, RoomAction::GetLastUndoPoint).unwrap();
        assert_eq!(
            out[0].1,
            ServerEvent::LastUndoPoint {
                undo_point: Some("s1".into())
            }
        );
    }

    #[test]
    fn test_client_ready_alone_is_loaded() {
        let mut party = party();
        let out = act(&mut party, 1, RoomAction::ClientReady).unwrap();
        assert_eq!(out, vec![(Recipient::Member(MemberId(1)), ServerEvent::ClientLoaded)]);
    }

    #[test]
    fn test_client_ready_asks_oldest_member() {
        let mut party = party_of_three();
        let out = act(&mut party, 3, RoomAction::ClientReady).unwrap();
        assert_eq!(
            out,
            vec![(
                Recipient::Member(MemberId(1)),
                ServerEvent::GetCanvasState {
                    requester: MemberId(3)
                }
            )]
        );
    }

    #[test]
    fn test_send_canvas_state_targets_requester_or_newest() {
        let mut party = party_of_three();
        let out = act(
            &mut party,
            1,
            RoomAction::SendCanvasState {
                canvas_state: "data:png".into(),
                requester: Some(MemberId(2)),
            },
        )
        .unwrap();
        assert_eq!(out[0].0, Recipient::Member(MemberId(2)));

        let out = act(
            &mut party,
            1,
            RoomAction::SendCanvasState {
                canvas_state: "data:png".into(),
                requester: None,
            },
        )
        .unwrap();
        assert_eq!(out[0].0, Recipient::Member(MemberId(3)));
        assert_eq!(names(&out), ["canvas-state"]);
    }

    #[test]
    fn test_broadcast_message_names_sender() {
        let mut party = party_of_three();
        let out = act(
            &mut party,
            2,
            RoomAction::BroadcastMessage {
                message: "hello".into(),
            },
        )
        .unwrap();
        assert_eq!(
            out,
            vec![(
                Recipient::All,
                ServerEvent::ChatMessage {
                    member_id: MemberId(2),
                    username: "ben".into(),
                    message: "hello".into(),
                }
            )]
        );
    }

    #[test]
    fn test_stop_requires_admin() {
        let party = party_of_three();
        assert_eq!(party.stop(MemberId(3)), Err(RoomError::NotAdmin(MemberId(3))));
        assert_eq!(
            party.stop(MemberId(1)).unwrap(),
            vec![(Recipient::All, ServerEvent::GameStopped)]
        );
    }

    #[test]
    fn test_advance_turn_scores_and_rotates() {
        let mut party = guessing_party();
        act(
            &mut party,
            2,
            RoomAction::SubmitGuess {
                guessed_at_seconds: 80,
            },
        )
        .unwrap();

        let mut rng = StdRng::seed_from_u64(11);
        let out = party.advance_turn(&mut rng);
        assert_eq!(names(&out), ["game-state"]);
        assert_eq!(party.game().score_of(MemberId(2)), Some(75));
        assert_eq!(party.game().phase(), Phase::ChoosingWord);
        assert_ne!(party.game().drawer(), Some(MemberId(1)));

        // Outside guessing there is nothing to advance.
        assert!(party.advance_turn(&mut rng).is_empty());
    }

    #[test]
    fn test_select_word_deadline_uses_guess_window() {
        let mut party = party_of_three();
        act(&mut party, 1, RoomAction::StartGame).unwrap();
        act(
            &mut party,
            1,
            RoomAction::ChooseDrawer {
                drawer: None,
                rotate: false,
            },
        )
        .unwrap();
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        let mut rng = StdRng::seed_from_u64(1);
        party
            .handle(
                MemberId(1),
                RoomAction::SelectWord {
                    word: "owl".into(),
                },
                &mut rng,
                now,
            )
            .unwrap();
        assert_eq!(party.game().guess_deadline(), Some(100_000));
    }
}
