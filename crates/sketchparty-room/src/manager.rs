//! Room manager: creates, tracks, and routes members to rooms.

use std::collections::HashMap;

use rand::Rng;
use sketchparty_protocol::{Member, MemberId, RoomId};

use crate::room::spawn_room;
use crate::{GameState, MemberSender, Party, RoomConfig, RoomError, RoomHandle};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Random bytes in a room id (rendered as twice as many hex digits).
const ROOM_ID_BYTES: usize = 4;

/// Manages all live rooms and tracks which member is in which room.
///
/// This is the entry point for room operations from the connection
/// layer. A room exists from `create_room` until its last member leaves
/// or its admin stops the game.
pub struct RoomManager {
    /// Live rooms, keyed by room ID.
    rooms: HashMap<RoomId, RoomHandle>,

    /// Maps each member to the room they are in. A member is in at most
    /// one room at a time.
    member_rooms: HashMap<MemberId, RoomId>,

    /// Settings new rooms start from.
    defaults: RoomConfig,
}

impl RoomManager {
    pub fn new(defaults: RoomConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            member_rooms: HashMap::new(),
            defaults: defaults.validated(),
        }
    }

    pub fn defaults(&self) -> &RoomConfig {
        &self.defaults
    }

    /// Creates a room with `creator` as its admin and only member, and
    /// returns its id. The creator is sent `room-created`.
    ///
    /// `total_rounds` and `max_drawings_per_round` override the defaults
    /// for this room only.
    pub fn create_room(
        &mut self,
        creator: Member,
        total_rounds: Option<u32>,
        max_drawings_per_round: Option<u32>,
        sender: MemberSender,
    ) -> Result<RoomId, RoomError> {
        if let Some(current) = self.member_rooms.get(&creator.id) {
            return Err(RoomError::AlreadyInRoom(creator.id, current.clone()));
        }

        let room_id = self.generate_room_id();
        let config = self
            .defaults
            .with_overrides(total_rounds, max_drawings_per_round);
        let creator_id = creator.id;
        let party = Party::new(room_id.clone(), config, creator);
        let handle = spawn_room(party, sender, DEFAULT_CHANNEL_SIZE);

        self.rooms.insert(room_id.clone(), handle);
        self.member_rooms.insert(creator_id, room_id.clone());
        tracing::info!(%room_id, creator = %creator_id, "room created");
        Ok(room_id)
    }

    /// Adds a member to a room and returns the member list after the join.
    ///
    /// Joining the room one is already in is a no-op apart from the
    /// `room-joined` reply.
    pub async fn join_room(
        &mut self,
        room_id: &RoomId,
        member: Member,
        sender: MemberSender,
    ) -> Result<Vec<Member>, RoomError> {
        if let Some(current) = self.member_rooms.get(&member.id) {
            if current != room_id {
                return Err(RoomError::AlreadyInRoom(member.id, current.clone()));
            }
        }

        let handle = self
            .rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        let member_id = member.id;
        let members = handle.join(member, sender).await?;
        self.member_rooms.insert(member_id, room_id.clone());
        Ok(members)
    }

    /// Removes a member from a room. The room is destroyed when its last
    /// member leaves.
    pub async fn leave_room(
        &mut self,
        member_id: MemberId,
        room_id: &RoomId,
    ) -> Result<(), RoomError> {
        if self.member_rooms.get(&member_id) != Some(room_id) {
            return Err(RoomError::NotInRoom(member_id, room_id.clone()));
        }
        self.member_rooms.remove(&member_id);

        let Some(handle) = self.rooms.get(room_id) else {
            return Err(RoomError::NotFound(room_id.clone()));
        };

        let remaining = match handle.leave(member_id).await {
            Ok(remaining) => remaining,
            // The actor is already gone; nobody is left to notify.
            Err(RoomError::Unavailable(_)) => 0,
            Err(e) => return Err(e),
        };
        if remaining == 0 {
            self.remove_room(room_id);
        }
        Ok(())
    }

    /// Runs the leave flow for a dropped connection. Returns the room the
    /// member was in, if any.
    pub async fn handle_disconnect(&mut self, member_id: MemberId) -> Option<RoomId> {
        let room_id = self.member_rooms.get(&member_id).cloned()?;
        if let Err(e) = self.leave_room(member_id, &room_id).await {
            tracing::warn!(member = %member_id, %room_id, error = %e, "leave on disconnect failed");
        }
        Some(room_id)
    }

    /// Stops the game in a room and destroys the room. Admin only.
    pub async fn stop_game(
        &mut self,
        member_id: MemberId,
        room_id: &RoomId,
    ) -> Result<(), RoomError> {
        let handle = self.handle_for(member_id, room_id)?;
        handle.stop(member_id).await?;
        self.remove_room(room_id);
        Ok(())
    }

    /// Returns the handle of `room_id` if `member_id` is in it.
    ///
    /// Callers clone the handle out so they can await the room after
    /// releasing the manager.
    pub fn handle_for(
        &self,
        member_id: MemberId,
        room_id: &RoomId,
    ) -> Result<RoomHandle, RoomError> {
        let handle = self
            .rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        if self.member_rooms.get(&member_id) != Some(room_id) {
            return Err(RoomError::NotInRoom(member_id, room_id.clone()));
        }
        Ok(handle.clone())
    }

    /// Returns the members of a room, or an empty list if it does not
    /// exist.
    pub async fn members(&self, room_id: &RoomId) -> Vec<Member> {
        match self.rooms.get(room_id) {
            Some(handle) => handle.members().await.unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// Returns a snapshot of a room's game state.
    pub async fn game_state(&self, room_id: &RoomId) -> Result<GameState, RoomError> {
        let handle = self
            .rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        handle.game_state().await
    }

    /// Returns the room a member is currently in, if any.
    pub fn member_room(&self, member_id: MemberId) -> Option<&RoomId> {
        self.member_rooms.get(&member_id)
    }

    pub fn contains_room(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists all live room IDs.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().cloned().collect()
    }

    /// Drops a room and every member's index entry pointing at it.
    fn remove_room(&mut self, room_id: &RoomId) {
        if self.rooms.remove(room_id).is_some() {
            self.member_rooms.retain(|_, rid| rid != room_id);
            tracing::info!(%room_id, "room destroyed");
        }
    }

    /// Generates a random hex room id not used by any live room.
    fn generate_room_id(&self) -> RoomId {
        let mut rng = rand::rng();
        loop {
            let bytes: [u8; ROOM_ID_BYTES] = rng.random();
            let id: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
            let id = RoomId::from(id);
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
