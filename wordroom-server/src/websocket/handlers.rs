use std::sync::Arc;
use tracing::{info, warn};

use crate::room_registry::RoomRegistry;
use crate::round_timer::RoundTimers;
use crate::websocket::connection::{Binding, ConnectionId, ConnectionManager};
use wordroom_core::IdentityProvider;
use wordroom_types::{
    AdminRequest, ClientMessage, GuessRequest, JoinRoomRequest, LeaveRoomRequest, PlayerProfile,
    RoomError, ServerMessage,
};

pub const ROUND_TIMEOUT_MESSAGE: &str = "Round time is up";

/// Dispatches one connection's inbound actions.
///
/// Every action that touches a room holds that room's lock from the mutation
/// until the last notification it causes has been queued.
#[derive(Clone)]
pub struct MessageHandler {
    connection_id: ConnectionId,
    connection_manager: Arc<ConnectionManager>,
    registry: Arc<RoomRegistry>,
    timers: RoundTimers,
    identity: Arc<dyn IdentityProvider>,
}

impl MessageHandler {
    pub fn new(
        connection_id: ConnectionId,
        connection_manager: Arc<ConnectionManager>,
        registry: Arc<RoomRegistry>,
        timers: RoundTimers,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            connection_id,
            connection_manager,
            registry,
            timers,
            identity,
        }
    }

    /// Rejected actions are answered with an `error` event. Only a failure
    /// to reach this connection itself is returned as `Err`.
    pub async fn handle_message(&self, message: ClientMessage) -> Result<(), String> {
        let result = match message {
            ClientMessage::Heartbeat => Ok(()),
            ClientMessage::JoinRoom(request) => self.handle_join_room(request).await,
            ClientMessage::LeaveRoom(request) => self.handle_leave_room(request).await,
            ClientMessage::StartGame(request) => self.handle_start_game(request).await,
            ClientMessage::MakeGuess(request) => self.handle_make_guess(request).await,
            ClientMessage::NextRound(request) => self.handle_next_round(request).await,
            ClientMessage::EndGame(request) => self.handle_end_game(request).await,
            ClientMessage::ForceEndRound(request) => self.handle_force_end_round(request).await,
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Rejected action from {}: {}", self.connection_id, e);
                self.reject(&e.to_string()).await
            }
        }
    }

    /// Any inbound frame, pongs included, keeps the connection alive.
    pub async fn touch(&self) {
        self.connection_manager
            .update_activity(self.connection_id)
            .await;
    }

    pub async fn handle_disconnect(&self) {
        // Unbind first so player-left is not queued to the closing socket
        let Some(Binding {
            room_code,
            player_id,
        }) = self.connection_manager.leave_room(self.connection_id).await
        else {
            return;
        };

        info!(
            "Connection {} for player {} dropped from room {}",
            self.connection_id, player_id, room_code
        );

        let Ok(mut room) = self.registry.lock(&room_code).await else {
            return;
        };

        // Another connection may have rejoined as the same player
        if self
            .connection_manager
            .is_player_bound(&room_code, &player_id)
            .await
        {
            return;
        }

        if let Some(player) = room.remove_player(&player_id) {
            let message = ServerMessage::PlayerLeft {
                player_id: player.id.clone(),
                player_name: player.name.clone(),
            };
            self.connection_manager.send_to_room(&room_code, message).await;
        }
    }

    async fn handle_join_room(&self, request: JoinRoomRequest) -> Result<(), RoomError> {
        let player = request
            .player
            .filter(|p| !p.id.trim().is_empty())
            .filter(|_| !request.room_code.trim().is_empty())
            .ok_or_else(|| RoomError::invalid("Room code and player are required"))?;

        let profile = self.resolve_profile(player);
        let code = request.room_code;
        let mut room = self.registry.lock(&code).await?;

        let rejoined = room.add_player(profile.clone());
        self.connection_manager
            .join_room(self.connection_id, &code, &profile.id)
            .await;
        info!(
            "Player {} {} room {}",
            profile.id,
            if rejoined { "rejoined" } else { "joined" },
            code
        );

        let player = room.player(&profile.id).map(|p| p.profile()).unwrap_or(profile);
        self.reply(ServerMessage::RoomJoined(room.public_info()))
            .await;
        self.connection_manager
            .send_to_room_except(&code, self.connection_id, ServerMessage::PlayerJoined { player })
            .await;

        Ok(())
    }

    async fn handle_leave_room(&self, request: LeaveRoomRequest) -> Result<(), RoomError> {
        if request.room_code.trim().is_empty() || request.player_id.trim().is_empty() {
            return Err(RoomError::invalid("Room code and player id are required"));
        }

        let code = request.room_code;
        let mut room = self.registry.lock(&code).await?;

        let left = room.remove_player(&request.player_id).map(|p| p.profile());
        let bound_here = self
            .connection_manager
            .get_connection(self.connection_id)
            .await
            .is_some_and(|c| c.is_in_room(&code));
        if bound_here {
            self.connection_manager.leave_room(self.connection_id).await;
        }

        if let Some(player) = left {
            self.connection_manager
                .send_to_room(
                    &code,
                    ServerMessage::PlayerLeft {
                        player_id: player.id,
                        player_name: player.name,
                    },
                )
                .await;
        }

        self.reply(ServerMessage::RoomLeft { success: true }).await;
        Ok(())
    }

    async fn handle_start_game(&self, request: AdminRequest) -> Result<(), RoomError> {
        self.require_admin(&request, "start the game")?;

        let code = request.room_code;
        let mut room = self.registry.lock(&code).await?;
        let game_info = room.start(self.registry.words())?;

        self.arm_round_timer(&code);
        self.connection_manager
            .send_to_room(&code, ServerMessage::GameStarted { game_info })
            .await;

        Ok(())
    }

    async fn handle_make_guess(&self, request: GuessRequest) -> Result<(), RoomError> {
        if request.room_code.trim().is_empty()
            || request.player_id.trim().is_empty()
            || request.guess.trim().is_empty()
        {
            return Err(RoomError::invalid("Room code, player id and guess are required"));
        }
        self.require_binding(&request.room_code, &request.player_id)
            .await?;

        let code = request.room_code;
        let mut room = self.registry.lock(&code).await?;
        let outcome = room.submit_guess(&request.player_id, &request.guess)?;

        self.reply(ServerMessage::GuessResult {
            guess: outcome.guess.text.clone(),
            result: outcome.guess.result.clone(),
            is_correct: outcome.is_correct(),
            points: outcome.points,
        })
        .await;

        if !outcome.is_correct() {
            return Ok(());
        }

        let player_name = room
            .player(&request.player_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        self.connection_manager
            .send_to_room(
                &code,
                ServerMessage::CorrectGuess {
                    player_id: request.player_id.clone(),
                    player_name,
                    points: outcome.points,
                },
            )
            .await;
        self.connection_manager
            .send_to_room(&code, ServerMessage::LeaderboardUpdate(room.leaderboard()))
            .await;

        if outcome.should_end_round {
            self.timers.cancel(&code);
            let word = room.close_round()?;
            info!("Everyone solved round {} in room {}", room.current_round(), code);

            self.connection_manager
                .send_to_room(&code, ServerMessage::RevealWord { word })
                .await;
            self.connection_manager
                .send_to_room(&code, ServerMessage::RoundComplete)
                .await;
        }

        Ok(())
    }

    async fn handle_next_round(&self, request: AdminRequest) -> Result<(), RoomError> {
        self.require_admin(&request, "advance the round")?;

        let code = request.room_code;
        let mut room = self.registry.lock(&code).await?;
        let round_info = room.advance_round(self.registry.words())?;

        self.arm_round_timer(&code);
        self.connection_manager
            .send_to_room(&code, ServerMessage::RoundStarted { round_info })
            .await;

        Ok(())
    }

    async fn handle_end_game(&self, request: AdminRequest) -> Result<(), RoomError> {
        self.require_admin(&request, "end the game")?;

        let code = request.room_code;
        let mut room = self.registry.lock(&code).await?;
        room.end();
        self.timers.cancel(&code);

        self.connection_manager
            .send_to_room(
                &code,
                ServerMessage::GameFinished {
                    leaderboard: room.leaderboard(),
                },
            )
            .await;

        Ok(())
    }

    async fn handle_force_end_round(&self, request: AdminRequest) -> Result<(), RoomError> {
        self.require_admin(&request, "end the round")?;

        let code = request.room_code;
        let mut room = self.registry.lock(&code).await?;
        let word = room.close_round()?;
        self.timers.cancel(&code);
        info!("Round {} force-ended in room {}", room.current_round(), code);

        self.connection_manager
            .send_to_room(&code, ServerMessage::RevealWord { word })
            .await;
        self.connection_manager
            .send_to_room(&code, ServerMessage::LeaderboardUpdate(room.leaderboard()))
            .await;
        self.connection_manager
            .send_to_room(&code, ServerMessage::RoundComplete)
            .await;

        Ok(())
    }

    fn require_admin(&self, request: &AdminRequest, action: &str) -> Result<(), RoomError> {
        if !self.identity.is_admin(&request.student_id) {
            return Err(RoomError::Forbidden {
                action: action.to_string(),
            });
        }
        if request.room_code.trim().is_empty() {
            return Err(RoomError::invalid("Room code is required"));
        }
        Ok(())
    }

    /// Guesses are only taken for the player this connection joined as.
    async fn require_binding(&self, room_code: &str, player_id: &str) -> Result<(), RoomError> {
        let binding = self
            .connection_manager
            .get_connection(self.connection_id)
            .await
            .and_then(|c| c.binding);

        match binding {
            Some(b) if b.room_code == room_code && b.player_id == player_id => Ok(()),
            _ => Err(RoomError::NotJoined {
                room_code: room_code.to_string(),
                player_id: player_id.to_string(),
            }),
        }
    }

    /// Admin rights come from the roster, never from the client.
    fn resolve_profile(&self, mut profile: PlayerProfile) -> PlayerProfile {
        match self.identity.find_by_id(&profile.id) {
            Some(student) => {
                if profile.name.trim().is_empty() {
                    profile.name = student.name;
                }
                profile.is_admin = student.is_admin;
            }
            None => profile.is_admin = false,
        }
        profile
    }

    /// Must be called while holding the room's lock.
    fn arm_round_timer(&self, code: &str) {
        let registry = self.registry.clone();
        let connection_manager = self.connection_manager.clone();
        let timers = self.timers.clone();
        let room_code = code.to_string();

        self.timers
            .arm(code, self.registry.round_duration(), move |generation| {
                expire_round(registry, connection_manager, timers, room_code, generation)
            });
    }

    async fn reply(&self, message: ServerMessage) {
        if let Err(e) = self.send_message(message).await {
            warn!("Failed to reply to {}: {}", self.connection_id, e);
        }
    }

    async fn send_message(&self, message: ServerMessage) -> Result<(), String> {
        self.connection_manager
            .send_to_connection(self.connection_id, message)
            .await
    }

    /// Answer this connection with an `error` event.
    pub async fn reject(&self, message: &str) -> Result<(), String> {
        self.send_message(ServerMessage::Error {
            message: message.to_string(),
        })
        .await
    }
}

/// Round timer action: close the round on the clock and tell the room.
async fn expire_round(
    registry: Arc<RoomRegistry>,
    connection_manager: Arc<ConnectionManager>,
    timers: RoundTimers,
    room_code: String,
    generation: u64,
) {
    let Ok(mut room) = registry.lock(&room_code).await else {
        return;
    };

    // Cancelled or re-armed while we waited for the lock
    if !timers.complete(&room_code, generation) {
        return;
    }

    let word = match room.close_round() {
        Ok(word) => word,
        Err(e) => {
            warn!("Round timer fired for room {}: {}", room_code, e);
            return;
        }
    };
    info!("Round {} timed out in room {}", room.current_round(), room_code);

    connection_manager
        .send_to_room(
            &room_code,
            ServerMessage::RoundTimeout {
                message: ROUND_TIMEOUT_MESSAGE.to_string(),
            },
        )
        .await;
    connection_manager
        .send_to_room(&room_code, ServerMessage::RevealWord { word })
        .await;
    connection_manager
        .send_to_room(&room_code, ServerMessage::LeaderboardUpdate(room.leaderboard()))
        .await;
    connection_manager
        .send_to_room(&room_code, ServerMessage::RoundComplete)
        .await;
}
