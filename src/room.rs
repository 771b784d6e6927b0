//! Match coordination: players, fleet quotas, lifecycle and attacks.
//!
//! A `Room` owns its players and every board belonging to them. Each
//! operation either completes or returns an error with the room untouched.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use rand::Rng;

use crate::board::Board;
use crate::common::{
    AttackOutcome, AttackReport, GameError, PlayerId, Position, RoomId, StartBlocker, UserId,
};
use crate::config::{FleetQuota, RoomSettings, MAX_PLAYERS_PER_ROOM};
use crate::grid::Marker;
use crate::player::{Player, TurnTracker};
use crate::ship::{Boat, BoatClass, Orientation};

/// Lifecycle of a match. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchPhase {
    Lobby,
    Active,
    Finished,
}

/// One game session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Room {
    id: RoomId,
    name: String,
    map_size: usize,
    quota: FleetQuota,
    phase: MatchPhase,
    winner: Option<PlayerId>,
    admin: UserId,
    /// Join order; becomes the turn order.
    players: Vec<Player>,
    fleets: BTreeMap<PlayerId, Board>,
    /// Keyed by (attacker, victim).
    tracking: BTreeMap<(PlayerId, PlayerId), Board>,
    turns: TurnTracker,
    next_player: u64,
}

impl Room {
    /// Create a room administered by `admin`.
    pub fn new(id: RoomId, admin: UserId, settings: RoomSettings) -> Result<Self, GameError> {
        settings.validate()?;
        Ok(Room {
            id,
            name: settings.name,
            map_size: settings.map_size,
            quota: settings.quota,
            phase: MatchPhase::Lobby,
            winner: None,
            admin,
            players: Vec::new(),
            fleets: BTreeMap::new(),
            tracking: BTreeMap::new(),
            turns: TurnTracker::new(),
            next_player: 1,
        })
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn map_size(&self) -> usize {
        self.map_size
    }

    pub fn quota(&self) -> &FleetQuota {
        &self.quota
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn admin(&self) -> UserId {
        self.admin
    }

    /// Players in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, GameError> {
        self.players
            .iter()
            .find(|p| p.id() == id)
            .ok_or(GameError::PlayerNotFound(id))
    }

    fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, GameError> {
        self.players
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or(GameError::PlayerNotFound(id))
    }

    /// The player `user` controls in this room.
    pub fn player_of_user(&self, user: UserId) -> Result<&Player, GameError> {
        self.players
            .iter()
            .find(|p| p.user() == user)
            .ok_or(GameError::UserNotInRoom(user))
    }

    pub fn fleet_board(&self, id: PlayerId) -> Result<&Board, GameError> {
        self.fleets.get(&id).ok_or(GameError::PlayerNotFound(id))
    }

    /// `attacker`'s record of `victim`, if any attack has happened yet.
    pub fn tracking_board(&self, attacker: PlayerId, victim: PlayerId) -> Option<&Board> {
        self.tracking.get(&(attacker, victim))
    }

    pub fn turn_holder(&self) -> Option<PlayerId> {
        self.turns.holder()
    }

    pub fn turn_index_of(&self, id: PlayerId) -> Option<usize> {
        self.turns.turn_index_of(id)
    }

    /// Players `attacker` may target.
    pub fn opponents(&self, attacker: PlayerId) -> Vec<&Player> {
        self.players
            .iter()
            .filter(|p| p.id() != attacker && p.is_on_game())
            .collect()
    }

    fn require_phase(&self, phase: MatchPhase) -> Result<(), GameError> {
        match (self.phase, phase) {
            (current, wanted) if current == wanted => Ok(()),
            (_, MatchPhase::Lobby) => Err(GameError::MatchAlreadyStarted),
            _ => Err(GameError::MatchNotActive),
        }
    }

    /// Add a player for `user` and give them an empty fleet board.
    pub fn join(&mut self, user: UserId, name: &str) -> Result<PlayerId, GameError> {
        self.require_phase(MatchPhase::Lobby)?;
        if name.trim().is_empty() {
            return Err(GameError::InvalidSettings("player name is empty"));
        }
        if self.players.iter().any(|p| p.user() == user) {
            return Err(GameError::AlreadyJoined(user));
        }
        if self.players.len() >= MAX_PLAYERS_PER_ROOM {
            return Err(GameError::RoomFull);
        }
        let id = PlayerId(self.next_player);
        self.next_player += 1;
        let mut player = Player::new(id, user, name.trim());
        player.set_admin(user == self.admin);
        self.players.push(player);
        self.fleets.insert(id, Board::fleet(id, self.map_size));
        Ok(id)
    }

    /// Remove a player before the match starts.
    pub fn leave(&mut self, id: PlayerId) -> Result<(), GameError> {
        self.require_phase(MatchPhase::Lobby)?;
        self.player(id)?;
        self.players.retain(|p| p.id() != id);
        self.fleets.remove(&id);
        self.tracking
            .retain(|&(attacker, victim), _| attacker != id && victim != id);
        Ok(())
    }

    /// Place a boat on `id`'s fleet board.
    ///
    /// The player becomes ready once no class has quota left.
    pub fn place_boat(
        &mut self,
        id: PlayerId,
        class: BoatClass,
        anchor: Position,
        orientation: Orientation,
    ) -> Result<&Boat, GameError> {
        self.require_phase(MatchPhase::Lobby)?;
        if self.player(id)?.is_ready() {
            return Err(GameError::PlayerReady);
        }
        let quota = self.quota;
        let board = self
            .fleets
            .get_mut(&id)
            .ok_or(GameError::Invariant("player without fleet board"))?;
        board.place(class, anchor, orientation, &quota)?;
        let complete = !board.any_boat_available(&quota);
        if complete {
            self.player_mut(id)?.set_ready(true);
        }
        self.fleets
            .get(&id)
            .and_then(|b| b.boats().last())
            .ok_or(GameError::Invariant("boat vanished after placement"))
    }

    /// Fill the rest of `id`'s fleet at random and mark them ready.
    pub fn place_fleet_randomly<R: Rng>(
        &mut self,
        id: PlayerId,
        rng: &mut R,
    ) -> Result<usize, GameError> {
        self.require_phase(MatchPhase::Lobby)?;
        if self.player(id)?.is_ready() {
            return Err(GameError::PlayerReady);
        }
        let quota = self.quota;
        // work on a copy so a crowded board leaves nothing half-placed
        let mut board = self.fleet_board(id)?.clone();
        let placed = board.place_randomly(rng, &quota)?;
        self.fleets.insert(id, board);
        self.player_mut(id)?.set_ready(true);
        Ok(placed)
    }

    /// Only a complete fleet can be declared ready; un-readying unlocks it.
    pub fn set_ready(&mut self, id: PlayerId, ready: bool) -> Result<(), GameError> {
        self.require_phase(MatchPhase::Lobby)?;
        if ready && self.fleet_board(id)?.any_boat_available(&self.quota) {
            return Err(GameError::FleetIncomplete);
        }
        self.player_mut(id)?.set_ready(ready);
        Ok(())
    }

    /// Whether the match can start. Pure.
    pub fn check_ready_to_start(&self) -> Result<(), StartBlocker> {
        if self.phase != MatchPhase::Lobby {
            return Err(StartBlocker::AlreadyStarted);
        }
        if self.players.len() < 2 {
            return Err(StartBlocker::NotEnoughPlayers);
        }
        if !self.players.iter().all(|p| p.is_ready()) {
            return Err(StartBlocker::PlayersNotReady);
        }
        Ok(())
    }

    /// Assign turn indices in join order and hand the turn to index 1.
    pub fn start_match(&mut self) -> Result<PlayerId, GameError> {
        self.check_ready_to_start().map_err(GameError::NotReady)?;
        let turns = TurnTracker::begin(self.players.iter().map(|p| p.id()).collect())?;
        let first = turns.holder().ok_or(GameError::NoTurnHolder)?;
        self.turns = turns;
        for p in self.players.iter_mut() {
            p.set_on_game(true);
        }
        self.phase = MatchPhase::Active;
        Ok(first)
    }

    /// Pass the turn to the next player still on game.
    pub fn end_turn(&mut self) -> Result<PlayerId, GameError> {
        self.require_phase(MatchPhase::Active)?;
        let players = &self.players;
        self.turns.advance(|id| {
            players
                .iter()
                .any(|p| p.id() == id && p.is_on_game())
        })
    }

    /// Resolve `attacker`'s shot at `pos` on `victim`'s fleet.
    ///
    /// Does not pass the turn.
    pub fn attack(
        &mut self,
        pos: Position,
        attacker: PlayerId,
        victim: PlayerId,
    ) -> Result<AttackReport, GameError> {
        self.require_phase(MatchPhase::Active)?;
        self.player(attacker)?;
        if !self.turns.is_holder(attacker) {
            return Err(GameError::NotYourTurn);
        }
        if attacker == victim {
            return Err(GameError::SelfAttack);
        }
        if !self.player(victim)?.is_on_game() {
            return Err(GameError::VictimEliminated(victim));
        }
        let (row, col) = pos;
        let map_size = self.map_size;
        let fleet = self
            .fleets
            .get_mut(&victim)
            .ok_or(GameError::Invariant("player without fleet board"))?;
        let target = fleet.occupancy_at(row, col)?;

        let tracking = self
            .tracking
            .entry((attacker, victim))
            .or_insert_with(|| Board::tracking(attacker, victim, map_size));
        let outcome = match target {
            Marker::Boat(_) => {
                let outcome = fleet.mark_hit(row, col)?;
                tracking.record(row, col, Marker::Hit)?;
                outcome
            }
            Marker::Hit => {
                tracking.record(row, col, Marker::Hit)?;
                AttackOutcome::AlreadyHit
            }
            Marker::Water | Marker::Miss => {
                tracking.record(row, col, Marker::Miss)?;
                AttackOutcome::Miss
            }
        };
        let destroyed = outcome.is_fresh_hit() && fleet.is_destroyed();

        let mut report = AttackReport {
            position: pos,
            outcome,
            eliminated: None,
            winner: None,
        };
        if destroyed {
            self.player_mut(victim)?.set_on_game(false);
            report.eliminated = Some(victim);
            report.winner = self.settle_winner();
        }
        Ok(report)
    }

    /// Finish the match once a single player is left on game.
    fn settle_winner(&mut self) -> Option<PlayerId> {
        let mut remaining = self.players.iter().filter(|p| p.is_on_game());
        let last = remaining.next()?.id();
        if remaining.next().is_some() {
            return None;
        }
        self.winner = Some(last);
        self.phase = MatchPhase::Finished;
        self.turns.finish();
        Some(last)
    }

    /// Board `viewer` may see: their fleet, or their record of `victim`.
    ///
    /// A victim never attacked yet yields an all-water tracking board.
    pub fn view_board(&self, viewer: PlayerId, victim: Option<PlayerId>) -> Result<Board, GameError> {
        self.player(viewer)?;
        match victim {
            None => self.fleet_board(viewer).cloned(),
            Some(v) if v == viewer => Err(GameError::SelfAttack),
            Some(v) => {
                self.player(v)?;
                Ok(self
                    .tracking_board(viewer, v)
                    .cloned()
                    .unwrap_or_else(|| Board::tracking(viewer, v, self.map_size)))
            }
        }
    }
}
