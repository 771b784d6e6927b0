//! Room participants and turn rotation.

use alloc::string::String;
use alloc::vec::Vec;

use crate::common::{GameError, PlayerId, UserId};

/// A participant bound to one room.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Player {
    id: PlayerId,
    user: UserId,
    name: String,
    admin: bool,
    ready: bool,
    on_game: bool,
}

impl Player {
    pub fn new(id: PlayerId, user: UserId, name: impl Into<String>) -> Self {
        Player {
            id,
            user,
            name: name.into(),
            admin: false,
            ready: false,
            on_game: false,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// `true` while the player takes part in a running match with boats left.
    pub fn is_on_game(&self) -> bool {
        self.on_game
    }

    pub fn set_ready(&mut self, value: bool) {
        self.ready = value;
    }

    pub fn set_admin(&mut self, value: bool) {
        self.admin = value;
    }

    pub fn set_on_game(&mut self, value: bool) {
        self.on_game = value;
    }
}

/// Turn order and the single turn holder of a room.
///
/// Turn indices are 1-based positions in `order` and are only ever assigned
/// by [`TurnTracker::begin`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnTracker {
    order: Vec<PlayerId>,
    holder: Option<usize>,
}

impl TurnTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign turn indices in `order` and hand the turn to index 1.
    pub(crate) fn begin(order: Vec<PlayerId>) -> Result<Self, GameError> {
        if order.is_empty() {
            return Err(GameError::Invariant("turn order is empty"));
        }
        for (i, id) in order.iter().enumerate() {
            if order[..i].contains(id) {
                return Err(GameError::Invariant("turn index collision"));
            }
        }
        Ok(TurnTracker {
            order,
            holder: Some(0),
        })
    }

    /// Player holding the turn, if any.
    pub fn holder(&self) -> Option<PlayerId> {
        self.holder.and_then(|i| self.order.get(i).copied())
    }

    pub fn is_holder(&self, id: PlayerId) -> bool {
        self.holder() == Some(id)
    }

    /// 1-based turn index of `id`, once the match has started.
    pub fn turn_index_of(&self, id: PlayerId) -> Option<usize> {
        self.order.iter().position(|&p| p == id).map(|i| i + 1)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Pass the turn to the next player in round-robin order, skipping
    /// players for which `eligible` is false.
    ///
    /// The next index is `(current mod n) + 1` in 1-based terms.
    pub(crate) fn advance<F>(&mut self, eligible: F) -> Result<PlayerId, GameError>
    where
        F: Fn(PlayerId) -> bool,
    {
        let current = self.holder.ok_or(GameError::NoTurnHolder)?;
        let n = self.order.len();
        let next = (1..=n)
            .map(|step| (current + step) % n)
            .find(|&i| eligible(self.order[i]))
            .ok_or(GameError::Invariant("no eligible player to take the turn"))?;
        self.holder = Some(next);
        Ok(self.order[next])
    }

    /// Drop the turn holder when the match ends.
    pub(crate) fn finish(&mut self) {
        self.holder = None;
    }
}
