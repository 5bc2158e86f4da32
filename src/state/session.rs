//! One hosted game: its engine plus the two-team roster around it.

use std::{fmt, sync::Arc, time::SystemTime};

use indexmap::IndexMap;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    engine::{ChallengeGenerator, Settings, SnakeGame},
    services::notifier::SseCycleNotifier,
    state::SseHub,
};

/// Number of teams competing in a game.
pub const TEAM_COUNT: usize = 2;

/// Zero-based team identifier; users see it as team 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TeamId(usize);

impl TeamId {
    /// Both teams, in order.
    pub const ALL: [TeamId; TEAM_COUNT] = [TeamId(0), TeamId(1)];

    /// Resolve the user-facing team number (1-based).
    pub fn from_number(number: u8) -> Result<Self, RosterError> {
        match number {
            1..=2 => Ok(TeamId(usize::from(number) - 1)),
            other => Err(RosterError::UnknownTeam(other)),
        }
    }

    pub fn number(self) -> u8 {
        self.0 as u8 + 1
    }

    /// Every team except this one.
    pub fn opponents(self) -> impl Iterator<Item = TeamId> {
        Self::ALL.into_iter().filter(move |team| *team != self)
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team {}", self.number())
    }
}

/// Player registered on the roster.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub team: TeamId,
    pub joined_at: SystemTime,
}

/// Reasons a roster operation is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("invalid team number {0}; expected 1 or 2")]
    UnknownTeam(u8),
    #[error("player name must not be empty")]
    EmptyName,
    #[error("player `{0}` has already joined the game")]
    DuplicateName(String),
    #[error("player `{0}` is not playing in this game")]
    UnknownPlayer(Uuid),
}

/// Players of a game, in join order.
#[derive(Debug, Default)]
pub struct Roster {
    players: IndexMap<Uuid, Player>,
}

impl Roster {
    pub fn join(&mut self, name: &str, team_number: u8) -> Result<Player, RosterError> {
        let team = TeamId::from_number(team_number)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }
        if self
            .players
            .values()
            .any(|player| player.name.eq_ignore_ascii_case(name))
        {
            return Err(RosterError::DuplicateName(name.to_string()));
        }

        let player = Player {
            id: Uuid::new_v4(),
            name: name.to_string(),
            team,
            joined_at: SystemTime::now(),
        };
        self.players.insert(player.id, player.clone());
        Ok(player)
    }

    pub fn player(&self, id: Uuid) -> Result<&Player, RosterError> {
        self.players.get(&id).ok_or(RosterError::UnknownPlayer(id))
    }

    pub fn members(&self, team: TeamId) -> impl Iterator<Item = &Player> {
        self.players.values().filter(move |player| player.team == team)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// A hosted game: engine, roster and metadata.
pub struct GameSession {
    pub id: Uuid,
    pub name: String,
    pub created_at: SystemTime,
    engine: Arc<SnakeGame>,
    /// Also serialises the pre-game flow (joins, start) against itself.
    roster: Mutex<Roster>,
}

impl GameSession {
    /// Build a session whose engine reports cycle events onto `hub`.
    pub fn new(
        name: String,
        settings: Settings,
        generator: Arc<dyn ChallengeGenerator>,
        hub: SseHub,
    ) -> Arc<Self> {
        let id = Uuid::new_v4();
        let engine = Arc::new_cyclic(|engine| {
            let notifier = SseCycleNotifier::new(id, engine.clone(), hub);
            SnakeGame::new(settings, generator, Arc::new(notifier))
        });

        Arc::new(Self {
            id,
            name,
            created_at: SystemTime::now(),
            engine,
            roster: Mutex::new(Roster::default()),
        })
    }

    pub fn engine(&self) -> &Arc<SnakeGame> {
        &self.engine
    }

    pub fn roster(&self) -> &Mutex<Roster> {
        &self.roster
    }
}
