//! Player-facing command surface
//!
//! A [`Session`] owns the catalog, the player's persistent state, the gacha
//! and the current match. Every command runs synchronously against that state
//! and reports its outcome; nothing is queued.

use thiserror::Error;

use crate::gacha::{GachaError, GachaSystem, PullResult};
use crate::progress::{PlayerState, PurchaseError};
use crate::sim::{
    self, GameEvent, GameState, Placement, PlacementError, Selection, SimError, WaveError,
};
use crate::tuning::{Catalog, PlantKind, TechId};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("no match is running")]
    NoMatch,
    #[error("stage {0} does not exist")]
    UnknownStage(u32),
    #[error("stage {stage} is locked (highest unlocked is {max_stage})")]
    StageLocked { stage: u32, max_stage: u32 },
    #[error("{0} is not in the deck")]
    NotInDeck(&'static str),
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Wave(#[from] WaveError),
    #[error(transparent)]
    Purchase(#[from] PurchaseError),
    #[error(transparent)]
    Gacha(#[from] GachaError),
}

pub struct Session {
    catalog: Catalog,
    player: PlayerState,
    gacha: GachaSystem,
    game: Option<GameState>,
    seed: u64,
    matches_started: u64,
}

impl Session {
    pub fn new(catalog: Catalog, player: PlayerState, seed: u64) -> Self {
        Self {
            catalog,
            player,
            gacha: GachaSystem::new(seed),
            game: None,
            seed,
            matches_started: 0,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    fn game_mut(&mut self) -> Result<&mut GameState, SessionError> {
        self.game.as_mut().ok_or(SessionError::NoMatch)
    }

    /// Start a match on an unlocked stage with the current deck, levels and tech
    pub fn select_stage(&mut self, id: u32) -> Result<(), SessionError> {
        let stage = self
            .catalog
            .stage(id)
            .ok_or(SessionError::UnknownStage(id))?;
        let max_stage = self.player.max_stage();
        if id > max_stage {
            return Err(SessionError::StageLocked {
                stage: id,
                max_stage,
            });
        }

        let seed = self.seed.wrapping_add(self.matches_started);
        self.matches_started += 1;
        self.game = Some(GameState::new(stage.clone(), self.player.loadout(), seed));
        Ok(())
    }

    /// Leave the current match without rewards
    pub fn abandon_match(&mut self) {
        if self.game.take().is_some() {
            log::info!("Match abandoned");
        }
    }

    /// Choose what board clicks do
    pub fn select_plant(&mut self, selection: Selection) -> Result<(), SessionError> {
        let game = self.game_mut()?;
        if let Selection::Plant(kind) = selection {
            if !game.loadout.deck.contains(&Some(kind)) {
                return Err(SessionError::NotInDeck(kind.as_str()));
            }
        }
        game.selection = Some(selection);
        Ok(())
    }

    /// Plant the selected type, or dig with the shovel, at canvas pixel (x, y)
    pub fn place_or_clear(&mut self, x: f32, y: f32) -> Result<Placement, SessionError> {
        let game = self.game.as_mut().ok_or(SessionError::NoMatch)?;
        Ok(sim::place_or_clear(game, x, y, &self.catalog)?)
    }

    pub fn start_next_wave(&mut self) -> Result<(), SessionError> {
        Ok(sim::start_next_wave(self.game_mut()?)?)
    }

    pub fn pull_gacha(&mut self, count: u32) -> Result<PullResult, SessionError> {
        Ok(self.gacha.pull(count, &mut self.player, &self.catalog)?)
    }

    /// Returns the new tech level
    pub fn purchase_tech(&mut self, id: TechId) -> Result<u32, SessionError> {
        Ok(self.player.upgrade_tech(id)?)
    }

    /// Returns the new plant level
    pub fn purchase_plant_upgrade(&mut self, kind: PlantKind) -> Result<u32, SessionError> {
        Ok(self.player.upgrade_plant(kind)?)
    }

    pub fn edit_deck(&mut self, slot: usize, kind: Option<PlantKind>) -> Result<(), SessionError> {
        Ok(self.player.set_deck(slot, kind)?)
    }

    /// Advance the current match and settle any outcome.
    ///
    /// Returns the events raised since the last call. With no match running
    /// this does nothing.
    pub fn tick(&mut self, dt_ms: f32) -> Result<Vec<GameEvent>, SimError> {
        let Some(game) = self.game.as_mut() else {
            return Ok(Vec::new());
        };
        sim::tick(game, dt_ms)?;

        let events = game.drain_events();
        if events.contains(&GameEvent::Victory) {
            let stage_id = game.stage.id;
            let reward = game.stage.reward;
            self.player.unlock_stage(stage_id + 1);
            self.player.add_gems(reward);
            log::info!("Stage {} cleared, +{} gems", stage_id, reward);
        }
        Ok(events)
    }
}
