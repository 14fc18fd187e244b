//! Two-track board: cell metadata and token movement.

use super::{
    errors::{BoardError, BoardResult},
    models::{
        BoardInfo, BoardPosition, BoardStats, Cell, CellAction, CellType, MoveOutcome, MoveState,
        PlannedMove, Track, TrackMove,
    },
};
use crate::{
    bus::{BusEvent, SharedBus},
    config::BoardConfig,
    history::History,
    players::{PlayerId, SharedPlayers},
};
use chrono::Utc;
use std::collections::BTreeMap;

const INNER_NAMES: [&str; 6] = [
    "Start",
    "Work",
    "Investments",
    "Business",
    "Real estate",
    "Stocks",
];

const OUTER_NAMES: [&str; 3] = ["Fast track", "Passive income", "Financial freedom"];

/// Advance `steps` cells from `start` on a circular track of `total` cells.
///
/// Defined for every `steps`; the sum is never formed unreduced.
pub fn advance(start: usize, steps: usize, total: usize) -> BoardResult<TrackMove> {
    if total == 0 {
        return Err(BoardError::EmptyTrack);
    }

    let start = start % total;
    let remaining = total - start;
    let wrap = steps % total;
    let new_position = if wrap >= remaining {
        wrap - remaining
    } else {
        start + wrap
    };

    Ok(TrackMove {
        new_position,
        lap_completed: steps >= remaining,
    })
}

/// Board
pub struct Board {
    config: BoardConfig,
    positions: BTreeMap<PlayerId, BoardPosition>,
    state: MoveState,
    pending: Option<(PlayerId, PlannedMove)>,
    history: History<MoveOutcome>,
    players: SharedPlayers,
    bus: SharedBus,
    destroyed: bool,
}

impl Board {
    pub fn new(
        config: BoardConfig,
        history_capacity: usize,
        players: SharedPlayers,
        bus: SharedBus,
    ) -> Self {
        Self {
            config,
            positions: BTreeMap::new(),
            state: MoveState::Idle,
            pending: None,
            history: History::new(history_capacity),
            players,
            bus,
            destroyed: false,
        }
    }

    fn ensure_alive(&self) -> BoardResult<()> {
        if self.destroyed {
            log::warn!("Board destroyed, request rejected");
            return Err(BoardError::Destroyed);
        }
        Ok(())
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn state(&self) -> MoveState {
        self.state
    }

    pub fn track_cells(&self, track: Track) -> usize {
        match track {
            Track::Inner => self.config.inner_track_cells,
            Track::Outer => self.config.outer_track_cells,
        }
    }

    /// Advance along `track` using its configured size
    pub fn track_move(&self, start: usize, steps: usize, track: Track) -> BoardResult<TrackMove> {
        advance(start, steps, self.track_cells(track))
    }

    /// Type of the cell at `position`.
    ///
    /// PAYDAY and charity offsets apply on both tracks; the baby cell only on
    /// the inner one.
    pub fn cell_type(&self, position: usize, track: Track) -> CellType {
        if position == self.config.payday_position {
            return CellType::Payday;
        }
        if position == self.config.charity_position {
            return CellType::Charity;
        }
        if track == Track::Inner && self.config.baby_position == Some(position) {
            return CellType::Baby;
        }
        CellType::ROTATION[position % CellType::ROTATION.len()]
    }

    pub fn get_cell(&self, position: usize, track: Track) -> BoardResult<Cell> {
        let cells = self.track_cells(track);
        if position >= cells {
            return Err(BoardError::InvalidPosition {
                offset: position,
                track,
                cells,
            });
        }

        let cell_type = self.cell_type(position, track);
        let name = match cell_type {
            CellType::Payday => "PAYDAY".to_string(),
            CellType::Charity => "Charity".to_string(),
            CellType::Baby => "Baby".to_string(),
            _ => {
                let names: &[&str] = match track {
                    Track::Inner => &INNER_NAMES,
                    Track::Outer => &OUTER_NAMES,
                };
                names[position % names.len()].to_string()
            }
        };
        let description = match cell_type {
            CellType::Payday => "Collect your salary and pay your expenses",
            CellType::Charity => "Help those in need",
            CellType::Baby => "A new family member may arrive",
            CellType::Opportunity => "Draw an opportunity card",
            CellType::Expense => "Draw an expense card",
            CellType::Neutral => "Ordinary cell",
        };
        let actions = match cell_type {
            CellType::Payday => vec![CellAction::Payday],
            CellType::Charity => vec![CellAction::Charity],
            CellType::Baby => vec![CellAction::Baby],
            CellType::Opportunity => vec![CellAction::DrawCard, CellAction::Skip],
            CellType::Expense => vec![CellAction::DrawCard, CellAction::Pay],
            CellType::Neutral => vec![CellAction::Skip],
        };

        Ok(Cell {
            id: format!("{track}_{position}"),
            position,
            track,
            cell_type,
            name,
            description: description.to_string(),
            actions,
        })
    }

    pub fn cell_at(&self, position: BoardPosition) -> BoardResult<Cell> {
        self.get_cell(position.offset, position.track)
    }

    /// Destination of a move, without touching any state.
    ///
    /// Leaving the inner PAYDAY cell always lands on outer offset 0; this is
    /// the only automatic way onto the outer track. Such a move never counts
    /// as a completed lap.
    pub fn calculate_new_position(
        &self,
        current: BoardPosition,
        steps: usize,
    ) -> BoardResult<PlannedMove> {
        let step = self.track_move(current.offset, steps, current.track)?;

        let moved_to_outer =
            current.track == Track::Inner && current.offset == self.config.payday_position;
        let to = if moved_to_outer {
            BoardPosition::new(Track::Outer, 0)
        } else {
            BoardPosition::new(current.track, step.new_position)
        };

        Ok(PlannedMove {
            from: current,
            to,
            steps,
            lap_completed: step.lap_completed && !moved_to_outer,
            moved_to_outer,
        })
    }

    /// Track a player at the start cell unless already tracked
    pub fn register_player(&mut self, player_id: &PlayerId) {
        self.positions
            .entry(player_id.clone())
            .or_insert_with(BoardPosition::start);
    }

    pub fn unregister_player(&mut self, player_id: &PlayerId) {
        self.positions.remove(player_id);
    }

    pub fn player_position(&self, player_id: &PlayerId) -> BoardPosition {
        self.positions.get(player_id).copied().unwrap_or_default()
    }

    /// Place a token directly and mirror it into the player store
    pub fn set_player_position(
        &mut self,
        player_id: &PlayerId,
        position: BoardPosition,
    ) -> BoardResult<()> {
        self.ensure_alive()?;
        let cells = self.track_cells(position.track);
        if position.offset >= cells {
            return Err(BoardError::InvalidPosition {
                offset: position.offset,
                track: position.track,
                cells,
            });
        }

        self.players
            .borrow_mut()
            .update_position(player_id, position)?;
        self.positions.insert(player_id.clone(), position);
        Ok(())
    }

    /// Enter the Moving state and announce the move
    pub fn begin_move(&mut self, player_id: &PlayerId, steps: usize) -> BoardResult<PlannedMove> {
        self.ensure_alive()?;

        if self.state == MoveState::Moving {
            log::warn!("Movement already in progress, move of {player_id} rejected");
            return Err(BoardError::AlreadyMoving);
        }

        self.players.borrow().get_player(player_id)?;

        let current = self.player_position(player_id);
        let planned = self.calculate_new_position(current, steps)?;

        self.state = MoveState::Moving;
        self.pending = Some((player_id.clone(), planned));

        self.bus.emit(BusEvent::PlayerMovementStarted {
            player_id: player_id.clone(),
            from: current,
            steps,
        });

        Ok(planned)
    }

    /// Commit the move started by `begin_move`
    pub fn complete_move(&mut self) -> BoardResult<MoveOutcome> {
        self.ensure_alive()?;

        let (player_id, planned) = self.pending.take().ok_or(BoardError::NotMoving)?;
        self.state = MoveState::Idle;

        let cell = self.cell_at(planned.to)?;
        self.players
            .borrow_mut()
            .update_position(&player_id, planned.to)?;
        self.positions.insert(player_id.clone(), planned.to);

        let outcome = MoveOutcome {
            player_id: player_id.clone(),
            from: planned.from,
            to: planned.to,
            steps: planned.steps,
            cell,
            lap_completed: planned.lap_completed,
            moved_to_outer: planned.moved_to_outer,
            moved_at: Utc::now(),
        };
        self.history.push(outcome.clone());

        log::info!(
            "Player {player_id} moved {} -> {} ({} steps, {})",
            outcome.from,
            outcome.to,
            outcome.steps,
            outcome.cell.name
        );

        if outcome.lap_completed {
            self.bus.emit(BusEvent::LapCompleted {
                player_id: player_id.clone(),
                track: planned.from.track,
            });
        }
        if outcome.moved_to_outer {
            self.bus.emit(BusEvent::MovedToOuterTrack {
                player_id: player_id.clone(),
            });
        }
        self.bus.emit(BusEvent::PlayerMoved {
            player_id,
            outcome: outcome.clone(),
        });

        Ok(outcome)
    }

    /// Move a token in one step
    pub fn move_player(&mut self, player_id: &PlayerId, steps: usize) -> BoardResult<MoveOutcome> {
        self.begin_move(player_id, steps)?;
        self.complete_move()
    }

    /// Whether the player stands on the inner PAYDAY cell
    pub fn can_move_to_outer_track(&self, player_id: &PlayerId) -> bool {
        let position = self.player_position(player_id);
        position.track == Track::Inner && position.offset == self.config.payday_position
    }

    /// Manual inner -> outer transition from the PAYDAY cell
    pub fn move_to_outer_track(&mut self, player_id: &PlayerId) -> BoardResult<BoardPosition> {
        self.ensure_alive()?;

        if !self.can_move_to_outer_track(player_id) {
            log::warn!("Player {player_id} cannot move to the outer track");
            return Err(BoardError::NotAtPayday(player_id.clone()));
        }

        let position = BoardPosition::new(Track::Outer, 0);
        self.set_player_position(player_id, position)?;

        log::info!("Player {player_id} moved to the outer track");
        self.bus.emit(BusEvent::MovedToOuterTrack {
            player_id: player_id.clone(),
        });

        Ok(position)
    }

    pub fn board_info(&self) -> BoardInfo {
        BoardInfo {
            inner_track_cells: self.config.inner_track_cells,
            outer_track_cells: self.config.outer_track_cells,
            payday_position: self.config.payday_position,
            charity_position: self.config.charity_position,
            baby_position: self.config.baby_position,
            player_positions: self.positions.clone(),
        }
    }

    pub fn history(&self, limit: usize) -> Vec<MoveOutcome> {
        self.history.recent(limit).cloned().collect()
    }

    pub fn stats(&self) -> BoardStats {
        let on = |track| self.positions.values().filter(|p| p.track == track).count();
        BoardStats {
            total_movements: self.history.len(),
            players_on_inner: on(Track::Inner),
            players_on_outer: on(Track::Outer),
            is_moving: self.state == MoveState::Moving,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn destroy(&mut self) {
        self.positions.clear();
        self.history.clear();
        self.pending = None;
        self.state = MoveState::Idle;
        self.destroyed = true;
        log::info!("Board destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bus::{BusTopic, EventBus},
        errors::ErrorCategory,
        players::{InMemoryPlayerManager, Player, PlayerManager},
    };
    use std::{cell::RefCell, rc::Rc};

    fn board_with(ids: &[&str]) -> (Board, Rc<RefCell<InMemoryPlayerManager>>) {
        let store = InMemoryPlayerManager::new().shared();
        for id in ids {
            store
                .borrow_mut()
                .add_player(Player::new(*id, id, 0))
                .unwrap();
        }
        let mut board = Board::new(BoardConfig::default(), 100, store.clone(), EventBus::shared());
        for id in ids {
            board.register_player(&PlayerId::new(id));
        }
        (board, store)
    }

    #[test]
    fn test_advance_wraps() {
        assert_eq!(
            advance(20, 5, 24).unwrap(),
            TrackMove {
                new_position: 1,
                lap_completed: true
            }
        );
        assert_eq!(
            advance(0, 23, 24).unwrap(),
            TrackMove {
                new_position: 23,
                lap_completed: false
            }
        );
        assert!(advance(23, 1, 24).unwrap().lap_completed);
        assert_eq!(advance(0, 1, 0), Err(BoardError::EmptyTrack));
    }

    #[test]
    fn test_advance_huge_step_count() {
        // usize::MAX = 24 * k + 15 on every supported pointer width
        assert_eq!(
            advance(1, usize::MAX, 24).unwrap(),
            TrackMove {
                new_position: 16,
                lap_completed: true
            }
        );
        assert_eq!(advance(23, 24 * 3, 24).unwrap().new_position, 23);
    }

    #[test]
    fn test_special_cells() {
        let (board, _) = board_with(&[]);
        let payday = board.get_cell(6, Track::Inner).unwrap();
        assert_eq!(payday.cell_type, CellType::Payday);
        assert_eq!(payday.name, "PAYDAY");
        assert_eq!(payday.id, "inner_6");
        assert_eq!(payday.actions, vec![CellAction::Payday]);

        let charity = board.get_cell(12, Track::Inner).unwrap();
        assert_eq!(charity.cell_type, CellType::Charity);
        assert_eq!(charity.actions, vec![CellAction::Charity]);
    }

    #[test]
    fn test_rotation_types() {
        let (board, _) = board_with(&[]);
        assert_eq!(board.cell_type(0, Track::Inner), CellType::Opportunity);
        assert_eq!(board.cell_type(1, Track::Inner), CellType::Expense);
        assert_eq!(board.cell_type(2, Track::Inner), CellType::Neutral);
        assert_eq!(board.cell_type(3, Track::Outer), CellType::Opportunity);

        let expense = board.get_cell(4, Track::Inner).unwrap();
        assert_eq!(expense.actions, vec![CellAction::DrawCard, CellAction::Pay]);
        let neutral = board.get_cell(5, Track::Inner).unwrap();
        assert_eq!(neutral.actions, vec![CellAction::Skip]);
    }

    #[test]
    fn test_cell_names_rotate_per_track() {
        let (board, _) = board_with(&[]);
        assert_eq!(board.get_cell(0, Track::Inner).unwrap().name, "Start");
        assert_eq!(board.get_cell(7, Track::Inner).unwrap().name, "Work");
        assert_eq!(board.get_cell(4, Track::Outer).unwrap().name, "Passive income");
    }

    #[test]
    fn test_baby_cell_inner_only() {
        let store = InMemoryPlayerManager::new().shared();
        let config = BoardConfig {
            baby_position: Some(9),
            ..BoardConfig::default()
        };
        let board = Board::new(config, 10, store, EventBus::shared());
        assert_eq!(board.cell_type(9, Track::Inner), CellType::Baby);
        assert_eq!(board.cell_type(9, Track::Outer), CellType::Opportunity);
    }

    #[test]
    fn test_get_cell_out_of_range() {
        let (board, _) = board_with(&[]);
        let err = board.get_cell(24, Track::Inner).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ValidationFailure);
        assert!(board.get_cell(51, Track::Outer).is_ok());
    }

    #[test]
    fn test_leaving_payday_goes_outer() {
        let (board, _) = board_with(&[]);
        let planned = board
            .calculate_new_position(BoardPosition::new(Track::Inner, 6), 4)
            .unwrap();
        assert_eq!(planned.to, BoardPosition::new(Track::Outer, 0));
        assert!(planned.moved_to_outer);

        let planned = board
            .calculate_new_position(BoardPosition::new(Track::Inner, 5), 4)
            .unwrap();
        assert_eq!(planned.to, BoardPosition::new(Track::Inner, 9));
        assert!(!planned.moved_to_outer);
    }

    #[test]
    fn test_leaving_payday_is_not_a_lap() {
        let (board, _) = board_with(&[]);
        let planned = board
            .calculate_new_position(BoardPosition::new(Track::Inner, 6), 20)
            .unwrap();
        assert_eq!(planned.to, BoardPosition::new(Track::Outer, 0));
        assert!(planned.moved_to_outer);
        assert!(!planned.lap_completed);
    }

    #[test]
    fn test_outer_track_wraps_on_outer() {
        let (board, _) = board_with(&[]);
        let planned = board
            .calculate_new_position(BoardPosition::new(Track::Outer, 50), 5)
            .unwrap();
        assert_eq!(planned.to, BoardPosition::new(Track::Outer, 3));
        assert!(planned.lap_completed);
    }

    #[test]
    fn test_move_player_mirrors_position() {
        let (mut board, store) = board_with(&["alice"]);
        let alice = PlayerId::new("alice");

        let outcome = board.move_player(&alice, 4).unwrap();
        assert_eq!(outcome.to, BoardPosition::new(Track::Inner, 4));
        assert_eq!(outcome.cell.cell_type, CellType::Expense);
        assert_eq!(board.player_position(&alice), outcome.to);
        assert_eq!(store.borrow().get_player(&alice).unwrap().position, outcome.to);
        assert_eq!(board.state(), MoveState::Idle);
    }

    #[test]
    fn test_lap_emits_signal() {
        let (mut board, _) = board_with(&["alice"]);
        let alice = PlayerId::new("alice");
        let laps = Rc::new(RefCell::new(0));
        let l = laps.clone();
        board.bus.on(BusTopic::LapCompleted, move |_| *l.borrow_mut() += 1);

        board.move_player(&alice, 5).unwrap();
        board.move_player(&alice, 12).unwrap();
        assert_eq!(*laps.borrow(), 0);
        board.move_player(&alice, 10).unwrap();
        assert_eq!(*laps.borrow(), 1);
        assert_eq!(board.player_position(&alice).offset, 3);
    }

    #[test]
    fn test_reentrant_move_rejected() {
        let (mut board, _) = board_with(&["alice", "bob"]);
        board.begin_move(&"alice".into(), 3).unwrap();
        assert_eq!(
            board.move_player(&"bob".into(), 2),
            Err(BoardError::AlreadyMoving)
        );
        assert_eq!(board.player_position(&"bob".into()), BoardPosition::start());
        board.complete_move().unwrap();
        assert_eq!(board.complete_move(), Err(BoardError::NotMoving));
    }

    #[test]
    fn test_unknown_player() {
        let (mut board, _) = board_with(&[]);
        let err = board.move_player(&"ghost".into(), 3).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(board.state(), MoveState::Idle);
    }

    #[test]
    fn test_manual_outer_transition() {
        let (mut board, store) = board_with(&["alice"]);
        let alice = PlayerId::new("alice");
        assert!(!board.can_move_to_outer_track(&alice));
        assert_eq!(
            board.move_to_outer_track(&alice),
            Err(BoardError::NotAtPayday(alice.clone()))
        );

        board.move_player(&alice, 6).unwrap();
        assert!(board.can_move_to_outer_track(&alice));
        let position = board.move_to_outer_track(&alice).unwrap();
        assert_eq!(position, BoardPosition::new(Track::Outer, 0));
        assert!(store.borrow().get_player(&alice).unwrap().is_on_outer_track());
    }

    #[test]
    fn test_stats_and_info() {
        let (mut board, _) = board_with(&["a", "b"]);
        board.move_player(&"a".into(), 6).unwrap();
        board.move_player(&"a".into(), 1).unwrap();

        let stats = board.stats();
        assert_eq!(stats.total_movements, 2);
        assert_eq!(stats.players_on_inner, 1);
        assert_eq!(stats.players_on_outer, 1);
        assert!(!stats.is_moving);

        let info = board.board_info();
        assert_eq!(info.player_positions.len(), 2);
        assert_eq!(board.history(1)[0].to, BoardPosition::new(Track::Outer, 0));
    }

    #[test]
    fn test_destroyed() {
        let (mut board, _) = board_with(&["a"]);
        board.destroy();
        assert_eq!(board.move_player(&"a".into(), 1), Err(BoardError::Destroyed));
    }
}
