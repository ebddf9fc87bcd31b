use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

use super::state::{Board, BoardError, Cell, Coordinate, Mark, BOARD_SIZE};

/// 终局分值：AI 连成一线为 `+WIN_SCORE`，对手连成一线为 `-WIN_SCORE`。
pub const WIN_SCORE: i32 = 10;

/// 全部 8 条连线：3 行、3 列、2 条对角线。
pub const LINES: [[Coordinate; 3]; 8] = [
    [Coordinate::at(0, 0), Coordinate::at(0, 1), Coordinate::at(0, 2)],
    [Coordinate::at(1, 0), Coordinate::at(1, 1), Coordinate::at(1, 2)],
    [Coordinate::at(2, 0), Coordinate::at(2, 1), Coordinate::at(2, 2)],
    [Coordinate::at(0, 0), Coordinate::at(1, 0), Coordinate::at(2, 0)],
    [Coordinate::at(0, 1), Coordinate::at(1, 1), Coordinate::at(2, 1)],
    [Coordinate::at(0, 2), Coordinate::at(1, 2), Coordinate::at(2, 2)],
    [Coordinate::at(0, 0), Coordinate::at(1, 1), Coordinate::at(2, 2)],
    [Coordinate::at(0, 2), Coordinate::at(1, 1), Coordinate::at(2, 0)],
];

/// 对局结果，供 UI 在每次落子后展示。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameOutcome {
    InProgress,
    Won { winner: Mark },
    Draw,
}

impl GameOutcome {
    pub fn is_finished(self) -> bool {
        !matches!(self, GameOutcome::InProgress)
    }
}

/// 落子后的棋盘与结果，一并返回给 UI。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveResolution {
    pub board: Board,
    pub outcome: GameOutcome,
}

impl MoveResolution {
    pub fn new(board: Board) -> Self {
        let outcome = evaluate_outcome(&board);
        Self { board, outcome }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Display, Error)]
#[serde(tag = "type")]
pub enum RuleError {
    #[display("cell {coordinate} is already occupied")]
    CellOccupied { coordinate: Coordinate },
    #[display("the game is already decided")]
    GameFinished,
    #[display("the AI and the human cannot share mark {mark}")]
    SameMarks { mark: Mark },
    #[display("unknown mark {value:?}, expected \"X\" or \"O\"")]
    InvalidMark { value: String },
    #[display("unknown difficulty {value:?}")]
    UnknownDifficulty { value: String },
    #[display("mistake chance must be within [0, 1], got {value}")]
    InvalidMistakeChance { value: f64 },
    #[display("invalid board: {error}")]
    IntegrityViolation {
        #[error(source)]
        error: BoardError,
    },
}

impl From<BoardError> for RuleError {
    fn from(error: BoardError) -> Self {
        RuleError::IntegrityViolation { error }
    }
}

fn line_owner(board: &Board, line: &[Coordinate; 3]) -> Option<Mark> {
    let first = board.cell(line[0]).mark()?;
    line[1..]
        .iter()
        .all(|&coordinate| board.cell(coordinate) == Cell::Marked(first))
        .then_some(first)
}

/// 返回已连成一线的一方（若有）。
pub fn line_winner(board: &Board) -> Option<Mark> {
    LINES
        .iter()
        .filter_map(|line| line_owner(board, line))
        .fold(None, |found, mark| found.or(Some(mark)))
}

pub fn has_won(board: &Board, mark: Mark) -> bool {
    LINES
        .iter()
        .any(|line| line_owner(board, line) == Some(mark))
}

pub fn is_row_winner(board: &Board, mark: Mark, row: usize) -> bool {
    row < BOARD_SIZE
        && (0..BOARD_SIZE).all(|col| board.cell(Coordinate::at(row, col)) == Cell::Marked(mark))
}

pub fn is_col_winner(board: &Board, mark: Mark, col: usize) -> bool {
    col < BOARD_SIZE
        && (0..BOARD_SIZE).all(|row| board.cell(Coordinate::at(row, col)) == Cell::Marked(mark))
}

pub fn is_main_diagonal_winner(board: &Board, mark: Mark) -> bool {
    (0..BOARD_SIZE).all(|idx| board.cell(Coordinate::at(idx, idx)) == Cell::Marked(mark))
}

pub fn is_anti_diagonal_winner(board: &Board, mark: Mark) -> bool {
    (0..BOARD_SIZE)
        .all(|idx| board.cell(Coordinate::at(idx, BOARD_SIZE - 1 - idx)) == Cell::Marked(mark))
}

/// 以 AI 视角评估局面，不考虑深度。
pub fn score(board: &Board, ai: Mark, human: Mark) -> i32 {
    if has_won(board, ai) {
        WIN_SCORE
    } else if has_won(board, human) {
        -WIN_SCORE
    } else {
        0
    }
}

pub fn evaluate_outcome(board: &Board) -> GameOutcome {
    match line_winner(board) {
        Some(winner) => GameOutcome::Won { winner },
        None if board.is_full() => GameOutcome::Draw,
        None => GameOutcome::InProgress,
    }
}

pub fn parse_mark(value: &str) -> Result<Mark, RuleError> {
    value.parse().map_err(|_| RuleError::InvalidMark {
        value: value.to_string(),
    })
}

/// 为 UI 落子并返回落子后的对局结果。
pub fn apply_move(
    board: &mut Board,
    coordinate: Coordinate,
    mark: Mark,
) -> Result<GameOutcome, RuleError> {
    board.integrity_check()?;
    if evaluate_outcome(board).is_finished() {
        return Err(RuleError::GameFinished);
    }
    if !board.cell(coordinate).is_empty() {
        return Err(RuleError::CellOccupied { coordinate });
    }

    board.set(coordinate, Cell::Marked(mark));
    Ok(evaluate_outcome(board))
}
