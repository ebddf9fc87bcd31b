//! 棋盘模型与胜负判定。

pub mod rules;
pub mod state;

pub use rules::{
    apply_move, evaluate_outcome, has_won, is_anti_diagonal_winner, is_col_winner,
    is_main_diagonal_winner, is_row_winner, line_winner, parse_mark, score, GameOutcome,
    MoveResolution, RuleError, LINES, WIN_SCORE,
};
pub use state::{Board, BoardError, Cell, Coordinate, Mark, BOARD_SIZE};
