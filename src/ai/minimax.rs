use serde::{Deserialize, Serialize};

use crate::game::{rules, Board, Cell};

use super::agent::MarkAssignment;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "plies")]
pub enum DepthLimit {
    Bounded(u8),
    Unbounded,
}

impl DepthLimit {
    fn reached(self, depth: u8) -> bool {
        match self {
            DepthLimit::Bounded(limit) => depth >= limit,
            DepthLimit::Unbounded => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub cutoffs: u64,
    pub depth_reached: u8,
}

#[derive(Debug, Clone)]
pub struct Minimax {
    marks: MarkAssignment,
    limit: DepthLimit,
    pruning: bool,
    stats: SearchStats,
}

impl Minimax {
    pub fn new(marks: MarkAssignment, limit: DepthLimit) -> Self {
        Self {
            marks,
            limit,
            pruning: true,
            stats: SearchStats::default(),
        }
    }

    pub fn with_pruning(mut self, pruning: bool) -> Self {
        self.pruning = pruning;
        self
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn evaluate(&mut self, board: &Board, maximizing: bool) -> i32 {
        let mut working = *board;
        self.search(&mut working, 0, maximizing, i32::MIN, i32::MAX)
    }

    pub(crate) fn search(
        &mut self,
        board: &mut Board,
        depth: u8,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.stats.nodes += 1;
        self.stats.depth_reached = self.stats.depth_reached.max(depth);

        let score = rules::score(board, self.marks.ai, self.marks.human);
        if score != 0 {
            return score;
        }
        if !board.has_open_cells() {
            return 0;
        }
        if self.limit.reached(depth) {
            return 0;
        }

        let mover = if maximizing {
            self.marks.ai
        } else {
            self.marks.human
        };

        if maximizing {
            let mut best = i32::MIN;
            for coordinate in board.open_cells() {
                let value = board.with_cell(coordinate, Cell::Marked(mover), |b| {
                    self.search(b, depth + 1, false, alpha, beta)
                });
                best = best.max(value);
                alpha = alpha.max(best);
                if self.pruning && beta <= alpha {
                    self.stats.cutoffs += 1;
                    break;
                }
            }
            best
        } else {
            let mut best = i32::MAX;
            for coordinate in board.open_cells() {
                let value = board.with_cell(coordinate, Cell::Marked(mover), |b| {
                    self.search(b, depth + 1, true, alpha, beta)
                });
                best = best.min(value);
                beta = beta.min(best);
                if self.pruning && beta <= alpha {
                    self.stats.cutoffs += 1;
                    break;
                }
            }
            best
        }
    }
}
