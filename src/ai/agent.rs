use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::game::{rules, Board, Cell, Coordinate, Mark, RuleError};

use super::minimax::{DepthLimit, Minimax, SearchStats};

pub const DEFAULT_HARD_DEPTH_LIMIT: u8 = 2;
pub const DEFAULT_HARD_MISTAKE_CHANCE: f64 = 0.1;

/// 难度档位。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    #[default]
    Easy,
    Hard,
    Impossible,
}

impl FromStr for AiDifficulty {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(AiDifficulty::Easy),
            "hard" | "normal" | "medium" => Ok(AiDifficulty::Hard),
            "impossible" | "expert" | "unbeatable" => Ok(AiDifficulty::Impossible),
            _ => Err(RuleError::UnknownDifficulty {
                value: s.to_string(),
            }),
        }
    }
}

/// 本次决策中 AI（最大化方）与人类（最小化方）各自的棋子。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkAssignment {
    pub ai: Mark,
    pub human: Mark,
}

impl MarkAssignment {
    pub fn new(ai: Mark, human: Mark) -> Result<Self, RuleError> {
        let marks = Self { ai, human };
        marks.validate()?;
        Ok(marks)
    }

    pub fn for_ai(ai: Mark) -> Self {
        Self {
            ai,
            human: ai.opponent(),
        }
    }

    pub fn swapped(self) -> Self {
        Self {
            ai: self.human,
            human: self.ai,
        }
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        if self.ai == self.human {
            return Err(RuleError::SameMarks { mark: self.ai });
        }
        Ok(())
    }
}

impl Default for MarkAssignment {
    fn default() -> Self {
        Self {
            ai: Mark::O,
            human: Mark::X,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    pub difficulty: AiDifficulty,
    pub hard_depth_limit: u8,
    pub hard_mistake_chance: f64,
}

impl AiConfig {
    pub fn from_difficulty(difficulty: AiDifficulty) -> Self {
        Self {
            difficulty,
            hard_depth_limit: DEFAULT_HARD_DEPTH_LIMIT,
            hard_mistake_chance: DEFAULT_HARD_MISTAKE_CHANCE,
        }
    }

    pub fn with_hard_depth_limit(mut self, depth: u8) -> Self {
        self.hard_depth_limit = depth;
        self
    }

    pub fn with_hard_mistake_chance(mut self, chance: f64) -> Self {
        self.hard_mistake_chance = chance;
        self
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        if !(0.0..=1.0).contains(&self.hard_mistake_chance) {
            return Err(RuleError::InvalidMistakeChance {
                value: self.hard_mistake_chance,
            });
        }
        Ok(())
    }

    pub fn depth_limit(&self) -> DepthLimit {
        match self.difficulty {
            AiDifficulty::Impossible => DepthLimit::Unbounded,
            AiDifficulty::Easy | AiDifficulty::Hard => DepthLimit::Bounded(self.hard_depth_limit),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig::from_difficulty(AiDifficulty::default())
    }
}

/// 一次决策的结果；`coordinate` 为空表示棋盘已满、无处可下。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AiDecision {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
    pub difficulty: AiDifficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<i32>,
    pub nodes: u64,
    pub mistake: bool,
}

impl AiDecision {
    fn no_move(difficulty: AiDifficulty, stats: SearchStats) -> Self {
        Self {
            coordinate: None,
            difficulty,
            evaluation: None,
            nodes: stats.nodes,
            mistake: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScoredMove {
    pub coordinate: Coordinate,
    pub score: i32,
    pub completes_line: bool,
}

/// 为每个空格打分并按分值降序排列；同分时立即取胜的着法优先，其余保持行优先顺序。
pub(crate) fn rank_candidates(
    board: &Board,
    marks: MarkAssignment,
    limit: DepthLimit,
) -> (Vec<ScoredMove>, SearchStats) {
    let mut working = *board;
    let mut search = Minimax::new(marks, limit);
    let mut moves = Vec::with_capacity(9);

    for coordinate in working.open_cells() {
        let (score, completes_line) =
            working.with_cell(coordinate, Cell::Marked(marks.ai), |b| {
                let score = search.search(b, 0, false, i32::MIN, i32::MAX);
                (score, rules::has_won(b, marks.ai))
            });
        trace!(%coordinate, score, completes_line, "candidate scored");
        moves.push(ScoredMove {
            coordinate,
            score,
            completes_line,
        });
    }

    moves.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.completes_line.cmp(&a.completes_line))
    });
    (moves, search.stats())
}

fn random_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> AiDecision {
    let open = board.open_cells();
    AiDecision {
        coordinate: open.choose(rng).copied(),
        difficulty: AiDifficulty::Easy,
        evaluation: None,
        nodes: 0,
        mistake: false,
    }
}

fn limited_search_move<R: Rng + ?Sized>(
    board: &Board,
    config: &AiConfig,
    marks: MarkAssignment,
    rng: &mut R,
) -> AiDecision {
    let (moves, stats) = rank_candidates(board, marks, config.depth_limit());
    let Some(&best) = moves.first() else {
        return AiDecision::no_move(AiDifficulty::Hard, stats);
    };

    let mistake = moves.len() > 1 && rng.gen_bool(config.hard_mistake_chance);
    let chosen = if mistake { moves[1] } else { best };

    AiDecision {
        coordinate: Some(chosen.coordinate),
        difficulty: AiDifficulty::Hard,
        evaluation: Some(chosen.score),
        nodes: stats.nodes,
        mistake,
    }
}

fn exhaustive_move(board: &Board, marks: MarkAssignment) -> AiDecision {
    let (moves, stats) = rank_candidates(board, marks, DepthLimit::Unbounded);
    match moves.first() {
        Some(best) => AiDecision {
            coordinate: Some(best.coordinate),
            difficulty: AiDifficulty::Impossible,
            evaluation: Some(best.score),
            nodes: stats.nodes,
            mistake: false,
        },
        None => AiDecision::no_move(AiDifficulty::Impossible, stats),
    }
}

/// 计算 AI 的下一步。输入只在此处校验一次，棋盘不会被修改。
#[instrument(level = "debug", skip_all, fields(difficulty = ?config.difficulty, ai = %marks.ai))]
pub fn decide<R: Rng + ?Sized>(
    board: &Board,
    config: &AiConfig,
    marks: MarkAssignment,
    rng: &mut R,
) -> Result<AiDecision, RuleError> {
    config.validate()?;
    marks.validate()?;
    board.integrity_check()?;

    let decision = match config.difficulty {
        AiDifficulty::Easy => random_move(board, rng),
        AiDifficulty::Hard => limited_search_move(board, config, marks, rng),
        AiDifficulty::Impossible => exhaustive_move(board, marks),
    };

    debug!(
        coordinate = ?decision.coordinate,
        evaluation = ?decision.evaluation,
        nodes = decision.nodes,
        mistake = decision.mistake,
        "move decided"
    );
    Ok(decision)
}

pub struct AiAgent<R = SmallRng> {
    config: AiConfig,
    rng: R,
}

impl AiAgent<SmallRng> {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(config: AiConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> AiAgent<R> {
    pub fn with_rng(config: AiConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn decide_move(
        &mut self,
        board: &Board,
        marks: MarkAssignment,
    ) -> Result<AiDecision, RuleError> {
        decide(board, &self.config, marks, &mut self.rng)
    }
}
