use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::game::{Board, Mark, RuleError};

use super::agent::{self, AiConfig, AiDecision, AiDifficulty, MarkAssignment};

/// 前端发来的一次落子请求；除棋盘外均可省略。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub board: Board,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub ai: Option<Mark>,
    #[serde(default)]
    pub human: Option<Mark>,
    #[serde(default)]
    pub hard_depth_limit: Option<u8>,
    #[serde(default)]
    pub hard_mistake_chance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl MoveRequest {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            difficulty: None,
            ai: None,
            human: None,
            hard_depth_limit: None,
            hard_mistake_chance: None,
            seed: None,
        }
    }

    pub fn config(&self) -> Result<AiConfig, RuleError> {
        let difficulty = match self.difficulty.as_deref() {
            Some(name) => name.parse()?,
            None => AiDifficulty::default(),
        };

        let mut config = AiConfig::from_difficulty(difficulty);
        if let Some(depth) = self.hard_depth_limit {
            config = config.with_hard_depth_limit(depth);
        }
        if let Some(chance) = self.hard_mistake_chance {
            config = config.with_hard_mistake_chance(chance);
        }
        config.validate()?;
        Ok(config)
    }

    /// 缺省的一方取另一方的对手棋子；两方都缺省时 AI 为 O、人类为 X。
    pub fn marks(&self) -> Result<MarkAssignment, RuleError> {
        match (self.ai, self.human) {
            (Some(ai), Some(human)) => MarkAssignment::new(ai, human),
            (Some(ai), None) => Ok(MarkAssignment::for_ai(ai)),
            (None, Some(human)) => Ok(MarkAssignment::for_ai(human.opponent())),
            (None, None) => Ok(MarkAssignment::default()),
        }
    }

    /// 执行一次决策；给定 `seed` 时随机结果可复现。
    pub fn decide(&self) -> Result<AiDecision, RuleError> {
        let config = self.config()?;
        let marks = self.marks()?;
        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        agent::decide(&self.board, &config, marks, &mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Cell;

    #[test]
    fn minimal_request_uses_defaults() {
        let request: MoveRequest =
            serde_json::from_str(r#"{"board":[[null,null,null],[null,null,null],[null,null,null]]}"#)
                .expect("request should deserialize");

        assert_eq!(request.board, Board::empty());
        assert_eq!(request.config(), Ok(AiConfig::default()));
        assert_eq!(request.marks(), Ok(MarkAssignment::default()));
        assert_eq!(request.seed, None);
    }

    #[test]
    fn full_request_overrides_everything() {
        let request: MoveRequest = serde_json::from_str(
            r#"{
                "board": [["X",null,null],[null,"O",null],[null,null,null]],
                "difficulty": "hard",
                "ai": "X",
                "human": "O",
                "hardDepthLimit": 4,
                "hardMistakeChance": 0.0,
                "seed": 12
            }"#,
        )
        .expect("request should deserialize");

        assert_eq!(request.board.cells()[0][0], Cell::Marked(Mark::X));
        let config = request.config().expect("config should be valid");
        assert_eq!(config.difficulty, AiDifficulty::Hard);
        assert_eq!(config.hard_depth_limit, 4);
        assert_eq!(config.hard_mistake_chance, 0.0);
        assert_eq!(
            request.marks(),
            Ok(MarkAssignment {
                ai: Mark::X,
                human: Mark::O
            })
        );
        assert_eq!(request.seed, Some(12));
    }

    #[test]
    fn one_sided_marks_fill_in_the_opponent() {
        let mut request = MoveRequest::new(Board::empty());
        request.human = Some(Mark::O);
        assert_eq!(request.marks(), Ok(MarkAssignment::for_ai(Mark::X)));

        request.ai = Some(Mark::O);
        assert_eq!(request.marks(), Err(RuleError::SameMarks { mark: Mark::O }));
    }

    #[test]
    fn seeded_requests_repeat_their_answer() {
        let mut request = MoveRequest::new(Board::empty());
        request.difficulty = Some("easy".into());
        request.seed = Some(2024);

        let first = request.decide().expect("request is valid");
        let second = request.decide().expect("request is valid");
        assert_eq!(first, second);
        assert!(first.coordinate.is_some());
    }

    #[test]
    fn request_decides_the_winning_move() {
        let mut request = MoveRequest::new(
            Board::from_rows(["XX_", "OO_", "___"]).expect("board should parse"),
        );
        request.difficulty = Some("impossible".into());

        let decision = request.decide().expect("request is valid");
        assert_eq!(
            decision.coordinate,
            Some(crate::game::Coordinate::new(1, 2).expect("coordinate in range"))
        );
    }

    #[test]
    fn bad_difficulty_and_chance_are_errors() {
        let mut request = MoveRequest::new(Board::empty());
        request.difficulty = Some("godlike".into());
        assert_eq!(
            request.config(),
            Err(RuleError::UnknownDifficulty {
                value: "godlike".into()
            })
        );

        request.difficulty = Some("impossible".into());
        request.hard_mistake_chance = Some(2.0);
        assert_eq!(
            request.config(),
            Err(RuleError::InvalidMistakeChance { value: 2.0 })
        );
    }
}
