//! AI 决策模块：极小化极大搜索与三档难度策略。

pub mod agent;
pub mod minimax;
pub mod request;

pub use agent::{
    decide, AiAgent, AiConfig, AiDecision, AiDifficulty, MarkAssignment,
    DEFAULT_HARD_DEPTH_LIMIT, DEFAULT_HARD_MISTAKE_CHANCE,
};
pub use minimax::{DepthLimit, Minimax, SearchStats};
pub use request::MoveRequest;
