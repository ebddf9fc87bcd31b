pub mod ai;
pub mod game;

use gloo_timers::future::TimeoutFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_wasm_bindgen::from_value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{
    decide, AiAgent, AiConfig, AiDecision, AiDifficulty, DepthLimit, MarkAssignment, Minimax,
    MoveRequest, SearchStats,
};
pub use game::{
    apply_move, evaluate_outcome, line_winner, parse_mark, score, Board, BoardError, Cell,
    Coordinate, GameOutcome, Mark, MoveResolution, RuleError,
};

#[cfg(all(feature = "wee_alloc", target_arch = "wasm32"))]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
    web_sys::console::log_1(&JsValue::from_str(concat!(
        "tictactoe_ai ",
        env!("CARGO_PKG_VERSION"),
        " ready"
    )));
}

fn to_js_error(error: RuleError) -> JsValue {
    to_js(&error).unwrap_or_else(|serialize_err| serialize_err)
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

// 空格子需要以 `null` 而不是 `undefined` 交给前端。
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(serde_to_js_error)
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    from_value(value).map_err(serde_to_js_error)
}

/// 返回一个空棋盘，供前端初始化或重开一局。
#[wasm_bindgen(js_name = "createBoard")]
pub fn create_board() -> Result<JsValue, JsValue> {
    to_js(&Board::empty())
}

#[wasm_bindgen(js_name = "validateBoard")]
pub fn validate_board(board: JsValue) -> Result<(), JsValue> {
    let board: Board = from_js(board)?;
    board
        .integrity_check()
        .map_err(|error| to_js_error(RuleError::IntegrityViolation { error }))
}

#[wasm_bindgen(js_name = "checkOutcome")]
pub fn check_outcome(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_js(board)?;
    board
        .integrity_check()
        .map_err(|error| to_js_error(RuleError::IntegrityViolation { error }))?;
    to_js(&evaluate_outcome(&board))
}

/// 落子并返回新棋盘与对局结果；原棋盘对象不会被修改。
#[wasm_bindgen(js_name = "applyMove")]
pub fn apply_move_js(
    board: JsValue,
    coordinate: JsValue,
    mark: &str,
) -> Result<JsValue, JsValue> {
    let mut board: Board = from_js(board)?;
    let coordinate: Coordinate = from_js(coordinate)?;
    let mark: Mark = parse_mark(mark).map_err(to_js_error)?;
    apply_move(&mut board, coordinate, mark).map_err(to_js_error)?;
    to_js(&MoveResolution::new(board))
}

#[wasm_bindgen(js_name = "computeAiMove")]
pub fn compute_ai_move(request: JsValue) -> Result<JsValue, JsValue> {
    let request: MoveRequest = from_js(request)?;
    let decision = request.decide().map_err(to_js_error)?;
    to_js(&decision)
}

#[wasm_bindgen(js_name = "computeAiMoveJson")]
pub fn compute_ai_move_json(request_json: &str) -> Result<String, JsValue> {
    let request: MoveRequest = serde_json::from_str(request_json).map_err(serde_to_js_error)?;
    let decision = request.decide().map_err(to_js_error)?;
    serde_json::to_string(&decision).map_err(serde_to_js_error)
}

/// 异步版本：可选延迟后再计算，便于前端展示“思考中”。
#[wasm_bindgen(js_name = "thinkAi")]
pub fn think_ai(request: JsValue, delay_ms: Option<u32>) -> Promise {
    let delay = delay_ms.unwrap_or(0);

    future_to_promise(async move {
        let request: MoveRequest = from_js(request)?;
        if delay > 0 {
            TimeoutFuture::new(delay).await;
        }
        let decision = request.decide().map_err(to_js_error)?;
        to_js(&decision)
    })
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
