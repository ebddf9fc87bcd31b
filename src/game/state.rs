use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use derive_more::{Display, Error};

use super::rules;

/// 棋盘边长，固定为 3。
pub const BOARD_SIZE: usize = 3;

/// 棋子标记。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => f.write_str("X"),
            Mark::O => f.write_str("O"),
        }
    }
}

impl FromStr for Mark {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "X" => Ok(Mark::X),
            "O" => Ok(Mark::O),
            _ => Err(BoardError::UnknownMark {
                value: s.to_string(),
            }),
        }
    }
}

/// 单个格子：空，或被某一方占据。序列化为 `null` / `"X"` / `"O"`。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(from = "Option<Mark>", into = "Option<Mark>")]
pub enum Cell {
    #[default]
    Empty,
    Marked(Mark),
}

impl Cell {
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::Marked(mark) => Some(mark),
        }
    }
}

impl From<Option<Mark>> for Cell {
    fn from(value: Option<Mark>) -> Self {
        value.map_or(Cell::Empty, Cell::Marked)
    }
}

impl From<Cell> for Option<Mark> {
    fn from(cell: Cell) -> Self {
        cell.mark()
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        Cell::Marked(mark)
    }
}

/// 行列坐标，两者均在 `[0, 2]` 内。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "RawCoordinate", into = "RawCoordinate")]
pub struct Coordinate {
    row: usize,
    col: usize,
}

impl Coordinate {
    pub fn new(row: usize, col: usize) -> Result<Self, BoardError> {
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return Err(BoardError::OutOfBounds { row, col });
        }
        Ok(Self { row, col })
    }

    pub(crate) const fn at(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn row(self) -> usize {
        self.row
    }

    pub fn col(self) -> usize {
        self.col
    }

    /// 按行优先顺序遍历全部格子。
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Coordinate::at(row, col)))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCoordinate {
    row_idx: usize,
    col_idx: usize,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = BoardError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.row_idx, raw.col_idx)
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(coordinate: Coordinate) -> Self {
        Self {
            row_idx: coordinate.row,
            col_idx: coordinate.col,
        }
    }
}

/// 棋盘结构错误。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Display, Error)]
#[serde(tag = "type")]
pub enum BoardError {
    #[display("board must be 3x3, got {rows} rows with lengths {row_lengths:?}")]
    InvalidDimensions {
        rows: usize,
        row_lengths: Vec<usize>,
    },
    #[display("coordinate ({row}, {col}) is outside the 3x3 board")]
    OutOfBounds { row: usize, col: usize },
    #[display("both marks own a completed line")]
    MultipleWinners,
    #[display("unknown mark {value:?}")]
    UnknownMark { value: String },
}

/// 3x3 棋盘，按行存储。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(try_from = "Vec<Vec<Cell>>", into = "Vec<Vec<Cell>>")]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: [[Cell; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self { cells }
    }

    /// 从文本行构建棋盘：`X`、`O` 为棋子，`_`、`.`、`-` 为空格，例如 `["XX_", "OO_", "___"]`。
    pub fn from_rows(rows: [&str; BOARD_SIZE]) -> Result<Self, BoardError> {
        let symbol_rows: Vec<Vec<char>> = rows
            .iter()
            .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect())
            .collect();
        if symbol_rows.iter().any(|symbols| symbols.len() != BOARD_SIZE) {
            return Err(BoardError::InvalidDimensions {
                rows: BOARD_SIZE,
                row_lengths: symbol_rows.iter().map(Vec::len).collect(),
            });
        }

        let mut board = Board::empty();
        for (row, symbols) in symbol_rows.into_iter().enumerate() {
            for (col, symbol) in symbols.into_iter().enumerate() {
                board.cells[row][col] = match symbol {
                    '_' | '.' | '-' => Cell::Empty,
                    other => Cell::Marked(other.to_string().parse()?),
                };
            }
        }
        Ok(board)
    }

    pub fn cells(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    pub fn cell(&self, coordinate: Coordinate) -> Cell {
        self.cells[coordinate.row][coordinate.col]
    }

    pub(crate) fn set(&mut self, coordinate: Coordinate, cell: Cell) {
        self.cells[coordinate.row][coordinate.col] = cell;
    }

    /// 临时写入 `cell` 并执行 `f`，结束后恢复原值。
    pub fn with_cell<T>(
        &mut self,
        coordinate: Coordinate,
        cell: Cell,
        f: impl FnOnce(&mut Board) -> T,
    ) -> T {
        let previous = self.cell(coordinate);
        self.set(coordinate, cell);
        let result = f(self);
        self.set(coordinate, previous);
        result
    }

    pub fn open_cells(&self) -> Vec<Coordinate> {
        Coordinate::all()
            .filter(|&coordinate| self.cell(coordinate).is_empty())
            .collect()
    }

    pub fn has_open_cells(&self) -> bool {
        self.cells.iter().flatten().any(|cell| cell.is_empty())
    }

    pub fn is_full(&self) -> bool {
        !self.has_open_cells()
    }

    pub fn count(&self, mark: Mark) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.mark() == Some(mark))
            .count()
    }

    pub fn integrity_check(&self) -> Result<(), BoardError> {
        if rules::has_won(self, Mark::X) && rules::has_won(self, Mark::O) {
            return Err(BoardError::MultipleWinners);
        }
        Ok(())
    }
}

impl TryFrom<Vec<Vec<Cell>>> for Board {
    type Error = BoardError;

    fn try_from(rows: Vec<Vec<Cell>>) -> Result<Self, Self::Error> {
        if rows.len() != BOARD_SIZE || rows.iter().any(|row| row.len() != BOARD_SIZE) {
            return Err(BoardError::InvalidDimensions {
                rows: rows.len(),
                row_lengths: rows.iter().map(Vec::len).collect(),
            });
        }

        let mut board = Board::empty();
        for (row, cells) in rows.into_iter().enumerate() {
            for (col, cell) in cells.into_iter().enumerate() {
                board.cells[row][col] = cell;
            }
        }
        Ok(board)
    }
}

impl From<Board> for Vec<Vec<Cell>> {
    fn from(board: Board) -> Self {
        board.cells.iter().map(|row| row.to_vec()).collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, row) in self.cells.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            for cell in row {
                match cell {
                    Cell::Empty => f.write_str("_")?,
                    Cell::Marked(mark) => write!(f, "{mark}")?,
                }
            }
        }
        Ok(())
    }
}
