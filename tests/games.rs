use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tictactoe_ai::{
    apply_move, decide, evaluate_outcome, AiAgent, AiConfig, AiDifficulty, Board, Coordinate,
    GameOutcome, Mark, MarkAssignment,
};

fn impossible() -> AiConfig {
    AiConfig::from_difficulty(AiDifficulty::Impossible)
}

fn ai_move(board: &Board, marks: MarkAssignment) -> Coordinate {
    let mut rng = SmallRng::seed_from_u64(0);
    decide(board, &impossible(), marks, &mut rng)
        .expect("engine should accept a legal board")
        .coordinate
        .expect("unfinished game always has an open cell")
}

fn play(board: &mut Board, coordinate: Coordinate, mark: Mark) -> GameOutcome {
    apply_move(board, coordinate, mark).expect("engine must only pick open cells")
}

/// Explores every line the human can choose against the Impossible engine.
fn explore_all_human_lines(board: Board, to_move: Mark, marks: MarkAssignment, games: &mut u32) {
    if evaluate_outcome(&board).is_finished() {
        *games += 1;
        assert_ne!(
            evaluate_outcome(&board),
            GameOutcome::Won { winner: marks.human },
            "human found a win:\n{board}"
        );
        return;
    }

    if to_move == marks.ai {
        let mut next = board;
        play(&mut next, ai_move(&board, marks), marks.ai);
        explore_all_human_lines(next, marks.human, marks, games);
    } else {
        for coordinate in board.open_cells() {
            let mut next = board;
            play(&mut next, coordinate, marks.human);
            explore_all_human_lines(next, marks.ai, marks, games);
        }
    }
}

#[test]
fn impossible_against_itself_is_a_draw() {
    let o_side = MarkAssignment::default();
    let x_side = o_side.swapped();
    let mut board = Board::empty();
    let mut to_move = Mark::X;

    loop {
        let marks = if to_move == Mark::X { x_side } else { o_side };
        let coordinate = ai_move(&board, marks);
        let outcome = play(&mut board, coordinate, to_move);
        if outcome.is_finished() {
            assert_eq!(outcome, GameOutcome::Draw, "final board:\n{board}");
            break;
        }
        to_move = to_move.opponent();
    }
    assert!(board.is_full());
}

#[test]
fn impossible_never_loses_when_moving_second() {
    let mut games = 0;
    explore_all_human_lines(Board::empty(), Mark::X, MarkAssignment::default(), &mut games);
    assert!(games > 0);
}

#[test]
fn impossible_never_loses_when_moving_first() {
    let mut games = 0;
    let marks = MarkAssignment::for_ai(Mark::X);
    explore_all_human_lines(Board::empty(), Mark::X, marks, &mut games);
    assert!(games > 0);
}

#[test]
fn impossible_holds_against_a_first_open_cell_opponent() {
    let marks = MarkAssignment::default();
    let mut board = Board::empty();
    let mut to_move = Mark::X;

    let outcome = loop {
        let coordinate = if to_move == marks.human {
            board.open_cells()[0]
        } else {
            ai_move(&board, marks)
        };
        let outcome = play(&mut board, coordinate, to_move);
        if outcome.is_finished() {
            break outcome;
        }
        to_move = to_move.opponent();
    };

    assert_ne!(outcome, GameOutcome::Won { winner: marks.human });
}

#[test]
fn impossible_survives_random_opponents() {
    let marks = MarkAssignment::default();
    for seed in 0..40 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut board = Board::empty();
        let mut to_move = if seed % 2 == 0 { marks.human } else { marks.ai };

        loop {
            let coordinate = if to_move == marks.human {
                *board
                    .open_cells()
                    .choose(&mut rng)
                    .expect("unfinished game always has an open cell")
            } else {
                ai_move(&board, marks)
            };
            let outcome = play(&mut board, coordinate, to_move);
            if outcome.is_finished() {
                assert_ne!(
                    outcome,
                    GameOutcome::Won { winner: marks.human },
                    "seed {seed}:\n{board}"
                );
                break;
            }
            to_move = to_move.opponent();
        }
    }
}

#[test]
fn hard_and_easy_games_always_finish_with_legal_moves() {
    let marks = MarkAssignment::default();
    for (seed, difficulty) in [(1, AiDifficulty::Easy), (2, AiDifficulty::Hard)] {
        let mut agent = AiAgent::with_seed(AiConfig::from_difficulty(difficulty), seed);
        let mut opponent = AiAgent::with_seed(AiConfig::default(), seed + 100);
        let mut board = Board::empty();
        let mut to_move = Mark::X;

        loop {
            let result = if to_move == marks.ai {
                agent.decide_move(&board, marks)
            } else {
                opponent.decide_move(&board, marks.swapped())
            };
            let decision = result.expect("legal board");
            let coordinate = decision.coordinate.expect("unfinished game has an open cell");
            if play(&mut board, coordinate, to_move).is_finished() {
                break;
            }
            to_move = to_move.opponent();
        }

        let mut rng = SmallRng::seed_from_u64(seed);
        if board.is_full() {
            let last = decide(&board, agent.config(), marks, &mut rng).expect("legal board");
            assert_eq!(last.coordinate, None);
        }
    }
}
