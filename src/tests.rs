#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::num::NonZero;

    use itertools::Itertools;
    use proptest::prelude::*;
    use strum::VariantArray;

    use crate::level::{Level, LevelError, LevelInvalidReason, BUILTIN};
    use crate::path::Path;
    use crate::session::{DrawState, Outcome, PointerDevice, PointerEvent, PointerEventKind, Session};
    use crate::shape::{SquareStep, Step};
    use crate::solver::SolverFailure;
    use crate::{Board, Cell};

    // A..A
    // B...
    // ....
    // B...
    const TWO_LINES: &str = "a2ab7b3";
    const TOUCH: PointerDevice = PointerDevice::Touch;

    fn color(id: usize) -> crate::Color {
        NonZero::new(id).unwrap()
    }

    fn session(encoded: &str) -> Session {
        encoded.parse().unwrap()
    }

    fn drag(session: &mut Session, cells: &[usize]) {
        let (first, rest) = cells.split_first().unwrap();
        assert_eq!(session.pointer_down(Some(*first), TOUCH), Outcome::Changed);
        for cell in rest {
            assert_eq!(session.pointer_move(Some(*cell)), Outcome::Changed);
        }
        assert_eq!(session.pointer_up(), Outcome::Consumed);
    }

    fn path_of(session: &Session, id: usize) -> Vec<usize> {
        session.paths().get(color(id)).map(|path| path.cells().to_vec()).unwrap_or_default()
    }

    fn exits_of(session: &Session, index: usize) -> HashSet<SquareStep> {
        session.board().cell(index).unwrap().exits().clone()
    }

    fn snapshot(session: &Session) -> Vec<Cell> {
        session.board().cells().cloned().collect_vec()
    }

    #[test]
    fn decode_builtin() {
        let level = Level::decode(BUILTIN[0]).unwrap();
        assert_eq!(level.size(), 3);
        assert_eq!(level.values(), &[1, 0, 1, 2, 3, 0, 0, 2, 3]);
        assert_eq!(format!("{}", Board::from(&level)), "A.A
BC.
.BC
");

        assert_eq!(Level::decode(BUILTIN[1]).unwrap().size(), 8);
        assert_eq!(Level::decode(BUILTIN[2]).unwrap().size(), 15);
    }

    #[test]
    fn decode_runs_and_letters() {
        let level = Level::decode("1a1a").unwrap();
        assert_eq!(level.size(), 2);
        assert_eq!(level.values(), &[0, 1, 0, 1]);

        // case does not matter; multi-digit runs are one number
        assert_eq!(Level::decode("A1Abc2BC").unwrap(), Level::decode("a1abc2bc").unwrap());
        assert_eq!(Level::decode("z15").unwrap().values()[0], 26);
        assert_eq!(Level::decode("12a3").unwrap().values().len(), 16);
    }

    #[test]
    fn decode_rejects_non_square() {
        assert_eq!(Level::decode("1a1"), Err(LevelError::NotSquare { cells: 3 }));
        assert_eq!(Level::decode("a3a"), Err(LevelError::NotSquare { cells: 5 }));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_eq!(Level::decode("a-3"), Err(LevelError::UnexpectedCharacter { character: '-', offset: 1 }));
        assert_eq!(Level::decode("a 3"), Err(LevelError::UnexpectedCharacter { character: ' ', offset: 1 }));
        assert_eq!(Level::decode(""), Err(LevelError::Empty));
        assert_eq!(Level::decode("0"), Err(LevelError::Empty));
        assert_eq!(Level::decode("99999"), Err(LevelError::TooLarge));
        assert!(matches!(
            Level::decode("a99999999999999999999999"),
            Err(LevelError::BadRunLength { offset: 1, .. })
        ));
    }

    #[test]
    fn decode_caps_size() {
        assert_eq!(Level::decode("16384").unwrap().size(), 128);
        assert_eq!(Level::decode("16383a").unwrap().values().len(), 16384);
        assert_eq!(Level::decode("16385"), Err(LevelError::TooLarge));
        assert_eq!(Level::decode("16384a"), Err(LevelError::TooLarge));
        // 129 by 129
        assert_eq!(Level::decode("16641"), Err(LevelError::TooLarge));
    }

    #[test]
    fn encode_is_canonical() {
        for encoded in BUILTIN {
            assert_eq!(Level::decode(encoded).unwrap().to_string(), encoded);
        }

        // zero-length runs vanish
        assert_eq!(Level::decode("a0b2").unwrap().to_string(), "ab2");
    }

    #[test]
    fn validate_pairs() {
        for encoded in BUILTIN {
            assert_eq!(Level::decode(encoded).unwrap().validate(), Ok(()));
        }

        assert_eq!(Level::decode("a3").unwrap().validate(), Err(vec![
            LevelInvalidReason::UnpairedColor { color: 1, count: 1 },
        ]));
        assert_eq!(Level::decode("baaa").unwrap().validate(), Err(vec![
            LevelInvalidReason::UnpairedColor { color: 1, count: 3 },
            LevelInvalidReason::UnpairedColor { color: 2, count: 1 },
        ]));
    }

    #[test]
    fn direction_between_neighbors() {
        let board = Board::from(&Level::decode("9").unwrap());

        assert_eq!(board.direction_between(0, 1), Some(SquareStep::Right));
        assert_eq!(board.direction_between(1, 0), Some(SquareStep::Left));
        assert_eq!(board.direction_between(0, 3), Some(SquareStep::Down));
        assert_eq!(board.direction_between(7, 4), Some(SquareStep::Up));
        // same cell, row wrap, diagonal, two apart, off the board
        assert_eq!(board.direction_between(4, 4), None);
        assert_eq!(board.direction_between(2, 3), None);
        assert_eq!(board.direction_between(0, 4), None);
        assert_eq!(board.direction_between(0, 2), None);
        assert_eq!(board.direction_between(8, 9), None);
    }

    proptest! {
        #[test]
        fn direction_between_inverts_when_swapped(size in 1usize..9, a in 0usize..90, b in 0usize..90) {
            let board = Board::from(&Level::decode(&(size * size).to_string()).unwrap());
            prop_assert_eq!(board.direction_between(a, b).map(|d| d.invert()), board.direction_between(b, a));
        }

        #[test]
        fn trim_leaves_no_dangling_exits(steps in prop::collection::vec(0usize..4, 1..24), keep in 0usize..26) {
            let mut board = Board::from(&Level::decode("a15").unwrap());
            let mut path = Path::new(color(1));
            path.push(0);

            for step in steps {
                let from = path.tail().unwrap();
                let direction = SquareStep::VARIANTS[step];
                let Some(to) = board.location_of(from).and_then(|l| board.index_of(direction.attempt_from(l))) else {
                    continue;
                };
                if board.cell(to).unwrap().color().is_some() {
                    continue;
                }
                path.extend(&mut board, from, to, direction);
            }

            let before = path.len();
            path.trim(&mut board, keep);
            let expected_len = match keep.max(1).min(before) {
                1 => 0,
                n => n,
            };
            prop_assert_eq!(path.len(), expected_len);

            for index in 0..16 {
                let cell = board.cell(index).unwrap();
                prop_assert!(!cell.is_completed());
                match path.position(index) {
                    None => {
                        prop_assert!(cell.exits().is_empty());
                        prop_assert_eq!(cell.color().is_some(), cell.is_terminus());
                    }
                    Some(position) => {
                        let expected = (position > 0) as usize + (position + 1 < path.len()) as usize;
                        prop_assert_eq!(cell.exits().len(), expected);
                        prop_assert_eq!(cell.color(), Some(color(1)));
                    }
                }
            }
        }
    }

    #[test]
    fn draw_complete_line() {
        let mut session = session(TWO_LINES);
        drag(&mut session, &[0, 1, 2, 3]);

        assert_eq!(session.state(), DrawState::Idle);
        assert_eq!(path_of(&session, 1), vec![0, 1, 2, 3]);
        assert_eq!(format!("{}", session.board()), "AaaA
B...
....
B...
");
        for index in 0..4 {
            let cell = session.board().cell(index).unwrap();
            assert!(cell.is_completed());
            assert_eq!(cell.color(), Some(color(1)));
        }
        assert!(!session.board().cell(4).unwrap().is_completed());

        assert_eq!(exits_of(&session, 0), HashSet::from([SquareStep::Right]));
        assert_eq!(exits_of(&session, 1), HashSet::from([SquareStep::Left, SquareStep::Right]));
        assert_eq!(exits_of(&session, 3), HashSet::from([SquareStep::Left]));
    }

    #[test]
    fn draw_from_either_end() {
        let mut session = session(TWO_LINES);
        drag(&mut session, &[12, 8, 4]);

        assert_eq!(path_of(&session, 2), vec![12, 8, 4]);
        assert!(session.board().cell(8).unwrap().is_completed());
        assert_eq!(exits_of(&session, 8), HashSet::from([SquareStep::Up, SquareStep::Down]));
    }

    #[test]
    fn press_middle_of_line_cuts_it() {
        let mut session = session(TWO_LINES);
        drag(&mut session, &[0, 1, 2]);

        assert_eq!(session.pointer_down(Some(1), TOUCH), Outcome::Changed);
        assert_eq!(session.pointer_up(), Outcome::Consumed);

        assert_eq!(path_of(&session, 1), vec![0, 1]);
        assert_eq!(session.current(), Some(1));
        assert_eq!(session.board().cell(2).unwrap().color(), None);
        assert!(exits_of(&session, 2).is_empty());
        assert_eq!(exits_of(&session, 1), HashSet::from([SquareStep::Left]));
        assert!(session.board().cells().all(|cell| !cell.is_completed()));
    }

    #[test]
    fn press_middle_of_completed_line_uncompletes_it() {
        let mut session = session(TWO_LINES);
        drag(&mut session, &[0, 1, 2, 3]);

        session.pointer_down(Some(1), TOUCH);
        session.pointer_up();

        assert_eq!(path_of(&session, 1), vec![0, 1]);
        assert_eq!(format!("{}", session.board()), "Aa.A
B...
....
B...
");
        assert!(session.board().cells().all(|cell| !cell.is_completed()));
        assert!(exits_of(&session, 3).is_empty());
    }

    #[test]
    fn drag_back_over_line_cuts_it() {
        let mut session = session(TWO_LINES);
        session.pointer_down(Some(4), TOUCH);
        session.pointer_move(Some(5));
        session.pointer_move(Some(6));
        session.pointer_move(Some(10));

        assert_eq!(session.pointer_move(Some(6)), Outcome::Changed);
        assert_eq!(path_of(&session, 2), vec![4, 5, 6]);
        assert_eq!(session.current(), Some(6));
        assert_eq!(session.board().cell(10).unwrap().color(), None);

        // and keeps drawing from where it was cut
        assert_eq!(session.pointer_move(Some(7)), Outcome::Changed);
        assert_eq!(path_of(&session, 2), vec![4, 5, 6, 7]);
    }

    #[test]
    fn drag_back_onto_start_empties_line() {
        let mut session = session(TWO_LINES);
        session.pointer_down(Some(0), TOUCH);
        session.pointer_move(Some(1));

        assert_eq!(session.pointer_move(Some(0)), Outcome::Changed);
        assert!(path_of(&session, 1).is_empty());
        assert_eq!(session.current(), None);
        assert!(exits_of(&session, 0).is_empty());

        // nothing to draw from until the next press
        assert_eq!(session.pointer_move(Some(1)), Outcome::Consumed);
        assert_eq!(session.board().cell(1).unwrap().color(), None);
    }

    #[test]
    fn other_colors_block() {
        let mut session = session(TWO_LINES);
        drag(&mut session, &[0, 1]);

        session.pointer_down(Some(4), TOUCH);
        session.pointer_move(Some(5));
        let before = snapshot(&session);

        // painted cell of another color
        assert_eq!(session.pointer_move(Some(1)), Outcome::Consumed);
        assert_eq!(snapshot(&session), before);
        assert_eq!(session.current(), Some(5));

        session.pointer_move(Some(6));
        session.pointer_move(Some(7));
        let before = snapshot(&session);

        // terminus of another color
        assert_eq!(session.pointer_move(Some(3)), Outcome::Consumed);
        assert_eq!(snapshot(&session), before);

        assert_eq!(path_of(&session, 1), vec![0, 1]);
        assert_eq!(path_of(&session, 2), vec![4, 5, 6, 7]);
    }

    #[test]
    fn moves_must_be_single_steps() {
        let mut session = session(TWO_LINES);
        session.pointer_down(Some(0), TOUCH);
        let before = snapshot(&session);

        assert_eq!(session.pointer_move(Some(5)), Outcome::Ignored);
        assert_eq!(session.pointer_move(Some(2)), Outcome::Ignored);
        assert_eq!(session.pointer_move(None), Outcome::Ignored);
        assert_eq!(session.pointer_move(Some(99)), Outcome::Ignored);
        assert_eq!(session.pointer_move(Some(0)), Outcome::Consumed);

        assert_eq!(snapshot(&session), before);
        assert_eq!(path_of(&session, 1), vec![0]);
    }

    #[test]
    fn terminus_ends_the_line() {
        let mut session = session(TWO_LINES);
        session.pointer_down(Some(0), TOUCH);
        for cell in [1, 2, 3] {
            session.pointer_move(Some(cell));
        }

        let outcome = session.pointer_move(Some(7));
        assert_eq!(outcome, Outcome::Consumed);
        assert!(outcome.prevent_default());
        assert_eq!(session.board().cell(7).unwrap().color(), None);
        assert_eq!(path_of(&session, 1), vec![0, 1, 2, 3]);
    }

    #[test]
    fn pressing_terminus_starts_over() {
        let mut session = session(TWO_LINES);
        drag(&mut session, &[0, 1, 2, 3]);

        assert_eq!(session.pointer_down(Some(0), TOUCH), Outcome::Changed);
        assert_eq!(path_of(&session, 1), vec![0]);
        assert_eq!(format!("{}", session.board()), "A..A
B...
....
B...
");
        assert!(session.board().cells().all(|cell| !cell.is_completed() && cell.exits().is_empty()));
    }

    #[test]
    fn pressing_tracked_cell_again_keeps_line() {
        let mut session = session(TWO_LINES);
        drag(&mut session, &[0, 1, 2, 3]);

        assert_eq!(session.pointer_down(Some(3), TOUCH), Outcome::Consumed);
        assert_eq!(path_of(&session, 1), vec![0, 1, 2, 3]);
        assert!(session.board().cell(0).unwrap().is_completed());
    }

    #[test]
    fn ignored_presses() {
        let mut session = session(TWO_LINES);

        assert_eq!(session.pointer_down(Some(5), TOUCH), Outcome::Ignored);
        assert_eq!(session.pointer_down(None, TOUCH), Outcome::Ignored);
        assert_eq!(session.pointer_down(Some(0), PointerDevice::Mouse { primary: false }), Outcome::Ignored);
        assert_eq!(session.state(), DrawState::Idle);
        assert_eq!(session.moves(), 0);

        assert_eq!(session.pointer_move(Some(1)), Outcome::Ignored);
        assert_eq!(session.pointer_up(), Outcome::Ignored);

        assert_eq!(session.pointer_down(Some(0), PointerDevice::Mouse { primary: true }), Outcome::Changed);
        assert_eq!(session.state(), DrawState::Drawing(color(1)));
    }

    #[test]
    fn handle_dispatches_events() {
        let mut session = session(TWO_LINES);
        let event = |kind, target| PointerEvent { kind, target, device: PointerDevice::Pen };

        assert_eq!(session.handle(event(PointerEventKind::Down, Some(4))), Outcome::Changed);
        assert_eq!(session.handle(event(PointerEventKind::Move, Some(8))), Outcome::Changed);
        assert_eq!(session.handle(event(PointerEventKind::Move, Some(12))), Outcome::Changed);
        assert_eq!(session.handle(event(PointerEventKind::Up, None)), Outcome::Consumed);
        assert!(session.board().cell(12).unwrap().is_completed());
    }

    #[test]
    fn moves_count_color_switches() {
        let mut session = session(TWO_LINES);
        drag(&mut session, &[0, 1]);
        assert_eq!(session.moves(), 1);

        // same color again
        drag(&mut session, &[3, 2]);
        assert_eq!(session.moves(), 1);

        drag(&mut session, &[4, 5]);
        drag(&mut session, &[0]);
        assert_eq!(session.moves(), 3);
    }

    #[test]
    fn outcome_flags() {
        assert!(!Outcome::Ignored.prevent_default());
        assert!(Outcome::Consumed.prevent_default());
        assert!(Outcome::Changed.prevent_default());
        assert!(Outcome::Changed.changed());
        assert!(!Outcome::Consumed.changed());
    }

    #[test]
    fn load_replaces_session() {
        let mut session = session(TWO_LINES);
        drag(&mut session, &[0, 1]);

        assert_eq!(session.load("a1"), Err(LevelError::NotSquare { cells: 2 }));
        assert_eq!(path_of(&session, 1), vec![0, 1]);
        assert_eq!(session.board().size(), 4);

        session.load(BUILTIN[0]).unwrap();
        assert_eq!(session.board().size(), 3);
        assert_eq!(session.paths().iter().count(), 0);
        assert_eq!(session.moves(), 0);
        assert_eq!(session.current(), None);
    }

    #[test]
    fn solve_most_basic() {
        let solved = Level::decode(BUILTIN[0]).unwrap().solve().unwrap();
        assert_eq!(format!("{}", solved), "AaA
BCc
bBC
");
        assert!(solved.cells().all(Cell::is_completed));
        assert_eq!(solved.cell(1).unwrap().exits(), &HashSet::from([SquareStep::Left, SquareStep::Right]));
        assert_eq!(solved.cell(3).unwrap().exits(), &HashSet::from([SquareStep::Down]));
    }

    #[test]
    fn solve_classic_level() {
        // flow free classic pack level 1
        let level = Level::decode("a1b1d2c1e6b1d2ace1").unwrap();
        assert_eq!(format!("{}", Board::from(&level)), "A.B.D
..C.E
.....
.B.D.
.ACE.
");

        let solved = level.solve().unwrap();
        assert_eq!(format!("{}", solved), "AbBdD
abCdE
abcde
aBcDe
aACEe
");
        for cell in solved.cells() {
            assert_eq!(cell.exits().len(), if cell.is_terminus() { 1 } else { 2 });
        }
    }

    #[test]
    fn solve_unsolvable() {
        assert_eq!(Level::decode("ab2").unwrap().solve().unwrap_err(), SolverFailure::Inconsistent);
        assert_eq!(Level::decode("a2b").unwrap().solve().unwrap_err(), SolverFailure::Inconsistent);
    }

    #[test]
    fn reveal_draws_solution() {
        let mut session = session(BUILTIN[0]);
        drag(&mut session, &[3, 6]);

        session.reveal().unwrap();
        assert_eq!(format!("{}", session.board()), "AaA
BCc
bBC
");
        assert_eq!(path_of(&session, 1), vec![0, 1, 2]);
        assert_eq!(path_of(&session, 2), vec![3, 6, 7]);
        assert_eq!(path_of(&session, 3), vec![4, 5, 8]);
        assert!(session.board().cells().all(Cell::is_completed));

        // revealed lines can be edited like drawn ones
        drag(&mut session, &[1]);
        assert_eq!(path_of(&session, 1), vec![0, 1]);
        assert!(!session.board().cell(0).unwrap().is_completed());
        assert!(session.board().cell(3).unwrap().is_completed());
    }

    #[test]
    fn reveal_unsolvable_keeps_session() {
        let mut session = session("ab2");
        drag(&mut session, &[0, 2]);

        assert_eq!(session.reveal(), Err(SolverFailure::Inconsistent));
        assert_eq!(path_of(&session, 1), vec![0, 2]);
    }

    #[cfg(feature = "wasm")]
    #[test]
    fn game_reports_cell_state() {
        use crate::wasm::Game;

        let Ok(mut game) = Game::new(TWO_LINES) else {
            panic!("level should decode");
        };
        assert_eq!(game.size(), 4);
        assert_eq!(game.termini(), vec![1, 0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0]);

        assert!(game.pointer_down(Some(0), Some(0)));
        for cell in [1, 2, 3] {
            assert!(game.pointer_move(Some(cell)));
        }
        assert!(game.pointer_up());

        assert_eq!(game.colors(), vec![1, 1, 1, 1, 2, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0]);
        assert_eq!(game.exits(), vec![8, 12, 12, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(game.completed(), vec![1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(game.moves(), 1);

        // vertical links
        assert!(game.pointer_down(Some(4), None));
        assert!(game.pointer_move(Some(8)));
        assert_eq!(game.exits()[4], 2);
        assert_eq!(game.exits()[8], 1);
        assert!(!game.pointer_move(Some(6)));
        assert!(game.pointer_up());
    }

    #[cfg(feature = "wasm")]
    #[test]
    fn game_ignores_secondary_buttons() {
        use crate::wasm::Game;

        let Ok(mut game) = Game::new(TWO_LINES) else {
            panic!("level should decode");
        };

        assert!(!game.pointer_down(Some(0), Some(2)));
        assert!(!game.pointer_down(Some(0), Some(1)));
        assert!(!game.pointer_move(Some(1)));
        assert!(!game.pointer_up());
        assert_eq!(game.moves(), 0);

        // pens and touches report no button
        assert!(game.pointer_down(Some(0), None));
        assert!(game.pointer_move(Some(1)));
        assert_eq!(game.colors()[1], 1);
    }
}
