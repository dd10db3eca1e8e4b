//! Game state on the controller side: the position history, the engine's
//! side, the clock, and the transposition table that lives across moves.

use std::time::Duration;

use tracing::info;

use scacchi_core::{Color, FenError, Move, Position};
use scacchi_engine::{Search, SearchReport, TranspositionTable};

/// Clock bookkeeping for the three time-control styles.
#[derive(Debug, Clone, Default)]
struct TimeInfo {
    /// Fixed cap per move (`st`), also the cap in the other modes.
    max_time: Option<Duration>,
    /// Moves per period; 0 means sudden death.
    moves_per_tc: u32,
    /// Period length.
    tc: Duration,
    moves_left: u32,
    time_left: Duration,
}

impl TimeInfo {
    /// Fraction of the period kept in reserve against overhead.
    const SECURITY_MARGIN: f64 = 0.03;

    fn level(&mut self, moves: u32, time: Duration) {
        info!(moves, seconds = time.as_secs(), "setting time control");
        self.moves_per_tc = moves;
        self.tc = time;
        self.moves_left = moves;
        self.time_left = time;
    }

    fn time(&mut self, t: Duration) {
        info!(
            from_ms = self.time_left.as_millis() as u64,
            to_ms = t.as_millis() as u64,
            "updating time to next time control"
        );
        self.time_left = t;
    }

    /// Millisecond budget for the move about to be searched. `None`
    /// means unlimited.
    fn time_for_next_move(&mut self) -> Option<Duration> {
        if self.time_left.is_zero() {
            self.time_left = Duration::from_millis(100);
        }

        // Fixed time per move (or no limit at all).
        if self.moves_per_tc == 0 && self.tc.is_zero() {
            return self.max_time;
        }

        let t = if self.moves_per_tc == 0 {
            // Sudden death: always assume thirty moves remain. Each move
            // spends a thirtieth of what is left, so the engine speeds up
            // as the game goes on, which is what it should do anyway.
            self.time_left / 30
        } else {
            // Tournament control: X moves in Y, with a small reserve.
            if self.moves_left == 0 {
                self.moves_left = self.moves_per_tc;
            }
            let margin =
                1u32.min((f64::from(self.moves_per_tc) * Self::SECURITY_MARGIN) as u32);
            let t = self.time_left / (self.moves_left + margin);
            self.moves_left -= 1;
            t
        };

        let t = match self.max_time {
            Some(cap) => t.min(cap),
            None => t,
        };

        info!(ms = t.as_millis() as u64, "time for next move");
        Some(t)
    }
}

/// One game from the controller's point of view.
pub struct Game {
    states: Vec<Position>,
    tt: TranspositionTable,
    computer_side: Option<Color>,
    max_depth: Option<u32>,
    /// Emit `depth score centiseconds nodes pv` lines while searching.
    pub show_search_info: bool,
    /// Connected to a chess server (affects the base=0 clock rule).
    pub ics: bool,
    time_info: TimeInfo,
}

impl Game {
    /// Table size in buckets-log2 for a fresh game.
    const TT_BITS: u8 = 19;

    pub fn new() -> Game {
        Game {
            states: vec![Position::startpos()],
            tt: TranspositionTable::new(Self::TT_BITS),
            computer_side: None,
            max_depth: None,
            show_search_info: true,
            ics: false,
            time_info: TimeInfo::default(),
        }
    }

    /// The position being played.
    pub fn current(&self) -> &Position {
        debug_assert!(!self.states.is_empty());
        self.states.last().expect("game history never empty")
    }

    /// The hash path from the game's start, for repetition reporting.
    pub fn hashes(&self) -> Vec<u64> {
        self.states.iter().map(Position::hash).collect()
    }

    /// Play a move when legal; `false` leaves the game untouched.
    pub fn make_move(&mut self, m: Move) -> bool {
        if m.is_sentry() || !self.current().is_legal(m) {
            return false;
        }
        let mut next = self.current().clone();
        next.make_move(m);
        self.states.push(next);
        true
    }

    /// Take back `n` half-moves. At least the initial position stays.
    pub fn take_back(&mut self, n: usize) -> bool {
        if self.states.len() <= n {
            return false;
        }
        self.states.truncate(self.states.len() - n);
        true
    }

    /// Replace the game with a set-up position.
    pub fn set_board(&mut self, fen: &str) -> Result<(), FenError> {
        let pos: Position = fen.parse()?;
        self.states = vec![pos];
        Ok(())
    }

    pub fn computer_side(&self) -> Option<Color> {
        self.computer_side
    }

    pub fn set_computer_side(&mut self, side: Option<Color>) {
        self.computer_side = side;
    }

    /// Depth cap; `None` removes it.
    pub fn set_max_depth(&mut self, depth: Option<u32>) {
        self.max_depth = depth;
    }

    /// Fixed time per move; clears any depth cap.
    pub fn set_max_time(&mut self, t: Duration) {
        self.time_info.max_time = Some(t);
        self.max_depth = None;
    }

    pub fn level(&mut self, moves: u32, time: Duration) {
        self.time_info.level(moves, time);
    }

    pub fn update_time(&mut self, t: Duration) {
        self.time_info.time(t);
    }

    /// Search the current position under the active constraints and
    /// return the best move found (the sentry when there is none).
    ///
    /// In analysis mode there is no clock and no depth cap; the search
    /// runs until `input` reports a waiting command.
    pub fn think(
        &mut self,
        verbose: bool,
        analyze_mode: bool,
        input: Option<Box<dyn Fn() -> bool>>,
    ) -> Move {
        let mut search = Search::new(&self.states, &mut self.tt);

        if !analyze_mode {
            search.constraint.max_depth = self.max_depth;
            search.constraint.max_time = self.time_info.time_for_next_move();
        }
        search.constraint.input = input;

        search.run(|report| {
            if verbose {
                print_info(report);
            }
        })
    }
}

impl Default for Game {
    fn default() -> Game {
        Game::new()
    }
}

/// `depth score centiseconds nodes pv...`
fn print_info(report: &SearchReport) {
    let pv = report
        .pv
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "{} {} {} {} {}",
        report.depth,
        report.score,
        report.elapsed.as_millis() / 10,
        report.nodes,
        pv
    );
}

#[cfg(test)]
mod tests {
    use super::Game;
    use scacchi_core::Color;
    use std::time::Duration;

    #[test]
    fn plays_and_takes_back_moves() {
        let mut game = Game::new();
        let m = game.current().parse_move("e2e4");
        assert!(game.make_move(m));
        assert_eq!(game.current().side(), Color::Black);

        assert!(game.take_back(1));
        assert_eq!(game.current().side(), Color::White);
        // Can't take back past the start.
        assert!(!game.take_back(1));
    }

    #[test]
    fn rejects_illegal_moves() {
        use scacchi_core::{Move, Square};

        let mut game = Game::new();
        assert!(game.current().parse_move("e2e5").is_sentry());

        let count = game.hashes().len();
        assert!(!game.make_move(Move::sentry()));
        // A pawn cannot jump three ranks even with plausible flags.
        assert!(!game.make_move(Move::new(Square::E2, Square::E5, Move::PAWN)));
        assert_eq!(game.hashes().len(), count);
    }

    #[test]
    fn set_board_replaces_history() {
        let mut game = Game::new();
        game.make_move(game.current().parse_move("e2e4"));
        game.set_board("8/k7/3p4/p2P1p2/P2P1P2/8/8/K7 w - -").unwrap();
        assert_eq!(game.hashes().len(), 1);
        assert!(game.set_board("not a fen").is_err());
    }

    #[test]
    fn thinks_with_a_depth_cap() {
        let mut game = Game::new();
        game.set_max_depth(Some(2));
        let m = game.think(false, false, None);
        assert!(game.current().moves().contains(&m));
    }

    #[test]
    fn sentry_when_no_moves_exist() {
        let mut game = Game::new();
        game.set_board("7k/6Q1/5K2/8/8/8/8/8 b - -").unwrap();
        game.set_max_depth(Some(2));
        let m = game.think(false, false, None);
        assert!(m.is_sentry());
    }

    #[test]
    fn sudden_death_budget_shrinks_over_time() {
        let mut game = Game::new();
        game.level(0, Duration::from_secs(300));
        game.update_time(Duration::from_secs(300));
        let first = game.think_budget_for_test();
        game.update_time(Duration::from_secs(30));
        let second = game.think_budget_for_test();
        assert!(first > second);
        assert_eq!(first, Some(Duration::from_secs(10)));
        assert_eq!(second, Some(Duration::from_secs(1)));
    }

    #[test]
    fn tournament_budget_divides_the_period() {
        let mut game = Game::new();
        game.level(40, Duration::from_secs(600));
        let budget = game.think_budget_for_test().unwrap();
        // 40 moves to go plus the security move.
        assert_eq!(budget, Duration::from_secs(600) / 41);
    }

    #[test]
    fn fixed_time_per_move() {
        let mut game = Game::new();
        game.set_max_time(Duration::from_secs(7));
        assert_eq!(game.think_budget_for_test(), Some(Duration::from_secs(7)));
    }

    impl Game {
        fn think_budget_for_test(&mut self) -> Option<Duration> {
            self.time_info.time_for_next_move()
        }
    }
}
