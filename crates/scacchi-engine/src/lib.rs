//! Search and evaluation for scacchi.

pub mod eval;
pub mod score;
pub mod search;

pub use eval::{eval, Parameters, Tunables};
pub use score::{is_mate, Score, INF, MATE};
pub use search::control::Constraint;
pub use search::tt::{ScoreType, TranspositionTable};
pub use search::{Search, SearchReport, PLY};
