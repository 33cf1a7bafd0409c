use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::{Chess, EnPassantMode, Position};

#[allow(unused_imports)]
pub use chess_core::STANDARD_START_FEN;

/// Play SAN moves from the initial position with shakmaty directly and return the FEN.
pub fn fen_after(sans: &[&str]) -> String {
    let mut pos = Chess::default();
    for san in sans {
        let mv = san
            .parse::<San>()
            .unwrap()
            .to_move(&pos)
            .unwrap_or_else(|e| panic!("{san} should be legal: {e}"));
        pos.play_unchecked(mv);
    }
    Fen::from_position(&pos, EnPassantMode::Legal).to_string()
}

/// A small annotated study used across tests.
pub const ANNOTATED_STUDY: &str = r#"[Event "Opening study"]
[Site "Club"]
[Result "*"]

{The open games} 1. e4 $1 {strong} e5 (1... c5 2. Nf3 (2. Nc3 Nc6) 2... d6)
(1... e6 2. d4 d5) 2. Nf3 Nc6 3. Bb5!? a6 *
"#;
