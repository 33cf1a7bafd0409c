//! Numeric Annotation Glyphs.

/// Move-suffix glyphs and the NAG each one stands for.
const SUFFIXES: [(&str, u8); 6] = [
    ("!!", 3),
    ("??", 4),
    ("!?", 5),
    ("?!", 6),
    ("!", 1),
    ("?", 2),
];

/// Display symbol for the common NAG codes.
pub fn glyph(nag: u8) -> Option<&'static str> {
    let symbol = match nag {
        1 => "!",
        2 => "?",
        3 => "!!",
        4 => "??",
        5 => "!?",
        6 => "?!",
        7 => "□",
        10 => "=",
        13 => "∞",
        14 => "+=",
        15 => "=+",
        16 => "±",
        17 => "∓",
        18 => "+-",
        19 => "-+",
        22 | 23 => "⨀",
        32 | 33 => "⟳",
        36 | 37 => "→",
        40 | 41 => "↑",
        132 | 133 => "⇆",
        138 | 139 => "⊕",
        146 => "N",
        _ => return None,
    };
    Some(symbol)
}

/// Split a trailing `!`/`?` glyph off a move token, e.g. `Nf3?!` -> (`Nf3`, Some(6)).
pub fn split_suffix(token: &str) -> (&str, Option<u8>) {
    for (suffix, nag) in SUFFIXES {
        if let Some(stripped) = token.strip_suffix(suffix) {
            if !stripped.is_empty() {
                return (stripped, Some(nag));
            }
        }
    }
    (token, None)
}

/// Parse the digits of a `$N` token.
pub fn parse_dollar(token: &str) -> Option<u8> {
    token.strip_prefix('$')?.parse().ok()
}
