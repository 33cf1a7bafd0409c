//! Tokenizer for PGN movetext.
//!
//! Works on bytes: every delimiter is ASCII, so slicing at delimiter offsets
//! always lands on a UTF-8 boundary even when comments contain other text.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// Move text with any leading move number removed, e.g. `Nf3` or `e4!?`.
    Move(&'a str),
    /// Inner text of a `{...}` block or a `;` line comment, untrimmed.
    Comment(&'a str),
    /// Raw `$N` token.
    Nag(&'a str),
    Open,
    Close,
    /// `1-0`, `0-1`, `1/2-1/2` or `*`.
    Result(&'a str),
}

pub(crate) struct Lexer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn bytes(&self) -> &'a [u8] {
        self.text.as_bytes()
    }

    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.bytes()[self.pos - 1] == b'\n'
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn rest_of_line(&mut self) -> &'a str {
        let bytes = self.bytes();
        let start = self.pos;
        while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }

    /// Brace comment; inner braces must balance. Unterminated comments run to the end.
    fn brace_comment(&mut self) -> &'a str {
        let bytes = self.bytes();
        let start = self.pos + 1;
        let mut depth = 1;
        let mut end = start;
        while end < bytes.len() {
            match bytes[end] {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            end += 1;
        }
        self.pos = (end + 1).min(bytes.len());
        &self.text[start..end]
    }

    fn word(&mut self) -> &'a str {
        let bytes = self.bytes();
        let start = self.pos;
        while self.pos < bytes.len() && !is_delimiter(bytes[self.pos]) {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }

    fn nag(&mut self) -> &'a str {
        let bytes = self.bytes();
        let start = self.pos;
        self.pos += 1;
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            self.skip_whitespace();
            let byte = *self.bytes().get(self.pos)?;

            match byte {
                b'{' => return Some(Token::Comment(self.brace_comment())),
                b';' => {
                    self.pos += 1;
                    return Some(Token::Comment(self.rest_of_line()));
                }
                b'%' if self.at_line_start() => {
                    self.rest_of_line();
                }
                b'(' => {
                    self.pos += 1;
                    return Some(Token::Open);
                }
                b')' => {
                    self.pos += 1;
                    return Some(Token::Close);
                }
                b'$' => return Some(Token::Nag(self.nag())),
                b'}' => self.pos += 1,
                _ => {
                    let word = self.word();
                    if is_result(word) {
                        return Some(Token::Result(word));
                    }
                    let mv = strip_move_number(word);
                    if !mv.is_empty() {
                        return Some(Token::Move(mv));
                    }
                }
            }
        }
    }
}

fn is_delimiter(byte: u8) -> bool {
    byte.is_ascii_whitespace() || matches!(byte, b'(' | b')' | b'{' | b'}' | b';' | b'$')
}

fn is_result(word: &str) -> bool {
    matches!(word, "1-0" | "0-1" | "1/2-1/2" | "½-½" | "*")
}

/// `12.` and `12...` vanish, `12.e4` becomes `e4`. Castling written as `0-0` is kept.
fn strip_move_number(word: &str) -> &str {
    let digits = word.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return word;
    }
    let rest = &word[digits..];
    if rest.is_empty() {
        return rest;
    }
    if rest.starts_with('.') {
        return rest.trim_start_matches('.');
    }
    word
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<Token<'_>> {
        Lexer::new(text).collect()
    }

    #[test]
    fn test_move_numbers_are_skipped() {
        assert_eq!(
            tokens("1. e4 e5 2.Nf3 2... Nc6 12...a6"),
            vec![
                Token::Move("e4"),
                Token::Move("e5"),
                Token::Move("Nf3"),
                Token::Move("Nc6"),
                Token::Move("a6"),
            ]
        );
    }

    #[test]
    fn test_comments_nags_and_variations() {
        assert_eq!(
            tokens("1. e4 $1 {strong {really}} (1. d4; queen pawn\n) 1-0"),
            vec![
                Token::Move("e4"),
                Token::Nag("$1"),
                Token::Comment("strong {really}"),
                Token::Open,
                Token::Move("d4"),
                Token::Comment(" queen pawn"),
                Token::Close,
                Token::Result("1-0"),
            ]
        );
    }

    #[test]
    fn test_castling_with_zeros_is_a_move() {
        assert_eq!(
            tokens("5. 0-0 0-0-0 *"),
            vec![Token::Move("0-0"), Token::Move("0-0-0"), Token::Result("*")]
        );
    }

    #[test]
    fn test_unterminated_comment_and_stray_brace() {
        assert_eq!(
            tokens("e4 } e5 {never closed"),
            vec![
                Token::Move("e4"),
                Token::Move("e5"),
                Token::Comment("never closed"),
            ]
        );
    }

    #[test]
    fn test_escape_lines_are_ignored() {
        assert_eq!(
            tokens("% generated\ne4 e5"),
            vec![Token::Move("e4"), Token::Move("e5")]
        );
    }
}
