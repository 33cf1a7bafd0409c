//! Serialize a [`GameTree`] back to PGN.

use crate::rules::STANDARD_START_FEN;
use crate::tree::{GameTree, VariationLine};

/// Movetext only: numbers, SAN, `$N` NAGs, `{comments}`, `( variations )` and the result.
pub fn write_movetext(tree: &GameTree) -> String {
    let mut writer = MovetextWriter::new(&tree.starting_position);
    if let Some(comment) = &tree.comment {
        writer.comment(comment);
    }
    writer.line(&tree.main_line, 0, &tree.root_variations);
    if let Some(result) = &tree.result {
        writer.word(result);
    }
    writer.out
}

/// Full game: the given tag pairs, `SetUp`/`FEN` for custom starts, then movetext.
pub fn write_pgn(tree: &GameTree, tags: &[(String, String)]) -> String {
    let mut out = String::new();
    for (name, value) in tags {
        if name == "SetUp" || name == "FEN" || name == "Result" {
            continue;
        }
        out.push_str(&tag_line(name, value));
    }
    if tree.starting_position != STANDARD_START_FEN {
        out.push_str(&tag_line("SetUp", "1"));
        out.push_str(&tag_line("FEN", &tree.starting_position));
    }
    let result = tree.result.as_deref().unwrap_or("*");
    out.push_str(&tag_line("Result", result));
    out.push('\n');

    let mut body = write_movetext(tree);
    if tree.result.is_none() {
        if !body.is_empty() {
            body.push(' ');
        }
        body.push('*');
    }
    out.push_str(&body);
    out.push('\n');
    out
}

fn tag_line(name: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("[{name} \"{escaped}\"]\n")
}

struct MovetextWriter {
    out: String,
    /// 1 when the starting position has Black to move.
    ply_offset: usize,
    first_move_number: usize,
}

impl MovetextWriter {
    fn new(starting_position: &str) -> Self {
        let fields: Vec<&str> = starting_position.split_whitespace().collect();
        let ply_offset = usize::from(fields.get(1) == Some(&"b"));
        let first_move_number = fields
            .get(5)
            .and_then(|n| n.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(1);
        Self {
            out: String::new(),
            ply_offset,
            first_move_number,
        }
    }

    fn word(&mut self, word: &str) {
        if !self.out.is_empty() && !self.out.ends_with('(') {
            self.out.push(' ');
        }
        self.out.push_str(word);
    }

    /// Braces in the text are written as parentheses so the comment stays closed.
    fn comment(&mut self, text: &str) {
        let text = text.replace('{', "(").replace('}', ")");
        self.word(&format!("{{{text}}}"));
    }

    /// `ply` counts half-moves from the starting position.
    fn move_number(&self, ply: usize) -> (usize, bool) {
        let absolute = ply + self.ply_offset;
        (self.first_move_number + absolute / 2, absolute % 2 == 0)
    }

    /// Write `line`, whose first move is played at `first_ply`.
    /// `alternatives_to_first` are the lines that replace its first move.
    fn line(&mut self, line: &VariationLine, first_ply: usize, alternatives_to_first: &[VariationLine]) {
        let mut needs_number = true;

        for (i, node) in line.iter().enumerate() {
            let ply = first_ply + i;
            let (number, white) = self.move_number(ply);
            if white {
                self.word(&format!("{number}."));
            } else if needs_number {
                self.word(&format!("{number}..."));
            }
            self.word(&node.san);
            for nag in &node.nags {
                self.word(&format!("${nag}"));
            }
            if let Some(comment) = &node.comment {
                self.comment(comment);
            }
            needs_number = node.comment.is_some();

            let alternatives: &[VariationLine] = match i {
                0 => alternatives_to_first,
                _ => &line.moves[i - 1].variations,
            };
            for alternative in alternatives.iter().filter(|alt| !alt.is_empty()) {
                self.word("(");
                self.line(alternative, ply, &[]);
                self.out.push(')');
                needs_number = true;
            }
        }
    }
}
