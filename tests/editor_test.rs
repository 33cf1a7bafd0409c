/// Tests for interactive move entry and persistent tree edits.

mod common;

use std::sync::Arc;

use chess_core::editor::{promote_variation, set_comment, truncate_line};
use chess_core::{
    apply_move, parse, reconstruct, write_movetext, EditOutcome, GameTree, MoveNode,
    PathDescriptor, RulesEngine, ShakmatyEngine,
};
use common::{fen_after, STANDARD_START_FEN};

fn verified(fen: &str, san: &str) -> MoveNode {
    let mut engine = ShakmatyEngine::from_fen(fen).unwrap();
    MoveNode::verified(engine.apply_move(san).unwrap())
}

#[test]
fn test_branch_creation() {
    let tree = Arc::new(parse("1. e4 e5 2. Nf3", STANDARD_START_FEN).unwrap());
    let fen = fen_after(&["e4", "e5"]);
    let edit = apply_move(&tree, &PathDescriptor::main_line(), 2, verified(&fen, "Nc3")).unwrap();

    assert_eq!(edit.outcome, EditOutcome::Branched);
    assert!(edit.tree.root_variations.is_empty());
    let e5 = edit.tree.main_line.get(1).unwrap();
    assert_eq!(e5.variations.len(), 1);
    assert_eq!(e5.variations[0].sans(), vec!["Nc3"]);

    assert_eq!(serde_json::to_string(&edit.path).unwrap(), "[1,0]");
    assert_eq!(edit.ply, 1);
    let rec = reconstruct(&edit.tree, &edit.path, edit.ply);
    assert_eq!(rec.fen, fen_after(&["e4", "e5", "Nc3"]));
}

#[test]
fn test_previous_snapshot_is_untouched() {
    let tree = Arc::new(parse("1. e4 e5 2. Nf3", STANDARD_START_FEN).unwrap());
    let before_json = tree.to_json().unwrap();

    let fen = fen_after(&["e4", "e5"]);
    let edit = apply_move(&tree, &PathDescriptor::main_line(), 2, verified(&fen, "Nc3")).unwrap();
    let edit = apply_move(&edit.tree, &edit.path, edit.ply, verified(&fen_after(&["e4", "e5", "Nc3"]), "Nf6")).unwrap();

    assert_eq!(tree.to_json().unwrap(), before_json);
    assert_eq!(edit.outcome, EditOutcome::Appended);
    assert_eq!(edit.tree.main_line.get(1).unwrap().variations[0].sans(), vec!["Nc3", "Nf6"]);
}

#[test]
fn test_replaying_existing_move_navigates() {
    let tree = Arc::new(parse("1. e4 e5 2. Nf3", STANDARD_START_FEN).unwrap());
    let edit = apply_move(&tree, &PathDescriptor::main_line(), 0, verified(STANDARD_START_FEN, "e4")).unwrap();
    assert_eq!(edit.outcome, EditOutcome::Navigated);
    assert!(Arc::ptr_eq(&tree, &edit.tree));
    assert_eq!((edit.path, edit.ply), (PathDescriptor::main_line(), 1));
}

#[test]
fn test_build_a_tree_from_scratch() {
    let empty = Arc::new(GameTree::default());
    let main = PathDescriptor::main_line();

    let edit = apply_move(&empty, &main, 0, verified(STANDARD_START_FEN, "d4")).unwrap();
    let edit = apply_move(&edit.tree, &edit.path, edit.ply, verified(&fen_after(&["d4"]), "d5")).unwrap();
    let edit = apply_move(&edit.tree, &main, 0, verified(STANDARD_START_FEN, "c4")).unwrap();
    assert_eq!(edit.path, PathDescriptor::root(0));

    let tree = set_comment(&edit.tree, &main, 1, Some("Queen's pawn".to_string())).unwrap();
    assert_eq!(write_movetext(&tree), "1. d4 {Queen's pawn} (1. c4) 1... d5");
}

#[test]
fn test_promote_then_truncate() {
    let tree = Arc::new(parse("1. e4 e5 (1... c5 2. Nf3 d6) 2. Nf3", STANDARD_START_FEN).unwrap());
    let (promoted, path, start) =
        promote_variation(&tree, &PathDescriptor::main_line().child(0, 0)).unwrap();
    assert_eq!(promoted.main_line.sans(), vec!["e4", "c5", "Nf3", "d6"]);

    let rec = reconstruct(&promoted, &path, start + 3);
    assert_eq!(rec.fen, fen_after(&["e4", "c5", "Nf3", "d6"]));

    let truncated = truncate_line(&promoted, &path, 2).unwrap();
    assert_eq!(truncated.main_line.sans(), vec!["e4", "c5"]);
    assert_eq!(truncated.main_line.get(0).unwrap().variations[0].sans(), vec!["e5", "Nf3"]);
}
