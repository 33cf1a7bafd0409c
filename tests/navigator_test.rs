/// Tests for position reconstruction against shakmaty played directly.

mod common;

use std::sync::Arc;

use chess_core::{parse, parse_pgn, reconstruct, GameTree, MoveNode, PathDescriptor, VariationLine};
use common::{fen_after, ANNOTATED_STUDY, STANDARD_START_FEN};

#[test]
fn test_round_trip_matches_direct_play() {
    let tree = parse("1. e4 e5 2. Nf3", STANDARD_START_FEN).unwrap();
    let rec = reconstruct(&tree, &PathDescriptor::main_line(), 3);
    assert_eq!(rec.fen, fen_after(&["e4", "e5", "Nf3"]));
    assert_eq!(rec.sans(), vec!["e4", "e5", "Nf3"]);
}

#[test]
fn test_reconstruct_is_idempotent() {
    let tree = parse_pgn(ANNOTATED_STUDY).unwrap().tree;
    let path = PathDescriptor::from_flat(&[0, 0, 0, 0]).unwrap();
    let first = reconstruct(&tree, &path, 2);
    let second = reconstruct(&tree, &path, 2);
    assert_eq!(first, second);
    assert_eq!(first.fen, fen_after(&["e4", "c5", "Nc3", "Nc6"]));
}

#[test]
fn test_ply_zero_is_the_branch_position() {
    let tree = parse_pgn(ANNOTATED_STUDY).unwrap().tree;

    let rec = reconstruct(&tree, &PathDescriptor::main_line(), 0);
    assert_eq!(rec.fen, STANDARD_START_FEN);
    assert!(rec.history.is_empty());

    // Variations hanging on 1. e4 start from the position after it.
    for variation in [0, 1] {
        let rec = reconstruct(&tree, &PathDescriptor::main_line().child(0, variation), 0);
        assert_eq!(rec.fen, fen_after(&["e4"]));
    }
    let rec = reconstruct(&tree, &PathDescriptor::from_flat(&[0, 0, 0, 0]).unwrap(), 0);
    assert_eq!(rec.sans(), vec!["e4", "c5"]);

    let with_root = parse("1. e4 (1. d4 d5) e5", STANDARD_START_FEN).unwrap();
    let rec = reconstruct(&with_root, &PathDescriptor::root(0), 0);
    assert_eq!(rec.fen, STANDARD_START_FEN);
    assert!(rec.history.is_empty());
}

#[test]
fn test_custom_starting_position() {
    let fen = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1";
    let tree = parse("1. e4 Kd7 2. Kd2", fen).unwrap();
    assert_eq!(reconstruct(&tree, &PathDescriptor::main_line(), 0).fen, fen);
    assert_eq!(
        reconstruct(&tree, &PathDescriptor::main_line(), 3).fen,
        "8/3k4/8/8/4P3/8/3K4/8 b - - 2 2"
    );
}

#[test]
fn test_root_variation_history_skips_main_line() {
    let tree = parse("1. e4 (1. d4 d5 2. c4) e5", STANDARD_START_FEN).unwrap();
    let rec = reconstruct(&tree, &PathDescriptor::root(0), 3);
    assert_eq!(rec.sans(), vec!["d4", "d5", "c4"]);
    assert_eq!(rec.fen, fen_after(&["d4", "d5", "c4"]));
}

#[test]
fn test_externally_edited_tree_is_replayed_best_effort() {
    // A hand-built tree with an impossible move in the middle.
    let mut tree = GameTree::default();
    tree.main_line = VariationLine {
        moves: ["e4", "Qxf7", "e5", "Nf3"]
            .into_iter()
            .map(|san| Arc::new(MoveNode::unverified(san, "imported")))
            .collect(),
    };

    let rec = reconstruct(&tree, &PathDescriptor::main_line(), 4);
    assert_eq!(rec.skipped.len(), 1);
    assert_eq!(rec.skipped[0].san, "Qxf7");
    assert_eq!(rec.fen, fen_after(&["e4", "e5", "Nf3"]));
}
