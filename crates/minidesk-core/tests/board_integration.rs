//! Integration tests for the tile board.

use minidesk_core::board::{BOARD_CELLS, BOARD_TICK};
use minidesk_core::{MoveOutcome, SpawnOutcome, TileBoard};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg64;

#[test]
fn test_fill_board_then_spawn_is_no_op() {
    let mut rng = Pcg64::seed_from_u64(2024);
    let mut board = TileBoard::new();

    match board.spawn_tile(&mut rng) {
        SpawnOutcome::Spawned { index, value } => {
            assert_eq!(value, 1);
            assert_eq!(board.cell(index), Some(1));
            assert_eq!(board.occupied(), 1);
        }
        SpawnOutcome::BoardFull => panic!("empty board reported full"),
    }

    for _ in 0..24 {
        assert!(matches!(board.spawn_tile(&mut rng), SpawnOutcome::Spawned { value: 1, .. }));
    }
    assert!(board.is_full());
    assert!(board.cells().iter().all(|c| *c == Some(1)));

    let before = *board.cells();
    assert_eq!(board.spawn_tile(&mut rng), SpawnOutcome::BoardFull);
    assert_eq!(*board.cells(), before);
    assert_eq!(board.spawn_count(), 26);
}

#[test]
fn test_merge_chain_unlocks_bigger_spawns() {
    let mut rng = Pcg64::seed_from_u64(5);
    let mut board = TileBoard::new();
    for _ in 0..4 {
        board.spawn_tile(&mut rng);
    }

    // Merge the four 1s into a single 3.
    let ones: Vec<usize> = (0..BOARD_CELLS).filter(|i| board.cell(*i) == Some(1)).collect();
    assert_eq!(ones.len(), 4);
    assert!(matches!(board.move_tile(ones[0], ones[1]), MoveOutcome::Merged { value: 2, .. }));
    assert!(matches!(board.move_tile(ones[2], ones[3]), MoveOutcome::Merged { value: 2, .. }));
    assert!(matches!(board.move_tile(ones[1], ones[3]), MoveOutcome::Merged { value: 3, .. }));
    assert_eq!(board.occupied(), 1);
    assert_eq!(board.max_value(), Some(3));

    let mut values = Vec::new();
    for _ in 0..20 {
        if let SpawnOutcome::Spawned { value, .. } = board.spawn_tile(&mut rng) {
            values.push(value);
        }
    }
    assert!(values.iter().all(|v| (1..=3).contains(v)));
    assert!(values.iter().any(|v| *v > 1));
}

#[test]
fn test_cadence_drives_spawning() {
    let mut rng = Pcg64::seed_from_u64(9);
    let mut board = TileBoard::new();
    let mut spawned = 0;
    // 30 seconds of 100ms ticks.
    for _ in 0..300 {
        if board.advance(BOARD_TICK, &mut rng).is_some() {
            spawned += 1;
        }
    }
    assert_eq!(spawned, 3);
    assert_eq!(board.occupied(), 3);
}

#[test]
fn test_reset_after_play() {
    let mut rng = Pcg64::seed_from_u64(1);
    let mut board = TileBoard::new();
    for _ in 0..10 {
        board.spawn_tile(&mut rng);
    }
    board.reset();
    assert!(board.cells().iter().all(Option::is_none));
    assert_eq!(board.spawn_count(), 0);
}

fn seeded_board() -> impl Strategy<Value = TileBoard> {
    (any::<u64>(), 0usize..=BOARD_CELLS).prop_map(|(seed, spawns)| {
        let mut rng = Pcg64::seed_from_u64(seed);
        let mut board = TileBoard::new();
        for _ in 0..spawns {
            board.spawn_tile(&mut rng);
        }
        board
    })
}

proptest! {
    #[test]
    fn prop_move_preserves_or_merges(
        mut board in seeded_board(),
        from in 0usize..BOARD_CELLS,
        to in 0usize..BOARD_CELLS,
    ) {
        let before = board.clone();
        let occupied = board.occupied();
        match board.move_tile(from, to) {
            MoveOutcome::Merged { value, .. } => {
                prop_assert_eq!(board.occupied(), occupied - 1);
                prop_assert_eq!(board.cell(to), Some(value));
                prop_assert_eq!(before.cell(from).map(|v| v + 1), Some(value));
                prop_assert_eq!(board.cell(from), None);
            }
            MoveOutcome::Relocated { value, .. } => {
                prop_assert_eq!(board.occupied(), occupied);
                prop_assert_eq!(board.cell(to), Some(value));
                prop_assert_eq!(board.cell(from), None);
            }
            MoveOutcome::Rejected { .. } => {
                prop_assert_eq!(board, before);
            }
        }
    }

    #[test]
    fn prop_spawn_without_three_is_one(seed in any::<u64>(), spawns in 0usize..BOARD_CELLS) {
        let mut rng = Pcg64::seed_from_u64(seed);
        let mut board = TileBoard::new();
        for _ in 0..spawns {
            board.spawn_tile(&mut rng);
        }
        prop_assert!(board.max_value().unwrap_or(0) < 3);
        prop_assert!(matches!(board.spawn_tile(&mut rng), SpawnOutcome::Spawned { value: 1, .. }), "expected a spawned tile of value 1");
    }
}
