use battleroom::validator::{check_raw, is_placement_valid, validate};
use battleroom::{Board, BoatClass, FleetQuota, GameError, Orientation, PlacementError, PlayerId};

fn board_with(boats: &[(BoatClass, (usize, usize), Orientation)]) -> Board {
    let quota = FleetQuota::uniform(4);
    let mut board = Board::fleet(PlayerId(1), 10);
    for &(class, anchor, orientation) in boats {
        board.place(class, anchor, orientation, &quota).unwrap();
    }
    board
}

#[test]
fn boat_may_touch_the_last_row_and_column() {
    let board = board_with(&[]);
    assert!(is_placement_valid(&board, (0, 8), Orientation::Horizontal, BoatClass::PatrolBoat));
    assert!(is_placement_valid(&board, (8, 9), Orientation::Vertical, BoatClass::PatrolBoat));
    assert!(is_placement_valid(&board, (9, 5), Orientation::Horizontal, BoatClass::AircraftCarrier));
}

#[test]
fn boat_past_the_edge_is_out_of_bounds() {
    let board = board_with(&[]);
    assert_eq!(
        validate(&board, (0, 9), Orientation::Horizontal, BoatClass::PatrolBoat),
        Err(PlacementError::OutOfBounds)
    );
    assert_eq!(
        validate(&board, (6, 0), Orientation::Vertical, BoatClass::AircraftCarrier),
        Err(PlacementError::OutOfBounds)
    );
    assert_eq!(
        validate(&board, (10, 0), Orientation::Vertical, BoatClass::PatrolBoat),
        Err(PlacementError::OutOfBounds)
    );
}

#[test]
fn overlapping_and_adjacent_boats_are_rejected() {
    let board = board_with(&[(BoatClass::Frigate, (4, 4), Orientation::Horizontal)]);
    // overlap
    assert_eq!(
        validate(&board, (3, 5), Orientation::Vertical, BoatClass::PatrolBoat),
        Err(PlacementError::TooClose)
    );
    // right and below
    assert!(!is_placement_valid(&board, (4, 7), Orientation::Horizontal, BoatClass::PatrolBoat));
    assert!(!is_placement_valid(&board, (5, 4), Orientation::Horizontal, BoatClass::PatrolBoat));
    // left and above
    assert!(!is_placement_valid(&board, (4, 2), Orientation::Horizontal, BoatClass::PatrolBoat));
    assert!(!is_placement_valid(&board, (2, 4), Orientation::Vertical, BoatClass::PatrolBoat));
}

#[test]
fn diagonal_contact_is_rejected() {
    let board = board_with(&[(BoatClass::PatrolBoat, (4, 4), Orientation::Horizontal)]);
    assert!(!is_placement_valid(&board, (5, 6), Orientation::Vertical, BoatClass::PatrolBoat));
    assert!(!is_placement_valid(&board, (2, 3), Orientation::Vertical, BoatClass::PatrolBoat));
    assert!(!is_placement_valid(&board, (5, 2), Orientation::Horizontal, BoatClass::PatrolBoat));
    assert!(!is_placement_valid(&board, (3, 6), Orientation::Horizontal, BoatClass::PatrolBoat));
}

#[test]
fn one_cell_gap_is_enough() {
    let board = board_with(&[(BoatClass::PatrolBoat, (4, 4), Orientation::Horizontal)]);
    assert!(is_placement_valid(&board, (4, 7), Orientation::Horizontal, BoatClass::PatrolBoat));
    assert!(is_placement_valid(&board, (6, 4), Orientation::Horizontal, BoatClass::PatrolBoat));
    assert!(is_placement_valid(&board, (4, 1), Orientation::Horizontal, BoatClass::PatrolBoat));
    assert!(is_placement_valid(&board, (1, 4), Orientation::Vertical, BoatClass::PatrolBoat));
    assert!(is_placement_valid(&board, (6, 6), Orientation::Vertical, BoatClass::PatrolBoat));
}

#[test]
fn boats_near_the_far_edge_still_see_each_other() {
    let board = board_with(&[(BoatClass::PatrolBoat, (9, 8), Orientation::Horizontal)]);
    assert!(!is_placement_valid(&board, (7, 9), Orientation::Vertical, BoatClass::PatrolBoat));
    assert!(!is_placement_valid(&board, (7, 8), Orientation::Vertical, BoatClass::PatrolBoat));
    assert!(!is_placement_valid(&board, (9, 6), Orientation::Horizontal, BoatClass::PatrolBoat));
    assert!(is_placement_valid(&board, (9, 5), Orientation::Horizontal, BoatClass::PatrolBoat));
    assert!(is_placement_valid(&board, (6, 9), Orientation::Vertical, BoatClass::PatrolBoat));
}

#[test]
fn validation_does_not_touch_the_board() {
    let board = board_with(&[(BoatClass::Frigate, (0, 0), Orientation::Vertical)]);
    let before = board.clone();
    let _ = is_placement_valid(&board, (0, 1), Orientation::Vertical, BoatClass::Frigate);
    let _ = is_placement_valid(&board, (5, 5), Orientation::Vertical, BoatClass::Frigate);
    assert_eq!(board, before);
}

#[test]
fn raw_input_orientation_and_type() {
    let board = board_with(&[]);
    assert_eq!(check_raw(&board, (0, 0), 'H', "frigate"), Ok(true));
    assert_eq!(check_raw(&board, (0, 0), 'v', "Patrol Boat"), Ok(true));
    assert_eq!(check_raw(&board, (0, 0), 'X', "frigate"), Ok(false));
    assert_eq!(check_raw(&board, (0, 9), 'H', "P"), Ok(false));
    assert_eq!(
        check_raw(&board, (0, 0), 'H', "destroyer"),
        Err(GameError::UnknownBoatType("destroyer".into()))
    );
}
