use battleroom::prelude::*;
use battleroom::StartBlocker;

fn patrol_only() -> FleetQuota {
    FleetQuota::uniform(0).with(BoatClass::PatrolBoat, 1)
}

fn lobby(players: u64) -> (Room, Vec<PlayerId>) {
    let settings = RoomSettings::new("test", 10).with_quota(patrol_only());
    let mut room = Room::new(RoomId(1), UserId(1), settings).unwrap();
    let ids = (1..=players)
        .map(|u| room.join(UserId(u), &format!("p{}", u)).unwrap())
        .collect();
    (room, ids)
}

/// Every player gets one patrol boat on row `2 * i`, column 0.
fn started(players: u64) -> (Room, Vec<PlayerId>) {
    let (mut room, ids) = lobby(players);
    for (i, id) in ids.iter().enumerate() {
        room.place_boat(*id, BoatClass::PatrolBoat, (2 * i, 0), Orientation::Horizontal)
            .unwrap();
    }
    room.start_match().unwrap();
    (room, ids)
}

#[test]
fn join_flags_admin_and_rejects_duplicates() {
    let (mut room, ids) = lobby(2);
    assert!(room.player(ids[0]).unwrap().is_admin());
    assert!(!room.player(ids[1]).unwrap().is_admin());
    assert_eq!(
        room.join(UserId(1), "again").unwrap_err(),
        GameError::AlreadyJoined(UserId(1))
    );
    assert!(room.fleet_board(ids[1]).unwrap().is_fleet());
}

#[test]
fn leave_only_before_the_match() {
    let (mut room, ids) = lobby(3);
    room.leave(ids[2]).unwrap();
    assert_eq!(room.player_count(), 2);
    assert!(room.fleet_board(ids[2]).is_err());

    let (mut room, ids) = started(2);
    assert_eq!(room.leave(ids[0]).unwrap_err(), GameError::MatchAlreadyStarted);
}

#[test]
fn start_requires_two_ready_players() {
    let (mut room, ids) = lobby(1);
    assert_eq!(room.check_ready_to_start(), Err(StartBlocker::NotEnoughPlayers));

    room.join(UserId(9), "late").unwrap();
    assert_eq!(room.check_ready_to_start(), Err(StartBlocker::PlayersNotReady));
    assert_eq!(
        room.start_match().unwrap_err(),
        GameError::NotReady(StartBlocker::PlayersNotReady)
    );
    assert_eq!(room.phase(), MatchPhase::Lobby);

    let everyone: Vec<_> = room.players().iter().map(|p| p.id()).collect();
    for (i, id) in everyone.iter().enumerate() {
        room.place_boat(*id, BoatClass::PatrolBoat, (2 * i, 0), Orientation::Horizontal)
            .unwrap();
    }
    room.set_ready(everyone[1], false).unwrap();
    assert_eq!(room.check_ready_to_start(), Err(StartBlocker::PlayersNotReady));
    room.set_ready(everyone[1], true).unwrap();
    assert_eq!(room.check_ready_to_start(), Ok(()));
    assert_eq!(room.start_match().unwrap(), ids[0]);
    assert_eq!(room.check_ready_to_start(), Err(StartBlocker::AlreadyStarted));
}

#[test]
fn ready_requires_a_complete_fleet() {
    let settings = RoomSettings::new("two-boats", 10).with_quota(
        FleetQuota::uniform(0)
            .with(BoatClass::PatrolBoat, 1)
            .with(BoatClass::Submarine, 1),
    );
    let mut room = Room::new(RoomId(4), UserId(1), settings).unwrap();
    let first = room.join(UserId(1), "first").unwrap();
    let second = room.join(UserId(2), "second").unwrap();

    assert_eq!(room.set_ready(first, true).unwrap_err(), GameError::FleetIncomplete);
    room.place_boat(first, BoatClass::PatrolBoat, (0, 0), Orientation::Horizontal)
        .unwrap();
    assert_eq!(room.set_ready(first, true).unwrap_err(), GameError::FleetIncomplete);
    assert!(!room.player(first).unwrap().is_ready());
    assert_eq!(
        room.set_ready(PlayerId(42), true).unwrap_err(),
        GameError::PlayerNotFound(PlayerId(42))
    );

    // an empty fleet can never be eliminated, so it must never reach the match
    assert_eq!(room.set_ready(second, true).unwrap_err(), GameError::FleetIncomplete);
    assert_eq!(room.check_ready_to_start(), Err(StartBlocker::PlayersNotReady));
    assert!(room.start_match().is_err());
    assert_eq!(room.phase(), MatchPhase::Lobby);

    // un-readying never needs a full fleet
    room.set_ready(second, false).unwrap();
}

#[test]
fn completing_the_fleet_marks_player_ready() {
    let (mut room, ids) = lobby(2);
    assert!(!room.player(ids[0]).unwrap().is_ready());
    room.place_boat(ids[0], BoatClass::PatrolBoat, (0, 0), Orientation::Vertical)
        .unwrap();
    assert!(room.player(ids[0]).unwrap().is_ready());
    assert_eq!(
        room.place_boat(ids[0], BoatClass::PatrolBoat, (5, 5), Orientation::Vertical)
            .unwrap_err(),
        GameError::PlayerReady
    );
}

#[test]
fn quota_is_enforced_regardless_of_geometry() {
    let settings = RoomSettings::new("q", 10)
        .with_quota(FleetQuota::uniform(0).with(BoatClass::Submarine, 1).with(BoatClass::Frigate, 1));
    let mut room = Room::new(RoomId(2), UserId(1), settings).unwrap();
    let id = room.join(UserId(1), "solo").unwrap();
    room.place_boat(id, BoatClass::Submarine, (0, 0), Orientation::Horizontal)
        .unwrap();
    assert_eq!(
        room.place_boat(id, BoatClass::Submarine, (6, 6), Orientation::Horizontal)
            .unwrap_err(),
        GameError::Placement(PlacementError::QuotaExceeded(BoatClass::Submarine))
    );
    assert_eq!(
        room.place_boat(id, BoatClass::Battleship, (6, 0), Orientation::Horizontal)
            .unwrap_err(),
        GameError::Placement(PlacementError::QuotaExceeded(BoatClass::Battleship))
    );
    assert_eq!(room.fleet_board(id).unwrap().boats().len(), 1);
}

#[test]
fn turn_rotation_is_round_robin() {
    let (mut room, ids) = started(3);
    assert_eq!(room.turn_holder(), Some(ids[0]));
    assert_eq!(room.turn_index_of(ids[0]), Some(1));
    assert_eq!(room.turn_index_of(ids[2]), Some(3));
    assert_eq!(room.end_turn().unwrap(), ids[1]);
    assert_eq!(room.end_turn().unwrap(), ids[2]);
    assert_eq!(room.end_turn().unwrap(), ids[0]);
}

#[test]
fn end_turn_outside_active_match_fails() {
    let (mut room, _) = lobby(2);
    assert_eq!(room.end_turn().unwrap_err(), GameError::MatchNotActive);
    assert_eq!(room.turn_holder(), None);
}

#[test]
fn attack_scenario_hit_then_miss() {
    let settings = RoomSettings::new("scenario", 10).with_quota(patrol_only());
    let mut room = Room::new(RoomId(3), UserId(1), settings).unwrap();
    let attacker = room.join(UserId(1), "attacker").unwrap();
    let victim = room.join(UserId(2), "victim").unwrap();
    room.place_boat(attacker, BoatClass::PatrolBoat, (9, 0), Orientation::Horizontal)
        .unwrap();
    let boat = room
        .place_boat(victim, BoatClass::PatrolBoat, (0, 0), Orientation::Horizontal)
        .unwrap();
    let cells: Vec<_> = boat.cells().iter().map(|c| (c.row, c.col)).collect();
    assert_eq!(cells, vec![(0, 0), (0, 1)]);
    room.start_match().unwrap();

    let report = room.attack((0, 0), attacker, victim).unwrap();
    assert_eq!(report.outcome, AttackOutcome::Hit);
    assert_eq!(room.fleet_board(victim).unwrap().occupancy_at(0, 0).unwrap(), Marker::Hit);
    let tracking = room.tracking_board(attacker, victim).unwrap();
    assert_eq!(tracking.occupancy_at(0, 0).unwrap(), Marker::Hit);

    let report = room.attack((5, 5), attacker, victim).unwrap();
    assert_eq!(report.outcome, AttackOutcome::Miss);
    let tracking = room.tracking_board(attacker, victim).unwrap();
    assert_eq!(tracking.occupancy_at(5, 5).unwrap(), Marker::Miss);
    let fleet = room.fleet_board(victim).unwrap();
    assert_eq!(fleet.occupancy_at(5, 5).unwrap(), Marker::Water);
    assert_eq!(fleet.grid(false).count(Marker::Miss), 0);
}

#[test]
fn repeated_hit_is_idempotent() {
    let (mut room, ids) = started(2);
    // second player's boat sits on row 2
    room.attack((2, 0), ids[0], ids[1]).unwrap();
    let after_first = room.clone();
    let report = room.attack((2, 0), ids[0], ids[1]).unwrap();
    assert_eq!(report.outcome, AttackOutcome::AlreadyHit);
    assert_eq!(room, after_first);
}

#[test]
fn attack_preconditions() {
    let (mut room, ids) = started(3);
    assert_eq!(
        room.attack((0, 0), ids[1], ids[0]).unwrap_err(),
        GameError::NotYourTurn
    );
    assert_eq!(
        room.attack((0, 0), ids[0], ids[0]).unwrap_err(),
        GameError::SelfAttack
    );
    assert_eq!(
        room.attack((10, 0), ids[0], ids[1]).unwrap_err(),
        GameError::OutOfBounds { row: 10, col: 0 }
    );
    assert_eq!(
        room.attack((0, 0), ids[0], PlayerId(42)).unwrap_err(),
        GameError::PlayerNotFound(PlayerId(42))
    );
    assert!(room.tracking_board(ids[0], ids[1]).is_none());

    let (mut room, ids) = lobby(2);
    assert_eq!(
        room.attack((0, 0), ids[0], ids[1]).unwrap_err(),
        GameError::MatchNotActive
    );
}

#[test]
fn sinking_the_last_fleet_finishes_the_match() {
    let (mut room, ids) = started(2);
    assert_eq!(
        room.attack((2, 0), ids[0], ids[1]).unwrap().outcome,
        AttackOutcome::Hit
    );
    let report = room.attack((2, 1), ids[0], ids[1]).unwrap();
    assert_eq!(report.outcome, AttackOutcome::Sunk(BoatClass::PatrolBoat));
    assert_eq!(report.eliminated, Some(ids[1]));
    assert_eq!(report.winner, Some(ids[0]));
    assert_eq!(room.phase(), MatchPhase::Finished);
    assert_eq!(room.winner(), Some(ids[0]));
    assert_eq!(room.turn_holder(), None);
    assert_eq!(
        room.attack((0, 0), ids[0], ids[1]).unwrap_err(),
        GameError::MatchNotActive
    );
}

#[test]
fn eliminated_players_are_skipped_and_untargetable() {
    let (mut room, ids) = started(3);
    room.attack((2, 0), ids[0], ids[1]).unwrap();
    let report = room.attack((2, 1), ids[0], ids[1]).unwrap();
    assert_eq!(report.eliminated, Some(ids[1]));
    assert_eq!(report.winner, None);
    assert_eq!(room.phase(), MatchPhase::Active);
    assert_eq!(
        room.attack((2, 0), ids[0], ids[1]).unwrap_err(),
        GameError::VictimEliminated(ids[1])
    );
    let opponents: Vec<_> = room.opponents(ids[0]).iter().map(|p| p.id()).collect();
    assert_eq!(opponents, vec![ids[2]]);
    assert_eq!(room.end_turn().unwrap(), ids[2]);
    assert_eq!(room.end_turn().unwrap(), ids[0]);
}

#[test]
fn view_board_hides_other_fleets() {
    let (room, ids) = started(2);
    let own = room.view_board(ids[0], None).unwrap();
    assert!(own.is_fleet());
    assert_eq!(own.owner(), ids[0]);

    let blank = room.view_board(ids[0], Some(ids[1])).unwrap();
    assert!(!blank.is_fleet());
    assert_eq!(blank.grid(false).count(Marker::Water), 100);
    assert_eq!(
        room.view_board(ids[0], Some(ids[0])).unwrap_err(),
        GameError::SelfAttack
    );
}

#[test]
fn invalid_settings_are_rejected() {
    for settings in [
        RoomSettings::new("", 10),
        RoomSettings::new("zero", 0),
        RoomSettings::new("huge", 100),
        RoomSettings::new("empty-fleet", 10).with_quota(FleetQuota::uniform(0)),
    ] {
        let err = Room::new(RoomId(1), UserId(1), settings).unwrap_err();
        assert!(matches!(err, GameError::InvalidSettings(_)));
    }
}
