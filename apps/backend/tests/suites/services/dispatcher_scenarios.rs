//! End-to-end game scenarios through the command dispatcher.

use avalon_backend::domain::game_transition::{last_phase, GameTransition};
use avalon_backend::domain::room::RoomStatus;
use avalon_backend::domain::state::{
    Alignment, MissionAction, MissionResult, Phase, Role, VictoryReason,
};
use serde_json::{json, Value};

use crate::support::build_test_engine;

#[tokio::test]
async fn five_players_round_one_single_fail_sinks_mission() {
    let engine = build_test_engine().await.unwrap();
    let setup = engine.started_game(5).await;
    let room = &setup.room_id;

    let team = engine.pick_team(room, true).await;
    assert_eq!(team.len(), 2);
    engine.propose(room, &team).await;

    // 3 approve, 2 reject
    let resp = engine.vote_all(&setup, 3).await;
    let game = resp.game.unwrap();
    assert_eq!(game.phase, Phase::MissionExecution);
    let record = game.last_vote.unwrap();
    assert!(record.approved);
    assert_eq!(record.votes.len(), 5);

    let resp = engine.play_mission(&setup, &team, true).await;
    let game = resp.game.unwrap();
    assert_eq!(game.mission_results, vec![MissionResult::Fail]);
    assert_eq!(game.round_number, 2);
    assert_eq!(game.phase, Phase::ProposingTeam);
    assert!(resp.transitions.iter().any(|t| matches!(
        t,
        GameTransition::MissionCompleted {
            round: 1,
            result: MissionResult::Fail,
            fail_count: 1
        }
    )));
}

#[tokio::test]
async fn five_rejections_auto_fail_and_reset_counter() {
    let engine = build_test_engine().await.unwrap();
    let setup = engine.started_game(5).await;
    let room = &setup.room_id;

    let mut last = None;
    for attempt in 1..=5u8 {
        engine.propose_first(&setup, 2).await;
        let resp = engine.vote_all(&setup, 0).await;
        let game = resp.game.clone().unwrap();
        if attempt < 5 {
            assert_eq!(game.failed_proposals_this_round, attempt);
            assert_eq!(game.phase, Phase::ProposingTeam);
            assert!(game.mission_results.is_empty());
        }
        last = Some(resp);
    }

    let resp = last.unwrap();
    assert!(resp
        .transitions
        .iter()
        .any(|t| matches!(t, GameTransition::MissionAutoFailed { round: 1 })));
    assert!(!resp.transitions.iter().any(|t| matches!(
        t,
        GameTransition::PhaseChanged {
            to: Phase::MissionExecution,
            ..
        }
    )));

    let game = engine.game(room).await;
    assert_eq!(game.mission_results, vec![MissionResult::Fail]);
    assert_eq!(game.round_number, 2);
    assert_eq!(game.failed_proposals_this_round, 0);
    assert_eq!(game.phase, Phase::ProposingTeam);
    assert!(game.mission_actions.is_empty());
}

#[tokio::test]
async fn non_member_vote_is_rejected_and_tally_untouched() {
    let engine = build_test_engine().await.unwrap();
    let setup = engine.started_game(5).await;
    let room = &setup.room_id;
    engine.propose_first(&setup, 2).await;
    engine
        .ok(room, &setup.users[1], "cast_vote", json!({"vote": "approve"}))
        .await;

    let err = engine
        .err(room, "stranger", "cast_vote", json!({"vote": "reject"}))
        .await;
    assert_eq!(err.code, "PLAYER_NOT_IN_GAME");
    assert!(!err.retryable);

    let game = engine.game(room).await;
    assert_eq!(game.votes.len(), 1);
    assert!(!game.votes.contains_key("stranger"));
    assert_eq!(game.phase, Phase::Voting);
}

#[tokio::test]
async fn only_the_leader_may_propose() {
    let engine = build_test_engine().await.unwrap();
    let setup = engine.started_game(6).await;
    let room = &setup.room_id;
    let leader = engine.leader(room).await;
    let other = setup.users.iter().find(|u| **u != leader).unwrap();

    let err = engine
        .err(room, other, "propose_team", json!({"team": &setup.users[..2]}))
        .await;
    assert_eq!(err.code, "NOT_LEADER");
    assert_eq!(engine.game(room).await.phase, Phase::ProposingTeam);
}

#[tokio::test]
async fn wrong_team_size_is_invalid_team() {
    let engine = build_test_engine().await.unwrap();
    let setup = engine.started_game(5).await;
    let room = &setup.room_id;
    let leader = engine.leader(room).await;

    let err = engine
        .err(room, &leader, "propose_team", json!({"team": &setup.users[..3]}))
        .await;
    assert_eq!(err.code, "INVALID_TEAM");
}

#[tokio::test]
async fn loyal_players_cannot_fail_missions() {
    let engine = build_test_engine().await.unwrap();
    let setup = engine.started_game(5).await;
    let room = &setup.room_id;
    let team = engine.pick_team(room, false).await;
    engine.propose(room, &team).await;
    engine.vote_all(&setup, 5).await;

    let err = engine
        .err(room, &team[0], "submit_mission_action", json!({"action": MissionAction::Fail}))
        .await;
    assert_eq!(err.code, "LOYAL_MUST_PASS");
    let outsider = setup.users.iter().find(|u| !team.contains(u)).unwrap();
    let err = engine
        .err(room, outsider, "submit_mission_action", json!({"action": "pass"}))
        .await;
    assert_eq!(err.code, "NOT_ON_TEAM");
}

#[tokio::test]
async fn three_failed_missions_end_the_game_for_traitors() {
    let engine = build_test_engine().await.unwrap();
    let setup = engine.started_game(5).await;
    let room = &setup.room_id;

    engine.play_round(&setup, true).await;
    engine.play_round(&setup, true).await;
    let resp = engine.play_round(&setup, true).await;

    assert_eq!(last_phase(&resp.transitions), Some(Phase::GameOver));
    let game = resp.game.unwrap();
    let outcome = game.outcome.unwrap();
    assert_eq!(outcome.winner, Alignment::Traitor);
    assert_eq!(outcome.reason, VictoryReason::MissionsFailed);
    assert_eq!(game.roles.unwrap().len(), 5);
    assert_eq!(resp.room.unwrap().status, RoomStatus::Finished);

    let err = engine
        .err(room, &setup.users[0], "cast_vote", json!({"vote": "approve"}))
        .await;
    assert_eq!(err.code, "INVALID_PHASE");
}

#[tokio::test]
async fn assassin_naming_merlin_flips_the_result() {
    let engine = build_test_engine().await.unwrap();
    let setup = engine.started_game(5).await;
    let room = &setup.room_id;

    for _ in 0..3 {
        engine.play_round(&setup, false).await;
    }
    let game = engine.game(room).await;
    assert_eq!(game.phase, Phase::Assassination);

    let assassin = engine.holder_of(room, Role::Assassin).await;
    let merlin = engine.holder_of(room, Role::Merlin).await;

    let loyal = setup
        .users
        .iter()
        .find(|u| **u != merlin && **u != assassin)
        .unwrap();
    let err = engine
        .err(room, loyal, "assassinate_guess", json!({"target": merlin}))
        .await;
    assert_eq!(err.code, "NOT_ASSASSIN");

    let resp = engine
        .ok(room, &assassin, "assassinate_guess", json!({"target": merlin}))
        .await;
    let outcome = resp.game.unwrap().outcome.unwrap();
    assert_eq!(outcome.winner, Alignment::Traitor);
    assert_eq!(outcome.reason, VictoryReason::MerlinAssassinated);
    assert_eq!(outcome.assassin_target.as_deref(), Some(merlin.as_str()));
}

#[tokio::test]
async fn assassin_missing_merlin_hands_loyal_the_win() {
    let engine = build_test_engine().await.unwrap();
    let setup = engine.started_game(7).await;
    let room = &setup.room_id;

    for _ in 0..3 {
        engine.play_round(&setup, false).await;
    }
    let assassin = engine.holder_of(room, Role::Assassin).await;
    let servant = engine.holder_of(room, Role::LoyalServant).await;

    let resp = engine
        .ok(room, &assassin, "assassinate_guess", json!({"target": servant}))
        .await;
    let outcome = resp.game.unwrap().outcome.unwrap();
    assert_eq!(outcome.winner, Alignment::Loyal);
    assert_eq!(outcome.reason, VictoryReason::AssassinMissed);
}

#[tokio::test]
async fn view_role_gives_sight_once() {
    let engine = build_test_engine().await.unwrap();
    let setup = engine.started_game(5).await;
    let room = &setup.room_id;
    let merlin = engine.holder_of(room, Role::Merlin).await;

    let first = engine.ok(room, &merlin, "view_role", Value::Null).await;
    let role = first.role.unwrap();
    assert_eq!(role.role, Role::Merlin);
    assert!(role.first_reveal);
    assert_eq!(role.sees.len(), 2);

    let again = engine.ok(room, &merlin, "view_role", json!({})).await;
    let role = again.role.unwrap();
    assert!(!role.first_reveal);
    assert!(role.sees.is_empty());

    // Roles stay hidden from the public view while the game runs.
    assert!(again.game.unwrap().roles.is_none());
}

#[tokio::test]
async fn host_gates_start_and_new_game() {
    let engine = build_test_engine().await.unwrap();
    let setup = engine.full_room(5).await;
    let room = &setup.room_id;

    let err = engine.err(room, &setup.users[1], "start_game", Value::Null).await;
    assert_eq!(err.code, "NOT_LEADER");

    engine.ok(room, &setup.users[0], "start_game", Value::Null).await;
    for _ in 0..3 {
        engine.play_round(&setup, true).await;
    }

    let err = engine.err(room, &setup.users[2], "new_game", Value::Null).await;
    assert_eq!(err.code, "NOT_LEADER");

    let resp = engine.ok(room, &setup.users[0], "new_game", Value::Null).await;
    assert_eq!(resp.room.as_ref().unwrap().status, RoomStatus::Full);
    assert!(resp.game.is_none());

    let resp = engine.ok(room, &setup.users[0], "start_game", Value::Null).await;
    assert_eq!(resp.game.unwrap().game_no, 2);
    assert_eq!(resp.room.unwrap().games_played, 1);
}

#[tokio::test]
async fn start_requires_a_full_room() {
    let engine = build_test_engine().await.unwrap();
    engine
        .ok("half-room", "host", "create_room", json!({"capacity": 5}))
        .await;
    engine.ok("half-room", "guest", "join_room", Value::Null).await;

    let err = engine.err("half-room", "host", "start_game", Value::Null).await;
    assert_eq!(err.code, "ROOM_STATE");
}
