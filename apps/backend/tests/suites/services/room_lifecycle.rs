//! Room registry behavior through the dispatcher.

use avalon_backend::domain::game_transition::GameTransition;
use avalon_backend::domain::room::RoomStatus;
use avalon_backend::services::HistoryRecorder;
use avalon_backend::store::GameStore;
use avalon_backend::utils::room_code::ROOM_CODE_LEN;
use backend_test_support::unique_helpers::unique_str;
use serde_json::{json, Value};

use crate::support::build_test_engine;

#[tokio::test]
async fn create_without_id_allocates_a_room_code() {
    let engine = build_test_engine().await.unwrap();
    let resp = engine.ok("", "host", "create_room", json!({"capacity": 6})).await;

    let room = resp.room.unwrap();
    assert_eq!(room.room_id.len(), ROOM_CODE_LEN);
    assert_eq!(room.members, vec!["host".to_string()]);
    assert_eq!(room.status, RoomStatus::Open);
    assert_eq!(resp.sequence_no, Some(1));

    let status = engine.ok(&room.room_id, "host", "room_status", Value::Null).await;
    assert_eq!(status.room.unwrap().capacity, 6);
}

#[tokio::test]
async fn supplied_room_id_must_be_unused() {
    let engine = build_test_engine().await.unwrap();
    let room = unique_str("chat");
    engine.ok(&room, "a", "create_room", json!({"capacity": 5})).await;

    let err = engine.err(&room, "b", "create_room", json!({"capacity": 5})).await;
    assert_eq!(err.code, "ROOM_EXISTS");
}

#[tokio::test]
async fn capacity_outside_the_table_is_rejected() {
    let engine = build_test_engine().await.unwrap();

    let err = engine.err("r", "h", "create_room", json!({"capacity": 4})).await;
    assert_eq!(err.code, "ROOM_STATE");
    let err = engine.err("r", "h", "create_room", json!({"capacity": 11})).await;
    assert_eq!(err.code, "ROOM_STATE");
    let err = engine.err("r", "h", "create_room", json!({"capacity": 300})).await;
    assert_eq!(err.code, "PARAM_VALIDATION");
    let err = engine.err("r", "h", "create_room", json!({})).await;
    assert_eq!(err.code, "PARAM_VALIDATION");

    assert_eq!(engine.store.room_count(), 0);
}

#[tokio::test]
async fn joining_fills_the_room_then_refuses() {
    let engine = build_test_engine().await.unwrap();
    let setup = engine.full_room(5).await;
    let room = &setup.room_id;

    let status = engine.ok(room, &setup.users[0], "room_status", Value::Null).await;
    assert_eq!(status.room.unwrap().status, RoomStatus::Full);

    let err = engine.err(room, "latecomer", "join_room", Value::Null).await;
    assert_eq!(err.code, "ROOM_FULL");
    let err = engine.err(room, &setup.users[3], "join_room", Value::Null).await;
    assert_eq!(err.code, "ALREADY_MEMBER");

    engine.ok(room, &setup.users[0], "start_game", Value::Null).await;
    let err = engine.err(room, "latecomer", "join_room", Value::Null).await;
    assert_eq!(err.code, "ROOM_STATE");
}

#[tokio::test]
async fn duplicate_join_and_unknown_room() {
    let engine = build_test_engine().await.unwrap();
    engine.ok("lobby", "host", "create_room", json!({"capacity": 5})).await;
    engine.ok("lobby", "amy", "join_room", Value::Null).await;

    let err = engine.err("lobby", "amy", "join_room", Value::Null).await;
    assert_eq!(err.code, "ALREADY_MEMBER");

    let err = engine.err("nowhere", "amy", "join_room", Value::Null).await;
    assert_eq!(err.code, "ROOM_NOT_FOUND");
    assert_eq!(err.category, avalon_backend::ErrorCategory::Domain);
}

#[tokio::test]
async fn leaving_is_refused_once_the_game_starts() {
    let engine = build_test_engine().await.unwrap();
    let setup = engine.started_game(5).await;

    let err = engine
        .err(&setup.room_id, &setup.users[2], "leave_room", Value::Null)
        .await;
    assert_eq!(err.code, "ROOM_STATE");
    assert_eq!(engine.game(&setup.room_id).await.player_count(), 5);
}

#[tokio::test]
async fn host_leaving_hands_off_to_next_seat() {
    let engine = build_test_engine().await.unwrap();
    engine.ok("hand", "first", "create_room", json!({"capacity": 5})).await;
    engine.ok("hand", "second", "join_room", Value::Null).await;

    let resp = engine.ok("hand", "first", "leave_room", Value::Null).await;
    let room = resp.room.unwrap();
    assert_eq!(room.host_user_id, "second");
    assert_eq!(room.members, vec!["second".to_string()]);
    assert!(resp.transitions.contains(&GameTransition::HostChanged {
        host_user_id: "second".into()
    }));
}

#[tokio::test]
async fn last_member_leaving_abandons_the_room() {
    let engine = build_test_engine().await.unwrap();
    engine.ok("gone", "solo", "create_room", json!({"capacity": 5})).await;

    let resp = engine.ok("gone", "solo", "leave_room", Value::Null).await;
    assert!(resp.room.is_none());
    assert!(resp.transitions.contains(&GameTransition::RoomAbandoned));

    let err = engine.err("gone", "solo", "room_status", Value::Null).await;
    assert_eq!(err.code, "ROOM_NOT_FOUND");

    // History outlives the room, and the lock entry is reclaimed.
    assert_eq!(engine.store.load_history("gone").await.unwrap().len(), 2);
    assert!(engine.dispatcher.state().locks.is_empty());

    // The id can be reused; the sequence continues.
    let resp = engine.ok("gone", "again", "create_room", json!({"capacity": 5})).await;
    assert_eq!(resp.sequence_no, Some(3));
}

#[tokio::test]
async fn room_status_is_not_recorded() {
    let engine = build_test_engine().await.unwrap();
    engine.ok("quiet", "host", "create_room", json!({"capacity": 5})).await;

    let resp = engine.ok("quiet", "anyone", "room_status", Value::Null).await;
    assert_eq!(resp.sequence_no, None);
    assert!(resp.transitions.is_empty());
    assert_eq!(engine.store.last_sequence_no("quiet").await.unwrap(), 1);
}

#[tokio::test]
async fn malformed_commands_are_validation_errors() {
    let engine = build_test_engine().await.unwrap();

    let err = engine.err("r", "u", "summon_dragon", Value::Null).await;
    assert_eq!(err.code, "INVALID_COMMAND");
    assert_eq!(err.category, avalon_backend::ErrorCategory::Validation);

    let err = engine
        .err("r", "u", "create_room", json!({"capacity": 5, "speed": "fast"}))
        .await;
    assert_eq!(err.code, "PARAM_VALIDATION");

    let err = engine.err("r", "u", "join_room", json!({"seat": 2})).await;
    assert_eq!(err.code, "PARAM_VALIDATION");

    let err = engine.err("r", "two words", "join_room", Value::Null).await;
    assert_eq!(err.code, "PARAM_VALIDATION");

    let err = engine.err("", "u", "join_room", Value::Null).await;
    assert_eq!(err.code, "PARAM_VALIDATION");

    let long = "x".repeat(65);
    let err = engine.err(&long, "u", "join_room", Value::Null).await;
    assert_eq!(err.code, "PARAM_VALIDATION");

    let err = engine
        .err("r", "u", "cast_vote", json!({"vote": "abstain"}))
        .await;
    assert_eq!(err.code, "PARAM_VALIDATION");
}

#[tokio::test]
async fn commands_on_unknown_rooms_leave_no_lock_behind() {
    let engine = build_test_engine().await.unwrap();
    let state = engine.dispatcher.state();

    for i in 0..50 {
        let room = format!("ghost{i}");
        let err = engine.err(&room, "u", "join_room", Value::Null).await;
        assert_eq!(err.code, "ROOM_NOT_FOUND");
        let err = engine
            .err(&room, "u", "propose_team", json!({"team": ["u"]}))
            .await;
        assert_eq!(err.code, "ROOM_NOT_FOUND");
        HistoryRecorder.verify(state, &room).await.unwrap();
    }
    assert!(state.locks.is_empty());

    // Live rooms keep their entry until they are abandoned.
    engine.ok("short", "a", "create_room", json!({"capacity": 5})).await;
    assert_eq!(state.locks.len(), 1);
    engine.ok("short", "a", "leave_room", Value::Null).await;
    assert!(state.locks.is_empty());
}
