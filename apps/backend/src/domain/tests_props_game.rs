//! Property tests for whole games driven through `apply_command`.

use proptest::prelude::*;
use time::OffsetDateTime;

use crate::domain::history::{replay, HistoryEvent, RecordedCommand};
use crate::domain::roles::assign_roles;
use crate::domain::rules::{RuleSet, MISSIONS_TO_WIN};
use crate::domain::snapshot::{apply_command, RoomSnapshot};
use crate::domain::state::{Phase, Role};
use crate::domain::test_gens;
use crate::domain::test_prelude;
use crate::domain::test_state_helpers::{reject_proposal, seating, started};

/// Applies commands and keeps the matching history, like the live path does.
struct Recorder {
    rules: RuleSet,
    snapshot: Option<RoomSnapshot>,
    events: Vec<HistoryEvent>,
}

impl Recorder {
    fn new() -> Self {
        Self {
            rules: RuleSet::standard(),
            snapshot: None,
            events: Vec::new(),
        }
    }

    fn record(&mut self, actor: &str, command: RecordedCommand) {
        let applied = apply_command("room-p", self.snapshot.as_ref(), actor, &command).unwrap();
        self.snapshot = applied.snapshot;
        self.events.push(HistoryEvent {
            sequence_no: self.events.len() as u64 + 1,
            room_id: "room-p".into(),
            actor_user_id: actor.to_string(),
            command,
            resulting_phase: self.snapshot.as_ref().and_then(|s| s.phase()),
            room_status: self.snapshot.as_ref().map(|s| s.room.status),
            timestamp: OffsetDateTime::UNIX_EPOCH,
        });
    }

    fn start(capacity: u8, seed: u64) -> Self {
        let mut r = Self::new();
        let create = RecordedCommand::create_room(capacity, &r.rules).unwrap();
        r.record("u0", create);
        for i in 1..capacity as usize {
            r.record(&test_gens::user(i), RecordedCommand::JoinRoom);
        }
        r.record("u0", RecordedCommand::StartGame { seed });
        r
    }

    fn play(&mut self, decisions: &[u8]) {
        for &d in decisions {
            let Some(snapshot) = self.snapshot.as_ref() else {
                return;
            };
            let Some((actor, command)) = test_gens::scripted_command(snapshot, d) else {
                return;
            };
            self.record(&actor, command);
        }
    }
}

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: every table size gets one Merlin, one Assassin and the tabled traitor count.
    #[test]
    fn prop_role_composition(capacity in test_gens::capacity(), seed in test_gens::seed()) {
        let rules = RuleSet::standard();
        let n = capacity as usize;
        let a = assign_roles(&seating(n), &rules.game_rules(capacity).unwrap(), seed).unwrap();
        let count = |role: Role| a.roles.values().filter(|r| **r == role).count();
        prop_assert_eq!(count(Role::Merlin), 1);
        prop_assert_eq!(count(Role::Assassin), 1);
        prop_assert_eq!(
            count(Role::Assassin) + count(Role::Minion),
            rules.traitor_count(n).unwrap()
        );
        prop_assert!(a.first_leader < n);
    }

    /// Property: N rejections at an N-seat table return the lead to where it started.
    #[test]
    fn prop_leader_rotation_is_cyclic(
        capacity in test_gens::capacity(),
        seed in test_gens::seed(),
    ) {
        let n = capacity as usize;
        let mut state = started(n, seed);
        let original = state.leader_index;
        for _ in 0..n {
            reject_proposal(&mut state);
        }
        prop_assert_eq!(state.leader_index, original);
        prop_assert!(state.phase != Phase::GameOver);
    }

    /// Property: three fails or three passes are acted on within the same command.
    #[test]
    fn prop_end_conditions_are_immediate(
        capacity in test_gens::capacity(),
        seed in test_gens::seed(),
        decisions in test_gens::decisions(),
    ) {
        let mut rec = Recorder::start(capacity, seed);
        for &d in &decisions {
            rec.play(&[d]);
            let Some(game) = rec.snapshot.as_ref().and_then(|s| s.game.as_ref()) else {
                break;
            };
            if game.fails() >= MISSIONS_TO_WIN {
                prop_assert_eq!(game.phase, Phase::GameOver);
            }
            if game.passes() >= MISSIONS_TO_WIN {
                prop_assert!(matches!(game.phase, Phase::Assassination | Phase::GameOver));
            }
            prop_assert!(game.mission_results.len() <= 5);
            prop_assert!(!matches!(game.phase, Phase::ProposalRejected | Phase::RoundEnd));
        }
    }

    /// Property: replaying the recorded history reproduces the live snapshot exactly.
    #[test]
    fn prop_replay_matches_live_state(
        capacity in test_gens::capacity(),
        seed in test_gens::seed(),
        decisions in test_gens::decisions(),
    ) {
        let mut rec = Recorder::start(capacity, seed);
        rec.play(&decisions);

        let replayed = replay(&rec.events).unwrap();
        prop_assert_eq!(&replayed, &rec.snapshot);
        prop_assert_eq!(
            serde_json::to_vec(&replayed).unwrap(),
            serde_json::to_vec(&rec.snapshot).unwrap()
        );
    }
}

#[test]
fn replay_rejects_sequence_gaps() {
    let mut rec = Recorder::start(5, 1);
    rec.events.remove(2);
    let err = replay(&rec.events).unwrap_err();
    assert!(matches!(
        err,
        crate::errors::domain::DomainError::Conflict(
            crate::errors::domain::ConflictKind::HistorySequence,
            _
        )
    ));
}

#[test]
fn replay_of_abandoned_room_is_empty() {
    let mut rec = Recorder::new();
    rec.record("u0", RecordedCommand::create_room(5, &rec.rules).unwrap());
    rec.record("u1", RecordedCommand::JoinRoom);
    rec.record("u0", RecordedCommand::LeaveRoom);
    rec.record("u1", RecordedCommand::LeaveRoom);
    assert!(rec.snapshot.is_none());
    assert_eq!(replay(&rec.events).unwrap(), None);

    // The id can be reused; history continues on the same sequence.
    rec.record("u2", RecordedCommand::create_room(6, &rec.rules).unwrap());
    let replayed = replay(&rec.events).unwrap().unwrap();
    assert_eq!(replayed.room.host_user_id, "u2");
    assert_eq!(replayed.room.capacity, 6);
}

#[test]
fn replay_ignores_later_rule_changes() {
    let mut rec = Recorder::start(5, 3);
    rec.play(&[1, 1, 1, 1, 1, 1, 1, 1]);

    // A table that no longer knows five players, nor the loyal-must-pass rule.
    rec.rules.tables.retain(|t| t.players != 5);
    rec.rules.loyal_must_pass = false;

    let replayed = replay(&rec.events).unwrap();
    assert_eq!(replayed, rec.snapshot);
    let game = replayed.and_then(|s| s.game).unwrap();
    assert_eq!(game.rules.players(), 5);
    assert!(game.rules.loyal_must_pass);
}
