//! Command vocabulary and parameter parsing.
//!
//! Everything here runs before any state is loaded; a failure is a
//! validation error reported verbatim.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::state::{MissionAction, UserId, Vote};
use crate::errors::ErrorCode;
use crate::AppError;

pub const MAX_IDENTIFIER_LEN: usize = 64;

/// A parsed inbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateRoom { capacity: u8 },
    JoinRoom,
    LeaveRoom,
    StartGame,
    NewGame,
    ProposeTeam { team: Vec<UserId> },
    CastVote { vote: Vote },
    SubmitMissionAction { action: MissionAction },
    AssassinateGuess { target: UserId },
    ViewRole,
    RoomStatus,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateRoomParams {
    capacity: u8,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ProposeTeamParams {
    team: Vec<UserId>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CastVoteParams {
    vote: Vote,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MissionParams {
    action: MissionAction,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct GuessParams {
    target: UserId,
}

impl Command {
    pub fn parse(name: &str, params: &Value) -> Result<Self, AppError> {
        let command = match name {
            "create_room" => {
                let p: CreateRoomParams = params_of(name, params)?;
                Command::CreateRoom {
                    capacity: p.capacity,
                }
            }
            "join_room" => no_params(name, params, Command::JoinRoom)?,
            "leave_room" => no_params(name, params, Command::LeaveRoom)?,
            "start_game" => no_params(name, params, Command::StartGame)?,
            "new_game" => no_params(name, params, Command::NewGame)?,
            "view_role" => no_params(name, params, Command::ViewRole)?,
            "room_status" => no_params(name, params, Command::RoomStatus)?,
            "propose_team" => {
                let p: ProposeTeamParams = params_of(name, params)?;
                for member in &p.team {
                    validate_identifier("team member", member)?;
                }
                Command::ProposeTeam { team: p.team }
            }
            "cast_vote" => {
                let p: CastVoteParams = params_of(name, params)?;
                Command::CastVote { vote: p.vote }
            }
            "submit_mission_action" => {
                let p: MissionParams = params_of(name, params)?;
                Command::SubmitMissionAction { action: p.action }
            }
            "assassinate_guess" => {
                let p: GuessParams = params_of(name, params)?;
                validate_identifier("target", &p.target)?;
                Command::AssassinateGuess { target: p.target }
            }
            other => {
                return Err(AppError::invalid(
                    ErrorCode::InvalidCommand,
                    format!("unknown command '{}'", truncate(other)),
                ))
            }
        };
        Ok(command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateRoom { .. } => "create_room",
            Command::JoinRoom => "join_room",
            Command::LeaveRoom => "leave_room",
            Command::StartGame => "start_game",
            Command::NewGame => "new_game",
            Command::ProposeTeam { .. } => "propose_team",
            Command::CastVote { .. } => "cast_vote",
            Command::SubmitMissionAction { .. } => "submit_mission_action",
            Command::AssassinateGuess { .. } => "assassinate_guess",
            Command::ViewRole => "view_role",
            Command::RoomStatus => "room_status",
        }
    }

    /// Commands that never mutate and are not recorded.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Command::RoomStatus)
    }
}

fn params_of<T: DeserializeOwned>(command: &str, params: &Value) -> Result<T, AppError> {
    T::deserialize(params).map_err(|e| {
        AppError::invalid(
            ErrorCode::ParamValidation,
            format!("invalid params for {command}: {e}"),
        )
    })
}

fn no_params(command: &str, params: &Value, parsed: Command) -> Result<Command, AppError> {
    match params {
        Value::Null => Ok(parsed),
        Value::Object(map) if map.is_empty() => Ok(parsed),
        _ => Err(AppError::invalid(
            ErrorCode::ParamValidation,
            format!("{command} takes no params"),
        )),
    }
}

/// Room and user ids: 1..=64 chars, no whitespace or control characters.
pub fn validate_identifier(field: &str, value: &str) -> Result<(), AppError> {
    let len = value.chars().count();
    if len == 0 || len > MAX_IDENTIFIER_LEN {
        return Err(AppError::invalid(
            ErrorCode::ParamValidation,
            format!("{field} must be 1..={MAX_IDENTIFIER_LEN} characters"),
        ));
    }
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(AppError::invalid(
            ErrorCode::ParamValidation,
            format!("{field} contains whitespace or control characters"),
        ));
    }
    Ok(())
}

fn truncate(s: &str) -> String {
    s.chars().take(MAX_IDENTIFIER_LEN).collect()
}
