//! Event payloads - one typed variant per conventional event type.
//!
//! On the wire an event carries `type` and an open `payload` object. The
//! engine decodes that pair into [`EventPayload`] so planner dispatch is an
//! exhaustive match. Types outside the conventional vocabulary land in
//! [`EventPayload::Unknown`] with their raw payload preserved. Every typed
//! payload keeps unrecognised keys in `extra`, so decode/encode never drops
//! data.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::game_systems::Degree;
use crate::{ArcId, DomainError, EventId, FactionId};

/// Raw payload object.
pub type PayloadMap = serde_json::Map<String, Value>;

/// Conventional event type tags.
pub mod event_types {
    pub const RUMOR: &str = "rumor";
    pub const SKILL_RESULT: &str = "skill_result";
    pub const FACTION_PRESSURE_RESULT: &str = "faction_pressure_result";
    pub const FACTION_MOVE: &str = "faction_move";
    pub const DISCOVERY: &str = "discovery";
    pub const LEAD: &str = "lead";
    pub const COMPLICATION: &str = "complication";
    pub const REPORT: &str = "report";
    pub const WARNING: &str = "warning";
    pub const ARC_DEVELOPMENT: &str = "arc_development";
}

/// Example roll attached to generated checks so the GM can eyeball the DC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollExample {
    pub total: i32,
    pub degree: Degree,
}

/// A skill check the players may attempt against an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckHook {
    pub skill: String,
    pub dc: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub rule_reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_roll_example: Option<RollExample>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RumorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investigation: Option<CheckHook>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub potential_conditions: Vec<String>,
    #[serde(flatten)]
    pub extra: PayloadMap,
}

/// Result of a contested roll, logged as a child of the event it resolved.
///
/// Shared by `skill_result` and `faction_pressure_result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResultPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub d20: i32,
    #[serde(rename = "mod")]
    pub modifier: i32,
    pub total: i32,
    pub dc: i32,
    pub degree: Degree,
    pub source_event_id: EventId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<FactionId>,
    #[serde(flatten)]
    pub extra: PayloadMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactionMovePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<FactionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<CheckHook>,
    #[serde(flatten)]
    pub extra: PayloadMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub significance: Option<String>,
    #[serde(flatten)]
    pub extra: PayloadMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clue: Option<String>,
    #[serde(flatten)]
    pub extra: PayloadMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplicationPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(flatten)]
    pub extra: PayloadMap,
}

/// Payload of `report` and `warning` events about a faction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactionNoticePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<FactionId>,
    #[serde(flatten)]
    pub extra: PayloadMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArcDevelopmentPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arc_id: Option<ArcId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arc_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development: Option<String>,
    #[serde(flatten)]
    pub extra: PayloadMap,
}

/// Typed `(type, payload)` pair of an event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawPayload")]
pub enum EventPayload {
    Rumor(RumorPayload),
    SkillResult(CheckResultPayload),
    FactionPressureResult(CheckResultPayload),
    FactionMove(FactionMovePayload),
    Discovery(DiscoveryPayload),
    Lead(LeadPayload),
    Complication(ComplicationPayload),
    Report(FactionNoticePayload),
    Warning(FactionNoticePayload),
    ArcDevelopment(ArcDevelopmentPayload),
    /// Any type outside the conventional vocabulary.
    Unknown { kind: String, payload: PayloadMap },
}

#[derive(Deserialize)]
struct RawPayload {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    payload: Value,
}

impl TryFrom<RawPayload> for EventPayload {
    type Error = DomainError;

    fn try_from(raw: RawPayload) -> Result<Self, Self::Error> {
        EventPayload::decode(&raw.kind, raw.payload)
    }
}

fn typed<T: serde::de::DeserializeOwned>(kind: &str, value: Value) -> Result<T, DomainError> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::validation(format!("Malformed {} payload: {}", kind, e)))
}

impl EventPayload {
    /// Decode a wire `type` + `payload` pair.
    ///
    /// A null payload is treated as an empty object. Known types whose
    /// payload does not fit their shape are rejected.
    pub fn decode(kind: &str, payload: Value) -> Result<Self, DomainError> {
        let payload = match payload {
            Value::Null => Value::Object(PayloadMap::new()),
            Value::Object(map) => Value::Object(map),
            other => {
                return Err(DomainError::validation(format!(
                    "Payload of {} event must be an object, got {}",
                    kind, other
                )))
            }
        };

        Ok(match kind {
            event_types::RUMOR => Self::Rumor(typed(kind, payload)?),
            event_types::SKILL_RESULT => Self::SkillResult(typed(kind, payload)?),
            event_types::FACTION_PRESSURE_RESULT => {
                Self::FactionPressureResult(typed(kind, payload)?)
            }
            event_types::FACTION_MOVE => Self::FactionMove(typed(kind, payload)?),
            event_types::DISCOVERY => Self::Discovery(typed(kind, payload)?),
            event_types::LEAD => Self::Lead(typed(kind, payload)?),
            event_types::COMPLICATION => Self::Complication(typed(kind, payload)?),
            event_types::REPORT => Self::Report(typed(kind, payload)?),
            event_types::WARNING => Self::Warning(typed(kind, payload)?),
            event_types::ARC_DEVELOPMENT => Self::ArcDevelopment(typed(kind, payload)?),
            _ => Self::Unknown {
                kind: kind.to_string(),
                payload: match payload {
                    Value::Object(map) => map,
                    _ => PayloadMap::new(),
                },
            },
        })
    }

    /// An empty payload of an arbitrary type.
    pub fn unknown(kind: impl Into<String>) -> Self {
        Self::Unknown {
            kind: kind.into(),
            payload: PayloadMap::new(),
        }
    }

    /// The wire `type` tag.
    pub fn kind(&self) -> &str {
        match self {
            Self::Rumor(_) => event_types::RUMOR,
            Self::SkillResult(_) => event_types::SKILL_RESULT,
            Self::FactionPressureResult(_) => event_types::FACTION_PRESSURE_RESULT,
            Self::FactionMove(_) => event_types::FACTION_MOVE,
            Self::Discovery(_) => event_types::DISCOVERY,
            Self::Lead(_) => event_types::LEAD,
            Self::Complication(_) => event_types::COMPLICATION,
            Self::Report(_) => event_types::REPORT,
            Self::Warning(_) => event_types::WARNING,
            Self::ArcDevelopment(_) => event_types::ARC_DEVELOPMENT,
            Self::Unknown { kind, .. } => kind,
        }
    }

    /// True for an event that was stored without any type tag.
    pub fn is_untyped(&self) -> bool {
        matches!(self, Self::Unknown { kind, .. } if kind.trim().is_empty())
    }

    /// Re-decode an untyped payload as `kind`. Typed payloads are returned as-is.
    pub fn retyped(self, kind: &str) -> Result<Self, DomainError> {
        match self {
            Self::Unknown { kind: current, payload } if current.trim().is_empty() => {
                Self::decode(kind, Value::Object(payload))
            }
            other => Ok(other),
        }
    }

    /// Location named by the payload, if the payload carries one.
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Rumor(p) => p.location.as_deref(),
            Self::FactionMove(p) => p.location.as_deref(),
            Self::Discovery(p) => p.location.as_deref(),
            Self::Lead(p) => p.location.as_deref(),
            Self::Complication(p) => p.location.as_deref(),
            Self::Unknown { payload, .. } => payload.get("location").and_then(Value::as_str),
            Self::SkillResult(_)
            | Self::FactionPressureResult(_)
            | Self::Report(_)
            | Self::Warning(_)
            | Self::ArcDevelopment(_) => None,
        }
    }

    /// Faction named by the payload, if any.
    pub fn faction_id(&self) -> Option<FactionId> {
        match self {
            Self::FactionMove(p) => p.faction_id.clone(),
            Self::Report(p) | Self::Warning(p) => p.faction_id.clone(),
            Self::SkillResult(p) | Self::FactionPressureResult(p) => p.faction_id.clone(),
            Self::Unknown { payload, .. } => payload
                .get("faction_id")
                .and_then(Value::as_str)
                .map(FactionId::from),
            Self::Rumor(_)
            | Self::Discovery(_)
            | Self::Lead(_)
            | Self::Complication(_)
            | Self::ArcDevelopment(_) => None,
        }
    }
}

impl Serialize for EventPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EventPayload", 2)?;
        state.serialize_field("type", self.kind())?;
        match self {
            Self::Rumor(p) => state.serialize_field("payload", p)?,
            Self::SkillResult(p) | Self::FactionPressureResult(p) => {
                state.serialize_field("payload", p)?
            }
            Self::FactionMove(p) => state.serialize_field("payload", p)?,
            Self::Discovery(p) => state.serialize_field("payload", p)?,
            Self::Lead(p) => state.serialize_field("payload", p)?,
            Self::Complication(p) => state.serialize_field("payload", p)?,
            Self::Report(p) | Self::Warning(p) => state.serialize_field("payload", p)?,
            Self::ArcDevelopment(p) => state.serialize_field("payload", p)?,
            Self::Unknown { payload, .. } => state.serialize_field("payload", payload)?,
        }
        state.end()
    }
}
