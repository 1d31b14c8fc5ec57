use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::proposal::{PermissionGroup, TrackerUser};

pub type ProjectListResponse = ShotGridResponse<Vec<EntityRecord<ProjectAttributes>>>;
pub type HumanUserListResponse = ShotGridResponse<Vec<EntityRecord<HumanUserAttributes>>>;
pub type CreatedEntityResponse = ShotGridResponse<EntityRecord<Value>>;

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessToken {
    pub token_type: String,
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShotGridResponse<T> {
    pub data: T,
    #[serde(default)]
    pub links: Option<PageLinks>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub current: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntityRecord<A> {
    pub id: u64,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub attributes: A,
    #[serde(default)]
    pub relationships: Relationships,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Relationships {
    pub permission_rule_set: Option<RelationshipData>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RelationshipData {
    pub data: Option<EntityLink>,
}

/// Reference to another entity, the form ShotGrid uses for entity fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityLink {
    pub id: u64,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityLink {
    pub fn new(entity_type: &str, id: u64) -> Self {
        EntityLink {
            id,
            entity_type: entity_type.to_string(),
            name: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectAttributes {
    pub name: String,
    pub sg_projectcode: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HumanUserAttributes {
    pub name: String,
    pub sg_lichting: Option<String>,
}

impl From<EntityRecord<HumanUserAttributes>> for TrackerUser {
    fn from(record: EntityRecord<HumanUserAttributes>) -> Self {
        let permission_group = record
            .relationships
            .permission_rule_set
            .and_then(|rel| rel.data)
            .map(|link| PermissionGroup {
                id: link.id,
                name: link.name.unwrap_or_default(),
            });
        TrackerUser {
            id: record.id,
            name: record.attributes.name,
            cohort: record.attributes.sg_lichting,
            permission_group,
        }
    }
}

/// Search body for `_search` endpoints using the array filter syntax.
#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub filters: Vec<[&'a str; 3]>,
    pub fields: &'a [&'a str],
}

#[derive(Debug, Serialize)]
pub struct NewProjectPayload {
    pub name: String,
    pub tank_name: String,
    pub sg_projectcode: String,
    pub users: Vec<EntityLink>,
    pub sg_supervisors: Vec<EntityLink>,
    pub sg_render_engine: String,
    pub sg_type: String,
    pub sg_lichting: String,
    pub sg_fps: u32,
    pub sg_status: String,
}

#[derive(Debug, Serialize)]
pub struct PipelineConfigurationPayload {
    pub code: String,
    pub descriptor: String,
    pub plugin_ids: String,
    pub project: EntityLink,
    pub sg_lichting: String,
}

#[derive(Debug, Serialize)]
pub struct PermissionUpdatePayload {
    pub permission_rule_set: EntityLink,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<ApiError>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub status: Option<u16>,
    pub title: Option<String>,
    pub detail: Option<Value>,
}

impl ErrorResponse {
    /// Joins every error into one line for the user.
    pub fn describe(&self) -> String {
        self.errors
            .iter()
            .map(|e| {
                let title = e.title.clone().unwrap_or_else(|| "Unknown error".to_string());
                match &e.detail {
                    Some(Value::String(detail)) => format!("{} ({})", title, detail),
                    Some(Value::Null) | None => title,
                    Some(other) => format!("{} ({})", title, other),
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}
