use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Settings;
use crate::core::configuration::ConfigurationReference;
use crate::core::proposal::TrackerUser;
use crate::core::validation::ExistingProjectIndex;
use crate::core::{NewProject, ProjectTracker};
use crate::error::CreatorError;
use crate::models::shotgrid::{
    AccessToken, CreatedEntityResponse, EntityLink, ErrorResponse, HumanUserListResponse,
    NewProjectPayload, PageLinks, PermissionUpdatePayload, PipelineConfigurationPayload,
    ProjectListResponse, SearchRequest,
};

const API_PREFIX: &str = "api/v1";
const USER_AGENT: &str = "SGPC/0.1.0";
const ARRAY_FILTER_CONTENT_TYPE: &str = "application/vnd+shotgun.api3_array+json";
const USER_FIELDS: [&str; 4] = ["id", "name", "sg_lichting", "permission_rule_set"];
const SUPERVISOR_PERMISSION_GROUP_ID: u64 = 190;

/// ShotGrid REST API client, authenticated as a script.
pub struct ShotGridClient {
    client: Client,
    base_url: Url,
    token: String,
    page_size: u32,
}

impl ShotGridClient {
    /// Authenticates with the script credentials from the settings.
    pub async fn connect(settings: &Settings) -> Result<Self, CreatorError> {
        let base_url = Url::parse(&format!("{}/", settings.site.trim_end_matches('/')))
            .map_err(|e| CreatorError::Settings(format!("Invalid ShotGrid site: {}", e)))?;
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        let token_url = endpoint(&base_url, "auth/access_token")?;
        log::info!("Connecting to ShotGrid at {}", base_url);
        let response = client
            .post(token_url)
            .header(header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", settings.script_name.as_str()),
                ("client_secret", settings.api_key.as_str()),
            ])
            .send()
            .await?;
        let token: AccessToken = read_json(response).await?;
        log::debug!("Access token valid for {} seconds", token.expires_in);

        Ok(ShotGridClient {
            client,
            base_url,
            token: token.access_token,
            page_size: settings.page_size,
        })
    }

    async fn search_user(&self, filter: [&str; 3]) -> Result<Option<TrackerUser>, CreatorError> {
        let url = endpoint(&self.base_url, "entity/human_users/_search")?;
        let body = serde_json::to_vec(&SearchRequest {
            filters: vec![filter],
            fields: &USER_FIELDS,
        })
        .map_err(|e| CreatorError::RemoteFailure(e.to_string()))?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, ARRAY_FILTER_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        let users: HumanUserListResponse = read_json(response).await?;
        Ok(users.data.into_iter().next().map(TrackerUser::from))
    }

    async fn create_entity<P: serde::Serialize>(
        &self,
        entity: &str,
        payload: &P,
    ) -> Result<u64, CreatorError> {
        let url = endpoint(&self.base_url, &format!("entity/{}", entity))?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;
        let created: CreatedEntityResponse = read_json(response).await?;
        Ok(created.data.id)
    }
}

#[async_trait]
impl ProjectTracker for ShotGridClient {
    async fn list_existing_projects(&self) -> Result<ExistingProjectIndex, CreatorError> {
        let url = endpoint(&self.base_url, "entity/projects")?;
        let page_size = self.page_size.to_string();
        let mut index = ExistingProjectIndex::new();
        let mut page_number: u32 = 1;

        loop {
            let page_number_param = page_number.to_string();
            let response = self
                .client
                .get(url.clone())
                .bearer_auth(&self.token)
                .header(header::ACCEPT, "application/json")
                .query(&[
                    ("fields", "name,sg_projectcode"),
                    ("page[size]", page_size.as_str()),
                    ("page[number]", page_number_param.as_str()),
                ])
                .send()
                .await?;
            let page: ProjectListResponse = read_json(response).await?;
            let fetched = page.data.len();
            for project in page.data {
                index.insert(
                    &project.attributes.name,
                    project.attributes.sg_projectcode.as_deref(),
                );
            }

            if !has_more_pages(fetched, self.page_size, page.links.as_ref()) {
                break;
            }
            page_number += 1;
        }

        log::info!("Fetched {} existing projects", index.len());
        Ok(index)
    }

    async fn find_user(&self, username: &str) -> Result<Option<TrackerUser>, CreatorError> {
        if let Some(user) = self.search_user(["name", "contains", username]).await? {
            return Ok(Some(user));
        }
        self.search_user(["login", "is", username]).await
    }

    async fn promote_to_supervisor(&self, user: &TrackerUser) -> Result<(), CreatorError> {
        let url = endpoint(&self.base_url, &format!("entity/human_users/{}", user.id))?;
        let payload = PermissionUpdatePayload {
            permission_rule_set: EntityLink::new("PermissionRuleSet", SUPERVISOR_PERMISSION_GROUP_ID),
        };
        let response = self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await?;
        let _: CreatedEntityResponse = read_json(response).await?;
        Ok(())
    }

    async fn create_project(&self, project: &NewProject) -> Result<u64, CreatorError> {
        let users: Vec<EntityLink> = project
            .supervisors
            .iter()
            .map(|id| EntityLink::new("HumanUser", *id))
            .collect();
        let payload = NewProjectPayload {
            name: project.name.clone(),
            tank_name: project.name.clone(),
            sg_projectcode: project.code.clone(),
            users: users.clone(),
            sg_supervisors: users,
            sg_render_engine: project.render_engine.as_str().to_string(),
            sg_type: project.project_type.as_str().to_string(),
            sg_lichting: project.cohort.clone(),
            sg_fps: project.fps,
            sg_status: "Active".to_string(),
        };
        self.create_entity("projects", &payload).await
    }

    async fn apply_configuration(
        &self,
        project_id: u64,
        configuration: &ConfigurationReference,
    ) -> Result<(), CreatorError> {
        let payload = PipelineConfigurationPayload {
            code: "Primary".to_string(),
            descriptor: configuration.descriptor.clone(),
            plugin_ids: "basic.*".to_string(),
            project: EntityLink::new("Project", project_id),
            sg_lichting: configuration.track.clone(),
        };
        let id = self
            .create_entity("pipeline_configurations", &payload)
            .await?;
        log::info!(
            "Attached pipeline configuration {} to project {}",
            id,
            project_id
        );
        Ok(())
    }
}

/// Another page is only requested when ShotGrid links one and the current
/// page came back full.
fn has_more_pages(fetched: usize, page_size: u32, links: Option<&PageLinks>) -> bool {
    let has_next = links.and_then(|links| links.next.as_ref()).is_some();
    has_next && fetched >= page_size as usize
}

fn endpoint(base_url: &Url, path: &str) -> Result<Url, CreatorError> {
    base_url
        .join(&format!("{}/{}", API_PREFIX, path))
        .map_err(|e| CreatorError::Settings(format!("Invalid ShotGrid url: {}", e)))
}

/// Decodes a success body, or turns an error body into a `RemoteFailure`
/// carrying ShotGrid's own message.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, CreatorError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        log::error!("ShotGrid returned {}: {}", status, body);
        return Err(CreatorError::RemoteFailure(describe_error(status.as_u16(), &body)));
    }
    serde_json::from_str(&body).map_err(|e| {
        log::error!("Unexpected ShotGrid response: {}", e);
        CreatorError::RemoteFailure(format!("Unexpected response from ShotGrid: {}", e))
    })
}

fn describe_error(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(errors) if !errors.errors.is_empty() => errors.describe(),
        _ => format!("HTTP {}: {}", status, body.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_live_under_the_api_prefix() {
        let base = Url::parse("https://studio.example.com/").unwrap();
        assert_eq!(
            endpoint(&base, "entity/projects").unwrap().as_str(),
            "https://studio.example.com/api/v1/entity/projects"
        );
        assert_eq!(
            endpoint(&base, "entity/human_users/12").unwrap().as_str(),
            "https://studio.example.com/api/v1/entity/human_users/12"
        );
    }

    fn links(next: Option<&str>) -> PageLinks {
        PageLinks {
            current: Some("/api/v1/entity/projects?page[number]=1".to_string()),
            next: next.map(|n| n.to_string()),
        }
    }

    #[test]
    fn full_page_with_next_link_keeps_paging() {
        let next = links(Some("/api/v1/entity/projects?page[number]=2"));
        assert!(has_more_pages(500, 500, Some(&next)));
    }

    #[test]
    fn short_page_ends_paging() {
        let next = links(Some("/api/v1/entity/projects?page[number]=2"));
        assert!(!has_more_pages(499, 500, Some(&next)));
        assert!(!has_more_pages(0, 500, Some(&next)));
    }

    #[test]
    fn missing_links_end_paging() {
        assert!(!has_more_pages(500, 500, None));
    }

    #[test]
    fn full_page_without_next_link_ends_paging() {
        assert!(!has_more_pages(500, 500, Some(&links(None))));
    }

    #[test]
    fn last_page_decoded_from_shotgrid_stops() {
        let body = r#"{"data": [], "links": {"self": "/api/v1/entity/projects?page[number]=3", "next": null}}"#;
        let page: ProjectListResponse = serde_json::from_str(body).unwrap();
        assert!(!has_more_pages(page.data.len(), 500, page.links.as_ref()));
    }

    #[test]
    fn error_bodies_are_kept_verbatim() {
        let body = r#"{"errors":[{"status":401,"title":"Authentication failed","detail":"bad key"}]}"#;
        assert_eq!(describe_error(401, body), "Authentication failed (bad key)");
        assert_eq!(describe_error(502, " Bad Gateway \n"), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn project_payload_matches_shotgrid_fields() {
        let payload = NewProjectPayload {
            name: "spaceship".to_string(),
            tank_name: "spaceship".to_string(),
            sg_projectcode: "abc".to_string(),
            users: vec![EntityLink::new("HumanUser", 7)],
            sg_supervisors: vec![EntityLink::new("HumanUser", 7)],
            sg_render_engine: "Arnold".to_string(),
            sg_type: "Fiction".to_string(),
            sg_lichting: "L2026".to_string(),
            sg_fps: 25,
            sg_status: "Active".to_string(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["users"][0]["type"], "HumanUser");
        assert_eq!(value["sg_lichting"], "L2026");
        assert_eq!(value["sg_fps"], 25);
    }

    #[test]
    fn search_body_uses_array_filters() {
        let body = serde_json::to_value(SearchRequest {
            filters: vec![["login", "is", "jdoe"]],
            fields: &USER_FIELDS,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "filters": [["login", "is", "jdoe"]],
                "fields": ["id", "name", "sg_lichting", "permission_rule_set"]
            })
        );
    }
}
