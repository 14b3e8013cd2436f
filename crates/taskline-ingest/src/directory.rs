//! Team Directory client: "who are the members of team T".
//!
//! The directory is an external collaborator. Lookups are bounded-latency
//! (request timeout) and failure is non-fatal: the caller degrades to an
//! empty member contribution for that one event.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use taskline_core::{defaults, Error, Result, UserId};

/// One membership row as returned by the Team Directory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub user_id: UserId,
    pub team_id: i64,
    pub role: String,
}

/// Membership lookup seam. Production uses [`HttpTeamDirectory`]; tests
/// substitute in-memory implementations.
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    /// Current members of `team_id`. Order is not significant.
    async fn members(&self, team_id: i64) -> Result<Vec<TeamMember>>;
}

/// HTTP implementation against the team service's internal endpoint.
pub struct HttpTeamDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTeamDirectory {
    /// Build a client for the directory at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(defaults::DIRECTORY_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Directory(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl TeamDirectory for HttpTeamDirectory {
    async fn members(&self, team_id: i64) -> Result<Vec<TeamMember>> {
        let url = format!("{}/internal/teams/{}/members", self.base_url, team_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Directory(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Directory(format!(
                "team service returned {status} for team {team_id}"
            )));
        }

        response
            .json::<Vec<TeamMember>>()
            .await
            .map_err(|e| Error::Directory(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};

    async fn spawn_team_service() -> String {
        let router = Router::new()
            .route(
                "/internal/teams/:id/members",
                get(|Path(id): Path<i64>| async move {
                    if id == 500 {
                        return Err(StatusCode::INTERNAL_SERVER_ERROR);
                    }
                    Ok(Json(serde_json::json!([
                        {"userId": 1, "teamId": id, "role": "owner"},
                        {"userId": 2, "teamId": id, "role": "member"}
                    ])))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_members_decodes_response() {
        let base_url = spawn_team_service().await;
        let directory = HttpTeamDirectory::new(base_url).unwrap();

        let members = directory.members(7).await.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].user_id, 1);
        assert_eq!(members[0].role, "owner");
        assert_eq!(members[1].team_id, 7);
    }

    #[tokio::test]
    async fn test_non_200_is_directory_error() {
        let base_url = spawn_team_service().await;
        let directory = HttpTeamDirectory::new(base_url).unwrap();

        let err = directory.members(500).await.unwrap_err();
        assert!(matches!(err, Error::Directory(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_directory_error() {
        // Nothing listens on this port.
        let directory = HttpTeamDirectory::new("http://127.0.0.1:1").unwrap();
        let err = directory.members(7).await.unwrap_err();
        assert!(matches!(err, Error::Directory(_)));
    }
}
