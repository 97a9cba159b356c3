use async_trait::async_trait;
use jsonwebtoken::EncodingKey;
use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client, RequestBuilder, Response,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

use crate::{
    config::WardenConfig,
    github::{
        auth::{create_app_jwt, parse_private_key},
        ApiError, Commit, GitHubApi, PullRequestRef, PullRequestState, RepositoryRef, Result,
        Workflow,
    },
};

const API_VERSION: &str = "2022-11-28";
const PER_PAGE: usize = 100;

/// Authenticated as the GitHub App itself. Only used to mint installation tokens.
pub struct GitHubApp {
    http: Client,
    api_base: Url,
    app_id: String,
    key: EncodingKey,
}

impl GitHubApp {
    pub fn new(config: &WardenConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.clone(),
            app_id: config.app_id.clone(),
            key: parse_private_key(&config.private_key)?,
        })
    }

    fn app_jwt(&self) -> Result<String> {
        create_app_jwt(&self.key, &self.app_id)
    }

    /// Name of the app we are authenticated as.
    #[tracing::instrument(skip(self))]
    pub async fn authenticated_app(&self) -> Result<String> {
        #[derive(Deserialize)]
        struct App {
            name: String,
        }

        let app: App = send_json(
            self.http
                .get(build_url(&self.api_base, "/app"))
                .bearer_auth(self.app_jwt()?),
        )
        .await?;

        Ok(app.name)
    }

    /// Creates a client acting on behalf of an installation. Tokens are never cached, each call
    /// requests a fresh one.
    #[tracing::instrument(skip(self))]
    pub async fn installation_client(&self, installation_id: u64) -> Result<InstallationClient> {
        #[derive(Deserialize)]
        struct AccessToken {
            token: String,
        }

        let access: AccessToken = send_json(
            self.http
                .post(build_url(
                    &self.api_base,
                    &format!("/app/installations/{}/access_tokens", installation_id),
                ))
                .bearer_auth(self.app_jwt()?),
        )
        .await?;
        debug!("obtained token for installation {}", installation_id);

        Ok(InstallationClient {
            http: self.http.clone(),
            api_base: self.api_base.clone(),
            token: access.token,
        })
    }
}

pub struct InstallationClient {
    http: Client,
    api_base: Url,
    token: String,
}

impl InstallationClient {
    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(build_url(&self.api_base, path))
            .bearer_auth(&self.token)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http
            .post(build_url(&self.api_base, path))
            .bearer_auth(&self.token)
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.http
            .put(build_url(&self.api_base, path))
            .bearer_auth(&self.token)
    }

    fn patch(&self, path: &str) -> RequestBuilder {
        self.http
            .patch(build_url(&self.api_base, path))
            .bearer_auth(&self.token)
    }
}

#[async_trait]
impl GitHubApi for InstallationClient {
    #[tracing::instrument(skip(self))]
    async fn list_repo_workflows(&self, repo: &RepositoryRef) -> Result<Vec<Workflow>> {
        #[derive(Deserialize)]
        struct Page {
            workflows: Vec<Workflow>,
        }

        let path = format!("/repos/{}/{}/actions/workflows", repo.owner, repo.name);
        let mut workflows = Vec::new();
        for page in 1.. {
            let Page { workflows: batch } =
                send_json(self.get(&path).query(&page_query(page))).await?;
            let last = batch.len() < PER_PAGE;
            workflows.extend(batch);
            if last {
                break;
            }
        }

        Ok(workflows)
    }

    #[tracing::instrument(skip(self))]
    async fn enable_workflow(&self, repo: &RepositoryRef, workflow_id: u64) -> Result<()> {
        send(self.put(&format!(
            "/repos/{}/{}/actions/workflows/{}/enable",
            repo.owner, repo.name, workflow_id
        )))
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self, body))]
    async fn create_comment(&self, pr: &PullRequestRef, body: &str) -> Result<u64> {
        #[derive(Serialize)]
        struct Request<'a> {
            body: &'a str,
        }

        #[derive(Deserialize)]
        struct Response {
            id: u64,
        }

        let response: Response = send_json(
            self.post(&format!(
                "/repos/{}/{}/issues/{}/comments",
                pr.repository.owner, pr.repository.name, pr.number
            ))
            .json(&Request { body }),
        )
        .await?;

        Ok(response.id)
    }

    #[tracing::instrument(skip(self))]
    async fn list_pull_commits(&self, pr: &PullRequestRef) -> Result<Vec<Commit>> {
        let path = format!(
            "/repos/{}/{}/pulls/{}/commits",
            pr.repository.owner, pr.repository.name, pr.number
        );
        let mut commits = Vec::new();
        for page in 1.. {
            let batch: Vec<Commit> = send_json(self.get(&path).query(&page_query(page))).await?;
            let last = batch.len() < PER_PAGE;
            commits.extend(batch);
            if last {
                break;
            }
        }

        Ok(commits)
    }

    #[tracing::instrument(skip(self))]
    async fn update_pull_request_state(
        &self,
        pr: &PullRequestRef,
        state: PullRequestState,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct Request {
            state: PullRequestState,
        }

        send(
            self.patch(&format!(
                "/repos/{}/{}/pulls/{}",
                pr.repository.owner, pr.repository.name, pr.number
            ))
            .json(&Request { state }),
        )
        .await?;

        Ok(())
    }
}

fn build_url(base: &Url, path: &str) -> String {
    format!("{}{}", base.as_str().trim_end_matches('/'), path)
}

fn page_query(page: usize) -> [(&'static str, usize); 2] {
    [("per_page", PER_PAGE), ("page", page)]
}

async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await?;
    let status = response.status();
    trace!("GitHub answered {} for {}", status, response.url());

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await?;
    Err(ApiError::Response {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    Ok(send(request).await?.json().await?)
}

/// GitHub error bodies look like `{"message": "Not Found", "documentation_url": "..."}`.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { message }) => message,
        Err(_) => body.trim().to_owned(),
    }
}
