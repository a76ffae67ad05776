use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::GithubConfig;
use crate::error::{AppError, AppResult};
use crate::store::{CollectionKey, Snapshot, Store, Version, parse_records};

const USER_AGENT: &str = concat!("draw-backend/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
pub struct ContentFile {
    pub sha: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub encoding: String,
}

#[derive(Debug, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub entry_type: String,
}

#[derive(Debug, Serialize)]
struct PutContentRequest<'a> {
    message: String,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutContentResponse {
    content: ContentFile,
}

/// 以 GitHub 仓库内容 API 作为存储, 文件 sha 即版本号
pub struct GithubContentStore {
    client: Client,
    config: GithubConfig,
}

impl GithubContentStore {
    pub fn new(config: GithubConfig, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, config })
    }

    fn contents_url(&self, path: &str) -> String {
        let prefix = self.config.path_prefix.trim_matches('/');
        let full_path = if prefix.is_empty() {
            path.to_string()
        } else {
            format!("{prefix}/{path}")
        };
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.owner,
            self.config.repo,
            full_path
        )
    }

    fn ensure_configured(&self) -> AppResult<()> {
        if !self.config.has_credentials() {
            return Err(AppError::StoreUnavailable(
                "GitHub store credentials are not configured".to_string(),
            ));
        }
        Ok(())
    }

    async fn get(&self, path: &str) -> AppResult<reqwest::Response> {
        self.ensure_configured()?;
        self.client
            .get(self.contents_url(path))
            .query(&[("ref", self.config.branch.as_str())])
            .bearer_auth(&self.config.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(unavailable)
    }

    fn decode(file: &ContentFile, key: &CollectionKey) -> AppResult<Vec<Value>> {
        if file.encoding != "base64" {
            return Err(AppError::StoreUnavailable(format!(
                "{key} has unsupported encoding '{}'",
                file.encoding
            )));
        }
        // GitHub 返回的 base64 每 60 个字符换行
        let compact: String = file.content.split_whitespace().collect();
        let bytes = STANDARD
            .decode(compact)
            .map_err(|e| AppError::StoreUnavailable(format!("{key} base64 decode failed: {e}")))?;
        parse_records(key, &bytes)
    }
}

fn unavailable(e: reqwest::Error) -> AppError {
    AppError::StoreUnavailable(format!("GitHub request failed: {e}"))
}

async fn status_error(what: &str, response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    AppError::StoreUnavailable(format!("GitHub {what} failed with {status}: {body}"))
}

#[async_trait]
impl Store for GithubContentStore {
    async fn read(&self, key: &CollectionKey) -> AppResult<Snapshot> {
        let response = self.get(&key.path()).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(AppError::NotFound(format!("{key} not found"))),
            s if s.is_success() => {
                let file: ContentFile = response.json().await.map_err(unavailable)?;
                let records = Self::decode(&file, key)?;
                Ok(Snapshot {
                    records,
                    version: Version::new(file.sha),
                })
            }
            _ => Err(status_error("read", response).await),
        }
    }

    async fn write(
        &self,
        key: &CollectionKey,
        records: &[Value],
        expected: &Version,
    ) -> AppResult<Version> {
        self.ensure_configured()?;

        let body = PutContentRequest {
            message: format!("Update {key}"),
            content: STANDARD.encode(serde_json::to_vec_pretty(records)?),
            branch: &self.config.branch,
            sha: expected.token(),
        };

        let response = self
            .client
            .put(self.contents_url(&key.path()))
            .bearer_auth(&self.config.token)
            .header("Accept", "application/vnd.github+json")
            .json(&body)
            .send()
            .await
            .map_err(unavailable)?;

        match response.status() {
            // 409: sha 过期; 422: 文件已存在但未携带 sha
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(AppError::Conflict(format!("{key} was modified concurrently")))
            }
            s if s.is_success() => {
                let result: PutContentResponse = response.json().await.map_err(unavailable)?;
                log::debug!("Committed {key} at {}", result.content.sha);
                Ok(Version::new(result.content.sha))
            }
            _ => Err(status_error("write", response).await),
        }
    }

    async fn list(&self, dir: &str) -> AppResult<Vec<String>> {
        let response = self.get(dir).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(AppError::NotFound(format!("directory {dir} not found"))),
            s if s.is_success() => {
                let entries: Vec<DirectoryEntry> = response.json().await.map_err(unavailable)?;
                let mut names: Vec<String> = entries
                    .into_iter()
                    .filter(|e| e.entry_type == "file")
                    .map(|e| e.name)
                    .collect();
                names.sort();
                Ok(names)
            }
            _ => Err(status_error("list", response).await),
        }
    }
}
