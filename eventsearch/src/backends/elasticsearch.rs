//! Elasticsearch HTTP backend

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use super::r#trait::SearchBackend;
use super::response::{
    AnalyzeResponse, CountResponse, EsErrorResponse, GetResponse, SearchResponse, SuggestResponse,
    Suggestion,
};
use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::query::{CompiledQuery, SuggestRequest, SUGGESTER_NAME};
use crate::schema::IndexConfig;

/// Basic auth credentials
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub struct ElasticsearchClient {
    client: Client,
    base_url: Url,
    credentials: Option<Credentials>,
}

impl ElasticsearchClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("backend url {} cannot be a base", base_url)));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            credentials: None,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let client = Self::new(&config.url, Duration::from_millis(config.timeout_ms))?;
        Ok(match (&config.username, &config.password) {
            (Some(username), Some(password)) => client.with_credentials(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => client,
        })
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("backend url {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        tracing::debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        Ok(match &self.credentials {
            Some(c) => builder.basic_auth(&c.username, Some(&c.password)),
            None => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        builder
            .send()
            .await
            .map_err(|e| Error::BackendUnavailable(format!("{}: {}", self.base_url, e)))
    }

    /// Send and fail on any non-success status
    async fn execute(&self, builder: RequestBuilder, subject: &str) -> Result<Response> {
        let response = self.send(builder).await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response, subject).await)
        }
    }

    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        subject: &str,
    ) -> Result<T> {
        let response = self.execute(builder, subject).await?;
        let body = response
            .text()
            .await
            .map_err(|e| Error::BackendUnavailable(format!("reading response: {}", e)))?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn post_search<B: Serialize + Sync, T: serde::de::DeserializeOwned>(
        &self,
        index: &str,
        body: &B,
    ) -> Result<T> {
        let builder = self.request(Method::POST, &[index, "_search"])?.json(body);
        self.execute_json(builder, &format!("index {}", index)).await
    }
}

async fn error_from_response(response: Response, subject: &str) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let (kind, reason) = match serde_json::from_str::<EsErrorResponse>(&body) {
        Ok(envelope) => envelope.error.into_parts(),
        Err(_) => (None, body),
    };

    match (status, kind.as_deref()) {
        (_, Some("resource_already_exists_exception")) => {
            Error::IndexAlreadyExists(subject.to_string())
        }
        (StatusCode::NOT_FOUND, _) => Error::NotFound(subject.to_string()),
        _ => Error::Backend {
            status: status.as_u16(),
            reason,
        },
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchClient {
    async fn index_exists(&self, index: &str) -> Result<bool> {
        let response = self.send(self.request(Method::HEAD, &[index])?).await?;
        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            s => Err(Error::Backend {
                status: s.as_u16(),
                reason: format!("unexpected status checking index {}", index),
            }),
        }
    }

    async fn create_index(&self, index: &str, config: &IndexConfig) -> Result<()> {
        let builder = self.request(Method::PUT, &[index])?.json(config);
        self.execute(builder, index).await?;
        tracing::info!("Created index {}", index);
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, &[index])?;
        self.execute(builder, &format!("index {}", index)).await?;
        tracing::info!("Deleted index {}", index);
        Ok(())
    }

    async fn refresh(&self, index: &str) -> Result<()> {
        let builder = self.request(Method::POST, &[index, "_refresh"])?;
        self.execute(builder, &format!("index {}", index)).await?;
        Ok(())
    }

    async fn put_document(&self, index: &str, id: &str, doc: &Value) -> Result<()> {
        let builder = self.request(Method::PUT, &[index, "_doc", id])?.json(doc);
        self.execute(builder, &format!("index {}", index)).await?;
        Ok(())
    }

    async fn update_document(&self, index: &str, id: &str, partial: &Value) -> Result<()> {
        let builder = self
            .request(Method::POST, &[index, "_update", id])?
            .json(&json!({ "doc": partial }));
        self.execute(builder, &format!("document {}/{}", index, id)).await?;
        Ok(())
    }

    async fn get_document(&self, index: &str, id: &str) -> Result<Value> {
        let subject = format!("document {}/{}", index, id);
        let builder = self.request(Method::GET, &[index, "_doc", id])?;
        let response: GetResponse = self.execute_json(builder, &subject).await?;
        match response.source {
            Some(source) if response.found => Ok(source),
            _ => Err(Error::NotFound(subject)),
        }
    }

    async fn count(&self, index: &str) -> Result<u64> {
        let builder = self.request(Method::GET, &[index, "_count"])?;
        let response: CountResponse = self
            .execute_json(builder, &format!("index {}", index))
            .await?;
        Ok(response.count)
    }

    async fn search(&self, index: &str, query: &CompiledQuery) -> Result<SearchResponse> {
        self.post_search(index, query).await
    }

    async fn suggest(&self, index: &str, request: &SuggestRequest) -> Result<Vec<Suggestion>> {
        let response: SuggestResponse = self.post_search(index, request).await?;
        Ok(response.into_suggestions(SUGGESTER_NAME))
    }

    async fn analyze(&self, index: Option<&str>, analyzer: &str, text: &str) -> Result<Vec<String>> {
        let segments: Vec<&str> = match index {
            Some(index) => vec![index, "_analyze"],
            None => vec!["_analyze"],
        };
        let builder = self
            .request(Method::POST, &segments)?
            .json(&json!({ "analyzer": analyzer, "text": text }));
        let response: AnalyzeResponse = self
            .execute_json(builder, &format!("analyzer {}", analyzer))
            .await?;
        Ok(response.tokens.into_iter().map(|t| t.token).collect())
    }

    fn backend_name(&self) -> &str {
        "elasticsearch"
    }
}
