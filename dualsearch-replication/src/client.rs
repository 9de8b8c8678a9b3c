use super::types::{GetDocumentResponse, SearchResponse};
use async_trait::async_trait;
use dualsearch::{
    Backend, BackendFailure, BackendResult, CallContext, Document, DocumentKey, DualSearchError,
    Query, INSTANCE_ID_FIELD,
};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use std::time::Duration;

/// HTTP client for the REST API of a single OpenSearch cluster
pub struct OpenSearchClient {
    name: String,
    base_url: Url,
    http_client: reqwest::Client,
}

impl OpenSearchClient {
    pub fn new(name: impl Into<String>, base_url: &str, timeout: Duration) -> dualsearch::Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| DualSearchError::Config(format!("invalid endpoint {:?}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(DualSearchError::Config(format!(
                "endpoint {} cannot carry a path",
                base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DualSearchError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            name: name.into(),
            base_url,
            http_client,
        })
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send `request`, bounded by the context deadline, and classify the status.
    async fn execute(&self, ctx: &CallContext, request: RequestBuilder) -> BackendResult<Response> {
        let request = match ctx.remaining() {
            Some(remaining) => request.timeout(remaining),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            BackendFailure::other(format!("error executing request on {}: {}", self.name, e))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(BackendFailure::NotFound);
        }

        let body = response.text().await.unwrap_or_default();
        Err(BackendFailure::other(format!(
            "request failed: [{}] {}",
            status.as_u16(),
            body
        )))
    }

    async fn decode<T: serde::de::DeserializeOwned>(&self, response: Response) -> BackendResult<T> {
        response.json::<T>().await.map_err(|e| {
            BackendFailure::other(format!("failed to decode response from {}: {}", self.name, e))
        })
    }
}

/// Query-string search constrained by a term filter on `instance_id`.
pub fn search_body(instance_id: &str, query: &Query) -> serde_json::Value {
    serde_json::json!({
        "query": {
            "bool": {
                "must": {
                    "query_string": {
                        "query": query.value,
                    }
                },
                "filter": {
                    "term": {
                        INSTANCE_ID_FIELD: instance_id,
                    }
                }
            }
        }
    })
}

#[async_trait]
impl Backend for OpenSearchClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn index_exists(&self, ctx: &CallContext, index_name: &str) -> BackendResult<bool> {
        let request = self.http_client.head(self.url(&[index_name]));
        match self.execute(ctx, request).await {
            Ok(_) => Ok(true),
            Err(BackendFailure::NotFound) => Ok(false),
            Err(BackendFailure::Other(msg)) => Err(BackendFailure::other(format!(
                "unexpected response checking index exists: {}",
                msg
            ))),
        }
    }

    async fn create_index(
        &self,
        ctx: &CallContext,
        index_name: &str,
        config: &serde_json::Value,
    ) -> BackendResult<()> {
        let request = self.http_client.put(self.url(&[index_name])).json(config);
        self.execute(ctx, request).await.map(|_| ())
    }

    async fn index_document(
        &self,
        ctx: &CallContext,
        index_name: &str,
        key: &DocumentKey,
        body: &serde_json::Value,
        refresh: bool,
    ) -> BackendResult<()> {
        let mut url = self.url(&[index_name, "_doc", key.as_str()]);
        url.query_pairs_mut()
            .append_pair("refresh", if refresh { "true" } else { "false" });

        let request = self.http_client.put(url).json(body);
        self.execute(ctx, request).await.map(|_| ())
    }

    async fn get_document(
        &self,
        ctx: &CallContext,
        index_name: &str,
        key: &DocumentKey,
    ) -> BackendResult<Document> {
        let request = self
            .http_client
            .get(self.url(&[index_name, "_doc", key.as_str()]));
        let response = self.execute(ctx, request).await?;
        let body: GetDocumentResponse = self.decode(response).await?;
        Ok(body.source)
    }

    async fn delete_document(
        &self,
        ctx: &CallContext,
        index_name: &str,
        key: &DocumentKey,
    ) -> BackendResult<()> {
        let request = self
            .http_client
            .delete(self.url(&[index_name, "_doc", key.as_str()]));
        self.execute(ctx, request).await.map(|_| ())
    }

    async fn delete_index(&self, ctx: &CallContext, index_name: &str) -> BackendResult<()> {
        let request = self.http_client.delete(self.url(&[index_name]));
        self.execute(ctx, request).await.map(|_| ())
    }

    async fn search(
        &self,
        ctx: &CallContext,
        instance_id: &str,
        query: &Query,
    ) -> BackendResult<Vec<Document>> {
        let request = self
            .http_client
            .post(self.url(&["_search"]))
            .json(&search_body(instance_id, query));
        let response = self.execute(ctx, request).await?;
        let body: SearchResponse = self.decode(response).await?;
        Ok(body.hits.hits.into_iter().map(|hit| hit.source).collect())
    }
}
