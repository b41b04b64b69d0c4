use axum::body::Bytes;
use chrono::Utc;
use reqwest::{header::CONTENT_TYPE, Method, StatusCode};
use tracing::debug;
use url::Url;

use super::sigv4::{self, Credentials};
use super::{content_type_for, is_safe_key};
use crate::config::S3Config;
use crate::error::{ApiError, Result};
use crate::ports::{ImageStore, PortFuture, StoredObject};

/// S3-compatible bucket addressed path-style: `{endpoint}/{bucket}/{key}`.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: reqwest::Client,
    endpoint: Url,
    host: String,
    bucket: String,
    region: String,
    access_key: String,
    secret_key: String,
}

impl S3Store {
    /// # Errors
    /// Returns a configuration error if the endpoint is not an absolute URL with a host.
    pub fn new(config: &S3Config) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| ApiError::ConfigError(format!("Invalid s3_endpoint: {e}")))?;
        let host = endpoint
            .host_str()
            .map(|host| match endpoint.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            })
            .ok_or_else(|| ApiError::ConfigError("s3_endpoint has no host".to_string()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            host,
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            access_key: config.access_key.clone(),
            secret_key: config.secret_key.clone(),
        })
    }

    fn object_path(&self, key: &str) -> Result<String> {
        if !is_safe_key(key) {
            return Err(ApiError::bad_request(format!("Invalid image key '{key}'")));
        }
        let base = self.endpoint.path().trim_end_matches('/');
        Ok(sigv4::encode_path(&format!("{base}/{}/{key}", self.bucket)))
    }

    async fn send(
        &self,
        method: Method,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<reqwest::Response> {
        let path = self.object_path(key)?;
        let credentials = Credentials {
            access_key: &self.access_key,
            secret_key: &self.secret_key,
            region: &self.region,
        };
        let signed = sigv4::sign(
            &credentials,
            method.as_str(),
            &self.host,
            &path,
            &body,
            Utc::now(),
        )?;

        let mut url = self.endpoint.clone();
        url.set_path(&path);

        let mut request = self
            .client
            .request(method.clone(), url)
            .header("authorization", signed.authorization)
            .header("x-amz-date", signed.amz_date)
            .header("x-amz-content-sha256", signed.content_sha256);
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        if !body.is_empty() {
            request = request.body(body);
        }

        request
            .send()
            .await
            .map_err(|e| ApiError::StorageError(format!("{method} {key} failed: {e}")))
    }
}

async fn failure(response: reqwest::Response, action: &str, key: &str) -> ApiError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read storage response body".to_string());
    ApiError::StorageError(format!("{action} {key} returned {status}: {body}"))
}

impl ImageStore for S3Store {
    fn put<'a>(&'a self, key: &'a str, bytes: Bytes, content_type: &'a str) -> PortFuture<'a, ()> {
        Box::pin(async move {
            let size = bytes.len();
            let response = self.send(Method::PUT, key, bytes, Some(content_type)).await?;
            if !response.status().is_success() {
                return Err(failure(response, "PUT", key).await);
            }
            debug!(key, size, "uploaded image to bucket");
            Ok(())
        })
    }

    fn get<'a>(&'a self, key: &'a str) -> PortFuture<'a, StoredObject> {
        Box::pin(async move {
            let response = self.send(Method::GET, key, Bytes::new(), None).await?;
            match response.status() {
                StatusCode::NOT_FOUND => Err(ApiError::not_found(format!("Image '{key}' not found"))),
                status if status.is_success() => {
                    let content_type = response
                        .headers()
                        .get(CONTENT_TYPE)
                        .and_then(|value| value.to_str().ok())
                        .map_or_else(|| content_type_for(key).to_string(), ToString::to_string);
                    let bytes = response.bytes().await.map_err(|e| {
                        ApiError::StorageError(format!("Failed to read {key} body: {e}"))
                    })?;
                    Ok(StoredObject {
                        bytes,
                        content_type,
                    })
                }
                _ => Err(failure(response, "GET", key).await),
            }
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> PortFuture<'a, ()> {
        Box::pin(async move {
            let response = self.send(Method::DELETE, key, Bytes::new(), None).await?;
            let status = response.status();
            if status.is_success() || status == StatusCode::NOT_FOUND {
                debug!(key, "deleted image from bucket");
                Ok(())
            } else {
                Err(failure(response, "DELETE", key).await)
            }
        })
    }
}
