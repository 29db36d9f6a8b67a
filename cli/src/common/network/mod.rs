//! # Stacks Network Utilities (`common::network`)
//!
//! File: cli/src/common/network/mod.rs
//!
//! ## Overview
//!
//! Thin blocking HTTP helpers over `reqwest::blocking` used by the git and NuGet
//! downloaders. Calls block the current thread and carry no timeout of their own;
//! the scaffolding batch runs on a dedicated blocking task, one request at a time.
//!
//! Failures are reported as `HttpError` so downloaders can keep the transport
//! failure / bad status distinction (the status code is preserved).
//!
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

const AGENT: &str = concat!("stacks-cli/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("unexpected response body from {url}: {message}")]
    Body { url: String, message: String },
}

/// A blocking HTTP client with an optional bearer token.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    token: Option<String>,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    fn request(&self, url: &str) -> RequestBuilder {
        let mut builder = self.client.get(url).header(USER_AGENT, AGENT);
        if let Some(token) = &self.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        builder
    }

    fn send(&self, builder: RequestBuilder, url: &str) -> Result<reqwest::blocking::Response, HttpError> {
        debug!("GET {}", url);
        let response = builder.send().map_err(|e| HttpError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let status = response.status().as_u16();
        if status > 299 {
            return Err(HttpError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }

    /// Downloads a response body.
    pub fn get_bytes(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        let response = self.send(self.request(url), url)?;
        let bytes = response.bytes().map_err(|e| HttpError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }

    /// Downloads and deserializes a JSON document.
    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        let builder = self.request(url).header(ACCEPT, "application/json");
        let response = self.send(builder, url)?;
        response.json::<T>().map_err(|e| HttpError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
