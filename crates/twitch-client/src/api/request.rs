use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;

use super::*;

impl TwitchApiClient {
    pub fn new(client_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Build auth headers from the given token.
    fn auth_headers(&self, token: &Token) -> Result<HeaderMap, TwitchError> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", token.access_token);
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&bearer)?);
        headers.insert("Client-Id", HeaderValue::from_str(&self.client_id)?);
        Ok(headers)
    }

    /// Turn a non-success response into `ApiError`, otherwise return the body.
    async fn read_body(url: &str, resp: reqwest::Response) -> Result<String, TwitchError> {
        let status = resp.status();
        let body = resp.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!(url, "Got 401, caller should refresh token and retry");
        }

        if !status.is_success() {
            return Err(TwitchError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(body)
    }

    /// Execute a GET request with auth headers.
    pub(super) async fn authenticated_get(
        &self,
        url: &str,
        token: &Token,
    ) -> Result<String, TwitchError> {
        let headers = self.auth_headers(token)?;
        let resp = self.http.get(url).headers(headers).send().await?;
        Self::read_body(url, resp).await
    }

    /// Execute a PATCH request with auth headers and JSON body.
    pub(super) async fn authenticated_patch(
        &self,
        url: &str,
        token: &Token,
        body: &impl Serialize,
    ) -> Result<String, TwitchError> {
        let headers = self.auth_headers(token)?;
        let resp = self
            .http
            .patch(url)
            .headers(headers)
            .json(body)
            .send()
            .await?;
        Self::read_body(url, resp).await
    }

    /// Execute a POST request with auth headers and JSON body.
    pub(super) async fn authenticated_post(
        &self,
        url: &str,
        token: &Token,
        body: &impl Serialize,
    ) -> Result<String, TwitchError> {
        let headers = self.auth_headers(token)?;
        let resp = self
            .http
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await?;
        Self::read_body(url, resp).await
    }

    /// Execute a DELETE request with auth headers.
    pub(super) async fn authenticated_delete(
        &self,
        url: &str,
        token: &Token,
    ) -> Result<(), TwitchError> {
        let headers = self.auth_headers(token)?;
        let resp = self.http.delete(url).headers(headers).send().await?;
        Self::read_body(url, resp).await.map(|_| ())
    }
}
