use reqwest::Client;
use shared::protocol::{ClientCredentialsGrant, TokenResponse};
use tracing::info;
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Authenticated identity handed to [`crate::PodClient`].
#[derive(Debug, Clone)]
pub struct Session {
    web_id: Url,
    identity_provider: Url,
    access_token: Option<String>,
}

impl Session {
    pub fn new(web_id: Url, identity_provider: Url) -> Self {
        Self {
            web_id,
            identity_provider: with_trailing_slash(identity_provider),
            access_token: None,
        }
    }

    pub fn parse(web_id: &str, identity_provider: &str) -> ClientResult<Self> {
        Ok(Self::new(Url::parse(web_id)?, Url::parse(identity_provider)?))
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn web_id(&self) -> &Url {
        &self.web_id
    }

    pub fn identity_provider(&self) -> &Url {
        &self.identity_provider
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.access_token.is_some()
    }

    /// Exchanges client credentials at `<provider>.oidc/token` for a bearer token.
    pub async fn login_client_credentials(
        mut self,
        http: &Client,
        client_id: &str,
        client_secret: &str,
    ) -> ClientResult<Self> {
        let token_url = self.identity_provider.join(".oidc/token")?;
        let res = http
            .post(token_url.clone())
            .basic_auth(client_id, Some(client_secret))
            .form(&ClientCredentialsGrant::default())
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                method: "POST".to_string(),
                url: token_url.to_string(),
                status: status.as_u16(),
            });
        }
        let token: TokenResponse = res.json().await?;
        info!(web_id = %self.web_id, expires_in = ?token.expires_in, "session logged in");
        self.access_token = Some(token.access_token);
        Ok(self)
    }

    pub fn logout(&mut self) {
        self.access_token = None;
    }

    /// Host (and port, if any) of the identity provider, e.g. `opencommons.net`.
    pub fn provider_authority(&self) -> String {
        authority(&self.identity_provider)
    }

    /// Pod root of another user hosted by the same provider.
    pub fn other_pod_url(&self, username: &str) -> ClientResult<Url> {
        let username = username.trim();
        if username.is_empty() || username.contains(['/', '.', '@', ':']) {
            return Err(ClientError::Validation(format!(
                "invalid pod username '{username}'"
            )));
        }
        Ok(Url::parse(&format!(
            "{}://{username}.{}/",
            self.identity_provider.scheme(),
            self.provider_authority()
        ))?)
    }

    /// WebID of another user hosted by the same provider.
    pub fn other_web_id(&self, username: &str) -> ClientResult<Url> {
        Ok(self.other_pod_url(username)?.join("profile/card#me")?)
    }

    /// True when `username` names the pod this session already owns.
    pub fn targets_own_pod(&self, username: &str) -> bool {
        let Ok(other) = self.other_pod_url(username) else {
            return false;
        };
        other.as_str() == pod_url_from_web_id(self.web_id.as_str())
    }
}

fn authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Everything before the first `profile` in a WebID, the usual pod root.
pub fn pod_url_from_web_id(web_id: &str) -> &str {
    web_id.split("profile").next().unwrap_or(web_id)
}

/// First DNS label of the WebID host: `https://bob.example.net/...` is `bob`.
pub fn username_from_web_id(web_id: &str) -> Option<String> {
    let url = Url::parse(web_id).ok()?;
    let label = url.host_str()?.split('.').next()?;
    (!label.is_empty()).then(|| label.to_string())
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
