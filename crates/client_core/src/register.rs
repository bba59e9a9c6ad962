use reqwest::Client;
use serde_json::Value;
use shared::protocol::RegisterPodRequest;
use tracing::{info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub struct RegistrationCredentials {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Registers a new account, WebID and pod at `<provider>idp/register/` and
/// returns the provider's JSON response as-is, error bodies included.
pub async fn register_pod(
    http: &Client,
    identity_provider: &Url,
    credentials: RegistrationCredentials,
) -> ClientResult<Value> {
    let RegistrationCredentials {
        email,
        password,
        confirm_password,
    } = credentials;

    let register_url = identity_provider.join("idp/register/")?;
    let body = RegisterPodRequest::new(email, password, confirm_password);
    let res = http.post(register_url.clone()).json(&body).send().await?;
    let status = res.status();
    match res.json::<Value>().await {
        Ok(response) => {
            if status.is_success() {
                info!(pod_name = %body.pod_name, provider = %identity_provider, "pod registered");
            } else {
                warn!(%status, provider = %identity_provider, "registration rejected");
            }
            Ok(response)
        }
        Err(_) if !status.is_success() => Err(ClientError::Status {
            method: "POST".to_string(),
            url: register_url.to_string(),
            status: status.as_u16(),
        }),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
#[path = "tests/register_tests.rs"]
mod tests;
