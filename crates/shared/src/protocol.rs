use serde::{Deserialize, Serialize};

/// Body POSTed to `<provider>idp/register/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPodRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub pod_name: String,
    pub create_web_id: bool,
    pub create_pod: bool,
    pub root_pod: bool,
    pub register: bool,
}

impl RegisterPodRequest {
    /// The pod name is everything before the first `@` of the email.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        let email = email.into();
        let pod_name = email.split('@').next().unwrap_or_default().to_string();
        Self {
            email,
            password: password.into(),
            confirm_password: confirm_password.into(),
            pod_name,
            create_web_id: true,
            create_pod: true,
            root_pod: false,
            register: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientCredentialsGrant<'a> {
    pub grant_type: &'a str,
    pub scope: &'a str,
}

impl Default for ClientCredentialsGrant<'_> {
    fn default() -> Self {
        Self {
            grant_type: "client_credentials",
            scope: "webid",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}
