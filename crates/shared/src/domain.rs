use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    BankStatement,
    Passport,
    DriversLicense,
}

impl DocumentType {
    pub const ALL: [DocumentType; 3] = [
        DocumentType::BankStatement,
        DocumentType::Passport,
        DocumentType::DriversLicense,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DocumentType::BankStatement => "Bank Statement",
            DocumentType::Passport => "Passport",
            DocumentType::DriversLicense => "Drivers License",
        }
    }

    /// Container segment under `PASS/Documents/`, always ending in `/`.
    pub fn container_slug(self) -> &'static str {
        match self {
            DocumentType::BankStatement => "BankStatement/",
            DocumentType::Passport => "Passport/",
            DocumentType::DriversLicense => "DriversLicense/",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        DocumentType::ALL
            .into_iter()
            .find(|doc| {
                doc.label()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_ascii_lowercase()
                    == wanted
            })
            .ok_or_else(|| format!("unknown document type '{s}'"))
    }
}

/// Give grants Read/Write/Append; Revoke removes the agent's authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AclPermission {
    Give,
    Revoke,
}

impl AclPermission {
    pub fn label(self) -> &'static str {
        match self {
            AclPermission::Give => "Give",
            AclPermission::Revoke => "Revoke",
        }
    }
}

impl fmt::Display for AclPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AclPermission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "give" => Ok(AclPermission::Give),
            "revoke" => Ok(AclPermission::Revoke),
            other => Err(format!("unknown permission '{other}', expected give or revoke")),
        }
    }
}

/// Whose pod an operation reads from or writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PodOwner {
    Session,
    Other { username: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub given_name: String,
    pub family_name: String,
    pub username: String,
    pub web_id: String,
    pub pod_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<DateTime<Utc>>,
}

impl User {
    pub fn person(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSubmission {
    pub given_name: String,
    pub family_name: String,
    pub username: String,
    pub web_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileBlob {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInfo {
    pub profile_name: Option<String>,
    pub organization: Option<String>,
}
