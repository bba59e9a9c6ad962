use shared::{
    domain::{AclPermission, DocumentType, PodOwner},
    vocab::acl,
};
use tracing::info;
use url::Url;

use crate::{
    dataset::{SolidDataset, Thing},
    error::{ClientError, ClientResult},
    PodClient,
};

const OWNER_AUTHORIZATION: &str = "owner";

fn authorization(acl_url: &Url, name: &str, agent: &Url, resource: &Url, modes: &[&str]) -> Thing {
    let mut thing = Thing::local(acl_url, name)
        .add_type(acl::AUTHORIZATION)
        .add_url(acl::AGENT, agent.as_str())
        .add_url(acl::ACCESS_TO, resource.as_str());
    if resource.path().ends_with('/') {
        thing = thing.add_url(acl::DEFAULT, resource.as_str());
    }
    for mode in modes {
        thing = thing.add_url(acl::MODE, *mode);
    }
    thing
}

fn agent_authorization_name(username: &str) -> String {
    format!("agent-{username}")
}

impl PodClient {
    /// Gives or revokes `username`'s access to one document type's container.
    pub async fn set_document_acl(
        &self,
        doc_type: DocumentType,
        permission: AclPermission,
        username: &str,
    ) -> ClientResult<Url> {
        let agent = self.permission_target(username)?;
        let resource = self.document_container(doc_type, &PodOwner::Session).await?;
        self.set_agent_access(&resource, username, &agent, permission)
            .await
    }

    /// Gives or revokes `username`'s access to the whole `PASS/Documents/` container.
    pub async fn set_documents_container_acl(
        &self,
        permission: AclPermission,
        username: &str,
    ) -> ClientResult<Url> {
        let agent = self.permission_target(username)?;
        let resource = self.documents_container(&PodOwner::Session).await?;
        self.set_agent_access(&resource, username, &agent, permission)
            .await
    }

    /// Resolves the WebID to authorize, refusing the session's own pod.
    fn permission_target(&self, username: &str) -> ClientResult<Url> {
        let username = username.trim();
        if self.session().targets_own_pod(username) {
            return Err(ClientError::SelfTarget);
        }
        self.session().other_web_id(username)
    }

    async fn set_agent_access(
        &self,
        resource: &Url,
        username: &str,
        agent: &Url,
        permission: AclPermission,
    ) -> ClientResult<Url> {
        let acl_url = self.acl_url(resource).await?;
        let mut dataset = self.get_dataset_or_default(&acl_url).await?;
        if dataset.things().is_empty() {
            dataset = owner_acl(&acl_url, self.session().web_id(), resource);
        }

        let name = agent_authorization_name(username.trim());
        match permission {
            AclPermission::Give => {
                dataset.set_thing(authorization(
                    &acl_url,
                    &name,
                    agent,
                    resource,
                    &[acl::READ, acl::WRITE, acl::APPEND],
                ));
            }
            AclPermission::Revoke => {
                let thing = Thing::local(&acl_url, &name);
                dataset.remove_thing(thing.url());
            }
        }

        self.save_dataset(&acl_url, &dataset).await?;
        info!(%resource, %agent, %permission, "acl updated");
        Ok(acl_url)
    }
}

/// A fresh ACL always starts with full control for the pod owner.
fn owner_acl(acl_url: &Url, owner: &Url, resource: &Url) -> SolidDataset {
    let mut dataset = SolidDataset::new();
    dataset.set_thing(authorization(
        acl_url,
        OWNER_AUTHORIZATION,
        owner,
        resource,
        &[acl::READ, acl::WRITE, acl::APPEND, acl::CONTROL],
    ));
    dataset
}

#[cfg(test)]
#[path = "tests/acl_tests.rs"]
mod tests;
