use super::*;
use crate::{
    documents::UploadRequest,
    mock_pod::{owner_client, spawn_mock_pod},
    Session,
};
use shared::domain::FileBlob;

async fn upload_passport(client: &PodClient) {
    client
        .upload_document(
            &PodOwner::Session,
            UploadRequest {
                doc_type: DocumentType::Passport,
                file: FileBlob::new("passport.pdf", b"pdf".to_vec()),
                expiration: None,
                description: None,
                verify: false,
            },
        )
        .await
        .expect("upload");
}

fn authorization_for<'a>(dataset: &'a SolidDataset, agent: &str) -> Option<&'a Thing> {
    dataset
        .things()
        .iter()
        .find(|thing| thing.urls(acl::AGENT).any(|a| a == agent))
}

#[tokio::test]
async fn give_adds_agent_authorization_alongside_owner_control() {
    let (base, pod) = spawn_mock_pod().await;
    let client = owner_client(&base);
    upload_passport(&client).await;

    let acl_url = client
        .set_document_acl(DocumentType::Passport, AclPermission::Give, "bob")
        .await
        .expect("give");
    assert_eq!(acl_url.as_str(), format!("{base}/PASS/Documents/Passport/.acl"));

    let stored = pod.json("/PASS/Documents/Passport/.acl").expect("acl stored");
    let dataset = SolidDataset::from_json_ld(&stored).expect("acl dataset");

    let owner = authorization_for(&dataset, &format!("{base}/profile/card#me")).expect("owner");
    assert!(owner.urls(acl::MODE).any(|m| m == acl::CONTROL));

    let bob = authorization_for(&dataset, "https://bob.opencommons.net/profile/card#me")
        .expect("bob authorization");
    assert!(bob.has_type(acl::AUTHORIZATION));
    let modes: Vec<&str> = bob.urls(acl::MODE).collect();
    assert_eq!(modes, vec![acl::READ, acl::WRITE, acl::APPEND]);
    assert_eq!(
        bob.get_url(acl::DEFAULT),
        Some(format!("{base}/PASS/Documents/Passport/").as_str())
    );
}

#[tokio::test]
async fn revoke_removes_only_the_agent() {
    let (base, pod) = spawn_mock_pod().await;
    let client = owner_client(&base);
    upload_passport(&client).await;

    client
        .set_documents_container_acl(AclPermission::Give, "bob")
        .await
        .expect("give bob");
    client
        .set_documents_container_acl(AclPermission::Give, "carol")
        .await
        .expect("give carol");
    client
        .set_documents_container_acl(AclPermission::Revoke, "bob")
        .await
        .expect("revoke bob");

    let stored = pod.json("/PASS/Documents/.acl").expect("acl stored");
    let dataset = SolidDataset::from_json_ld(&stored).expect("acl dataset");
    assert!(authorization_for(&dataset, "https://bob.opencommons.net/profile/card#me").is_none());
    assert!(authorization_for(&dataset, "https://carol.opencommons.net/profile/card#me").is_some());
    assert!(authorization_for(&dataset, &format!("{base}/profile/card#me")).is_some());
}

#[tokio::test]
async fn missing_document_container_is_not_found() {
    let (base, _pod) = spawn_mock_pod().await;
    let client = owner_client(&base);

    let err = client
        .set_document_acl(DocumentType::BankStatement, AclPermission::Give, "bob")
        .await
        .expect_err("should fail");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn own_pod_target_is_rejected_before_any_request() {
    // Nothing listens on this address; reaching the network would yield an HTTP error.
    let session = Session::parse(
        "http://alice.localhost:9/profile/card#me",
        "http://localhost:9/",
    )
    .expect("session");
    let client = PodClient::new(session);

    let err = client
        .set_document_acl(DocumentType::Passport, AclPermission::Give, "alice")
        .await
        .expect_err("should fail");
    assert!(matches!(err, ClientError::SelfTarget));

    let err = client
        .set_documents_container_acl(AclPermission::Revoke, " alice ")
        .await
        .expect_err("should fail");
    assert!(matches!(err, ClientError::SelfTarget));
}
