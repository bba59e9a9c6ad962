use super::*;
use crate::mock_pod::{owner_client, spawn_mock_pod};

fn passport_upload(name: &str, bytes: &[u8]) -> UploadRequest {
    UploadRequest {
        doc_type: DocumentType::Passport,
        file: FileBlob::new(name, bytes.to_vec()).with_content_type("application/pdf"),
        expiration: NaiveDate::from_ymd_opt(2031, 6, 30),
        description: Some("renewed passport".into()),
        verify: true,
    }
}

#[test]
fn checksum_is_lowercase_sha256_hex() {
    assert_eq!(
        sha256_hex(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[tokio::test]
async fn upload_then_fetch_returns_file_url_and_metadata() {
    let (base, pod) = spawn_mock_pod().await;
    let client = owner_client(&base);

    let record = client
        .upload_document(&PodOwner::Session, passport_upload("passport scan.pdf", b"%PDF-1.7"))
        .await
        .expect("upload");
    assert_eq!(
        record.url.as_str(),
        format!("{base}/PASS/Documents/Passport/passport%20scan.pdf")
    );
    assert!(pod.contains("/PASS/Documents/Passport/passport%20scan.pdf"));

    let url = client
        .get_documents(DocumentType::Passport, &PodOwner::Session)
        .await
        .expect("fetch");
    assert_eq!(url, record.url);

    let fetched = client
        .fetch_document_record(DocumentType::Passport, &PodOwner::Session)
        .await
        .expect("record");
    assert_eq!(fetched.name, "passport scan.pdf");
    assert_eq!(fetched.description.as_deref(), Some("renewed passport"));
    assert_eq!(fetched.expiration, NaiveDate::from_ymd_opt(2031, 6, 30));
    assert_eq!(fetched.checksum, Some(sha256_hex(b"%PDF-1.7")));
    assert!(fetched.upload_date.is_some());
}

#[tokio::test]
async fn fetching_missing_document_is_not_found() {
    let (base, _pod) = spawn_mock_pod().await;
    let client = owner_client(&base);

    let err = client
        .get_documents(DocumentType::BankStatement, &PodOwner::Session)
        .await
        .expect_err("should fail");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn reupload_replaces_previous_file() {
    let (base, pod) = spawn_mock_pod().await;
    let client = owner_client(&base);

    client
        .upload_document(&PodOwner::Session, passport_upload("old.pdf", b"old"))
        .await
        .expect("first upload");
    client
        .upload_document(&PodOwner::Session, passport_upload("new.pdf", b"new"))
        .await
        .expect("second upload");

    assert!(!pod.contains("/PASS/Documents/Passport/old.pdf"));
    assert!(pod.contains("/PASS/Documents/Passport/new.pdf"));
    let url = client
        .get_documents(DocumentType::Passport, &PodOwner::Session)
        .await
        .expect("fetch");
    assert!(url.as_str().ends_with("/new.pdf"));
}

#[tokio::test]
async fn rejects_reserved_file_names_before_network() {
    let (base, pod) = spawn_mock_pod().await;
    let client = owner_client(&base);

    for name in ["", "document.ttl", "a/b.pdf", "x.acl"] {
        let err = client
            .upload_document(&PodOwner::Session, passport_upload(name, b"x"))
            .await
            .expect_err("should fail");
        assert!(matches!(err, ClientError::Validation(_)), "{name:?}");
    }
    assert!(pod.requests().is_empty());
}

#[tokio::test]
async fn delete_removes_files_then_container() {
    let (base, pod) = spawn_mock_pod().await;
    let client = owner_client(&base);
    client
        .upload_document(&PodOwner::Session, passport_upload("scan.pdf", b"scan"))
        .await
        .expect("upload");

    let container = client
        .delete_document(DocumentType::Passport)
        .await
        .expect("delete");
    assert_eq!(container.as_str(), format!("{base}/PASS/Documents/Passport/"));
    assert!(!pod.contains("/PASS/Documents/Passport/scan.pdf"));
    assert!(!pod.contains("/PASS/Documents/Passport/document.ttl"));
    assert!(!pod.contains("/PASS/Documents/Passport/"));

    let requests = pod.requests();
    let last_file_delete = requests
        .iter()
        .rposition(|r| r == "DELETE /PASS/Documents/Passport/scan.pdf")
        .expect("file delete");
    let container_delete = requests
        .iter()
        .position(|r| r == "DELETE /PASS/Documents/Passport/")
        .expect("container delete");
    assert!(last_file_delete < container_delete);
}

#[tokio::test]
async fn deleting_absent_document_fails() {
    let (base, _pod) = spawn_mock_pod().await;
    let client = owner_client(&base);
    let err = client
        .delete_document(DocumentType::DriversLicense)
        .await
        .expect_err("should fail");
    assert!(err.is_not_found());
}
