use super::*;
use crate::{
    mock_pod::{owner_client, spawn_mock_pod},
    Session,
};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use shared::domain::FileBlob;
use std::{
    io::Cursor,
    sync::{Arc, Mutex},
};

struct FixedReader(&'static str);

impl BarcodeReader for FixedReader {
    fn decode_pdf417(&self, _image: &DynamicImage) -> Option<String> {
        Some(self.0.to_string())
    }
}

fn select_passport(notifier: &StatusNotifier) {
    notifier.dispatch(StatusAction::SetFile(
        FileBlob::new("passport.pdf", b"%PDF".to_vec()).with_content_type("application/pdf"),
    ));
    notifier.dispatch(StatusAction::ToggleVerifyFile);
}

fn record_messages(notifier: &StatusNotifier) -> Arc<Mutex<Vec<String>>> {
    let mut rx = notifier.subscribe();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let message = rx.borrow_and_update().message.clone();
            if !message.is_empty() {
                sink.lock().expect("lock").push(message);
            }
        }
    });
    seen
}

fn blank_png() -> Vec<u8> {
    let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(16, 16, Luma([255])));
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .expect("encode png");
    bytes.into_inner()
}

#[test]
fn typed_username_wins_over_selected_user() {
    assert_eq!(resolve_username(" bob ", Some("carol")), Some("bob"));
    assert_eq!(resolve_username("", Some("carol")), Some("carol"));
    assert_eq!(resolve_username("  ", Some(" ")), None);
    assert_eq!(resolve_username("", None), None);
}

#[tokio::test]
async fn upload_then_fetch_sets_document_location() {
    let (base, pod) = spawn_mock_pod().await;
    let client = owner_client(&base);
    let notifier = StatusNotifier::new();
    let form = FormContext::new(&client, &notifier);

    select_passport(&notifier);
    let record = form
        .upload_document(DocumentType::Passport, None, None)
        .await
        .expect("upload");
    assert!(pod.contains("/PASS/Documents/Passport/passport.pdf"));
    let state = notifier.state();
    assert_eq!(state.message, "File uploaded to Pod.");
    assert!(state.file.is_none());
    assert!(!state.verify_file);

    let url = form
        .fetch_document(DocumentType::Passport)
        .await
        .expect("fetch");
    assert_eq!(url, record.url);
    let state = notifier.state();
    assert_eq!(state.message, "Document found! Document located at: ");
    assert_eq!(state.document_url.as_deref(), Some(url.as_str()));
}

#[tokio::test]
async fn missing_document_reports_not_found() {
    let (base, _pod) = spawn_mock_pod().await;
    let client = owner_client(&base);
    let notifier = StatusNotifier::new();
    let form = FormContext::new(&client, &notifier);
    notifier.dispatch(StatusAction::SetDocumentLocation("stale".into()));

    let err = form
        .fetch_document(DocumentType::DriversLicense)
        .await
        .expect_err("should fail");
    assert_eq!(err.message, "Search failed. Reason: Document not found.");
    assert!(err.cause.as_ref().is_some_and(ClientError::is_not_found));
    let state = notifier.state();
    assert_eq!(state.message, err.message);
    assert_eq!(state.document_url, None);
}

#[tokio::test]
async fn cross_pod_forms_need_a_username() {
    let (base, pod) = spawn_mock_pod().await;
    let client = owner_client(&base);
    let notifier = StatusNotifier::new();
    let form = FormContext::new(&client, &notifier);

    let err = form
        .cross_pod_query("", None, DocumentType::Passport)
        .await
        .expect_err("should fail");
    assert_eq!(err.message, "Search failed. Reason: Username not provided.");

    select_passport(&notifier);
    let err = form
        .cross_pod_write(" ", None, DocumentType::Passport, None, None)
        .await
        .expect_err("should fail");
    assert_eq!(err.message, "Search failed. Reason: Username not provided.");
    assert!(pod.requests().is_empty());
}

#[tokio::test]
async fn upload_without_file_is_rejected() {
    let (base, pod) = spawn_mock_pod().await;
    let client = owner_client(&base);
    let notifier = StatusNotifier::new();
    let form = FormContext::new(&client, &notifier);

    let err = form
        .upload_document(DocumentType::BankStatement, None, None)
        .await
        .expect_err("should fail");
    assert_eq!(err.message, "Upload failed. Reason: No file selected.");
    assert!(err.cause.is_none());
    assert!(notifier.state().processing);
    assert!(pod.requests().is_empty());
}

#[tokio::test]
async fn delete_removes_files_then_container() {
    let (base, pod) = spawn_mock_pod().await;
    let client = owner_client(&base);
    let notifier = StatusNotifier::new();
    let form = FormContext::new(&client, &notifier);

    let seen = record_messages(&notifier);
    let err = form
        .delete_document(DocumentType::Passport)
        .await
        .expect_err("nothing to delete");
    assert_eq!(err.message, "Deletion failed. Reason: Data not found.");
    tokio::task::yield_now().await;
    assert_eq!(
        seen.lock().expect("lock").as_slice(),
        [
            "File being deleted from Pod...",
            "Deletion failed. Reason: Data not found."
        ]
    );

    select_passport(&notifier);
    form.upload_document(DocumentType::Passport, None, None)
        .await
        .expect("upload");
    let container = form
        .delete_document(DocumentType::Passport)
        .await
        .expect("delete");
    assert_eq!(container.as_str(), format!("{base}/PASS/Documents/Passport/"));
    assert_eq!(notifier.state().message, "Removing file container from Pod...");
    assert!(!pod.contains("/PASS/Documents/Passport/passport.pdf"));
    assert!(!pod.contains("/PASS/Documents/Passport/document.ttl"));
}

#[tokio::test]
async fn permission_messages() {
    let (base, _pod) = spawn_mock_pod().await;
    let client = owner_client(&base);
    let notifier = StatusNotifier::new();
    let form = FormContext::new(&client, &notifier);

    let err = form
        .set_acl_permission(DocumentType::Passport, AclPermission::Give, "", None)
        .await
        .expect_err("no username");
    assert_eq!(err.message, "Set permissions failed. Reason: Username not provided.");

    let err = form
        .set_acl_permission(DocumentType::Passport, AclPermission::Give, "", Some("bob"))
        .await
        .expect_err("no document yet");
    assert_eq!(err.message, "Set permissions failed. Reason: File not found.");

    select_passport(&notifier);
    form.upload_document(DocumentType::Passport, None, None)
        .await
        .expect("upload");
    form.set_acl_permission(DocumentType::Passport, AclPermission::Give, "bob", None)
        .await
        .expect("give");
    assert_eq!(notifier.state().message, "Give permission to bob for Passport.");

    form.set_container_acl_permission(AclPermission::Revoke, "", Some("bob"))
        .await
        .expect("revoke");
    assert_eq!(
        notifier.state().message,
        "Revoke permission to bob for Documents Container."
    );
}

#[tokio::test]
async fn permission_on_own_pod_is_rejected() {
    let session = Session::parse(
        "http://alice.localhost:9/profile/card#me",
        "http://localhost:9/",
    )
    .expect("session");
    let client = PodClient::new(session);
    let notifier = StatusNotifier::new();
    let form = FormContext::new(&client, &notifier);

    let err = form
        .set_container_acl_permission(AclPermission::Give, "alice", None)
        .await
        .expect_err("self target");
    assert_eq!(
        err.message,
        "Set permissions failed. Reason: Current user Pod cannot change container permissions to itself."
    );
}

#[tokio::test]
async fn add_and_delete_user_messages() {
    let (base, _pod) = spawn_mock_pod().await;
    let client = owner_client(&base);
    let notifier = StatusNotifier::new();
    let form = FormContext::new(&client, &notifier);

    let err = form
        .add_user(UserSubmission::default())
        .await
        .expect_err("no web id");
    assert_eq!(err.message, "Operation failed. Reason: No WebId provided");
    assert!(!notifier.state().processing);

    let users = form
        .add_user(UserSubmission {
            given_name: "Bob".into(),
            family_name: "Builder".into(),
            username: "bob".into(),
            web_id: format!("{base}/bob/profile/card#me"),
        })
        .await
        .expect("add");
    assert_eq!(users.len(), 1);
    assert_eq!(notifier.state().message, "User \"Bob Builder\" added to Solid");

    assert_eq!(form.select_user(&users[0]), "bob");
    assert_eq!(notifier.state().message, "User \"bob\" selected.");

    let remaining = form.delete_user(&users[0]).await.expect("delete");
    assert!(remaining.is_empty());
    assert_eq!(
        notifier.state().message,
        "User \"Bob Builder\" deleted from Solid..."
    );
}

#[tokio::test]
async fn decode_license_reports_fields_or_failure() {
    let (base, _pod) = spawn_mock_pod().await;
    let client = owner_client(&base);
    let notifier = StatusNotifier::new();
    let form = FormContext::new(&client, &notifier);

    let err = form
        .decode_license(&FixedReader("DAGSMITH"), b"not an image")
        .await
        .expect_err("bad image");
    assert!(err.message.starts_with("Decode failed. Reason: "));
    assert!(matches!(err.cause, Some(ClientError::Barcode(_))));
}

#[tokio::test]
async fn license_decodes_without_a_pod_session() {
    let notifier = StatusNotifier::new();
    let status = FormStatus::new(&notifier);

    let json = status
        .decode_license(&FixedReader("DAQSMITH\nDCSJOHN"), &blank_png())
        .await
        .expect("decode");
    let fields: serde_json::Value = serde_json::from_str(&json).expect("json");
    assert_eq!(
        fields,
        serde_json::json!([{ "DAQ": "SMITH" }, { "DCS": "JOHN" }])
    );
    let state = notifier.state();
    assert_eq!(state.message, "License decoded.");
    assert!(state.processing);
}
