//! Form submissions: each runs processing → notifications → cleared status
//! against one [`StatusNotifier`], and hands the outcome back to the caller.

use std::time::Duration;

use chrono::NaiveDate;
use shared::domain::{AclPermission, DocumentType, PodOwner, User, UserSubmission};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::{
    barcode::{drivers_license_data, BarcodeReader},
    documents::{DocumentRecord, UploadRequest},
    error::ClientError,
    status::{StatusAction, StatusNotifier, LONG_NOTICE, SHORT_NOTICE},
    PodClient,
};

/// A failed submission: `message` is what the form displayed.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct FormError {
    pub message: String,
    #[source]
    pub cause: Option<ClientError>,
}

impl FormError {
    fn rejected(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    fn caused_by(message: impl Into<String>, cause: ClientError) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause),
        }
    }
}

pub type FormResult<T> = Result<T, FormError>;

/// Picks the explicitly typed username, falling back to the selected user.
pub fn resolve_username<'u>(username: &'u str, selected_user: Option<&'u str>) -> Option<&'u str> {
    [Some(username), selected_user]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
}

pub struct FormContext<'a> {
    client: &'a PodClient,
    notifier: &'a StatusNotifier,
}

impl<'a> FormContext<'a> {
    pub fn new(client: &'a PodClient, notifier: &'a StatusNotifier) -> Self {
        Self { client, notifier }
    }

    pub fn notifier(&self) -> &StatusNotifier {
        self.notifier
    }

    pub fn status(&self) -> FormStatus<'a> {
        FormStatus::new(self.notifier)
    }

    fn begin(&self) {
        self.status().begin();
    }

    fn notify(&self, message: impl Into<String>, duration: Duration) {
        self.status().notify(message, duration);
    }

    fn finish<T>(&self, outcome: FormResult<T>) -> FormResult<T> {
        self.status().finish(outcome)
    }

    /// Locates the session owner's document of `doc_type`.
    pub async fn fetch_document(&self, doc_type: DocumentType) -> FormResult<Url> {
        self.begin();
        let outcome = self.locate(doc_type, &PodOwner::Session).await;
        self.finish(outcome)
    }

    /// Locates `doc_type` in another user's pod.
    pub async fn cross_pod_query(
        &self,
        username: &str,
        selected_user: Option<&str>,
        doc_type: DocumentType,
    ) -> FormResult<Url> {
        self.begin();
        let outcome = match resolve_username(username, selected_user) {
            Some(username) => {
                let owner = PodOwner::Other {
                    username: username.to_string(),
                };
                self.locate(doc_type, &owner).await
            }
            None => Err(FormError::rejected(
                "Search failed. Reason: Username not provided.",
            )),
        };
        self.finish(outcome)
    }

    async fn locate(&self, doc_type: DocumentType, owner: &PodOwner) -> FormResult<Url> {
        if self.notifier.state().document_url.is_some() {
            self.notifier.dispatch(StatusAction::ClearDocumentLocation);
        }
        self.notify("Locating document...", SHORT_NOTICE);
        match self.client.get_documents(doc_type, owner).await {
            Ok(url) => {
                self.notifier
                    .dispatch(StatusAction::SetDocumentLocation(url.to_string()));
                self.notify("Document found! Document located at: ", LONG_NOTICE);
                Ok(url)
            }
            Err(err) => {
                self.notifier.dispatch(StatusAction::ClearDocumentLocation);
                Err(FormError::caused_by(
                    "Search failed. Reason: Document not found.",
                    err,
                ))
            }
        }
    }

    /// Uploads the file held in the form state into the session owner's pod.
    pub async fn upload_document(
        &self,
        doc_type: DocumentType,
        expiration: Option<NaiveDate>,
        description: Option<String>,
    ) -> FormResult<DocumentRecord> {
        self.begin();
        let outcome = self
            .upload(&PodOwner::Session, doc_type, expiration, description)
            .await;
        self.finish(outcome)
    }

    /// Uploads the file held in the form state into another user's pod.
    pub async fn cross_pod_write(
        &self,
        username: &str,
        selected_user: Option<&str>,
        doc_type: DocumentType,
        expiration: Option<NaiveDate>,
        description: Option<String>,
    ) -> FormResult<DocumentRecord> {
        self.begin();
        let outcome = match resolve_username(username, selected_user) {
            Some(username) => {
                let owner = PodOwner::Other {
                    username: username.to_string(),
                };
                self.upload(&owner, doc_type, expiration, description)
                    .await
            }
            None => Err(FormError::rejected(
                "Search failed. Reason: Username not provided.",
            )),
        };
        self.finish(outcome)
    }

    async fn upload(
        &self,
        owner: &PodOwner,
        doc_type: DocumentType,
        expiration: Option<NaiveDate>,
        description: Option<String>,
    ) -> FormResult<DocumentRecord> {
        let state = self.notifier.state();
        let file = state
            .file
            .ok_or_else(|| FormError::rejected("Upload failed. Reason: No file selected."))?;
        self.notify("Uploading file to Pod...", SHORT_NOTICE);
        let request = UploadRequest {
            doc_type,
            file,
            expiration,
            description,
            verify: state.verify_file,
        };
        match self.client.upload_document(owner, request).await {
            Ok(record) => {
                self.notifier.dispatch(StatusAction::ClearFile);
                self.notifier.dispatch(StatusAction::ClearVerifyFile);
                self.notifier
                    .dispatch(StatusAction::SetDocumentLocation(record.url.to_string()));
                self.notify("File uploaded to Pod.", LONG_NOTICE);
                Ok(record)
            }
            Err(err @ ClientError::ChecksumMismatch { .. }) => Err(FormError::caused_by(
                "Upload failed. Reason: File verification failed.",
                err,
            )),
            Err(err) => Err(FormError::caused_by(
                format!("Upload failed. Reason: {err}"),
                err,
            )),
        }
    }

    /// Removes the document's files, then its container.
    pub async fn delete_document(&self, doc_type: DocumentType) -> FormResult<Url> {
        self.begin();
        let outcome = self.delete(doc_type).await;
        self.finish(outcome)
    }

    async fn delete(&self, doc_type: DocumentType) -> FormResult<Url> {
        let failed = |err| FormError::caused_by("Deletion failed. Reason: Data not found.", err);
        self.notify("File being deleted from Pod...", SHORT_NOTICE);
        let container = self
            .client
            .delete_document_file(doc_type)
            .await
            .map_err(failed)?;
        self.client
            .delete_document_container(&container)
            .await
            .map_err(failed)?;
        self.notify("Removing file container from Pod...", LONG_NOTICE);
        Ok(container)
    }

    pub async fn set_acl_permission(
        &self,
        doc_type: DocumentType,
        permission: AclPermission,
        username: &str,
        selected_user: Option<&str>,
    ) -> FormResult<Url> {
        self.begin();
        let outcome = match resolve_username(username, selected_user) {
            Some(username) => {
                let result = self
                    .client
                    .set_document_acl(doc_type, permission, username)
                    .await;
                self.permission_outcome(result, || {
                    format!("{permission} permission to {username} for {doc_type}.")
                })
            }
            None => Err(username_missing()),
        };
        self.finish(outcome)
    }

    pub async fn set_container_acl_permission(
        &self,
        permission: AclPermission,
        username: &str,
        selected_user: Option<&str>,
    ) -> FormResult<Url> {
        self.begin();
        let outcome = match resolve_username(username, selected_user) {
            Some(username) => {
                let result = self
                    .client
                    .set_documents_container_acl(permission, username)
                    .await;
                self.permission_outcome(result, || {
                    format!("{permission} permission to {username} for Documents Container.")
                })
            }
            None => Err(username_missing()),
        };
        self.finish(outcome)
    }

    fn permission_outcome(
        &self,
        result: Result<Url, ClientError>,
        success: impl FnOnce() -> String,
    ) -> FormResult<Url> {
        match result {
            Ok(acl_url) => {
                self.notify(success(), LONG_NOTICE);
                Ok(acl_url)
            }
            Err(err @ ClientError::SelfTarget) => Err(FormError::caused_by(
                "Set permissions failed. Reason: Current user Pod cannot change container permissions to itself.",
                err,
            )),
            Err(err) => Err(FormError::caused_by(
                "Set permissions failed. Reason: File not found.",
                err,
            )),
        }
    }

    /// Resolves and stores a new user, returning the updated user list.
    pub async fn add_user(&self, submission: UserSubmission) -> FormResult<Vec<User>> {
        if submission.username.trim().is_empty() && submission.web_id.trim().is_empty() {
            let err = FormError::rejected("Operation failed. Reason: No WebId provided");
            self.notify(err.message.clone(), LONG_NOTICE);
            return Err(err);
        }
        self.begin();
        let person = format!("{} {}", submission.given_name, submission.family_name);
        self.notify(format!("Adding user \"{person}\" to Solid..."), LONG_NOTICE);
        let outcome = async {
            let user = self.client.create_user(submission).await?;
            self.client.add_user(&user).await
        }
        .await
        .map_err(|err| FormError::caused_by(format!("Operation failed. Reason: {err}"), err))
        .inspect(|_| self.notify(format!("User \"{person}\" added to Solid"), LONG_NOTICE));
        self.finish(outcome)
    }

    /// Removes `user` from the list, returning the users that remain.
    pub async fn delete_user(&self, user: &User) -> FormResult<Vec<User>> {
        self.begin();
        let person = user.person();
        self.notify(format!("Deleting user \"{person}\" from Solid..."), SHORT_NOTICE);
        let outcome = self
            .client
            .delete_user(user)
            .await
            .map_err(|err| FormError::caused_by(format!("Operation failed. Reason: {err}"), err))
            .inspect(|_| {
                self.notify(format!("User \"{person}\" deleted from Solid..."), SHORT_NOTICE)
            });
        self.finish(outcome)
    }

    pub fn select_user(&self, user: &User) -> String {
        self.notify(format!("User \"{}\" selected.", user.username), SHORT_NOTICE);
        user.username.clone()
    }

    pub async fn decode_license(
        &self,
        reader: &dyn BarcodeReader,
        image_bytes: &[u8],
    ) -> FormResult<String> {
        self.status().decode_license(reader, image_bytes).await
    }
}

/// The notification side of a form, usable without a pod session.
#[derive(Clone, Copy)]
pub struct FormStatus<'a> {
    notifier: &'a StatusNotifier,
}

impl<'a> FormStatus<'a> {
    pub fn new(notifier: &'a StatusNotifier) -> Self {
        Self { notifier }
    }

    fn begin(&self) {
        self.notifier.dispatch(StatusAction::SetProcessing);
    }

    fn notify(&self, message: impl Into<String>, duration: Duration) {
        let message = message.into();
        info!("{message}");
        self.notifier.run_notification(message, duration);
    }

    fn finish<T>(&self, outcome: FormResult<T>) -> FormResult<T> {
        if let Err(err) = &outcome {
            if let Some(cause) = &err.cause {
                warn!(error = %cause, "form submission failed");
            }
            self.notify(err.message.clone(), LONG_NOTICE);
        }
        self.notifier.clear_processing_after(SHORT_NOTICE);
        outcome
    }

    /// Decodes a driver's-license barcode image into JSON field records.
    pub async fn decode_license(
        &self,
        reader: &dyn BarcodeReader,
        image_bytes: &[u8],
    ) -> FormResult<String> {
        self.begin();
        self.notify("Decoding license...", SHORT_NOTICE);
        let outcome = drivers_license_data(reader, image_bytes)
            .map_err(|err| {
                FormError::caused_by(format!("Decode failed. Reason: {err}"), err.into())
            })
            .inspect(|_| self.notify("License decoded.", SHORT_NOTICE));
        self.finish(outcome)
    }
}

fn username_missing() -> FormError {
    FormError::rejected("Set permissions failed. Reason: Username not provided.")
}

#[cfg(test)]
#[path = "tests/forms_tests.rs"]
mod tests;
