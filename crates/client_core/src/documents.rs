use chrono::{DateTime, NaiveDate, Utc};
use sha2::{Digest, Sha256};
use shared::{
    domain::{DocumentType, FileBlob, PodOwner},
    vocab::{schema, CHECKSUM},
};
use tracing::{info, warn};
use url::Url;

use crate::{
    dataset::Thing,
    error::{ClientError, ClientResult},
    PodClient,
};

pub const DOCUMENTS_CONTAINER: &str = "PASS/Documents/";
const METADATA_RESOURCE: &str = "document.ttl";
const METADATA_THING: &str = "document";

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub doc_type: DocumentType,
    pub file: FileBlob,
    pub expiration: Option<NaiveDate>,
    pub description: Option<String>,
    /// Re-download the file after upload and compare checksums.
    pub verify: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub doc_type: DocumentType,
    pub name: String,
    pub url: Url,
    pub description: Option<String>,
    pub expiration: Option<NaiveDate>,
    pub upload_date: Option<DateTime<Utc>>,
    pub checksum: Option<String>,
}

impl DocumentRecord {
    fn to_thing(&self, metadata_url: &Url) -> Thing {
        let mut thing = Thing::local(metadata_url, METADATA_THING)
            .add_string(schema::NAME, &self.name)
            .add_string(schema::IDENTIFIER, self.doc_type.label())
            .add_url(schema::URL, self.url.as_str());
        if let Some(uploaded) = self.upload_date {
            thing = thing.add_datetime(schema::UPLOAD_DATE, uploaded);
        }
        if let Some(checksum) = &self.checksum {
            thing = thing.add_string(CHECKSUM, checksum);
        }
        if let Some(expiration) = self.expiration {
            thing = thing.add_date(schema::END_DATE, expiration);
        }
        if let Some(description) = &self.description {
            thing = thing.add_string(schema::DESCRIPTION, description);
        }
        thing
    }

    fn from_thing(doc_type: DocumentType, thing: &Thing, base: &Url) -> ClientResult<Self> {
        let url = thing
            .get_url(schema::URL)
            .ok_or_else(|| ClientError::Missing {
                what: "document url",
                url: thing.url().to_string(),
            })?;
        Ok(Self {
            doc_type,
            name: thing.string(schema::NAME).unwrap_or_default().to_string(),
            url: base.join(url)?,
            description: thing.string(schema::DESCRIPTION).map(str::to_string),
            expiration: thing.date(schema::END_DATE),
            upload_date: thing.datetime(schema::UPLOAD_DATE),
            checksum: thing.string(CHECKSUM).map(str::to_string),
        })
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn validate_file_name(name: &str) -> ClientResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ClientError::Validation("file name is empty".into()));
    }
    if name.contains('/') || name == METADATA_RESOURCE || name.ends_with(".acl") {
        return Err(ClientError::Validation(format!(
            "file name '{name}' is not allowed"
        )));
    }
    Ok(())
}

impl PodClient {
    pub async fn pod_url_for(&self, owner: &PodOwner) -> ClientResult<Url> {
        match owner {
            PodOwner::Session => self.own_pod_url().await,
            PodOwner::Other { username } => self.session().other_pod_url(username),
        }
    }

    pub async fn documents_container(&self, owner: &PodOwner) -> ClientResult<Url> {
        Ok(self.pod_url_for(owner).await?.join(DOCUMENTS_CONTAINER)?)
    }

    pub async fn document_container(
        &self,
        doc_type: DocumentType,
        owner: &PodOwner,
    ) -> ClientResult<Url> {
        Ok(self
            .documents_container(owner)
            .await?
            .join(doc_type.container_slug())?)
    }

    pub async fn fetch_document_record(
        &self,
        doc_type: DocumentType,
        owner: &PodOwner,
    ) -> ClientResult<DocumentRecord> {
        let container = self.document_container(doc_type, owner).await?;
        let metadata_url = container.join(METADATA_RESOURCE)?;
        let dataset = self.get_dataset(&metadata_url).await?;
        let thing = Thing::local(&metadata_url, METADATA_THING);
        let thing = dataset
            .thing(thing.url())
            .ok_or_else(|| ClientError::Missing {
                what: "document",
                url: metadata_url.to_string(),
            })?;
        DocumentRecord::from_thing(doc_type, thing, &container)
    }

    /// URL of the stored `doc_type` document in the owner's pod.
    pub async fn get_documents(&self, doc_type: DocumentType, owner: &PodOwner) -> ClientResult<Url> {
        let record = self.fetch_document_record(doc_type, owner).await?;
        info!(%doc_type, url = %record.url, "document located");
        Ok(record.url)
    }

    pub async fn upload_document(
        &self,
        owner: &PodOwner,
        request: UploadRequest,
    ) -> ClientResult<DocumentRecord> {
        let UploadRequest {
            doc_type,
            file,
            expiration,
            description,
            verify,
        } = request;
        validate_file_name(&file.name)?;

        let container = self.document_container(doc_type, owner).await?;
        self.ensure_container(&container).await?;

        let mut file_url = container.clone();
        file_url
            .path_segments_mut()
            .map_err(|_| ClientError::Validation(format!("cannot upload below {container}")))?
            .pop_if_empty()
            .push(file.name.trim());

        let checksum = sha256_hex(&file.bytes);
        self.put_file(&file_url, file.bytes, file.content_type.as_deref())
            .await?;

        if verify {
            let stored = self.get_file(&file_url).await?;
            let actual = sha256_hex(&stored);
            if actual != checksum {
                return Err(ClientError::ChecksumMismatch {
                    url: file_url.to_string(),
                    expected: checksum,
                    actual,
                });
            }
            info!(url = %file_url, "upload verified");
        }

        let metadata_url = container.join(METADATA_RESOURCE)?;
        let mut dataset = self.get_dataset_or_default(&metadata_url).await?;
        let previous = Thing::local(&metadata_url, METADATA_THING);
        if let Some(previous) = dataset.thing(previous.url()) {
            if let Some(old_url) = previous.get_url(schema::URL) {
                let old_url = container.join(old_url)?;
                if old_url != file_url {
                    if let Err(err) = self.delete_resource(&old_url).await {
                        warn!(url = %old_url, error = %err, "failed to remove replaced document");
                    }
                }
            }
        }

        let record = DocumentRecord {
            doc_type,
            name: file.name.trim().to_string(),
            url: file_url,
            description: description.filter(|d| !d.trim().is_empty()),
            expiration,
            upload_date: Some(Utc::now()),
            checksum: Some(checksum),
        };
        dataset.set_thing(record.to_thing(&metadata_url));
        self.save_dataset(&metadata_url, &dataset).await?;
        info!(%doc_type, url = %record.url, "document uploaded");
        Ok(record)
    }

    /// Removes every resource inside the document's container and returns the
    /// container URL, which must be deleted separately once empty.
    pub async fn delete_document_file(&self, doc_type: DocumentType) -> ClientResult<Url> {
        let container = self.document_container(doc_type, &PodOwner::Session).await?;
        let metadata_url = container.join(METADATA_RESOURCE)?;
        if !self.resource_exists(&metadata_url).await? {
            return Err(ClientError::Missing {
                what: "document",
                url: metadata_url.to_string(),
            });
        }
        for member in self.container_contents(&container).await? {
            self.delete_resource(&member).await?;
        }
        Ok(container)
    }

    pub async fn delete_document_container(&self, container: &Url) -> ClientResult<()> {
        self.delete_resource(container).await
    }

    pub async fn delete_document(&self, doc_type: DocumentType) -> ClientResult<Url> {
        let container = self.delete_document_file(doc_type).await?;
        self.delete_document_container(&container).await?;
        info!(%doc_type, %container, "document deleted");
        Ok(container)
    }
}

#[cfg(test)]
#[path = "tests/documents_tests.rs"]
mod tests;
