//! Client for PASS document pods: session handling, pod resource CRUD,
//! document/ACL/user-list wrappers, the form status store and the
//! driver's-license barcode decoder.

pub mod acl;
pub mod barcode;
pub mod dataset;
pub mod documents;
pub mod error;
pub mod forms;
pub mod pod;
pub mod profile;
pub mod register;
pub mod session;
pub mod status;
pub mod users;

pub use barcode::{BarcodeError, BarcodeReader, LicenseField, RxingPdf417Reader};
pub use dataset::{SolidDataset, Thing};
pub use documents::{DocumentRecord, UploadRequest};
pub use error::{ClientError, ClientResult};
pub use forms::{FormContext, FormError, FormResult, FormStatus};
pub use pod::PodClient;
pub use register::{register_pod, RegistrationCredentials};
pub use session::Session;
pub use status::{StatusAction, StatusNotifier, StatusState};

#[cfg(test)]
#[path = "tests/mock_pod.rs"]
mod mock_pod;
