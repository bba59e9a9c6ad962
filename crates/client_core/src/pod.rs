use reqwest::{header, Client, Method, RequestBuilder, Response};
use shared::vocab::{LDP_BASIC_CONTAINER, LDP_CONTAINS, PIM_STORAGE};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    dataset::{SolidDataset, JSON_LD},
    error::{ClientError, ClientResult},
    session::{pod_url_from_web_id, Session},
};

const TURTLE: &str = "text/turtle";
const OCTET_STREAM: &str = "application/octet-stream";

/// HTTP client for one session's view of Solid pods.
pub struct PodClient {
    http: Client,
    session: Session,
}

impl PodClient {
    pub fn new(session: Session) -> Self {
        Self::with_http(Client::new(), session)
    }

    pub fn with_http(http: Client, session: Session) -> Self {
        Self { http, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        debug!(method = method.as_str(), %url, "pod request");
        let builder = self.http.request(method, url.clone());
        match self.session.access_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, method: Method, url: &Url, builder: RequestBuilder) -> ClientResult<Response> {
        let res = builder.send().await?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        Err(ClientError::Status {
            method: method.as_str().to_string(),
            url: url.to_string(),
            status: status.as_u16(),
        })
    }

    pub async fn get_dataset(&self, url: &Url) -> ClientResult<SolidDataset> {
        let builder = self
            .request(Method::GET, url)
            .header(header::ACCEPT, JSON_LD);
        let res = self.send(Method::GET, url, builder).await?;
        let body: serde_json::Value = res.json().await?;
        SolidDataset::from_json_ld(&body)
    }

    /// Like [`Self::get_dataset`], but a missing resource is an empty dataset.
    pub async fn get_dataset_or_default(&self, url: &Url) -> ClientResult<SolidDataset> {
        match self.get_dataset(url).await {
            Err(err) if err.is_not_found() => Ok(SolidDataset::new()),
            other => other,
        }
    }

    pub async fn save_dataset(&self, url: &Url, dataset: &SolidDataset) -> ClientResult<()> {
        let body = serde_json::to_vec(&dataset.to_json_ld())?;
        let builder = self
            .request(Method::PUT, url)
            .header(header::CONTENT_TYPE, JSON_LD)
            .body(body);
        self.send(Method::PUT, url, builder).await?;
        info!(%url, things = dataset.things().len(), "saved dataset");
        Ok(())
    }

    pub async fn get_file(&self, url: &Url) -> ClientResult<Vec<u8>> {
        let builder = self.request(Method::GET, url);
        let res = self.send(Method::GET, url, builder).await?;
        Ok(res.bytes().await?.to_vec())
    }

    pub async fn put_file(
        &self,
        url: &Url,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> ClientResult<()> {
        let size = bytes.len();
        let builder = self
            .request(Method::PUT, url)
            .header(header::CONTENT_TYPE, content_type.unwrap_or(OCTET_STREAM))
            .body(bytes);
        self.send(Method::PUT, url, builder).await?;
        info!(%url, size, "uploaded file");
        Ok(())
    }

    pub async fn delete_resource(&self, url: &Url) -> ClientResult<()> {
        let builder = self.request(Method::DELETE, url);
        self.send(Method::DELETE, url, builder).await?;
        info!(%url, "deleted resource");
        Ok(())
    }

    pub async fn resource_exists(&self, url: &Url) -> ClientResult<bool> {
        let builder = self.request(Method::HEAD, url);
        match self.send(Method::HEAD, url, builder).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Creates the container at `url` unless it already exists.
    pub async fn ensure_container(&self, url: &Url) -> ClientResult<()> {
        if !url.path().ends_with('/') {
            return Err(ClientError::Validation(format!(
                "container url must end with '/': {url}"
            )));
        }
        if self.resource_exists(url).await? {
            return Ok(());
        }
        let builder = self
            .request(Method::PUT, url)
            .header(header::CONTENT_TYPE, TURTLE)
            .header(
                header::LINK,
                format!("<{LDP_BASIC_CONTAINER}>; rel=\"type\""),
            );
        self.send(Method::PUT, url, builder).await?;
        info!(%url, "created container");
        Ok(())
    }

    pub async fn container_contents(&self, url: &Url) -> ClientResult<Vec<Url>> {
        let dataset = self.get_dataset(url).await?;
        let Some(container) = dataset.thing(url.as_str()) else {
            return Ok(Vec::new());
        };
        container
            .urls(LDP_CONTAINS)
            .map(|member| Ok(url.join(member)?))
            .collect()
    }

    /// ACL resource advertised by the `Link: <...>; rel="acl"` header of `url`.
    pub async fn acl_url(&self, url: &Url) -> ClientResult<Url> {
        let builder = self.request(Method::HEAD, url);
        let res = self.send(Method::HEAD, url, builder).await?;
        let target = res
            .headers()
            .get_all(header::LINK)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|value| link_target(value, "acl"))
            .ok_or_else(|| ClientError::Missing {
                what: "acl link",
                url: url.to_string(),
            })?;
        Ok(url.join(&target)?)
    }

    /// Storage roots listed in a WebID profile.
    pub async fn pod_urls(&self, web_id: &Url) -> ClientResult<Vec<Url>> {
        let mut profile_url = web_id.clone();
        profile_url.set_fragment(None);
        let profile = self.get_dataset(&profile_url).await?;
        let Some(me) = profile.thing(web_id.as_str()) else {
            return Ok(Vec::new());
        };
        me.urls(PIM_STORAGE)
            .map(|storage| Ok(Url::parse(storage)?))
            .collect()
    }

    /// Pod root for `web_id`, falling back to the part of the WebID before `profile`.
    pub async fn discover_pod_url(&self, web_id: &Url) -> ClientResult<Url> {
        match self.pod_urls(web_id).await {
            Ok(urls) => {
                if let Some(first) = urls.into_iter().next() {
                    return Ok(first);
                }
            }
            Err(err) => {
                warn!(%web_id, error = %err, "pod discovery failed, deriving pod url from web id");
            }
        }
        Ok(Url::parse(pod_url_from_web_id(web_id.as_str()))?)
    }

    pub async fn own_pod_url(&self) -> ClientResult<Url> {
        self.discover_pod_url(self.session.web_id()).await
    }
}

/// Extracts the target of the first link with relation `rel` from a `Link` header.
pub(crate) fn link_target(header: &str, rel: &str) -> Option<String> {
    header.split(',').find_map(|link| {
        let mut parts = link.split(';');
        let target = parts.next()?.trim();
        let target = target.strip_prefix('<')?.strip_suffix('>')?;
        parts
            .filter_map(|param| param.trim().strip_prefix("rel="))
            .flat_map(|rels| rels.trim_matches('"').split_whitespace())
            .any(|value| value == rel)
            .then(|| target.to_string())
    })
}

#[cfg(test)]
#[path = "tests/pod_tests.rs"]
mod tests;
