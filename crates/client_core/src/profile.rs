use shared::{
    domain::ProfileInfo,
    vocab::{FOAF_NAME, VCARD_FN, VCARD_ORGANIZATION_NAME},
};
use url::Url;

use crate::{error::ClientResult, PodClient};

impl PodClient {
    /// Name and organization from the session owner's WebID profile.
    pub async fn fetch_profile_info(&self) -> ClientResult<ProfileInfo> {
        let web_id = self.session().web_id();
        let mut profile_url: Url = web_id.clone();
        profile_url.set_fragment(None);
        let profile = self.get_dataset(&profile_url).await?;
        let Some(me) = profile.thing(web_id.as_str()) else {
            return Ok(ProfileInfo {
                profile_name: None,
                organization: None,
            });
        };
        Ok(ProfileInfo {
            profile_name: me
                .string(VCARD_FN)
                .or_else(|| me.string(FOAF_NAME))
                .map(str::to_string),
            organization: me.string(VCARD_ORGANIZATION_NAME).map(str::to_string),
        })
    }
}
