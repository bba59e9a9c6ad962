use chrono::Utc;
use futures::future::join_all;
use shared::{
    domain::{User, UserSubmission},
    vocab::schema,
};
use tracing::{debug, info};
use url::Url;

use crate::{
    dataset::Thing,
    error::{ClientError, ClientResult},
    session::{pod_url_from_web_id, username_from_web_id},
    PodClient,
};

pub const USER_LIST_RESOURCE: &str = "PASS/Users/userlist.ttl";
pub const ACTIVITY_RESOURCE: &str = "PASS/Activity/active.ttl";
const ACTIVITY_THING: &str = "active";

/// Builds the Thing stored for `user` in the user list at `list_url`.
pub fn make_user_into_thing(list_url: &Url, user: &User) -> Thing {
    Thing::local(list_url, &user.username)
        .add_string(schema::PERSON, user.person())
        .add_string(schema::GIVEN_NAME, &user.given_name)
        .add_string(schema::FAMILY_NAME, &user.family_name)
        .add_string(schema::ALTERNATE_NAME, &user.username)
        .add_url(schema::IDENTIFIER, &user.web_id)
        .add_url(schema::URL, &user.pod_url)
}

pub fn parse_user_from_thing(thing: &Thing) -> Option<User> {
    let web_id = thing.get_url(schema::IDENTIFIER)?;
    let text = |predicate: &str| thing.string(predicate).unwrap_or_default().to_string();
    Some(User {
        given_name: text(schema::GIVEN_NAME),
        family_name: text(schema::FAMILY_NAME),
        username: text(schema::ALTERNATE_NAME),
        web_id: web_id.to_string(),
        pod_url: thing
            .get_url(schema::URL)
            .unwrap_or_else(|| pod_url_from_web_id(web_id))
            .to_string(),
        date_modified: None,
    })
}

impl PodClient {
    pub async fn user_list_url(&self) -> ClientResult<Url> {
        Ok(self.own_pod_url().await?.join(USER_LIST_RESOURCE)?)
    }

    /// Resolves a form submission into a user, discovering the pod from the WebID.
    pub async fn create_user(&self, submission: UserSubmission) -> ClientResult<User> {
        let UserSubmission {
            given_name,
            family_name,
            username,
            web_id,
        } = submission;
        let web_id = match (web_id.trim(), username.trim()) {
            ("", "") => {
                return Err(ClientError::Validation("No WebId provided".into()));
            }
            ("", username) => self.session().other_web_id(username)?,
            (web_id, _) => Url::parse(web_id)?,
        };
        let username = match username.trim() {
            "" => username_from_web_id(web_id.as_str()).unwrap_or_default(),
            username => username.to_string(),
        };
        if username.is_empty() {
            return Err(ClientError::Validation(format!(
                "cannot derive a username from {web_id}"
            )));
        }
        let pod_url = self.discover_pod_url(&web_id).await?;
        Ok(User {
            given_name: given_name.trim().to_string(),
            family_name: family_name.trim().to_string(),
            username,
            web_id: web_id.to_string(),
            pod_url: pod_url.to_string(),
            date_modified: None,
        })
    }

    pub async fn load_user_list(&self) -> ClientResult<Vec<User>> {
        let list_url = self.user_list_url().await?;
        let dataset = self.get_dataset_or_default(&list_url).await?;
        Ok(dataset.things().iter().filter_map(parse_user_from_thing).collect())
    }

    pub async fn add_user(&self, user: &User) -> ClientResult<Vec<User>> {
        let list_url = self.user_list_url().await?;
        let mut dataset = self.get_dataset_or_default(&list_url).await?;
        dataset.set_thing(make_user_into_thing(&list_url, user));
        self.save_dataset(&list_url, &dataset).await?;
        info!(username = %user.username, web_id = %user.web_id, "user added");
        Ok(dataset.things().iter().filter_map(parse_user_from_thing).collect())
    }

    /// Removes `user` from the list and returns the users that remain.
    pub async fn delete_user(&self, user: &User) -> ClientResult<Vec<User>> {
        let list_url = self.user_list_url().await?;
        let mut dataset = self.get_dataset(&list_url).await?;
        let thing = Thing::local(&list_url, &user.username);
        if !dataset.remove_thing(thing.url()) {
            return Err(ClientError::Missing {
                what: "user",
                url: thing.url().to_string(),
            });
        }
        self.save_dataset(&list_url, &dataset).await?;
        info!(username = %user.username, "user deleted");
        Ok(dataset.things().iter().filter_map(parse_user_from_thing).collect())
    }

    /// Stamps the session owner's activity record with the current time.
    pub async fn record_activity(&self) -> ClientResult<()> {
        let url = self.own_pod_url().await?.join(ACTIVITY_RESOURCE)?;
        let mut dataset = self.get_dataset_or_default(&url).await?;
        dataset.set_thing(
            Thing::local(&url, ACTIVITY_THING).add_datetime(schema::DATE_MODIFIED, Utc::now()),
        );
        self.save_dataset(&url, &dataset).await
    }

    /// Fills in each user's last-active time; users without a readable
    /// activity record keep `date_modified = None`.
    pub async fn user_list_activity(&self, users: Vec<User>) -> Vec<User> {
        join_all(users.into_iter().map(|mut user| async move {
            user.date_modified = self.last_active(&user.pod_url).await;
            user
        }))
        .await
    }

    async fn last_active(&self, pod_url: &str) -> Option<chrono::DateTime<Utc>> {
        let url = Url::parse(pod_url).ok()?.join(ACTIVITY_RESOURCE).ok()?;
        let dataset = match self.get_dataset(&url).await {
            Ok(dataset) => dataset,
            Err(err) => {
                debug!(%url, error = %err, "no activity record");
                return None;
            }
        };
        let thing = Thing::local(&url, ACTIVITY_THING);
        dataset.thing(thing.url())?.datetime(schema::DATE_MODIFIED)
    }
}

#[cfg(test)]
#[path = "tests/users_tests.rs"]
mod tests;
