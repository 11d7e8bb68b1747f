//! Label management for Gmail
//!
//! Lookup-or-create of user labels by name.

use tracing::{debug, info};

use crate::error::Result;
use crate::gmail::client::check_response;
use crate::gmail::types::{CreateLabelRequest, Label, LabelList};

/// Visibility applied to labels created by the resolver
const LABEL_LIST_VISIBILITY: &str = "labelShow";
const MESSAGE_LIST_VISIBILITY: &str = "show";

/// Label manager for Gmail operations
pub struct LabelManager<'a> {
    client: &'a reqwest::Client,
    api_base: &'a str,
    access_token: &'a str,
}

impl<'a> LabelManager<'a> {
    /// Create a new label manager
    pub fn new(client: &'a reqwest::Client, api_base: &'a str, access_token: &'a str) -> Self {
        Self {
            client,
            api_base,
            access_token,
        }
    }

    /// Base URL for labels API
    fn base_url(&self) -> String {
        format!("{}/users/{}/labels", self.api_base, crate::config::gmail::USER_ID)
    }

    /// List all Gmail labels
    pub async fn list(&self) -> Result<Vec<Label>> {
        let response = self
            .client
            .get(self.base_url())
            .bearer_auth(self.access_token)
            .send()
            .await?;

        let label_list: LabelList = check_response(response, "list labels").await?.json().await?;
        Ok(label_list.labels)
    }

    /// Create a new Gmail label with default visibility
    pub async fn create(&self, name: &str) -> Result<Label> {
        let request = CreateLabelRequest {
            name: name.to_string(),
            label_list_visibility: LABEL_LIST_VISIBILITY.to_string(),
            message_list_visibility: MESSAGE_LIST_VISIBILITY.to_string(),
        };

        let response = self
            .client
            .post(self.base_url())
            .bearer_auth(self.access_token)
            .json(&request)
            .send()
            .await?;

        let label: Label = check_response(response, "create label").await?.json().await?;
        info!(label_id = %label.id, label_name = name, "created label");
        Ok(label)
    }

    /// Find a label by exact, case-sensitive name. First match wins.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Label>> {
        Ok(self.list().await?.into_iter().find(|l| l.name == name))
    }

    /// Return the id of the label called `name`, creating it if absent.
    ///
    /// Lookup and creation are separate calls, so two concurrent callers
    /// asking for the same new name can both create it.
    pub async fn ensure(&self, name: &str) -> Result<String> {
        if let Some(label) = self.find_by_name(name).await? {
            debug!(label_id = %label.id, label_name = name, "label already exists");
            return Ok(label.id);
        }

        Ok(self.create(name).await?.id)
    }
}
