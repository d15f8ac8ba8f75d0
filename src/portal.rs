use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use teloxide::types::{ChatId, UserId};
use teloxide::utils::html;
use tokio::sync::Mutex;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PortalId(pub String);

impl fmt::Display for PortalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the portal service needs to link a channel to a group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPortal {
    pub owner_id: UserId,
    pub public_channel_id: ChatId,
    pub public_channel_username: Option<String>,
    pub public_channel_title: String,
    pub private_group_id: ChatId,
    pub private_group_title: String,
    /// `None` means the service's default welcome message.
    pub welcome_message: Option<String>,
}

/// Creates and describes portals. The wizard only ever hands it a finished
/// draft; everything after that (invite links, verification) is its business.
#[async_trait]
pub trait PortalService: Send + Sync {
    /// Returns `Ok(None)` when the service declined to create the portal.
    async fn create_portal(&self, portal: NewPortal) -> Result<Option<PortalId>>;

    fn format_setup_message(
        &self,
        portal_id: &PortalId,
        channel_username: Option<&str>,
        group_title: &str,
    ) -> String;
}

pub const DEFAULT_WELCOME_MESSAGE: &str =
    "Welcome! Press the button below to verify you're human and join the group.";

#[derive(Clone, Debug)]
pub struct Portal {
    pub id: PortalId,
    pub details: NewPortal,
}

impl Portal {
    pub fn welcome_message(&self) -> &str {
        self.details
            .welcome_message
            .as_deref()
            .unwrap_or(DEFAULT_WELCOME_MESSAGE)
    }
}

/// Keeps portals for the lifetime of the process.
#[derive(Default)]
pub struct InMemoryPortalService {
    portals: Mutex<Vec<Portal>>,
}

impl InMemoryPortalService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PortalService for InMemoryPortalService {
    async fn create_portal(&self, portal: NewPortal) -> Result<Option<PortalId>> {
        let mut portals = self.portals.lock().await;

        // One portal per channel/group pair
        if let Some(existing) = portals.iter().find(|existing| {
            existing.details.public_channel_id == portal.public_channel_id
                && existing.details.private_group_id == portal.private_group_id
        }) {
            log::debug!(
                "Portal for {:?} -> {:?} already exists as {}",
                portal.public_channel_id,
                portal.private_group_id,
                existing.id
            );
            return Ok(None);
        }

        let id = PortalId(format!("portal_{}", portals.len() + 1));

        let portal = Portal {
            id: id.clone(),
            details: portal,
        };

        log::info!(
            "Created portal {} for owner {:?}: {} ({:?}) -> {} ({:?})",
            id,
            portal.details.owner_id,
            portal.details.public_channel_title,
            portal.details.public_channel_id,
            portal.details.private_group_title,
            portal.details.private_group_id
        );
        log::debug!("Portal {} welcome message: {:?}", id, portal.welcome_message());

        portals.push(portal);

        Ok(Some(id))
    }

    fn format_setup_message(
        &self,
        portal_id: &PortalId,
        channel_username: Option<&str>,
        group_title: &str,
    ) -> String {
        let channel = match channel_username {
            Some(username) => format!("@{}", html::escape(username)),
            None => "your channel".to_string(),
        };

        format!(
            "✅ <b>Portal created!</b>\n\n\
            Portal ID: <code>{}</code>\n\
            Channel: {}\n\
            Group: <b>{}</b>\n\n\
            New members from the channel will be asked to verify before they get an invite to the group.",
            html::escape(&portal_id.0),
            channel,
            html::escape(group_title)
        )
    }
}
