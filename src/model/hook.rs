//! Notification hooks: one callback URL per event type.

use serde::{Deserialize, Serialize};

use crate::api::{Action, Mango};
use crate::error::{Error, Result};
use crate::model::common::{entity_payload, params, Ident, SaveMode};
use crate::model::event::EventType;

/// The server drops these on create and refuses them on update.
const HOOK_STRIP: &[&str] = &["Validity"];

/// A callback registration. At most one hook exists per event type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Hook {
    #[serde(flatten)]
    pub ident: Ident,
    pub url: String,
    pub event_type: EventType,
    /// ENABLED or DISABLED, decided server-side.
    pub status: String,
    /// VALID or INVALID, judged by the server from delivery outcomes.
    pub validity: String,
    #[serde(skip)]
    pub(crate) service: Option<Mango>,
}

impl Hook {
    fn service(&self) -> Result<&Mango> {
        self.service.as_ref().ok_or(Error::Unbound)
    }

    /// Creates the hook, or updates its URL when it already has an id.
    pub async fn save(&mut self) -> Result<()> {
        let (mode, action) = if self.ident.is_transient() {
            (SaveMode::Create, Action::CreateHook)
        } else {
            (SaveMode::Update, Action::EditHook)
        };
        let payload = entity_payload(self, mode, HOOK_STRIP)?;
        let service = self.service()?.clone();
        let fresh: Hook = service.dispatch_into(action, Some(payload)).await?;
        *self = fresh;
        self.service = Some(service);
        Ok(())
    }
}

impl Mango {
    /// Returns a new hook for `event_type` pointing at `url`, unsaved.
    pub fn new_hook(&self, event_type: EventType, url: &str) -> Hook {
        Hook {
            url: url.into(),
            event_type,
            service: Some(self.clone()),
            ..Default::default()
        }
    }

    /// Fetches a hook by id.
    pub async fn hook(&self, id: &str) -> Result<Hook> {
        let mut hook: Hook = self
            .dispatch_into(Action::FetchHook, Some(params(&[("Id", id)])))
            .await?;
        hook.service = Some(self.clone());
        Ok(hook)
    }

    /// Lists every registered hook.
    pub async fn hooks(&self) -> Result<Vec<Hook>> {
        let mut hooks: Vec<Hook> = self.dispatch_into(Action::FetchAllHooks, None).await?;
        for hook in &mut hooks {
            hook.service = Some(self.clone());
        }
        Ok(hooks)
    }

    /// Finds the hook registered for one event type, if any.
    pub async fn hook_by_event_type(&self, event_type: EventType) -> Result<Option<Hook>> {
        Ok(self.hooks().await?.into_iter().find(|hook| hook.event_type == event_type))
    }
}

// ============================================================================
// Tests
// ============================================================================
