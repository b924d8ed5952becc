use std::sync::Arc;

use validator::Validate;

use crate::error::{CoreError, PersistenceError};
use crate::messaging::{decorate_thread, ContractorSummary, Message, NewMessage, ThreadMessage};
use crate::persistence::MessageStore;
use crate::types::EntityId;
use crate::validation::from_validator;

/// Thread reads with contractor aliases, and message sends.
#[derive(Clone)]
pub struct MessageService {
    store: Arc<dyn MessageStore>,
}

impl MessageService {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// The (project, contractor) thread as `viewer` sees it.
    pub async fn thread(
        &self,
        project_id: EntityId,
        contractor_id: EntityId,
        viewer: EntityId,
    ) -> Result<Vec<ThreadMessage>, CoreError> {
        let messages = self
            .store
            .thread(project_id, contractor_id)
            .await
            .map_err(|e| {
                tracing::error!(
                    project_id = %project_id,
                    contractor_id = %contractor_id,
                    error = %e,
                    "Failed to load message thread",
                );
                CoreError::from(PersistenceError::Unavailable(e.to_string()))
            })?;
        Ok(decorate_thread(messages, viewer))
    }

    pub async fn send(&self, message: NewMessage) -> Result<Message, CoreError> {
        let mut message = message;
        message.content = message.content.trim().to_string();
        message
            .validate()
            .map_err(|e| CoreError::InvalidFields(from_validator(&e)))?;
        if message.metadata.is_null() {
            message.metadata = serde_json::json!({});
        } else if !message.metadata.is_object() {
            return Err(CoreError::Validation("metadata must be a JSON object".into()));
        }

        let stored = self.store.insert(&message).await.map_err(|e| {
            tracing::error!(
                project_id = %message.project_id,
                contractor_id = %message.contractor_id,
                error = %e,
                "Failed to store message",
            );
            CoreError::from(PersistenceError::Unavailable(e.to_string()))
        })?;

        tracing::info!(
            message_id = %stored.id,
            project_id = %stored.project_id,
            contractor_id = %stored.contractor_id,
            sender_id = %stored.sender_id,
            attachments = stored.attachments.len(),
            "Message sent",
        );
        Ok(stored)
    }

    pub async fn contractors(&self, project_id: EntityId) -> Result<Vec<ContractorSummary>, CoreError> {
        self.store.contractors(project_id).await.map_err(|e| {
            tracing::error!(project_id = %project_id, error = %e, "Failed to load contractors");
            CoreError::from(PersistenceError::Unavailable(e.to_string()))
        })
    }
}
