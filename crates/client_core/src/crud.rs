use std::sync::Arc;

use serde_json::{json, Value};
use shared::{
    domain::{ContentId, ContentType, EntityKind, ItemId, ModuleId, SubmoduleId},
    error::{ActionStatus, ApiError},
    protocol::{
        ContentSummary, CreateItemRequest, CreateModuleRequest, CreateSubmoduleRequest,
        RenameRequest,
    },
};
use tracing::{error, info, warn};

use crate::{
    api::CourseApi,
    error::{ClientError, Result},
    host::PageHost,
};

/// A node of the course tree addressed by an admin action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Module(ModuleId),
    Submodule(SubmoduleId),
    Item(ItemId),
}

impl EntityRef {
    pub fn kind(self) -> EntityKind {
        match self {
            Self::Module(_) => EntityKind::Module,
            Self::Submodule(_) => EntityKind::Submodule,
            Self::Item(_) => EntityKind::Item,
        }
    }

    pub fn raw_id(self) -> i64 {
        match self {
            Self::Module(id) => id.0,
            Self::Submodule(id) => id.0,
            Self::Item(id) => id.0,
        }
    }

    fn action_path(self, action: &str) -> String {
        format!("/admin/{}/{}/{action}", self.kind().path_segment(), self.raw_id())
    }
}

/// Where a new submodule hangs. Top-level submodules belong to a module, nested
/// ones to another submodule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmoduleParent {
    Module(ModuleId),
    Submodule(SubmoduleId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrudOutcome {
    /// The user declined the confirmation dialog.
    Cancelled,
    /// Client-side validation stopped the request before it was sent.
    Rejected(String),
    /// The server accepted the change and the page was reloaded.
    Applied,
    Failed(String),
}

struct Mutation {
    path: String,
    body: std::result::Result<Value, serde_json::Error>,
    /// Completes "An error occurred while …".
    activity: String,
    success_alert: Option<String>,
}

pub struct CrudController {
    api: Arc<dyn CourseApi>,
    host: Arc<dyn PageHost>,
}

impl CrudController {
    pub fn new(api: Arc<dyn CourseApi>, host: Arc<dyn PageHost>) -> Self {
        Self { api, host }
    }

    pub async fn create_module(&self, title: &str) -> CrudOutcome {
        let Some(title) = self.require_title(EntityKind::Module, title) else {
            return CrudOutcome::Rejected(empty_title_message(EntityKind::Module));
        };
        self.apply(Mutation {
            path: "/admin/module/create".to_string(),
            body: to_body(&CreateModuleRequest { title }),
            activity: "creating the module".to_string(),
            success_alert: None,
        })
        .await
    }

    pub async fn create_submodule(&self, title: &str, parent: SubmoduleParent) -> CrudOutcome {
        let Some(title) = self.require_title(EntityKind::Submodule, title) else {
            return CrudOutcome::Rejected(empty_title_message(EntityKind::Submodule));
        };
        let (module_id, parent_id) = match parent {
            SubmoduleParent::Module(id) => (Some(id), None),
            SubmoduleParent::Submodule(id) => (None, Some(id)),
        };
        self.apply(Mutation {
            path: "/admin/submodule/create".to_string(),
            body: to_body(&CreateSubmoduleRequest {
                title,
                module_id,
                parent_id,
            }),
            activity: "creating the submodule".to_string(),
            success_alert: None,
        })
        .await
    }

    /// Links existing content into a submodule. Both picker selections are required.
    pub async fn create_item(
        &self,
        submodule_id: SubmoduleId,
        content_type: Option<ContentType>,
        content_id: Option<ContentId>,
    ) -> CrudOutcome {
        let (Some(content_type), Some(content_id)) = (content_type, content_id) else {
            let message = "Please select both content type and content.".to_string();
            self.host.alert(&message);
            return CrudOutcome::Rejected(message);
        };
        self.apply(Mutation {
            path: "/admin/item/create".to_string(),
            body: to_body(&CreateItemRequest {
                submodule_id,
                content_type,
                content_id,
            }),
            activity: "adding the content item".to_string(),
            success_alert: None,
        })
        .await
    }

    /// Options for the content picker of the add-item form.
    pub async fn list_content(&self, content_type: ContentType) -> Result<Vec<ContentSummary>> {
        let result = self.api.list_content(content_type).await.and_then(|response| {
            if response.status == ActionStatus::Success {
                Ok(response.items)
            } else {
                Err(ClientError::Rejected(ApiError::new(
                    response
                        .message
                        .unwrap_or_else(|| "Unknown error".to_string()),
                )))
            }
        });

        match &result {
            Ok(items) => info!("crud: listed content type={content_type} count={}", items.len()),
            Err(ClientError::Rejected(err)) => {
                warn!("crud: content listing rejected type={content_type}: {}", err.message);
                self.host
                    .alert(&format!("Error fetching content: {}", err.message));
            }
            Err(err) => {
                error!("crud: content listing failed type={content_type}: {err}");
                self.host.alert("An error occurred while fetching content.");
            }
        }
        result
    }

    /// Renames from free-text input. Blank input never reaches the server.
    pub async fn rename(&self, entity: EntityRef, input: &str) -> CrudOutcome {
        let kind = entity.kind();
        let Some(new_title) = self.require_title(kind, input) else {
            return CrudOutcome::Rejected(empty_title_message(kind));
        };
        self.apply(Mutation {
            path: entity.action_path("rename"),
            body: to_body(&RenameRequest { new_title }),
            activity: format!("renaming the {}", kind.label()),
            success_alert: None,
        })
        .await
    }

    pub async fn duplicate(&self, entity: EntityRef) -> CrudOutcome {
        let kind = entity.kind();
        if kind == EntityKind::Item {
            let message = "Content items cannot be duplicated.".to_string();
            self.host.alert(&message);
            return CrudOutcome::Rejected(message);
        }
        if !self.host.confirm(&format!("Duplicate this {}?", kind.label())) {
            return CrudOutcome::Cancelled;
        }
        self.apply(Mutation {
            path: entity.action_path("duplicate"),
            body: Ok(empty_body()),
            activity: format!("duplicating the {}", kind.label()),
            success_alert: None,
        })
        .await
    }

    pub async fn delete(&self, entity: EntityRef) -> CrudOutcome {
        let kind = entity.kind();
        let prompt = format!(
            "Are you sure you want to delete this {}? This action cannot be undone.",
            kind.label()
        );
        if !self.host.confirm(&prompt) {
            return CrudOutcome::Cancelled;
        }
        self.apply(Mutation {
            path: entity.action_path("delete"),
            body: Ok(empty_body()),
            activity: format!("deleting the {}", kind.label()),
            success_alert: None,
        })
        .await
    }

    /// Removes an item from its submodule; the linked content survives.
    pub async fn unlink_item(&self, item_id: ItemId) -> CrudOutcome {
        if !self.host.confirm(
            "Are you sure you want to unlink this content item? This will not delete the content itself.",
        ) {
            return CrudOutcome::Cancelled;
        }
        self.apply(Mutation {
            path: EntityRef::Item(item_id).action_path("unlink"),
            body: Ok(empty_body()),
            activity: "unlinking the content item".to_string(),
            success_alert: None,
        })
        .await
    }

    pub async fn delete_content(
        &self,
        content_type: ContentType,
        content_id: ContentId,
    ) -> CrudOutcome {
        if !self.host.confirm(
            "Are you sure you want to permanently delete this content? This action cannot be undone.",
        ) {
            return CrudOutcome::Cancelled;
        }
        self.apply(Mutation {
            path: format!("/admin/content/{content_type}/{content_id}/delete"),
            body: Ok(empty_body()),
            activity: "deleting the content".to_string(),
            success_alert: None,
        })
        .await
    }

    /// Flips publication. The intended action comes from what the page currently
    /// shows (`displayed_published`), not from a fresh read of the server.
    pub async fn toggle_publish(&self, entity: EntityRef, displayed_published: bool) -> CrudOutcome {
        let kind = entity.kind();
        let (action, past) = if displayed_published {
            ("unpublish", "unpublished")
        } else {
            ("publish", "published")
        };
        if !self
            .host
            .confirm(&format!("Are you sure you want to {action} this {}?", kind.label()))
        {
            return CrudOutcome::Cancelled;
        }
        self.apply(Mutation {
            path: format!("/api/toggle_publish/{}/{}", kind.path_segment(), entity.raw_id()),
            body: Ok(empty_body()),
            activity: format!("{action}ing the {}", kind.label()),
            success_alert: Some(format!("{} {past} successfully!", kind.title_label())),
        })
        .await
    }

    fn require_title(&self, kind: EntityKind, input: &str) -> Option<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            self.host.alert(&empty_title_message(kind));
            return None;
        }
        Some(trimmed.to_string())
    }

    async fn apply(&self, mutation: Mutation) -> CrudOutcome {
        let result = match mutation.body {
            Ok(ref body) => self
                .api
                .post_action(&mutation.path, body)
                .await
                .and_then(|envelope| envelope.into_result().map_err(ClientError::from)),
            Err(err) => Err(ClientError::Decode(err)),
        };

        match result {
            Ok(message) => {
                info!(
                    "crud: applied path={} message={}",
                    mutation.path,
                    message.as_deref().unwrap_or("-")
                );
                if let Some(alert) = &mutation.success_alert {
                    self.host.alert(alert);
                }
                self.host.reload();
                CrudOutcome::Applied
            }
            Err(ClientError::Rejected(err)) => {
                warn!("crud: rejected path={}: {}", mutation.path, err.message);
                self.host.alert(&format!("Error: {}", err.message));
                CrudOutcome::Failed(err.message)
            }
            Err(err) => {
                error!("crud: request failed path={}: {err}", mutation.path);
                self.host
                    .alert(&format!("An error occurred while {}.", mutation.activity));
                CrudOutcome::Failed(err.to_string())
            }
        }
    }
}

fn empty_title_message(kind: EntityKind) -> String {
    format!("{} title cannot be empty.", kind.title_label())
}

fn empty_body() -> Value {
    json!({})
}

fn to_body<T: serde::Serialize>(body: &T) -> std::result::Result<Value, serde_json::Error> {
    serde_json::to_value(body)
}

#[cfg(test)]
#[path = "tests/crud_tests.rs"]
mod tests;
