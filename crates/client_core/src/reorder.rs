use std::{collections::HashMap, fmt, sync::Arc};

use shared::{
    domain::{ModuleId, SubmoduleId},
    protocol::ReorderRequest,
};
use tracing::{error, info, warn};

use crate::{api::CourseApi, error::ClientError, host::PageHost};

/// Which draggable list an order belongs to. Nested lists always name their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReorderScope {
    Modules,
    SubmodulesOfModule(ModuleId),
    SubmodulesOfParent(SubmoduleId),
    ItemsOfSubmodule(SubmoduleId),
}

impl ReorderScope {
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Modules => "/admin/modules/reorder",
            Self::SubmodulesOfModule(_) | Self::SubmodulesOfParent(_) => {
                "/admin/submodules/reorder"
            }
            Self::ItemsOfSubmodule(_) => "/admin/items/reorder",
        }
    }

    pub fn request(self, new_order: Vec<String>) -> ReorderRequest {
        let (module_id, parent_id) = match self {
            Self::Modules => (None, None),
            Self::SubmodulesOfModule(module_id) => (Some(module_id), None),
            Self::SubmodulesOfParent(parent_id) | Self::ItemsOfSubmodule(parent_id) => {
                (None, Some(parent_id))
            }
        };
        ReorderRequest {
            new_order,
            module_id,
            parent_id,
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Self::Modules => "module",
            Self::SubmodulesOfModule(_) | Self::SubmodulesOfParent(_) => "submodule",
            Self::ItemsOfSubmodule(_) => "content item",
        }
    }

    fn title_noun(self) -> &'static str {
        match self {
            Self::Modules => "Module",
            Self::SubmodulesOfModule(_) | Self::SubmodulesOfParent(_) => "Submodule",
            Self::ItemsOfSubmodule(_) => "Content item",
        }
    }
}

impl fmt::Display for ReorderScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modules => f.write_str("modules"),
            Self::SubmodulesOfModule(id) => write!(f, "module:{id}/submodules"),
            Self::SubmodulesOfParent(id) => write!(f, "submodule:{id}/submodules"),
            Self::ItemsOfSubmodule(id) => write!(f, "submodule:{id}/items"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// A changed order reveals a save action; nothing is sent until [`ReorderList::save`].
    ExplicitSave,
    /// Every changing drag is posted as soon as it ends.
    Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Unchanged,
    SaveRequired,
    Synced,
    /// The server refused the order (or could not be reached) and the page was reloaded.
    Reverted,
}

/// One draggable container: the baseline order it was rendered with and the order
/// the last drag left on screen.
pub struct ReorderList {
    scope: ReorderScope,
    mode: SyncMode,
    baseline: Vec<String>,
    current: Vec<String>,
    save_visible: bool,
    api: Arc<dyn CourseApi>,
    host: Arc<dyn PageHost>,
}

impl ReorderList {
    pub fn capture(
        scope: ReorderScope,
        mode: SyncMode,
        ids: Vec<String>,
        api: Arc<dyn CourseApi>,
        host: Arc<dyn PageHost>,
    ) -> Self {
        Self {
            scope,
            mode,
            current: ids.clone(),
            baseline: ids,
            save_visible: false,
            api,
            host,
        }
    }

    pub fn scope(&self) -> ReorderScope {
        self.scope
    }

    pub fn baseline(&self) -> &[String] {
        &self.baseline
    }

    pub fn current(&self) -> &[String] {
        &self.current
    }

    pub fn save_visible(&self) -> bool {
        self.save_visible
    }

    pub fn is_dirty(&self) -> bool {
        self.current != self.baseline
    }

    /// Drag-end callback from the drag-and-drop collaborator with the container's
    /// child ids in their new on-screen order.
    pub async fn on_drag_end(&mut self, current: Vec<String>) -> DragOutcome {
        self.current = current;
        if !self.is_dirty() {
            self.save_visible = false;
            return DragOutcome::Unchanged;
        }

        match self.mode {
            SyncMode::ExplicitSave => {
                self.save_visible = true;
                DragOutcome::SaveRequired
            }
            SyncMode::Immediate => self.sync().await,
        }
    }

    /// The explicit save action. A clean list sends nothing.
    pub async fn save(&mut self) -> DragOutcome {
        if !self.is_dirty() {
            self.save_visible = false;
            return DragOutcome::Unchanged;
        }
        self.sync().await
    }

    async fn sync(&mut self) -> DragOutcome {
        let scope = self.scope;
        let request = scope.request(self.current.clone());
        let result = self
            .api
            .reorder(scope.endpoint(), &request)
            .await
            .and_then(|envelope| envelope.into_result().map_err(ClientError::from));

        match result {
            Ok(_) => {
                info!(
                    "reorder: saved scope={scope} count={}",
                    self.current.len()
                );
                self.baseline = self.current.clone();
                self.save_visible = false;
                if self.mode == SyncMode::ExplicitSave {
                    self.host.alert(&format!(
                        "{} order updated successfully!",
                        scope.title_noun()
                    ));
                    self.host.reload();
                }
                DragOutcome::Synced
            }
            Err(ClientError::Rejected(err)) => {
                warn!("reorder: rejected scope={scope}: {}", err.message);
                let alert = match self.mode {
                    SyncMode::ExplicitSave => {
                        format!("Error updating {} order: {}", scope.noun(), err.message)
                    }
                    SyncMode::Immediate => format!("Error: {}", err.message),
                };
                self.host.alert(&alert);
                self.revert();
                DragOutcome::Reverted
            }
            Err(err) => {
                error!("reorder: request failed scope={scope}: {err}");
                let alert = match self.mode {
                    SyncMode::ExplicitSave => "An error occurred while saving the order.".to_string(),
                    SyncMode::Immediate => {
                        format!("An error occurred while reordering {}s.", scope.noun())
                    }
                };
                self.host.alert(&alert);
                self.revert();
                DragOutcome::Reverted
            }
        }
    }

    fn revert(&mut self) {
        self.current = self.baseline.clone();
        self.save_visible = false;
        self.host.reload();
    }
}

/// All draggable lists on a dashboard page, each with its own baseline.
pub struct ReorderBoard {
    api: Arc<dyn CourseApi>,
    host: Arc<dyn PageHost>,
    lists: HashMap<ReorderScope, ReorderList>,
}

impl ReorderBoard {
    pub fn new(api: Arc<dyn CourseApi>, host: Arc<dyn PageHost>) -> Self {
        Self {
            api,
            host,
            lists: HashMap::new(),
        }
    }

    /// Registers (or re-captures) the list for `scope`.
    pub fn capture(&mut self, scope: ReorderScope, mode: SyncMode, ids: Vec<String>) {
        let list = ReorderList::capture(
            scope,
            mode,
            ids,
            Arc::clone(&self.api),
            Arc::clone(&self.host),
        );
        self.lists.insert(scope, list);
    }

    pub fn list(&self, scope: ReorderScope) -> Option<&ReorderList> {
        self.lists.get(&scope)
    }

    pub async fn on_drag_end(
        &mut self,
        scope: ReorderScope,
        current: Vec<String>,
    ) -> Option<DragOutcome> {
        let list = self.lists.get_mut(&scope)?;
        Some(list.on_drag_end(current).await)
    }

    pub async fn save(&mut self, scope: ReorderScope) -> Option<DragOutcome> {
        let list = self.lists.get_mut(&scope)?;
        Some(list.save().await)
    }
}

#[cfg(test)]
#[path = "tests/reorder_tests.rs"]
mod tests;
