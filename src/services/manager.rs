//! One admin table: list state, cached pages, related-record lookups, edit
//! form, staged confirmations and the notices they produce.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::api::{ResourceReader, ResourceWriter};
use crate::domain::entity::Entity;
use crate::domain::types::{EntityId, ResourceName};
use crate::dto::list::{Page, unwrap_record};
use crate::forms::fields::{FieldValue, FormSchema, FormValues};
use crate::forms::payload::PayloadBuilder;
use crate::models::config::AdminConfig;
use crate::services::list::{ListCache, ListState};
use crate::services::lookup::{
    DEFAULT_LOOKUP_STALE, LookupCache, LookupOption, LookupQuery, to_options,
};
use crate::services::mutations::{PendingAction, Target};
use crate::services::{Notice, ServiceError, ServiceResult};

/// Create/edit form of a table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormEditor {
    open: bool,
    editing: Option<EntityId>,
    values: FormValues,
    focus_requested: bool,
}

impl FormEditor {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn editing(&self) -> Option<EntityId> {
        self.editing
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn set_value(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn open_create(&mut self) {
        self.open = true;
        self.editing = None;
        self.values.clear();
    }

    /// Opens the form on an existing record, one field per column.
    pub fn open_edit(&mut self, entity: &Entity, schema: &FormSchema) {
        self.open = true;
        self.editing = Some(entity.id);
        self.values = entity
            .fields
            .iter()
            .map(|(field, value)| (field.clone(), schema.seed_value(field, value.clone())))
            .collect();
    }

    pub fn close(&mut self) {
        self.open = false;
        self.editing = None;
        self.values.clear();
    }

    /// Whether the first input should grab focus. Reading clears the request.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    fn reset_after_save(&mut self, keep_open: bool) {
        self.editing = None;
        self.values.clear();
        if keep_open {
            self.focus_requested = true;
        } else {
            self.open = false;
        }
    }
}

/// State and workflows behind one generic CRUD table.
#[derive(Debug)]
pub struct DataManager {
    list: ListState,
    cache: ListCache,
    page: Page,
    lookups: Vec<LookupQuery>,
    lookup_cache: LookupCache,
    schema: FormSchema,
    injected: FormValues,
    editor: FormEditor,
    pending: Option<PendingAction>,
    notices: Vec<Notice>,
}

impl DataManager {
    pub fn new(list: ListState, stale_after: Duration) -> Self {
        let page = Page::empty(list.per_page());
        Self {
            list,
            cache: ListCache::new(stale_after),
            page,
            lookups: Vec::new(),
            lookup_cache: LookupCache::new(DEFAULT_LOOKUP_STALE),
            schema: FormSchema::default(),
            injected: FormValues::new(),
            editor: FormEditor::default(),
            pending: None,
            notices: Vec::new(),
        }
    }

    pub fn from_config(resource: ResourceName, config: &AdminConfig) -> Self {
        let mut manager = Self::new(
            ListState::new(resource, config.per_page),
            config.list_stale_after(),
        );
        manager.lookup_cache = LookupCache::new(config.lookup_stale_after());
        manager
    }

    pub fn with_schema(mut self, schema: FormSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Values merged into every saved form, overriding what the user typed.
    pub fn with_injected(mut self, injected: FormValues) -> Self {
        self.injected = injected;
        self
    }

    /// Related-record lists the edit form selects from.
    pub fn with_lookups(mut self, lookups: Vec<LookupQuery>) -> Self {
        self.lookups = lookups;
        self
    }

    pub fn resource(&self) -> &ResourceName {
        self.list.resource()
    }

    pub fn list(&self) -> &ListState {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListState {
        &mut self.list
    }

    /// Page shown by the last [`DataManager::refresh`].
    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn editor(&self) -> &FormEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut FormEditor {
        &mut self.editor
    }

    /// Loads the page for the current list state, from cache when fresh.
    pub fn refresh<R>(&mut self, api: &R) -> ServiceResult<&Page>
    where
        R: ResourceReader + ?Sized,
    {
        let key = self.list.key();
        self.page = self.cache.load(api, &key)?;
        Ok(&self.page)
    }

    /// Options of every lookup, by input name. Failed lookups are empty.
    pub fn lookup_options<R>(&mut self, api: &R) -> BTreeMap<String, Vec<LookupOption>>
    where
        R: ResourceReader + ?Sized,
    {
        self.lookups
            .iter()
            .map(|query| {
                let entities = self.lookup_cache.load(api, query);
                (query.key.clone(), to_options(&entities))
            })
            .collect()
    }

    fn invalidate(&mut self, resource: &ResourceName) {
        self.cache.invalidate(resource);
        self.lookup_cache.invalidate(resource);
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn toggle_deleted(&mut self) {
        self.list.toggle_deleted();
        self.notices.push(Notice::success("View toggled successfully!"));
    }

    pub fn toggle_select(&mut self, id: EntityId) {
        self.list.selection_mut().toggle(id);
    }

    pub fn toggle_select_all(&mut self) {
        let ids = self.page.ids();
        self.list.selection_mut().toggle_all(&ids);
    }

    /// Reads one record with `GET /back/<resource>/:id`.
    pub fn fetch_record<R>(&self, api: &R, id: EntityId) -> ServiceResult<Entity>
    where
        R: ResourceReader + ?Sized,
    {
        let body = unwrap_record(api.get_by_id(self.list.resource(), id)?);
        Entity::from_value(body).ok_or(ServiceError::NotFound)
    }

    pub fn start_edit(&mut self, id: EntityId) -> bool {
        match self.page.data.iter().find(|entity| entity.id == id) {
            Some(entity) => {
                self.editor.open_edit(entity, &self.schema);
                true
            }
            None => false,
        }
    }

    fn target(&self, id: EntityId) -> Target {
        let title = self
            .page
            .data
            .iter()
            .find(|entity| entity.id == id)
            .map(Entity::display_title)
            .unwrap_or_else(|| format!("Item {id}"));
        Target::new(id, title)
    }

    fn selected_targets(&self) -> Vec<Target> {
        self.list
            .selection()
            .ids()
            .into_iter()
            .map(|id| self.target(id))
            .collect()
    }

    pub fn pending_confirmation(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn request_delete(&mut self, id: EntityId) {
        self.pending = Some(PendingAction::Delete(self.target(id)));
    }

    pub fn request_restore(&mut self, id: EntityId) {
        self.pending = Some(PendingAction::Restore(self.target(id)));
    }

    pub fn request_force_delete(&mut self, id: EntityId) {
        self.pending = Some(PendingAction::ForceDelete(self.target(id)));
    }

    /// Stages flipping `active`; the current value is read from the row on
    /// the page.
    pub fn request_toggle_active(&mut self, id: EntityId) {
        let current = self
            .page
            .data
            .iter()
            .find(|entity| entity.id == id)
            .is_some_and(|entity| entity.flag("active"));
        self.pending = Some(PendingAction::ToggleActive {
            target: self.target(id),
            current,
        });
    }

    /// Same as [`DataManager::request_toggle_active`] for a record that is
    /// not necessarily on the current page.
    pub fn request_toggle_active_of(&mut self, entity: &Entity) {
        self.pending = Some(PendingAction::ToggleActive {
            target: Target::new(entity.id, entity.display_title()),
            current: entity.flag("active"),
        });
    }

    /// Stages a soft delete of the selection. `false` when nothing is
    /// selected.
    pub fn request_bulk_delete(&mut self) -> bool {
        let targets = self.selected_targets();
        if targets.is_empty() {
            return false;
        }
        self.pending = Some(PendingAction::BulkDelete(targets));
        true
    }

    pub fn request_bulk_force_delete(&mut self) -> bool {
        let targets = self.selected_targets();
        if targets.is_empty() {
            return false;
        }
        self.pending = Some(PendingAction::BulkForceDelete(targets));
        true
    }

    /// Stages deletion of every row on the page, permanent when the deleted
    /// rows are being shown.
    pub fn request_delete_all(&mut self) -> bool {
        if self.page.data.is_empty() {
            return false;
        }
        let targets = self.page.ids().into_iter().map(|id| self.target(id)).collect();
        self.pending = Some(PendingAction::DeleteAll {
            targets,
            force: self.list.showing_deleted(),
        });
        true
    }

    /// Drops the staged action without any call.
    pub fn dismiss_pending(&mut self) {
        self.pending = None;
    }

    /// Issues the staged action. Does nothing when none is staged.
    pub fn confirm_pending<W>(&mut self, api: &W) -> ServiceResult<()>
    where
        W: ResourceWriter + ?Sized,
    {
        let Some(action) = self.pending.take() else {
            return Ok(());
        };
        let resource = self.list.resource().clone();
        match action.execute(api, &resource) {
            Ok(()) => {
                log::info!("{resource}: {}", action.success_message());
                self.invalidate(&resource);
                if action.clears_selection() {
                    self.list.selection_mut().clear();
                }
                self.notices.push(Notice::success(action.success_message()));
                Ok(())
            }
            Err(err) => {
                log::error!("{resource}: {err}");
                self.notices
                    .push(Notice::error(err.user_message(action.failure_message())));
                Err(err.into())
            }
        }
    }

    /// Restores the selection right away; restoring needs no confirmation.
    pub fn bulk_restore<W>(&mut self, api: &W) -> ServiceResult<()>
    where
        W: ResourceWriter + ?Sized,
    {
        let ids = self.list.selection().ids();
        if ids.is_empty() {
            return Ok(());
        }
        let resource = self.list.resource().clone();
        match api.restore(&resource, &ids) {
            Ok(()) => {
                self.invalidate(&resource);
                self.list.selection_mut().clear();
                self.notices.push(Notice::success(format!(
                    "{} items restored successfully!",
                    ids.len()
                )));
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to restore {resource}: {err}");
                self.notices
                    .push(Notice::error(err.user_message("Error restoring items")));
                Err(err.into())
            }
        }
    }

    /// Submits the edit form as a create or an update.
    ///
    /// `keep_open` leaves the form open and empty, asking for focus on its
    /// first input, for rapid entry.
    pub fn save<W>(&mut self, api: &W, keep_open: bool) -> ServiceResult<()>
    where
        W: ResourceWriter + ?Sized,
    {
        let editing = self.editor.editing();
        let payload =
            PayloadBuilder::new(&self.schema).build(self.editor.values(), &self.injected, editing);
        let resource = self.list.resource().clone();

        let result = match editing {
            Some(id) => api.update(&resource, id, &payload),
            None => api.create(&resource, &payload),
        };

        match result {
            Ok(_) => {
                self.invalidate(&resource);
                let message = if editing.is_some() {
                    "Updated successfully!"
                } else {
                    "Created successfully!"
                };
                log::info!("{resource}: {message}");
                self.notices.push(Notice::success(message));
                self.editor.reset_after_save(keep_open);
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to save {resource}: {err}");
                self.notices
                    .push(Notice::error(err.user_message("Error saving item")));
                Err(err.into())
            }
        }
    }
}
