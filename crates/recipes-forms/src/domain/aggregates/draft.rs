//! Form draft aggregate
//!
//! The in-memory, uncommitted state of one form. Every field is a [`Cell`]
//! holding its value, touched flag and error together, so the three
//! projections can never drift apart. Repeatable fields hold one cell per
//! entry.
//!
//! The aggregate is synchronous and does no I/O. Work that has to leave the
//! process (availability checks, uploads, dispatch) is handed out as a
//! ticket and its result is applied back through a `complete_*` method,
//! which drops the result when a newer edit made it stale.

use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::events::DraftEvent;
use crate::domain::schema::{initial_value, INITIAL_ENTRIES};
use crate::domain::submission::{self, Submission};
use crate::domain::validation;
use crate::domain::value_objects::{
    Entry, ExistingRecipe, FieldErrors, FieldMap, FieldName, FieldValue, FormType, FormValues, ImageFile,
    ImagePolicy, ImagePreview,
};
use crate::ports::outbound::{SubmissionError, UploadError};
use crate::{FormsError, Result};

// =============================================================================
// Phase
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    Pristine,
    Editing,
    Submitting,
    Submitted,
}

// =============================================================================
// Tickets
// =============================================================================

/// A pending availability check for one scalar field
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsyncCheckTicket {
    pub field: FieldName,
    pub value: String,
    revision: u64,
}

/// Identifies the staged image an upload was started for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadTicket {
    generation: u64,
}

#[derive(Clone, Debug)]
pub struct UploadJob {
    pub file: ImageFile,
    pub ticket: UploadTicket,
}

/// What the caller has to do before the submission can be built
#[derive(Clone, Debug)]
pub struct SubmitPlan {
    pub upload: Option<UploadJob>,
}

// =============================================================================
// Cells
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
struct Cell {
    value: FieldValue,
    touched: bool,
    error: Option<String>,
    revision: u64,
}

impl Cell {
    fn new(value: FieldValue) -> Self {
        Self {
            value,
            touched: false,
            error: None,
            revision: 0,
        }
    }

    fn seeded(value: impl Into<FieldValue>) -> Self {
        Self {
            touched: true,
            ..Self::new(value.into())
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Slot {
    Single(Cell),
    Repeated(Vec<Cell>),
}

impl Slot {
    fn cells(&self) -> &[Cell] {
        match self {
            Self::Single(cell) => std::slice::from_ref(cell),
            Self::Repeated(cells) => cells,
        }
    }

    fn cells_mut(&mut self) -> &mut [Cell] {
        match self {
            Self::Single(cell) => std::slice::from_mut(cell),
            Self::Repeated(cells) => cells,
        }
    }

    fn project<T>(&self, f: impl Fn(&Cell) -> T) -> Entry<T> {
        match self {
            Self::Single(cell) => Entry::One(f(cell)),
            Self::Repeated(cells) => Entry::Many(cells.iter().map(f).collect()),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Read-only view published to renderers after every change
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub form_type: FormType,
    pub values: FormValues,
    pub touched: FieldMap<bool>,
    pub field_errors: FieldMap<Option<String>>,
    pub field_counts: BTreeMap<FieldName, usize>,
    pub phase: FormPhase,
    pub pristine: bool,
    pub is_valid: bool,
    pub can_submit: bool,
    pub async_check_pending: bool,
    pub uploading: bool,
    pub has_pending_image: bool,
    pub upload_error: Option<String>,
    pub submit_error: Option<String>,
}

// =============================================================================
// Aggregate
// =============================================================================

#[derive(Clone, Debug)]
pub struct FormDraft {
    form_type: FormType,
    slots: BTreeMap<FieldName, Slot>,
    entity_id: Option<u64>,
    phase: FormPhase,
    is_valid: bool,
    in_flight_check: Option<AsyncCheckTicket>,
    // at most one waiting check per field, run in field order
    deferred_checks: BTreeMap<FieldName, AsyncCheckTicket>,
    image_policy: ImagePolicy,
    pending_image: Option<ImageFile>,
    image_rejection: Option<String>,
    // Image URL the server currently stores for the entity
    stored_image: Option<String>,
    upload_error: Option<String>,
    upload_generation: u64,
    uploading: bool,
    // stored by uploads that finished after a newer image was chosen
    orphaned_uploads: Vec<String>,
    submit_error: Option<String>,
    revision: u64,
    events: Vec<DraftEvent>,
}

impl FormDraft {
    /// Fresh draft for `form_type`. Edit forms are seeded from `existing`,
    /// with every seeded entry marked touched.
    pub fn initialize(form_type: FormType, existing: Option<&ExistingRecipe>) -> Self {
        let schema = form_type.schema();
        let slots = schema
            .fields
            .iter()
            .map(|&field| {
                let slot = if schema.is_repeatable(field) {
                    Slot::Repeated(vec![Cell::new(initial_value(field)); INITIAL_ENTRIES])
                } else {
                    Slot::Single(Cell::new(initial_value(field)))
                };
                (field, slot)
            })
            .collect();

        let mut draft = Self {
            form_type,
            slots,
            entity_id: None,
            phase: FormPhase::Pristine,
            is_valid: false,
            in_flight_check: None,
            deferred_checks: BTreeMap::new(),
            image_policy: ImagePolicy::default(),
            pending_image: None,
            image_rejection: None,
            stored_image: None,
            upload_error: None,
            upload_generation: 0,
            uploading: false,
            orphaned_uploads: Vec::new(),
            submit_error: None,
            revision: 0,
            events: Vec::new(),
        };

        if let Some(recipe) = existing {
            draft.entity_id = Some(recipe.id);
            if form_type == FormType::EditRecipe {
                draft.seed(recipe);
            }
        }

        draft.recompute_validity();
        draft
    }

    pub fn with_entity_id(mut self, id: u64) -> Self {
        self.entity_id = Some(id);
        self
    }

    pub fn with_image_policy(mut self, policy: ImagePolicy) -> Self {
        self.image_policy = policy;
        self
    }

    fn seed(&mut self, recipe: &ExistingRecipe) {
        let image = recipe.recipe_image.clone().unwrap_or_default();
        let scalars = [
            (FieldName::RecipeName, FieldValue::from(recipe.recipe_name.as_str())),
            (FieldName::RecipeImage, FieldValue::from(image)),
            (FieldName::TotalTime, FieldValue::from(recipe.total_time.as_str())),
            (FieldName::Difficulty, FieldValue::from(recipe.difficulty.as_str())),
            (FieldName::ExtraInfo, FieldValue::from(recipe.extra_info.clone().unwrap_or_default())),
            (FieldName::Vegetarian, FieldValue::Flag(recipe.vegetarian)),
        ];
        for (field, value) in scalars {
            self.slots.insert(field, Slot::Single(Cell::seeded(value)));
        }

        let lists = [
            (FieldName::Ingredients, &recipe.ingredients),
            (FieldName::Preparations, &recipe.preparations),
            (FieldName::Directions, &recipe.directions),
        ];
        for (field, entries) in lists {
            if entries.is_empty() {
                continue;
            }
            let cells = entries.iter().map(|e| Cell::seeded(e.as_str())).collect();
            self.slots.insert(field, Slot::Repeated(cells));
        }

        self.stored_image = recipe.recipe_image.clone().filter(|url| !url.is_empty());
        self.validate_all();
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn form_type(&self) -> FormType {
        self.form_type
    }

    pub fn entity_id(&self) -> Option<u64> {
        self.entity_id
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn pristine(&self) -> bool {
        self.phase == FormPhase::Pristine
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn submitting(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    pub fn uploading(&self) -> bool {
        self.uploading
    }

    pub fn async_check_pending(&self) -> bool {
        self.in_flight_check.is_some()
    }

    pub fn pending_image(&self) -> Option<&ImageFile> {
        self.pending_image.as_ref()
    }

    pub fn upload_error(&self) -> Option<&str> {
        self.upload_error.as_deref()
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// Whether the renderer should mark `field` with the required hint
    pub fn is_required(&self, field: FieldName) -> bool {
        self.form_type.schema().is_required(field)
    }

    /// Gate for the submit control. Pristine, submitting and already
    /// submitted drafts cannot be sent.
    pub fn can_submit(&self) -> bool {
        self.is_valid && self.phase == FormPhase::Editing && !self.uploading
    }

    /// Number of entries of a repeatable field
    pub fn field_count(&self, field: FieldName) -> Option<usize> {
        match self.slots.get(&field)? {
            Slot::Repeated(cells) => Some(cells.len()),
            Slot::Single(_) => None,
        }
    }

    pub fn field_error(&self, field: FieldName, index: Option<usize>) -> Option<&str> {
        if field == FieldName::RecipeImage {
            if let Some(reason) = self.image_error() {
                return Some(reason);
            }
        }
        let cells = self.slots.get(&field)?.cells();
        cells.get(index.unwrap_or(0))?.error.as_deref()
    }

    // =========================================================================
    // Projections
    // =========================================================================

    pub fn values(&self) -> FormValues {
        self.project(|cell| cell.value.clone())
    }

    pub fn touched(&self) -> FieldMap<bool> {
        self.project(|cell| cell.touched)
    }

    /// Per-field errors; a rejected image or failed upload is reported on
    /// `recipeImage`
    pub fn field_errors(&self) -> FieldMap<Option<String>> {
        let mut errors = self.project(|cell| cell.error.clone());
        if let Some(reason) = self.image_error() {
            errors.insert(FieldName::RecipeImage, Entry::One(Some(reason.to_string())));
        }
        errors
    }

    fn image_error(&self) -> Option<&str> {
        self.upload_error.as_deref().or(self.image_rejection.as_deref())
    }

    pub fn field_counts(&self) -> BTreeMap<FieldName, usize> {
        self.slots
            .iter()
            .filter_map(|(field, slot)| match slot {
                Slot::Repeated(cells) => Some((*field, cells.len())),
                Slot::Single(_) => None,
            })
            .collect()
    }

    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            form_type: self.form_type,
            values: self.values(),
            touched: self.touched(),
            field_errors: self.field_errors(),
            field_counts: self.field_counts(),
            phase: self.phase,
            pristine: self.pristine(),
            is_valid: self.is_valid,
            can_submit: self.can_submit(),
            async_check_pending: self.async_check_pending(),
            uploading: self.uploading,
            has_pending_image: self.pending_image.is_some(),
            upload_error: self.upload_error.clone(),
            submit_error: self.submit_error.clone(),
        }
    }

    fn project<T>(&self, f: impl Fn(&Cell) -> T) -> FieldMap<T> {
        let mut map = FieldMap::new();
        for (field, slot) in &self.slots {
            map.insert(*field, slot.project(&f));
        }
        map
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Set a field (or entry `index` of a repeatable field)
    pub fn change_field(&mut self, field: FieldName, value: impl Into<FieldValue>, index: Option<usize>) -> Result<()> {
        let revision = self.next_revision();
        let cell = self.cell_mut(field, index)?;
        cell.value = value.into();
        cell.touched = true;
        cell.revision = revision;

        self.mark_edited();
        self.validate_field(field, index);
        if field == FieldName::Password && self.is_touched(FieldName::PasswordConfirm) {
            self.validate_field(FieldName::PasswordConfirm, None);
        }
        self.recompute_validity();
        self.raise(DraftEvent::FieldChanged { field, index });
        Ok(())
    }

    /// Star widget of the review form
    pub fn change_rating(&mut self, rating: u8) -> Result<()> {
        self.change_field(FieldName::Rating, FieldValue::Number(i64::from(rating)), None)
    }

    /// Stage a recipe image. `preview` receives a local data URL when the
    /// file passes the image policy.
    pub fn change_image(&mut self, file: ImageFile, preview: impl FnOnce(ImagePreview)) -> Result<()> {
        let revision = self.next_revision();
        let cell = self.cell_mut(FieldName::RecipeImage, None)?;
        cell.touched = true;
        cell.revision = revision;

        self.upload_error = None;
        self.image_rejection = None;
        // any upload still running was for the previous file
        self.upload_generation += 1;
        self.mark_edited();

        let result = match self.image_policy.check(&file) {
            Ok(()) => {
                preview(ImagePreview::from_file(&file));
                self.raise(DraftEvent::ImageStaged {
                    file_name: file.file_name.clone(),
                    size: file.size(),
                });
                self.pending_image = Some(file);
                Ok(())
            }
            Err(rejection) => {
                self.image_rejection = Some(rejection.to_string());
                self.pending_image = None;
                self.raise(DraftEvent::ImageRejected {
                    reason: rejection.to_string(),
                });
                Err(FormsError::ImageRejected(rejection))
            }
        };

        self.recompute_validity();
        result
    }

    /// Append a blank entry; returns the new entry count
    pub fn add_repeatable_field(&mut self, field: FieldName) -> Result<usize> {
        let count = self.replace_entries(field, |cells| {
            let mut next = cells.to_vec();
            next.push(Cell::new(initial_value(field)));
            Ok(next)
        })?;
        self.raise(DraftEvent::EntryAdded { field, count });
        Ok(count)
    }

    /// Drop entry `index`; returns the new entry count
    pub fn remove_repeatable_field(&mut self, field: FieldName, index: usize) -> Result<usize> {
        let count = self.replace_entries(field, |cells| {
            if index >= cells.len() {
                return Err(FormsError::IndexOutOfBounds {
                    field,
                    index,
                    len: cells.len(),
                });
            }
            Ok(cells
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, cell)| cell.clone())
                .collect())
        })?;
        self.raise(DraftEvent::EntryRemoved { field, index, count });
        Ok(count)
    }

    /// Focus clears the top-level submit error
    pub fn focus_field(&mut self) {
        self.submit_error = None;
    }

    /// Mark a field touched and validate it. Returns a ticket when the
    /// value also needs a server-side availability check.
    pub fn blur_field(&mut self, field: FieldName, index: Option<usize>) -> Result<Option<AsyncCheckTicket>> {
        match index {
            Some(_) => self.cell_mut(field, index)?.touched = true,
            None => {
                let slot = self.slot_mut(field)?;
                for cell in slot.cells_mut() {
                    cell.touched = true;
                }
            }
        }

        self.validate_field(field, index);
        self.recompute_validity();
        Ok(self.async_ticket(field))
    }

    // =========================================================================
    // Availability checks
    // =========================================================================

    /// Whether `ticket` still describes the field as it is now
    pub fn ticket_is_current(&self, ticket: &AsyncCheckTicket) -> bool {
        match self.slots.get(&ticket.field) {
            Some(Slot::Single(cell)) => cell.revision == ticket.revision && cell.error.is_none(),
            _ => false,
        }
    }

    /// Single-flight gate. Returns the ticket to run now, or `None` when it
    /// is stale or was deferred behind the check already in flight.
    pub fn begin_async_check(&mut self, ticket: AsyncCheckTicket) -> Option<AsyncCheckTicket> {
        if !self.ticket_is_current(&ticket) {
            debug!(field = %ticket.field, "dropping stale availability check");
            return None;
        }

        match &self.in_flight_check {
            Some(running) if *running == ticket => None,
            Some(_) => {
                debug!(field = %ticket.field, "deferring availability check");
                self.deferred_checks.insert(ticket.field, ticket);
                None
            }
            None => {
                self.in_flight_check = Some(ticket.clone());
                Some(ticket)
            }
        }
    }

    /// Apply an availability result. Returns the next deferred ticket that
    /// is still current; stale deferred tickets are dropped on the way.
    pub fn complete_async_check(
        &mut self,
        ticket: &AsyncCheckTicket,
        result: std::result::Result<(), FieldErrors>,
    ) -> Option<AsyncCheckTicket> {
        if self.in_flight_check.as_ref() == Some(ticket) {
            self.in_flight_check = None;
        }

        if self.ticket_is_current(ticket) {
            let available = result.is_ok();
            if let Err(errors) = result {
                if let (Some(message), Some(Slot::Single(cell))) =
                    (errors.get(&ticket.field), self.slots.get_mut(&ticket.field))
                {
                    cell.error = Some(message.clone());
                }
            }
            self.recompute_validity();
            self.raise(DraftEvent::AsyncCheckCompleted {
                field: ticket.field,
                available,
            });
        } else {
            debug!(field = %ticket.field, "discarding stale availability result");
        }

        let next = self.next_deferred_check()?;
        self.in_flight_check = Some(next.clone());
        Some(next)
    }

    fn next_deferred_check(&mut self) -> Option<AsyncCheckTicket> {
        while let Some((field, ticket)) = self.deferred_checks.pop_first() {
            if self.ticket_is_current(&ticket) {
                return Some(ticket);
            }
            debug!(%field, "dropping stale deferred availability check");
        }
        None
    }

    fn async_ticket(&self, field: FieldName) -> Option<AsyncCheckTicket> {
        if !validation::needs_async_check(self.form_type, field) {
            return None;
        }
        let Some(Slot::Single(cell)) = self.slots.get(&field) else {
            return None;
        };
        if cell.error.is_some() || cell.value.is_blank() {
            return None;
        }
        Some(AsyncCheckTicket {
            field,
            value: cell.value.as_text().trim().to_string(),
            revision: cell.revision,
        })
    }

    // =========================================================================
    // Validity
    // =========================================================================

    /// Valid when every required field is touched (every entry, for
    /// repeatable fields), no cell carries an error and the image was
    /// neither rejected nor failed to upload.
    pub fn recompute_validity(&mut self) {
        let schema = self.form_type.schema();
        let cells_ok = self.slots.iter().all(|(field, slot)| {
            let cells = slot.cells();
            let touched = !schema.is_required(*field) || (!cells.is_empty() && cells.iter().all(|c| c.touched));
            touched && cells.iter().all(|c| c.error.is_none())
        });
        self.is_valid = cells_ok && self.image_error().is_none();
    }

    fn validate_field(&mut self, field: FieldName, index: Option<usize>) {
        let form_type = self.form_type;
        let values = self.values();
        let Some(slot) = self.slots.get_mut(&field) else {
            return;
        };

        match (slot, index) {
            (Slot::Repeated(cells), Some(i)) => {
                if let Some(cell) = cells.get_mut(i) {
                    cell.error = validation::sync_validate(form_type, field, &values, Some(i));
                }
            }
            (Slot::Repeated(cells), None) => {
                for (i, cell) in cells.iter_mut().enumerate() {
                    cell.error = validation::sync_validate(form_type, field, &values, Some(i));
                }
            }
            (Slot::Single(cell), _) => {
                cell.error = validation::sync_validate(form_type, field, &values, None);
            }
        }
    }

    fn validate_all(&mut self) {
        for &field in self.form_type.schema().fields {
            self.validate_field(field, None);
        }
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Enter `Submitting`. The plan carries the staged image when one has to
    /// be uploaded first.
    pub fn begin_submit(&mut self) -> Result<SubmitPlan> {
        if self.submitting() || self.uploading {
            return Err(FormsError::SubmitNotAllowed("a submission is already in progress"));
        }
        if self.pristine() {
            return Err(FormsError::SubmitNotAllowed("nothing has been entered yet"));
        }
        if self.phase == FormPhase::Submitted {
            return Err(FormsError::SubmitNotAllowed("the form was already submitted"));
        }
        if !self.is_valid {
            return Err(FormsError::SubmitNotAllowed("the form has errors or missing fields"));
        }

        self.phase = FormPhase::Submitting;
        self.submit_error = None;

        let upload = match self.pending_image.clone() {
            Some(file) => {
                self.uploading = true;
                Some(UploadJob {
                    file,
                    ticket: UploadTicket {
                        generation: self.upload_generation,
                    },
                })
            }
            None => None,
        };
        debug!(form_type = %self.form_type, upload = upload.is_some(), "submit started");
        Ok(SubmitPlan { upload })
    }

    /// Apply an upload result. A success writes the URL into `recipeImage`.
    /// A stale success is kept for deletion, see [`Self::take_orphaned_uploads`].
    pub fn complete_upload(
        &mut self,
        ticket: UploadTicket,
        result: std::result::Result<String, UploadError>,
    ) -> Result<()> {
        self.uploading = false;

        if ticket.generation != self.upload_generation {
            debug!(generation = ticket.generation, "discarding stale upload result");
            if let Ok(url) = result {
                self.orphaned_uploads.push(url);
            }
            self.leave_submitting();
            return Err(FormsError::UploadSuperseded);
        }

        match result {
            Ok(url) => {
                if let Ok(cell) = self.cell_mut(FieldName::RecipeImage, None) {
                    cell.value = FieldValue::Text(url.clone());
                    cell.error = None;
                }
                self.pending_image = None;
                self.upload_error = None;
                self.raise(DraftEvent::UploadCompleted { url });
                Ok(())
            }
            Err(err) => {
                let reason = err.to_string();
                self.upload_error = Some(reason.clone());
                self.leave_submitting();
                self.recompute_validity();
                self.raise(DraftEvent::UploadFailed { reason: reason.clone() });
                Err(FormsError::Upload(reason))
            }
        }
    }

    pub fn build_submission(&self) -> Result<Submission> {
        submission::build(self.form_type, &self.values(), self.entity_id)
    }

    /// Leave `Submitting` without dispatching
    pub fn abort_submit(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        self.uploading = false;
        self.leave_submitting();
        self.submit_error = Some(reason.clone());
        self.raise(DraftEvent::SubmitFailed {
            form_type: self.form_type,
            reason,
        });
    }

    /// Apply the dispatch result. On success returns the image URL the
    /// server no longer references, if the submission replaced one.
    pub fn finish_submit(&mut self, result: std::result::Result<(), SubmissionError>) -> Option<String> {
        match result {
            Ok(()) => {
                self.phase = FormPhase::Submitted;
                self.pending_image = None;
                self.submit_error = None;
                self.raise(DraftEvent::Submitted {
                    form_type: self.form_type,
                    submitted_at: Utc::now(),
                });

                let current = self.recipe_image_url();
                let replaced = self.stored_image.take().filter(|old| Some(old) != current.as_ref());
                self.stored_image = current;
                replaced
            }
            Err(err) => {
                self.abort_submit(err.message);
                None
            }
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    pub fn take_events(&mut self) -> Vec<DraftEvent> {
        std::mem::take(&mut self.events)
    }

    /// Image URLs that were stored but are referenced by nothing
    pub fn take_orphaned_uploads(&mut self) -> Vec<String> {
        std::mem::take(&mut self.orphaned_uploads)
    }

    fn raise(&mut self, event: DraftEvent) {
        self.events.push(event);
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn next_revision(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    fn mark_edited(&mut self) {
        if matches!(self.phase, FormPhase::Pristine | FormPhase::Submitted) {
            self.phase = FormPhase::Editing;
        }
    }

    fn leave_submitting(&mut self) {
        if self.phase == FormPhase::Submitting {
            self.phase = FormPhase::Editing;
        }
    }

    fn is_touched(&self, field: FieldName) -> bool {
        self.slots
            .get(&field)
            .is_some_and(|slot| slot.cells().iter().all(|c| c.touched))
    }

    fn recipe_image_url(&self) -> Option<String> {
        match self.slots.get(&FieldName::RecipeImage)? {
            Slot::Single(cell) if !cell.value.is_blank() => Some(cell.value.as_text().to_string()),
            _ => None,
        }
    }

    fn slot_mut(&mut self, field: FieldName) -> Result<&mut Slot> {
        let form_type = self.form_type;
        self.slots
            .get_mut(&field)
            .ok_or(FormsError::FieldNotInForm { form_type, field })
    }

    fn cell_mut(&mut self, field: FieldName, index: Option<usize>) -> Result<&mut Cell> {
        match (self.slot_mut(field)?, index) {
            (Slot::Single(cell), None) => Ok(cell),
            (Slot::Single(_), Some(_)) => Err(FormsError::NotRepeatable(field)),
            (Slot::Repeated(_), None) => Err(FormsError::IndexRequired(field)),
            (Slot::Repeated(cells), Some(i)) => {
                let len = cells.len();
                cells
                    .get_mut(i)
                    .ok_or(FormsError::IndexOutOfBounds { field, index: i, len })
            }
        }
    }

    /// The only place entry lists change length. `f` builds the new list
    /// from the current one, so values, touched flags and errors move
    /// together.
    fn replace_entries(
        &mut self,
        field: FieldName,
        f: impl FnOnce(&[Cell]) -> Result<Vec<Cell>>,
    ) -> Result<usize> {
        let cells = match self.slot_mut(field)? {
            Slot::Repeated(cells) => cells,
            Slot::Single(_) => return Err(FormsError::NotRepeatable(field)),
        };
        let next = f(cells)?;
        let count = next.len();
        *cells = next;

        self.recompute_validity();
        Ok(count)
    }
}
