//! The modal annotation editor.
//!
//! The editor holds at most one `EditSession`. A session is created when a transaction is opened
//! and consumed when the editor closes, so nothing can act on a transaction that is no longer
//! being edited.

use crate::dom::{Document, NodeId};
use crate::extract::{extract, transaction_for};
use crate::model::{Annotations, Legend, TransactionRecord, TransactionStore};
use crate::reconcile::reconcile;
use crate::submit::{FormData, Submitter};
use crate::view::{
    new_category_control, ADD_CATEGORY, CATEGORIES_FIELD, CATEGORY, GOAL_FIELD, NEW,
    TRANSACTION_OPTIONS, VISIBLE,
};
use crate::Result;
use anyhow::{bail, Context};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Asks the user for the name of a new category.
pub trait Prompt {
    /// Returns `None` when the user cancels.
    fn ask(&mut self, message: &str) -> Option<String>;
}

impl<F> Prompt for F
where
    F: FnMut(&str) -> Option<String>,
{
    fn ask(&mut self, message: &str) -> Option<String> {
        self(message)
    }
}

/// The lifecycle of the submission of a session.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "message")]
pub enum RequestState {
    /// Nothing has been submitted yet.
    #[default]
    Idle,
    Pending,
    Succeeded,
    /// The last attempt failed. The session stays open so the user can retry.
    Failed(String),
    Cancelled,
}

/// One open editor interaction.
#[derive(Debug, Clone)]
pub struct EditSession {
    node: NodeId,
    record: TransactionRecord,
    target: String,
    request: RequestState,
}

impl EditSession {
    /// The transaction node being edited.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The record as it was when the editor opened.
    pub fn record(&self) -> &TransactionRecord {
        &self.record
    }

    /// The URL the form is submitted to.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn request(&self) -> &RequestState {
        &self.request
    }
}

/// The checked state of the form, read in document order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct FormState {
    /// Checked categories with the style of their control's container.
    pub categories: Vec<(String, Option<String>)>,
    /// The selected goal; `None` when the empty option or nothing is selected.
    pub goal: Option<String>,
    /// The serialized form as it is sent.
    pub data: FormData,
}

impl FormState {
    pub fn annotations(&self) -> Annotations {
        Annotations {
            categories: self.categories.iter().map(|(n, _)| n.clone()).collect(),
            goal: self.goal.clone(),
        }
        .normalized()
    }
}

#[derive(Debug, Default)]
pub struct Editor {
    session: Option<EditSession>,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    fn require_session(&self) -> Result<&EditSession> {
        self.session
            .as_ref()
            .context("No transaction is being edited")
    }

    /// Opens the editor for the transaction containing `node`.
    ///
    /// The form is targeted at `<action-base>/<month>/<id>`, its header shows the label and the
    /// display amount, and its controls are set from the transaction's record. Controls added
    /// with `add_category` during an earlier session that never completed are removed.
    ///
    /// # Errors
    /// - Returns an error if `node` is not inside a transaction, or the record cannot be read.
    /// - Returns an error if the transaction's date is invalid, since the target needs its month.
    /// - Returns an error if the page has no editor form.
    ///
    /// On error the editor is closed and nothing else on the page changes.
    pub fn open(&mut self, doc: &mut Document, node: NodeId) -> Result<&EditSession> {
        let EditTarget {
            node,
            record,
            target,
            modal,
            form,
            header,
        } = match EditTarget::resolve(doc, node) {
            Ok(resolved) => resolved,
            Err(e) => {
                self.abandon();
                self.close(doc);
                return Err(e);
            }
        };
        self.abandon();

        doc.set_attr(form, "action", &target);
        doc.set_text(header, format!("{} ({})", record.label, record.amount_text));

        for input in controls(doc, form, CATEGORIES_FIELD) {
            let checked = doc
                .get(input)
                .attr("value")
                .is_some_and(|v| record.has_category(v));
            doc.set_checked(input, checked);
        }
        for input in controls(doc, form, GOAL_FIELD) {
            let value = doc.get(input).attr("value").unwrap_or_default();
            let checked = match &record.goal {
                None => value.is_empty(),
                Some(goal) => value == goal,
            };
            doc.set_checked(input, checked);
        }

        let leftovers = doc.select(modal, |e| {
            e.is("label") && e.has_class(CATEGORY) && e.has_class(NEW)
        });
        for leftover in leftovers {
            doc.detach(leftover);
        }
        doc.add_class(modal, VISIBLE);

        debug!("Editing transaction '{}' via {target}", record.id);
        Ok(&*self.session.insert(EditSession {
            node,
            record,
            target,
            request: RequestState::Idle,
        }))
    }

    /// Prompts for a new category name and adds a checked control for it before the form's
    /// add-category control. The name is trimmed. A blank name or a cancelled prompt changes
    /// nothing.
    ///
    /// Returns the new control, if one was added.
    pub fn add_category(
        &mut self,
        doc: &mut Document,
        prompt: &mut impl Prompt,
    ) -> Result<Option<NodeId>> {
        let _ = self.require_session()?;
        let name = match prompt.ask("Name:") {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => return Ok(None),
        };
        let modal = doc.require_id(TRANSACTION_OPTIONS)?;
        let before = doc
            .select_first(modal, |e| e.has_class(ADD_CATEGORY))
            .context("The editor form has no add-category control")?;

        let label = new_category_control(doc, &name, None);
        doc.add_class(label, NEW);
        if let Some(input) = doc.select_first(label, |e| e.is("input")) {
            doc.set_checked(input, true);
        }
        doc.insert_before(before, label)?;
        debug!("Added new category '{name}' to the editor");
        Ok(Some(label))
    }

    /// Checks or unchecks the control of category `name`.
    pub fn set_category(&mut self, doc: &mut Document, name: &str, checked: bool) -> Result<()> {
        let _ = self.require_session()?;
        let modal = doc.require_id(TRANSACTION_OPTIONS)?;
        let form = editor_form(doc, modal)?;
        let input = controls(doc, form, CATEGORIES_FIELD)
            .into_iter()
            .find(|n| doc.get(*n).attr("value") == Some(name))
            .with_context(|| format!("The editor has no category '{name}'"))?;
        doc.set_checked(input, checked);
        Ok(())
    }

    /// Selects goal `goal`, or the "none" option for `None`.
    pub fn select_goal(&mut self, doc: &mut Document, goal: Option<&str>) -> Result<()> {
        let _ = self.require_session()?;
        let modal = doc.require_id(TRANSACTION_OPTIONS)?;
        let form = editor_form(doc, modal)?;
        let wanted = goal.unwrap_or_default();
        let radios = controls(doc, form, GOAL_FIELD);
        if !radios
            .iter()
            .any(|n| doc.get(*n).attr("value") == Some(wanted))
        {
            bail!("The editor has no goal '{wanted}'");
        }
        for radio in radios {
            let checked = doc.get(radio).attr("value") == Some(wanted);
            doc.set_checked(radio, checked);
        }
        Ok(())
    }

    /// Reads the current state of the form.
    pub fn form_state(&self, doc: &Document) -> Result<FormState> {
        let modal = doc.require_id(TRANSACTION_OPTIONS)?;
        let form = editor_form(doc, modal)?;
        let mut state = FormState::default();
        for input in doc.select(form, |e| e.is("input") && e.checked()) {
            let element = doc.get(input);
            let Some(name) = element.attr("name") else {
                continue;
            };
            let value = element.attr("value").unwrap_or_default();
            match name {
                CATEGORIES_FIELD => {
                    let style = element
                        .parent()
                        .and_then(|p| doc.get(p).attr("style"))
                        .map(String::from);
                    state.categories.push((value.to_string(), style));
                }
                GOAL_FIELD if !value.is_empty() => state.goal = Some(value.to_string()),
                _ => {}
            }
            state.data.push(name, value);
        }
        Ok(state)
    }

    /// Submits the form and, once the server confirms, reconciles the transaction and closes the
    /// editor.
    ///
    /// The session is marked `Pending` for the duration of the request. On failure it is marked
    /// `Failed`, the editor stays open, and the error is returned so the user can retry.
    pub async fn submit(
        &mut self,
        doc: &mut Document,
        store: &mut TransactionStore,
        submitter: &(dyn Submitter + Send + Sync),
    ) -> Result<()> {
        let form = self.form_state(doc)?;
        let session = self
            .session
            .as_mut()
            .context("No transaction is being edited")?;
        session.request = RequestState::Pending;
        let target = session.target.clone();
        let id = session.record.id.clone();
        let node = session.node;

        let accepted = match submitter.submit(&target, &form.data).await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Saving transaction '{id}' failed: {e:#}");
                session.request = RequestState::Failed(format!("{e:#}"));
                return Err(e.context(format!("Unable to save transaction '{id}'")));
            }
        };
        session.request = RequestState::Succeeded;

        let record = reconcile(doc, store, node, &id, &form, &accepted)?;
        info!(
            "Saved transaction '{id}': categories [{}], goal {}",
            record.categories.join(", "),
            record.goal.as_deref().unwrap_or("none")
        );
        self.close(doc);
        Ok(())
    }

    /// Drops the current session, warning when its submission never completed.
    fn abandon(&mut self) {
        if let Some(stale) = self.session.take() {
            if stale.request == RequestState::Pending {
                warn!(
                    "Abandoning the unfinished submission for transaction '{}'",
                    stale.record.id
                );
            }
        }
    }

    /// Hides the editor and ends the session.
    pub fn close(&mut self, doc: &mut Document) {
        if let Some(modal) = doc.by_id(TRANSACTION_OPTIONS) {
            doc.remove_class(modal, VISIBLE);
        }
        self.session = None;
    }

    /// Marks the session cancelled and closes the editor. Returns the cancelled session.
    pub fn cancel(&mut self, doc: &mut Document) -> Option<EditSession> {
        let mut session = self.session.take()?;
        session.request = RequestState::Cancelled;
        self.close(doc);
        Some(session)
    }

    /// Categories suggested for the transaction being edited by their keywords, excluding the
    /// ones it already has.
    pub fn suggestions(&self, legend: &Legend) -> Result<Vec<String>> {
        let record = &self.require_session()?.record;
        Ok(legend
            .suggest(&record.label)
            .into_iter()
            .filter(|name| !record.has_category(name))
            .collect())
    }
}

/// Everything `open` needs from the page, gathered before the page or the session is changed.
struct EditTarget {
    node: NodeId,
    record: TransactionRecord,
    target: String,
    modal: NodeId,
    form: NodeId,
    header: NodeId,
}

impl EditTarget {
    fn resolve(doc: &Document, node: NodeId) -> Result<Self> {
        let node = transaction_for(doc, node).context("The node is not part of a transaction")?;
        let record = extract(doc, node)?;
        let month = record.date.month().with_context(|| {
            format!(
                "Transaction '{}' has an invalid date, unable to address its edit",
                record.id
            )
        })?;

        let modal = doc.require_id(TRANSACTION_OPTIONS)?;
        let form = editor_form(doc, modal)?;
        let base = doc
            .get(form)
            .attr("data-action-base")
            .context("The editor form has no data-action-base")?;
        let target = format!("{}/{}/{}", base.trim_end_matches('/'), month, record.id);
        let header = doc
            .select_first(form, |e| e.is("h4"))
            .context("The editor form has no header")?;
        Ok(Self {
            node,
            record,
            target,
            modal,
            form,
            header,
        })
    }
}

fn editor_form(doc: &Document, modal: NodeId) -> Result<NodeId> {
    doc.select_first(modal, |e| e.is("form"))
        .context("The editor has no form")
}

/// The `input` controls of `form` submitted under `name`.
fn controls(doc: &Document, form: NodeId, name: &str) -> Vec<NodeId> {
    doc.select(form, |e| e.is("input") && e.attr("name") == Some(name))
}
