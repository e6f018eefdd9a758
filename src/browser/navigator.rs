//! Page navigation and interaction
//!
//! The navigator is the harness's stand-in for a scriptless browser: it
//! loads pages over HTTP, keeps the current [`Document`] snapshot, records
//! values filled into form controls, and turns clicks into the navigation
//! they mean in HTML (anchors follow their href, submit controls post their
//! enclosing form).

use std::collections::HashMap;
use tracing::debug;

use crate::common::{Error, HarnessConfig, Result};
use crate::dom::{Document, FormSubmission, NavPlan, Target};

use super::session::Session;

/// Drives one session through pages and forms
pub struct Navigator {
    session: Session,
    doc: Option<Document>,
    /// Values filled since the last navigation, keyed by control name
    overlay: HashMap<String, String>,
}

impl Navigator {
    pub fn new(config: &HarnessConfig) -> Result<Self> {
        Ok(Self {
            session: Session::new(config)?,
            doc: None,
            overlay: HashMap::new(),
        })
    }

    /// The session this navigator drives
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// The current document snapshot
    pub fn document(&self) -> Result<&Document> {
        self.doc.as_ref().ok_or(Error::NoDocument)
    }

    #[cfg(test)]
    pub(crate) fn set_document(&mut self, doc: Document) {
        self.doc = Some(doc);
    }

    /// Navigate to a path (resolved against the base URL) and block until
    /// the document settles
    pub async fn goto(&mut self, path: &str) -> Result<&Document> {
        let url = self.session.resolve(path)?;
        let doc = self.session.get(url).await?;
        self.overlay.clear();
        Ok(&*self.doc.insert(doc))
    }

    /// Record a value for exactly one fillable form control
    ///
    /// The value is applied when the control's form is next submitted;
    /// it is discarded on navigation, like a browser discards typed input.
    pub fn fill(&mut self, target: &Target, value: &str) -> Result<()> {
        let name = self.document()?.resolve_field(target)?;
        debug!(control = %name, %value, "fill");
        self.overlay.insert(name, value.to_string());
        Ok(())
    }

    /// Click exactly one interactive element and settle on the result
    pub async fn click(&mut self, target: &Target) -> Result<&Document> {
        let plan = self.document()?.click_plan(target, &self.overlay)?;
        debug!(target = %target, "click");
        self.execute(plan).await
    }

    /// Submit exactly one form with explicit field overrides
    pub async fn submit_form(
        &mut self,
        target: &Target,
        fields: &[(String, String)],
    ) -> Result<&Document> {
        let mut overrides = self.overlay.clone();
        for (name, value) in fields {
            overrides.insert(name.clone(), value.clone());
        }
        let submission = self.document()?.submit_plan(target, &overrides)?;
        self.submit(submission).await
    }

    /// Re-fetch the current location
    ///
    /// Used by assertion polling to observe server-side changes; the pages
    /// under test follow post/redirect/get, so a plain GET of the current
    /// URL is always valid.
    pub async fn refresh(&mut self) -> Result<&Document> {
        let url = self
            .session
            .current_url()
            .ok_or(Error::NoDocument)?
            .clone();
        let doc = self.session.get(url).await?;
        self.overlay.clear();
        Ok(&*self.doc.insert(doc))
    }

    async fn execute(&mut self, plan: NavPlan) -> Result<&Document> {
        match plan {
            NavPlan::Follow { href } => {
                let url = self.session.resolve(&href)?;
                let doc = self.session.get(url).await?;
                self.overlay.clear();
                Ok(&*self.doc.insert(doc))
            }
            NavPlan::Submit(submission) => self.submit(submission).await,
        }
    }

    async fn submit(&mut self, submission: FormSubmission) -> Result<&Document> {
        let FormSubmission {
            method,
            action,
            fields,
        } = submission;
        let url = match action.as_deref() {
            Some(action) if !action.is_empty() => self.session.resolve(action)?,
            _ => self
                .session
                .current_url()
                .ok_or(Error::NoDocument)?
                .clone(),
        };
        let doc = self.session.send_form(method, url, &fields).await?;
        self.overlay.clear();
        Ok(&*self.doc.insert(doc))
    }
}
