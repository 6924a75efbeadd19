//! Admin screen: password gate and the "add memory" form.
//!
//! # Invariants
//! - Authentication is one-way for the session; there is no logout.
//! - The gate is a plain string comparison with the configured password. It
//!   keeps casual visitors out of the form and is not a security control.
//! - `submit` never reaches the store unless all four fields are present and
//!   the date parses.
//! - A failed submit leaves every form field as entered.

use super::{possessive, Notice, Route};
use crate::model::memory::{parse_entry_date, ImagePayload, MemoryDraft};
use crate::repo::memory_repo::{MemoryRepository, RepoError};
use crate::store::memory_store::MemoryStore;
use log::{info, warn};
use std::time::Duration;

/// Delay before navigating to the timeline after a successful submit.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);

/// Form fields as entered by the admin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminForm {
    pub title: String,
    /// Raw date input value (`YYYY-MM-DD`).
    pub date: String,
    pub description: String,
    pub image: Option<ImagePayload>,
    /// `data:` URL of `image`, for instant preview.
    pub preview: Option<String>,
}

impl AdminForm {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.date.is_empty()
            && self.description.is_empty()
            && self.image.is_none()
    }

    fn is_complete(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.date.trim().is_empty()
            && !self.description.trim().is_empty()
            && self.image.as_ref().is_some_and(|image| !image.bytes.is_empty())
    }
}

/// Deferred navigation requested by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect {
    pub route: Route,
    pub after: Duration,
}

/// Result of one submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub notice: Notice,
    /// Present only after a successful save.
    pub redirect: Option<Redirect>,
}

impl SubmitOutcome {
    fn rejected(notice: Notice) -> Self {
        Self {
            notice,
            redirect: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.redirect.is_some()
    }
}

/// Per-session admin state.
#[derive(Debug, Clone)]
pub struct AdminSession {
    password: String,
    child_name: String,
    authenticated: bool,
    form: AdminForm,
}

impl AdminSession {
    pub fn new(password: impl Into<String>, child_name: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            child_name: child_name.into(),
            authenticated: false,
            form: AdminForm::default(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Checks `attempt` against the configured password.
    pub fn login(&mut self, attempt: &str) -> Notice {
        if self.authenticated {
            return Notice::info("Success", "You are already logged in to the admin panel.");
        }
        if attempt == self.password {
            self.authenticated = true;
            info!("event=admin_login module=view status=ok");
            Notice::info("Success", "You are now logged in to the admin panel.")
        } else {
            warn!("event=admin_login module=view status=error error_code=wrong_password");
            Notice::destructive(
                "Authentication failed",
                "The password you entered is incorrect.",
            )
        }
    }

    /// The form, or `None` while the gate is closed.
    pub fn form(&self) -> Option<&AdminForm> {
        self.authenticated.then_some(&self.form)
    }

    pub fn set_title(&mut self, value: impl Into<String>) {
        self.form.title = value.into();
    }

    pub fn set_date(&mut self, value: impl Into<String>) {
        self.form.date = value.into();
    }

    pub fn set_description(&mut self, value: impl Into<String>) {
        self.form.description = value.into();
    }

    /// Attaches the picked file and returns its preview `data:` URL.
    pub fn attach_image(
        &mut self,
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> &str {
        let image = ImagePayload::new(file_name, content_type, bytes);
        let preview = self.form.preview.insert(image.to_data_url());
        self.form.image = Some(image);
        preview
    }

    /// Validates the form and saves it through `store`.
    ///
    /// On success the form is cleared and a timeline redirect is returned.
    pub fn submit<R: MemoryRepository>(&mut self, store: &mut MemoryStore<R>) -> SubmitOutcome {
        if !self.authenticated {
            return SubmitOutcome::rejected(Notice::destructive(
                "Not logged in",
                "Enter the admin password before adding memories.",
            ));
        }
        if !self.form.is_complete() {
            return SubmitOutcome::rejected(Notice::destructive(
                "Missing information",
                "Please fill in all fields and add an image.",
            ));
        }

        let draft = match parse_entry_date(&self.form.date)
            .and_then(|date| MemoryDraft::new(&self.form.title, date, &self.form.description))
        {
            Ok(draft) => draft,
            Err(err) => {
                return SubmitOutcome::rejected(Notice::destructive(
                    "Missing information",
                    err.to_string(),
                ))
            }
        };
        let Some(image) = self.form.image.as_ref() else {
            return SubmitOutcome::rejected(Notice::destructive(
                "Missing information",
                "Please fill in all fields and add an image.",
            ));
        };

        match store.add(&draft, image) {
            Ok(_) => {
                self.form = AdminForm::default();
                SubmitOutcome {
                    notice: Notice::info(
                        "Memory added",
                        format!(
                            "The new memory has been successfully added to {} timeline and gallery.",
                            possessive(&self.child_name)
                        ),
                    ),
                    redirect: Some(Redirect {
                        route: Route::Timeline,
                        after: REDIRECT_DELAY,
                    }),
                }
            }
            Err(err) => SubmitOutcome::rejected(failure_notice(&err)),
        }
    }
}

fn failure_notice(err: &RepoError) -> Notice {
    match err {
        RepoError::Validation(inner) => Notice::destructive("Missing information", inner.to_string()),
        RepoError::Upload(_) => Notice::destructive(
            "Upload failed",
            "The photo could not be uploaded. Please try again.",
        ),
        RepoError::Insert(_) => Notice::destructive(
            "Save failed",
            "The photo was uploaded but the memory could not be saved. Please try again.",
        ),
        RepoError::RemoteRead(_) => Notice::destructive(
            "Refresh failed",
            "The memory was saved but the list could not be reloaded.",
        ),
    }
}
