//! View state and its reducer-like transitions.
//!
//! `ViewState::apply` is the only place view state changes. It never performs
//! I/O; work that must happen outside the state (signing in or out, calling
//! the enrichment endpoint) is returned as an [`Effect`] whose completion is
//! fed back as another [`Event`].

use shared::{
    domain::Identity,
    protocol::{EnrichRequest, EnrichedResult},
};
use tracing::{debug, info, warn};

use crate::error::{EnrichError, SessionError, LOGIN_FAILED_MESSAGE, LOGOUT_FAILED_MESSAGE};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub company_name: String,
    pub website_url: String,
}

impl FormInput {
    pub fn new(company_name: impl Into<String>, website_url: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            website_url: website_url.into(),
        }
    }

    pub fn to_request(&self) -> EnrichRequest {
        EnrichRequest::new(self.company_name.clone(), self.website_url.clone())
    }
}

#[derive(Debug)]
pub enum Event {
    IdentityChanged(Option<Identity>),
    LoginRequested,
    LoginSettled(Result<(), SessionError>),
    LogoutRequested,
    LogoutSettled(Result<(), SessionError>),
    CompanyNameEdited(String),
    WebsiteUrlEdited(String),
    SubmitRequested(FormInput),
    SubmitSettled {
        generation: u64,
        outcome: Result<EnrichedResult, EnrichError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SignIn,
    SignOut,
    Enrich {
        generation: u64,
        request: EnrichRequest,
    },
}

/// Submission lifecycle derived from the stored fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase<'a> {
    Idle,
    Loading,
    Success(&'a EnrichedResult),
    Error(&'a str),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub identity: Option<Identity>,
    pub form: FormInput,
    pub result: Option<EnrichedResult>,
    pub is_loading: bool,
    pub login_error: Option<String>,
    pub logout_error: Option<String>,
    pub submit_error: Option<String>,
    generation: u64,
}

impl ViewState {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    /// The submit control is only live for a signed-in user with no request in flight.
    pub fn can_submit(&self) -> bool {
        self.is_signed_in() && !self.is_loading
    }

    pub fn phase(&self) -> Phase<'_> {
        if self.is_loading {
            Phase::Loading
        } else if let Some(result) = &self.result {
            Phase::Success(result)
        } else if let Some(message) = &self.submit_error {
            Phase::Error(message)
        } else {
            Phase::Idle
        }
    }

    /// Error lines in display order.
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        [&self.login_error, &self.logout_error, &self.submit_error]
            .into_iter()
            .filter_map(|message| message.as_deref())
    }

    pub fn apply(&mut self, event: Event) -> Option<Effect> {
        match event {
            Event::IdentityChanged(identity) => {
                debug!(
                    uid = identity.as_ref().map(|id| id.uid.0.as_str()),
                    "view: identity changed"
                );
                self.identity = identity;
                None
            }
            Event::LoginRequested => {
                self.login_error = None;
                Some(Effect::SignIn)
            }
            Event::LoginSettled(Ok(())) => {
                debug!("view: sign-in completed, waiting for identity update");
                None
            }
            Event::LoginSettled(Err(error)) => {
                warn!(%error, "view: sign-in failed");
                self.login_error = Some(LOGIN_FAILED_MESSAGE.to_string());
                None
            }
            Event::LogoutRequested => {
                // Cleared before sign-out starts so stale data never outlives the session.
                self.result = None;
                self.is_loading = false;
                self.logout_error = None;
                self.generation += 1;
                Some(Effect::SignOut)
            }
            Event::LogoutSettled(Ok(())) => None,
            Event::LogoutSettled(Err(error)) => {
                warn!(%error, "view: sign-out failed");
                self.logout_error = Some(LOGOUT_FAILED_MESSAGE.to_string());
                None
            }
            Event::CompanyNameEdited(value) => {
                if !self.is_loading {
                    self.form.company_name = value;
                }
                None
            }
            Event::WebsiteUrlEdited(value) => {
                if !self.is_loading {
                    self.form.website_url = value;
                }
                None
            }
            Event::SubmitRequested(input) => {
                if self.is_loading {
                    debug!(
                        generation = self.generation,
                        "view: submission already in flight, ignoring"
                    );
                    return None;
                }
                self.form = input;
                self.is_loading = true;
                self.login_error = None;
                self.logout_error = None;
                self.submit_error = None;
                self.result = None;
                self.generation += 1;
                info!(generation = self.generation, "view: submission started");
                Some(Effect::Enrich {
                    generation: self.generation,
                    request: self.form.to_request(),
                })
            }
            Event::SubmitSettled {
                generation,
                outcome,
            } => {
                if generation != self.generation {
                    debug!(
                        generation,
                        current = self.generation,
                        "view: discarding stale submission outcome"
                    );
                    return None;
                }
                match outcome {
                    Ok(result) => {
                        info!(generation, company_name = %result.company_name, "view: enrichment received");
                        self.result = Some(result);
                    }
                    Err(error) => {
                        warn!(generation, %error, "view: enrichment failed");
                        self.submit_error = Some(error.user_message());
                    }
                }
                self.is_loading = false;
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
