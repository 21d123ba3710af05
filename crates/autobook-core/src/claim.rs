//! Claim sequencer: authenticate, then book, as one logical transaction.
//!
//! Login happens only here, after a class has been selected, and its token
//! is used for exactly one booking call (plus write-profile retries on
//! ambiguous failures). Definite rejections end the run as they are.

use crate::config::Settings;
use crate::events::RunEvent;
use crate::model::{CandidateItem, ClaimFailure, Outcome, Session};
use crate::poll::RunContext;
use crate::retry::{run_with_retry, ApiError, Rejection};

pub struct ClaimSequencer<'a> {
    ctx: RunContext<'a>,
    settings: &'a Settings,
}

impl<'a> ClaimSequencer<'a> {
    pub fn new(ctx: RunContext<'a>, settings: &'a Settings) -> Self {
        Self { ctx, settings }
    }

    pub fn claim(&self, item: &CandidateItem) -> Outcome {
        let RunContext {
            client,
            clock,
            cancel,
            observer,
        } = self.ctx;

        let login = run_with_retry(&self.settings.read_retry, "login", clock, cancel, || {
            client.authenticate(&self.settings.credentials)
        });
        let session = match login {
            Ok(bearer_token) => Session {
                bearer_token,
                obtained_at: clock.now(),
            },
            Err(ApiError::Interrupted) => return Outcome::Interrupted,
            Err(e) => {
                observer.on_event(&RunEvent::AuthFailed {
                    error: e.to_string(),
                });
                return Outcome::AuthFailed;
            }
        };
        observer.on_event(&RunEvent::Authenticated);

        let booked = run_with_retry(&self.settings.write_retry, "booking", clock, cancel, || {
            client.claim(&item.id, &session)
        });
        match booked {
            Ok(confirmation_id) => Outcome::Booked {
                item_id: item.id.clone(),
                confirmation_id,
            },
            Err(ApiError::Interrupted) => Outcome::Interrupted,
            Err(e) => {
                observer.on_event(&RunEvent::ClaimRejected {
                    error: e.to_string(),
                });
                Outcome::ClaimFailed(claim_failure(&e))
            }
        }
    }
}

fn claim_failure(e: &ApiError) -> ClaimFailure {
    match e.rejection() {
        Some(Rejection::Conflict) => ClaimFailure::Conflict,
        Some(Rejection::TokenExpired) => ClaimFailure::TokenExpired,
        Some(Rejection::Forbidden) | Some(Rejection::InvalidCredentials) => ClaimFailure::Forbidden,
        None => ClaimFailure::Unknown,
    }
}
