//! `autobook run`: poll until booked, out of time, or interrupted.

use anyhow::Result;
use autobook_core::clock::SystemClock;
use autobook_core::config::Settings;
use autobook_core::events::TracingObserver;
use autobook_core::model::Outcome;
use autobook_core::poll::{Poller, RunContext};
use std::process::ExitCode;

use super::{api_client, cancel_on_ctrl_c};
use crate::cli::EXIT_FAILURE;

/// Conventional status for a run stopped by SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

pub async fn run_booking(settings: Settings) -> Result<ExitCode> {
    let (cancel, signal_task) = cancel_on_ctrl_c();

    // The engine is blocking (curl, condvar sleeps); keep it off the runtime.
    let outcome = tokio::task::spawn_blocking(move || {
        let client = api_client(&settings);
        let ctx = RunContext {
            client: &client,
            clock: &SystemClock,
            cancel: &cancel,
            observer: &TracingObserver,
        };
        Poller::new(ctx, &settings).run()
    })
    .await?;
    signal_task.abort();

    println!("{}", outcome);
    Ok(exit_code(&outcome))
}

fn exit_code(outcome: &Outcome) -> ExitCode {
    ExitCode::from(exit_status(outcome))
}

pub(crate) fn exit_status(outcome: &Outcome) -> u8 {
    match outcome {
        Outcome::Booked { .. } => 0,
        Outcome::Interrupted => EXIT_INTERRUPTED,
        Outcome::NoMatchFound | Outcome::AuthFailed | Outcome::ClaimFailed(_) => EXIT_FAILURE,
    }
}
