//! CLI command handlers, one per file.

mod check;
mod run;
mod search;

pub use check::run_check;
pub use run::run_booking;
pub use search::run_search;

use std::sync::Arc;

use autobook_core::api::ApiClient;
use autobook_core::config::Settings;
use autobook_core::control::CancelToken;
use autobook_core::http::CurlTransport;
use tokio::task::JoinHandle;

fn api_client(settings: &Settings) -> ApiClient {
    let transport = CurlTransport::new(settings.connect_timeout, settings.request_timeout);
    ApiClient::new(Arc::new(transport), settings.api.clone())
}

/// Cancel token that Ctrl-C trips. Abort the handle once the work is done.
fn cancel_on_ctrl_c() -> (CancelToken, JoinHandle<()>) {
    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    let task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping");
            on_signal.cancel();
        }
    });
    (cancel, task)
}
