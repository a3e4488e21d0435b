use openweb_core::actions::ActionKind;
use openweb_core::adapters::mock::{MockCredentialStore, MockNavigator, MockTransport};
use openweb_core::auth::Credentials;
use openweb_core::config::SdkConfig;
use openweb_core::logging::init_logging;
use openweb_core::traits::{ScreenKind, ScreenOutput};
use openweb_core::ConversationSdk;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Concurrent actions fired with an expired token.
const CONCURRENT_ACTIONS: usize = 5;

fn main() -> Result<()> {
    if std::env::args().any(|arg| arg == "--version") {
        println!("openweb-playground {}", VERSION);
        std::process::exit(0);
    }

    color_eyre::install()?;
    if let Err(e) = init_logging() {
        eprintln!("Warning: {}", e);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run())
}

async fn run() -> Result<()> {
    let transport = Arc::new(MockTransport::requiring_bearer("fresh-token"));
    transport.set_latency(Duration::from_millis(10));

    let store = Arc::new(MockCredentialStore::with_credentials(
        Credentials::logged_in("u1", "expired-token").with_refresh_token("refresh-1"),
    ));
    store.set_refresh_result(Ok(
        Credentials::logged_in("u1", "fresh-token").with_refresh_token("refresh-2")
    ));
    store.set_refresh_latency(Duration::from_millis(50));

    let navigator = Arc::new(MockNavigator::new());

    let sdk = ConversationSdk::builder()
        .config(SdkConfig::from_env())
        .transport(transport.clone())
        .credential_store(store.clone())
        .navigation(navigator.clone())
        .build()?;

    // =========================================================
    // Coalescing: every action hits 401, one refresh serves all
    // =========================================================

    let actions = (0..CONCURRENT_ACTIONS).map(|i| {
        let sdk = sdk.clone();
        async move {
            sdk.perform_action(ActionKind::VoteComment, json!({ "comment_id": format!("c{}", i) }))
                .await
        }
    });
    let results = futures::future::join_all(actions).await;
    let succeeded = results.iter().filter(|result| result.is_ok()).count();

    println!(
        "{} of {} actions succeeded after {} refresh(es)",
        succeeded,
        CONCURRENT_ACTIONS,
        store.refresh_count()
    );

    // =========================================================
    // Gating: signed out, the action waits for the login flow
    // =========================================================

    sdk.reset_session();

    let pending = tokio::spawn({
        let sdk = sdk.clone();
        async move {
            sdk.perform_action(ActionKind::PostComment, json!({ "text": "Hello from the playground" }))
                .await
        }
    });

    let login = navigator
        .wait_for_top(ScreenKind::Login, Duration::from_secs(2))
        .await
        .ok_or_else(|| eyre!("login screen never appeared"))?;
    println!("Login screen shown ({})", login.id);

    navigator.complete_top(ScreenOutput::Credentials(Credentials::logged_in(
        "u1",
        "fresh-token",
    )));

    let response = pending.await??;
    println!("Comment posted with status {}", response.status);
    println!("Requests sent: {}", transport.request_count());

    Ok(())
}
