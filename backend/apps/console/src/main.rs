//! Console Entry Point
//!
//! Headless driver for the admin-console auth subsystem: wires the REST
//! identity provider, the session bridge (privileged helper when
//! configured, direct otherwise), and the auth controller, then exposes
//! a small line-oriented command loop for the UI shell to talk to.
//!
//! Commands on stdin:
//!   login <email> <password>
//!   logout
//!   activity
//!   stay
//!   status
//!   quit

use anyhow::Context;
use auth::{
    ActivitySignal, AuthConfig, AuthController, AuthEvent, DirectBridge, FallbackBridge,
    ProcessBridge, RemoteConfig, RestIdentityProvider, SecretStore, StdioTransport,
};
use std::env;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Optional helper command line, e.g. `schooldesk-helper --elevated`
const ENV_BRIDGE_HELPER: &str = "SCHOOLDESK_BRIDGE_HELPER";
/// Optional base64 32-byte secret for direct-path token signing
const ENV_SESSION_SECRET: &str = "SCHOOLDESK_SESSION_SECRET";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "console=info,auth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let remote = RemoteConfig::from_env()
        .context("Remote backend is not configured; see .env.example")?;
    let store = Arc::new(SecretStore::open_default()?);

    let config = AuthConfig {
        session_secret: load_session_secret()?,
        ..AuthConfig::default()
    };

    // Session bridge: helper process when configured, direct path otherwise
    let direct = DirectBridge::new(&remote, config.session_secret, store.dir().to_path_buf());
    let helper = match env::var(ENV_BRIDGE_HELPER) {
        Ok(command_line) if !command_line.is_empty() => {
            let mut parts = command_line.split_whitespace().map(String::from);
            let program = parts.next().unwrap_or_default();
            let args: Vec<String> = parts.collect();
            match StdioTransport::spawn(&program, &args) {
                Ok(transport) => Some(ProcessBridge::new(transport)),
                Err(e) => {
                    tracing::warn!(error = %e, "Bridge helper unusable, running direct");
                    None
                }
            }
        }
        _ => None,
    };
    let bridge = Arc::new(FallbackBridge::new(helper, direct));

    let provider = Arc::new(RestIdentityProvider::new(remote));
    let controller = AuthController::new(provider, bridge, store, config)?;

    // Print the event stream for the UI shell
    let mut events = controller.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                AuthEvent::StateChanged(state) => println!("state: {state:?}"),
                AuthEvent::InactivityWarning { remaining_secs } => {
                    println!("warning: session expires in {remaining_secs}s");
                }
                AuthEvent::InactivityTick { remaining_secs } => {
                    println!("countdown: {remaining_secs}s");
                }
                AuthEvent::SessionExpired => println!("expired: signed out from inactivity"),
            }
        }
    });

    // Silent login before showing the form
    match controller.try_auto_login().await {
        Ok(Some(identity)) => tracing::info!(uid = %identity.uid, "Auto-login succeeded"),
        Ok(None) => tracing::info!("No resumable session"),
        Err(e) => eprintln!("{}", e.user_message()),
    }

    run_command_loop(&controller).await
}

async fn run_command_loop<P, B>(controller: &Arc<AuthController<P, B>>) -> anyhow::Result<()>
where
    P: auth::IdentityProvider + Send + Sync + 'static,
    B: auth::SessionBridge + Send + Sync + 'static,
{
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("login") => {
                let (Some(email), Some(password)) = (parts.next(), parts.next()) else {
                    eprintln!("usage: login <email> <password>");
                    continue;
                };
                match controller.sign_in(email, password).await {
                    Ok(identity) => println!("signed in as {} ({})", identity.email, identity.uid),
                    Err(e) => eprintln!("{}", e.user_message()),
                }
            }
            Some("logout") => {
                if let Err(e) = controller.sign_out().await {
                    eprintln!("{}", e.user_message());
                }
            }
            Some("activity") => controller.record_activity(ActivitySignal::PointerMove),
            Some("stay") => controller.stay_signed_in(),
            Some("status") => println!("state: {:?}", controller.state()),
            Some("quit") => break,
            Some(other) => eprintln!("unknown command: {other}"),
            None => {}
        }
    }

    controller.sign_out().await.ok();
    Ok(())
}

fn load_session_secret() -> anyhow::Result<[u8; 32]> {
    match env::var(ENV_SESSION_SECRET) {
        Ok(encoded) if !encoded.is_empty() => {
            let bytes = platform::crypto::from_base64(encoded.trim())
                .context("Session secret is not valid base64")?;
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| anyhow::anyhow!("Session secret must decode to exactly 32 bytes"))
        }
        _ => {
            // Tokens signed with an ephemeral secret stop verifying after
            // a restart; fine for development
            tracing::warn!("No session secret configured, using an ephemeral one");
            Ok(AuthConfig::with_random_secret().session_secret)
        }
    }
}
