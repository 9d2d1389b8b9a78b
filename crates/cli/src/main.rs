use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use callreach_core::{ContactDirectory, NullContactDirectory};
use callreach_http::{create_router, AppState};
use callreach_service::{CallLifecycleService, ProviderFallback};
use callreach_storage::CallStore;
use callreach_telephony::{
    FileContactDirectory, ProviderClient, TelephonyConfig, VoicemailDelivery,
};

#[derive(Parser)]
#[command(name = "callreach")]
#[command(about = "Call status tracking with voicemail and SMS fallback", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook receiver and query API.
    Serve {
        #[arg(short, long, default_value = "3000")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Print one call record as JSON.
    Get { call_sid: String },
    /// Print all call records.
    List,
    /// Leave a voicemail directly, outside the webhook flow.
    Voicemail {
        phone: String,
        #[arg(short, long)]
        message: Option<String>,
    },
}

fn get_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("callreach")
        .join("callreach.db")
}

fn contact_directory(config: &TelephonyConfig) -> Arc<dyn ContactDirectory> {
    match &config.contacts_dir {
        Some(dir) => Arc::new(FileContactDirectory::new(dir.clone())),
        None => Arc::new(NullContactDirectory),
    }
}

/// Wire up the full lifecycle service. Requires provider credentials in
/// the environment; `get` and `list` read the store directly instead.
fn build_lifecycle(store: Arc<CallStore>) -> Result<Arc<CallLifecycleService>> {
    let config = TelephonyConfig::from_env()?;
    let contacts = contact_directory(&config);
    let client = Arc::new(ProviderClient::new(&config)?);
    let voicemail = VoicemailDelivery::new(Arc::clone(&client), Arc::clone(&contacts), &config);
    let actions = Arc::new(ProviderFallback::new(voicemail, client));
    Ok(Arc::new(CallLifecycleService::new(
        store,
        actions,
        contacts,
        config.from_number.clone(),
    )))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let db_path = get_db_path();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let store = Arc::new(CallStore::new(&db_path)?);

    match cli.command {
        Commands::Serve { port, host } => {
            let lifecycle = build_lifecycle(store)?;
            let router = create_router(Arc::new(AppState { lifecycle }));
            let addr = format!("{host}:{port}");
            tracing::info!("Starting HTTP server on {addr}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, router).await?;
        }
        Commands::Get { call_sid } => match store.get(&call_sid)? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => println!("Call status not found: {call_sid}"),
        },
        Commands::List => {
            let records = store.list_all()?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Voicemail { phone, message } => {
            let lifecycle = build_lifecycle(store)?;
            let sid = lifecycle.send_direct_voicemail(&phone, message.as_deref()).await?;
            println!("Voicemail initiated: {sid}");
        }
    }

    Ok(())
}
