use billed::{
    config,
    context::ContainerContext,
    core::{BillLister, BillsScreen},
    diagnostics::TracingDiagnostics,
    errors::{Error, Result},
    routes::RecordingNavigator,
    session::{MemoryStorage, StorageSession},
    store::MemoryStore,
};
use dotenvy::dotenv;
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since variables can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;

    // 4. Seed the in-memory store
    let store = match &app_config.fixtures {
        Some(path) => MemoryStore::from_fixture_file(path)
            .inspect_err(|e| error!("Failed to load fixtures from {:?}: {}", path, e))?,
        None => {
            info!("No fixtures configured, starting with an empty store.");
            MemoryStore::new()
        }
    };

    // 5. Session: the user record comes from BILLED_USER
    let storage = MemoryStorage::new();
    let raw_user = env::var("BILLED_USER")
        .inspect_err(|e| error!("BILLED_USER not found: {}", e))
        .map_err(|e| Error::Session {
            message: format!("BILLED_USER: {e}"),
        })?;
    storage.set_item(app_config.session.storage_key.clone(), raw_user);
    let session = StorageSession::with_key(storage, app_config.session.storage_key.clone());

    let context = ContainerContext::new(
        Arc::new(store),
        Arc::new(session),
        Arc::new(RecordingNavigator::new()),
        Arc::new(TracingDiagnostics),
        Arc::new(app_config),
    );

    // 6. Render the bills screen
    let lister = BillLister::new(&context)?;
    match lister.load_screen().await {
        BillsScreen::Ready(views) => {
            println!("{:<12} {:<24} {:<24} {:>8}  Status", "Date", "Type", "Name", "Amount");
            for view in views {
                println!(
                    "{:<12} {:<24} {:<24} {:>6} €  {}",
                    view.date,
                    view.bill.expense_type.to_string(),
                    view.bill.name,
                    view.bill.amount,
                    view.status
                );
            }
        }
        BillsScreen::Failed { message } => {
            error!("Bills could not be loaded");
            eprintln!("{message}");
        }
    }

    Ok(())
}
