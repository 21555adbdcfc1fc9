use dotenvy::dotenv;
use site_ledger::{
    config::{settings, storage},
    core::{aggregate, dues, report},
    errors::Result,
    store::SharedStore,
};
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

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load settings, falling back to defaults when config.toml is absent
    let settings = settings::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Load the persisted ledger state
    let storage_path = storage::get_storage_path(&settings.storage);
    let ledger = SharedStore::load(&storage_path)
        .await
        .inspect(|_| info!("Ledger state loaded from {:?}", storage_path))
        .inspect_err(|e| error!("Failed to load ledger state: {}", e))?;

    // 5. Log the dashboard summary
    let store = ledger.read().await;
    let symbol = settings.display.currency_symbol.as_str();

    let flow = aggregate::cash_flow(&store.transactions);
    info!(
        inflow = %report::format_currency_with(symbol, flow.inflow),
        outflow = %report::format_currency_with(symbol, flow.outflow),
        net = %report::format_currency_with(symbol, flow.net),
        loans = %report::format_currency_with(symbol, flow.loans),
        "Cash flow"
    );

    let overview = dues::dues_overview(&store.transactions);
    info!(
        total_due = %report::format_currency_with(symbol, overview.total_due),
        paid = %report::format_currency_with(symbol, overview.total_paid),
        remaining = %report::format_currency_with(symbol, overview.total_remaining),
        pending = overview.pending,
        partially_paid = overview.partially_paid,
        fully_paid = overview.fully_paid,
        "Dues"
    );

    let recent = aggregate::recent_transactions(&store.transactions, settings.display.recent_limit);
    for transaction in recent {
        info!(
            date = %report::format_display_date(Some(&transaction.date)),
            "{}",
            report::format_transaction_summary(transaction)
        );
    }

    Ok(())
}
