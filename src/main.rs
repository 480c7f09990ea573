use mimalloc::MiMalloc;
use tracing::info;
use trapstore::{Config, Store};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv_override().ok();

    let cfg = Config::from_env()?;
    trapstore::logging::init(&cfg.log)?;

    info!(
        host = %cfg.db.host,
        port = cfg.db.port,
        database = %cfg.db.database,
        pool_size = cfg.db.pool_size,
        loglevel = %cfg.log.loglevel
    );

    let store = Store::connect(&cfg.db).await?;
    store.init_schema().await?;

    let users = store.all_users().await?;
    let trapped = store.all_trapped().await?;
    let feedback = store.all_feedback().await?;
    info!(
        users = users.count,
        trapped = trapped.count,
        feedback = feedback.count,
        "Table summary"
    );

    let report = serde_json::json!({
        "users": users.count,
        "trapped": trapped.count,
        "feedback": feedback.count,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    store.executor().pool().close().await;
    Ok(())
}
