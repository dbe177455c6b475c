use wgwatch_core::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may be set directly.
    let _ = dotenvy::dotenv();
    wgwatch::init_tracing();

    let config = AppConfig::load_with_env()?;
    match wgwatch::run(&config).await {
        Ok(notified) => {
            println!("Done. {notified} new listing(s) notified.");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}
