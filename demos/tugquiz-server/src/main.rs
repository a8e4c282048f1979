//! Runnable Tugquiz server with the reference tug-of-war trivia engine.
//!
//! ```text
//! TUGQUIZ_ADDR=0.0.0.0:9090 RUST_LOG=info cargo run -p tugquiz-server
//! ```

use tracing_subscriber::EnvFilter;

use tugquiz::{TugquizError, TugquizServer};
use tugquiz_resistance::ResistanceFactory;

#[tokio::main]
async fn main() -> Result<(), TugquizError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("TUGQUIZ_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:9090".to_string());

    let server = TugquizServer::builder()
        .bind(&addr)
        .build(ResistanceFactory)
        .await?;

    tracing::info!(addr = %server.local_addr()?, "tugquiz listening");
    server.run().await
}
