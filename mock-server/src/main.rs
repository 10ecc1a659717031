use mock_server::ApiKeys;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let keys = ApiKeys::new(
        std::env::var("MJ_APIKEY_PUBLIC").unwrap_or_default(),
        std::env::var("MJ_APIKEY_PRIVATE").unwrap_or_default(),
    );
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    mock_server::run(listener, keys).await
}
