use mock_container::HostMode;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let mode: HostMode = std::env::var("HOST_MODE")
        .unwrap_or_else(|_| "android".to_string())
        .parse()?;
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    log::info!("mock container ({mode:?}) listening on {addr}");
    mock_container::run(listener, mode).await?;
    Ok(())
}
