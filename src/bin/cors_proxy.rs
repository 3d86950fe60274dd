use anyhow::{Context, Result};
use tokio::net::TcpListener;

use nfl_probability::config::{self, ProxyConfig};
use nfl_probability::proxy;

#[tokio::main]
async fn main() -> Result<()> {
    config::load_dotenv();
    let cfg = ProxyConfig::from_process()?;
    let addr = cfg.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    println!("{}", "=".repeat(60));
    println!("NFL API Proxy Server");
    println!("{}", "=".repeat(60));
    println!("Server running on http://localhost:{}", cfg.port);
    println!("Forwarding GET /?url=<upstream> with CORS headers");
    println!();
    println!("Press Ctrl+C to stop the server.");
    println!("{}", "=".repeat(60));

    proxy::serve(listener, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;

    println!("Server stopped.");
    Ok(())
}
