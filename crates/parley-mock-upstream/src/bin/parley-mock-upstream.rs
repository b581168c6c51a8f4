use parley_mock_upstream::{router, MockUpstreamConfig, UpstreamBehavior};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: parley-mock-upstream [--behavior echo|slow|fail] [--port N] \
                     [--chunk-delay MS] [--chunk-chars N]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = MockUpstreamConfig::default();
    let mut port: u16 = 5000;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--behavior" => {
                let value = args.next().unwrap_or_default();
                config.behavior = UpstreamBehavior::from_str(&value).unwrap_or_else(|| {
                    eprintln!("Unknown behavior: {value}");
                    eprintln!("Valid behaviors: echo, slow, fail");
                    std::process::exit(1);
                });
            }
            "--port" => port = parse_number(args.next(), "--port"),
            "--chunk-delay" => {
                config.chunk_delay = Duration::from_millis(parse_number(args.next(), "--chunk-delay"));
            }
            "--chunk-chars" => config.chunk_chars = parse_number(args.next(), "--chunk-chars"),
            "--help" | "-h" => {
                println!("{USAGE}");
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {other}");
                eprintln!("{USAGE}");
                std::process::exit(1);
            }
        }
    }

    let addr = format!("127.0.0.1:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        address = %addr,
        behavior = config.behavior.as_str(),
        "Mock upstream listening on http://{addr}/api/chat"
    );

    axum::serve(listener, router(config)).await?;
    Ok(())
}

fn parse_number<N: std::str::FromStr>(value: Option<String>, flag: &str) -> N {
    let value = value.unwrap_or_default();
    value.parse().unwrap_or_else(|_| {
        eprintln!("Invalid value for {flag}: {value}");
        std::process::exit(1);
    })
}
