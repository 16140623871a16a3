//! Console frame viewer.
//!
//! Demonstrates:
//! - Spawning a viewer with a logging renderer
//! - Subscribing to viewer events
//! - Optionally serving demo frames from a local frame server
//!
//! Usage:
//!   cargo run --example console_viewer
//!   cargo run --example console_viewer -- --url ws://192.168.1.20:8765
//!   cargo run --example console_viewer -- --serve
//!   cargo run --example console_viewer -- --debug

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use edge_viewer::{Frame, LogRenderer, Result, ViewerClient, ViewerEvent};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

const SERVE_INTERVAL: Duration = Duration::from_millis(200);

// ============================================================================
// Args
// ============================================================================

#[derive(Debug, Clone)]
struct Args {
    debug: bool,
    serve: bool,
    url: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let url = args
            .iter()
            .position(|a| a == "--url")
            .and_then(|i| args.get(i + 1))
            .cloned();

        Self {
            debug: args.iter().any(|a| a == "--debug"),
            serve: args.iter().any(|a| a == "--serve"),
            url,
        }
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== Console Viewer ===\n");

    let url = if args.serve {
        let port = serve_demo_frames().await?;
        println!("[Setup] Serving demo frames on port {port}\n");
        format!("ws://127.0.0.1:{port}")
    } else {
        args.url.unwrap_or_else(|| "ws://localhost:8765".to_string())
    };

    println!("[1] Spawning viewer...");
    println!("    URL: {url}");

    let viewer = ViewerClient::builder()
        .url(url)
        .renderer(LogRenderer)
        .spawn()?;

    println!("    ✓ Viewer running\n");
    println!("Press Ctrl+C to exit...\n");

    let mut events = viewer.subscribe();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(ViewerEvent::RetriesExhausted { attempts }) => {
                    println!("[!] Gave up after {attempts} attempts");
                    break;
                }
                Ok(ViewerEvent::FrameRejected { reason }) => {
                    println!("[!] Frame rejected: {reason}");
                }
                Ok(_) => {}
                Err(_) => break,
            },

            _ = tokio::signal::ctrl_c() => break,
        }
    }

    let stats = viewer.stats();
    println!("\n[Summary]");
    println!("    Frames:  {}", stats.formatted().frame_count);
    println!("    FPS:     {}", stats.formatted().fps);
    println!("    Status:  {:?}", viewer.status());

    viewer.shutdown();
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn init_logging(debug: bool) {
    let filter = if debug {
        "edge_viewer=debug"
    } else {
        "edge_viewer=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

/// Starts a local frame server that streams the demo frame.
async fn serve_demo_frames() -> Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    let payload = Frame::demo()?.to_base64();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let payload = payload.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };

                // Wait for the viewer's handshake.
                if ws.next().await.is_none() {
                    return;
                }

                let mut counter = 0u64;
                loop {
                    counter += 1;
                    let message = serde_json::json!({
                        "type": "frame",
                        "data": payload,
                        "stats": { "processingTime": 5.0 + (counter % 50) as f64 / 10.0 },
                    });
                    if ws.send(Message::Text(message.to_string().into())).await.is_err() {
                        return;
                    }
                    tokio::time::sleep(SERVE_INTERVAL).await;
                }
            });
        }
    });

    Ok(port)
}
