use axum::Router;
use clap::Parser;

use tvview::media::root::LibraryRoot;
use tvview::{cli, config, http};

/// Wait for the first Ctrl+C (graceful shutdown). A second Ctrl+C while open
/// responses drain force-exits; a running transcode can otherwise hold
/// shutdown open indefinitely.
async fn wait_for_shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\ntvview: forced exit");
            std::process::exit(1);
        }
    });
}

/// Acquire the OS hostname safely, falling back to "localhost" if unavailable.
fn get_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|os| os.into_string().ok())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// LAN address of the default route, for the "open this on your phone" hint.
/// Connecting a UDP socket sends nothing; it only selects the outgoing interface.
fn local_ip() -> Option<std::net::IpAddr> {
    let socket = std::net::UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        )
        .init();

    let args = cli::Args::parse();

    let file_config = config::find_config_file(args.config.as_deref())
        .and_then(|path| {
            match config::load_config(&path) {
                Ok(cfg) => {
                    tracing::debug!("Loaded config from {}", path.display());
                    Some(cfg)
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file: {}", e);
                    None
                }
            }
        });

    let config = config::Config::resolve(file_config, &args).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(2);
    });

    let root = LibraryRoot::new(&config.root).unwrap_or_else(|e| {
        eprintln!("error: library root {}: {}", config.root.display(), e);
        std::process::exit(1);
    });

    match config.transcode.locate() {
        Some(path) => tracing::info!("Transcoding with {}", path.display()),
        None => tracing::warn!(
            "Encoder {} not found -- /stream requests will fail",
            config.transcode.encoder.display()
        ),
    }

    tracing::info!("tvview serving {} on port {}", root.path().display(), config.port);
    tracing::info!("Access on this machine: http://localhost:{}", config.port);
    if !config.localhost {
        match local_ip() {
            Some(ip) => tracing::info!(
                "Access from other devices: http://{}:{} ({})",
                ip,
                config.port,
                get_hostname()
            ),
            None => tracing::info!(
                "Access from other devices: http://{}:{}",
                get_hostname(),
                config.port
            ),
        }
    }

    let state = http::state::AppState::new(root, config.transcode);
    let app = http::build_router(state);

    if config.localhost {
        run_localhost(config.port, app).await;
    } else {
        run_dual_stack(config.port, app).await;
    }
}

/// Run a localhost-only HTTP server and wait for graceful shutdown.
async fn run_localhost(port: u16, app: Router) {
    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("error: failed to bind {}: {}", addr, e);
            std::process::exit(1);
        });
    tracing::info!("Listening on http://{} (localhost only)", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await
        .unwrap_or_else(|e| tracing::error!("HTTP server error: {}", e));

    tracing::info!("Goodbye.");
}

/// Run dual-stack (IPv4 + IPv6) HTTP server and wait for graceful shutdown.
async fn run_dual_stack(port: u16, app: Router) {
    // Separate IPv4 and IPv6 sockets. IPV6_V6ONLY must be set explicitly:
    // Linux defaults it to false, and binding ::: would then collide with 0.0.0.0.
    let ipv4_addr = format!("0.0.0.0:{}", port);
    let ipv4_listener = tokio::net::TcpListener::bind(&ipv4_addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("error: failed to bind IPv4 {}: {}", ipv4_addr, e);
            std::process::exit(1);
        });

    // IPv6 is best effort: hosts without it still serve IPv4.
    let ipv6_listener = match bind_ipv6(port) {
        Ok(listener) => Some(listener),
        Err(e) => {
            tracing::warn!("IPv6 listener unavailable on port {}: {}", port, e);
            None
        }
    };
    tracing::info!(
        "Listening on port {} ({})",
        port,
        if ipv6_listener.is_some() { "IPv4 + IPv6" } else { "IPv4" }
    );

    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(4);

    let mut http_v4_rx = shutdown_tx.subscribe();
    let v4_task = tokio::spawn({
        let app = app.clone();
        async move {
            axum::serve(ipv4_listener, app)
                .with_graceful_shutdown(async move { let _ = http_v4_rx.recv().await; })
                .await
                .unwrap_or_else(|e| tracing::error!("IPv4 server error: {}", e));
        }
    });
    let v6_task = ipv6_listener.map(|listener| {
        let mut http_v6_rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { let _ = http_v6_rx.recv().await; })
                .await
                .unwrap_or_else(|e| tracing::error!("IPv6 server error: {}", e));
        })
    });

    wait_for_shutdown().await;
    tracing::info!("Shutting down -- waiting for open responses to finish...");
    let _ = shutdown_tx.send(());

    // A client still watching a transcode keeps its connection open; see wait_for_shutdown.
    let _ = v4_task.await;
    if let Some(task) = v6_task {
        let _ = task.await;
    }
    tracing::info!("Goodbye.");
}

fn bind_ipv6(port: u16) -> std::io::Result<tokio::net::TcpListener> {
    let addr: std::net::SocketAddr = std::net::SocketAddr::new(
        std::net::IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED),
        port,
    );
    let socket = socket2::Socket::new(
        socket2::Domain::IPV6,
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;
    if let Err(e) = socket.set_only_v6(true) {
        tracing::warn!("Could not set IPV6_V6ONLY: {} -- dual-bind may fail on Linux", e);
    }
    if let Err(e) = socket.set_reuse_address(true) {
        tracing::warn!("Could not set SO_REUSEADDR on IPv6 socket: {}", e);
    }
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1024)?;
    let std_listener: std::net::TcpListener = socket.into();
    tokio::net::TcpListener::from_std(std_listener)
}
