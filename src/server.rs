use std::{
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto::Builder as HyperBuilder,
    service::TowerToHyperService,
};
use rmcp::{
    ServiceExt,
    transport::{
        stdio,
        streamable_http_server::{
            StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
        },
    },
};
use tokio::{net::TcpListener, task::JoinSet};
use tokio_util::sync::CancellationToken;

use crate::{
    auth_client::AuthConfig,
    cli::CommandArguments,
    error::{ServiceError, ServiceResult},
    handler::TempleToolHandler,
    metadata::PKG_VERSION,
    store::TempleStore,
};

/// Which transports this process listens on.
#[derive(Clone, Debug, Default)]
pub struct TransportSummary {
    pub stdio: bool,
    pub http: Option<SocketAddr>,
}

impl TransportSummary {
    pub fn active_endpoints(&self) -> Vec<String> {
        let mut endpoints = Vec::new();
        if self.stdio {
            endpoints.push("stdio".to_string());
        }
        if let Some(addr) = self.http {
            endpoints.push(format!("http://{addr}"));
        }
        endpoints
    }
}

/// State shared by every MCP session of one process.
#[derive(Debug)]
pub struct ServerState {
    pub store: TempleStore,
    pub auth: Option<AuthConfig>,
    pub version: &'static str,
    pub transports: TransportSummary,
    started_at: Instant,
}

impl ServerState {
    pub fn new(store: TempleStore, auth: Option<AuthConfig>, transports: TransportSummary) -> Self {
        Self {
            store,
            auth,
            version: PKG_VERSION,
            transports,
            started_at: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

pub async fn start_server(args: CommandArguments) -> ServiceResult<()> {
    args.validate().map_err(ServiceError::Config)?;

    let store = if args.empty {
        TempleStore::empty(args.to_latency())
    } else {
        TempleStore::seeded(args.to_latency())
    };

    // Bind first so the summary reports the real port when 0 was requested.
    let http_listener = if args.enable_http {
        let addr: SocketAddr = args
            .http_addr
            .parse()
            .map_err(|e| ServiceError::Config(format!("Invalid TEMPLE_HTTP_ADDR: {e}")))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServiceError::FromString(format!("HTTP listen error: {e}")))?;
        Some(listener)
    } else {
        None
    };

    let transports = TransportSummary {
        stdio: args.enable_stdio,
        http: match &http_listener {
            Some(listener) => Some(listener.local_addr()?),
            None => None,
        },
    };
    let state = Arc::new(ServerState::new(store, args.auth_config(), transports));
    tracing::info!(
        version = state.version,
        transports = %state.transports.active_endpoints().join(", "),
        latency = !state.store.latency().is_disabled(),
        "starting temple admin server"
    );

    let shutdown = CancellationToken::new();
    let mut tasks: JoinSet<ServiceResult<()>> = JoinSet::new();

    if args.enable_stdio {
        let state = state.clone();
        tasks.spawn(async move {
            let service = TempleToolHandler::new(state)
                .serve(stdio())
                .await
                .map_err(|e| ServiceError::FromString(format!("Stdio server error: {e}")))?;
            service
                .waiting()
                .await
                .map_err(|e| ServiceError::FromString(format!("Stdio server error: {e}")))?;
            tracing::info!("stdio session closed");
            Ok(())
        });
    }

    if let Some(listener) = http_listener {
        let state = state.clone();
        let shutdown = shutdown.clone();
        tasks.spawn(serve_http(listener, state, shutdown));
    }

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown requested");
                shutdown.cancel();
            }
        });
    }

    while let Some(res) = tasks.join_next().await {
        res.map_err(|e| ServiceError::FromString(format!("Task join error: {e}")))??;
        if tasks.is_empty() || shutdown.is_cancelled() {
            break;
        }
    }
    shutdown.cancel();
    tasks.shutdown().await;

    Ok(())
}

async fn serve_http(
    listener: TcpListener,
    state: Arc<ServerState>,
    shutdown: CancellationToken,
) -> ServiceResult<()> {
    let service = StreamableHttpService::new(
        move || Ok(TempleToolHandler::new(state.clone())),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig::default(),
    );

    loop {
        let (stream, peer) = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => accepted
                .map_err(|e| ServiceError::FromString(format!("HTTP accept error: {e}")))?,
        };
        tracing::debug!(%peer, "http connection");
        let svc = service.clone();
        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let hyper_svc = TowerToHyperService::new(svc);
            if let Err(err) = HyperBuilder::new(TokioExecutor::new())
                .serve_connection(io, hyper_svc)
                .await
            {
                tracing::warn!("HTTP connection error: {err}");
            }
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Latency;

    #[test]
    fn endpoints_list_enabled_transports() {
        let none = TransportSummary::default();
        assert!(none.active_endpoints().is_empty());

        let both = TransportSummary {
            stdio: true,
            http: Some("127.0.0.1:8080".parse().unwrap()),
        };
        assert_eq!(
            both.active_endpoints(),
            vec!["stdio".to_string(), "http://127.0.0.1:8080".to_string()]
        );
    }

    #[test]
    fn state_reports_package_version() {
        let state = ServerState::new(
            TempleStore::empty(Latency::none()),
            None,
            TransportSummary::default(),
        );
        assert_eq!(state.version, PKG_VERSION);
        assert!(state.uptime() < Duration::from_secs(5));
    }
}
