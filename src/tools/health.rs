use schemars::JsonSchema;
use serde::Deserialize;

use crate::server::ServerState;

#[derive(Debug, Deserialize, JsonSchema, Default)]
pub struct HealthParams {
    #[serde(default)]
    pub verbose: bool,
}

pub async fn health_summary(state: &ServerState, verbose: bool) -> String {
    let uptime = state.uptime();
    let active = state.transports.active_endpoints();
    let transports = if active.is_empty() {
        "none".to_string()
    } else {
        active.join(", ")
    };
    if verbose {
        let counts = state.store.counts().await;
        format!(
            "status: ok\nversion: {}\nuptime_seconds: {}\ntransports: {}\nlatency_simulated: {}\nauth_backend: {}\nmembers: {}\nevents: {}\ndonations: {}\nprograms: {}",
            state.version,
            uptime.as_secs(),
            transports,
            !state.store.latency().is_disabled(),
            state
                .auth
                .as_ref()
                .map(|a| a.api_url.as_str())
                .unwrap_or("not configured"),
            counts.members,
            counts.events,
            counts.donations,
            counts.programs,
        )
    } else {
        format!(
            "ok (v{}, uptime {}s, transports: {})",
            state.version,
            uptime.as_secs(),
            transports
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::TransportSummary;
    use crate::store::{Latency, TempleStore};

    #[tokio::test]
    async fn summary_mentions_transports() {
        let state = ServerState::new(
            TempleStore::seeded(Latency::none()),
            None,
            TransportSummary {
                stdio: true,
                http: None,
            },
        );
        let short = health_summary(&state, false).await;
        assert!(short.starts_with("ok (v"));
        assert!(short.contains("transports: stdio"));

        let long = health_summary(&state, true).await;
        assert!(long.contains("members: 3"));
        assert!(long.contains("auth_backend: not configured"));
        assert!(long.contains("latency_simulated: false"));
    }
}
