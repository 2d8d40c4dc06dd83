use std::{net::SocketAddr, time::Duration};

use clap::{Args, Parser, Subcommand};

use crate::{
    auth_client::{AuthConfig, DEFAULT_TIMEOUT},
    metadata::{PKG_DESCRIPTION, PKG_NAME, PKG_VERSION},
    store::Latency,
};

#[derive(Parser, Debug, Clone)]
#[command(name = PKG_NAME)]
#[command(version = PKG_VERSION)]
#[command(about = PKG_DESCRIPTION, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the MCP server
    Start(CommandArguments),
    /// Print analytics for the demo records as JSON
    Analytics,
    /// Print the demo records as JSON
    Seed,
    /// Show the resolved configuration
    Status(CommandArguments),
    /// Print version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct CommandArguments {
    /// Enable stdio transport
    #[arg(long, env = "TEMPLE_ENABLE_STDIO", default_value_t = true, action = clap::ArgAction::Set)]
    pub enable_stdio: bool,

    /// Enable streamable HTTP transport
    #[arg(long, env = "TEMPLE_ENABLE_HTTP", default_value_t = false, action = clap::ArgAction::Set)]
    pub enable_http: bool,

    /// Streamable HTTP bind address
    #[arg(long, env = "TEMPLE_HTTP_ADDR", default_value = "127.0.0.1:8080")]
    pub http_addr: String,

    /// Delay store calls like a remote backend would
    #[arg(long, env = "TEMPLE_SIMULATE_LATENCY", default_value_t = true, action = clap::ArgAction::Set)]
    pub simulate_latency: bool,

    /// Start without the demo records
    #[arg(long = "empty", env = "TEMPLE_EMPTY_STORE", default_value_t = false)]
    pub empty: bool,

    /// Auth backend origin; auth tools are disabled when unset
    #[arg(long, env = "TEMPLE_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token sent with every auth backend request
    #[arg(long, env = "TEMPLE_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Auth backend request timeout in seconds
    #[arg(long, env = "TEMPLE_API_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub api_timeout_secs: u64,
}

impl CommandArguments {
    pub fn default_settings() -> Self {
        Self {
            enable_stdio: true,
            enable_http: false,
            http_addr: "127.0.0.1:8080".to_string(),
            simulate_latency: true,
            empty: false,
            api_url: None,
            api_token: None,
            api_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }

    /// Validate CLI/environment-derived arguments.
    pub fn validate(&self) -> Result<(), String> {
        if !self.enable_stdio && !self.enable_http {
            return Err("Enable at least one transport (stdio or http)".to_string());
        }
        if self.enable_http {
            self.http_addr
                .parse::<SocketAddr>()
                .map_err(|e| format!("Invalid TEMPLE_HTTP_ADDR '{}': {e}", self.http_addr))?;
        }
        if let Some(url) = &self.api_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(format!("TEMPLE_API_URL must be an http(s) URL, got '{url}'"));
        }
        if self.api_timeout_secs == 0 {
            return Err("TEMPLE_API_TIMEOUT_SECS must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn to_latency(&self) -> Latency {
        Latency::from_flag(self.simulate_latency)
    }

    pub fn auth_config(&self) -> Option<AuthConfig> {
        self.api_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| AuthConfig {
                timeout: Duration::from_secs(self.api_timeout_secs),
                token: self
                    .api_token
                    .as_deref()
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(str::to_owned),
                ..AuthConfig::new(url)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let args = CommandArguments::default_settings();
        assert!(args.validate().is_ok());
        assert!(!args.to_latency().is_disabled());
        assert!(args.auth_config().is_none());
    }

    #[test]
    fn needs_a_transport() {
        let args = CommandArguments {
            enable_stdio: false,
            ..CommandArguments::default_settings()
        };
        assert!(args.validate().is_err());
    }

    #[test]
    fn rejects_bad_http_addr_only_when_enabled() {
        let mut args = CommandArguments {
            http_addr: "not-an-addr".to_string(),
            ..CommandArguments::default_settings()
        };
        assert!(args.validate().is_ok());
        args.enable_http = true;
        assert!(args.validate().unwrap_err().contains("TEMPLE_HTTP_ADDR"));
    }

    #[test]
    fn auth_config_uses_timeout() {
        let args = CommandArguments {
            api_url: Some("https://api.temple.org".to_string()),
            api_timeout_secs: 5,
            ..CommandArguments::default_settings()
        };
        assert!(args.validate().is_ok());
        let config = args.auth_config().unwrap();
        assert_eq!(config.api_url, "https://api.temple.org");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.token.is_none());
    }

    #[test]
    fn api_token_reaches_auth_config() {
        let cli = Cli::try_parse_from([
            "temple-admin",
            "start",
            "--api-url",
            "https://api.temple.org",
            "--api-token",
            "s3cret",
        ])
        .unwrap();
        let Command::Start(args) = cli.command else {
            panic!("expected start");
        };
        assert_eq!(args.auth_config().unwrap().token.as_deref(), Some("s3cret"));

        let blank = CommandArguments {
            api_url: Some("https://api.temple.org".to_string()),
            api_token: Some("  ".to_string()),
            ..CommandArguments::default_settings()
        };
        assert!(blank.auth_config().unwrap().token.is_none());
    }

    #[test]
    fn parses_start_flags() {
        let cli = Cli::try_parse_from([
            "temple-admin",
            "start",
            "--enable-http",
            "true",
            "--simulate-latency",
            "false",
            "--empty",
        ])
        .unwrap();
        match cli.command {
            Command::Start(args) => {
                assert!(args.enable_http);
                assert!(args.empty);
                assert!(args.to_latency().is_disabled());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
