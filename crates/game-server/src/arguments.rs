use {
    alloy::primitives::Address,
    clap::Parser,
    std::{fmt, net::SocketAddr, time::Duration},
    tracing::Level,
    url::Url,
};

/// Serves an HTTP API that plays the guessing game on behalf of the
/// configured account.
#[derive(Parser)]
pub struct Arguments {
    /// Endpoint of the node the contracts live on.
    #[clap(long, env = "SEPOLIA_URL")]
    pub node_url: Url,

    /// Key of the account that signs approvals, bets and mints.
    #[clap(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    #[clap(long, env, default_value = "0.0.0.0:8080")]
    pub bind_address: SocketAddr,

    /// Address of the token contract. Defaults to the known deployment on the
    /// node's chain.
    #[clap(long, env)]
    pub token_address: Option<Address>,

    /// Address of the game contract. Defaults to the known deployment on the
    /// node's chain.
    #[clap(long, env)]
    pub game_address: Option<Address>,

    /// How long `/play` waits for the token approval to be mined.
    #[clap(long, env, default_value = "2m", value_parser = humantime::parse_duration)]
    pub approval_timeout: Duration,

    #[clap(
        long,
        env,
        default_value = "warn,game_server=debug,ethrpc=info,tower_http=debug"
    )]
    pub log_filter: String,

    /// Least severe log level written to stderr instead of stdout.
    #[clap(long, env, default_value = "error")]
    pub log_stderr_threshold: Level,

    /// Output log events as JSON.
    #[clap(long, env)]
    pub use_json_logs: bool,
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "node_url: SECRET")?;
        writeln!(f, "private_key: SECRET")?;
        writeln!(f, "bind_address: {}", self.bind_address)?;
        writeln!(f, "token_address: {:?}", self.token_address)?;
        writeln!(f, "game_address: {:?}", self.game_address)?;
        writeln!(f, "approval_timeout: {:?}", self.approval_timeout)?;
        writeln!(f, "log_filter: {}", self.log_filter)?;
        writeln!(f, "log_stderr_threshold: {}", self.log_stderr_threshold)?;
        writeln!(f, "use_json_logs: {}", self.use_json_logs)?;
        Ok(())
    }
}
