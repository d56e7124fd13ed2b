use {
    crate::network::DEFAULT_NETWORK,
    clap::Parser,
    std::{fmt, path::PathBuf},
    tracing::Level,
};

/// Deploys a compiled contract to the configured network. The endpoint and
/// signing key of the default network come from `SEPOLIA_URL` and
/// `PRIVATE_KEY`, which may also be set in a `.env` file.
#[derive(Parser)]
pub struct Arguments {
    /// Name of the network to deploy to.
    #[clap(long, env = "DEPLOY_NETWORK", default_value = DEFAULT_NETWORK)]
    pub network: String,

    /// TOML file declaring additional networks.
    #[clap(long, env = "DEPLOY_NETWORKS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory containing the compiled contract artifacts.
    #[clap(long, env = "ARTIFACTS_DIR", default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// Number of blocks the deployment has to be buried under before it is
    /// considered confirmed.
    #[clap(long, env, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
    pub confirmations: u64,

    #[clap(long, env, default_value = "warn,deployer=debug,ethrpc=debug")]
    pub log_filter: String,

    /// Least severe log level written to stderr instead of stdout. Stdout is
    /// reserved for the deployment report, so all logs go to stderr by
    /// default.
    #[clap(long, env, default_value = "trace")]
    pub log_stderr_threshold: Level,

    /// Output log events as JSON.
    #[clap(long, env)]
    pub use_json_logs: bool,
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "network: {}", self.network)?;
        writeln!(f, "config: {:?}", self.config)?;
        writeln!(f, "artifacts: {}", self.artifacts.display())?;
        writeln!(f, "confirmations: {}", self.confirmations)?;
        writeln!(f, "log_filter: {}", self.log_filter)?;
        writeln!(f, "log_stderr_threshold: {}", self.log_stderr_threshold)?;
        writeln!(f, "use_json_logs: {}", self.use_json_logs)?;
        Ok(())
    }
}
