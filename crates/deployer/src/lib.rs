pub mod arguments;
pub mod artifacts;
pub mod chain;
pub mod factory;
pub mod network;
pub mod procedures;

pub use procedures::Procedure;
use {
    crate::{
        arguments::Arguments,
        artifacts::Artifacts,
        chain::RpcChain,
        factory::Deployment,
        network::NetworkConfig,
    },
    anyhow::Context,
    clap::Parser,
    std::{io::Write, process::ExitCode},
};

/// Entry point shared by the deployment binaries. Every error ends up in the
/// log and turns into a non-zero exit code.
pub async fn start(args: impl Iterator<Item = String>, procedure: Procedure) -> ExitCode {
    // Values from `.env` never override variables that are already set.
    let dotenv = dotenvy::dotenv();
    let args = Arguments::parse_from(args);
    initialize_logging(&args);
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }
    tracing::info!("running {procedure} deployment with validated arguments:\n{args}");

    let env = |key: &str| std::env::var(key).ok();
    let result = run(&args, procedure, &env, &mut std::io::stdout()).await;
    exit_code(procedure, result)
}

fn initialize_logging(args: &Arguments) {
    let mut obs_config = observe::Config::default()
        .with_env_filter(&args.log_filter)
        .with_stderr_threshold(args.log_stderr_threshold);
    if args.use_json_logs {
        obs_config = obs_config.with_json_format();
    }
    observe::tracing::initialize(&obs_config);
}

fn exit_code(procedure: Procedure, result: anyhow::Result<Deployment>) -> ExitCode {
    match result {
        Ok(deployment) => {
            tracing::debug!(?deployment, "deployment finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{procedure} deployment failed: {err:?}");
            ExitCode::FAILURE
        }
    }
}

/// Resolves the network, then runs `procedure` against it. Configuration
/// problems are reported before anything is sent to the node.
pub async fn run(
    args: &Arguments,
    procedure: Procedure,
    env: &impl Fn(&str) -> Option<String>,
    out: &mut dyn Write,
) -> anyhow::Result<Deployment> {
    let network = NetworkConfig::load(args.config.as_deref(), env)
        .context("failed to load network configuration")?
        .resolve(&args.network, env)
        .context("invalid network configuration")?;
    tracing::debug!(?network, "resolved network");

    let chain = RpcChain::new(&network, args.confirmations);
    let artifacts = Artifacts::new(&args.artifacts);
    procedure.execute(&chain, &artifacts, out).await
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            chain::{MockChain, Receipt},
            network::{ConfigError, PRIVATE_KEY_ENV, URL_ENV},
        },
        alloy::primitives::{Address, B256, address},
        std::process::Command,
    };

    const DEPLOYED: Address = address!("0xabababababababababababababababababababab");
    const STDOUT_CHILD_ENV: &str = "DEPLOYER_STDOUT_CHILD";

    fn arguments(artifacts: &std::path::Path) -> Arguments {
        Arguments::parse_from([
            "deploy-token",
            "--artifacts",
            artifacts.to_str().unwrap(),
        ])
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_contacting_node() {
        let dir = artifacts::tests::hardhat_tree();
        let args = arguments(dir.path());
        // Nothing listens on this port, reaching the node would surface as a
        // transport error instead of a configuration error.
        let env = |key: &str| (key == URL_ENV).then(|| "http://127.0.0.1:1".to_string());
        let mut out = Vec::new();

        for procedure in [Procedure::Token, Procedure::Game] {
            let err = run(&args, procedure, &env, &mut out).await.unwrap_err();
            assert!(matches!(
                err.downcast_ref::<ConfigError>(),
                Some(ConfigError::NoAccounts { .. })
            ));
        }
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn missing_endpoint_fails() {
        let dir = artifacts::tests::hardhat_tree();
        let args = arguments(dir.path());
        let env = |key: &str| {
            (key == PRIVATE_KEY_ENV).then(|| {
                "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string()
            })
        };

        let err = run(&args, Procedure::Token, &env, &mut Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingUrl { .. })
        ));
    }

    /// Runs a token deployment against a mocked chain with the logging setup
    /// of the binaries, writing the report to the real stdout.
    fn deploy_with_process_logging() -> bool {
        let args = Arguments::parse_from(["deploy-token"]);
        initialize_logging(&args);

        let mut chain = MockChain::new();
        chain.expect_chain_id().returning(|| Ok(11155111));
        chain.expect_signer_address().return_const(Address::ZERO);
        chain
            .expect_submit_deployment()
            .times(1)
            .returning(|_| Ok(B256::repeat_byte(1)));
        chain.expect_confirm().returning(|tx_hash| {
            Ok(Receipt {
                transaction_hash: tx_hash,
                block_number: Some(1),
                contract_address: Some(DEPLOYED),
                gas_used: 500_000,
                success: true,
            })
        });

        let dir = artifacts::tests::hardhat_tree();
        let artifacts = Artifacts::new(dir.path());
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let result = runtime.block_on(Procedure::Token.execute(
            &chain,
            &artifacts,
            &mut std::io::stdout(),
        ));
        let succeeded = result.is_ok();
        exit_code(Procedure::Token, result);
        succeeded
    }

    #[test]
    fn stdout_only_carries_the_deployment_report() {
        // Logging is process global, so the deployment runs in a child process
        // executing only this test.
        if std::env::var_os(STDOUT_CHILD_ENV).is_some() {
            assert!(deploy_with_process_logging());
            return;
        }

        let output = Command::new(std::env::current_exe().unwrap())
            .args([
                "--exact",
                "tests::stdout_only_carries_the_deployment_report",
                "--nocapture",
                "--test-threads=1",
            ])
            .env(STDOUT_CHILD_ENV, "1")
            .env_remove("LOG_FILTER")
            .env_remove("LOG_STDERR_THRESHOLD")
            .output()
            .unwrap();
        assert!(output.status.success());

        let address = DEPLOYED.to_string().to_lowercase();
        let stdout = String::from_utf8(output.stdout).unwrap().to_lowercase();
        let stderr = String::from_utf8(output.stderr).unwrap().to_lowercase();
        assert_eq!(stdout.matches(&address).count(), 1, "stdout: {stdout}");
        assert!(stdout.contains(&format!("token deployed to: {address}")));
        assert!(stderr.contains("deployment confirmed"), "stderr: {stderr}");
    }
}
