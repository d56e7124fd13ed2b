pub mod api;
pub mod arguments;
pub mod backend;
pub mod events;

#[cfg(unix)]
use tokio::signal::unix::{self, SignalKind};
use {
    crate::{arguments::Arguments, backend::OnchainBackend},
    anyhow::Context,
    clap::Parser,
    contracts::{Game, InstanceExt, Token},
    std::{process::ExitCode, sync::Arc},
};

pub async fn start(args: impl Iterator<Item = String>) -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let args = Arguments::parse_from(args);
    let mut obs_config = observe::Config::default()
        .with_env_filter(&args.log_filter)
        .with_stderr_threshold(args.log_stderr_threshold);
    if args.use_json_logs {
        obs_config = obs_config.with_json_format();
    }
    observe::tracing::initialize(&obs_config);
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }
    tracing::info!("running game server with validated arguments:\n{args}");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("game server failed: {err:?}");
            ExitCode::FAILURE
        }
    }
}

pub async fn run(args: Arguments) -> anyhow::Result<()> {
    let signer =
        ethrpc::signer::parse_private_key(&args.private_key).context("invalid private key")?;
    let account = signer.address();
    tracing::info!(%account, "owner address");
    let provider = ethrpc::provider_with_signer(&args.node_url, "game-server", signer);

    let token = match args.token_address {
        Some(address) => Token::Instance::new(address, provider.clone()),
        None => Token::Instance::deployed(&provider)
            .await
            .context("no token address configured")?,
    };
    let game = match args.game_address {
        Some(address) => Game::Instance::new(address, provider.clone()),
        None => Game::Instance::deployed(&provider)
            .await
            .context("no game address configured")?,
    };
    tracing::info!(token = %token.address(), game = %game.address(), "using contracts");

    tokio::spawn(events::watch(provider.clone(), *game.address()));

    let backend = Arc::new(OnchainBackend::new(
        account,
        token,
        game,
        args.approval_timeout,
    ));
    api::serve(args.bind_address, backend, shutdown_signal())
        .await
        .context("game api failed")?;
    tracing::info!("game server stopped");
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    // Kubernetes sends sigterm, whereas locally sigint (ctrl-c) is most common.
    let signals = unix::signal(SignalKind::interrupt())
        .and_then(|interrupt| Ok((interrupt, unix::signal(SignalKind::terminate())?)));
    let (mut interrupt, mut terminate) = match signals {
        Ok(signals) => signals,
        Err(err) => {
            tracing::warn!(?err, "failed to install signal handlers");
            return std::future::pending().await;
        }
    };
    tokio::select! {
        _ = interrupt.recv() => (),
        _ = terminate.recv() => (),
    };
    tracing::info!("shutting down");
}

#[cfg(windows)]
async fn shutdown_signal() {
    // We don't support signal handling on Windows.
    std::future::pending().await
}
