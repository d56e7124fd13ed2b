//! Logs the events emitted by the game contract.

use {
    alloy::{
        primitives::{self, Address},
        providers::Provider,
        rpc::types::{Filter, Log},
        sol_types::SolEventInterface,
    },
    contracts::Game::Game::GameEvents,
    ethrpc::AlloyProvider,
    futures::StreamExt,
    std::time::Duration,
};

const POLL_INTERVAL: Duration = Duration::from_secs(4);

/// Polls the node for logs of the game contract at `game` until the node
/// stops serving the filter. Nodes that do not support log filters disable
/// the watcher without affecting anything else.
pub async fn watch(provider: AlloyProvider, game: Address) {
    let filter = Filter::new().address(game);
    let poller = match provider.watch_logs(&filter).await {
        Ok(poller) => poller,
        Err(err) => {
            tracing::warn!(?err, "event watcher disabled");
            return;
        }
    };
    tracing::info!(%game, "listening for game events");

    let mut logs = poller
        .with_poll_interval(POLL_INTERVAL)
        .into_stream()
        .flat_map(futures::stream::iter);
    while let Some(log) = logs.next().await {
        report(&log);
    }
    tracing::warn!("game event stream ended");
}

fn report(log: &Log) {
    let tx = log.transaction_hash;
    match decode(&log.inner) {
        Some(GameEvents::BetPlaced(bet)) => tracing::info!(
            ?tx,
            player = %bet.player,
            amount = %bet.amount,
            guess = bet.guess,
            winning = bet.winning,
            "bet placed"
        ),
        Some(GameEvents::Win(win)) => {
            tracing::info!(?tx, player = %win.player, prize = %win.prize, "player won")
        }
        Some(GameEvents::Loss(loss)) => tracing::info!(?tx, player = %loss.player, "player lost"),
        None => tracing::info!(?log, "unknown game log"),
    }
}

fn decode(log: &primitives::Log) -> Option<GameEvents> {
    GameEvents::decode_log(log).ok().map(|log| log.data)
}
