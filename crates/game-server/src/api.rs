//! HTTP API driving the game.

use {
    crate::backend::GameBackend,
    alloy::primitives::{Address, B256, U256},
    axum::{
        Json,
        body::Bytes,
        extract::{Path, State},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::{get, post},
    },
    serde::{Deserialize, Serialize},
    std::{future::Future, net::SocketAddr, sync::Arc},
};

/// Base units per whole token.
const TOKEN_UNIT: u64 = 1_000_000_000_000_000_000;
/// Tokens the game contract may spend for every bet.
const BET_TOKENS: u64 = 10;
/// Tokens handed out by `/mint`.
const MINT_TOKENS: u64 = 1000;

type AppState = Arc<dyn GameBackend>;

pub fn router(backend: AppState) -> axum::Router {
    axum::Router::new()
        .route("/play", post(play))
        .route("/mint", get(mint))
        .route("/balance/{address}", get(balance))
        .route("/healthz", get(healthz))
        .layer(
            tower::ServiceBuilder::new()
                .layer(tower_http::limit::RequestBodyLimitLayer::new(16 * 1024))
                .layer(tower_http::trace::TraceLayer::new_for_http()),
        )
        .with_state(backend)
}

pub async fn serve(
    addr: SocketAddr,
    backend: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "serving game api");
    axum::serve(listener, router(backend))
        .with_graceful_shutdown(shutdown)
        .await
}

#[derive(Debug, Deserialize)]
struct PlayRequest {
    #[serde(default)]
    address: String,
    #[serde(default)]
    guess: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayResponse {
    result: &'static str,
    guess: u8,
    approve_tx: B256,
    play_tx: B256,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MintResponse {
    minted_to: Address,
    amount: String,
    tx_hash: B256,
}

#[derive(Debug, Serialize)]
struct BalanceResponse {
    address: String,
    balance: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
}

fn error(status: StatusCode, error: &'static str) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

fn tokens(amount: u64) -> U256 {
    U256::from(amount) * U256::from(TOKEN_UNIT)
}

async fn play(State(backend): State<AppState>, body: Bytes) -> Response {
    // The body is decoded as JSON regardless of the declared content type.
    let request: PlayRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            tracing::debug!(?err, "rejected play request");
            return error(StatusCode::BAD_REQUEST, "invalid input");
        }
    };
    let guess = match u8::try_from(request.guess) {
        Ok(guess @ 1..=10) => guess,
        _ => return error(StatusCode::BAD_REQUEST, "guess must be between 1 and 10"),
    };
    tracing::debug!(player = %request.address, guess, "playing");

    let game = backend.game_address();
    let approve_tx = match backend.approve(game, tokens(BET_TOKENS)).await {
        Ok(tx) => tx,
        Err(err) => {
            tracing::warn!(?err, node_error = err.is_node_error(), "approve failed");
            return error(StatusCode::INTERNAL_SERVER_ERROR, "approve failed");
        }
    };
    tracing::info!(?approve_tx, "approval mined");

    match backend.allowance(backend.account(), game).await {
        Ok(allowance) => tracing::info!(%allowance, "allowance granted to game"),
        Err(err) => {
            tracing::warn!(?err, "allowance check failed");
            return error(StatusCode::INTERNAL_SERVER_ERROR, "allowance check failed");
        }
    }

    let play_tx = match backend.play(guess).await {
        Ok(tx) => tx,
        Err(err) => {
            tracing::warn!(?err, node_error = err.is_node_error(), "play failed");
            return error(StatusCode::INTERNAL_SERVER_ERROR, "play failed");
        }
    };
    tracing::info!(?play_tx, "bet submitted");

    Json(PlayResponse {
        result: "submitted",
        guess,
        approve_tx,
        play_tx,
    })
    .into_response()
}

async fn mint(State(backend): State<AppState>) -> Response {
    let to = backend.account();
    match backend.mint(to, tokens(MINT_TOKENS)).await {
        Ok(tx_hash) => {
            tracing::info!(?tx_hash, %to, "mint submitted");
            Json(MintResponse {
                minted_to: to,
                amount: format!("{MINT_TOKENS} MTK"),
                tx_hash,
            })
            .into_response()
        }
        Err(err) => {
            tracing::warn!(?err, node_error = err.is_node_error(), "mint failed");
            error(StatusCode::INTERNAL_SERVER_ERROR, "mint failed")
        }
    }
}

async fn balance(State(backend): State<AppState>, Path(address): Path<String>) -> Response {
    let Ok(account) = address.parse::<Address>() else {
        return error(StatusCode::BAD_REQUEST, "invalid address");
    };
    match backend.balance_of(account).await {
        Ok(balance) => Json(BalanceResponse {
            address,
            balance: balance.to_string(),
        })
        .into_response(),
        Err(err) => {
            tracing::warn!(?err, %account, "balance check failed");
            error(StatusCode::INTERNAL_SERVER_ERROR, "balance check failed")
        }
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
