//! Transactions and reads against the token and game contracts.

use {
    alloy::{
        primitives::{Address, B256, U256},
        providers::PendingTransactionError,
    },
    contracts::{Game, Token},
    ethrpc::errors::ContractErrorExt,
    std::time::Duration,
};

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error(transparent)]
    Contract(#[from] alloy::contract::Error),
    #[error("transaction {tx_hash} was not mined: {source}")]
    NotMined {
        tx_hash: B256,
        source: PendingTransactionError,
    },
}

impl BackendError {
    /// Whether the node failed to serve the request, as opposed to the
    /// contract rejecting it.
    pub fn is_node_error(&self) -> bool {
        match self {
            Self::Contract(err) => err.is_node_error(),
            Self::NotMined { .. } => true,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GameBackend: Send + Sync {
    /// Account that signs every transaction.
    fn account(&self) -> Address;

    fn game_address(&self) -> Address;

    /// Allows `spender` to transfer `amount` of the account's tokens. Returns
    /// once the approval is mined, or fails if it is not mined in time.
    async fn approve(&self, spender: Address, amount: U256) -> Result<B256, BackendError>;

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, BackendError>;

    /// Places a bet. Returns as soon as the node accepted the transaction.
    async fn play(&self, guess: u8) -> Result<B256, BackendError>;

    /// Mints `amount` new tokens to `to`. Returns as soon as the node accepted
    /// the transaction.
    async fn mint(&self, to: Address, amount: U256) -> Result<B256, BackendError>;

    async fn balance_of(&self, account: Address) -> Result<U256, BackendError>;
}

/// [`GameBackend`] talking to the deployed contracts.
pub struct OnchainBackend {
    account: Address,
    token: Token::Instance,
    game: Game::Instance,
    approval_timeout: Duration,
}

impl OnchainBackend {
    pub fn new(
        account: Address,
        token: Token::Instance,
        game: Game::Instance,
        approval_timeout: Duration,
    ) -> Self {
        Self {
            account,
            token,
            game,
            approval_timeout,
        }
    }
}

#[async_trait::async_trait]
impl GameBackend for OnchainBackend {
    fn account(&self) -> Address {
        self.account
    }

    fn game_address(&self) -> Address {
        *self.game.address()
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<B256, BackendError> {
        let pending = self
            .token
            .approve(spender, amount)
            .from(self.account)
            .send()
            .await?;
        let tx_hash = *pending.tx_hash();
        tracing::debug!(?tx_hash, %spender, %amount, "approval submitted");
        pending
            .with_timeout(Some(self.approval_timeout))
            .watch()
            .await
            .map_err(|source| BackendError::NotMined { tx_hash, source })
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, BackendError> {
        Ok(self.token.allowance(owner, spender).call().await?)
    }

    async fn play(&self, guess: u8) -> Result<B256, BackendError> {
        let pending = self.game.play(guess).from(self.account).send().await?;
        Ok(*pending.tx_hash())
    }

    async fn mint(&self, to: Address, amount: U256) -> Result<B256, BackendError> {
        let pending = self
            .token
            .mint(to, amount)
            .from(self.account)
            .send()
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn balance_of(&self, account: Address) -> Result<U256, BackendError> {
        Ok(self.token.balanceOf(account).call().await?)
    }
}
