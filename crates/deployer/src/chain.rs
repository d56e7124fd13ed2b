//! The boundary to the blockchain: submitting a deployment transaction and
//! waiting for it to be mined.

use {
    crate::network::Network,
    alloy::{
        network::{ReceiptResponse, TransactionBuilder},
        primitives::{Address, B256, Bytes},
        providers::{PendingTransactionBuilder, PendingTransactionError, Provider},
        rpc::types::TransactionRequest,
        transports::TransportError,
    },
    ethrpc::{AlloyProvider, errors::ContractErrorExt},
};

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("node request failed: {0}")]
    Node(TransportError),
    #[error("transaction reverted: {0}")]
    Revert(TransportError),
    #[error("failed to wait for transaction {tx_hash}: {source}")]
    Confirmation {
        tx_hash: B256,
        source: PendingTransactionError,
    },
    #[error("connected to chain {actual} but network expects chain {expected}")]
    WrongChain { expected: u64, actual: u64 },
}

impl From<TransportError> for ChainError {
    fn from(err: TransportError) -> Self {
        if err.is_node_error() {
            Self::Node(err)
        } else {
            Self::Revert(err)
        }
    }
}

/// The parts of a transaction receipt a deployment cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    pub contract_address: Option<Address>,
    pub gas_used: u64,
    pub success: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Chain: Send + Sync {
    /// Account that signs the submitted transactions.
    fn signer_address(&self) -> Address;

    async fn chain_id(&self) -> Result<u64, ChainError>;

    /// Signs and submits a contract creation transaction with the given
    /// creation code. Returns as soon as the node accepted the transaction.
    async fn submit_deployment(&self, input: Bytes) -> Result<B256, ChainError>;

    /// Blocks until the transaction is mined and returns its receipt.
    async fn confirm(&self, tx_hash: B256) -> Result<Receipt, ChainError>;
}

/// [`Chain`] implementation backed by an RPC node.
pub struct RpcChain {
    provider: AlloyProvider,
    signer: Address,
    expected_chain_id: Option<u64>,
    confirmations: u64,
}

impl RpcChain {
    /// Creates a chain connection that signs with the default account of
    /// `network`. No request is sent before the first call.
    pub fn new(network: &Network, confirmations: u64) -> Self {
        let signer = network.default_signer().clone();
        Self {
            signer: signer.address(),
            provider: ethrpc::provider_with_signer(&network.url, &network.name, signer),
            expected_chain_id: network.chain_id,
            confirmations,
        }
    }
}

#[async_trait::async_trait]
impl Chain for RpcChain {
    fn signer_address(&self) -> Address {
        self.signer
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        let actual = self.provider.get_chain_id().await?;
        match self.expected_chain_id {
            Some(expected) if expected != actual => Err(ChainError::WrongChain { expected, actual }),
            _ => Ok(actual),
        }
    }

    async fn submit_deployment(&self, input: Bytes) -> Result<B256, ChainError> {
        let tx = TransactionRequest::default()
            .with_from(self.signer)
            .with_deploy_code(input);
        let pending = self.provider.send_transaction(tx).await?;
        Ok(*pending.tx_hash())
    }

    async fn confirm(&self, tx_hash: B256) -> Result<Receipt, ChainError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await
            .map_err(|source| ChainError::Confirmation { tx_hash, source })?;
        Ok(Receipt {
            transaction_hash: receipt.transaction_hash(),
            block_number: receipt.block_number(),
            contract_address: receipt.contract_address(),
            gas_used: receipt.gas_used(),
            success: receipt.status(),
        })
    }
}
