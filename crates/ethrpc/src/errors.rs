use alloy::{
    contract::Error as ContractError,
    transports::{RpcError, TransportError},
};

pub trait ContractErrorExt {
    /// Returns whether a given error is a contract error, this is considered to
    /// be all errors except the transport error where there is no revert data.
    fn is_contract_error(&self) -> bool;

    /// Returns whether a given error is a node error.
    fn is_node_error(&self) -> bool;
}

impl ContractErrorExt for ContractError {
    fn is_contract_error(&self) -> bool {
        !self.is_node_error()
    }

    fn is_node_error(&self) -> bool {
        // Some contract errors are "hidden" inside transport errors, so transport
        // errors carrying revert data still count as contract errors.
        match self {
            ContractError::TransportError(err) => err.is_node_error(),
            _ => false,
        }
    }
}

impl ContractErrorExt for TransportError {
    fn is_contract_error(&self) -> bool {
        !self.is_node_error()
    }

    fn is_node_error(&self) -> bool {
        match self {
            // Alloy's revert decoding requires the revert data to be non-empty, so
            // look at the raw revert data instead. A call to a missing function
            // reverts with empty data and is still a revert.
            RpcError::ErrorResp(err) => {
                let no_revert_data = err.as_revert_data().is_none();
                tracing::debug!(?err, %no_revert_data, "transport rpc error");
                no_revert_data
            }
            _ => true,
        }
    }
}

/// Create an arbitrary alloy error that will convert into a "contract" error.
/// Useful for testing.
#[cfg(test)]
fn testing_alloy_contract_error() -> ContractError {
    ContractError::NotADeploymentTransaction
}

/// Create an arbitrary alloy error that will convert into a "node" error.
/// Useful for testing.
#[cfg(test)]
fn testing_alloy_node_error() -> ContractError {
    ContractError::TransportError(TransportError::ErrorResp(
        alloy::rpc::json_rpc::ErrorPayload::internal_error(),
    ))
}
