use {
    crate::{
        artifacts::Artifact,
        chain::{Chain, ChainError},
    },
    alloy::{
        dyn_abi::{DynSolValue, JsonAbiExt, Specifier},
        json_abi::JsonAbi,
        primitives::{Address, B256, Bytes, hex},
    },
};

#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("contract {contract} has no creation code, is it abstract or an interface?")]
    NoBytecode { contract: String },
    #[error("contract {contract} needs library linking which is not supported")]
    UnlinkedLibrary { contract: String },
    #[error("contract {contract} has invalid creation code: {source}")]
    InvalidBytecode {
        contract: String,
        source: hex::FromHexError,
    },
    #[error("contract {contract} expects {expected} constructor arguments, got {actual}")]
    ArgumentCount {
        contract: String,
        expected: usize,
        actual: usize,
    },
    #[error("constructor argument #{index} of contract {contract} must be of type {expected}")]
    ArgumentType {
        contract: String,
        index: usize,
        expected: String,
    },
    #[error("failed to encode constructor arguments of contract {contract}: {source}")]
    Encoding {
        contract: String,
        source: alloy::dyn_abi::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error(transparent)]
    Factory(#[from] FactoryError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error("deployment of {contract} reverted in transaction {tx_hash}")]
    Reverted { contract: String, tx_hash: B256 },
    #[error("receipt of transaction {tx_hash} deploying {contract} has no contract address")]
    MissingAddress { contract: String, tx_hash: B256 },
}

/// A freshly deployed contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub contract: String,
    pub address: Address,
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
}

/// Knows how to build and submit the deployment transaction of one compiled
/// contract.
#[derive(Debug, Clone)]
pub struct ContractFactory {
    name: String,
    abi: JsonAbi,
    bytecode: Bytes,
}

impl ContractFactory {
    pub fn from_artifact(artifact: Artifact) -> Result<Self, FactoryError> {
        let contract = artifact.contract_name;
        let code = artifact.bytecode.trim();
        let code = code.strip_prefix("0x").unwrap_or(code);
        if code.is_empty() {
            return Err(FactoryError::NoBytecode { contract });
        }
        // solc leaves `__$<hash>$__` placeholders where library addresses
        // have to be linked in.
        if code.contains("__") {
            return Err(FactoryError::UnlinkedLibrary { contract });
        }
        let bytecode = match hex::decode(code) {
            Ok(bytecode) => Bytes::from(bytecode),
            Err(source) => return Err(FactoryError::InvalidBytecode { contract, source }),
        };
        Ok(Self {
            name: contract,
            abi: artifact.abi,
            bytecode,
        })
    }

    /// Creation code followed by the ABI encoded constructor arguments.
    pub fn deployment_input(&self, args: &[DynSolValue]) -> Result<Bytes, FactoryError> {
        let Some(constructor) = &self.abi.constructor else {
            if !args.is_empty() {
                return Err(FactoryError::ArgumentCount {
                    contract: self.name.clone(),
                    expected: 0,
                    actual: args.len(),
                });
            }
            return Ok(self.bytecode.clone());
        };

        if constructor.inputs.len() != args.len() {
            return Err(FactoryError::ArgumentCount {
                contract: self.name.clone(),
                expected: constructor.inputs.len(),
                actual: args.len(),
            });
        }
        for (index, (param, arg)) in constructor.inputs.iter().zip(args).enumerate() {
            let ty = param.resolve().map_err(|source| FactoryError::Encoding {
                contract: self.name.clone(),
                source,
            })?;
            if !ty.matches(arg) {
                return Err(FactoryError::ArgumentType {
                    contract: self.name.clone(),
                    index,
                    expected: param.selector_type().into_owned(),
                });
            }
        }

        let encoded = constructor
            .abi_encode_input(args)
            .map_err(|source| FactoryError::Encoding {
                contract: self.name.clone(),
                source,
            })?;
        Ok([&self.bytecode[..], encoded.as_slice()].concat().into())
    }

    /// Submits exactly one deployment transaction and waits for it to be
    /// mined.
    pub async fn deploy<C>(&self, chain: &C, args: &[DynSolValue]) -> Result<Deployment, DeployError>
    where
        C: Chain + ?Sized,
    {
        let input = self.deployment_input(args)?;
        tracing::debug!(
            contract = %self.name,
            deployer = %chain.signer_address(),
            input_len = input.len(),
            "submitting deployment transaction"
        );

        let tx_hash = chain.submit_deployment(input).await?;
        tracing::info!(contract = %self.name, ?tx_hash, "deployment transaction submitted");

        let receipt = chain.confirm(tx_hash).await?;
        if !receipt.success {
            return Err(DeployError::Reverted {
                contract: self.name.clone(),
                tx_hash,
            });
        }
        let address = receipt
            .contract_address
            .ok_or_else(|| DeployError::MissingAddress {
                contract: self.name.clone(),
                tx_hash,
            })?;
        tracing::info!(
            contract = %self.name,
            %address,
            block = ?receipt.block_number,
            gas_used = receipt.gas_used,
            "deployment confirmed"
        );

        Ok(Deployment {
            contract: self.name.clone(),
            address,
            transaction_hash: tx_hash,
            block_number: receipt.block_number,
        })
    }
}
