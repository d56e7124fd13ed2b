//! Typed bindings for the `Token` and `Game` contracts together with the
//! addresses they are known to be deployed at.

pub mod networks {
    pub const SEPOLIA: u64 = 11155111;
}

pub use alloy::providers::DynProvider as Provider;

/// Extension trait to attach some useful functions to the contract instance.
pub trait InstanceExt: Sized {
    /// Creates a contract instance at the expected address for the current
    /// network.
    fn deployed(
        provider: &Provider,
    ) -> impl std::future::Future<Output = anyhow::Result<Self>> + Send;
}

#[macro_export]
macro_rules! bindings {
    ($contract:ident, { $($body:tt)* } $(, $deployment_info:expr)?) => {
        paste::paste! {
            // Generate the main bindings in a private module. That allows
            // us to re-export all items in our own module while also adding
            // some items ourselves.
            #[allow(non_snake_case)]
            mod [<$contract Private>] {
                alloy::sol! {
                    #[allow(missing_docs)]
                    #[sol(rpc)]
                    contract $contract {
                        $($body)*
                    }
                }
            }

            #[allow(non_snake_case)]
            pub mod $contract {
                use alloy::providers::DynProvider;

                pub use super::[<$contract Private>]::*;
                pub type Instance = $contract::[<$contract Instance>]<DynProvider>;

                $(
                use {
                    std::{sync::LazyLock, collections::HashMap},
                    alloy::{
                        providers::Provider,
                        primitives::{address, Address},
                    },
                    anyhow::{Context, Result},
                    $crate::networks::*,
                };

                pub static DEPLOYMENT_INFO: LazyLock<HashMap<u64, Address>> = LazyLock::new(|| {
                    $deployment_info
                });

                /// Address the contract is deployed at on the given chain.
                pub fn deployment_address(chain_id: u64) -> Option<Address> {
                    DEPLOYMENT_INFO.get(&chain_id).copied()
                }

                impl $crate::InstanceExt for Instance {
                    fn deployed(provider: &DynProvider) -> impl Future<Output = Result<Self>> + Send {
                        async move {
                            let chain_id = provider
                                .get_chain_id()
                                .await
                                .context("could not fetch current chain id")?;
                            let address = deployment_address(chain_id)
                                .with_context(|| format!("no deployment info for chain {chain_id:?}"))?;

                            Ok(Instance::new(address, provider.clone()))
                        }
                    }
                }
                )*
            }
        }
    };
}

crate::bindings!(
    Token,
    {
        event Transfer(address indexed from, address indexed to, uint256 value);
        event Approval(address indexed owner, address indexed spender, uint256 value);

        function name() external view returns (string memory);
        function symbol() external view returns (string memory);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 value) external returns (bool);
        function transfer(address to, uint256 value) external returns (bool);
        function transferFrom(address from, address to, uint256 value) external returns (bool);
        function mint(address to, uint256 amount) external;
    },
    HashMap::from([(SEPOLIA, address!("0xa33239e13303Fe9586C25b70ABd4D5d65E7B368f"))])
);

crate::bindings!(
    Game,
    {
        event BetPlaced(address indexed player, uint256 amount, uint8 guess, uint8 winning);
        event Win(address indexed player, uint256 prize);
        event Loss(address indexed player);

        constructor(address _token);

        function owner() external view returns (address);
        function token() external view returns (address);
        function play(uint8 guess) external;
        function withdraw() external;
    },
    HashMap::from([(SEPOLIA, address!("0x3726fef83444Ba54F925A5d2195f697234DfA30C"))])
);
