pub mod errors;
mod instrumentation;
pub mod signer;

use {
    alloy::{
        network::EthereumWallet,
        providers::{DynProvider, Provider, ProviderBuilder},
        rpc::client::{ClientBuilder, RpcClient},
        signers::local::PrivateKeySigner,
    },
    instrumentation::{InstrumentationLayer, LabelingLayer},
    url::Url,
};

pub type AlloyProvider = DynProvider;

/// Creates a provider that signs and submits transactions with `signer`.
/// Nonce, gas and chain id are filled in by the provider. Every request is
/// tagged with `label` in the logs.
pub fn provider_with_signer(url: &Url, label: &str, signer: PrivateKeySigner) -> AlloyProvider {
    tracing::debug!(account = %signer.address(), %label, "creating signing provider");
    ProviderBuilder::new()
        .wallet(EthereumWallet::new(signer))
        .connect_client(client(url, label))
        .erased()
}

fn client(url: &Url, label: &str) -> RpcClient {
    ClientBuilder::default()
        .layer(LabelingLayer {
            label: label.to_string(),
        })
        .layer(InstrumentationLayer)
        .http(url.clone())
}
