//! The two deployment procedures. Each one submits exactly one deployment
//! transaction and reports the new address on `out`.

use {
    crate::{
        artifacts::Artifacts,
        chain::Chain,
        factory::{ContractFactory, Deployment},
    },
    alloy::{dyn_abi::DynSolValue, primitives::Address},
    anyhow::{Context, Result},
    std::{fmt, io::Write, str::FromStr},
};

pub const TOKEN_CONTRACT: &str = "Token";
pub const GAME_CONTRACT: &str = "Game";

/// Token contract the game is bound to. Passed unchanged as the only
/// constructor argument of `Game`.
pub const GAME_TOKEN_ADDRESS: &str = "0xa33239e13303Fe9586C25b70ABd4D5d65E7B368f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    Token,
    Game,
}

impl Procedure {
    pub async fn execute<C>(
        self,
        chain: &C,
        artifacts: &Artifacts,
        out: &mut dyn Write,
    ) -> Result<Deployment>
    where
        C: Chain + ?Sized,
    {
        match self {
            Self::Token => deploy_token(chain, artifacts, out).await,
            Self::Game => deploy_game(chain, artifacts, out).await,
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token => f.write_str("token"),
            Self::Game => f.write_str("game"),
        }
    }
}

/// Deploys `Token`, which takes no constructor arguments.
pub async fn deploy_token<C>(
    chain: &C,
    artifacts: &Artifacts,
    out: &mut dyn Write,
) -> Result<Deployment>
where
    C: Chain + ?Sized,
{
    let factory = factory(artifacts, TOKEN_CONTRACT)?;
    log_connection(chain).await?;

    let token = factory.deploy(chain, &[]).await?;
    writeln!(out, "Token deployed to: {}", token.address)?;
    Ok(token)
}

/// Deploys `Game` bound to [`GAME_TOKEN_ADDRESS`].
pub async fn deploy_game<C>(
    chain: &C,
    artifacts: &Artifacts,
    out: &mut dyn Write,
) -> Result<Deployment>
where
    C: Chain + ?Sized,
{
    let token = Address::from_str(GAME_TOKEN_ADDRESS).context("invalid game token address")?;
    writeln!(out, "Using token at: {GAME_TOKEN_ADDRESS}")?;

    let factory = factory(artifacts, GAME_CONTRACT)?;
    log_connection(chain).await?;

    let game = factory.deploy(chain, &[DynSolValue::Address(token)]).await?;
    writeln!(out, "Game deployed to: {}", game.address)?;
    Ok(game)
}

fn factory(artifacts: &Artifacts, name: &str) -> Result<ContractFactory> {
    let artifact = artifacts
        .load(name)
        .with_context(|| format!("failed to load artifact of {name}"))?;
    ContractFactory::from_artifact(artifact)
        .with_context(|| format!("failed to create contract factory for {name}"))
}

async fn log_connection<C>(chain: &C) -> Result<()>
where
    C: Chain + ?Sized,
{
    let chain_id = chain.chain_id().await.context("get chain id failed")?;
    tracing::info!(chain_id, deployer = %chain.signer_address(), "connected to network");
    Ok(())
}
