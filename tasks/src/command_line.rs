use std::{io, path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::{
    deploy::{Deploy, CONTRACT_NAME, TOKEN_NAME, TOKEN_SYMBOL},
    mint::{check_address, Mint, MINT_AMOUNT},
    provider::{ChainConfig, EthersChain},
};

#[derive(Debug, Clone, Args)]
pub struct ChainArgs {
    /// JSON-RPC endpoint of the node
    #[clap(long, env = "RPC_URL", default_value = "http://localhost:8545")]
    rpc: String,

    /// Signing keys, tried before the mnemonic accounts
    #[clap(long = "sk", env = "PRIVATE_KEY", value_delimiter = ',')]
    private_keys: Vec<String>,

    #[clap(long, env = "MNEMONIC", hide_env_values = true)]
    mnemonic: Option<String>,

    /// Number of accounts derived from the mnemonic
    #[clap(long, default_value = "5")]
    accounts: u32,

    /// Hardhat artifacts directory
    #[clap(long, env = "ARTIFACTS_DIR", default_value = "artifacts")]
    artifacts: PathBuf,

    #[clap(long, help = "Send legacy (pre EIP-1559) transactions")]
    legacy: bool,

    /// Receipt poll interval in milliseconds
    #[clap(long, default_value = "1000")]
    poll_interval: u64,

    /// Seconds to wait for a transaction to be included
    #[clap(long, default_value = "120")]
    confirmation_timeout: u64,
}

impl ChainArgs {
    async fn into_chain(self) -> Result<EthersChain> {
        EthersChain::new(ChainConfig {
            rpc: self.rpc,
            private_keys: self.private_keys,
            mnemonic: self.mnemonic,
            mnemonic_accounts: self.accounts,
            artifacts: self.artifacts,
            legacy: self.legacy,
            poll_interval: Duration::from_millis(self.poll_interval),
            confirmation_timeout: Duration::from_secs(self.confirmation_timeout),
        })
        .await
    }
}

#[derive(Debug, Args)]
pub struct DeployErc20 {
    #[clap(flatten)]
    chain: ChainArgs,

    #[clap(long, default_value = CONTRACT_NAME)]
    contract: String,

    /// Token name passed to the constructor
    #[clap(long, default_value = TOKEN_NAME)]
    name: String,

    /// Token symbol passed to the constructor
    #[clap(long, default_value = TOKEN_SYMBOL)]
    symbol: String,
}

#[derive(Debug, Args)]
pub struct MintErc20 {
    #[clap(flatten)]
    chain: ChainArgs,

    /// Address of the deployed token
    #[clap(long)]
    address: String,

    #[clap(long, default_value = CONTRACT_NAME)]
    contract: String,

    #[clap(long, default_value_t = MINT_AMOUNT)]
    amount: u64,

    #[clap(long, help = "Wait for the mint transaction to be included")]
    wait: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Deploy a new encrypted ERC20 token
    #[command(name = "deploy-erc20", alias = "deployERC20")]
    DeployErc20(DeployErc20),

    /// Mint supply on a deployed encrypted ERC20 token
    #[command(name = "mint-erc20", alias = "mintERC20")]
    MintErc20(MintErc20),
}

#[derive(Debug, Parser)]
pub struct CommandLine {
    #[command(subcommand)]
    command: Commands,
}

impl CommandLine {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::DeployErc20(c) => c.execute().await,
            Commands::MintErc20(c) => c.execute().await,
        }
    }
}

impl DeployErc20 {
    async fn execute(self) -> Result<()> {
        let chain = self.chain.into_chain().await?;
        Deploy::new(&chain, &self.contract, &self.name, &self.symbol)
            .run(&mut io::stdout())
            .await?;
        Ok(())
    }
}

impl MintErc20 {
    async fn execute(self) -> Result<()> {
        check_address(&self.address)?;
        let chain = self.chain.into_chain().await?;
        Mint::new(&chain, &self.contract, self.amount, self.wait)
            .run(&self.address, &mut io::stdout())
            .await?;
        Ok(())
    }
}
