use std::io::Write;

use ethers::{abi::Token, utils::to_checksum};

use crate::{
    contracts::ContractInstance,
    error::{ChainError, Result},
    provider::ChainProvider,
};

pub const CONTRACT_NAME: &str = "EncryptedERC20";
pub const TOKEN_NAME: &str = "NSLab Tutorial";
pub const TOKEN_SYMBOL: &str = "NSLT";

/// Deploys a fresh token instance from the first configured account.
pub struct Deploy<'a, P> {
    chain: &'a P,
    contract: String,
    name: String,
    symbol: String,
}

impl<'a, P: ChainProvider> Deploy<'a, P> {
    pub fn new(chain: &'a P, contract: &str, name: &str, symbol: &str) -> Self {
        Self {
            chain,
            contract: contract.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
        }
    }

    pub async fn run(&self, out: &mut impl Write) -> Result<ContractInstance> {
        let signer = *self
            .chain
            .list_accounts()
            .await?
            .first()
            .ok_or(ChainError::NoAccountsConfigured)?;
        log::info!("deployer:{:?}", signer);

        let interface = self.chain.resolve_contract(&self.contract)?;

        let pending = self
            .chain
            .deploy(
                &interface,
                signer,
                vec![
                    Token::String(self.name.clone()),
                    Token::String(self.symbol.clone()),
                ],
            )
            .await?;
        log::info!("{} deployment:{:?}", self.contract, pending.tx_hash);

        // From here on a failure may leave a deployed but unreported contract.
        let instance = self.chain.await_confirmation(pending).await?;

        writeln!(
            out,
            "{} deployed to: {}",
            instance.name,
            to_checksum(&instance.address, None)
        )?;
        Ok(instance)
    }
}
