use std::io::Write;

use ethers::{
    abi::Token,
    types::{Address, TxHash, U256, U64},
};

use crate::{
    contracts::{parse_address, ContractInstance},
    error::{ChainError, Result},
    provider::ChainProvider,
    utils::group_thousands,
};

pub const MINT_AMOUNT: u64 = 1000;

/// Entry check for the target token address, done before any remote call.
pub fn check_address(address: &str) -> Result<Address> {
    let address = address.trim();
    if address.is_empty() {
        return Err(ChainError::MissingArgument("address".to_string()));
    }
    parse_address(address)
}

/// Mints supply on an existing token instance.
pub struct Mint<'a, P> {
    chain: &'a P,
    contract: String,
    amount: u64,
    wait: bool,
}

impl<'a, P: ChainProvider> Mint<'a, P> {
    pub fn new(chain: &'a P, contract: &str, amount: u64, wait: bool) -> Self {
        Self {
            chain,
            contract: contract.to_string(),
            amount,
            wait,
        }
    }

    pub async fn run(&self, address: &str, out: &mut impl Write) -> Result<TxHash> {
        check_address(address)?;

        let interface = self.chain.resolve_contract(&self.contract)?;
        let token = self.chain.attach(&interface, address.trim())?;

        let name = self.name(&token).await?;
        writeln!(out, "Token name: {}", name)?;

        let total_supply = self.total_supply(&token).await?;
        writeln!(out, "Total supply before minting: {}", total_supply)?;

        let tx_hash = self
            .chain
            .send(&token, "mint", vec![Token::Uint(self.amount.into())], None)
            .await?;
        writeln!(
            out,
            "Minting {} token. Transaction hash: {:?}",
            group_thousands(self.amount),
            tx_hash
        )?;

        if self.wait {
            let receipt = self.chain.await_transaction(tx_hash).await?;
            if receipt.status == Some(U64::zero()) {
                return Err(ChainError::MintRejected(format!("{:?} reverted", tx_hash)));
            }
            match receipt.block_number {
                Some(block) => writeln!(out, "Mint confirmed in block {}", block)?,
                None => writeln!(out, "Mint confirmed")?,
            }
        }

        Ok(tx_hash)
    }

    async fn name(&self, token: &ContractInstance) -> Result<String> {
        self.chain
            .call(token, "name", vec![])
            .await?
            .into_iter()
            .next()
            .and_then(Token::into_string)
            .ok_or_else(|| ChainError::RemoteCallError("name: expected a string".to_string()))
    }

    async fn total_supply(&self, token: &ContractInstance) -> Result<U256> {
        self.chain
            .call(token, "totalSupply", vec![])
            .await?
            .into_iter()
            .next()
            .and_then(Token::into_uint)
            .ok_or_else(|| {
                ChainError::RemoteCallError("totalSupply: expected an integer".to_string())
            })
    }
}
