//! In-memory chain used by the command tests.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use ethers::{
    abi::Token,
    types::{Address, TransactionReceipt, TxHash, U256, U64},
};

use crate::{
    contracts::{tests::token_interface, ContractInstance, ContractInterface},
    error::{ChainError, Result},
    provider::{ChainProvider, PendingDeployment},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Confirmation {
    Included,
    Timeout,
    Reverted,
}

#[derive(Debug, Clone)]
struct TokenState {
    name: String,
    symbol: String,
    total_supply: U256,
}

pub struct MockChain {
    pub accounts: Vec<Address>,
    pub artifact: bool,
    pub reject_deploy: bool,
    pub confirmation: Confirmation,
    pub reject_send: bool,
    pub mint_hash: TxHash,
    pub block_number: Option<U64>,
    pub deploy_args: Mutex<Vec<Vec<Token>>>,
    calls: Mutex<Vec<String>>,
    tokens: Mutex<HashMap<Address, TokenState>>,
    deployed: Mutex<u64>,
}

impl MockChain {
    pub fn new(accounts: Vec<Address>) -> Self {
        Self {
            accounts,
            artifact: true,
            reject_deploy: false,
            confirmation: Confirmation::Included,
            reject_send: false,
            mint_hash: TxHash::repeat_byte(0xab),
            block_number: Some(U64::from(42)),
            deploy_args: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            tokens: Mutex::new(HashMap::new()),
            deployed: Mutex::new(0),
        }
    }

    pub fn with_token(self, address: Address, name: &str, symbol: &str, total_supply: u64) -> Self {
        self.tokens.lock().unwrap().insert(
            address,
            TokenState {
                name: name.to_string(),
                symbol: symbol.to_string(),
                total_supply: total_supply.into(),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn total_supply(&self, address: Address) -> Option<U256> {
        self.tokens
            .lock()
            .unwrap()
            .get(&address)
            .map(|token| token.total_supply)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ChainProvider for MockChain {
    async fn list_accounts(&self) -> Result<Vec<Address>> {
        self.record("list_accounts".to_string());
        Ok(self.accounts.clone())
    }

    fn resolve_contract(&self, name: &str) -> Result<ContractInterface> {
        self.record(format!("resolve:{}", name));
        if !self.artifact || name != "EncryptedERC20" {
            return Err(ChainError::ArtifactNotFound(name.to_string()));
        }
        Ok(token_interface())
    }

    async fn deploy(
        &self,
        interface: &ContractInterface,
        signer: Address,
        args: Vec<Token>,
    ) -> Result<PendingDeployment> {
        self.record(format!("deploy:{:?}", signer));
        self.deploy_args.lock().unwrap().push(args.clone());
        if self.reject_deploy {
            return Err(ChainError::DeploymentRejected("insufficient funds".to_string()));
        }

        let mut deployed = self.deployed.lock().unwrap();
        *deployed += 1;
        let address = Address::from_low_u64_be(0xfeed_0000 + *deployed);
        let mut args = args.into_iter();
        let name = args.next().and_then(Token::into_string).unwrap_or_default();
        let symbol = args.next().and_then(Token::into_string).unwrap_or_default();
        self.tokens.lock().unwrap().insert(
            address,
            TokenState {
                name,
                symbol,
                total_supply: U256::zero(),
            },
        );

        Ok(PendingDeployment {
            tx_hash: TxHash::from_low_u64_be(*deployed),
            deployer: signer,
            interface: interface.clone(),
        })
    }

    async fn await_confirmation(&self, pending: PendingDeployment) -> Result<ContractInstance> {
        self.record(format!("confirm:{:?}", pending.tx_hash));
        match self.confirmation {
            Confirmation::Timeout => Err(ChainError::ConfirmationTimeout(format!(
                "{:?}",
                pending.tx_hash
            ))),
            Confirmation::Reverted => Err(ChainError::DeploymentReverted(format!(
                "{:?}",
                pending.tx_hash
            ))),
            Confirmation::Included => {
                let address = Address::from_low_u64_be(0xfeed_0000 + pending.tx_hash.to_low_u64_be());
                Ok(pending.interface.at(address))
            }
        }
    }

    fn attach(&self, interface: &ContractInterface, address: &str) -> Result<ContractInstance> {
        self.record(format!("attach:{}", address));
        interface.attach(address)
    }

    async fn call(
        &self,
        instance: &ContractInstance,
        method: &str,
        _args: Vec<Token>,
    ) -> Result<Vec<Token>> {
        self.record(format!("call:{}", method));
        let tokens = self.tokens.lock().unwrap();
        let token = tokens.get(&instance.address).ok_or_else(|| {
            ChainError::RemoteCallError(format!("no contract at {:?}", instance.address))
        })?;
        match method {
            "name" => Ok(vec![Token::String(token.name.clone())]),
            "symbol" => Ok(vec![Token::String(token.symbol.clone())]),
            "totalSupply" => Ok(vec![Token::Uint(token.total_supply)]),
            _ => Err(ChainError::RemoteCallError(format!("{}: unknown method", method))),
        }
    }

    async fn send(
        &self,
        instance: &ContractInstance,
        method: &str,
        args: Vec<Token>,
        signer: Option<Address>,
    ) -> Result<TxHash> {
        self.record(format!("send:{}:{:?}", method, signer));
        if self.reject_send {
            return Err(ChainError::MintRejected("nonce too low".to_string()));
        }
        let amount = args
            .into_iter()
            .next()
            .and_then(Token::into_uint)
            .ok_or_else(|| ChainError::MintRejected(format!("{}: missing amount", method)))?;
        if let Some(token) = self.tokens.lock().unwrap().get_mut(&instance.address) {
            token.total_supply += amount;
        }
        Ok(self.mint_hash)
    }

    async fn await_transaction(&self, tx_hash: TxHash) -> Result<TransactionReceipt> {
        self.record(format!("await:{:?}", tx_hash));
        let status = match self.confirmation {
            Confirmation::Timeout => {
                return Err(ChainError::ConfirmationTimeout(format!("{:?}", tx_hash)))
            }
            Confirmation::Reverted => U64::zero(),
            Confirmation::Included => U64::one(),
        };
        Ok(TransactionReceipt {
            transaction_hash: tx_hash,
            block_number: self.block_number,
            status: Some(status),
            ..Default::default()
        })
    }
}
