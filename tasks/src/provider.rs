use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use ethers::{
    abi::Token,
    middleware::SignerMiddleware,
    providers::{Http, JsonRpcClient, Middleware, Provider},
    signers::{coins_bip39::English, LocalWallet, MnemonicBuilder, Signer},
    types::{
        transaction::eip2718::TypedTransaction, Address, Bytes, TransactionReceipt,
        TransactionRequest, TxHash, U256, U64,
    },
    utils::hex,
};

use crate::{
    contracts::{ContractInstance, ContractInterface},
    error::{ChainError, Result},
    utils::{send_transaction, wait_transaction},
};

/// A submitted but not yet confirmed contract creation.
#[derive(Debug, Clone)]
pub struct PendingDeployment {
    pub tx_hash: TxHash,
    pub deployer: Address,
    pub interface: ContractInterface,
}

/// Everything the tasks need from the chain.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Signing accounts, in configuration order.
    async fn list_accounts(&self) -> Result<Vec<Address>>;

    fn resolve_contract(&self, name: &str) -> Result<ContractInterface>;

    async fn deploy(
        &self,
        interface: &ContractInterface,
        signer: Address,
        args: Vec<Token>,
    ) -> Result<PendingDeployment>;

    async fn await_confirmation(&self, pending: PendingDeployment) -> Result<ContractInstance>;

    /// Local binding only, no chain round-trip.
    fn attach(&self, interface: &ContractInterface, address: &str) -> Result<ContractInstance> {
        interface.attach(address)
    }

    /// Read-only call.
    async fn call(
        &self,
        instance: &ContractInstance,
        method: &str,
        args: Vec<Token>,
    ) -> Result<Vec<Token>>;

    /// Submits a state-changing call and returns as soon as it has a hash.
    /// `None` signs with the default (first) account.
    async fn send(
        &self,
        instance: &ContractInstance,
        method: &str,
        args: Vec<Token>,
        signer: Option<Address>,
    ) -> Result<TxHash>;

    async fn await_transaction(&self, tx_hash: TxHash) -> Result<TransactionReceipt>;
}

#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub rpc: String,
    pub private_keys: Vec<String>,
    pub mnemonic: Option<String>,
    pub mnemonic_accounts: u32,
    pub artifacts: PathBuf,
    pub legacy: bool,
    pub poll_interval: Duration,
    pub confirmation_timeout: Duration,
}

/// [`ChainProvider`] over a JSON-RPC node.
pub struct EthersChain<P = Http> {
    provider: Provider<P>,
    wallets: Vec<LocalWallet>,
    artifacts: PathBuf,
    legacy: bool,
    poll_interval: Duration,
    confirmation_timeout: Duration,
}

impl EthersChain<Http> {
    pub async fn new(config: ChainConfig) -> anyhow::Result<Self> {
        let provider = Provider::<Http>::try_from(config.rpc.as_str())?;

        let mut wallets = Vec::new();
        for sk in &config.private_keys {
            let sk = sk.trim();
            wallets.push(LocalWallet::from_bytes(&hex::decode(
                sk.strip_prefix("0x").unwrap_or(sk),
            )?)?);
        }
        if let Some(mnemonic) = &config.mnemonic {
            for index in 0..config.mnemonic_accounts {
                wallets.push(
                    MnemonicBuilder::<English>::default()
                        .phrase(mnemonic.as_str())
                        .index(index)?
                        .build()?,
                );
            }
        }

        if !wallets.is_empty() {
            let chain_id = provider.get_chainid().await?.as_u64();
            log::info!("chain id:{}", chain_id);
            wallets = wallets
                .into_iter()
                .map(|wallet| wallet.with_chain_id(chain_id))
                .collect();
        }

        Ok(Self::with_wallets(provider, wallets, config))
    }
}

impl<P: JsonRpcClient + Clone + 'static> EthersChain<P> {
    pub fn with_wallets(provider: Provider<P>, wallets: Vec<LocalWallet>, config: ChainConfig) -> Self {
        Self {
            provider,
            wallets,
            artifacts: config.artifacts,
            legacy: config.legacy,
            poll_interval: config.poll_interval,
            confirmation_timeout: config.confirmation_timeout,
        }
    }

    fn wallet(&self, address: Address) -> Option<&LocalWallet> {
        self.wallets.iter().find(|w| w.address() == address)
    }

    async fn submit(&self, from: Address, data: Bytes, to: Option<Address>) -> anyhow::Result<TxHash> {
        match self.wallet(from) {
            Some(wallet) => {
                let client = SignerMiddleware::new(self.provider.clone(), wallet.clone());
                send_transaction(&client, from, data, to, U256::zero(), self.legacy).await
            }
            // unlocked node account
            None => {
                send_transaction(&self.provider, from, data, to, U256::zero(), self.legacy).await
            }
        }
    }

    async fn default_signer(&self) -> Result<Address> {
        self.list_accounts()
            .await?
            .first()
            .copied()
            .ok_or(ChainError::NoAccountsConfigured)
    }

    async fn receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt> {
        wait_transaction(
            &self.provider,
            tx_hash,
            self.poll_interval,
            self.confirmation_timeout,
        )
        .await
        .map_err(|e| ChainError::RemoteCallError(format!("{:#}", e)))?
        .ok_or_else(|| ChainError::ConfirmationTimeout(format!("{:?}", tx_hash)))
    }
}

#[async_trait]
impl<P: JsonRpcClient + Clone + 'static> ChainProvider for EthersChain<P> {
    async fn list_accounts(&self) -> Result<Vec<Address>> {
        if !self.wallets.is_empty() {
            return Ok(self.wallets.iter().map(|w| w.address()).collect());
        }
        self.provider
            .get_accounts()
            .await
            .map_err(|e| ChainError::RemoteCallError(e.to_string()))
    }

    fn resolve_contract(&self, name: &str) -> Result<ContractInterface> {
        ContractInterface::from_artifacts(&self.artifacts, name)
    }

    async fn deploy(
        &self,
        interface: &ContractInterface,
        signer: Address,
        args: Vec<Token>,
    ) -> Result<PendingDeployment> {
        let code = match interface.abi.constructor() {
            Some(constructor) => constructor
                .encode_input(interface.bytecode.to_vec(), &args)
                .map_err(|e| ChainError::DeploymentRejected(e.to_string()))?,
            None if args.is_empty() => interface.bytecode.to_vec(),
            None => {
                return Err(ChainError::DeploymentRejected(format!(
                    "{} has no constructor but {} arguments were given",
                    interface.name,
                    args.len()
                )))
            }
        };

        let tx_hash = self
            .submit(signer, code.into(), None)
            .await
            .map_err(|e| ChainError::DeploymentRejected(format!("{:#}", e)))?;

        Ok(PendingDeployment {
            tx_hash,
            deployer: signer,
            interface: interface.clone(),
        })
    }

    async fn await_confirmation(&self, pending: PendingDeployment) -> Result<ContractInstance> {
        let receipt = self.receipt(pending.tx_hash).await?;
        if receipt.status == Some(U64::zero()) {
            return Err(ChainError::DeploymentReverted(format!(
                "{:?}",
                pending.tx_hash
            )));
        }
        let address = receipt.contract_address.ok_or_else(|| {
            ChainError::DeploymentReverted(format!(
                "{:?} created no contract",
                pending.tx_hash
            ))
        })?;
        log::info!(
            "{} from {:?} confirmed in block:{:?}",
            pending.interface.name,
            pending.deployer,
            receipt.block_number
        );

        Ok(pending.interface.at(address))
    }

    async fn call(
        &self,
        instance: &ContractInstance,
        method: &str,
        args: Vec<Token>,
    ) -> Result<Vec<Token>> {
        let function = instance
            .abi
            .function(method)
            .map_err(|e| ChainError::RemoteCallError(format!("{}: {}", method, e)))?;
        let data = function
            .encode_input(&args)
            .map_err(|e| ChainError::RemoteCallError(format!("{}: {}", method, e)))?;

        let tx: TypedTransaction = TransactionRequest::new()
            .to(instance.address)
            .data(data)
            .into();
        let output = self
            .provider
            .call(&tx, None)
            .await
            .map_err(|e| ChainError::RemoteCallError(format!("{}: {}", method, e)))?;

        function
            .decode_output(&output)
            .map_err(|e| ChainError::RemoteCallError(format!("{}: {}", method, e)))
    }

    async fn send(
        &self,
        instance: &ContractInstance,
        method: &str,
        args: Vec<Token>,
        signer: Option<Address>,
    ) -> Result<TxHash> {
        let from = match signer {
            Some(signer) => signer,
            None => self.default_signer().await?,
        };
        let data = instance
            .abi
            .function(method)
            .and_then(|function| function.encode_input(&args))
            .map_err(|e| ChainError::MintRejected(format!("{}: {}", method, e)))?;

        self.submit(from, data.into(), Some(instance.address))
            .await
            .map_err(|e| ChainError::MintRejected(format!("{:#}", e)))
    }

    async fn await_transaction(&self, tx_hash: TxHash) -> Result<TransactionReceipt> {
        self.receipt(tx_hash).await
    }
}
