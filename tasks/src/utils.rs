use std::time::Duration;

use anyhow::Result;
use ethers::{
    providers::Middleware,
    types::{
        transaction::eip2718::TypedTransaction, Bytes, Eip1559TransactionRequest,
        TransactionReceipt, TransactionRequest, H160, H256, U256,
    },
};
use tokio::time::{sleep, Instant};

pub async fn send_transaction<M>(
    client: &M,
    from: H160,
    data: Bytes,
    to: Option<H160>,
    value: U256,
    legacy: bool,
) -> Result<H256>
where
    M: Middleware,
    M::Error: 'static,
{
    let mut tx: TypedTransaction = if legacy {
        let mut tx = TransactionRequest::new().from(from).data(data).value(value);
        if let Some(to) = to {
            tx = tx.to(to);
        }
        tx.into()
    } else {
        let mut tx = Eip1559TransactionRequest::new()
            .from(from)
            .data(data)
            .value(value);
        if let Some(to) = to {
            tx = tx.to(to);
        }
        tx.into()
    };

    client.fill_transaction(&mut tx, None).await?;

    let transaction_hash = client.send_transaction(tx, None).await?.tx_hash();
    log::info!("transaction hash:{:?}", transaction_hash);
    Ok(transaction_hash)
}

/// Polls for the receipt of `transaction_hash`. `None` once `timeout` has elapsed.
pub async fn wait_transaction<M>(
    client: &M,
    transaction_hash: H256,
    interval: Duration,
    timeout: Duration,
) -> Result<Option<TransactionReceipt>>
where
    M: Middleware,
    M::Error: 'static,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(receipt) = client.get_transaction_receipt(transaction_hash).await? {
            return Ok(Some(receipt));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        log::debug!("waiting for transaction:{:?}", transaction_hash);
        sleep(interval).await;
    }
}

/// Formats an integer with `,` between groups of three digits.
pub fn group_thousands(value: impl ToString) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
