//! HTTP client for the inventory service's ledger endpoint.
//!
//! One call, one POST. There is no retry and no timeout override, so the
//! client cannot tell "remote rejected" apart from "remote committed but the
//! response was lost". Callers get a normalized [`LedgerResponse`] either way.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use stockroom_core::OrderId;
use stockroom_inventory::{InventoryTransaction, LedgerEntry, LedgerResponse};

#[async_trait]
pub trait InventoryLedger: Send + Sync {
    /// Record one stock/money movement. Transport failures are folded into
    /// `{success: false, error}`.
    async fn record(&self, entry: &LedgerEntry) -> LedgerResponse;

    /// Transactions carrying `order_id` as their correlation id.
    async fn list_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<InventoryTransaction>, LedgerClientError>;
}

#[async_trait]
impl<L> InventoryLedger for std::sync::Arc<L>
where
    L: InventoryLedger + ?Sized,
{
    async fn record(&self, entry: &LedgerEntry) -> LedgerResponse {
        (**self).record(entry).await
    }

    async fn list_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<InventoryTransaction>, LedgerClientError> {
        (**self).list_for_order(order_id).await
    }
}

/// Errors that can occur when talking to the inventory service.
#[derive(Debug, Error)]
pub enum LedgerClientError {
    #[error("inventory service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inventory service rejected the request: {0}")]
    Rejected(String),

    #[error("unexpected response from inventory service: {0}")]
    UnexpectedResponse(String),
}

/// `reqwest`-backed ledger client.
#[derive(Debug, Clone)]
pub struct HttpInventoryLedger {
    base_url: String,
    http: Client,
}

impl HttpInventoryLedger {
    /// `base_url` is the inventory service root, e.g. `"http://inventory:8082"`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    fn transactions_url(&self) -> String {
        format!("{}/inventory/transactions", self.base_url)
    }

    async fn post_entry(&self, entry: &LedgerEntry) -> Result<LedgerResponse, LedgerClientError> {
        let response = self
            .http
            .post(self.transactions_url())
            .json(entry)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        match serde_json::from_str::<LedgerResponse>(&text) {
            Ok(parsed) if status.is_success() || !parsed.success => Ok(parsed),
            _ if !status.is_success() => Err(LedgerClientError::Rejected(format!(
                "status {status}: {text}"
            ))),
            _ => Err(LedgerClientError::UnexpectedResponse(text)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TransactionList {
    success: bool,
    #[serde(default)]
    data: Vec<InventoryTransaction>,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
impl InventoryLedger for HttpInventoryLedger {
    async fn record(&self, entry: &LedgerEntry) -> LedgerResponse {
        match self.post_entry(entry).await {
            Ok(response) => response,
            Err(err) => {
                debug!(product_id = %entry.product_id, error = %err, "ledger call failed");
                LedgerResponse::failure(err.to_string())
            }
        }
    }

    async fn list_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<InventoryTransaction>, LedgerClientError> {
        let response = self
            .http
            .get(self.transactions_url())
            .query(&[("order_id", order_id.get())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LedgerClientError::Rejected(format!("status {status}: {text}")));
        }

        let parsed: TransactionList = response.json().await?;
        if !parsed.success {
            return Err(LedgerClientError::Rejected(
                parsed.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(parsed.data)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use stockroom_core::{ProductId, StaffId};
    use stockroom_inventory::{MoneyType, TransactionType};

    use super::*;

    fn entry() -> LedgerEntry {
        LedgerEntry {
            transaction_type: TransactionType::Out,
            product_id: ProductId::new(10),
            quantity: 2,
            staff_id: StaffId::new(3),
            order_id: Some(OrderId::new(1)),
            supplier_id: None,
            amount: Some(Decimal::new(3000, 2)),
            money_type: Some(MoneyType::Income),
            notes: Some("Order #ORD-1".to_string()),
        }
    }

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let client = HttpInventoryLedger::new("http://inventory:8082/");
        assert_eq!(
            client.transactions_url(),
            "http://inventory:8082/inventory/transactions"
        );
    }

    #[tokio::test]
    async fn unreachable_service_is_normalized_to_failure() {
        // Port 9 (discard) on loopback has no listener in test environments.
        let client = HttpInventoryLedger::new("http://127.0.0.1:9");
        let response = client.record(&entry()).await;

        assert!(!response.success);
        assert!(response.data.is_none());
        assert!(response.error.is_some());
    }
}
