//! Typed brokerage endpoints on top of [`BrokerageHttpClient`].

use tracing::debug;

use super::api_types::{
    BracketOrderRequest, BracketResponse, CancelRequest, CashBalance, CommandResponse, Fill,
    LiquidateRequest, OrderHeader, OrderVersion, RemoteOrder,
};
use super::config::BrokerageConfig;
use super::error::BrokerageError;
use super::http_client::BrokerageHttpClient;

const PLACE_BRACKET_PATH: &str = "/order/placeBracket";
const CANCEL_PATH: &str = "/order/cancel";
const LIQUIDATE_PATH: &str = "/order/liquidatePosition";
const CASH_BALANCE_PATH: &str = "/cashBalance/list";

/// Remote ids of a submitted bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketIds {
    /// Entry order.
    pub main: i64,
    /// Take-profit child.
    pub profit: i64,
    /// Stop-loss child.
    pub stop: i64,
}

/// Brokerage REST client.
///
/// Cheap to share behind an `Arc`; every account adapter uses the same
/// instance so they share one token.
#[derive(Debug)]
pub struct BrokerageClient {
    http: BrokerageHttpClient,
}

impl BrokerageClient {
    /// Create a client from config.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: &BrokerageConfig) -> Result<Self, BrokerageError> {
        Ok(Self {
            http: BrokerageHttpClient::new(config)?,
        })
    }

    /// Number of logins performed so far.
    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.http.tokens().refresh_count()
    }

    /// Submit an entry with take-profit and stop-loss children.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` if the brokerage refuses the bracket.
    pub async fn place_bracket(
        &self,
        request: &BracketOrderRequest,
    ) -> Result<BracketIds, BrokerageError> {
        let response: BracketResponse = self.http.post(PLACE_BRACKET_PATH, request).await?;

        if let Some(reason) = response.failure_reason {
            return Err(BrokerageError::Rejected {
                endpoint: PLACE_BRACKET_PATH.to_string(),
                reason,
                text: response.failure_text.unwrap_or_default(),
            });
        }

        match (
            response.main_order_id,
            response.profit_child_id,
            response.stop_child_id,
        ) {
            (Some(main), Some(profit), Some(stop)) => {
                debug!(main, profit, stop, symbol = %request.symbol, "Bracket accepted");
                Ok(BracketIds { main, profit, stop })
            }
            _ => Err(BrokerageError::Rejected {
                endpoint: PLACE_BRACKET_PATH.to_string(),
                reason: "MissingOrderIds".to_string(),
                text: "Bracket response is missing one or more order ids".to_string(),
            }),
        }
    }

    /// Cancel a working order.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` if the brokerage refuses the cancel.
    pub async fn cancel_order(&self, order_id: i64) -> Result<(), BrokerageError> {
        let response: CommandResponse = self
            .http
            .post(CANCEL_PATH, &CancelRequest { order_id })
            .await?;
        check_command(CANCEL_PATH, response)
    }

    /// Flatten the position in an instrument.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` if the brokerage refuses the liquidation.
    pub async fn liquidate_position(
        &self,
        account_id: i64,
        instrument_id: i64,
    ) -> Result<(), BrokerageError> {
        let request = LiquidateRequest {
            account_id,
            instrument_id,
        };
        let response: CommandResponse = self.http.post(LIQUIDATE_PATH, &request).await?;
        check_command(LIQUIDATE_PATH, response)
    }

    /// Header, latest version and fills of an order, merged.
    ///
    /// # Errors
    ///
    /// Propagates any of the three lookups' errors.
    pub async fn order_status(&self, order_id: i64) -> Result<RemoteOrder, BrokerageError> {
        let header: OrderHeader = self
            .http
            .get(&format!("/order/status?id={order_id}"))
            .await?;
        let versions: Vec<OrderVersion> = self
            .http
            .get(&format!("/order/versions?orderId={order_id}"))
            .await?;
        let fills: Vec<Fill> = self
            .http
            .get(&format!("/fill/list?orderId={order_id}"))
            .await?;

        Ok(RemoteOrder::merge(header, &versions, &fills))
    }

    /// Cash balances for every account visible to the login.
    ///
    /// # Errors
    ///
    /// Propagates request errors.
    pub async fn cash_balances(&self) -> Result<Vec<CashBalance>, BrokerageError> {
        self.http.get(CASH_BALANCE_PATH).await
    }
}

fn check_command(endpoint: &str, response: CommandResponse) -> Result<(), BrokerageError> {
    match response.failure_reason {
        Some(reason) => Err(BrokerageError::Rejected {
            endpoint: endpoint.to_string(),
            reason,
            text: response.failure_text.unwrap_or_default(),
        }),
        None => Ok(()),
    }
}
