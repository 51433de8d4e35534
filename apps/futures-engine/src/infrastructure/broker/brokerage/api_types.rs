//! Brokerage REST request and response types.
//!
//! These types map directly to the brokerage's JSON wire format.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Authentication
// ============================================================================

/// Body of `POST /auth/token`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    /// Login name.
    pub name: String,
    /// Password.
    pub password: String,
    /// Application id.
    pub app_id: String,
    /// Application version.
    pub app_version: String,
    /// Client id.
    pub cid: String,
    /// Client secret.
    pub sec: String,
    /// Device id.
    pub device_id: String,
}

/// Response of `POST /auth/token`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer token.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Token expiry.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Login failure description.
    #[serde(default)]
    pub error_text: Option<String>,
}

// ============================================================================
// Order commands
// ============================================================================

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderAction {
    /// Buy.
    Buy,
    /// Sell.
    Sell,
}

impl OrderAction {
    /// The closing side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

/// Remote order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteOrderType {
    /// Market.
    Market,
    /// Limit.
    Limit,
    /// Stop.
    Stop,
    /// Any type this client does not model.
    #[serde(other)]
    Other,
}

/// Child order of a bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketChild {
    /// Side; opposite of the entry.
    pub action: OrderAction,
    /// Limit for take-profit, Stop for stop-loss.
    pub order_type: RemoteOrderType,
    /// Limit price.
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,
    /// Stop trigger price.
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub stop_price: Option<Decimal>,
}

/// Body of `POST /order/placeBracket`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketOrderRequest {
    /// Account name.
    pub account_spec: String,
    /// Numeric account id.
    pub account_id: i64,
    /// Entry side.
    pub action: OrderAction,
    /// Contract symbol.
    pub symbol: String,
    /// Contracts.
    pub order_qty: u32,
    /// Market or Limit entry.
    pub order_type: RemoteOrderType,
    /// Entry limit price.
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,
    /// Placed by software.
    pub is_automated: bool,
    /// Limit exit at the target.
    pub take_profit: BracketChild,
    /// Stop exit at the stop.
    pub stop_loss: BracketChild,
}

/// Response of `POST /order/placeBracket`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketResponse {
    /// Entry order id.
    #[serde(default)]
    pub main_order_id: Option<i64>,
    /// Take-profit child id.
    #[serde(default)]
    pub profit_child_id: Option<i64>,
    /// Stop-loss child id.
    #[serde(default)]
    pub stop_child_id: Option<i64>,
    /// Failure code.
    #[serde(default)]
    pub failure_reason: Option<String>,
    /// Failure description.
    #[serde(default)]
    pub failure_text: Option<String>,
}

/// Body of `POST /order/cancel`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    /// Order to cancel.
    pub order_id: i64,
}

/// Body of `POST /order/liquidatePosition`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidateRequest {
    /// Account holding the position.
    pub account_id: i64,
    /// Instrument to flatten.
    pub instrument_id: i64,
}

/// Response of cancel and liquidate commands.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    /// Accepted command id.
    #[serde(default)]
    pub command_id: Option<i64>,
    /// Failure code.
    #[serde(default)]
    pub failure_reason: Option<String>,
    /// Failure description.
    #[serde(default)]
    pub failure_text: Option<String>,
}

// ============================================================================
// Order status
// ============================================================================

/// Remote order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteOrderStatus {
    /// Accepted, not yet working.
    PendingNew,
    /// Resting at the exchange.
    Working,
    /// Completely filled.
    Filled,
    /// Cancelled.
    Canceled,
    /// Rejected.
    Rejected,
    /// Expired.
    Expired,
    /// Status this client does not model.
    #[serde(other)]
    Unknown,
}

impl RemoteOrderStatus {
    /// Still able to fill.
    #[must_use]
    pub const fn is_working(self) -> bool {
        matches!(self, Self::PendingNew | Self::Working)
    }

    /// Ended without filling.
    #[must_use]
    pub const fn is_dead(self) -> bool {
        matches!(self, Self::Canceled | Self::Rejected | Self::Expired)
    }
}

/// `GET /order/status` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHeader {
    /// Order id.
    pub id: i64,
    /// Account id.
    pub account_id: i64,
    /// Instrument id.
    pub contract_id: i64,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Side.
    pub action: OrderAction,
    /// Status.
    pub ord_status: RemoteOrderStatus,
}

/// One entry of `GET /order/versions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderVersion {
    /// Version id; later versions have larger ids.
    pub id: i64,
    /// Order id.
    pub order_id: i64,
    /// Contracts.
    pub order_qty: u32,
    /// Order type.
    pub order_type: RemoteOrderType,
    /// Limit price.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    /// Stop trigger price.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub stop_price: Option<Decimal>,
}

/// One entry of `GET /fill/list`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    /// Fill id.
    pub id: i64,
    /// Order id.
    pub order_id: i64,
    /// Execution time.
    pub timestamp: DateTime<Utc>,
    /// Contracts filled.
    pub qty: u32,
    /// Execution price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Merged view of an order's header, latest version and fills.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOrder {
    /// Order id.
    pub order_id: i64,
    /// Side.
    pub side: OrderAction,
    /// Contracts.
    pub contracts: u32,
    /// Instrument id.
    pub instrument_id: i64,
    /// Order type.
    pub order_type: RemoteOrderType,
    /// Limit price.
    pub limit_price: Option<Decimal>,
    /// Stop price.
    pub stop_price: Option<Decimal>,
    /// Fill-quantity-weighted average price.
    pub avg_fill_price: Option<Decimal>,
    /// Status.
    pub status: RemoteOrderStatus,
    /// Latest fill time.
    pub fill_timestamp: Option<DateTime<Utc>>,
}

impl RemoteOrder {
    /// Merge the three status lookups into one view.
    #[must_use]
    pub fn merge(header: OrderHeader, versions: &[OrderVersion], fills: &[Fill]) -> Self {
        let latest = versions.iter().max_by_key(|v| v.id);

        let filled_qty: u32 = fills.iter().map(|f| f.qty).sum();
        let avg_fill_price = (filled_qty > 0).then(|| {
            let notional: Decimal = fills
                .iter()
                .map(|f| f.price * Decimal::from(f.qty))
                .sum();
            notional / Decimal::from(filled_qty)
        });

        Self {
            order_id: header.id,
            side: header.action,
            contracts: latest.map_or(0, |v| v.order_qty),
            instrument_id: header.contract_id,
            order_type: latest.map_or(RemoteOrderType::Other, |v| v.order_type),
            limit_price: latest.and_then(|v| v.price),
            stop_price: latest.and_then(|v| v.stop_price),
            avg_fill_price,
            status: header.ord_status,
            fill_timestamp: fills.iter().map(|f| f.timestamp).max(),
        }
    }
}

// ============================================================================
// Cash balances
// ============================================================================

/// One entry of `GET /cashBalance/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashBalance {
    /// Account id.
    pub account_id: i64,
    /// Trade date, `YYYY-MM-DD`.
    pub trade_date: String,
    /// Currency code.
    pub currency: String,
    /// Cash amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Realized P&L for the trade date.
    #[serde(
        rename = "realizedPnL",
        default,
        with = "rust_decimal::serde::float_option"
    )]
    pub realized_pnl: Option<Decimal>,
}
