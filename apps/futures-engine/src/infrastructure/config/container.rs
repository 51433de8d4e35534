//! Dependency Injection Container
//!
//! Wires the lead broker from configuration: the simulator first, then one
//! live adapter per configured account, all sharing a single brokerage
//! client and therefore a single token.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::{BrokerError, BrokerPort, LeadBroker, RulePipeline};
use crate::config::{Config, ConfigError};
use crate::infrastructure::broker::brokerage::api_types::CashBalance;
use crate::infrastructure::broker::brokerage::{BrokerageClient, BrokerageError};
use crate::infrastructure::broker::{LiveBrokerAdapter, SimulatedBroker};

/// Errors raised while wiring the container.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Brokerage client could not be built.
    #[error(transparent)]
    Brokerage(#[from] BrokerageError),

    /// Lead broker could not be built.
    #[error(transparent)]
    Broker(#[from] BrokerError),
}

/// Dependency injection container.
#[derive(Debug)]
pub struct Container {
    lead: LeadBroker,
    client: Option<Arc<BrokerageClient>>,
}

impl Container {
    /// Build every component from `config`.
    ///
    /// # Errors
    ///
    /// Returns error if the rule timing is invalid or the brokerage client
    /// cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, ContainerError> {
        let timing = config.rules.to_timing()?;
        let risk = config.risk.to_profile(config.instruments.clone());

        let mut delegates: Vec<Box<dyn BrokerPort>> =
            vec![Box::new(SimulatedBroker::new(config.instruments.clone()))];

        let client = match &config.brokerage {
            Some(settings) if !config.accounts.is_empty() => Some(Arc::new(
                BrokerageClient::new(&settings.to_client_config())?,
            )),
            _ => None,
        };

        if let Some(client) = &client {
            for account in &config.accounts {
                let account = account.to_live_account(risk.risk_per_trade);
                info!(
                    account = %account.name,
                    account_id = account.account_id,
                    risk_per_trade = %account.risk_per_trade,
                    "Registering live account"
                );
                delegates.push(Box::new(LiveBrokerAdapter::new(
                    account,
                    Arc::clone(client),
                    risk.clone(),
                )));
            }
        }

        let lead = LeadBroker::new(delegates, RulePipeline::canonical(timing), risk)?;
        info!(delegates = ?lead.delegate_names(), "Lead broker ready");

        Ok(Self { lead, client })
    }

    /// The lead broker.
    #[must_use]
    pub const fn lead(&self) -> &LeadBroker {
        &self.lead
    }

    /// Take ownership of the lead broker.
    #[must_use]
    pub fn into_lead(self) -> LeadBroker {
        self.lead
    }

    /// The shared brokerage client, when live accounts are configured.
    #[must_use]
    pub fn client(&self) -> Option<Arc<BrokerageClient>> {
        self.client.as_ref().map(Arc::clone)
    }

    /// Cash balances across every configured account. Empty without a
    /// brokerage client.
    ///
    /// # Errors
    ///
    /// Propagates brokerage errors.
    pub async fn cash_balances(&self) -> Result<Vec<CashBalance>, BrokerageError> {
        match &self.client {
            Some(client) => client.cash_balances().await,
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_string;

    #[test]
    fn simulation_only_by_default() {
        let config = Config::default();
        let container = Container::from_config(&config).unwrap();
        assert_eq!(container.lead().delegate_names(), vec!["simulation"]);
        assert!(container.client().is_none());
    }

    #[test]
    fn live_accounts_follow_simulator() {
        let yaml = r"
brokerage:
  base_url: http://127.0.0.1:9
  username: trader
  password: p
  client_id: c
  client_secret: s
  device_id: d
accounts:
  - { name: DEMO1, account_id: 1001 }
  - { name: DEMO2, account_id: 1002, risk_per_trade: 275 }
";
        let config = load_config_from_string(yaml).unwrap();
        let container = Container::from_config(&config).unwrap();

        assert_eq!(
            container.lead().delegate_names(),
            vec!["simulation", "DEMO1", "DEMO2"]
        );
        assert!(container.client().is_some());
    }

    #[tokio::test]
    async fn cash_balances_empty_without_client() {
        let container = Container::from_config(&Config::default()).unwrap();
        assert!(container.cash_balances().await.unwrap().is_empty());
    }
}
