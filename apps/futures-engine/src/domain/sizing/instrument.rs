//! Instrument specifications for micro/standard contract pairs.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Tick size used when no instrument matches.
pub const DEFAULT_TICK_SIZE: Decimal = dec!(0.25);

/// Contract denomination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractTier {
    /// Micro contract (1/10 of standard).
    Micro,
    /// Standard (e-mini) contract.
    Standard,
}

impl std::fmt::Display for ContractTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Micro => write!(f, "MICRO"),
            Self::Standard => write!(f, "STANDARD"),
        }
    }
}

/// A micro/standard instrument pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentSpec {
    /// Symbol root of the micro contract, e.g. `MES`.
    pub micro_root: String,
    /// Symbol root of the standard contract, e.g. `ES`.
    pub standard_root: String,
    /// Dollars per point for one micro contract.
    pub micro_point_value: Decimal,
    /// Dollars per point for one standard contract.
    pub standard_point_value: Decimal,
    /// Minimum price increment.
    #[serde(default = "default_tick_size")]
    pub tick_size: Decimal,
    /// Round-trip fee per micro contract.
    #[serde(default = "default_micro_fee")]
    pub micro_fee: Decimal,
    /// Round-trip fee per standard contract.
    #[serde(default = "default_standard_fee")]
    pub standard_fee: Decimal,
}

const fn default_tick_size() -> Decimal {
    DEFAULT_TICK_SIZE
}

const fn default_micro_fee() -> Decimal {
    dec!(1.24)
}

const fn default_standard_fee() -> Decimal {
    dec!(4.34)
}

impl InstrumentSpec {
    /// Create a spec with default tick size and fees.
    #[must_use]
    pub fn new(
        micro_root: impl Into<String>,
        standard_root: impl Into<String>,
        micro_point_value: Decimal,
        standard_point_value: Decimal,
    ) -> Self {
        Self {
            micro_root: micro_root.into(),
            standard_root: standard_root.into(),
            micro_point_value,
            standard_point_value,
            tick_size: DEFAULT_TICK_SIZE,
            micro_fee: default_micro_fee(),
            standard_fee: default_standard_fee(),
        }
    }

    /// Set the tick size.
    #[must_use]
    pub const fn with_tick_size(mut self, tick_size: Decimal) -> Self {
        self.tick_size = tick_size;
        self
    }

    /// Dollars per point for a tier.
    #[must_use]
    pub const fn point_value(&self, tier: ContractTier) -> Decimal {
        match tier {
            ContractTier::Micro => self.micro_point_value,
            ContractTier::Standard => self.standard_point_value,
        }
    }

    /// Round-trip fee per contract for a tier.
    #[must_use]
    pub const fn fee(&self, tier: ContractTier) -> Decimal {
        match tier {
            ContractTier::Micro => self.micro_fee,
            ContractTier::Standard => self.standard_fee,
        }
    }

    /// Symbol root for a tier.
    #[must_use]
    pub fn root(&self, tier: ContractTier) -> &str {
        match tier {
            ContractTier::Micro => &self.micro_root,
            ContractTier::Standard => &self.standard_root,
        }
    }

    /// Rewrite `contract` to the given tier, keeping its expiry suffix.
    ///
    /// `MESM4` becomes `ESM4` for [`ContractTier::Standard`].
    #[must_use]
    pub fn symbol_for(&self, contract: &str, tier: ContractTier) -> String {
        let suffix = contract
            .strip_prefix(self.micro_root.as_str())
            .or_else(|| contract.strip_prefix(self.standard_root.as_str()))
            .unwrap_or("");
        format!("{}{suffix}", self.root(tier))
    }
}

/// Lookup table of instrument specs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentTable {
    specs: Vec<InstrumentSpec>,
}

impl Default for InstrumentTable {
    fn default() -> Self {
        Self::new(vec![
            InstrumentSpec::new("MES", "ES", dec!(5), dec!(50)),
            InstrumentSpec::new("MNQ", "NQ", dec!(2), dec!(20)),
            InstrumentSpec::new("MYM", "YM", dec!(0.5), dec!(5)).with_tick_size(dec!(1)),
            InstrumentSpec::new("M2K", "RTY", dec!(5), dec!(50)).with_tick_size(dec!(0.1)),
            InstrumentSpec::new("MGC", "GC", dec!(10), dec!(100)).with_tick_size(dec!(0.1)),
        ])
    }
}

impl InstrumentTable {
    /// Build a table from specs.
    #[must_use]
    pub const fn new(specs: Vec<InstrumentSpec>) -> Self {
        Self { specs }
    }

    /// All specs.
    #[must_use]
    pub fn specs(&self) -> &[InstrumentSpec] {
        &self.specs
    }

    /// Find the spec for a contract symbol.
    ///
    /// Micro roots are matched first so `MES` never resolves as `ES`.
    #[must_use]
    pub fn lookup(&self, contract: &str) -> Option<&InstrumentSpec> {
        self.specs
            .iter()
            .find(|spec| contract.starts_with(spec.micro_root.as_str()))
            .or_else(|| {
                self.specs
                    .iter()
                    .find(|spec| contract.starts_with(spec.standard_root.as_str()))
            })
    }

    /// Tick size for a contract, falling back to 0.25.
    #[must_use]
    pub fn tick_size(&self, contract: &str) -> Decimal {
        self.lookup(contract)
            .map_or(DEFAULT_TICK_SIZE, |spec| spec.tick_size)
    }
}
