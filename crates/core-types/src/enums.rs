use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The strategy family that produced an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpportunityClass {
    EventDrivenOpportunity,
    FeeExploitation,
    StructuredLoopArbitrage,
    MultiExchangeArbitrage,
}

impl OpportunityClass {
    /// The exact identifier the backend uses on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpportunityClass::EventDrivenOpportunity => "EVENT_DRIVEN_OPPORTUNITY",
            OpportunityClass::FeeExploitation => "FEE_EXPLOITATION",
            OpportunityClass::StructuredLoopArbitrage => "STRUCTURED_LOOP_ARBITRAGE",
            OpportunityClass::MultiExchangeArbitrage => "MULTI_EXCHANGE_ARBITRAGE",
        }
    }

    /// Short human label used in filter menus.
    pub fn label(&self) -> &'static str {
        match self {
            OpportunityClass::EventDrivenOpportunity => "Event Driven",
            OpportunityClass::FeeExploitation => "Fee Exploitation",
            OpportunityClass::StructuredLoopArbitrage => "Loop Arbitrage",
            OpportunityClass::MultiExchangeArbitrage => "Multi-Exchange Arbitrage",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::VeryHigh => "VERY_HIGH",
        }
    }
}

/// Priority tier the backend assigns to a multi-exchange aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Bitcoin,
    Bsc,
    Polygon,
}

impl Chain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ethereum",
            Chain::Bitcoin => "bitcoin",
            Chain::Bsc => "bsc",
            Chain::Polygon => "polygon",
        }
    }
}

/// Centralised or decentralised venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExchangeType {
    #[serde(rename = "CEX")]
    Cex,
    #[serde(rename = "DEX")]
    Dex,
}

impl ExchangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeType::Cex => "CEX",
            ExchangeType::Dex => "DEX",
        }
    }
}

// --- Display / FromStr ---
// Every enum round-trips through its wire name so the CLI can accept the same
// spelling the backend uses. Parsing is case-insensitive.

macro_rules! wire_name_impls {
    ($ty:ident, $what:literal, [$($variant:ident),+ $(,)?]) => {
        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| CoreError::InvalidInput($what.to_string(), s.to_string()))
            }
        }
    };
}

wire_name_impls!(
    OpportunityClass,
    "opportunity class",
    [EventDrivenOpportunity, FeeExploitation, StructuredLoopArbitrage, MultiExchangeArbitrage]
);
wire_name_impls!(RiskLevel, "risk level", [Low, Medium, High, VeryHigh]);
wire_name_impls!(Priority, "priority", [High, Medium, Low]);
wire_name_impls!(Chain, "chain", [Ethereum, Bitcoin, Bsc, Polygon]);
wire_name_impls!(ExchangeType, "exchange type", [Cex, Dex]);
