//! Project records as read from Plaza contracts.
//!
//! Two projections exist: [`ProjectSummary`] for list views and
//! [`ProjectDetails`] for the detail page. Each is built from one concurrent
//! batch of reads and is never mutated afterwards; the next fetch cycle
//! produces fresh records.

use alloy_primitives::{Address, I256, U256};
use serde::{Deserialize, Serialize};

use crate::errors::ExplorerError;

/// Wei per native token unit (18 decimals).
const WEI_PER_UNIT: u64 = 1_000_000_000_000_000_000;

/// Lifecycle status stored in the Plaza contract as a `uint8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active = 0,
    Completed = 1,
    Cancelled = 2,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled projects never come back.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// The raw on-chain word; anything outside {0, 1, 2} is reported unchanged.
impl TryFrom<U256> for ProjectStatus {
    type Error = ExplorerError;

    fn try_from(raw: U256) -> Result<Self, Self::Error> {
        if raw == U256::from(0u64) {
            Ok(Self::Active)
        } else if raw == U256::from(1u64) {
            Ok(Self::Completed)
        } else if raw == U256::from(2u64) {
            Ok(Self::Cancelled)
        } else {
            Err(ExplorerError::UnknownStatus(raw))
        }
    }
}

/// List projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub address: Address,
    pub name: String,
    pub description: String,
    pub start_time: u64,
    pub end_time: u64,
    pub status: ProjectStatus,
}

/// What the viewing wallet has done on a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participation {
    pub viewer: Address,
    pub is_owner: bool,
    pub has_contributed: bool,
    pub is_volunteering: bool,
    pub is_blacklisted: bool,
    pub contributed: U256,
    pub volunteered_seconds: u64,
}

/// Detail projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDetails {
    pub summary: ProjectSummary,
    pub owner: Address,
    pub latitude: I256,
    pub longitude: I256,
    pub target_amount: U256,
    pub raised_amount: U256,
    pub balance: U256,
    pub funding_goal_reached: bool,
    pub participant_count: u64,
    pub volunteer_count: u64,
    pub contributor_count: u64,
    pub volunteered_seconds: u64,
    pub token_name: String,
    pub token_symbol: String,
    pub participation: Option<Participation>,
}

/// Front-end route for a project's detail page.
pub fn detail_route(chain_id: u64, address: &Address) -> String {
    format!("/p?chainId={chain_id}&projectId={address}")
}

/// Render a wei amount in whole native units, trimming trailing zeros.
pub fn format_native(amount: U256) -> String {
    let unit = U256::from(WEI_PER_UNIT);
    let whole = amount / unit;
    let frac = amount % unit;
    if frac.is_zero() {
        return whole.to_string();
    }
    let frac = format!("{:0>18}", frac.to_string());
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Raised as a whole percentage of target; zero when no target is set.
pub fn funding_percent(raised: U256, target: U256) -> u64 {
    if target.is_zero() {
        return 0;
    }
    let pct = raised.saturating_mul(U256::from(100u64)) / target;
    if pct > U256::from(u64::MAX) {
        u64::MAX
    } else {
        pct.as_limbs()[0]
    }
}

/// Parse a wallet or contract address: `0x` followed by 40 hex digits, non-zero.
pub fn parse_address(raw: &str) -> Result<Address, ExplorerError> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| ExplorerError::InvalidAddress(raw.to_string()))?;
    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ExplorerError::InvalidAddress(raw.to_string()));
    }
    let bytes = hex::decode(digits).map_err(|_| ExplorerError::InvalidAddress(raw.to_string()))?;
    let address = Address::from_slice(&bytes);
    if address.is_zero() {
        return Err(ExplorerError::InvalidAddress(raw.to_string()));
    }
    Ok(address)
}
