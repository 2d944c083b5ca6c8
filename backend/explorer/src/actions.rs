//! Unsigned transaction requests for the Plaza write path.
//!
//! The wallet in the browser signs and submits; this module only validates
//! the inputs and produces `to`/`data`/`value` for the call.

use alloy_primitives::{Address, I256, U256};
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};

use crate::abi::{IPlaza, IPlazaFactory};
use crate::errors::{ExplorerError, Result};
use crate::projects::{parse_address, ProjectStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub token_name: String,
    pub token_symbol: String,
    pub project_name: String,
    pub project_description: String,
    pub latitude: i64,
    pub longitude: i64,
    pub start_time: u64,
    pub end_time: u64,
    /// Decimal wei amount
    pub target_amount: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    CreateProject(CreateProject),
    Contribute { project: String, amount: String },
    StartVolunteering { project: String, participant: String },
    EndVolunteering { project: String, participant: String },
    UpdateStatus { project: String, status: ProjectStatus },
    WithdrawFunds { project: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRequest {
    pub chain_id: u64,
    pub to: String,
    pub data: String,
    /// Decimal wei attached to the call
    pub value: String,
}

impl TransactionRequest {
    fn new(chain_id: u64, to: Address, data: Vec<u8>, value: U256) -> Self {
        Self {
            chain_id,
            to: to.to_string(),
            data: format!("0x{}", hex::encode(data)),
            value: value.to_string(),
        }
    }
}

/// Build the call for `action` on `chain_id`, whose factory is `factory`.
pub fn prepare(chain_id: u64, factory: Address, action: &Action) -> Result<TransactionRequest> {
    match action {
        Action::CreateProject(p) => {
            require_text("token_name", &p.token_name)?;
            require_text("token_symbol", &p.token_symbol)?;
            require_text("project_name", &p.project_name)?;
            require_text("project_description", &p.project_description)?;
            if p.start_time >= p.end_time {
                return Err(ExplorerError::InvalidInput(
                    "start_time must be before end_time".to_string(),
                ));
            }
            let target = parse_amount("target_amount", &p.target_amount)?;
            let data = IPlazaFactory::createProjectCall {
                tokenName: p.token_name.clone(),
                tokenSymbol: p.token_symbol.clone(),
                projectName: p.project_name.clone(),
                projectDescription: p.project_description.clone(),
                latitude: coordinate("latitude", p.latitude)?,
                longitude: coordinate("longitude", p.longitude)?,
                startTime: U256::from(p.start_time),
                endTime: U256::from(p.end_time),
                targetAmount: target,
            }
            .abi_encode();
            Ok(TransactionRequest::new(chain_id, factory, data, U256::ZERO))
        }
        Action::Contribute { project, amount } => {
            let to = parse_address(project)?;
            let value = parse_amount("amount", amount)?;
            if value.is_zero() {
                return Err(ExplorerError::InvalidInput(
                    "contribution must be greater than zero".to_string(),
                ));
            }
            let data = IPlaza::contributeCall {}.abi_encode();
            Ok(TransactionRequest::new(chain_id, to, data, value))
        }
        Action::StartVolunteering {
            project,
            participant,
        } => participant_call(chain_id, project, participant, |participant| {
            IPlaza::startVolunteeringCall { participant }.abi_encode()
        }),
        Action::EndVolunteering {
            project,
            participant,
        } => participant_call(chain_id, project, participant, |participant| {
            IPlaza::endVolunteeringCall { participant }.abi_encode()
        }),
        Action::UpdateStatus { project, status } => {
            let to = parse_address(project)?;
            let data = IPlaza::updateProjectStatusCall {
                newStatus: *status as u8,
            }
            .abi_encode();
            Ok(TransactionRequest::new(chain_id, to, data, U256::ZERO))
        }
        Action::WithdrawFunds { project } => {
            let to = parse_address(project)?;
            let data = IPlaza::withdrawFundsCall {}.abi_encode();
            Ok(TransactionRequest::new(chain_id, to, data, U256::ZERO))
        }
    }
}

fn participant_call(
    chain_id: u64,
    project: &str,
    participant: &str,
    encode: impl FnOnce(Address) -> Vec<u8>,
) -> Result<TransactionRequest> {
    let to = parse_address(project)?;
    let participant = parse_address(participant)?;
    Ok(TransactionRequest::new(chain_id, to, encode(participant), U256::ZERO))
}

fn coordinate(field: &str, value: i64) -> Result<I256> {
    I256::try_from(value)
        .map_err(|_| ExplorerError::InvalidInput(format!("{field} is out of range: {value}")))
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ExplorerError::InvalidInput(format!("{field} is required")));
    }
    Ok(())
}

fn parse_amount(field: &str, raw: &str) -> Result<U256> {
    U256::from_str_radix(raw.trim(), 10)
        .map_err(|_| ExplorerError::InvalidInput(format!("{field} is not a decimal wei amount: {raw}")))
}
