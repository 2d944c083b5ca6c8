//! Typed read-only calls over a [`ContractReader`].

use std::sync::Arc;

use alloy_primitives::Address;
use alloy_sol_types::{sol_data, SolCall, SolType};

use crate::abi::IPlaza;
use crate::errors::{ExplorerError, Result};
use crate::projects::ProjectStatus;
use crate::rpc::ContractReader;

#[derive(Clone)]
pub struct ReadGateway {
    reader: Arc<dyn ContractReader>,
}

impl ReadGateway {
    pub fn new(reader: Arc<dyn ContractReader>) -> Self {
        Self { reader }
    }

    /// Execute `call` against `to` and decode its return values strictly.
    pub async fn call<C>(&self, to: Address, call: C) -> Result<C::Return>
    where
        C: SolCall + Send,
    {
        let data = self.reader.call(to, call.abi_encode()).await?;
        C::abi_decode_returns(&data, true)
            .map_err(|e| ExplorerError::Decode(format!("{}: {e}", C::SIGNATURE)))
    }

    /// `status()` is a `uint8` enum on chain. The whole word is decoded so an
    /// out-of-range value is reported as it was returned.
    pub async fn read_status(&self, to: Address) -> Result<ProjectStatus> {
        let data = self.reader.call(to, IPlaza::statusCall {}.abi_encode()).await?;
        let raw = <sol_data::Uint<256> as SolType>::abi_decode(&data, true)
            .map_err(|e| ExplorerError::Decode(format!("status(): {e}")))?;
        ProjectStatus::try_from(raw)
    }
}
