//! In-memory chain used by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy_primitives::{Address, U256};
use alloy_sol_types::{SolCall, SolValue};
use async_trait::async_trait;

use crate::abi::{IPlaza, IPlazaFactory};
use crate::errors::{ExplorerError, Result};
use crate::projects::ProjectStatus;
use crate::rpc::ContractReader;

type CallKey = (Address, Vec<u8>);

#[derive(Default)]
pub struct FakeChain {
    responses: Mutex<HashMap<CallKey, std::result::Result<Vec<u8>, String>>>,
    log: Mutex<Vec<CallKey>>,
    calls: AtomicUsize,
}

pub fn addr(n: u8) -> Address {
    Address::from([n; 20])
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `call` on `to` with `returns`, encoded as a one-value return.
    pub fn stub<C: SolCall, V: SolValue>(&self, to: Address, call: C, returns: V) {
        self.responses
            .lock()
            .unwrap()
            .insert((to, call.abi_encode()), Ok(returns.abi_encode()));
    }

    pub fn fail<C: SolCall>(&self, to: Address, call: C) {
        self.responses.lock().unwrap().insert(
            (to, call.abi_encode()),
            Err("execution reverted".to_string()),
        );
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls made to the function `C`, in order.
    pub fn calls_to<C: SolCall>(&self) -> Vec<CallKey> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, data)| data.starts_with(&C::SELECTOR))
            .cloned()
            .collect()
    }

    /// Factory answering `projectCount()` and `allProjects(i)` for `base + i`.
    pub fn stub_factory(&self, factory: Address, base: u64, projects: &[Address]) {
        self.stub(
            factory,
            IPlazaFactory::projectCountCall {},
            U256::from(projects.len() as u64),
        );
        for (i, project) in projects.iter().enumerate() {
            self.stub(
                factory,
                IPlazaFactory::allProjectsCall {
                    index: U256::from(base + i as u64),
                },
                *project,
            );
        }
    }

    pub fn stub_creator(&self, factory: Address, creator: Address, projects: &[Address]) {
        self.stub(
            factory,
            IPlazaFactory::getProjectsByCreatorCall { creator },
            projects.to_vec(),
        );
    }

    /// The five list-view fields of one project.
    pub fn stub_summary(
        &self,
        project: Address,
        name: &str,
        start_time: u64,
        end_time: u64,
        status: ProjectStatus,
    ) {
        self.stub(project, IPlaza::projectNameCall {}, name.to_string());
        self.stub(project, IPlaza::projectDescriptionCall {}, format!("About {name}"));
        self.stub(project, IPlaza::startTimeCall {}, U256::from(start_time));
        self.stub(project, IPlaza::endTimeCall {}, U256::from(end_time));
        self.stub(project, IPlaza::statusCall {}, U256::from(status as u8));
    }
}

#[async_trait]
impl ContractReader for FakeChain {
    async fn call(&self, to: Address, calldata: Vec<u8>) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = (to, calldata);
        self.log.lock().unwrap().push(key.clone());
        // Yield so concurrent reads genuinely interleave.
        tokio::task::yield_now().await;
        match self.responses.lock().unwrap().get(&key) {
            Some(Ok(bytes)) => Ok(bytes.clone()),
            Some(Err(message)) => Err(ExplorerError::Rpc {
                code: 3,
                message: message.clone(),
            }),
            None => Err(ExplorerError::Rpc {
                code: 3,
                message: "no contract code at address".to_string(),
            }),
        }
    }
}
