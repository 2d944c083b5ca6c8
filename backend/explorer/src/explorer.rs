//! The aggregation pipeline: enumerate → build → classify.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::Address;
use tracing::info;

use crate::actions::{self, Action, TransactionRequest};
use crate::builder::RecordBuilder;
use crate::config::{ChainConfig, ChainTable};
use crate::enumerator::{IndexBase, ProjectEnumerator};
use crate::errors::{ExplorerError, Result};
use crate::fanout;
use crate::gateway::ReadGateway;
use crate::projects::ProjectDetails;
use crate::rpc::ContractReader;
use crate::view::AggregateView;

/// Which projects a view covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every project the factory has deployed.
    All,
    /// Projects created by the connected wallet, if any.
    Creator(Option<Address>),
}

#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    pub index_base: IndexBase,
    pub max_concurrent: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            index_base: IndexBase::Zero,
            max_concurrent: 4,
        }
    }
}

/// Wall-clock seconds, the same unit as on-chain `startTime`/`endTime`.
pub fn now_unix() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

pub struct Explorer {
    chains: ChainTable,
    readers: HashMap<u64, Arc<dyn ContractReader>>,
    scan: ScanOptions,
}

impl Explorer {
    pub fn new(
        chains: ChainTable,
        readers: HashMap<u64, Arc<dyn ContractReader>>,
        scan: ScanOptions,
    ) -> Self {
        Self {
            chains,
            readers,
            scan,
        }
    }

    /// Resolve a chain before anything touches the network.
    fn network(&self, chain_id: u64) -> Result<(&ChainConfig, ReadGateway)> {
        let chain = self.chains.get(chain_id)?;
        let reader = self
            .readers
            .get(&chain_id)
            .ok_or(ExplorerError::UnsupportedNetwork(chain_id))?;
        Ok((chain, ReadGateway::new(reader.clone())))
    }

    /// One full fetch cycle. Either every project is fetched or the cycle fails.
    pub async fn list_projects(&self, chain_id: u64, scope: Scope, now: u64) -> Result<AggregateView> {
        let (chain, gateway) = self.network(chain_id)?;
        let enumerator = ProjectEnumerator::new(
            gateway.clone(),
            chain.factory,
            self.scan.index_base,
            self.scan.max_concurrent,
        );

        let addresses = match scope {
            Scope::All => enumerator.all_projects().await?,
            Scope::Creator(None) => return Err(ExplorerError::NotConnected),
            Scope::Creator(creator) => enumerator.by_creator(creator).await?,
        };

        let builder = RecordBuilder::new(gateway);
        let records = fanout::try_map_ordered(addresses, self.scan.max_concurrent, move |address| {
            let builder = builder.clone();
            async move { builder.summary(address).await }
        })
        .await?;

        info!(
            "Fetched {} projects from {} ({:?})",
            records.len(),
            chain.name,
            scope
        );
        Ok(AggregateView::from_records(chain_id, records, now))
    }

    pub async fn project_details(
        &self,
        chain_id: u64,
        project: Address,
        viewer: Option<Address>,
    ) -> Result<ProjectDetails> {
        let (_, gateway) = self.network(chain_id)?;
        RecordBuilder::new(gateway).details(project, viewer).await
    }

    pub fn prepare(&self, chain_id: u64, action: &Action) -> Result<TransactionRequest> {
        let chain = self.chains.get(chain_id)?;
        actions::prepare(chain_id, chain.factory, action)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;

    use super::*;
    use crate::abi::{IPlaza, IPlazaFactory};
    use crate::projects::ProjectStatus;
    use crate::testing::{addr, FakeChain};

    const CHAIN: u64 = 534351;
    const NOW: u64 = 1_700_000_000;

    fn factory() -> Address {
        addr(0xfa)
    }

    fn explorer(fake: &Arc<FakeChain>, max_concurrent: usize) -> Explorer {
        let chains = ChainTable::new([ChainConfig {
            chain_id: CHAIN,
            name: "Scroll Sepolia".to_string(),
            rpc_url: "http://unused".to_string(),
            factory: factory(),
        }]);
        let reader: Arc<dyn ContractReader> = fake.clone();
        let readers = HashMap::from([(CHAIN, reader)]);
        Explorer::new(
            chains,
            readers,
            ScanOptions {
                index_base: IndexBase::Zero,
                max_concurrent,
            },
        )
    }

    #[tokio::test]
    async fn upcoming_and_past_from_global_scan() {
        let fake = Arc::new(FakeChain::new());
        fake.stub_factory(factory(), 0, &[addr(1), addr(2)]);
        fake.stub_summary(addr(1), "Garden", NOW + 3600, NOW + 7200, ProjectStatus::Active);
        fake.stub_summary(addr(2), "Mural", NOW - 7200, NOW + 7200, ProjectStatus::Completed);

        let view = explorer(&fake, 1).list_projects(CHAIN, Scope::All, NOW).await.unwrap();
        assert_eq!(view.upcoming.len(), 1);
        assert_eq!(view.upcoming[0].address, addr(1).to_string());
        assert!(view.ongoing.is_empty());
        assert_eq!(view.past.len(), 1);
        assert_eq!(view.past[0].address, addr(2).to_string());
    }

    #[tokio::test]
    async fn expired_active_project_reads_as_ongoing() {
        let fake = Arc::new(FakeChain::new());
        fake.stub_factory(factory(), 0, &[addr(1)]);
        fake.stub_summary(addr(1), "Old", NOW - 7200, NOW - 3600, ProjectStatus::Active);

        let view = explorer(&fake, 2).list_projects(CHAIN, Scope::All, NOW).await.unwrap();
        assert_eq!(view.ongoing.len(), 1);
        assert!(view.past.is_empty());
    }

    #[tokio::test]
    async fn unsupported_chain_makes_no_reads() {
        let fake = Arc::new(FakeChain::new());
        let err = explorer(&fake, 1)
            .list_projects(1, Scope::All, NOW)
            .await
            .unwrap_err();
        assert!(matches!(err, ExplorerError::UnsupportedNetwork(1)));
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn missing_wallet_makes_no_reads() {
        let fake = Arc::new(FakeChain::new());
        let err = explorer(&fake, 1)
            .list_projects(CHAIN, Scope::Creator(None), NOW)
            .await
            .unwrap_err();
        assert!(matches!(err, ExplorerError::NotConnected));
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn one_failing_field_commits_nothing() {
        let fake = Arc::new(FakeChain::new());
        fake.stub_factory(factory(), 0, &[addr(1), addr(2), addr(3)]);
        fake.stub_summary(addr(1), "A", NOW, NOW + 1, ProjectStatus::Active);
        fake.stub_summary(addr(2), "B", NOW, NOW + 1, ProjectStatus::Active);
        fake.stub_summary(addr(3), "C", NOW, NOW + 1, ProjectStatus::Active);
        fake.fail(addr(2), IPlaza::statusCall {});

        for concurrency in [1, 3] {
            let result = explorer(&fake, concurrency)
                .list_projects(CHAIN, Scope::All, NOW)
                .await;
            assert!(result.is_err(), "concurrency {concurrency}");
        }
    }

    #[tokio::test]
    async fn unknown_status_fails_the_cycle() {
        let fake = Arc::new(FakeChain::new());
        fake.stub_factory(factory(), 0, &[addr(1)]);
        fake.stub_summary(addr(1), "A", NOW, NOW + 1, ProjectStatus::Active);
        fake.stub(addr(1), IPlaza::statusCall {}, U256::from(9u64));

        let err = explorer(&fake, 1)
            .list_projects(CHAIN, Scope::All, NOW)
            .await
            .unwrap_err();
        assert!(matches!(err, ExplorerError::UnknownStatus(v) if v == U256::from(9u64)));
    }

    #[tokio::test]
    async fn repeated_cycles_are_identical() {
        let fake = Arc::new(FakeChain::new());
        fake.stub_factory(factory(), 0, &[addr(1), addr(2), addr(3)]);
        fake.stub_summary(addr(1), "A", NOW + 10, NOW + 20, ProjectStatus::Active);
        fake.stub_summary(addr(2), "B", NOW - 10, NOW + 20, ProjectStatus::Active);
        fake.stub_summary(addr(3), "C", NOW - 10, NOW - 5, ProjectStatus::Cancelled);

        let explorer = explorer(&fake, 3);
        let first = explorer.list_projects(CHAIN, Scope::All, NOW).await.unwrap();
        let second = explorer.list_projects(CHAIN, Scope::All, NOW).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn creator_scope_lists_only_their_projects() {
        let fake = Arc::new(FakeChain::new());
        let creator = addr(0xc0);
        fake.stub_creator(factory(), creator, &[addr(5)]);
        fake.stub_summary(addr(5), "Mine", NOW - 1, NOW + 1, ProjectStatus::Active);

        let view = explorer(&fake, 2)
            .list_projects(CHAIN, Scope::Creator(Some(creator)), NOW)
            .await
            .unwrap();
        assert_eq!(view.total, 1);
        assert_eq!(view.ongoing[0].name, "Mine");
        assert!(fake.calls_to::<IPlazaFactory::projectCountCall>().is_empty());
    }

    #[tokio::test]
    async fn empty_factory_is_an_empty_view() {
        let fake = Arc::new(FakeChain::new());
        fake.stub_factory(factory(), 0, &[]);

        let view = explorer(&fake, 2).list_projects(CHAIN, Scope::All, NOW).await.unwrap();
        assert!(view.is_empty());
        assert_eq!(fake.calls(), 1);
    }

    #[test]
    fn prepare_checks_chain() {
        let fake = Arc::new(FakeChain::new());
        let action = Action::WithdrawFunds {
            project: "0x2222222222222222222222222222222222222222".into(),
        };
        assert!(explorer(&fake, 1).prepare(CHAIN, &action).is_ok());
        assert!(matches!(
            explorer(&fake, 1).prepare(10, &action),
            Err(ExplorerError::UnsupportedNetwork(10))
        ));
    }
}
