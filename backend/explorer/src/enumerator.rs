//! Produces the list of project addresses to fetch from the factory.

use std::ops::Range;

use alloy_primitives::{Address, U256};
use tracing::debug;

use crate::abi::{self, IPlazaFactory};
use crate::errors::Result;
use crate::fanout;
use crate::gateway::ReadGateway;

/// First index of the factory's `allProjects` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexBase {
    Zero,
    One,
}

impl IndexBase {
    /// Indices to visit for a factory reporting `count` projects.
    pub fn range(self, count: u64) -> Range<u64> {
        match self {
            Self::Zero => 0..count,
            Self::One => 1..count.saturating_add(1),
        }
    }
}

#[derive(Clone)]
pub struct ProjectEnumerator {
    gateway: ReadGateway,
    factory: Address,
    index_base: IndexBase,
    max_concurrent: usize,
}

impl ProjectEnumerator {
    pub fn new(gateway: ReadGateway, factory: Address, index_base: IndexBase, max_concurrent: usize) -> Self {
        Self {
            gateway,
            factory,
            index_base,
            max_concurrent,
        }
    }

    /// Global scan: `projectCount()` then one `allProjects(i)` per index.
    pub async fn all_projects(&self) -> Result<Vec<Address>> {
        let count = self
            .gateway
            .call(self.factory, IPlazaFactory::projectCountCall {})
            .await?;
        let count = abi::narrow_u64(count._0, "projectCount()")?;
        debug!("Factory {} reports {count} projects", self.factory);

        let indices: Vec<u64> = self.index_base.range(count).collect();
        let gateway = self.gateway.clone();
        let factory = self.factory;

        fanout::try_map_ordered(indices, self.max_concurrent, move |i| {
            let gateway = gateway.clone();
            async move {
                let index = U256::from(i);
                gateway
                    .call(factory, IPlazaFactory::allProjectsCall { index })
                    .await
                    .map(|r| r._0)
            }
        })
        .await
    }

    /// Per-creator scan. Without a wallet there is nothing to look up.
    pub async fn by_creator(&self, creator: Option<Address>) -> Result<Vec<Address>> {
        let Some(creator) = creator else {
            return Ok(Vec::new());
        };
        let projects = self
            .gateway
            .call(self.factory, IPlazaFactory::getProjectsByCreatorCall { creator })
            .await?
            ._0;
        debug!("Creator {creator} owns {} projects", projects.len());
        Ok(projects)
    }
}
