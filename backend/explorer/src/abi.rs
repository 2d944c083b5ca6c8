//! Plaza contract interfaces.
//!
//! Call structs, selectors and return decoding are generated by `sol!`.
//! Only the functions this service reads or prepares are declared.

use alloy_primitives::U256;
use alloy_sol_types::sol;

use crate::errors::{ExplorerError, Result};

sol! {
    #![sol(all_derives)]
    /// PlazaFactory: deploys projects and keeps the registry.
    interface IPlazaFactory {
        function projectCount() external view returns (uint256);
        function allProjects(uint256 index) external view returns (address);
        function getProjectsByCreator(address creator) external view returns (address[]);
        function createProject(
            string tokenName,
            string tokenSymbol,
            string projectName,
            string projectDescription,
            int256 latitude,
            int256 longitude,
            uint256 startTime,
            uint256 endTime,
            uint256 targetAmount
        ) external returns (address);
    }

    /// One Plaza project; the contract is also its reward token.
    interface IPlaza {
        function projectName() external view returns (string);
        function projectDescription() external view returns (string);
        function startTime() external view returns (uint256);
        function endTime() external view returns (uint256);
        function status() external view returns (uint8);
        function owner() external view returns (address);
        function latitude() external view returns (int256);
        function longitude() external view returns (int256);
        function targetAmount() external view returns (uint256);
        function raisedAmount() external view returns (uint256);
        function balance() external view returns (uint256);
        function isFundingGoalReached() external view returns (bool);
        function participantCount() external view returns (uint256);
        function volunteerCount() external view returns (uint256);
        function contributorCount() external view returns (uint256);
        function volunteeredSeconds() external view returns (uint256);
        function name() external view returns (string);
        function symbol() external view returns (string);

        function hasContributed(address participant) external view returns (bool);
        function isVolunteering(address participant) external view returns (bool);
        function isBlacklisted(address participant) external view returns (bool);
        function contributionAmounts(address participant) external view returns (uint256);
        function volunteerSecondsPerParticipant(address participant) external view returns (uint256);

        function contribute() external payable;
        function startVolunteering(address participant) external;
        function endVolunteering(address participant) external;
        function updateProjectStatus(uint8 newStatus) external;
        function withdrawFunds() external;
    }
}

/// Narrow a wide integer to `u64`, failing instead of truncating.
pub fn narrow_u64(value: U256, field: &str) -> Result<u64> {
    if value > U256::from(u64::MAX) {
        return Err(ExplorerError::Decode(format!(
            "{field} does not fit in 64 bits: {value}"
        )));
    }
    Ok(value.as_limbs()[0])
}

#[cfg(test)]
mod tests {
    use alloy_sol_types::SolCall;

    use super::*;

    #[test]
    fn selectors_match_canonical_signatures() {
        assert_eq!(IPlazaFactory::allProjectsCall::SIGNATURE, "allProjects(uint256)");
        assert_eq!(
            IPlazaFactory::createProjectCall::SIGNATURE,
            "createProject(string,string,string,string,int256,int256,uint256,uint256,uint256)"
        );
        assert_eq!(
            IPlazaFactory::allProjectsCall::SELECTOR,
            alloy_primitives::keccak256("allProjects(uint256)")[..4]
        );
    }

    #[test]
    fn uint_argument_is_one_word() {
        let data = IPlazaFactory::allProjectsCall {
            index: U256::from(7u64),
        }
        .abi_encode();
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(data[35], 7);
    }

    #[test]
    fn string_return_passes_text_through() {
        let text = "  Plaza Park Cleanup ";
        let mut data = U256::from(32u64).to_be_bytes::<32>().to_vec();
        data.extend_from_slice(&U256::from(text.len() as u64).to_be_bytes::<32>());
        let mut padded = text.as_bytes().to_vec();
        padded.resize(32, 0);
        data.extend_from_slice(&padded);

        let decoded = IPlaza::projectNameCall::abi_decode_returns(&data, true).unwrap();
        assert_eq!(decoded._0, text);
    }

    #[test]
    fn short_return_data_is_rejected() {
        assert!(IPlaza::startTimeCall::abi_decode_returns(&[0u8; 31], true).is_err());
        assert!(IPlaza::startTimeCall::abi_decode_returns(&[], true).is_err());
    }

    #[test]
    fn narrow_rejects_wide_values() {
        assert_eq!(narrow_u64(U256::from(1_700_000_000u64), "startTime").unwrap(), 1_700_000_000);
        assert!(narrow_u64(U256::from(u64::MAX) + U256::from(1u64), "startTime").is_err());
    }
}
