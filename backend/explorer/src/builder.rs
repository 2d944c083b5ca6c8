//! Assembles project records from concurrent per-field reads.
//!
//! Every field of a projection is requested at once and joined with
//! `try_join!`: one failed read fails the whole record.

use alloy_primitives::Address;
use tracing::debug;

use crate::abi::{narrow_u64, IPlaza};
use crate::errors::Result;
use crate::gateway::ReadGateway;
use crate::projects::{Participation, ProjectDetails, ProjectSummary};

#[derive(Clone)]
pub struct RecordBuilder {
    gateway: ReadGateway,
}

impl RecordBuilder {
    pub fn new(gateway: ReadGateway) -> Self {
        Self { gateway }
    }

    /// List projection: name, description, start, end and status.
    pub async fn summary(&self, project: Address) -> Result<ProjectSummary> {
        let g = &self.gateway;
        let (name, description, start_time, end_time, status) = tokio::try_join!(
            g.call(project, IPlaza::projectNameCall {}),
            g.call(project, IPlaza::projectDescriptionCall {}),
            g.call(project, IPlaza::startTimeCall {}),
            g.call(project, IPlaza::endTimeCall {}),
            g.read_status(project),
        )?;

        debug!("Built summary for {project} ({})", status.as_str());
        Ok(ProjectSummary {
            address: project,
            name: name._0,
            description: description._0,
            start_time: narrow_u64(start_time._0, "startTime()")?,
            end_time: narrow_u64(end_time._0, "endTime()")?,
            status,
        })
    }

    /// Detail projection, plus the viewer's participation when a wallet is given.
    pub async fn details(&self, project: Address, viewer: Option<Address>) -> Result<ProjectDetails> {
        let g = &self.gateway;

        let core = async {
            tokio::try_join!(
                self.summary(project),
                g.call(project, IPlaza::ownerCall {}),
                g.call(project, IPlaza::latitudeCall {}),
                g.call(project, IPlaza::longitudeCall {}),
                g.call(project, IPlaza::targetAmountCall {}),
                g.call(project, IPlaza::raisedAmountCall {}),
                g.call(project, IPlaza::balanceCall {}),
                g.call(project, IPlaza::isFundingGoalReachedCall {}),
                g.call(project, IPlaza::participantCountCall {}),
                g.call(project, IPlaza::volunteerCountCall {}),
                g.call(project, IPlaza::contributorCountCall {}),
                g.call(project, IPlaza::volunteeredSecondsCall {}),
                g.call(project, IPlaza::nameCall {}),
                g.call(project, IPlaza::symbolCall {}),
            )
        };

        let participation = async {
            match viewer {
                Some(viewer) => self.participation(project, viewer).await.map(Some),
                None => Ok(None),
            }
        };

        let (
            (
                summary,
                owner,
                latitude,
                longitude,
                target_amount,
                raised_amount,
                balance,
                funding_goal_reached,
                participant_count,
                volunteer_count,
                contributor_count,
                volunteered_seconds,
                token_name,
                token_symbol,
            ),
            participation,
        ) = tokio::try_join!(core, participation)?;

        let owner = owner._0;
        let participation = participation.map(|p| Participation {
            is_owner: p.viewer == owner,
            ..p
        });

        Ok(ProjectDetails {
            summary,
            owner,
            latitude: latitude._0,
            longitude: longitude._0,
            target_amount: target_amount._0,
            raised_amount: raised_amount._0,
            balance: balance._0,
            funding_goal_reached: funding_goal_reached._0,
            participant_count: narrow_u64(participant_count._0, "participantCount()")?,
            volunteer_count: narrow_u64(volunteer_count._0, "volunteerCount()")?,
            contributor_count: narrow_u64(contributor_count._0, "contributorCount()")?,
            volunteered_seconds: narrow_u64(volunteered_seconds._0, "volunteeredSeconds()")?,
            token_name: token_name._0,
            token_symbol: token_symbol._0,
            participation,
        })
    }

    async fn participation(&self, project: Address, viewer: Address) -> Result<Participation> {
        let g = &self.gateway;
        let (has_contributed, is_volunteering, is_blacklisted, contributed, volunteered_seconds) = tokio::try_join!(
            g.call(project, IPlaza::hasContributedCall { participant: viewer }),
            g.call(project, IPlaza::isVolunteeringCall { participant: viewer }),
            g.call(project, IPlaza::isBlacklistedCall { participant: viewer }),
            g.call(project, IPlaza::contributionAmountsCall { participant: viewer }),
            g.call(project, IPlaza::volunteerSecondsPerParticipantCall { participant: viewer }),
        )?;

        Ok(Participation {
            viewer,
            // filled in once the owner read has resolved
            is_owner: false,
            has_contributed: has_contributed._0,
            is_volunteering: is_volunteering._0,
            is_blacklisted: is_blacklisted._0,
            contributed: contributed._0,
            volunteered_seconds: narrow_u64(
                volunteered_seconds._0,
                "volunteerSecondsPerParticipant(address)",
            )?,
        })
    }
}
