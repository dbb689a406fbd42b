//! Posts finished standups to the channels mapped to their projects.

use crate::database::models::StandupRecord;
use crate::database::store::RecordStore;
use crate::standup::gateway::FormGateway;
use crate::utils::format::format_standup_summary;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DistributionReport {
    /// Channel ids that received the summary.
    pub posted: Vec<String>,
    /// Projects without an active channel.
    pub unmapped: Vec<String>,
    /// Projects whose lookup or post failed.
    pub failed: Vec<String>,
}

#[derive(Clone)]
pub struct Distributor {
    store: Arc<dyn RecordStore>,
    gateway: Arc<dyn FormGateway>,
}

impl Distributor {
    pub fn new(store: Arc<dyn RecordStore>, gateway: Arc<dyn FormGateway>) -> Self {
        Self { store, gateway }
    }

    /// Best effort: every project is handled on its own and failures are only logged.
    pub async fn distribute(&self, record: &StandupRecord) -> DistributionReport {
        let mut report = DistributionReport::default();
        let projects = referenced_projects(record);
        if projects.is_empty() {
            debug!("Standup {} references no projects, nothing to post", record.id);
            return report;
        }

        let summary = format_standup_summary(record);

        for project in projects {
            let mapping = match self.store.active_channel_for(&project).await {
                Ok(Some(mapping)) => mapping,
                Ok(None) => {
                    debug!("No active channel for project {}", project);
                    report.unmapped.push(project);
                    continue;
                }
                Err(e) => {
                    warn!("Channel lookup for project {} failed: {}", project, e);
                    report.failed.push(project);
                    continue;
                }
            };

            match self.gateway.post_message(&mapping.channel_id, &summary).await {
                Ok(()) => {
                    info!(
                        "Posted standup {} for {} to #{} ({})",
                        record.id, record.display_name, mapping.channel_name, project
                    );
                    report.posted.push(mapping.channel_id);
                }
                Err(e) => {
                    warn!(
                        "Posting standup {} to #{} ({}) failed: {}",
                        record.id, mapping.channel_name, project, e
                    );
                    report.failed.push(project);
                }
            }
        }

        report
    }
}

/// Distinct projects across both task lists.
pub fn referenced_projects(record: &StandupRecord) -> BTreeSet<String> {
    record.all_tasks().map(|task| task.project.clone()).collect()
}
