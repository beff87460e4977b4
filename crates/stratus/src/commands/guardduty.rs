use crate::InviteCommand;
use crate::output;
use anyhow::Context;
use colored::Colorize;
use std::time::Duration;
use stratus_cloud::Resource;
use stratus_cloud_aws::{
    AwsConfig, AwsProvider, InviteAccepterConfig, InviteAccepterId, InviteAccepterState,
};

pub async fn handle(config: &AwsConfig, command: InviteCommand) -> anyhow::Result<()> {
    let provider = AwsProvider::from_config(config).await?;
    let accepter = provider.invite_accepter();

    match command {
        InviteCommand::Accept {
            detector_id,
            master_id,
            timeout_secs,
        } => {
            let accepter = match timeout_secs {
                Some(secs) => {
                    let timeouts = accepter.timeouts().with_create(Duration::from_secs(secs));
                    accepter.with_timeouts(timeouts)
                }
                None => accepter,
            };

            eprintln!(
                "Waiting for GuardDuty invitation from {} (detector {})...",
                master_id.cyan(),
                detector_id.cyan()
            );
            let state = accepter
                .create(&InviteAccepterConfig {
                    detector_id,
                    master_id,
                })
                .await
                .context("failed to accept GuardDuty invitation")?;

            output::success(&format!("Accepted invitation, id {}", state.id));
            output::print_json(&state)
        }
        InviteCommand::Read { id } => {
            let id: InviteAccepterId = id.parse()?;
            let state = InviteAccepterState::from(&id);
            let current = accepter.read(&state).await?;
            output::print_state(current.as_ref(), &format!("GuardDuty association {}", id))
        }
        InviteCommand::Import { id } => {
            let state = accepter
                .import(&id)
                .await
                .with_context(|| format!("failed to import {}", id))?;
            output::print_json(&state)
        }
        InviteCommand::Delete { id } => {
            let id: InviteAccepterId = id.parse()?;
            let state = InviteAccepterState::from(&id);
            accepter
                .delete(&state)
                .await
                .context("failed to disassociate detector")?;

            output::success(&format!("Disassociated detector {}", id.detector_id));
            Ok(())
        }
    }
}
