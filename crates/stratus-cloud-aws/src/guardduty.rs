//! GuardDuty invite accepter
//!
//! Accepts a pending cross-account GuardDuty invitation for a member
//! detector, making the inviting account its administrator ("master").
//! Deleting the resource disassociates the detector again.

use crate::api::GuardDutyApi;
use crate::error::ServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use stratus_cloud::schema::{FieldSchema, ResourceSchema, Validator};
use stratus_cloud::{CloudError, Resource, Result, RetryConfig, RetryError, Timeouts, retry};

pub const RESOURCE_TYPE: &str = "aws_guardduty_invite_accepter";

const DEFAULT_CREATE_TIMEOUT: Duration = Duration::from_secs(60);
const NOT_OWNED_MESSAGE: &str = "not owned by the current account";

/// Identity key `<detector_id>:<master_id>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InviteAccepterId {
    pub detector_id: String,
    pub master_id: String,
}

impl InviteAccepterId {
    pub fn new(detector_id: impl Into<String>, master_id: impl Into<String>) -> Self {
        Self {
            detector_id: detector_id.into(),
            master_id: master_id.into(),
        }
    }
}

impl FromStr for InviteAccepterId {
    type Err = CloudError;

    fn from_str(id: &str) -> Result<Self> {
        let parts: Vec<&str> = id.split(':').collect();
        match parts.as_slice() {
            [detector_id, master_id] => Ok(Self::new(*detector_id, *master_id)),
            _ => Err(CloudError::Validation(format!(
                "GuardDuty Invite Accepter ID must be of the form <Member Detector ID>:<Master AWS Account ID>, was provided: {}",
                id
            ))),
        }
    }
}

impl fmt::Display for InviteAccepterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.detector_id, self.master_id)
    }
}

/// Desired configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteAccepterConfig {
    /// Member detector that receives the invitation
    pub detector_id: String,

    /// Account that sent the invitation
    pub master_id: String,
}

/// Recorded state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteAccepterState {
    pub id: String,
    pub detector_id: String,
    pub master_id: String,
}

impl From<&InviteAccepterId> for InviteAccepterState {
    fn from(id: &InviteAccepterId) -> Self {
        Self {
            id: id.to_string(),
            detector_id: id.detector_id.clone(),
            master_id: id.master_id.clone(),
        }
    }
}

/// GuardDuty invite accepter resource
pub struct InviteAccepter {
    api: Arc<dyn GuardDutyApi>,
    timeouts: Timeouts,
    retry: RetryConfig,
}

impl InviteAccepter {
    pub fn new(api: Arc<dyn GuardDutyApi>) -> Self {
        Self {
            api,
            timeouts: Timeouts::default().with_create(DEFAULT_CREATE_TIMEOUT),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Accept the pending invitation from `master_id` for `detector_id`
    ///
    /// Polls the invitation list until an invitation from `master_id` shows
    /// up or the create timeout expires.
    pub async fn accept(&self, detector_id: &str, master_id: &str) -> Result<InviteAccepterState> {
        let api = self.api.as_ref();

        let invitation_id = retry(self.timeouts.create, &self.retry, || async move {
            tracing::debug!("Listing GuardDuty Invitations");
            match find_invitation(api, master_id).await {
                Ok(Some(invitation_id)) => Ok(invitation_id),
                Ok(None) => Err(RetryError::Retryable(CloudError::ResourceNotFound(format!(
                    "unable to find pending GuardDuty Invitation for detector ID {:?} from master account ID {:?}",
                    detector_id, master_id
                )))),
                Err(e) => Err(RetryError::NonRetryable(CloudError::ApiError(format!(
                    "error listing GuardDuty Invitations: {}",
                    e
                )))),
            }
        })
        .await?;

        tracing::info!(
            "Accepting GuardDuty Invitation {} for detector {} from {}",
            invitation_id,
            detector_id,
            master_id
        );
        self.api
            .accept_invitation(detector_id, &invitation_id, master_id)
            .await
            .map_err(|e| {
                CloudError::ApiError(format!(
                    "error accepting GuardDuty Invitation {:?}: {}",
                    invitation_id, e
                ))
            })?;

        let id = InviteAccepterId::new(detector_id, master_id);
        self.read_id(&id).await?.ok_or_else(|| {
            CloudError::ResourceNotFound(format!(
                "GuardDuty Master Account {} not found after accepting invitation",
                id
            ))
        })
    }

    /// Adopt an existing association by its identity key
    pub async fn import(&self, id: &str) -> Result<InviteAccepterState> {
        let id: InviteAccepterId = id.parse()?;
        self.read_id(&id).await?.ok_or_else(|| {
            CloudError::ResourceNotFound(format!("GuardDuty Master Account {} not found", id))
        })
    }

    async fn read_id(&self, id: &InviteAccepterId) -> Result<Option<InviteAccepterState>> {
        tracing::debug!("Reading GuardDuty Master Account for detector {}", id.detector_id);

        let master = match self.api.get_master_account(&id.detector_id).await {
            Ok(master) => master,
            Err(e) if is_detector_not_owned(&e) => {
                tracing::warn!("GuardDuty Master Account {} not found, removing from state", id);
                return Ok(None);
            }
            Err(e) => {
                return Err(CloudError::ApiError(format!(
                    "error reading GuardDuty Master Account {:?}: {}",
                    id.to_string(),
                    e
                )));
            }
        };

        let Some(master) = master else {
            tracing::warn!("GuardDuty Master Account {} not found, removing from state", id);
            return Ok(None);
        };

        Ok(Some(InviteAccepterState {
            id: id.to_string(),
            detector_id: id.detector_id.clone(),
            master_id: master.account_id.unwrap_or_default(),
        }))
    }
}

/// Scan invitation pages in order, stopping at the first one from `master_id`
async fn find_invitation(
    api: &dyn GuardDutyApi,
    master_id: &str,
) -> std::result::Result<Option<String>, ServiceError> {
    let mut next_token: Option<String> = None;

    loop {
        let page = api.list_invitations(next_token.take()).await?;

        if let Some(invitation) = page
            .invitations
            .iter()
            .find(|i| i.account_id.as_deref() == Some(master_id))
        {
            return Ok(invitation.invitation_id.clone().filter(|id| !id.is_empty()));
        }

        match page.next_token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => return Ok(None),
        }
    }
}

fn is_detector_not_owned(err: &ServiceError) -> bool {
    err.is_code("BadRequestException") && err.message_contains(NOT_OWNED_MESSAGE)
}

#[async_trait]
impl Resource for InviteAccepter {
    type Config = InviteAccepterConfig;
    type State = InviteAccepterState;

    fn type_name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(RESOURCE_TYPE)
            .importable()
            .field(FieldSchema::string("detector_id").required().force_new())
            .field(
                FieldSchema::string("master_id")
                    .required()
                    .force_new()
                    .validator(Validator::AccountId),
            )
    }

    fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    fn id(&self, state: &InviteAccepterState) -> String {
        state.id.clone()
    }

    async fn create(&self, config: &InviteAccepterConfig) -> Result<InviteAccepterState> {
        let schema = self.schema();
        schema.validate("master_id", &config.master_id)?;
        if config.detector_id.is_empty() {
            return Err(CloudError::validation("detector_id must not be empty"));
        }

        self.accept(&config.detector_id, &config.master_id).await
    }

    async fn read(&self, state: &InviteAccepterState) -> Result<Option<InviteAccepterState>> {
        let id: InviteAccepterId = state.id.parse()?;
        self.read_id(&id).await
    }

    async fn delete(&self, state: &InviteAccepterState) -> Result<()> {
        let id: InviteAccepterId = state.id.parse()?;

        tracing::info!("Disassociating detector {} from GuardDuty Master Account", id.detector_id);
        self.api
            .disassociate_from_master_account(&id.detector_id)
            .await
            .map_err(|e| {
                CloudError::ApiError(format!(
                    "error disassociating {:?} from GuardDuty Master Account: {}",
                    state.id, e
                ))
            })
    }
}
