use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{AdminConfig, RateLimitConfig};

use super::domain::{CommunityMember, MemberSubmission, Occupation};
use super::export::{members_to_csv, ExportError};
use super::rate_limit::SubmissionRateLimiter;
use super::session::AdminSessions;
use super::store::{MemberStore, StoreError};
use super::validate::{validate, ValidationFailure};

/// Facade composing the store, admin sessions, and the submission throttle.
/// The router drives this and nothing else.
pub struct RegistryService<S> {
    store: Arc<S>,
    admin: AdminConfig,
    sessions: AdminSessions,
    limiter: SubmissionRateLimiter,
}

/// Error raised by the registry service; the router maps each variant to an
/// HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("validation failed")]
    Validation(Vec<ValidationFailure>),
    #[error("too many submissions from this client")]
    RateLimited,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Login payload for the admin surface.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// One (occupation, count) aggregation bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupationCount {
    pub occupation: Occupation,
    pub count: u64,
}

/// Aggregate numbers shown on the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub total_members: u64,
    pub occupation_stats: Vec<OccupationCount>,
}

impl<S> RegistryService<S>
where
    S: MemberStore + 'static,
{
    pub fn new(store: Arc<S>, admin: AdminConfig, limits: RateLimitConfig) -> Self {
        let sessions = AdminSessions::new(Duration::minutes(admin.session_ttl_minutes));
        let limiter = SubmissionRateLimiter::new(limits);
        Self {
            store,
            admin,
            sessions,
            limiter,
        }
    }

    /// Throttle, validate, and persist one public submission.
    pub fn submit(
        &self,
        client_key: &str,
        submission: MemberSubmission,
    ) -> Result<CommunityMember, RegistryError> {
        if !self.limiter.allow(client_key, Utc::now()) {
            return Err(RegistryError::RateLimited);
        }

        let draft = validate(submission).map_err(RegistryError::Validation)?;
        let member = self.store.create(draft)?;
        Ok(member)
    }

    /// Exchange credentials for a session token.
    ///
    /// The failure never says which of the two fields was wrong.
    pub fn login(&self, username: &str, password: &str) -> Result<String, RegistryError> {
        if username == self.admin.username && password == self.admin.password {
            Ok(self.sessions.issue(Utc::now()))
        } else {
            Err(RegistryError::InvalidCredentials)
        }
    }

    /// Every stored record, most recent first. Admin sees all fields.
    pub fn members(&self, token: &str) -> Result<Vec<CommunityMember>, RegistryError> {
        self.authorize(token)?;
        Ok(self.store.list_all()?)
    }

    /// Total count plus per-occupation buckets, largest bucket first.
    pub fn stats(&self, token: &str) -> Result<StatsView, RegistryError> {
        self.authorize(token)?;

        let total_members = self.store.count()?;
        let mut occupation_stats: Vec<OccupationCount> = self
            .store
            .aggregate_by_occupation()?
            .into_iter()
            .map(|(occupation, count)| OccupationCount { occupation, count })
            .collect();
        occupation_stats.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.occupation.label().cmp(b.occupation.label()))
        });

        Ok(StatsView {
            total_members,
            occupation_stats,
        })
    }

    /// CSV rendering of the full listing, most recent first.
    pub fn export_csv(&self, token: &str) -> Result<String, RegistryError> {
        self.authorize(token)?;
        let members = self.store.list_all()?;
        Ok(members_to_csv(&members)?)
    }

    fn authorize(&self, token: &str) -> Result<(), RegistryError> {
        if self.sessions.authorize(token, Utc::now()) {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized)
        }
    }
}
