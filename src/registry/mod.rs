//! Community-member registration: domain model, validation, persistence,
//! admin sessions, and the HTTP surface tying them together.

pub mod domain;
pub mod export;
pub mod rate_limit;
pub mod router;
pub mod service;
pub mod session;
pub mod store;
pub mod validate;

pub use domain::{CommunityMember, Gender, MemberDraft, MemberId, MemberSubmission, Occupation};
pub use router::registry_router;
pub use service::{OccupationCount, RegistryError, RegistryService, StatsView};
pub use store::{InMemoryMemberStore, MemberStore, StoreError};
pub use validate::{validate, ValidationFailure};
