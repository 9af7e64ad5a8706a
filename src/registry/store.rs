use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::Utc;

use super::domain::{CommunityMember, MemberDraft, MemberId, Occupation};
use super::validate::{is_valid_email, ValidationFailure};

/// Error enumeration for persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("draft rejected at the persistence boundary")]
    InvalidDraft(Vec<ValidationFailure>),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction so the HTTP layer and tests can run against the
/// in-memory backend while a database-backed one stays substitutable.
///
/// Records are create-then-read-forever: no update or delete is exposed.
pub trait MemberStore: Send + Sync {
    /// Persist a draft atomically, assigning a unique id and the submission
    /// timestamp. The draft is re-checked here regardless of what the caller
    /// already validated.
    fn create(&self, draft: MemberDraft) -> Result<CommunityMember, StoreError>;

    /// Every record, most recent first.
    fn list_all(&self) -> Result<Vec<CommunityMember>, StoreError>;

    fn count(&self) -> Result<u64, StoreError>;

    /// Record counts per occupation present in the store. No ordering
    /// guarantee; callers sort for display.
    fn aggregate_by_occupation(&self) -> Result<HashMap<Occupation, u64>, StoreError>;
}

impl MemberDraft {
    /// Persistence-boundary re-check of every field constraint.
    ///
    /// The type system already guarantees the enums and the age upper bound
    /// cannot be grossly wrong, but the string fields can be constructed
    /// arbitrarily, so the store refuses to trust its callers.
    pub fn check(&self) -> Result<(), Vec<ValidationFailure>> {
        let mut failures = Vec::new();

        if self.surname.trim().is_empty() {
            failures.push(ValidationFailure::Missing("Surname"));
        }
        if self.name.trim().is_empty() {
            failures.push(ValidationFailure::Missing("Name"));
        }
        if self.age > 150 {
            failures.push(ValidationFailure::AgeOutOfRange);
        }
        if self.mobile_number.len() != 10 || !self.mobile_number.bytes().all(|b| b.is_ascii_digit())
        {
            failures.push(ValidationFailure::MobileNumberDigits);
        }
        if !is_valid_email(&self.email_address) {
            failures.push(ValidationFailure::InvalidEmail);
        }
        if self.national_id_number.len() != 12
            || !self.national_id_number.bytes().all(|b| b.is_ascii_digit())
        {
            failures.push(ValidationFailure::NationalIdDigits);
        }
        if self.village.trim().is_empty() {
            failures.push(ValidationFailure::Missing("Village/City"));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }
}

static MEMBER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_member_id() -> MemberId {
    let id = MEMBER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    MemberId(format!("member-{id:06}"))
}

/// Process-local backend guarding the record list with a mutex. Insertion is
/// atomic with respect to readers: a record is visible in full or not at all.
#[derive(Default)]
pub struct InMemoryMemberStore {
    members: Mutex<Vec<CommunityMember>>,
}

impl MemberStore for InMemoryMemberStore {
    fn create(&self, draft: MemberDraft) -> Result<CommunityMember, StoreError> {
        draft.check().map_err(StoreError::InvalidDraft)?;

        let member = CommunityMember::from_draft(next_member_id(), Utc::now(), draft);
        let mut guard = self
            .members
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.push(member.clone());
        Ok(member)
    }

    fn list_all(&self) -> Result<Vec<CommunityMember>, StoreError> {
        let guard = self
            .members
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut members = guard.clone();
        // Id breaks ties when two records land on the same timestamp tick.
        members.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(members)
    }

    fn count(&self) -> Result<u64, StoreError> {
        let guard = self
            .members
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(guard.len() as u64)
    }

    fn aggregate_by_occupation(&self) -> Result<HashMap<Occupation, u64>, StoreError> {
        let guard = self
            .members
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut counts = HashMap::new();
        for member in guard.iter() {
            *counts.entry(member.occupation).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::domain::Gender;

    fn draft(occupation: Occupation) -> MemberDraft {
        MemberDraft {
            surname: "Patel".to_string(),
            name: "Raj".to_string(),
            gender: Gender::Male,
            age: 34,
            mobile_number: "9876543210".to_string(),
            email_address: "raj@example.com".to_string(),
            national_id_number: "123456789012".to_string(),
            village: "Anand".to_string(),
            occupation,
            notes: String::new(),
        }
    }

    #[test]
    fn create_then_list_round_trips_every_field() {
        let store = InMemoryMemberStore::default();
        let created = store.create(draft(Occupation::Farming)).expect("create");

        let listed = store.list_all().expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], created);
        assert_eq!(listed[0].surname, "Patel");
        assert_eq!(listed[0].occupation, Occupation::Farming);
    }

    #[test]
    fn list_is_most_recent_first() {
        let store = InMemoryMemberStore::default();
        let first = store.create(draft(Occupation::Farming)).expect("create");
        let second = store.create(draft(Occupation::Student)).expect("create");
        let third = store.create(draft(Occupation::Other)).expect("create");

        let listed = store.list_all().expect("list");
        assert_eq!(
            listed.iter().map(|m| m.id.clone()).collect::<Vec<_>>(),
            vec![third.id, second.id, first.id]
        );
    }

    #[test]
    fn store_refuses_malformed_drafts() {
        let store = InMemoryMemberStore::default();

        let mut short_mobile = draft(Occupation::Farming);
        short_mobile.mobile_number = "98765".to_string();
        match store.create(short_mobile) {
            Err(StoreError::InvalidDraft(failures)) => {
                assert!(failures.contains(&ValidationFailure::MobileNumberDigits));
            }
            other => panic!("expected invalid draft, got {other:?}"),
        }

        assert_eq!(store.count().expect("count"), 0, "nothing persisted");
    }

    #[test]
    fn aggregate_counts_sum_to_count() {
        let store = InMemoryMemberStore::default();
        for occupation in [
            Occupation::Farming,
            Occupation::Farming,
            Occupation::Student,
            Occupation::Service,
        ] {
            store.create(draft(occupation)).expect("create");
        }

        let counts = store.aggregate_by_occupation().expect("aggregate");
        assert_eq!(counts.get(&Occupation::Farming), Some(&2));
        assert_eq!(counts.get(&Occupation::Student), Some(&1));
        assert_eq!(counts.get(&Occupation::Labor), None);

        let total: u64 = counts.values().sum();
        assert_eq!(total, store.count().expect("count"));
    }

    #[test]
    fn ids_are_unique_across_stores() {
        let a = InMemoryMemberStore::default();
        let b = InMemoryMemberStore::default();
        let first = a.create(draft(Occupation::Farming)).expect("create");
        let second = b.create(draft(Occupation::Farming)).expect("create");
        assert_ne!(first.id, second.id);
    }
}
