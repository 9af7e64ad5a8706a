use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for persisted member records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(pub String);

/// Self-described gender, restricted to the labels the form offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const LABELS: &'static str = "Male, Female, Other";

    /// Exact, case-sensitive label match.
    pub fn from_label(value: &str) -> Option<Self> {
        match value {
            "Male" => Some(Self::Male),
            "Female" => Some(Self::Female),
            "Other" => Some(Self::Other),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

/// Occupation categories tracked for aggregate statistics.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Occupation {
    Farming,
    Labor,
    Business,
    Student,
    Service,
    Other,
}

impl Occupation {
    pub const LABELS: &'static str = "Farming, Labor, Business, Student, Service, Other";

    /// Exact, case-sensitive label match.
    pub fn from_label(value: &str) -> Option<Self> {
        match value {
            "Farming" => Some(Self::Farming),
            "Labor" => Some(Self::Labor),
            "Business" => Some(Self::Business),
            "Student" => Some(Self::Student),
            "Service" => Some(Self::Service),
            "Other" => Some(Self::Other),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Occupation::Farming => "Farming",
            Occupation::Labor => "Labor",
            Occupation::Business => "Business",
            Occupation::Student => "Student",
            Occupation::Service => "Service",
            Occupation::Other => "Other",
        }
    }
}

/// Raw, untyped submission as it arrives from the public form.
///
/// Every field is optional here so validation can report the full set of
/// problems instead of bailing at deserialization time. `age` tolerates both
/// a JSON number and a string, matching what browsers actually send.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSubmission {
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "deserialize_number_or_string")]
    pub age: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub national_id_number: Option<String>,
    #[serde(default)]
    pub village: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Normalized candidate record, produced only by validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDraft {
    pub surname: String,
    pub name: String,
    pub gender: Gender,
    pub age: u8,
    pub mobile_number: String,
    pub email_address: String,
    pub national_id_number: String,
    pub village: String,
    pub occupation: Occupation,
    pub notes: String,
}

/// One persisted registration. Immutable once created; the system exposes no
/// update or delete operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityMember {
    pub id: MemberId,
    pub surname: String,
    pub name: String,
    pub gender: Gender,
    pub age: u8,
    pub mobile_number: String,
    pub email_address: String,
    pub national_id_number: String,
    pub village: String,
    pub occupation: Occupation,
    pub notes: String,
    pub submitted_at: DateTime<Utc>,
}

impl CommunityMember {
    pub fn from_draft(id: MemberId, submitted_at: DateTime<Utc>, draft: MemberDraft) -> Self {
        Self {
            id,
            surname: draft.surname,
            name: draft.name,
            gender: draft.gender,
            age: draft.age,
            mobile_number: draft.mobile_number,
            email_address: draft.email_address,
            national_id_number: draft.national_id_number,
            village: draft.village,
            occupation: draft.occupation,
            notes: draft.notes,
            submitted_at,
        }
    }
}

fn deserialize_number_or_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Number(number) => Some(number.to_string()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }))
}
