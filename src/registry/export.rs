use chrono::{DateTime, FixedOffset, Utc};

use super::domain::CommunityMember;

/// Column order is part of the admin contract; downstream spreadsheets key
/// off these exact headings.
pub const EXPORT_HEADER: [&str; 11] = [
    "Surname",
    "Name",
    "Gender",
    "Age",
    "Mobile Number",
    "Email",
    "National ID",
    "Village/City",
    "Occupation",
    "Notes",
    "Submitted At",
];

const IST_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("export buffer error: {0}")]
    Buffer(String),
}

/// Serialize records into CSV text, one row per record in the order given
/// (callers pass the most-recent-first listing).
///
/// Every field is double-quote wrapped and embedded quotes are doubled per
/// RFC 4180, deliberately fixing the unescaped-quote corruption the previous
/// generation of this export shipped with.
pub fn members_to_csv(members: &[CommunityMember]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(EXPORT_HEADER)?;
    for member in members {
        let age = member.age.to_string();
        let submitted_at = format_submitted_at(member.submitted_at);
        writer.write_record([
            member.surname.as_str(),
            member.name.as_str(),
            member.gender.label(),
            age.as_str(),
            member.mobile_number.as_str(),
            member.email_address.as_str(),
            member.national_id_number.as_str(),
            member.village.as_str(),
            member.occupation.label(),
            member.notes.as_str(),
            submitted_at.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Buffer(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| ExportError::Buffer(err.to_string()))
}

/// Render the submission instant in the Asia/Kolkata fixed offset, matching
/// the locale format the admin dashboard has always shown: `26/8/2026,
/// 10:30:15 am`.
pub fn format_submitted_at(submitted_at: DateTime<Utc>) -> String {
    let ist = FixedOffset::east_opt(IST_OFFSET_SECONDS).expect("IST offset is in range");
    submitted_at
        .with_timezone(&ist)
        .format("%-d/%-m/%Y, %-I:%M:%S %P")
        .to_string()
}
