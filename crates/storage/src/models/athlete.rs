use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// Which registration form produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    SelfRegistration,
    GuardianConsent,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelfRegistration => "self_registration",
            Self::GuardianConsent => "guardian_consent",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "self_registration" => Ok(Self::SelfRegistration),
            "guardian_consent" => Ok(Self::GuardianConsent),
            other => Err(format!("unknown record kind '{}'", other)),
        }
    }
}

/// An athlete registering themself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct SelfRegistration {
    pub name: String,
    pub tax_id: String,
    pub birth_date: Option<NaiveDate>,
    pub age: u32,
    pub height: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub street: String,
    pub house_number: String,
    pub city: String,
    #[validate(length(max = 2, message = "State must be a two-letter code"))]
    pub state: String,
    pub postal_code: String,
    pub phone: String,
}

/// A minor registered by their legal guardian.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
#[validate(schema(function = "validate_distinct_tax_ids"))]
pub struct GuardianConsent {
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub age: u32,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub minor_tax_id: String,
    pub guardian_tax_id: String,
}

fn validate_distinct_tax_ids(record: &GuardianConsent) -> Result<(), ValidationError> {
    ensure_distinct_tax_ids(&record.minor_tax_id, &record.guardian_tax_id)
}

pub(crate) fn ensure_distinct_tax_ids(minor: &str, guardian: &str) -> Result<(), ValidationError> {
    if !minor.is_empty() && minor == guardian {
        let mut error = ValidationError::new("same_tax_id");
        error.message = Some("Minor and guardian tax ids must differ".into());
        return Err(error);
    }
    Ok(())
}

/// An athlete document as written by either registration form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AthleteRecord {
    SelfRegistration(SelfRegistration),
    GuardianConsent(GuardianConsent),
}

impl AthleteRecord {
    /// A record with every field empty.
    pub fn blank(kind: RecordKind) -> Self {
        match kind {
            RecordKind::SelfRegistration => Self::SelfRegistration(SelfRegistration::default()),
            RecordKind::GuardianConsent => Self::GuardianConsent(GuardianConsent::default()),
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Self::SelfRegistration(_) => RecordKind::SelfRegistration,
            Self::GuardianConsent(_) => RecordKind::GuardianConsent,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::SelfRegistration(r) => &r.name,
            Self::GuardianConsent(r) => &r.name,
        }
    }

    /// The athlete's own tax id (the minor's for guardian consent forms).
    pub fn tax_id(&self) -> &str {
        match self {
            Self::SelfRegistration(r) => &r.tax_id,
            Self::GuardianConsent(r) => &r.minor_tax_id,
        }
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        match self {
            Self::SelfRegistration(r) => r.birth_date,
            Self::GuardianConsent(r) => r.birth_date,
        }
    }

    pub fn age(&self) -> u32 {
        match self {
            Self::SelfRegistration(r) => r.age,
            Self::GuardianConsent(r) => r.age,
        }
    }

    /// Contact phone: the athlete's own, or the guardian's.
    pub fn phone(&self) -> &str {
        match self {
            Self::SelfRegistration(r) => &r.phone,
            Self::GuardianConsent(r) => &r.guardian_phone,
        }
    }

    pub fn guardian_name(&self) -> Option<&str> {
        match self {
            Self::SelfRegistration(_) => None,
            Self::GuardianConsent(r) => Some(&r.guardian_name),
        }
    }

    pub fn guardian_tax_id(&self) -> Option<&str> {
        match self {
            Self::SelfRegistration(_) => None,
            Self::GuardianConsent(r) => Some(&r.guardian_tax_id),
        }
    }

    pub fn as_self_registration(&self) -> Option<&SelfRegistration> {
        match self {
            Self::SelfRegistration(r) => Some(r),
            Self::GuardianConsent(_) => None,
        }
    }
}

impl Validate for AthleteRecord {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::SelfRegistration(r) => r.validate(),
            Self::GuardianConsent(r) => r.validate(),
        }
    }
}

impl From<SelfRegistration> for AthleteRecord {
    fn from(record: SelfRegistration) -> Self {
        Self::SelfRegistration(record)
    }
}

impl From<GuardianConsent> for AthleteRecord {
    fn from(record: GuardianConsent) -> Self {
        Self::GuardianConsent(record)
    }
}

/// A record together with the identity the store gave it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StoredAthlete {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: AthleteRecord,
}
