use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{Result, StorageError};
use crate::models::{
    AthleteRecord, GuardianConsent, RecordKind, SelfRegistration, ensure_distinct_tax_ids,
};

/// Response returned after a document is created
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    pub id: Uuid,
}

/// Field merge for a self registration document. Absent fields are left
/// untouched; an explicit `null` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct SelfRegistrationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "nullable")]
    #[schema(value_type = Option<NaiveDate>)]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub height: Option<Option<Decimal>>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub weight: Option<Option<Decimal>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2, message = "State must be a two-letter code"))]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Field merge for a guardian consent document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
#[validate(schema(function = "validate_patch_tax_ids"))]
pub struct GuardianConsentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "nullable")]
    #[schema(value_type = Option<NaiveDate>)]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardian_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardian_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor_tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardian_tax_id: Option<String>,
}

fn validate_patch_tax_ids(patch: &GuardianConsentPatch) -> std::result::Result<(), ValidationError> {
    match (&patch.minor_tax_id, &patch.guardian_tax_id) {
        (Some(minor), Some(guardian)) => ensure_distinct_tax_ids(minor, guardian),
        _ => Ok(()),
    }
}

// Keeps `null` distinguishable from an absent field.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request payload for updating an existing document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AthletePatch {
    SelfRegistration(SelfRegistrationPatch),
    GuardianConsent(GuardianConsentPatch),
}

impl AthletePatch {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::SelfRegistration(_) => RecordKind::SelfRegistration,
            Self::GuardianConsent(_) => RecordKind::GuardianConsent,
        }
    }

    /// The merged fields as a JSON object, without the `kind` tag.
    pub fn fields_json(&self) -> Result<serde_json::Value> {
        let value = match self {
            Self::SelfRegistration(p) => serde_json::to_value(p)?,
            Self::GuardianConsent(p) => serde_json::to_value(p)?,
        };
        Ok(value)
    }

    /// Merges the patch into `record` in place.
    pub fn apply(&self, id: Uuid, record: &mut AthleteRecord) -> Result<()> {
        match (self, record) {
            (Self::SelfRegistration(p), AthleteRecord::SelfRegistration(r)) => {
                p.merge_into(r);
                Ok(())
            }
            (Self::GuardianConsent(p), AthleteRecord::GuardianConsent(r)) => {
                p.merge_into(r);
                Ok(())
            }
            (patch, record) => Err(StorageError::KindMismatch {
                id,
                expected: patch.kind(),
                found: record.kind(),
            }),
        }
    }
}

impl Validate for AthletePatch {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        match self {
            Self::SelfRegistration(p) => p.validate(),
            Self::GuardianConsent(p) => p.validate(),
        }
    }
}

fn merge<T>(target: &mut T, value: &Option<T>)
where
    T: Clone,
{
    if let Some(value) = value {
        *target = value.clone();
    }
}

impl SelfRegistrationPatch {
    fn merge_into(&self, r: &mut SelfRegistration) {
        merge(&mut r.name, &self.name);
        merge(&mut r.tax_id, &self.tax_id);
        merge(&mut r.birth_date, &self.birth_date);
        merge(&mut r.age, &self.age);
        merge(&mut r.height, &self.height);
        merge(&mut r.weight, &self.weight);
        merge(&mut r.street, &self.street);
        merge(&mut r.house_number, &self.house_number);
        merge(&mut r.city, &self.city);
        merge(&mut r.state, &self.state);
        merge(&mut r.postal_code, &self.postal_code);
        merge(&mut r.phone, &self.phone);
    }
}

impl GuardianConsentPatch {
    fn merge_into(&self, r: &mut GuardianConsent) {
        merge(&mut r.name, &self.name);
        merge(&mut r.birth_date, &self.birth_date);
        merge(&mut r.age, &self.age);
        merge(&mut r.guardian_name, &self.guardian_name);
        merge(&mut r.guardian_phone, &self.guardian_phone);
        merge(&mut r.minor_tax_id, &self.minor_tax_id);
        merge(&mut r.guardian_tax_id, &self.guardian_tax_id);
    }
}

/// A full-document replace expressed as a patch that sets every field.
impl From<AthleteRecord> for AthletePatch {
    fn from(record: AthleteRecord) -> Self {
        match record {
            AthleteRecord::SelfRegistration(r) => Self::SelfRegistration(SelfRegistrationPatch {
                name: Some(r.name),
                tax_id: Some(r.tax_id),
                birth_date: Some(r.birth_date),
                age: Some(r.age),
                height: Some(r.height),
                weight: Some(r.weight),
                street: Some(r.street),
                house_number: Some(r.house_number),
                city: Some(r.city),
                state: Some(r.state),
                postal_code: Some(r.postal_code),
                phone: Some(r.phone),
            }),
            AthleteRecord::GuardianConsent(r) => Self::GuardianConsent(GuardianConsentPatch {
                name: Some(r.name),
                birth_date: Some(r.birth_date),
                age: Some(r.age),
                guardian_name: Some(r.guardian_name),
                guardian_phone: Some(r.guardian_phone),
                minor_tax_id: Some(r.minor_tax_id),
                guardian_tax_id: Some(r.guardian_tax_id),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AthleteRecord {
        AthleteRecord::SelfRegistration(SelfRegistration {
            name: "Ana".into(),
            tax_id: "12345678900".into(),
            height: Some(Decimal::new(1725, 1)),
            city: "Recife".into(),
            ..Default::default()
        })
    }

    #[test]
    fn test_patch_leaves_absent_fields_untouched() {
        let mut record = sample();
        let patch: AthletePatch =
            serde_json::from_value(serde_json::json!({ "kind": "self_registration", "city": "Olinda" }))
                .unwrap();

        patch.apply(Uuid::nil(), &mut record).unwrap();

        let AthleteRecord::SelfRegistration(r) = record else { unreachable!() };
        assert_eq!(r.city, "Olinda");
        assert_eq!(r.name, "Ana");
        assert_eq!(r.height, Some(Decimal::new(1725, 1)));
    }

    #[test]
    fn test_explicit_null_clears_optional_field() {
        let mut record = sample();
        let patch: AthletePatch =
            serde_json::from_value(serde_json::json!({ "kind": "self_registration", "height": null }))
                .unwrap();

        patch.apply(Uuid::nil(), &mut record).unwrap();

        let AthleteRecord::SelfRegistration(r) = record else { unreachable!() };
        assert_eq!(r.height, None);
    }

    #[test]
    fn test_fields_json_omits_absent_fields_and_tag() {
        let patch = AthletePatch::SelfRegistration(SelfRegistrationPatch {
            name: Some("Ana".into()),
            weight: Some(None),
            ..Default::default()
        });

        let json = patch.fields_json().unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Ana", "weight": null }));
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let mut record = sample();
        let patch = AthletePatch::GuardianConsent(GuardianConsentPatch::default());

        let err = patch.apply(Uuid::nil(), &mut record).unwrap_err();
        assert!(matches!(
            err,
            StorageError::KindMismatch {
                expected: RecordKind::GuardianConsent,
                found: RecordKind::SelfRegistration,
                ..
            }
        ));
    }

    #[test]
    fn test_full_patch_reproduces_record() {
        let original = sample();
        let mut target = AthleteRecord::blank(RecordKind::SelfRegistration);

        AthletePatch::from(original.clone())
            .apply(Uuid::nil(), &mut target)
            .unwrap();

        assert_eq!(target, original);
    }
}
