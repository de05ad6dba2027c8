//! Field-level editing of a record draft, applying the same input rules the
//! registration forms enforce.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use storage::dto::athlete::AthletePatch;
use storage::models::{AthleteRecord, GuardianConsent, Mask, RecordKind, SelfRegistration};

use crate::age::calculate_age;
use crate::error::FormError;

const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";
const STATE_LENGTH: usize = 2;

/// An editable form input. Age is not listed: it is derived from the birth
/// date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    TaxId,
    BirthDate,
    Height,
    Weight,
    Street,
    HouseNumber,
    City,
    State,
    PostalCode,
    Phone,
    GuardianName,
    GuardianPhone,
    MinorTaxId,
    GuardianTaxId,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::TaxId => "tax_id",
            Self::BirthDate => "birth_date",
            Self::Height => "height",
            Self::Weight => "weight",
            Self::Street => "street",
            Self::HouseNumber => "house_number",
            Self::City => "city",
            Self::State => "state",
            Self::PostalCode => "postal_code",
            Self::Phone => "phone",
            Self::GuardianName => "guardian_name",
            Self::GuardianPhone => "guardian_phone",
            Self::MinorTaxId => "minor_tax_id",
            Self::GuardianTaxId => "guardian_tax_id",
        }
    }

    pub fn mask(&self) -> Option<Mask> {
        match self {
            Self::TaxId | Self::MinorTaxId | Self::GuardianTaxId => Some(Mask::TaxId),
            Self::PostalCode => Some(Mask::PostalCode),
            Self::Phone | Self::GuardianPhone => Some(Mask::Phone),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [Field; 15] = [
            Field::Name,
            Field::TaxId,
            Field::BirthDate,
            Field::Height,
            Field::Weight,
            Field::Street,
            Field::HouseNumber,
            Field::City,
            Field::State,
            Field::PostalCode,
            Field::Phone,
            Field::GuardianName,
            Field::GuardianPhone,
            Field::MinorTaxId,
            Field::GuardianTaxId,
        ];
        ALL.into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown field '{}'", s))
    }
}

/// Decimal input; empty or unparseable text means "not given". A comma is
/// accepted as the decimal separator.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(&raw.replace(',', ".")).ok()
}

pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_INPUT_FORMAT).ok()
}

fn cap_state(raw: &str) -> String {
    raw.chars().take(STATE_LENGTH).collect()
}

fn unknown(field: Field, kind: RecordKind) -> FormError {
    FormError::UnknownField { field, kind }
}

/// Applies one raw form input to `record`. A birth date also recomputes the
/// age against `today`.
pub fn set_field(
    record: &mut AthleteRecord,
    field: Field,
    raw: &str,
    today: NaiveDate,
) -> Result<(), FormError> {
    let kind = record.kind();
    let text = match field.mask() {
        Some(mask) => mask.strip(raw),
        None if field == Field::State => cap_state(raw),
        None => raw.to_string(),
    };

    match record {
        AthleteRecord::SelfRegistration(r) => match field {
            Field::Name => r.name = text,
            Field::TaxId => r.tax_id = text,
            Field::BirthDate => {
                r.birth_date = parse_birth_date(raw);
                r.age = calculate_age(raw, today);
            }
            Field::Height => r.height = parse_decimal(raw),
            Field::Weight => r.weight = parse_decimal(raw),
            Field::Street => r.street = text,
            Field::HouseNumber => r.house_number = text,
            Field::City => r.city = text,
            Field::State => r.state = text,
            Field::PostalCode => r.postal_code = text,
            Field::Phone => r.phone = text,
            other => return Err(unknown(other, kind)),
        },
        AthleteRecord::GuardianConsent(r) => match field {
            Field::Name => r.name = text,
            Field::BirthDate => {
                r.birth_date = parse_birth_date(raw);
                r.age = calculate_age(raw, today);
            }
            Field::GuardianName => r.guardian_name = text,
            Field::GuardianPhone => r.guardian_phone = text,
            Field::MinorTaxId => r.minor_tax_id = text,
            Field::GuardianTaxId => r.guardian_tax_id = text,
            other => return Err(unknown(other, kind)),
        },
    }

    Ok(())
}

fn decimal_text(value: Option<Decimal>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

fn date_text(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format(DATE_INPUT_FORMAT).to_string())
        .unwrap_or_default()
}

/// The value to show in the input for `field`, masked where applicable.
/// `None` when the field does not belong to the record's form.
pub fn display_value(record: &AthleteRecord, field: Field) -> Option<String> {
    let stored = match record {
        AthleteRecord::SelfRegistration(r) => match field {
            Field::Name => r.name.clone(),
            Field::TaxId => r.tax_id.clone(),
            Field::BirthDate => date_text(r.birth_date),
            Field::Height => decimal_text(r.height),
            Field::Weight => decimal_text(r.weight),
            Field::Street => r.street.clone(),
            Field::HouseNumber => r.house_number.clone(),
            Field::City => r.city.clone(),
            Field::State => r.state.clone(),
            Field::PostalCode => r.postal_code.clone(),
            Field::Phone => r.phone.clone(),
            _ => return None,
        },
        AthleteRecord::GuardianConsent(r) => match field {
            Field::Name => r.name.clone(),
            Field::BirthDate => date_text(r.birth_date),
            Field::GuardianName => r.guardian_name.clone(),
            Field::GuardianPhone => r.guardian_phone.clone(),
            Field::MinorTaxId => r.minor_tax_id.clone(),
            Field::GuardianTaxId => r.guardian_tax_id.clone(),
            _ => return None,
        },
    };

    Some(match field.mask() {
        Some(mask) => mask.apply(&stored),
        None => stored,
    })
}

/// Brings a record received from outside the form in line with the form's
/// input rules: masked fields hold digits only, the state is capped and the
/// age follows the birth date.
pub fn normalize(record: AthleteRecord, today: NaiveDate) -> AthleteRecord {
    let age = |birth: Option<NaiveDate>, given: u32| match birth {
        Some(birth) => crate::age::calculate_age_on(birth, today),
        None => given,
    };

    match record {
        AthleteRecord::SelfRegistration(r) => AthleteRecord::SelfRegistration(SelfRegistration {
            tax_id: Mask::TaxId.strip(&r.tax_id),
            age: age(r.birth_date, r.age),
            state: cap_state(&r.state),
            postal_code: Mask::PostalCode.strip(&r.postal_code),
            phone: Mask::Phone.strip(&r.phone),
            ..r
        }),
        AthleteRecord::GuardianConsent(r) => AthleteRecord::GuardianConsent(GuardianConsent {
            age: age(r.birth_date, r.age),
            guardian_phone: Mask::Phone.strip(&r.guardian_phone),
            minor_tax_id: Mask::TaxId.strip(&r.minor_tax_id),
            guardian_tax_id: Mask::TaxId.strip(&r.guardian_tax_id),
            ..r
        }),
    }
}

/// Patch counterpart of [`normalize`]. A birth date in the patch sets the
/// age as well.
pub fn normalize_patch(patch: AthletePatch, today: NaiveDate) -> AthletePatch {
    let strip = |value: Option<String>, mask: Mask| value.map(|v| mask.strip(&v));
    let age = |birth: Option<Option<NaiveDate>>, given: Option<u32>| match birth {
        Some(Some(birth)) => Some(crate::age::calculate_age_on(birth, today)),
        Some(None) => Some(0),
        None => given,
    };

    match patch {
        AthletePatch::SelfRegistration(mut p) => {
            p.tax_id = strip(p.tax_id, Mask::TaxId);
            p.postal_code = strip(p.postal_code, Mask::PostalCode);
            p.phone = strip(p.phone, Mask::Phone);
            p.state = p.state.map(|s| cap_state(&s));
            p.age = age(p.birth_date, p.age);
            AthletePatch::SelfRegistration(p)
        }
        AthletePatch::GuardianConsent(mut p) => {
            p.guardian_phone = strip(p.guardian_phone, Mask::Phone);
            p.minor_tax_id = strip(p.minor_tax_id, Mask::TaxId);
            p.guardian_tax_id = strip(p.guardian_tax_id, Mask::TaxId);
            p.age = age(p.birth_date, p.age);
            AthletePatch::GuardianConsent(p)
        }
    }
}
