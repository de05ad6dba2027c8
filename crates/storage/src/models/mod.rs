mod athlete;
mod mask;

pub use athlete::{AthleteRecord, GuardianConsent, RecordKind, SelfRegistration, StoredAthlete};
pub(crate) use athlete::ensure_distinct_tax_ids;
pub use mask::Mask;
