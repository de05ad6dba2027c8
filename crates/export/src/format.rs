use chrono::NaiveDate;
use rust_decimal::Decimal;
use storage::models::Mask;

pub const MISSING: &str = "-";

fn or_missing(value: String) -> String {
    if value.trim().is_empty() {
        MISSING.to_string()
    } else {
        value
    }
}

pub fn text(value: &str) -> String {
    or_missing(value.to_string())
}

pub fn masked(value: &str, mask: Mask) -> String {
    or_missing(mask.apply(value))
}

pub fn date(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

pub fn decimal(value: Option<Decimal>) -> String {
    value
        .map(|d| d.normalize().to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values_render_as_dash() {
        assert_eq!(text(""), "-");
        assert_eq!(text("   "), "-");
        assert_eq!(masked("", Mask::TaxId), "-");
        assert_eq!(date(None), "-");
        assert_eq!(decimal(None), "-");
    }

    #[test]
    fn test_values_are_formatted() {
        assert_eq!(masked("12345678900", Mask::TaxId), "123.456.789-00");
        assert_eq!(date(NaiveDate::from_ymd_opt(2010, 6, 16)), "16/06/2010");
        assert_eq!(decimal(Some(Decimal::new(17250, 2))), "172.5");
    }
}
