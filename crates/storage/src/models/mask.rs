/// Digits-with-punctuation input pattern. `0` marks a digit slot, every
/// other character is a literal inserted for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mask {
    /// CPF, `000.000.000-00`
    TaxId,
    /// CEP, `00000-000`
    PostalCode,
    /// Mobile phone, `(00) 00000-0000`
    Phone,
}

impl Mask {
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::TaxId => "000.000.000-00",
            Self::PostalCode => "00000-000",
            Self::Phone => "(00) 00000-0000",
        }
    }

    /// Number of digit slots in the pattern.
    pub fn capacity(&self) -> usize {
        self.pattern().chars().filter(|c| *c == '0').count()
    }

    /// The storable value of `input`: its digits, up to the mask's capacity.
    pub fn strip(&self, input: &str) -> String {
        input
            .chars()
            .filter(char::is_ascii_digit)
            .take(self.capacity())
            .collect()
    }

    /// Formats `value` for display. Literals are emitted only when another
    /// digit follows them, so partial input never ends in punctuation.
    pub fn apply(&self, value: &str) -> String {
        let digits = self.strip(value);
        let mut remaining = digits.chars().peekable();
        let mut out = String::with_capacity(self.pattern().len());

        for slot in self.pattern().chars() {
            if remaining.peek().is_none() {
                break;
            }
            if slot == '0' {
                if let Some(digit) = remaining.next() {
                    out.push(digit);
                }
            } else {
                out.push(slot);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_rejects_non_digits() {
        assert_eq!(Mask::TaxId.strip("abc123"), "123");
        assert_eq!(Mask::TaxId.apply("abc123"), "123");
    }

    #[test]
    fn test_strip_removes_punctuation_and_caps_length() {
        assert_eq!(Mask::TaxId.strip("123.456.789-0099"), "12345678900");
        assert_eq!(Mask::PostalCode.strip("50000-000"), "50000000");
    }

    #[test]
    fn test_apply_full_values() {
        assert_eq!(Mask::TaxId.apply("12345678900"), "123.456.789-00");
        assert_eq!(Mask::PostalCode.apply("50030230"), "50030-230");
        assert_eq!(Mask::Phone.apply("81998765432"), "(81) 99876-5432");
    }

    #[test]
    fn test_apply_partial_values() {
        assert_eq!(Mask::TaxId.apply("1234"), "123.4");
        assert_eq!(Mask::Phone.apply("8"), "(8");
        assert_eq!(Mask::Phone.apply("81"), "(81");
        assert_eq!(Mask::Phone.apply(""), "");
    }

    #[test]
    fn test_apply_is_stable_on_formatted_input() {
        let shown = Mask::Phone.apply("81998765432");
        assert_eq!(Mask::Phone.apply(&shown), shown);
        assert_eq!(Mask::Phone.strip(&shown), "81998765432");
    }
}
