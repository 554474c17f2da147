use crate::utils::error::PostalCodeError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const POSTAL_CODE_LEN: usize = 8;
const MASK_SPLIT: usize = 5;

/// Brazilian postal code (CEP): always exactly eight ASCII digits.
///
/// Leading zeros are significant, so the digits are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostalCode {
    digits: String,
}

impl PostalCode {
    /// Strips every non-digit character and requires eight digits to remain.
    ///
    /// Blank input is reported as [`PostalCodeError::Empty`], never as malformed.
    pub fn parse(raw: &str) -> Result<Self, PostalCodeError> {
        if raw.trim().is_empty() {
            return Err(PostalCodeError::Empty);
        }

        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() != POSTAL_CODE_LEN {
            return Err(PostalCodeError::Malformed {
                digits: digits.len(),
            });
        }

        Ok(Self { digits })
    }

    /// Canonical digits-only form, e.g. `01001000`.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// Display form with a hyphen after the fifth digit, e.g. `01001-000`.
    pub fn masked(&self) -> String {
        let (head, tail) = self.digits.split_at(MASK_SPLIT);
        format!("{}-{}", head, tail)
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digits)
    }
}

impl FromStr for PostalCode {
    type Err = PostalCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PostalCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.digits)
    }
}

/// Blank or whitespace-only text carries no information.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Street address resolved for a postal code.
///
/// Optional fields are coerced once here: a blank value is stored as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    postal_code: PostalCode,
    street: Option<String>,
    complement: Option<String>,
    district: Option<String>,
    city: Option<String>,
    region: Option<String>,
    ibge: Option<String>,
    gia: Option<String>,
    ddd: Option<String>,
}

impl Address {
    pub fn new(postal_code: PostalCode) -> Self {
        Self {
            postal_code,
            street: None,
            complement: None,
            district: None,
            city: None,
            region: None,
            ibge: None,
            gia: None,
            ddd: None,
        }
    }

    pub fn with_street(mut self, street: Option<String>) -> Self {
        self.street = non_blank(street);
        self
    }

    pub fn with_complement(mut self, complement: Option<String>) -> Self {
        self.complement = non_blank(complement);
        self
    }

    pub fn with_district(mut self, district: Option<String>) -> Self {
        self.district = non_blank(district);
        self
    }

    pub fn with_city(mut self, city: Option<String>) -> Self {
        self.city = non_blank(city);
        self
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = non_blank(region);
        self
    }

    /// IBGE municipality code, when the source provides one.
    pub fn with_ibge(mut self, ibge: Option<String>) -> Self {
        self.ibge = non_blank(ibge);
        self
    }

    /// São Paulo state tax (GIA) code; blank outside SP.
    pub fn with_gia(mut self, gia: Option<String>) -> Self {
        self.gia = non_blank(gia);
        self
    }

    /// Telephone area code, when the source provides one.
    pub fn with_ddd(mut self, ddd: Option<String>) -> Self {
        self.ddd = non_blank(ddd);
        self
    }

    pub fn postal_code(&self) -> &PostalCode {
        &self.postal_code
    }

    pub fn street(&self) -> Option<&str> {
        self.street.as_deref()
    }

    pub fn complement(&self) -> Option<&str> {
        self.complement.as_deref()
    }

    pub fn district(&self) -> Option<&str> {
        self.district.as_deref()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn ibge(&self) -> Option<&str> {
        self.ibge.as_deref()
    }

    pub fn gia(&self) -> Option<&str> {
        self.gia.as_deref()
    }

    pub fn ddd(&self) -> Option<&str> {
        self.ddd.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_separators() {
        for raw in ["01001-000", "01001000", " 01.001-000 ", "cep: 01001 000"] {
            let code = PostalCode::parse(raw).unwrap();
            assert_eq!(code.digits(), "01001000");
            assert_eq!(code.masked(), "01001-000");
        }
    }

    #[test]
    fn test_parse_keeps_leading_zeros() {
        let code = PostalCode::parse("00000-001").unwrap();
        assert_eq!(code.digits(), "00000001");
        assert_eq!(code.to_string(), "00000001");
    }

    #[test]
    fn test_parse_wrong_digit_count_is_malformed() {
        assert_eq!(
            PostalCode::parse("123"),
            Err(PostalCodeError::Malformed { digits: 3 })
        );
        assert_eq!(
            PostalCode::parse("010010001"),
            Err(PostalCodeError::Malformed { digits: 9 })
        );
        assert_eq!(
            PostalCode::parse("abcdefgh"),
            Err(PostalCodeError::Malformed { digits: 0 })
        );
        // Non-ASCII digits are not postal-code digits.
        assert_eq!(
            PostalCode::parse("0100100٣"),
            Err(PostalCodeError::Malformed { digits: 7 })
        );
    }

    #[test]
    fn test_parse_blank_is_empty() {
        assert_eq!(PostalCode::parse(""), Err(PostalCodeError::Empty));
        assert_eq!(PostalCode::parse("   \t\n"), Err(PostalCodeError::Empty));
    }

    #[test]
    fn test_masked_round_trip() {
        for raw in ["01001000", "99999-999", "20040-020"] {
            let code: PostalCode = raw.parse().unwrap();
            let reparsed = PostalCode::parse(&code.masked()).unwrap();
            assert_eq!(reparsed, code);
            assert_eq!(reparsed.masked(), code.masked());
        }
    }

    #[test]
    fn test_address_coerces_blank_fields() {
        let code = PostalCode::parse("01001000").unwrap();
        let address = Address::new(code)
            .with_street(Some("Praça da Sé".to_string()))
            .with_complement(Some("   ".to_string()))
            .with_district(Some(String::new()))
            .with_city(Some("São Paulo".to_string()))
            .with_region(None)
            .with_gia(Some(" ".to_string()))
            .with_ddd(Some("11".to_string()));

        assert_eq!(address.street(), Some("Praça da Sé"));
        assert_eq!(address.complement(), None);
        assert_eq!(address.district(), None);
        assert_eq!(address.city(), Some("São Paulo"));
        assert_eq!(address.region(), None);
        assert_eq!(address.gia(), None);
        assert_eq!(address.ddd(), Some("11"));
        assert_eq!(address.postal_code().digits(), "01001000");
    }
}
