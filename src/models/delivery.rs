use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{ValidationError, ValidationResult};

/// Digits in a Brazilian postal code (CEP)
pub const POSTAL_CODE_DIGITS: usize = 8;

/// Contiguous distance interval mapped to one flat fee.
/// The upper bound is inclusive; `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeBand {
    pub up_to_km: Option<f64>,
    pub fee: Decimal,
}

/// Fee bands in ascending distance order
pub static FEE_BANDS: [FeeBand; 4] = [
    FeeBand {
        up_to_km: Some(5.0),
        fee: Decimal::from_parts(400, 0, 0, false, 2),
    },
    FeeBand {
        up_to_km: Some(8.0),
        fee: Decimal::from_parts(700, 0, 0, false, 2),
    },
    FeeBand {
        up_to_km: Some(12.0),
        fee: Decimal::from_parts(1000, 0, 0, false, 2),
    },
    FeeBand {
        up_to_km: None,
        fee: Decimal::from_parts(1400, 0, 0, false, 2),
    },
];

/// Flat delivery fee for a distance in kilometres
pub fn fee_for(distance_km: f64) -> Decimal {
    band_for(distance_km).fee
}

/// Band a distance falls into
pub fn band_for(distance_km: f64) -> &'static FeeBand {
    FEE_BANDS
        .iter()
        .find(|band| band.up_to_km.map_or(true, |limit| distance_km <= limit))
        .unwrap_or(&FEE_BANDS[FEE_BANDS.len() - 1])
}

impl FeeBand {
    /// Human-readable range label, e.g. "5 km - 8 km"
    pub fn label(&self, lower_km: f64) -> String {
        match self.up_to_km {
            Some(upper) => format!("{} km - {} km", lower_km, upper),
            None => format!("Acima de {} km", lower_km),
        }
    }
}

/// Eight-digit postal code, parsed from free-form input by dropping every
/// non-digit character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    pub fn parse(input: &str) -> ValidationResult<Self> {
        let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() != POSTAL_CODE_DIGITS {
            return Err(ValidationError::InvalidFormat {
                field: "postal_code".to_string(),
                expected: format!("{} digits", POSTAL_CODE_DIGITS),
            });
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Conventional display form, e.g. 58046-085
    pub fn formatted(&self) -> String {
        format!("{}-{}", &self.0[..5], &self.0[5..])
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PostalCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PostalCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PostalCode> for String {
    fn from(code: PostalCode) -> Self {
        code.0
    }
}

/// Simulated distance and the fee it maps to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeliveryQuote {
    pub distance_km: f64,
    pub fee: Decimal,
}

impl DeliveryQuote {
    pub fn for_distance(distance_km: f64) -> Self {
        Self {
            distance_km,
            fee: fee_for(distance_km),
        }
    }
}

/// Street and neighborhood returned by the postal-code service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressHint {
    pub street: String,
    pub neighborhood: String,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Result of a postal-code lookup that reached the service
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(AddressHint),
    NotFound,
}

/// Delivery address being filled in by the visitor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressForm {
    pub postal_code: String,
    pub street: String,
    pub neighborhood: String,
    pub number: String,
    pub complement: String,
}

/// Editable address fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressField {
    PostalCode,
    Street,
    Neighborhood,
    Number,
    Complement,
}

/// Partial update of the address form; absent fields are left as they are
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAddressRequest {
    pub postal_code: Option<String>,
    pub street: Option<String>,
    pub neighborhood: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
}

/// Request body for a postal-code lookup; falls back to the stored field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostalLookupRequest {
    pub postal_code: Option<String>,
}

/// Response model for a completed lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostalLookupResponse {
    pub postal_code: String,
    pub address: AddressForm,
    pub quote: DeliveryQuote,
}

/// One row of the published fee table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeBandResponse {
    pub range: String,
    pub up_to_km: Option<f64>,
    pub fee: Decimal,
}

/// Response model for the shipping information page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingFeesResponse {
    pub origin_address: String,
    pub bands: Vec<FeeBandResponse>,
}

impl AddressForm {
    pub fn set(&mut self, field: AddressField, value: String) {
        match field {
            AddressField::PostalCode => self.postal_code = value,
            AddressField::Street => self.street = value,
            AddressField::Neighborhood => self.neighborhood = value,
            AddressField::Number => self.number = value,
            AddressField::Complement => self.complement = value,
        }
    }

    pub fn apply(&mut self, patch: UpdateAddressRequest) {
        let updates = [
            (AddressField::PostalCode, patch.postal_code),
            (AddressField::Street, patch.street),
            (AddressField::Neighborhood, patch.neighborhood),
            (AddressField::Number, patch.number),
            (AddressField::Complement, patch.complement),
        ];
        for (field, value) in updates {
            if let Some(value) = value {
                self.set(field, value);
            }
        }
    }

    /// Overwrite street and neighborhood with what the lookup returned
    pub fn fill_from_hint(&mut self, hint: &AddressHint) {
        self.street = hint.street.clone();
        self.neighborhood = hint.neighborhood.clone();
    }
}

/// Published fee table with readable range labels
pub fn fee_table() -> Vec<FeeBandResponse> {
    let mut lower = 0.0;
    FEE_BANDS
        .iter()
        .map(|band| {
            let row = FeeBandResponse {
                range: band.label(lower),
                up_to_km: band.up_to_km,
                fee: band.fee,
            };
            if let Some(upper) = band.up_to_km {
                lower = upper;
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fee_band_boundaries() {
        assert_eq!(fee_for(0.0), dec!(4.00));
        assert_eq!(fee_for(5.0), dec!(4.00));
        assert_eq!(fee_for(5.01), dec!(7.00));
        assert_eq!(fee_for(8.0), dec!(7.00));
        assert_eq!(fee_for(8.01), dec!(10.00));
        assert_eq!(fee_for(12.0), dec!(10.00));
        assert_eq!(fee_for(12.01), dec!(14.00));
        assert_eq!(fee_for(15.5), dec!(14.00));
    }

    #[test]
    fn test_fee_table_labels() {
        let table = fee_table();
        let labels: Vec<_> = table.iter().map(|row| row.range.as_str()).collect();
        assert_eq!(
            labels,
            vec!["0 km - 5 km", "5 km - 8 km", "8 km - 12 km", "Acima de 12 km"]
        );
        assert_eq!(table[3].fee, dec!(14.00));
    }

    #[test]
    fn test_postal_code_strips_non_digits() {
        let code = PostalCode::parse("58046-085").unwrap();
        assert_eq!(code.as_str(), "58046085");
        assert_eq!(code.formatted(), "58046-085");

        let spaced = PostalCode::parse(" 58.046 085 ").unwrap();
        assert_eq!(spaced, code);
    }

    #[test]
    fn test_postal_code_rejects_wrong_length() {
        assert!(PostalCode::parse("1234").is_err());
        assert!(PostalCode::parse("").is_err());
        assert!(PostalCode::parse("580460851").is_err());
        assert!(PostalCode::parse("abcdefgh").is_err());
    }

    #[test]
    fn test_quote_for_distance() {
        let quote = DeliveryQuote::for_distance(9.3);
        assert_eq!(quote.fee, dec!(10.00));
        assert_eq!(quote.distance_km, 9.3);
    }

    #[test]
    fn test_address_patch_only_touches_present_fields() {
        let mut form = AddressForm {
            street: "Rua A".to_string(),
            number: "10".to_string(),
            ..Default::default()
        };

        form.apply(UpdateAddressRequest {
            number: Some("12".to_string()),
            complement: Some("Ap 3".to_string()),
            ..Default::default()
        });

        assert_eq!(form.street, "Rua A");
        assert_eq!(form.number, "12");
        assert_eq!(form.complement, "Ap 3");
    }

    #[test]
    fn test_fill_from_hint_overwrites_street_and_neighborhood() {
        let mut form = AddressForm {
            street: "Old".to_string(),
            neighborhood: "Old".to_string(),
            number: "5".to_string(),
            ..Default::default()
        };
        form.fill_from_hint(&AddressHint {
            street: "Rua Rui Costa".to_string(),
            neighborhood: String::new(),
            ..Default::default()
        });

        assert_eq!(form.street, "Rua Rui Costa");
        assert_eq!(form.neighborhood, "");
        assert_eq!(form.number, "5");
    }
}
