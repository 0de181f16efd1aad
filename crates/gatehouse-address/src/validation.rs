//! Field rules for address bodies.
//!
//! Violations are pushed in field order so clients see them in the same
//! order as the body.

use gatehouse_core::{FieldViolations, Validate};

use crate::model::{CreateAddress, UpdateAddress};

/// Longest accepted title or city, in characters.
pub const MAX_TEXT_CHARS: usize = 100;
/// Longest accepted postal code, in characters.
pub const MAX_ZIP_CHARS: usize = 12;

const PHONE_CHARS: std::ops::RangeInclusive<usize> = 7..=20;

impl Validate for CreateAddress {
    fn validate(&self, violations: &mut FieldViolations) {
        if self.client_id <= 0 {
            violations.push("client_id", "min", "client_id must be greater than 0");
        }
        required_text(violations, "title", &self.title);
        required_text(violations, "city", &self.city);
        optional_fields(
            violations,
            self.phone.as_deref(),
            self.zip.as_deref(),
            self.lat,
            self.long,
        );
    }
}

impl Validate for UpdateAddress {
    fn validate(&self, violations: &mut FieldViolations) {
        if let Some(title) = &self.title {
            required_text(violations, "title", title);
        }
        if let Some(city) = &self.city {
            required_text(violations, "city", city);
        }
        optional_fields(
            violations,
            self.phone.as_deref(),
            self.zip.as_deref(),
            self.lat,
            self.long,
        );
    }
}

fn required_text(violations: &mut FieldViolations, field: &str, value: &str) {
    if value.trim().is_empty() {
        violations.push(field, "required", format!("{field} is required"));
    } else if value.chars().count() > MAX_TEXT_CHARS {
        violations.push(
            field,
            "max",
            format!("{field} must be at most {MAX_TEXT_CHARS} characters"),
        );
    }
}

fn optional_fields(
    violations: &mut FieldViolations,
    phone: Option<&str>,
    zip: Option<&str>,
    lat: Option<f64>,
    long: Option<f64>,
) {
    if let Some(phone) = phone {
        if !is_phone(phone) {
            violations.push(
                "phone",
                "phone",
                "phone must be 7 to 20 digits, spaces or + - ( )",
            );
        }
    }
    if let Some(zip) = zip {
        if zip.chars().count() > MAX_ZIP_CHARS {
            violations.push(
                "zip",
                "max",
                format!("zip must be at most {MAX_ZIP_CHARS} characters"),
            );
        }
    }
    if let Some(lat) = lat {
        if !(-90.0..=90.0).contains(&lat) {
            violations.push("lat", "range", "lat must be between -90 and 90");
        }
    }
    if let Some(long) = long {
        if !(-180.0..=180.0).contains(&long) {
            violations.push("long", "range", "long must be between -180 and 180");
        }
    }
}

fn is_phone(value: &str) -> bool {
    PHONE_CHARS.contains(&value.chars().count())
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create() -> CreateAddress {
        CreateAddress {
            client_id: 1,
            title: "Head office".to_string(),
            city: "Berlin".to_string(),
            street: None,
            phone: None,
            zip: None,
            lat: None,
            long: None,
        }
    }

    fn tags(input: &impl Validate) -> Vec<(String, &'static str)> {
        let mut violations = FieldViolations::new();
        input.validate(&mut violations);
        violations
            .iter()
            .map(|v| (v.field.clone(), v.constraint))
            .collect()
    }

    #[test]
    fn test_valid_create() {
        assert!(tags(&create()).is_empty());
    }

    #[test]
    fn test_violations_in_field_order() {
        let input = CreateAddress {
            client_id: 0,
            title: "  ".to_string(),
            city: "x".repeat(101),
            phone: Some("12ab".to_string()),
            zip: Some("1234567890123".to_string()),
            lat: Some(91.0),
            long: Some(-180.5),
            ..create()
        };

        assert_eq!(
            tags(&input),
            vec![
                ("client_id".to_string(), "min"),
                ("title".to_string(), "required"),
                ("city".to_string(), "max"),
                ("phone".to_string(), "phone"),
                ("zip".to_string(), "max"),
                ("lat".to_string(), "range"),
                ("long".to_string(), "range"),
            ]
        );
    }

    #[test]
    fn test_boundaries_accepted() {
        let input = CreateAddress {
            title: "t".repeat(100),
            phone: Some("+1 (555) 010-9999".to_string()),
            zip: Some("123456789012".to_string()),
            lat: Some(-90.0),
            long: Some(180.0),
            ..create()
        };
        assert!(tags(&input).is_empty());
    }

    #[test]
    fn test_phone_length() {
        assert!(is_phone("1234567"));
        assert!(!is_phone("123456"));
        assert!(!is_phone(&"1".repeat(21)));
    }

    #[test]
    fn test_update_only_checks_present_fields() {
        assert!(tags(&UpdateAddress::default()).is_empty());

        let update = UpdateAddress {
            title: Some(String::new()),
            lat: Some(100.0),
            ..Default::default()
        };
        assert_eq!(
            tags(&update),
            vec![("title".to_string(), "required"), ("lat".to_string(), "range")]
        );
    }
}
