//! # Fleet File Parsing
//!
//! Parses the comma-separated fleet format used to populate a company.
//!
//! ## Format
//! ```text
//! # name,seats,trunk,price/day,smoking,fleet size
//! sedan,4,2.5,50.0,false,2
//! van,8,6,90,true,1
//! ```
//!
//! - One header-less row per car type
//! - Lines starting with `#` are comments, blank lines are skipped
//! - Fields are trimmed
//!
//! Parsing is all-or-nothing: the first malformed row fails the whole file,
//! so a company is never half loaded. Actually writing the rows is the
//! manager session's job.

use crate::error::LoadError;
use crate::money::Money;
use crate::types::CarType;
use crate::validation::validate_car_type;

const FIELDS: [&str; 6] = [
    "name",
    "seats",
    "trunk_space",
    "daily_price",
    "smoking_allowed",
    "fleet_size",
];

/// One parsed row: a car type and how many cars of it the company owns.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetRow {
    pub car_type: CarType,
    pub fleet_size: u32,
}

/// Parses a whole fleet file.
///
/// ## Example
/// ```rust
/// use rental_core::loader::parse_fleet;
///
/// let rows = parse_fleet("# comment\nsedan,4,2.5,50.0,false,2\n").unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].fleet_size, 2);
/// assert_eq!(rows[0].car_type.daily_price.cents(), 5000);
/// ```
pub fn parse_fleet(input: &str) -> Result<Vec<FleetRow>, LoadError> {
    input
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line_no, line)| parse_row(line_no, line))
        .collect()
}

fn parse_row(line: usize, text: &str) -> Result<FleetRow, LoadError> {
    let mut fields = text.split(',').map(str::trim);
    let mut next = |field: &'static str| {
        match fields.next() {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(LoadError::MissingField { line, field }),
        }
    };

    let name = next(FIELDS[0])?;
    let seats = parse_number(line, FIELDS[1], next(FIELDS[1])?)?;
    let trunk_raw = next(FIELDS[2])?;
    let trunk_space: f32 = trunk_raw.parse().map_err(|_| LoadError::InvalidField {
        line,
        field: FIELDS[2],
        value: trunk_raw.to_string(),
        reason: "expected a number".to_string(),
    })?;
    let price_raw = next(FIELDS[3])?;
    let daily_price: Money = price_raw.parse().map_err(|e| LoadError::InvalidField {
        line,
        field: FIELDS[3],
        value: price_raw.to_string(),
        reason: format!("{e}"),
    })?;
    let smoking_allowed = parse_bool(line, FIELDS[4], next(FIELDS[4])?)?;
    let fleet_size = parse_number(line, FIELDS[5], next(FIELDS[5])?)?;

    if let Some(extra) = fields.next() {
        return Err(LoadError::ExtraField {
            line,
            value: extra.to_string(),
        });
    }

    let car_type = CarType::new(name, seats, trunk_space, daily_price, smoking_allowed);
    validate_car_type(&car_type).map_err(|e| LoadError::InvalidField {
        line,
        field: FIELDS[0],
        value: name.to_string(),
        reason: e.to_string(),
    })?;

    Ok(FleetRow {
        car_type,
        fleet_size,
    })
}

fn parse_number(line: usize, field: &'static str, value: &str) -> Result<u32, LoadError> {
    value.parse().map_err(|_| LoadError::InvalidField {
        line,
        field,
        value: value.to_string(),
        reason: "expected a non-negative integer".to_string(),
    })
}

fn parse_bool(line: usize, field: &'static str, value: &str) -> Result<bool, LoadError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(LoadError::InvalidField {
            line,
            field,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const HERTZ: &str = "\
# name,seats,trunk,price,smoking,fleet
sedan, 4, 2.5, 50.0, false, 2

van,8,6,90,TRUE,1
";

    #[test]
    fn test_parse_rows() {
        let rows = parse_fleet(HERTZ).unwrap();
        assert_eq!(rows.len(), 2);

        let sedan = &rows[0];
        assert_eq!(sedan.car_type.name, "sedan");
        assert_eq!(sedan.car_type.seats, 4);
        assert!((sedan.car_type.trunk_space - 2.5).abs() < f32::EPSILON);
        assert_eq!(sedan.car_type.daily_price, Money::from_cents(5000));
        assert!(!sedan.car_type.smoking_allowed);
        assert_eq!(sedan.fleet_size, 2);

        assert!(rows[1].car_type.smoking_allowed);
        assert_eq!(rows[1].fleet_size, 1);
    }

    #[test]
    fn test_empty_and_comment_only() {
        assert!(parse_fleet("").unwrap().is_empty());
        assert!(parse_fleet("# nothing\n#here\n").unwrap().is_empty());
    }

    #[test]
    fn test_missing_field_reports_line() {
        let err = parse_fleet("# header\nsedan,4,2.5,50.0,false\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingField {
                line: 2,
                field: "fleet_size"
            }
        ));
    }

    #[test]
    fn test_non_numeric_field() {
        let err = parse_fleet("sedan,four,2.5,50.0,false,2").unwrap_err();
        match err {
            LoadError::InvalidField { line, field, value, .. } => {
                assert_eq!(line, 1);
                assert_eq!(field, "seats");
                assert_eq!(value, "four");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_bool_and_price() {
        assert!(matches!(
            parse_fleet("sedan,4,2.5,50.0,maybe,2"),
            Err(LoadError::InvalidField {
                field: "smoking_allowed",
                ..
            })
        ));
        assert!(matches!(
            parse_fleet("sedan,4,2.5,50.001,false,2"),
            Err(LoadError::InvalidField {
                field: "daily_price",
                ..
            })
        ));
    }

    #[test]
    fn test_extra_field() {
        assert!(matches!(
            parse_fleet("sedan,4,2.5,50.0,false,2,blue"),
            Err(LoadError::ExtraField { line: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_car_type_values() {
        assert!(parse_fleet("sedan,0,2.5,50.0,false,2").is_err());
        assert!(parse_fleet("sedan,4,2.5,0,false,2").is_err());
    }

    #[test]
    fn test_one_bad_row_fails_whole_file() {
        let input = "sedan,4,2.5,50.0,false,2\nvan,8,6,x,true,1\n";
        assert!(parse_fleet(input).is_err());
    }
}
