//! Single-cell references ("C5", "AA100") and column letters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::A1Error;

/// A cell position, zero-based in both dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub column: u32,
    pub row: u32,
}

impl CellRef {
    pub fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

/// Parse a cell token such as `"B3"` into zero-based coordinates.
///
/// The token is trimmed and matched case-insensitively. It must be one
/// contiguous run of letters followed by one contiguous run of digits;
/// `"A1B2"`, `"1A"` and `"A-1"` are all rejected. Row `0` does not exist in
/// A1 notation and is rejected as well.
pub fn parse_cell_ref(token: &str) -> Result<CellRef, A1Error> {
    let trimmed = token.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    let (letters, digits) = trimmed.split_at(split);

    if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(A1Error::InvalidCellRef(token.to_string()));
    }

    let column = column_letter_to_index(letters)
        .map_err(|_| A1Error::InvalidCellRef(token.to_string()))?;

    let row = digits
        .parse::<u32>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| A1Error::InvalidRow(digits.to_string()))?;

    Ok(CellRef { column, row })
}

/// Convert bare column letters into a zero-based index (`A` → 0, `Z` → 25,
/// `AA` → 26).
///
/// Empty input, non-letters, and values that overflow `u32` are errors.
pub fn column_letter_to_index(letters: &str) -> Result<u32, A1Error> {
    let trimmed = letters.trim();
    if trimmed.is_empty() {
        return Err(A1Error::InvalidColumn(letters.to_string()));
    }

    let mut acc: u32 = 0;
    for b in trimmed.bytes() {
        if !b.is_ascii_alphabetic() {
            return Err(A1Error::InvalidColumn(letters.to_string()));
        }
        let digit = u32::from(b.to_ascii_uppercase() - b'A') + 1;
        acc = acc
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| A1Error::InvalidColumn(letters.to_string()))?;
    }

    // acc >= 1 here since at least one letter was consumed
    Ok(acc - 1)
}

/// Convert a zero-based column index back into letters (0 → `A`, 26 → `AA`).
pub fn column_index_to_letters(index: u32) -> String {
    let mut letters = Vec::new();
    let mut n = u64::from(index) + 1;
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

impl FromStr for CellRef {
    type Err = A1Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_cell_ref(s)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_index_to_letters(self.column), u64::from(self.row) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter_to_index("A").unwrap(), 0);
        assert_eq!(column_letter_to_index("Z").unwrap(), 25);
        assert_eq!(column_letter_to_index("AA").unwrap(), 26);
        assert_eq!(column_letter_to_index("AZ").unwrap(), 51);
        assert_eq!(column_letter_to_index("ZZ").unwrap(), 701);
        assert_eq!(column_letter_to_index("aaa").unwrap(), 702);
    }

    #[test]
    fn test_column_letters_rejects_bad_input() {
        assert_eq!(
            column_letter_to_index(""),
            Err(A1Error::InvalidColumn(String::new()))
        );
        assert!(column_letter_to_index("A1").is_err());
        assert!(column_letter_to_index("-").is_err());
        assert!(column_letter_to_index(&"Z".repeat(10)).is_err());
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1").unwrap(), CellRef::new(0, 0));
        assert_eq!(parse_cell_ref("C5").unwrap(), CellRef::new(2, 4));
        assert_eq!(parse_cell_ref("AA100").unwrap(), CellRef::new(26, 99));
        assert_eq!(parse_cell_ref("  b3 ").unwrap(), CellRef::new(1, 2));
    }

    #[test]
    fn test_parse_cell_ref_agrees_with_column_converter() {
        for letters in ["A", "H", "Z", "AB", "XFD"] {
            for row in [1u32, 7, 1000] {
                let cell = parse_cell_ref(&format!("{}{}", letters, row)).unwrap();
                assert_eq!(cell.column, column_letter_to_index(letters).unwrap());
                assert_eq!(cell.row, row - 1);
            }
        }
    }

    #[test]
    fn test_parse_cell_ref_is_strict() {
        for bad in ["", "A", "1", "1A", "A1B2", "A-1", "A 1", "A1.5", "É1"] {
            assert!(parse_cell_ref(bad).is_err(), "{:?} should be rejected", bad);
        }
        assert_eq!(
            parse_cell_ref("1A"),
            Err(A1Error::InvalidCellRef("1A".to_string()))
        );
    }

    #[test]
    fn test_parse_cell_ref_row_zero() {
        assert_eq!(parse_cell_ref("A0"), Err(A1Error::InvalidRow("0".to_string())));
        assert!(matches!(
            parse_cell_ref("A99999999999"),
            Err(A1Error::InvalidRow(_))
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for token in ["A1", "Z26", "AA100", "XFD1048576"] {
            assert_eq!(token.parse::<CellRef>().unwrap().to_string(), token);
        }
        assert_eq!(column_index_to_letters(0), "A");
        assert_eq!(column_index_to_letters(701), "ZZ");
    }
}
