//! CPF (Brazilian individual tax id) helpers.
//!
//! A CPF is 11 digits, the last two being check digits, usually shown with
//! the `000.000.000-00` mask. Everything here is pure and never panics.
//!
//! # Examples
//!
//! ```
//! use rolegate_auth::cpf::{format_cpf, is_valid_cpf, strip_cpf_mask};
//!
//! assert_eq!(format_cpf("52998224725"), "529.982.247-25");
//! assert_eq!(format_cpf("5299"), "529.9");
//! assert!(is_valid_cpf("529.982.247-25"));
//! assert!(!is_valid_cpf("111.111.111-11"));
//! assert_eq!(strip_cpf_mask("529.982.247-25"), "52998224725");
//! ```

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of digits in a CPF.
pub const CPF_LEN: usize = 11;

/// Keep only the ASCII digits of `input`.
#[must_use]
pub fn strip_cpf_mask(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Apply the `000.000.000-00` mask progressively.
///
/// Non-digits are dropped and input is truncated to 11 digits. Mask
/// characters are only emitted once a digit follows them, so partial input
/// formats as it is typed: `"1234"` becomes `"123.4"`.
#[must_use]
pub fn format_cpf(input: &str) -> String {
    let mut out = String::with_capacity(CPF_LEN + 3);
    for (i, digit) in input.chars().filter(char::is_ascii_digit).take(CPF_LEN).enumerate() {
        match i {
            3 | 6 => out.push('.'),
            9 => out.push('-'),
            _ => {},
        }
        out.push(digit);
    }
    out
}

/// Check digit over `digits` with weights counting down from `start` to 2.
fn check_digit(digits: &[u32], start: u32) -> u32 {
    let sum: u32 = digits
        .iter()
        .zip((2..=start).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();
    match sum % 11 {
        r if r < 2 => 0,
        r => 11 - r,
    }
}

/// Returns `true` if `input` (masked or not) is a valid CPF.
///
/// Requires exactly 11 digits after stripping the mask, rejects sequences of
/// one repeated digit and verifies both check digits.
#[must_use]
pub fn is_valid_cpf(input: &str) -> bool {
    let digits: Vec<u32> = input.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != CPF_LEN {
        return false;
    }

    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9], 10) == digits[9] && check_digit(&digits[..10], 11) == digits[10]
}

/// CPF parse failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CpfError {
    /// Not 11 digits once the mask is removed.
    #[error("CPF must have 11 digits, got {0}")]
    WrongLength(usize),

    /// Check digits do not match, or all digits are equal.
    #[error("CPF check digits do not match")]
    InvalidCheckDigits,
}

/// A validated CPF, stored as its 11 bare digits.
///
/// `Display` renders the masked form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cpf(String);

impl Cpf {
    /// Parse and validate a CPF, masked or not.
    ///
    /// # Errors
    ///
    /// Returns [`CpfError`] if the input is not a valid CPF.
    pub fn parse(input: &str) -> Result<Self, CpfError> {
        let digits = strip_cpf_mask(input);
        if digits.len() != CPF_LEN {
            return Err(CpfError::WrongLength(digits.len()));
        }
        if !is_valid_cpf(&digits) {
            return Err(CpfError::InvalidCheckDigits);
        }
        Ok(Self(digits))
    }

    /// The 11 digits without mask.
    #[must_use]
    pub fn digits(&self) -> &str {
        &self.0
    }
}

impl FromStr for Cpf {
    type Err = CpfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_cpf(&self.0))
    }
}
