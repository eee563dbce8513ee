//! Brazilian CPF (national ID) validation and normalization.
//!
//! A CPF is 11 digits where the last two are check digits computed with a
//! weighted modulo-11 sum over the preceding digits. Input may carry the
//! usual `XXX.XXX.XXX-XX` punctuation; the canonical form is digits only.

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpfError {
    #[error("CPF must have 11 digits and not be a repeated sequence")]
    InvalidFormat,

    #[error("CPF check digits do not match")]
    ChecksumMismatch,
}

/// A validated CPF in canonical 11-digit form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cpf(String);

impl Cpf {
    pub fn parse(input: &str) -> Result<Self, CpfError> {
        let cleaned = digits_only(input);
        let digits: Vec<u32> = cleaned.chars().filter_map(|c| c.to_digit(10)).collect();

        if digits.len() != 11 {
            return Err(CpfError::InvalidFormat);
        }
        if digits.iter().all(|&d| d == digits[0]) {
            return Err(CpfError::InvalidFormat);
        }
        if check_digit(&digits[..9]) != digits[9] {
            return Err(CpfError::ChecksumMismatch);
        }
        if check_digit(&digits[..10]) != digits[10] {
            return Err(CpfError::ChecksumMismatch);
        }

        Ok(Self(cleaned))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display mask, e.g. `529.982.247-25`.
    pub fn formatted(&self) -> String {
        let d = &self.0;
        format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Weights run from `len + 1` down to 2; remainders of 10 fold to 0.
fn check_digit(digits: &[u32]) -> u32 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top - i as u32))
        .sum();
    let r = (sum * 10) % 11;
    if r >= 10 {
        0
    } else {
        r
    }
}

/// Strip everything but ASCII digits.
pub fn digits_only(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}
