use std::collections::HashSet;

use rand::RngExt;

use crate::domain::types::MAX_CODE_LENGTH;
use crate::error::CodegateError;

/// Charset for the random part of a code (uppercase alphanumeric).
pub const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draws allowed per code before a batch is declared exhausted.
pub const MAX_ATTEMPTS_PER_CODE: u32 = 10_000;

/// Rounds of regenerating codes that collided with stored ones.
pub const MAX_COLLISION_ROUNDS: u32 = 5;

/// A request may claim at most this share of the combinatorial space.
const MAX_SPACE_FILL: f64 = 0.9;

#[derive(Debug, Clone, Default)]
pub struct GeneratorParams {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    /// Total length, prefix and suffix included.
    pub length: Option<usize>,
}

/// Produces `prefix + random + suffix` code strings.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    prefix: String,
    suffix: String,
    random_len: usize,
}

impl CodeGenerator {
    /// Validate the parameters against a request for `count` codes.
    pub fn new(
        params: &GeneratorParams,
        default_length: usize,
        count: u32,
    ) -> Result<Self, CodegateError> {
        let prefix = params.prefix.clone().unwrap_or_default();
        let suffix = params.suffix.clone().unwrap_or_default();
        for affix in [&prefix, &suffix] {
            if !affix.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_') {
                return Err(CodegateError::validation(
                    "prefix and suffix may only contain letters, digits, '-' and '_'",
                ));
            }
        }

        let length = params.length.unwrap_or(default_length);
        if length == 0 || length > MAX_CODE_LENGTH {
            return Err(CodegateError::validation(format!(
                "length must be between 1 and {MAX_CODE_LENGTH}"
            )));
        }
        let random_len = length
            .checked_sub(prefix.len() + suffix.len())
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                CodegateError::validation("length leaves no room for the random part")
            })?;

        let generator = Self {
            prefix,
            suffix,
            random_len,
        };
        if let Some(space) = generator.space() {
            if f64::from(count) > space as f64 * MAX_SPACE_FILL {
                return Err(CodegateError::validation(format!(
                    "cannot generate {count} unique codes with {random_len} random characters"
                )));
            }
        }
        Ok(generator)
    }

    /// Number of distinct codes this generator can produce, `None` if it exceeds `u64`.
    pub fn space(&self) -> Option<u64> {
        (CHARSET.len() as u64).checked_pow(u32::try_from(self.random_len).ok()?)
    }

    pub fn total_len(&self) -> usize {
        self.prefix.len() + self.random_len + self.suffix.len()
    }

    pub fn next_code(&self) -> String {
        let mut rng = rand::rng();
        let random: String = (0..self.random_len)
            .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
            .collect();
        format!("{}{}{}", self.prefix, random, self.suffix)
    }

    /// `count` codes distinct from each other and from everything in `taken`.
    pub fn fresh_batch(
        &self,
        count: usize,
        taken: &HashSet<String>,
    ) -> Result<Vec<String>, CodegateError> {
        let mut seen = HashSet::with_capacity(count);
        let mut batch = Vec::with_capacity(count);
        while batch.len() < count {
            let code = (0..MAX_ATTEMPTS_PER_CODE)
                .map(|_| self.next_code())
                .find(|c| !taken.contains(c) && !seen.contains(c))
                .ok_or(CodegateError::CodeGenerationExhausted)?;
            seen.insert(code.clone());
            batch.push(code);
        }
        Ok(batch)
    }
}
