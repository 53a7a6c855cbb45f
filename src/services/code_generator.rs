use crate::errors::{LinkpulseError, Result};
use crate::utils::{MAX_CODE_LENGTH, generate_random_code};

/// Source of candidate short codes.
///
/// Codes only need to be statistically unique; the registry rejects
/// collisions and the resolution service asks for another code.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> Result<String>;
}

/// Fixed-length codes over `A-Z a-z 0-9 _ -`, drawn from the thread-local CSPRNG
#[derive(Debug, Clone, Copy)]
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    pub const DEFAULT_LENGTH: usize = 8;

    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LENGTH)
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> Result<String> {
        if self.length == 0 || self.length > MAX_CODE_LENGTH {
            return Err(LinkpulseError::generator_unavailable(format!(
                "code length must be within 1..={}, got {}",
                MAX_CODE_LENGTH, self.length
            )));
        }
        Ok(generate_random_code(self.length))
    }
}
