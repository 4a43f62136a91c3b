//! Application error type.
//!
//! Every failure carries the process exit code it maps to:
//!
//! - `2` input/output (CSV ingest, exports, SVG output)
//! - `3` invalid sample set
//! - `4` fitting (solver non-convergence, non-finite results)
//! - `5` terminal / chart rendering

pub const EXIT_IO: u8 = 2;
pub const EXIT_SAMPLES: u8 = 3;
pub const EXIT_FIT: u8 = 4;
pub const EXIT_RENDER: u8 = 5;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(EXIT_IO, message)
    }

    pub fn samples(message: impl Into<String>) -> Self {
        Self::new(EXIT_SAMPLES, message)
    }

    pub fn fit(message: impl Into<String>) -> Self {
        Self::new(EXIT_FIT, message)
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::new(EXIT_RENDER, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
