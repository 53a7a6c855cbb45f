//! Service layer
//!
//! - `code_generator`: candidate short codes
//! - `resolution_service`: create-or-fetch, redirect-and-count, history
//! - `qr`: QR images for creation responses

mod code_generator;
pub mod qr;
mod resolution_service;

pub use code_generator::{CodeGenerator, RandomCodeGenerator};
pub use qr::{QrRenderer, SvgQrRenderer, to_data_url};
pub use resolution_service::{
    CreateOutcome, RedirectOutcome, ResolutionService, ResolutionSettings,
};
