//! Pure helpers shared by the services and the admin CLI.
//!
//! - [`code_generator`] - Shortcode syntax rules and the code allocator
//! - [`url_validator`] - Absolute URL checks

pub mod code_generator;
pub mod url_validator;
