#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::module_name_repetitions)]

//! Server-side FIDO U2F: challenge issuing, registration verification and
//! authentication verification, plus a software token for conformance tests.
//!
//! ```no_run
//! use vouchrs_u2f::{Challenge, RegistrationConfig};
//! # fn run(response: vouchrs_u2f::RegisterResponse) -> vouchrs_u2f::Result<()> {
//! let facets = vec!["https://example.com".to_string()];
//! let challenge = Challenge::new("https://example.com", &facets, vec![])?;
//! let request = challenge.registration_request();
//! // ... send `request` to the browser, store `challenge` in the session ...
//! let enrollment = challenge.register(&response, &RegistrationConfig::skip_attestation())?;
//! let record = enrollment.to_record();
//! # Ok(())
//! # }
//! ```

/// Version of the vouchrs-u2f library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod attestation;
pub mod auth;
pub mod challenge;
pub mod codec;
pub mod error;
pub mod messages;
pub mod register;
pub mod registration;
pub mod settings;
pub mod utils;
pub mod virtual_key;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use attestation::AttestationTrust;
pub use auth::{Authentication, AuthenticationConfig, CounterPolicy};
pub use challenge::Challenge;
pub use error::{AuthenticatorError, Result, U2fError};
pub use messages::{
    RegisterRequest, RegisterRequestMessage, RegisterResponse, SignRequest, SignRequestMessage,
    SignResponse, TrustedFacets, TrustedFacetsEndpoint,
};
pub use register::{verify_registration_signature, RegistrationConfig};
pub use registration::{Enrollment, Registration, RegistrationRecord};
pub use settings::U2fSettings;
pub use virtual_key::VirtualKey;
