//! Testing utilities for vouchrs-u2f
//!
//! Known-good protocol data and ready-made challenges/responses, shared by the
//! unit tests and the integration tests (which enable the `testing` feature).
//!
//! ## Organization
//!
//! - [`vectors`] - Published FIDO example and a recorded hardware-token session
//! - [`fixtures`] - Challenges and responses built from those vectors
//!
//! ## Usage
//!
//! ```rust
//! use vouchrs_u2f::testing::TestFixtures;
//!
//! let challenge = TestFixtures::token_register_challenge();
//! let response = TestFixtures::token_register_response();
//! assert_eq!(challenge.app_id, "http://localhost:3483");
//! assert!(!response.registration_data.is_empty());
//! ```

pub mod fixtures;
pub mod vectors;

pub use fixtures::TestFixtures;
