#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{ensure, Context};
use log::info;
use vouchrs_u2f::{utils::logging::init_logging, U2fSettings, VirtualKey};

/// Number of authentications run after registering
const AUTHENTICATION_ROUNDS: usize = 2;

fn main() -> anyhow::Result<()> {
    // Load configuration from U2f.toml and environment variables
    let settings = U2fSettings::load()
        .map_err(|e| anyhow::anyhow!("Failed to load settings: {e}"))?;
    init_logging(&settings.logging.level).context("Failed to initialize logging")?;

    print_startup_info(&settings);

    let mut key = VirtualKey::new().context("Failed to create virtual key")?;

    // The virtual key's certificate is self-signed; trust it alongside the
    // configured roots unless attestation is skipped altogether
    let mut registration_config = settings
        .registration_config()
        .map_err(|e| anyhow::anyhow!("Failed to load attestation roots: {e}"))?;
    if !registration_config.skip_attestation_check {
        registration_config
            .trust
            .add_root_der(key.attestation_certificate())?;
    }

    // Registration
    let challenge = settings.new_challenge(vec![])?;
    let response = key.handle_register_request(&challenge.registration_request())?;
    let mut registration = challenge
        .register(&response, &registration_config)
        .context("Registration failed")?
        .into_registration();
    info!(
        "Registered key handle of {} bytes",
        registration.key_handle.len()
    );
    println!("✓ Registration verified for {}", settings.app_id);

    // Authentication rounds, persisting the counter between them
    let auth_config = settings.authentication_config();
    let mut previous = registration.counter;
    for round in 1..=AUTHENTICATION_ROUNDS {
        let challenge = settings.new_challenge(vec![registration.clone()])?;
        let response = key.handle_authentication_request(&challenge.authentication_request())?;
        let authentication = challenge
            .authenticate_with(&response, registration.counter, &auth_config)
            .with_context(|| format!("Authentication {round} failed"))?;

        ensure!(
            authentication.counter > previous,
            "Counter did not increase: {} after {previous}",
            authentication.counter
        );
        previous = authentication.counter;
        registration = authentication.registration;
        println!("✓ Authentication {round} verified, counter {previous}");
    }

    let record = serde_json::to_string_pretty(&registration.to_record())?;
    println!("Stored registration record:\n{record}");
    Ok(())
}

/// Print startup information
fn print_startup_info(settings: &U2fSettings) {
    println!("🔑 Starting u2f-conformance v{}", vouchrs_u2f::VERSION);
    println!("   App id: {}", settings.app_id);
    println!("   Trusted facets: {}", settings.trusted_facets().join(", "));
    println!("   Counter policy: {}", settings.counter_policy);
    if settings.skip_attestation_check {
        println!("   Attestation check: skipped");
    }
}
