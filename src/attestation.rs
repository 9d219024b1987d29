//! Attestation trust roots
//!
//! A registration's attestation certificate is accepted only if it chains to
//! one of the configured roots. There is no universal root list for U2F
//! tokens, so the set starts empty and callers add the vendor roots they accept.

use openssl::stack::Stack;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::{X509StoreContext, X509};

use crate::error::{Result, U2fError};

/// Set of trusted attestation root certificates
#[derive(Clone, Debug, Default)]
pub struct AttestationTrust {
    roots: Vec<X509>,
}

impl AttestationTrust {
    /// Empty trust set; every certificate is untrusted
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every certificate in a PEM bundle as a root
    ///
    /// # Errors
    ///
    /// Returns `MalformedCertificate` if the bundle cannot be parsed or holds
    /// no certificate.
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let roots = X509::stack_from_pem(pem)
            .map_err(|_| U2fError::MalformedCertificate("invalid PEM bundle".to_string()))?;
        if roots.is_empty() {
            return Err(U2fError::MalformedCertificate(
                "no certificate in PEM bundle".to_string(),
            ));
        }
        Ok(Self { roots })
    }

    /// Add one DER-encoded root
    ///
    /// # Errors
    ///
    /// Returns `MalformedCertificate` if `der` is not an X.509 certificate.
    pub fn add_root_der(&mut self, der: &[u8]) -> Result<()> {
        let root = X509::from_der(der)
            .map_err(|_| U2fError::MalformedCertificate("invalid X.509 structure".to_string()))?;
        self.roots.push(root);
        Ok(())
    }

    /// Add all roots of a PEM bundle
    ///
    /// # Errors
    ///
    /// Returns `MalformedCertificate` if the bundle cannot be parsed.
    pub fn add_roots_pem(&mut self, pem: &[u8]) -> Result<()> {
        let more = Self::from_pem(pem)?;
        self.roots.extend(more.roots);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Check that a DER attestation certificate chains to a trusted root
    ///
    /// # Errors
    ///
    /// - `MalformedCertificate` if `cert_der` does not parse
    /// - `UntrustedAttestation` if no chain to a configured root exists
    /// - `Crypto` if the certificate store cannot be built
    pub fn verify(&self, cert_der: &[u8]) -> Result<()> {
        let cert = X509::from_der(cert_der)
            .map_err(|_| U2fError::MalformedCertificate("invalid X.509 structure".to_string()))?;

        if self.roots.is_empty() {
            log::debug!("No attestation roots configured");
            return Err(U2fError::UntrustedAttestation);
        }

        let mut builder = X509StoreBuilder::new()?;
        for root in &self.roots {
            builder.add_cert(root.clone())?;
        }
        let store = builder.build();

        let chain = Stack::new()?;
        let mut context = X509StoreContext::new()?;
        let trusted = context.init(&store, &cert, &chain, |ctx| {
            let ok = ctx.verify_cert()?;
            if !ok {
                log::debug!("Attestation chain rejected: {}", ctx.error());
            }
            Ok(ok)
        })?;

        if trusted {
            Ok(())
        } else {
            Err(U2fError::UntrustedAttestation)
        }
    }
}
