//! TLS 1.2 client profile for the API server.
//!
//! The API server speaks TLS 1.2 only and ships with a self-signed
//! certificate, so the default profile negotiates exactly TLS 1.2 with a
//! short allow-list of forward-secret AEAD suites and skips certificate
//! verification. Verification against a PEM CA bundle can be switched on
//! through [`TlsSettings`].
//!
//! The handshake is driven to completion inside [`handshake`] so that a
//! TLS failure shows up as a failed open, never as a failed first request.

use std::net::TcpStream;
use std::path::Path;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{ring, verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, ClientConnection, DigitallySignedStruct, RootCertStore, SignatureScheme, StreamOwned};
use tracing::{debug, warn};

use crate::config::TlsSettings;
use crate::error::ClientError;

/// TLS 1.2 suites offered to the server. No export, NULL, RC4, DES/3DES,
/// MD5, PSK, SRP or Camellia suites exist in this list.
pub static ALLOWED_CIPHER_SUITES: &[rustls::SupportedCipherSuite] = &[
    ring::cipher_suite::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
    ring::cipher_suite::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
    ring::cipher_suite::TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256,
    ring::cipher_suite::TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256,
    ring::cipher_suite::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
    ring::cipher_suite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
];

fn provider() -> Arc<CryptoProvider> {
    Arc::new(CryptoProvider {
        cipher_suites: ALLOWED_CIPHER_SUITES.to_vec(),
        ..ring::default_provider()
    })
}

/// Build the client configuration for the given settings.
///
/// # Errors
///
/// Returns [`ClientError::Tls`] if verification is requested without a
/// usable CA file, or if rustls rejects the protocol/suite combination.
pub fn client_config(settings: &TlsSettings) -> Result<Arc<ClientConfig>, ClientError> {
    let provider = provider();
    let builder = ClientConfig::builder_with_provider(provider.clone())
        .with_protocol_versions(&[&rustls::version::TLS12])?;

    let config = if settings.verify_server {
        let ca_file = settings.ca_file.as_deref().ok_or_else(|| {
            ClientError::Tls("server verification enabled but no ca_file configured".into())
        })?;
        builder
            .with_root_certificates(load_roots(ca_file)?)
            .with_no_client_auth()
    } else {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert::new(provider)))
            .with_no_client_auth()
    };

    Ok(Arc::new(config))
}

fn load_roots(path: &Path) -> Result<RootCertStore, ClientError> {
    let mut roots = RootCertStore::empty();
    let certs = CertificateDer::pem_file_iter(path)
        .map_err(|e| ClientError::Tls(format!("cannot read {}: {:?}", path.display(), e)))?;
    for cert in certs {
        let cert =
            cert.map_err(|e| ClientError::Tls(format!("bad PEM in {}: {:?}", path.display(), e)))?;
        roots.add(cert)?;
    }
    if roots.is_empty() {
        return Err(ClientError::Tls(format!(
            "no certificates found in {}",
            path.display()
        )));
    }
    Ok(roots)
}

/// Run the TLS handshake over an already connected TCP stream.
///
/// The stream's read timeout bounds every handshake read.
///
/// # Errors
///
/// Returns [`ClientError::Tls`] for an invalid server name or a failed
/// handshake.
pub fn handshake(
    config: Arc<ClientConfig>,
    host: &str,
    mut tcp: TcpStream,
    verify_server: bool,
) -> Result<StreamOwned<ClientConnection, TcpStream>, ClientError> {
    if !verify_server {
        warn!(host, "Opening TLS channel without server certificate verification");
    }

    let server_name = ServerName::try_from(host.to_owned())
        .map_err(|e| ClientError::Tls(format!("invalid server name {:?}: {}", host, e)))?;
    let mut conn = ClientConnection::new(config, server_name)?;

    while conn.is_handshaking() {
        conn.complete_io(&mut tcp)
            .map_err(|e| ClientError::Tls(format!("handshake with {} failed: {}", host, e)))?;
    }

    debug!(
        host,
        version = ?conn.protocol_version(),
        suite = ?conn.negotiated_cipher_suite().map(|s| s.suite()),
        "TLS handshake complete"
    );
    Ok(StreamOwned::new(conn, tcp))
}

// =============================================================================
// Certificate verifier for self-signed servers
// =============================================================================

/// Accepts any server certificate but still checks handshake signatures.
#[derive(Debug)]
struct AcceptAnyServerCert {
    provider: Arc<CryptoProvider>,
}

impl AcceptAnyServerCert {
    fn new(provider: Arc<CryptoProvider>) -> Self {
        Self { provider }
    }
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustls::{CipherSuite, ProtocolVersion};

    #[test]
    fn test_allow_list_is_tls12_aead_only() {
        for suite in ALLOWED_CIPHER_SUITES {
            assert_eq!(suite.version().version, ProtocolVersion::TLSv1_2);
            let name = format!("{:?}", suite.suite());
            assert!(
                name.contains("GCM") || name.contains("CHACHA20"),
                "unexpected suite {}",
                name
            );
        }
        assert!(ALLOWED_CIPHER_SUITES
            .iter()
            .any(|s| s.suite() == CipherSuite::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384));
    }

    #[test]
    fn test_default_settings_build_unverified_config() {
        let config = client_config(&TlsSettings::default()).expect("config builds");
        assert!(config.alpn_protocols.is_empty());
    }

    #[test]
    fn test_verification_without_ca_file_is_rejected() {
        let settings = TlsSettings {
            verify_server: true,
            ca_file: None,
        };
        let err = client_config(&settings).unwrap_err();
        assert!(matches!(err, ClientError::Tls(_)));
    }

    #[test]
    fn test_verification_with_missing_ca_file_is_rejected() {
        let settings = TlsSettings {
            verify_server: true,
            ca_file: Some("/nonexistent/ca.pem".into()),
        };
        assert!(client_config(&settings).is_err());
    }

    #[test]
    fn test_handshake_against_silent_peer_fails() {
        use std::net::TcpListener;
        use std::time::Duration;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = std::thread::spawn(move || {
            // Accept and hang up without speaking TLS.
            let (peer, _) = listener.accept().unwrap();
            drop(peer);
        });

        let tcp = TcpStream::connect(addr).unwrap();
        tcp.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let config = client_config(&TlsSettings::default()).unwrap();
        let result = handshake(config, "127.0.0.1", tcp, false);
        assert!(matches!(result, Err(ClientError::Tls(_))));
        server.join().unwrap();
    }
}
