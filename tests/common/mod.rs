//! Shared test fixtures
//!
//! Certificates, keys and keystores are generated at test time, never
//! checked in. Loopback servers bind ephemeral ports and answer every
//! client write with `success`.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::ssl::{SslConnector, SslConnectorBuilder, SslMethod, SslVerifyMode};
use openssl::symm::Cipher;
use openssl::x509::extension::{BasicConstraints, SubjectAlternativeName};
use openssl::x509::{X509Name, X509NameBuilder, X509};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_openssl::SslStream;

use tls_hotswap::Connector;

/// A generated certificate and its private key
pub struct TestIdentity {
    pub cert: X509,
    pub key: PKey<Private>,
}

impl TestIdentity {
    pub fn cert_pem(&self) -> String {
        String::from_utf8(self.cert.to_pem().unwrap()).unwrap()
    }

    pub fn key_pem(&self) -> String {
        String::from_utf8(self.key.private_key_to_pem_pkcs8().unwrap()).unwrap()
    }

    /// The private key PEM, encrypted with the given password
    pub fn encrypted_key_pem(&self, password: &str) -> String {
        let pem = self
            .key
            .private_key_to_pem_pkcs8_passphrase(Cipher::aes_256_cbc(), password.as_bytes())
            .unwrap();
        String::from_utf8(pem).unwrap()
    }

    /// A PKCS#12 archive holding the certificate and key
    pub fn pkcs12_der(&self, password: &str) -> Vec<u8> {
        Pkcs12::builder()
            .name("identity")
            .pkey(&self.key)
            .cert(&self.cert)
            .build2(password)
            .unwrap()
            .to_der()
            .unwrap()
    }

    pub fn common_name(&self) -> String {
        subject_cn(&self.cert)
    }
}

/// A generated certificate authority that can issue client and server
/// certificates
pub struct TestCa {
    identity: TestIdentity,
}

impl TestCa {
    pub fn cert(&self) -> &X509 {
        &self.identity.cert
    }

    pub fn cert_pem(&self) -> String {
        self.identity.cert_pem()
    }

    /// A PKCS#12 archive holding only the CA certificate, usable as a
    /// trust store
    pub fn trust_store_der(&self, password: &str) -> Vec<u8> {
        self.identity.pkcs12_der(password)
    }

    /// Issue a certificate for the given common name, signed by this CA
    pub fn issue(&self, cn: &str) -> TestIdentity {
        let key = fresh_key();
        let subject = name_with_cn(cn);

        let mut builder = X509::builder().unwrap();
        builder.set_version(2).unwrap();
        builder.set_serial_number(&random_serial()).unwrap();
        builder.set_subject_name(&subject).unwrap();
        builder
            .set_issuer_name(self.identity.cert.subject_name())
            .unwrap();
        builder.set_pubkey(&key).unwrap();
        builder
            .set_not_before(&Asn1Time::days_from_now(0).unwrap())
            .unwrap();
        builder
            .set_not_after(&Asn1Time::days_from_now(365).unwrap())
            .unwrap();

        let san = san_for(cn, &builder.x509v3_context(Some(&self.identity.cert), None));
        builder.append_extension(san).unwrap();

        builder
            .sign(&self.identity.key, MessageDigest::sha256())
            .unwrap();

        TestIdentity {
            cert: builder.build(),
            key,
        }
    }
}

/// Generate a self-signed server identity for the given common name
///
/// The certificate carries a `localhost` subject alternative name so the
/// loopback clients pass SNI validation.
pub fn self_signed(cn: &str) -> TestIdentity {
    if cn == "localhost" {
        self_signed_with_sans(cn, &["localhost"])
    } else {
        self_signed_with_sans(cn, &[cn, "localhost"])
    }
}

/// Generate a self-signed server identity with explicit subject
/// alternative names
pub fn self_signed_with_sans(cn: &str, sans: &[&str]) -> TestIdentity {
    let key = fresh_key();
    let subject = name_with_cn(cn);

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    builder.set_serial_number(&random_serial()).unwrap();
    builder.set_subject_name(&subject).unwrap();
    builder.set_issuer_name(&subject).unwrap();
    builder.set_pubkey(&key).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(365).unwrap())
        .unwrap();

    let san = san_from_list(sans, &builder.x509v3_context(None, None));
    builder.append_extension(san).unwrap();

    builder.sign(&key, MessageDigest::sha256()).unwrap();

    TestIdentity {
        cert: builder.build(),
        key,
    }
}

/// Generate a certificate authority
pub fn certificate_authority(cn: &str) -> TestCa {
    let key = fresh_key();
    let subject = name_with_cn(cn);

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    builder.set_serial_number(&random_serial()).unwrap();
    builder.set_subject_name(&subject).unwrap();
    builder.set_issuer_name(&subject).unwrap();
    builder.set_pubkey(&key).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(365).unwrap())
        .unwrap();

    let basic = BasicConstraints::new().critical().ca().build().unwrap();
    builder.append_extension(basic).unwrap();

    builder.sign(&key, MessageDigest::sha256()).unwrap();

    TestCa {
        identity: TestIdentity {
            cert: builder.build(),
            key,
        },
    }
}

fn fresh_key() -> PKey<Private> {
    let rsa = Rsa::generate(2048).unwrap();
    PKey::from_rsa(rsa).unwrap()
}

fn name_with_cn(cn: &str) -> X509Name {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", cn).unwrap();
    name.build()
}

fn random_serial() -> openssl::asn1::Asn1Integer {
    let mut serial = BigNum::new().unwrap();
    serial.rand(127, MsbOption::MAYBE_ZERO, false).unwrap();
    serial.to_asn1_integer().unwrap()
}

fn san_for(
    cn: &str,
    context: &openssl::x509::X509v3Context<'_>,
) -> openssl::x509::X509Extension {
    if cn == "localhost" {
        san_from_list(&["localhost"], context)
    } else {
        san_from_list(&[cn, "localhost"], context)
    }
}

fn san_from_list(
    sans: &[&str],
    context: &openssl::x509::X509v3Context<'_>,
) -> openssl::x509::X509Extension {
    let mut san = SubjectAlternativeName::new();
    for name in sans {
        san.dns(name);
    }
    san.build(context).unwrap()
}

/// Extract the subject common name of a certificate
pub fn subject_cn(cert: &X509) -> String {
    cert.subject_name()
        .entries_by_nid(Nid::COMMONNAME)
        .next()
        .unwrap()
        .data()
        .as_utf8()
        .unwrap()
        .to_string()
}

/// Spawn a loopback TLS server on the connector's ephemeral port
///
/// Every client write is answered with `success`; connections stay open
/// until the client hangs up.
pub async fn spawn_tls_server(connector: Connector) -> SocketAddr {
    let listener = connector.bind().await.unwrap();
    let addr = listener.local_addr().unwrap();
    let context = connector
        .context()
        .cloned()
        .expect("secure connector must carry a TLS context");

    tokio::spawn(async move {
        loop {
            let Ok((stream, _peer)) = listener.accept().await else {
                break;
            };
            let context = Arc::clone(&context);
            tokio::spawn(async move {
                let Ok(mut tls) = context.accept(stream).await else {
                    return;
                };
                let mut buf = [0u8; 1024];
                loop {
                    match tls.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {
                            if tls.write_all(b"success").await.is_err() {
                                break;
                            }
                        }
                    }
                }
            });
        }
    });

    addr
}

/// Spawn a loopback plaintext server on the connector's ephemeral port
pub async fn spawn_plain_server(connector: Connector) -> SocketAddr {
    let listener = connector.bind().await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _peer)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                loop {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {
                            if stream.write_all(b"success").await.is_err() {
                                break;
                            }
                        }
                    }
                }
            });
        }
    });

    addr
}

/// Open a TLS connection to the given address
///
/// Server certificates are not verified (the fixtures are self-signed);
/// the closure can restrict protocols and ciphers or attach a client
/// certificate.
pub async fn tls_connect(
    addr: SocketAddr,
    configure: impl FnOnce(&mut SslConnectorBuilder),
) -> Result<SslStream<TcpStream>, String> {
    let mut builder = SslConnector::builder(SslMethod::tls()).map_err(|e| e.to_string())?;
    builder.set_verify(SslVerifyMode::NONE);
    configure(&mut builder);
    let connector = builder.build();

    let mut config = connector.configure().map_err(|e| e.to_string())?;
    config.set_verify_hostname(false);
    let ssl = config.into_ssl("localhost").map_err(|e| e.to_string())?;

    let tcp = TcpStream::connect(addr).await.map_err(|e| e.to_string())?;
    let mut stream = SslStream::new(ssl, tcp).map_err(|e| e.to_string())?;

    Pin::new(&mut stream)
        .connect()
        .await
        .map_err(|e| e.to_string())?;

    Ok(stream)
}

/// Write a request and read the server's answer
pub async fn request(stream: &mut SslStream<TcpStream>) -> Result<String, String> {
    stream.write_all(b"ping").await.map_err(|e| e.to_string())?;

    let mut buf = [0u8; 64];
    match stream.read(&mut buf).await {
        Ok(0) => Err("connection closed".to_string()),
        Ok(n) => Ok(String::from_utf8_lossy(&buf[..n]).to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Connect, send one request, and return the response together with the
/// server certificate's common name
///
/// Any failure along the way — TCP, handshake, or a post-handshake
/// rejection — comes back as `Err`, which is what trust and profile tests
/// assert on.
pub async fn connect_and_request(
    addr: SocketAddr,
    configure: impl FnOnce(&mut SslConnectorBuilder),
) -> Result<(String, String), String> {
    let mut stream = tls_connect(addr, configure).await?;
    let response = request(&mut stream).await?;
    let peer_cn = peer_common_name(&stream)?;
    Ok((response, peer_cn))
}

/// The common name of the certificate the server presented
pub fn peer_common_name(stream: &SslStream<TcpStream>) -> Result<String, String> {
    let cert = stream
        .ssl()
        .peer_certificate()
        .ok_or_else(|| "no peer certificate".to_string())?;
    Ok(subject_cn(&cert))
}
