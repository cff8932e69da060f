// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Generation of the credentials a managed cluster's add-ons need

use crate::constants::{data_keys, secrets};
use crate::error::{Result, TrellisError};
use crate::secrets::bundle::{SecretBundle, SecretData};
use crate::types::ManagedClusterSpec;
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::RngCore;
use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, DnValue, ExtendedKeyUsagePurpose,
    IsCa, Issuer, KeyPair, KeyUsagePurpose,
};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, instrument};

/// How a secret is obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretKind {
    /// Owned by someone else; must already be present in the bundle
    External,
    /// Self-signed certificate authority
    CertificateAuthority { common_name: String },
    /// Leaf certificate for client and server usage, signed by a CA in the bundle
    Certificate {
        common_name: String,
        organization: Option<String>,
        dns_names: Vec<String>,
        signed_by: String,
    },
    /// Client certificate wrapped into a kubeconfig for the managed cluster
    Kubeconfig {
        common_name: String,
        organization: Option<String>,
        signed_by: String,
        cluster_name: String,
        server: String,
    },
    /// OpenVPN static pre-shared key
    StaticKey { data_key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretDefinition {
    pub name: String,
    pub kind: SecretKind,
}

impl SecretDefinition {
    pub fn new(name: impl Into<String>, kind: SecretKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// The secrets the core add-ons of a cluster depend on.
///
/// Authorities come before the secrets they sign.
pub fn definitions(cluster_name: &str, spec: &ManagedClusterSpec) -> Vec<SecretDefinition> {
    vec![
        SecretDefinition::new(secrets::CA, SecretKind::External),
        SecretDefinition::new(
            secrets::KUBE_PROXY,
            SecretKind::Kubeconfig {
                common_name: "system:kube-proxy".to_string(),
                organization: None,
                signed_by: secrets::CA.to_string(),
                cluster_name: cluster_name.to_string(),
                server: spec.api_server.clone(),
            },
        ),
        SecretDefinition::new(
            secrets::VPN_SHOOT,
            SecretKind::Certificate {
                common_name: "vpn-shoot".to_string(),
                organization: None,
                dns_names: vec![],
                signed_by: secrets::CA.to_string(),
            },
        ),
        SecretDefinition::new(
            secrets::VPN_SEED_TLSAUTH,
            SecretKind::StaticKey {
                data_key: data_keys::VPN_TLSAUTH.to_string(),
            },
        ),
        SecretDefinition::new(
            secrets::CA_METRICS_SERVER,
            SecretKind::CertificateAuthority {
                common_name: "metrics-server".to_string(),
            },
        ),
        SecretDefinition::new(
            secrets::METRICS_SERVER,
            SecretKind::Certificate {
                common_name: "metrics-server".to_string(),
                organization: None,
                dns_names: vec![
                    "metrics-server".to_string(),
                    "metrics-server.kube-system".to_string(),
                    "metrics-server.kube-system.svc".to_string(),
                ],
                signed_by: secrets::CA_METRICS_SERVER.to_string(),
            },
        ),
    ]
}

/// Ensure every defined secret is present.
///
/// Secrets already in `existing` are reused untouched. Returns the complete
/// bundle and the names of the secrets that were generated.
#[instrument(skip_all, fields(existing = existing.len()))]
pub fn ensure_secrets(
    definitions: &[SecretDefinition],
    existing: &SecretBundle,
) -> Result<(SecretBundle, Vec<String>)> {
    let mut bundle = existing.clone();
    let mut generated = Vec::new();

    for definition in definitions {
        if bundle.contains(&definition.name) {
            debug!("Reusing existing secret '{}'", definition.name);
            continue;
        }

        let data = generate(definition, &bundle)?;
        info!("Generated secret '{}'", definition.name);
        bundle.insert(definition.name.clone(), data);
        generated.push(definition.name.clone());
    }

    Ok((bundle, generated))
}

fn generate(definition: &SecretDefinition, bundle: &SecretBundle) -> Result<SecretData> {
    let name = &definition.name;
    match &definition.kind {
        SecretKind::External => Err(TrellisError::MissingSecretError(format!(
            "secret '{}' must be provided but is absent",
            name
        ))),
        SecretKind::CertificateAuthority { common_name } => {
            let (cert, key) = generate_ca(name, common_name)?;
            Ok(SecretData::from([
                (data_keys::CA_CERT.to_string(), cert.into_bytes()),
                (data_keys::CA_KEY.to_string(), key.into_bytes()),
            ]))
        }
        SecretKind::Certificate {
            common_name,
            organization,
            dns_names,
            signed_by,
        } => {
            let ca = SigningAuthority::from_bundle(bundle, signed_by)?;
            let (cert, key) = ca.sign(name, common_name, organization.as_deref(), dns_names)?;
            Ok(SecretData::from([
                (data_keys::CA_CERT.to_string(), ca.cert_pem.into_bytes()),
                (data_keys::TLS_CERT.to_string(), cert.into_bytes()),
                (data_keys::TLS_KEY.to_string(), key.into_bytes()),
            ]))
        }
        SecretKind::Kubeconfig {
            common_name,
            organization,
            signed_by,
            cluster_name,
            server,
        } => {
            let ca = SigningAuthority::from_bundle(bundle, signed_by)?;
            let (cert, key) = ca.sign(name, common_name, organization.as_deref(), &[])?;
            let kubeconfig =
                render_kubeconfig(cluster_name, server, common_name, &ca.cert_pem, &cert, &key)
                    .map_err(|e| {
                        TrellisError::SecretGenerationError(format!(
                            "failed to serialize kubeconfig for '{}': {}",
                            name, e
                        ))
                    })?;
            Ok(SecretData::from([(
                data_keys::KUBECONFIG.to_string(),
                kubeconfig.into_bytes(),
            )]))
        }
        SecretKind::StaticKey { data_key } => Ok(SecretData::from([(
            data_key.clone(),
            generate_static_key().into_bytes(),
        )])),
    }
}

fn distinguished_name(common_name: &str, organization: Option<&str>) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(
        DnType::CommonName,
        DnValue::Utf8String(common_name.to_string()),
    );
    if let Some(organization) = organization {
        dn.push(
            DnType::OrganizationName,
            DnValue::Utf8String(organization.to_string()),
        );
    }
    dn
}

const CA_VALIDITY_DAYS: i64 = 10 * 365;
const CERT_VALIDITY_DAYS: i64 = 5 * 365;

/// Validity window starting now
fn validity(days: i64) -> (OffsetDateTime, OffsetDateTime) {
    let now = OffsetDateTime::now_utc();
    (now, now + Duration::days(days))
}

fn generation_error(name: &str, what: &str, e: impl std::fmt::Display) -> TrellisError {
    TrellisError::SecretGenerationError(format!("{} for '{}': {}", what, name, e))
}

/// Create a self-signed CA, returning (certificate PEM, key PEM)
fn generate_ca(name: &str, common_name: &str) -> Result<(String, String)> {
    let mut params = CertificateParams::default();
    params.distinguished_name = distinguished_name(common_name, None);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![
        KeyUsagePurpose::KeyCertSign,
        KeyUsagePurpose::CrlSign,
        KeyUsagePurpose::DigitalSignature,
    ];
    (params.not_before, params.not_after) = validity(CA_VALIDITY_DAYS);

    let key_pair =
        KeyPair::generate().map_err(|e| generation_error(name, "failed to generate CA key", e))?;
    let cert = params
        .self_signed(&key_pair)
        .map_err(|e| generation_error(name, "failed to create CA certificate", e))?;

    Ok((cert.pem(), key_pair.serialize_pem()))
}

/// A CA loaded from the bundle
struct SigningAuthority {
    cert_pem: String,
    issuer: Issuer<'static, KeyPair>,
}

impl SigningAuthority {
    fn from_bundle(bundle: &SecretBundle, ca_name: &str) -> Result<Self> {
        let cert_pem = bundle.require_text(ca_name, data_keys::CA_CERT)?;
        let key_pem = bundle.require_text(ca_name, data_keys::CA_KEY)?;

        let key = KeyPair::from_pem(&key_pem)
            .map_err(|e| generation_error(ca_name, "failed to load CA key", e))?;
        let issuer = Issuer::from_ca_cert_pem(&cert_pem, key)
            .map_err(|e| generation_error(ca_name, "failed to load CA certificate", e))?;

        Ok(Self { cert_pem, issuer })
    }

    /// Sign a new leaf certificate, returning (certificate PEM, key PEM)
    fn sign(
        &self,
        name: &str,
        common_name: &str,
        organization: Option<&str>,
        dns_names: &[String],
    ) -> Result<(String, String)> {
        let mut params = CertificateParams::new(dns_names.to_vec())
            .map_err(|e| generation_error(name, "invalid subject alternative names", e))?;
        params.distinguished_name = distinguished_name(common_name, organization);
        params.is_ca = IsCa::NoCa;
        params.key_usages = vec![
            KeyUsagePurpose::DigitalSignature,
            KeyUsagePurpose::KeyEncipherment,
        ];
        params.extended_key_usages = vec![
            ExtendedKeyUsagePurpose::ClientAuth,
            ExtendedKeyUsagePurpose::ServerAuth,
        ];
        (params.not_before, params.not_after) = validity(CERT_VALIDITY_DAYS);

        let key_pair =
            KeyPair::generate().map_err(|e| generation_error(name, "failed to generate key", e))?;
        let cert = params
            .signed_by(&key_pair, &self.issuer)
            .map_err(|e| generation_error(name, "failed to sign certificate", e))?;

        Ok((cert.pem(), key_pair.serialize_pem()))
    }
}

fn render_kubeconfig(
    cluster_name: &str,
    server: &str,
    user: &str,
    ca_pem: &str,
    cert_pem: &str,
    key_pem: &str,
) -> std::result::Result<String, serde_yaml::Error> {
    let kubeconfig = serde_json::json!({
        "apiVersion": "v1",
        "kind": "Config",
        "current-context": cluster_name,
        "clusters": [{
            "name": cluster_name,
            "cluster": {
                "certificate-authority-data": STANDARD.encode(ca_pem),
                "server": server,
            }
        }],
        "users": [{
            "name": user,
            "user": {
                "client-certificate-data": STANDARD.encode(cert_pem),
                "client-key-data": STANDARD.encode(key_pem),
            }
        }],
        "contexts": [{
            "name": cluster_name,
            "context": {
                "cluster": cluster_name,
                "user": user,
            }
        }],
    });
    serde_yaml::to_string(&kubeconfig)
}

/// 2048 bit OpenVPN static key in its text format
fn generate_static_key() -> String {
    let mut raw = [0u8; 256];
    rand::thread_rng().fill_bytes(&mut raw);

    let mut key = String::from("#\n# 2048 bit OpenVPN static key\n#\n");
    key.push_str("-----BEGIN OpenVPN Static key V1-----\n");
    for line in raw.chunks(16) {
        key.push_str(&hex::encode(line));
        key.push('\n');
    }
    key.push_str("-----END OpenVPN Static key V1-----\n");
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_spec() -> ManagedClusterSpec {
        serde_json::from_value(serde_json::json!({
            "infrastructure": {"provider": "alicloud"},
            "kubernetes": {"version": "1.11.0"},
            "networks": {
                "pods": "100.96.0.0/11",
                "services": "100.64.0.0/13",
                "nodes": "10.250.0.0/16"
            },
            "apiServer": "https://api.test.example.com"
        }))
        .unwrap()
    }

    fn bundle_with_ca() -> SecretBundle {
        let definition = SecretDefinition::new(
            secrets::CA,
            SecretKind::CertificateAuthority {
                common_name: "kubernetes".to_string(),
            },
        );
        let (bundle, _) = ensure_secrets(&[definition], &SecretBundle::new()).unwrap();
        bundle
    }

    #[test]
    fn test_definitions_order_authorities_first() {
        let defs = definitions("test", &make_spec());
        let position = |name: &str| defs.iter().position(|d| d.name == name).unwrap();

        assert!(position(secrets::CA) < position(secrets::KUBE_PROXY));
        assert!(position(secrets::CA) < position(secrets::VPN_SHOOT));
        assert!(position(secrets::CA_METRICS_SERVER) < position(secrets::METRICS_SERVER));
    }

    #[test]
    fn test_ensure_generates_everything_but_the_cluster_ca() {
        let existing = bundle_with_ca();
        let (bundle, generated) =
            ensure_secrets(&definitions("test", &make_spec()), &existing).unwrap();

        assert_eq!(
            generated,
            vec![
                secrets::KUBE_PROXY,
                secrets::VPN_SHOOT,
                secrets::VPN_SEED_TLSAUTH,
                secrets::CA_METRICS_SERVER,
                secrets::METRICS_SERVER,
            ]
        );
        assert_eq!(bundle.get(secrets::CA), existing.get(secrets::CA));

        let kubeconfig = bundle
            .require_text(secrets::KUBE_PROXY, data_keys::KUBECONFIG)
            .unwrap();
        assert!(kubeconfig.contains("https://api.test.example.com"));
        assert!(kubeconfig.contains("system:kube-proxy"));

        let tls_auth = bundle
            .require_text(secrets::VPN_SEED_TLSAUTH, data_keys::VPN_TLSAUTH)
            .unwrap();
        assert!(tls_auth.contains("-----BEGIN OpenVPN Static key V1-----"));
        assert_eq!(tls_auth.lines().filter(|l| l.len() == 32).count(), 16);

        let metrics_ca = bundle
            .require_text(secrets::METRICS_SERVER, data_keys::CA_CERT)
            .unwrap();
        assert_eq!(
            metrics_ca,
            bundle
                .require_text(secrets::CA_METRICS_SERVER, data_keys::CA_CERT)
                .unwrap()
        );
    }

    #[test]
    fn test_ensure_is_idempotent_once_complete() {
        let (bundle, _) =
            ensure_secrets(&definitions("test", &make_spec()), &bundle_with_ca()).unwrap();
        let (again, generated) =
            ensure_secrets(&definitions("test", &make_spec()), &bundle).unwrap();

        assert!(generated.is_empty());
        assert_eq!(again, bundle);
    }

    #[test]
    fn test_missing_external_secret() {
        let err = ensure_secrets(&definitions("test", &make_spec()), &SecretBundle::new())
            .unwrap_err();
        assert!(matches!(err, TrellisError::MissingSecretError(_)));
    }

    #[test]
    fn test_certificate_signed_by_absent_ca() {
        let definition = SecretDefinition::new(
            "orphan",
            SecretKind::Certificate {
                common_name: "orphan".to_string(),
                organization: None,
                dns_names: vec![],
                signed_by: "no-such-ca".to_string(),
            },
        );

        let err = ensure_secrets(&[definition], &SecretBundle::new()).unwrap_err();
        assert!(matches!(err, TrellisError::MissingSecretError(_)));
    }

    #[test]
    fn test_corrupt_ca_key_fails_generation() {
        let mut existing = SecretBundle::new();
        existing.insert(
            secrets::CA,
            SecretData::from([
                (data_keys::CA_CERT.to_string(), b"not a cert".to_vec()),
                (data_keys::CA_KEY.to_string(), b"not a key".to_vec()),
            ]),
        );
        let definition = SecretDefinition::new(
            secrets::VPN_SHOOT,
            SecretKind::Certificate {
                common_name: "vpn-shoot".to_string(),
                organization: None,
                dns_names: vec![],
                signed_by: secrets::CA.to_string(),
            },
        );

        let err = ensure_secrets(&[definition], &existing).unwrap_err();
        assert!(matches!(err, TrellisError::SecretGenerationError(_)));
    }

    fn validity_of(pem: &str) -> (i64, i64) {
        let (_, pem) = x509_parser::pem::parse_x509_pem(pem.as_bytes()).unwrap();
        let cert = pem.parse_x509().unwrap();
        (
            cert.validity().not_before.timestamp(),
            cert.validity().not_after.timestamp(),
        )
    }

    #[test]
    fn test_new_certificates_are_valid_from_now() {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let (bundle, _) =
            ensure_secrets(&definitions("test", &make_spec()), &bundle_with_ca()).unwrap();

        let (ca_from, ca_until) =
            validity_of(&bundle.require_text(secrets::CA, data_keys::CA_CERT).unwrap());
        assert!(ca_from <= now + 1);
        assert!(ca_until > now + 9 * 365 * 24 * 3600);

        let (from, until) = validity_of(
            &bundle
                .require_text(secrets::VPN_SHOOT, data_keys::TLS_CERT)
                .unwrap(),
        );
        assert!(from <= now + 1);
        assert!(from >= now - 60);
        assert!(until > now + 4 * 365 * 24 * 3600);
    }
}
