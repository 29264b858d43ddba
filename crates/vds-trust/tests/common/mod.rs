//! Shared fixtures: a small PKI, governance artifacts and a signed region,
//! all derived from fixed seeds.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use vds_core::{AuthorityId, CountryCode, ManifestId, Timestamp};
use vds_crypto::{Ed25519KeyPair, Ed25519Signature, SignedRegion};
use vds_payload::{FieldType, FieldValue, PayloadField, PayloadMap};
use vds_trust::{
    CertificateBody, DirectResolver, ExtendedKeyUsage, GovernanceLocators, IssuerManifest,
    KeyUsage, ListOfTrustedLists, ManifestField, MemoryFetcher, ResolveStatus, ResourceRequest,
    ResourceResolver, SealCertificate, SealEvidence, SignedEnvelope, TrustStatusList,
    TrustedListPointer, Verifier, VerifierConfig,
};

pub const CERT_URI: &str = "https://pki.example.fr/certs/signer.json";
pub const ROOT_URI: &str = "https://pki.example.fr/certs/root.json";
pub const LOTL_URI: &str = "https://trust.example.eu/lotl.json";
pub const TSL_URI: &str = "https://trust.example.fr/tsl-fr.json";
pub const MANIFEST_URI: &str = "https://manifests.example.fr/0A0B0C.json";

pub fn ts(s: &str) -> Timestamp {
    Timestamp::parse(s).unwrap()
}

pub fn ca_body(cn: &str, issuer_cn: &str, key: &Ed25519KeyPair, issuer_uri: Option<&str>) -> CertificateBody {
    CertificateBody {
        serial: format!("{cn}-0001"),
        issuer_common_name: issuer_cn.into(),
        subject_common_name: cn.into(),
        subject_organization: "Agence Nationale des Titres Securises".into(),
        subject_organizational_unit: "PKI".into(),
        subject_country: CountryCode::new("FR").unwrap(),
        not_before: ts("2024-01-01T00:00:00Z"),
        not_after: ts("2034-01-01T00:00:00Z"),
        public_key: key.public_key(),
        key_usage: vec![KeyUsage::KeyCertSign, KeyUsage::CrlSign],
        extended_key_usage: vec![],
        is_ca: true,
        issuer_uri: issuer_uri.map(str::to_owned),
    }
}

pub fn leaf_body(cn: &str, issuer_cn: &str, key: &Ed25519KeyPair, issuer_uri: &str) -> CertificateBody {
    CertificateBody {
        serial: format!("{cn}-0042"),
        issuer_common_name: issuer_cn.into(),
        subject_common_name: cn.into(),
        subject_organization: "Agence Nationale des Titres Securises".into(),
        subject_organizational_unit: "Seal Signing".into(),
        subject_country: CountryCode::new("FR").unwrap(),
        not_before: ts("2025-01-01T00:00:00Z"),
        not_after: ts("2028-01-01T00:00:00Z"),
        public_key: key.public_key(),
        key_usage: vec![KeyUsage::DigitalSignature],
        extended_key_usage: vec![ExtendedKeyUsage::SealSigning],
        is_ca: false,
        issuer_uri: Some(issuer_uri.into()),
    }
}

/// Everything needed to verify one seal, all valid by default.
pub struct World {
    pub now: Timestamp,
    pub root_key: Ed25519KeyPair,
    pub signer_key: Ed25519KeyPair,
    pub governance_key: Ed25519KeyPair,
    pub root_cert: Vec<u8>,
    pub signer_cert: Vec<u8>,
    pub locators: GovernanceLocators,
    pub authority: AuthorityId,
    pub country: CountryCode,
    pub manifest_id: ManifestId,
    pub payload: PayloadMap,
    pub region: Vec<u8>,
    pub signature: Ed25519Signature,
    pub embedded: Option<Vec<u8>>,
    pub mirror: MemoryFetcher,
}

impl World {
    pub fn new() -> Self {
        let root_key = Ed25519KeyPair::from_seed(&[0x11; 32]);
        let signer_key = Ed25519KeyPair::from_seed(&[0x22; 32]);
        let governance_key = Ed25519KeyPair::from_seed(&[0x33; 32]);

        let root_cert = SealCertificate::issue(ca_body("FR Root CA", "FR Root CA", &root_key, None), &root_key)
            .unwrap();
        let signer_cert = SealCertificate::issue(
            leaf_body("FR01 Seal Signer", "FR Root CA", &signer_key, ROOT_URI),
            &root_key,
        )
        .unwrap();

        let mut payload = PayloadMap::new();
        payload
            .insert(PayloadField::new("last_name", FieldValue::String("DUPONT".into())).unwrap())
            .unwrap();
        payload.insert(PayloadField::new("document_number", FieldValue::Integer(421)).unwrap()).unwrap();

        let region = b"\xDC\x02\x0A\x0B\x0C\x01 header and payload".to_vec();
        let signature = signer_key.sign(&SignedRegion::new(&region));

        let mut world = Self {
            now: ts("2026-10-19T12:00:00Z"),
            root_key,
            signer_key,
            governance_key,
            root_cert,
            signer_cert,
            locators: GovernanceLocators {
                certificate_uri: CERT_URI.into(),
                lotl_uri: LOTL_URI.into(),
                tsl_uri: TSL_URI.into(),
                manifest_uri: MANIFEST_URI.into(),
            },
            authority: AuthorityId::new("FR01").unwrap(),
            country: CountryCode::new("FR").unwrap(),
            manifest_id: ManifestId::new(0x0A0B0C).unwrap(),
            payload,
            region,
            signature,
            embedded: None,
            mirror: MemoryFetcher::new(),
        };
        world.publish_all();
        world
    }

    /// (Re)publish every certificate and artifact to the mirror.
    pub fn publish_all(&mut self) {
        self.mirror.insert(CERT_URI, self.signer_cert.clone());
        self.mirror.insert(ROOT_URI, self.root_cert.clone());
        let lotl = self.lotl("2026-01-01T00:00:00Z", "2027-01-01T00:00:00Z");
        self.mirror.insert(LOTL_URI, lotl);
        let tsl = self.tsl(vec![vds_crypto::sha256_fingerprint(&self.root_cert)]);
        self.mirror.insert(TSL_URI, tsl);
        let manifest = self.manifest(FieldType::String);
        self.mirror.insert(MANIFEST_URI, manifest);
    }

    pub fn lotl(&self, issued: &str, next_update: &str) -> Vec<u8> {
        let body = ListOfTrustedLists {
            sequence: 12,
            issued: ts(issued),
            next_update: ts(next_update),
            lists: vec![TrustedListPointer {
                country: self.country.clone(),
                tsl_uri: TSL_URI.into(),
            }],
        };
        SignedEnvelope::sign(body, &self.governance_key).unwrap().to_bytes().unwrap()
    }

    pub fn tsl(&self, trust_anchors: Vec<vds_core::ContentDigest>) -> Vec<u8> {
        let body = TrustStatusList {
            sequence: 3,
            issued: ts("2026-06-01T00:00:00Z"),
            next_update: ts("2026-12-01T00:00:00Z"),
            country: self.country.clone(),
            authority_id: self.authority.clone(),
            trust_anchors,
        };
        SignedEnvelope::sign(body, &self.governance_key).unwrap().to_bytes().unwrap()
    }

    pub fn manifest(&self, last_name_type: FieldType) -> Vec<u8> {
        let body = IssuerManifest {
            manifest_id: self.manifest_id,
            issued: ts("2026-01-01T00:00:00Z"),
            next_update: ts("2027-01-01T00:00:00Z"),
            fields: vec![
                ManifestField { name: "last_name".into(), field_type: last_name_type },
                ManifestField { name: "document_number".into(), field_type: FieldType::Integer },
                ManifestField { name: "portrait".into(), field_type: FieldType::Binary },
            ],
        };
        SignedEnvelope::sign(body, &self.governance_key).unwrap().to_bytes().unwrap()
    }

    pub fn evidence(&self) -> SealEvidence<'_> {
        SealEvidence {
            signed_region: SignedRegion::new(&self.region),
            signature: &self.signature,
            embedded_certificate: self.embedded.as_deref(),
            locators: &self.locators,
            authority: &self.authority,
            issuing_country: &self.country,
            manifest_id: self.manifest_id,
            payload: &self.payload,
        }
    }

    pub fn config(&self) -> VerifierConfig {
        VerifierConfig::with_signers(vec![self.governance_key.public_key()]).at(self.now)
    }

    pub fn verifier(&self) -> Verifier {
        Verifier::new(self.config(), DirectResolver::new(self.mirror.clone()))
    }

    /// A verifier whose resolver logs every requested URI.
    pub fn recording_verifier(&self) -> (Verifier, Arc<Mutex<Vec<String>>>) {
        recording(self.config(), DirectResolver::new(self.mirror.clone()))
    }
}

/// Wrap `inner`, logging every URI it is asked for.
pub fn recording(
    config: VerifierConfig,
    inner: impl ResourceResolver + 'static,
) -> (Verifier, Arc<Mutex<Vec<String>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&calls);
    let resolver = move |req: &mut ResourceRequest| -> ResolveStatus {
        log.lock().unwrap().push(req.uri.clone());
        inner.resolve(req)
    };
    (Verifier::new(config, resolver), calls)
}
