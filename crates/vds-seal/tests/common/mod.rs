//! A published PKI and a seal signed under it.

#![allow(dead_code)]

use chrono::NaiveDate;
use vds_core::{AuthorityId, CountryCode, LanguageTag, ManifestId, SealFormat, Timestamp};
use vds_crypto::{sha256_fingerprint, Ed25519KeyPair, SignedRegion};
use vds_payload::{
    BiometricDataType, BiometricFormat, FieldExtension, FieldType, FieldValue, PayloadField,
    PayloadMap,
};
use vds_seal::{assemble, encode_unsigned, SealHeader};
use vds_trust::{
    CertificateBody, DirectResolver, ExtendedKeyUsage, GovernanceLocators, IssuerManifest,
    KeyUsage, ListOfTrustedLists, ManifestField, MemoryFetcher, SealCertificate, SignedEnvelope,
    TrustStatusList, TrustedListPointer, Verifier, VerifierConfig,
};

pub const CERT_URI: &str = "https://pki.example.fr/certs/signer.json";
pub const ROOT_URI: &str = "https://pki.example.fr/certs/root.json";
pub const LOTL_URI: &str = "https://trust.example.eu/lotl.json";
pub const TSL_URI: &str = "https://trust.example.fr/tsl-fr.json";
pub const MANIFEST_URI: &str = "https://manifests.example.fr/0A0B0C.json";

pub fn ts(s: &str) -> Timestamp {
    Timestamp::parse(s).unwrap()
}

pub fn header() -> SealHeader {
    SealHeader {
        format: SealFormat::VdsAfnorXpZ42_105,
        manifest_id: ManifestId::new(0x0A0B0C).unwrap(),
        manifest_version: 1,
        authority: AuthorityId::new("FR01").unwrap(),
        issuing_country: CountryCode::new("FR").unwrap(),
        governance: GovernanceLocators {
            certificate_uri: CERT_URI.into(),
            lotl_uri: LOTL_URI.into(),
            tsl_uri: TSL_URI.into(),
            manifest_uri: MANIFEST_URI.into(),
        },
        document_names: vec![
            (LanguageTag::new("en").unwrap(), "Health certificate".into()),
            (LanguageTag::new("fr").unwrap(), "Certificat sanitaire".into()),
        ],
    }
}

pub fn payload() -> PayloadMap {
    let mut map = PayloadMap::new();
    let fields = [
        PayloadField::new("last_name", FieldValue::String("MARTIN".into())).unwrap(),
        PayloadField::new("birth_date", FieldValue::Date(NaiveDate::from_ymd_opt(1984, 3, 9).unwrap()))
            .unwrap(),
        PayloadField::null("middle_name", FieldType::String).unwrap(),
        PayloadField::new("face", FieldValue::Binary(vec![0x46, 0x41, 0x43, 0x00]))
            .unwrap()
            .with_extension(Some(FieldExtension::Biometric {
                data_type: BiometricDataType::FacialFeatures,
                format: BiometricFormat::Proprietary,
            }))
            .unwrap(),
    ];
    for field in fields {
        map.insert(field).unwrap();
    }
    map
}

/// Keys, published trust material and a signed seal, all valid.
pub struct Pki {
    pub now: Timestamp,
    pub governance_key: Ed25519KeyPair,
    pub signer_cert: Vec<u8>,
    pub mirror: MemoryFetcher,
    pub seal: Vec<u8>,
}

impl Pki {
    pub fn new() -> Self {
        let root_key = Ed25519KeyPair::from_seed(&[0x11; 32]);
        let signer_key = Ed25519KeyPair::from_seed(&[0x22; 32]);
        let governance_key = Ed25519KeyPair::from_seed(&[0x33; 32]);
        let fr = CountryCode::new("FR").unwrap();

        let root_cert = SealCertificate::issue(
            CertificateBody {
                serial: "root-1".into(),
                issuer_common_name: "FR Root CA".into(),
                subject_common_name: "FR Root CA".into(),
                subject_organization: "ANTS".into(),
                subject_organizational_unit: "PKI".into(),
                subject_country: fr.clone(),
                not_before: ts("2024-01-01T00:00:00Z"),
                not_after: ts("2034-01-01T00:00:00Z"),
                public_key: root_key.public_key(),
                key_usage: vec![KeyUsage::KeyCertSign],
                extended_key_usage: vec![],
                is_ca: true,
                issuer_uri: None,
            },
            &root_key,
        )
        .unwrap();
        let signer_cert = SealCertificate::issue(
            CertificateBody {
                serial: "signer-7".into(),
                issuer_common_name: "FR Root CA".into(),
                subject_common_name: "FR01 Seal Signer".into(),
                subject_organization: "ANTS".into(),
                subject_organizational_unit: "Seals".into(),
                subject_country: fr.clone(),
                not_before: ts("2025-01-01T00:00:00Z"),
                not_after: ts("2028-01-01T00:00:00Z"),
                public_key: signer_key.public_key(),
                key_usage: vec![KeyUsage::DigitalSignature],
                extended_key_usage: vec![ExtendedKeyUsage::SealSigning],
                is_ca: false,
                issuer_uri: Some(ROOT_URI.into()),
            },
            &root_key,
        )
        .unwrap();

        let lotl = ListOfTrustedLists {
            sequence: 1,
            issued: ts("2026-01-01T00:00:00Z"),
            next_update: ts("2027-01-01T00:00:00Z"),
            lists: vec![TrustedListPointer { country: fr.clone(), tsl_uri: TSL_URI.into() }],
        };
        let tsl = TrustStatusList {
            sequence: 1,
            issued: ts("2026-01-01T00:00:00Z"),
            next_update: ts("2027-01-01T00:00:00Z"),
            country: fr,
            authority_id: AuthorityId::new("FR01").unwrap(),
            trust_anchors: vec![sha256_fingerprint(&root_cert)],
        };
        let manifest = IssuerManifest {
            manifest_id: ManifestId::new(0x0A0B0C).unwrap(),
            issued: ts("2026-01-01T00:00:00Z"),
            next_update: ts("2027-01-01T00:00:00Z"),
            fields: vec![
                ManifestField { name: "last_name".into(), field_type: FieldType::String },
                ManifestField { name: "birth_date".into(), field_type: FieldType::Date },
                ManifestField { name: "middle_name".into(), field_type: FieldType::String },
                ManifestField { name: "face".into(), field_type: FieldType::Binary },
            ],
        };

        let mut mirror = MemoryFetcher::new();
        mirror.insert(CERT_URI, signer_cert.clone());
        mirror.insert(ROOT_URI, root_cert);
        mirror.insert(LOTL_URI, SignedEnvelope::sign(lotl, &governance_key).unwrap().to_bytes().unwrap());
        mirror.insert(TSL_URI, SignedEnvelope::sign(tsl, &governance_key).unwrap().to_bytes().unwrap());
        mirror.insert(
            MANIFEST_URI,
            SignedEnvelope::sign(manifest, &governance_key).unwrap().to_bytes().unwrap(),
        );

        let region = encode_unsigned(&header(), &payload()).unwrap();
        let signature = signer_key.sign(&SignedRegion::new(&region));
        let seal = assemble(&region, &signature, None);

        Self {
            now: ts("2026-10-19T12:00:00Z"),
            governance_key,
            signer_cert,
            mirror,
            seal,
        }
    }

    pub fn config(&self) -> VerifierConfig {
        VerifierConfig::with_signers(vec![self.governance_key.public_key()]).at(self.now)
    }

    pub fn verifier(&self) -> Verifier {
        Verifier::new(self.config(), DirectResolver::new(self.mirror.clone()))
    }
}
