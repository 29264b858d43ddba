//! # Sealed Document
//!
//! The decoded, queryable form of a seal. A document is immutable after
//! decode except for its verification report, which [`SealedDocument::verify`]
//! attaches exactly once.

use vds_core::{AuthorityId, CountryCode, LanguageTag, ManifestId, SealError, SealFormat};
use vds_crypto::{Ed25519Signature, SignedRegion};
use vds_payload::{BiometricDataType, BiometricFormat, FieldExtensionType, PayloadField, PayloadMap};
use vds_trust::{
    CertificateInformation, GovernanceLocators, SealEvidence, VerificationReport,
    VerificationResult, Verifier,
};

use crate::codec::{self, RawSeal};
use crate::header::SealHeader;

/// A decoded seal and, once verified, its verification report.
#[derive(Debug, Clone)]
pub struct SealedDocument {
    header: SealHeader,
    payload: PayloadMap,
    signed_region: Vec<u8>,
    signature: Ed25519Signature,
    embedded_certificate: Option<Vec<u8>>,
    report: Option<VerificationReport>,
}

impl SealedDocument {
    /// Decode a binary seal.
    ///
    /// # Errors
    ///
    /// `UnsupportedFormat` or `MalformedPayload`.
    pub fn decode(bytes: &[u8]) -> Result<Self, SealError> {
        let RawSeal {
            header,
            payload,
            signed_region,
            signature,
            embedded_certificate,
        } = codec::decode(bytes)?;
        Ok(Self {
            header,
            payload,
            signed_region,
            signature,
            embedded_certificate,
            report: None,
        })
    }

    /// Decode the textual form of a seal: hex, or base64 (standard or
    /// URL-safe, padded or not).
    pub fn decode_from_string(text: &str) -> Result<Self, SealError> {
        Self::decode(&codec::decode_text(text)?)
    }

    // ─── Verification ───────────────────────────────────────────────

    /// Verify the seal. The pipeline runs on the first call only; later
    /// calls return the attached result unchanged.
    pub fn verify(&mut self, verifier: &Verifier) -> &VerificationResult {
        let report = match self.report.take() {
            Some(report) => {
                tracing::debug!(manifest_id = %self.header.manifest_id, "already verified");
                report
            }
            None => verifier.verify(&self.evidence()),
        };
        &self.report.insert(report).result
    }

    fn evidence(&self) -> SealEvidence<'_> {
        SealEvidence {
            signed_region: SignedRegion::new(&self.signed_region),
            signature: &self.signature,
            embedded_certificate: self.embedded_certificate.as_deref(),
            locators: &self.header.governance,
            authority: &self.header.authority,
            issuing_country: &self.header.issuing_country,
            manifest_id: self.header.manifest_id,
            payload: &self.payload,
        }
    }

    /// True once [`Self::verify`] has run.
    pub fn is_verified(&self) -> bool {
        self.report.is_some()
    }

    /// # Errors
    ///
    /// `NotYetVerified` before [`Self::verify`].
    pub fn verification_result(&self) -> Result<&VerificationResult, SealError> {
        Ok(&self.verification_report()?.result)
    }

    /// Full audit record of the verification.
    pub fn verification_report(&self) -> Result<&VerificationReport, SealError> {
        self.report.as_ref().ok_or(SealError::NotYetVerified)
    }

    /// Subject and issuer of the signing certificate. `Ok(None)` when the
    /// certificate could not be obtained.
    pub fn certificate_information(&self) -> Result<Option<&CertificateInformation>, SealError> {
        Ok(self.verification_report()?.certificate_information.as_ref())
    }

    // ─── Header ─────────────────────────────────────────────────────

    pub fn header(&self) -> &SealHeader {
        &self.header
    }

    pub fn format(&self) -> SealFormat {
        self.header.format
    }

    pub fn manifest_id(&self) -> ManifestId {
        self.header.manifest_id
    }

    pub fn manifest_version(&self) -> u8 {
        self.header.manifest_version
    }

    /// Languages the document has a name in, in encoding order.
    pub fn supported_languages(&self) -> Vec<&LanguageTag> {
        self.header.document_names.iter().map(|(l, _)| l).collect()
    }

    /// Document name in `language` (`"fr"`, `"pt-BR"`, case-insensitive).
    pub fn document_name(&self, language: &str) -> Option<&str> {
        let tag = LanguageTag::new(language).ok()?;
        self.header.document_name(&tag)
    }

    /// Identifier of the authority that issued the signing certificate.
    pub fn certificate_authority_id(&self) -> &AuthorityId {
        &self.header.authority
    }

    pub fn certificate_authority_issuing_country(&self) -> &CountryCode {
        &self.header.issuing_country
    }

    pub fn governance(&self) -> &GovernanceLocators {
        &self.header.governance
    }

    pub fn certificate_url(&self) -> &str {
        &self.header.governance.certificate_uri
    }

    pub fn lotl_url(&self) -> &str {
        &self.header.governance.lotl_uri
    }

    pub fn tsl_url(&self) -> &str {
        &self.header.governance.tsl_uri
    }

    pub fn manifest_url(&self) -> &str {
        &self.header.governance.manifest_uri
    }

    // ─── Payload ────────────────────────────────────────────────────

    pub fn payload(&self) -> &PayloadMap {
        &self.payload
    }

    /// Bytes covered by the seal signature.
    pub fn signed_region(&self) -> &[u8] {
        &self.signed_region
    }

    pub fn signature(&self) -> &Ed25519Signature {
        &self.signature
    }

    pub fn embedded_certificate(&self) -> Option<&[u8]> {
        self.embedded_certificate.as_deref()
    }

    pub fn find_biometrics(
        &self,
        data_type: BiometricDataType,
        format: Option<BiometricFormat>,
    ) -> Vec<&PayloadField> {
        self.payload.find_biometrics(data_type, format)
    }

    pub fn find_fields_by_extension(&self, extension_type: FieldExtensionType) -> Vec<&PayloadField> {
        self.payload.find_fields_by_extension(extension_type)
    }

    pub fn contains_face_templates(&self) -> bool {
        self.payload.contains_face_templates()
    }

    pub fn contains_face_images(&self) -> bool {
        self.payload.contains_face_images()
    }

    pub fn contains_portraits(&self) -> bool {
        self.payload.contains_portraits()
    }

    pub fn contains_finger_templates(&self) -> bool {
        self.payload.contains_finger_templates()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::codec::{assemble, encode_unsigned};
    use crate::header::tests::sample_header;
    use vds_crypto::Ed25519KeyPair;
    use vds_payload::{FieldExtension, FieldValue};
    use vds_trust::{Stage, VerifierConfig};

    pub(crate) fn sample_payload() -> PayloadMap {
        let mut map = PayloadMap::new();
        map.insert(PayloadField::new("last_name", FieldValue::String("DUPONT <Jr>".into())).unwrap())
            .unwrap();
        map.insert(PayloadField::new("document_number", FieldValue::Integer(421)).unwrap())
            .unwrap();
        map.insert(
            PayloadField::new("portrait", FieldValue::Binary(vec![0xFF, 0xD8, 0xFF]))
                .unwrap()
                .with_extension(Some(FieldExtension::Portrait))
                .unwrap(),
        )
        .unwrap();
        map
    }

    pub(crate) fn sample_document() -> SealedDocument {
        let region = encode_unsigned(&sample_header(), &sample_payload()).unwrap();
        let signature = Ed25519KeyPair::from_seed(&[7; 32]).sign(&SignedRegion::new(&region));
        SealedDocument::decode(&assemble(&region, &signature, None)).unwrap()
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_document_is_send_and_sync() {
        assert_send_sync::<SealedDocument>();
    }

    #[test]
    fn test_accessors() {
        let doc = sample_document();
        assert_eq!(doc.format(), SealFormat::VdsAfnorXpZ42_105);
        assert_eq!(doc.manifest_id().to_string(), "0A0B0C");
        assert_eq!(doc.manifest_version(), 2);
        assert_eq!(doc.certificate_authority_id().as_str(), "FR01");
        assert_eq!(doc.certificate_authority_issuing_country().as_str(), "FR");
        assert_eq!(doc.lotl_url(), "https://trust.example.eu/lotl.json");
        assert_eq!(doc.tsl_url(), "https://trust.example.fr/tsl-fr.json");
        assert_eq!(doc.manifest_url(), "https://manifests.example.fr/0A0B0C.json");
        let languages: Vec<&str> = doc.supported_languages().iter().map(|l| l.as_str()).collect();
        assert_eq!(languages, ["en", "fr"]);
        assert_eq!(doc.document_name("EN"), Some("Residence permit"));
        assert_eq!(doc.document_name("de"), None);
        assert_eq!(doc.document_name("not a tag"), None);
        assert!(doc.contains_portraits());
        assert!(doc.contains_face_images());
        assert!(!doc.contains_face_templates());
        assert!(doc.find_biometrics(BiometricDataType::FacialFeatures, None).is_empty());
    }

    #[test]
    fn test_result_unavailable_before_verify() {
        let doc = sample_document();
        assert!(!doc.is_verified());
        assert_eq!(doc.verification_result().unwrap_err(), SealError::NotYetVerified);
        assert_eq!(doc.verification_report().unwrap_err(), SealError::NotYetVerified);
        assert_eq!(doc.certificate_information().unwrap_err(), SealError::NotYetVerified);
    }

    #[test]
    fn test_verify_runs_once() {
        let mut doc = sample_document();
        let config = VerifierConfig::with_signers(vec![Ed25519KeyPair::from_seed(&[1; 32]).public_key()]);
        let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = std::sync::Arc::clone(&calls);
        let verifier = Verifier::new(config, move |_: &mut vds_trust::ResourceRequest| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            vds_trust::ResolveStatus::DownloadError
        });

        let first = *doc.verify(&verifier);
        let after_first = calls.load(std::sync::atomic::Ordering::SeqCst);
        let second = *doc.verify(&verifier);
        assert_eq!(first, second);
        assert!(after_first > 0);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), after_first);
        assert!(!first.is_trusted());
        assert_eq!(doc.verification_report().unwrap().final_stage, Stage::Done);
        assert_eq!(doc.certificate_information().unwrap(), None);
    }
}
