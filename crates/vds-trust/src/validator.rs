//! # Trust Chain Validator
//!
//! Verifies a decoded seal against its certificate chain and governance
//! artifacts, producing a [`VerificationReport`].
//!
//! ## Stages
//!
//! The pipeline is a typestate machine. Each stage is a distinct type and
//! each transition consumes the previous stage, so stages cannot be
//! skipped or reordered.
//!
//! ```text
//! Start ──begin()──▶ SignatureCheck ──check_signature()──▶ ChainResolution
//!   │                                                          │
//!   │ (no governance signers)                   resolve_chain()│
//!   ▼                                                          ▼
//! Failed                      Done ◀──check_governance()── GovernanceCheck
//! ```
//!
//! ## Resource Order
//!
//! Resolver calls happen in a fixed order: signing certificate (only when
//! not embedded), issuer certificates up the chain, LoTL, TSL, manifest.
//!
//! ## Failure Model
//!
//! Nothing fails verification as a whole. A resolver error, a panic inside
//! the resolver, or malformed bytes degrade the flags that depend on the
//! missing resource and are recorded as audit events.

use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};

use vds_core::{AuthorityId, CountryCode, ManifestId, Timestamp};
use vds_crypto::{verify, Ed25519PublicKey, Ed25519Signature, SignedRegion};
use vds_payload::PayloadMap;

use crate::certificate::SealCertificate;
use crate::config::VerifierConfig;
use crate::governance::{
    GovernanceBody, GovernanceError, IssuerManifest, ListOfTrustedLists, SignedEnvelope,
    TrustStatusList,
};
use crate::locators::GovernanceLocators;
use crate::resolver::{ResolveStatus, ResourceKind, ResourceRequest, ResourceResolver};
use crate::result::{AuditEvent, Stage, VerificationReport, VerificationResult};

// ─── Input ───────────────────────────────────────────────────────────

/// The parts of a decoded seal the validator needs.
#[derive(Debug, Clone, Copy)]
pub struct SealEvidence<'a> {
    /// Bytes covered by the seal signature.
    pub signed_region: SignedRegion<'a>,
    pub signature: &'a Ed25519Signature,
    /// Signing certificate bytes carried in the seal, if any.
    pub embedded_certificate: Option<&'a [u8]>,
    pub locators: &'a GovernanceLocators,
    pub authority: &'a AuthorityId,
    pub issuing_country: &'a CountryCode,
    pub manifest_id: ManifestId,
    pub payload: &'a PayloadMap,
}

// ─── Verifier ────────────────────────────────────────────────────────

/// Configured validator. Holds the resolver and the verification instant.
pub struct Verifier {
    governance_signers: Vec<Ed25519PublicKey>,
    max_chain_depth: usize,
    now: Timestamp,
    resolver: Box<dyn ResourceResolver>,
}

impl Verifier {
    /// Build a verifier. The verification instant is fixed here.
    pub fn new(config: VerifierConfig, resolver: impl ResourceResolver + 'static) -> Self {
        Self {
            now: config.verification_time.unwrap_or_else(Timestamp::now),
            governance_signers: config.governance_signers,
            max_chain_depth: config.max_chain_depth,
            resolver: Box::new(resolver),
        }
    }

    /// The instant certificates and artifacts are checked against.
    pub fn verification_time(&self) -> &Timestamp {
        &self.now
    }

    /// Run the pipeline. Always returns a complete report.
    pub fn verify(&self, evidence: &SealEvidence<'_>) -> VerificationReport {
        match Pipeline::new(self, evidence).begin() {
            Ok(pipeline) => pipeline
                .check_signature()
                .resolve_chain()
                .check_governance()
                .into_report(),
            Err(failed) => failed.into_report(),
        }
    }
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("governance_signers", &self.governance_signers)
            .field("max_chain_depth", &self.max_chain_depth)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

// ─── State Types ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct Start;

#[derive(Debug, Clone, Copy)]
pub struct SignatureCheck;

#[derive(Debug, Clone, Copy)]
pub struct ChainResolution;

#[derive(Debug, Clone, Copy)]
pub struct GovernanceCheck;

#[derive(Debug, Clone, Copy)]
pub struct Done;

/// Terminal: the configuration cannot support verification.
#[derive(Debug, Clone, Copy)]
pub struct Failed;

mod private {
    pub trait Sealed {}
    impl Sealed for super::Start {}
    impl Sealed for super::SignatureCheck {}
    impl Sealed for super::ChainResolution {}
    impl Sealed for super::GovernanceCheck {}
    impl Sealed for super::Done {}
    impl Sealed for super::Failed {}
}

/// Marker trait for pipeline stages. Sealed.
pub trait PipelineStage: private::Sealed {
    const STAGE: Stage;
}

impl PipelineStage for Start {
    const STAGE: Stage = Stage::Start;
}
impl PipelineStage for SignatureCheck {
    const STAGE: Stage = Stage::SignatureCheck;
}
impl PipelineStage for ChainResolution {
    const STAGE: Stage = Stage::ChainResolution;
}
impl PipelineStage for GovernanceCheck {
    const STAGE: Stage = Stage::GovernanceCheck;
}
impl PipelineStage for Done {
    const STAGE: Stage = Stage::Done;
}
impl PipelineStage for Failed {
    const STAGE: Stage = Stage::Failed;
}

// ─── Pipeline ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Progress {
    result: VerificationResult,
    events: Vec<AuditEvent>,
    signing_cert: Option<SealCertificate>,
    chain: Vec<SealCertificate>,
    root_verified: bool,
}

/// A verification in progress, in stage `S`.
pub struct Pipeline<'a, S: PipelineStage> {
    verifier: &'a Verifier,
    evidence: &'a SealEvidence<'a>,
    progress: Progress,
    _stage: PhantomData<S>,
}

impl<'a, S: PipelineStage> Pipeline<'a, S> {
    /// Current stage.
    pub fn stage(&self) -> Stage {
        S::STAGE
    }

    /// Flags decided so far.
    pub fn result(&self) -> &VerificationResult {
        &self.progress.result
    }

    fn advance<T: PipelineStage>(self) -> Pipeline<'a, T> {
        let (from, to) = (S::STAGE, T::STAGE);
        tracing::debug!(%from, %to, "validator stage transition");
        Pipeline {
            verifier: self.verifier,
            evidence: self.evidence,
            progress: self.progress,
            _stage: PhantomData,
        }
    }

    fn record(&mut self, resource: Option<&str>, outcome: impl Into<String>) {
        self.progress.events.push(AuditEvent {
            stage: S::STAGE,
            resource: resource.map(str::to_owned),
            outcome: outcome.into(),
        });
    }

    /// Call the resolver, isolating panics and empty answers.
    fn fetch(&mut self, kind: ResourceKind, uri: &str, requires_update: bool) -> Option<Vec<u8>> {
        let mut request = ResourceRequest::new(kind, uri).with_update(requires_update);
        let name = request.resource_name.clone();
        let verifier = self.verifier;
        let status = catch_unwind(AssertUnwindSafe(|| verifier.resolver.resolve(&mut request)))
            .unwrap_or(ResolveStatus::ExceptionInCallback);
        let status = match status {
            ResolveStatus::Ok if request.output_data.is_empty() => ResolveStatus::DownloadError,
            other => other,
        };
        let suffix = if requires_update { " (refresh)" } else { "" };
        self.record(Some(&name), format!("{status}{suffix}"));
        if status == ResolveStatus::Ok {
            Some(std::mem::take(&mut request.output_data))
        } else {
            tracing::warn!(%uri, %status, "resource unavailable");
            None
        }
    }

    fn build_report(self) -> VerificationReport {
        let stage = S::STAGE;
        let result = self.progress.result;
        if result.is_trusted() {
            tracing::debug!(%stage, "verification complete, trusted");
        } else {
            let failed: Vec<&str> = result
                .flags()
                .iter()
                .filter(|(_, v)| !v)
                .map(|(name, _)| *name)
                .collect();
            tracing::warn!(%stage, ?failed, "verification complete, not trusted");
        }
        VerificationReport {
            result,
            certificate_information: self.progress.signing_cert.as_ref().map(SealCertificate::information),
            chain: self.progress.chain.iter().map(|c| *c.fingerprint()).collect(),
            final_stage: stage,
            events: self.progress.events,
        }
    }
}

impl<'a> Pipeline<'a, Start> {
    pub fn new(verifier: &'a Verifier, evidence: &'a SealEvidence<'a>) -> Self {
        Self {
            verifier,
            evidence,
            progress: Progress::default(),
            _stage: PhantomData,
        }
    }

    /// Check the configuration. Without governance signers no artifact can
    /// ever be valid, so verification stops before any resolver call.
    pub fn begin(mut self) -> Result<Pipeline<'a, SignatureCheck>, Pipeline<'a, Failed>> {
        if self.verifier.governance_signers.is_empty() {
            self.record(None, "no governance signers configured");
            return Err(self.advance());
        }
        Ok(self.advance())
    }
}

impl<'a> Pipeline<'a, SignatureCheck> {
    /// Obtain the signing certificate and verify the seal signature.
    pub fn check_signature(mut self) -> Pipeline<'a, ChainResolution> {
        let evidence = self.evidence;
        let bytes = match evidence.embedded_certificate {
            Some(bytes) => {
                self.record(None, "signing certificate embedded");
                Some(bytes.to_vec())
            }
            None => self.fetch(ResourceKind::Certificate, &evidence.locators.certificate_uri, false),
        };

        if let Some(bytes) = bytes {
            match SealCertificate::from_bytes(&bytes) {
                Ok(cert) => {
                    match verify(&evidence.signed_region, evidence.signature, cert.public_key()) {
                        Ok(()) => {
                            self.progress.result.vds_signature_verified = true;
                            self.record(None, "seal signature verified");
                        }
                        Err(e) => self.record(None, format!("seal signature rejected: {e}")),
                    }
                    self.progress.signing_cert = Some(cert);
                }
                Err(e) => self.record(None, format!("signing certificate rejected: {e}")),
            }
        }
        self.advance()
    }
}

impl<'a> Pipeline<'a, ChainResolution> {
    /// Walk `issuer_uri` links up to a self-signed root.
    pub fn resolve_chain(mut self) -> Pipeline<'a, GovernanceCheck> {
        let Some(signing) = self.progress.signing_cert.clone() else {
            self.record(None, "no signing certificate, chain not walked");
            return self.advance();
        };
        let now = self.verifier.now;
        self.progress.result.signing_certificate_usage_authorized = signing.usage_authorized_at(&now);

        let mut chain = vec![signing];
        let mut links_ok = true;
        let mut complete = false;
        loop {
            let Some(current) = chain.last().cloned() else { break };
            if current.is_self_issued() {
                complete = true;
                break;
            }
            if chain.len() > self.verifier.max_chain_depth {
                self.record(None, format!("chain exceeds depth {}", self.verifier.max_chain_depth));
                break;
            }
            let Some(uri) = current.body().issuer_uri.clone() else {
                self.record(None, format!("{:?} names no issuer uri", current.body().subject_common_name));
                break;
            };
            let Some(bytes) = self.fetch(ResourceKind::Certificate, &uri, false) else { break };
            let issuer = match SealCertificate::from_bytes(&bytes) {
                Ok(issuer) => issuer,
                Err(e) => {
                    self.record(None, format!("issuer certificate rejected: {e}"));
                    break;
                }
            };
            if let Err(reason) = current.check_issued_by(&issuer, &now) {
                self.record(None, format!("link rejected: {reason}"));
                links_ok = false;
            }
            chain.push(issuer);
        }

        if complete {
            if let Some(root) = chain.last() {
                let self_signed = root.verify_signed_by(root.public_key()).is_ok();
                let root_ok = self_signed && root.body().is_ca && root.is_valid_at(&now);
                self.progress.root_verified = self_signed;
                if !root_ok {
                    self.record(None, "root certificate rejected");
                }
                links_ok &= root_ok;
            }
        }
        self.progress.result.certification_chain_verified = complete && links_ok;
        self.record(
            None,
            format!(
                "chain of {} certificate(s) {}",
                chain.len(),
                if complete && links_ok { "verified" } else { "not verified" }
            ),
        );
        self.progress.chain = chain;
        self.advance()
    }
}

impl<'a> Pipeline<'a, GovernanceCheck> {
    /// Fetch and check the LoTL, TSL and manifest, then decide the CA flag.
    pub fn check_governance(mut self) -> Pipeline<'a, Done> {
        let evidence = self.evidence;
        let locators = evidence.locators;

        let lotl = self
            .open_artifact::<ListOfTrustedLists>(ResourceKind::Lotl, &locators.lotl_uri)
            .and_then(|lotl| {
                lotl.check_points_to(evidence.issuing_country, &locators.tsl_uri)
                    .map(|()| lotl)
            });
        self.progress.result.lotl_governance_valid = self.conclude("lotl", lotl).is_some();

        let tsl = self
            .open_artifact::<TrustStatusList>(ResourceKind::Tsl, &locators.tsl_uri)
            .and_then(|tsl| tsl.check_covers(evidence.authority).map(|()| tsl));
        let tsl = self.conclude("tsl", tsl);
        self.progress.result.tsl_governance_valid = tsl.is_some();

        let manifest = self
            .open_artifact::<IssuerManifest>(ResourceKind::Manifest, &locators.manifest_uri)
            .and_then(|m| m.check_payload(evidence.manifest_id, evidence.payload).map(|()| m));
        self.progress.result.manifest_governance_valid = self.conclude("manifest", manifest).is_some();

        let anchored = match (&tsl, self.progress.chain.last()) {
            (Some(tsl), Some(root)) if self.progress.root_verified && root.is_self_issued() => {
                tsl.is_trust_anchor(root.fingerprint())
            }
            _ => false,
        };
        self.progress.result.ca_certificate_verified = anchored;
        self.record(
            None,
            if anchored { "root is a trust anchor" } else { "root is not a trust anchor" },
        );
        self.advance()
    }

    /// Fetch and authenticate one artifact, refreshing once if expired.
    fn open_artifact<T: GovernanceBody>(
        &mut self,
        kind: ResourceKind,
        uri: &str,
    ) -> Result<T, GovernanceError> {
        let verifier = self.verifier;
        let signers = &verifier.governance_signers;
        let now = verifier.now;
        let Some(bytes) = self.fetch(kind, uri, false) else {
            return Err(GovernanceError::Unavailable(T::KIND));
        };
        match SignedEnvelope::<T>::open(&bytes, signers, &now) {
            Err(GovernanceError::Expired { next_update }) => {
                self.record(None, format!("{} expired at {next_update}, refreshing", T::KIND));
                let Some(bytes) = self.fetch(kind, uri, true) else {
                    return Err(GovernanceError::Expired { next_update });
                };
                SignedEnvelope::<T>::open(&bytes, signers, &now)
            }
            other => other,
        }
    }

    fn conclude<T>(&mut self, kind: &str, outcome: Result<T, GovernanceError>) -> Option<T> {
        match outcome {
            Ok(body) => {
                self.record(None, format!("{kind} valid"));
                Some(body)
            }
            Err(e) => {
                self.record(None, format!("{kind} invalid: {e}"));
                None
            }
        }
    }
}

impl Pipeline<'_, Done> {
    /// Assemble the report.
    pub fn into_report(self) -> VerificationReport {
        self.build_report()
    }
}

impl Pipeline<'_, Failed> {
    /// Assemble the all-false report.
    pub fn into_report(self) -> VerificationReport {
        self.build_report()
    }
}
