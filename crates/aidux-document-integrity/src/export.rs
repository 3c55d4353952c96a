//! Document export with signing.
//!
//! The generated document is always delivered. Signing runs after
//! generation; if it cannot complete, the export carries
//! [`SignatureStatus::Unavailable`] instead of failing.

use crate::hasher::{ContentHash, DocumentHasher};
use crate::service::DocumentIntegrityService;
use crate::signature::VerificationResult;
use aidux_common_config::SigningConfig;
use aidux_common_core::{Error, Result};
use aidux_common_log::spans::{export_span, Timer};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn, Instrument};

/// Renders the exportable document for a clinical resource.
#[async_trait]
pub trait DocumentGenerator: Send + Sync {
    async fn generate(&self, resource_id: &str) -> Result<Vec<u8>>;
}

/// Signing state of an exported document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignatureStatus {
    Signed {
        #[serde(rename = "alreadySigned")]
        already_signed: bool,
    },
    /// Signing was attempted and did not complete.
    Unavailable { reason: String },
    /// Signing is disabled for exports.
    NotRequested,
}

/// A generated document and its signing state.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub resource_id: String,
    pub bytes: Vec<u8>,
    pub hash: ContentHash,
    pub signature: SignatureStatus,
}

impl ExportedDocument {
    pub fn is_signed(&self) -> bool {
        matches!(self.signature, SignatureStatus::Signed { .. })
    }

    /// The degradation to report alongside the document, if signing failed.
    pub fn degradation(&self) -> Option<Error> {
        match &self.signature {
            SignatureStatus::Unavailable { reason } => {
                Some(Error::degraded(&self.resource_id, reason))
            }
            _ => None,
        }
    }
}

/// Generates, signs and verifies exported documents.
#[derive(Clone)]
pub struct ExportWorkflow {
    generator: Arc<dyn DocumentGenerator>,
    integrity: DocumentIntegrityService,
    config: SigningConfig,
}

impl ExportWorkflow {
    pub fn new(generator: Arc<dyn DocumentGenerator>, integrity: DocumentIntegrityService) -> Self {
        Self::with_config(generator, integrity, SigningConfig::default())
    }

    pub fn with_config(
        generator: Arc<dyn DocumentGenerator>,
        integrity: DocumentIntegrityService,
        config: SigningConfig,
    ) -> Self {
        Self {
            generator,
            integrity,
            config,
        }
    }

    pub fn integrity(&self) -> &DocumentIntegrityService {
        &self.integrity
    }

    /// Produce the document for `resource_id` and sign it as `signer_id`.
    ///
    /// Only generation failures are returned as errors.
    pub async fn export(&self, resource_id: &str, signer_id: &str) -> Result<ExportedDocument> {
        let timer = Timer::start("export");
        let result = self
            .export_inner(resource_id, signer_id)
            .instrument(export_span(resource_id))
            .await;
        timer.finish();
        result
    }

    async fn export_inner(&self, resource_id: &str, signer_id: &str) -> Result<ExportedDocument> {
        let bytes = self.generator.generate(resource_id).await?;
        let hash = DocumentHasher::hash(&bytes);

        let signature = if self.config.sign_on_export {
            self.sign_generated(resource_id, signer_id, &bytes).await
        } else {
            SignatureStatus::NotRequested
        };

        match &signature {
            SignatureStatus::Unavailable { reason } => {
                warn!(%reason, "Document exported without signature")
            }
            _ => info!(size = bytes.len(), "Document exported"),
        }

        Ok(ExportedDocument {
            resource_id: resource_id.to_string(),
            bytes,
            hash,
            signature,
        })
    }

    async fn sign_generated(&self, resource_id: &str, signer_id: &str, bytes: &[u8]) -> SignatureStatus {
        let receipt = match self.integrity.sign(resource_id, signer_id, bytes).await {
            Ok(receipt) => receipt,
            Err(e) => {
                return SignatureStatus::Unavailable {
                    reason: e.to_string(),
                }
            }
        };

        if self.config.verify_after_sign {
            let check = self.integrity.verify_hash(resource_id, receipt.hash).await;
            if !check.valid {
                let reason = check
                    .error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "signature not found after signing".to_string());
                return SignatureStatus::Unavailable { reason };
            }
        }

        SignatureStatus::Signed {
            already_signed: receipt.already_signed,
        }
    }

    /// Check a previously exported document.
    pub async fn verify_document(&self, resource_id: &str, bytes: &[u8]) -> VerificationResult {
        self.integrity.verify(resource_id, bytes).await
    }

    /// Check an exported document saved on disk.
    pub async fn verify_file(
        &self,
        resource_id: &str,
        path: impl AsRef<Path>,
    ) -> Result<VerificationResult> {
        let hash = DocumentHasher::hash_file(path).await?;
        Ok(self.integrity.verify_hash(resource_id, hash).await)
    }
}
