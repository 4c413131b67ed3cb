//! # Validation Pipeline
//!
//! Drives one credential through the phases in [`crate::phase`].
//!
//! ## Driver
//!
//! [`Pipeline::start`] is an explicit loop: enter a phase, run its handler,
//! and move to the phase the handler returns. Handlers are ordinary
//! methods returning `Result<Phase, ValidationError>`; recording a phase
//! never runs anything by itself.
//!
//! ## Abort
//!
//! [`Pipeline::abort`] finishes the run with `Failure(Aborted)` at the
//! current phase, under the same lock every transition takes, and wakes the
//! driver. Every external call is raced against the abort signal, so an
//! in-flight call is dropped and its result never applied. A handler
//! result arriving after abort finds the run terminal and is discarded.
//!
//! ## Scratch State
//!
//! The local hash, fetched transaction, remembered revocation keys and key
//! expiry live in a [`Scratch`] value owned by one `start` call and are
//! dropped with it.

use std::future::Future;
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};
use serde_json::Value;
use tokio::sync::watch;

use bcv_core::{hex_eq, sha256_hex, BlockchainAddress, HashScheme, Network, Timestamp};
use bcv_vc::{is_authorized_address, parse_issuer_value, Credential, Issuer, Receipt, RevocationList};

use crate::collaborators::{
    Canonicalizer, JsonFetcher, Services, SignatureRecovery, TransactionData, TransactionDataSource,
};
use crate::config::PipelineConfig;
use crate::error::ValidationError;
use crate::phase::{Phase, Transition};

// ── Outcome and Report ───────────────────────────────────────────────

/// Terminal result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure {
        /// The phase that was running when the run failed.
        phase: Phase,
        error: ValidationError,
    },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Human-readable failure reason.
    pub fn reason(&self) -> Option<String> {
        match self {
            Self::Success => None,
            Self::Failure { error, .. } => Some(error.to_string()),
        }
    }

    pub fn failed_phase(&self) -> Option<Phase> {
        match self {
            Self::Success => None,
            Self::Failure { phase, .. } => Some(*phase),
        }
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Self::Success => None,
            Self::Failure { error, .. } => Some(error),
        }
    }
}

/// Snapshot of a run: its outcome, if terminal, and every transition taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub outcome: Option<Outcome>,
    pub transitions: Vec<Transition>,
}

impl Report {
    /// Whether the run reached `phase` at any point.
    pub fn visited(&self, phase: Phase) -> bool {
        self.transitions.iter().any(|t| t.to == phase)
    }

    /// Phases entered, in order, excluding `NotStarted`.
    pub fn phases(&self) -> Vec<Phase> {
        self.transitions.iter().map(|t| t.to).collect()
    }
}

// ── Shared Run State ─────────────────────────────────────────────────

type TransitionObserver = Arc<dyn Fn(Phase, Phase) + Send + Sync>;
type CompletionCallback = Arc<dyn Fn(&Outcome) + Send + Sync>;

#[derive(Default)]
struct Hooks {
    on_transition: Option<TransitionObserver>,
    on_complete: Option<CompletionCallback>,
}

struct RunState {
    phase: Phase,
    outcome: Option<Outcome>,
    transitions: Vec<Transition>,
    started: bool,
}

struct Shared {
    state: Mutex<RunState>,
    hooks: Mutex<Hooks>,
    /// Held from a state change through its callbacks, so observers see
    /// transitions in recorded order. Reentrant so a callback may abort.
    notify: ReentrantMutex<()>,
    abort_signal: watch::Sender<bool>,
}

impl Shared {
    fn new() -> Self {
        let (abort_signal, _) = watch::channel(false);
        Self {
            state: Mutex::new(RunState {
                phase: Phase::NotStarted,
                outcome: None,
                transitions: Vec::new(),
                started: false,
            }),
            hooks: Mutex::new(Hooks::default()),
            notify: ReentrantMutex::new(()),
            abort_signal,
        }
    }

    /// Move to a non-terminal phase. Returns `false` if the run is already
    /// terminal.
    fn enter(&self, to: Phase) -> bool {
        let _order = self.notify.lock();
        let from = {
            let mut state = self.state.lock();
            if state.outcome.is_some() {
                return false;
            }
            let from = state.phase;
            state.phase = to;
            state.transitions.push(Transition { from, to });
            from
        };
        tracing::debug!(%from, %to, "phase transition");
        self.notify_transition(from, to);
        true
    }

    /// Make the run terminal. `outcome` receives the phase that was current
    /// when the lock was taken. Returns `false`, changing nothing, if the
    /// run was already terminal.
    fn finish(&self, outcome: impl FnOnce(Phase) -> Outcome) -> bool {
        let _order = self.notify.lock();
        let (from, outcome) = {
            let mut state = self.state.lock();
            if state.outcome.is_some() {
                return false;
            }
            let from = state.phase;
            let outcome = outcome(from);
            let to = if outcome.is_success() {
                Phase::Success
            } else {
                Phase::Failure
            };
            state.phase = to;
            state.outcome = Some(outcome.clone());
            state.transitions.push(Transition { from, to });
            (from, outcome)
        };
        match &outcome {
            Outcome::Success => tracing::info!(from = %from, "validation succeeded"),
            Outcome::Failure { phase, error } => {
                tracing::warn!(%phase, reason = %error, "validation failed")
            }
        }
        let to = if outcome.is_success() {
            Phase::Success
        } else {
            Phase::Failure
        };
        self.notify_transition(from, to);
        let on_complete = self.hooks.lock().on_complete.clone();
        if let Some(callback) = on_complete {
            callback(&outcome);
        }
        true
    }

    fn fail(&self, error: ValidationError) -> bool {
        self.finish(|phase| Outcome::Failure { phase, error })
    }

    fn abort(&self) {
        if self.fail(ValidationError::Aborted) {
            tracing::debug!("validation aborted");
        }
        self.abort_signal.send_replace(true);
    }

    fn notify_transition(&self, from: Phase, to: Phase) {
        let observer = self.hooks.lock().on_transition.clone();
        if let Some(observer) = observer {
            observer(from, to);
        }
    }

    fn report(&self) -> Report {
        let state = self.state.lock();
        Report {
            outcome: state.outcome.clone(),
            transitions: state.transitions.clone(),
        }
    }
}

/// Aborts a pipeline from another task.
#[derive(Clone)]
pub struct AbortHandle {
    shared: Arc<Shared>,
}

impl AbortHandle {
    pub fn abort(&self) {
        self.shared.abort();
    }
}

impl std::fmt::Debug for AbortHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbortHandle").finish_non_exhaustive()
    }
}

// ── Scratch ──────────────────────────────────────────────────────────

/// Values derived during one run.
#[derive(Debug, Default)]
struct Scratch {
    local_hash: Option<String>,
    transaction: Option<TransactionData>,
    revocation_keys: Vec<BlockchainAddress>,
    issuer: Option<Issuer>,
    key_expires_at: Option<Timestamp>,
}

impl Scratch {
    fn transaction(&self) -> Result<&TransactionData, ValidationError> {
        self.transaction
            .as_ref()
            .ok_or(ValidationError::MissingTransactionId)
    }
}

// ── Pipeline ─────────────────────────────────────────────────────────

/// Validates one credential. Construct a new pipeline to retry.
pub struct Pipeline<C, R, T, F> {
    credential: Arc<Credential>,
    services: Services<C, R, T, F>,
    config: PipelineConfig,
    shared: Arc<Shared>,
}

impl<C, R, T, F> Pipeline<C, R, T, F>
where
    C: Canonicalizer,
    R: SignatureRecovery,
    T: TransactionDataSource,
    F: JsonFetcher,
{
    pub fn new(
        credential: impl Into<Arc<Credential>>,
        services: Services<C, R, T, F>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            credential: credential.into(),
            services,
            config,
            shared: Arc::new(Shared::new()),
        }
    }

    /// Register an observer called with `(from, to)` on every transition.
    pub fn on_transition(&self, observer: impl Fn(Phase, Phase) + Send + Sync + 'static) {
        self.shared.hooks.lock().on_transition = Some(Arc::new(observer));
    }

    /// Register a callback called exactly once when the run becomes terminal.
    pub fn on_complete(&self, callback: impl Fn(&Outcome) + Send + Sync + 'static) {
        self.shared.hooks.lock().on_complete = Some(Arc::new(callback));
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn phase(&self) -> Phase {
        self.shared.state.lock().phase
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.shared.state.lock().outcome.clone()
    }

    pub fn report(&self) -> Report {
        self.shared.report()
    }

    pub fn abort(&self) {
        self.shared.abort();
    }

    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Run the pipeline to a terminal phase.
    ///
    /// A second call, or a call after `abort`, returns the existing report
    /// without running anything.
    pub async fn start(&self) -> Report {
        {
            let mut state = self.shared.state.lock();
            if state.started || state.outcome.is_some() {
                drop(state);
                return self.shared.report();
            }
            state.started = true;
        }

        tracing::debug!(
            generation = %self.credential.generation,
            id = %self.credential.id,
            network = %self.config.network,
            "validation started"
        );

        let mut abort = self.shared.abort_signal.subscribe();
        let mut scratch = Scratch::default();
        let mut phase = match self.config.network {
            Network::Mainnet => Phase::AssertingChain,
            Network::Testnet => Phase::ComputingLocalHash,
        };

        loop {
            if !self.shared.enter(phase) {
                break;
            }
            match self.run_phase(phase, &mut scratch, &mut abort).await {
                Ok(Phase::Success) => {
                    self.shared.finish(|_| Outcome::Success);
                    break;
                }
                Ok(next) => phase = next,
                Err(error) => {
                    self.shared.fail(error);
                    break;
                }
            }
        }
        self.shared.report()
    }

    async fn run_phase(
        &self,
        phase: Phase,
        scratch: &mut Scratch,
        abort: &mut watch::Receiver<bool>,
    ) -> Result<Phase, ValidationError> {
        match phase {
            Phase::AssertingChain => self.assert_chain(),
            Phase::ComputingLocalHash => self.compute_local_hash(scratch, abort).await,
            Phase::FetchingRemoteHash => self.fetch_remote_hash(scratch, abort).await,
            Phase::ComparingHashes => self.compare_hashes(scratch),
            Phase::CheckingMerkleRoot => self.check_merkle_root(scratch),
            Phase::CheckingReceipt => self.check_receipt(),
            Phase::CheckingIssuerSignature => self.check_issuer_signature(scratch, abort).await,
            Phase::CheckingAuthenticity => self.check_authenticity(scratch, abort).await,
            Phase::CheckingRevokedStatus => self.check_revoked_status(scratch, abort).await,
            Phase::CheckingExpiration => self.check_expiration(scratch),
            Phase::NotStarted | Phase::Success | Phase::Failure => Ok(phase),
        }
    }

    /// Race an external call against abort.
    async fn external<O>(
        &self,
        abort: &mut watch::Receiver<bool>,
        call: impl Future<Output = O>,
    ) -> Result<O, ValidationError> {
        tokio::select! {
            biased;
            _ = abort.wait_for(|aborted| *aborted) => Err(ValidationError::Aborted),
            out = call => Ok(out),
        }
    }

    fn scheme(&self) -> HashScheme {
        self.credential.generation.hash_scheme()
    }

    fn receipt(&self) -> Result<&Receipt, ValidationError> {
        self.credential
            .receipt
            .as_ref()
            .ok_or(ValidationError::MissingReceipt)
    }

    // ── Phase handlers ───────────────────────────────────────────────

    fn assert_chain(&self) -> Result<Phase, ValidationError> {
        let expected = self.config.network;
        let declared_chain = self
            .credential
            .receipt
            .as_ref()
            .and_then(|r| r.chain.as_deref());
        let found = match declared_chain {
            Some(chain) => Network::from_chain_name(chain),
            None => {
                let address = self
                    .credential
                    .verification
                    .public_key
                    .as_ref()
                    .unwrap_or(&self.credential.recipient.public_address);
                Network::infer_from_address(address)
            }
        };
        if found != Some(expected) {
            return Err(ValidationError::ChainMismatch { expected, found });
        }
        Ok(Phase::ComputingLocalHash)
    }

    async fn compute_local_hash(
        &self,
        scratch: &mut Scratch,
        abort: &mut watch::Receiver<bool>,
    ) -> Result<Phase, ValidationError> {
        let hash = match self.scheme() {
            HashScheme::Legacy => sha256_hex(&self.credential.raw),
            HashScheme::ReceiptSigned | HashScheme::AnchoredProfile => {
                let bytes = self.hashed_document()?;
                let canonical = self
                    .external(abort, self.services.canonicalizer.normalize(&bytes))
                    .await??;
                sha256_hex(canonical.as_bytes())
            }
        };
        tracing::debug!(local_hash = %hash, "local hash computed");
        scratch.local_hash = Some(hash);
        Ok(Phase::FetchingRemoteHash)
    }

    /// The serialized part of the document that the issuer hashed: the
    /// embedded `document` for 1.2, everything but `signature` for 2.x.
    fn hashed_document(&self) -> Result<Vec<u8>, ValidationError> {
        let mut value: Value = serde_json::from_slice(&self.credential.raw)
            .map_err(|e| ValidationError::Serialization(e.to_string()))?;
        let hashed = match self.scheme() {
            HashScheme::ReceiptSigned => value
                .get("document")
                .cloned()
                .ok_or_else(|| ValidationError::Serialization("no embedded document".into()))?,
            _ => {
                let object = value.as_object_mut().ok_or_else(|| {
                    ValidationError::Serialization("document is not an object".into())
                })?;
                object.remove("signature");
                value
            }
        };
        serde_json::to_vec(&hashed).map_err(|e| ValidationError::Serialization(e.to_string()))
    }

    async fn fetch_remote_hash(
        &self,
        scratch: &mut Scratch,
        abort: &mut watch::Receiver<bool>,
    ) -> Result<Phase, ValidationError> {
        let transaction_id = self
            .config
            .transaction_id
            .as_deref()
            .or_else(|| self.credential.transaction_id())
            .ok_or(ValidationError::MissingTransactionId)?
            .to_string();

        let data = self
            .external(
                abort,
                self.services
                    .transactions
                    .fetch_transaction(self.config.network, &transaction_id),
            )
            .await??;

        if self.scheme() == HashScheme::AnchoredProfile && data.signer_address.is_none() {
            return Err(ValidationError::MissingSignerAddress(transaction_id));
        }
        tracing::debug!(
            %transaction_id,
            remote_hash = %data.op_return_hash,
            spent = data.spent_addresses.len(),
            "transaction fetched"
        );
        scratch.transaction = Some(data);
        Ok(Phase::ComparingHashes)
    }

    fn compare_hashes(&self, scratch: &Scratch) -> Result<Phase, ValidationError> {
        let local = scratch.local_hash.clone().unwrap_or_default();
        let (expected, next) = match self.scheme() {
            HashScheme::Legacy => (
                scratch.transaction()?.op_return_hash.clone(),
                Phase::CheckingIssuerSignature,
            ),
            _ => (self.receipt()?.target_hash.clone(), Phase::CheckingMerkleRoot),
        };
        if !hex_eq(&local, &expected) {
            return Err(ValidationError::HashMismatch { local, expected });
        }
        Ok(next)
    }

    fn check_merkle_root(&self, scratch: &Scratch) -> Result<Phase, ValidationError> {
        let merkle_root = &self.receipt()?.merkle_root;
        let remote = &scratch.transaction()?.op_return_hash;
        if !hex_eq(merkle_root, remote) {
            return Err(ValidationError::MerkleRootMismatch {
                merkle_root: merkle_root.clone(),
                remote: remote.clone(),
            });
        }
        Ok(Phase::CheckingReceipt)
    }

    fn check_receipt(&self) -> Result<Phase, ValidationError> {
        if !bcv_crypto::verify(self.receipt()?) {
            return Err(ValidationError::MerkleProofInvalid);
        }
        Ok(match self.scheme() {
            HashScheme::AnchoredProfile => Phase::CheckingAuthenticity,
            _ => Phase::CheckingIssuerSignature,
        })
    }

    async fn fetch_issuer(
        &self,
        abort: &mut watch::Receiver<bool>,
    ) -> Result<Issuer, ValidationError> {
        let url = &self.credential.issuer.id;
        let profile = self
            .external(abort, self.services.fetcher.fetch_json(url))
            .await??;
        let issuer = parse_issuer_value(&profile).map_err(ValidationError::IssuerProfile)?;
        tracing::debug!(
            issuer = %issuer.name,
            version = %issuer.version,
            keys = issuer.issuer_keys.len(),
            "issuer profile fetched"
        );
        Ok(issuer)
    }

    async fn check_issuer_signature(
        &self,
        scratch: &mut Scratch,
        abort: &mut watch::Receiver<bool>,
    ) -> Result<Phase, ValidationError> {
        let issuer = self.fetch_issuer(abort).await?;
        // 1.x profiles list flat keys; their dates do not bound validity.
        let Some(first_key) = issuer.issuer_keys.first() else {
            return Err(ValidationError::KeyNotFound("issuer profile lists no issuing key".into()));
        };
        let expected = first_key.key.to_string();
        let revocation_keys: Vec<BlockchainAddress> =
            issuer.revocation_keys.iter().map(|e| e.key.clone()).collect();

        let signature = self
            .credential
            .signature
            .as_deref()
            .ok_or(ValidationError::MissingSignature)?;
        let attribute = &self.credential.verification.signed_attribute;
        let message = match attribute.as_str() {
            "uid" => self.credential.assertion.uid.as_str(),
            other => return Err(ValidationError::UnsupportedSignedAttribute(other.to_string())),
        };

        let recovered = self
            .services
            .recovery
            .recover_address(message, signature, self.config.network)
            .ok_or(ValidationError::SignatureNotRecovered)?;
        if is_authorized_address(&issuer.issuer_keys, &recovered).is_none() {
            return Err(ValidationError::SignatureMismatch {
                expected,
                recovered: recovered.to_string(),
            });
        }

        scratch.revocation_keys = revocation_keys;
        scratch.issuer = Some(issuer);
        Ok(Phase::CheckingRevokedStatus)
    }

    async fn check_authenticity(
        &self,
        scratch: &mut Scratch,
        abort: &mut watch::Receiver<bool>,
    ) -> Result<Phase, ValidationError> {
        let issuer = self.fetch_issuer(abort).await?;
        let transaction = scratch.transaction()?;
        let signer = transaction
            .signer_address
            .as_ref()
            .ok_or_else(|| ValidationError::MissingSignerAddress(String::new()))?;
        let at = transaction.timestamp;

        let entry = is_authorized_address(&issuer.issuer_keys, signer)
            .ok_or_else(|| ValidationError::KeyNotFound(signer.to_string()))?;
        if at < entry.effective_from {
            return Err(ValidationError::KeyTemporallyInvalid {
                key: entry.key.to_string(),
                at,
                detail: format!("key not valid before {}", entry.effective_from),
            });
        }
        if let Some(revoked_at) = entry.revoked_at {
            if at >= revoked_at {
                return Err(ValidationError::KeyTemporallyInvalid {
                    key: entry.key.to_string(),
                    at,
                    detail: format!("key revoked at {revoked_at}"),
                });
            }
        }

        scratch.key_expires_at = entry.expires_at;
        scratch.issuer = Some(issuer);
        Ok(Phase::CheckingRevokedStatus)
    }

    async fn check_revoked_status(
        &self,
        scratch: &mut Scratch,
        abort: &mut watch::Receiver<bool>,
    ) -> Result<Phase, ValidationError> {
        if self.scheme() != HashScheme::AnchoredProfile {
            if scratch.revocation_keys.is_empty() {
                return Ok(Phase::Success);
            }
            let spent = &scratch.transaction()?.spent_addresses;
            if let Some(revocation_key) = scratch.revocation_keys.iter().find(|key| spent.contains(*key)) {
                return Err(ValidationError::RevokedCredential {
                    reason: format!("issuer revocation key {revocation_key} has been spent"),
                });
            }
            if let Some(address) = &self.credential.recipient.revocation_address {
                if spent.contains(address) {
                    return Err(ValidationError::RevokedCredential {
                        reason: format!("recipient revocation address {address} has been spent"),
                    });
                }
            }
            return Ok(Phase::Success);
        }

        let list_url = scratch
            .issuer
            .as_ref()
            .and_then(|issuer| issuer.revocation_list.clone())
            .or_else(|| self.credential.issuer.revocation_list.clone());
        let Some(list_url) = list_url else {
            return Ok(Phase::CheckingExpiration);
        };

        let list = self
            .external(abort, self.services.fetcher.fetch_json(&list_url))
            .await??;
        let list = RevocationList::from_value(&list).map_err(ValidationError::RevocationList)?;
        if let Some(entry) = list.find(&self.credential.id) {
            return Err(ValidationError::RevokedCredential {
                reason: entry
                    .revocation_reason
                    .clone()
                    .unwrap_or_else(|| "no reason given".to_string()),
            });
        }
        Ok(Phase::CheckingExpiration)
    }

    fn check_expiration(&self, scratch: &Scratch) -> Result<Phase, ValidationError> {
        let Some(expires_at) = scratch.key_expires_at else {
            return Ok(Phase::Success);
        };
        let at = scratch.transaction()?.timestamp;
        if at > expires_at || self.config.now() > expires_at {
            return Err(ValidationError::ExpiredKey { expires_at });
        }
        Ok(Phase::Success)
    }
}

impl<C, R, T, F> std::fmt::Debug for Pipeline<C, R, T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("credential", &self.credential.id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
