//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::notifier::LogNotifier;
use crate::adapter::outbound::sqlite::{create_pool, enable_wal, run_migrations, SqliteLedger};
use crate::adapter::outbound::wallet::{HttpPaymentGateway, ESCROW_PASSWORD_ENV};
use crate::application::allocation::AllocationEngine;
use crate::application::confirmation::ConfirmationService;
use crate::application::coverage::CoverageLedger;
use crate::application::maintenance::Maintenance;
use crate::application::query::LedgerQuery;
use crate::application::resolution::{ResolutionService, VerifierRegistry};
use crate::application::seeding::SeedingService;
use crate::application::settlement::SettlementService;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::ledger::LedgerStore;
use crate::port::outbound::notifier::NotifierRegistry;
use crate::port::outbound::payment::PaymentGateway;

/// Build notifier registry from configuration.
pub(crate) fn build_notifier_registry() -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));
    registry
}

/// Build the HTTP wallet gateway from the `[wallet]` section.
///
/// # Errors
/// `MissingField` when the base URL, guid, or password is not configured.
pub fn build_payment_gateway(config: &Config) -> Result<Arc<dyn PaymentGateway>> {
    let wallet = &config.wallet;
    if wallet.base_url.is_empty() {
        return Err(ConfigError::MissingField { field: "base_url" }.into());
    }
    if wallet.escrow_guid.is_empty() {
        return Err(ConfigError::MissingField { field: "escrow_guid" }.into());
    }
    let password = wallet.password.clone().ok_or(ConfigError::MissingField {
        field: ESCROW_PASSWORD_ENV,
    })?;
    let gateway = HttpPaymentGateway::new(&wallet.base_url, &wallet.escrow_guid, password, wallet.timeout())?;
    Ok(Arc::new(gateway))
}

/// Shared collaborators every service is built from.
///
/// Cheap to clone; all fields are reference counted.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn LedgerStore>,
    verifiers: Arc<VerifierRegistry>,
    notifiers: Arc<NotifierRegistry>,
}

impl Ledger {
    /// Open the configured database, apply migrations, and wire the
    /// default notifiers and verifiers.
    ///
    /// # Errors
    /// Returns an error if the pool cannot be created or a migration fails.
    pub fn open(config: &Config) -> Result<Self> {
        let pool = create_pool(&config.database)?;
        enable_wal(&pool)?;
        run_migrations(&pool)?;
        info!(database = %config.database, "Ledger database ready");

        Ok(Self::from_parts(
            Arc::new(SqliteLedger::new(pool)),
            VerifierRegistry::baseball(),
            build_notifier_registry(),
        ))
    }

    /// Assemble a ledger from explicit parts.
    pub fn from_parts(
        store: Arc<dyn LedgerStore>,
        verifiers: VerifierRegistry,
        notifiers: NotifierRegistry,
    ) -> Self {
        Self {
            store,
            verifiers: Arc::new(verifiers),
            notifiers: Arc::new(notifiers),
        }
    }

    #[must_use]
    pub fn store(&self) -> Arc<dyn LedgerStore> {
        Arc::clone(&self.store)
    }

    #[must_use]
    pub fn allocation(&self) -> AllocationEngine {
        AllocationEngine::new(self.store())
    }

    #[must_use]
    pub fn confirmation(&self) -> ConfirmationService {
        ConfirmationService::new(self.store(), Arc::clone(&self.notifiers))
    }

    #[must_use]
    pub fn coverage(&self) -> CoverageLedger {
        CoverageLedger::new(self.store())
    }

    #[must_use]
    pub fn query(&self) -> LedgerQuery {
        LedgerQuery::new(self.store())
    }

    #[must_use]
    pub fn maintenance(&self, config: &Config) -> Maintenance {
        Maintenance::new(self.store(), config.retention.provisional_window())
    }

    #[must_use]
    pub fn resolution(&self) -> ResolutionService {
        ResolutionService::new(self.store(), Arc::clone(&self.verifiers), Arc::clone(&self.notifiers))
    }

    #[must_use]
    pub fn seeding(&self) -> SeedingService {
        SeedingService::new(self.store(), Arc::clone(&self.verifiers), Arc::clone(&self.notifiers))
    }

    /// Settlement service paying through `gateway`.
    ///
    /// # Errors
    /// `InvalidValue` for an out-of-range commission rate.
    pub fn settlement(&self, config: &Config, gateway: Arc<dyn PaymentGateway>) -> Result<SettlementService> {
        Ok(SettlementService::new(
            self.store(),
            gateway,
            Arc::clone(&self.notifiers),
            config.settlement.terms()?,
        ))
    }
}
