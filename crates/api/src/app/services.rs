//! Infrastructure wiring: one store shared by provisioning, alerting and the
//! seeding endpoints.

use std::sync::Arc;

use stockwatch_alerts::LowStockEvaluator;
use stockwatch_infra::{
    AppConfig, CatalogStore, InMemoryStore, ProductProvisioner, SalesLedger, SalesOracle, StoreError,
};

pub type DynCatalog = Arc<dyn CatalogStore>;
pub type DynLedger = Arc<dyn SalesLedger>;
pub type DynOracle = Arc<SalesOracle<DynLedger>>;

pub struct AppServices {
    pub catalog: DynCatalog,
    pub ledger: DynLedger,
    pub provisioner: ProductProvisioner<DynCatalog>,
    pub evaluator: LowStockEvaluator<DynCatalog, DynOracle, DynOracle>,
}

impl AppServices {
    /// Wire services over a store that serves both the catalog and the ledger.
    pub fn over<S>(store: Arc<S>, config: &AppConfig) -> Self
    where
        S: CatalogStore + SalesLedger + 'static,
    {
        let catalog: DynCatalog = store.clone();
        let ledger: DynLedger = store;
        let oracle: DynOracle = Arc::new(SalesOracle::new(ledger.clone(), config.sales_window));

        let provisioner = ProductProvisioner::new(catalog.clone())
            .with_defaults(config.provision_defaults)
            .with_sku_scope(config.sku_scope);
        let evaluator = LowStockEvaluator::new(catalog.clone(), oracle.clone(), oracle)
            .with_window(config.sales_window);

        Self {
            catalog,
            ledger,
            provisioner,
            evaluator,
        }
    }
}

pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    if let Some(db) = &config.database {
        #[cfg(feature = "postgres")]
        {
            let store = stockwatch_infra::store::PostgresStore::connect(
                &db.url,
                db.max_connections,
                db.acquire_timeout,
            )
            .await?;
            store.migrate().await?;
            tracing::info!(max_connections = db.max_connections, "using postgres stores");
            return Ok(AppServices::over(Arc::new(store), config));
        }
        #[cfg(not(feature = "postgres"))]
        {
            let _ = db;
            tracing::warn!(
                "USE_PERSISTENT_STORES=true but postgres feature not enabled, falling back to in-memory"
            );
        }
    }

    tracing::info!("using in-memory stores");
    Ok(AppServices::over(Arc::new(InMemoryStore::new()), config))
}
