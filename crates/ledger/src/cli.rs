use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::{debug, info, warn};
use shared::balance::InMemoryBalances;
use url::Url;

use crate::{
    start_server, AppState, HttpInferenceExecutor, InferenceDispatcher, LedgerConfig,
    LedgerContext, ModelCatalog,
};

#[derive(Parser)]
pub struct Cli {
    /// Bind address
    #[arg(short = 'e', long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port
    #[arg(short = 'p', long, default_value = "8095")]
    pub port: u16,

    /// Path to a TOML config file (admin, treasury, policy, catalog, opening balances)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Admin api key
    #[arg(short = 'a', long, default_value = "admin")]
    pub admin_api_key: String,

    /// Base URL of the inference service. Without it `/inference` answers 503.
    #[arg(short = 'i', long)]
    pub inference_url: Option<String>,

    /// Inference request timeout in seconds
    #[arg(long, default_value = "30")]
    pub inference_timeout: u64,

    /// Log level
    #[arg(short = 'l', long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = match &self.config {
            Some(path) => {
                info!("Loading config from {}", path.display());
                LedgerConfig::load(path)?
            }
            None => {
                warn!("No config file given, using defaults");
                LedgerConfig::default()
            }
        };
        debug!("Policy: {:?}", config.policy);

        let balances = Arc::new(InMemoryBalances::with_balances(config.opening_balances()));
        let ledger = Arc::new(LedgerContext::new(
            config.policy,
            config.admin,
            config.treasury,
            config.reregistration,
            balances,
        ));
        let admin = ledger.policy.admin();
        info!(
            "Ledger ready: admin {admin}, treasury {}, min stake {}, fee rate {} bps",
            ledger.settlement.treasury(),
            config.policy.min_node_stake,
            config.policy.platform_fee_rate_bps
        );

        let dispatcher = match &self.inference_url {
            Some(raw) => {
                let base_url: Url = raw.parse()?;
                let executor = HttpInferenceExecutor::new(
                    &base_url,
                    Duration::from_secs(self.inference_timeout),
                )?;
                info!("Forwarding inference to {base_url}");
                Some(Arc::new(InferenceDispatcher::new(
                    ledger.registry.clone(),
                    Arc::new(executor),
                )))
            }
            None => None,
        };

        let app_state = AppState {
            ledger,
            catalog: Arc::new(ModelCatalog::new(config.models)),
            dispatcher,
        };

        start_server(
            &self.host,
            self.port,
            app_state,
            self.admin_api_key,
            admin,
        )
        .await
    }
}
