//! Server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: database, migrations, default
//! admin, application services, background sweeps, REST API and graceful
//! shutdown.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::identity::AdminAccount;
use crate::application::{
    create_event_bus, start_sweeps, AppServices, PaymentGateway, ServiceSettings,
};
use crate::config::AppConfig;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::payment::{PayOsClient, UnconfiguredGateway};
use crate::infrastructure::init_database;
use crate::interfaces::http::modules::metrics::{install_recorder, MetricsState};
use crate::interfaces::http::{create_api_router, ApiState};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the service.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Create the configured admin account if missing (default: true).
    pub create_default_admin: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            create_default_admin: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running service.
pub struct ServerHandle {
    pub services: AppServices,
    pub config: AppConfig,
    /// API port the server is listening on.
    pub api_port: u16,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: JoinHandle<()>,
    sweep_tasks: Vec<JoinHandle<()>>,
}

impl ServerHandle {
    /// Start the service with the given options.
    ///
    /// 1. Connect to the database and run migrations
    /// 2. Create the default admin (if enabled)
    /// 3. Wire the payment gateway and application services
    /// 4. Start the background sweeps
    /// 5. Start the REST API (with Swagger UI and `/metrics`)
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting EV swap service...");

        // ── Database ───────────────────────────────────────────
        let db = init_database(&app_cfg.database_config()).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        // ── Payment gateway ────────────────────────────────────
        let payos = app_cfg.payos_config();
        let gateway: Arc<dyn PaymentGateway> = if payos.is_configured() {
            info!(base_url = %payos.base_url, "PayOS gateway configured");
            Arc::new(PayOsClient::new(payos)?)
        } else {
            warn!("PayOS credentials missing; payment links will not be issued");
            Arc::new(UnconfiguredGateway)
        };

        // ── Services ───────────────────────────────────────────
        let events = create_event_bus();
        let jwt = app_cfg.jwt_config();
        info!(
            expiration_hours = app_cfg.security.jwt_expiration_hours,
            "JWT configured"
        );
        let services = AppServices::new(
            db.clone(),
            events,
            gateway,
            ServiceSettings {
                booking: app_cfg.booking_policy(),
                checkout: app_cfg.checkout_urls(),
                jwt,
                qr_login: app_cfg.qr_login_config(),
                scorer: app_cfg.health_scorer(),
            },
        );

        if opts.create_default_admin {
            create_default_admin(&services, &app_cfg).await;
        }

        // ── Background sweeps ──────────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();
        let sweep_tasks = start_sweeps(&services, &app_cfg.sweep_intervals(), &shutdown_signal);

        // ── REST API server ────────────────────────────────────
        // The global recorder installs once per process; a restart in the
        // same process serves without /metrics.
        let metrics = install_recorder().map(|handle| MetricsState { handle });
        let api_router = create_api_router(ApiState::new(services.clone(), db.clone()), metrics);

        let api_port = app_cfg.server.api_port;
        let api_addr = app_cfg.server.address();
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        info!("REST API server listening on http://{}", api_addr);
        info!("Swagger UI available at http://{}/swagger-ui/", api_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            services,
            config: app_cfg,
            api_port,
            db,
            shutdown,
            api_task,
            sweep_tasks,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to fully stop after shutdown has been triggered.
    /// In-flight requests and sweep passes get `shutdown_timeout` seconds.
    pub async fn wait(self) {
        info!("Waiting for server tasks to complete...");

        let Self {
            db,
            shutdown,
            api_task,
            sweep_tasks,
            ..
        } = self;

        let finished = shutdown
            .shutdown_with_cleanup(|| async move {
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API server task panicked: {}", e),
                }
                for task in sweep_tasks {
                    if let Err(e) = task.await {
                        error!("Sweep task panicked: {}", e);
                    }
                }
            })
            .await;
        if !finished {
            warn!("Some tasks did not stop in time");
        }

        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }

        info!("EV swap service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down EV swap service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

async fn create_default_admin(services: &AppServices, app_cfg: &AppConfig) {
    let admin = AdminAccount {
        email: app_cfg.admin.email.clone(),
        password: app_cfg.admin.password.clone(),
        full_name: app_cfg.admin.full_name.clone(),
    };
    match services.auth.ensure_default_admin(&admin).await {
        Ok(true) => warn!(email = %admin.email, "Default admin created; change its password"),
        Ok(false) => {}
        Err(e) => error!(error = %e, "Failed to create default admin"),
    }
}

/// Initialize tracing from the application config. `RUST_LOG` overrides
/// the configured level.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
