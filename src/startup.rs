use crate::configuration::Settings;
use crate::gateway::HostedPaymentSdk;
use crate::openapi::openapi_json;
use crate::routes::{
    RACE_TEST_PATH, health_check, race_test_api, race_test_concurrent, race_test_page,
};
use crate::trial::TrialRunner;
use axum::Router;
use axum::routing::get;
use std::net::TcpListener;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub trials: TrialRunner,
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Builds the application with the SDK selected in the configuration.
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let sdk = configuration.gateway.sdk()?;
        Self::build_with_sdk(configuration, sdk).await
    }

    pub async fn build_with_sdk(
        configuration: Settings,
        sdk: Arc<dyn HostedPaymentSdk>,
    ) -> Result<Self, anyhow::Error> {
        tracing::info!("Using hosted-payment SDK {:?}", sdk);
        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(address)?;
        listener.set_nonblocking(true)?;
        let port = listener.local_addr()?.port();
        let state = AppState {
            trials: TrialRunner::new(sdk, configuration.trial, configuration.gateway),
        };

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        let app = router(self.state);
        let listener = tokio::net::TcpListener::from_std(self.listener)?;
        axum::serve(listener, app).await?;
        Ok(())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health_check", get(health_check))
        .route(RACE_TEST_PATH, get(race_test_page))
        .route(&format!("{}/api", RACE_TEST_PATH), get(race_test_api))
        .route(
            &format!("{}/api/concurrent", RACE_TEST_PATH),
            get(race_test_concurrent),
        )
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
