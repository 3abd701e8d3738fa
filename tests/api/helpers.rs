use hpp_race_probe::configuration::{Settings, get_configuration};
use hpp_race_probe::gateway::HostedPaymentSdk;
use hpp_race_probe::startup::Application;
use hpp_race_probe::telemetry::{get_subscriber, init_subscriber};
use std::sync::{Arc, LazyLock};

// Ensure that the `tracing` stack is only initialised once using `LazyLock`
static TRACING: LazyLock<()> = LazyLock::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    // The sink is part of the type returned by `get_subscriber`, hence the two branches.
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}{}", &self.address, path))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_race_test_page(&self) -> reqwest::Response {
        self.get("/debug/realex-race-test").await
    }

    pub async fn get_race_test_api(&self) -> reqwest::Response {
        self.get("/debug/realex-race-test/api").await
    }

    pub async fn get_concurrent_race_test(&self, requests: usize) -> reqwest::Response {
        self.get(&format!(
            "/debug/realex-race-test/api/concurrent?requests={}",
            requests
        ))
        .await
    }
}

/// Randomised configuration so that every test gets its own port.
pub fn test_configuration() -> Settings {
    let mut c = get_configuration().expect("Failed to read configuration.");
    // Use a random OS port
    c.application.port = 0;
    c.application.host = "127.0.0.1".into();
    c
}

/// Spawns the application with the SDK selected by `configuration`.
pub async fn spawn_app_with_configuration(configuration: Settings) -> TestApp {
    LazyLock::force(&TRACING);

    let application = Application::build(configuration)
        .await
        .expect("Failed to build application.");
    launch(application)
}

/// Spawns the application on top of an injected SDK double.
pub async fn spawn_app_with_sdk(sdk: Arc<dyn HostedPaymentSdk>) -> TestApp {
    LazyLock::force(&TRACING);

    let application = Application::build_with_sdk(test_configuration(), sdk)
        .await
        .expect("Failed to build application.");
    launch(application)
}

fn launch(application: Application) -> TestApp {
    let address = format!("http://127.0.0.1:{}", application.port());

    #[allow(clippy::let_underscore_future)]
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address,
        api_client: reqwest::Client::new(),
    }
}
