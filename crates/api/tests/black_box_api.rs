use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use microbank_accounts::{AccountService, CustomerDetails, InMemoryAccountService, NewCustomer};
use microbank_api::app::{self, AppServices};
use microbank_api::config::AppConfig;
use microbank_core::{DomainError, DomainResult, MobileNumber};
use reqwest::StatusCode;
use serde_json::{json, Value};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(accounts: Arc<dyn AccountService>, config: &AppConfig) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = app::build_app(
            AppServices::new(accounts, config),
            config.server.request_timeout(),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn in_memory() -> Self {
        Self::spawn(Arc::new(InMemoryAccountService::new()), &test_config()).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.build.version = "1.4.2".to_string();
    config.runtime_home = Some("/usr/lib/jvm/temurin-21".to_string());
    config
}

/// Wraps the in-memory service and counts every call that reaches it.
#[derive(Default)]
struct CountingService {
    inner: InMemoryAccountService,
    calls: AtomicUsize,
}

impl CountingService {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl AccountService for CountingService {
    fn create_account(&self, customer: NewCustomer) -> DomainResult<CustomerDetails> {
        self.hit();
        self.inner.create_account(customer)
    }

    fn fetch_account(&self, mobile_number: &MobileNumber) -> DomainResult<CustomerDetails> {
        self.hit();
        self.inner.fetch_account(mobile_number)
    }

    fn update_account(&self, details: CustomerDetails) -> DomainResult<bool> {
        self.hit();
        self.inner.update_account(details)
    }

    fn delete_account(&self, mobile_number: &MobileNumber) -> DomainResult<bool> {
        self.hit();
        self.inner.delete_account(mobile_number)
    }
}

/// Every call fails the way a broken backing store would.
struct BrokenService;

impl AccountService for BrokenService {
    fn create_account(&self, _: NewCustomer) -> DomainResult<CustomerDetails> {
        Err(DomainError::unexpected("database unavailable"))
    }

    fn fetch_account(&self, _: &MobileNumber) -> DomainResult<CustomerDetails> {
        Err(DomainError::unexpected("database unavailable"))
    }

    fn update_account(&self, _: CustomerDetails) -> DomainResult<bool> {
        Err(DomainError::unexpected("database unavailable"))
    }

    fn delete_account(&self, _: &MobileNumber) -> DomainResult<bool> {
        Err(DomainError::unexpected("database unavailable"))
    }
}

/// Blocks every call for longer than the router's request timeout.
struct SlowService {
    delay: Duration,
    inner: InMemoryAccountService,
}

impl SlowService {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: InMemoryAccountService::new(),
        }
    }
}

impl AccountService for SlowService {
    fn create_account(&self, customer: NewCustomer) -> DomainResult<CustomerDetails> {
        std::thread::sleep(self.delay);
        self.inner.create_account(customer)
    }

    fn fetch_account(&self, mobile_number: &MobileNumber) -> DomainResult<CustomerDetails> {
        std::thread::sleep(self.delay);
        self.inner.fetch_account(mobile_number)
    }

    fn update_account(&self, details: CustomerDetails) -> DomainResult<bool> {
        std::thread::sleep(self.delay);
        self.inner.update_account(details)
    }

    fn delete_account(&self, mobile_number: &MobileNumber) -> DomainResult<bool> {
        std::thread::sleep(self.delay);
        self.inner.delete_account(mobile_number)
    }
}

fn jane() -> Value {
    json!({ "name": "Jane Doe", "email": "jane@x.com", "mobileNumber": "9876543210" })
}

async fn update(client: &reqwest::Client, srv: &TestServer, body: &Value) -> reqwest::Response {
    client
        .put(srv.url("/api/update"))
        .json(body)
        .send()
        .await
        .unwrap()
}

async fn fetch_json(client: &reqwest::Client, srv: &TestServer, mobile: &str) -> Value {
    client
        .get(srv.url(&format!("/api/fetch/{mobile}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn create(client: &reqwest::Client, srv: &TestServer, body: &Value) -> reqwest::Response {
    client
        .post(srv.url("/api/create"))
        .json(body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn create_returns_fixed_created_envelope() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    let res = create(&client, &srv, &jane()).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "statusCode": "201", "statusMessage": "Account created successfully" })
    );
}

#[tokio::test]
async fn fetch_after_create_returns_customer_with_account() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();
    assert_eq!(create(&client, &srv, &jane()).await.status(), StatusCode::CREATED);

    let res = client
        .get(srv.url("/api/fetch/9876543210"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Jane Doe");
    assert_eq!(body["email"], "jane@x.com");
    assert_eq!(body["mobileNumber"], "9876543210");
    assert!(body["account"]["accountNumber"].as_u64().is_some());
    assert_eq!(body["account"]["accountType"], "Savings");
}

#[tokio::test]
async fn duplicate_create_is_a_client_error() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();
    assert_eq!(create(&client, &srv, &jane()).await.status(), StatusCode::CREATED);

    let res = create(&client, &srv, &jane()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["apiPath"], "/api/create");
    assert_eq!(body["statusCode"], "400");
    assert!(body["errorMessage"].as_str().unwrap().contains("9876543210"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn create_with_invalid_fields_reports_each_field() {
    let counting = Arc::new(CountingService::default());
    let srv = TestServer::spawn(counting.clone(), &test_config()).await;
    let client = reqwest::Client::new();

    let res = create(
        &client,
        &srv,
        &json!({ "name": "", "email": "nope", "mobileNumber": "98765" }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["fieldErrors"]["mobileNumber"], "Mobile number must be 10 digits");
    assert!(body["fieldErrors"]["email"].is_string());
    assert!(body["fieldErrors"]["name"].is_string());
    assert_eq!(counting.calls(), 0);
}

#[tokio::test]
async fn malformed_json_is_rejected_with_error_envelope() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/api/create"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["statusCode"], "400");
}

#[tokio::test]
async fn fetch_unknown_mobile_is_not_found() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/api/fetch/1111111111"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["statusCode"], "404");
    assert_eq!(
        body["errorMessage"],
        "Customer not found with the given input data mobileNumber : '1111111111'"
    );
}

#[tokio::test]
async fn fetch_with_malformed_mobile_is_rejected_before_dispatch() {
    let counting = Arc::new(CountingService::default());
    let srv = TestServer::spawn(counting.clone(), &test_config()).await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/api/fetch/12ab")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(counting.calls(), 0);
}

#[tokio::test]
async fn update_of_unknown_account_is_expectation_failed() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    let res = client
        .put(srv.url("/api/update"))
        .json(&json!({
            "name": "Jane Doe",
            "email": "jane@x.com",
            "mobileNumber": "9876543210",
            "account": {
                "accountNumber": 9999999999u64,
                "accountType": "Savings",
                "branchAddress": "123 Main Street, New York"
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::EXPECTATION_FAILED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "statusCode": "417",
            "statusMessage": "Update operation failed. Please try again or contact Dev team"
        })
    );
}

#[tokio::test]
async fn update_twice_with_same_payload_keeps_same_state() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();
    assert_eq!(create(&client, &srv, &jane()).await.status(), StatusCode::CREATED);

    let mut fetched: Value = client
        .get(srv.url("/api/fetch/9876543210"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    fetched["name"] = json!("Jane Smith");
    fetched["account"]["branchAddress"] = json!("1 Harbour Road, Boston");

    let mut states = Vec::new();
    for _ in 0..2 {
        let res = client
            .put(srv.url("/api/update"))
            .json(&fetched)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert_eq!(
            body,
            json!({ "statusCode": "200", "statusMessage": "Request processed successfully" })
        );

        let state: Value = client
            .get(srv.url("/api/fetch/9876543210"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        states.push(state);
    }

    assert_eq!(states[0], fetched);
    assert_eq!(states[0], states[1]);
}

#[tokio::test]
async fn delete_twice_succeeds_then_expectation_failed() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();
    assert_eq!(create(&client, &srv, &jane()).await.status(), StatusCode::CREATED);

    let first = client
        .delete(srv.url("/api/delete/9876543210"))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = client
        .delete(srv.url("/api/delete/9876543210"))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::EXPECTATION_FAILED);
    let body: Value = second.json().await.unwrap();
    assert_eq!(
        body["statusMessage"],
        "Delete operation failed. Please try again or contact Dev team"
    );
}

#[tokio::test]
async fn delete_with_short_mobile_never_reaches_service() {
    let counting = Arc::new(CountingService::default());
    let srv = TestServer::spawn(counting.clone(), &test_config()).await;
    let client = reqwest::Client::new();

    let res = client
        .delete(srv.url("/api/delete/1234"))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_client_error());
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["fieldErrors"]["mobileNumber"], "Mobile number must be 10 digits");
    assert_eq!(counting.calls(), 0);
}

#[tokio::test]
async fn service_failure_maps_to_generic_500() {
    let srv = TestServer::spawn(Arc::new(BrokenService), &test_config()).await;
    let client = reqwest::Client::new();

    let res = client
        .delete(srv.url("/api/delete/9876543210"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["statusCode"], "500");
    assert_eq!(
        body["errorMessage"],
        "An error occurred. Please try again or contact Dev team"
    );
    assert!(!body.to_string().contains("database unavailable"));
}

#[tokio::test]
async fn metadata_endpoints_serve_startup_config() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    let version = client.get(srv.url("/api/version")).send().await.unwrap();
    assert_eq!(version.status(), StatusCode::OK);
    assert_eq!(version.text().await.unwrap(), "1.4.2");

    let home = client.get(srv.url("/api/java-version")).send().await.unwrap();
    assert_eq!(home.status(), StatusCode::OK);
    assert_eq!(home.text().await.unwrap(), "/usr/lib/jvm/temurin-21");

    let health = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn contact_info_is_unaffected_by_mutations() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();
    let expected = serde_json::to_value(test_config().contact).unwrap();

    let before: Value = client
        .get(srv.url("/api/getcontactinfo"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(before, expected);

    create(&client, &srv, &jane()).await;
    client
        .delete(srv.url("/api/delete/9876543210"))
        .send()
        .await
        .unwrap();

    let res = client
        .get(srv.url("/api/getcontactinfo"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let after: Value = res.json().await.unwrap();
    assert_eq!(after, expected);
    assert!(after["onCallSupport"].is_array());
}

#[tokio::test]
async fn concurrent_creates_for_distinct_mobiles_all_succeed() {
    let srv = Arc::new(TestServer::in_memory().await);
    let client = reqwest::Client::new();

    let mut tasks = Vec::new();
    for i in 0..16u64 {
        let client = client.clone();
        let url = srv.url("/api/create");
        tasks.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({
                    "name": format!("Customer {i}"),
                    "email": format!("c{i}@x.com"),
                    "mobileNumber": format!("{}", 9_000_000_000u64 + i),
                }))
                .timeout(Duration::from_secs(5))
                .send()
                .await
                .unwrap()
                .status()
        }));
    }
    for t in tasks {
        assert_eq!(t.await.unwrap(), StatusCode::CREATED);
    }

    let res = client
        .get(srv.url("/api/fetch/9000000015"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn update_without_account_section_is_expectation_failed() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();
    assert_eq!(create(&client, &srv, &jane()).await.status(), StatusCode::CREATED);

    let res = update(&client, &srv, &json!({ "name": "Jane Smith", "email": "jane@x.com", "mobileNumber": "9876543210" })).await;
    assert_eq!(res.status(), StatusCode::EXPECTATION_FAILED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["statusCode"], "417");
    assert_eq!(
        body["statusMessage"],
        "Update operation failed. Please try again or contact Dev team"
    );

    // Nothing was written.
    assert_eq!(fetch_json(&client, &srv, "9876543210").await["name"], "Jane Doe");
}

#[tokio::test]
async fn update_onto_another_customers_mobile_is_rejected() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();
    assert_eq!(create(&client, &srv, &jane()).await.status(), StatusCode::CREATED);
    let john = json!({ "name": "John Roe", "email": "john@x.com", "mobileNumber": "9123456789" });
    assert_eq!(create(&client, &srv, &john).await.status(), StatusCode::CREATED);

    let mut moved = fetch_json(&client, &srv, "9123456789").await;
    moved["mobileNumber"] = json!("9876543210");

    let res = update(&client, &srv, &moved).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["apiPath"], "/api/update");
    assert_eq!(body["statusCode"], "400");
    assert!(body["errorMessage"].as_str().unwrap().contains("already registered"));

    assert_eq!(fetch_json(&client, &srv, "9123456789").await["name"], "John Roe");
    assert_eq!(fetch_json(&client, &srv, "9876543210").await["name"], "Jane Doe");
}

#[tokio::test]
async fn update_with_invalid_fields_never_reaches_service() {
    let counting = Arc::new(CountingService::default());
    let srv = TestServer::spawn(counting.clone(), &test_config()).await;
    let client = reqwest::Client::new();

    let res = update(
        &client,
        &srv,
        &json!({
            "name": " ",
            "email": "jane.x.com",
            "mobileNumber": "98765",
            "account": { "accountType": "", "branchAddress": "123 Main Street, New York" }
        }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    for field in ["name", "email", "mobileNumber", "accountNumber", "accountType"] {
        assert!(body["fieldErrors"][field].is_string(), "missing field error for {field}");
    }
    assert_eq!(counting.calls(), 0);
}

#[tokio::test]
async fn update_with_non_json_content_type_is_bad_request() {
    let counting = Arc::new(CountingService::default());
    let srv = TestServer::spawn(counting.clone(), &test_config()).await;
    let client = reqwest::Client::new();

    let res = client
        .put(srv.url("/api/update"))
        .header("content-type", "text/plain")
        .body(jane().to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["apiPath"], "/api/update");
    assert_eq!(body["statusCode"], "400");
    assert_eq!(counting.calls(), 0);
}

#[tokio::test]
async fn padded_name_round_trips_and_padded_email_is_rejected() {
    let srv = TestServer::in_memory().await;
    let client = reqwest::Client::new();

    let padded_email = json!({ "name": "Jane Doe", "email": " jane@x.com", "mobileNumber": "9876543210" });
    let res = create(&client, &srv, &padded_email).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["fieldErrors"]["email"], "Email address should be a valid value");

    let padded_name = json!({ "name": "  Jane Doe ", "email": "jane@x.com", "mobileNumber": "9876543210" });
    assert_eq!(create(&client, &srv, &padded_name).await.status(), StatusCode::CREATED);
    let fetched = fetch_json(&client, &srv, "9876543210").await;
    assert_eq!(fetched["name"], "  Jane Doe ");
    assert_eq!(fetched["email"], "jane@x.com");
}

#[tokio::test]
async fn slow_service_call_times_out_with_gateway_timeout() {
    let mut config = test_config();
    config.server.request_timeout_secs = 1;
    let srv = TestServer::spawn(Arc::new(SlowService::new(Duration::from_secs(3))), &config).await;
    let client = reqwest::Client::new();

    let started = Instant::now();
    let res = create(&client, &srv, &jane()).await;
    let elapsed = started.elapsed();

    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
    assert!(elapsed < Duration::from_secs(3), "timed out only after {elapsed:?}");
}

/// Panics inside the service; the panic stays on the blocking pool.
struct PanickingService;

impl AccountService for PanickingService {
    fn create_account(&self, _: NewCustomer) -> DomainResult<CustomerDetails> {
        panic!("service bug")
    }

    fn fetch_account(&self, _: &MobileNumber) -> DomainResult<CustomerDetails> {
        panic!("service bug")
    }

    fn update_account(&self, _: CustomerDetails) -> DomainResult<bool> {
        panic!("service bug")
    }

    fn delete_account(&self, _: &MobileNumber) -> DomainResult<bool> {
        panic!("service bug")
    }
}

#[tokio::test]
async fn panicking_service_maps_to_generic_500() {
    let srv = TestServer::spawn(Arc::new(PanickingService), &test_config()).await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/api/fetch/9876543210"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["apiPath"], "/api/fetch/9876543210");
    assert_eq!(
        body["errorMessage"],
        "An error occurred. Please try again or contact Dev team"
    );
}
