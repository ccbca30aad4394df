/// Integration tests with mocked collaborators
/// Drives the Lookup-and-Pay controller against a wiremock stand-in for the
/// taxpayer lookup and payment-initiation services
use rust_tax_portal::controller::{LookupOutcome, LookupPayController, PaymentOutcome};
use rust_tax_portal::models::TaxpayerRecord;
use rust_tax_portal::portal_client::PortalClient;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper function to build a controller pointed at the mock server
fn create_controller(mock_server: &MockServer) -> LookupPayController {
    let client = PortalClient::new(&mock_server.uri(), None).unwrap();
    LookupPayController::new(client)
}

fn ana_payload() -> serde_json::Value {
    serde_json::json!({
        "nombre": "Ana Gomez",
        "dni": "30111222",
        "monto_mensual_impuesto": 1500,
        "deuda": 4500,
        "estado_suscripcion": "activa"
    })
}

async fn mount_ana(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/contribuyentes/30111222"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ana_payload()))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_lookup_success_displays_record_verbatim() {
    let mock_server = MockServer::start().await;
    mount_ana(&mock_server).await;

    let controller = create_controller(&mock_server);
    let outcome = controller.lookup("30111222").await;

    assert_eq!(outcome, LookupOutcome::Found);
    let view = controller.view();
    assert!(!view.loading);
    assert!(view.error_message.is_none());
    assert_eq!(
        view.taxpayer,
        Some(TaxpayerRecord {
            national_id: "30111222".to_string(),
            name: "Ana Gomez".to_string(),
            monthly_tax_amount: 1500.0,
            current_debt: 4500.0,
            subscription_status: "activa".to_string(),
            tax_type: None,
        })
    );
}

#[tokio::test]
async fn test_lookup_not_found_sets_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contribuyentes/99999999"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "detail": "Contribuyente no encontrado"
            })),
        )
        .mount(&mock_server)
        .await;

    let controller = create_controller(&mock_server);
    let outcome = controller.lookup("99999999").await;

    assert_eq!(outcome, LookupOutcome::Failed);
    let view = controller.view();
    assert!(!view.loading);
    assert!(view.taxpayer.is_none());
    assert_eq!(
        view.error_message.as_deref(),
        Some("taxpayer not found or server error")
    );
}

#[tokio::test]
async fn test_lookup_undecodable_payload_is_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contribuyentes/30111222"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let controller = create_controller(&mock_server);
    assert_eq!(controller.lookup("30111222").await, LookupOutcome::Failed);
    assert_eq!(
        controller.view().error_message.as_deref(),
        Some("taxpayer not found or server error")
    );
}

#[tokio::test]
async fn test_lookup_transport_failure_is_failure() {
    // Nothing listens on the discard port
    let client = PortalClient::new("http://127.0.0.1:9", None).unwrap();
    let controller = LookupPayController::new(client);

    assert_eq!(controller.lookup("30111222").await, LookupOutcome::Failed);
    let view = controller.view();
    assert!(!view.loading);
    assert_eq!(
        view.error_message.as_deref(),
        Some("taxpayer not found or server error")
    );
}

#[tokio::test]
async fn test_new_lookup_replaces_previous_failure() {
    let mock_server = MockServer::start().await;
    mount_ana(&mock_server).await;
    Mock::given(method("GET"))
        .and(path("/contribuyentes/99999999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let controller = create_controller(&mock_server);
    controller.lookup("99999999").await;
    assert!(controller.view().error_message.is_some());

    controller.lookup("30111222").await;
    let view = controller.view();
    assert!(view.error_message.is_none());
    assert_eq!(view.taxpayer.unwrap().name, "Ana Gomez");
}

#[tokio::test]
async fn test_payment_redirects_to_link() {
    let mock_server = MockServer::start().await;
    mount_ana(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/pagar"))
        .and(query_param("dni", "30111222"))
        .and(query_param("monto", "1500"))
        .and(header("content-type", "application/json"))
        .and(body_string(""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Payment initiated for DNI: 30111222",
            "payment_link": "https://pay.example/abc"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let controller = create_controller(&mock_server);
    controller.lookup("30111222").await;
    let outcome = controller.initiate_payment().await;

    assert_eq!(
        outcome,
        PaymentOutcome::Navigate("https://pay.example/abc".to_string())
    );
    let view = controller.view();
    assert!(!view.loading);
    assert!(view.error_message.is_none());
    assert_eq!(view.navigated_to.as_deref(), Some("https://pay.example/abc"));
}

#[tokio::test]
async fn test_payment_without_link_reports_missing_link() {
    let mock_server = MockServer::start().await;
    mount_ana(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/pagar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let controller = create_controller(&mock_server);
    controller.lookup("30111222").await;
    let outcome = controller.initiate_payment().await;

    assert_eq!(outcome, PaymentOutcome::Failed);
    let view = controller.view();
    assert!(!view.loading);
    assert!(view.navigated_to.is_none());
    assert_eq!(
        view.error_message.as_deref(),
        Some("no payment link received from the processor")
    );
    // The record stays on screen so the user can retry
    assert!(view.taxpayer.is_some());
}

#[tokio::test]
async fn test_payment_server_error_sets_error() {
    let mock_server = MockServer::start().await;
    mount_ana(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/pagar"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let controller = create_controller(&mock_server);
    controller.lookup("30111222").await;
    let outcome = controller.initiate_payment().await;

    assert_eq!(outcome, PaymentOutcome::Failed);
    let view = controller.view();
    assert!(!view.loading);
    assert!(view.navigated_to.is_none());
    assert_eq!(
        view.error_message.as_deref(),
        Some("error initiating payment")
    );
}

#[tokio::test]
async fn test_payment_without_record_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let controller = create_controller(&mock_server);
    let before = controller.view();
    let outcome = controller.initiate_payment().await;

    assert_eq!(outcome, PaymentOutcome::Skipped);
    assert_eq!(controller.view(), before);
}

#[tokio::test]
async fn test_loading_is_visible_while_request_pending() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contribuyentes/30111222"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ana_payload())
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    let controller = Arc::new(create_controller(&mock_server));
    assert!(!controller.view().loading);

    let task = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.lookup("30111222").await })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    let during = controller.view();
    assert!(during.loading);
    assert!(during.taxpayer.is_none());
    assert!(during.error_message.is_none());

    assert_eq!(task.await.unwrap(), LookupOutcome::Found);
    assert!(!controller.view().loading);
}

#[tokio::test]
async fn test_overlapping_lookup_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ana_payload())
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let controller = Arc::new(create_controller(&mock_server));
    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.lookup("30111222").await })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    let second = controller.lookup("30111222").await;

    assert_eq!(second, LookupOutcome::Rejected);
    assert_eq!(first.await.unwrap(), LookupOutcome::Found);
    assert!(controller.view().taxpayer.is_some());
}
