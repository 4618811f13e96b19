//! Wizard and HTTP submitter against a live endpoint on a loopback port

use chrono::{Days, Utc};
use hmv::schema::{Choices, Field, FormSchema, ValidatedRecord};
use hmv::server::{endpoint_url, serve_listener, AppState};
use hmv::wizard::{HttpSubmitter, SubmitError, Submitter, Wizard, WizardConfig, WizardError};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Running endpoint, stopped on drop
struct Endpoint {
    url: String,
    _shutdown: tokio_util::sync::DropGuard,
}

async fn start_endpoint(schema: FormSchema) -> Endpoint {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = endpoint_url(&listener.local_addr().unwrap());
    let token = CancellationToken::new();
    let stop = token.clone();
    tokio::spawn(serve_listener(listener, AppState::new(schema), async move {
        stop.cancelled().await
    }));
    Endpoint {
        url,
        _shutdown: token.drop_guard(),
    }
}

fn application() -> Value {
    let launch = Utc::now().date_naive() + Days::new(60);
    let back = launch + Days::new(45);
    json!({
        "firstName": "John",
        "lastName": "Doe",
        "birthDate": "2000-01-01",
        "nationality": "American",
        "email": "john.doe@example.com",
        "phoneNumber": "1234567890",
        "departureDate": launch.format("%Y-%m-%d").to_string(),
        "returnDate": back.format("%Y-%m-%d").to_string(),
        "departureHub": "Alcântara Launch Center - Brasil",
        "martianLodgings": "Hellas Planitia Edge Base",
        "healthDeclaration": true,
        "emergencyContactName": "Jane Doe",
        "emergencyContactEmail": "jane.doe@example.com",
        "emergencyContactPhone": "0987654321"
    })
}

fn validated() -> ValidatedRecord {
    FormSchema::new().validate(&application()).unwrap()
}

/// Server-side lists that no longer offer the wizard's launch pads
fn restricted_schema() -> FormSchema {
    FormSchema::with_choices(Choices {
        departure_hubs: vec!["Baikonur Cosmodrome".to_string()],
        martian_lodgings: vec!["Hellas Planitia Edge Base".to_string()],
    })
}

#[tokio::test]
async fn test_http_submitter_acknowledged() {
    let endpoint = start_endpoint(FormSchema::new()).await;
    let ack = HttpSubmitter::new(&endpoint.url)
        .submit(&validated())
        .await
        .unwrap();
    assert_eq!(ack.message, "ok");
    assert!(ack.reference.is_some());
}

#[tokio::test]
async fn test_http_submitter_maps_rejection() {
    let endpoint = start_endpoint(restricted_schema()).await;
    let err = HttpSubmitter::new(&endpoint.url)
        .submit(&validated())
        .await
        .unwrap_err();
    match err {
        SubmitError::Rejected { message, errors } => {
            assert_eq!(message, "Invalid data");
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field(), Some(Field::DepartureHub));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_submitter_unexpected_status() {
    let endpoint = start_endpoint(FormSchema::new()).await;
    let wrong_path = endpoint.url.replace("mars-visitor-form", "nowhere");
    let err = HttpSubmitter::new(wrong_path)
        .submit(&validated())
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::UnexpectedStatus { status: 404 }));
}

#[tokio::test]
async fn test_http_submitter_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = endpoint_url(&listener.local_addr().unwrap());
    drop(listener);

    let err = HttpSubmitter::new(url)
        .submit(&validated())
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::Transport(_)));
}

fn fill(wizard: &mut Wizard) {
    let record = application();
    for field in Field::all() {
        if let Some(value) = record.get(field.as_str()) {
            wizard.set_field(*field, value.clone());
        }
    }
}

#[tokio::test]
async fn test_wizard_submits_to_endpoint() {
    let endpoint = start_endpoint(FormSchema::new()).await;
    let (mut wizard, _events) = Wizard::new(WizardConfig::standard());
    fill(&mut wizard);
    wizard.advance().unwrap();
    wizard.advance().unwrap();

    let ack = wizard
        .submit(&HttpSubmitter::new(&endpoint.url))
        .await
        .unwrap();
    assert_eq!(ack.message, "ok");
    assert!(wizard.is_complete());
    assert!(wizard.state().values().is_empty());
    assert!(wizard.reset_pending());
}

#[tokio::test]
async fn test_wizard_lands_on_stage_of_rejected_field() {
    let endpoint = start_endpoint(restricted_schema()).await;
    let (mut wizard, _events) = Wizard::new(WizardConfig::standard());
    fill(&mut wizard);
    wizard.advance().unwrap();
    wizard.advance().unwrap();

    let err = wizard
        .submit(&HttpSubmitter::new(&endpoint.url))
        .await
        .unwrap_err();
    assert!(matches!(err, WizardError::Rejected { .. }));
    assert_eq!(wizard.stage_index(), 1);
    assert_eq!(wizard.state().focus(), Some(Field::DepartureHub));
    assert!(wizard.state().error(Field::DepartureHub).is_some());
    // Entered values survive a rejection
    assert_eq!(
        wizard.state().value(Field::FirstName),
        Some(&json!("John"))
    );
}
