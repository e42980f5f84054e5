use super::*;
use async_trait::async_trait;
use client_core::{
    spawn_controller, EnrichError, Enricher, LocalSessionProvider, SessionError,
};
use shared::{
    domain::Identity,
    protocol::{EnrichRequest, EnrichedResult},
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

#[derive(Default)]
struct CountingEnricher {
    calls: AtomicUsize,
}

#[async_trait]
impl Enricher for CountingEnricher {
    async fn enrich(&self, request: &EnrichRequest) -> Result<EnrichedResult, EnrichError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(EnrichedResult {
            company_name: request.company_name.clone(),
            website: request.website.clone(),
            description: "d".into(),
            industry: "tech".into(),
            estimated_size: "50-100".into(),
            products_services: vec!["a".into(), "b".into()],
            headquarters: "NYC".into(),
            year_founded: "2010".into(),
            key_features: vec!["x".into()],
        })
    }
}

fn alice() -> Identity {
    Identity::new("uid-alice").with_display_name("Alice")
}

#[tokio::test]
async fn scripted_session_enriches_a_lead() {
    let session = Arc::new(LocalSessionProvider::new(alice()));
    let enricher = Arc::new(CountingEnricher::default());
    let (handle, _task) = spawn_controller(session, enricher.clone());

    let script = b"login\ncompany Acme\nwebsite https://acme.com\nsubmit\nlogout\nquit\n";
    let mut output = Vec::new();
    run(&handle, &script[..], &mut output).await.expect("run");
    let output = String::from_utf8(output).expect("utf8");

    assert!(output.contains("Signed in as Alice"));
    assert!(output.contains("Company Name: Acme"));
    assert!(output.contains("Website: https://acme.com"));
    assert!(output.contains("Products/Services: a, b"));
    assert!(output.trim_end().ends_with(">"));
    assert_eq!(enricher.calls.load(Ordering::SeqCst), 1);
    assert!(!handle.snapshot().is_signed_in());
    assert!(!handle.snapshot().has_result());
}

#[tokio::test]
async fn form_commands_require_login() {
    let session = Arc::new(LocalSessionProvider::new(alice()));
    let (handle, _task) = spawn_controller(session, Arc::new(CountingEnricher::default()));

    for command in [
        Command::Submit,
        Command::Company("Acme".into()),
        Command::Website("https://acme.com".into()),
    ] {
        let reply = execute(&handle, command).await.expect("execute");
        assert_eq!(reply, "Log in first.");
    }
    assert_eq!(
        execute(&handle, Command::Logout).await.expect("execute"),
        "Not signed in."
    );
}

#[tokio::test]
async fn invalid_website_is_reported_without_a_request() {
    let session = Arc::new(LocalSessionProvider::signed_in(alice()));
    let enricher = Arc::new(CountingEnricher::default());
    let (handle, _task) = spawn_controller(session, enricher.clone());
    handle
        .wait_for(ViewState::is_signed_in)
        .await
        .expect("signed in");

    execute(&handle, Command::Company("Acme".into()))
        .await
        .expect("company");
    execute(&handle, Command::Website("acme.com".into()))
        .await
        .expect("website");
    let reply = execute(&handle, Command::Submit).await.expect("submit");

    assert_eq!(reply, "Website URL must be an absolute http(s) URL");
    assert_eq!(enricher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_login_is_rendered_inline() {
    let session = Arc::new(LocalSessionProvider::new(alice()));
    session.fail_next_sign_in(SessionError::Cancelled).await;
    let (handle, _task) = spawn_controller(session, Arc::new(CountingEnricher::default()));

    let reply = execute(&handle, Command::Login).await.expect("login");
    assert!(reply.contains("! Failed to log in. Please try again."));
    assert!(reply.contains("Type `login` to log in."));
}
