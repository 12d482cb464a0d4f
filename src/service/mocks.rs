//! Mocked service clients for unit tests.

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Utc};
use mockall::mock;

use crate::base::{lookback::LookbackWindow, types::Res};

use super::{
    amp::{AmpEvent, Computer, GenericAmpClient, IsolationResponse},
    mail::GenericMailClient,
    reputation::{GenericReputationClient, ReputationRecord},
    umbrella::{DomainCategories, GenericUmbrellaClient, UmbrellaEvent, WhoisRecord},
};

mock! {
    pub Amp {}

    #[async_trait]
    impl GenericAmpClient for Amp {
        async fn find_computers(&self, hostname: &str) -> Res<Vec<Computer>>;
        async fn isolate_computer(&self, connector_guid: &str) -> Res<IsolationResponse>;
        async fn list_events(&self, since: DateTime<Utc>) -> Res<Vec<AmpEvent>>;
    }
}

mock! {
    pub Umbrella {}

    #[async_trait]
    impl GenericUmbrellaClient for Umbrella {
        async fn list_security_events(&self, window: &LookbackWindow) -> Res<Vec<UmbrellaEvent>>;
        async fn risk_score(&self, domain: &str) -> Res<Option<i64>>;
        async fn categories(&self, domain: &str) -> Res<DomainCategories>;
        async fn whois(&self, domain: &str) -> Res<WhoisRecord>;
    }
}

mock! {
    pub Reputation {}

    #[async_trait]
    impl GenericReputationClient for Reputation {
        async fn reputation_history(&self, ip_addr: &str) -> Res<Option<Vec<ReputationRecord>>>;
    }
}

mock! {
    pub Mail {}

    #[async_trait]
    impl GenericMailClient for Mail {
        async fn send_notification(&self, hostname: &str, recipient: &str);
    }
}

/// Serve a stand-in provider API on an ephemeral local port and return its base URL.
pub async fn serve_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    format!("http://{addr}")
}
