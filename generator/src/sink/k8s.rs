//! Kubernetes sink - posts events to the cluster's Event API

use crate::error::SinkError;
use crate::sink::EventSink;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Event;
use kube::Client;
use kube::api::{Api, ListParams, PostParams};

/// Sink that creates `core/v1` Events in one namespace
pub struct KubeSink {
    namespace: String,
    api: Api<Event>,
}

impl KubeSink {
    /// Create with an explicit client
    pub fn with_client(client: Client, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let api = Api::namespaced(client, &namespace);
        Self { namespace, api }
    }

    /// Connect using the default kubeconfig or in-cluster config
    pub async fn new(namespace: impl Into<String>) -> Result<Self, SinkError> {
        let client = Client::try_default()
            .await
            .map_err(|e| SinkError::Connection(format!("K8s client: {e}")))?;
        Ok(Self::with_client(client, namespace))
    }
}

#[async_trait]
impl EventSink for KubeSink {
    fn name(&self) -> &'static str {
        "kube"
    }

    async fn submit(&self, event: &Event) -> Result<(), SinkError> {
        let name = event.metadata.name.as_deref().unwrap_or_default();

        self.api
            .create(&PostParams::default(), event)
            .await
            .map_err(|e| SinkError::Submit(format!("create event {name}: {e}")))?;

        tracing::debug!(
            name = %name,
            namespace = %self.namespace,
            "created event"
        );

        Ok(())
    }

    async fn health(&self) -> bool {
        self.api.list(&ListParams::default().limit(1)).await.is_ok()
    }

    async fn shutdown(&self) -> Result<(), SinkError> {
        tracing::info!(namespace = %self.namespace, "kube sink shutdown");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::InvolvedObject;
    use crate::event::build_event;
    use http::{Method, Request, Response, StatusCode};
    use kube::client::Body;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tower_test::mock::{self, Handle};

    type ApiHandle = Handle<Request<Body>, Response<Body>>;

    fn mock_sink(namespace: &str) -> (KubeSink, ApiHandle) {
        let (service, handle) = mock::pair::<Request<Body>, Response<Body>>();
        let client = Client::new(service, "default");
        (KubeSink::with_client(client, namespace), handle)
    }

    fn json_response(status: StatusCode, body: Vec<u8>) -> Response<Body> {
        Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn status_body(code: u16, reason: &str, message: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "kind": "Status",
            "apiVersion": "v1",
            "metadata": {},
            "status": "Failure",
            "message": message,
            "reason": reason,
            "code": code,
        }))
        .unwrap()
    }

    fn make_event(namespace: &str) -> Event {
        let mut rng = StdRng::seed_from_u64(5);
        build_event(1, &mut rng, namespace, &InvolvedObject::default())
    }

    #[tokio::test]
    async fn test_submit_posts_to_namespace() {
        let (sink, mut handle) = mock_sink("load");
        let event = make_event("load");

        let server = tokio::spawn(async move {
            let (request, send) = handle.next_request().await.unwrap();
            assert_eq!(request.method(), Method::POST);
            assert_eq!(request.uri().path(), "/api/v1/namespaces/load/events");

            let body = request.into_body().collect_bytes().await.unwrap();
            let posted: Event = serde_json::from_slice(&body).unwrap();
            send.send_response(json_response(StatusCode::CREATED, body.to_vec()));
            posted
        });

        sink.submit(&event).await.unwrap();
        let posted = server.await.unwrap();

        assert_eq!(posted.metadata.name, event.metadata.name);
        assert_eq!(posted.reason.as_deref(), Some("Completed"));
        assert_eq!(
            posted.involved_object.kind.as_deref(),
            Some("GrafanaDashboard")
        );
    }

    #[tokio::test]
    async fn test_submit_conflict_maps_to_submit_error() {
        let (sink, mut handle) = mock_sink("load");
        let event = make_event("load");
        let name = event.metadata.name.clone().unwrap();

        let message = format!("events \"{name}\" already exists");
        tokio::spawn(async move {
            let (_request, send) = handle.next_request().await.unwrap();
            send.send_response(json_response(
                StatusCode::CONFLICT,
                status_body(409, "AlreadyExists", &message),
            ));
        });

        let err = sink.submit(&event).await.unwrap_err();
        assert!(
            matches!(&err, SinkError::Submit(msg) if msg.contains(&name) && msg.contains("already exists")),
            "unexpected error: {err:?}"
        );
    }

    #[tokio::test]
    async fn test_health_lists_one_event() {
        let (sink, mut handle) = mock_sink("load");

        let server = tokio::spawn(async move {
            let (request, send) = handle.next_request().await.unwrap();
            assert_eq!(request.method(), Method::GET);
            assert_eq!(request.uri().path(), "/api/v1/namespaces/load/events");
            assert!(request.uri().query().unwrap_or_default().contains("limit=1"));

            let list = serde_json::json!({
                "apiVersion": "v1",
                "kind": "EventList",
                "metadata": {},
                "items": [],
            });
            send.send_response(json_response(
                StatusCode::OK,
                serde_json::to_vec(&list).unwrap(),
            ));
        });

        assert!(sink.health().await);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_health_false_on_api_error() {
        let (sink, mut handle) = mock_sink("load");

        tokio::spawn(async move {
            let (_request, send) = handle.next_request().await.unwrap();
            send.send_response(json_response(
                StatusCode::FORBIDDEN,
                status_body(403, "Forbidden", "events is forbidden"),
            ));
        });

        assert!(!sink.health().await);
    }
}
