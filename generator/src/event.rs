//! Event builder
//!
//! Fabricates `core/v1` Events pointing at the configured involved object.
//! Everything except the name suffix and the timestamps is fixed.

use crate::config::InvolvedObject;
use chrono::Utc;
use k8s_openapi::api::core::v1::{Event, EventSource, ObjectReference};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use rand::Rng;

/// Message carried by every generated event
pub const MESSAGE: &str = "This is test message of Event to load cloud-events-reader. Do not worry";

/// Reason carried by every generated event
pub const REASON: &str = "Completed";

/// Event type
pub const EVENT_TYPE: &str = "Normal";

/// `source.component` tag, lets consumers filter generated load
pub const COMPONENT: &str = "k8s-event-generator";

/// Max length of a DNS subdomain name
const MAX_NAME_LEN: usize = 253;

/// Sanitize name to be K8s DNS subdomain compatible.
///
/// Lowercase alphanumerics, '-' and '.', starting and ending with an
/// alphanumeric, max 253 chars.
pub fn sanitize_name(raw: &str) -> String {
    let sanitized: String = raw
        .chars()
        .map(|c| {
            let lc = c.to_ascii_lowercase();
            if lc.is_ascii_lowercase() || lc.is_ascii_digit() || lc == '-' || lc == '.' {
                lc
            } else {
                '-'
            }
        })
        .collect();

    let trimmed = sanitized.trim_matches(['-', '.']);
    if trimmed.is_empty() {
        "event".to_string()
    } else if trimmed.len() > MAX_NAME_LEN {
        trimmed[..MAX_NAME_LEN]
            .trim_end_matches(['-', '.'])
            .to_string()
    } else {
        trimmed.to_string()
    }
}

/// Build one event.
///
/// `seq` is the position of the event within its loop and is mixed into
/// the random name suffix. A seeded `rng` gives reproducible names.
pub fn build_event<R: Rng + ?Sized>(
    seq: u64,
    rng: &mut R,
    namespace: &str,
    involved: &InvolvedObject,
) -> Event {
    let suffix = rng.random::<u64>().wrapping_add(seq);
    // leave room for ".<16 hex>"
    let prefix = sanitize_name(&involved.name);
    let prefix = prefix[..prefix.len().min(MAX_NAME_LEN - 17)].trim_end_matches(['-', '.']);
    let name = format!("{prefix}.{suffix:016x}");
    let now = Time(Utc::now());

    Event {
        metadata: ObjectMeta {
            name: Some(name),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        involved_object: ObjectReference {
            api_version: Some(involved.api_version.clone()),
            kind: Some(involved.kind.clone()),
            name: Some(involved.name.clone()),
            namespace: Some(namespace.to_string()),
            uid: Some(involved.uid.clone()),
            resource_version: Some(involved.resource_version.clone()),
            ..Default::default()
        },
        message: Some(MESSAGE.to_string()),
        reason: Some(REASON.to_string()),
        type_: Some(EVENT_TYPE.to_string()),
        count: Some(1),
        source: Some(EventSource {
            component: Some(COMPONENT.to_string()),
            ..Default::default()
        }),
        first_timestamp: Some(now.clone()),
        last_timestamp: Some(now),
        ..Default::default()
    }
}
