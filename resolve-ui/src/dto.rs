use resolve_core::{ChangeEvent, ChangeKind, StoreError};
use serde::{Deserialize, Serialize};

/// Realtime `postgres_changes` payload as supabase-js delivers it. Only
/// `eventType` is read; every other field travels through untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangePayloadDto(pub serde_json::Value);

impl ChangePayloadDto {
    pub fn event_type(&self) -> &str {
        self.0
            .get("eventType")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
    }

    pub fn into_event(self) -> ChangeEvent {
        let kind = ChangeKind::from_wire(self.event_type());
        ChangeEvent {
            kind,
            payload: self.0,
        }
    }
}

/// PostgREST error object (`{ message, code, details, hint }`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreErrorDto {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl From<StoreErrorDto> for StoreError {
    fn from(dto: StoreErrorDto) -> Self {
        let message = if dto.message.is_empty() {
            dto.details.unwrap_or_else(|| "unknown store error".into())
        } else {
            dto.message
        };
        StoreError::Remote {
            message,
            code: dto.code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_payload_maps_event_type() {
        let dto: ChangePayloadDto = serde_json::from_value(serde_json::json!({
            "eventType": "UPDATE",
            "schema": "public",
            "table": "laporan",
            "commit_timestamp": "2024-06-01T10:00:00Z",
            "new": { "id": 4, "status": "Resolved" },
            "old": { "id": 4 }
        }))
        .expect("decode");

        let event = dto.into_event();
        assert_eq!(event.kind, ChangeKind::Update);
        assert_eq!(event.payload["new"]["status"], "Resolved");
        assert_eq!(event.payload["eventType"], "UPDATE");
    }

    #[test]
    fn change_payload_keeps_unmodelled_fields() {
        let raw = serde_json::json!({
            "eventType": "INSERT",
            "schema": "public",
            "table": "laporan",
            "commit_timestamp": "2024-06-01T10:00:00Z",
            "errors": null,
            "columns": [{ "name": "title", "type": "text" }],
            "new": { "id": 5, "title": "Pothole on Main St" },
            "old": {}
        });
        let dto: ChangePayloadDto = serde_json::from_value(raw.clone()).expect("decode");

        let event = dto.into_event();
        assert_eq!(event.kind, ChangeKind::Insert);
        assert_eq!(event.payload, raw);
    }

    #[test]
    fn payload_without_event_type_is_other() {
        let dto: ChangePayloadDto =
            serde_json::from_value(serde_json::json!({ "table": "laporan" })).expect("decode");
        assert_eq!(dto.into_event().kind, ChangeKind::Other);
    }

    #[test]
    fn store_error_prefers_message() {
        let dto: StoreErrorDto = serde_json::from_value(serde_json::json!({
            "message": "permission denied for table laporan",
            "code": "42501",
            "details": null,
            "hint": null
        }))
        .expect("decode");

        assert_eq!(
            StoreError::from(dto),
            StoreError::Remote {
                message: "permission denied for table laporan".into(),
                code: Some("42501".into()),
            }
        );
    }
}
