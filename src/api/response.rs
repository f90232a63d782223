use chrono::{DateTime, Utc};
use serde::Serialize;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Default, Serialize)]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
    /// Simulator tick the data was taken from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick: Option<u64>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        let metadata = self.metadata.take().unwrap_or_default();
        self.metadata = Some(ResponseMetadata {
            total_count: Some(count),
            ..metadata
        });
        self
    }

    pub fn with_tick(mut self, tick: u64) -> Self {
        let metadata = self.metadata.take().unwrap_or_default();
        self.metadata = Some(ResponseMetadata {
            tick: Some(tick),
            ..metadata
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let response = ApiResponse::success("test data");
        assert!(response.success);
        assert_eq!(response.data, "test data");
        assert!(response.metadata.is_none());
    }

    #[test]
    fn test_response_with_metadata() {
        let response = ApiResponse::success("data").with_count(3).with_tick(42);
        let metadata = response.metadata.unwrap();
        assert_eq!(metadata.total_count, Some(3));
        assert_eq!(metadata.tick, Some(42));
    }

    #[test]
    fn test_metadata_omitted_when_unset() {
        let json = serde_json::to_value(ApiResponse::success(1)).unwrap();
        assert_eq!(json["data"], 1);
        assert!(json.get("metadata").is_none());
    }
}
