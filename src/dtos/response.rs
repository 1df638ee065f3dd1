use serde::Serialize;

use crate::utils::invalidation::Mutation;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: T,
    /// Query tags the frontend must refetch after this mutation; absent on
    /// plain reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalidates: Option<&'static [&'static str]>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data,
            invalidates: None,
        }
    }

    pub fn mutated(message: &str, data: T, mutation: Mutation) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data,
            invalidates: Some(mutation.invalidates()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::invalidation::Q_EXCHANGES;

    #[test]
    fn reads_omit_the_invalidation_set() {
        let body = serde_json::to_value(ApiResponse::success("ok", 1)).unwrap();
        assert!(body.get("invalidates").is_none());
    }

    #[test]
    fn mutations_declare_their_invalidation_set() {
        let body =
            serde_json::to_value(ApiResponse::mutated("ok", 1, Mutation::CancelExchange)).unwrap();
        let tags = body["invalidates"].as_array().unwrap();
        assert!(tags.iter().any(|t| t == Q_EXCHANGES));
    }
}
