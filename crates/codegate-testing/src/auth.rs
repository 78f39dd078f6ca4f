//! Mock admin identity for integration tests.
//!
//! Admin routes receive `x-codegate-admin-id` injected by the console gateway. In tests,
//! `MockAdmin` produces that header directly so no real console session is needed.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use codegate_auth_types::identity::X_CODEGATE_ADMIN_ID;

pub struct MockAdmin {
    pub admin_id: String,
}

impl MockAdmin {
    pub fn new(admin_id: impl Into<String>) -> Self {
        Self {
            admin_id: admin_id.into(),
        }
    }

    /// Return headers as if the gateway injected them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static(X_CODEGATE_ADMIN_ID),
            HeaderValue::from_str(&self.admin_id).unwrap(),
        );
        map
    }
}
