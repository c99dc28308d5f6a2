//! API health reporting

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::Success;

/// The health response information
#[derive(Serialize)]
pub struct Health {
    /// Fixed confirmation text
    status: &'static str,

    /// Moment the health was sampled
    timestamp: DateTime<Utc>,
}

/// Report the server as up
///
/// Request:
/// ```sh
/// curl -v http://localhost:5000/api/health
/// ```
///
/// Response:
/// ```json
/// { "status": "Server is running", "timestamp": "2025-06-14T09:15:00Z" }
/// ```
pub async fn check() -> Success<Health> {
    Success::ok(Health {
        status: "Server is running",
        timestamp: Utc::now(),
    })
}
