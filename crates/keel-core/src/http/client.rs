use std::time::Duration;

use crate::kernel::constants::{APP_NAME, APP_VERSION};

/// Build the shared outbound HTTP client.
pub fn build_client(timeout_secs: u64) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(format!("{}/{}", APP_NAME.to_lowercase(), APP_VERSION))
        .build()
}
