use std::sync::LazyLock;
use std::time::Duration;

// chat completions for large PRs regularly take longer than 30s
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(90))
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(300))
        .connection_verbose(false)
        .build()
        .unwrap()
});
