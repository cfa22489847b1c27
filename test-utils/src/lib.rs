//! `test-utils` is used for testing in both `octo-lib` and `octo-bin`.
//! This crate does not depend on `octo-lib` or `octo-bin`, else we would get dependency cycles.
//! Macros are used instead, so that the importer is responsible for providing the dependencies.

/// Create a mock web server, which responds with a predefined status when
/// handling a `POST` request
#[macro_export]
macro_rules! mock_server {
    ($status:expr $(, $func:tt ($($arg:expr),*))*) => {{
        let mock_server = wiremock::MockServer::start().await;
        let response_template = wiremock::ResponseTemplate::new(http::StatusCode::from($status));
        let template = response_template$(.$func($($arg),*))*;
        wiremock::Mock::given(wiremock::matchers::method("POST")).respond_with(template).mount(&mock_server).await;
        mock_server
    }};
}

/// A JSON job list with `$n` jobs posting to the root of `$server`.
///
/// Every job carries a payload of the form `{"title": "title number <i>"}`.
#[macro_export]
macro_rules! job_list {
    ($server:expr, $n:expr $(,)?) => {{
        let jobs: Vec<serde_json::Value> = (0..$n)
            .map(|i| {
                serde_json::json!({
                    "url": $server.uri(),
                    "payload": { "title": format!("title number {i}") },
                })
            })
            .collect();
        serde_json::to_string(&jobs).unwrap()
    }};
}

/// Gets the "main" binary name (e.g. `octo`)
#[macro_export]
macro_rules! main_command {
    () => {
        Command::cargo_bin(env!("CARGO_PKG_NAME")).expect("Couldn't get cargo package name")
    };
}
