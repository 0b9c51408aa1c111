//! Shared setup: a mock server on a random port and a client logged into it.

#![allow(dead_code)]

use std::time::Duration;

use koillection_core::Client;
use mock_server::{MockState, DEFAULT_PASSWORD, DEFAULT_USERNAME};

/// Start the mock server with `state` and return its base URL.
///
/// The listener is bound before the server thread starts, so requests issued
/// right away queue instead of being refused.
pub fn spawn_server(state: MockState) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with_state(listener, state).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

pub fn anonymous_client(state: MockState) -> Client {
    Client::new(&spawn_server(state), Duration::from_secs(10))
}

pub fn client() -> Client {
    client_with(MockState::default())
}

pub fn client_with(state: MockState) -> Client {
    let mut client = anonymous_client(state);
    client.authenticate(DEFAULT_USERNAME, DEFAULT_PASSWORD).unwrap();
    client
}
