use super::stub_server;
use mqprobe::StoreClient;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// One stub collaborator per test, bound to an OS-chosen port and served
/// from a background task that dies with the test.
pub struct TestServer {
    addr: SocketAddr,
    server: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub listener");
        let addr = listener.local_addr().expect("Stub listener has no address");
        let server = tokio::spawn(async move {
            axum::serve(listener, stub_server::router())
                .await
                .expect("Stub server exited");
        });
        TestServer { addr, server }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> StoreClient {
        StoreClient::new(self.base_url())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.abort();
    }
}
