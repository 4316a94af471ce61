//! TaleWeaver Providers — HTTP clients for the third-party generation APIs.
//!
//! Each client implements one collaborator trait from `taleweaver-core`:
//! [`MistralClient`] writes scenes, [`ElevenLabsClient`] voices them and
//! [`FalClient`] illustrates them. Every call is a single attempt with no
//! retry and no imposed deadline.

pub mod elevenlabs;
pub mod error;
pub mod fal;
pub mod mistral;

pub use elevenlabs::ElevenLabsClient;
pub use error::ProviderError;
pub use fal::FalClient;
pub use mistral::MistralClient;

#[cfg(test)]
pub(crate) mod test_server {
    use axum::Router;

    /// Serves `router` on an ephemeral local port and returns its base URL.
    pub(crate) async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }
}
