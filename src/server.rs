use std::{net::SocketAddr, str::FromStr};

use axum::{Router, routing::get};
use tokio::{
    net::TcpListener,
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::{
    Res,
    api::{self, LoginState},
    spotify::AuthSession,
};

pub fn router(state: LoginState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .with_state(state)
}

/// A running login server.
///
/// The routes never stop the server themselves: `/callback` sends on
/// `authorized` and the owner decides when to call [`LoginServer::shutdown`].
pub struct LoginServer {
    pub local_addr: SocketAddr,
    pub authorized: mpsc::Receiver<()>,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl LoginServer {
    pub async fn start(addr: &str, session: AuthSession) -> Res<Self> {
        let addr = SocketAddr::from_str(addr)?;
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        let (authorized_tx, authorized_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = router(LoginState {
            session,
            authorized: authorized_tx,
        });

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        Ok(Self {
            local_addr,
            authorized: authorized_rx,
            shutdown: shutdown_tx,
            handle,
        })
    }

    /// Waits for the first completed authorization.
    pub async fn wait_for_authorization(&mut self) -> bool {
        self.authorized.recv().await.is_some()
    }

    pub async fn shutdown(self) -> Res<()> {
        let _ = self.shutdown.send(());
        self.handle.await??;
        Ok(())
    }
}
