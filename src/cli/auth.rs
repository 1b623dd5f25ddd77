use crate::{Res, info, server::LoginServer, spotify::AuthSession, warning};

/// Runs the browser authorization flow and returns once a token is installed.
///
/// Starts the login server on `addr`, points the operator (and their browser)
/// at `/login`, waits for the callback to report success, then stops the
/// server again.
pub async fn auth(session: AuthSession, addr: &str) -> Res<()> {
    let mut server = LoginServer::start(addr, session).await?;
    let login_url = format!("http://{}/login", server.local_addr);

    info!("Please authorize at {}", login_url);
    if webbrowser::open(&login_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            login_url
        );
    }

    if !server.wait_for_authorization().await {
        return Err("Login server stopped before authorization completed".into());
    }

    server.shutdown().await?;
    Ok(())
}
