use anyhow::Context;
use tokenico_dapp::{init_dapp, DappError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = init_dapp().context("failed to initialize the dApp")?;

    let account = match state.check_wallet_connected().await {
        Ok(account) => account,
        Err(DappError::NotAuthorized(_)) => {
            log::info!("No authorized account yet, requesting one");
            state.connect_wallet().await?.session.account_string()
        }
        Err(e) => return Err(e).context("wallet is not available"),
    };
    log::info!("Connected as {account}");

    let dashboard = state.load_dashboard().await.context("failed to load the dashboard")?;
    println!("{}", serde_json::to_string_pretty(&dashboard)?);
    Ok(())
}
