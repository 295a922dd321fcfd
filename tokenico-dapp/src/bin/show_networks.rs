use tokenico_dapp::{init_logger, DappConfig};

fn main() -> anyhow::Result<()> {
    let config = DappConfig::from_env()?;
    init_logger(&config.log_level);
    let registry = config.registry()?;

    println!("{} Network Configuration:\n", config.dapp_name);
    println!("  Target Network: {}", config.network);
    if let Some(path) = &config.networks_file {
        println!("  Networks File: {path}");
    }
    println!(
        "  Wallet RPC URL: {}",
        config.wallet_rpc_url.as_deref().unwrap_or("(not set, browser wallet expected)")
    );
    println!();

    for (name, network) in registry.iter() {
        let marker = if name == config.network { "*" } else { " " };
        println!(
            "{marker} {name:<14} {:<10} {:<18} {:<6} {}",
            network.chain_id,
            network.chain_id_hex(),
            network.native_currency.symbol,
            network.primary_rpc_url().unwrap_or("(no RPC URL)")
        );
        if let Some(explorer) = network.explorer_url() {
            println!("  {:<14} explorer: {explorer}", "");
        }
    }

    let problems = config.validate();
    if !problems.is_empty() {
        println!("\nConfiguration problems:");
        for problem in problems {
            println!("  - {problem}");
        }
    }
    Ok(())
}
