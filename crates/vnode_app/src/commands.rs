use std::io::Write;
use std::path::Path;
use std::time::Duration;

use tracing::info;
use vnode_chain::modules::{find_module, registry};
use vnode_chain::plan::{DeploymentPlan, VerifyTarget};
use vnode_chain::rpc::check_network;
use vnode_chain::{ChainError, DeployConfig};
use vnode_core::{Environment, VnodeError};

use crate::{Command, Format};

/// Execute one command. Configuration is loaded once, up front, so missing
/// secrets abort every command.
pub async fn run(
    command: Command,
    env: &Environment,
    out: &mut impl Write,
) -> Result<(), VnodeError> {
    let config = DeployConfig::load(env)?;
    match command {
        Command::Networks => list_networks(&config, out),
        Command::Config { format } => print_config(&config, format, out),
        Command::Modules => list_modules(out),
        Command::Plan {
            module,
            network,
            out: dir,
        } => plan(&config, &module, network.as_deref(), dir.as_deref(), out),
        Command::Check { network } => check(&config, network.as_deref(), out).await,
        Command::Accounts { network } => accounts(&config, network.as_deref(), out),
        Command::VerifyId { network } => verify_id(&config, network.as_deref(), out),
    }
}

fn list_networks(config: &DeployConfig, out: &mut impl Write) -> Result<(), VnodeError> {
    let default = &config.project.default_network;
    writeln!(out, "{:<18} {:<18} {:>12}  URL", "NETWORK", "CHAIN", "CHAIN ID")?;
    for n in config.networks() {
        let marker = if &n.name == default { "*" } else { " " };
        writeln!(
            out,
            "{marker}{:<17} {:<18} {:>12}  {}",
            n.name,
            n.chain.as_str(),
            n.chain_id,
            config.display_url(n)
        )?;
    }
    Ok(())
}

fn print_config(
    config: &DeployConfig,
    format: Format,
    out: &mut impl Write,
) -> Result<(), VnodeError> {
    let redacted = config.redacted();
    let rendered = match format {
        Format::Json => serde_json::to_string_pretty(&redacted)?,
        Format::Toml => toml::to_string_pretty(&redacted)
            .map_err(|e| VnodeError::Internal(format!("TOML encoding failed: {e}")))?,
    };
    writeln!(out, "{rendered}")?;
    Ok(())
}

fn list_modules(out: &mut impl Write) -> Result<(), VnodeError> {
    for module in registry()? {
        writeln!(out, "{}", module.id)?;
        for future in &module.futures {
            let args: Vec<String> = future.args.iter().map(ToString::to_string).collect();
            writeln!(out, "  {} = {}({})", future.id, future.contract, args.join(", "))?;
        }
    }
    Ok(())
}

fn plan(
    config: &DeployConfig,
    module: &str,
    network: Option<&str>,
    dir: Option<&Path>,
    out: &mut impl Write,
) -> Result<(), VnodeError> {
    let network = config.select(network)?;
    let module = find_module(module)?;
    let plan = DeploymentPlan::for_display(config, &module, network);

    writeln!(out, "{}", serde_json::to_string_pretty(&plan)?)?;
    if let Some(dir) = dir {
        let path = plan.write_to(dir)?;
        info!(path = %path.display(), "plan saved");
    }
    Ok(())
}

async fn check(
    config: &DeployConfig,
    network: Option<&str>,
    out: &mut impl Write,
) -> Result<(), VnodeError> {
    let network = config.select(network)?;
    let timeout = config
        .rpc
        .get_rpc(network.chain)
        .map(|rpc| Duration::from_secs(rpc.timeout_secs))
        .unwrap_or(Duration::from_secs(vnode_chain::rpc_config::DEFAULT_TIMEOUT_SECS));

    let provider_key = config.secrets.provider_key.expose();
    let actual = match check_network(network, provider_key, timeout).await {
        Ok(actual) => actual,
        Err(e @ ChainError::Rpc { .. }) if network.is_local() => {
            return Err(VnodeError::Rpc(format!(
                "{e} (is the local node running at {}?)",
                config.display_url(network)
            )));
        }
        Err(e) => return Err(e.into()),
    };
    writeln!(out, "{}: chain id {actual} matches", network.name)?;
    Ok(())
}

fn accounts(
    config: &DeployConfig,
    network: Option<&str>,
    out: &mut impl Write,
) -> Result<(), VnodeError> {
    let network = config.select(network)?;
    writeln!(
        out,
        "{} ({} accounts from {})",
        network.name, network.accounts.count, network.accounts.path
    )?;
    for path in network.accounts.derivation_paths() {
        writeln!(out, "  {path}")?;
    }
    Ok(())
}

fn verify_id(
    config: &DeployConfig,
    network: Option<&str>,
    out: &mut impl Write,
) -> Result<(), VnodeError> {
    let network = config.select(network)?;
    let target = VerifyTarget::new(config, network);
    writeln!(out, "{}", target.deployment_id)?;

    match (target.explorer_slot, target.has_api_key) {
        (None, _) => writeln!(out, "no explorer verification configured for {}", target.network)?,
        (Some(slot), false) => writeln!(out, "explorer key for '{slot}' is not set")?,
        (Some(slot), true) => writeln!(
            out,
            "explorer key for '{slot}' is set ({})",
            target.explorer_url.unwrap_or("unknown explorer")
        )?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Environment {
        Environment::from_pairs([
            ("MNEMONIC", "test test test test test test test test test test test junk"),
            ("INFURA_API_KEY", "0123456789abcdef0123"),
            ("BSCSCAN_API_KEY", "bscscan-key-value"),
        ])
    }

    async fn run_to_string(command: Command, env: &Environment) -> Result<String, VnodeError> {
        let mut buf = Vec::new();
        run(command, env, &mut buf).await?;
        Ok(String::from_utf8(buf).unwrap())
    }

    #[tokio::test]
    async fn networks_lists_every_network() {
        let out = run_to_string(Command::Networks, &env()).await.unwrap();
        assert_eq!(out.lines().count(), 15);
        assert!(out.contains("polygonAmoy"));
        assert!(out.contains("80002"));
        assert!(out.contains("*sepolia"));
        assert!(!out.contains("0123456789abcdef0123"));
    }

    #[tokio::test]
    async fn missing_mnemonic_aborts() {
        let env = Environment::from_pairs([("INFURA_API_KEY", "k")]);
        let err = run_to_string(Command::Networks, &env).await.unwrap_err();
        assert_eq!(err.user_message(), "Please set your MNEMONIC in a .env file");
        assert_eq!(err.exit_code(), 78);
    }

    #[tokio::test]
    async fn modules_require_secrets_like_every_command() {
        let err = run_to_string(Command::Modules, &Environment::default())
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Please set your MNEMONIC in a .env file");
    }

    #[tokio::test]
    async fn modules_list_units() {
        let out = run_to_string(Command::Modules, &env()).await.unwrap();
        assert!(out.contains("ReferralModule#referral = ReferralSystem(0x337610d27c682e347c9cd60bd4b3b107c9d34ddd, [1000, 2000])"));
        assert!(out.contains("VnodeModule#vnode = Vnode()"));
    }

    #[tokio::test]
    async fn config_renders_json_and_toml() {
        let json = run_to_string(
            Command::Config {
                format: Format::Json,
            },
            &env(),
        )
        .await
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["defaultNetwork"], "sepolia");
        assert_eq!(value["networks"].as_array().unwrap().len(), 14);
        assert!(!json.contains("bscscan-key-value"));

        let toml = run_to_string(
            Command::Config {
                format: Format::Toml,
            },
            &env(),
        )
        .await
        .unwrap();
        assert!(toml.contains("defaultNetwork = \"sepolia\""));
        assert!(!toml.contains("0123456789abcdef0123"));
    }

    #[tokio::test]
    async fn plan_writes_file_when_requested() {
        let tmp = tempfile::tempdir().unwrap();
        let out = run_to_string(
            Command::Plan {
                module: "ReferralSystem".into(),
                network: Some("bsc-testnet".into()),
                out: Some(tmp.path().to_path_buf()),
            },
            &env(),
        )
        .await
        .unwrap();

        let plan: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(plan["deploymentId"], "chain-97");
        assert_eq!(plan["contracts"][0]["constructorArgs"][1], serde_json::json!(["1000", "2000"]));
        assert!(
            tmp.path()
                .join("chain-97")
                .join("ReferralModule.plan.json")
                .exists()
        );
    }

    #[tokio::test]
    async fn plan_rejects_unknown_module() {
        let err = run_to_string(
            Command::Plan {
                module: "Lock".into(),
                network: None,
                out: None,
            },
            &env(),
        )
        .await
        .unwrap_err();
        assert!(err.user_message().contains("Lock"));
    }

    #[tokio::test]
    async fn accounts_lists_paths() {
        let out = run_to_string(
            Command::Accounts {
                network: Some("mainnet".into()),
            },
            &env(),
        )
        .await
        .unwrap();
        assert!(out.starts_with("mainnet (10 accounts from m/44'/60'/0'/0)"));
        assert!(out.contains("m/44'/60'/0'/0/9"));
    }

    #[tokio::test]
    async fn verify_id_reports_deployment_and_key() {
        let out = run_to_string(
            Command::VerifyId {
                network: Some("bsc-testnet".into()),
            },
            &env(),
        )
        .await
        .unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("chain-97"));
        assert!(lines.next().unwrap().contains("'bscTestnet' is set"));
    }

    #[tokio::test]
    async fn check_against_missing_local_node_suggests_starting_it() {
        let env = env().with("RPC_URL_HARDHAT", "http://127.0.0.1:9");
        let err = run_to_string(
            Command::Check {
                network: Some("hardhat".into()),
            },
            &env,
        )
        .await
        .unwrap_err();
        assert_eq!(err.category(), vnode_core::ErrorCategory::NetworkError);
        assert!(err.user_message().contains("is the local node running"));
    }

    #[tokio::test]
    async fn failed_check_keeps_provider_key_out_of_errors() {
        let env = env().with("RPC_URL_SEPOLIA", "http://127.0.0.1:9/v3/0123456789abcdef0123");
        let err = run_to_string(
            Command::Check {
                network: Some("sepolia".into()),
            },
            &env,
        )
        .await
        .unwrap_err();
        assert!(!err.user_message().contains("0123456789abcdef0123"));
        assert!(!err.to_string().contains("0123456789abcdef0123"));
    }

    #[tokio::test]
    async fn unknown_network_is_config_error() {
        let err = run_to_string(
            Command::Accounts {
                network: Some("goerli".into()),
            },
            &env(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.category(), vnode_core::ErrorCategory::ConfigError);
    }
}
