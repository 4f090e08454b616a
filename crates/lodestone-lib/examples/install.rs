//! Small driver over the engine.
//!
//! ```text
//! cargo run --example install -- install 1.20.1
//! cargo run --example install -- list [--releases]
//! cargo run --example install -- installed
//! cargo run --example install -- cleanup
//! ```
//!
//! The cache root is `$MINECRAFT_HOME`, or `~/.minecraft` when unset.

use anyhow::Result;
use lodestone_lib::EngineConfig;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = EngineConfig::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let force = args.iter().any(|a| a == "--force");

    match args.first().map(String::as_str) {
        Some("install") => match args.get(1).filter(|a| !a.starts_with("--")) {
            Some(id) => lodestone_lib::install(&config, id, force).await?,
            None => lodestone_lib::install_all(&config, force).await?,
        },
        Some("list") => {
            let release_only = args.iter().any(|a| a == "--releases");
            for v in lodestone_lib::list_available(&config, release_only).await? {
                let mut tags = Vec::new();
                if v.latest_release {
                    tags.push("latest release");
                }
                if v.latest_snapshot {
                    tags.push("latest snapshot");
                }
                if v.installed {
                    tags.push("installed");
                }
                println!("{:<24} {:<10} {}", v.id, v.version_type, tags.join(", "));
            }
        }
        Some("installed") => {
            for id in lodestone_lib::list_installed(&config).await? {
                println!("{}", id);
            }
        }
        Some("remove") => {
            let Some(id) = args.get(1) else {
                anyhow::bail!("usage: remove <version>");
            };
            if !lodestone_lib::remove(&config, id).await? {
                println!("{} is not installed", id);
            }
        }
        Some("cleanup") => {
            let report = lodestone_lib::cleanup(&config).await?;
            println!(
                "Removed {} files ({} bytes) and {} empty directories",
                report.removed_files.len(),
                report.freed_bytes,
                report.removed_dirs
            );
        }
        _ => {
            eprintln!("usage: install [<version>] [--force] | list [--releases] | installed | remove <version> | cleanup");
            std::process::exit(2);
        }
    }
    Ok(())
}
