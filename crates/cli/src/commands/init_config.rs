use tokio::{fs, io::AsyncWriteExt};

use crate::config::Config;

use super::{Command, Context};

/// Write the config file.
///
/// The current config is written, i.e. the defaults merged with the existing
/// file, the environment and the command line options.
#[derive(Debug, clap::Args)]
pub struct InitConfig {
    /// Replace the config file if it exists.
    #[arg(long, short)]
    force: bool,
    /// Write the defaults instead of the current config.
    #[arg(long)]
    defaults: bool,
}

impl Command for InitConfig {
    async fn execute(&self, ctx: Context<'_>) -> eyre::Result<()> {
        let path = ctx.config_path();
        if !self.force && fs::try_exists(path).await? {
            eyre::bail!(
                "`{}` already exists, use `--force` to replace it",
                path.display()
            );
        }

        let content = if self.defaults {
            toml::to_string_pretty(&Config::default())?
        } else {
            toml::to_string_pretty(ctx.config())?
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = fs::File::create(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        tracing::info!(path = %path.display(), "wrote config");

        Ok(())
    }
}
