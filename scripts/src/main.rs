use bridge_scripts::{cli::Cli, errors::ScriptError, utils::setup_client};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let Cli {
        priv_key,
        rpc_url,
        command,
    } = Cli::parse();

    tracing_subscriber::fmt().pretty().init();

    let client = setup_client(&priv_key, &rpc_url)?;

    command.run(&client).await
}
