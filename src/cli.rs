use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the config file. Created with defaults if missing.
    #[clap(short, long, default_value = "config.yaml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the lookup service.
    Serve {},

    /// Look up a single profile and print it
    Lookup {
        /// tiktok, github, instagram, pinterest, twitter, youtube or roblox.
        ///
        /// *Defaults to `default_platform` from the config*
        #[clap(short, long)]
        platform: Option<String>,

        /// Username, with or without a leading @
        #[clap(allow_hyphen_values = true)]
        username: String,

        /// Print the raw JSON envelope instead of a card
        #[clap(long, default_value = "false")]
        json: bool,
    },
}
