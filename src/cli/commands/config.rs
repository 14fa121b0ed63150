use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{field, header, info};
use std::path::Path;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config, dir: &Path) -> AppResult<()> {
    if let Commands::Config { print_config } = cmd {
        let path = Config::config_file(dir);

        if *print_config {
            header("Current configuration");
            field("File", path.display());
            if !path.exists() {
                info("No configuration file yet, showing defaults (run `timesheet init`).");
            }
            println!();
            print!("{}", serde_yaml::to_string(cfg)?);
        } else {
            field("Config file", path.display());
        }
    }

    Ok(())
}
