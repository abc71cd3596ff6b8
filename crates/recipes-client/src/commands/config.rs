//! Config commands

use recipes_client::{ClientConfig, Result};

use super::Context;
use crate::ConfigCommands;

pub fn handle(action: ConfigCommands, ctx: &Context, profile: Option<&str>) -> Result<()> {
    match action {
        ConfigCommands::Init => {
            let path = ClientConfig::default().save(profile)?;
            println!("Configuration initialized at {}", path.display());
        }
        ConfigCommands::Show => ctx.format.print(&ctx.config),
    }
    Ok(())
}
