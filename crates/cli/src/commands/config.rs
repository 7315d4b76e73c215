//! Config commands (show, init)

use std::path::Path;

use anyhow::{Context, Result, bail};
use hashvault::config::Config;

/// Show the effective configuration and where it came from
pub fn cmd_config_show(explicit: Option<&Path>) -> Result<()> {
  let config = Config::load(explicit).context("Failed to load config")?;

  match explicit {
    Some(path) => println!("Using config: {:?}", path),
    None => {
      let user_config = Config::user_config_path();
      if user_config.exists() {
        println!("Using user config: {:?}", user_config);
      } else {
        println!("Using default configuration (no config file found)");
      }
    }
  }
  println!();

  println!("{}", config.to_toml()?);
  Ok(())
}

/// Write the default template to the user config path (or `--config`)
pub fn cmd_config_init(explicit: Option<&Path>, force: bool) -> Result<()> {
  let path = explicit
    .map(Path::to_path_buf)
    .unwrap_or_else(Config::user_config_path);

  write_template(&path, force)?;

  println!("Created config: {:?}", path);
  println!("Edit the file to customize settings.");
  Ok(())
}

fn write_template(path: &Path, force: bool) -> Result<()> {
  if path.exists() && !force {
    bail!("Config file already exists: {:?} (use --force to overwrite)", path);
  }

  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
  }
  std::fs::write(path, Config::generate_template()).with_context(|| format!("Failed to write {:?}", path))?;
  Ok(())
}
