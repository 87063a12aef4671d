use crate::output::{print_json, yes_no};
use automaker_core::SettingsStore;
use std::path::Path;

pub fn run(data_dir: &Path, json: bool) -> anyhow::Result<()> {
    let status = SettingsStore::new(data_dir).status();

    if json {
        return print_json(&status);
    }

    println!("Data dir:         {}", status.data_dir.display());
    println!("Global settings:  {}", yes_no(status.has_global_settings));
    println!("Credentials:      {}", yes_no(status.has_credentials));
    if status.needs_migration {
        println!();
        println!("No settings file yet. Run `automaker migrate <export.json>` to import legacy data.");
    }
    Ok(())
}
