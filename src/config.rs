use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
}

impl AppPaths {
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("nestegg.sqlite3")
    }
}

pub fn app_paths(override_home: Option<PathBuf>) -> Result<AppPaths> {
    if let Some(home) = override_home {
        return Ok(AppPaths {
            data_dir: home.join("data"),
        });
    }

    let proj = ProjectDirs::from("com", "nestegg", "nestegg")
        .context("Failed to resolve platform directories")?;

    Ok(AppPaths {
        data_dir: proj.data_dir().to_path_buf(),
    })
}
