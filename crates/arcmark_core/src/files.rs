use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

/// Locate `StorableSidebar.json` in the platform's Arc profile directory.
/// Returns `None` when Arc's data cannot be found (or on platforms Arc does
/// not ship for); the caller asks the user for an explicit path instead.
pub fn default_sidebar_path() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        macos_sidebar_path()
    }
    #[cfg(windows)]
    {
        windows_sidebar_path()
    }
    #[cfg(not(any(target_os = "macos", windows)))]
    {
        None
    }
}

#[cfg(target_os = "macos")]
fn macos_sidebar_path() -> Option<PathBuf> {
    let candidate = dirs::home_dir()?
        .join("Library")
        .join("Application Support")
        .join("Arc")
        .join("StorableSidebar.json");
    candidate.is_file().then_some(candidate)
}

#[cfg(windows)]
fn windows_sidebar_path() -> Option<PathBuf> {
    let packages = PathBuf::from(std::env::var_os("LOCALAPPDATA")?).join("Packages");
    let mut names = fs::read_dir(&packages)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name())
        .filter(|name| name.to_string_lossy().starts_with("TheBrowserCompany.Arc"))
        .collect::<Vec<_>>();
    names.sort();
    for name in names {
        let candidate = packages
            .join(&name)
            .join("LocalCache")
            .join("Local")
            .join("Arc")
            .join("StorableSidebar.json");
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

pub fn read_sidebar_file(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read sidebar file {}", path.display()))
}

/// Write the finished document through a sibling temp file and a rename, so
/// an interrupted run never leaves a partial bookmarks file behind.
pub fn write_bookmarks_file(path: &Path, html: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("output path has no file name: {}", path.display()))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, html)
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to move output into place at {}", path.display()))?;
    Ok(())
}
