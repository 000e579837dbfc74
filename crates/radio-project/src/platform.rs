use std::path::PathBuf;

const APP_DIR: &str = "tuneincrew-radio";

/// Scratch project written when TuneInCrew is run before the first save.
pub const TEMP_PROJECT_FILE: &str = "temp_radio.xml";

pub fn data_dir() -> PathBuf {
    // On macOS and Linux, use ~/.local/share/tuneincrew-radio/ (XDG standard)
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join(APP_DIR)
    }
    #[cfg(windows)]
    {
        // Portable install: data/ beside the executable wins
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let portable_data = exe_dir.join("data");
                if portable_data.exists() {
                    return portable_data;
                }
            }
        }

        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

pub fn config_dir() -> PathBuf {
    // On Windows, check for portable config.toml in executable directory first
    #[cfg(windows)]
    {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let portable_config = exe_dir.join("config.toml");
                if portable_config.exists() {
                    return exe_dir.to_path_buf();
                }
            }
        }
    }

    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join(APP_DIR)
    }

    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

#[cfg(unix)]
fn tuneincrew_binary_names() -> &'static [&'static str] {
    &["TuneInCrew", "tuneincrew", "TuneInCrew.exe"]
}

#[cfg(windows)]
fn tuneincrew_binary_names() -> &'static [&'static str] {
    &["TuneInCrew.exe", "tuneincrew.exe"]
}

fn find_beside_exe(names: &[&str]) -> Option<PathBuf> {
    let current_exe = std::env::current_exe().ok()?;
    let dir = current_exe.parent()?;
    for name in names {
        let p = dir.join(name);
        if p.is_file() {
            return Some(p);
        }
    }
    None
}

fn find_on_path(names: &[&str]) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        for name in names {
            let p = dir.join(name);
            if p.is_file() {
                return Some(p);
            }
        }
    }
    None
}

/// Find the TuneInCrew executable.
///
/// Searches in order:
/// 1. TUNEINCREW_PATH environment variable
/// 2. Beside current executable
/// 3. PATH
pub fn find_tuneincrew_binary() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("TUNEINCREW_PATH") {
        let path = PathBuf::from(p);
        if path.is_file() {
            return Some(path);
        }
    }

    if let Some(p) = find_beside_exe(tuneincrew_binary_names()) {
        return Some(p);
    }

    find_on_path(tuneincrew_binary_names())
}
