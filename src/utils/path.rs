use std::path::{Path, PathBuf};

/// Maximum length (in characters) of the title part of a mirrored folder name
pub const MAX_FOLDER_TITLE_LEN: usize = 50;

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", "pinacoteca", "Pinacoteca")
}

/// Platform data directory, falling back to `./data`
pub fn get_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./data"))
}

/// Default database path
pub fn get_database_path() -> PathBuf {
    get_data_dir().join("pinacoteca.db")
}

/// Default settings file path
pub fn get_settings_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().join("settings.toml"))
        .unwrap_or_else(|| PathBuf::from("settings.toml"))
}

/// Shorten the home directory to `~` for log output
pub fn display_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

/// Make a catalog title usable as the tail of a folder name.
///
/// Drops characters that are illegal in file names, keeps at most
/// [`MAX_FOLDER_TITLE_LEN`] characters, trims and joins words with `_`.
pub fn sanitize_folder_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .filter(|c| !c.is_control())
        .take(MAX_FOLDER_TITLE_LEN)
        .collect();

    let result = cleaned.trim().replace(' ', "_");

    if result.is_empty() {
        "untitled".to_string()
    } else {
        result
    }
}

/// Lowercase file extension
pub fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
}

/// Whether a file looks like a photograph we can store
pub fn is_image_file(path: &Path) -> bool {
    matches!(
        get_extension(path).as_deref(),
        Some("jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "tif" | "tiff")
    )
}
