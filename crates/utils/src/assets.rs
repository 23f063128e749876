use directories::ProjectDirs;

const PROJECT_ROOT: &str = env!("CARGO_MANIFEST_DIR");
const ASSET_DIR_ENV: &str = "BIM_ASSET_DIR";

/// Resolve the directory holding the SQLite database, config file and any
/// static assets. `BIM_ASSET_DIR` overrides; debug builds default to a
/// `dev_assets` directory in the workspace.
pub fn asset_dir() -> std::path::PathBuf {
    if let Ok(override_dir) = std::env::var(ASSET_DIR_ENV) {
        let override_dir = override_dir.trim();
        if !override_dir.is_empty() {
            let path = std::path::PathBuf::from(override_dir);
            if !path.exists() {
                std::fs::create_dir_all(&path).expect("Failed to create asset directory");
            }
            return path;
        }
    }

    let path = if cfg!(debug_assertions) {
        std::path::PathBuf::from(PROJECT_ROOT).join("../../dev_assets")
    } else {
        ProjectDirs::from("com", "datumauto", "bim-command-center")
            .expect("OS didn't give us a home directory")
            .data_dir()
            .to_path_buf()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).expect("Failed to create asset directory");
    }

    path
}

pub fn config_path() -> std::path::PathBuf {
    asset_dir().join("config.json")
}

/// Default location of the company workbook the importer reads.
pub fn workbook_path() -> std::path::PathBuf {
    asset_dir().join("Projects DashBoard.xlsx")
}

/// Static frontend files, when deployed alongside the server.
pub fn public_dir() -> std::path::PathBuf {
    asset_dir().join("public")
}
