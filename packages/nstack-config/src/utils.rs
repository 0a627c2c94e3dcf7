use std::{env, io, path::PathBuf};

pub struct DataDir {
    pub data_dir: PathBuf,
}

#[cfg(all(
    target_family = "unix",
    not(target_os = "macos"),
    not(target_os = "android")
))]
pub fn all_dir() -> Result<DataDir, io::Error> {
    let home_dir = env::var("HOME")
        .map_err(|_| io::Error::new(io::ErrorKind::NotFound, "HOME not found"))
        .map(PathBuf::from)?;
    Ok(DataDir {
        data_dir: home_dir.join(".local/share/nstack/"),
    })
}

#[cfg(target_os = "macos")]
pub fn all_dir() -> Result<DataDir, io::Error> {
    let home_dir = env::var("HOME")
        .map_err(|_| io::Error::new(io::ErrorKind::NotFound, "HOME not found"))
        .map(PathBuf::from)?;
    Ok(DataDir {
        data_dir: home_dir.join("Library/Application Support/nstack/"),
    })
}

#[cfg(target_family = "windows")]
pub fn all_dir() -> Result<DataDir, io::Error> {
    let home_dir = env::var("APPDATA")
        .map_err(|_| io::Error::new(io::ErrorKind::NotFound, "APPDATA not found"))
        .map(PathBuf::from)?;
    Ok(DataDir {
        data_dir: home_dir.join("nstack/data/"),
    })
}

#[cfg(target_os = "android")]
pub fn all_dir() -> Result<DataDir, io::Error> {
    let home_dir = env::var("HOME")
        .map_err(|_| io::Error::new(io::ErrorKind::NotFound, "HOME not found"))
        .map(PathBuf::from)?;
    Ok(DataDir {
        data_dir: home_dir.join(".nstack/data/"),
    })
}

/// Resolve `sub` inside the data directory; `NSTACK_DATA_DIR` takes precedence.
pub fn get_data_path(sub: &str) -> Result<PathBuf, io::Error> {
    let data_dir = match env::var("NSTACK_DATA_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => all_dir()?.data_dir,
    };
    Ok(data_dir.join(sub))
}
