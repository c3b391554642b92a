//! Config file search locations and `~` expansion.

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;

/// Environment variable that points at an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SLOG_CONFIG";

const CONFIG_FILE_NAME: &str = "slog.conf";

/// The current user's home directory, if it is valid UTF-8.
pub fn home_dir() -> Option<Utf8PathBuf> {
    let dirs = BaseDirs::new()?;
    Utf8PathBuf::from_path_buf(dirs.home_dir().to_path_buf()).ok()
}

/// Directory holding the running executable.
pub(crate) fn exe_dir() -> Option<Utf8PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let exe = Utf8PathBuf::from_path_buf(exe).ok()?;
    exe.parent().map(Utf8Path::to_path_buf)
}

/// Config file locations in priority order.
///
/// Home-relative entries are skipped when there is no home directory, and
/// the executable-adjacent entry when the executable path is unknown.
pub fn search_paths(home: Option<&Utf8Path>, exe_dir: Option<&Utf8Path>) -> Vec<Utf8PathBuf> {
    let mut paths = Vec::with_capacity(4);
    if let Some(home) = home {
        paths.push(home.join(".config").join("slog").join(CONFIG_FILE_NAME));
        paths.push(home.join(".slog.conf"));
    }
    paths.push(Utf8PathBuf::from("/etc/slog").join(CONFIG_FILE_NAME));
    if let Some(dir) = exe_dir {
        paths.push(dir.join(CONFIG_FILE_NAME));
    }
    paths
}

/// Expand a leading `~` or `~/` to the home directory.
///
/// `~user` forms and paths without a tilde are returned unchanged.
pub fn expand_tilde(raw: &str, home: Option<&Utf8Path>) -> Utf8PathBuf {
    let Some(home) = home else {
        return Utf8PathBuf::from(raw);
    };
    if raw == "~" {
        home.to_path_buf()
    } else if let Some(rest) = raw.strip_prefix("~/") {
        home.join(rest)
    } else {
        Utf8PathBuf::from(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_order() {
        let home = Utf8Path::new("/home/alice");
        let exe = Utf8Path::new("/opt/slog/bin");
        let paths = search_paths(Some(home), Some(exe));
        assert_eq!(
            paths,
            vec![
                Utf8PathBuf::from("/home/alice/.config/slog/slog.conf"),
                Utf8PathBuf::from("/home/alice/.slog.conf"),
                Utf8PathBuf::from("/etc/slog/slog.conf"),
                Utf8PathBuf::from("/opt/slog/bin/slog.conf"),
            ]
        );
    }

    #[test]
    fn test_search_without_home() {
        let paths = search_paths(None, None);
        assert_eq!(paths, vec![Utf8PathBuf::from("/etc/slog/slog.conf")]);
    }

    #[test]
    fn test_expand_tilde() {
        let home = Some(Utf8Path::new("/home/alice"));
        assert_eq!(expand_tilde("~", home), Utf8PathBuf::from("/home/alice"));
        assert_eq!(
            expand_tilde("~/logs/out", home),
            Utf8PathBuf::from("/home/alice/logs/out")
        );
        assert_eq!(
            expand_tilde("/scratch/logs", home),
            Utf8PathBuf::from("/scratch/logs")
        );
        assert_eq!(expand_tilde("~bob/logs", home), Utf8PathBuf::from("~bob/logs"));
        assert_eq!(expand_tilde("~/logs", None), Utf8PathBuf::from("~/logs"));
    }
}
