//! Stylesheet discovery.
//!
//! The chrome and built-in pages use `style.css` from the first directory
//! that has one. A missing or unreadable file is never fatal: the embedded
//! default is used and a warning logged.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

pub const STYLESHEET_NAME: &str = "style.css";

/// Built-in stylesheet. Colors come from the theme engine's variables.
pub const DEFAULT_STYLESHEET: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
body{font-family:var(--font-family);background:var(--bg-primary);color:var(--text-primary)}
a{color:var(--accent-color);text-decoration:none}
button{background:var(--bg-secondary);color:var(--text-primary);border:1px solid var(--border-color);border-radius:6px;padding:4px 10px;cursor:pointer}
button:hover{background:var(--hover-bg)}
button.primary{background:var(--accent-color);border-color:var(--accent-color);color:#fff}
input,select{background:var(--input-bg);color:var(--text-primary);border:1px solid var(--border-color);border-radius:8px;padding:6px 10px}
.page{max-width:760px;margin:0 auto;padding:32px 24px}
.page h1{font-size:22px;margin-bottom:16px;color:var(--accent-color)}
.row{display:flex;align-items:center;gap:12px;margin:8px 0}
.row label{min-width:220px;color:var(--text-secondary)}
.muted{color:var(--text-secondary);font-size:12px}
.entry{display:flex;gap:12px;padding:6px 0;border-bottom:1px solid var(--border-color)}
.newtab{display:flex;flex-direction:column;align-items:center;justify-content:center;height:100vh;gap:18px}
.newtab input{width:min(560px,90vw);font-size:16px;padding:10px 16px;border-radius:22px}
.chrome{display:flex;flex-direction:column;background:var(--bg-secondary);border-bottom:1px solid var(--border-color);user-select:none}
.tabs{display:flex;gap:2px;padding:4px 4px 0;overflow-x:auto}
.tab{display:flex;align-items:center;gap:6px;max-width:220px;padding:4px 8px;border-radius:6px 6px 0 0;cursor:default;white-space:nowrap;overflow:hidden}
.tab.active{background:var(--bg-primary)}
.tab .close{border:none;background:none;padding:0 4px}
.toolbar{display:flex;gap:4px;padding:4px}
.toolbar input{flex:1}
"#;

/// A stylesheet and where it came from (`None` means embedded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    pub css: String,
    pub source: Option<PathBuf>,
}

/// Directories searched for `style.css`, in priority order.
pub fn search_dirs(data_dir: &Path) -> Vec<PathBuf> {
    let mut dirs = vec![data_dir.to_path_buf()];
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir.join("data"));
        dirs.push(exe_dir.join("..").join("data"));
    }
    dirs.push(PathBuf::from("/usr/share/driftwood/data"));
    dirs.push(PathBuf::from("data"));
    dirs
}

/// Loads the first readable `style.css` from `dirs`, else the embedded default.
pub fn load_stylesheet(dirs: &[PathBuf]) -> Stylesheet {
    for dir in dirs {
        let candidate = dir.join(STYLESHEET_NAME);
        if !candidate.is_file() {
            continue;
        }
        match fs::read_to_string(&candidate) {
            Ok(css) => {
                info!("stylesheet loaded from {}", candidate.display());
                return Stylesheet {
                    css,
                    source: Some(candidate),
                };
            }
            Err(e) => warn!("failed to read {}: {}", candidate.display(), e),
        }
    }
    warn!("{} not found, using embedded stylesheet", STYLESHEET_NAME);
    Stylesheet {
        css: DEFAULT_STYLESHEET.to_string(),
        source: None,
    }
}
