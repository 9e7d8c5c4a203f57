use std::path::{Path, PathBuf};

use chrono::Local;

/// Output path for one workbook: `<dir>/<prefix>_<timestamp>.xlsx`, so
/// repeated exports never clobber each other.
pub fn timestamped_workbook_path(dir: &Path, prefix: &str) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("{prefix}_{stamp}.xlsx"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_embeds_prefix_and_extension() {
        let path = timestamped_workbook_path(Path::new("/tmp"), "ctos_new");
        let name = path.file_name().and_then(|n| n.to_str()).expect("file name");
        assert!(name.starts_with("ctos_new_"));
        assert!(name.ends_with(".xlsx"));
        // prefix + `_` + YYYYMMDD + `_` + HHMMSS + `.xlsx`
        assert_eq!(name.len(), "ctos_new_".len() + 15 + ".xlsx".len());
    }
}
