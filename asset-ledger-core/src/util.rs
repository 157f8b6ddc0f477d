use std::path::Path;

const BOM: char = '\u{feff}';

/// Strip a leading UTF-8 byte-order mark, which Windows-side tooling
/// writes in front of most record files.
pub fn strip_bom(s: &str) -> &str {
    s.strip_prefix(BOM).unwrap_or(s)
}

/// Whether a directory entry is a record file rather than an index or
/// scratch file. Records are `.json`; names starting with `_` and
/// `index.json` are reserved for tooling.
pub fn is_record_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.extension().is_some_and(|ext| ext == "json")
        && !name.starts_with('_')
        && name != "index.json"
}

/// Render a relative path with forward slashes regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
