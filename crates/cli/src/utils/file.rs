use cfml_lens_core::Config;
use std::path::Path;

/// Determine the type of file for display purposes
pub fn determine_file_type(path: &Path, config: &Config) -> String {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let stem = path.file_stem().and_then(|n| n.to_str()).unwrap_or("");

    if config.is_component_file(path) {
        if stem.eq_ignore_ascii_case("application") {
            "⚙️  Application.cfc (application settings)".to_string()
        } else if stem.eq_ignore_ascii_case("server") {
            "🖥️  Server.cfc (server settings)".to_string()
        } else if is_test_file(path) {
            "🧪 test component".to_string()
        } else {
            "🧩 component".to_string()
        }
    } else if config.is_template_file(path) {
        if stem.eq_ignore_ascii_case("application") {
            "⚙️  Application.cfm (application settings)".to_string()
        } else {
            "📄 template".to_string()
        }
    } else if file_name == ".cfml-lens.json" {
        "🔧 configuration".to_string()
    } else {
        "📄 file".to_string()
    }
}

/// Check if a path is likely a test file
pub fn is_test_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    let stem = path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();

    path_str.contains("/tests/") || stem.ends_with("test") || stem.ends_with("spec")
}
