//! Records git and compiler information for `publishctl --version`.

fn main() {
    // the library alone has no use for it
    if std::env::var_os("CARGO_FEATURE_BINARY").is_some() {
        built::write_built_file().expect("failed to collect build-time information");
    }
}
