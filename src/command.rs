use std::path::Path;

/// Per-run settings shared by every rsync invocation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransferOptions {
    /// Rendered ssh `ProxyCommand`, `None` for a direct connection.
    pub proxy_command: Option<String>,
    pub cache_dir: String,
    pub ignore_file: String,
}

/// Builds the shell command pushing `source` to `host:remote_path`.
///
/// Paths are interpolated as-is.
pub fn build_command(
    source: &Path,
    host: &str,
    remote_path: &str,
    options: &TransferOptions,
) -> String {
    let source = source.display();
    let mut command = String::from("rsync -avH ");

    if let Some(proxy) = &options.proxy_command {
        command.push_str(&transport_clause(proxy));
        command.push(' ');
    }

    command.push_str(&format!(
        "--exclude '{source}/{}/' --exclude-from={source}/{} {source} {host}:{remote_path}",
        options.cache_dir, options.ignore_file
    ));

    command
}

fn transport_clause(proxy_command: &str) -> String {
    format!("-e \"ssh -o ProxyCommand='{proxy_command}' \"")
}
