//! `--name value` / `--name=value` lookups over the process arguments.

use std::path::PathBuf;

pub fn parse_str_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    find_arg(&args, name)
}

pub fn parse_path_arg(name: &str) -> Option<PathBuf> {
    parse_str_arg(name).map(PathBuf::from)
}

pub fn parse_i32_arg(name: &str) -> Option<i32> {
    parse_str_arg(name).and_then(|v| v.parse::<i32>().ok())
}

pub fn has_flag(name: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == name)
}

pub fn find_arg(args: &[String], name: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}=")) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
