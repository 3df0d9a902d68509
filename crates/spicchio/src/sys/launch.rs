use crate::catalog::{ExecCommand, LinkUrl};
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Nothing to run")]
    Empty,
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Drops desktop-entry field codes such as `%U`; nothing is passed for them.
pub fn strip_field_codes(exec: &str) -> String {
    shell_words::split(exec)
        .map(|args| {
            let clean_args: Vec<_> = args
                .into_iter()
                .filter(|arg| !arg.starts_with('%'))
                .collect();
            shell_words::join(clean_args)
        })
        .unwrap_or_else(|_| exec.to_string())
}

/// Runs `exec` through `sh -c`, detached from our stdio.
pub fn spawn_exec(exec: &ExecCommand) -> Result<(), LaunchError> {
    let command = strip_field_codes(exec);
    if command.trim().is_empty() {
        return Err(LaunchError::Empty);
    }
    Command::new("sh")
        .arg("-c")
        .arg(&command)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| LaunchError::Spawn { command, source })?;
    Ok(())
}

/// Bare hosts like `example.org` get `https://` in front.
pub fn link_target(url: &LinkUrl) -> String {
    let url = url.trim();
    if url.contains("://") || url.starts_with("mailto:") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

pub fn open_link(url: &LinkUrl) -> Result<(), LaunchError> {
    if url.trim().is_empty() {
        return Err(LaunchError::Empty);
    }
    let target = link_target(url);
    Command::new("xdg-open")
        .arg(&target)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            command: format!("xdg-open {}", target),
            source,
        })?;
    Ok(())
}
