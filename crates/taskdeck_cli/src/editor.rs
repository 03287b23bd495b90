//! External editor launcher for `note open`.

use anyhow::{bail, Context, Result};
use log::info;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

/// Runs `editor` on `path` and waits for it to exit.
///
/// `editor` may carry arguments (`code --wait`); it is split on whitespace
/// without shell quoting, so the program path itself must not contain
/// spaces. Point the config at a wrapper script or a symlink instead.
pub fn open_in_editor(editor: &str, path: &Path) -> Result<()> {
    let (program, args) = editor_command(editor, path)?;
    let status = Command::new(&program)
        .args(&args)
        .status()
        .with_context(|| format!("failed to launch editor `{program}`"))?;
    if !status.success() {
        bail!("editor `{program}` exited with {status}");
    }
    info!("event=note_open module=cli status=ok");
    Ok(())
}

fn editor_command(editor: &str, path: &Path) -> Result<(String, Vec<OsString>)> {
    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        bail!("editor command is empty");
    };
    let mut args: Vec<OsString> = parts.map(OsString::from).collect();
    args.push(path.as_os_str().to_os_string());
    Ok((program.to_string(), args))
}
