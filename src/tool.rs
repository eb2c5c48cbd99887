use crate::error::ToolError;
use std::ffi::OsStr;
use std::io::ErrorKind;
use std::process::Command;

/// Run an external tool with a structured argument array and return its
/// stdout. Arguments are never passed through a shell.
pub fn run<S, I, A>(tool: &'static str, program: S, args: I) -> Result<String, ToolError>
where
    S: AsRef<OsStr>,
    I: IntoIterator<Item = A>,
    A: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ToolError::Missing { tool }
            } else {
                ToolError::Spawn { tool, source }
            }
        })?;

    if !output.status.success() {
        return Err(ToolError::Failed {
            tool,
            status: output.status,
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
