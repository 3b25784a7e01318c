//! Playback collaborator (C3) — invokes a platform audio player as a
//! subprocess and waits for it to exit.
//!
//! Grounded on the original `_play_audio`: `afplay` on macOS, `aplay` on
//! Linux, PowerShell's `SoundPlayer` on Windows, exit status ignored.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::PlayError;

/// Run the platform's audio player on `wav_path` and wait for it to exit.
/// The exit status is intentionally not inspected — a non-zero exit from
/// the player is not distinguishable from "played something unexpected" and
/// is not worth failing the job over.
pub async fn play(wav_path: &Path) -> Result<(), PlayError> {
    let status = build_command(wav_path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await?;
    let _ = status;
    Ok(())
}

#[cfg(target_os = "macos")]
fn build_command(wav_path: &Path) -> Command {
    let mut cmd = Command::new("afplay");
    cmd.arg(wav_path);
    cmd
}

#[cfg(target_os = "windows")]
fn build_command(wav_path: &Path) -> Command {
    let mut cmd = Command::new("powershell");
    cmd.args([
        "-Command",
        &format!(
            "(New-Object Media.SoundPlayer '{}').PlaySync()",
            wav_path.display()
        ),
    ]);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn build_command(wav_path: &Path) -> Command {
    let mut cmd = Command::new("aplay");
    cmd.arg(wav_path);
    cmd
}
