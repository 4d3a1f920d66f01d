//! Desktop background integration
//!
//! Applies a local image file as the desktop wallpaper through the host OS
//! mechanism for each platform.

use std::path::Path;

/// Set the desktop background to the image at `path`
pub fn set_background_image(path: &Path) -> Result<(), String> {
    let absolute = path
        .canonicalize()
        .map_err(|e| format!("Cannot resolve image path: {}", e))?;

    #[cfg(target_os = "macos")]
    {
        let script = format!(
            "tell application \"System Events\" to tell every desktop to set picture to \"{}\"",
            absolute.display()
        );
        let status = std::process::Command::new("osascript")
            .args(["-e", &script])
            .status()
            .map_err(|e| format!("Failed to run osascript: {}", e))?;
        if !status.success() {
            return Err(format!("osascript exited with {}", status));
        }
    }

    #[cfg(target_os = "windows")]
    {
        // SystemParametersInfo(SPI_SETDESKWALLPAPER, 0, path, SPIF_UPDATEINIFILE | SPIF_SENDCHANGE)
        let script = format!(
            "Add-Type -TypeDefinition 'using System.Runtime.InteropServices; public class Wallpaper {{ [DllImport(\"user32.dll\", CharSet = CharSet.Auto)] public static extern int SystemParametersInfo(int uAction, int uParam, string lpvParam, int fuWinIni); }}'; [Wallpaper]::SystemParametersInfo(20, 0, '{}', 3)",
            absolute.display()
        );
        let status = std::process::Command::new("powershell")
            .args(["-NoProfile", "-Command", &script])
            .status()
            .map_err(|e| format!("Failed to run powershell: {}", e))?;
        if !status.success() {
            return Err(format!("powershell exited with {}", status));
        }
    }

    #[cfg(target_os = "linux")]
    {
        let uri = format!("file://{}", absolute.display());
        let status = std::process::Command::new("gsettings")
            .args(["set", "org.gnome.desktop.background", "picture-uri", &uri])
            .status()
            .map_err(|e| format!("Failed to run gsettings: {}", e))?;
        if !status.success() {
            return Err(format!("gsettings exited with {}", status));
        }
    }

    log::info!("Desktop background set to {}", absolute.display());
    Ok(())
}
