//! HTML → PDF through an external engine process.
//!
//! Two engines are supported: `wkhtmltopdf` and a headless Chrome/Chromium
//! (`--print-to-pdf`). The page is written to a temp directory, the engine
//! renders next to it, and the PDF bytes are only copied to the output path
//! once the engine has exited successfully, so a failed run never leaves a
//! truncated PDF behind.

use crate::error::EzmdError;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;
use tracing::{debug, info};
use url::Url;
use which::which;

/// Environment variable naming the engine binary to use.
pub const ENGINE_ENV: &str = "EZMD_PDF_ENGINE";

const CHROME_CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
    "msedge",
];

/// A resolved HTML-to-PDF engine binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfEngine {
    Wkhtmltopdf(PathBuf),
    Chrome(PathBuf),
}

impl PdfEngine {
    /// Find an engine: `EZMD_PDF_ENGINE`, then `wkhtmltopdf`, then Chrome.
    pub fn detect() -> Result<Self, EzmdError> {
        if let Some(path) = env::var_os(ENGINE_ENV) {
            if !path.is_empty() {
                return Ok(Self::from_path(PathBuf::from(path)));
            }
        }
        if let Ok(path) = which("wkhtmltopdf") {
            return Ok(PdfEngine::Wkhtmltopdf(path));
        }
        for candidate in CHROME_CANDIDATES {
            if let Ok(path) = which(candidate) {
                return Ok(PdfEngine::Chrome(path));
            }
        }
        #[cfg(target_os = "macos")]
        {
            let app = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
            if app.exists() {
                return Ok(PdfEngine::Chrome(app));
            }
        }
        Err(EzmdError::PdfEngineNotFound)
    }

    /// Classify an explicit binary path by its file name.
    pub fn from_path(path: PathBuf) -> Self {
        let is_wkhtml = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase().contains("wkhtmltopdf"))
            .unwrap_or(false);
        if is_wkhtml {
            PdfEngine::Wkhtmltopdf(path)
        } else {
            PdfEngine::Chrome(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            PdfEngine::Wkhtmltopdf(p) | PdfEngine::Chrome(p) => p,
        }
    }

    /// Render `html` and return the PDF bytes.
    pub fn render(&self, html: &str) -> Result<Vec<u8>, EzmdError> {
        let failed = |detail: String| EzmdError::PdfRenderFailed {
            engine: self.path().to_path_buf(),
            detail,
        };

        let temp_dir = tempdir().map_err(|e| failed(format!("temp dir error: {e}")))?;
        let html_path = temp_dir.path().join("ezmd-page.html");
        let pdf_path = temp_dir.path().join("ezmd-page.pdf");
        fs::write(&html_path, html).map_err(|e| failed(e.to_string()))?;

        let mut cmd = Command::new(self.path());
        match self {
            PdfEngine::Wkhtmltopdf(_) => {
                cmd.arg("--quiet")
                    .arg("--encoding")
                    .arg("utf-8")
                    .arg("--enable-local-file-access")
                    .arg(&html_path)
                    .arg(&pdf_path);
            }
            PdfEngine::Chrome(_) => {
                let file_url = Url::from_file_path(&html_path)
                    .map_err(|_| failed("cannot build file:// URL for the page".into()))?;
                cmd.arg("--headless")
                    .arg("--disable-gpu")
                    .arg("--no-sandbox")
                    .arg("--disable-dev-shm-usage")
                    .arg("--allow-file-access-from-files")
                    .arg("--print-to-pdf-no-header")
                    .arg(format!("--print-to-pdf={}", pdf_path.display()))
                    .arg(file_url.as_str());
            }
        }

        debug!(engine = %self.path().display(), "running PDF engine");
        let output = cmd
            .output()
            .map_err(|e| failed(format!("failed to launch: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        fs::read(&pdf_path).map_err(|e| failed(format!("no PDF produced: {e}")))
    }
}

/// Point relative URLs (images, links) at `base_dir` by adding a `<base>`.
pub fn with_base_href(html: &str, base_dir: &Path) -> String {
    let Ok(base) = Url::from_directory_path(base_dir) else {
        return html.to_string();
    };
    let tag = format!("<base href=\"{base}\">");
    match html.find("<head>") {
        Some(idx) => {
            let at = idx + "<head>".len();
            format!("{}\n        {}{}", &html[..at], tag, &html[at..])
        }
        None => format!("{tag}{html}"),
    }
}

/// Render `html` with the detected engine and write the PDF to `output`.
///
/// `base_dir` is where relative image paths are resolved from, normally the
/// input document's directory. Returns the number of bytes written.
pub fn html_to_pdf(html: &str, output: &Path, base_dir: Option<&Path>) -> Result<usize, EzmdError> {
    let engine = PdfEngine::detect()?;
    info!(engine = %engine.path().display(), "rendering PDF");

    let page = match base_dir {
        Some(dir) => with_base_href(html, dir),
        None => html.to_string(),
    };
    let bytes = engine.render(&page)?;
    fs::write(output, &bytes).map_err(|source| EzmdError::OutputWriteFailed {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(bytes.len())
}
