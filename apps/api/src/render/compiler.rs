//! LaTeX engine invocation.
//!
//! A run is accepted when it leaves a non-empty PDF behind, whatever the exit
//! code. Without one, the engine's `.log` decides which error is reported.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::RenderError;
use crate::render::log;
use crate::templates::config::Engine;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Turns a prepared workspace into PDF bytes.
#[async_trait]
pub trait DocumentCompiler: Send + Sync {
    /// Compiles `file_name` inside `workspace` with `engine`.
    async fn compile(
        &self,
        workspace: &Path,
        file_name: &str,
        engine: Engine,
    ) -> Result<Bytes, RenderError>;

    async fn engine_available(&self, engine: Engine) -> bool;
}

pub struct LatexCompiler {
    timeout: Duration,
    output_limit: usize,
    bin_dir: Option<PathBuf>,
}

struct PassOutput {
    status: ExitStatus,
    stdout: Vec<u8>,
}

impl LatexCompiler {
    pub fn new(timeout: Duration, output_limit: usize) -> Self {
        Self {
            timeout,
            output_limit,
            bin_dir: None,
        }
    }

    /// Looks engines up in `dir` instead of `PATH`.
    pub fn with_bin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bin_dir = Some(dir.into());
        self
    }

    fn program(&self, engine: Engine) -> PathBuf {
        match &self.bin_dir {
            Some(dir) => dir.join(engine.binary()),
            None => PathBuf::from(engine.binary()),
        }
    }

    async fn run_pass(
        &self,
        workspace: &Path,
        file_name: &str,
        engine: Engine,
    ) -> Result<PassOutput, RenderError> {
        let mut child = Command::new(self.program(engine))
            .arg("-interaction=nonstopmode")
            .arg("-halt-on-error")
            .arg(format!("-output-directory={}", workspace.display()))
            .arg(file_name)
            .current_dir(workspace)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                    RenderError::EngineUnavailable {
                        engine: engine.to_string(),
                    }
                }
                _ => RenderError::io(format!("starting {engine}"))(e),
            })?;

        let mut stdout = child.stdout.take();
        let limit = self.output_limit;
        let run = async {
            let output = match stdout.as_mut() {
                Some(reader) => read_bounded(reader, limit).await?,
                None => Vec::new(),
            };
            let status = child.wait().await?;
            Ok::<_, io::Error>(PassOutput {
                status,
                stdout: output,
            })
        };

        let outcome = tokio::time::timeout(self.timeout, run).await;
        match outcome {
            Ok(result) => result.map_err(RenderError::io(format!("running {engine}"))),
            Err(_) => {
                if let Err(e) = child.start_kill() {
                    warn!(engine = %engine, "Failed to kill timed-out engine: {e}");
                }
                Err(RenderError::CompilerTimeout {
                    seconds: self.timeout.as_secs(),
                })
            }
        }
    }
}

#[async_trait]
impl DocumentCompiler for LatexCompiler {
    async fn compile(
        &self,
        workspace: &Path,
        file_name: &str,
        engine: Engine,
    ) -> Result<Bytes, RenderError> {
        let base = Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.to_string());
        let pdf_path = workspace.join(format!("{base}.pdf"));
        let log_path = workspace.join(format!("{base}.log"));

        let mut pass = self.run_pass(workspace, file_name, engine).await?;
        debug!(engine = %engine, status = %pass.status, "First pass finished");

        // Second pass resolves references; its exit code alone never fails the job.
        if non_empty_file(&pdf_path).await {
            pass = self.run_pass(workspace, file_name, engine).await?;
            debug!(engine = %engine, status = %pass.status, "Second pass finished");
        }

        if non_empty_file(&pdf_path).await {
            let pdf = tokio::fs::read(&pdf_path)
                .await
                .map_err(RenderError::io("reading compiled PDF"))?;
            if !pass.status.success() {
                let excerpt = read_log(&log_path)
                    .await
                    .map(|l| log::fatal_excerpt(&l))
                    .unwrap_or_default();
                warn!(
                    engine = %engine,
                    status = %pass.status,
                    diagnostics = ?excerpt,
                    "Engine reported errors but produced a PDF"
                );
            }
            info!(engine = %engine, bytes = pdf.len(), "Compiled PDF");
            return Ok(Bytes::from(pdf));
        }

        debug!(
            engine = %engine,
            stdout_tail = %String::from_utf8_lossy(tail(&pass.stdout, 2048)),
            "Engine produced no PDF"
        );
        Err(log::diagnose(read_log(&log_path).await.as_deref()))
    }

    async fn engine_available(&self, engine: Engine) -> bool {
        let probe = Command::new(self.program(engine))
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status();
        matches!(
            tokio::time::timeout(PROBE_TIMEOUT, probe).await,
            Ok(Ok(status)) if status.success()
        )
    }
}

/// Reads up to `limit` bytes, then drains and discards the rest so the child never blocks on a full pipe.
async fn read_bounded<R: AsyncRead + Unpin>(mut reader: R, limit: usize) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    (&mut reader).take(limit as u64).read_to_end(&mut buf).await?;
    tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
    Ok(buf)
}

async fn non_empty_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

async fn read_log(path: &Path) -> Option<String> {
    tokio::fs::read(path)
        .await
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

fn tail(bytes: &[u8], max: usize) -> &[u8] {
    &bytes[bytes.len().saturating_sub(max)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_compiler(bin_dir: &Path, timeout: Duration) -> LatexCompiler {
        LatexCompiler::new(timeout, 1024).with_bin_dir(bin_dir)
    }

    #[cfg(unix)]
    fn install_fake_engine(dir: &Path, script: &str) {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("pdflatex");
        std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[tokio::test]
    async fn test_read_bounded_truncates_and_drains() {
        let data = vec![b'x'; 5000];
        let out = read_bounded(&data[..], 100).await.unwrap();
        assert_eq!(out.len(), 100);
    }

    #[tokio::test]
    async fn test_missing_engine_is_unavailable() {
        let bin = tempfile::tempdir().unwrap();
        let ws = tempfile::tempdir().unwrap();
        let compiler = make_compiler(bin.path(), Duration::from_secs(5));

        assert!(!compiler.engine_available(Engine::Pdflatex).await);
        let err = compiler
            .compile(ws.path(), "main.tex", Engine::Pdflatex)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "engine_unavailable");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pdf_presence_wins_over_exit_code() {
        let bin = tempfile::tempdir().unwrap();
        let ws = tempfile::tempdir().unwrap();
        install_fake_engine(bin.path(), "printf '%%PDF-1.4 fake' > main.pdf\nexit 1");

        let pdf = make_compiler(bin.path(), Duration::from_secs(5))
            .compile(ws.path(), "main.tex", Engine::Pdflatex)
            .await
            .unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_package_from_log() {
        let bin = tempfile::tempdir().unwrap();
        let ws = tempfile::tempdir().unwrap();
        install_fake_engine(
            bin.path(),
            "printf \"! LaTeX Error: File \\`nonexistentpkg.sty' not found.\\n\" > main.log\nexit 1",
        );

        let err = make_compiler(bin.path(), Duration::from_secs(5))
            .compile(ws.path(), "main.tex", Engine::Pdflatex)
            .await
            .unwrap_err();
        match err {
            RenderError::CompilerMissingPackage { package, .. } => {
                assert_eq!(package, "nonexistentpkg")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_engine_times_out() {
        let bin = tempfile::tempdir().unwrap();
        let ws = tempfile::tempdir().unwrap();
        install_fake_engine(bin.path(), "exec sleep 30");

        let err = make_compiler(bin.path(), Duration::from_millis(200))
            .compile(ws.path(), "main.tex", Engine::Pdflatex)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "compiler_timeout");
    }

    #[tokio::test]
    #[ignore = "requires a TeX installation with pdflatex on PATH"]
    async fn test_real_pdflatex_minimal_document() {
        let ws = tempfile::tempdir().unwrap();
        std::fs::write(
            ws.path().join("main.tex"),
            "\\documentclass{article}\n\\begin{document}\nHello\n\\end{document}\n",
        )
        .unwrap();
        let pdf = LatexCompiler::new(Duration::from_secs(60), 1 << 20)
            .compile(ws.path(), "main.tex", Engine::Pdflatex)
            .await
            .unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[tokio::test]
    #[ignore = "requires a TeX installation with pdflatex on PATH"]
    async fn test_real_pdflatex_missing_package() {
        let ws = tempfile::tempdir().unwrap();
        std::fs::write(
            ws.path().join("main.tex"),
            "\\documentclass{article}\n\\usepackage{nonexistentpkg}\n\\begin{document}\nHello\n\\end{document}\n",
        )
        .unwrap();
        let err = LatexCompiler::new(Duration::from_secs(60), 1 << 20)
            .compile(ws.path(), "main.tex", Engine::Pdflatex)
            .await
            .unwrap_err();
        match err {
            RenderError::CompilerMissingPackage { package, .. } => {
                assert_eq!(package, "nonexistentpkg")
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
