//! Mines a LaTeX `.log` file for the reason a run produced no PDF.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::RenderError;

const EXCERPT_LINES: usize = 5;

static MISSING_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"! LaTeX Error: File `([^']+)' not found").expect("BUG: invalid missing file regex")
});

pub fn is_fatal_line(line: &str) -> bool {
    line.starts_with('!') || line.contains("Fatal error") || line.contains("Emergency stop")
}

/// The last few fatal lines of the log, oldest first.
pub fn fatal_excerpt(log: &str) -> Vec<String> {
    let fatal: Vec<&str> = log.lines().filter(|l| is_fatal_line(l)).collect();
    let skip = fatal.len().saturating_sub(EXCERPT_LINES);
    fatal[skip..].iter().map(|l| l.trim_end().to_string()).collect()
}

/// File name from the first `! LaTeX Error: File `x' not found` line.
pub fn missing_file(log: &str) -> Option<String> {
    MISSING_FILE.captures(log).map(|caps| caps[1].to_string())
}

/// `fontawesome5.sty` -> `fontawesome5`.
pub fn package_name(file: &str) -> String {
    match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && matches!(ext, "sty" | "cls" | "def" | "fd" | "tex") => {
            stem.to_string()
        }
        _ => file.to_string(),
    }
}

/// Classifies a failed run from its log contents (`None` when no log was written).
pub fn diagnose(log: Option<&str>) -> RenderError {
    let Some(log) = log else {
        return RenderError::CompilerFatal {
            summary: "no PDF and no log file were produced".to_string(),
            log_excerpt: Vec::new(),
        };
    };
    let log_excerpt = fatal_excerpt(log);

    if let Some(file) = missing_file(log) {
        return RenderError::CompilerMissingPackage {
            package: package_name(&file),
            file,
            log_excerpt,
        };
    }

    let summary = log_excerpt
        .last()
        .map(|l| l.trim_start_matches('!').trim().to_string())
        .unwrap_or_else(|| "no PDF was produced".to_string());
    RenderError::CompilerFatal {
        summary,
        log_excerpt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING_PACKAGE_LOG: &str = "This is pdfTeX, Version 3.141592653\n(./main.tex\nLaTeX2e <2023-11-01>\n\n! LaTeX Error: File `nonexistentpkg.sty' not found.\n\nType X to quit or <RETURN> to proceed,\n!  ==> Fatal error occurred, no output PDF file produced!\n";

    #[test]
    fn test_missing_package_is_named() {
        match diagnose(Some(MISSING_PACKAGE_LOG)) {
            RenderError::CompilerMissingPackage {
                package,
                file,
                log_excerpt,
            } => {
                assert_eq!(package, "nonexistentpkg");
                assert_eq!(file, "nonexistentpkg.sty");
                assert_eq!(log_excerpt.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_excerpt_keeps_last_five() {
        let log: String = (1..=8).map(|i| format!("! error {i}\nl.{i} context\n")).collect();
        let excerpt = fatal_excerpt(&log);
        assert_eq!(excerpt.first().unwrap(), "! error 4");
        assert_eq!(excerpt.last().unwrap(), "! error 8");
        assert_eq!(excerpt.len(), 5);
    }

    #[test]
    fn test_fatal_summary_from_last_line() {
        let log = "! Undefined control sequence.\nl.12 \\foo\n*** (job aborted, no legal \\end found)\n! Emergency stop.\n";
        match diagnose(Some(log)) {
            RenderError::CompilerFatal { summary, .. } => assert_eq!(summary, "Emergency stop."),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_no_log() {
        assert_eq!(diagnose(None).kind(), "compiler_fatal");
    }

    #[test]
    fn test_package_name() {
        assert_eq!(package_name("moderncv.cls"), "moderncv");
        assert_eq!(package_name("photo.png"), "photo.png");
    }
}
