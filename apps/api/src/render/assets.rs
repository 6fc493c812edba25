// Static files written into every workspace.

pub const PLACEHOLDER_PNG_NAME: &str = "placeholder.png";

/// 1x1 grayscale PNG substituted for unresolved image references.
pub const PLACEHOLDER_PNG: [u8; 68] = [
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x04, 0x00, 0x00, 0x00, 0xb5, 0x1c, 0x0c,
    0x02, 0x00, 0x00, 0x00, 0x0b, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0xfc, 0xff, 0x1f, 0x00,
    0x02, 0xe7, 0x01, 0xf5, 0x6e, 0x72, 0xd6, 0x2d, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44,
    0xae, 0x42, 0x60, 0x82,
];

pub const FIGURE_VERSIONS_STY_NAME: &str = "figureversions.sty";

/// No-op `figureversions` package so pdflatex accepts templates written for xelatex fonts.
pub const FIGURE_VERSIONS_STY: &str = r"\NeedsTeXFormat{LaTeX2e}
\ProvidesPackage{figureversions}[2024/01/01 Stub implementation]\relax
\providecommand\DeclareFigureStyle[2][]{}
\providecommand\DeclareFigureAlignment[2][]{}
\providecommand\DeclareFigureVersion[2][]{}
\providecommand\figureversion[1][]{}
\providecommand\DeclareFigureFamily[2][]{}
\providecommand\DeclareFigureMathVersions[1][]{}
";
