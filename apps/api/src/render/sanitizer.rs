//! Last pass over the customized source before it reaches the engine.
//!
//! Anything still looking like an unresolved placeholder is neutralized so it
//! cannot break compilation: image references are pointed at a blank PNG,
//! leftover tokens are stripped.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::templates::placeholders::COLOR_MODELS;

use super::assets::PLACEHOLDER_PNG_NAME;

const IMAGE_TOKENS: [&str; 5] = [
    "PROFILE_IMAGE",
    "PHOTO_PATH",
    "PROFILE_PHOTO",
    "AVATAR_PATH",
    "IMAGE_PATH",
];

static IMAGE_INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(\\includegraphics(?:\[[^\]]*\])?\{{)(?:{})(\}})",
        IMAGE_TOKENS.join("|")
    ))
    .expect("BUG: invalid image include regex")
});

static UNRESOLVED_IMAGE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(.*\\includegraphics[^{\n]*\{[A-Z_]+\}.*)$")
        .expect("BUG: invalid unresolved image regex")
});

static PLACEHOLDER_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\[A-Z]*PLACEHOLDER[A-Z_]*").expect("BUG: invalid placeholder command regex")
});

static BRACED_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Z_]{2,})\}").expect("BUG: invalid braced token regex"));

static BARE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\\?)\b([A-Z_]{2,})\b").expect("BUG: invalid bare token regex"));

pub fn sanitize(source: &str) -> String {
    let text = neutralize_images(source);
    neutralize_tokens(&text)
}

/// Points known image tokens at the placeholder PNG, then comments out any
/// `\includegraphics` line still referencing an all-caps token.
pub fn neutralize_images(source: &str) -> String {
    let text = IMAGE_INCLUDE.replace_all(source, |caps: &Captures| {
        format!("{}{PLACEHOLDER_PNG_NAME}{}", &caps[1], &caps[2])
    });
    UNRESOLVED_IMAGE_LINE
        .replace_all(&text, "% $1")
        .into_owned()
}

pub fn neutralize_tokens(source: &str) -> String {
    let text = PLACEHOLDER_COMMAND.replace_all(source, "");

    let text = BRACED_TOKEN.replace_all(&text, |caps: &Captures| {
        let start = caps.get(0).map_or(0, |m| m.start());
        if COLOR_MODELS.contains(&&caps[1]) || follows_html_model(&text[..start]) {
            caps[0].to_string()
        } else {
            "{}".to_string()
        }
    });

    let text = BARE_TOKEN.replace_all(&text, |caps: &Captures| {
        let start = caps.get(0).map_or(0, |m| m.start());
        let command = !caps[1].is_empty();
        if command || COLOR_MODELS.contains(&&caps[2]) || follows_html_model(&text[..start]) {
            caps[0].to_string()
        } else {
            String::new()
        }
    });

    text.replace("$$", "$")
}

/// `\definecolor{x}{HTML}{CCCCCC}`: the hex argument may be all letters.
fn follows_html_model(prefix: &str) -> bool {
    prefix.strip_suffix('{').unwrap_or(prefix).ends_with("{HTML}")
}
