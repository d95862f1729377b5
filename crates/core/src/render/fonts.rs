use crate::render::RenderError;
use ab_glyph::FontVec;
use std::path::{Path, PathBuf};

// Common CJK-capable system fonts, most specific first. DejaVu closes the
// list so latin-only hosts (CI runners) can still render.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/PingFang.ttc",
    "/Library/Fonts/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\msyh.ttc",
    "C:\\Windows\\Fonts\\simhei.ttf",
];

/// Resolve the poster font: an explicit override first, then the candidate
/// list. No loadable font anywhere is a `RenderError`.
pub fn load_font(explicit: Option<&Path>) -> Result<FontVec, RenderError> {
    if let Some(path) = explicit {
        match read_font(path) {
            Ok(font) => return Ok(font),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "configured font unusable, trying candidates");
            }
        }
    }

    for candidate in FONT_CANDIDATES {
        let path = Path::new(candidate);
        if !path.exists() {
            continue;
        }
        match read_font(path) {
            Ok(font) => return Ok(font),
            Err(err) => {
                tracing::warn!(path = candidate, error = %err, "font candidate unusable");
            }
        }
    }

    Err(RenderError::new(
        "font",
        "no usable font found; set DEALPOST_FONT to a TTF/TTC path",
    ))
}

fn read_font(path: &Path) -> anyhow::Result<FontVec> {
    use anyhow::Context;
    let data = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    // Index 0 covers both plain TTF files and TTC collections.
    FontVec::try_from_vec_and_index(data, 0)
        .with_context(|| format!("parse font {}", path.display()))
}

/// First candidate present on this host, if any. Render tests use this to
/// bail out gracefully on fontless machines.
pub fn find_system_font() -> Option<PathBuf> {
    FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_font_everywhere_is_a_render_error() {
        let err = match load_font(Some(Path::new("/nonexistent/font.ttf"))) {
            Err(err) => err,
            Ok(_) => return, // host has a candidate font; nothing to assert
        };
        assert_eq!(err.stage, "font");
    }

    #[test]
    fn explicit_font_loads_when_present() {
        let Some(path) = find_system_font() else {
            return;
        };
        assert!(load_font(Some(&path)).is_ok());
    }
}
