//! Text fitting for panel titles and the figure title.
//!
//! Plotters cannot measure text without a loaded font, so widths are estimated
//! from the character count.

/// Estimated pixel width of `text` at `font_px`.
pub fn text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.6).ceil() as u32
}

/// Cut `text` to `max_px`, ending in `…` when anything was dropped.
pub fn fit_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let per_char = (font_px as f32 * 0.6).max(1.0);
    let keep = ((max_px as f32 / per_char).floor() as usize).saturating_sub(1);
    if keep == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(keep).collect();
    out.push('…');
    out
}

/// Break `text` on whitespace into lines no wider than `max_px`. Words that
/// are wider than a line on their own are cut with [`fit_to_width`].
pub fn wrap_to_width(text: &str, font_px: u32, max_px: u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        let candidate = if cur.is_empty() {
            word.to_string()
        } else {
            format!("{cur} {word}")
        };
        if text_width_px(&candidate, font_px) <= max_px {
            cur = candidate;
            continue;
        }
        if !cur.is_empty() {
            lines.push(std::mem::take(&mut cur));
        }
        if text_width_px(word, font_px) <= max_px {
            cur = word.to_string();
        } else {
            lines.push(fit_to_width(word, font_px, max_px));
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fitting_adds_ellipsis_only_when_cut() {
        assert_eq!(fit_to_width("rho", 10, 100), "rho");
        // 6px per char at 10px: 30px holds 5 chars, 4 plus the ellipsis
        assert_eq!(fit_to_width("GEOM_RHO_FLUX", 10, 30), "GEOM…");
        assert_eq!(fit_to_width("abc", 10, 5), "");
    }

    #[test]
    fn wrapping_keeps_words_together() {
        let lines = wrap_to_width("t = 1000, Total floor hits: 12345", 10, 120);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| text_width_px(l, 10) <= 120));
        assert_eq!(lines.join(" "), "t = 1000, Total floor hits: 12345");
    }
}
