//! Text fitting: wrap an item's text and pick the circle radius that
//! holds it. The allowed wrap width shrinks over a bounded number of
//! attempts until the bounding circle fits under the radius cap; if it
//! never does, the last attempt wins and the radius is capped.

use crate::config::LayoutConfig;
use crate::text_metrics;
use crate::theme::Theme;

use super::types::FittedLabel;

/// Level-dependent starting radius, before text fitting.
pub(crate) fn base_radius(level: usize, config: &LayoutConfig) -> f32 {
    (config.base_radius - level as f32 * config.radius_step).max(config.min_radius)
}

pub(crate) fn fit_label(text: &str, base_radius: f32, theme: &Theme, config: &LayoutConfig) -> FittedLabel {
    let mut allowed = (2.0 * (config.max_radius - config.text_padding)).max(40.0);
    let mut wrapped = wrap_to_width(text, allowed, theme);
    let mut fit_radius = bounding_radius(&wrapped, config);
    let mut attempts = 0;
    while fit_radius > config.max_radius && attempts < config.fit_attempts {
        allowed = (allowed * config.fit_shrink).max(config.min_wrap_width);
        wrapped = wrap_to_width(text, allowed, theme);
        fit_radius = bounding_radius(&wrapped, config);
        attempts += 1;
    }

    let radius = base_radius
        .max(fit_radius)
        .clamp(config.min_radius, config.max_radius);
    FittedLabel {
        lines: wrapped.lines,
        width: wrapped.max_width,
        height: wrapped.height,
        radius,
    }
}

fn bounding_radius(wrapped: &Wrapped, config: &LayoutConfig) -> f32 {
    (wrapped.max_width / 2.0).hypot(wrapped.height / 2.0) + config.text_padding
}

struct Wrapped {
    lines: Vec<String>,
    max_width: f32,
    height: f32,
}

fn wrap_to_width(text: &str, max_width: f32, theme: &Theme) -> Wrapped {
    let fits = |fragment: &str| text_width(fragment, theme) <= max_width;
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            if fits(word) {
                current = word.to_string();
            } else {
                let mut pieces = break_word(word, max_width, theme).into_iter();
                let Some(first) = pieces.next() else {
                    continue;
                };
                current = first;
                for piece in pieces {
                    lines.push(std::mem::replace(&mut current, piece));
                }
            }
            continue;
        }

        let candidate = format!("{current} {word}");
        if fits(&candidate) {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            if fits(word) {
                current = word.to_string();
            } else {
                let mut pieces = break_word(word, max_width, theme).into_iter();
                let Some(first) = pieces.next() else {
                    continue;
                };
                current = first;
                for piece in pieces {
                    lines.push(std::mem::replace(&mut current, piece));
                }
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    let max_line_width = lines
        .iter()
        .map(|line| text_width(line, theme))
        .fold(0.0, f32::max);
    let height = lines.len().max(1) as f32 * theme.line_height();
    Wrapped {
        lines,
        max_width: max_line_width,
        height,
    }
}

/// Character-level fallback for a single word wider than the allowed
/// width. Gives up once even one character cannot fit.
fn break_word(word: &str, max_width: f32, theme: &Theme) -> Vec<String> {
    let fits = |fragment: &str| text_width(fragment, theme) <= max_width;
    let mut pieces = Vec::new();
    let mut chunk = String::new();
    for ch in word.chars() {
        let mut next = chunk.clone();
        next.push(ch);
        if fits(&next) {
            chunk = next;
        } else {
            if !chunk.is_empty() {
                pieces.push(std::mem::take(&mut chunk));
            }
            chunk.push(ch);
            if chunk.chars().count() == 1 && !fits(&chunk) {
                break;
            }
        }
    }
    if !chunk.is_empty() {
        pieces.push(chunk);
    }
    pieces
}

pub(crate) fn text_width(text: &str, theme: &Theme) -> f32 {
    text_metrics::measure_text_width(text, theme.font_size, &theme.font_family, theme.font_weight)
        .unwrap_or_else(|| {
            text.chars()
                .map(text_metrics::approx_char_width)
                .sum::<f32>()
                * theme.font_size
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(text: &str, level: usize) -> FittedLabel {
        let theme = Theme::poppins();
        let config = LayoutConfig::default();
        fit_label(text, base_radius(level, &config), &theme, &config)
    }

    #[test]
    fn base_radius_shrinks_with_level_and_floors() {
        let config = LayoutConfig::default();
        assert_eq!(base_radius(0, &config), 40.0);
        assert_eq!(base_radius(1, &config), 32.0);
        assert_eq!(base_radius(3, &config), 16.0);
        assert_eq!(base_radius(10, &config), 16.0);
    }

    #[test]
    fn short_text_keeps_base_radius() {
        let label = fit("hi", 0);
        assert_eq!(label.radius, 40.0);
        assert_eq!(label.lines, vec!["hi"]);
    }

    #[test]
    fn radius_always_within_bounds() {
        let cases = [
            "",
            "a",
            "a few short words",
            "a considerably longer sentence that will need to wrap over many lines to fit",
            &"x".repeat(200),
        ];
        for text in cases {
            let label = fit(text, 0);
            assert!(
                (16.0..=100.0).contains(&label.radius),
                "radius {} out of bounds for {:?}",
                label.radius,
                &text[..text.len().min(20)]
            );
        }
    }

    #[test]
    fn unbroken_token_is_split_by_character() {
        let label = fit(&"y".repeat(200), 2);
        assert_eq!(label.radius, 100.0);
        assert!(label.lines.len() > 1, "expected char-split lines");
    }

    #[test]
    fn long_sentence_wraps() {
        let label = fit("one two three four five six seven eight nine ten eleven twelve", 0);
        assert!(label.lines.len() > 1);
        for line in &label.lines {
            assert!(!line.is_empty());
        }
    }

    #[test]
    fn empty_text_yields_no_lines_and_base_radius() {
        let label = fit("", 1);
        assert!(label.lines.is_empty());
        assert_eq!(label.radius, 32.0);
    }

    #[test]
    fn fitting_is_deterministic() {
        let a = fit("repeatable layout input", 1);
        let b = fit("repeatable layout input", 1);
        assert_eq!(a, b);
    }
}
