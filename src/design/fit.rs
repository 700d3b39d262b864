use super::ResolvedStyle;
use itertools::Itertools;

/// A text adjusted to fit its box.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedText {
    pub text: String,
    pub font_size: f64,
    pub scaled: bool,
    pub wrapped: bool,
}

/// Fit a text given the style it's going to be rendered with.
///
/// Texts longer than the style's resize threshold get their font size scaled down once. Texts
/// that are also longer than the wrap threshold get a line break near their middle instead of
/// being shrunk any further. Both thresholds are exclusive.
pub fn fit_text(text: &str, font_size: f64, style: &ResolvedStyle) -> FittedText {
    let length = text.chars().count();
    if length <= style.auto_font_resize_threshold {
        return FittedText { text: text.to_string(), font_size, scaled: false, wrapped: false };
    }
    let font_size = scale_font_size(font_size, style.font_resize_rate);
    if length <= style.wrap_text_threshold {
        return FittedText { text: text.to_string(), font_size, scaled: true, wrapped: false };
    }
    FittedText { text: break_near_middle(text), font_size, scaled: true, wrapped: true }
}

// Sizes are kept at a tenth of a point.
pub(crate) fn scale_font_size(font_size: f64, rate: f64) -> f64 {
    (font_size * rate * 10.0).round() / 10.0
}

/// Replace the whitespace closest to the middle of the text with a new line, or split the text
/// right at its middle if it has none.
fn break_near_middle(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let middle = chars.len() / 2;
    let split = chars.iter().positions(|c| c.is_whitespace()).min_by_key(|index| index.abs_diff(middle));
    let (head, tail) = match split {
        Some(index) => (&chars[..index], &chars[index + 1..]),
        None => chars.split_at(middle),
    };
    let mut output: String = head.iter().collect();
    output.push('\n');
    output.extend(tail);
    output
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    fn style(resize: usize, wrap: usize) -> ResolvedStyle {
        ResolvedStyle { auto_font_resize_threshold: resize, wrap_text_threshold: wrap, ..Default::default() }
    }

    #[rstest]
    #[case::shorter(9, false)]
    #[case::exactly_threshold(10, false)]
    #[case::threshold_plus_one(11, true)]
    fn resize_threshold_is_exclusive(#[case] length: usize, #[case] scaled: bool) {
        let text = "x".repeat(length);
        let fitted = fit_text(&text, 20.0, &style(10, 100));
        assert_eq!(fitted.scaled, scaled);
        assert_eq!(fitted.font_size, if scaled { 18.0 } else { 20.0 });
        assert_eq!(fitted.text, text);
        assert!(!fitted.wrapped);
    }

    #[rstest]
    #[case::exactly_threshold(20, false)]
    #[case::threshold_plus_one(21, true)]
    fn wrap_threshold_is_exclusive(#[case] length: usize, #[case] wrapped: bool) {
        let text = "x".repeat(length);
        let fitted = fit_text(&text, 20.0, &style(10, 20));
        assert!(fitted.scaled);
        assert_eq!(fitted.wrapped, wrapped);
        // Wrapping never shrinks the font any further.
        assert_eq!(fitted.font_size, 18.0);
    }

    #[test]
    fn default_thresholds() {
        let style = ResolvedStyle::default();
        assert!(!fit_text(&"a".repeat(100), 20.0, &style).scaled);
        assert!(fit_text(&"a".repeat(101), 20.0, &style).scaled);
        assert!(!fit_text(&"a".repeat(200), 20.0, &style).wrapped);
        assert!(fit_text(&"a".repeat(201), 20.0, &style).wrapped);
    }

    #[rstest]
    #[case::before_middle("aaaa bbbbbbb cc", "aaaa\nbbbbbbb cc")]
    #[case::after_middle("aa bbbbbb cc", "aa bbbbbb\ncc")]
    #[case::no_whitespace("abcdef", "abc\ndef")]
    #[case::multibyte("가나다라", "가나\n다라")]
    fn breaks(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(break_near_middle(input), expected);
    }

    #[rstest]
    #[case(20.0, 0.9, 18.0)]
    #[case(18.0, 0.9, 16.2)]
    #[case(36.0, 0.85, 30.6)]
    fn scaling(#[case] size: f64, #[case] rate: f64, #[case] expected: f64) {
        assert_eq!(scale_font_size(size, rate), expected);
    }
}
