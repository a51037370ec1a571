//! Text measurement for sizing the text carousel

/// Lines `text` occupies when wrapped at `width` columns
pub fn text_block_height(text: &str, width: usize) -> usize {
    if text.trim().is_empty() {
        return 0;
    }
    textwrap::wrap(text, width.max(1)).len()
}

/// Height of the tallest slide, so the carousel never jumps between slides
pub fn tallest_slide(slides: &[String], width: usize) -> usize {
    slides
        .iter()
        .map(|s| text_block_height(s, width))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_height_wraps() {
        assert_eq!(text_block_height("short", 40), 1);
        assert_eq!(text_block_height("one two three four", 10), 2);
        assert_eq!(text_block_height("   ", 40), 0);
    }

    #[test]
    fn test_tallest_slide() {
        let slides = vec![
            "Great bikes".to_string(),
            "The staff sorted out a helmet, a map and a spare tube for us".to_string(),
        ];
        assert_eq!(tallest_slide(&slides, 80), 1);
        assert!(tallest_slide(&slides, 20) >= 3);
        assert_eq!(tallest_slide(&[], 20), 0);
    }
}
