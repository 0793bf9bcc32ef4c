//! Fixed-budget context windows around a required token range.

use crate::error::WindowError;
use crate::token::Token;

/// A contiguous slice of a token stream and where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window<'a, T> {
    pub tokens: &'a [T],
    pub start: usize,
}

impl<T> Window<'_, T> {
    /// Index one past the last token of the window.
    pub fn end(&self) -> usize {
        self.start + self.tokens.len()
    }
}

/// Grow the inclusive range `required_start..=required_end` of `all` until it
/// holds `budget` items or covers the whole stream.
///
/// While both edges can move, the trailing edge grows when the leading edge
/// sits at 0 or an odd number of items is still missing, and the leading edge
/// grows otherwise. A required range longer than `budget` is rejected, never
/// truncated.
pub fn select_window<T>(
    all: &[T],
    required_start: usize,
    required_end: usize,
    budget: usize,
) -> Result<Window<'_, T>, WindowError> {
    if required_start > required_end || required_end >= all.len() {
        return Err(WindowError::InvalidRequiredRange {
            start: required_start,
            end: required_end,
            len: all.len(),
        });
    }
    let required = required_end - required_start + 1;
    if required > budget {
        return Err(WindowError::ContextOverflow { required, budget });
    }

    let last = all.len() - 1;
    let (mut start, mut end) = (required_start, required_end);
    let mut missing = budget - required;
    while missing > 0 {
        if start == 0 && end == last {
            break;
        }
        if end != last && (start == 0 || missing % 2 == 1) {
            end += 1;
        } else {
            start -= 1;
        }
        missing -= 1;
    }

    Ok(Window {
        tokens: &all[start..=end],
        start,
    })
}

/// 1-based source line on which the token at `window_start` sits.
pub fn window_start_line(tokens: &[Token], window_start: usize) -> i64 {
    let before = &tokens[..window_start.min(tokens.len())];
    before.iter().filter(|t| t.is_newline()).count() as i64 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{TokenKind, NEWLINE};
    use rstest::rstest;

    #[test]
    fn test_tie_break_cadence() {
        let all: Vec<usize> = (0..10).collect();
        let window = select_window(&all, 4, 4, 4).unwrap();
        assert_eq!(window.start, 3);
        assert_eq!(window.tokens, &[3, 4, 5, 6]);
    }

    #[test]
    fn test_leading_edge_at_zero_grows_trailing() {
        let all: Vec<usize> = (0..10).collect();
        let window = select_window(&all, 0, 1, 5).unwrap();
        assert_eq!(window.start, 0);
        assert_eq!(window.tokens, &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_trailing_edge_at_end_grows_leading() {
        let all: Vec<usize> = (0..10).collect();
        let window = select_window(&all, 9, 9, 3).unwrap();
        assert_eq!(window.start, 7);
        assert_eq!(window.end(), 10);
    }

    #[test]
    fn test_short_stream_yields_whole_stream() {
        let all: Vec<usize> = (0..3).collect();
        let window = select_window(&all, 1, 1, 100).unwrap();
        assert_eq!(window.start, 0);
        assert_eq!(window.tokens.len(), 3);
    }

    #[test]
    fn test_overflow_is_rejected() {
        let all: Vec<usize> = (0..10).collect();
        assert_eq!(
            select_window(&all, 2, 7, 4),
            Err(WindowError::ContextOverflow {
                required: 6,
                budget: 4
            })
        );
    }

    #[test]
    fn test_invalid_range_is_rejected() {
        let all: Vec<usize> = (0..3).collect();
        assert!(matches!(
            select_window(&all, 2, 3, 4),
            Err(WindowError::InvalidRequiredRange { .. })
        ));
        assert!(matches!(
            select_window(&all, 2, 1, 4),
            Err(WindowError::InvalidRequiredRange { .. })
        ));
    }

    #[rstest]
    fn test_budget_invariant(
        #[values(1, 7, 20)] len: usize,
        #[values(0, 3, 6)] req_start: usize,
        #[values(0, 1, 4)] req_len: usize,
        #[values(1, 5, 8, 30)] budget: usize,
    ) {
        let all: Vec<usize> = (0..len).collect();
        let req_end = req_start + req_len;
        let Ok(window) = select_window(&all, req_start, req_end, budget) else {
            assert!(req_end >= len || req_len + 1 > budget);
            return;
        };
        let required = req_len + 1;
        assert!(window.tokens.len() >= required);
        assert!(window.tokens.len() <= budget);
        assert!(window.start <= req_start && window.end() > req_end);
        assert_eq!(window.tokens, &all[window.start..window.end()]);
        if window.tokens.len() < budget {
            assert_eq!(window.tokens.len(), len);
        }
    }

    #[test]
    fn test_window_start_line_counts_preceding_newlines() {
        let tokens = vec![
            Token::new(TokenKind::Name, "a"),
            Token::new(TokenKind::Whitespace, NEWLINE),
            Token::new(TokenKind::Name, "b"),
            Token::new(TokenKind::Whitespace, NEWLINE),
            Token::new(TokenKind::Name, "c"),
        ];
        assert_eq!(window_start_line(&tokens, 0), 1);
        assert_eq!(window_start_line(&tokens, 1), 1);
        assert_eq!(window_start_line(&tokens, 2), 2);
        assert_eq!(window_start_line(&tokens, 4), 3);
    }
}
