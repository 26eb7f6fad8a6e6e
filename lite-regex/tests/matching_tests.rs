//! Matching behaviour through the public API
//!
//! Every check runs against both strategies so the DFA table walk and the
//! NFA simulation are held to the same verdicts.

use lite_regex::{ErrorKind, Regex, RegexBuilder, Strategy, compile};

fn both(pattern: &str) -> [Regex; 2] {
    [Strategy::Dfa, Strategy::Nfa].map(|strategy| {
        RegexBuilder::new(pattern)
            .strategy(strategy)
            .build()
            .unwrap()
    })
}

fn check(pattern: &str, cases: &[(&str, bool)]) {
    for regex in both(pattern) {
        for &(text, expected) in cases {
            assert_eq!(
                regex.matches(text),
                expected,
                "{} on {:?} with {}",
                pattern,
                text,
                regex.strategy()
            );
        }
    }
}

mod basic_matching {
    use super::*;

    #[test]
    fn test_literal_match() {
        check("hello", &[("hello", true), ("hell", false), ("hello!", false)]);
    }

    #[test]
    fn test_any_character() {
        check("h.llo", &[("hello", true), ("hxllo", true), ("hllo", false)]);
    }

    #[test]
    fn test_empty_pattern() {
        check("", &[("", true), ("a", false)]);
    }

    #[test]
    fn test_whole_string_semantics() {
        // no substring search
        check("b", &[("b", true), ("abc", false)]);
    }
}

mod quantifiers {
    use super::*;

    #[test]
    fn test_counted_boundaries() {
        check(
            "a{2,4}",
            &[
                ("a", false),
                ("aa", true),
                ("aaa", true),
                ("aaaa", true),
                ("aaaaa", false),
            ],
        );
    }

    #[test]
    fn test_exact_count() {
        check("(ab){3}", &[("ababab", true), ("abab", false), ("abababab", false)]);
    }

    #[test]
    fn test_open_ended_count() {
        check("x{2,}", &[("x", false), ("xx", true), ("xxxxxxxxxx", true)]);
    }

    #[test]
    fn test_zero_count() {
        check("ab{0}c", &[("ac", true), ("abc", false)]);
    }

    #[test]
    fn test_star_plus_optional() {
        check("a*", &[("", true), ("aaa", true), ("b", false)]);
        check("a+", &[("", false), ("a", true), ("aaa", true)]);
        check("colou?r", &[("color", true), ("colour", true), ("colouur", false)]);
    }
}

mod alternation {
    use super::*;

    #[test]
    fn test_alternation_with_repetition() {
        check(
            "a(b|c)*",
            &[
                ("a", true),
                ("ab", true),
                ("abcbc", true),
                ("d", false),
                ("abd", false),
            ],
        );
    }

    #[test]
    fn test_alternation_is_lowest_precedence() {
        check("ab|cd", &[("ab", true), ("cd", true), ("abd", false), ("acd", false)]);
    }

    #[test]
    fn test_empty_alternative_matches_empty() {
        check("a|", &[("a", true), ("", true), ("aa", false)]);
    }
}

mod character_classes {
    use super::*;

    #[test]
    fn test_range() {
        check("[a-c]", &[("a", true), ("b", true), ("c", true), ("d", false)]);
    }

    #[test]
    fn test_negated_range() {
        check("[^a-c]", &[("b", false), ("d", true), ("", false)]);
    }

    #[test]
    fn test_negation_stays_ascii() {
        check("[^a]", &[("\u{7f}", true), ("é", false)]);
    }

    #[test]
    fn test_shorthand_inside_class() {
        check(r"[\d_]+", &[("4_2", true), ("4a", false)]);
    }

    #[test]
    fn test_identifier() {
        check(
            r"[a-zA-Z_]\w*",
            &[("foo_bar1", true), ("_x", true), ("1abc", false)],
        );
    }
}

mod escapes {
    use super::*;

    #[test]
    fn test_digit_shorthand() {
        check(r"\d+", &[("42", true), ("4a", false), ("", false)]);
    }

    #[test]
    fn test_escaped_dot() {
        check(r"\.", &[(".", true), ("x", false)]);
    }

    #[test]
    fn test_escaped_operators() {
        check(r"a\*\(b\)", &[("a*(b)", true), ("aab", false)]);
    }

    #[test]
    fn test_word_shorthand() {
        check(r"\w\w", &[("a1", true), ("_Z", true), ("a-", false)]);
    }
}

mod errors {
    use super::*;

    #[test]
    fn test_unmatched_paren_points_at_end() {
        let err = compile("(a|b").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(err.position, 4);
        assert!(err.details.contains('('));
    }

    #[test]
    fn test_inverted_bounds() {
        let err = compile("a{3,1}").unwrap_err();
        assert!(err.details.contains("max < min"));
    }

    #[test]
    fn test_lex_errors() {
        let err = compile(r"ab\").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lex);
        assert_eq!(err.position, 2);

        let err = compile("[ab").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lex);
        assert_eq!(err.position, 0);
    }

    #[test]
    fn test_error_layout() {
        let err = compile("a{3,1}").unwrap_err();
        let text = err.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert!(lines[0].starts_with("Regex parse error: "));
        assert_eq!(lines[1], "At position 1 in pattern:");
        assert_eq!(lines[2], "a{3,1}");
        assert_eq!(lines[3], " ^");
        assert!(lines[4].starts_with("Details: "));
    }

    #[test]
    fn test_anchors_rejected() {
        assert!(compile("^abc").is_err());
        assert!(compile("abc$").is_err());
    }
}

mod resource_limits {
    use super::*;

    #[test]
    fn test_long_alternation_compiles() {
        let pattern = vec!["a"; 20_000].join("|");
        check(&pattern, &[("a", true), ("", false), ("b", false)]);
    }

    #[test]
    fn test_long_literal_fails_cleanly() {
        for strategy in [Strategy::Dfa, Strategy::Nfa] {
            let err = RegexBuilder::new(&"x".repeat(200_000))
                .strategy(strategy)
                .build()
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::Build);
        }
    }

    #[test]
    fn test_long_literal_within_limits() {
        let pattern = "ab".repeat(4_000);
        check(&pattern, &[(pattern.as_str(), true), ("ab", false)]);
    }

    #[test]
    fn test_wide_class_under_repetition_fails_cleanly() {
        let err = RegexBuilder::new("[\u{100}-\u{FFFF}]{1000}")
            .strategy(Strategy::Nfa)
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Build);
        assert!(compile("[\u{100}-\u{FFFF}]{2}").is_ok());
    }

    #[test]
    fn test_repeat_bound_over_limit() {
        assert_eq!(compile("a{1001}").unwrap_err().kind, ErrorKind::Parse);
    }

    #[test]
    fn test_deep_nesting_rejected() {
        let pattern = format!("{}a{}", "(".repeat(300), ")".repeat(300));
        assert_eq!(compile(&pattern).unwrap_err().kind, ErrorKind::Parse);
        let pattern = format!("{}a{}", "(".repeat(200), ")".repeat(200));
        check(&pattern, &[("a", true)]);
    }
}

mod determinism {
    use super::*;

    #[test]
    fn test_compiling_twice_is_idempotent() {
        let first = compile("(a|b)*c{1,3}").unwrap();
        let second = compile("(a|b)*c{1,3}").unwrap();
        for text in ["c", "abccc", "abcccc", "", "ba"] {
            assert_eq!(first.matches(text), second.matches(text));
        }
        assert_eq!(first.state_count(), second.state_count());
    }

    #[test]
    fn test_shared_across_threads() {
        let regex = std::sync::Arc::new(compile(r"\d{3}-\d{4}").unwrap());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let regex = regex.clone();
                std::thread::spawn(move || regex.matches(&format!("55{}-0123", i)))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
