use std::collections::VecDeque;

/// 쿼리 문자열을 평평한 토큰 목록으로 나눕니다.
///
/// 식별자, 숫자, 키워드를 구분하지 않습니다. 모든 분류는 파서가
/// 대소문자 구분 없는 문자열 비교로 처리합니다.
pub struct Lexer {
    src: VecDeque<char>,
    in_quotes: bool,
}

impl Lexer {
    pub fn new(src: &str) -> Self {
        Lexer {
            src: src.chars().collect(),
            in_quotes: false,
        }
    }

    fn is_separator(ch: char) -> bool {
        ch.is_whitespace() || Self::is_symbol(ch)
    }

    // 구분자이면서 그 자체로 토큰이 되는 문자
    fn is_symbol(ch: char) -> bool {
        matches!(ch, ',' | '(' | ')' | '=')
    }

    fn finished(&self) -> bool {
        self.src.is_empty()
    }

    fn curr(&self) -> Option<char> {
        self.src.front().copied()
    }

    fn walk(&mut self) -> Option<char> {
        self.src.pop_front()
    }

    fn skip_ws(&mut self) {
        while let Some(ch) = self.curr()
            && ch.is_whitespace()
        {
            self.walk();
        }
    }

    /// 다음 토큰을 반환합니다. 입력이 끝나면 `None`.
    pub fn next(&mut self) -> Option<String> {
        self.skip_ws();
        let ch = self.walk()?;
        if Self::is_symbol(ch) {
            return Some(ch.to_string());
        }
        let mut out = String::new();
        self.push(&mut out, ch);
        while let Some(ch) = self.curr() {
            if !self.in_quotes && Self::is_separator(ch) {
                break;
            }
            // ! `curr()`의 반환값이 `Some`이므로 안전함
            let ch = self.walk().unwrap();
            self.push(&mut out, ch);
        }
        Some(out)
    }

    // 따옴표는 이스케이프 없이 항상 상태를 뒤집고, 토큰에 그대로 남습니다.
    fn push(&mut self, out: &mut String, ch: char) {
        if ch == '\'' {
            self.in_quotes = !self.in_quotes;
        }
        out.push(ch);
    }

    pub fn tokenize(mut self) -> Vec<String> {
        let mut tokens = Vec::new();
        while !self.finished() {
            if let Some(token) = self.next() {
                tokens.push(token);
            }
        }
        tokens
    }
}

pub fn tokenize(src: &str) -> Vec<String> {
    Lexer::new(src).tokenize()
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            tokenize("SELECT users.name FROM users"),
            vec!["SELECT", "users.name", "FROM", "users"]
        );
    }

    #[test]
    fn test_symbols_are_own_tokens() {
        assert_eq!(
            tokenize("INSERT INTO t VALUES('a',b)"),
            vec!["INSERT", "INTO", "t", "VALUES", "(", "'a'", ",", "b", ")"]
        );
    }

    #[test]
    fn test_equality_without_spaces() {
        assert_eq!(tokenize("t.a='x'"), vec!["t.a", "=", "'x'"]);
    }

    #[test]
    fn test_quoted_span_keeps_separators() {
        assert_eq!(
            tokenize("t.a = 'hello, (big) world=1'"),
            vec!["t.a", "=", "'hello, (big) world=1'"]
        );
    }

    #[test]
    fn test_embedded_quote_toggles() {
        // 이스케이프가 없으므로 두 번째 따옴표에서 인용이 끝납니다.
        assert_eq!(tokenize("'it's me'"), vec!["'it's", "me'"]);
        assert_eq!(tokenize("'it''s me'"), vec!["'it''s me'"]);
    }

    #[test]
    fn test_quote_mid_token() {
        assert_eq!(tokenize("ab'c d'e f"), vec!["ab'c d'e", "f"]);
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        assert_eq!(tokenize("t.a = 'open , end"), vec!["t.a", "=", "'open , end"]);
    }

    #[test]
    fn test_other_operators_stay_in_tokens() {
        assert_eq!(tokenize("t.a >= 3"), vec!["t.a", ">", "=", "3"]);
        assert_eq!(tokenize("t.a<3"), vec!["t.a<3"]);
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t\n ").is_empty());
    }

    proptest! {
        #[test]
        fn unquoted_tokens_cover_input(src in "[a-z0-9_. ,()=]{0,40}") {
            let joined: String = tokenize(&src).concat();
            let expected: String = src.chars().filter(|c| !c.is_whitespace()).collect();
            prop_assert_eq!(joined, expected);
        }

        #[test]
        fn tokens_are_never_empty(src in "[a-z' ,()=]{0,40}") {
            prop_assert!(tokenize(&src).iter().all(|t| !t.is_empty()));
        }
    }
}
