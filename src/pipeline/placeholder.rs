/// Token replaced by the user identifier in every expression
pub const USER_ID_TOKEN: &str = "#userId#";

/// Replace every occurrence of `#userId#` in an expression with the user id
///
/// The user id is inserted verbatim. It is not escaped, so a value containing
/// quotes or query operators changes the meaning of the stage; callers must
/// sanitize untrusted ids before evaluation.
///
/// # Example
/// ```
/// use actionable::pipeline::substitute;
///
/// assert_eq!(
///     substitute(r##"{"$match":{"user":"#userId#"}}"##, "u1"),
///     r#"{"$match":{"user":"u1"}}"#
/// );
/// ```
pub fn substitute(expression: &str, user_id: &str) -> String {
    expression.replace(USER_ID_TOKEN, user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_single() {
        let result = substitute(r##"{"$match":{"user":"#userId#"}}"##, "u1");
        assert_eq!(result, r#"{"$match":{"user":"u1"}}"#);
    }

    #[test]
    fn test_substitute_every_occurrence() {
        let result = substitute("#userId#-#userId#-#userId#", "abc");
        assert_eq!(result, "abc-abc-abc");
        assert!(!result.contains(USER_ID_TOKEN));
    }

    #[test]
    fn test_substitute_without_token_is_unchanged() {
        let expression = r#"{"$limit":5}"#;
        assert_eq!(substitute(expression, "u1"), expression);
    }

    #[test]
    fn test_substitute_is_idempotent() {
        let cases = [
            r##"{"$match":{"user":"#userId#"}}"##,
            "#userId##userId#",
            "no token here",
            "",
        ];

        for expression in cases {
            let once = substitute(expression, "396bc782-6ac6-4183-a671-6e75ca5989a5");
            let twice = substitute(&once, "396bc782-6ac6-4183-a671-6e75ca5989a5");
            assert_eq!(once, twice, "expression: {}", expression);
        }
    }

    #[test]
    fn test_substitute_passes_user_id_verbatim() {
        let result = substitute(r##"{"user":"#userId#"}"##, r#"x", "admin": "true"#);
        assert_eq!(result, r#"{"user":"x", "admin": "true"}"#);
    }
}
