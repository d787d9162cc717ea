/// Masks an API key for logging: first 7 characters + `***` + last 4. Keys of 11 characters or fewer
/// become `***` entirely.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 11 {
        return "***".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", head, tail)
}
