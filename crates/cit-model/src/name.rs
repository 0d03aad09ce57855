//! Test name reassembly.

/// Build a test name from a prefix and the category tokens of a row.
///
/// Tokens equal to `absent` are skipped. A row made only of absent tokens
/// names the bare prefix.
pub fn reassemble<'a, I>(prefix: &str, tokens: I, separator: char, absent: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut name = prefix.to_string();
    for token in tokens.into_iter().filter(|t| *t != absent) {
        name.push(separator);
        name.push_str(token);
    }
    name
}
