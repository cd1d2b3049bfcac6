/// Normalize smart quotes and dashes to plain ASCII before a document is
/// stored or sent to a compute service, so every service sees the same text.
pub fn normalize_document(content: &str) -> String {
    content
        .replace('\u{2018}', "'")
        .replace('\u{2019}', "'")
        .replace('\u{201c}', "\"")
        .replace('\u{201d}', "\"")
        .replace('\u{2013}', "-")
        .replace('\u{2014}', "-")
}
