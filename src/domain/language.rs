use std::path::Path;

const EXTENSION_LANGUAGES: &[(&str, &str)] = &[
    ("py", "Python"),
    ("js", "JavaScript"),
    ("ts", "TypeScript"),
    ("tsx", "TSX"),
    ("java", "Java"),
    ("c", "C"),
    ("cpp", "C++"),
    ("md", "Markdown"),
    ("txt", "Text"),
];

/// Editor language hint for a filename, by extension
pub fn detect(filename: &str) -> Option<&'static str> {
    let ext = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
    EXTENSION_LANGUAGES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, language)| *language)
}
