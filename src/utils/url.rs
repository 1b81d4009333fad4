// src/utils/url.rs

//! URL and file-name helpers.

/// Extension used when the URL path carries none.
pub const DEFAULT_IMAGE_EXTENSION: &str = ".jpg";

/// Infer a file extension (with leading dot) from a URL path.
///
/// Query string and fragment are ignored. Leading dots of the last path
/// segment do not start an extension.
///
/// # Examples
/// ```
/// use shipyard::utils::url::image_extension;
///
/// assert_eq!(image_extension("https://cdn.example.com/ships/PASD013.png?v=2"), ".png");
/// assert_eq!(image_extension("https://cdn.example.com/ships/PASD013"), ".jpg");
/// ```
pub fn image_extension(url: &str) -> String {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => strip_query(url).to_string(),
    };

    let last = path.rsplit('/').next().unwrap_or_default();
    let stem = last.trim_start_matches('.');

    match stem.rfind('.') {
        Some(idx) if idx + 1 < stem.len() => stem[idx..].to_string(),
        _ => DEFAULT_IMAGE_EXTENSION.to_string(),
    }
}

/// Deterministic local file name for a ship image.
///
/// The id is sanitized so the name never leaves the images directory.
pub fn image_file_name(ship_id: &str, url: &str) -> String {
    format!("ship_{}{}", sanitize_file_stem(ship_id), image_extension(url))
}

/// Make a display name usable as a file stem.
///
/// Path separators and characters rejected by common filesystems become
/// underscores; non-ASCII text is kept as is.
pub fn sanitize_file_stem(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned.to_string()
    }
}

fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_from_path() {
        assert_eq!(image_extension("https://x.com/a/b/ship.PNG"), ".PNG");
        assert_eq!(image_extension("https://x.com/a/b/ship.large.jpeg#top"), ".jpeg");
    }

    #[test]
    fn test_extension_ignores_dots_in_directories() {
        assert_eq!(image_extension("https://x.com/v1.2/ship"), ".jpg");
        assert_eq!(image_extension("https://x.com/a/.hidden"), ".jpg");
    }

    #[test]
    fn test_extension_of_unparseable_url() {
        assert_eq!(image_extension("ships/icon.webp?x=1"), ".webp");
        assert_eq!(image_extension("ships/icon."), ".jpg");
    }

    #[test]
    fn test_image_file_name() {
        assert_eq!(
            image_file_name("3751786480", "https://glossary-wows.example/ship/PJSD012.png"),
            "ship_3751786480.png"
        );
        assert_eq!(
            image_file_name("/../../../pwned", "https://cdn.example/x.png"),
            "ship__.._.._.._pwned.png"
        );
        assert_eq!(image_file_name("a\\b", "https://cdn.example/x"), "ship_a_b.jpg");
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("大和"), "大和");
        assert_eq!(sanitize_file_stem("Des Moines / B"), "Des Moines _ B");
        assert_eq!(sanitize_file_stem("../.."), "_");
        assert_eq!(sanitize_file_stem(" ARP Myoko: "), "ARP Myoko_");
    }
}
