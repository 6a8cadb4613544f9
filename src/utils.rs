use std::time::Duration;
use url::Url;

/// Characters that are not allowed in file names on common filesystems
const RESERVED: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Strip reserved filename characters, keeping the rest in order
pub fn sanitize(name: &str) -> String {
    name.chars().filter(|c| !RESERVED.contains(c)).collect()
}

/// Derive the on-disk file name for an image from the last segment of its URL
pub fn image_file_name(image_url: &str) -> String {
    let segment = match Url::parse(image_url) {
        Ok(url) => url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string)
            .unwrap_or_default(),
        Err(_) => image_url.rsplit('/').next().unwrap_or_default().to_string(),
    };

    sanitize(&segment)
}

/// Resolve a possibly relative image URL against the site origin
pub fn absolute_url(src: &str, origin: &str) -> String {
    if src.starts_with("http") {
        return src.to_string();
    }

    match Url::parse(origin).and_then(|base| base.join(src)) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}{}", origin.trim_end_matches('/'), src),
    }
}

/// Sleep for a fixed delay; a zero delay returns immediately
pub async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
