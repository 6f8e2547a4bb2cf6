//! Platform name canonicalization
//!
//! URLs and host names are reduced to their registrable label
//! (`https://accounts.google.com/signin` becomes `google`), then lowercased
//! and stripped down to ASCII alphanumerics. The output contains no dots or
//! separators, so normalizing it again is a no-op.

use url::{Host, Url};

/// Two-label public suffixes where the registrable label sits one level deeper
const COMPOUND_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "com.au", "net.au", "co.jp", "co.id", "ac.id", "or.id",
    "go.id", "web.id", "co.nz", "com.br", "com.sg", "com.my", "co.in", "co.kr",
];

/// Reduce a platform identifier to its canonical name
pub fn normalize_platform(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let host = extract_host(&lowered);
    registrable_label(&host)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Pull the host out of anything that looks like a URL or domain
fn extract_host(value: &str) -> String {
    let candidate = if value.contains("://") {
        value.to_string()
    } else if value.contains('.') || value.contains('/') {
        format!("https://{}", value)
    } else {
        return value.to_string();
    };

    match Url::parse(&candidate) {
        Ok(url) => match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            // IP literals have no registrable label; keep every digit
            Some(Host::Ipv4(addr)) => addr.to_string().replace('.', ""),
            Some(Host::Ipv6(addr)) => addr.to_string().replace(':', ""),
            None => value.to_string(),
        },
        Err(_) => value.to_string(),
    }
}

fn registrable_label(host: &str) -> String {
    let labels: Vec<&str> = host
        .split('.')
        .filter(|label| !label.is_empty())
        .collect();

    match labels.len() {
        0 => String::new(),
        1 => labels[0].to_string(),
        n => {
            let tail = format!("{}.{}", labels[n - 2], labels[n - 1]);
            if n >= 3 && COMPOUND_SUFFIXES.contains(&tail.as_str()) {
                labels[n - 3].to_string()
            } else {
                labels[n - 2].to_string()
            }
        }
    }
}
