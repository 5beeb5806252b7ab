//! Deploy event extracted from an authenticated request.

use url::form_urlencoded;

/// A single deployment, as reported by the platform's deploy hook.
///
/// Missing parameters are kept as empty strings and rendered as such.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployEvent {
    pub app: String,
    pub release: String,
    pub user: String,
    pub channel: Option<String>,
}

impl DeployEvent {
    /// Read `app`, `release`, `user` and `channel` from a raw query string.
    ///
    /// Values are form-decoded and the first occurrence of a repeated key wins.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut event = DeployEvent::default();
        let mut seen = [false; 4];

        for (key, value) in form_urlencoded::parse(query.unwrap_or("").as_bytes()) {
            let slot = match &*key {
                "app" => 0,
                "release" => 1,
                "user" => 2,
                "channel" => 3,
                _ => continue,
            };
            if seen[slot] {
                continue;
            }
            seen[slot] = true;

            let value = value.into_owned();
            match slot {
                0 => event.app = value,
                1 => event.release = value,
                2 => event.user = value,
                _ => event.channel = Some(value).filter(|c| !c.is_empty()),
            }
        }

        event
    }

    /// Replace the channel with the one named by the request path.
    ///
    /// `/deploys` and `/deploys/` name `deploys`; the root and nested paths name none.
    /// The segment is percent-decoded, keeping the raw text if it is not UTF-8.
    pub fn with_path_channel(mut self, path: &str) -> Self {
        let trimmed = path.trim_matches('/');
        self.channel = if trimmed.is_empty() || trimmed.contains('/') {
            None
        } else {
            let decoded = urlencoding::decode(trimmed)
                .map(|c| c.into_owned())
                .unwrap_or_else(|_| trimmed.to_string());
            Some(decoded).filter(|c| !c.is_empty())
        };
        self
    }
}
