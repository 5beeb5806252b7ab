use std::collections::BTreeMap;

use tracing::debug;
use url::Url;

/// Where notifications go.
///
/// Exactly one shape is active per deployment. `Single` posts every event to one
/// webhook and takes the Slack channel from the request path; `ByApp` looks the
/// webhook up by application name and takes an optional channel from the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Single(Url),
    ByApp(DestinationTable),
}

impl Destination {
    pub fn channel_from_path(&self) -> bool {
        matches!(self, Destination::Single(_))
    }
}

/// Static application-name to webhook table, read-only after startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationTable {
    urls: BTreeMap<String, Url>,
}

impl DestinationTable {
    /// Parse `name=url,name=url`.
    ///
    /// Entries without exactly one `=`, with an empty side, or with an
    /// unparseable URL are skipped.
    pub fn parse(raw: &str) -> Self {
        let mut urls = BTreeMap::new();

        if raw.is_empty() {
            return Self { urls };
        }

        for entry in raw.split(',') {
            let parts: Vec<&str> = entry.split('=').collect();
            if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
                continue;
            }

            let name = parts[0].trim();
            let target = parts[1].trim();

            match Url::parse(target) {
                Ok(url) => {
                    urls.insert(name.to_string(), url);
                }
                Err(e) => {
                    debug!("Skipping {}; Invalid url: {}", target, e);
                }
            }
        }

        Self { urls }
    }

    pub fn get(&self, name: &str) -> Option<&Url> {
        self.urls.get(name)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Url)> {
        self.urls.iter()
    }
}
