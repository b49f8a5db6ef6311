//! Cluster membership settings: advertised peer URLs and the initial cluster
//! string derived from a member name.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

use crate::defaults::DEFAULT_NAME;

/// Ordered set of peer URLs advertised by a member.
///
/// URLs are normalised by the `url` crate and kept sorted so that two lists
/// naming the same peers compare equal regardless of input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerUrls(Vec<Url>);

impl PeerUrls {
    /// Returns the parsed URLs in sorted order.
    #[must_use]
    pub fn urls(&self) -> &[Url] {
        &self.0
    }
}

impl FromStr for PeerUrls {
    type Err = PeerUrlsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut urls = split_list(value)
            .map(|raw| {
                Url::parse(raw).map_err(|source| PeerUrlsError::Invalid {
                    value: raw.to_owned(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if urls.is_empty() {
            return Err(PeerUrlsError::Empty);
        }
        urls.sort_by(|left, right| left.as_str().cmp(right.as_str()));
        Ok(Self(urls))
    }
}

impl fmt::Display for PeerUrls {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for url in &self.0 {
            if !first {
                formatter.write_str(",")?;
            }
            formatter.write_str(url.as_str())?;
            first = false;
        }
        Ok(())
    }
}

/// Errors raised while parsing a peer URL list.
#[derive(Debug, Error)]
pub enum PeerUrlsError {
    /// The list contained no URLs.
    #[error("peer URL list is empty")]
    Empty,
    /// One entry was not a valid URL.
    #[error("invalid peer URL '{value}': {source}")]
    Invalid {
        /// Offending entry.
        value: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
}

/// Builds the initial cluster string a lone member would use: one
/// `name=url` pair per advertised peer URL.
///
/// An empty name falls back to [`DEFAULT_NAME`].
#[must_use]
pub fn initial_cluster_from_name(name: &str, advertise_peer_urls: &str) -> String {
    let member = if name.is_empty() { DEFAULT_NAME } else { name };
    split_list(advertise_peer_urls)
        .map(|url| format!("{member}={url}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
}
