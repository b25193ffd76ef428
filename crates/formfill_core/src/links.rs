use std::collections::BTreeMap;

use serde::Deserialize;

use crate::fields;

/// A profile link reported by the resume parser.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ProfileLink {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Named link inputs on the form. `Other` is the catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LinkBucket {
    LinkedIn,
    Twitter,
    Quora,
    GitHub,
    Other,
}

impl LinkBucket {
    pub const ALL: [LinkBucket; 5] = [
        LinkBucket::LinkedIn,
        LinkBucket::Twitter,
        LinkBucket::Quora,
        LinkBucket::GitHub,
        LinkBucket::Other,
    ];

    /// Buckets matched by domain, in matching order.
    const NAMED: [LinkBucket; 4] = [
        LinkBucket::LinkedIn,
        LinkBucket::Twitter,
        LinkBucket::Quora,
        LinkBucket::GitHub,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LinkBucket::LinkedIn => "LinkedIn",
            LinkBucket::Twitter => "Twitter",
            LinkBucket::Quora => "Quora",
            LinkBucket::GitHub => "GitHub",
            LinkBucket::Other => "Other",
        }
    }

    pub fn field_name(self) -> &'static str {
        match self {
            LinkBucket::LinkedIn => fields::URL_LINKEDIN,
            LinkBucket::Twitter => fields::URL_TWITTER,
            LinkBucket::Quora => fields::URL_QUORA,
            LinkBucket::GitHub => fields::URL_GITHUB,
            LinkBucket::Other => fields::URL_OTHER,
        }
    }

    /// First named bucket whose label occurs in `domain`, ignoring case.
    pub fn for_domain(domain: Option<&str>) -> LinkBucket {
        let Some(domain) = domain.filter(|d| !d.is_empty()) else {
            return LinkBucket::Other;
        };
        let domain = domain.to_lowercase();
        Self::NAMED
            .into_iter()
            .find(|bucket| domain.contains(&bucket.label().to_lowercase()))
            .unwrap_or(LinkBucket::Other)
    }
}

/// Routes links into buckets; a later link replaces an earlier one in the
/// same bucket.
pub fn classify_links(links: &[ProfileLink]) -> BTreeMap<LinkBucket, Option<String>> {
    let mut found = BTreeMap::new();
    for link in links {
        found.insert(LinkBucket::for_domain(link.domain.as_deref()), link.url.clone());
    }
    found
}
