//! CMR search response models

use serde::Deserialize;

/// Relation suffix CMR uses for service (OPeNDAP) links
const SERVICE_REL_SUFFIX: &str = "service#";

/// Top-level `granules.json` response
#[derive(Debug, Deserialize)]
pub(crate) struct CmrSearchResponse {
    pub feed: CmrFeed,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CmrFeed {
    #[serde(default)]
    pub entry: Vec<CmrEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CmrEntry {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub time_start: Option<String>,
    #[serde(default)]
    pub links: Vec<CmrLink>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CmrLink {
    pub href: String,
    #[serde(default)]
    pub rel: String,
}

impl CmrLink {
    /// An `/opendap/` path segment, an `opendap.` host or a service relation
    fn is_opendap(&self) -> bool {
        let href = self.href.to_ascii_lowercase();
        let host = href
            .split_once("://")
            .map_or(href.as_str(), |(_, rest)| rest)
            .split('/')
            .next()
            .unwrap_or_default();

        href.contains("/opendap/")
            || host.starts_with("opendap.")
            || self.rel.ends_with(SERVICE_REL_SUFFIX)
    }
}

/// A granule found by a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Granule {
    /// CMR concept id
    pub id: String,
    /// Producer granule title
    pub title: String,
    /// Start of the granule's time slice, as reported by CMR
    pub time_start: Option<String>,
    /// OPeNDAP endpoint for the granule, if the archive publishes one
    pub opendap_url: Option<String>,
}

impl From<CmrEntry> for Granule {
    fn from(entry: CmrEntry) -> Self {
        let opendap_url = entry
            .links
            .iter()
            .find(|link| link.is_opendap())
            .map(|link| link.href.trim_end_matches(".html").to_string());

        Self {
            id: entry.id,
            title: entry.title,
            time_start: entry.time_start,
            opendap_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(links: serde_json::Value) -> CmrEntry {
        serde_json::from_value(serde_json::json!({
            "id": "G123-GES_DISC",
            "title": "GLDAS_NOAH025_3H.A20240115.1500.021.nc4",
            "time_start": "2024-01-15T15:00:00.000Z",
            "links": links
        }))
        .unwrap()
    }

    #[test]
    fn picks_opendap_link_by_href() {
        let granule = Granule::from(entry(serde_json::json!([
            {"href": "https://data.gesdisc.earthdata.nasa.gov/data/GLDAS/x.nc4",
             "rel": "http://esipfed.org/ns/fedsearch/1.1/data#"},
            {"href": "https://hydro1.gesdisc.eosdis.nasa.gov/opendap/GLDAS/x.nc4",
             "rel": "http://esipfed.org/ns/fedsearch/1.1/documentation#"}
        ])));
        assert_eq!(
            granule.opendap_url.as_deref(),
            Some("https://hydro1.gesdisc.eosdis.nasa.gov/opendap/GLDAS/x.nc4")
        );
        assert_eq!(granule.id, "G123-GES_DISC");
    }

    #[test]
    fn ignores_documents_merely_named_after_opendap() {
        let granule = Granule::from(entry(serde_json::json!([
            {"href": "https://docs.example.org/guides/GLDAS_opendap_howto.pdf",
             "rel": "http://esipfed.org/ns/fedsearch/1.1/documentation#"},
            {"href": "https://opendap.earthdata.nasa.gov/collections/C1/granules/x.nc4",
             "rel": "http://esipfed.org/ns/fedsearch/1.1/data#"}
        ])));
        assert_eq!(
            granule.opendap_url.as_deref(),
            Some("https://opendap.earthdata.nasa.gov/collections/C1/granules/x.nc4")
        );
    }

    #[test]
    fn opendap_file_name_alone_is_no_endpoint() {
        let granule = Granule::from(entry(serde_json::json!([
            {"href": "https://data.example.org/archive/opendap-mirror.nc4",
             "rel": "http://esipfed.org/ns/fedsearch/1.1/data#"}
        ])));
        assert!(granule.opendap_url.is_none());
    }

    #[test]
    fn picks_service_link_by_rel_and_strips_html() {
        let granule = Granule::from(entry(serde_json::json!([
            {"href": "https://example.org/dap/x.nc4.html",
             "rel": "http://esipfed.org/ns/fedsearch/1.1/service#"}
        ])));
        assert_eq!(
            granule.opendap_url.as_deref(),
            Some("https://example.org/dap/x.nc4")
        );
    }

    #[test]
    fn no_service_link_means_no_endpoint() {
        let granule = Granule::from(entry(serde_json::json!([
            {"href": "https://data.example.org/x.nc4",
             "rel": "http://esipfed.org/ns/fedsearch/1.1/data#"}
        ])));
        assert!(granule.opendap_url.is_none());
    }

    #[test]
    fn empty_feed_parses() {
        let response: CmrSearchResponse =
            serde_json::from_str(r#"{"feed": {"id": "x", "title": "y"}}"#).unwrap();
        assert!(response.feed.entry.is_empty());
    }
}
