// ABOUTME: Maps a typed feed document to Show and Episode records.
// ABOUTME: Validates required channel fields up front and fails without producing partial records.

use crate::categories::normalize_categories;
use crate::document::{ChannelNode, FeedDocument, ItemNode};
use crate::duration_parse::parse_duration;
use crate::error::FeedError;
use crate::models::{Episode, NormalizedFeed, Show};
use crate::persons::normalize_persons;
use crate::source::ResolvedSource;
use crate::time_parse::parse_feed_date;

/// `episodeType` recorded when an item does not declare one.
pub const DEFAULT_EPISODE_TYPE: &str = "full";

/// Parses feed bytes and normalizes them in one step.
///
/// # Arguments
/// * `data` - Raw RSS bytes
/// * `source` - Feed URL and catalog provenance from the resolver
pub fn parse_feed_bytes(data: &[u8], source: &ResolvedSource) -> Result<NormalizedFeed, FeedError> {
    let doc = FeedDocument::parse(data)?;
    normalize_feed(&doc, source)
}

/// Builds the Show and its Episodes from a parsed document.
///
/// Fails with [`FeedError::Missing`] if the channel lacks `title`, `description`,
/// `image/url`, or `itunes:image@href`, or if an item lacks `title` or
/// `enclosure@url`. Fails with [`FeedError::Empty`] when there are no items.
pub fn normalize_feed(doc: &FeedDocument, source: &ResolvedSource) -> Result<NormalizedFeed, FeedError> {
    let channel = &doc.channel;
    let show = build_show(channel, source)?;

    if channel.items.is_empty() {
        return Err(FeedError::Empty);
    }

    let episodes = channel
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| build_episode(index, item, &show, source))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NormalizedFeed { show, episodes })
}

fn build_show(channel: &ChannelNode, source: &ResolvedSource) -> Result<Show, FeedError> {
    let title = required(&channel.title, "rss/channel/title")?;
    let description = required(&channel.description, "rss/channel/description")?;
    let image = required(&channel.image_url, "rss/channel/image/url")?;
    let artwork = required(&channel.itunes_image_href, "rss/channel/itunes:image@href")?;
    let owner = channel.owner.clone().unwrap_or_default();

    Ok(Show {
        feed_url: source.feed_url.clone(),
        title,
        description,
        author: channel.author.clone(),
        catalog_id: source.catalog_id,
        itunes_type: channel.itunes_type.clone(),
        language: channel.language.clone(),
        link: channel.link.clone(),
        image,
        artwork,
        last_build_date: channel.last_build_date.as_deref().and_then(parse_feed_date),
        categories: normalize_categories(&channel.categories),
        generator: channel.generator.clone(),
        copyright: channel.copyright.clone(),
        podcast_guid: channel.podcast_guid.clone(),
        owner_name: owner.name,
        owner_email: owner.email,
        explicit: is_explicit(channel.explicit.as_deref()),
        episode_count: channel.items.len(),
        kind: source.kind_or_default().to_string(),
        summary: channel.summary.clone(),
        subtitle: channel.subtitle.clone(),
        persons: normalize_persons(&channel.persons),
        episodes: Vec::new(),
    })
}

fn build_episode(
    index: usize,
    item: &ItemNode,
    show: &Show,
    source: &ResolvedSource,
) -> Result<Episode, FeedError> {
    let title = required(&item.title, &format!("rss/channel/item[{index}]/title"))?;
    let enclosure = item.enclosure.clone().unwrap_or_default();
    let enclosure_url = required(
        &enclosure.url,
        &format!("rss/channel/item[{index}]/enclosure@url"),
    )?;

    Ok(Episode {
        title,
        description: item.description.clone().unwrap_or_default(),
        pub_date: item.pub_date.as_deref().and_then(parse_feed_date),
        duration: item.duration.as_deref().map(|d| parse_duration(d)).unwrap_or(0),
        enclosure_length: enclosure.length.as_deref().and_then(parse_leading_int),
        enclosure_type: enclosure.mime_type,
        enclosure_url,
        // Zero is not a track number; it falls back like a missing one.
        episode: item
            .episode
            .as_deref()
            .and_then(parse_leading_int)
            .filter(|n| *n != 0)
            .or(source.default_track_number),
        episode_type: item
            .episode_type
            .clone()
            .unwrap_or_else(|| DEFAULT_EPISODE_TYPE.to_string()),
        explicit: u8::from(is_explicit(item.explicit.as_deref())),
        guid: item.guid.clone(),
        link: item.link.clone(),
        image: item.image_href.clone().unwrap_or_else(|| show.image.clone()),
        feed_image: show.image.clone(),
        feed_catalog_id: show.catalog_id,
        feed_language: show.language.clone(),
        chapters_url: item.chapters_url.clone(),
        transcript_url: item.transcript_urls.first().cloned(),
        transcript_urls: item.transcript_urls.clone(),
        persons: normalize_persons(&item.persons),
    })
}

fn required(value: &Option<String>, path: &str) -> Result<String, FeedError> {
    value.clone().ok_or_else(|| FeedError::missing(path))
}

/// Returns true only for `yes`, case-insensitively.
pub fn is_explicit(value: Option<&str>) -> bool {
    value
        .map(|v| v.trim().eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

/// Reads the leading run of digits, ignoring anything after it (`"123abc"` is 123).
pub fn parse_leading_int(s: &str) -> Option<u64> {
    let s = s.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    s[..end].parse().ok()
}
