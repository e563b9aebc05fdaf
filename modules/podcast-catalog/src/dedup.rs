use std::collections::HashMap;

use leadgen_common::{SourceApi, UnifiedLead};

/// Group leads by their dedup key and merge each group into one record,
/// per `services/deduplication_service.py`. The key field is `feed_url`
/// (spec §3, §4.3, §4.5) — not iTunes ID, which is only the preferred
/// identifier for cross-provider *lookups* (§4.5), a distinct concern.
/// Unlike the original, records missing a key are passed through
/// unchanged rather than dropped (spec §4.4 is explicit that they survive
/// to output).
///
/// Within a group, the record from `priority_source` is the base (first
/// record if no priority-source record is present); fields are only
/// filled in from the other records when they're still null on the base
/// — a non-null value on the base is never overwritten. Output order:
/// merged groups first in first-seen order, then passthrough records in
/// their original order.
pub fn dedupe_and_merge(leads: Vec<UnifiedLead>, priority_source: SourceApi) -> Vec<UnifiedLead> {
    let mut groups: HashMap<String, Vec<UnifiedLead>> = HashMap::new();
    let mut group_order: Vec<String> = Vec::new();
    let mut passthrough = Vec::new();

    for lead in leads {
        match dedup_key(&lead) {
            Some(key) => {
                if !groups.contains_key(&key) {
                    group_order.push(key.clone());
                }
                groups.entry(key).or_default().push(lead);
            }
            None => passthrough.push(lead),
        }
    }

    let mut merged: Vec<UnifiedLead> = group_order
        .into_iter()
        .map(|key| merge_group(groups.remove(&key).expect("key from group_order"), priority_source))
        .collect();

    merged.extend(passthrough);
    merged
}

fn dedup_key(lead: &UnifiedLead) -> Option<String> {
    lead.feed_url.clone()
}

fn merge_group(mut group: Vec<UnifiedLead>, priority_source: SourceApi) -> UnifiedLead {
    let priority_idx = group
        .iter()
        .position(|lead| lead.source_api == Some(priority_source));
    let base_idx = priority_idx.unwrap_or(0);
    let base = group.swap_remove(base_idx);

    group.into_iter().fold(base, |acc, other| merge_fields(acc, other))
}

/// Fill nulls on `base` from `other`; never overwrite a non-null field.
fn merge_fields(mut base: UnifiedLead, other: UnifiedLead) -> UnifiedLead {
    macro_rules! fill {
        ($field:ident) => {
            if base.$field.is_none() {
                base.$field = other.$field;
            }
        };
    }

    fill!(source_api);
    fill!(feed_url);
    fill!(itunes_id);
    fill!(spotify_id);
    fill!(website);
    fill!(title);
    fill!(description);
    fill!(image_url);
    fill!(language);
    fill!(total_episodes);
    fill!(latest_pub_date_ms);
    fill!(earliest_pub_date_ms);
    fill!(update_frequency_hours);
    fill!(listen_score);
    fill!(listen_score_global_rank);
    fill!(audience_size);
    fill!(itunes_rating_average);
    fill!(itunes_rating_count);
    fill!(spotify_rating_average);
    fill!(spotify_rating_count);
    fill!(twitter_url);
    fill!(linkedin_url);
    fill!(instagram_url);
    fill!(facebook_url);
    fill!(youtube_url);
    fill!(tiktok_url);
    fill!(other_social_url);
    fill!(email);

    if base.api_id.is_empty() {
        base.api_id = other.api_id;
    }

    base
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(source: SourceApi, itunes_id: Option<i64>, feed_url: Option<&str>) -> UnifiedLead {
        UnifiedLead {
            source_api: Some(source),
            api_id: format!("{source}-id"),
            itunes_id,
            feed_url: feed_url.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn merges_matching_keys_preferring_priority_source_base() {
        let mut a = lead(SourceApi::Listennotes, Some(1), Some("https://feed"));
        a.title = Some("LN Title".into());
        let mut b = lead(SourceApi::Podscan, Some(1), Some("https://feed"));
        b.title = Some("PS Title".into());
        b.audience_size = Some(5000);

        let merged = dedupe_and_merge(vec![a, b], SourceApi::Podscan);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title.as_deref(), Some("PS Title"));
        assert_eq!(merged[0].audience_size, Some(5000));
    }

    #[test]
    fn never_overwrites_non_null_base_field() {
        let mut a = lead(SourceApi::Listennotes, Some(1), None);
        a.listen_score = Some(90);
        let mut b = lead(SourceApi::Podscan, Some(1), None);
        b.listen_score = Some(10);

        let merged = dedupe_and_merge(vec![a, b], SourceApi::Listennotes);
        assert_eq!(merged[0].listen_score, Some(90));
    }

    #[test]
    fn keyless_records_pass_through_unchanged() {
        let keyless = UnifiedLead {
            source_api: Some(SourceApi::Listennotes),
            api_id: "no-key".into(),
            ..Default::default()
        };
        let merged = dedupe_and_merge(vec![keyless], SourceApi::Listennotes);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].api_id, "no-key");
    }
}
