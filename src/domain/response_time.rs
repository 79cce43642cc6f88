//! Response-time aggregation. Pure function over a message corpus.
//!
//! Messages are grouped per channel and ordered by timestamp; every message
//! after the first one in a channel yields a gap sample attributed to its author,
//! measured from whatever message preceded it in that channel.

use crate::domain::{Message, ResponseTimeStats, ResponseTimeSummary};
use std::collections::BTreeMap;
use tracing::debug;

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Round to the nearest one-decimal value; exact ties go to the even digit.
///
/// Decimal formatting is correctly rounded, so `0.25` becomes `0.2` and
/// `1.25` becomes `1.2`, where `(x * 10.0).round()` would give `0.3` and `1.3`.
fn round1(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

/// Compute per-author response-time statistics.
///
/// * Samples are rounded to one decimal; `min`/`max` are taken over those samples as-is.
/// * `avg` is the mean of the samples, rounded to one decimal.
/// * Authors that never follow another message in any channel are absent.
pub fn compute(messages: &[Message]) -> ResponseTimeSummary {
    let mut channels: BTreeMap<&str, Vec<&Message>> = BTreeMap::new();
    for msg in messages {
        channels.entry(msg.channel.as_str()).or_default().push(msg);
    }

    let mut samples: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for msgs in channels.values_mut() {
        // Stable: equal timestamps keep input order.
        msgs.sort_by_key(|m| m.timestamp);
        for pair in msgs.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            let gap = curr.timestamp.signed_duration_since(prev.timestamp);
            let minutes = round1(gap.num_milliseconds() as f64 / MILLIS_PER_MINUTE);
            samples.entry(curr.author.as_str()).or_default().push(minutes);
        }
    }

    debug!(
        channels = channels.len(),
        authors = samples.len(),
        "computed response-time samples"
    );

    samples
        .into_iter()
        .map(|(author, times)| {
            let total = times.len();
            let sum: f64 = times.iter().sum();
            let min = times.iter().copied().fold(f64::INFINITY, f64::min);
            let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (
                author.to_string(),
                ResponseTimeStats {
                    avg_response_minutes: round1(sum / total as f64),
                    min_response_minutes: min,
                    max_response_minutes: max,
                    total_responses: total as u64,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, FixedOffset};

    fn t0() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-03-01T09:00:00+00:00").unwrap()
    }

    fn msg(channel: &str, author: &str, content: &str, offset_secs: i64) -> Message {
        Message::new(channel, author, content, t0() + Duration::seconds(offset_secs))
    }

    #[test]
    fn test_three_message_scenario() {
        let messages = vec![
            msg("general", "alice", "hi", 0),
            msg("general", "bob", "hey", 5 * 60),
            msg("general", "alice", "bye", 8 * 60),
        ];

        let summary = compute(&messages);

        assert_eq!(summary.len(), 2);
        assert_eq!(
            summary["bob"],
            ResponseTimeStats {
                avg_response_minutes: 5.0,
                min_response_minutes: 5.0,
                max_response_minutes: 5.0,
                total_responses: 1,
            }
        );
        assert_eq!(
            summary["alice"],
            ResponseTimeStats {
                avg_response_minutes: 3.0,
                min_response_minutes: 3.0,
                max_response_minutes: 3.0,
                total_responses: 1,
            }
        );
    }

    #[test]
    fn test_single_channel_yields_n_minus_one_samples() {
        let authors = ["ann", "ben", "cat", "ann", "ben", "ann", "dan"];
        let messages: Vec<Message> = authors
            .iter()
            .enumerate()
            .map(|(i, a)| msg("dev", a, "x", i as i64 * 90))
            .collect();

        let summary = compute(&messages);

        let total: u64 = summary.values().map(|s| s.total_responses).sum();
        assert_eq!(total, messages.len() as u64 - 1);
        // First author only counts for later messages.
        assert_eq!(summary["ann"].total_responses, 2);
        assert_eq!(summary["ben"].total_responses, 2);
        assert_eq!(summary["cat"].total_responses, 1);
        assert_eq!(summary["dan"].total_responses, 1);
    }

    #[test]
    fn test_permutation_within_channel_is_irrelevant() {
        let ordered = vec![
            msg("general", "alice", "a", 0),
            msg("general", "bob", "b", 130),
            msg("general", "carol", "c", 400),
            msg("random", "bob", "d", 10),
            msg("random", "alice", "e", 75),
        ];
        let mut shuffled = ordered.clone();
        shuffled.reverse();
        shuffled.swap(0, 3);

        assert_eq!(compute(&ordered), compute(&shuffled));
    }

    #[test]
    fn test_avg_rounded_min_max_from_samples() {
        // Gaps: 1.0 min, then 2.5 min, then 0.1 min -> all by "bob"
        let messages = vec![
            msg("c", "alice", "1", 0),
            msg("c", "bob", "2", 60),
            msg("c", "bob", "3", 210),
            msg("c", "bob", "4", 216),
        ];

        let stats = &compute(&messages)["bob"];

        assert_eq!(stats.total_responses, 3);
        assert_eq!(stats.min_response_minutes, 0.1);
        assert_eq!(stats.max_response_minutes, 2.5);
        // mean = 3.6 / 3 = 1.2
        assert_eq!(stats.avg_response_minutes, 1.2);
    }

    #[test]
    fn test_avg_rounding_to_one_decimal() {
        // Samples 1.0, 1.0, 1.1 -> mean 1.0333.. -> 1.0
        let messages = vec![
            msg("c", "x", "1", 0),
            msg("c", "y", "2", 60),
            msg("c", "y", "3", 120),
            msg("c", "y", "4", 186),
        ];

        let stats = &compute(&messages)["y"];

        assert_eq!(stats.avg_response_minutes, 1.0);
        assert_eq!(stats.max_response_minutes, 1.1);
    }

    #[test]
    fn test_tie_gaps_round_half_to_even() {
        // 15 s = 0.25 min -> 0.2, 75 s = 1.25 min -> 1.2, 18 s = 0.3 min.
        let messages = vec![
            msg("a", "x", "1", 0),
            msg("a", "y", "2", 15),
            msg("b", "x", "3", 0),
            msg("b", "y", "4", 75),
            msg("c", "x", "5", 0),
            msg("c", "z", "6", 15),
            msg("c", "z", "7", 33),
        ];

        let summary = compute(&messages);

        let y = &summary["y"];
        assert_eq!(y.min_response_minutes, 0.2);
        assert_eq!(y.max_response_minutes, 1.2);
        assert_eq!(y.avg_response_minutes, 0.7);

        // Samples 0.2 and 0.3: mean 0.25 is itself a tie -> 0.2.
        let z = &summary["z"];
        assert_eq!(z.min_response_minutes, 0.2);
        assert_eq!(z.max_response_minutes, 0.3);
        assert_eq!(z.avg_response_minutes, 0.2);
    }

    #[test]
    fn test_samples_pooled_across_channels() {
        let messages = vec![
            msg("a", "alice", "1", 0),
            msg("a", "bob", "2", 120),
            msg("b", "carol", "3", 0),
            msg("b", "bob", "4", 600),
        ];

        let stats = &compute(&messages)["bob"];

        assert_eq!(stats.total_responses, 2);
        assert_eq!(stats.min_response_minutes, 2.0);
        assert_eq!(stats.max_response_minutes, 10.0);
        assert_eq!(stats.avg_response_minutes, 6.0);
    }

    #[test]
    fn test_first_message_author_absent_and_tiny_channels_ignored() {
        let messages = vec![
            msg("solo", "zed", "only one", 0),
            msg("pair", "zed", "first", 0),
            msg("pair", "amy", "second", 30),
        ];

        let summary = compute(&messages);

        assert!(!summary.contains_key("zed"));
        assert_eq!(summary["amy"].avg_response_minutes, 0.5);
        assert!(compute(&[]).is_empty());
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let messages = vec![
            msg("c", "first", "1", 0),
            msg("c", "second", "2", 0),
        ];

        let summary = compute(&messages);

        assert_eq!(summary["second"].total_responses, 1);
        assert_eq!(summary["second"].avg_response_minutes, 0.0);
        assert!(!summary.contains_key("first"));
    }

    #[test]
    fn test_compute_is_idempotent() {
        let messages = vec![
            msg("general", "alice", "hi", 0),
            msg("general", "bob", "hey", 301),
            msg("ops", "carol", "deploy?", 20),
            msg("ops", "alice", "yes", 999),
        ];

        assert_eq!(compute(&messages), compute(&messages));
    }

    #[test]
    fn test_offsets_compare_as_instants() {
        // 10:00+02:00 is 08:00Z, so the +00:00 message at 08:30Z comes second.
        let early = DateTime::parse_from_rfc3339("2024-03-01T10:00:00+02:00").unwrap();
        let late = DateTime::parse_from_rfc3339("2024-03-01T08:30:00+00:00").unwrap();
        let messages = vec![
            Message::new("c", "late", "b", late),
            Message::new("c", "early", "a", early),
        ];

        let summary = compute(&messages);

        assert_eq!(summary["late"].avg_response_minutes, 30.0);
        assert!(!summary.contains_key("early"));
    }
}
