//! Log filter wire types: criteria, range, ordering and raw matches.

use serde::{Deserialize, Serialize};

// ─── Filter shape ────────────────────────────────────────────────────────────

/// Which log table a filter runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Event,
    Transfer,
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Event => write!(f, "event"),
            Self::Transfer => write!(f, "transfer"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeUnit {
    Block,
    Time,
}

/// Inclusive search window, measured in block numbers or unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRange {
    pub unit: RangeUnit,
    pub from: u64,
    pub to: u64,
}

impl FilterRange {
    pub fn blocks(from: u64, to: u64) -> Self {
        Self { unit: RangeUnit::Block, from, to }
    }

    pub fn time(from: u64, to: u64) -> Self {
        Self { unit: RangeUnit::Time, from, to }
    }

    /// Returns `true` if a log with this `meta` falls inside the window.
    pub fn contains(&self, meta: &LogMeta) -> bool {
        let v = match self.unit {
            RangeUnit::Block => u64::from(meta.block_number),
            RangeUnit::Time => meta.block_timestamp,
        };
        self.from <= v && v <= self.to
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOptions {
    pub offset: u64,
    pub limit: u64,
}

/// Immutable snapshot of a filter, as handed to the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery<C> {
    pub criteria_set: Vec<C>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<FilterRange>,
    pub order: Order,
    pub options: PageOptions,
}

// ─── Criteria ────────────────────────────────────────────────────────────────

/// One match predicate over event logs. Unset fields match anything.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic0: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic4: Option<String>,
}

impl EventCriteria {
    /// Criteria matching every event emitted by `address`.
    pub fn address(addr: impl Into<String>) -> Self {
        Self {
            address: Some(addr.into()),
            ..Default::default()
        }
    }

    /// The five topic slots in order.
    pub fn topics(&self) -> [&Option<String>; 5] {
        [&self.topic0, &self.topic1, &self.topic2, &self.topic3, &self.topic4]
    }

    pub fn topics_mut(&mut self) -> [&mut Option<String>; 5] {
        [
            &mut self.topic0,
            &mut self.topic1,
            &mut self.topic2,
            &mut self.topic3,
            &mut self.topic4,
        ]
    }

    /// Returns `true` if `log` satisfies every set field (case-insensitive).
    pub fn matches(&self, log: &EventLog) -> bool {
        if !opt_eq(&self.address, &log.address) {
            return false;
        }
        self.topics().iter().enumerate().all(|(i, want)| match want {
            None => true,
            Some(w) => log.topics.get(i).is_some_and(|t| t.eq_ignore_ascii_case(w)),
        })
    }
}

/// One match predicate over VET transfer logs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

impl TransferCriteria {
    pub fn matches(&self, log: &TransferLog) -> bool {
        opt_eq(&self.tx_origin, &log.meta.tx_origin)
            && opt_eq(&self.sender, &log.sender)
            && opt_eq(&self.recipient, &log.recipient)
    }
}

fn opt_eq(want: &Option<String>, have: &str) -> bool {
    want.as_deref().map_or(true, |w| w.eq_ignore_ascii_case(have))
}

// ─── Raw matches ─────────────────────────────────────────────────────────────

/// Where a log (or receipt) was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogMeta {
    #[serde(rename = "blockID")]
    pub block_id: String,
    #[serde(rename = "blockNumber")]
    pub block_number: u32,
    #[serde(rename = "blockTimestamp")]
    pub block_timestamp: u64,
    #[serde(rename = "txID")]
    pub tx_id: String,
    #[serde(rename = "txOrigin")]
    pub tx_origin: String,
}

/// A raw event log as returned by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    pub address: String,
    pub topics: Vec<String>,
    /// ABI-encoded non-indexed parameters, `0x`-prefixed hex.
    pub data: String,
    pub meta: LogMeta,
}

/// A raw native-token transfer log as returned by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLog {
    pub sender: String,
    pub recipient: String,
    /// Amount in wei, hex-encoded.
    pub amount: String,
    pub meta: LogMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(address: &str, topics: &[&str], block: u32) -> EventLog {
        EventLog {
            address: address.into(),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            data: "0x".into(),
            meta: LogMeta {
                block_number: block,
                block_timestamp: 1000 + u64::from(block) * 10,
                ..Default::default()
            },
        }
    }

    #[test]
    fn empty_criteria_matches_all() {
        assert!(EventCriteria::default().matches(&log("0xabc", &["0x01"], 1)));
    }

    #[test]
    fn criteria_match_is_case_insensitive() {
        let c = EventCriteria {
            address: Some("0xABC".into()),
            topic1: Some("0xFF".into()),
            ..Default::default()
        };
        assert!(c.matches(&log("0xabc", &["0x01", "0xff"], 1)));
        assert!(!c.matches(&log("0xabc", &["0x01"], 1)), "missing topic1");
        assert!(!c.matches(&log("0xdef", &["0x01", "0xff"], 1)));
    }

    #[test]
    fn range_units() {
        let l = log("0xabc", &[], 5);
        assert!(FilterRange::blocks(5, 5).contains(&l.meta));
        assert!(!FilterRange::blocks(6, 9).contains(&l.meta));
        assert!(FilterRange::time(1050, 1050).contains(&l.meta));
    }

    #[test]
    fn query_wire_shape() {
        let q = FilterQuery {
            criteria_set: vec![TransferCriteria {
                sender: Some("0xabc".into()),
                ..Default::default()
            }],
            range: None,
            order: Order::Desc,
            options: PageOptions { offset: 0, limit: 10 },
        };
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["order"], "desc");
        assert_eq!(json["criteriaSet"][0]["sender"], "0xabc");
        assert!(json.get("range").is_none());
    }
}
