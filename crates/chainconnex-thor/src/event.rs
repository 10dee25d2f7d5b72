//! Event visitor: a log filter bound to one contract address and one ABI event.
//!
//! Indexed arguments are encoded into topic criteria on the way in; matches
//! are decoded back into named arguments on the way out.

use std::sync::Arc;

use chainconnex_core::validator::is_bytes32;
use chainconnex_core::{
    CodecError, ConnexError, DecodedArgs, Driver, EventCoder, EventCriteria, EventLog, FilterRange,
    IndexedArgs, Order, Pending,
};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::{EventKind, Filter};

/// A raw event log with its decoded arguments attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedEventLog {
    #[serde(flatten)]
    pub log: EventLog,
    pub decoded: DecodedArgs,
}

pub struct EventVisitor {
    driver: Arc<dyn Driver>,
    address: String,
    coder: Arc<dyn EventCoder>,
}

impl EventVisitor {
    pub(crate) fn new(driver: Arc<dyn Driver>, address: String, coder: Arc<dyn EventCoder>) -> Self {
        Self {
            driver,
            address,
            coder,
        }
    }

    /// Encode indexed args into criteria. Every topic the coder produces must
    /// be bytes32; it is stored lowercased.
    fn encode(&self, indexed: &IndexedArgs) -> Result<EventCriteria, CodecError> {
        let topics = self.coder.encode(indexed)?;
        let mut criteria = EventCriteria::address(self.address.clone());
        for (n, (slot, topic)) in criteria.topics_mut().into_iter().zip(topics).enumerate() {
            let Some(topic) = topic.filter(|t| !t.is_empty()) else {
                continue;
            };
            if !is_bytes32(&topic) {
                return Err(CodecError::Encode {
                    reason: format!("topic{n} expected bytes32"),
                });
            }
            *slot = Some(topic.to_lowercase());
        }
        Ok(criteria)
    }

    /// Criteria matching this event with the given indexed arguments.
    pub fn as_criteria(&self, indexed: &IndexedArgs) -> Result<EventCriteria, ConnexError> {
        self.encode(indexed)
            .map_err(|e| ConnexError::bad_parameter(format!("arg0 can not be encoded: {e}")))
    }

    /// A filter over this event. Entries are OR-combined; an empty list
    /// matches every occurrence of the event.
    pub fn filter(&self, indexed: Vec<IndexedArgs>) -> Result<EventFilter, ConnexError> {
        let indexed = if indexed.is_empty() {
            vec![IndexedArgs::new()]
        } else {
            indexed
        };
        let criteria_set = indexed
            .iter()
            .enumerate()
            .map(|(i, args)| {
                self.encode(args).map_err(|e| {
                    ConnexError::bad_parameter(format!("arg0.#{i} can not be encoded: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EventFilter {
            inner: Filter::new(self.driver.clone()).criteria(criteria_set)?,
            coder: self.coder.clone(),
        })
    }

    /// [`filter`](Self::filter) for a JSON array of objects.
    pub fn filter_json(&self, indexed: &Value) -> Result<EventFilter, ConnexError> {
        let items = indexed
            .as_array()
            .ok_or_else(|| ConnexError::bad_parameter("arg0 expected array"))?;
        let list = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_object().cloned().ok_or_else(|| {
                    ConnexError::bad_parameter(format!("arg0.#{i} can not be encoded: expected object"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.filter(list)
    }
}

/// A [`Filter`] over event logs that decodes every match.
pub struct EventFilter {
    inner: Filter<EventKind>,
    coder: Arc<dyn EventCoder>,
}

impl EventFilter {
    /// Replace the criteria set with raw criteria.
    pub fn criteria(mut self, set: Vec<EventCriteria>) -> Result<Self, ConnexError> {
        self.inner = self.inner.criteria(set)?;
        Ok(self)
    }

    pub fn range(mut self, range: FilterRange) -> Result<Self, ConnexError> {
        self.inner = self.inner.range(range)?;
        Ok(self)
    }

    pub fn order(mut self, order: Order) -> Self {
        self.inner = self.inner.order(order);
        self
    }

    pub fn inner(&self) -> &Filter<EventKind> {
        &self.inner
    }

    /// Fetch a page of matches and decode each one.
    pub fn apply(&self, offset: u64, limit: u64) -> Result<Pending<Vec<DecodedEventLog>>, ConnexError> {
        let page = self.inner.apply(offset, limit)?;
        let coder = Arc::clone(&self.coder);
        Ok(async move {
            let logs = page.await?;
            logs.into_iter()
                .map(|log| -> Result<DecodedEventLog, ConnexError> {
                    let decoded = coder.decode(&log.data, &log.topics)?;
                    Ok(DecodedEventLog { log, decoded })
                })
                .collect::<Result<Vec<_>, ConnexError>>()
        }
        .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainconnex_core::MemoryDriver;

    const ADDR: &str = "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed";
    const TOPIC: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";

    /// Maps `{"id": "<hex topic>"}` straight into topic1.
    struct PassThrough;

    impl EventCoder for PassThrough {
        fn encode(&self, args: &IndexedArgs) -> Result<Vec<Option<String>>, CodecError> {
            let id = match args.get("id") {
                None => None,
                Some(Value::String(s)) => Some(s.clone()),
                Some(other) => {
                    return Err(CodecError::Encode {
                        reason: format!("bad id {other}"),
                    })
                }
            };
            Ok(vec![Some(TOPIC.into()), id, None, None, None])
        }

        fn decode(&self, _data: &str, topics: &[String]) -> Result<DecodedArgs, CodecError> {
            let mut out = DecodedArgs::new();
            match topics.get(1) {
                Some(t) => {
                    out.insert("id".into(), Value::String(t.clone()));
                    Ok(out)
                }
                None => Err(CodecError::Decode {
                    reason: "missing topic1".into(),
                }),
            }
        }
    }

    fn visitor(driver: Arc<MemoryDriver>) -> EventVisitor {
        EventVisitor::new(driver, ADDR.into(), Arc::new(PassThrough))
    }

    fn args(id: Value) -> IndexedArgs {
        let mut m = IndexedArgs::new();
        m.insert("id".into(), id);
        m
    }

    #[test]
    fn criteria_carry_address_and_skip_empty_slots() {
        let v = visitor(Arc::new(MemoryDriver::new(0)));
        let c = v.as_criteria(&IndexedArgs::new()).unwrap();
        assert_eq!(c.address.as_deref(), Some(ADDR));
        assert_eq!(c.topic0.as_deref(), Some(TOPIC));
        assert!(c.topic1.is_none());
    }

    #[test]
    fn encode_errors_are_tagged() {
        let v = visitor(Arc::new(MemoryDriver::new(0)));
        let err = v.as_criteria(&args(Value::Bool(true))).unwrap_err();
        assert_eq!(err.to_string(), "arg0 can not be encoded: bad id true");

        let err = v
            .filter(vec![IndexedArgs::new(), args(Value::Bool(true))])
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "arg0.#1 can not be encoded: bad id true");
    }

    #[test]
    fn criteria_topics_are_checked_and_lowercased() {
        let v = visitor(Arc::new(MemoryDriver::new(0)));
        let upper = format!("0x{}", "AB".repeat(32));
        let c = v.as_criteria(&args(Value::String(upper.clone()))).unwrap();
        assert_eq!(c.topic1, Some(upper.to_lowercase()));

        let err = v.as_criteria(&args(Value::String("0x1234".into()))).unwrap_err();
        assert_eq!(err.to_string(), "arg0 can not be encoded: topic1 expected bytes32");

        let err = v.filter(vec![args(Value::String("0x1234".into()))]).err().unwrap();
        assert_eq!(err.to_string(), "arg0.#0 can not be encoded: topic1 expected bytes32");
    }

    #[test]
    fn bad_page_fails_before_the_driver() {
        let driver = Arc::new(MemoryDriver::new(0));
        let filter = visitor(driver.clone()).filter(vec![]).unwrap();
        assert!(filter.apply(0, 257).err().unwrap().is_bad_parameter());
        assert_eq!(driver.request_count(), 0);
    }

    #[test]
    fn filter_json_requires_array() {
        let v = visitor(Arc::new(MemoryDriver::new(0)));
        let err = v.filter_json(&serde_json::json!({})).err().unwrap();
        assert_eq!(err.to_string(), "arg0 expected array");
    }

    #[tokio::test]
    async fn matches_are_decoded() {
        let driver = Arc::new(MemoryDriver::new(0));
        driver.mine(10);
        let id = format!("0x{}", "22".repeat(32));
        driver.push_event_log(ADDR, vec![TOPIC.into(), id.clone()], "0x", ADDR);

        let logs = visitor(driver).filter(vec![]).unwrap().apply(0, 10).unwrap().await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].decoded["id"], Value::String(id));
        assert_eq!(logs[0].log.address, ADDR);
    }

    #[tokio::test]
    async fn decode_failure_propagates_unwrapped() {
        let driver = Arc::new(MemoryDriver::new(0));
        driver.push_event_log(ADDR, vec![TOPIC.into()], "0x", ADDR);

        let err = visitor(driver).filter(vec![]).unwrap().apply(0, 10).unwrap().await.unwrap_err();
        assert!(matches!(err, ConnexError::Decode(CodecError::Decode { .. })));
        assert_eq!(err.to_string(), "decode failed: missing topic1");
    }

    #[test]
    fn decoded_log_serialises_flat() {
        let log = DecodedEventLog {
            log: EventLog {
                address: ADDR.into(),
                topics: vec![],
                data: "0x".into(),
                meta: Default::default(),
            },
            decoded: DecodedArgs::new(),
        };
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["address"], ADDR);
        assert!(json["decoded"].is_object());
        assert_eq!(json["meta"]["blockID"], "");
    }
}
