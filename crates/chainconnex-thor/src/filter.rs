//! Log filter builder.
//!
//! A [`Filter`] accumulates a criteria set, an optional range and an order,
//! then runs a paged query through the driver with [`Filter::apply`].
//! Setters consume and return the builder; `apply` borrows it, so the query
//! snapshot can never race a mutation.
//!
//! ```ignore
//! let logs = thor
//!     .filter::<TransferKind>()
//!     .criteria(vec![TransferCriteria { sender: Some(addr), ..Default::default() }])?
//!     .range(FilterRange::blocks(0, 1_000))?
//!     .order(Order::Desc)
//!     .apply(0, 20)?
//!     .await?;
//! ```

use std::sync::Arc;

use chainconnex_core::validator::{ensure, is_address, is_bytes32, is_safe_uint};
use chainconnex_core::{
    ConnexError, Driver, DriverError, EventCriteria, EventLog, FilterKind, FilterQuery, FilterRange,
    Order, PageOptions, Pending, TransferCriteria, TransferLog,
};
use futures::future::BoxFuture;
use futures::FutureExt;

/// Largest page a single `apply` may request.
pub const MAX_LIMIT: u64 = 256;

/// A log table a [`Filter`] can run against.
pub trait LogKind: Send + Sync + 'static {
    const KIND: FilterKind;

    type Criteria: Clone + Default + Send + Sync + 'static;
    type Log: Send + 'static;

    /// Validate and lowercase one criteria entry at position `index`.
    fn normalize(index: usize, criteria: Self::Criteria) -> Result<Self::Criteria, ConnexError>;

    fn fetch<'a>(
        driver: &'a dyn Driver,
        query: FilterQuery<Self::Criteria>,
    ) -> BoxFuture<'a, Result<Vec<Self::Log>, DriverError>>;
}

/// Contract event logs.
#[derive(Debug, Clone, Copy)]
pub struct EventKind;

/// Native token transfer logs.
#[derive(Debug, Clone, Copy)]
pub struct TransferKind;

impl LogKind for EventKind {
    const KIND: FilterKind = FilterKind::Event;
    type Criteria = EventCriteria;
    type Log = EventLog;

    fn normalize(index: usize, mut c: EventCriteria) -> Result<EventCriteria, ConnexError> {
        c.address = address_field(index, "address", c.address)?;
        for (n, slot) in c.topics_mut().into_iter().enumerate() {
            if let Some(topic) = slot.take() {
                ensure(is_bytes32(&topic), format!("arg0.#{index}.topic{n} expected bytes32"))?;
                *slot = Some(topic.to_lowercase());
            }
        }
        Ok(c)
    }

    fn fetch<'a>(
        driver: &'a dyn Driver,
        query: FilterQuery<EventCriteria>,
    ) -> BoxFuture<'a, Result<Vec<EventLog>, DriverError>> {
        driver.filter_event_logs(query)
    }
}

impl LogKind for TransferKind {
    const KIND: FilterKind = FilterKind::Transfer;
    type Criteria = TransferCriteria;
    type Log = TransferLog;

    fn normalize(index: usize, c: TransferCriteria) -> Result<TransferCriteria, ConnexError> {
        Ok(TransferCriteria {
            tx_origin: address_field(index, "txOrigin", c.tx_origin)?,
            sender: address_field(index, "sender", c.sender)?,
            recipient: address_field(index, "recipient", c.recipient)?,
        })
    }

    fn fetch<'a>(
        driver: &'a dyn Driver,
        query: FilterQuery<TransferCriteria>,
    ) -> BoxFuture<'a, Result<Vec<TransferLog>, DriverError>> {
        driver.filter_transfer_logs(query)
    }
}

fn address_field(index: usize, field: &str, value: Option<String>) -> Result<Option<String>, ConnexError> {
    match value {
        None => Ok(None),
        Some(addr) => {
            ensure(is_address(&addr), format!("arg0.#{index}.{field} expected address"))?;
            Ok(Some(addr.to_lowercase()))
        }
    }
}

/// Query builder over one log table.
pub struct Filter<K: LogKind> {
    driver: Arc<dyn Driver>,
    criteria_set: Vec<K::Criteria>,
    range: Option<FilterRange>,
    order: Order,
}

impl<K: LogKind> Clone for Filter<K> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            criteria_set: self.criteria_set.clone(),
            range: self.range,
            order: self.order,
        }
    }
}

impl<K: LogKind> Filter<K> {
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            driver,
            criteria_set: Vec::new(),
            range: None,
            order: Order::default(),
        }
    }

    pub fn kind(&self) -> FilterKind {
        K::KIND
    }

    /// Replace the criteria set. An empty set matches every log.
    pub fn criteria(mut self, set: Vec<K::Criteria>) -> Result<Self, ConnexError> {
        self.criteria_set = set
            .into_iter()
            .enumerate()
            .map(|(i, c)| K::normalize(i, c))
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    /// Restrict the search window (inclusive on both ends).
    pub fn range(mut self, range: FilterRange) -> Result<Self, ConnexError> {
        ensure(is_safe_uint(range.from), "arg0.from expected non-neg safe integer")?;
        ensure(is_safe_uint(range.to), "arg0.to expected non-neg safe integer")?;
        ensure(range.from <= range.to, "arg0.from expected <= arg0.to")?;
        self.range = Some(range);
        Ok(self)
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// The query `apply(offset, limit)` would send, validated.
    pub fn query(&self, offset: u64, limit: u64) -> Result<FilterQuery<K::Criteria>, ConnexError> {
        ensure(is_safe_uint(offset), "arg0 expected non-neg safe integer")?;
        ensure(limit <= MAX_LIMIT, format!("arg1 expected unsigned integer <= {MAX_LIMIT}"))?;
        Ok(FilterQuery {
            criteria_set: self.criteria_set.clone(),
            range: self.range,
            order: self.order,
            options: PageOptions { offset, limit },
        })
    }

    /// Fetch the page `[offset, offset + limit)`. Does not modify the builder.
    ///
    /// Paging arguments are checked here; the returned future owns a
    /// snapshot of the query and only performs the driver call.
    pub fn apply(&self, offset: u64, limit: u64) -> Result<Pending<Vec<K::Log>>, ConnexError> {
        let query = self.query(offset, limit)?;
        tracing::debug!(
            kind = %K::KIND,
            criteria = query.criteria_set.len(),
            offset,
            limit,
            "Applying filter"
        );
        let driver = Arc::clone(&self.driver);
        Ok(async move { K::fetch(driver.as_ref(), query).await.map_err(ConnexError::from) }.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainconnex_core::MemoryDriver;

    const ADDR: &str = "0x7567D83B7B8D80ADDCB281A71D54FC7B3364FFED";

    fn driver() -> Arc<MemoryDriver> {
        Arc::new(MemoryDriver::new(1_000))
    }

    #[test]
    fn criteria_are_lowercased() {
        let f = Filter::<EventKind>::new(driver())
            .criteria(vec![EventCriteria {
                address: Some(ADDR.into()),
                topic2: Some(format!("0x{}", "AB".repeat(32))),
                ..Default::default()
            }])
            .unwrap();
        let q = f.query(0, 10).unwrap();
        assert_eq!(q.criteria_set[0].address.as_deref(), Some(ADDR.to_lowercase().as_str()));
        assert_eq!(q.criteria_set[0].topic2, Some(format!("0x{}", "ab".repeat(32))));
    }

    #[test]
    fn criteria_errors_name_index_and_field() {
        let err = Filter::<EventKind>::new(driver())
            .criteria(vec![
                EventCriteria::default(),
                EventCriteria {
                    topic3: Some("0x1234".into()),
                    ..Default::default()
                },
            ])
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "arg0.#1.topic3 expected bytes32");

        let err = Filter::<TransferKind>::new(driver())
            .criteria(vec![TransferCriteria {
                sender: Some("abc".into()),
                ..Default::default()
            }])
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "arg0.#0.sender expected address");
    }

    #[test]
    fn range_must_be_ordered() {
        assert!(Filter::<EventKind>::new(driver()).range(FilterRange::blocks(5, 4)).is_err());
        assert!(Filter::<EventKind>::new(driver())
            .range(FilterRange::time(0, 1 << 60))
            .is_err());
        assert!(Filter::<EventKind>::new(driver()).range(FilterRange::blocks(4, 4)).is_ok());
    }

    #[test]
    fn page_limits() {
        let f = Filter::<TransferKind>::new(driver());
        assert!(f.query(0, MAX_LIMIT).is_ok());
        assert!(f.query(0, MAX_LIMIT + 1).unwrap_err().is_bad_parameter());
        assert!(f.query(1 << 53, 1).is_err());
    }

    #[tokio::test]
    async fn apply_is_repeatable() {
        let d = driver();
        d.mine(1_010);
        d.push_transfer_log(ADDR, ADDR, "0x1", ADDR);
        d.push_transfer_log(ADDR, ADDR, "0x2", ADDR);

        let f = Filter::<TransferKind>::new(d.clone()).order(Order::Desc);
        let first = f.apply(0, 10).unwrap().await.unwrap();
        let second = f.apply(0, 10).unwrap().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].amount, "0x2");
    }

    #[test]
    fn bad_page_is_rejected_synchronously() {
        let d = driver();
        let f = Filter::<EventKind>::new(d.clone());
        assert!(f.apply(0, 1_000).err().unwrap().is_bad_parameter());
        assert_eq!(d.request_count(), 0);
    }

    #[tokio::test]
    async fn driver_is_called_only_when_awaited() {
        let d = driver();
        let f = Filter::<EventKind>::new(d.clone());
        let pending = f.apply(0, 10).unwrap();
        assert_eq!(d.request_count(), 0);
        pending.await.unwrap();
        assert_eq!(d.request_count(), 1);
    }
}
