//! Explainer: simulates clauses against the tracked head.
//!
//! Clauses are validated when `execute` is called; the returned future only
//! performs the driver round-trip.

use std::sync::Arc;

use chainconnex_core::clause::{clauses_from_json, normalize_clauses};
use chainconnex_core::validator::{ensure, is_address, is_decimal_uint, is_hex_uint, is_safe_uint};
use chainconnex_core::{Clause, ClauseInput, ConnexError, ExplainOptions, Pending, VmOutput};
use futures::FutureExt;
use serde_json::Value;

use crate::context::Context;

pub struct Explainer {
    ctx: Context,
    options: ExplainOptions,
}

impl Explainer {
    pub(crate) fn new(ctx: Context) -> Self {
        Self {
            ctx,
            options: ExplainOptions::default(),
        }
    }

    pub fn caller(mut self, addr: &str) -> Result<Self, ConnexError> {
        ensure(is_address(addr), "arg0 expected address")?;
        self.options.caller = Some(addr.to_lowercase());
        Ok(self)
    }

    pub fn gas(mut self, gas: u64) -> Result<Self, ConnexError> {
        ensure(is_safe_uint(gas), "arg0 expected non-neg safe integer")?;
        self.options.gas = Some(gas);
        Ok(self)
    }

    pub fn gas_price(mut self, price: &str) -> Result<Self, ConnexError> {
        ensure(
            is_hex_uint(price) || is_decimal_uint(price),
            "arg0 expected integer in hex|dec string",
        )?;
        self.options.gas_price = Some(price.to_string());
        Ok(self)
    }

    pub fn options(&self) -> &ExplainOptions {
        &self.options
    }

    /// Simulate typed clauses.
    pub fn execute(&self, clauses: Vec<ClauseInput>) -> Result<Pending<Vec<VmOutput>>, ConnexError> {
        Ok(self.run(normalize_clauses(clauses)?))
    }

    /// Simulate clauses given as a JSON array.
    pub fn execute_json(&self, clauses: &Value) -> Result<Pending<Vec<VmOutput>>, ConnexError> {
        Ok(self.run(clauses_from_json(clauses)?))
    }

    fn run(&self, clauses: Vec<Clause>) -> Pending<Vec<VmOutput>> {
        let driver = Arc::clone(&self.ctx.driver);
        let options = self.options.clone();
        let head = self.ctx.tracked_head();
        async move { driver.explain(clauses, options, &head.id).await.map_err(ConnexError::from) }.boxed()
    }
}
