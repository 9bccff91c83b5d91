//! Ordered failover selection.
//!
//! Rotates through the endpoint list with a cursor, the same way a
//! round-robin balancer walks its backends, except that the order is fixed
//! priority order and the cursor only moves when a connect attempt fails.
//!
//! ```text
//! [primary, b1, b2]:  primary → b1 → b2 → primary → b1 → ...
//! reset():            cursor → primary
//! ```

use crate::endpoint::{Endpoint, EndpointError, EndpointResult};

/// Non-empty, immutable list of broker endpoints in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointList {
    endpoints: Vec<Endpoint>,
}

impl EndpointList {
    /// Build a list from already parsed endpoints. The first one is the primary.
    pub fn new(endpoints: Vec<Endpoint>) -> EndpointResult<Self> {
        if endpoints.is_empty() {
            return Err(EndpointError::EmptyEndpointList);
        }
        Ok(Self { endpoints })
    }

    /// Parse a primary address followed by its failover addresses.
    pub fn from_addresses<S: AsRef<str>>(primary: &str, failover: &[S]) -> EndpointResult<Self> {
        let mut endpoints = Vec::with_capacity(failover.len() + 1);
        endpoints.push(Endpoint::parse(primary)?);
        for address in failover {
            endpoints.push(Endpoint::parse(address.as_ref())?);
        }
        Self::new(endpoints)
    }

    pub fn primary(&self) -> &Endpoint {
        &self.endpoints[0]
    }

    pub fn failover(&self) -> &[Endpoint] {
        &self.endpoints[1..]
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }
}

/// Cursor over an [`EndpointList`] producing an infinite cyclic sequence.
#[derive(Debug, Clone)]
pub struct EndpointSelector {
    list: EndpointList,
    cursor: usize,
}

impl EndpointSelector {
    /// Create a selector positioned on the primary.
    pub fn new(list: EndpointList) -> Self {
        Self { list, cursor: 0 }
    }

    /// Endpoint at the cursor.
    pub fn current(&self) -> &Endpoint {
        &self.list.endpoints[self.cursor]
    }

    /// Move to the next endpoint in priority order, wrapping to the primary.
    pub fn advance(&mut self) -> &Endpoint {
        self.cursor = (self.cursor + 1) % self.list.len();
        self.current()
    }

    /// Return the cursor to the primary.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn is_on_primary(&self) -> bool {
        self.cursor == 0
    }

    pub fn list(&self) -> &EndpointList {
        &self.list
    }
}
